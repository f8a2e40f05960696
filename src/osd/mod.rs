//! OSD (On-Screen Display) overlay for Wayland
//!
//! Shows the text in a click-through layer-shell surface on the primary
//! output and closes it once the timeout elapses.

mod layout;
mod render;
mod wayland;

use anyhow::{Context, Result, anyhow};
use calloop::EventLoop;
use calloop::timer::{TimeoutAction, Timer};
use smithay_client_toolkit::reexports::calloop_wayland_source::WaylandSource;
use std::time::Duration;
use tracing::{debug, info};
use wayland_client::{Connection, globals::registry_queue_init};

use self::wayland::OsdApp;
use crate::config::OsdConfig;
use crate::text::{FontBook, to_lines};

/// Show `text` with `config` until `timeout` elapses
pub fn run_osd(text: &str, timeout: Duration, config: &OsdConfig) -> Result<()> {
    let font = FontBook::system().resolve(&config.font)?;
    let lines = to_lines(text);
    debug!("Rendering {} line(s) with {} (exact match: {})", lines.len(), font.family, font.exact);

    // Connect to Wayland
    let conn = Connection::connect_to_env().context("Failed to connect to a Wayland compositor")?;
    let (globals, mut event_queue) = registry_queue_init(&conn)?;
    let qh = event_queue.handle();

    let mut app = OsdApp::new(&globals, &qh, font, lines, config.clone())?;

    // Outputs describe themselves over a couple of roundtrips
    event_queue.roundtrip(&mut app)?;
    event_queue.roundtrip(&mut app)?;

    let (output, screen) = app
        .primary_output()
        .ok_or_else(|| anyhow!("No output with a known size"))?;
    let geometry = app.prepare(screen)?;
    app.create_layer_surface(&qh, &output, geometry)?;

    let mut event_loop: EventLoop<OsdApp> = EventLoop::try_new()?;
    let handle = event_loop.handle();

    WaylandSource::new(conn, event_queue)
        .insert(handle.clone())
        .map_err(|e| anyhow!("Failed to watch the Wayland connection: {}", e.error))?;

    handle
        .insert_source(Timer::from_duration(timeout), |_deadline, _, app| {
            debug!("Timeout elapsed, closing");
            app.exit = true;
            TimeoutAction::Drop
        })
        .map_err(|e| anyhow!("Failed to start the close timer: {}", e.error))?;

    info!("Showing OSD for {}ms", timeout.as_millis());
    while !app.exit {
        event_loop.dispatch(None::<Duration>, &mut app)?;
    }

    debug!("Shutting down");
    Ok(())
}
