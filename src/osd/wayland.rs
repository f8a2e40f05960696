//! Wayland layer-shell integration

use anyhow::{Result, anyhow};
use smithay_client_toolkit::{
    compositor::{CompositorHandler, CompositorState, Region},
    delegate_compositor, delegate_layer, delegate_output, delegate_registry, delegate_shm,
    output::{OutputHandler, OutputState},
    registry::{ProvidesRegistryState, RegistryState},
    registry_handlers,
    shell::{
        WaylandSurface,
        wlr_layer::{
            Anchor, KeyboardInteractivity, Layer, LayerShell, LayerShellHandler, LayerSurface,
            LayerSurfaceConfigure,
        },
    },
    shm::{
        Shm, ShmHandler,
        slot::{Buffer, SlotPool},
    },
};
use tracing::{debug, warn};
use wayland_client::{
    Connection, QueueHandle,
    globals::GlobalList,
    protocol::{wl_output, wl_shm, wl_surface},
};

use crate::config::OsdConfig;
use crate::osd::{
    layout::{self, Geometry, Size},
    render::{self, Palette},
};
use crate::text::{ResolvedFont, TextBlock};

const NAMESPACE: &str = "osd";

/// Main OSD application state
pub struct OsdApp {
    // Registry state
    registry_state: RegistryState,
    output_state: OutputState,
    compositor_state: CompositorState,
    shm: Shm,
    layer_shell: LayerShell,

    // OSD specific
    font: ResolvedFont,
    lines: Vec<String>,
    config: OsdConfig,
    block: Option<TextBlock>,

    // Wayland surface
    layer_surface: Option<LayerSurface>,
    pool: Option<SlotPool>,
    buffer: Option<Buffer>,
    width: u32,
    height: u32,
    pub exit: bool,
}

impl OsdApp {
    pub fn new(
        globals: &GlobalList,
        qh: &QueueHandle<Self>,
        font: ResolvedFont,
        lines: Vec<String>,
        config: OsdConfig,
    ) -> Result<Self> {
        let registry_state = RegistryState::new(globals);
        let output_state = OutputState::new(globals, qh);
        let compositor_state = CompositorState::bind(globals, qh)?;
        let shm = Shm::bind(globals, qh)?;
        let layer_shell = LayerShell::bind(globals, qh)
            .map_err(|e| anyhow!("Compositor does not support wlr-layer-shell: {}", e))?;

        Ok(Self {
            registry_state,
            output_state,
            compositor_state,
            shm,
            layer_shell,
            font,
            lines,
            config,
            block: None,
            layer_surface: None,
            pool: None,
            buffer: None,
            width: 0,
            height: 0,
            exit: false,
        })
    }

    /// The first advertised output and its logical size
    pub fn primary_output(&self) -> Option<(wl_output::WlOutput, Size)> {
        let output = self.output_state.outputs().next()?;
        let info = self.output_state.info(&output)?;

        let (width, height) = info.logical_size.or_else(|| {
            let scale = info.scale_factor.max(1);
            info.modes
                .iter()
                .find(|mode| mode.current)
                .map(|mode| (mode.dimensions.0 / scale, mode.dimensions.1 / scale))
        })?;

        debug!("Primary output {:?}: {}x{}", info.name, width, height);
        Some((output, Size { width, height }))
    }

    /// Shape the text for `screen` and work out where the window goes
    pub fn prepare(&mut self, screen: Size) -> Result<Geometry> {
        let face = self.font.face()?;
        let max_width = layout::max_text_width(screen, self.config.h_padding);
        let block = TextBlock::layout(&face, self.config.size, &self.lines, Some(max_width));

        let geometry = layout::place(screen, block.width(), block.height(), &self.config);
        debug!(
            "Text {}x{} placed at {},{} on {}x{}",
            block.width(),
            block.height(),
            geometry.x,
            geometry.y,
            screen.width,
            screen.height
        );

        self.block = Some(block);
        self.width = geometry.width.max(1) as u32;
        self.height = geometry.height.max(1) as u32;
        Ok(geometry)
    }

    pub fn create_layer_surface(
        &mut self,
        qh: &QueueHandle<Self>,
        output: &wl_output::WlOutput,
        geometry: Geometry,
    ) -> Result<()> {
        let surface = self.compositor_state.create_surface(qh);

        // Empty input region: clicks go to whatever is underneath
        let region = Region::new(&self.compositor_state)?;
        surface.set_input_region(Some(region.wl_region()));

        let layer_surface = self.layer_shell.create_layer_surface(
            qh,
            surface,
            Layer::Overlay,
            Some(NAMESPACE),
            Some(output),
        );

        let (top, left) = geometry.margins();
        layer_surface.set_anchor(Anchor::TOP | Anchor::LEFT);
        layer_surface.set_margin(top, 0, 0, left);
        layer_surface.set_keyboard_interactivity(KeyboardInteractivity::None);
        layer_surface.set_size(self.width, self.height);
        // -1: place relative to the whole output, ignoring panels
        layer_surface.set_exclusive_zone(-1);

        // Commit initial configuration
        layer_surface.wl_surface().commit();

        self.layer_surface = Some(layer_surface);

        Ok(())
    }

    pub fn draw(&mut self) -> Result<()> {
        let Some(layer_surface) = &self.layer_surface else {
            return Ok(());
        };
        let Some(block) = &self.block else {
            return Ok(());
        };

        let (stride, len) = layout::buffer_layout(self.width, self.height)
            .ok_or_else(|| anyhow!("OSD of {}x{} is too large", self.width, self.height))?;

        // Initialize pool if needed
        if self.pool.is_none() {
            let pool = SlotPool::new(len, &self.shm)?;
            self.pool = Some(pool);
        }
        let Some(pool) = self.pool.as_mut() else {
            return Ok(());
        };

        let mut pixmap = tiny_skia::Pixmap::new(self.width, self.height)
            .ok_or_else(|| anyhow!("Failed to create {}x{} pixmap", self.width, self.height))?;

        let face = self.font.face()?;
        let palette = Palette {
            text: self.config.font_color,
            background: self.config.background_color,
        };
        render::render(&mut pixmap, block, &face, palette);

        let width = i32::try_from(self.width)?;
        let height = i32::try_from(self.height)?;
        let (buffer, canvas) = pool.create_buffer(
            width,
            height,
            stride,
            wl_shm::Format::Argb8888,
        )?;
        render::to_argb8888(pixmap.data(), canvas);

        let surface = layer_surface.wl_surface();
        surface.attach(Some(buffer.wl_buffer()), 0, 0);
        surface.damage_buffer(0, 0, width, height);
        surface.commit();

        // Keep the buffer alive until the next frame replaces it
        self.buffer = Some(buffer);
        debug!("Frame committed ({}x{})", self.width, self.height);
        Ok(())
    }
}

// Implement required trait delegates
delegate_compositor!(OsdApp);
delegate_output!(OsdApp);
delegate_shm!(OsdApp);
delegate_layer!(OsdApp);
delegate_registry!(OsdApp);

impl CompositorHandler for OsdApp {
    fn scale_factor_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_factor: i32,
    ) {
    }

    fn transform_changed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _new_transform: wl_output::Transform,
    ) {
    }

    fn frame(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _time: u32,
    ) {
    }

    fn surface_enter(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
    }

    fn surface_leave(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _surface: &wl_surface::WlSurface,
        _output: &wl_output::WlOutput,
    ) {
    }
}

impl OutputHandler for OsdApp {
    fn output_state(&mut self) -> &mut OutputState {
        &mut self.output_state
    }

    fn new_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
    }

    fn update_output(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
    }

    fn output_destroyed(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _output: wl_output::WlOutput,
    ) {
    }
}

impl LayerShellHandler for OsdApp {
    fn closed(&mut self, _conn: &Connection, _qh: &QueueHandle<Self>, _layer: &LayerSurface) {
        debug!("Layer surface closed by compositor");
        self.exit = true;
    }

    fn configure(
        &mut self,
        _conn: &Connection,
        _qh: &QueueHandle<Self>,
        _layer: &LayerSurface,
        configure: LayerSurfaceConfigure,
        _serial: u32,
    ) {
        let (width, height) = configure.new_size;
        if width > 0 && height > 0 && (width, height) != (self.width, self.height) {
            debug!("Compositor resized OSD to {}x{}", width, height);
            self.width = width;
            self.height = height;
            self.pool = None; // Recreate pool with new size
        }

        if let Err(e) = self.draw() {
            warn!("Draw error: {:#}", e);
        }
    }
}

impl ShmHandler for OsdApp {
    fn shm_state(&mut self) -> &mut Shm {
        &mut self.shm
    }
}

impl ProvidesRegistryState for OsdApp {
    fn registry(&mut self) -> &mut RegistryState {
        &mut self.registry_state
    }
    registry_handlers![OutputState];
}
