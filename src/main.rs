mod config;
mod osd;
mod text;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Text shown when none is given on the command line
const DEFAULT_TEXT: &str = "OSD by @trystan4861<br><br>[run OSD -h]";

/// Exit status for malformed command-line arguments
const USAGE_ERROR: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "osd")]
#[command(about = "Show text on screen (OSD) that closes by itself")]
#[command(version)]
#[command(after_help = "Examples:\n  osd 'Text to show' -t 3000\n  osd 'On-screen text' --timeout 5000")]
struct Cli {
    /// Text to show; <br> starts a new line
    #[arg(default_value = DEFAULT_TEXT)]
    text: String,

    /// Milliseconds before the OSD closes
    #[arg(short, long, default_value_t = 3000)]
    timeout: u64,

    /// Config file (defaults to ~/.config/osd/config.ini)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("osd=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Help and version requests succeed; everything else is a usage error
fn argument_error(err: clap::Error) -> ExitCode {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = err.print();
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Error: invalid arguments");
            let _ = Cli::command().print_help();
            ExitCode::from(USAGE_ERROR)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let path = match cli.config {
        Some(path) => path,
        None => config::default_config_path()?,
    };
    let loaded = config::load_or_repair(&path)?;
    debug!("Config {} ({:?})", path.display(), loaded.outcome);

    osd::run_osd(&cli.text, Duration::from_millis(cli.timeout), &loaded.config)
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => return argument_error(e),
    };

    init_tracing();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["osd"]).unwrap();
        assert_eq!(cli.text, DEFAULT_TEXT);
        assert_eq!(cli.timeout, 3000);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_text_and_timeout() {
        let cli = Cli::try_parse_from(["osd", "Volume 50%", "--timeout", "500"]).unwrap();
        assert_eq!(cli.text, "Volume 50%");
        assert_eq!(cli.timeout, 500);

        let cli = Cli::try_parse_from(["osd", "-t", "0", "-c", "/tmp/osd.ini", "hi"]).unwrap();
        assert_eq!(cli.timeout, 0);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/osd.ini")));
        assert_eq!(cli.text, "hi");
    }

    #[test]
    fn test_bad_arguments_are_usage_errors() {
        for args in [
            vec!["osd", "-t", "soon"],
            vec!["osd", "-t", "-5"],
            vec!["osd", "--nope"],
            vec!["osd", "one", "two"],
        ] {
            let err = Cli::try_parse_from(args.iter().copied()).unwrap_err();
            assert!(
                !matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion),
                "{:?} should be rejected",
                args
            );
            assert_eq!(argument_error(err), ExitCode::from(USAGE_ERROR));
        }
    }

    #[test]
    fn test_help_is_not_an_error() {
        let err = Cli::try_parse_from(["osd", "-h"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
        assert_eq!(argument_error(err), ExitCode::SUCCESS);
    }
}
