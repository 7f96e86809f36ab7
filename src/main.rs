//! install-deps CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use install_deps::cli::{Cli, CommandDispatcher};
use install_deps::ui::{create_ui, OutputMode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is WARN, or INFO with `--verbose`
fn init_tracing(debug: bool, verbose: bool) {
    let filter = if debug {
        EnvFilter::new("install_deps=debug")
    } else {
        let default = if verbose {
            "install_deps=info"
        } else {
            "install_deps=warn"
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Handle --no-color before anything is styled
    if cli.no_color {
        std::env::set_var("NO_COLOR", "1");
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    init_tracing(cli.debug, cli.verbose);
    tracing::debug!("install-deps starting with args: {:?}", cli);

    let output_mode = if cli.quiet {
        OutputMode::Quiet
    } else if cli.verbose {
        OutputMode::Verbose
    } else {
        OutputMode::Normal
    };

    let project_root = match &cli.project {
        Some(path) => path.clone(),
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!("Error: cannot determine the current directory: {}", e);
                return ExitCode::from(1);
            }
        },
    };

    let mut ui = create_ui(output_mode);
    let dispatcher = CommandDispatcher::new(project_root).with_config(cli.config.clone());

    match dispatcher.dispatch(&cli, ui.as_mut()) {
        Ok(result) => ExitCode::from(exit_byte(result.exit_code)),
        Err(e) => {
            // The tool already printed its own diagnostics.
            if !e.reported_by_tool() || output_mode == OutputMode::Verbose {
                ui.error(&format!("Error: {}", e));
            }
            ExitCode::from(exit_byte(e.exit_code()))
        }
    }
}

fn exit_byte(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(1)
}
