use std::process::ExitCode;

use clap::Parser;
use taskboard::config::Config;
use taskboard::ui::{self, App};
use taskboard::{logging, TaskStore};
use tracing::{error, info, warn};

fn main() -> ExitCode {
    let config = Config::parse();

    let _log_guard = match logging::init(&config.log_file()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("warning: logging disabled: {e}");
            None
        }
    };

    // Fail before touching the terminal so the message stays readable.
    let store = match TaskStore::open(&config.file) {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "cannot open task file");
            eprintln!("Error: cannot open task file: {e}");
            return ExitCode::FAILURE;
        }
    };
    let mut app = match App::new(store) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "cannot load tasks");
            eprintln!("Error: cannot load tasks: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!(path = %config.file.display(), "starting task board");
    if let Err(e) = ui::run(&mut app) {
        error!(error = %e, "terminal error");
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }

    if app.has_unsaved_changes() {
        warn!("exited with unsaved changes");
        eprintln!(
            "warning: the last change could not be saved to {}",
            config.file.display()
        );
    }
    info!("task board closed");
    ExitCode::SUCCESS
}
