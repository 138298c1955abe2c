// Standard library
use std::sync::OnceLock;

// External crates
use clap::Parser;
use tracing::{debug, info_span};
use uuid::Uuid;

// Internal imports
use ldev_core::{ldev_error, ldev_error_hint};
use ldev_logging::{init_subscriber, LogSettings};

// Local modules
mod cli;
mod commands;
mod error;

use cli::Args;
use commands::execute_command;

/// Request ID for this execution, attached to every log record.
static REQUEST_ID: OnceLock<String> = OnceLock::new();

fn get_request_id() -> &'static str {
    REQUEST_ID.get_or_init(|| Uuid::new_v4().to_string())
}

fn main() {
    let args = Args::parse();

    // Tests expect clean output, so no subscriber in test mode.
    let _log_guard = if std::env::var("LDEV_TEST_MODE").is_err() {
        init_subscriber(&LogSettings::from_env().with_debug(args.debug))
    } else {
        None
    };

    let span = info_span!(
        "request",
        request_id = get_request_id(),
        command = args.command.name()
    );
    let _entered = span.enter();
    debug!(?args, "starting ldev");

    match execute_command(args) {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            ldev_error!("{}", e);
            if let Some(hint) = e.hint() {
                ldev_error_hint!("{}", hint);
            }
            std::process::exit(1);
        }
    }
}
