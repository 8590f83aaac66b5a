//! Command-line interface: argument parsing, command dispatch and reporting.

use anyhow::Result;

pub mod args;
mod commands;
mod exit_status;
mod report;

pub use args::{Arguments, Command, ExtractCommand};
pub use exit_status::ExitStatus;
pub use report::{print_extract_summary_to, report_to};

pub fn run_cli(args: Arguments) -> Result<ExitStatus> {
    match args.with_command_or_help() {
        Some(Command::Extract(cmd)) => commands::extract::extract(cmd),
        Some(Command::Init) => commands::init::init(),
        None => Ok(ExitStatus::Success),
    }
}
