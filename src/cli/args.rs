//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `extract`: Extract translation units from source files
//! - `init`: Write a default `.jsxlaterc.json`

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Command> {
        if self.command.is_none() {
            Self::command().print_help().ok();
        }
        self.command
    }
}

#[derive(Debug, Args)]
pub struct ExtractCommand {
    /// Directory holding `.jsxlaterc.json` and the sources (defaults to the current directory)
    #[arg(long, env = "JSXLATE_SOURCE_ROOT")]
    pub source_root: Option<PathBuf>,

    /// Write the extracted units as JSON to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract translatable JSX and strings into translation units
    Extract(ExtractCommand),
    /// Initialize a new .jsxlaterc.json configuration file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extract_args() {
        let args = Arguments::try_parse_from([
            "jsxlate",
            "extract",
            "--source-root",
            "web",
            "-o",
            "updates.json",
            "-v",
        ])
        .unwrap();
        let Some(Command::Extract(cmd)) = args.command else {
            panic!("expected extract command");
        };
        assert_eq!(cmd.source_root, Some(PathBuf::from("web")));
        assert_eq!(cmd.output, Some(PathBuf::from("updates.json")));
        assert!(cmd.verbose);
    }

    #[test]
    fn test_parse_init() {
        let args = Arguments::try_parse_from(["jsxlate", "init"]).unwrap();
        assert!(matches!(args.command, Some(Command::Init)));
    }
}
