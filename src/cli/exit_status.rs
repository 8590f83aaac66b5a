use std::process::ExitCode;

/// Exit status of a jsxlate command.
///
/// - `Success` (0): completed, no blocking errors
/// - `Failure` (1): completed, but at least one blocking error was reported
/// - `Error` (2): could not run (unreadable config, unwritable output, ...)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Failure,
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Failure => ExitCode::from(1),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}
