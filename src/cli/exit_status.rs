use std::process::ExitCode;

/// Process exit status of a glotpot command.
///
/// - `Success` (0): the command did its work (a catalog was extracted or a config created)
/// - `Failure` (1): the command refused to act (e.g. `init` over an existing config)
/// - `Error` (2): the command failed (invalid config, unparseable source, catalog I/O)
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
