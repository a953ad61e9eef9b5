use std::path::PathBuf;

use crate::{cli::exit_status::ExitStatus, core::sync::SyncSummary};

#[derive(Debug)]
pub enum CommandSummary {
    Extract(ExtractSummary),
    Init(InitSummary),
}

#[derive(Debug)]
pub struct ExtractSummary {
    /// Messages in the final catalog.
    pub message_count: usize,
    pub files_scanned: usize,
    /// Paths that could not be accessed while discovering files.
    pub skipped_paths: usize,
    pub sync: SyncSummary,
    pub output: PathBuf,
    /// False for `--dry-run`.
    pub written: bool,
}

#[derive(Debug)]
pub struct InitSummary {
    pub path: PathBuf,
    /// Set when the config file already existed.
    pub error: Option<String>,
}

/// Result of running glotpot commands
#[derive(Debug)]
pub struct CommandResult {
    pub summary: CommandSummary,
}

impl CommandResult {
    pub fn exit_status(&self) -> ExitStatus {
        match &self.summary {
            CommandSummary::Init(InitSummary { error: Some(_), .. }) => ExitStatus::Failure,
            _ => ExitStatus::Success,
        }
    }
}
