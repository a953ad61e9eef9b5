//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `extract`: Extract translatable messages from Java sources into a PO catalog
//! - `init`: Initialize glotpot configuration file

use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand};

use crate::core::rules::{AnnotationRule, MethodRule};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        match &self.command {
            Some(Command::Extract(cmd)) => cmd.args.common.verbose,
            Some(Command::Init) | None => false,
        }
    }
}

/// Common arguments shared by all commands.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Project root directory; the config file is searched from here
    #[arg(long, env = "GLOTPOT_ROOT")]
    pub root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Default, Parser)]
pub struct ExtractArgs {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Catalog file to write, relative to the root (overrides config file)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Additional translatable method: NAME, NAME:S or NAME:S,P (1-based argument indexes)
    #[arg(short = 'k', long = "keyword", value_name = "SPEC")]
    pub keywords: Vec<MethodRule>,

    /// Additional translatable annotation: QUALIFIED.NAME or QUALIFIED.NAME:FIELD,...
    #[arg(long = "annotation", value_name = "SPEC")]
    pub annotations: Vec<AnnotationRule>,

    /// Catalog encoding label (overrides config file)
    #[arg(long)]
    pub encoding: Option<String>,

    /// Keep messages that are no longer found in the sources
    #[arg(long)]
    pub keep_unused: bool,

    /// Extract and report without writing the catalog
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct ExtractCommand {
    #[command(flatten)]
    pub args: ExtractArgs,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract translatable messages from Java sources into a PO catalog
    Extract(ExtractCommand),
    /// Initialize a new .glotpotrc.json configuration file
    Init,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_extract_args() {
        let args = Arguments::try_parse_from([
            "glotpot",
            "extract",
            "--root",
            "app",
            "-k",
            "trn:1,2",
            "--keyword",
            "t",
            "--annotation",
            "org.app.Label:text",
            "--keep-unused",
            "--dry-run",
            "-v",
        ])
        .unwrap();

        assert!(args.verbose());
        let Some(Command::Extract(cmd)) = args.command else {
            panic!("expected extract command");
        };
        assert_eq!(cmd.args.common.root, Some(PathBuf::from("app")));
        assert_eq!(
            cmd.args.keywords,
            vec![MethodRule::new("trn", 0, Some(1)), MethodRule::new("t", 0, None)]
        );
        assert_eq!(
            cmd.args.annotations,
            vec![AnnotationRule::with_fields("org.app.Label", &["text"])]
        );
        assert!(cmd.args.keep_unused);
        assert!(cmd.args.dry_run);
    }

    #[test]
    fn test_invalid_keyword_is_rejected() {
        let result = Arguments::try_parse_from(["glotpot", "extract", "-k", "trn:1,1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Arguments::command().debug_assert();
    }
}
