use anyhow::{Ok, Result};

use super::super::args::ExtractCommand;
use super::{CommandResult, CommandSummary, ExtractSummary};
use crate::core::ExtractContext;

pub fn extract(cmd: ExtractCommand) -> Result<CommandResult> {
    let args = &cmd.args;
    let ctx = ExtractContext::new(args)?;
    let outcome = ctx.run(args.dry_run)?;

    Ok(CommandResult {
        summary: CommandSummary::Extract(ExtractSummary {
            message_count: outcome.store.len(),
            files_scanned: ctx.files.len(),
            skipped_paths: ctx.skipped_count,
            sync: outcome.summary,
            output: ctx.output_path.clone(),
            written: outcome.written,
        }),
    })
}
