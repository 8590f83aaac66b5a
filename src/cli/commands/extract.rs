use std::fs;

use anyhow::{Context, Result};

use super::super::args::ExtractCommand;
use super::super::exit_status::ExitStatus;
use super::super::report::{print_extract_summary, report};
use crate::core::{ExtractContext, TranslationUnit};

pub fn extract(cmd: ExtractCommand) -> Result<ExitStatus> {
    let ctx = ExtractContext::new(cmd.source_root.as_deref(), cmd.verbose)?;
    let result = ctx.extract();

    report(&result);

    if let Some(output) = &cmd.output {
        let units: Vec<&TranslationUnit> = result.units().collect();
        let json = serde_json::to_string_pretty(&units)
            .context("Failed to serialize translation units")?;
        fs::write(output, json + "\n")
            .with_context(|| format!("Failed to write {}", output.display()))?;
    }
    print_extract_summary(&result, cmd.output.as_deref());

    if result.error_count() > 0 {
        Ok(ExitStatus::Failure)
    } else {
        Ok(ExitStatus::Success)
    }
}
