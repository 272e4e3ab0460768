//! Terminal output formatting.

use std::io::Write;

use rshell_core::ShellResult;
use serde_json::json;

use crate::error::CliError;

/// Write a result: its output lines, or the whole result as JSON.
pub fn write_result(out: &mut impl Write, result: &ShellResult, json: bool) -> Result<(), CliError> {
    if json {
        serde_json::to_writer_pretty(&mut *out, result)?;
        writeln!(out)?;
    } else {
        for line in result.lines() {
            writeln!(out, "{line}")?;
        }
    }
    Ok(())
}

/// Write binary resolutions, one `name: invocation` per line.
pub fn write_resolutions(
    out: &mut impl Write,
    resolved: &[(String, Option<String>)],
    json: bool,
) -> Result<(), CliError> {
    if json {
        let map: serde_json::Map<String, serde_json::Value> = resolved
            .iter()
            .map(|(name, found)| (name.clone(), json!(found)))
            .collect();
        serde_json::to_writer_pretty(&mut *out, &map)?;
        writeln!(out)?;
    } else {
        for (name, found) in resolved {
            writeln!(out, "{name}: {}", found.as_deref().unwrap_or("not found"))?;
        }
    }
    Ok(())
}

/// Write one string per line, or a JSON array.
pub fn write_list(out: &mut impl Write, items: &[String], json: bool) -> Result<(), CliError> {
    if json {
        serde_json::to_writer_pretty(&mut *out, items)?;
        writeln!(out)?;
    } else {
        for item in items {
            writeln!(out, "{item}")?;
        }
    }
    Ok(())
}
