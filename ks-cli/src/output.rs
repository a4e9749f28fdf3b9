use std::io::Write;

use ks_core::config::OutputFormat;
use ks_core::errors::*;
use ks_core::patch::Patch;
use serde_json as json;
use tracing::*;

const COLUMN_SEPARATOR: &str = "   ";

pub fn print_table(out: &mut impl Write, headers: &[&str], rows: &[Vec<String>]) -> EmptyResult {
    let mut widths: Vec<_> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let headers: Vec<_> = headers.iter().map(|h| h.to_string()).collect();
    for row in std::iter::once(&headers).chain(rows) {
        let cells: Vec<_> = row.iter().zip(widths.iter().copied()).map(|(cell, w)| format!("{cell:w$}")).collect();
        writeln!(out, "{}", cells.join(COLUMN_SEPARATOR).trim_end())?;
    }
    Ok(())
}

// Prints the result of a mutating command: the changed objects (or just their patches), followed
// by every error that came up along the way.  The run fails if anything did.
pub fn print_results(out: &mut impl Write, patches: Vec<Patch>, format: OutputFormat) -> EmptyResult {
    let mut errs = AggregateError::default();
    let mut changed = vec![];
    for mut patch in patches {
        if let Some(err) = patch.err.take() {
            errs.push(err.context(patch.info.to_string()));
            continue;
        }

        if format == OutputFormat::Patch {
            if patch.is_empty() {
                info!("{} was not changed", patch.info);
            } else {
                writeln!(out, "{}: {}", patch.info, String::from_utf8_lossy(&patch.patch))?;
            }
            continue;
        }
        changed.push(json::from_slice::<json::Value>(&patch.after)?);
    }

    match format {
        OutputFormat::Yaml => {
            for value in &changed {
                write!(out, "---\n{}", serde_yaml::to_string(value)?)?;
            }
        },
        OutputFormat::Json if changed.len() == 1 => writeln!(out, "{}", json::to_string_pretty(&changed[0])?)?,
        OutputFormat::Json if !changed.is_empty() => {
            let list = json::json!({"apiVersion": "v1", "kind": "List", "items": changed});
            writeln!(out, "{}", json::to_string_pretty(&list)?)?;
        },
        _ => (),
    }

    if !errs.is_empty() {
        error!("{} object(s) could not be updated", errs.len());
    }
    errs.into_result()
}
