use std::fs;

use anyhow::Context;
use estate_admin_core::export_delimited;
use estate_admin_models::StatsSnapshot;
use serde::Deserialize;
use serde_json::Value;

use crate::cli::ExportArgs;
use crate::client::{CliError, CliResult};

#[derive(Debug, Deserialize)]
struct ExplicitTable {
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
}

type Table = (Vec<String>, Vec<Vec<String>>);

fn cell(value: &Value) -> String {
    StatsSnapshot::display_value(value)
}

/// Accepts `{headers, rows}` or an array of objects keyed by column.
fn table_from_json(document: Value) -> CliResult<Table> {
    match document {
        Value::Array(records) => {
            let headers = match records.first() {
                Some(Value::Object(first)) => first.keys().cloned().collect::<Vec<_>>(),
                Some(_) => {
                    return Err(CliError::validation(
                        "array exports must contain JSON objects",
                    ));
                }
                None => Vec::new(),
            };
            let rows = records
                .iter()
                .map(|record| {
                    headers
                        .iter()
                        .map(|header| record.get(header).map(cell).unwrap_or_default())
                        .collect()
                })
                .collect();
            Ok((headers, rows))
        }
        object @ Value::Object(_) => {
            let table: ExplicitTable = serde_json::from_value(object).map_err(|err| {
                CliError::validation(format!("expected {{headers, rows}} table: {err}"))
            })?;
            let rows = table
                .rows
                .iter()
                .map(|row| row.iter().map(cell).collect())
                .collect();
            Ok((table.headers, rows))
        }
        _ => Err(CliError::validation(
            "export input must be a JSON array or object",
        )),
    }
}

pub(crate) fn handle_export(args: &ExportArgs) -> CliResult<()> {
    let raw = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))
        .map_err(CliError::failure)?;
    let document: Value = serde_json::from_str(&raw)
        .map_err(|err| CliError::validation(format!("export input is not JSON: {err}")))?;
    let (headers, rows) = table_from_json(document)?;
    let text = export_delimited(&headers, &rows);

    match &args.out {
        Some(path) => fs::write(path, format!("{text}\n"))
            .with_context(|| format!("failed to write {}", path.display()))
            .map_err(CliError::failure)?,
        None => println!("{text}"),
    }
    Ok(())
}
