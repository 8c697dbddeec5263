//! Routes command handler for printing the fixed route table.

use std::process::ExitCode;

use anyhow::Result;
use serde::Serialize;

use catalyst_gateway::{resolve, DispatchEntry, Gateway, RouteKey};

use super::{describe_entry, print_json, OutputFormat};

/// One row of the printed route table.
#[derive(Debug, Clone, Serialize)]
pub struct RouteRow {
    pub path_template: String,
    pub route: RouteKey,
    pub dispatch: Option<DispatchEntry>,
}

/// Handle the routes subcommand.
pub fn handle_routes(gateway: &Gateway, format: OutputFormat) -> Result<ExitCode> {
    let rows: Vec<RouteRow> = gateway
        .router()
        .descriptors()
        .into_iter()
        .map(|descriptor| RouteRow {
            dispatch: resolve(descriptor.handler_id),
            route: descriptor.handler_id,
            path_template: descriptor.path_template,
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Text => {
            let width = rows
                .iter()
                .map(|row| row.path_template.len())
                .max()
                .unwrap_or(0);
            for row in &rows {
                let handler = row
                    .dispatch
                    .as_ref()
                    .map(describe_entry)
                    .unwrap_or_else(|| "<unregistered>".to_string());
                println!("{:width$}  ->  {}", row.path_template, handler, width = width);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
