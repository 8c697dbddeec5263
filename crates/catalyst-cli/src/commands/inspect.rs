//! Inspect command handler: replay a raw trigger event through
//! normalization, routing and dispatch resolution without calling the
//! domain layer.

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use serde_json::Value;

use catalyst_gateway::{Gateway, GatewayError, PreparedRequest};

use super::{describe_entry, print_json, OutputFormat};

/// Exit code used when the event's path matches no route.
pub const EXIT_ROUTE_NOT_FOUND: u8 = 2;

/// Handle the inspect subcommand.
///
/// A routing miss prints the 404 envelope the Lambda would return and
/// exits with [`EXIT_ROUTE_NOT_FOUND`]. Any other failure is an error.
pub fn handle_inspect(gateway: &Gateway, event_path: &Path, format: OutputFormat) -> Result<ExitCode> {
    let raw = fs::read_to_string(event_path)
        .with_context(|| format!("failed to read event from {}", event_path.display()))?;
    let event: Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", event_path.display()))?;

    match gateway.prepare(&event) {
        Ok(prepared) => {
            match format {
                OutputFormat::Json => print_json(&prepared)?,
                OutputFormat::Text => print_prepared(&prepared),
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err @ GatewayError::RouteNotFound { .. }) => {
            let envelope = gateway.render_error(&err, "cli");
            print_json(&envelope)?;
            Ok(ExitCode::from(EXIT_ROUTE_NOT_FOUND))
        }
        Err(err) => Err(err).context("event could not be normalized"),
    }
}

fn print_prepared(prepared: &PreparedRequest) {
    let request = &prepared.request;
    println!("method:     {}", request.method);
    println!("url:        {}", request.url);
    println!("route:      {}", prepared.route.key);
    println!(
        "collection: {}",
        request.collection().unwrap_or("<none>")
    );
    println!("handler:    {}", describe_entry(&prepared.dispatch));

    print_section("query", &request.query_parameters);
    print_section("route parameters", &request.route_parameters);
    print_section("headers", &request.headers);
}

fn print_section<'a>(title: &str, entries: impl IntoIterator<Item = (&'a String, &'a String)>) {
    println!("{}:", title);
    for (name, value) in entries {
        println!("  {} = {}", name, value);
    }
}
