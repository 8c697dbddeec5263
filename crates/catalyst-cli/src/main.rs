use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use catalyst_gateway::{
    Gateway, GatewayConfig, ENV_BASE_URL, ENV_BODY_ENCODING, ENV_EVENT_SHAPE,
    ENV_EXTENSION_SEPARATOR, ENV_ROUTE_PREFIX,
};

mod commands;

use commands::OutputFormat;

/// Flags override the `CATALYST_*` environment variables the Lambda reads.
#[derive(Parser, Debug)]
#[command(author, version, about = "Catalyst gateway event utilities")]
struct Cli {
    /// Trigger-event shape: custom-path, simple-proxy or resource-template.
    #[arg(long, global = true)]
    shape: Option<String>,

    /// API surface prefix stripped before routing.
    #[arg(long, global = true)]
    prefix: Option<String>,

    /// Extension separator: hyphen or underscore.
    #[arg(long, global = true)]
    separator: Option<String>,

    /// Body encoding: object or text.
    #[arg(long, global = true)]
    body_encoding: Option<String>,

    /// Deployment base URL (resource-template shape).
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Output format [default: json for inspect, text for routes].
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize, route and resolve a raw trigger event read from a JSON file.
    Inspect {
        /// Path to the event JSON file.
        event: PathBuf,
    },
    /// Print the route table for the configured prefix and separator.
    Routes,
}

impl Cli {
    fn flag(&self, name: &str) -> Option<&String> {
        match name {
            ENV_EVENT_SHAPE => self.shape.as_ref(),
            ENV_ROUTE_PREFIX => self.prefix.as_ref(),
            ENV_EXTENSION_SEPARATOR => self.separator.as_ref(),
            ENV_BODY_ENCODING => self.body_encoding.as_ref(),
            ENV_BASE_URL => self.base_url.as_ref(),
            _ => None,
        }
    }

    fn gateway_config(&self) -> Result<GatewayConfig> {
        GatewayConfig::from_lookup(|name| {
            self.flag(name)
                .cloned()
                .or_else(|| std::env::var(name).ok())
        })
        .context("invalid gateway configuration")
    }
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();

    let gateway = Gateway::new(cli.gateway_config()?).context("failed to build gateway")?;

    match &cli.command {
        Command::Inspect { event } => commands::inspect::handle_inspect(
            &gateway,
            event,
            cli.format.unwrap_or(OutputFormat::Json),
        ),
        Command::Routes => {
            commands::routes::handle_routes(&gateway, cli.format.unwrap_or(OutputFormat::Text))
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
