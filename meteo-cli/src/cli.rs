use clap::{Parser, Subcommand};
use std::sync::Arc;

use meteo_core::{
    ServerConfig,
    provider::{OpenMeteoProvider, WeatherProvider},
    server,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "meteo", version, about = "Weather lookup over Open-Meteo, as a CLI or an MCP server")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Current weather for a city.
    Weather {
        /// City name, e.g. "Paris".
        #[arg(long)]
        city: String,
    },

    /// Daily forecast for a city.
    Forecast {
        /// City name, e.g. "Paris".
        #[arg(long)]
        city: String,

        /// Number of days (1..16).
        #[arg(long, default_value_t = 3)]
        days: i64,
    },

    /// Run the MCP server on stdio.
    Serve,

    /// Run the MCP server over HTTP (JSON-RPC + SSE).
    ServeHttp {
        /// Bind address; overrides MCP_HTTP_ADDR.
        #[arg(long)]
        addr: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Weather { city } => {
                let provider = OpenMeteoProvider::new();
                let report = provider.current(&city).await?;
                print_json(&report)
            }
            Command::Forecast { city, days } => {
                let provider = OpenMeteoProvider::new();
                let forecast = provider.forecast(&city, days).await?;
                print_json(&forecast)
            }
            Command::Serve => {
                init_tracing();
                server::stdio::serve(Arc::new(OpenMeteoProvider::new())).await
            }
            Command::ServeHttp { addr } => {
                init_tracing();
                let mut config = ServerConfig::from_env();
                if let Some(addr) = addr {
                    config.http_addr = addr;
                }
                server::http::serve(Arc::new(OpenMeteoProvider::new()), config).await
            }
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Log to stderr so the stdio transport keeps stdout for protocol frames.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
