use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use fake_service_broker::{
    init_telemetry, FakeBrokerConfig, FakeServiceBroker, RequestContext, ServiceBroker,
};

#[derive(Parser)]
#[command(name = "fake-service-broker")]
#[command(about = "Inspect the fake Open Service Broker used by integration tests")]
struct Cli {
    /// Configuration file (defaults to fake-broker.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the service catalog as JSON
    Catalog,
    /// Print the resolved configuration as TOML
    Config {
        /// Write the configuration to this file instead of stdout
        #[arg(long, help = "Save the resolved configuration to a file")]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_file_loaded = FakeBrokerConfig::load_env_file()?;
    let config = FakeBrokerConfig::load(cli.config.as_deref())?;
    init_telemetry(&config.observability)?;
    if env_file_loaded {
        tracing::info!("Loaded environment variables from .env file");
    }

    match cli.command {
        Commands::Catalog => {
            let mut broker = FakeServiceBroker::from_settings(&config.broker);
            let services = broker
                .services(&RequestContext::new())
                .context("Catalog request failed")?;
            let rendered =
                serde_json::to_string_pretty(&services).context("Failed to encode catalog")?;
            println!("{rendered}");
        }
        Commands::Config { output } => match output {
            Some(path) => {
                config.save_to_file(&path)?;
                tracing::info!(path = %path.display(), "Configuration saved");
            }
            None => print!("{}", config.to_toml()?),
        },
    }

    Ok(())
}
