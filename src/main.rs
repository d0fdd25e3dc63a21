use std::process::ExitCode;

use airmap::telemetry::{self, LogFormat};
use airmap::web::{self, TriggerState};
use airmap::{GcsStore, handle_trigger};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "airmap", version, about = "Publishes the parcel locker air quality map")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the job once and print the outcome
    Run,
    /// Serve the HTTP trigger
    Serve {
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    telemetry::init(LogFormat::from_env());

    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("TLS crypto provider already installed");
    }

    match Cli::parse().command {
        Command::Run => {
            let outcome = handle_trigger(|name: &str| std::env::var(name).ok(), &GcsStore::new()).await;
            match serde_json::to_string(&outcome) {
                Ok(json) => println!("{json}"),
                Err(err) => tracing::error!("Failed to serialize outcome: {}", err),
            }
            if outcome.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Command::Serve { port } => {
            match web::run(port, TriggerState::from_process_env(GcsStore::new())).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    tracing::error!("{:#}", err);
                    ExitCode::FAILURE
                }
            }
        }
    }
}
