//! `transit` — drive one verification run from the command line.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use transit_config::HarnessConfig;
use transit_harness::{HttpScenarioRunner, IdentityHubClient, TransferVerifier};
use url::Url;

#[derive(Parser)]
#[command(name = "transit", version, about = "End-to-end transfer verification harness")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one end-to-end blob transfer verification.
    Run(RunArgs),
    /// Query every configured identity hub for verifiable credentials.
    Credentials,
}

#[derive(Args)]
struct RunArgs {
    /// Use local emulator resources instead of cloud provisioning.
    #[arg(long)]
    local: bool,

    /// Management API base URL.
    #[arg(long, env = "TRANSIT_MANAGEMENT_URL")]
    management_url: Option<Url>,

    /// Job runner endpoint.
    #[arg(long, env = "TRANSIT_RUNNER_URL")]
    runner_url: Option<Url>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .compact()
        .init();

    match Cli::parse().command {
        Command::Run(args) => run_verification(args).await,
        Command::Credentials => list_credentials().await,
    }
}

async fn run_verification(args: RunArgs) -> anyhow::Result<()> {
    let mut config = if args.local {
        HarnessConfig::local(
            args.management_url
                .clone()
                .unwrap_or_else(|| Url::parse("http://localhost:9192/api/v1/data").unwrap()),
            args.runner_url
                .clone()
                .unwrap_or_else(|| Url::parse("http://localhost:8083/scenarios").unwrap()),
        )
    } else {
        HarnessConfig::from_env().context("resolving harness configuration")?
    };
    if let Some(url) = args.management_url {
        config.management_url = url;
    }
    if let Some(url) = args.runner_url {
        config.runner_url = url;
    }

    let runner = HttpScenarioRunner::new(config.runner_url.clone(), config.client_timeout)?;
    let verifier = TransferVerifier::new(config, Box::new(runner))?;

    verifier
        .verify_transfer()
        .await
        .context("transfer verification failed")?;
    info!("transfer verified");
    Ok(())
}

async fn list_credentials() -> anyhow::Result<()> {
    // Only the hub side of the configuration matters here; a malformed port
    // list must fail the command, not fall back to defaults.
    let hub_urls =
        transit_config::hub_urls_from_env().context("resolving identity hub configuration")?;
    let client = IdentityHubClient::new(transit_config::DEFAULT_CLIENT_TIMEOUT)?;

    let mut failed = false;
    for hub_url in hub_urls {
        let result = client.get_verifiable_credentials(&hub_url).await?;
        if result.succeeded() {
            let credentials = result.content().map(Vec::as_slice).unwrap_or_default();
            info!(hub = %hub_url, count = credentials.len(), "credentials retrieved");
            for credential in credentials {
                println!("{hub_url}: {}", credential.id);
            }
        } else {
            failed = true;
            eprintln!(
                "{hub_url}: query failed: {}",
                result.failure_detail().unwrap_or("unknown failure")
            );
        }
    }

    anyhow::ensure!(!failed, "one or more identity hubs failed the query");
    Ok(())
}
