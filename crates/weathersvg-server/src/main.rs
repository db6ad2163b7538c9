use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use weathersvg_core::Config;
use weathersvg_server::{routes, AppState};

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(name = "weathersvg-server")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve `/weather.svg` and `/public-key.json`
    Serve,
    /// Print a freshly generated private key as JWK
    Keygen {
        /// RSA modulus length in bits
        #[arg(long, default_value_t = 2048)]
        bits: usize,
    },
    /// Print the public key derived from the configured private key
    PublicKey,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve => serve().await,
        Commands::Keygen { bits } => keygen(bits),
        Commands::PublicKey => public_key(),
    }
}

async fn serve() -> Result<()> {
    weathersvg_core::init()?;

    let (config, _) = Config::load_validated()?;
    let addr: SocketAddr = format!("{}:{}", config.server.bind_address, config.server.port)
        .parse()
        .context("Invalid bind address")?;

    let state = Arc::new(AppState::from_config(&config)?);

    let (addr, server) = warp::serve(routes(state))
        .try_bind_with_graceful_shutdown(addr, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
            }
        })
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("weather.svg listening on http://{}", addr);
    server.await;
    tracing::info!("weather.svg stopped");

    Ok(())
}

fn keygen(bits: usize) -> Result<()> {
    let jwk = weathersvg_location::generate_private_jwk(bits).context("Key generation failed")?;
    println!("{}", jwk);
    Ok(())
}

fn public_key() -> Result<()> {
    let config = Config::load()?;
    let private_jwk = config
        .location
        .private_key_jwk
        .context("No private key configured (set JWK_RSA_PRIVATE_KEY)")?;

    let public_key = weathersvg_location::derive_public_key(&private_jwk)?;
    println!("{}", serde_json::to_string_pretty(&public_key.to_jwk())?);
    Ok(())
}
