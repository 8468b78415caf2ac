use std::{fs, path::PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use pop_token::{
    IssuerConfig, PopTokenIssuer, PopTokenVerifier, Session, decode_claims, public_jwk,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Issue and check Proof-of-Possession tokens for an OIDC session.
///
/// - `issue`: sign a PoP token for a resource server with the session key
/// - `verify`: check a PoP token against a JWK (private or public)
/// - `public-key`: print the public half of a session JWK
///
/// Defaults (max age, accepted algorithms) come from POP_TOKEN_* env vars / .env.
#[derive(Parser, Debug)]
#[command(name = "pop-gen", version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Issue {
        /// Session JSON file ({"clientId", "idToken", "sessionKey"})
        #[arg(long, value_name = "FILE")]
        session: PathBuf,

        /// Resource server URI used as `aud` (e.g. https://pod.example/)
        #[arg(long)]
        audience: String,

        /// Token lifetime in seconds (>= 1). Default: POP_TOKEN_MAX_AGE_SECONDS or 3600.
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        max_age: Option<u64>,

        /// Override iat (unix seconds). Default: now.
        #[arg(long)]
        iat: Option<i64>,

        /// Print only the token (no extra lines)
        #[arg(long, default_value_t = false)]
        quiet: bool,
    },
    Verify {
        #[arg(long)]
        token: String,

        /// JWK file used to check the signature
        #[arg(long, value_name = "FILE")]
        key: PathBuf,

        #[arg(long)]
        audience: String,

        /// Expected `iss` (relying party client id)
        #[arg(long)]
        client_id: Option<String>,

        /// Allowed clock skew for exp, seconds
        #[arg(long, default_value_t = 0)]
        leeway: u64,
    },
    PublicKey {
        #[arg(long, value_name = "FILE")]
        key: PathBuf,
    },
}

fn init_tracing() {
    // RUST_LOG=pop_token=debug pop-gen issue ...
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    // Logs go to stderr so `--quiet` output stays pipeable.
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let mut config = IssuerConfig::from_env()?;

    match args.command {
        Command::Issue {
            session,
            audience,
            max_age,
            iat,
            quiet,
        } => {
            if let Some(max_age) = max_age {
                config.max_age_seconds = max_age;
            }

            let raw = fs::read_to_string(&session)
                .with_context(|| format!("reading {}", session.display()))?;
            let session = Session::from_json(&raw).context("parsing session JSON")?;

            tracing::debug!(max_age = config.max_age_seconds, ?iat, "issuing PoP token");
            let token = PopTokenIssuer::from_config(&config)
                .issue_for_at(&audience, &session, iat)
                .await?;

            if quiet {
                println!("{}", token);
                return Ok(());
            }

            let claims = decode_claims(&token)?;
            println!("PoP: {}", token);
            println!("claims: {}", serde_json::to_string_pretty(&claims)?);
        }
        Command::Verify {
            token,
            key,
            audience,
            client_id,
            leeway,
        } => {
            let jwk = fs::read_to_string(&key)
                .with_context(|| format!("reading {}", key.display()))?;

            let mut verifier =
                PopTokenVerifier::from_config(&jwk, audience, &config)?.with_leeway(leeway);
            if let Some(client_id) = client_id {
                verifier = verifier.with_issuer(client_id);
            }

            let claims = verifier.verify(&token)?;
            println!("valid: {}", serde_json::to_string_pretty(&claims)?);
        }
        Command::PublicKey { key } => {
            let jwk = fs::read_to_string(&key)
                .with_context(|| format!("reading {}", key.display()))?;
            let public = serde_json::Value::Object(public_jwk(&jwk)?);
            println!("{}", public);
        }
    }

    Ok(())
}
