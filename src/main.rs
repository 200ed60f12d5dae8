use chrono::{DateTime, Utc};
use clap::Parser;
use safetynet::store::{default_roots, ITrustAnchorStore, MemoTrustAnchorStore};
use safetynet::token::{self, subject_line, VerifyOptions};
use std::error::Error;
use std::fs;
use std::process::ExitCode;
use std::time::Duration;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Registry};

#[derive(Parser)]
enum SafetyNetCli {
    Verify(VerifyArgs),
    Roots(RootsArgs),
}

#[derive(Debug, clap::Args)]
#[command(author, version, long_about = None,
    about = "Verify the supplied SafetyNet attestation statement and print \
    its claims")]
struct VerifyArgs {
    /// File containing the compact JWS returned by the attestation API
    #[arg(short, long, default_value = "statement.jws")]
    evidence: String,

    /// The nonce the attestation was requested with
    #[arg(short, long)]
    nonce: String,

    /// PEM bundle of trusted roots (defaults to the built-in roots)
    #[arg(short, long)]
    roots: Option<String>,

    /// Accepted clock skew for the statement timestamp, in seconds
    #[arg(short, long, default_value_t = 60)]
    leeway: u64,

    /// Verify as of this RFC 3339 time instead of now
    #[arg(short, long)]
    at: Option<DateTime<Utc>>,

    #[arg(long, default_value_t = LevelFilter::WARN)]
    log_level: LevelFilter,
}

#[derive(Debug, clap::Args)]
#[command(author, version, long_about = None,
    about = "List the trust anchors statements are verified against")]
struct RootsArgs {
    /// PEM bundle of trusted roots (defaults to the built-in roots)
    #[arg(short, long)]
    roots: Option<String>,

    #[arg(long, default_value_t = LevelFilter::WARN)]
    log_level: LevelFilter,
}

fn main() -> ExitCode {
    match SafetyNetCli::parse() {
        SafetyNetCli::Verify(args) => {
            setup_logging(args.log_level);

            match verify(&args) {
                Ok(_) => {
                    println!("verification successful");
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    eprintln!("verification failed: {e}");
                    ExitCode::FAILURE
                }
            }
        }

        SafetyNetCli::Roots(args) => {
            setup_logging(args.log_level);

            match roots(&args) {
                Ok(_) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("loading trust anchors failed: {e}");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

/// `RUST_LOG` wins over `--log-level`
fn setup_logging(log_level: LevelFilter) {
    let filter = EnvFilter::builder()
        .try_from_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,safetynet={log_level}")));

    let subscriber = Registry::default()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr));

    // a subscriber may already be installed, e.g., by a test harness
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn load_roots(path: &Option<String>) -> Result<Option<MemoTrustAnchorStore>, Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(None);
    };

    let pem = fs::read(path)?;

    let mut tas = MemoTrustAnchorStore::new();
    tas.load_pem(&pem)?;

    Ok(Some(tas))
}

fn verify(args: &VerifyArgs) -> Result<(), Box<dyn Error>> {
    let jws = fs::read_to_string(&args.evidence)?;

    let custom = load_roots(&args.roots)?;

    let mut options = VerifyOptions::new().with_leeway(Duration::from_secs(args.leeway));

    if let Some(tas) = custom.as_ref() {
        options = options.with_trusted_roots(tas);
    }

    if let Some(at) = args.at {
        options = options.with_check_time(at);
    }

    let v = token::verify(jws.trim(), &args.nonce, &options)?;

    println!("{}", serde_json::to_string_pretty(v.claims())?);

    for (depth, c) in v.certificate_chain().iter().enumerate() {
        println!("{depth}: {}", subject_line(c));
    }

    Ok(())
}

fn roots(args: &RootsArgs) -> Result<(), Box<dyn Error>> {
    let custom = load_roots(&args.roots)?;

    let tas: &dyn ITrustAnchorStore = match custom.as_ref() {
        Some(tas) => tas,
        None => default_roots()?,
    };

    for c in tas.trust_anchors() {
        println!("{}", subject_line(c));
    }

    Ok(())
}
