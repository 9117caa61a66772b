use clap::{Parser, Subcommand};
use magicgate::blob::FileBlob;
use magicgate::signature::{self, SignatureTable, DEFAULT_PROBE_LEN};
use magicgate::verify::{Verifier, VerifyOptions};
use magicgate::config;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "magicgate", about = "Verify file types by their leading byte signatures")]
struct Cli {
    /// Abort a probe that takes longer than this many milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check files against the accepted signatures
    Check {
        /// JSON signature table (default: built-in catalogue)
        #[arg(short, long)]
        table: Option<PathBuf>,
        /// Accept only these media types, e.g. audio/mpeg or audio/*
        #[arg(short, long)]
        accept: Vec<String>,
        #[arg(required = true, num_args = 1..)]
        input: Vec<PathBuf>,
    },
    /// Print the leading bytes of files in hex
    Probe {
        #[arg(short, long, default_value_t = DEFAULT_PROBE_LEN)]
        len: usize,
        #[arg(required = true, num_args = 1..)]
        input: Vec<PathBuf>,
    },
    /// List the signature table
    List {
        #[arg(short, long)]
        table: Option<PathBuf>,
        #[arg(short, long)]
        accept: Vec<String>,
        /// Emit the table in the JSON file format
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let timeout = cli.timeout_ms.map(Duration::from_millis);

    match cli.command {

        // ── Check ────────────────────────────────────────────────────────────
        Commands::Check { table, accept, input } => {
            let table = load_table(table, &accept)?;
            let verifier = Verifier::with_options(table, VerifyOptions { probe_len: None, timeout });
            let mut failures = 0usize;
            for path in &input {
                match verifier.identify(&FileBlob::new(path)).await {
                    Ok(v) => match v.media_type {
                        Some(mt) => println!("ok      {}  {}  ({})", path.display(), mt, v.probe),
                        None => {
                            failures += 1;
                            println!("reject  {}  no accepted signature  ({})", path.display(), v.probe);
                        }
                    },
                    Err(e) => {
                        failures += 1;
                        println!("error   {}  {}", path.display(), e);
                    }
                }
            }
            if failures > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }

        // ── Probe ────────────────────────────────────────────────────────────
        Commands::Probe { len, input } => {
            let prober = Verifier::with_options(
                SignatureTable::default(),
                VerifyOptions { probe_len: Some(len), timeout },
            );
            let mut failures = 0usize;
            for path in &input {
                match prober.probe(&FileBlob::new(path)).await {
                    Ok(p)  => println!("{}  {}", p, path.display()),
                    Err(e) => {
                        failures += 1;
                        println!("error  {}  {}", path.display(), e);
                    }
                }
            }
            if failures > 0 {
                return Ok(ExitCode::FAILURE);
            }
        }

        // ── List ─────────────────────────────────────────────────────────────
        Commands::List { table, accept, json } => {
            let table = load_table(table, &accept)?;
            if json {
                println!("{}", config::to_json(&table)?);
            } else {
                println!("{:<24} Signature", "Media type");
                for e in table.entries() {
                    println!("{:<24} {}", e.media_type(), e.to_hex());
                }
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn load_table(path: Option<PathBuf>, accept: &[String]) -> Result<SignatureTable, config::ConfigError> {
    let table = match path {
        Some(p) => config::load_table(p)?,
        None    => signature::builtin(),
    };
    if accept.is_empty() {
        return Ok(table);
    }
    let narrowed = table.filter_media_types(accept);
    if narrowed.is_empty() {
        tracing::warn!(?accept, "no signatures left after filtering; every file will be rejected");
    }
    Ok(narrowed)
}
