//! CLI binary for edgequake-certverify.
//!
//! `serve` runs the HTTP service; `check` runs the same pipeline on local
//! files or URLs and prints the verdicts.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use edgequake_certverify::input::{display_name, load_image};
use edgequake_certverify::{server, ServerConfig, Verdict, Verifier, VerifierConfig};
use futures::stream::{self, StreamExt};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the HTTP service on port 5000
  certverify serve

  # Custom port, Gemini model, 30s model timeout
  certverify serve --port 8080 --provider gemini --model gemini-2.0-flash --timeout 30

  # Check local files
  certverify check diploma.png award.jpg

  # Check a URL, JSON output
  certverify check --json https://example.com/cert.png

ENVIRONMENT VARIABLES:
  GEMINI_API_KEY          Google Gemini API key (default provider)
  OPENAI_API_KEY          OpenAI API key
  ANTHROPIC_API_KEY       Anthropic API key
  EDGEQUAKE_LLM_PROVIDER  Override provider (gemini, openai, anthropic, ollama)
  EDGEQUAKE_MODEL         Override model ID
  PORT                    Listening port for `serve`
  RUST_LOG                Log filter, e.g. info,tower_http=debug
"#;

/// Verify certificate images using Vision LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "certverify",
    version,
    about = "Verify certificate images and extract issuer and recipient using Vision LLMs",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "CERTVERIFY_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "CERTVERIFY_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service (POST /process-image).
    Serve(ServeArgs),
    /// Verify local image files or URLs.
    Check(CheckArgs),
}

#[derive(Args, Debug)]
struct ModelArgs {
    /// LLM provider: gemini, openai, anthropic, ollama, azure.
    #[arg(long, env = "EDGEQUAKE_LLM_PROVIDER")]
    provider: Option<String>,

    /// LLM model ID (default: gemini-2.0-flash).
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// Per-call model timeout in seconds (default: no timeout).
    #[arg(long, env = "CERTVERIFY_MODEL_TIMEOUT")]
    timeout: Option<u64>,

    /// Minimum model confidence for a verified verdict.
    #[arg(long, env = "CERTVERIFY_MIN_CONFIDENCE", default_value_t = 0.6)]
    min_confidence: f64,

    /// Path to a text file containing a custom instruction.
    #[arg(long, env = "CERTVERIFY_INSTRUCTION")]
    instruction: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ServeArgs {
    #[command(flatten)]
    model: ModelArgs,

    /// Bind address.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Listening port.
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// Maximum request body size in MiB.
    #[arg(long, env = "CERTVERIFY_BODY_LIMIT_MB", default_value_t = 32)]
    body_limit_mb: usize,

    /// Disable the permissive CORS layer.
    #[arg(long, env = "CERTVERIFY_NO_CORS")]
    no_cors: bool,
}

#[derive(Args, Debug)]
struct CheckArgs {
    #[command(flatten)]
    model: ModelArgs,

    /// Local image paths or HTTP/HTTPS URLs.
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Print one JSON verdict per line instead of a summary.
    #[arg(long)]
    json: bool,

    /// Number of concurrent model calls.
    #[arg(short, long, default_value_t = 4)]
    concurrency: usize,

    /// HTTP download timeout in seconds for URL inputs.
    #[arg(long, default_value_t = 60)]
    download_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Serve(args) => run_serve(args).await,
        Command::Check(args) => run_check(args, cli.quiet).await,
    }
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let verifier = Arc::new(build_verifier(&args.model).await?);
    let config = ServerConfig {
        host: args.host,
        port: args.port,
        body_limit_bytes: mib_to_bytes(args.body_limit_mb),
        cors_permissive: !args.no_cors,
    };

    server::serve(verifier, &config)
        .await
        .with_context(|| format!("Server on {} failed", config.bind_addr()))
}

async fn run_check(args: CheckArgs, quiet: bool) -> Result<()> {
    let verifier = Arc::new(build_verifier(&args.model).await?);
    let timeout = args.download_timeout;

    let results: Vec<(String, Result<Verdict>)> = stream::iter(args.inputs)
        .map(|input| {
            let verifier = Arc::clone(&verifier);
            async move {
                let outcome = async {
                    let request = load_image(&input, timeout).await?;
                    verifier.verify(&request).await
                }
                .await
                .with_context(|| format!("Failed to verify {}", display_name(&input)));
                (input, outcome)
            }
        })
        .buffer_unordered(args.concurrency.max(1))
        .collect()
        .await;

    let mut failures = 0usize;
    for (input, outcome) in &results {
        match outcome {
            Ok(verdict) if args.json => {
                let mut line = serde_json::to_value(verdict).context("Failed to serialise verdict")?;
                line["input"] = serde_json::Value::String(input.clone());
                println!("{line}");
            }
            Ok(Verdict::Verified { company, candidate }) => {
                println!(
                    "{} {}  {} → {}",
                    green("✓"),
                    display_name(input),
                    company,
                    candidate
                );
            }
            Ok(Verdict::Unverified { reason }) => {
                println!("{} {}  {}", red("✗"), display_name(input), dim(reason));
            }
            Err(e) => {
                failures += 1;
                eprintln!("{} {:#}", red("error:"), e);
            }
        }
    }

    if !quiet && !args.json {
        eprintln!(
            "{} checked, {} verified, {} failed",
            results.len(),
            results
                .iter()
                .filter(|(_, r)| matches!(r, Ok(v) if v.is_verified()))
                .count(),
            failures
        );
    }

    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Body limit in bytes; at least 1 MiB, saturating on overflow.
fn mib_to_bytes(mib: usize) -> usize {
    mib.max(1).saturating_mul(1024 * 1024)
}

/// Map CLI args to a [`Verifier`].
async fn build_verifier(args: &ModelArgs) -> Result<Verifier> {
    let mut builder = VerifierConfig::builder().min_confidence(args.min_confidence);

    if let Some(ref model) = args.model {
        builder = builder.model(model);
    }
    if let Some(ref provider) = args.provider {
        builder = builder.provider_name(provider);
    }
    if let Some(secs) = args.timeout {
        builder = builder.model_timeout_secs(secs);
    }
    if let Some(ref path) = args.instruction {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read instruction from {:?}", path))?;
        builder = builder.instruction(text);
    }

    let config = builder.build().context("Invalid configuration")?;
    Verifier::from_config(config).context("Failed to initialise the inference model")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_limit_is_at_least_one_mebibyte() {
        assert_eq!(mib_to_bytes(0), 1024 * 1024);
        assert_eq!(mib_to_bytes(32), 32 * 1024 * 1024);
    }

    #[test]
    fn huge_body_limit_saturates() {
        assert_eq!(mib_to_bytes(usize::MAX), usize::MAX);
    }

    #[test]
    fn provider_flag_reads_the_documented_variable() {
        let cmd = <Cli as clap::CommandFactory>::command();
        let serve = cmd.find_subcommand("serve").unwrap();
        let provider = serve
            .get_arguments()
            .find(|a| a.get_id() == "provider")
            .unwrap();
        assert_eq!(
            provider.get_env().and_then(|v| v.to_str()),
            Some("EDGEQUAKE_LLM_PROVIDER")
        );
        assert!(AFTER_HELP.contains("EDGEQUAKE_LLM_PROVIDER"));
    }
}
