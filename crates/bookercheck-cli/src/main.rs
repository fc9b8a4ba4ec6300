//! bookercheck CLI - end-to-end checks for booking REST APIs

mod runner;
mod scenarios;
mod storage;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use bookercheck_client::{ApiClient, BookerApi};
use bookercheck_core::{Config, ConsoleSink, FindingLog};

use runner::SuiteRunner;
use scenarios::Category;

const CONFIG_FILE: &str = ".bookercheck.toml";

#[derive(Parser)]
#[command(name = "bookercheck")]
#[command(about = "End-to-end checks for booking REST APIs with structured security findings")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, global = true, default_value = "terminal")]
    output: OutputFormat,

    /// Strict mode (warnings fail the exit code). Use --strict=false to disable.
    #[arg(long, global = true, default_value_t = true, action = ArgAction::Set)]
    strict: bool,

    /// Verbose output (debug logs and every finding as a log line)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scenario suite against the configured service
    Run {
        /// Config file (default: .bookercheck.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Only run these categories (repeatable)
        #[arg(long)]
        category: Vec<Category>,

        /// Only run scenarios whose id contains this text
        #[arg(long)]
        filter: Option<String>,

        /// Seed for generated test data (reproducible bookings)
        #[arg(long)]
        seed: Option<u64>,

        /// Concurrent requests for the rate limiting check
        #[arg(long)]
        rate_limit_burst: Option<u32>,

        /// Output directory for saved reports
        #[arg(long, default_value = ".bookercheck")]
        output_dir: PathBuf,

        /// Do not save the report to disk
        #[arg(long)]
        no_save: bool,
    },

    /// Initialize config file
    Init,

    /// List scenarios
    List {
        /// Only list these categories (repeatable)
        #[arg(long)]
        category: Vec<Category>,
    },

    /// Export JSON Schema for the report format
    Schema,
}

#[derive(Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputFormat {
    Terminal,
    Json,
    Silent,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => ExitCode::from(u8::try_from(code).unwrap_or(1)),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(3)
        }
    }
}

/// Filter used when `RUST_LOG` is unset.
fn default_filter(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "warn" }
}

/// Logs go to stderr so JSON on stdout stays clean. `RUST_LOG` wins.
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Run {
            config,
            category,
            filter,
            seed,
            rate_limit_burst,
            output_dir,
            no_save,
        } => {
            let mut cfg = Config::resolve(config.as_deref())?;
            if let Some(burst) = rate_limit_burst {
                cfg.rate_limit_burst = burst;
            }

            let selected = scenarios::select(&category, filter.as_deref());
            if selected.is_empty() {
                eprintln!("Error: no scenarios match the given category/filter.");
                return Ok(3);
            }

            if cli.output != OutputFormat::Silent {
                eprintln!("Config:");
                eprintln!("  base_url: {}", cfg.base_url);
                eprintln!("  timeout:  {} ms", cfg.timeout_ms);
                if cfg.api_key.is_some() {
                    eprintln!("  api_key:  set");
                }
                if !cfg.headers.is_empty() {
                    eprintln!("  headers:  {} configured", cfg.headers.len());
                }
                if let Some(seed) = seed {
                    eprintln!("  seed:     {seed}");
                }
                eprintln!();
            }

            let api = BookerApi::new(ApiClient::from_config(&cfg)?);
            let log = FindingLog::new();
            if cli.verbose {
                log.add_sink(Arc::new(ConsoleSink));
            }

            let report = SuiteRunner::new(&api, &cfg, log.clone())
                .with_seed(seed)
                .with_progress(cli.output != OutputFormat::Silent)
                .run(&selected, cli.strict);

            match cli.output {
                OutputFormat::Terminal => {
                    println!("\n{}", report.to_terminal());
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                }
                OutputFormat::Silent => {}
            }

            if !no_save {
                let findings = log.findings();
                let data = storage::ReportData {
                    config: &cfg,
                    report: &report,
                    findings: &findings,
                };
                match storage::save_report(&output_dir, &data) {
                    Ok(path) => {
                        if cli.output != OutputFormat::Silent {
                            eprintln!("Report saved: {}", path.display());
                        }
                    }
                    Err(e) => eprintln!("Warning: failed to save report: {e}"),
                }
            }

            Ok(report.verdict.exit_code)
        }

        Commands::Init => {
            if Path::new(CONFIG_FILE).exists() {
                eprintln!("{CONFIG_FILE} already exists");
                return Ok(1);
            }

            std::fs::write(CONFIG_FILE, Config::example())?;
            println!("Created {CONFIG_FILE}");
            println!("\nEdit the file to configure:");
            println!("  - base_url: booking service to test");
            println!("  - timeout_ms: per-request timeout");
            println!("  - api_key / headers: credentials the service needs");
            println!("\nEnvironment variables API_BASE_URL, TIMEOUT, RETRIES, API_KEY override it.");
            Ok(0)
        }

        Commands::List { category } => {
            let selected = scenarios::select(&category, None);
            match cli.output {
                OutputFormat::Json => {
                    let entries: Vec<_> = selected
                        .iter()
                        .map(|s| {
                            serde_json::json!({
                                "id": s.id,
                                "name": s.name,
                                "category": s.category.as_str(),
                            })
                        })
                        .collect();
                    println!("{}", serde_json::to_string_pretty(&entries)?);
                }
                OutputFormat::Terminal => {
                    for s in &selected {
                        println!("{:<12} {:<12} {}", s.id, s.category, s.name);
                    }
                }
                OutputFormat::Silent => {}
            }
            Ok(0)
        }

        Commands::Schema => {
            println!("{}", bookercheck_core::report::generate_schema());
            Ok(0)
        }
    }
}
