//! ITSM Compliance - classification and filtering for incident records

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use itsm_compliance::{
    api::build_app,
    compliance::{ComplianceState, ComplianceTier, Record, RuleProfile},
    config::AppConfig,
    incident::{FixtureIncidentSource, IncidentFilter},
};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "itsm-compliance")]
#[command(version)]
#[command(about = "Compliance classification and filtering for ITSM incident records")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "ITSM_COMPLIANCE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Override the configured rule profile (standard, servicenow)
    #[arg(long, global = true)]
    profile: Option<RuleProfile>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(long)]
        port: Option<u16>,
    },

    /// Filter a JSON record (file or stdin) and print the result
    Filter {
        /// Input file; reads stdin when omitted
        input: Option<PathBuf>,

        /// Target compliance tier
        #[arg(short, long)]
        tier: Option<ComplianceTier>,
    },

    /// Classify every field of a JSON record
    Classify {
        /// Input file; reads stdin when omitted
        input: Option<PathBuf>,
    },

    /// Check a JSON record against a required tier; exits 1 when non-compliant
    Validate {
        /// Input file; reads stdin when omitted
        input: Option<PathBuf>,

        /// Required compliance tier
        #[arg(short, long)]
        tier: ComplianceTier,
    },

    /// Print the active rule table
    Rules,

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(profile) = cli.profile {
        config.compliance.profile = profile;
    }

    init_logging(cli.verbose, config.logging.json);

    match cli.command {
        Commands::Serve { host, port } => {
            run_server(config, host, port).await?;
        }
        Commands::Filter { input, tier } => {
            let record = read_record(input.as_ref())?;
            let engine = config.compliance.build_engine();
            let tier = tier.unwrap_or(config.compliance.default_target_tier);
            print_json(&engine.filter_data(&record, tier))?;
        }
        Commands::Classify { input } => {
            let record = read_record(input.as_ref())?;
            let engine = config.compliance.build_engine();
            print_json(&engine.classify_data(&record))?;
        }
        Commands::Validate { input, tier } => {
            let record = read_record(input.as_ref())?;
            let engine = config.compliance.build_engine();
            let compliant = engine.validate_compliance(&record, tier);
            println!("{}", if compliant { "compliant" } else { "non-compliant" });
            if !compliant {
                std::process::exit(1);
            }
        }
        Commands::Rules => {
            let engine = config.compliance.build_engine();
            print_json(&engine.rule_summary())?;
        }
        Commands::Config { default } => {
            let shown = if default { AppConfig::default() } else { config };
            println!("{}", toml::to_string_pretty(&shown)?);
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, json: bool) {
    let log_level = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("itsm_compliance={},tower_http=info", log_level).into());

    // Logs go to stderr so JSON output on stdout stays clean
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

async fn run_server(config: AppConfig, host: Option<String>, port: Option<u16>) -> Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    let engine = Arc::new(config.compliance.build_engine());
    let incidents = match &config.compliance.incident_fixture {
        Some(path) => {
            let source = FixtureIncidentSource::from_file(path)
                .await
                .with_context(|| format!("loading incident fixture {}", path.display()))?;
            Some(Arc::new(IncidentFilter::new(Arc::new(source), engine.clone())))
        }
        None => None,
    };

    let state = ComplianceState {
        engine,
        default_tier: config.compliance.default_target_tier,
        incidents,
    };
    let app = build_app(state, &config.server.cors_origins);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    tracing::info!(
        addr = %addr,
        profile = ?config.compliance.profile,
        default_tier = %config.compliance.default_target_tier,
        "Compliance API listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        })
        .await?;

    Ok(())
}

fn read_record(input: Option<&PathBuf>) -> Result<Record> {
    let content = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    serde_json::from_str(&content).context("input must be a JSON object")
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
