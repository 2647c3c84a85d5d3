//! `mdb` command-line front end.
//!
//! Loads the content tree from its snapshot (rebuilding from source when the
//! snapshot is missing or stale) and answers queries from the terminal, or
//! serves them over HTTP when built with the `http` feature.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::{error, warn};

use mdb::logging::init_logging;
use mdb::service::{decode_result, QueryService, Reply};
use mdb::{snapshot, Config, Store};

#[derive(Parser)]
#[command(name = "mdb")]
#[command(about = "Versioned content tree with path queries")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Source tree: a directory of item files or a single YAML file
    #[arg(long, global = true)]
    source: Option<PathBuf>,
    /// Snapshot file (defaults to <source>/<app-id>.data)
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,
    #[arg(long, global = true)]
    app_id: Option<String>,
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Write rotating log files here instead of stderr
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a query and print the matches as JSON
    Query {
        expr: String,
        /// Read at this version instead of head
        #[arg(long)]
        at: Option<u64>,
        /// Print the base64 reply exactly as the endpoint sends it
        #[arg(long)]
        raw: bool,
    },
    /// Discard the snapshot and rebuild it from source
    Rebuild,
    /// Serve queries over HTTP
    #[cfg(feature = "http")]
    Serve {
        /// Address to bind (e.g. 127.0.0.1:5280)
        #[arg(long)]
        listen: Option<String>,
    },
}

impl Cli {
    fn config(&self) -> Result<Config, Box<dyn std::error::Error>> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(source) = &self.source {
            config.source = source.clone();
        }
        if let Some(snapshot) = &self.snapshot {
            config.snapshot = Some(snapshot.clone());
        }
        if let Some(app_id) = &self.app_id {
            config.app_id = Some(app_id.clone());
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = Some(dir.clone());
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            error!("event=cli module=bin status=error error={}", err);
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = cli.config()?;
    init_logging(&config.log_level, config.log_dir.as_deref())?;
    for warning in &config.warnings {
        warn!("{}", warning);
    }

    match cli.command {
        Commands::Query { expr, at, raw } => {
            let service = QueryService::new(open(&config)?);
            let reply = service.handle(&mdb::service::encode_query(&expr), at);
            match reply {
                Reply::Result(encoded) if raw => println!("{}", encoded),
                Reply::Result(encoded) => {
                    let items: serde_json::Value = serde_json::from_str(&decode_result(&encoded)?)?;
                    println!("{}", serde_json::to_string_pretty(&items)?);
                }
                Reply::Error { condition, message } => {
                    eprintln!("error [{}]: {}", condition, message);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Rebuild => {
            let path = config.snapshot_path();
            let store = snapshot::rebuild(&config.source, &path)?;
            println!(
                "rebuilt {} ({} nodes, head {})",
                path.display(),
                store.len()?,
                store.head()?
            );
        }
        #[cfg(feature = "http")]
        Commands::Serve { listen } => {
            let addr = listen.unwrap_or_else(|| config.listen.clone());
            let service = std::sync::Arc::new(QueryService::new(open(&config)?));
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(mdb::service::serve(service, &addr))?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn open(config: &Config) -> Result<Store, mdb::SnapshotError> {
    snapshot::load(&config.source, &config.snapshot_path())
}
