// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use mgv_core::{
    find_config_file, Error, MgvConfig, Result, ENV_MGV_LOG_JSON, ENV_MGV_LOG_LEVEL,
};
use mgv_data::DataManager;
use mgv_model::{Feature, Genome, Region};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "mgv", version)]
#[command(about = "Comparative genome data layer CLI")]
#[command(
    after_help = "Environment:\n  MGV_ROOT        Root discovery location\n  MGV_CACHE_DIR   Cache directory\n  MGV_LOG_LEVEL   Log filter (default info)\n  MGV_LOG_JSON    Emit JSON logs"
)]
struct Cli {
    /// Compact JSON output and JSON logs.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Overrides the configured root location.
    #[arg(long, global = true)]
    root: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List genomes reachable from the root location.
    Genomes,
    /// Features overlapping a region.
    Genes {
        #[arg(long)]
        genome: String,
        #[arg(long)]
        region: String,
        #[arg(long, default_value_t = false)]
        transcripts: bool,
    },
    /// Resolve a value as an ID, cluster ID or symbol.
    Lookup {
        #[arg(long)]
        genome: String,
        value: String,
    },
    /// Equivalent features in other genomes, in the requested order.
    Genologs {
        #[arg(long)]
        genome: String,
        value: String,
        #[arg(long = "in", value_delimiter = ',', required = true)]
        targets: Vec<String>,
    },
    /// Reference sequence of a region.
    Sequence {
        #[arg(long)]
        genome: String,
        #[arg(long)]
        region: String,
    },
}

fn env_bool(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(v) => matches!(v.trim(), "1" | "true" | "TRUE" | "yes" | "on"),
        Err(_) => default,
    }
}

fn init_tracing(json: bool) {
    let filter = std::env::var(ENV_MGV_LOG_LEVEL)
        .ok()
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new("info"));
    if json || env_bool(ENV_MGV_LOG_JSON, false) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.json);
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.or_else(find_config_file);
    if let Some(path) = &config_path {
        debug!(path = %path.display(), "using config file");
    }
    let mut config = MgvConfig::load(config_path.as_deref())?;
    if let Some(root) = cli.root {
        config.root_location = root;
    }
    debug!(root = %config.root_location, cache = %config.cache_db_dir().display(), "starting");
    let dm = DataManager::from_config(&config)?;
    let genomes = dm.get_genomes().await?;

    let payload = match cli.command {
        Commands::Genomes => {
            Value::Array(genomes.iter().map(|g| genome_summary(&dm, g)).collect())
        }
        Commands::Genes {
            genome,
            region,
            transcripts,
        } => {
            let genome = require_genome(&dm, &genome)?;
            let region = Region::parse(&region)?;
            let feats = dm
                .get_genes(
                    &genome,
                    &region.chromosome,
                    region.start,
                    region.end,
                    transcripts,
                )
                .await?;
            json!({
                "genome": genome.name(),
                "region": region.canonical_string(),
                "features": features_json(&feats)?,
            })
        }
        Commands::Lookup { genome, value } => {
            let genome = require_genome(&dm, &genome)?;
            dm.ensure_features(&genome).await?;
            let feats = dm.get_features_by(&value);
            json!({ "query": value, "features": features_json(&feats)? })
        }
        Commands::Genologs {
            genome,
            value,
            targets,
        } => {
            let genome = require_genome(&dm, &genome)?;
            let targets = targets
                .iter()
                .map(|name| require_genome(&dm, name))
                .collect::<Result<Vec<_>>>()?;
            dm.ensure_features(&genome).await?;
            for target in &targets {
                dm.ensure_features(target).await?;
            }
            let found = dm.get_genologs(value.as_str(), &targets);
            let rows = targets
                .iter()
                .zip(found)
                .map(|(g, f)| -> Result<Value> {
                    let feature = match f {
                        Some(f) => serde_json::to_value(f.as_ref())?,
                        None => Value::Null,
                    };
                    Ok(json!({ "genome": g.name(), "feature": feature }))
                })
                .collect::<Result<Vec<Value>>>()?;
            json!({ "query": value, "genologs": rows })
        }
        Commands::Sequence { genome, region } => {
            let genome = require_genome(&dm, &genome)?;
            let region = Region::parse(&region)?;
            let sequence = dm
                .get_sequence(&genome, &region.chromosome, region.start, region.end)
                .await?;
            json!({
                "genome": genome.name(),
                "region": region.canonical_string(),
                "sequence": sequence,
            })
        }
    };
    print_json(&payload, cli.json)
}

fn require_genome(dm: &DataManager, name: &str) -> Result<Arc<Genome>> {
    dm.lookup_genome(name)
        .ok_or_else(|| Error::unknown_genome(name))
}

fn genome_summary(dm: &DataManager, genome: &Genome) -> Value {
    // readers include derived tracks such as `models.genes`
    let readers: Vec<String> = dm
        .registrar()
        .genome_reader(genome.name())
        .map(|r| r.track_names().map(str::to_string).collect())
        .unwrap_or_default();
    json!({
        "name": genome.name(),
        "shortname": genome.short_name(),
        "path": genome.path(),
        "url": genome.url(),
        "chromosomes": genome.chromosomes().len(),
        "tracks": genome.tracks(),
        "readers": readers,
    })
}

fn features_json(feats: &[Arc<Feature>]) -> Result<Value> {
    feats
        .iter()
        .map(|f| serde_json::to_value(f.as_ref()).map_err(Error::from))
        .collect::<Result<Vec<_>>>()
        .map(Value::Array)
}

fn print_json(payload: &Value, compact: bool) -> Result<()> {
    let text = if compact {
        serde_json::to_string(payload)?
    } else {
        serde_json::to_string_pretty(payload)?
    };
    println!("{text}");
    Ok(())
}
