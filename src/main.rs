use anyhow::Context;
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use serde::Serialize;
use serde_json::Value;
use snapmig_rs::machine::{MachineDefinition, MachineLoader, PersistedSnapshot, SnapshotLoader};
use snapmig_rs::migrate::{ContextPolicy, MigrateConfig, Migrator, Operation, SnapshotMigrator};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the operations migrating a snapshot to a machine definition
    Generate {
        #[command(flatten)]
        target: Target,
    },
    /// Apply a stored operation list to a snapshot
    Apply {
        /// Path to the persisted snapshot (JSON)
        #[arg(short, long)]
        snapshot: PathBuf,

        /// Path to the operation list (JSON Patch)
        #[arg(short, long)]
        migrations: PathBuf,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Generate and apply in one step, printing the migrated snapshot
    Migrate {
        #[command(flatten)]
        target: Target,
    },
}

#[derive(clap::Args, Debug)]
struct Target {
    /// Path to the new machine definition (YAML or JSON)
    #[arg(short = 'm', long)]
    machine: PathBuf,

    /// Path to the persisted snapshot (JSON)
    #[arg(short, long)]
    snapshot: PathBuf,

    /// Runtime input for the initial context (JSON)
    #[arg(short, long)]
    input: Option<String>,

    /// Remove context fields the machine no longer declares
    #[arg(long)]
    prune_context: bool,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Generate { target } => {
            let (migrator, operations) = generate(&target)?;
            log::info!(
                "{} migrations ({:?} context policy)",
                operations.len(),
                migrator.config().context_policy
            );
            emit(&operations, target.output.as_deref())?;
        }
        Commands::Apply {
            snapshot,
            migrations,
            output,
        } => {
            let persisted = SnapshotLoader::load_snapshot(&snapshot)
                .with_context(|| format!("Failed to load snapshot {}", snapshot.display()))?;
            let operations = SnapshotLoader::load_operations(&migrations).with_context(|| {
                format!("Failed to load migrations {}", migrations.display())
            })?;
            let migrated = Migrator::new(MigrateConfig::from_env()?)
                .apply_migrations(&persisted, &operations)
                .context("Snapshot left unmigrated")?;
            emit(&migrated, output.as_deref())?;
        }
        Commands::Migrate { target } => {
            let config = config_for(&target)?;
            let (machine, persisted, input) = load_target(&target)?;
            let outcome = Migrator::new(config)
                .migrate(&machine, &persisted, input.as_ref())
                .context("Snapshot left unmigrated")?;
            if outcome.is_noop() {
                log::info!("Snapshot already valid for '{}'", machine.id);
            }
            emit(&outcome.snapshot, target.output.as_deref())?;
        }
    }

    Ok(())
}

fn config_for(target: &Target) -> anyhow::Result<MigrateConfig> {
    let config = MigrateConfig::from_env()?;
    Ok(if target.prune_context {
        config.with_context_policy(ContextPolicy::Prune)
    } else {
        config
    })
}

fn load_target(
    target: &Target,
) -> anyhow::Result<(MachineDefinition, PersistedSnapshot, Option<Value>)> {
    let machine = MachineLoader::new()
        .load_machine(&target.machine)
        .with_context(|| format!("Failed to load machine {}", target.machine.display()))?;
    let persisted = SnapshotLoader::load_snapshot(&target.snapshot)
        .with_context(|| format!("Failed to load snapshot {}", target.snapshot.display()))?;
    let input = target
        .input
        .as_deref()
        .map(serde_json::from_str::<Value>)
        .transpose()
        .context("Input is not valid JSON")?;
    Ok((machine, persisted, input))
}

fn generate(target: &Target) -> anyhow::Result<(Migrator, Vec<Operation>)> {
    let migrator = Migrator::new(config_for(target)?);
    let (machine, persisted, input) = load_target(target)?;
    let operations = migrator.generate_migrations(&machine, &persisted, input.as_ref())?;
    Ok((migrator, operations))
}

fn emit<T: Serialize>(value: &T, output: Option<&Path>) -> anyhow::Result<()> {
    let rendered = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", rendered),
    }
    Ok(())
}
