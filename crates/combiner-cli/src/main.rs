//! `cobble-combiner`: command-line driver for the pack combiner.

mod interactive;
mod merge_run;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use combiner_core::config::{OpMode, Settings};
use combiner_core::pack::{validate_single_base, Pack};
use combiner_resolve::{AutoChooser, ChoiceOutcome};
use interactive::StdinChooser;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "cobble-combiner", about = "Combine Cobblemon content packs")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest, resolve, and export every pack in a working directory
    Combine {
        /// Directory containing the packs to combine
        #[arg(short, long, default_value = ".")]
        working_dir: PathBuf,

        /// Override the persisted resolution mode for this run
        #[arg(short, long)]
        mode: Option<String>,

        /// Never prompt the operator; auto-pick the first candidate everywhere
        #[arg(long)]
        auto: bool,
    },

    /// Print the ingested entity table for one pack (diagnostics)
    Inspect {
        #[arg(short, long, default_value = ".")]
        working_dir: PathBuf,

        /// Internal entity name to inspect; omit to list every entity
        #[arg(short, long)]
        entity: Option<String>,
    },

    /// Show or set the pack load order
    LoadOrder {
        #[arg(short, long, default_value = ".")]
        working_dir: PathBuf,

        #[arg(long)]
        show: bool,

        /// Comma-separated pack display names, in desired order
        #[arg(long)]
        set: Option<String>,
    },

    /// Show or set a persisted setting
    Settings {
        #[arg(short, long, default_value = ".")]
        working_dir: PathBuf,

        /// `KEY=VALUE`, e.g. `POKEDEX_FIX=true`
        #[arg(long)]
        set: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Combine { working_dir, mode, auto } => cmd_combine(&working_dir, mode.as_deref(), auto),
        Commands::Inspect { working_dir, entity } => cmd_inspect(&working_dir, entity.as_deref()),
        Commands::LoadOrder { working_dir, show, set } => cmd_load_order(&working_dir, show, set.as_deref()),
        Commands::Settings { working_dir, set } => cmd_settings(&working_dir, set.as_deref()),
    }
}

fn load_packs(working_dir: &Path, settings: &Settings) -> Result<Vec<Pack>> {
    let (sources, unknown) =
        combiner_ingest::workspace::discover_packs(working_dir).context("failed to enumerate working directory")?;
    for name in &unknown {
        tracing::warn!(pack = %name, "load order names an unknown pack");
    }

    let extraction_root = working_dir.join(".cobble-combiner/extracted");
    let mut packs = Vec::new();
    for source in &sources {
        let extracted = combiner_ingest::extract::extract_source(&source.source_path, &extraction_root)
            .with_context(|| format!("extracting {}", source.display_name))?;
        let pack = combiner_ingest::load_pack(&source.display_name, &extracted, settings.show_warnings)
            .with_context(|| format!("ingesting {}", source.display_name))?;
        packs.push(pack);
    }

    validate_single_base(&packs).context("validating base pack")?;
    Ok(packs)
}

fn cmd_combine(working_dir: &Path, mode_override: Option<&str>, auto: bool) -> Result<()> {
    let mut settings = Settings::load(working_dir).context("loading settings")?;
    if let Some(mode) = mode_override {
        settings.op_mode = match mode.to_ascii_uppercase().as_str() {
            "CHOOSE" => OpMode::Choose,
            "MERGE" => OpMode::Merge,
            other => anyhow::bail!("unknown mode {other:?}; expected choose or merge"),
        };
        settings.apply_dependency_rules();
    }

    let mut packs = load_packs(working_dir, &settings)?;
    let output_root = working_dir.join("output/CORE_Pack");

    if auto {
        let mut chooser = AutoChooser::default();
        run_resolution(&mut packs, &settings, &mut chooser, &output_root)?;
    } else {
        let mut chooser = StdinChooser;
        run_resolution(&mut packs, &settings, &mut chooser, &output_root)?;
    }

    let report = combiner_export::export(&packs, &output_root, &settings).context("exporting combined pack")?;
    println!("Wrote {}", report.output_root.display());
    if let Some(archive) = &report.archive_path {
        println!("Compressed archive: {}", archive.display());
    }
    for residue in &report.residue_archives {
        println!("Residue: {}", residue.display());
    }
    Ok(())
}

fn run_resolution(
    packs: &mut [Pack],
    settings: &Settings,
    chooser: &mut dyn combiner_resolve::Chooser,
    output_root: &Path,
) -> Result<()> {
    match settings.op_mode {
        OpMode::Choose => {
            let outcomes = combiner_resolve::choose::resolve_choose(packs, settings.process_mods, chooser);
            apply_choose_outcomes(packs, &outcomes);
            Ok(())
        }
        OpMode::Merge => merge_run::run_merge(packs, settings, chooser, output_root),
    }
}

fn apply_choose_outcomes(packs: &mut [Pack], outcomes: &[ChoiceOutcome]) {
    for outcome in outcomes {
        for pack in packs.iter_mut() {
            let is_chosen = pack.name == outcome.chosen_pack;
            if let Some(entity) = pack.entity_mut(&outcome.entity_name) {
                entity.selected = is_chosen;
            }
        }
    }
}

fn cmd_inspect(working_dir: &Path, entity: Option<&str>) -> Result<()> {
    let settings = Settings::load(working_dir).context("loading settings")?;
    let packs = load_packs(working_dir, &settings)?;

    for pack in &packs {
        println!("pack: {} (base={}, mod={})", pack.name, pack.is_base, pack.is_mod);
        for e in pack.entities.values() {
            if let Some(filter) = entity {
                if e.internal_name != filter {
                    continue;
                }
            }
            println!(
                "  {} (dex={}, forms={}, resolvers={}, pseudoform={})",
                e.internal_name,
                e.dex_id,
                e.forms.len(),
                e.resolvers.len(),
                e.is_pseudoform
            );
        }
    }
    Ok(())
}

fn cmd_load_order(working_dir: &Path, show: bool, set: Option<&str>) -> Result<()> {
    let load_order_path = working_dir.join("_load_order.json");

    if let Some(names) = set {
        let names: Vec<&str> = names.split(',').map(str::trim).collect();
        let bag = combiner_core::bag::Bag(serde_json::json!(names));
        combiner_core::schema::write_json_pretty(&load_order_path, &bag).context("writing _load_order.json")?;
        println!("Wrote load order: {}", names.join(", "));
        return Ok(());
    }

    if show || set.is_none() {
        let (sources, unknown) = combiner_ingest::workspace::discover_packs(working_dir)?;
        for source in &sources {
            println!("{}", source.display_name);
        }
        for name in &unknown {
            println!("(unknown, ignored) {name}");
        }
    }
    Ok(())
}

fn cmd_settings(working_dir: &Path, set: Option<&str>) -> Result<()> {
    let mut settings = Settings::load(working_dir).context("loading settings")?;

    if let Some(assignment) = set {
        let (key, value) = assignment
            .split_once('=')
            .context("expected KEY=VALUE, e.g. POKEDEX_FIX=true")?;
        apply_setting(&mut settings, &key.to_ascii_uppercase(), value)?;
        settings.apply_dependency_rules();
        settings.save(working_dir).context("saving settings")?;
        println!("{key}={value}");
    } else {
        println!("{:#?}", settings);
    }
    Ok(())
}

fn apply_setting(settings: &mut Settings, key: &str, value: &str) -> Result<()> {
    if key == "OP_MODE" {
        settings.op_mode = match value.to_ascii_uppercase().as_str() {
            "CHOOSE" => OpMode::Choose,
            "MERGE" => OpMode::Merge,
            other => anyhow::bail!("unknown op mode {other:?}"),
        };
        return Ok(());
    }

    let flag = match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => true,
        "false" | "0" | "no" => false,
        _ => anyhow::bail!("{value:?} is not a recognized boolean"),
    };
    match key {
        "POKEDEX_FIX" => settings.pokedex_fix = flag,
        "EXCLUDE_PSEUDOFORMS" => settings.exclude_pseudoforms = flag,
        "PROCESS_MODS" => settings.process_mods = flag,
        "COMBINE_POKEMON_MOVES" => settings.combine_pokemon_moves = flag,
        "KEEP_DUPLICATE_SAS_ON_MOVE" => settings.keep_duplicate_sas_on_move = flag,
        "KEEP_DUPLICATE_SPAWNS_ON_MOVE" => settings.keep_duplicate_spawns_on_move = flag,
        "SPECIES_STRICT_KEY_MATCH" => settings.species_strict_key_match = flag,
        "SHOW_WARNINGS" => settings.show_warnings = flag,
        "SHOW_HELPER_TEXT" => settings.show_helper_text = flag,
        "AUTO_START" => settings.auto_start = flag,
        "AUTO_LOAD_ORDER_MODE" => settings.auto_load_order_mode = flag,
        "ALTERNATE_ICON" => settings.alternate_icon = flag,
        other => anyhow::bail!("unknown setting {other:?}"),
    }
    Ok(())
}
