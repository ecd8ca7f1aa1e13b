use clap::Parser;
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::info;
use std::fs;
use std::path::PathBuf;

use autolab::lab::{GeneratorOptions, SlotCountMode};
use autolab::model::{ModelMap, ModelResolver};
use autolab::orchestrator::generate_lab;
use autolab::snapshot::Snapshot;

/// Builds an EVE-NG lab file from a collected device snapshot
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the device snapshot YAML file
    #[arg(short, long)]
    snapshot: PathBuf,

    /// Path to the model map JSON file
    #[arg(short, long, conflicts_with = "test_mode")]
    model_map: Option<PathBuf>,

    /// Output path for the generated lab file
    #[arg(short, long, default_value = "output/AutoLab.unl")]
    output: PathBuf,

    /// Resolve appliance profiles by hostname prefix instead of the model map
    #[arg(long)]
    test_mode: bool,

    /// Declare interface slots with the legacy "+1 buffer" formula
    #[arg(long)]
    legacy_slot_count: bool,

    /// Directory for rewritten per-hostname startup configs
    #[arg(long)]
    configs_dir: Option<PathBuf>,

    /// Name of the generated lab
    #[arg(long, default_value = "AutoLab")]
    lab_name: String,
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Starting AutoLab generation");
    info!("Snapshot file: {:?}", args.snapshot);
    info!("Output path: {:?}", args.output);

    let snapshot = Snapshot::load(&args.snapshot)?;

    let resolver = if args.test_mode {
        info!("Test mode: resolving profiles by hostname prefix");
        ModelResolver::HostnamePrefix
    } else {
        let map = match &args.model_map {
            Some(path) => ModelMap::load(path)?,
            None => {
                info!("No model map given; every model resolves to the default profile");
                ModelMap::empty()
            }
        };
        ModelResolver::Table(map)
    };

    let options = GeneratorOptions {
        lab_name: args.lab_name.clone(),
        slot_count: if args.legacy_slot_count {
            SlotCountMode::LegacyBuffer
        } else {
            SlotCountMode::Assigned
        },
    };

    let report = generate_lab(&snapshot, &resolver, &options, &args.output)?;

    // Persist rewritten startup configs per hostname when asked.
    if let Some(configs_dir) = &args.configs_dir {
        fs::create_dir_all(configs_dir).wrap_err_with(|| {
            format!("Failed to create configs directory '{}'", configs_dir.display())
        })?;
        for (hostname, config) in &report.rewritten_configs {
            let path = configs_dir.join(format!("{}.cfg", hostname));
            fs::write(&path, config)
                .wrap_err_with(|| format!("Failed to write config '{}'", path.display()))?;
        }
        info!(
            "Wrote {} startup configs to {:?}",
            report.rewritten_configs.len(),
            configs_dir
        );
    }

    // Persist configs per node id next to the lab file, the layout the
    // emulation platform imports from.
    let lab_cfg_dir = PathBuf::from(format!("{}.cfg", args.output.display()));
    fs::create_dir_all(&lab_cfg_dir).wrap_err_with(|| {
        format!("Failed to create lab config directory '{}'", lab_cfg_dir.display())
    })?;
    for (hostname, config) in &report.rewritten_configs {
        if let Some(node_id) = report.node_ids.get(hostname) {
            let path = lab_cfg_dir.join(format!("{}.cfg", node_id));
            fs::write(&path, config)
                .wrap_err_with(|| format!("Failed to write config '{}'", path.display()))?;
        }
    }

    info!(
        "Lab build complete: {} nodes, {} networks, {} warnings. Load {:?} in EVE-NG.",
        report.node_count,
        report.network_count,
        report.warnings.len(),
        args.output
    );

    Ok(())
}
