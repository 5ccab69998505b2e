//! respacker CLI
//!
//! Exports the selected objects of a scene document into a `dungeon-map`
//! bundle, previews what an export would do, and reads descriptors back.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info, warn};

use respacker_core::logging::{self, TracingConfig};
use respacker_export::{Converter, Descriptor, ExportConfig, ExportReport, Plan};
use respacker_scene::MemoryScene;

/// respacker - scene to dungeon-map exporter
#[derive(Parser)]
#[command(name = "respacker")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format for command results
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Export the selection into a dungeon-map bundle next to the scene
    Export(SceneArgs),

    /// Show how each selected object would be exported, without writing anything
    Plan(SceneArgs),

    /// Parse descriptor files and print them
    Inspect(InspectArgs),
}

#[derive(Args)]
struct SceneArgs {
    /// Path to the scene document (JSON)
    scene: PathBuf,

    /// Export these objects instead of the document selection (repeatable, in order)
    #[arg(long = "select", value_name = "NAME")]
    select: Vec<String>,

    /// Export every object in the scene
    #[arg(long, conflicts_with = "select")]
    all: bool,

    /// Export configuration (YAML). Defaults to respacker.yaml next to the scene
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Args)]
struct InspectArgs {
    /// Descriptor files to read
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_with_config(&TracingConfig::from_verbosity(cli.verbose));

    match cli.command {
        Commands::Export(args) => cmd_export(args, cli.format),
        Commands::Plan(args) => cmd_plan(args, cli.format),
        Commands::Inspect(args) => cmd_inspect(args, cli.format),
    }
}

/// Load the scene, apply selection overrides and resolve the config
fn open_scene(args: &SceneArgs) -> Result<(MemoryScene, ExportConfig)> {
    info!("Opening scene: {:?}", args.scene);

    let mut scene = MemoryScene::load(&args.scene).context("Failed to load scene document")?;

    if args.all {
        scene.select_all();
    } else if !args.select.is_empty() {
        scene.select_names(&args.select).context("Invalid --select")?;
    }

    let config = match &args.config {
        Some(path) => ExportConfig::load(path).context("Failed to load config")?,
        None => {
            let dir = scene.document_dir().unwrap_or_else(|| Path::new("."));
            ExportConfig::discover(dir).context("Failed to load config")?
        }
    };
    debug!(?config, "Resolved export config");

    Ok((scene, config))
}

fn cmd_export(args: SceneArgs, format: OutputFormat) -> Result<()> {
    let (mut scene, config) = open_scene(&args)?;
    let converter = Converter::new(config);

    let report = converter.run(&mut scene).context("Export failed")?;
    for warning in &report.warnings {
        warn!("{}", warning);
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_report(&report),
    }

    Ok(())
}

fn print_report(report: &ExportReport) {
    println!("Exported to {}", report.output_dir.display());
    println!("  Descriptors: {}", report.descriptors.len());
    println!("  Meshes:      {}", report.meshes.len());
    println!("  Textures:    {}", report.textures.len());
    println!(
        "  Resources:   {} packed, {} unpacked",
        report.resources_packed, report.resources_unpacked
    );

    if !report.skipped.is_empty() {
        println!("\nSkipped:");
        for skipped in &report.skipped {
            println!("  {:<32} {}", skipped.name, skipped.reason);
        }
    }

    if !report.warnings.is_empty() {
        println!("\nWarnings:");
        for warning in &report.warnings {
            println!("  {}", warning);
        }
    }
}

fn cmd_plan(args: SceneArgs, format: OutputFormat) -> Result<()> {
    let (scene, config) = open_scene(&args)?;
    let plan = Converter::new(config).plan(&scene);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&plan)?),
        OutputFormat::Text => print_plan(&plan),
    }

    Ok(())
}

fn print_plan(plan: &Plan) {
    println!("{:<32} {:<20} {:<32} {}", "Object", "Class", "Descriptor", "Mesh");
    println!("{:-<32} {:-<20} {:-<32} {:-<24}", "", "", "", "");

    for entry in &plan.entries {
        match &entry.class {
            Some(class) => println!(
                "{:<32} {:<20} {:<32} {}",
                entry.object,
                class.to_string(),
                entry.descriptor.as_deref().unwrap_or("-"),
                entry.mesh.as_deref().unwrap_or("-"),
            ),
            None => println!(
                "{:<32} skip ({})",
                entry.object,
                entry.skip_reason.as_deref().unwrap_or("unknown")
            ),
        }
    }

    for warning in &plan.warnings {
        println!("warning: {}", warning);
    }
    println!("\nTotal: {} objects", plan.entries.len());
}

fn cmd_inspect(args: InspectArgs, format: OutputFormat) -> Result<()> {
    let mut descriptors = Vec::with_capacity(args.files.len());
    let mut failed = 0usize;

    for path in &args.files {
        let text = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
        match Descriptor::parse(&text) {
            Ok(descriptor) => descriptors.push((path.clone(), descriptor)),
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                failed += 1;
            }
        }
    }

    match format {
        OutputFormat::Json => {
            let entries: Vec<_> = descriptors
                .iter()
                .map(|(path, descriptor)| {
                    serde_json::json!({
                        "file": path,
                        "descriptor": descriptor,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
        OutputFormat::Text => {
            for (path, descriptor) in &descriptors {
                println!("== {} ({})", path.display(), descriptor.kind());
                print!("{}", descriptor.render());
            }
        }
    }

    if failed > 0 {
        bail!("{} of {} descriptor files could not be parsed", failed, args.files.len());
    }
    Ok(())
}
