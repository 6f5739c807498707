use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use dispute_core::{
    Annotations, Dispute, DisputePolicy, DisputeStatus, GarageVerificationStatus, NewDispute,
};
use schemars::schema_for;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "garage-disputes")]
#[command(about = "Garage dispute model tooling", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export JSON Schemas for the wire types
    Schema {
        #[command(subcommand)]
        command: SchemaCommands,
    },
    /// Print the issue catalog as JSON
    Catalog,
    /// File disputes and move them through their lifecycle
    Dispute {
        #[command(subcommand)]
        command: DisputeCommands,
    },
    /// Check garage verification status documents
    Verification {
        #[command(subcommand)]
        command: VerificationCommands,
    },
}

#[derive(Subcommand)]
enum SchemaCommands {
    /// Export JSON Schema files for canonical types
    Export {
        /// Output directory (default: ./schemas)
        #[arg(long, default_value = "schemas")]
        out_dir: PathBuf,
    },
}

#[derive(Subcommand)]
enum DisputeCommands {
    /// File a dispute from an intake JSON document
    File {
        /// Intake document (NewDispute JSON)
        #[arg(long)]
        input: PathBuf,
        /// Intake policy TOML (default limits when omitted)
        #[arg(long)]
        policy: Option<PathBuf>,
        /// Write the dispute here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Apply a status change to a dispute document
    Transition {
        /// Dispute JSON document
        #[arg(long)]
        input: PathBuf,
        /// Target status (under-review, resolved, rejected)
        #[arg(long)]
        to: DisputeStatus,
        #[arg(long)]
        admin_notes: Option<String>,
        #[arg(long)]
        garage_response: Option<String>,
        /// Evidence URL for the garage response (repeatable)
        #[arg(long = "garage-media")]
        garage_media: Vec<String>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Attach a garage reply without changing status
    Respond {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        response: String,
        /// Evidence URL (repeatable)
        #[arg(long = "media")]
        media: Vec<String>,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Verify a dispute document's derived fields
    Check {
        #[arg(long)]
        input: PathBuf,
    },
}

#[derive(Subcommand)]
enum VerificationCommands {
    /// Validate a GarageVerificationStatus JSON document
    Check {
        #[arg(long)]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Schema { command } => match command {
            SchemaCommands::Export { out_dir } => schema_export(out_dir),
        },
        Commands::Catalog => emit(dispute_core::catalog(), None),
        Commands::Dispute { command } => match command {
            DisputeCommands::File { input, policy, out } => dispute_file(&input, policy, out),
            DisputeCommands::Transition {
                input,
                to,
                admin_notes,
                garage_response,
                garage_media,
                out,
            } => {
                if garage_response.is_none() && !garage_media.is_empty() {
                    bail!("--garage-media requires --garage-response");
                }
                let annotations = Annotations {
                    admin_notes,
                    garage_response_media_urls: garage_response.as_ref().map(|_| garage_media),
                    garage_response,
                };
                dispute_transition(&input, to, annotations, out)
            }
            DisputeCommands::Respond {
                input,
                response,
                media,
                out,
            } => {
                let mut dispute = read_dispute(&input)?;
                dispute.record_garage_response(&response, media)?;
                emit(&dispute, out)
            }
            DisputeCommands::Check { input } => {
                let dispute = read_dispute(&input)?;
                println!("{}: ok ({}, {})", dispute.id, dispute.issue_type(), dispute.status());
                Ok(())
            }
        },
        Commands::Verification { command } => match command {
            VerificationCommands::Check { input } => verification_check(&input),
        },
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn schema_export(out_dir: PathBuf) -> Result<()> {
    fs::create_dir_all(&out_dir)?;

    write_schema(&out_dir, "Dispute", &schema_for!(dispute_core::Dispute))?;
    write_schema(&out_dir, "NewDispute", &schema_for!(dispute_core::NewDispute))?;
    write_schema(&out_dir, "DisputeStatus", &schema_for!(dispute_core::DisputeStatus))?;
    write_schema(&out_dir, "IssueType", &schema_for!(dispute_core::IssueType))?;
    write_schema(
        &out_dir,
        "IssueCatalogEntry",
        &schema_for!(dispute_core::IssueCatalogEntry),
    )?;
    write_schema(
        &out_dir,
        "GarageVerificationStatus",
        &schema_for!(dispute_core::GarageVerificationStatus),
    )?;
    write_schema(&out_dir, "GarageFlag", &schema_for!(dispute_core::GarageFlag))?;

    println!("Exported schemas to {}", out_dir.display());
    Ok(())
}

fn write_schema(out_dir: &Path, name: &str, schema: &schemars::schema::RootSchema) -> Result<()> {
    let json = serde_json::to_string_pretty(schema)?;
    fs::write(out_dir.join(format!("{name}.schema.json")), json)?;
    Ok(())
}

fn dispute_file(input: &Path, policy: Option<PathBuf>, out: Option<PathBuf>) -> Result<()> {
    let policy = match policy {
        Some(path) => DisputePolicy::load(&path)
            .with_context(|| format!("loading policy {}", path.display()))?,
        None => DisputePolicy::default(),
    };
    let raw = fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let intake: NewDispute = serde_json::from_str(&raw)
        .with_context(|| format!("parsing intake document {}", input.display()))?;

    let dispute = Dispute::file(intake, &policy)?;
    info!(dispute_id = %dispute.id, critical = dispute.is_critical(), "filed dispute");
    emit(&dispute, out)
}

fn dispute_transition(
    input: &Path,
    to: DisputeStatus,
    annotations: Annotations,
    out: Option<PathBuf>,
) -> Result<()> {
    let mut dispute = read_dispute(input)?;
    dispute.transition(to, annotations)?;
    emit(&dispute, out)
}

fn verification_check(input: &Path) -> Result<()> {
    let raw = fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))?;
    let status: GarageVerificationStatus = serde_json::from_str(&raw)
        .with_context(|| format!("parsing verification status {}", input.display()))?;
    status.validate()?;
    println!(
        "{}: ok ({} of {} complaints resolved)",
        status.garage_id, status.resolved_complaints, status.total_complaints
    );
    Ok(())
}

fn read_dispute(path: &Path) -> Result<Dispute> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Dispute::from_json(&raw).with_context(|| format!("loading dispute {}", path.display()))
}

fn emit<T: Serialize + ?Sized>(value: &T, out: Option<PathBuf>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match out {
        Some(path) => {
            fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
