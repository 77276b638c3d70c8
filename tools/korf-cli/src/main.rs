//! korf - KORF sample container tool
//!
//! Inspects KORF sample containers and program files, links programs to
//! samples, and exports samples as WAV files or a SoundFont 2 bank.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use korf_pcm::SampleRole;
use std::path::PathBuf;

mod config;
mod export;
mod inspect;

use config::KorfConfig;

#[derive(Parser)]
#[command(name = "korf")]
#[command(about = "KORF sample container tool")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./korf.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Role filter for the classify command
#[derive(Clone, Copy, ValueEnum)]
enum Role {
    Drumkit,
    Melodic,
    Unknown,
}

impl From<Role> for SampleRole {
    fn from(role: Role) -> Self {
        match role {
            Role::Drumkit => SampleRole::Drumkit,
            Role::Melodic => SampleRole::Melodic,
            Role::Unknown => SampleRole::Unknown,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show a summary of a container
    Info {
        /// Input .PCM container
        input: PathBuf,
    },

    /// List every sample in a container
    List {
        /// Input .PCM container
        input: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Classify samples as drum kit or melodic
    Classify {
        /// Input .PCM container
        input: PathBuf,

        /// Only show samples with this role
        #[arg(short, long, value_enum)]
        role: Option<Role>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List programs in a program file
    Programs {
        /// Input .PCG program file
        input: PathBuf,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Link programs to the samples they use
    Link {
        /// Input .PCG program file
        programs: PathBuf,

        /// Input .PCM container
        container: PathBuf,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Extract samples as WAV files
    Wav {
        /// Input .PCM container
        input: PathBuf,

        /// Sample indices (default: all)
        indices: Vec<usize>,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Export samples as a SoundFont 2 bank
    Export {
        /// Input .PCM container
        input: PathBuf,

        /// Output .sf2 file (default: input with .sf2 extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Program file used to group samples into instruments
        #[arg(short, long)]
        programs: Option<PathBuf>,

        /// Sample indices (default: all)
        #[arg(short, long, value_delimiter = ',')]
        indices: Vec<usize>,

        /// Bank name (overrides config)
        #[arg(long)]
        bank_name: Option<String>,
    },

    /// Find containers and program files under a directory
    Scan {
        /// Directory to search
        #[arg(default_value = ".")]
        dir: PathBuf,

        /// Maximum directory depth
        #[arg(long, default_value_t = 4)]
        max_depth: usize,
    },

    /// Write a small synthetic container for testing
    Fixture {
        /// Output .PCM file
        output: PathBuf,

        /// Also write a matching .PCG program file
        #[arg(short, long)]
        programs: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    let config = KorfConfig::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Info { input } => inspect::info(&input, &config.classifier)?,

        Commands::List { input, json } => inspect::list(&input, json)?,

        Commands::Classify { input, role, json } => {
            inspect::classify(&input, role.map(Into::into), json, &config.classifier)?
        }

        Commands::Programs { input, json } => inspect::programs(&input, json)?,

        Commands::Link {
            programs,
            container,
            json,
        } => export::link_programs(&programs, &container, json, &config.linker)?,

        Commands::Wav {
            input,
            indices,
            output_dir,
        } => export::wav(&input, &indices, &output_dir)?,

        Commands::Export {
            input,
            output,
            programs,
            indices,
            bank_name,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension("sf2"));
            tracing::info!("Exporting {:?} -> {:?}", input, output);
            export::export(
                export::ExportArgs {
                    input: &input,
                    output: &output,
                    programs: programs.as_deref(),
                    indices: &indices,
                    bank_name,
                },
                &config.classifier,
                &config.linker,
                &config.export,
            )?;
            tracing::info!("Done!");
        }

        Commands::Scan { dir, max_depth } => inspect::scan(&dir, max_depth)?,

        Commands::Fixture { output, programs } => export::fixture(&output, programs)?,
    }

    Ok(())
}
