use clap::{Parser, Subcommand};
use hf_app::{AppError, AppResult, plots};
use hf_project::AnalysisConfig;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hf-cli")]
#[command(about = "Humidiflow CLI - humidity loop analysis and PI design", long_about = None)]
struct Cli {
    /// Analysis configuration (YAML or JSON); the reference chamber if omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Without a subcommand the default analysis report is printed
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze the loop, design the PI compensator and print the report
    Analyze {
        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,
        /// Write one CSV per plot into this directory
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },
    /// Simulate filling the chamber up to the target humidity
    Fill {
        /// Write the fill curve as CSV into this directory
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },
    /// Print the default configuration as YAML
    Config {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        config_path: PathBuf,
    },
}

fn main() -> AppResult<()> {
    // Logs go to stderr so report output stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Analyze {
        json: false,
        export_dir: None,
    });

    match command {
        Commands::Analyze { json, export_dir } => {
            cmd_analyze(cli.config.as_deref(), json, export_dir.as_deref())
        }
        Commands::Fill { export_dir } => cmd_fill(cli.config.as_deref(), export_dir.as_deref()),
        Commands::Config { output } => cmd_config(output.as_deref()),
        Commands::Validate { config_path } => cmd_validate(&config_path),
    }
}

fn load_config(path: Option<&Path>) -> AppResult<AnalysisConfig> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading configuration");
            Ok(hf_project::load_config(path)?)
        }
        None => Ok(AnalysisConfig::default()),
    }
}

fn cmd_analyze(config_path: Option<&Path>, json: bool, export_dir: Option<&Path>) -> AppResult<()> {
    let config = load_config(config_path)?;
    let report = hf_app::run_analysis(&config)?;

    if json {
        println!("{}", hf_app::render_json(&report)?);
    } else {
        print!("{}", hf_app::render_text(&report));
    }

    if let Some(dir) = export_dir {
        let written = plots::export_csv(dir, &plots::analysis_plots(&report))?;
        for path in written {
            eprintln!("✓ Wrote {}", path.display());
        }
    }
    Ok(())
}

fn cmd_fill(config_path: Option<&Path>, export_dir: Option<&Path>) -> AppResult<()> {
    let config = load_config(config_path)?;
    let record = hf_app::run_fill(&config.fill)?;
    print!("{}", hf_app::render_fill_text(&config.fill, &record));

    if let Some(dir) = export_dir {
        let written = plots::export_csv(dir, &[plots::fill_plot(&record)])?;
        for path in written {
            eprintln!("✓ Wrote {}", path.display());
        }
    }
    Ok(())
}

fn cmd_config(output: Option<&Path>) -> AppResult<()> {
    let config = AnalysisConfig::default();
    match output {
        Some(path) => {
            hf_project::save_yaml(path, &config)?;
            println!("✓ Wrote {}", path.display());
        }
        None => {
            let yaml = serde_yaml::to_string(&config)
                .map_err(|e| AppError::Serialization(e.to_string()))?;
            print!("{yaml}");
        }
    }
    Ok(())
}

fn cmd_validate(config_path: &Path) -> AppResult<()> {
    println!("Validating configuration: {}", config_path.display());
    let config = hf_project::load_config(config_path)?;
    hf_app::PlantModel::build(&hf_app::PlantParameters::from(&config.plant))?;
    println!("✓ Configuration is valid");
    Ok(())
}
