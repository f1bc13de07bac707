use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use marksrs::{Catalog, LevelFilter, Marks, MarksConfig};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod formatter;

#[derive(Parser)]
#[command(name = "marksview")]
#[command(about = "Browse student grade reports by module, student or cohort", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Directory holding the grade spreadsheets (overrides the configuration)
    #[arg(short, long, value_name = "DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human", global = true)]
    format: OutputFormat,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List modules available for browsing
    Modules {
        /// Levels to list (1, 2nd, "3rd year", ...); all when omitted
        #[arg(short, long, value_name = "LEVEL")]
        level: Vec<String>,
    },
    /// Show the table of one module
    Module {
        /// Display name, as listed by `modules`
        name: String,
    },
    /// List every student found in the reports
    Students,
    /// Show the results of one student across all modules
    Student {
        /// "First Last", as listed by `students`
        name: String,
    },
    /// Show final grades of a cohort level, one column per module
    Cohort {
        /// Level(s) to aggregate
        #[arg(short, long, value_name = "LEVEL", required = true)]
        level: Vec<String>,
    },
    /// List the academic years offered for selection
    Years,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable colored output
    Human,
    /// JSON output
    Json,
}

fn init_logging(quiet: bool) {
    let default = if quiet {
        "warn"
    } else {
        "marksrs=info,marksview=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<MarksConfig> {
    let mut config = if let Some(config_path) = &cli.config {
        MarksConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        // Try to load default config from current directory if it exists
        let default_config_path = PathBuf::from("marksview.toml");
        if default_config_path.exists() {
            MarksConfig::from_file(&default_config_path).with_context(|| {
                format!(
                    "Failed to load config from {}",
                    default_config_path.display()
                )
            })?
        } else {
            MarksConfig::default()
        }
    };

    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }

    config.validate().context("Invalid configuration")?;
    debug!(data_dir = %config.data_dir.display(), header_row = config.header_row, "configuration loaded");
    Ok(config)
}

fn parse_levels(levels: &[String]) -> Result<LevelFilter> {
    if levels.is_empty() {
        return Ok(LevelFilter::all());
    }
    let filter = LevelFilter::parse_all(levels.iter().map(String::as_str))?;
    Ok(filter)
}

fn load_catalog(marks: &mut Marks) -> Result<Catalog> {
    let data_dir = marks.config().data_dir.clone();
    marks
        .load_catalog()
        .with_context(|| format!("Failed to load grade reports from {}", data_dir.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.quiet);

    let config = load_config(&cli)?;
    let json = matches!(cli.format, OutputFormat::Json);
    let mut marks = Marks::with_config(config);

    match &cli.command {
        Command::Years => {
            if json {
                formatter::print_json(&marks.config().displayed_years)?;
            } else {
                formatter::print_years(marks.config());
            }
        }
        Command::Modules { level } => {
            let catalog = load_catalog(&mut marks)?;
            let choices = catalog.module_choices(&parse_levels(level)?);
            if json {
                formatter::print_json(&choices)?;
            } else {
                formatter::print_modules(&choices, catalog.diagnostics());
            }
        }
        Command::Module { name } => {
            let catalog = load_catalog(&mut marks)?;
            let (file_name, table) = catalog
                .find_module(name)
                .with_context(|| format!("No module named '{}'", name))?;
            if json {
                formatter::print_json(table)?;
            } else {
                formatter::print_module(file_name, table, &marks.config().columns);
            }
        }
        Command::Students => {
            let catalog = load_catalog(&mut marks)?;
            let names = catalog.student_names();
            if json {
                formatter::print_json(&names)?;
            } else {
                names.iter().for_each(|n| println!("{}", n));
            }
        }
        Command::Student { name } => {
            let catalog = load_catalog(&mut marks)?;
            let report = marks.student(&catalog, name);
            if report.is_empty() {
                anyhow::bail!("No student named '{}'", name);
            }
            if json {
                formatter::print_json(&report)?;
            } else {
                formatter::print_student(&report);
            }
        }
        Command::Cohort { level } => {
            let catalog = load_catalog(&mut marks)?;
            let result = marks
                .aggregate(&catalog, &parse_levels(level)?)
                .context("Failed to aggregate cohort")?;
            if json {
                formatter::print_json(&result)?;
            } else {
                formatter::print_cohort(&result, catalog.diagnostics());
            }
        }
    }

    Ok(())
}
