//! Command line front end for the cellular automaton simulator

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use wolfram_ca::{
    automaton::{save_grid_to_file, Dimension},
    config::{CliOverrides, OutputFormat, SeedStrategy, Settings},
    errors::AutomatonError,
    simulation::Simulation,
    utils::{Animator, ColorOutput, GridFormatter},
};

/// Conway's Life written as a rule over 3x3 Moore neighborhoods
const LIFE_RULE: &str = "47634829485252037513200973884082471888288955642325528262910887637847274372981720534370017768342996036219492316860704401273651054628223608960";

#[derive(Parser)]
#[command(name = "wolfram_ca")]
#[command(about = "Elementary and 2D cellular automata in Wolfram rule numbering")]
#[command(version = "0.1.0")]
struct Cli {
    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate an automaton and print its generations
    Run {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Rule number (overrides config)
        #[arg(short, long)]
        rule: Option<String>,

        /// Dimension, 1 or 2 (overrides config)
        #[arg(short, long)]
        dimension: Option<u8>,

        /// Edge length of the grid (overrides config)
        #[arg(short, long)]
        size: Option<usize>,

        /// Number of generations to print (overrides config)
        #[arg(short = 'n', long)]
        steps: Option<usize>,

        /// Initial 1D configuration in the display characters
        #[arg(short, long)]
        init: Option<String>,

        /// How to seed the first generation
        #[arg(long, value_enum)]
        seed_strategy: Option<SeedStrategy>,

        /// Seed for the random seeding strategy
        #[arg(long)]
        random_seed: Option<u64>,

        /// Character for dead cells
        #[arg(long)]
        dead_char: Option<char>,

        /// Character for live cells
        #[arg(long)]
        alive_char: Option<char>,

        /// Pause between 2D frames in milliseconds
        #[arg(long)]
        delay_ms: Option<u64>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Write the last generation to this file
        #[arg(long)]
        save_final: Option<PathBuf>,
    },

    /// Print the lookup table of a rule
    Inspect {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Rule number (overrides config)
        #[arg(short, long)]
        rule: Option<String>,

        /// Dimension, 1 or 2 (overrides config)
        #[arg(short, long)]
        dimension: Option<u8>,
    },

    /// Create example configuration files
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = init_logging(cli.verbose) {
        eprintln!("{}", ColorOutput::warning(&format!("Logging disabled: {}", err)));
    }

    if let Err(err) = dispatch(cli.command) {
        eprintln!("{}", ColorOutput::error(&format!("Error: {:#}", err)));
        std::process::exit(exit_code(&err));
    }
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    SimpleLogger::new().with_level(level).init()?;
    Ok(())
}

/// Exit status for an error: the automaton error kind when there is one
fn exit_code(err: &anyhow::Error) -> i32 {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<AutomatonError>())
        .map_or(1, AutomatonError::exit_code)
}

fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            config,
            rule,
            dimension,
            size,
            steps,
            init,
            seed_strategy,
            random_seed,
            dead_char,
            alive_char,
            delay_ms,
            format,
            save_final,
        } => {
            let overrides = CliOverrides {
                rule,
                dimension: dimension.map(Dimension::try_from).transpose()?,
                size,
                steps,
                seed_strategy,
                random_seed,
                configuration: init,
                dead_char,
                alive_char,
                frame_delay_ms: delay_ms,
                format,
            };
            run_command(config, overrides, save_final)
        }
        Commands::Inspect { config, rule, dimension } => {
            let overrides = CliOverrides {
                rule,
                dimension: dimension.map(Dimension::try_from).transpose()?,
                ..Default::default()
            };
            inspect_command(config, overrides)
        }
        Commands::Setup { directory, force } => setup_command(directory, force),
    }
}

/// Settings from `path`, or the defaults when it does not exist
fn load_settings(path: &PathBuf, overrides: &CliOverrides) -> Result<Settings> {
    let mut settings = if path.exists() {
        Settings::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?
    } else {
        info!("config file {} not found, using defaults", path.display());
        Settings::default()
    };

    settings.merge_with_cli(overrides);
    settings.validate().context("Configuration validation failed")?;
    Ok(settings)
}

fn run_command(config_path: PathBuf, overrides: CliOverrides, save_final: Option<PathBuf>) -> Result<()> {
    let mut settings = load_settings(&config_path, &overrides)?;
    if save_final.is_some() {
        settings.output.final_grid_file = save_final;
    }

    let alphabet = settings.alphabet()?;
    let simulation = Simulation::from_settings(&settings).context("Failed to set up simulation")?;
    let stdout = io::stdout();
    let mut last = None;

    match (settings.output.format, settings.simulation.dimension) {
        (OutputFormat::Json, _) => {
            let mut out = stdout.lock();
            for generation in simulation {
                writeln!(out, "{}", generation.to_json()?)?;
                last = Some(generation);
            }
        }
        (OutputFormat::Text, Dimension::One) => {
            let mut out = stdout.lock();
            for generation in simulation {
                write!(out, "{}", alphabet.render(&generation.grid))?;
                last = Some(generation);
            }
        }
        (OutputFormat::Text, Dimension::Two) => {
            let mut animator = Animator::new(
                stdout.lock(),
                Duration::from_millis(settings.display.frame_delay_ms),
                settings.display.clear_between_frames,
            );
            for generation in simulation {
                animator.show(&GridFormatter::format_frame(&generation, &alphabet))?;
                last = Some(generation);
            }
        }
    }

    if let (Some(path), Some(generation)) = (&settings.output.final_grid_file, &last) {
        save_grid_to_file(&generation.grid, path, &alphabet)?;
        info!("saved generation {} to {}", generation.index, path.display());
    }

    Ok(())
}

fn inspect_command(config_path: PathBuf, overrides: CliOverrides) -> Result<()> {
    let settings = load_settings(&config_path, &overrides)?;
    let table = settings.rule_table()?;
    print!("{}", GridFormatter::format_rule_table(&table, &settings.alphabet()?));
    Ok(())
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Setting up project structure..."));

    let config_dir = directory.join("config");
    let examples_dir = config_dir.join("examples");
    std::fs::create_dir_all(&examples_dir)
        .with_context(|| format!("Failed to create directory: {}", examples_dir.display()))?;

    let default_config_path = config_dir.join("default.yaml");
    if default_config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists, use --force to overwrite",
            default_config_path.display()
        );
    }
    Settings::default().to_file(&default_config_path)?;
    println!("Created default configuration: {}", default_config_path.display());

    // Rule 30 from a random row
    let mut rule_30 = Settings::default();
    rule_30.simulation.rule = "30".to_string();
    rule_30.simulation.size = 79;
    rule_30.simulation.steps = 40;
    rule_30.simulation.seed.strategy = SeedStrategy::Random;
    rule_30.simulation.seed.random_seed = Some(30);
    rule_30.to_file(&examples_dir.join("rule30_random.yaml"))?;

    // Life on a random square
    let mut life = Settings::default();
    life.simulation.rule = LIFE_RULE.to_string();
    life.simulation.dimension = Dimension::Two;
    life.simulation.size = 24;
    life.simulation.steps = 200;
    life.simulation.stop_when_dead = true;
    life.simulation.seed.strategy = SeedStrategy::Random;
    life.display.dead_char = '.';
    life.display.alive_char = '#';
    life.to_file(&examples_dir.join("life_2d.yaml"))?;

    println!("Created example configurations in: {}", examples_dir.display());
    println!("\n{}", ColorOutput::success("Setup complete!"));
    println!("\nNext steps:");
    println!("1. Edit configuration files in {}", config_dir.display());
    println!("2. Run: wolfram_ca run --config config/default.yaml");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "wolfram_ca", "run", "--rule", "30", "--dimension", "1", "-n", "5", "--init", "  *  ",
        ]);
        assert!(cli.is_ok());

        let cli = Cli::try_parse_from(["wolfram_ca", "-vv", "inspect", "--rule", "110"]).unwrap();
        assert_eq!(cli.verbose, 2);

        let cli = Cli::try_parse_from(["wolfram_ca", "run", "--seed-strategy", "all-live", "-f", "json"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_exit_codes() {
        let err = anyhow::Error::from(AutomatonError::InvalidDimension(4)).context("while parsing");
        assert_eq!(exit_code(&err), AutomatonError::InvalidDimension(4).exit_code());
        assert_eq!(exit_code(&anyhow::anyhow!("plain failure")), 1);
    }

    #[test]
    fn test_invalid_dimension_is_reported() {
        let command = Commands::Inspect {
            config: PathBuf::from("does/not/exist.yaml"),
            rule: None,
            dimension: Some(5),
        };
        let err = dispatch(command).unwrap_err();
        assert_eq!(exit_code(&err), 3);
    }

    #[test]
    fn test_setup_command() {
        let temp_dir = tempdir().unwrap();
        setup_command(temp_dir.path().to_path_buf(), false).unwrap();

        let default_path = temp_dir.path().join("config/default.yaml");
        assert!(default_path.exists());
        assert!(setup_command(temp_dir.path().to_path_buf(), false).is_err());
        assert!(setup_command(temp_dir.path().to_path_buf(), true).is_ok());

        let life = Settings::from_file(&temp_dir.path().join("config/examples/life_2d.yaml")).unwrap();
        assert_eq!(life.simulation.dimension, Dimension::Two);
        assert_eq!(life.rule_table().unwrap().live_entries(), 140);
    }

    #[test]
    fn test_run_command_saves_final_grid() {
        let temp_dir = tempdir().unwrap();
        let output = temp_dir.path().join("final.txt");
        let overrides = CliOverrides {
            size: Some(7),
            steps: Some(3),
            dead_char: Some('0'),
            alive_char: Some('1'),
            ..Default::default()
        };
        run_command(temp_dir.path().join("missing.yaml"), overrides, Some(output.clone())).unwrap();
        assert_eq!(std::fs::read_to_string(output).unwrap(), "0100010\n");
    }
}
