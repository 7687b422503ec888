//! Configuration settings for automaton runs

use crate::automaton::{parse_rule, CellAlphabet, Dimension, RuleTable};
use crate::errors::{AutomatonError, AutomatonResult};
use anyhow::{Context, Result};
use log::warn;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub simulation: SimulationConfig,
    pub display: DisplayConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Wolfram rule number, kept as text since 2D rules run to 512 bits
    #[serde(deserialize_with = "rule_from_yaml")]
    pub rule: String,
    pub dimension: Dimension,
    pub size: usize,
    pub steps: usize,
    pub seed: SeedConfig,
    /// End the run at the first generation without live cells
    pub stop_when_dead: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfig {
    pub strategy: SeedStrategy,
    #[serde(default)]
    pub random_seed: Option<u64>,
    /// Initial 1D cells written in the display alphabet
    #[serde(default)]
    pub configuration: Option<String>,
    #[serde(default)]
    pub grid_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SeedStrategy {
    Center,
    AllLive,
    Random,
    Configuration,
    File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub dead_char: char,
    pub alive_char: char,
    /// Pause between 2D frames
    pub frame_delay_ms: u64,
    pub clear_between_frames: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    #[serde(default)]
    pub final_grid_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig {
                rule: "90".to_string(),
                dimension: Dimension::One,
                size: 101,
                steps: 50,
                seed: SeedConfig {
                    strategy: SeedStrategy::Center,
                    random_seed: None,
                    configuration: None,
                    grid_file: None,
                },
                stop_when_dead: false,
            },
            display: DisplayConfig {
                dead_char: ' ',
                alive_char: '*',
                frame_delay_ms: 100,
                clear_between_frames: true,
            },
            output: OutputConfig {
                format: OutputFormat::Text,
                final_grid_file: None,
            },
        }
    }
}

impl Settings {
    /// Load settings from a YAML file. Call `validate` once overrides are merged.
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        let simulation = &self.simulation;

        self.rule_table()?;

        if simulation.size == 0 {
            return Err(AutomatonError::InvalidSize(simulation.size).into());
        }

        if simulation.steps == 0 {
            anyhow::bail!("Number of steps must be positive");
        }

        self.alphabet()?;

        match simulation.seed.strategy {
            SeedStrategy::Configuration => {
                if simulation.dimension != Dimension::One {
                    return Err(AutomatonError::InvalidConfiguration(
                        "an initial configuration string is only supported for 1D runs".to_string(),
                    )
                    .into());
                }
                match &simulation.seed.configuration {
                    None => anyhow::bail!("Seed strategy 'configuration' needs a configuration string"),
                    Some(text) if text.chars().count() != simulation.size => warn!(
                        "configured size {} is ignored, the configuration string has {} cells",
                        simulation.size,
                        text.chars().count()
                    ),
                    Some(_) => {}
                }
            }
            SeedStrategy::File => match &simulation.seed.grid_file {
                None => anyhow::bail!("Seed strategy 'file' needs a grid_file"),
                Some(path) if !path.exists() => {
                    anyhow::bail!("Grid file does not exist: {}", path.display())
                }
                Some(_) => {}
            },
            SeedStrategy::Center | SeedStrategy::AllLive | SeedStrategy::Random => {}
        }

        if simulation.dimension == Dimension::Two && self.display.frame_delay_ms == 0 {
            warn!("2D frames are shown without delay");
        }

        Ok(())
    }

    /// Rule table for the configured rule and dimension
    pub fn rule_table(&self) -> AutomatonResult<RuleTable> {
        let rule = parse_rule(&self.simulation.rule)?;
        RuleTable::build(&rule, self.simulation.dimension.neighborhood_size())
    }

    pub fn alphabet(&self) -> AutomatonResult<CellAlphabet> {
        CellAlphabet::new(self.display.dead_char, self.display.alive_char)
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(ref rule) = cli_overrides.rule {
            self.simulation.rule = rule.clone();
        }
        if let Some(dimension) = cli_overrides.dimension {
            self.simulation.dimension = dimension;
        }
        if let Some(size) = cli_overrides.size {
            self.simulation.size = size;
        }
        if let Some(steps) = cli_overrides.steps {
            self.simulation.steps = steps;
        }
        if let Some(strategy) = cli_overrides.seed_strategy {
            self.simulation.seed.strategy = strategy;
        }
        if let Some(seed) = cli_overrides.random_seed {
            self.simulation.seed.random_seed = Some(seed);
        }
        if let Some(ref configuration) = cli_overrides.configuration {
            self.simulation.seed.configuration = Some(configuration.clone());
            self.simulation.seed.strategy = SeedStrategy::Configuration;
        }
        if let Some(dead) = cli_overrides.dead_char {
            self.display.dead_char = dead;
        }
        if let Some(alive) = cli_overrides.alive_char {
            self.display.alive_char = alive;
        }
        if let Some(delay) = cli_overrides.frame_delay_ms {
            self.display.frame_delay_ms = delay;
        }
        if let Some(format) = cli_overrides.format {
            self.output.format = format;
        }
        // 2D runs end once nothing is left alive
        if self.simulation.dimension == Dimension::Two {
            self.simulation.stop_when_dead = true;
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub rule: Option<String>,
    pub dimension: Option<Dimension>,
    pub size: Option<usize>,
    pub steps: Option<usize>,
    pub seed_strategy: Option<SeedStrategy>,
    pub random_seed: Option<u64>,
    pub configuration: Option<String>,
    pub dead_char: Option<char>,
    pub alive_char: Option<char>,
    pub frame_delay_ms: Option<u64>,
    pub format: Option<OutputFormat>,
}

/// Accept the rule either as a YAML integer or as a string of digits.
/// Range and sign are checked later by `parse_rule`.
fn rule_from_yaml<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    struct RuleVisitor;

    impl<'de> Visitor<'de> for RuleVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a rule number")
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> std::result::Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> std::result::Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_u128<E: de::Error>(self, value: u128) -> std::result::Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_i128<E: de::Error>(self, value: i128) -> std::result::Result<String, E> {
            Ok(value.to_string())
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> std::result::Result<String, E> {
            Err(E::custom(format!(
                "rule {} is not an exact integer; write rules too large for a YAML integer as a quoted string",
                value
            )))
        }

        fn visit_str<E: de::Error>(self, value: &str) -> std::result::Result<String, E> {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(RuleVisitor)
}
