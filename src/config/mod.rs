//! Configuration management for automaton runs

pub mod settings;

pub use settings::{
    CliOverrides, DisplayConfig, OutputConfig, OutputFormat, SeedConfig, SeedStrategy, Settings,
    SimulationConfig,
};
