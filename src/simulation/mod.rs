//! Running an automaton over successive generations

pub mod runner;

pub use runner::{seed_grid, Generation, GenerationRecord, Simulation};
