//! Elementary and 2D cellular automata in the Wolfram rule numbering
//!
//! A rule number is decoded into a [`RuleTable`] indexed by neighborhood
//! configuration; [`GridEngine`] applies it across a 1D line or a 2D square
//! lattice whose edges are padded with dead cells.

pub mod automaton;
pub mod config;
pub mod errors;
pub mod simulation;
pub mod utils;

pub use automaton::{Grid, GridEngine, RuleTable};
pub use config::Settings;
pub use errors::{AutomatonError, AutomatonResult};
pub use simulation::Simulation;
