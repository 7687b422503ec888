//! Cellular automaton core: rule tables, grids and the stepping engine

pub mod engine;
pub mod grid;
pub mod io;
pub mod rules;

pub use engine::GridEngine;
pub use grid::{Cell, Cells, Dimension, Grid, Position, ALIVE, DEAD};
pub use io::{load_grid_from_file, parse_grid_from_string, save_grid_to_file, CellAlphabet};
pub use rules::{parse_rule, RuleTable, ELEMENTARY_NEIGHBORHOOD, MOORE_NEIGHBORHOOD};
