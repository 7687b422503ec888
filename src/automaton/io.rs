//! Text conversion for grids using a two-character display alphabet

use super::grid::{Cell, Cells, Dimension, Grid, ALIVE, DEAD};
use crate::errors::{AutomatonError, AutomatonResult};
use anyhow::{Context, Result};
use std::path::Path;

/// The pair of characters that stand for dead and live cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellAlphabet {
    dead: char,
    alive: char,
}

impl Default for CellAlphabet {
    fn default() -> Self {
        Self {
            dead: ' ',
            alive: '*',
        }
    }
}

impl CellAlphabet {
    pub fn new(dead: char, alive: char) -> AutomatonResult<Self> {
        if let Some(control) = [dead, alive].into_iter().find(|c| c.is_control()) {
            return Err(AutomatonError::InvalidConfiguration(format!(
                "control character {:?} cannot be used to display cells",
                control
            )));
        }
        if dead == alive {
            return Err(AutomatonError::InvalidConfiguration(format!(
                "dead and alive cells must use different characters, both are {:?}",
                dead
            )));
        }
        Ok(Self { dead, alive })
    }

    pub fn dead(&self) -> char {
        self.dead
    }

    pub fn alive(&self) -> char {
        self.alive
    }

    pub fn symbol(&self, cell: Cell) -> char {
        if cell == ALIVE {
            self.alive
        } else {
            self.dead
        }
    }

    /// Cells for a configuration string. Any other character is rejected.
    pub fn parse(&self, text: &str) -> AutomatonResult<Vec<Cell>> {
        text.chars()
            .enumerate()
            .map(|(i, ch)| match ch {
                c if c == self.dead => Ok(DEAD),
                c if c == self.alive => Ok(ALIVE),
                other => Err(AutomatonError::InvalidConfiguration(format!(
                    "invalid character {:?} at position {}, only {:?} and {:?} are allowed",
                    other, i, self.dead, self.alive
                ))),
            })
            .collect()
    }

    /// Configuration string for a sequence of cells
    pub fn format(&self, cells: &[Cell]) -> String {
        cells.iter().map(|&cell| self.symbol(cell)).collect()
    }

    /// One line per row, each terminated by a newline
    pub fn render(&self, grid: &Grid) -> String {
        let mut output = String::with_capacity(grid.size() * (grid.size() + 1));
        match grid.cells() {
            Cells::OneD(line) => {
                output.push_str(&self.format(line));
                output.push('\n');
            }
            Cells::TwoD(rows) => {
                for row in rows {
                    output.push_str(&self.format(row));
                    output.push('\n');
                }
            }
        }
        output
    }
}

/// Parse a grid of the given dimension: one line for 1D, square rows for 2D
pub fn parse_grid_from_string(
    content: &str,
    dimension: Dimension,
    alphabet: &CellAlphabet,
) -> Result<Grid> {
    let lines: Vec<&str> = content
        .lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        anyhow::bail!("Grid text is empty");
    }

    match dimension {
        Dimension::One => match lines.as_slice() {
            [line] => Ok(Grid::from_line(alphabet.parse(line)?)?),
            rows => Err(AutomatonError::InvalidConfiguration(format!(
                "a 1D grid is a single line, found {} lines",
                rows.len()
            ))
            .into()),
        },
        Dimension::Two => {
            let rows = lines
                .iter()
                .enumerate()
                .map(|(i, line)| alphabet.parse(line).with_context(|| format!("Invalid row {}", i)))
                .collect::<Result<Vec<_>>>()?;
            Ok(Grid::from_rows(rows)?)
        }
    }
}

/// Load a grid from a text file
pub fn load_grid_from_file<P: AsRef<Path>>(
    path: P,
    dimension: Dimension,
    alphabet: &CellAlphabet,
) -> Result<Grid> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read grid file: {}", path.as_ref().display()))?;

    parse_grid_from_string(&content, dimension, alphabet)
        .with_context(|| format!("Failed to parse grid from file: {}", path.as_ref().display()))
}

/// Save a grid to a text file
pub fn save_grid_to_file<P: AsRef<Path>>(grid: &Grid, path: P, alphabet: &CellAlphabet) -> Result<()> {
    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(&path, alphabet.render(grid))
        .with_context(|| format!("Failed to write grid to file: {}", path.as_ref().display()))?;

    Ok(())
}
