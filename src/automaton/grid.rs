//! Grid snapshots for 1D and 2D automata

use crate::errors::{AutomatonError, AutomatonResult};
use itertools::Either;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A binary cell state
pub type Cell = u8;

pub const DEAD: Cell = 0;
pub const ALIVE: Cell = 1;

/// Number of spatial dimensions of a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Dimension {
    One,
    Two,
}

impl Dimension {
    /// Cells in the neighborhood window for this dimension
    pub fn neighborhood_size(self) -> usize {
        match self {
            Dimension::One => super::rules::ELEMENTARY_NEIGHBORHOOD,
            Dimension::Two => super::rules::MOORE_NEIGHBORHOOD,
        }
    }
}

impl TryFrom<u8> for Dimension {
    type Error = AutomatonError;

    fn try_from(value: u8) -> AutomatonResult<Self> {
        match value {
            1 => Ok(Dimension::One),
            2 => Ok(Dimension::Two),
            other => Err(AutomatonError::InvalidDimension(other)),
        }
    }
}

impl From<Dimension> for u8 {
    fn from(dimension: Dimension) -> Self {
        match dimension {
            Dimension::One => 1,
            Dimension::Two => 2,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}D", u8::from(*self))
    }
}

/// A cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    OneD(usize),
    TwoD { row: usize, col: usize },
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::OneD(index) => write!(f, "{}", index),
            Position::TwoD { row, col } => write!(f, "({}, {})", row, col),
        }
    }
}

/// Cell storage, tagged by dimension
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cells {
    OneD(Vec<Cell>),
    TwoD(Vec<Vec<Cell>>),
}

/// One generation of an automaton.
///
/// A grid is never modified once built: stepping produces a new grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Cells,
}

impl Grid {
    /// An all-dead grid
    pub fn dead(dimension: Dimension, size: usize) -> AutomatonResult<Self> {
        if size == 0 {
            return Err(AutomatonError::InvalidSize(size));
        }
        let cells = match dimension {
            Dimension::One => Cells::OneD(vec![DEAD; size]),
            Dimension::Two => Cells::TwoD(vec![vec![DEAD; size]; size]),
        };
        Ok(Self { cells })
    }

    /// A 1D grid holding exactly `cells`
    pub fn from_line(cells: Vec<Cell>) -> AutomatonResult<Self> {
        if cells.is_empty() {
            return Err(AutomatonError::InvalidSize(0));
        }
        check_binary(&cells)?;
        Ok(Self {
            cells: Cells::OneD(cells),
        })
    }

    /// A 2D grid from square rows
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> AutomatonResult<Self> {
        if rows.is_empty() {
            return Err(AutomatonError::InvalidSize(0));
        }

        let size = rows.len();
        for (i, row) in rows.iter().enumerate() {
            if row.len() != size {
                return Err(AutomatonError::InvalidConfiguration(format!(
                    "row {} has length {}, expected {} for a square grid",
                    i,
                    row.len(),
                    size
                )));
            }
            check_binary(row)?;
        }

        Ok(Self {
            cells: Cells::TwoD(rows),
        })
    }

    /// Wrap cells that are already known to be binary and well shaped
    pub(crate) fn from_cells_unchecked(cells: Cells) -> Self {
        Self { cells }
    }

    pub fn dimension(&self) -> Dimension {
        match self.cells {
            Cells::OneD(_) => Dimension::One,
            Cells::TwoD(_) => Dimension::Two,
        }
    }

    /// Edge length: cell count in 1D, row/column count in 2D
    pub fn size(&self) -> usize {
        match &self.cells {
            Cells::OneD(line) => line.len(),
            Cells::TwoD(rows) => rows.len(),
        }
    }

    pub fn cells(&self) -> &Cells {
        &self.cells
    }

    /// Cell at `position`, or `None` when it lies outside the grid
    pub fn get(&self, position: Position) -> Option<Cell> {
        match (&self.cells, position) {
            (Cells::OneD(line), Position::OneD(index)) => line.get(index).copied(),
            (Cells::TwoD(rows), Position::TwoD { row, col }) => {
                rows.get(row).and_then(|r| r.get(col)).copied()
            }
            _ => None,
        }
    }

    /// All cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = Cell> + '_ {
        match &self.cells {
            Cells::OneD(line) => Either::Left(line.iter().copied()),
            Cells::TwoD(rows) => Either::Right(rows.iter().flatten().copied()),
        }
    }

    /// Positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let size = self.size();
        match self.dimension() {
            Dimension::One => Either::Left((0..size).map(Position::OneD)),
            Dimension::Two => Either::Right(
                itertools::iproduct!(0..size, 0..size).map(|(row, col)| Position::TwoD { row, col }),
            ),
        }
    }

    pub fn living_count(&self) -> usize {
        self.iter().filter(|&cell| cell == ALIVE).count()
    }

    pub fn is_all_dead(&self) -> bool {
        self.iter().all(|cell| cell == DEAD)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.cells {
            Cells::OneD(line) => {
                for cell in line {
                    write!(f, "{}", cell)?;
                }
                writeln!(f)?;
            }
            Cells::TwoD(rows) => {
                for row in rows {
                    for cell in row {
                        write!(f, "{}", cell)?;
                    }
                    writeln!(f)?;
                }
            }
        }
        Ok(())
    }
}

fn check_binary(cells: &[Cell]) -> AutomatonResult<()> {
    match cells.iter().position(|&cell| cell != DEAD && cell != ALIVE) {
        Some(index) => Err(AutomatonError::InvalidConfiguration(format!(
            "cell {} has non-binary value {}",
            index, cells[index]
        ))),
        None => Ok(()),
    }
}
