//! Wolfram-numbered rule tables

use super::grid::{Cell, ALIVE, DEAD};
use crate::errors::{AutomatonError, AutomatonResult};
use log::debug;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;
use std::fmt;

/// Neighborhood size of the elementary 1D automaton (left, self, right)
pub const ELEMENTARY_NEIGHBORHOOD: usize = 3;

/// Neighborhood size of the 3x3 Moore block
pub const MOORE_NEIGHBORHOOD: usize = 9;

/// Largest neighborhood a table may be built for (2^20 entries)
pub const MAX_NEIGHBORHOOD_SIZE: usize = 20;

/// Parse a decimal rule number. Negative or malformed numbers are rejected.
pub fn parse_rule(text: &str) -> AutomatonResult<BigUint> {
    let trimmed = text.trim();
    let value: BigInt = trimmed.parse().map_err(|_| AutomatonError::InvalidRule {
        rule: trimmed.to_string(),
        reason: "not a decimal integer".to_string(),
    })?;

    match value.into_parts() {
        (Sign::Minus, _) => Err(AutomatonError::InvalidRule {
            rule: trimmed.to_string(),
            reason: "rule numbers cannot be negative".to_string(),
        }),
        (_, magnitude) => Ok(magnitude),
    }
}

/// Lookup table from an encoded neighborhood to the next cell state.
///
/// Entry `k` is bit `k` of the rule number, least significant first, so
/// entry 0 belongs to the all-dead neighborhood. A neighborhood is encoded
/// by reading its cells as a binary number, first cell most significant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    rule: BigUint,
    neighborhood_size: usize,
    table: Vec<Cell>,
}

impl RuleTable {
    /// Build the table for `rule` over neighborhoods of `neighborhood_size` cells
    pub fn build(rule: &BigUint, neighborhood_size: usize) -> AutomatonResult<Self> {
        check_neighborhood_size(neighborhood_size)?;

        let entries = 1usize << neighborhood_size;
        if rule.bits() > entries as u64 {
            return Err(AutomatonError::InvalidRule {
                rule: rule.to_string(),
                reason: format!(
                    "exceeds 2^{} - 1, the largest rule for a {}-cell neighborhood",
                    entries, neighborhood_size
                ),
            });
        }

        let table = (0..entries as u64)
            .map(|bit| if rule.bit(bit) { ALIVE } else { DEAD })
            .collect();

        debug!("built rule table for rule {} over {} cells", rule, neighborhood_size);

        Ok(Self {
            rule: rule.clone(),
            neighborhood_size,
            table,
        })
    }

    /// Table for one of the 256 elementary rules
    pub fn elementary(rule: u8) -> Self {
        let table = (0..8).map(|bit| (rule >> bit) & 1).collect();
        Self {
            rule: BigUint::from(rule),
            neighborhood_size: ELEMENTARY_NEIGHBORHOOD,
            table,
        }
    }

    /// Build a table directly from its entries. The length must be `2^n`.
    pub fn from_table(table: Vec<Cell>) -> AutomatonResult<Self> {
        if table.len() < 2 || !table.len().is_power_of_two() {
            return Err(AutomatonError::InvalidNeighborhood(format!(
                "table length {} is not a power of two",
                table.len()
            )));
        }
        let neighborhood_size = table.len().trailing_zeros() as usize;
        check_neighborhood_size(neighborhood_size)?;

        let mut rule = BigUint::zero();
        for (bit, &cell) in table.iter().enumerate() {
            match cell {
                DEAD => {}
                ALIVE => rule.set_bit(bit as u64, true),
                other => {
                    return Err(AutomatonError::InvalidNeighborhood(format!(
                        "table entry {} has non-binary value {}",
                        bit, other
                    )))
                }
            }
        }

        Ok(Self {
            rule,
            neighborhood_size,
            table,
        })
    }

    pub fn rule(&self) -> &BigUint {
        &self.rule
    }

    pub fn neighborhood_size(&self) -> usize {
        self.neighborhood_size
    }

    pub fn table(&self) -> &[Cell] {
        &self.table
    }

    /// Encode a neighborhood as its table index (first cell most significant)
    pub fn encode(&self, cells: &[Cell]) -> AutomatonResult<usize> {
        if cells.len() != self.neighborhood_size {
            return Err(AutomatonError::InvalidNeighborhood(format!(
                "expected {} cells, got {}",
                self.neighborhood_size,
                cells.len()
            )));
        }

        cells.iter().try_fold(0usize, |index, &cell| match cell {
            DEAD | ALIVE => Ok(index << 1 | cell as usize),
            other => Err(AutomatonError::InvalidNeighborhood(format!(
                "non-binary cell value {}",
                other
            ))),
        })
    }

    /// Next state of the cell whose neighborhood is `cells`
    pub fn next_state(&self, cells: &[Cell]) -> AutomatonResult<Cell> {
        let index = self.encode(cells)?;
        Ok(self.table[index])
    }

    /// Lookup by an already encoded index. Callers guarantee `index < 2^n`.
    #[inline]
    pub(crate) fn lookup(&self, index: usize) -> Cell {
        self.table[index]
    }

    /// Every `(index, neighborhood, next state)`, from the all-live
    /// neighborhood down to the all-dead one
    pub fn entries(&self) -> impl Iterator<Item = (usize, Vec<Cell>, Cell)> + '_ {
        let size = self.neighborhood_size;
        (0..self.table.len()).rev().map(move |index| {
            let neighborhood = (0..size)
                .rev()
                .map(|shift| ((index >> shift) & 1) as Cell)
                .collect();
            (index, neighborhood, self.table[index])
        })
    }

    /// Number of neighborhoods that produce a live cell
    pub fn live_entries(&self) -> usize {
        self.table.iter().filter(|&&cell| cell == ALIVE).count()
    }
}

impl fmt::Display for RuleTable {
    /// Table entries as a bit string, most significant (all-live) entry first
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &cell in self.table.iter().rev() {
            write!(f, "{}", cell)?;
        }
        Ok(())
    }
}

fn check_neighborhood_size(size: usize) -> AutomatonResult<()> {
    if size == 0 || size > MAX_NEIGHBORHOOD_SIZE {
        return Err(AutomatonError::UnsupportedNeighborhoodSize {
            size,
            max: MAX_NEIGHBORHOOD_SIZE,
        });
    }
    Ok(())
}
