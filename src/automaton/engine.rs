//! Generation stepping with a phantom dead border

use super::grid::{Cell, Cells, Dimension, Grid, Position, ALIVE, DEAD};
use super::rules::RuleTable;
use crate::errors::{AutomatonError, AutomatonResult};
use log::{debug, trace};
use rand::Rng;
use rayon::prelude::*;

/// Stateless engine that builds seed grids and advances them
pub struct GridEngine;

impl GridEngine {
    /// Seed grid with a single live cell at the center
    pub fn initialize(dimension: u8, size: usize) -> AutomatonResult<Grid> {
        let dimension = Dimension::try_from(dimension)?;
        if size == 0 {
            return Err(AutomatonError::InvalidSize(size));
        }

        let center = Self::center(size);
        let cells = match dimension {
            Dimension::One => {
                let mut line = vec![DEAD; size];
                line[center] = ALIVE;
                Cells::OneD(line)
            }
            Dimension::Two => {
                let mut rows = vec![vec![DEAD; size]; size];
                rows[center][center] = ALIVE;
                Cells::TwoD(rows)
            }
        };

        debug!("initialized {} grid of size {} with center cell {}", dimension, size, center);
        Ok(Grid::from_cells_unchecked(cells))
    }

    /// 1D grid holding exactly the given cells
    pub fn from_configuration(configuration: &[Cell]) -> AutomatonResult<Grid> {
        Grid::from_line(configuration.to_vec())
    }

    /// Index of the center cell along an axis of `size` cells
    pub fn center(size: usize) -> usize {
        size.saturating_sub(1) / 2
    }

    /// Neighborhood of `position` in canonical order, most significant first
    pub fn extract_neighborhood(grid: &Grid, position: Position) -> AutomatonResult<Vec<Cell>> {
        let size = grid.size();
        match (grid.cells(), position) {
            (Cells::OneD(line), Position::OneD(index)) if index < size => {
                Ok(line_window(line, index).to_vec())
            }
            (Cells::TwoD(rows), Position::TwoD { row, col }) if row < size && col < size => {
                Ok(block_window(rows, row, col).to_vec())
            }
            _ => Err(AutomatonError::PositionOutOfBounds {
                position: position.to_string(),
                size,
            }),
        }
    }

    /// Compute the next generation. The input grid is left untouched.
    pub fn step(grid: &Grid, table: &RuleTable) -> AutomatonResult<Grid> {
        let expected = grid.dimension().neighborhood_size();
        if table.neighborhood_size() != expected {
            return Err(AutomatonError::InvalidNeighborhood(format!(
                "a {} grid needs a {}-cell rule table, got {} cells",
                grid.dimension(),
                expected,
                table.neighborhood_size()
            )));
        }

        // Every cell reads only the previous snapshot, so rows and cells
        // can be computed in any order.
        let cells = match grid.cells() {
            Cells::OneD(line) => Cells::OneD(
                (0..line.len())
                    .into_par_iter()
                    .map(|i| table.lookup(encode(&line_window(line, i))))
                    .collect(),
            ),
            Cells::TwoD(rows) => Cells::TwoD(
                (0..rows.len())
                    .into_par_iter()
                    .map(|r| {
                        (0..rows.len())
                            .map(|c| table.lookup(encode(&block_window(rows, r, c))))
                            .collect::<Vec<_>>()
                    })
                    .collect(),
            ),
        };

        let next = Grid::from_cells_unchecked(cells);
        trace!(
            "stepped {} grid: {} -> {} live cells",
            grid.dimension(),
            grid.living_count(),
            next.living_count()
        );
        Ok(next)
    }

    pub fn is_all_dead(grid: &Grid) -> bool {
        grid.is_all_dead()
    }

    /// Grid of the same shape with every cell alive
    pub fn fill_all_live(grid: &Grid) -> Grid {
        Self::refill(grid, || ALIVE)
    }

    /// Grid of the same shape with independent, uniformly random cells
    pub fn randomize<R: Rng + ?Sized>(grid: &Grid, rng: &mut R) -> Grid {
        Self::refill(grid, || if rng.gen::<bool>() { ALIVE } else { DEAD })
    }

    fn refill(grid: &Grid, mut next_cell: impl FnMut() -> Cell) -> Grid {
        let size = grid.size();
        let cells = match grid.dimension() {
            Dimension::One => Cells::OneD((0..size).map(|_| next_cell()).collect()),
            Dimension::Two => Cells::TwoD(
                (0..size)
                    .map(|_| (0..size).map(|_| next_cell()).collect::<Vec<_>>())
                    .collect(),
            ),
        };
        Grid::from_cells_unchecked(cells)
    }
}

/// Cell at a signed offset from `index`, dead outside the line
#[inline]
fn at(line: &[Cell], index: usize, offset: isize) -> Cell {
    index
        .checked_add_signed(offset)
        .and_then(|i| line.get(i))
        .copied()
        .unwrap_or(DEAD)
}

fn line_window(line: &[Cell], index: usize) -> [Cell; 3] {
    [at(line, index, -1), line[index], at(line, index, 1)]
}

fn block_window(rows: &[Vec<Cell>], row: usize, col: usize) -> [Cell; 9] {
    let mut window = [DEAD; 9];
    for (slot, (dr, dc)) in itertools::iproduct!(-1isize..=1, -1isize..=1).enumerate() {
        window[slot] = row
            .checked_add_signed(dr)
            .and_then(|r| rows.get(r))
            .map_or(DEAD, |r| at(r, col, dc));
    }
    window
}

/// Table index of a window already known to hold binary cells
#[inline]
fn encode(window: &[Cell]) -> usize {
    window.iter().fold(0, |index, &cell| index << 1 | cell as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::io::CellAlphabet;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn line(text: &str) -> Grid {
        let alphabet = CellAlphabet::new('0', '1').unwrap();
        GridEngine::from_configuration(&alphabet.parse(text).unwrap()).unwrap()
    }

    #[test]
    fn test_rule_90_from_single_cell() {
        let table = RuleTable::elementary(90);
        let g0 = GridEngine::initialize(1, 7).unwrap();
        assert_eq!(g0, line("0001000"));

        let g1 = GridEngine::step(&g0, &table).unwrap();
        assert_eq!(g1, line("0010100"));

        let g2 = GridEngine::step(&g1, &table).unwrap();
        assert_eq!(g2, line("0100010"));
    }

    #[test]
    fn test_rule_30_edges_see_dead_border() {
        // 30 maps 001 -> 1 and 100 -> 1
        let table = RuleTable::elementary(30);
        let next = GridEngine::step(&line("10001"), &table).unwrap();
        assert_eq!(next, line("11011"));
    }

    #[test]
    fn test_initialize() {
        let square = GridEngine::initialize(2, 5).unwrap();
        assert_eq!(square.living_count(), 1);
        assert_eq!(square.get(Position::TwoD { row: 2, col: 2 }), Some(ALIVE));

        let single = GridEngine::initialize(2, 1).unwrap();
        assert_eq!(single.living_count(), 1);

        let even = GridEngine::initialize(1, 6).unwrap();
        assert_eq!(even, line("001000"));

        assert_eq!(GridEngine::initialize(3, 5), Err(AutomatonError::InvalidDimension(3)));
        assert_eq!(GridEngine::initialize(1, 0), Err(AutomatonError::InvalidSize(0)));
    }

    #[test]
    fn test_from_configuration_rejects_non_binary() {
        assert!(matches!(
            GridEngine::from_configuration(&[0, 1, 7]),
            Err(AutomatonError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_extract_neighborhood_1d() {
        let grid = line("110");
        assert_eq!(GridEngine::extract_neighborhood(&grid, Position::OneD(0)).unwrap(), vec![0, 1, 1]);
        assert_eq!(GridEngine::extract_neighborhood(&grid, Position::OneD(2)).unwrap(), vec![1, 0, 0]);
        assert!(GridEngine::extract_neighborhood(&grid, Position::OneD(3)).is_err());
        assert!(GridEngine::extract_neighborhood(&grid, Position::TwoD { row: 0, col: 0 }).is_err());
    }

    #[test]
    fn test_extract_neighborhood_2d_corners_and_edges() {
        let all_live = GridEngine::fill_all_live(&Grid::dead(Dimension::Two, 3).unwrap());
        let live_in = |row, col| {
            GridEngine::extract_neighborhood(&all_live, Position::TwoD { row, col })
                .unwrap()
                .iter()
                .filter(|&&c| c == ALIVE)
                .count()
        };
        assert_eq!(live_in(0, 0), 4);
        assert_eq!(live_in(0, 2), 4);
        assert_eq!(live_in(2, 0), 4);
        assert_eq!(live_in(2, 2), 4);
        assert_eq!(live_in(0, 1), 6);
        assert_eq!(live_in(1, 0), 6);
        assert_eq!(live_in(1, 1), 9);

        let grid = Grid::from_rows(vec![
            vec![1, 0, 0],
            vec![0, 0, 0],
            vec![0, 0, 1],
        ])
        .unwrap();
        assert_eq!(
            GridEngine::extract_neighborhood(&grid, Position::TwoD { row: 0, col: 0 }).unwrap(),
            vec![0, 0, 0, 0, 1, 0, 0, 0, 0]
        );
        assert_eq!(
            GridEngine::extract_neighborhood(&grid, Position::TwoD { row: 1, col: 1 }).unwrap(),
            vec![1, 0, 0, 0, 0, 0, 0, 0, 1]
        );
        assert_eq!(
            GridEngine::extract_neighborhood(&grid, Position::TwoD { row: 2, col: 1 }).unwrap(),
            vec![0, 0, 0, 0, 0, 1, 0, 0, 0]
        );
    }

    #[test]
    fn test_2d_step_with_synthetic_table() {
        // a cell is born or survives when its own bit is the only live cell
        // in the block, which makes a lone cell a still life
        let mut entries = vec![DEAD; 512];
        entries[0b000_010_000] = ALIVE;
        let table = RuleTable::from_table(entries).unwrap();

        let seed = GridEngine::initialize(2, 5).unwrap();
        assert_eq!(GridEngine::step(&seed, &table).unwrap(), seed);

        // table with bit 1 set: a cell whose lower-right neighbor alone is live becomes live
        let mut entries = vec![DEAD; 512];
        entries[1] = ALIVE;
        let table = RuleTable::from_table(entries).unwrap();
        let next = GridEngine::step(&seed, &table).unwrap();
        assert_eq!(next.living_count(), 1);
        assert_eq!(next.get(Position::TwoD { row: 1, col: 1 }), Some(ALIVE));
    }

    #[test]
    fn test_life_as_moore_rule() {
        let rule = crate::automaton::parse_rule(
            "47634829485252037513200973884082471888288955642325528262910887637847274372981720534370017768342996036219492316860704401273651054628223608960",
        )
        .unwrap();
        let life = RuleTable::build(&rule, 9).unwrap();

        let horizontal = Grid::from_rows(vec![
            vec![0, 0, 0],
            vec![1, 1, 1],
            vec![0, 0, 0],
        ])
        .unwrap();
        let vertical = Grid::from_rows(vec![
            vec![0, 1, 0],
            vec![0, 1, 0],
            vec![0, 1, 0],
        ])
        .unwrap();
        assert_eq!(GridEngine::step(&horizontal, &life).unwrap(), vertical);
        assert_eq!(GridEngine::step(&vertical, &life).unwrap(), horizontal);

        // a lone cell dies and the dead grid stays dead
        let lonely = GridEngine::step(&GridEngine::initialize(2, 5).unwrap(), &life).unwrap();
        assert!(GridEngine::is_all_dead(&lonely));
        assert!(GridEngine::is_all_dead(&GridEngine::step(&lonely, &life).unwrap()));
    }

    #[test]
    fn test_step_rejects_mismatched_table() {
        let grid = GridEngine::initialize(2, 3).unwrap();
        assert!(matches!(
            GridEngine::step(&grid, &RuleTable::elementary(90)),
            Err(AutomatonError::InvalidNeighborhood(_))
        ));
    }

    #[test]
    fn test_fill_and_randomize() {
        let grid = Grid::dead(Dimension::Two, 4).unwrap();
        let full = GridEngine::fill_all_live(&grid);
        assert_eq!(full.living_count(), 16);
        assert!(grid.is_all_dead());

        let a = GridEngine::randomize(&grid, &mut StdRng::seed_from_u64(7));
        let b = GridEngine::randomize(&grid, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert_eq!(a.size(), 4);
        assert_eq!(a.dimension(), Dimension::Two);

        let wide = Grid::dead(Dimension::One, 512).unwrap();
        let noise = GridEngine::randomize(&wide, &mut StdRng::seed_from_u64(1));
        assert!(noise.living_count() > 0 && noise.living_count() < 512);
    }

    fn arb_grid() -> impl Strategy<Value = Grid> {
        prop_oneof![
            prop::collection::vec(0u8..=1, 1..40).prop_map(|cells| Grid::from_line(cells).unwrap()),
            (1usize..9).prop_flat_map(|size| {
                prop::collection::vec(prop::collection::vec(0u8..=1, size), size)
                    .prop_map(|rows| Grid::from_rows(rows).unwrap())
            }),
        ]
    }

    fn table_for(grid: &Grid, rule: u64, high: u64) -> RuleTable {
        match grid.dimension() {
            Dimension::One => RuleTable::elementary(rule as u8),
            Dimension::Two => {
                let entries = (0..512u64)
                    .map(|k| {
                        let word = if k < 64 { rule } else { high.rotate_left(k as u32) };
                        ((word >> (k % 64)) & 1) as Cell
                    })
                    .collect();
                RuleTable::from_table(entries).unwrap()
            }
        }
    }

    proptest! {
        #[test]
        fn prop_step_preserves_shape_and_input(grid in arb_grid(), rule in any::<u64>(), high in any::<u64>()) {
            let table = table_for(&grid, rule, high);
            let before = grid.clone();
            let next = GridEngine::step(&grid, &table).unwrap();
            prop_assert_eq!(next.dimension(), grid.dimension());
            prop_assert_eq!(next.size(), grid.size());
            prop_assert_eq!(&grid, &before);
        }

        #[test]
        fn prop_step_is_deterministic(grid in arb_grid(), rule in any::<u64>(), high in any::<u64>()) {
            let table = table_for(&grid, rule, high);
            prop_assert_eq!(
                GridEngine::step(&grid, &table).unwrap(),
                GridEngine::step(&grid, &table).unwrap()
            );
        }

        #[test]
        fn prop_step_matches_per_cell_lookup(grid in arb_grid(), rule in any::<u64>(), high in any::<u64>()) {
            let table = table_for(&grid, rule, high);
            let next = GridEngine::step(&grid, &table).unwrap();
            for position in grid.positions() {
                let neighborhood = GridEngine::extract_neighborhood(&grid, position).unwrap();
                prop_assert_eq!(next.get(position), Some(table.next_state(&neighborhood).unwrap()));
            }
        }

        #[test]
        fn prop_even_rules_keep_dead_grids_dead(size in 1usize..9, rule in (0u8..128).prop_map(|r| r * 2), two_d in any::<bool>()) {
            let dimension = if two_d { Dimension::Two } else { Dimension::One };
            let grid = Grid::dead(dimension, size).unwrap();
            let table = if two_d {
                let mut entries = RuleTable::elementary(rule).table().to_vec();
                entries.resize(512, ALIVE);
                RuleTable::from_table(entries).unwrap()
            } else {
                RuleTable::elementary(rule)
            };
            let next = GridEngine::step(&grid, &table).unwrap();
            prop_assert!(GridEngine::is_all_dead(&next));
        }
    }
}
