//! Generation-by-generation simulation runs

use crate::automaton::{load_grid_from_file, Cells, Dimension, Grid, GridEngine, RuleTable};
use crate::config::{SeedStrategy, Settings};
use crate::errors::{AutomatonError, AutomatonResult};
use anyhow::{Context, Result};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

/// One generation produced by a [`Simulation`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub index: usize,
    pub grid: Grid,
}

/// Serializable view of a generation
#[derive(Debug, Serialize)]
pub struct GenerationRecord<'a> {
    pub generation: usize,
    pub dimension: Dimension,
    pub size: usize,
    pub living: usize,
    pub cells: &'a Cells,
}

impl Generation {
    pub fn record(&self) -> GenerationRecord<'_> {
        GenerationRecord {
            generation: self.index,
            dimension: self.grid.dimension(),
            size: self.grid.size(),
            living: self.grid.living_count(),
            cells: self.grid.cells(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.record())
    }
}

/// Iterator over the generations of one automaton under a fixed rule.
///
/// The first item is the seed grid. Only the upcoming generation is kept.
#[derive(Debug, Clone)]
pub struct Simulation {
    table: RuleTable,
    upcoming: Option<Grid>,
    index: usize,
    generation_limit: Option<usize>,
    stop_when_dead: bool,
}

impl Simulation {
    /// Start from `initial`. Fails when the table does not fit the grid's dimension.
    pub fn new(initial: Grid, table: RuleTable) -> AutomatonResult<Self> {
        let expected = initial.dimension().neighborhood_size();
        if table.neighborhood_size() != expected {
            return Err(AutomatonError::InvalidNeighborhood(format!(
                "a {} grid needs a {}-cell rule table, got {} cells",
                initial.dimension(),
                expected,
                table.neighborhood_size()
            )));
        }

        Ok(Self {
            table,
            upcoming: Some(initial),
            index: 0,
            generation_limit: None,
            stop_when_dead: false,
        })
    }

    /// Yield at most `limit` generations, the seed included
    pub fn with_generation_limit(mut self, limit: usize) -> Self {
        self.generation_limit = Some(limit);
        self
    }

    /// End after the first generation without live cells
    pub fn stop_when_dead(mut self, stop: bool) -> Self {
        self.stop_when_dead = stop;
        self
    }

    /// Build the rule table and seed grid described by `settings`
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;

        let table = settings.rule_table()?;
        let seed = seed_grid(settings)?;
        info!(
            "simulating rule {} on a {} grid of size {} for {} generations",
            table.rule(),
            seed.dimension(),
            seed.size(),
            settings.simulation.steps
        );

        Ok(Self::new(seed, table)?
            .with_generation_limit(settings.simulation.steps)
            .stop_when_dead(settings.simulation.stop_when_dead))
    }
}

impl Iterator for Simulation {
    type Item = Generation;

    fn next(&mut self) -> Option<Generation> {
        if self.generation_limit.is_some_and(|limit| self.index >= limit) {
            self.upcoming = None;
        }
        let grid = self.upcoming.take()?;

        let last = self.generation_limit.is_some_and(|limit| self.index + 1 >= limit)
            || (self.stop_when_dead && grid.is_all_dead());
        if last {
            debug!("simulation ends at generation {}", self.index);
        } else {
            // the table was matched to the grid's dimension in `new`
            self.upcoming = GridEngine::step(&grid, &self.table).ok();
        }

        let generation = Generation {
            index: self.index,
            grid,
        };
        self.index += 1;
        Some(generation)
    }
}

/// Seed grid for the configured strategy
pub fn seed_grid(settings: &Settings) -> Result<Grid> {
    let simulation = &settings.simulation;
    let dimension = simulation.dimension;
    let size = simulation.size;

    let grid = match simulation.seed.strategy {
        SeedStrategy::Center => GridEngine::initialize(dimension.into(), size)?,
        SeedStrategy::AllLive => GridEngine::fill_all_live(&Grid::dead(dimension, size)?),
        SeedStrategy::Random => {
            let mut rng = match simulation.seed.random_seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            GridEngine::randomize(&Grid::dead(dimension, size)?, &mut rng)
        }
        SeedStrategy::Configuration => {
            let text = simulation
                .seed
                .configuration
                .as_deref()
                .context("Seed strategy 'configuration' needs a configuration string")?;
            let cells = settings.alphabet()?.parse(text)?;
            GridEngine::from_configuration(&cells)?
        }
        SeedStrategy::File => {
            let path = simulation
                .seed
                .grid_file
                .as_ref()
                .context("Seed strategy 'file' needs a grid_file")?;
            load_grid_from_file(path, dimension, &settings.alphabet()?)?
        }
    };

    debug!("seeded {} grid with {} live cells", grid.dimension(), grid.living_count());
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{save_grid_to_file, CellAlphabet};
    use tempfile::tempdir;

    fn rule_90_seven() -> Simulation {
        Simulation::new(GridEngine::initialize(1, 7).unwrap(), RuleTable::elementary(90)).unwrap()
    }

    fn render(generations: impl Iterator<Item = Generation>) -> Vec<String> {
        let alphabet = CellAlphabet::new('0', '1').unwrap();
        generations
            .map(|g| alphabet.render(&g.grid).trim_end().to_string())
            .collect()
    }

    #[test]
    fn test_generation_limit() {
        let lines = render(rule_90_seven().with_generation_limit(3));
        assert_eq!(lines, vec!["0001000", "0010100", "0100010"]);

        assert_eq!(rule_90_seven().with_generation_limit(0).count(), 0);
        assert_eq!(rule_90_seven().with_generation_limit(1).count(), 1);
    }

    #[test]
    fn test_indices_are_sequential() {
        let indices: Vec<_> = rule_90_seven().take(5).map(|g| g.index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_stop_when_dead() {
        // rule 0 kills everything in one step
        let seed = GridEngine::initialize(1, 5).unwrap();
        let run = Simulation::new(seed, RuleTable::elementary(0))
            .unwrap()
            .with_generation_limit(10)
            .stop_when_dead(true);
        let generations: Vec<_> = run.collect();
        assert_eq!(generations.len(), 2);
        assert!(generations[1].grid.is_all_dead());

        let seed = GridEngine::initialize(1, 5).unwrap();
        let run = Simulation::new(seed, RuleTable::elementary(0))
            .unwrap()
            .with_generation_limit(10);
        assert_eq!(run.count(), 10);
    }

    #[test]
    fn test_mismatched_table() {
        let seed = GridEngine::initialize(2, 3).unwrap();
        assert!(Simulation::new(seed, RuleTable::elementary(90)).is_err());
    }

    #[test]
    fn test_from_settings_defaults() {
        let settings = Settings::default();
        let generations: Vec<_> = Simulation::from_settings(&settings).unwrap().collect();
        assert_eq!(generations.len(), 50);
        assert_eq!(generations[0].grid.size(), 101);
        assert_eq!(generations[0].grid.living_count(), 1);
        // rule 90 draws a Sierpinski triangle: row n has 2^popcount(n) cells
        assert_eq!(generations[7].grid.living_count(), 8);
    }

    #[test]
    fn test_from_settings_configuration() {
        let mut settings = Settings::default();
        settings.simulation.seed.strategy = SeedStrategy::Configuration;
        settings.simulation.seed.configuration = Some("   *   ".to_string());
        settings.simulation.steps = 2;

        let generations: Vec<_> = Simulation::from_settings(&settings).unwrap().collect();
        let alphabet = settings.alphabet().unwrap();
        assert_eq!(alphabet.format(&generations[1].grid.iter().collect::<Vec<_>>()), "  * *  ");

        settings.simulation.seed.configuration = Some("  x  ".to_string());
        let err = Simulation::from_settings(&settings).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AutomatonError>(),
            Some(AutomatonError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_from_settings_random_is_reproducible() {
        let mut settings = Settings::default();
        settings.simulation.dimension = Dimension::Two;
        settings.simulation.size = 6;
        settings.simulation.steps = 3;
        settings.simulation.seed.strategy = SeedStrategy::Random;
        settings.simulation.seed.random_seed = Some(42);

        let a: Vec<_> = Simulation::from_settings(&settings).unwrap().collect();
        let b: Vec<_> = Simulation::from_settings(&settings).unwrap().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_settings_all_live_2d() {
        let mut settings = Settings::default();
        settings.simulation.dimension = Dimension::Two;
        settings.simulation.size = 4;
        settings.simulation.seed.strategy = SeedStrategy::AllLive;
        let seed = seed_grid(&settings).unwrap();
        assert_eq!(seed.living_count(), 16);
    }

    #[test]
    fn test_from_settings_grid_file() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("seed.txt");
        let mut settings = Settings::default();
        let alphabet = settings.alphabet().unwrap();
        save_grid_to_file(&GridEngine::initialize(2, 3).unwrap(), &path, &alphabet).unwrap();

        settings.simulation.seed.strategy = SeedStrategy::File;
        settings.simulation.seed.grid_file = Some(path);
        assert!(seed_grid(&settings).is_err());

        settings.simulation.dimension = Dimension::Two;
        let seed = seed_grid(&settings).unwrap();
        assert_eq!(seed.size(), 3);
        assert_eq!(seed.living_count(), 1);
    }

    #[test]
    fn test_single_cell_square_reseeds_as_2d() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("final.txt");
        let mut settings = Settings::default();
        settings.simulation.dimension = Dimension::Two;
        settings.simulation.size = 1;
        settings.simulation.steps = 1;
        let alphabet = settings.alphabet().unwrap();

        let last = Simulation::from_settings(&settings).unwrap().last().unwrap();
        save_grid_to_file(&last.grid, &path, &alphabet).unwrap();

        settings.simulation.seed.strategy = SeedStrategy::File;
        settings.simulation.seed.grid_file = Some(path);
        let seed = seed_grid(&settings).unwrap();
        assert_eq!(seed.dimension(), Dimension::Two);
        assert_eq!(seed.cells(), &Cells::TwoD(vec![vec![1]]));
    }

    #[test]
    fn test_generation_json() {
        let generation = rule_90_seven().next().unwrap();
        assert_eq!(
            generation.to_json().unwrap(),
            r#"{"generation":0,"dimension":1,"size":7,"living":1,"cells":[0,0,0,1,0,0,0]}"#
        );
    }
}
