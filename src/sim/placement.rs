//! Procedural placement of food and obstacles
//!
//! Uniform rejection sampling over the whole grid. This is the only source
//! of randomness in the simulation, and the only loop whose length depends on
//! luck, so every draw is bounded by [`MAX_PLACEMENT_ATTEMPTS`].

use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use thiserror::Error;

use super::state::Point;
use crate::consts::*;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("cannot place {requested} cells with {excluded} excluded on a {cells}-cell grid")]
    InsufficientCapacity {
        requested: usize,
        excluded: usize,
        cells: usize,
    },
    #[error("no free cell found after {attempts} attempts")]
    AttemptsExhausted { attempts: u32 },
}

/// Seeded placement generator
#[derive(Debug, Clone)]
pub struct Placement {
    seed: u64,
    rng: Pcg32,
    max_attempts: u32,
}

impl Placement {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            max_attempts: MAX_PLACEMENT_ATTEMPTS,
        }
    }

    /// Seed from the thread RNG
    pub fn from_entropy() -> Self {
        Self::new(rand::rng().random())
    }

    /// Override the per-cell retry ceiling
    #[cfg(test)]
    pub(crate) fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Place `count` distinct obstacles, none in `exclude`
    pub fn obstacles<'a>(
        &mut self,
        count: usize,
        exclude: impl IntoIterator<Item = &'a Point>,
    ) -> Result<Vec<Point>, PlacementError> {
        let mut taken: HashSet<Point> = exclude.into_iter().copied().collect();
        check_capacity(count, taken.len())?;

        let mut placed = Vec::with_capacity(count);
        while placed.len() < count {
            let p = self.free_cell(&taken)?;
            taken.insert(p);
            placed.push(p);
        }
        Ok(placed)
    }

    /// Place one food item on a cell not in `occupied`
    pub fn food<'a>(
        &mut self,
        occupied: impl IntoIterator<Item = &'a Point>,
    ) -> Result<Point, PlacementError> {
        let taken: HashSet<Point> = occupied.into_iter().copied().collect();
        check_capacity(1, taken.len())?;
        self.free_cell(&taken)
    }

    fn free_cell(&mut self, taken: &HashSet<Point>) -> Result<Point, PlacementError> {
        for _ in 0..self.max_attempts {
            let candidate = self.random_cell();
            if !taken.contains(&candidate) {
                return Ok(candidate);
            }
        }
        log::error!(
            "Placement gave up after {} draws with {} cells taken",
            self.max_attempts,
            taken.len()
        );
        Err(PlacementError::AttemptsExhausted {
            attempts: self.max_attempts,
        })
    }

    fn random_cell(&mut self) -> Point {
        Point::new(
            self.rng.random_range(0..GRID_SIZE),
            self.rng.random_range(0..GRID_SIZE),
        )
    }
}

fn check_capacity(requested: usize, excluded: usize) -> Result<(), PlacementError> {
    if requested + excluded > GRID_CELLS {
        return Err(PlacementError::InsufficientCapacity {
            requested,
            excluded,
            cells: GRID_CELLS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn all_cells() -> Vec<Point> {
        (0..GRID_SIZE)
            .flat_map(|y| (0..GRID_SIZE).map(move |x| Point::new(x, y)))
            .collect()
    }

    #[test]
    fn test_obstacles_distinct_and_excluded() {
        let mut placement = Placement::new(42);
        let exclude = [Point::new(10, 10), Point::new(10, 11), Point::new(10, 12)];
        let obstacles = placement.obstacles(30, &exclude).unwrap();

        assert_eq!(obstacles.len(), 30);
        let unique: HashSet<_> = obstacles.iter().copied().collect();
        assert_eq!(unique.len(), 30);
        for p in &obstacles {
            assert!(p.in_bounds());
            assert!(!exclude.contains(p));
        }
    }

    #[test]
    fn test_food_finds_last_free_cell() {
        let mut cells = all_cells();
        let free = cells.remove(137);
        let mut placement = Placement::new(7).with_max_attempts(1_000_000);
        assert_eq!(placement.food(&cells).unwrap(), free);
    }

    #[test]
    fn test_full_grid_fails_fast() {
        let cells = all_cells();
        let mut placement = Placement::new(1);
        assert_eq!(
            placement.food(&cells),
            Err(PlacementError::InsufficientCapacity {
                requested: 1,
                excluded: GRID_CELLS,
                cells: GRID_CELLS,
            })
        );
        assert_eq!(
            placement.obstacles(5, &cells[2..]),
            Err(PlacementError::InsufficientCapacity {
                requested: 5,
                excluded: GRID_CELLS - 2,
                cells: GRID_CELLS,
            })
        );
    }

    #[test]
    fn test_obstacles_fill_remaining_cells() {
        let cells = all_cells();
        let mut placement = Placement::new(1).with_max_attempts(1_000_000);
        let obstacles = placement.obstacles(5, &cells[10..]).unwrap();

        let unique: HashSet<_> = obstacles.iter().copied().collect();
        assert_eq!(unique.len(), 5);
        assert!(obstacles.iter().all(|p| cells[..10].contains(p)));
    }

    #[test]
    fn test_retry_ceiling() {
        let mut cells = all_cells();
        cells.pop();
        // One free cell out of 400 and a single draw: almost surely misses.
        let mut placement = Placement::new(3).with_max_attempts(1);
        let mut failures = 0;
        for _ in 0..20 {
            if placement.food(&cells).is_err() {
                failures += 1;
            }
        }
        assert!(failures > 0);
    }

    #[test]
    fn test_same_seed_same_layout() {
        let mut a = Placement::new(99);
        let mut b = Placement::new(99);
        assert_eq!(a.obstacles(15, &[]).unwrap(), b.obstacles(15, &[]).unwrap());
        assert_eq!(a.seed(), 99);
    }

    proptest! {
        #[test]
        fn proptest_food_avoids_occupied(
            seed in any::<u64>(),
            occupied in proptest::collection::vec((0..GRID_SIZE, 0..GRID_SIZE), 0..200),
        ) {
            let occupied: Vec<Point> = occupied
                .into_iter()
                .map(|(x, y)| Point::new(x, y))
                .collect();
            let mut placement = Placement::new(seed);
            let food = placement.food(&occupied).unwrap();
            prop_assert!(food.in_bounds());
            prop_assert!(!occupied.contains(&food));
        }
    }
}
