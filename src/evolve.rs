use crate::{board::Board, rule::Rule};
use rustc_hash::FxHashMap;
use tracing::{debug, debug_span};

/// Offsets of the Moore neighborhood.
const NEIGHBORHOOD: [(i64, i64); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// The Moore neighbors of `(x, y)` that are representable as `i64`.
fn neighbors(x: i64, y: i64) -> impl Iterator<Item = (i64, i64)> {
    NEIGHBORHOOD
        .into_iter()
        .filter_map(move |(dx, dy)| Some((x.checked_add(dx)?, y.checked_add(dy)?)))
}

/// Neighbor counts memoized for the duration of a single step.
#[derive(Default, Debug)]
struct NeighborCounts {
    counts: FxHashMap<(i64, i64), u8>,
}

impl NeighborCounts {
    fn get(&mut self, board: &Board, x: i64, y: i64) -> u8 {
        *self
            .counts
            .entry((x, y))
            .or_insert_with(|| board.living_neighbor_count(x, y))
    }

    fn len(&self) -> usize {
        self.counts.len()
    }
}

impl Board {
    /// Number of living cells among the eight neighbors of `(x, y)`.
    /// Neighbors beyond the `i64` range count as dead.
    pub fn living_neighbor_count(&self, x: i64, y: i64) -> u8 {
        neighbors(x, y).filter(|&(nx, ny)| self.is_set(nx, ny)).count() as u8
    }

    /// Advances the board by one generation.
    ///
    /// Only living cells and their neighbors are examined; the new tree is
    /// built from scratch and replaces the old one. Cells that would be born
    /// beyond the `i64` range are not created.
    pub fn next_generation(&mut self) {
        let span = debug_span!("next_generation", generation = self.generation);
        let _enter = span.enter();

        let rule = Rule::LIFE;
        let mut counts = NeighborCounts::default();
        let mut next = Board::with_generation(self.generation + 1);
        for (x, y) in self.living_cells() {
            if rule.survives(counts.get(self, x, y)) {
                next.set(x, y);
            }
            for (nx, ny) in neighbors(x, y) {
                if !self.is_set(nx, ny) && rule.is_born(counts.get(self, nx, ny)) {
                    next.set(nx, ny);
                }
            }
        }

        debug!(
            generation = next.generation,
            population = next.population(),
            size = next.bounding_square().map_or(0, |square| square.size),
            cached_counts = counts.len(),
            "stepped"
        );
        *self = next;
    }

    /// Advances the board by `generations` generations.
    pub fn step(&mut self, generations: u64) -> &mut Self {
        for _ in 0..generations {
            self.next_generation();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted_cells(board: &Board) -> Vec<(i64, i64)> {
        let mut cells: Vec<_> = board.living_cells().collect();
        cells.sort();
        cells
    }

    #[test]
    fn test_neighbor_count() {
        let mut board = Board::new();
        board.set(0, 0);
        assert_eq!(board.living_neighbor_count(0, 0), 0);
        assert_eq!(board.living_neighbor_count(1, 1), 1);
        assert_eq!(board.living_neighbor_count(5, 5), 0);
        assert_eq!(board.living_neighbor_count(-100, 3), 0);
        for (x, y) in neighbors(0, 0) {
            board.set(x, y);
        }
        assert_eq!(board.living_neighbor_count(0, 0), 8);
        assert_eq!(board.living_neighbor_count(2, 0), 3);
    }

    #[test]
    fn test_cache_scoped_to_step() {
        let mut board: Board = vec![(0, 0), (1, 0), (2, 0)].into_iter().collect();
        assert_eq!(board.living_neighbor_count(1, -1), 3);
        board.next_generation();
        // The vertical phase has only (1, 0) next to (1, -1).
        assert_eq!(board.living_neighbor_count(1, -1), 1);
        assert_eq!(board.living_neighbor_count(0, 0), 3);
    }

    #[test]
    fn test_counts_are_memoized() {
        let before: Board = vec![(0, 0), (1, 0), (2, 0)].into_iter().collect();
        let after: Board = vec![(1, 0)].into_iter().collect();
        let mut counts = NeighborCounts::default();
        assert_eq!(counts.get(&before, 1, -1), 3);
        assert_eq!(counts.len(), 1);
        // The stored value wins over a board with a different neighborhood.
        assert_eq!(counts.get(&after, 1, -1), 3);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts.get(&after, 1, 1), 1);
        assert_eq!(counts.len(), 2);
        // A new step starts from an empty memo.
        let mut counts = NeighborCounts::default();
        assert_eq!(counts.len(), 0);
        assert_eq!(counts.get(&after, 1, -1), 1);
    }

    #[test]
    fn test_edge_of_plane() {
        let mut board = Board::new();
        board.set(i64::MAX, 0);
        assert_eq!(board.living_neighbor_count(i64::MAX, 0), 0);
        board.set(i64::MIN, i64::MIN);
        assert_eq!(board.living_neighbor_count(i64::MIN, i64::MIN), 0);
        board.next_generation();
        assert_eq!(board.population(), 0);

        // A vertical blinker on the last column: the birth at `i64::MAX + 1`
        // is dropped, leaving a domino.
        let mut board: Board = vec![(i64::MAX, -1), (i64::MAX, 0), (i64::MAX, 1)]
            .into_iter()
            .collect();
        assert_eq!(board.living_neighbor_count(i64::MAX, 0), 2);
        board.next_generation();
        assert_eq!(sorted_cells(&board), vec![(i64::MAX - 1, 0), (i64::MAX, 0)]);
        board.next_generation();
        assert_eq!(board.population(), 0);

        let mut board: Board = vec![(i64::MIN, 5), (i64::MIN + 1, 5), (i64::MIN + 2, 5)]
            .into_iter()
            .collect();
        board.step(2);
        assert_eq!(
            sorted_cells(&board),
            vec![(i64::MIN, 5), (i64::MIN + 1, 5), (i64::MIN + 2, 5)]
        );
    }

    #[test]
    fn test_lonely_cells_die() {
        let mut board: Board = vec![(0, 0), (10, 10), (10, 11)].into_iter().collect();
        board.next_generation();
        assert_eq!(board.population(), 0);
        assert_eq!(board.generation(), 2);
        board.next_generation();
        assert_eq!(board.is_empty(), true);
        assert_eq!(board.generation(), 3);
    }

    #[test]
    fn test_birth() {
        // An L-tromino becomes a block.
        let mut board: Board = vec![(0, 0), (1, 0), (0, 1)].into_iter().collect();
        board.next_generation();
        assert_eq!(sorted_cells(&board), vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn test_overcrowding() {
        // The center of a plus sign has four neighbors and dies.
        let mut board: Board = vec![(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)]
            .into_iter()
            .collect();
        board.next_generation();
        assert_eq!(board.is_set(0, 0), false);
        assert_eq!(
            sorted_cells(&board),
            vec![
                (-1, -1),
                (-1, 0),
                (-1, 1),
                (0, -1),
                (0, 1),
                (1, -1),
                (1, 0),
                (1, 1)
            ]
        );
    }

    #[test]
    fn test_step() {
        let mut board: Board = vec![(10, 10), (11, 10), (12, 10)].into_iter().collect();
        let start = board.generation();
        board.step(5);
        assert_eq!(board.generation(), start + 5);
        assert_eq!(sorted_cells(&board), vec![(11, 9), (11, 10), (11, 11)]);
    }
}
