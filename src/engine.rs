use rand::Rng;

pub const DEFAULT_ALIVE_PROBABILITY: f64 = 0.3;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("cell ({row}, {col}) out of range for {size}x{size} grid")]
    OutOfRange { row: usize, col: usize, size: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Life board plus generation counter. Bounds policy: queries on a bad
/// coordinate return `OutOfRange`, mutators silently drop it.
#[derive(Clone)]
pub struct Engine {
    size: usize,
    cells: Vec<Vec<bool>>,
    generation: u64,
    alive_probability: f64,
}

impl Engine {
    pub fn new(size: usize) -> Result<Self> {
        Self::with_probability(size, DEFAULT_ALIVE_PROBABILITY)
    }

    pub fn with_probability(size: usize, alive_probability: f64) -> Result<Self> {
        if size == 0 {
            return Err(Error::InvalidArgument("grid size must be positive".into()));
        }
        check_probability(alive_probability)?;

        Ok(Engine {
            size,
            cells: vec![vec![false; size]; size],
            generation: 0,
            alive_probability,
        })
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Read-only view of the board, row-major.
    #[inline]
    pub fn rows(&self) -> &[Vec<bool>] {
        &self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> Result<bool> {
        if row >= self.size || col >= self.size {
            return Err(Error::OutOfRange { row, col, size: self.size });
        }
        Ok(self.cells[row][col])
    }

    pub fn set(&mut self, row: usize, col: usize, alive: bool) {
        if row < self.size && col < self.size {
            self.cells[row][col] = alive;
        }
    }

    pub fn toggle(&mut self, row: usize, col: usize) {
        if row < self.size && col < self.size {
            self.cells[row][col] = !self.cells[row][col];
        }
    }

    pub fn clear(&mut self) {
        for row in self.cells.iter_mut() {
            row.fill(false);
        }
        self.generation = 0;
    }

    /// Hard reset to an all-dead board of the new size. Old content is
    /// never carried over.
    pub fn resize(&mut self, new_size: usize) -> Result<()> {
        if new_size == 0 {
            return Err(Error::InvalidArgument("grid size must be positive".into()));
        }
        self.size = new_size;
        self.cells = vec![vec![false; new_size]; new_size];
        self.generation = 0;
        Ok(())
    }

    pub fn randomize(&mut self) {
        // probability was validated at construction
        let _ = self.randomize_with(self.alive_probability);
    }

    pub fn randomize_with(&mut self, alive_probability: f64) -> Result<()> {
        check_probability(alive_probability)?;
        let mut rng = rand::thread_rng();
        for row in self.cells.iter_mut() {
            for cell in row.iter_mut() {
                *cell = rng.gen_bool(alive_probability);
            }
        }
        self.generation = 0;
        Ok(())
    }

    /// Clears the board, then overlays `pattern` at the signed origin.
    /// Cells falling outside the board are dropped; ragged rows are fine.
    /// The origin may be negative so that a pattern wider than the board
    /// still centers on it.
    pub fn stamp_pattern(&mut self, pattern: &[Vec<bool>], origin_row: isize, origin_col: isize) {
        self.clear();
        for (i, row) in pattern.iter().enumerate() {
            for (j, &alive) in row.iter().enumerate() {
                let r = origin_row + i as isize;
                let c = origin_col + j as isize;
                if r >= 0 && c >= 0 {
                    self.set(r as usize, c as usize, alive);
                }
            }
        }
    }

    pub fn living_count(&self) -> usize {
        self.cells
            .iter()
            .map(|row| row.iter().filter(|&&c| c).count())
            .sum()
    }

    /// Live cells among the 8 Moore neighbors; off-board positions count
    /// as dead (absorbing boundary, no wraparound).
    pub fn count_neighbors(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.size || col >= self.size {
            return Err(Error::OutOfRange { row, col, size: self.size });
        }
        Ok(self.neighbors_of(row, col))
    }

    fn neighbors_of(&self, row: usize, col: usize) -> usize {
        let mut count = 0;
        for di in -1isize..=1 {
            for dj in -1isize..=1 {
                if di == 0 && dj == 0 {
                    continue;
                }
                if self.neighbor(row as isize + di, col as isize + dj) {
                    count += 1;
                }
            }
        }
        count
    }

    #[inline]
    fn neighbor(&self, i: isize, j: isize) -> bool {
        if i < 0 || j < 0 || i >= self.size as isize || j >= self.size as isize {
            false
        } else {
            self.cells[i as usize][j as usize]
        }
    }

    /// Advance one generation. The next board is computed entirely from the
    /// current one and committed in a single replacement, so neighbor counts
    /// never see half-updated state.
    pub fn step(&mut self) {
        let mut next = vec![vec![false; self.size]; self.size];
        for i in 0..self.size {
            for j in 0..self.size {
                let n = self.neighbors_of(i, j);
                next[i][j] = match (self.cells[i][j], n) {
                    (true, 2) | (true, 3) => true,
                    (false, 3) => true,
                    _ => false,
                };
            }
        }
        self.cells = next;
        self.generation += 1;
    }
}

fn check_probability(p: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(Error::InvalidArgument(format!(
            "alive probability must be within [0, 1], got {p}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns;

    fn seed(engine: &mut Engine, alive: &[(usize, usize)]) {
        for &(r, c) in alive {
            engine.set(r, c, true);
        }
    }

    fn alive_cells(engine: &Engine) -> Vec<(usize, usize)> {
        let mut out = vec![];
        for (i, row) in engine.rows().iter().enumerate() {
            for (j, &c) in row.iter().enumerate() {
                if c {
                    out.push((i, j));
                }
            }
        }
        out
    }

    #[test]
    fn new_rejects_zero_size() {
        assert!(matches!(Engine::new(0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn new_board_is_dead_at_generation_zero() {
        let engine = Engine::new(4).unwrap();
        assert_eq!(engine.size(), 4);
        assert_eq!(engine.generation(), 0);
        assert_eq!(engine.living_count(), 0);
    }

    #[test]
    fn probability_out_of_unit_interval_is_rejected() {
        assert!(Engine::with_probability(4, 1.5).is_err());
        assert!(Engine::with_probability(4, -0.1).is_err());
        let mut engine = Engine::new(4).unwrap();
        assert!(matches!(
            engine.randomize_with(2.0),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn get_out_of_range_fails_loudly() {
        let engine = Engine::new(3).unwrap();
        assert!(matches!(
            engine.get(3, 0),
            Err(Error::OutOfRange { row: 3, col: 0, size: 3 })
        ));
        assert!(engine.get(0, 3).is_err());
        assert!(engine.get(2, 2).is_ok());
    }

    #[test]
    fn set_and_toggle_out_of_range_are_silent() {
        let mut engine = Engine::new(3).unwrap();
        engine.set(5, 5, true);
        engine.toggle(3, 0);
        assert_eq!(engine.living_count(), 0);

        engine.set(1, 1, true);
        assert!(engine.get(1, 1).unwrap());
        engine.toggle(1, 1);
        assert!(!engine.get(1, 1).unwrap());
    }

    #[test]
    fn point_edits_do_not_touch_generation() {
        let mut engine = Engine::new(5).unwrap();
        seed(&mut engine, &[(2, 1), (2, 2), (2, 3)]);
        engine.step();
        assert_eq!(engine.generation(), 1);
        engine.set(0, 0, true);
        engine.toggle(0, 1);
        assert_eq!(engine.generation(), 1);
    }

    #[test]
    fn neighbor_count_stays_within_moore_bounds() {
        let mut engine = Engine::new(3).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                engine.set(i, j, true);
            }
        }
        for i in 0..3 {
            for j in 0..3 {
                let n = engine.count_neighbors(i, j).unwrap();
                assert!(n <= 8, "cell ({i}, {j}) counted {n} neighbors");
            }
        }
        // full 3x3 block: center sees all 8, corners see 3, edges see 5
        assert_eq!(engine.count_neighbors(1, 1).unwrap(), 8);
        assert_eq!(engine.count_neighbors(0, 0).unwrap(), 3);
        assert_eq!(engine.count_neighbors(0, 1).unwrap(), 5);
    }

    #[test]
    fn boundary_is_absorbing() {
        // live column hugging the left edge; nothing wraps from the right
        let mut engine = Engine::new(4).unwrap();
        seed(&mut engine, &[(0, 0), (1, 0), (2, 0)]);
        assert_eq!(engine.count_neighbors(1, 0).unwrap(), 2);
        assert_eq!(engine.count_neighbors(1, 3).unwrap(), 0);
        assert!(engine.count_neighbors(4, 0).is_err());
    }

    #[test]
    fn rule_table() {
        // center cell of a 3x3 board, all neighbor counts 0..=8
        for neighbors in 0..=8usize {
            for center_alive in [false, true] {
                let mut engine = Engine::new(3).unwrap();
                engine.set(1, 1, center_alive);
                let spots = [
                    (0, 0), (0, 1), (0, 2),
                    (1, 0), (1, 2),
                    (2, 0), (2, 1), (2, 2),
                ];
                for &(r, c) in spots.iter().take(neighbors) {
                    engine.set(r, c, true);
                }
                engine.step();
                let expect = match (center_alive, neighbors) {
                    (true, 2) | (true, 3) => true,
                    (false, 3) => true,
                    _ => false,
                };
                assert_eq!(
                    engine.get(1, 1).unwrap(),
                    expect,
                    "alive={center_alive} neighbors={neighbors}"
                );
            }
        }
    }

    #[test]
    fn step_increments_generation_by_one() {
        let mut engine = Engine::new(5).unwrap();
        engine.step();
        engine.step();
        assert_eq!(engine.generation(), 2);
    }

    #[test]
    fn blinker_oscillates() {
        // horizontal blinker centered on 5x5; one step must produce the
        // vertical phase, which an in-place update would get wrong
        let mut engine = Engine::new(5).unwrap();
        seed(&mut engine, &[(2, 1), (2, 2), (2, 3)]);

        engine.step();
        assert_eq!(alive_cells(&engine), vec![(1, 2), (2, 2), (3, 2)]);

        engine.step();
        assert_eq!(alive_cells(&engine), vec![(2, 1), (2, 2), (2, 3)]);
        assert_eq!(engine.generation(), 2);
    }

    #[test]
    fn glider_translates_by_one_down_right_every_four_steps() {
        let mut engine = Engine::new(12).unwrap();
        let glider = patterns::find("glider").unwrap().cells();
        engine.stamp_pattern(&glider, 1, 1);
        let before = alive_cells(&engine);

        for _ in 0..4 {
            engine.step();
        }

        let shifted: Vec<_> = before.iter().map(|&(r, c)| (r + 1, c + 1)).collect();
        assert_eq!(alive_cells(&engine), shifted);
        assert_eq!(engine.generation(), 4);
    }

    #[test]
    fn randomize_extremes_are_deterministic() {
        let mut engine = Engine::new(6).unwrap();
        engine.randomize_with(1.0).unwrap();
        assert_eq!(engine.living_count(), 36);
        assert_eq!(engine.generation(), 0);

        engine.step();
        engine.randomize_with(0.0).unwrap();
        assert_eq!(engine.living_count(), 0);
        assert_eq!(engine.generation(), 0);
    }

    #[test]
    fn clear_kills_everything_and_resets_generation() {
        let mut engine = Engine::new(5).unwrap();
        engine.randomize_with(1.0).unwrap();
        engine.step();
        engine.clear();
        assert_eq!(engine.living_count(), 0);
        assert_eq!(engine.generation(), 0);
    }

    #[test]
    fn resize_is_a_hard_reset() {
        let mut engine = Engine::new(4).unwrap();
        engine.randomize_with(1.0).unwrap();
        engine.step();

        engine.resize(7).unwrap();
        assert_eq!(engine.size(), 7);
        assert_eq!(engine.living_count(), 0);
        assert_eq!(engine.generation(), 0);
        assert!(engine.get(6, 6).is_ok());

        assert!(engine.resize(0).is_err());
    }

    #[test]
    fn stamp_replaces_existing_state() {
        let mut engine = Engine::new(6).unwrap();
        engine.randomize_with(1.0).unwrap();
        engine.step();

        let block = vec![vec![true, true], vec![true, true]];
        engine.stamp_pattern(&block, 2, 2);
        assert_eq!(engine.living_count(), 4);
        assert_eq!(engine.generation(), 0);
        assert!(engine.get(2, 2).unwrap() && engine.get(3, 3).unwrap());
    }

    #[test]
    fn stamp_drops_cells_past_the_far_edge() {
        let mut engine = Engine::new(4).unwrap();
        let row = vec![vec![true, true, true, true]];
        engine.stamp_pattern(&row, 3, 2);
        // only columns 2 and 3 of row 3 fit
        assert_eq!(alive_cells(&engine), vec![(3, 2), (3, 3)]);
    }

    #[test]
    fn stamp_with_negative_origin_keeps_the_visible_part() {
        let mut engine = Engine::new(3).unwrap();
        let block = vec![vec![true, true], vec![true, true]];
        engine.stamp_pattern(&block, -1, -1);
        assert_eq!(alive_cells(&engine), vec![(0, 0)]);
    }

    #[test]
    fn stamp_tolerates_ragged_rows() {
        let mut engine = Engine::new(4).unwrap();
        let ragged = vec![vec![true], vec![true, true, true]];
        engine.stamp_pattern(&ragged, 0, 0);
        assert_eq!(engine.living_count(), 4);
    }
}
