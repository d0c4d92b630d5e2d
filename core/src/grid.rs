use crate::config::PieceOptions;
use crate::random::RandomSource;

/// Rounded piece size for one layout pass. Always recomputed from the
/// current container box, never cached across a resize.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLayout {
    pub rows: u32,
    pub columns: u32,
    pub piece_width: i32,
    pub piece_height: i32,
}

impl GridLayout {
    pub fn compute(pieces: &PieceOptions, container_width: f64, container_height: f64) -> Self {
        Self {
            rows: pieces.rows.max(1),
            columns: pieces.columns.max(1),
            piece_width: (container_width / pieces.columns.max(1) as f64).round() as i32,
            piece_height: (container_height / pieces.rows.max(1) as f64).round() as i32,
        }
    }

    /// Snapped container width; writing it back avoids sub-pixel gaps.
    pub fn container_width(&self) -> i32 {
        self.piece_width * self.columns as i32
    }

    pub fn container_height(&self) -> i32 {
        self.piece_height * self.rows as i32
    }

    /// `background-size` that spans the source image across the whole grid.
    pub fn background_size(&self) -> String {
        format!("{}px auto", self.container_width())
    }

    /// Offset that shows this cell's slice of the source image.
    pub fn background_position(row: u32, column: u32) -> String {
        format!("{}% {}%", -(column as i64) * 100, -(row as i64) * 100)
    }
}

/// Immutable identity of the piece grid. Pieces are created once in
/// row-major order; the per-piece stagger delay is fixed at creation and
/// read by every animation verb for consistent staggering.
#[derive(Clone, Debug)]
pub struct PieceSet {
    rows: u32,
    columns: u32,
    delays: Vec<i32>,
}

impl PieceSet {
    pub const DELAY_RANGE: (i32, i32) = (-25, 25);

    pub fn build(pieces: &PieceOptions, random: &dyn RandomSource) -> Self {
        let rows = pieces.rows.max(1);
        let columns = pieces.columns.max(1);
        let count = (rows * columns) as usize;
        Self {
            rows,
            columns,
            delays: (0..count).map(|_| random.pick(Self::DELAY_RANGE)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.delays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delays.is_empty()
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn row_of(&self, index: usize) -> u32 {
        index as u32 / self.columns
    }

    pub fn column_of(&self, index: usize) -> u32 {
        index as u32 % self.columns
    }

    pub fn delay_of(&self, index: usize) -> i32 {
        self.delays[index]
    }

    pub fn in_left_half(&self, index: usize) -> bool {
        (self.column_of(index) as f64) < self.columns as f64 / 2.0
    }

    /// Indices of the pieces the partial-reveal verbs act on, in creation
    /// order.
    pub fn left_half_indices(&self) -> Vec<usize> {
        (0..self.len()).filter(|&i| self.in_left_half(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct StepRandom(Cell<u64>);

    impl StepRandom {
        fn new() -> Self {
            Self(Cell::new(0))
        }
    }

    impl RandomSource for StepRandom {
        fn unit(&self) -> f64 {
            let step = self.0.get();
            self.0.set(step + 1);
            (step % 97) as f64 / 97.0
        }
    }

    #[test]
    fn layout_rounds_and_snaps() {
        let options = PieceOptions {
            rows: 14,
            columns: 10,
        };
        let layout = GridLayout::compute(&options, 1400.0, 700.0);
        assert_eq!(layout.piece_width, 140);
        assert_eq!(layout.piece_height, 50);
        assert_eq!(layout.container_width(), 1400);
        assert_eq!(layout.container_height(), 700);
        assert_eq!(layout.background_size(), "1400px auto");
    }

    #[test]
    fn layout_rounds_odd_dimensions() {
        let options = PieceOptions { rows: 3, columns: 7 };
        let layout = GridLayout::compute(&options, 1000.0, 500.0);
        // 1000/7 = 142.857..., 500/3 = 166.666...
        assert_eq!(layout.piece_width, 143);
        assert_eq!(layout.piece_height, 167);
        assert_eq!(layout.container_width(), 1001);
        assert_eq!(layout.container_height(), 501);
    }

    #[test]
    fn background_position_offsets_by_cell() {
        assert_eq!(GridLayout::background_position(0, 0), "0% 0%");
        assert_eq!(GridLayout::background_position(3, 2), "-200% -300%");
        assert_eq!(GridLayout::background_position(13, 9), "-900% -1300%");
    }

    #[test]
    fn piece_set_is_row_major_with_bounded_delays() {
        let options = PieceOptions {
            rows: 14,
            columns: 10,
        };
        let set = PieceSet::build(&options, &StepRandom::new());
        assert_eq!(set.len(), 140);
        assert_eq!(set.row_of(0), 0);
        assert_eq!(set.column_of(0), 0);
        assert_eq!(set.row_of(32), 3);
        assert_eq!(set.column_of(32), 2);
        for i in 0..set.len() {
            assert!((-25..=25).contains(&set.delay_of(i)));
        }
    }

    #[test]
    fn left_half_takes_the_lower_columns() {
        let options = PieceOptions { rows: 2, columns: 5 };
        let set = PieceSet::build(&options, &StepRandom::new());
        // Columns 0..=2 sit below 5/2 = 2.5.
        assert_eq!(set.left_half_indices(), vec![0, 1, 2, 5, 6, 7]);
    }

    #[test]
    fn relayout_never_touches_identity() {
        let options = PieceOptions { rows: 4, columns: 4 };
        let set = PieceSet::build(&options, &StepRandom::new());
        let before: Vec<i32> = (0..set.len()).map(|i| set.delay_of(i)).collect();
        let first = GridLayout::compute(&options, 800.0, 800.0);
        let second = GridLayout::compute(&options, 401.0, 399.0);
        assert_ne!(first, second);
        let after: Vec<i32> = (0..set.len()).map(|i| set.delay_of(i)).collect();
        assert_eq!(before, after);
        assert_eq!(set.len(), 16);
    }
}
