//! Borrowed view of a row-major coordinate grid.

/// Row-major `rows x cols` slice of `f64` coordinate values.
///
/// Borrowed rather than owned: encode workers all read the same backing
/// storage, each walking its own row range, with nothing copied.
#[derive(Debug, Clone, Copy)]
pub struct GridRef<'a> {
    values: &'a [f64],
    rows: usize,
    cols: usize,
}

impl<'a> GridRef<'a> {
    /// Wrap a flat slice as a `rows x cols` grid.
    ///
    /// Panics when the slice length does not equal `rows * cols`.
    pub fn new(values: &'a [f64], rows: usize, cols: usize) -> Self {
        assert_eq!(
            values.len(),
            rows * cols,
            "grid storage does not match rows * cols"
        );
        GridRef { values, rows, cols }
    }

    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Value at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        debug_assert!(row < self.rows && col < self.cols, "grid index out of range");
        self.values[row * self.cols + col]
    }
}

/// Split `rows` into contiguous `(start, end)` blocks of at most
/// `chunk_rows` rows. `chunk_rows` must be nonzero.
pub(crate) fn row_chunks(rows: usize, chunk_rows: usize) -> Vec<(usize, usize)> {
    debug_assert!(chunk_rows > 0);
    let mut chunks = Vec::with_capacity(rows.div_ceil(chunk_rows));
    let mut start = 0;
    while start < rows {
        let end = (start + chunk_rows).min(rows);
        chunks.push((start, end));
        start = end;
    }
    chunks
}
