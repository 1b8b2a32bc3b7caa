/// Dimensions of a row-major cell grid with unit spacing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid2 {
    width: usize,
    height: usize,
}

impl Grid2 {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0, "width must be > 0");
        assert!(height > 0, "height must be > 0");
        Self { width, height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn size(&self) -> usize {
        self.width * self.height
    }

    /// Flat index of row `i`, column `j`.
    pub fn idx(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.height && j < self.width);
        i * self.width + j
    }

    /// Closest cell that is not on the outer ring.
    ///
    /// Returns `None` when the grid is too thin to have an interior.
    pub fn interior_neighbor(&self, i: usize, j: usize) -> Option<(usize, usize)> {
        if self.width < 3 || self.height < 3 {
            return None;
        }
        Some((i.clamp(1, self.height - 2), j.clamp(1, self.width - 2)))
    }

    pub fn cell_center(&self, i: usize, j: usize) -> (f32, f32) {
        (j as f32 + 0.5, i as f32 + 0.5)
    }

    /// Cell containing the continuous point `(x, y)`, if it lies in the grid.
    pub fn cell_at(&self, x: f32, y: f32) -> Option<(usize, usize)> {
        if !(x >= 0.0 && y >= 0.0) {
            return None;
        }
        let j = x.floor() as usize;
        let i = y.floor() as usize;
        if i < self.height && j < self.width {
            Some((i, j))
        } else {
            None
        }
    }

    pub fn for_each_ring_cell(&self, mut f: impl FnMut(usize, usize)) {
        for j in 0..self.width {
            f(0, j);
            if self.height > 1 {
                f(self.height - 1, j);
            }
        }
        for i in 1..self.height.saturating_sub(1) {
            f(i, 0);
            if self.width > 1 {
                f(i, self.width - 1);
            }
        }
    }
}
