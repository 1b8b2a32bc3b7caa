use crate::grid::Grid2;
use crate::mac::StaggeredVectorField;

/// Cell-centered scalar grid. Cell `(i, j)` sits at `(j + 0.5, i + 0.5)`.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarField {
    grid: Grid2,
    data: Vec<f32>,
}

impl ScalarField {
    pub fn new(grid: Grid2, fill: f32) -> Self {
        let data = vec![fill; grid.size()];
        Self { grid, data }
    }

    pub fn from_data(grid: Grid2, data: Vec<f32>) -> Self {
        assert_eq!(data.len(), grid.size(), "scalar field data mismatch");
        Self { grid, data }
    }

    pub fn from_fn(grid: Grid2, f: impl Fn(usize, usize) -> f32) -> Self {
        let width = grid.width();
        let data = (0..grid.size())
            .map(|idx| f(idx / width, idx % width))
            .collect();
        Self { grid, data }
    }

    pub fn grid(&self) -> Grid2 {
        self.grid
    }

    pub fn width(&self) -> usize {
        self.grid.width()
    }

    pub fn height(&self) -> usize {
        self.grid.height()
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn get(&self, i: usize, j: usize) -> f32 {
        self.data[self.grid.idx(i, j)]
    }

    pub fn set(&mut self, i: usize, j: usize, value: f32) {
        let idx = self.grid.idx(i, j);
        self.data[idx] = value;
    }

    pub fn fill(&mut self, value: f32) {
        self.data.fill(value);
    }

    pub fn copy_from(&mut self, other: &Self) {
        self.assert_same_grid(other);
        self.data.copy_from_slice(&other.data);
    }

    pub fn fill_with_index(&mut self, f: impl Fn(usize, usize) -> f32) {
        let width = self.grid.width();
        for (idx, value) in self.data.iter_mut().enumerate() {
            *value = f(idx / width, idx % width);
        }
    }

    pub fn update_with_index(&mut self, f: impl Fn(usize, usize, f32) -> f32) {
        let width = self.grid.width();
        for (idx, value) in self.data.iter_mut().enumerate() {
            *value = f(idx / width, idx % width, *value);
        }
    }

    /// Bilinear sample at a continuous point.
    ///
    /// Points outside `[0.5, dim - 0.5]` on either axis read as zero. On the
    /// closed upper edge the stencil collapses to a 1-D lerp along the other
    /// axis.
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let width = self.grid.width();
        let height = self.grid.height();
        if !inside(x, width) || !inside(y, height) {
            return 0.0;
        }
        let (j0, j1, kx) = lerp_stencil(x, width);
        let (i0, i1, ky) = lerp_stencil(y, height);
        let top = lerp(self.get(i0, j0), self.get(i0, j1), kx);
        let bottom = lerp(self.get(i1, j0), self.get(i1, j1), kx);
        lerp(top, bottom, ky)
    }

    /// `self -= other`, elementwise.
    pub fn subtract(&mut self, other: &Self) {
        self.assert_same_grid(other);
        for (value, other_value) in self.data.iter_mut().zip(other.data.iter()) {
            *value -= other_value;
        }
    }

    /// Sets every ring cell to `k` times its nearest interior neighbor.
    ///
    /// `k = 0` gives Dirichlet-zero walls, `k = -1` a mirrored no-slip wall and
    /// `k = 1` a zero-gradient wall.
    pub fn update_boundary(&mut self, k: f32) {
        let grid = self.grid;
        grid.for_each_ring_cell(|i, j| {
            if let Some((ni, nj)) = grid.interior_neighbor(i, j) {
                let value = k * self.get(ni, nj);
                self.set(i, j, value);
            }
        });
    }

    /// Difference of neighboring cells written onto the faces of `dst`.
    ///
    /// Interior faces take the two cells they separate; the outermost faces
    /// reuse the nearest pair of cells (one-sided difference).
    pub fn gradient(&self, dst: &mut StaggeredVectorField) {
        assert_eq!(dst.grid(), self.grid, "gradient grid mismatch");
        let width = self.grid.width();
        let height = self.grid.height();
        dst.u_mut().fill_with_index(|i, j| {
            if width < 2 {
                return 0.0;
            }
            let right = j.clamp(1, width - 1);
            self.get(i, right) - self.get(i, right - 1)
        });
        dst.v_mut().fill_with_index(|i, j| {
            if height < 2 {
                return 0.0;
            }
            let below = i.clamp(1, height - 1);
            self.get(below, j) - self.get(below - 1, j)
        });
    }

    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    pub fn max_abs(&self) -> f32 {
        self.data
            .iter()
            .map(|value| value.abs())
            .fold(0.0_f32, f32::max)
    }

    pub fn min_max(&self) -> (f32, f32) {
        let mut iter = self.data.iter().filter(|value| value.is_finite());
        let Some(first) = iter.next() else {
            return (0.0, 0.0);
        };
        iter.fold((*first, *first), |(lo, hi), value| {
            (lo.min(*value), hi.max(*value))
        })
    }

    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|value| value.is_finite())
    }

    fn assert_same_grid(&self, other: &Self) {
        assert_eq!(self.grid, other.grid, "field grid mismatch");
    }
}

fn inside(coord: f32, dim: usize) -> bool {
    coord >= 0.5 && coord <= dim as f32 - 0.5
}

// Lower index, upper index and weight of the upper sample along one axis.
fn lerp_stencil(coord: f32, dim: usize) -> (usize, usize, f32) {
    let c = coord - 0.5;
    let lo = (c.floor() as usize).min(dim - 1);
    if lo + 1 >= dim {
        return (lo, lo, 0.0);
    }
    (lo, lo + 1, c - lo as f32)
}

fn lerp(a: f32, b: f32, k: f32) -> f32 {
    (1.0 - k) * a + k * b
}
