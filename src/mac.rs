use crate::field::ScalarField;
use crate::grid::Grid2;
use glam::Vec2;

/// Face grid of the horizontal component: one extra column.
pub fn u_grid(grid: Grid2) -> Grid2 {
    Grid2::new(grid.width() + 1, grid.height())
}

/// Face grid of the vertical component: one extra row.
pub fn v_grid(grid: Grid2) -> Grid2 {
    Grid2::new(grid.width(), grid.height() + 1)
}

/// MAC velocity: `u[i][j]` lives on the vertical face at `(j, i + 0.5)`,
/// `v[i][j]` on the horizontal face at `(j + 0.5, i)`.
#[derive(Clone, Debug, PartialEq)]
pub struct StaggeredVectorField {
    grid: Grid2,
    u: ScalarField,
    v: ScalarField,
}

impl StaggeredVectorField {
    pub fn new(grid: Grid2, fill: Vec2) -> Self {
        let u = ScalarField::new(u_grid(grid), fill.x);
        let v = ScalarField::new(v_grid(grid), fill.y);
        Self { grid, u, v }
    }

    pub fn from_components(grid: Grid2, u: ScalarField, v: ScalarField) -> Self {
        assert_eq!(u.grid(), u_grid(grid), "u grid mismatch");
        assert_eq!(v.grid(), v_grid(grid), "v grid mismatch");
        Self { grid, u, v }
    }

    pub fn grid(&self) -> Grid2 {
        self.grid
    }

    pub fn u(&self) -> &ScalarField {
        &self.u
    }

    pub fn v(&self) -> &ScalarField {
        &self.v
    }

    pub fn u_mut(&mut self) -> &mut ScalarField {
        &mut self.u
    }

    pub fn v_mut(&mut self) -> &mut ScalarField {
        &mut self.v
    }

    pub fn copy_from(&mut self, other: &Self) {
        self.u.copy_from(&other.u);
        self.v.copy_from(&other.v);
    }

    /// Velocity at a continuous point, read from both face grids.
    ///
    /// Zero outside `[0.5, dim - 0.5]`. Queries on the last row of `u` or the
    /// last column of `v` fall on the edge of that sub-grid and use a 1-D lerp
    /// along it.
    pub fn sample(&self, x: f32, y: f32) -> Vec2 {
        let max_x = self.grid.width() as f32 - 0.5;
        let max_y = self.grid.height() as f32 - 0.5;
        if !(x >= 0.5 && x <= max_x && y >= 0.5 && y <= max_y) {
            return Vec2::ZERO;
        }
        Vec2::new(self.u.sample(x + 0.5, y), self.v.sample(x, y + 0.5))
    }

    pub fn sample_at(&self, pos: Vec2) -> Vec2 {
        self.sample(pos.x, pos.y)
    }

    /// Net outflow of every cell; exact because `u`/`v` sit on the cell faces.
    pub fn divergence(&self, dst: &mut ScalarField) {
        assert_eq!(dst.grid(), self.grid, "divergence grid mismatch");
        dst.fill_with_index(|i, j| {
            (self.u.get(i, j + 1) - self.u.get(i, j)) + (self.v.get(i + 1, j) - self.v.get(i, j))
        });
    }

    /// Ring update on both components, then zero flow through the outer walls.
    pub fn update_boundary(&mut self, k: f32) {
        self.u.update_boundary(k);
        self.v.update_boundary(k);
        let width = self.grid.width();
        let height = self.grid.height();
        for i in 0..height {
            self.u.set(i, 0, 0.0);
            self.u.set(i, width, 0.0);
        }
        for j in 0..width {
            self.v.set(0, j, 0.0);
            self.v.set(height, j, 0.0);
        }
    }

    pub fn subtract(&mut self, other: &Self) {
        self.u.subtract(&other.u);
        self.v.subtract(&other.v);
    }

    pub fn max_abs(&self) -> f32 {
        self.u.max_abs().max(self.v.max_abs())
    }

    pub fn is_finite(&self) -> bool {
        self.u.is_finite() && self.v.is_finite()
    }
}
