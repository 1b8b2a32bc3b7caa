use crate::grid::Grid2;
use glam::Vec2;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Marker {
    Solid = 0,
    Liquid = 1,
    Air = 2,
}

/// Classification of a face from the two cells it separates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Boundary {
    Solid,
    Liquid,
    Air,
    AirLiquid,
}

impl Boundary {
    pub fn between(a: Marker, b: Marker) -> Self {
        match (a, b) {
            (Marker::Solid, _) | (_, Marker::Solid) => Boundary::Solid,
            (Marker::Air, Marker::Air) => Boundary::Air,
            (Marker::Air, Marker::Liquid) | (Marker::Liquid, Marker::Air) => Boundary::AirLiquid,
            (Marker::Liquid, Marker::Liquid) => Boundary::Liquid,
        }
    }

    /// Faces that carry liquid velocity: LIQUID or AIR_LIQUID.
    pub fn is_liquid(self) -> bool {
        matches!(self, Boundary::Liquid | Boundary::AirLiquid)
    }
}

/// Per-cell SOLID/LIQUID/AIR labels. Everything outside the grid is solid.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerField {
    grid: Grid2,
    data: Vec<Marker>,
}

impl MarkerField {
    pub fn new(grid: Grid2, fill: Marker) -> Self {
        let data = vec![fill; grid.size()];
        Self { grid, data }
    }

    pub fn from_fn(grid: Grid2, f: impl Fn(usize, usize) -> Marker) -> Self {
        let width = grid.width();
        let data = (0..grid.size())
            .map(|idx| f(idx / width, idx % width))
            .collect();
        Self { grid, data }
    }

    /// Rasterizes `particles` into a fresh marker grid.
    pub fn from_particles(grid: Grid2, particles: &[Vec2]) -> Self {
        let mut markers = Self::new(grid, Marker::Air);
        markers.rebuild(particles);
        markers
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

    pub fn data(&self) -> &[Marker] {
        &self.data
    }

    pub fn get(&self, i: usize, j: usize) -> Marker {
        self.data[self.grid.idx(i, j)]
    }

    pub fn set(&mut self, i: usize, j: usize, marker: Marker) {
        let idx = self.grid.idx(i, j);
        self.data[idx] = marker;
    }

    pub fn fill(&mut self, marker: Marker) {
        self.data.fill(marker);
    }

    pub fn fill_ring(&mut self, marker: Marker) {
        let grid = self.grid;
        grid.for_each_ring_cell(|i, j| self.set(i, j, marker));
    }

    pub fn count(&self, marker: Marker) -> usize {
        self.data.iter().filter(|value| **value == marker).count()
    }

    /// Label of the cell containing `(x, y)`; solid outside the grid.
    pub fn label_at(&self, x: f32, y: f32) -> Marker {
        match self.grid.cell_at(x, y) {
            Some((i, j)) => self.get(i, j),
            None => Marker::Solid,
        }
    }

    /// Face type at a half-integer point: a `u` face when `x` is integral,
    /// otherwise a `v` face.
    pub fn get_boundary(&self, x: f32, y: f32) -> Boundary {
        if x == x.floor() {
            Boundary::between(self.label_at(x - 0.5, y), self.label_at(x + 0.5, y))
        } else {
            Boundary::between(self.label_at(x, y - 0.5), self.label_at(x, y + 0.5))
        }
    }

    /// Face type of `u[i][j]`, between cells `(i, j - 1)` and `(i, j)`.
    pub fn u_face(&self, i: usize, j: usize) -> Boundary {
        let left = if j == 0 {
            Marker::Solid
        } else {
            self.get(i, j - 1)
        };
        let right = if j == self.grid.width() {
            Marker::Solid
        } else {
            self.get(i, j)
        };
        Boundary::between(left, right)
    }

    /// Face type of `v[i][j]`, between cells `(i - 1, j)` and `(i, j)`.
    pub fn v_face(&self, i: usize, j: usize) -> Boundary {
        let above = if i == 0 {
            Marker::Solid
        } else {
            self.get(i - 1, j)
        };
        let below = if i == self.grid.height() {
            Marker::Solid
        } else {
            self.get(i, j)
        };
        Boundary::between(above, below)
    }

    /// Stateless rebuild: air everywhere, solid ring, liquid under particles.
    ///
    /// Particles outside the grid or inside a solid cell are skipped.
    pub fn rebuild(&mut self, particles: &[Vec2]) {
        self.fill(Marker::Air);
        self.fill_ring(Marker::Solid);
        for pos in particles {
            let Some((i, j)) = self.grid.cell_at(pos.x, pos.y) else {
                continue;
            };
            if self.get(i, j) != Marker::Solid {
                self.set(i, j, Marker::Liquid);
            }
        }
    }
}
