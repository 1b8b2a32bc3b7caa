use crate::grid::Grid2;
use crate::mac::StaggeredVectorField;
use glam::Vec2;

/// Distance kept from the far walls so a clamped particle still rasterizes
/// into the last interior cell.
const WALL_EPSILON: f32 = 1e-3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl ParticleBounds {
    /// The non-solid interior `[1, dim - 1)` of `grid`.
    pub fn from_grid(grid: Grid2) -> Self {
        let max_x = (grid.width() as f32 - 1.0 - WALL_EPSILON).max(1.0);
        let max_y = (grid.height() as f32 - 1.0 - WALL_EPSILON).max(1.0);
        Self {
            min: Vec2::new(1.0, 1.0),
            max: Vec2::new(max_x, max_y),
        }
    }

    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= self.min.x && pos.x <= self.max.x && pos.y >= self.min.y && pos.y <= self.max.y
    }

    pub fn clamp(&self, pos: Vec2) -> Vec2 {
        // NaN collapses onto the lower wall instead of escaping the grid.
        let x = if pos.x.is_nan() { self.min.x } else { pos.x };
        let y = if pos.y.is_nan() { self.min.y } else { pos.y };
        Vec2::new(x.clamp(self.min.x, self.max.x), y.clamp(self.min.y, self.max.y))
    }
}

/// Massless markers carried by the flow. The count never changes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Particles {
    positions: Vec<Vec2>,
}

impl Particles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_positions(positions: Vec<Vec2>) -> Self {
        Self { positions }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    /// `per_cell * per_cell` particles in every cell the rectangle touches
    /// (`min` floored, `max` ceiled, so partly covered cells fill completely),
    /// on a regular sub-grid nudged by a deterministic `jitter` (a fraction of
    /// the sub-cell spacing).
    pub fn seed_rect(min: Vec2, max: Vec2, per_cell: usize, jitter: f32) -> Self {
        if per_cell == 0 {
            return Self::new();
        }
        let lo = min.min(max).max(Vec2::ZERO).floor();
        let hi = min.max(max).max(Vec2::ZERO).ceil();
        let cells_x = (hi.x - lo.x) as usize;
        let cells_y = (hi.y - lo.y) as usize;
        let nx = cells_x * per_cell;
        let ny = cells_y * per_cell;
        let spacing = 1.0 / per_cell as f32;
        let jitter = jitter.clamp(0.0, 1.0) * spacing;
        let mut positions = Vec::with_capacity(nx * ny);
        for iy in 0..ny {
            for ix in 0..nx {
                let base_x = lo.x + (ix as f32 + 0.5) * spacing;
                let base_y = lo.y + (iy as f32 + 0.5) * spacing;
                let jx = (rand_unit(ix as u32, iy as u32, 11) - 0.5) * jitter;
                let jy = (rand_unit(ix as u32, iy as u32, 12) - 0.5) * jitter;
                positions.push(Vec2::new(base_x + jx, base_y + jy));
            }
        }
        Self { positions }
    }

    /// Forward Euler through `velocity`, then clamps every particle into
    /// `bounds`.
    pub fn advect_euler(&mut self, velocity: &StaggeredVectorField, dt: f32, bounds: ParticleBounds) {
        for pos in &mut self.positions {
            let next = *pos + velocity.sample_at(*pos) * dt;
            *pos = bounds.clamp(next);
        }
    }

    pub fn mean_position(&self) -> Option<Vec2> {
        if self.positions.is_empty() {
            return None;
        }
        let sum: Vec2 = self.positions.iter().copied().sum();
        Some(sum / self.positions.len() as f32)
    }
}

fn rand_unit(ix: u32, iy: u32, salt: u32) -> f32 {
    let seed = ix.wrapping_mul(1664525)
        ^ iy.wrapping_mul(1013904223)
        ^ salt.wrapping_mul(2654435761);
    let hashed = mix_u32(seed);
    (hashed as f32) / (u32::MAX as f32)
}

fn mix_u32(mut value: u32) -> u32 {
    value ^= value >> 16;
    value = value.wrapping_mul(0x7feb352d);
    value ^= value >> 15;
    value = value.wrapping_mul(0x846ca68b);
    value ^= value >> 16;
    value
}
