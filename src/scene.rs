use crate::grid::Grid2;
use crate::particles::Particles;
use crate::sim::InitialState;
use glam::Vec2;

/// A column of liquid resting against the left wall with a dye blob inside.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamBreak {
    pub block_min: Vec2,
    pub block_max: Vec2,
    pub dye_center: Vec2,
    pub dye_radius: f32,
    pub per_cell: usize,
    pub jitter: f32,
}

impl DamBreak {
    pub fn new(grid: Grid2) -> Self {
        let width = grid.width() as f32;
        let height = grid.height() as f32;
        let block_min = Vec2::new(1.0, (height * 0.35).floor().max(1.0));
        let block_max = Vec2::new((width * 0.4).ceil().max(2.0), height - 1.0);
        let dye_center = (block_min + block_max) * 0.5;
        let dye_radius = (block_max - block_min).min_element() * 0.3;
        Self {
            block_min,
            block_max,
            dye_center,
            dye_radius,
            per_cell: 2,
            jitter: 0.3,
        }
    }

    pub fn initial_state(&self, grid: Grid2) -> InitialState {
        let particles = Particles::seed_rect(self.block_min, self.block_max, self.per_cell, self.jitter);
        let radius_sq = self.dye_radius * self.dye_radius;
        let concentration = (0..grid.size())
            .map(|idx| {
                let (x, y) = grid.cell_center(idx / grid.width(), idx % grid.width());
                let d = Vec2::new(x, y) - self.dye_center;
                if d.length_squared() <= radius_sq {
                    1.0
                } else {
                    0.0
                }
            })
            .collect();
        InitialState {
            concentration,
            particles: particles.positions().to_vec(),
            ..InitialState::still(grid.width(), grid.height())
        }
    }
}

pub fn dam_break(width: usize, height: usize) -> InitialState {
    let grid = Grid2::new(width, height);
    DamBreak::new(grid).initial_state(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particles::ParticleBounds;

    #[test]
    fn dam_break_fills_left_column() {
        let initial = dam_break(40, 30);
        let grid = Grid2::new(40, 30);
        assert_eq!(initial.concentration.len(), grid.size());
        assert_eq!(initial.particles.len(), 15 * 19 * 4);
        let bounds = ParticleBounds::from_grid(grid);
        assert!(initial.particles.iter().all(|pos| bounds.contains(*pos)));
        assert!(initial.concentration.iter().any(|value| *value == 1.0));
    }

    #[test]
    fn dye_sits_inside_the_block() {
        let grid = Grid2::new(32, 32);
        let scene = DamBreak::new(grid);
        let initial = scene.initial_state(grid);
        for (idx, value) in initial.concentration.iter().enumerate() {
            if *value > 0.0 {
                let (x, y) = grid.cell_center(idx / 32, idx % 32);
                assert!(x >= scene.block_min.x && x <= scene.block_max.x);
                assert!(y >= scene.block_min.y && y <= scene.block_max.y);
            }
        }
    }
}
