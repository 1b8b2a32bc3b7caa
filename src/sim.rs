use crate::advect::{advect_scalar, advect_velocity};
use crate::buffer::BufferPair;
use crate::error::SimError;
use crate::extrapolate::ExtrapolationScratch;
use crate::field::ScalarField;
use crate::grid::Grid2;
use crate::mac::{u_grid, v_grid, StaggeredVectorField};
use crate::marker::MarkerField;
use crate::particles::{ParticleBounds, Particles};
use crate::pressure::{JacobiParams, PressureSolver};
use glam::Vec2;
use log::{trace, warn};

const MIN_DIM: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimParams {
    pub dt: f32,
    /// Acceleration along +y (down the rows).
    pub gravity: f32,
    pub jacobi_iterations: usize,
    pub extrapolation_passes: usize,
    /// Ring factor for the pressure solve; 1 keeps a zero normal gradient.
    pub pressure_boundary: f32,
    pub warm_start_pressure: bool,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            dt: 0.1,
            gravity: 9.8,
            jacobi_iterations: 128,
            extrapolation_passes: 10,
            pressure_boundary: 1.0,
            warm_start_pressure: false,
        }
    }
}

impl SimParams {
    /// Defaults overridden by `SIM_DT`, `SIM_GRAVITY`, `SIM_JACOBI_ITERS` and
    /// `SIM_EXTRAPOLATION_PASSES`. Unparseable values are ignored.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse_f32 = |key: &str| lookup(key).and_then(|value| value.trim().parse::<f32>().ok());
        let parse_usize =
            |key: &str| lookup(key).and_then(|value| value.trim().parse::<usize>().ok());
        if let Some(dt) = parse_f32("SIM_DT") {
            self.dt = dt;
        }
        if let Some(gravity) = parse_f32("SIM_GRAVITY") {
            self.gravity = gravity;
        }
        if let Some(iterations) = parse_usize("SIM_JACOBI_ITERS") {
            self.jacobi_iterations = iterations;
        }
        if let Some(passes) = parse_usize("SIM_EXTRAPOLATION_PASSES") {
            self.extrapolation_passes = passes;
        }
        self
    }

    pub fn validate(&self) -> Result<(), SimError> {
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(SimError::InvalidParam {
                name: "dt",
                reason: format!("must be finite and positive, got {}", self.dt),
            });
        }
        if !self.gravity.is_finite() {
            return Err(SimError::InvalidParam {
                name: "gravity",
                reason: format!("must be finite, got {}", self.gravity),
            });
        }
        if self.jacobi_iterations == 0 {
            return Err(SimError::InvalidParam {
                name: "jacobi_iterations",
                reason: "projection needs at least one sweep".to_string(),
            });
        }
        if !self.pressure_boundary.is_finite() {
            return Err(SimError::InvalidParam {
                name: "pressure_boundary",
                reason: format!("must be finite, got {}", self.pressure_boundary),
            });
        }
        Ok(())
    }

    pub fn jacobi(&self) -> JacobiParams {
        JacobiParams {
            boundary: self.pressure_boundary,
            ..JacobiParams::poisson(self.jacobi_iterations)
        }
    }
}

/// One buffer generation of the simulated quantities.
#[derive(Clone, Debug, PartialEq)]
pub struct FluidState {
    pub velocity: StaggeredVectorField,
    pub concentration: ScalarField,
    pub markers: MarkerField,
}

/// Raw starting data. `velocity_u` is `(width + 1) * height` values,
/// `velocity_v` is `width * (height + 1)`, both row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct InitialState {
    pub width: usize,
    pub height: usize,
    pub velocity_u: Vec<f32>,
    pub velocity_v: Vec<f32>,
    pub concentration: Vec<f32>,
    pub particles: Vec<Vec2>,
}

impl InitialState {
    /// Fluid at rest with no dye and no particles.
    pub fn still(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            velocity_u: vec![0.0; (width + 1) * height],
            velocity_v: vec![0.0; width * (height + 1)],
            concentration: vec![0.0; width * height],
            particles: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Simulation {
    params: SimParams,
    state: BufferPair<FluidState>,
    extrapolated: StaggeredVectorField,
    extrapolation: ExtrapolationScratch,
    solver: PressureSolver,
    particles: Particles,
    bounds: ParticleBounds,
    tick: u64,
}

impl Simulation {
    pub fn new(initial: InitialState, params: SimParams) -> Result<Self, SimError> {
        params.validate()?;
        let InitialState {
            width,
            height,
            velocity_u,
            velocity_v,
            concentration,
            particles,
        } = initial;
        if width < MIN_DIM || height < MIN_DIM {
            return Err(SimError::GridTooSmall { width, height });
        }
        let grid = Grid2::new(width, height);
        check_len("velocity_u", u_grid(grid).size(), velocity_u.len())?;
        check_len("velocity_v", v_grid(grid).size(), velocity_v.len())?;
        check_len("concentration", grid.size(), concentration.len())?;
        for (index, pos) in particles.iter().enumerate() {
            if grid.cell_at(pos.x, pos.y).is_none() {
                return Err(SimError::ParticleOutOfDomain {
                    index,
                    x: pos.x,
                    y: pos.y,
                });
            }
        }
        let velocity = StaggeredVectorField::from_components(
            grid,
            ScalarField::from_data(u_grid(grid), velocity_u),
            ScalarField::from_data(v_grid(grid), velocity_v),
        );
        let markers = MarkerField::from_particles(grid, &particles);
        let front = FluidState {
            velocity,
            concentration: ScalarField::from_data(grid, concentration),
            markers,
        };
        Ok(Self {
            params,
            state: BufferPair::from_value(front),
            extrapolated: StaggeredVectorField::new(grid, Vec2::ZERO),
            extrapolation: ExtrapolationScratch::new(grid),
            solver: PressureSolver::new(grid),
            particles: Particles::from_positions(particles),
            bounds: ParticleBounds::from_grid(grid),
            tick: 0,
        })
    }

    /// Advances one tick: reads the current generation, writes the next, then
    /// flips them.
    pub fn step(&mut self) {
        let params = self.params;
        let dt = params.dt;
        trace!("tick {} reading buffer {}", self.tick, self.state.front_index());
        let (src, dst) = self.state.split_mut();

        src.velocity.extrapolate(
            &mut self.extrapolated,
            &src.markers,
            &mut self.extrapolation,
            params.extrapolation_passes,
        );
        advect_velocity(
            &mut dst.velocity,
            &self.extrapolated,
            &self.extrapolated,
            &src.markers,
            dt,
        );
        let lift = params.gravity * dt;
        dst.velocity.v_mut().update_with_index(|i, j, value| {
            if src.markers.v_face(i, j).is_liquid() {
                value + lift
            } else {
                value
            }
        });
        dst.velocity.update_boundary(0.0);
        self.solver.project(
            &mut dst.velocity,
            &src.markers,
            params.jacobi(),
            params.warm_start_pressure,
        );

        self.particles
            .advect_euler(&dst.velocity, dt, self.bounds);
        dst.markers.rebuild(self.particles.positions());
        advect_scalar(&mut dst.concentration, &src.concentration, &dst.velocity, dt);

        if !dst.velocity.is_finite() {
            warn!("tick {} produced a non-finite velocity", self.tick);
        }
        self.state.swap();
        self.tick += 1;
    }

    pub fn run(&mut self, ticks: usize) {
        for _ in 0..ticks {
            self.step();
        }
    }

    pub fn params(&self) -> SimParams {
        self.params
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn grid(&self) -> Grid2 {
        self.state.current().velocity.grid()
    }

    pub fn width(&self) -> usize {
        self.grid().width()
    }

    pub fn height(&self) -> usize {
        self.grid().height()
    }

    pub fn state(&self) -> &FluidState {
        self.state.current()
    }

    pub fn velocity(&self) -> &StaggeredVectorField {
        &self.state.current().velocity
    }

    pub fn concentration(&self) -> &ScalarField {
        &self.state.current().concentration
    }

    pub fn markers(&self) -> &MarkerField {
        &self.state.current().markers
    }

    pub fn divergence(&self) -> &ScalarField {
        self.solver.divergence()
    }

    pub fn pressure(&self) -> &ScalarField {
        self.solver.pressure()
    }

    pub fn pressure_gradient(&self) -> &StaggeredVectorField {
        self.solver.gradient()
    }

    pub fn particles(&self) -> &Particles {
        &self.particles
    }

    /// Velocity sampled at the center of cell `(i, j)`.
    pub fn cell_velocity(&self, i: usize, j: usize) -> Vec2 {
        let (x, y) = self.grid().cell_center(i, j);
        self.velocity().sample(x, y)
    }
}

fn check_len(name: &'static str, expected: usize, actual: usize) -> Result<(), SimError> {
    if expected == actual {
        Ok(())
    } else {
        Err(SimError::DataLength {
            name,
            expected,
            actual,
        })
    }
}
