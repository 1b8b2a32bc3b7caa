mod advect;
mod buffer;
mod error;
mod extrapolate;
mod field;
mod grid;
mod mac;
mod marker;
mod particles;
mod pressure;
mod scene;
mod sim;

pub use advect::{advect, advect_scalar, advect_velocity, CELL_OFFSET, U_OFFSET, V_OFFSET};
pub use buffer::BufferPair;
pub use error::SimError;
pub use extrapolate::{ExtrapolationScratch, KnownField};
pub use field::ScalarField;
pub use glam::Vec2;
pub use grid::Grid2;
pub use mac::{u_grid, v_grid, StaggeredVectorField};
pub use marker::{Boundary, Marker, MarkerField};
pub use particles::{ParticleBounds, Particles};
pub use pressure::{max_liquid_abs, JacobiParams, PressureSolver};
pub use scene::{dam_break, DamBreak};
pub use sim::{FluidState, InitialState, SimParams, Simulation};
