use crate::field::ScalarField;
use crate::mac::StaggeredVectorField;
use crate::marker::MarkerField;
use glam::Vec2;

/// Sample offset of `u` faces in their own grid frame.
pub const U_OFFSET: Vec2 = Vec2::new(0.5, 0.0);
/// Sample offset of `v` faces in their own grid frame.
pub const V_OFFSET: Vec2 = Vec2::new(0.0, 0.5);
/// Cell-centered quantities need no shift.
pub const CELL_OFFSET: Vec2 = Vec2::new(0.0, 0.0);

/// Traces `pos` back through `velocity` over `delta` and samples `src` there,
/// shifted by `offset` into `src`'s frame.
pub fn advect(
    pos: Vec2,
    src: &ScalarField,
    velocity: &StaggeredVectorField,
    delta: f32,
    offset: Vec2,
) -> f32 {
    let back = pos - velocity.sample_at(pos) * delta;
    src.sample(back.x + offset.x, back.y + offset.y)
}

pub fn advect_scalar(
    dst: &mut ScalarField,
    src: &ScalarField,
    velocity: &StaggeredVectorField,
    delta: f32,
) {
    assert_eq!(dst.grid(), src.grid(), "advection grid mismatch");
    assert_eq!(src.grid(), velocity.grid(), "velocity grid mismatch");
    let grid = src.grid();
    dst.fill_with_index(|i, j| {
        let (x, y) = grid.cell_center(i, j);
        advect(Vec2::new(x, y), src, velocity, delta, CELL_OFFSET)
    });
}

/// Self-advection of face velocities. Only liquid-carrying faces are traced;
/// solid and air faces are written as zero.
pub fn advect_velocity(
    dst: &mut StaggeredVectorField,
    src: &StaggeredVectorField,
    velocity: &StaggeredVectorField,
    markers: &MarkerField,
    delta: f32,
) {
    assert_eq!(dst.grid(), src.grid(), "advection grid mismatch");
    assert_eq!(markers.grid(), src.grid(), "marker grid mismatch");
    dst.u_mut().fill_with_index(|i, j| {
        if !markers.u_face(i, j).is_liquid() {
            return 0.0;
        }
        let pos = Vec2::new(j as f32, i as f32 + 0.5);
        advect(pos, src.u(), velocity, delta, U_OFFSET)
    });
    dst.v_mut().fill_with_index(|i, j| {
        if !markers.v_face(i, j).is_liquid() {
            return 0.0;
        }
        let pos = Vec2::new(j as f32 + 0.5, i as f32);
        advect(pos, src.v(), velocity, delta, V_OFFSET)
    });
}
