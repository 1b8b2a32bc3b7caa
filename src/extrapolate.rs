use crate::buffer::BufferPair;
use crate::field::ScalarField;
use crate::grid::Grid2;
use crate::mac::{u_grid, v_grid, StaggeredVectorField};
use crate::marker::{Boundary, MarkerField};
use log::debug;

/// Face values where `None` marks a face with no trustworthy velocity yet.
#[derive(Clone, Debug, PartialEq)]
pub struct KnownField {
    grid: Grid2,
    data: Vec<Option<f32>>,
}

impl KnownField {
    pub fn new(grid: Grid2) -> Self {
        Self {
            grid,
            data: vec![None; grid.size()],
        }
    }

    pub fn grid(&self) -> Grid2 {
        self.grid
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f32> {
        self.data[self.grid.idx(i, j)]
    }

    pub fn fill_with_index(&mut self, f: impl Fn(usize, usize) -> Option<f32>) {
        let width = self.grid.width();
        for (idx, value) in self.data.iter_mut().enumerate() {
            *value = f(idx / width, idx % width);
        }
    }

    pub fn undefined_count(&self) -> usize {
        self.data.iter().filter(|value| value.is_none()).count()
    }

    /// One relaxation pass: every undefined face takes the mean of its defined
    /// orthogonal neighbors in `self`, or stays undefined if it has none.
    pub fn relax_into(&self, dst: &mut KnownField) {
        assert_eq!(self.grid, dst.grid, "known field grid mismatch");
        let width = self.grid.width();
        let height = self.grid.height();
        dst.fill_with_index(|i, j| {
            if let Some(value) = self.get(i, j) {
                return Some(value);
            }
            let mut sum = 0.0;
            let mut count = 0;
            let mut take = |value: Option<f32>| {
                if let Some(value) = value {
                    sum += value;
                    count += 1;
                }
            };
            if j > 0 {
                take(self.get(i, j - 1));
            }
            if j + 1 < width {
                take(self.get(i, j + 1));
            }
            if i > 0 {
                take(self.get(i - 1, j));
            }
            if i + 1 < height {
                take(self.get(i + 1, j));
            }
            (count > 0).then(|| sum / count as f32)
        });
    }
}

/// Ping-pong storage for both face grids during extrapolation.
#[derive(Clone, Debug)]
pub struct ExtrapolationScratch {
    u: BufferPair<KnownField>,
    v: BufferPair<KnownField>,
}

impl ExtrapolationScratch {
    pub fn new(grid: Grid2) -> Self {
        Self {
            u: BufferPair::from_value(KnownField::new(u_grid(grid))),
            v: BufferPair::from_value(KnownField::new(v_grid(grid))),
        }
    }

    pub fn u(&self) -> &KnownField {
        self.u.current()
    }

    pub fn v(&self) -> &KnownField {
        self.v.current()
    }
}

impl StaggeredVectorField {
    /// Copies liquid faces into `dst` and grows them outward over `passes`
    /// relaxation passes, then zeroes the outer walls.
    ///
    /// Faces still undefined after the last pass are written as zero. Returns
    /// how many such faces remained.
    pub fn extrapolate(
        &self,
        dst: &mut StaggeredVectorField,
        markers: &MarkerField,
        scratch: &mut ExtrapolationScratch,
        passes: usize,
    ) -> usize {
        assert_eq!(dst.grid(), self.grid(), "extrapolation grid mismatch");
        assert_eq!(markers.grid(), self.grid(), "marker grid mismatch");
        seed_known(scratch.u.current_mut(), self.u(), |i, j| markers.u_face(i, j));
        seed_known(scratch.v.current_mut(), self.v(), |i, j| markers.v_face(i, j));
        for _ in 0..passes {
            let (src, next) = scratch.u.split_mut();
            src.relax_into(next);
            scratch.u.swap();
            let (src, next) = scratch.v.split_mut();
            src.relax_into(next);
            scratch.v.swap();
        }
        let known_u = scratch.u.current();
        let known_v = scratch.v.current();
        dst.u_mut()
            .fill_with_index(|i, j| known_u.get(i, j).unwrap_or(0.0));
        dst.v_mut()
            .fill_with_index(|i, j| known_v.get(i, j).unwrap_or(0.0));
        dst.update_boundary(0.0);
        let undefined = known_u.undefined_count() + known_v.undefined_count();
        if undefined > 0 {
            debug!("extrapolation left {undefined} faces undefined after {passes} passes");
        }
        undefined
    }
}

fn seed_known(
    known: &mut KnownField,
    values: &ScalarField,
    classify: impl Fn(usize, usize) -> Boundary,
) {
    assert_eq!(known.grid(), values.grid(), "known field grid mismatch");
    known.fill_with_index(|i, j| classify(i, j).is_liquid().then(|| values.get(i, j)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::Marker;
    use glam::Vec2;

    fn assert_close(a: f32, b: f32, tol: f32) {
        assert!(
            (a - b).abs() <= tol,
            "expected {a} to be within {tol} of {b}"
        );
    }

    fn pocket(grid: Grid2) -> MarkerField {
        let mut markers = MarkerField::from_fn(grid, |i, j| {
            if (3..5).contains(&i) && (3..5).contains(&j) {
                Marker::Liquid
            } else {
                Marker::Air
            }
        });
        markers.fill_ring(Marker::Solid);
        markers
    }

    #[test]
    fn relax_averages_defined_neighbors_only() {
        let grid = Grid2::new(3, 3);
        let mut known = KnownField::new(grid);
        known.fill_with_index(|i, j| match (i, j) {
            (0, 1) => Some(2.0),
            (1, 0) => Some(4.0),
            _ => None,
        });
        let mut next = KnownField::new(grid);
        known.relax_into(&mut next);
        assert_eq!(next.get(1, 1), Some(3.0));
        assert_eq!(next.get(0, 0), Some(3.0));
        assert_eq!(next.get(0, 1), Some(2.0));
        assert_eq!(next.get(2, 2), None);
        assert_eq!(next.undefined_count(), 3);
    }

    #[test]
    fn relax_reads_previous_pass_only() {
        let grid = Grid2::new(4, 1);
        let mut known = KnownField::new(grid);
        known.fill_with_index(|_, j| (j == 0).then_some(1.0));
        let mut next = KnownField::new(grid);
        known.relax_into(&mut next);
        assert_eq!(next.get(0, 1), Some(1.0));
        assert_eq!(next.get(0, 2), None);
    }

    #[test]
    fn extrapolate_keeps_liquid_faces_and_fills_neighbors() {
        let grid = Grid2::new(8, 8);
        let markers = pocket(grid);
        let velocity = StaggeredVectorField::new(grid, Vec2::new(2.0, -1.0));
        let mut out = StaggeredVectorField::new(grid, Vec2::ZERO);
        let mut scratch = ExtrapolationScratch::new(grid);
        let undefined = velocity.extrapolate(&mut out, &markers, &mut scratch, 10);
        assert_eq!(undefined, 0);
        assert_close(out.u().get(3, 4), 2.0, 1e-6);
        assert_close(out.v().get(4, 3), -1.0, 1e-6);
        assert_close(out.u().get(1, 1), 2.0, 1e-6);
        assert_close(out.v().get(6, 6), -1.0, 1e-6);
        assert_eq!(out.u().get(2, 0), 0.0);
        assert_eq!(out.v().get(8, 2), 0.0);
    }

    #[test]
    fn extrapolate_ignores_stale_non_liquid_values() {
        let grid = Grid2::new(8, 8);
        let markers = pocket(grid);
        let mut velocity = StaggeredVectorField::new(grid, Vec2::new(1.0, 1.0));
        velocity.u_mut().set(1, 1, 500.0);
        velocity.v_mut().set(6, 6, -500.0);
        let mut out = StaggeredVectorField::new(grid, Vec2::ZERO);
        let mut scratch = ExtrapolationScratch::new(grid);
        velocity.extrapolate(&mut out, &markers, &mut scratch, 10);
        assert_close(out.u().get(1, 1), 1.0, 1e-6);
        assert_close(out.v().get(6, 6), 1.0, 1e-6);
    }

    #[test]
    fn extrapolate_with_limited_passes_leaves_far_faces_undefined() {
        let grid = Grid2::new(12, 12);
        let markers = pocket(grid);
        let velocity = StaggeredVectorField::new(grid, Vec2::new(3.0, 3.0));
        let mut out = StaggeredVectorField::new(grid, Vec2::new(9.0, 9.0));
        let mut scratch = ExtrapolationScratch::new(grid);
        let undefined = velocity.extrapolate(&mut out, &markers, &mut scratch, 1);
        assert!(undefined > 0);
        assert_eq!(scratch.u().get(10, 10), None);
        assert_eq!(out.u().get(9, 9), 0.0);
        assert!(out.is_finite());
    }

    #[test]
    fn extrapolate_without_liquid_yields_zero_field() {
        let grid = Grid2::new(6, 6);
        let mut markers = MarkerField::new(grid, Marker::Air);
        markers.fill_ring(Marker::Solid);
        let velocity = StaggeredVectorField::new(grid, Vec2::new(4.0, 4.0));
        let mut out = StaggeredVectorField::new(grid, Vec2::ZERO);
        let mut scratch = ExtrapolationScratch::new(grid);
        let undefined = velocity.extrapolate(&mut out, &markers, &mut scratch, 10);
        assert_eq!(undefined, 7 * 6 + 6 * 7);
        assert_eq!(out.max_abs(), 0.0);
    }
}
