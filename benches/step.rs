use criterion::{criterion_group, criterion_main, Criterion};
use marker_flow::{dam_break, SimParams, Simulation};

fn dam_break_update_20(c: &mut Criterion) {
    let mut sim = Simulation::new(dam_break(64, 48), SimParams::default())
        .expect("dam break scene is valid");
    c.bench_function("dam break step x20", |b| {
        b.iter(|| {
            for _ in 0..20 {
                sim.step()
            }
        })
    });
}

fn small_grid_update_100(c: &mut Criterion) {
    let params = SimParams {
        jacobi_iterations: 32,
        ..SimParams::default()
    };
    let mut sim = Simulation::new(dam_break(32, 32), params).expect("scene is valid");
    c.bench_function("small grid step x100", |b| {
        b.iter(|| {
            for _ in 0..100 {
                sim.step()
            }
        })
    });
}

criterion_group!(benches, dam_break_update_20, small_grid_update_100);

criterion_main!(benches);
