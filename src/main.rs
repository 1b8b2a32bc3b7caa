use anyhow::{Context, Result};
use log::info;
use marker_flow::{dam_break, Marker, SimParams, Simulation};

const GRID_WIDTH: usize = 64;
const GRID_HEIGHT: usize = 48;
const STEPS_DEFAULT: usize = 200;
const REPORT_EVERY: usize = 20;

fn steps_from_env() -> usize {
    std::env::var("SIM_STEPS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(STEPS_DEFAULT)
}

fn main() -> Result<()> {
    env_logger::init();
    let params = SimParams::from_env();
    let steps = steps_from_env();
    let mut sim = Simulation::new(dam_break(GRID_WIDTH, GRID_HEIGHT), params)
        .context("failed to build dam-break scene")?;
    info!(
        "dam break on {}x{} with {} particles, dt {}, {} jacobi sweeps",
        sim.width(),
        sim.height(),
        sim.particles().len(),
        params.dt,
        params.jacobi_iterations
    );
    for step in 1..=steps {
        sim.step();
        if step % REPORT_EVERY == 0 || step == steps {
            let (dye_min, dye_max) = sim.concentration().min_max();
            info!(
                "step {step}: liquid cells {}, max face velocity {:.3}, dye total {:.3} in [{:.3}, {:.3}], max pressure {:.3}",
                sim.markers().count(Marker::Liquid),
                sim.velocity().max_abs(),
                sim.concentration().sum(),
                dye_min,
                dye_max,
                sim.pressure().max_abs()
            );
        }
    }
    if !sim.velocity().is_finite() {
        anyhow::bail!("velocity diverged after {} ticks", sim.tick());
    }
    Ok(())
}
