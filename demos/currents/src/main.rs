use cgmath::{vec3, Vector3};
use eddy::{Axis, FieldConfig, Grid, VelocityField};
use ndarray::Array;
use noise::{NoiseFn, Perlin};
use rand::Rng;

mod frame;

const NX: usize = 200;
const NY: usize = 100;
const N_FRAME: usize = 120;
const N_TRACERS: usize = 20000;

const FRAME_TIME: f64 = 1.0 / 24.0;
// Wall-clock time represented by one fixed step of the field.
const TIME_PER_STEP: f64 = 0.01;
const MAX_CURRENT: f64 = 20.0;
const TRACER_DIFFUSION: f64 = 0.05;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    std::fs::create_dir_all("out")?;

    let grid = Grid::planar(NX, NY)?;
    let config = FieldConfig::default().with_solver_iterations(6);

    let perlin = Perlin::new();
    let freq = 4.0;
    let noise_component = |offset: f64| {
        Array::from_shape_fn(grid.len(), |k| {
            let (x, y) = (k % NX, k / NX);
            perlin.get([x as f64 / NX as f64 * freq, y as f64 / NY as f64 * freq, offset])
        })
    };
    let mut field = VelocityField::from_components(grid, config, vec![noise_component(0.0), noise_component(0.5)])?;

    let mut rng = rand::thread_rng();
    let mut tracers: Vec<Vector3<f64>> = (0..N_TRACERS)
        .map(|_| {
            vec3(
                rng.gen_range(0.0..NX as f64),
                rng.gen_range(1.0..(NY - 1) as f64),
                0.0,
            )
        })
        .collect();

    let mut timer = 0.0;
    let mut steps = 0;

    for f in 1..=N_FRAME {
        frame::save_frame("currents", f, &field, &tracers, 4, 8)?;

        // A stirrer circling the middle of the domain stands in for user input.
        let angle = f as f64 * 0.15;
        let center = vec3(NX as f64 * 0.5 + 40.0 * angle.cos(), NY as f64 * 0.5 + 25.0 * angle.sin(), 0.0);
        let strength = (2.0 + f as f64 * 0.1).min(MAX_CURRENT);
        let push = vec3(-angle.sin(), angle.cos(), 0.0) * strength;
        field.add_disturbance(center, NY as f64 / 10.0, push)?;

        timer += FRAME_TIME;
        while timer > TIME_PER_STEP {
            timer -= TIME_PER_STEP;
            field.step_default();
            steps += 1;

            let dt = field.config().dt;
            for p in tracers.iter_mut() {
                let v = field.sample_velocity(*p)?;
                p.x += v.x * dt + rng.gen_range(-TRACER_DIFFUSION..=TRACER_DIFFUSION);
                p.y += v.y * dt + rng.gen_range(-TRACER_DIFFUSION..=TRACER_DIFFUSION);

                p.x = p.x.rem_euclid(NX as f64);
                p.y = p.y.max(0.5).min(NY as f64 - 0.5);
            }
        }

        let stats = field.last_step();
        log::info!(
            "frame {} / {}: {} steps, divergence {:.3e} -> {:.3e}, u(center) = {:.3}",
            f,
            N_FRAME,
            steps,
            stats.divergence_advected,
            stats.divergence_projected,
            field.sample(center, Axis::X)?
        );
    }

    Ok(())
}
