/*
 * Flock Simulator
 *
 * Runs one or more flocks of boids described by a TOML configuration file.
 * Each flock follows alignment, cohesion and separation rules, and may chase
 * or flee other flocks through its affinity list.
 *
 * The nannou event loop calls `update` once per frame; each call runs exactly
 * one world tick against a display list, which `view` then draws.
 */

use std::path::PathBuf;
use std::process;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use clap::Parser;
use nannou::prelude::*;
use tracing::{error, info};

use flocking::renderer::{DisplayList, DrawCommand};
use flocking::{EventQueue, RunState, SimEvent, SimulationConfig, World};

const WINDOW_TITLE: &str = "Flock Simulator";

// The nannou model builder is a plain fn, so the parsed configuration is
// handed over through here.
static CONFIG: OnceLock<SimulationConfig> = OnceLock::new();

/// Boid flock simulator.
///
/// The simulation is defined by a configuration file. To view a demo, run
/// without arguments or pass one of the files in the demos/ folder.
#[derive(Parser, Debug)]
#[command(name = "flocking", version, about)]
struct Cli {
    /// Path to the simulation configuration.
    #[arg(default_value = "config.toml")]
    config: PathBuf,
}

struct Model {
    world: World,
    display: DisplayList,
    events: EventQueue,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = SimulationConfig::load(&cli.config)
        .with_context(|| format!("could not load {}", cli.config.display()))?;
    CONFIG
        .set(config)
        .map_err(|_| anyhow::anyhow!("configuration already initialised"))?;

    nannou::app(model).update(update).run();
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn model(app: &App) -> Model {
    let config = CONFIG.get().expect("configuration is loaded before the app starts");
    let (width, height) = config.window.dimensions;

    app.new_window()
        .title(WINDOW_TITLE)
        .size(width, height)
        .view(view)
        .resized(resized)
        .closed(closed)
        .build()
        .expect("failed to create window");

    let world = World::new(config);
    info!(width, height, "Window opened");

    Model {
        world,
        display: DisplayList::new(),
        events: EventQueue::new(),
    }
}

fn update(app: &App, model: &mut Model, _update: Update) {
    match model.world.frame(&mut model.display, &mut model.events) {
        Ok(RunState::Running) => {}
        Ok(RunState::Terminated) => app.quit(),
        Err(err) => {
            error!(%err, tick = model.world.ticks(), "Simulation halted");
            process::exit(1);
        }
    }
}

fn resized(_app: &App, model: &mut Model, size: Vec2) {
    model.events.push(SimEvent::Resize {
        width: <f64 as From<f32>>::from(size.x),
        height: <f64 as From<f32>>::from(size.y),
    });
}

fn closed(_app: &App, model: &mut Model) {
    model.events.push(SimEvent::Quit);
}

// Replay the last presented frame. The display list uses window coordinates
// with the origin at the top-left and y pointing down; nannou is centered
// with y pointing up.
fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    let window_rect = app.window_rect();
    let half = vec2(window_rect.w(), window_rect.h()) / 2.0;
    let to_screen = |x: f64, y: f64| pt2(x as f32 - half.x, half.y - y as f32);

    for command in model.display.presented() {
        match command {
            DrawCommand::Clear(c) => {
                draw.background().color(rgb(c.r, c.g, c.b));
            }
            DrawCommand::LineStrip { points, color } => {
                draw.polyline()
                    .weight(1.0)
                    .points(points.iter().map(|p| to_screen(p.x, p.y)))
                    .color(rgb(color.r, color.g, color.b));
            }
            DrawCommand::Marker { center, color, radius } => {
                draw.ellipse()
                    .xy(to_screen(center.x, center.y))
                    .radius(*radius as f32)
                    .color(rgb(color.r, color.g, color.b));
            }
        }
    }

    if let Err(err) = draw.to_frame(app, &frame) {
        error!(?err, "Failed to draw frame");
    }
}
