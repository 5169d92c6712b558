/*
 * World Module
 *
 * The world owns every flock and drives the fixed-cadence tick loop:
 * 1. Clear the frame to the background color
 * 2. Draw the trails of every flock that has them enabled
 * 3. For every agent: draw its body, then update it
 * 4. Present the frame
 * 5. Sleep away whatever is left of the step length
 * 6. Handle resize and quit events
 *
 * Trails for all flocks are drawn before any body so a trail never covers a
 * boid. Bodies are drawn before their update, so a frame shows where agents
 * were at the start of the tick.
 *
 * Agent positions are relative to the center of the window; the renderer
 * receives window coordinates with the origin at the top-left corner.
 */

use std::thread;
use std::time::{Duration, Instant};

use glam::DVec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace, warn};

use crate::color::Rgb8;
use crate::error::WorldError;
use crate::events::{EventSource, SimEvent};
use crate::flock::{Flock, Surroundings};
use crate::params::{SimulationConfig, UpdateMode};
use crate::renderer::Renderer;

// Radius of the marker drawn for each agent, in pixels
pub const MARKER_RADIUS: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Terminated,
}

#[derive(Debug)]
pub struct World {
    dimensions: DVec2,
    background: Rgb8,
    step_length: Duration,
    update_mode: UpdateMode,
    flocks: Vec<Flock>,
    state: RunState,
    ticks: u64,
    // Reused for the absolute points of each trail
    trail_buffer: Vec<DVec2>,
}

impl World {
    // Build the world described by `config`, seeding agent placement from
    // `simulation.seed` when one is given.
    pub fn new(config: &SimulationConfig) -> Self {
        match config.simulation.seed {
            Some(seed) => Self::with_rng(config, &mut StdRng::seed_from_u64(seed)),
            None => Self::with_rng(config, &mut rand::thread_rng()),
        }
    }

    pub fn with_rng<R: Rng + ?Sized>(config: &SimulationConfig, rng: &mut R) -> Self {
        let (width, height) = config.window.dimensions;
        let dimensions = DVec2::new(f64::from(width), f64::from(height));

        let flocks: Vec<Flock> = config
            .flocks
            .iter()
            .map(|flock| Flock::spawn(flock, dimensions, rng))
            .collect();

        for flock in &flocks {
            info!(
                id = flock.id().unwrap_or("<anonymous>"),
                agents = flock.len(),
                affinities = flock.affinity().len(),
                "Spawned flock"
            );
        }

        let mut world = Self::from_flocks(
            dimensions,
            config.window.background_color,
            config.simulation.step_duration().unwrap_or_default(),
            flocks,
        );
        world.update_mode = config.simulation.update_mode;
        world
    }

    pub fn from_flocks(dimensions: DVec2, background: Rgb8, step_length: Duration, flocks: Vec<Flock>) -> Self {
        Self {
            dimensions,
            background,
            step_length,
            update_mode: UpdateMode::default(),
            flocks,
            state: RunState::Running,
            ticks: 0,
            trail_buffer: Vec::new(),
        }
    }

    pub fn with_update_mode(mut self, mode: UpdateMode) -> Self {
        self.update_mode = mode;
        self
    }

    pub fn dimensions(&self) -> DVec2 {
        self.dimensions
    }

    pub fn step_length(&self) -> Duration {
        self.step_length
    }

    pub fn update_mode(&self) -> UpdateMode {
        self.update_mode
    }

    pub fn flocks(&self) -> &[Flock] {
        &self.flocks
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    // Linear scan; the first flock carrying `id` wins
    pub fn get_flock(&self, id: &str) -> Result<&Flock, WorldError> {
        self.flocks
            .iter()
            .find(|flock| flock.id() == Some(id))
            .ok_or_else(|| WorldError::UnknownFlock(id.to_owned()))
    }

    // Convert a position relative to the window's center into window coordinates
    pub fn absolute_coords(&self, point: DVec2) -> DVec2 {
        point + self.dimensions / 2.0
    }

    /// Update one agent of one flock against the live world.
    ///
    /// # Panics
    /// If either index is out of bounds.
    pub fn update_boid(&mut self, flock_index: usize, agent_index: usize) -> Result<(), WorldError> {
        let (flock, surroundings) = self.split_flock(flock_index);
        flock.update_boid(agent_index, &surroundings)
    }

    // Borrow one flock mutably, and everything else it may read alongside it
    fn split_flock(&mut self, flock_index: usize) -> (&mut Flock, Surroundings<'_>) {
        let (preceding, rest) = self.flocks.split_at_mut(flock_index);
        let (flock, following) = rest
            .split_first_mut()
            .expect("flock index out of bounds");

        (flock, Surroundings::new(self.dimensions, preceding, following))
    }

    // Update every agent once without drawing anything
    pub fn update(&mut self) -> Result<(), WorldError> {
        for flock_index in 0..self.flocks.len() {
            let snapshot = self.snapshot(flock_index);
            for agent_index in 0..self.flocks[flock_index].len() {
                self.update_agent(flock_index, agent_index, snapshot.as_ref())?;
            }
        }
        self.ticks += 1;
        Ok(())
    }

    // The frozen copy a synchronous pass reads from
    fn snapshot(&self, flock_index: usize) -> Option<Flock> {
        match self.update_mode {
            UpdateMode::Sequential => None,
            UpdateMode::Synchronous => Some(self.flocks[flock_index].clone()),
        }
    }

    fn update_agent(
        &mut self,
        flock_index: usize,
        agent_index: usize,
        snapshot: Option<&Flock>,
    ) -> Result<(), WorldError> {
        let Some(snapshot) = snapshot else {
            return self.update_boid(flock_index, agent_index);
        };

        let (flock, surroundings) = self.split_flock(flock_index);
        flock.update_boid_from(agent_index, snapshot, &surroundings)
    }

    // Clear, draw trails, draw and update every agent, then present
    pub fn render_and_update<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> Result<(), WorldError> {
        renderer.clear(self.background);
        self.draw_trails(renderer);

        for flock_index in 0..self.flocks.len() {
            let snapshot = self.snapshot(flock_index);
            let color = self.flocks[flock_index].style().color;

            for agent_index in 0..self.flocks[flock_index].len() {
                let position = self.flocks[flock_index].agents()[agent_index].position;
                renderer.draw_marker(self.absolute_coords(position), color, MARKER_RADIUS);
                self.update_agent(flock_index, agent_index, snapshot.as_ref())?;
            }
        }

        renderer.present();
        self.ticks += 1;
        Ok(())
    }

    fn draw_trails<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        let offset = self.dimensions / 2.0;

        for flock in self.flocks.iter().filter(|flock| flock.style().tracer.enabled) {
            let color = flock.style().trail_color;
            for agent in flock.agents() {
                let trail = agent.trail();
                if trail.len() <= 2 {
                    continue;
                }
                self.trail_buffer.clear();
                self.trail_buffer.extend(trail.iter().map(|point| point + offset));
                renderer.draw_line_strip(&self.trail_buffer, color);
            }
        }
    }

    // One complete tick: draw and update, pace, then handle events.
    // Does nothing once the world has terminated.
    pub fn frame<R, E>(&mut self, renderer: &mut R, events: &mut E) -> Result<RunState, WorldError>
    where
        R: Renderer + ?Sized,
        E: EventSource + ?Sized,
    {
        if self.state == RunState::Terminated {
            return Ok(RunState::Terminated);
        }

        let start = Instant::now();
        self.render_and_update(renderer)?;

        let elapsed = start.elapsed();
        if let Some(remaining) = self.step_length.checked_sub(elapsed) {
            thread::sleep(remaining);
        } else if !self.step_length.is_zero() {
            warn!(
                tick = self.ticks,
                elapsed_ms = elapsed.as_secs_f64() * 1000.0,
                step_ms = self.step_length.as_secs_f64() * 1000.0,
                "Tick overran its step length"
            );
        }
        trace!(tick = self.ticks, elapsed_us = elapsed.as_micros() as u64, "Tick complete");

        for event in events.poll() {
            self.handle_event(event);
        }

        Ok(self.state)
    }

    pub fn handle_event(&mut self, event: SimEvent) {
        match event {
            SimEvent::Resize { width, height } => {
                debug!(width, height, "Window resized");
                self.dimensions = DVec2::new(width, height);
            }
            SimEvent::Quit => {
                debug!(tick = self.ticks, "Quit requested");
                self.state = RunState::Terminated;
            }
            SimEvent::Other => {}
        }
    }

    // Run ticks until a quit event arrives
    pub fn run<R, E>(&mut self, renderer: &mut R, events: &mut E) -> Result<(), WorldError>
    where
        R: Renderer + ?Sized,
        E: EventSource + ?Sized,
    {
        info!(flocks = self.flocks.len(), "Simulation running");
        while self.frame(renderer, events)? == RunState::Running {}
        info!(ticks = self.ticks, "Simulation terminated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use crate::events::EventQueue;
    use crate::flock::FlockStyle;
    use crate::params::{Affinity, BehaviorParams, TracerConfig};
    use crate::renderer::{DisplayList, DrawCommand};

    fn still_flock(id: Option<&str>, positions: &[(f64, f64)], tracer_length: usize) -> Flock {
        let behavior = BehaviorParams {
            alignment: 0.0,
            separation: 0.0,
            cohesion: 0.0,
            min_separation: 0.0,
            max_speed: 10.0,
            boundary_force: 0.0,
            sight_range: 10.0,
        };
        let style = FlockStyle::new(
            Rgb8::new(0, 128, 255),
            TracerConfig {
                length: tracer_length,
                shade: 0.0,
                enabled: true,
            },
        );
        let agents = positions
            .iter()
            .map(|&(x, y)| Agent::new(DVec2::new(x, y), DVec2::new(1.0, 0.0), tracer_length))
            .collect();
        Flock::new(id.map(str::to_owned), behavior, Vec::<Affinity>::new(), style, agents)
    }

    fn world(flocks: Vec<Flock>) -> World {
        World::from_flocks(DVec2::new(100.0, 80.0), Rgb8::new(1, 2, 3), Duration::ZERO, flocks)
    }

    #[test]
    fn get_flock_finds_first_match() {
        let world = world(vec![
            still_flock(None, &[(0.0, 0.0)], 0),
            still_flock(Some("a"), &[(1.0, 0.0)], 0),
            still_flock(Some("a"), &[(2.0, 0.0), (3.0, 0.0)], 0),
        ]);

        assert_eq!(world.get_flock("a").unwrap().len(), 1);
        assert_eq!(world.get_flock("b").unwrap_err(), WorldError::UnknownFlock("b".into()));
    }

    #[test]
    fn absolute_coords_offsets_by_half_dimensions() {
        let world = world(vec![]);
        assert_eq!(world.absolute_coords(DVec2::new(-50.0, 10.0)), DVec2::new(0.0, 50.0));
    }

    #[test]
    fn markers_show_pre_tick_positions() {
        let mut world = world(vec![still_flock(None, &[(0.0, 0.0)], 0)]);
        let mut display = DisplayList::new();

        world.render_and_update(&mut display).unwrap();

        assert_eq!(
            display.presented(),
            &[
                DrawCommand::Clear(Rgb8::new(1, 2, 3)),
                DrawCommand::Marker {
                    center: DVec2::new(50.0, 40.0),
                    color: Rgb8::new(0, 128, 255),
                    radius: MARKER_RADIUS,
                },
            ]
        );
        assert_eq!(world.flocks()[0].agents()[0].position, DVec2::new(1.0, 0.0));
    }

    #[test]
    fn trails_need_more_than_two_points() {
        let mut world = world(vec![still_flock(None, &[(0.0, 0.0)], 5)]);
        let mut display = DisplayList::new();

        let strips = |display: &DisplayList| {
            display
                .presented()
                .iter()
                .filter(|command| matches!(command, DrawCommand::LineStrip { .. }))
                .count()
        };

        for _ in 0..3 {
            world.render_and_update(&mut display).unwrap();
            assert_eq!(strips(&display), 0);
        }
        world.render_and_update(&mut display).unwrap();
        assert_eq!(strips(&display), 1);
    }

    #[test]
    fn resize_and_quit_events_are_applied_after_the_tick() {
        let mut world = world(vec![still_flock(None, &[(0.0, 0.0)], 0)]);
        let mut display = DisplayList::new();
        let mut events = EventQueue::new();

        events.push(SimEvent::Other);
        events.push(SimEvent::Resize { width: 300.0, height: 200.0 });
        assert_eq!(world.frame(&mut display, &mut events).unwrap(), RunState::Running);
        assert_eq!(world.dimensions(), DVec2::new(300.0, 200.0));

        events.push(SimEvent::Quit);
        assert_eq!(world.frame(&mut display, &mut events).unwrap(), RunState::Terminated);
        assert_eq!(world.ticks(), 2);

        // A terminated world no longer ticks
        assert_eq!(world.frame(&mut display, &mut events).unwrap(), RunState::Terminated);
        assert_eq!(world.ticks(), 2);
        assert_eq!(display.frames_presented(), 2);
    }
}
