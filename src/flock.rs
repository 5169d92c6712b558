/*
 * Flock Module
 *
 * A flock owns a fixed population of agents that share one set of rule
 * weights and one visual style. Each agent is steered by, in order:
 * 1. Alignment: match the mean velocity of visible flockmates
 * 2. Cohesion: steer toward the centroid of visible flockmates
 * 3. Separation: push away from flockmates closer than `min_separation`
 * 4. Affinity: chase (or flee) the nearest visible agent of another flock
 * then its speed is clamped, it is nudged back toward the window when it has
 * strayed outside, and it takes one integration step.
 *
 * Agents are updated one at a time against the live state of the flock, so an
 * agent updated later in a tick sees the already-moved flockmates before it.
 */

use glam::DVec2;
use rand::Rng;

use crate::agent::Agent;
use crate::color::{lighten, Rgb8};
use crate::error::WorldError;
use crate::params::{Affinity, BehaviorParams, FlockConfig, TracerConfig};

#[derive(Debug, Clone)]
pub struct Flock {
    id: Option<String>,
    behavior: BehaviorParams,
    affinity: Vec<Affinity>,
    style: FlockStyle,
    agents: Vec<Agent>,
}

// Only the renderer cares about these
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlockStyle {
    pub color: Rgb8,
    pub trail_color: Rgb8,
    pub tracer: TracerConfig,
}

impl FlockStyle {
    pub fn new(color: Rgb8, tracer: TracerConfig) -> Self {
        Self {
            color,
            trail_color: lighten(color, tracer.shade),
            tracer,
        }
    }
}

/// Everything a flock may read outside itself while updating one agent:
/// the world's dimensions and the other flocks, split around the one being
/// updated so affinity targets can be resolved without borrowing it twice.
#[derive(Debug, Clone, Copy)]
pub struct Surroundings<'a> {
    pub dimensions: DVec2,
    preceding: &'a [Flock],
    following: &'a [Flock],
}

impl<'a> Surroundings<'a> {
    pub fn new(dimensions: DVec2, preceding: &'a [Flock], following: &'a [Flock]) -> Self {
        Self {
            dimensions,
            preceding,
            following,
        }
    }

    // A world that holds nothing but the flock being updated
    pub fn isolated(dimensions: DVec2) -> Self {
        Self::new(dimensions, &[], &[])
    }

    // Scan flocks in world order, with `current` sitting between the two halves.
    // The first flock carrying `id` wins.
    fn resolve<'b>(&'b self, current: &'b Flock, id: &str) -> Result<&'b Flock, WorldError> {
        self.preceding
            .iter()
            .chain(std::iter::once(current))
            .chain(self.following.iter())
            .find(|flock| flock.id() == Some(id))
            .ok_or_else(|| WorldError::UnknownFlock(id.to_owned()))
    }
}

impl Flock {
    pub fn new(
        id: Option<String>,
        behavior: BehaviorParams,
        affinity: Vec<Affinity>,
        style: FlockStyle,
        agents: Vec<Agent>,
    ) -> Self {
        Self {
            id,
            behavior,
            affinity,
            style,
            agents,
        }
    }

    // Build a flock from its configuration, spawning `count` agents in a box
    // half the size of the world, centered on the origin.
    pub fn spawn<R: Rng + ?Sized>(config: &FlockConfig, dimensions: DVec2, rng: &mut R) -> Self {
        let half_extent = dimensions / 4.0;
        let agents = (0..config.count)
            .map(|_| Agent::random(rng, half_extent, config.tracer.length))
            .collect();

        Self::new(
            config.id.clone(),
            config.behavior,
            config.affinity.clone(),
            FlockStyle::new(config.color, config.tracer),
            agents,
        )
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn behavior(&self) -> &BehaviorParams {
        &self.behavior
    }

    pub fn affinity(&self) -> &[Affinity] {
        &self.affinity
    }

    pub fn style(&self) -> &FlockStyle {
        &self.style
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Apply every rule to the agent at `index`, then move it.
    ///
    /// Fails only when an affinity entry names a flock that `surroundings`
    /// (and this flock) cannot resolve; the agent is left untouched then.
    ///
    /// # Panics
    /// If `index` is out of bounds.
    pub fn update_boid(&mut self, index: usize, surroundings: &Surroundings<'_>) -> Result<(), WorldError> {
        let velocity = self.steer(index, surroundings)?;
        self.commit(index, velocity);
        Ok(())
    }

    // Same as `update_boid`, but the rules read `snapshot` instead of the live
    // flock, so the result does not depend on which agents moved earlier.
    pub fn update_boid_from(
        &mut self,
        index: usize,
        snapshot: &Flock,
        surroundings: &Surroundings<'_>,
    ) -> Result<(), WorldError> {
        let velocity = snapshot.steer(index, surroundings)?;
        self.commit(index, velocity);
        Ok(())
    }

    fn commit(&mut self, index: usize, velocity: DVec2) {
        let agent = &mut self.agents[index];
        agent.velocity = velocity;
        agent.integrate();
    }

    // The agent's velocity after rules 1-4, the speed clamp and the boundary impulse.
    // Rules 2-4 only read positions, which do not change until integration,
    // so summing their deltas here matches applying them one after another.
    fn steer(&self, index: usize, surroundings: &Surroundings<'_>) -> Result<DVec2, WorldError> {
        let agent = &self.agents[index];

        let mut velocity = agent.velocity;
        velocity += self.alignment(index, velocity);
        velocity += self.cohesion(index);
        velocity += self.separation(index);
        velocity += self.affinity_pull(index, surroundings)?;

        let velocity = self.limit_speed(velocity);
        Ok(self.keep_in_bounds(agent.position, velocity, surroundings.dimensions))
    }

    // Visible flockmates of the agent at `index`, excluding itself
    fn neighbors(&self, index: usize) -> impl Iterator<Item = &Agent> + '_ {
        let agent = &self.agents[index];
        let range = self.behavior.sight_range;
        self.agents
            .iter()
            .enumerate()
            .filter(move |&(i, other)| i != index && agent.visible_to(other, range))
            .map(|(_, other)| other)
    }

    // With no neighbors the mean is zero, so this damps the velocity instead
    fn alignment(&self, index: usize, velocity: DVec2) -> DVec2 {
        let (sum, count) = self
            .neighbors(index)
            .fold((DVec2::ZERO, 0usize), |(sum, count), other| (sum + other.velocity, count + 1));
        let mean = if count > 0 { sum / count as f64 } else { DVec2::ZERO };

        (mean - velocity) * self.behavior.alignment
    }

    fn cohesion(&self, index: usize) -> DVec2 {
        let (sum, count) = self
            .neighbors(index)
            .fold((DVec2::ZERO, 0usize), |(sum, count), other| (sum + other.position, count + 1));

        if count == 0 {
            return DVec2::ZERO;
        }

        let center = sum / count as f64;
        (center - self.agents[index].position) * self.behavior.cohesion
    }

    // Not gated by sight range; `min_separation` is its own radius
    fn separation(&self, index: usize) -> DVec2 {
        let agent = &self.agents[index];
        let push: DVec2 = self
            .agents
            .iter()
            .enumerate()
            .filter(|&(i, other)| i != index && agent.distance_to(other) < self.behavior.min_separation)
            .map(|(_, other)| agent.position - other.position)
            .sum();

        push * self.behavior.separation
    }

    fn affinity_pull(&self, index: usize, surroundings: &Surroundings<'_>) -> Result<DVec2, WorldError> {
        let agent = &self.agents[index];
        let mut pull = DVec2::ZERO;

        for Affinity { target, strength } in &self.affinity {
            let flock = surroundings.resolve(self, target)?;
            let nearest = flock
                .agents
                .iter()
                .min_by(|a, b| agent.distance_to(a).total_cmp(&agent.distance_to(b)));

            if let Some(nearest) = nearest {
                if agent.visible_to(nearest, self.behavior.sight_range) {
                    pull += (nearest.position - agent.position) * *strength;
                }
            }
        }

        Ok(pull)
    }

    fn limit_speed(&self, velocity: DVec2) -> DVec2 {
        if velocity.length() > self.behavior.max_speed {
            set_magnitude(velocity, self.behavior.max_speed)
        } else {
            velocity
        }
    }

    // Push an agent that has left the window back toward it. The impulse may
    // turn the agent but never speed it up.
    fn keep_in_bounds(&self, position: DVec2, velocity: DVec2, dimensions: DVec2) -> DVec2 {
        let absolute = position + dimensions / 2.0;
        let force = self.behavior.boundary_force;
        let magnitude = velocity.length();
        let mut corrected = velocity;

        if absolute.x < 0.0 {
            corrected.x += force;
        } else if absolute.x > dimensions.x {
            corrected.x -= force;
        }

        if absolute.y < 0.0 {
            corrected.y += force;
        } else if absolute.y > dimensions.y {
            corrected.y -= force;
        }

        if corrected.length() > magnitude {
            set_magnitude(corrected, magnitude)
        } else {
            corrected
        }
    }

    // Mean position of every agent, or None for an empty flock
    pub fn get_center(&self) -> Option<DVec2> {
        if self.agents.is_empty() {
            return None;
        }
        let sum: DVec2 = self.agents.iter().map(|agent| agent.position).sum();
        Some(sum / self.agents.len() as f64)
    }
}

/// Rescale `v` to `magnitude`, keeping its direction. A zero vector stays zero.
pub fn set_magnitude(v: DVec2, magnitude: f64) -> DVec2 {
    let current = v.length();
    if current == 0.0 {
        DVec2::ZERO
    } else {
        v * (magnitude / current)
    }
}
