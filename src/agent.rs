/*
 * Agent Module
 *
 * A single boid: position and velocity relative to the world's center, plus
 * a bounded history of recent positions used to draw its trail.
 *
 * Velocity is distance per tick, so one integration step simply adds it to
 * the position.
 */

use std::collections::VecDeque;

use glam::DVec2;
use rand::Rng;

// Initial velocity components are drawn from this range
const SPAWN_VELOCITY: f64 = 1.0;

#[derive(Debug, Clone)]
pub struct Agent {
    pub position: DVec2,
    pub velocity: DVec2,
    trail: Trail,
}

impl Agent {
    pub fn new(position: DVec2, velocity: DVec2, tracer_length: usize) -> Self {
        Self {
            position,
            velocity,
            trail: Trail::with_capacity(tracer_length),
        }
    }

    // Create an agent somewhere inside `half_extent` around the origin,
    // moving in a random direction at a small random speed.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, half_extent: DVec2, tracer_length: usize) -> Self {
        let x = sample(rng, -half_extent.x, half_extent.x);
        let y = sample(rng, -half_extent.y, half_extent.y);
        let vx = rng.gen_range(-SPAWN_VELOCITY..=SPAWN_VELOCITY);
        let vy = rng.gen_range(-SPAWN_VELOCITY..=SPAWN_VELOCITY);

        Self::new(DVec2::new(x, y), DVec2::new(vx, vy), tracer_length)
    }

    // Record the current position in the trail, then take one Euler step
    pub fn integrate(&mut self) {
        self.trail.push(self.position);
        self.position += self.velocity;
    }

    pub fn visible_to(&self, other: &Agent, range: f64) -> bool {
        self.distance_to(other) <= range
    }

    pub fn distance_to(&self, other: &Agent) -> f64 {
        self.position.distance(other.position)
    }

    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    pub fn trail(&self) -> &Trail {
        &self.trail
    }
}

// gen_range panics on an empty range, which a zero-sized axis would produce
fn sample<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    if low < high {
        rng.gen_range(low..=high)
    } else {
        low
    }
}

/// Fixed-capacity FIFO of past positions; the oldest point is evicted first.
#[derive(Debug, Clone, Default)]
pub struct Trail {
    points: VecDeque<DVec2>,
    capacity: usize,
}

impl Trail {
    // `capacity` only bounds the length; storage grows as points arrive
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: VecDeque::new(),
            capacity,
        }
    }

    pub fn push(&mut self, point: DVec2) {
        self.points.push_back(point);
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // Oldest first
    pub fn iter(&self) -> impl Iterator<Item = DVec2> + '_ {
        self.points.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn integrate_records_then_moves() {
        let mut agent = Agent::new(DVec2::new(1.0, 2.0), DVec2::new(0.5, -1.0), 4);
        agent.integrate();

        assert_eq!(agent.position, DVec2::new(1.5, 1.0));
        assert_eq!(agent.trail().iter().collect::<Vec<_>>(), vec![DVec2::new(1.0, 2.0)]);
    }

    #[test]
    fn trail_evicts_oldest_beyond_capacity() {
        let mut agent = Agent::new(DVec2::ZERO, DVec2::X, 3);
        for _ in 0..10 {
            agent.integrate();
            assert!(agent.trail().len() <= 3);
        }

        let points: Vec<_> = agent.trail().iter().collect();
        assert_eq!(points, vec![DVec2::new(7.0, 0.0), DVec2::new(8.0, 0.0), DVec2::new(9.0, 0.0)]);
    }

    #[test]
    fn zero_length_trail_stays_empty() {
        let mut agent = Agent::new(DVec2::ZERO, DVec2::ONE, 0);
        agent.integrate();
        agent.integrate();
        assert!(agent.trail().is_empty());
    }

    #[test]
    fn huge_tracer_length_allocates_lazily() {
        let mut agent = Agent::new(DVec2::ZERO, DVec2::ONE, usize::MAX);
        for _ in 0..3 {
            agent.integrate();
        }
        assert_eq!(agent.trail().len(), 3);
        assert_eq!(agent.trail().capacity(), usize::MAX);
    }

    #[test]
    fn visibility_is_inclusive_at_range() {
        let a = Agent::new(DVec2::ZERO, DVec2::ZERO, 0);
        let b = Agent::new(DVec2::new(3.0, 4.0), DVec2::ZERO, 0);

        assert!(a.visible_to(&b, 5.0));
        assert!(b.visible_to(&a, 5.0));
        assert!(!a.visible_to(&b, 4.999));
    }

    #[test]
    fn random_agents_spawn_inside_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let half = DVec2::new(200.0, 150.0);
        for _ in 0..500 {
            let agent = Agent::random(&mut rng, half, 5);
            assert!(agent.position.x.abs() <= half.x);
            assert!(agent.position.y.abs() <= half.y);
            assert!(agent.velocity.x.abs() <= SPAWN_VELOCITY);
            assert!(agent.velocity.y.abs() <= SPAWN_VELOCITY);
            assert_eq!(agent.trail().capacity(), 5);
        }
    }
}
