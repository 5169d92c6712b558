/*
 * Flock Simulation - Module Definitions
 *
 * Leaf-first: agents are owned by flocks, flocks by the world. The world
 * talks to a window through the renderer and event traits, and is built
 * from a parsed configuration.
 */

// Re-export key components for easier access
pub use agent::{Agent, Trail};
pub use color::{lighten, Rgb8};
pub use error::{ConfigError, WorldError};
pub use events::{EventQueue, EventSource, SimEvent};
pub use flock::{set_magnitude, Flock, FlockStyle, Surroundings};
pub use params::{Affinity, BehaviorParams, FlockConfig, SimulationConfig, TracerConfig, UpdateMode};
pub use renderer::{DisplayList, DrawCommand, Renderer};
pub use world::{RunState, World, MARKER_RADIUS};

// Define modules
pub mod agent;
pub mod color;
pub mod error;
pub mod events;
pub mod flock;
pub mod params;
pub mod renderer;
pub mod world;
