/*
 * Simulation Parameters Module
 *
 * This module defines the configuration consumed by the world and its flocks.
 * A configuration is a TOML document with three parts:
 * - [window]: initial dimensions and background color
 * - [simulation]: pacing of the tick loop
 * - [[flocks]]: one table per flock with its rule weights and visual style
 *
 * Parsing and validation both happen here, so the world and the flocks can
 * take the parameter structs as given.
 */

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::color::Rgb8;
use crate::error::ConfigError;

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    pub window: WindowConfig,
    pub simulation: StepConfig,
    pub flocks: Vec<FlockConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    pub dimensions: (u32, u32),
    pub background_color: Rgb8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StepConfig {
    /// Target wall-clock seconds per tick.
    pub step_length: f64,
    /// Seeds agent spawning; thread entropy is used when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub update_mode: UpdateMode,
}

impl StepConfig {
    // None when the step length is negative, not finite, or too long for a Duration
    pub fn step_duration(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.step_length).ok()
    }
}

/// How the agents of one flock observe each other during a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    /// Agents read the live flock, including flockmates already moved this tick.
    #[default]
    Sequential,
    /// Agents read the flock as it was when its pass began.
    Synchronous,
}

// One `[[flocks]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct FlockConfig {
    /// Only needed when another flock targets this one through its affinity list.
    #[serde(default)]
    pub id: Option<String>,
    pub count: usize,
    #[serde(default)]
    pub affinity: Vec<Affinity>,
    #[serde(flatten)]
    pub behavior: BehaviorParams,
    pub color: Rgb8,
    pub tracer: TracerConfig,
}

// Rule weights shared by every agent of a flock
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BehaviorParams {
    pub alignment: f64,
    pub separation: f64,
    pub cohesion: f64,
    pub min_separation: f64,
    pub max_speed: f64,
    pub boundary_force: f64,
    pub sight_range: f64,
}

/// Attraction toward (positive strength) or repulsion from (negative strength)
/// the nearest visible agent of another flock. Written as `["prey", 0.5]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "(String, f64)")]
pub struct Affinity {
    pub target: String,
    pub strength: f64,
}

impl From<(String, f64)> for Affinity {
    fn from((target, strength): (String, f64)) -> Self {
        Self { target, strength }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TracerConfig {
    pub length: usize,
    /// 0.5 makes the trail 50% lighter than the body color.
    pub shade: f64,
    pub enabled: bool,
}

impl SimulationConfig {
    // Read, parse and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;

        info!(
            path = %path.display(),
            flocks = config.flocks.len(),
            agents = config.flocks.iter().map(|f| f.count).sum::<usize>(),
            "Loaded simulation configuration"
        );
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(ConfigError::Syntax)?;
        config.validate()?;
        Ok(config)
    }

    // Reject values the simulation cannot run with. Affinity targets are
    // deliberately left alone; they are resolved when first evaluated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (width, height) = self.window.dimensions;
        if width == 0 || height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window.dimensions must be positive, got ({width}, {height})"
            )));
        }

        if self.simulation.step_duration().is_none() {
            return Err(ConfigError::Invalid(format!(
                "simulation.step_length must be a non-negative number of seconds, got {}",
                self.simulation.step_length
            )));
        }

        for (index, flock) in self.flocks.iter().enumerate() {
            flock.validate().map_err(|reason| {
                let name = flock.id.as_deref().unwrap_or("<anonymous>");
                ConfigError::Invalid(format!("flocks[{index}] ({name}): {reason}"))
            })?;
        }

        Ok(())
    }
}

impl FlockConfig {
    fn validate(&self) -> Result<(), String> {
        let b = &self.behavior;
        let weights = [
            ("alignment", b.alignment),
            ("separation", b.separation),
            ("cohesion", b.cohesion),
            ("boundary_force", b.boundary_force),
            ("tracer.shade", self.tracer.shade),
        ];
        for (name, value) in weights {
            if !value.is_finite() {
                return Err(format!("{name} must be finite"));
            }
        }

        let distances = [
            ("min_separation", b.min_separation),
            ("max_speed", b.max_speed),
            ("sight_range", b.sight_range),
        ];
        for (name, value) in distances {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be a non-negative number, got {value}"));
            }
        }

        for affinity in &self.affinity {
            if !affinity.strength.is_finite() {
                return Err(format!("affinity toward \"{}\" must be finite", affinity.target));
            }
        }

        Ok(())
    }
}
