use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Largest step handed to the simulation, in seconds.
    pub max_step: f32,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self { max_step: 0.05 }
    }
}

impl ClockConfig {
    /// Clamp an externally supplied step into `[0, max_step]`. Non-finite steps become 0.
    pub fn clamp_step(&self, dt: f32) -> f32 {
        if dt.is_finite() {
            dt.clamp(0.0, self.max_step)
        } else {
            0.0
        }
    }
}

/// Monotonic frame clock. Each `tick` returns the clamped time since the previous one.
#[derive(Debug)]
pub struct FrameClock {
    config: ClockConfig,
    last: Option<Instant>,
}

impl FrameClock {
    pub fn new(config: ClockConfig) -> Self {
        Self { config, last: None }
    }

    /// Seconds since the previous tick, clamped. The first tick returns 0.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> f32 {
        let dt = match self.last {
            Some(prev) => now.saturating_duration_since(prev).as_secs_f32(),
            None => 0.0,
        };
        self.last = Some(now);
        self.config.clamp_step(dt)
    }
}

/// Part of a session step whose wall time is profiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepSection {
    /// Locomotion and the collision resolve.
    Movement,
    /// Actions and the goal checks.
    Interaction,
    /// Appearance timer, agent update and tension.
    Agent,
}

impl StepSection {
    pub const ALL: [StepSection; 3] = [Self::Movement, Self::Interaction, Self::Agent];

    pub fn label(self) -> &'static str {
        match self {
            Self::Movement => "movement",
            Self::Interaction => "interaction",
            Self::Agent => "agent",
        }
    }
}

pub const DEFAULT_PROFILE_WINDOW: usize = 600;

/// Wall-clock cost of the most recent steps, split by section.
///
/// Nothing in the simulation reads it, so replays match whatever it records.
#[derive(Debug, Clone)]
pub struct StepProfile {
    window: usize,
    samples: [VecDeque<Duration>; 3],
}

impl Default for StepProfile {
    fn default() -> Self {
        Self::new(DEFAULT_PROFILE_WINDOW)
    }
}

impl StepProfile {
    /// Keep the last `window` samples of each section.
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            samples: Default::default(),
        }
    }

    pub fn record(&mut self, section: StepSection, cost: Duration) {
        let samples = &mut self.samples[section as usize];
        if samples.len() == self.window {
            samples.pop_front();
        }
        samples.push_back(cost);
    }

    /// Samples held for `section`.
    pub fn count(&self, section: StepSection) -> usize {
        self.samples[section as usize].len()
    }

    pub fn mean(&self, section: StepSection) -> Duration {
        let samples = &self.samples[section as usize];
        match u32::try_from(samples.len()) {
            Ok(0) | Err(_) => Duration::ZERO,
            Ok(n) => samples.iter().sum::<Duration>() / n,
        }
    }

    pub fn peak(&self, section: StepSection) -> Duration {
        self.samples[section as usize]
            .iter()
            .copied()
            .max()
            .unwrap_or(Duration::ZERO)
    }

    /// Sum of the section means: the typical cost of one whole step.
    pub fn mean_step(&self) -> Duration {
        StepSection::ALL.iter().map(|&s| self.mean(s)).sum()
    }
}

impl fmt::Display for StepProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Step cost: {:?} mean", self.mean_step())?;
        for section in StepSection::ALL {
            write!(
                f,
                ", {} {:?} (peak {:?})",
                section.label(),
                self.mean(section),
                self.peak(section)
            )?;
        }
        write!(f, " over {} steps", self.count(StepSection::Movement))
    }
}
