//! The stalking agent.
//!
//! Phases run `Dormant -> Active <-> Warping -> Caught`. `Warping` is held for
//! exactly the tick the reposition happened in, so collaborators can see it;
//! the next update returns to `Active`. `Caught` is terminal.

use ashfield_common::{RandomStream, Seed, planar_distance};
use ashfield_kernel::CollisionIndex;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Label of the agent's random stream derived from the run seed.
pub const AGENT_STREAM: &str = "agent";

/// Where a dormant agent waits; far enough that its first active tick warps.
pub const FAR_SENTINEL: Vec3 = Vec3::new(999.0, 0.0, 999.0);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StalkerConfig {
    /// Beyond this distance a ready agent always warps.
    pub far_threshold: f32,
    /// Below this distance the player is caught (or reprieved).
    pub catch_threshold: f32,
    /// Distance at which proximity danger reaches 0.
    pub reference_range: f32,
    pub warp_radius_min: f32,
    pub warp_radius_max: f32,
    /// Cooldown after a warp, before any trigger.
    pub warp_interval: f32,
    /// Cooldown shortening per trigger.
    pub warp_interval_step: f32,
    pub warp_interval_min: f32,
    /// Per-tick warp chance, scaled by anger.
    pub base_warp_chance: f32,
    /// Cap on anger-driven warps; `None` leaves them unbounded.
    pub max_chance_warps: Option<u32>,
    /// Resampling attempts for a warp that lands overlapping a solid.
    pub warp_attempts: u32,
    /// Danger smoothing rate per second while active.
    pub smoothing_rate: f32,
    /// Exponential decay rate of danger while dormant.
    pub dormant_decay: f32,
    pub anger_increment: f32,
    /// Anger lost per second. 0 keeps anger until the run ends.
    pub anger_decay_rate: f32,
    pub visibility_range: f32,
    pub glimpse_threshold: f32,
    pub glimpse_chance: f32,
    /// Chance a catch turns into one more warp instead.
    pub catch_reprieve_chance: f32,
    pub agent_radius: f32,
    /// Preferred stalking distance.
    pub distance_band: f32,
    pub stalk_speed: f32,
    /// Steering target easing rate per second.
    pub steering_rate: f32,
    pub orbit_radius: f32,
    /// Orbit phase speed in radians per second of agent time.
    pub orbit_rate: f32,
    /// Glow easing rate per second.
    pub glow_rate: f32,
}

impl Default for StalkerConfig {
    fn default() -> Self {
        Self {
            far_threshold: 28.0,
            catch_threshold: 2.2,
            reference_range: 26.0,
            warp_radius_min: 20.0,
            warp_radius_max: 30.0,
            warp_interval: 7.0,
            warp_interval_step: 1.0,
            warp_interval_min: 3.0,
            base_warp_chance: 0.015,
            max_chance_warps: None,
            warp_attempts: 6,
            smoothing_rate: 2.0,
            dormant_decay: 0.5,
            anger_increment: 0.3,
            anger_decay_rate: 0.0,
            visibility_range: 26.0,
            glimpse_threshold: 0.35,
            glimpse_chance: 0.01,
            catch_reprieve_chance: 0.15,
            agent_radius: 0.4,
            distance_band: 14.0,
            stalk_speed: 1.35,
            steering_rate: 0.6,
            orbit_radius: 4.0,
            orbit_rate: 0.25,
            glow_rate: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentPhase {
    Dormant,
    Active,
    Warping,
    Caught,
}

/// Markers produced by one agent update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AgentEvent {
    Activated,
    Warped { position: Vec3 },
    /// A catch was turned into a forced warp.
    Reprieved,
    Caught,
}

/// Why a warp was attempted. Only chance warps count against the cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WarpCause {
    TooFar,
    Chance,
    Reprieve,
}

#[derive(Debug, Clone)]
pub struct StalkerAgent {
    config: StalkerConfig,
    rng: RandomStream,
    phase: AgentPhase,
    position: Vec3,
    steer_target: Vec3,
    anger: f32,
    danger: f32,
    warp_cooldown: f32,
    triggers: u32,
    chance_warps: u32,
    visible: bool,
    glow: f32,
    elapsed: f32,
    announce: bool,
}

impl StalkerAgent {
    /// Dormant agent at the far sentinel, drawing from the run's agent stream.
    pub fn new(config: StalkerConfig, seed: Seed) -> Self {
        Self {
            config,
            rng: RandomStream::derive(seed, AGENT_STREAM),
            phase: AgentPhase::Dormant,
            position: FAR_SENTINEL,
            steer_target: FAR_SENTINEL,
            anger: 0.0,
            danger: 0.0,
            warp_cooldown: 0.0,
            triggers: 0,
            chance_warps: 0,
            visible: false,
            glow: 0.0,
            elapsed: 0.0,
            announce: false,
        }
    }

    pub fn config(&self) -> &StalkerConfig {
        &self.config
    }

    pub fn phase(&self) -> AgentPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, AgentPhase::Active | AgentPhase::Warping)
    }

    pub fn is_caught(&self) -> bool {
        self.phase == AgentPhase::Caught
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn anger(&self) -> f32 {
        self.anger
    }

    pub fn danger(&self) -> f32 {
        self.danger
    }

    pub fn warp_cooldown(&self) -> f32 {
        self.warp_cooldown
    }

    pub fn triggers(&self) -> u32 {
        self.triggers
    }

    pub fn chance_warps(&self) -> u32 {
        self.chance_warps
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Light intensity for the render collaborator.
    pub fn light_intensity(&self) -> f32 {
        0.35 + 0.9 * self.glow
    }

    /// Wake the agent without raising anger. Returns whether it was dormant.
    pub fn activate(&mut self) -> bool {
        if self.phase != AgentPhase::Dormant {
            return false;
        }
        self.phase = AgentPhase::Active;
        self.announce = true;
        tracing::debug!(triggers = self.triggers, "stalker activated");
        true
    }

    /// An external triggering event, such as a collected clue.
    pub fn trigger(&mut self) {
        if self.is_caught() {
            return;
        }
        self.triggers += 1;
        self.anger = (self.anger + self.config.anger_increment).clamp(0.0, 1.0);
        tracing::debug!(triggers = self.triggers, anger = self.anger, "stalker triggered");
        self.activate();
    }

    /// Cooldown after a warp, shortened by the triggers seen so far.
    pub fn warp_interval(&self) -> f32 {
        let c = &self.config;
        (c.warp_interval - c.warp_interval_step * self.triggers as f32).max(c.warp_interval_min)
    }

    /// Advance one tick. `player` is `None` when there is no player to track,
    /// which makes the tick a no-op, as does a non-finite position.
    pub fn update(
        &mut self,
        dt: f32,
        player: Option<Vec3>,
        index: &CollisionIndex<'_>,
    ) -> Vec<AgentEvent> {
        let mut events = Vec::new();
        let Some(player) = player.filter(|p| p.is_finite()) else {
            return events;
        };
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        let c = &self.config;
        self.anger = (self.anger - c.anger_decay_rate * dt).clamp(0.0, 1.0);

        match self.phase {
            AgentPhase::Caught => return events,
            AgentPhase::Dormant => {
                self.danger = (self.danger * (-c.dormant_decay * dt).exp()).clamp(0.0, 1.0);
                self.visible = false;
                self.ease_glow(dt);
                return events;
            }
            AgentPhase::Warping => self.phase = AgentPhase::Active,
            AgentPhase::Active => {}
        }

        if self.announce {
            self.announce = false;
            events.push(AgentEvent::Activated);
        }
        self.elapsed += dt;

        let mut distance = planar_distance(self.position, player);
        self.warp_cooldown -= dt;

        let cause = if self.warp_cooldown > 0.0 {
            None
        } else if distance > self.config.far_threshold {
            Some(WarpCause::TooFar)
        } else if self.may_chance_warp()
            && self.rng.next() < self.config.base_warp_chance * self.anger
        {
            Some(WarpCause::Chance)
        } else {
            None
        };

        match cause {
            Some(cause) => {
                if let Some(position) = self.warp(player, index, cause) {
                    events.push(AgentEvent::Warped { position });
                }
            }
            None => self.stalk(dt, player, index),
        }
        distance = planar_distance(self.position, player);

        if distance < self.config.catch_threshold {
            if self.rng.next() < self.config.catch_reprieve_chance {
                events.push(AgentEvent::Reprieved);
                if let Some(position) = self.warp(player, index, WarpCause::Reprieve) {
                    events.push(AgentEvent::Warped { position });
                }
                distance = planar_distance(self.position, player);
            }
        }

        if distance < self.config.catch_threshold {
            self.phase = AgentPhase::Caught;
            self.danger = 1.0;
            self.visible = true;
            tracing::debug!(distance, "player caught");
            events.push(AgentEvent::Caught);
            return events;
        }

        let c = &self.config;
        let target = (1.0 - distance / c.reference_range).clamp(0.0, 1.0);
        self.danger = (self.danger + (target - self.danger) * dt * c.smoothing_rate).clamp(0.0, 1.0);

        let near = 1.0 - distance / c.visibility_range > c.glimpse_threshold;
        let glimpse_chance = c.glimpse_chance;
        self.visible = near || self.rng.next() < glimpse_chance;
        self.ease_glow(dt);

        events
    }

    fn may_chance_warp(&self) -> bool {
        self.config
            .max_chance_warps
            .is_none_or(|cap| self.chance_warps < cap)
    }

    fn ease_glow(&mut self, dt: f32) {
        let goal = 0.35 + 0.65 * self.danger;
        let k = 1.0 - (-dt * self.config.glow_rate).exp();
        self.glow += (goal - self.glow) * k;
    }

    /// Reposition around the player. Returns the new position, or `None` if
    /// every sample landed overlapping a solid and the agent stayed put.
    fn warp(&mut self, player: Vec3, index: &CollisionIndex<'_>, cause: WarpCause) -> Option<Vec3> {
        self.warp_cooldown = self.warp_interval();
        if cause == WarpCause::Chance {
            self.chance_warps += 1;
        }

        let c = &self.config;
        let r = c.agent_radius;
        for attempt in 0..c.warp_attempts.max(1) {
            let angle = self.rng.angle();
            let radius = self.rng.range(c.warp_radius_min, c.warp_radius_max);
            let candidate = Vec3::new(
                player.x + angle.cos() * radius,
                0.0,
                player.z + angle.sin() * radius,
            );
            let resolved = index.resolve(index.confine(candidate), r);
            if index.is_clear(resolved, r) {
                self.position = resolved;
                self.steer_target = resolved;
                self.phase = AgentPhase::Warping;
                tracing::debug!(?cause, attempt, x = resolved.x, z = resolved.z, "stalker warped");
                return Some(resolved);
            }
        }
        tracing::debug!(?cause, "no clear warp sample, holding position");
        None
    }

    /// Drift toward the far side of the player with a slow orbit.
    fn stalk(&mut self, dt: f32, player: Vec3, index: &CollisionIndex<'_>) {
        let c = &self.config;
        let to_agent = Vec3::new(self.position.x - player.x, 0.0, self.position.z - player.z);
        let dir = to_agent.normalize_or_zero();

        let base = Vec3::new(player.x, 0.0, player.z) - dir * c.distance_band;
        let mut desired = index.confine(base);
        let side = Vec3::new(-dir.z, 0.0, dir.x);
        desired += side * (self.elapsed * c.orbit_rate).sin() * c.orbit_radius;

        self.steer_target = self
            .steer_target
            .lerp(desired, (dt * c.steering_rate).clamp(0.0, 1.0));
        let step = Vec3::new(
            self.steer_target.x - self.position.x,
            0.0,
            self.steer_target.z - self.position.z,
        );
        if step.length() > 1e-3 {
            let moved = self.position + step.normalize() * c.stalk_speed * dt;
            self.position = index.resolve(index.confine(moved), c.agent_radius);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ashfield_kernel::{Solid, WorldLayout};
    use proptest::prelude::*;

    const NO_SOLIDS: [Solid; 0] = [];

    fn open_field() -> CollisionIndex<'static> {
        CollisionIndex::new(&NO_SOLIDS)
    }

    fn calm() -> StalkerConfig {
        StalkerConfig {
            base_warp_chance: 0.0,
            glimpse_chance: 0.0,
            ..StalkerConfig::default()
        }
    }

    #[test]
    fn starts_dormant_at_the_sentinel() {
        let agent = StalkerAgent::new(StalkerConfig::default(), 1);
        assert_eq!(agent.phase(), AgentPhase::Dormant);
        assert_eq!(agent.position(), FAR_SENTINEL);
        assert_eq!(agent.anger(), 0.0);
        assert_eq!(agent.danger(), 0.0);
    }

    #[test]
    fn dormant_danger_decays_strictly() {
        let mut agent = StalkerAgent::new(StalkerConfig::default(), 7);
        agent.danger = 0.4;
        let index = open_field();
        let mut prev = agent.danger();
        for _ in 0..625 {
            let events = agent.update(0.016, Some(Vec3::ZERO), &index);
            assert!(events.is_empty());
            assert!(agent.danger() < prev, "{} !< {}", agent.danger(), prev);
            prev = agent.danger();
        }
        assert_eq!(agent.phase(), AgentPhase::Dormant);
        assert_eq!(agent.position(), FAR_SENTINEL);
    }

    #[test]
    fn three_triggers_raise_anger_monotonically() {
        let mut agent = StalkerAgent::new(StalkerConfig::default(), 3);
        let mut prev = agent.anger();
        for i in 0..3 {
            agent.trigger();
            assert!(agent.anger() >= prev);
            prev = agent.anger();
            if i == 0 {
                assert!(agent.is_active());
            }
        }
        assert!((agent.anger() - 0.9).abs() < 1e-5);
        agent.trigger();
        assert_eq!(agent.anger(), 1.0);
    }

    #[test]
    fn warp_interval_shortens_with_triggers() {
        let mut agent = StalkerAgent::new(StalkerConfig::default(), 3);
        assert_eq!(agent.warp_interval(), 7.0);
        agent.trigger();
        agent.trigger();
        assert_eq!(agent.warp_interval(), 5.0);
        for _ in 0..10 {
            agent.trigger();
        }
        assert_eq!(agent.warp_interval(), 3.0);
    }

    #[test]
    fn first_active_tick_warps_into_the_band() {
        let mut agent = StalkerAgent::new(calm(), 11);
        agent.activate();
        let player = Vec3::new(4.0, 1.7, -3.0);
        let events = agent.update(0.016, Some(player), &open_field());
        assert_eq!(events[0], AgentEvent::Activated);
        assert!(matches!(events[1], AgentEvent::Warped { .. }));
        assert_eq!(agent.phase(), AgentPhase::Warping);
        let d = planar_distance(agent.position(), player);
        assert!((20.0..=30.0).contains(&d), "warped to distance {d}");
        assert_eq!(agent.warp_cooldown(), 7.0);

        agent.update(0.016, Some(player), &open_field());
        assert_eq!(agent.phase(), AgentPhase::Active);
    }

    #[test]
    fn missing_player_is_a_no_op() {
        let mut agent = StalkerAgent::new(StalkerConfig::default(), 5);
        agent.activate();
        let index = open_field();
        assert!(agent.update(0.016, None, &index).is_empty());
        assert!(agent.update(0.016, Some(Vec3::NAN), &index).is_empty());
        assert_eq!(agent.position(), FAR_SENTINEL);
        assert_eq!(agent.warp_cooldown(), 0.0);
    }

    #[test]
    fn close_agent_catches_without_reprieve() {
        let mut agent = StalkerAgent::new(
            StalkerConfig {
                catch_reprieve_chance: 0.0,
                ..calm()
            },
            9,
        );
        agent.activate();
        agent.warp_cooldown = 5.0;
        agent.position = Vec3::new(1.0, 0.0, 0.0);
        agent.steer_target = agent.position;
        let events = agent.update(0.016, Some(Vec3::ZERO), &open_field());
        assert!(events.contains(&AgentEvent::Caught));
        assert!(agent.is_caught());
        assert_eq!(agent.danger(), 1.0);

        assert!(agent.update(0.016, Some(Vec3::ZERO), &open_field()).is_empty());
        agent.trigger();
        assert_eq!(agent.phase(), AgentPhase::Caught);
    }

    #[test]
    fn certain_reprieve_warps_instead_of_catching() {
        let mut agent = StalkerAgent::new(
            StalkerConfig {
                catch_reprieve_chance: 1.0,
                ..calm()
            },
            9,
        );
        agent.activate();
        agent.warp_cooldown = 5.0;
        agent.position = Vec3::new(1.0, 0.0, 0.0);
        agent.steer_target = agent.position;
        let events = agent.update(0.016, Some(Vec3::ZERO), &open_field());
        assert!(events.contains(&AgentEvent::Reprieved));
        assert!(!agent.is_caught());
        assert!(planar_distance(agent.position(), Vec3::ZERO) >= 20.0 - 1e-3);
    }

    #[test]
    fn stalking_moves_at_walking_pace() {
        let mut agent = StalkerAgent::new(calm(), 2);
        agent.activate();
        agent.warp_cooldown = 100.0;
        agent.position = Vec3::new(20.0, 0.0, 0.0);
        agent.steer_target = agent.position;
        let before = agent.position();
        agent.update(0.05, Some(Vec3::ZERO), &open_field());
        let moved = planar_distance(before, agent.position());
        assert!(moved > 0.0 && moved <= 1.35 * 0.05 + 1e-4);
    }

    #[test]
    fn chance_warps_respect_the_cap() {
        let eager = StalkerConfig {
            base_warp_chance: 1.0,
            catch_threshold: 0.0,
            warp_interval: 0.0,
            warp_interval_min: 0.0,
            ..StalkerConfig::default()
        };
        let index = open_field();

        let mut capped = StalkerAgent::new(
            StalkerConfig {
                max_chance_warps: Some(2),
                ..eager.clone()
            },
            4,
        );
        let mut free = StalkerAgent::new(eager, 4);
        for agent in [&mut capped, &mut free] {
            agent.trigger();
            agent.trigger();
            agent.trigger();
            for _ in 0..200 {
                agent.update(0.016, Some(Vec3::ZERO), &index);
            }
        }
        assert_eq!(capped.chance_warps(), 2);
        assert!(free.chance_warps() > 2);
    }

    #[test]
    fn anger_decay_is_opt_in() {
        let index = open_field();
        let mut keeps = StalkerAgent::new(calm(), 1);
        let mut fades = StalkerAgent::new(
            StalkerConfig {
                anger_decay_rate: 0.1,
                ..calm()
            },
            1,
        );
        for agent in [&mut keeps, &mut fades] {
            agent.trigger();
            for _ in 0..100 {
                agent.update(0.05, Some(Vec3::ZERO), &index);
            }
        }
        assert!((keeps.anger() - 0.3).abs() < 1e-6);
        assert!(fades.anger() < 0.3);
    }

    #[test]
    fn streams_are_reproducible() {
        let layout = WorldLayout::generate(77, "text");
        let index = CollisionIndex::for_layout(&layout);
        let run = || {
            let mut agent = StalkerAgent::new(StalkerConfig::default(), 77);
            agent.trigger();
            let mut trace = Vec::new();
            for i in 0..300 {
                let player = Vec3::new((i as f32 * 0.01).sin() * 5.0, 1.7, 6.0);
                trace.extend(agent.update(0.016, Some(player), &index));
            }
            (trace, agent.position(), agent.danger())
        };
        assert_eq!(run(), run());
    }

    proptest! {
        #[test]
        fn danger_and_anger_stay_in_unit_range(
            seed in any::<u32>(),
            steps in proptest::collection::vec(
                (0.0f32..0.2, -60.0f32..60.0, -60.0f32..60.0, any::<bool>()),
                1..120,
            ),
        ) {
            let index = open_field();
            let mut agent = StalkerAgent::new(StalkerConfig::default(), seed);
            for (dt, x, z, trigger) in steps {
                if trigger {
                    agent.trigger();
                }
                agent.update(dt, Some(Vec3::new(x, 1.7, z)), &index);
                prop_assert!((0.0..=1.0).contains(&agent.danger()));
                prop_assert!((0.0..=1.0).contains(&agent.anger()));
            }
        }

        #[test]
        fn warps_land_on_resolved_points(seed in any::<u32>(), px in -40.0f32..40.0, pz in -40.0f32..40.0) {
            let layout = WorldLayout::generate(seed, "text");
            let index = CollisionIndex::for_layout(&layout);
            let radius = StalkerConfig::default().agent_radius;
            let mut agent = StalkerAgent::new(StalkerConfig::default(), seed);
            agent.trigger();
            for _ in 0..60 {
                for event in agent.update(0.05, Some(Vec3::new(px, 1.7, pz)), &index) {
                    if let AgentEvent::Warped { position } = event {
                        prop_assert_eq!(index.resolve(position, radius), position);
                    }
                }
            }
        }
    }
}
