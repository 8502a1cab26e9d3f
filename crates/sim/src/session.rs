use ashfield_common::{Pose, RenderHandle, Seed, planar_distance, seed_from_str};
use ashfield_input::{Action, Locomotion, MoveIntent};
use ashfield_kernel::{
    AnchorKind, CollisionIndex, EntityRegistry, LayoutBuilder, LogicalEntity, WorldLayout,
};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Instant;

use crate::clock::{StepProfile, StepSection};
use crate::config::GameConfig;
use crate::nav::NavigationController;
use crate::stalker::{AgentEvent, AgentPhase, StalkerAgent};
use crate::tension::TensionAggregator;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Planar reach for clues, signs, terminals and doors.
    pub interact_range: f32,
    /// Reach for the beacon, measured from the house center.
    pub beacon_range: f32,
    /// Seconds before the agent first appears on its own. `None` waits for a trigger.
    pub appearance_delay: Option<f32>,
    /// Relaxation passes of the collision resolver.
    pub collision_passes: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            interact_range: 2.5,
            beacon_range: 8.0,
            appearance_delay: Some(12.0),
            collision_passes: 4,
        }
    }
}

/// What the input collaborator supplies each frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameInput {
    pub intent: MoveIntent,
    /// Facing yaw; 0 looks down -Z.
    pub yaw: f32,
    pub actions: Vec<Action>,
}

impl FrameInput {
    pub fn walking(intent: MoveIntent, yaw: f32) -> Self {
        Self {
            intent,
            yaw,
            actions: Vec::new(),
        }
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Running,
    /// The player reached the beacon or its deep zone.
    Escaped,
    Caught,
}

/// Discrete markers for presentation collaborators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A clue was collected for the first time.
    TriggerFired { anchor: usize, collected: usize },
    AnchorRead { anchor: usize, kind: AnchorKind },
    AgentAppeared,
    Warped { position: Vec3 },
    Caught,
    GoalReached,
}

/// Result of one [`Session::step`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    pub elapsed: f32,
    pub dt: f32,
    pub player: Pose,
    pub agent_position: Vec3,
    pub agent_phase: AgentPhase,
    pub agent_visible: bool,
    pub danger: f32,
    pub tension: f32,
    pub events: Vec<SessionEvent>,
    pub outcome: Outcome,
}

/// One run: the layout, the player, the agent and everything that reads them.
///
/// `step` is the whole per-frame loop body. Nothing inside it suspends or fails.
#[derive(Debug)]
pub struct Session {
    config: GameConfig,
    theme_name: String,
    layout: WorldLayout,
    registry: EntityRegistry,
    nav: NavigationController,
    locomotion: Locomotion,
    agent: StalkerAgent,
    tension: TensionAggregator,
    yaw: f32,
    collected: BTreeSet<usize>,
    appearance_timer: Option<f32>,
    tick: u64,
    elapsed: f32,
    outcome: Outcome,
    last: TickReport,
    profile: StepProfile,
}

impl Session {
    /// Seed from `theme_name`, build the layout from `theme_text`.
    pub fn new(theme_name: &str, theme_text: &str, config: GameConfig) -> Self {
        Self::with_seed(seed_from_str(theme_name), theme_name, theme_text, config)
    }

    pub fn with_seed(seed: Seed, theme_name: &str, theme_text: &str, config: GameConfig) -> Self {
        let _span = tracing::info_span!("session_new", seed, theme = theme_name).entered();
        let layout = LayoutBuilder::new(config.layout.clone())
            .with_theme_name(theme_name)
            .build(seed, theme_text);
        let registry = EntityRegistry::from_layout(&layout);
        let spawn = layout.spawn_point();
        let nav = NavigationController::new(config.nav.clone(), spawn.position);
        let agent = StalkerAgent::new(config.stalker.clone(), seed);
        let player = Pose::new(nav.position(), spawn.yaw);

        let last = TickReport {
            tick: 0,
            elapsed: 0.0,
            dt: 0.0,
            player,
            agent_position: agent.position(),
            agent_phase: agent.phase(),
            agent_visible: false,
            danger: 0.0,
            tension: 0.0,
            events: Vec::new(),
            outcome: Outcome::Running,
        };
        tracing::info!(
            solids = layout.solids().len(),
            anchors = layout.anchors().len(),
            "session ready"
        );

        Self {
            locomotion: Locomotion::new(config.locomotion.clone()),
            tension: TensionAggregator::new(config.tension.clone()),
            appearance_timer: config.session.appearance_delay,
            theme_name: theme_name.to_string(),
            yaw: spawn.yaw,
            collected: BTreeSet::new(),
            tick: 0,
            elapsed: 0.0,
            outcome: Outcome::Running,
            config,
            layout,
            registry,
            nav,
            agent,
            last,
            profile: StepProfile::default(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn theme_name(&self) -> &str {
        &self.theme_name
    }

    pub fn seed(&self) -> Seed {
        self.layout.seed()
    }

    pub fn layout(&self) -> &WorldLayout {
        &self.layout
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn collision(&self) -> CollisionIndex<'_> {
        collision_index(&self.layout, &self.config)
    }

    pub fn player(&self) -> Pose {
        Pose::new(self.nav.position(), self.yaw)
    }

    pub fn player_radius(&self) -> f32 {
        self.nav.radius()
    }

    pub fn breath(&self) -> f32 {
        self.locomotion.breath()
    }

    pub fn agent(&self) -> &StalkerAgent {
        &self.agent
    }

    pub fn tension(&self) -> f32 {
        self.tension.value()
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        self.outcome != Outcome::Running
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn is_collected(&self, anchor: usize) -> bool {
        self.collected.contains(&anchor)
    }

    pub fn collected(&self) -> usize {
        self.collected.len()
    }

    pub fn clues_remaining(&self) -> usize {
        self.layout
            .anchors_of(AnchorKind::Clue)
            .count()
            .saturating_sub(self.collected.len())
    }

    /// The report of the most recent step.
    pub fn last_report(&self) -> &TickReport {
        &self.last
    }

    /// Wall time per step section over the recent window.
    pub fn profile(&self) -> &StepProfile {
        &self.profile
    }

    /// Advance one frame.
    pub fn step(&mut self, dt: f32, input: &FrameInput) -> TickReport {
        if self.is_over() {
            let mut frozen = self.last.clone();
            frozen.dt = 0.0;
            frozen.events.clear();
            return frozen;
        }
        let dt = self.config.clock.clamp_step(dt);
        self.tick += 1;
        self.elapsed += dt;
        let _span = tracing::trace_span!("session_step", tick = self.tick).entered();
        let lap = Instant::now();

        let mut events = Vec::new();

        if input.yaw.is_finite() {
            self.yaw = input.yaw;
        }
        let displacement = self.locomotion.update(dt, input.intent, self.yaw);
        let player = self
            .nav
            .step(displacement, &collision_index(&self.layout, &self.config));
        let lap = self.lap(StepSection::Movement, lap);

        for action in &input.actions {
            let target = match *action {
                Action::Interact => self.nearest_in_reach(player),
                Action::InteractWith(handle) => self.in_reach(handle, player),
                Action::Noop => None,
            };
            if let Some(entity) = target {
                self.interact(entity, &mut events);
            }
            if self.is_over() {
                break;
            }
        }

        if !self.is_over() && self.layout.deep_zone().contains(player) {
            self.escape(&mut events);
        }
        let lap = self.lap(StepSection::Interaction, lap);

        if !self.is_over() {
            if self.agent.phase() == AgentPhase::Dormant {
                if let Some(t) = self.appearance_timer.as_mut() {
                    *t -= dt;
                    if *t <= 0.0 {
                        self.appearance_timer = None;
                        self.agent.activate();
                    }
                }
            } else {
                self.appearance_timer = None;
            }

            let index = collision_index(&self.layout, &self.config);
            for event in self.agent.update(dt, Some(player), &index) {
                match event {
                    AgentEvent::Activated => events.push(SessionEvent::AgentAppeared),
                    AgentEvent::Warped { position } => events.push(SessionEvent::Warped { position }),
                    AgentEvent::Reprieved => {}
                    AgentEvent::Caught => events.push(SessionEvent::Caught),
                }
            }
        }

        self.tension.update(dt, self.agent.danger());
        self.lap(StepSection::Agent, lap);

        if self.outcome == Outcome::Running && self.agent.is_caught() {
            self.outcome = Outcome::Caught;
            tracing::info!(elapsed = self.elapsed, collected = self.collected.len(), "run ended: caught");
        }

        let report = TickReport {
            tick: self.tick,
            elapsed: self.elapsed,
            dt,
            player: self.player(),
            agent_position: self.agent.position(),
            agent_phase: self.agent.phase(),
            agent_visible: self.agent.is_visible(),
            danger: self.agent.danger(),
            tension: self.tension.value(),
            events,
            outcome: self.outcome,
        };
        self.last = report.clone();
        report
    }

    fn reach(&self, kind: AnchorKind) -> f32 {
        match kind {
            AnchorKind::Beacon => self.config.session.beacon_range,
            _ => self.config.session.interact_range,
        }
    }

    fn usable(&self, entity: LogicalEntity, player: Vec3) -> bool {
        let Some(anchor) = self.layout.anchor(entity.anchor()) else {
            return false;
        };
        if matches!(entity, LogicalEntity::Clue { .. }) && self.is_collected(entity.anchor()) {
            return false;
        }
        planar_distance(anchor.position, player) <= self.reach(anchor.kind)
    }

    fn nearest_in_reach(&self, player: Vec3) -> Option<LogicalEntity> {
        self.registry
            .iter()
            .map(|(_, e)| e)
            .filter(|e| self.usable(*e, player))
            .min_by(|a, b| {
                let da = self.anchor_distance(*a, player);
                let db = self.anchor_distance(*b, player);
                da.total_cmp(&db)
            })
    }

    fn in_reach(&self, handle: RenderHandle, player: Vec3) -> Option<LogicalEntity> {
        let entity = self.registry.entity(handle);
        if entity.is_none() {
            tracing::debug!(?handle, "interaction with unknown handle");
        }
        entity.filter(|e| self.usable(*e, player))
    }

    fn anchor_distance(&self, entity: LogicalEntity, player: Vec3) -> f32 {
        self.layout
            .anchor(entity.anchor())
            .map_or(f32::INFINITY, |a| planar_distance(a.position, player))
    }

    fn interact(&mut self, entity: LogicalEntity, events: &mut Vec<SessionEvent>) {
        match entity {
            LogicalEntity::Clue { anchor } => {
                if self.collected.insert(anchor) {
                    self.agent.trigger();
                    let collected = self.collected.len();
                    tracing::debug!(anchor, collected, "clue collected");
                    events.push(SessionEvent::TriggerFired { anchor, collected });
                }
            }
            LogicalEntity::Sign { anchor }
            | LogicalEntity::Terminal { anchor }
            | LogicalEntity::Door { anchor } => {
                events.push(SessionEvent::AnchorRead {
                    anchor,
                    kind: entity.kind(),
                });
            }
            LogicalEntity::Beacon { .. } => self.escape(events),
        }
    }

    fn lap(&mut self, section: StepSection, since: Instant) -> Instant {
        let now = Instant::now();
        self.profile.record(section, now.saturating_duration_since(since));
        now
    }

    fn escape(&mut self, events: &mut Vec<SessionEvent>) {
        self.outcome = Outcome::Escaped;
        events.push(SessionEvent::GoalReached);
        tracing::info!(elapsed = self.elapsed, collected = self.collected.len(), "run ended: escaped");
    }
}

fn collision_index<'a>(layout: &'a WorldLayout, config: &GameConfig) -> CollisionIndex<'a> {
    CollisionIndex::for_layout(layout).with_max_passes(config.session.collision_passes)
}
