use ashfield_common::{Pose, RenderHandle};
use ashfield_kernel::{AnchorKind, Solid};
use ashfield_sim::{AgentPhase, Outcome, Session, SessionEvent};
use glam::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum SolidShape {
    Box { half_extents: Vec3 },
    Cylinder { radius: f32, height: f32 },
}

/// Transform and dimensions of one static solid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolidDescriptor {
    pub position: Vec3,
    pub yaw: f32,
    #[serde(flatten)]
    pub shape: SolidShape,
}

impl From<&Solid> for SolidDescriptor {
    fn from(solid: &Solid) -> Self {
        let shape = match *solid {
            Solid::Box { half_extents, .. } => SolidShape::Box { half_extents },
            Solid::Cylinder { radius, height, .. } => SolidShape::Cylinder { radius, height },
        };
        Self {
            position: solid.center(),
            yaw: solid.yaw(),
            shape,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnchorDescriptor {
    pub handle: RenderHandle,
    pub kind: AnchorKind,
    pub position: Vec3,
    pub payload: String,
    /// Only clues are ever collected.
    pub collected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentView {
    pub position: Vec3,
    pub phase: AgentPhase,
    pub visible: bool,
    pub light_intensity: f32,
}

/// Everything a render collaborator draws for one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameView {
    pub tick: u64,
    pub player: Pose,
    pub solids: Vec<SolidDescriptor>,
    pub anchors: Vec<AnchorDescriptor>,
    pub agent: AgentView,
    pub tension: f32,
    pub events: Vec<SessionEvent>,
    pub outcome: Outcome,
}

impl FrameView {
    /// Snapshot the session after its latest step.
    pub fn capture(session: &Session) -> Self {
        let layout = session.layout();
        let registry = session.registry();
        let anchors = layout
            .anchors()
            .iter()
            .enumerate()
            .filter_map(|(i, anchor)| {
                let handle = registry.handle_for_anchor(i)?;
                Some(AnchorDescriptor {
                    handle,
                    kind: anchor.kind,
                    position: anchor.position,
                    payload: anchor.payload.clone(),
                    collected: session.is_collected(i),
                })
            })
            .collect();

        let agent = session.agent();
        let report = session.last_report();
        Self {
            tick: report.tick,
            player: session.player(),
            solids: layout.solids().iter().map(SolidDescriptor::from).collect(),
            anchors,
            agent: AgentView {
                position: agent.position(),
                phase: agent.phase(),
                visible: agent.is_visible(),
                light_intensity: agent.light_intensity(),
            },
            tension: session.tension(),
            events: report.events.clone(),
            outcome: session.outcome(),
        }
    }

    pub fn box_count(&self) -> usize {
        self.solids
            .iter()
            .filter(|s| matches!(s.shape, SolidShape::Box { .. }))
            .count()
    }

    pub fn cylinder_count(&self) -> usize {
        self.solids.len() - self.box_count()
    }

    pub fn anchor(&self, handle: RenderHandle) -> Option<&AnchorDescriptor> {
        self.anchors.iter().find(|a| a.handle == handle)
    }
}
