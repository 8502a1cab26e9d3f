use ashfield_common::{Seed, planar_distance};
use ashfield_kernel::{AnchorKind, CollisionIndex, WorldLayout};
use ashfield_sim::{AgentPhase, StalkerAgent};
use glam::Vec3;
use serde::Serialize;
use std::fmt;

/// Read-only queries against a generated layout.
pub struct LayoutInspector;

impl LayoutInspector {
    pub fn summary(layout: &WorldLayout) -> LayoutSummary {
        let anchors_of = |kind| layout.anchors_of(kind).count();
        let spawn = layout.spawn_point();
        let zone = layout.deep_zone();
        LayoutSummary {
            seed: layout.seed(),
            roads: layout.roads().len(),
            buildings: layout.buildings().len(),
            trees: layout.forest().len(),
            trunk_colliders: layout.forest().iter().filter(|t| t.has_collider).count(),
            lamps: layout.lamps().len(),
            solids: layout.solids().len(),
            clues: anchors_of(AnchorKind::Clue),
            anchors: layout.anchors().len(),
            spawn: spawn.position,
            deep_zone_center: zone.center,
            deep_zone_radius: zone.radius,
            bounds_radius: layout.bounds_radius(),
        }
    }

    /// Check that spawn and goal are usable by a circle of `radius`.
    ///
    /// The layout generator makes no such guarantee; every issue found is
    /// logged as a warning and returned.
    pub fn clearance_report(layout: &WorldLayout, radius: f32) -> ClearanceReport {
        let index = CollisionIndex::for_layout(layout);
        let mut issues = Vec::new();

        let spawn = layout.spawn_point().position;
        let blocking = index.overlapping(spawn, radius);
        if !blocking.is_empty() {
            issues.push(ClearanceIssue::SpawnBlocked { solids: blocking });
        }
        let zone = layout.deep_zone();
        if zone.contains(spawn) {
            issues.push(ClearanceIssue::SpawnInDeepZone {
                distance: planar_distance(spawn, zone.center),
            });
        }
        for (i, anchor) in layout.anchors().iter().enumerate() {
            // The beacon is a house; only what stands beside it must be reachable.
            if anchor.kind == AnchorKind::Beacon {
                continue;
            }
            let blocking = index.overlapping(anchor.position, radius);
            if !blocking.is_empty() {
                issues.push(ClearanceIssue::AnchorBlocked {
                    anchor: i,
                    kind: anchor.kind,
                    solids: blocking,
                });
            }
        }
        if planar_distance(zone.center, Vec3::ZERO) + zone.radius > layout.bounds_radius() {
            issues.push(ClearanceIssue::DeepZoneOutOfBounds);
        }

        for issue in &issues {
            tracing::warn!(seed = layout.seed(), %issue, "clearance issue");
        }
        ClearanceReport {
            seed: layout.seed(),
            radius,
            issues,
        }
    }
}

/// Counts and key positions of a layout.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutSummary {
    pub seed: Seed,
    pub roads: usize,
    pub buildings: usize,
    pub trees: usize,
    pub trunk_colliders: usize,
    pub lamps: usize,
    pub solids: usize,
    pub clues: usize,
    pub anchors: usize,
    pub spawn: Vec3,
    pub deep_zone_center: Vec3,
    pub deep_zone_radius: f32,
    pub bounds_radius: f32,
}

impl fmt::Display for LayoutSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Layout: seed={} roads={} buildings={} trees={} (colliders {}) lamps={} solids={}",
            self.seed,
            self.roads,
            self.buildings,
            self.trees,
            self.trunk_colliders,
            self.lamps,
            self.solids
        )?;
        writeln!(f, "Anchors: {} ({} clues)", self.anchors, self.clues)?;
        write!(
            f,
            "Spawn: ({:.2}, {:.2})  Deep zone: ({:.2}, {:.2}) r={:.1}  Bounds: r={:.1}",
            self.spawn.x,
            self.spawn.z,
            self.deep_zone_center.x,
            self.deep_zone_center.z,
            self.deep_zone_radius,
            self.bounds_radius
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "issue", rename_all = "snake_case")]
pub enum ClearanceIssue {
    SpawnBlocked { solids: Vec<usize> },
    SpawnInDeepZone { distance: f32 },
    AnchorBlocked { anchor: usize, kind: AnchorKind, solids: Vec<usize> },
    DeepZoneOutOfBounds,
}

impl fmt::Display for ClearanceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpawnBlocked { solids } => write!(f, "spawn overlaps solids {solids:?}"),
            Self::SpawnInDeepZone { distance } => {
                write!(f, "spawn lies inside the deep zone ({distance:.2} from center)")
            }
            Self::AnchorBlocked { anchor, kind, solids } => {
                write!(f, "{kind:?} anchor {anchor} overlaps solids {solids:?}")
            }
            Self::DeepZoneOutOfBounds => write!(f, "deep zone reaches past the town boundary"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClearanceReport {
    pub seed: Seed,
    pub radius: f32,
    pub issues: Vec<ClearanceIssue>,
}

impl ClearanceReport {
    pub fn is_clear(&self) -> bool {
        self.issues.is_empty()
    }
}

impl fmt::Display for ClearanceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return write!(f, "Clearance (r={:.2}): ok", self.radius);
        }
        write!(f, "Clearance (r={:.2}): {} issue(s)", self.radius, self.issues.len())?;
        for issue in &self.issues {
            write!(f, "\n  - {issue}")?;
        }
        Ok(())
    }
}

/// Snapshot of the agent's state machine.
#[derive(Debug, Clone, Serialize)]
pub struct AgentInfo {
    pub phase: AgentPhase,
    pub position: Vec3,
    pub anger: f32,
    pub danger: f32,
    pub warp_cooldown: f32,
    pub triggers: u32,
    pub chance_warps: u32,
    pub visible: bool,
}

impl AgentInfo {
    pub fn of(agent: &StalkerAgent) -> Self {
        Self {
            phase: agent.phase(),
            position: agent.position(),
            anger: agent.anger(),
            danger: agent.danger(),
            warp_cooldown: agent.warp_cooldown(),
            triggers: agent.triggers(),
            chance_warps: agent.chance_warps(),
            visible: agent.is_visible(),
        }
    }
}

impl fmt::Display for AgentInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Agent: {:?} pos=({:.2}, {:.2}) anger={:.2} danger={:.3} cooldown={:.2} triggers={} chance_warps={}",
            self.phase,
            self.position.x,
            self.position.z,
            self.anger,
            self.danger,
            self.warp_cooldown,
            self.triggers,
            self.chance_warps
        )
    }
}
