use ashfield_common::planar_distance;
use ashfield_input::{Action, MoveIntent};
use ashfield_kernel::AnchorKind;
use ashfield_sim::{FrameInput, Session};
use glam::Vec3;

/// Seconds without progress before sidestepping.
const STUCK_AFTER: f32 = 1.5;
const SIDESTEP_FOR: f32 = 0.8;
/// Seconds before giving up on a target.
const GIVE_UP_AFTER: f32 = 25.0;

/// Headless player: walks to every clue, then to the beacon door.
#[derive(Debug)]
pub struct Autopilot {
    targets: Vec<usize>,
    current: usize,
    best_distance: f32,
    since_progress: f32,
    on_target: f32,
    sidestep: f32,
    sidestep_dir: f32,
}

impl Autopilot {
    pub fn new(session: &Session) -> Self {
        let layout = session.layout();
        let mut targets: Vec<usize> = layout.anchors_of(AnchorKind::Clue).map(|(i, _)| i).collect();
        targets.extend(layout.anchors_of(AnchorKind::Door).map(|(i, _)| i));
        Self {
            targets,
            current: 0,
            best_distance: f32::INFINITY,
            since_progress: 0.0,
            on_target: 0.0,
            sidestep: 0.0,
            sidestep_dir: 1.0,
        }
    }

    pub fn target(&self) -> Option<usize> {
        self.targets.get(self.current).copied()
    }

    fn advance(&mut self) {
        self.current += 1;
        self.best_distance = f32::INFINITY;
        self.since_progress = 0.0;
        self.on_target = 0.0;
        self.sidestep = 0.0;
    }

    pub fn next_input(&mut self, session: &Session, dt: f32) -> FrameInput {
        let Some(anchor) = self.target() else {
            return FrameInput::default();
        };
        let Some(goal) = session.layout().anchor(anchor).map(|a| a.position) else {
            self.advance();
            return FrameInput::default();
        };
        let player = session.player().position;
        let distance = planar_distance(player, goal);
        let reach = session.config().session.interact_range;

        if distance <= reach * 0.8 {
            tracing::debug!(anchor, "autopilot reached target");
            self.advance();
            return FrameInput::default().with_action(Action::Interact);
        }

        self.on_target += dt;
        if self.on_target > GIVE_UP_AFTER {
            tracing::debug!(anchor, distance, "autopilot skipping unreachable target");
            self.advance();
            return FrameInput::default();
        }
        if distance < self.best_distance - 0.05 {
            self.best_distance = distance;
            self.since_progress = 0.0;
        } else {
            self.since_progress += dt;
        }
        if self.since_progress > STUCK_AFTER && self.sidestep <= 0.0 {
            self.sidestep = SIDESTEP_FOR;
            self.sidestep_dir = -self.sidestep_dir;
            self.since_progress = 0.0;
        }

        let yaw = face(player, goal);
        let mut intent = if self.sidestep > 0.0 {
            self.sidestep -= dt;
            MoveIntent::new(self.sidestep_dir, 0.3)
        } else {
            MoveIntent::new(0.0, 1.0)
        };
        if session.breath() > 0.5 {
            intent = intent.sprinting();
        }
        FrameInput::walking(intent, yaw)
    }
}

/// Yaw that looks from `from` toward `to`; yaw 0 faces -Z.
fn face(from: Vec3, to: Vec3) -> f32 {
    let dx = to.x - from.x;
    let dz = to.z - from.z;
    (-dx).atan2(-dz)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ashfield_common::Pose;

    #[test]
    fn face_matches_pose_forward() {
        let from = Vec3::new(1.0, 0.0, 1.0);
        for to in [Vec3::new(5.0, 0.0, 1.0), Vec3::new(1.0, 0.0, -4.0), Vec3::new(-3.0, 0.0, 6.0)] {
            let forward = Pose::new(from, face(from, to)).forward();
            let want = (to - from).normalize();
            assert!((forward - want).length() < 1e-5, "{forward:?} vs {want:?}");
        }
    }

    #[test]
    fn targets_clues_then_the_door() {
        let session = Session::new("Foundation", "text", ashfield_sim::GameConfig::default());
        let pilot = Autopilot::new(&session);
        let kinds: Vec<AnchorKind> = pilot
            .targets
            .iter()
            .map(|&i| session.layout().anchors()[i].kind)
            .collect();
        assert_eq!(
            kinds,
            [AnchorKind::Clue, AnchorKind::Clue, AnchorKind::Clue, AnchorKind::Door]
        );
    }
}
