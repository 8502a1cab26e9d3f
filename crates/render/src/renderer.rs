use ashfield_common::Pose;
use glam::Vec3;
use std::fmt::Write;

use crate::view::FrameView;

/// First-person camera derived from the player pose.
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    pub eye: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Fog far plane; the agent hides past it.
    pub far: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 1.7, 0.0),
            target: Vec3::new(0.0, 1.7, -1.0),
            fov_degrees: 70.0,
            far: 180.0,
        }
    }
}

impl RenderView {
    pub fn from_pose(pose: Pose) -> Self {
        Self {
            eye: pose.position,
            target: pose.position + pose.forward(),
            ..Self::default()
        }
    }
}

/// Renderer-agnostic interface.
///
/// A renderer reads a captured frame and produces output. It never sees the
/// session; handles in the frame are its only way to refer back to entities.
pub trait Renderer {
    type Output;

    fn render(&self, frame: &FrameView, view: &RenderView) -> Self::Output;
}

/// Human-readable dump of a frame, for the CLI and tests.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    /// List every solid, not just the counts.
    pub verbose: bool,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn verbose() -> Self {
        Self { verbose: true }
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, frame: &FrameView, view: &RenderView) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Frame (tick={}, outcome={:?}) ===", frame.tick, frame.outcome);
        let _ = writeln!(
            out,
            "Solids: {} (boxes {}, cylinders {})",
            frame.solids.len(),
            frame.box_count(),
            frame.cylinder_count()
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            view.eye.x, view.eye.y, view.eye.z, view.target.x, view.target.y, view.target.z, view.fov_degrees
        );
        if self.verbose {
            for s in &frame.solids {
                let _ = writeln!(
                    out,
                    "  solid {:?} pos=({:.2}, {:.2}, {:.2}) yaw={:.2}",
                    s.shape, s.position.x, s.position.y, s.position.z, s.yaw
                );
            }
        }
        for a in &frame.anchors {
            let p = a.position;
            let mark = if a.collected { " (collected)" } else { "" };
            let first_line = a.payload.lines().next().unwrap_or("");
            let _ = writeln!(
                out,
                "  [{}] {:?} pos=({:.2}, {:.2}, {:.2}){mark} \"{first_line}\"",
                a.handle.0, a.kind, p.x, p.y, p.z
            );
        }

        let agent = &frame.agent;
        let in_fog = agent.position.distance(view.eye) > view.far;
        let _ = writeln!(
            out,
            "Agent: {:?} pos=({:.2}, {:.2}) visible={} light={:.2}{}",
            agent.phase,
            agent.position.x,
            agent.position.z,
            agent.visible && !in_fog,
            agent.light_intensity,
            if in_fog { " (beyond fog)" } else { "" }
        );
        let _ = writeln!(out, "Tension: {:.3}", frame.tension);
        for e in &frame.events {
            let _ = writeln!(out, "  event {e:?}");
        }
        out
    }
}
