use ashfield_sim::SessionEvent;

/// Audio and UI collaborators: they hear tension and event markers, nothing else.
pub trait Presenter {
    fn present(&mut self, tension: f32, events: &[SessionEvent]);
}

/// Presenter that keeps one line per event and the tension peak.
#[derive(Debug, Default)]
pub struct EventLog {
    lines: Vec<String>,
    frames: u64,
    peak_tension: f32,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn peak_tension(&self) -> f32 {
        self.peak_tension
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Presenter for EventLog {
    fn present(&mut self, tension: f32, events: &[SessionEvent]) {
        self.frames += 1;
        self.peak_tension = self.peak_tension.max(tension);
        for event in events {
            let line = match event {
                SessionEvent::TriggerFired { collected, .. } => format!("fragment {collected} taken"),
                SessionEvent::AnchorRead { kind, .. } => format!("read {kind:?}"),
                SessionEvent::AgentAppeared => "something is in the fog".to_string(),
                SessionEvent::Warped { position } => {
                    format!("radio burst near ({:.1}, {:.1})", position.x, position.z)
                }
                SessionEvent::Caught => "caught".to_string(),
                SessionEvent::GoalReached => "the warm light".to_string(),
            };
            tracing::debug!(frame = self.frames, tension, "{line}");
            self.lines.push(line);
        }
    }
}
