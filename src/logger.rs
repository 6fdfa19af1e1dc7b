use crate::eventbus::{ActivityListener, PadActivity};
use tracing::info;

/// A listener that logs all pad activity through `tracing`.
#[derive(Debug, Default)]
pub struct Logger;

impl Logger {
    pub fn new() -> Self {
        Logger
    }
}

impl ActivityListener for Logger {
    fn on_activity(&mut self, activity: &PadActivity) {
        info!(
            target: "joyport::activity",
            slot = activity.slot,
            kind = ?activity.kind,
            port = ?activity.port.map(|p| p.number()),
            actions = ?activity.actions,
            "pad activity"
        );
    }
}
