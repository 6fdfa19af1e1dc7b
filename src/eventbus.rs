//! Pad activity fan-out.
//!
//! Pads with notification enabled publish every batch of actions they dispatch
//! as a [`PadActivity`]. Interested parties (a preferences pane lighting up the
//! direction a stick is pushed, a logger, a recorder) register an
//! [`ActivityListener`] on the [`ActionBus`], optionally restricted to one
//! slot and/or filtered by pad kind.

use crate::action::GamePadAction;
use crate::port::{PadKind, PortId};
use std::collections::HashMap;

/// One batch of actions dispatched by a pad.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PadActivity {
    pub slot: usize,
    pub kind: PadKind,
    pub port: Option<PortId>,
    pub actions: Vec<GamePadAction>,
}

/// Trait for reacting to pad activity.
pub trait ActivityListener: Send {
    fn on_activity(&mut self, activity: &PadActivity);
}

impl<F> ActivityListener for F
where
    F: FnMut(&PadActivity) + Send,
{
    fn on_activity(&mut self, activity: &PadActivity) {
        self(activity)
    }
}

/// Determines which activity a listener wants to receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivityFilter {
    All,
    JoystickOnly,
    MouseOnly,
    Custom(fn(&PadActivity) -> bool),
}

impl ActivityFilter {
    fn accepts(&self, activity: &PadActivity) -> bool {
        match self {
            ActivityFilter::All => true,
            ActivityFilter::JoystickOnly => activity.kind == PadKind::Joystick,
            ActivityFilter::MouseOnly => activity.kind == PadKind::Mouse,
            ActivityFilter::Custom(f) => f(activity),
        }
    }
}

/// Handle returned by [`ActionBus::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct ListenerEntry {
    listener: Box<dyn ActivityListener>,
    enabled: bool,
    filter: ActivityFilter,
    slot: Option<usize>,
}

#[derive(Default)]
pub struct ActionBus {
    next_id: u64,
    listeners: HashMap<u64, ListenerEntry>,
}

impl ActionBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener with a filter and an optional slot restriction.
    pub fn add_listener(
        &mut self,
        listener: impl ActivityListener + 'static,
        filter: ActivityFilter,
        slot: Option<usize>,
    ) -> ListenerId {
        let id = self.next_id;
        self.listeners.insert(
            id,
            ListenerEntry {
                listener: Box::new(listener),
                enabled: true,
                filter,
                slot,
            },
        );
        self.next_id += 1;
        ListenerId(id)
    }

    pub fn enable(&mut self, id: ListenerId) {
        if let Some(entry) = self.listeners.get_mut(&id.0) {
            entry.enabled = true;
        }
    }

    /// Mutes a listener without removing it.
    pub fn disable(&mut self, id: ListenerId) {
        if let Some(entry) = self.listeners.get_mut(&id.0) {
            entry.enabled = false;
        }
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id.0).is_some()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Delivers one activity record to all enabled, matching listeners.
    pub fn emit(&mut self, activity: &PadActivity) {
        for entry in self.listeners.values_mut() {
            if !entry.enabled {
                continue;
            }
            if entry.slot.is_some_and(|slot| slot != activity.slot) {
                continue;
            }
            if entry.filter.accepts(activity) {
                entry.listener.on_activity(activity);
            }
        }
    }

    pub fn emit_all(&mut self, activities: &[PadActivity]) {
        for activity in activities {
            self.emit(activity);
        }
    }
}

impl std::fmt::Debug for ActionBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
