//! Slot table snapshot.
//!
//! [`Snapshot`] is an **owned**, read-only view of the manager's slot table at
//! a point in time, for populating device menus and preference panes. It is
//! produced by [`GamePadManager::snapshot`](crate::manager::GamePadManager::snapshot)
//! and does not track later changes; request a new one after devices come
//! and go.
//!
//! # Examples
//! ```
//! use joyport::{GamePadManager, PortId};
//!
//! let mut mgr = GamePadManager::new();
//! mgr.bind_port(1, PortId::Port1);
//! let snap = mgr.snapshot();
//! assert_eq!(snap.slot_on(PortId::Port1), Some(1));
//! for info in snap.iter() {
//!     println!("{}: {} ({:?})", info.slot, info.name, info.kind);
//! }
//! ```

use crate::keymap::KeyMapId;
use crate::port::{PadKind, PortId};
use serde::Serialize;
use std::collections::BTreeMap;

/// Description of one occupied slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SlotInfo {
    pub slot: usize,
    pub name: String,
    pub icon: Option<String>,
    pub kind: PadKind,
    pub port: Option<PortId>,
    pub key_map: Option<KeyMapId>,
    pub vendor_id: Option<String>,
    pub product_id: Option<String>,
    pub location_id: Option<String>,
    /// `false` for HID devices the database does not list; such devices may not work.
    pub is_known: bool,
}

/// Owned snapshot of the slot table (`slot → SlotInfo`), ordered by slot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot(pub BTreeMap<usize, SlotInfo>);

impl Snapshot {
    #[inline]
    pub fn get(&self, slot: usize) -> Option<&SlotInfo> {
        self.0.get(&slot)
    }

    #[inline]
    pub fn is_used(&self, slot: usize) -> bool {
        self.0.contains_key(&slot)
    }

    /// Iterate occupied slots in ascending order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &SlotInfo> {
        self.0.values()
    }

    /// Slot bound to `port`, if any.
    pub fn slot_on(&self, port: PortId) -> Option<usize> {
        self.iter().find(|i| i.port == Some(port)).map(|i| i.slot)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn into_inner(self) -> BTreeMap<usize, SlotInfo> {
        self.0
    }
}
