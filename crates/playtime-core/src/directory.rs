//! Player directory collaborator trait
//!
//! The core needs three things from the surrounding host: a display name
//! for message templates, whether a player holds the bypass grant, and
//! reverse lookup of a name for admin commands. Everything else stays on
//! the host's side of the seam.

use playtime_util::PlayerId;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Read-only view of player identity the host maintains
pub trait PlayerDirectory: Send + Sync {
    /// Display name for `{player}` template substitution
    fn display_name(&self, player: &PlayerId) -> Option<String>;

    /// Whether the player holds the bypass grant (treated identically to
    /// whitelist membership by enforcement)
    fn has_bypass(&self, player: &PlayerId) -> bool;

    /// Resolve a display name back to an identity (case-insensitive)
    fn lookup_name(&self, name: &str) -> Option<PlayerId>;
}

/// In-memory directory fed by host events; also the test double.
#[derive(Default)]
pub struct InMemoryDirectory {
    inner: Mutex<DirectoryInner>,
}

#[derive(Default)]
struct DirectoryInner {
    names: HashMap<PlayerId, String>,
    bypass: HashSet<PlayerId>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, player: PlayerId, name: impl Into<String>) {
        self.inner.lock().unwrap().names.insert(player, name.into());
    }

    pub fn grant_bypass(&self, player: PlayerId) {
        self.inner.lock().unwrap().bypass.insert(player);
    }

    pub fn revoke_bypass(&self, player: &PlayerId) {
        self.inner.lock().unwrap().bypass.remove(player);
    }
}

impl PlayerDirectory for InMemoryDirectory {
    fn display_name(&self, player: &PlayerId) -> Option<String> {
        self.inner.lock().unwrap().names.get(player).cloned()
    }

    fn has_bypass(&self, player: &PlayerId) -> bool {
        self.inner.lock().unwrap().bypass.contains(player)
    }

    fn lookup_name(&self, name: &str) -> Option<PlayerId> {
        let inner = self.inner.lock().unwrap();
        inner
            .names
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(id, _)| *id)
    }
}
