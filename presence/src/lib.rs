//! # Presence Tracker
//!
//! Who is editing which note, right now. Clients re-announce themselves every few seconds while an
//! editor is open; entries not refreshed within [`STALE_AFTER_SECS`] are evicted by a background sweep.
//!
//! State is process-local and lost on restart. It is a liveness hint only.
//!
//! ## Example
//!
//! ```rust
//! use presence::PresenceTracker;
//!
//! #[tokio::main]
//! async fn main() {
//!     let tracker = PresenceTracker::new();
//!     let _sweep = tracker.start();
//!     tracker.touch("note-1", "u1", "Ann Lee").await;
//!     assert!(tracker.editors("note-1", Some("u1")).await.is_empty());
//! }
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

/// Entries not refreshed for this many seconds are evicted.
pub const STALE_AFTER_SECS: i64 = 30;

/// How often the background sweep runs.
pub const SWEEP_EVERY: StdDuration = StdDuration::from_secs(10);

/// One active editor of a note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Editor {
    pub user_id: String,
    pub user_name: String,
    pub last_seen: DateTime<Utc>,
}

type NoteEditors = HashMap<String, HashMap<String, Editor>>;

/// Process-scoped presence map. Cheap to clone; clones share state.
#[derive(Debug, Clone, Default)]
pub struct PresenceTracker {
    notes: Arc<RwLock<NoteEditors>>,
}

/// Owns the background sweep; dropping or stopping it ends the sweep.
#[derive(Debug)]
pub struct SweepHandle {
    task: JoinHandle<()>,
}

impl SweepHandle {
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for SweepHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts `user_id` as an editor of `note_id`, seen now.
    pub async fn touch(&self, note_id: &str, user_id: &str, user_name: &str) {
        self.touch_at(note_id, user_id, user_name, Utc::now()).await
    }

    pub async fn touch_at(&self, note_id: &str, user_id: &str, user_name: &str, at: DateTime<Utc>) {
        let mut notes = self.notes.write().await;
        notes.entry(note_id.to_string()).or_default().insert(
            user_id.to_string(),
            Editor {
                user_id: user_id.to_string(),
                user_name: user_name.to_string(),
                last_seen: at,
            },
        );
    }

    /// Removes `user_id` from `note_id`'s editors.
    pub async fn leave(&self, note_id: &str, user_id: &str) {
        let mut notes = self.notes.write().await;
        if let Some(editors) = notes.get_mut(note_id) {
            editors.remove(user_id);
            if editors.is_empty() {
                notes.remove(note_id);
            }
        }
    }

    /// Current editors of a note, optionally leaving one user out, ordered by user id.
    pub async fn editors(&self, note_id: &str, excluding: Option<&str>) -> Vec<Editor> {
        let notes = self.notes.read().await;
        let mut editors: Vec<Editor> = notes
            .get(note_id)
            .map(|m| {
                m.values()
                    .filter(|e| Some(e.user_id.as_str()) != excluding)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        editors.sort_by(|a, b| a.user_id.cmp(&b.user_id));
        editors
    }

    /// Drops entries last seen more than [`STALE_AFTER_SECS`] before `now`. Returns how many were dropped.
    pub async fn evict_stale(&self, now: DateTime<Utc>) -> usize {
        let cutoff = now - Duration::seconds(STALE_AFTER_SECS);
        let mut notes = self.notes.write().await;
        let mut evicted = 0;
        notes.retain(|_, editors| {
            let before = editors.len();
            editors.retain(|_, e| e.last_seen >= cutoff);
            evicted += before - editors.len();
            !editors.is_empty()
        });
        if evicted > 0 {
            debug!(evicted, "Evicted stale editors");
        }
        evicted
    }

    /// Starts the periodic eviction sweep.
    pub fn start(&self) -> SweepHandle {
        self.start_with_interval(SWEEP_EVERY)
    }

    pub fn start_with_interval(&self, every: StdDuration) -> SweepHandle {
        let tracker = self.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                tracker.evict_stale(Utc::now()).await;
            }
        });
        SweepHandle { task }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_touch_and_list_excluding_self() {
        let tracker = PresenceTracker::new();
        tracker.touch("n1", "u1", "Ann Lee").await;
        tracker.touch("n1", "u2", "Bo Chan").await;

        let all = tracker.editors("n1", None).await;
        assert_eq!(all.len(), 2);
        let others = tracker.editors("n1", Some("u1")).await;
        assert_eq!(others.len(), 1);
        assert_eq!(others[0].user_name, "Bo Chan");
        assert!(tracker.editors("n2", None).await.is_empty());
    }

    #[tokio::test]
    async fn test_touch_refreshes_instead_of_duplicating() {
        let tracker = PresenceTracker::new();
        let t0 = Utc::now();
        tracker.touch_at("n1", "u1", "Ann", t0).await;
        tracker.touch_at("n1", "u1", "Ann", t0 + Duration::seconds(5)).await;
        let editors = tracker.editors("n1", None).await;
        assert_eq!(editors.len(), 1);
        assert_eq!(editors[0].last_seen, t0 + Duration::seconds(5));
    }

    #[tokio::test]
    async fn test_leave() {
        let tracker = PresenceTracker::new();
        tracker.touch("n1", "u1", "Ann").await;
        tracker.leave("n1", "u1").await;
        tracker.leave("n1", "ghost").await;
        assert!(tracker.editors("n1", None).await.is_empty());
    }

    #[tokio::test]
    async fn test_evict_stale_after_thirty_seconds() {
        let tracker = PresenceTracker::new();
        let now = Utc::now();
        tracker.touch_at("n1", "old", "Old", now - Duration::seconds(31)).await;
        tracker.touch_at("n1", "edge", "Edge", now - Duration::seconds(30)).await;
        tracker.touch_at("n2", "fresh", "Fresh", now - Duration::seconds(2)).await;

        assert_eq!(tracker.evict_stale(now).await, 1);
        let n1: Vec<_> = tracker.editors("n1", None).await.into_iter().map(|e| e.user_id).collect();
        assert_eq!(n1, vec!["edge".to_string()]);
        assert_eq!(tracker.editors("n2", None).await.len(), 1);
    }

    #[tokio::test]
    async fn test_background_sweep_evicts() {
        let tracker = PresenceTracker::new();
        tracker
            .touch_at("n1", "u1", "Ann", Utc::now() - Duration::minutes(5))
            .await;
        let handle = tracker.start_with_interval(StdDuration::from_millis(10));
        tokio::time::sleep(StdDuration::from_millis(100)).await;
        handle.stop();
        assert!(tracker.editors("n1", None).await.is_empty());
    }

    #[test]
    fn test_editor_serializes_camel_case() {
        let e = Editor {
            user_id: "u1".to_string(),
            user_name: "Ann".to_string(),
            last_seen: Utc::now(),
        };
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["userId"], "u1");
        assert!(json.get("lastSeen").is_some());
    }
}
