// src/watchlist.rs
use serde::{Deserialize, Serialize};

/// Upstream identifier of an enrollment center.
pub type LocationId = u32;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchedLocation {
    pub id: LocationId,
    pub label: String,
}

/// Locations the operator cares about, in configuration order.
/// Built once at startup and shared read-only with the pipeline.
#[derive(Debug, Clone, Default)]
pub struct WatchList {
    entries: Vec<WatchedLocation>,
}

impl WatchList {
    /// Duplicate ids keep their first label.
    pub fn new(entries: Vec<WatchedLocation>) -> Self {
        let mut out: Vec<WatchedLocation> = Vec::with_capacity(entries.len());
        for e in entries {
            if !out.iter().any(|w| w.id == e.id) {
                out.push(e);
            }
        }
        Self { entries: out }
    }

    /// Default centers along the Quebec / New York / Vermont border.
    pub fn builtin() -> Self {
        Self::new(vec![
            WatchedLocation {
                id: 5021,
                label: "Champlain, NY".into(),
            },
            WatchedLocation {
                id: 5025,
                label: "Ottawa airport".into(),
            },
            WatchedLocation {
                id: 5028,
                label: "Montreal airport".into(),
            },
            WatchedLocation {
                id: 5223,
                label: "Derby Line, VT".into(),
            },
        ])
    }

    pub fn is_watched(&self, id: LocationId) -> bool {
        self.entries.iter().any(|w| w.id == id)
    }

    /// `None` means "not watched".
    pub fn label_for(&self, id: LocationId) -> Option<&str> {
        self.entries
            .iter()
            .find(|w| w.id == id)
            .map(|w| w.label.as_str())
    }

    pub fn ids(&self) -> Vec<LocationId> {
        self.entries.iter().map(|w| w.id).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
