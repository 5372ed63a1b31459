// Copyright (c) 2026 - present The difywatch authors
// SPDX-License-Identifier: MIT

//! Persisted daily plugin counts and the 24h delta
//!
//! The history is one small JSON file mapping `YYYY-MM-DD` dates to counts,
//! kept separately for the community and official categories. One process
//! reads it once and writes it once per run; a missing or corrupt file is
//! an empty baseline, never an error. ISO dates sort lexically, so a
//! `BTreeMap` keeps each category in time order for free.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Number of most-recent dates retained per category.
const RETAIN_DATES: usize = 30;

/// Daily plugin counts per repository category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct History {
    /// Community repository counts by date.
    pub community: BTreeMap<String, u64>,
    /// Official repository counts by date.
    pub official: BTreeMap<String, u64>,
}

/// Per-category counts of plugins new since the previous recorded day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delta {
    /// New community plugins.
    pub community: u64,
    /// New official plugins.
    pub official: u64,
}

impl Delta {
    /// Combined new-plugin count.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.community + self.official
    }
}

/// History persistence errors
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Filesystem error while writing
    #[error("Failed to write history file: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Failed to encode history: {0}")]
    Json(#[from] serde_json::Error),
}

impl History {
    /// Load the history file, falling back to an empty history when the
    /// file is missing or cannot be parsed.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read history, starting fresh");
                return Self::default();
            }
        };
        match serde_json::from_str(&text) {
            Ok(history) => history,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "corrupt history file, starting fresh");
                Self::default()
            }
        }
    }

    /// Persist the history, writing to a temporary file and renaming it
    /// into place. Good enough for the single-writer cron case.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be written; the caller logs
    /// it and carries on.
    pub fn save(&self, path: &Path) -> Result<(), HistoryError> {
        let json = serde_json::to_string(self)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    /// Record today's counts and compute how many plugins are new since
    /// the most recent earlier recorded date.
    ///
    /// A completely empty history is a first run: today is recorded and
    /// the delta is zero. Otherwise the previous count per category is the
    /// most recent date strictly before `today` (zero when none exists),
    /// and a shrinking raw count clamps to zero rather than going
    /// negative. Today's entries are overwritten on re-runs, then each
    /// category is pruned to the most recent dates.
    pub fn record_and_delta(&mut self, today: &str, community: u64, official: u64) -> Delta {
        let first_run = self.community.is_empty() && self.official.is_empty();

        let delta = if first_run {
            Delta::default()
        } else {
            Delta {
                community: community.saturating_sub(previous_count(&self.community, today)),
                official: official.saturating_sub(previous_count(&self.official, today)),
            }
        };

        self.community.insert(today.to_string(), community);
        self.official.insert(today.to_string(), official);
        prune(&mut self.community);
        prune(&mut self.official);

        delta
    }
}

/// Most recent recorded count strictly before `today`, or zero.
fn previous_count(dates: &BTreeMap<String, u64>, today: &str) -> u64 {
    dates
        .range(..today.to_string())
        .next_back()
        .map(|(_, &count)| count)
        .unwrap_or(0)
}

/// Drop the oldest dates until at most `RETAIN_DATES` remain.
fn prune(dates: &mut BTreeMap<String, u64>) {
    while dates.len() > RETAIN_DATES {
        dates.pop_first();
    }
}
