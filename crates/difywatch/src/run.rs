// Copyright (c) 2026 - present The difywatch authors
// SPDX-License-Identifier: MIT

//! The run orchestrator
//!
//! Sequences sync, count, classification, history update, and delivery
//! under one wall-clock budget. Cancellation is cooperative: the deadline
//! is checked between phases, and a blown budget skips whatever remains
//! rather than crashing. Per-item failures demote their piece of the run
//! (a category counts zero, a change list comes up empty) instead of
//! aborting it.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Local;
use tracing::{info, warn};

use difywatch_scan::{ChangeSet, RepoKind, classify_log, count_community, count_official};

use crate::config::Config;
use crate::history::History;
use crate::notify;
use crate::repo;
use crate::report::Report;

/// Cooperative wall-clock budget for the whole run.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    budget: Duration,
}

impl Deadline {
    /// Start the clock with the given budget.
    #[must_use]
    pub fn new(budget: Duration) -> Self {
        Self {
            start: Instant::now(),
            budget,
        }
    }

    /// True once the budget is spent.
    #[must_use]
    pub fn exceeded(&self) -> bool {
        self.start.elapsed() >= self.budget
    }

    /// Time left, zero once exceeded.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.start.elapsed())
    }

    /// Clip a per-operation timeout to the remaining budget.
    #[must_use]
    pub fn clip(&self, timeout: Duration) -> Duration {
        timeout.min(self.remaining())
    }
}

/// Classify the last-lookback-window changes of one snapshot, demoting any
/// failure to an empty change set.
fn changes_for(path: &Path, kind: RepoKind, lookback_hours: u64, now: i64) -> ChangeSet {
    match repo::recent_log(path, lookback_hours) {
        Ok(log) => classify_log(&log, kind, now, lookback_hours as i64 * 3600),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read recent log");
            ChangeSet::default()
        }
    }
}

/// Execute one full scan-and-notify run.
///
/// # Errors
///
/// Only a failure at the orchestration boundary itself escapes; everything
/// the error taxonomy classes as per-item is logged and absorbed.
pub fn run(config: &Config) -> Result<()> {
    info!("starting plugin count run");
    let deadline = Deadline::new(Duration::from_secs(config.budget_mins * 60));

    let community_path = config.community_path();
    let official_path = config.official_path();

    // Phase 1: refresh snapshots.
    let community_ok = repo::ensure(
        &community_path,
        &config.community_remote,
        deadline.clip(repo::SYNC_TIMEOUT),
    );
    let official_ok = repo::ensure(
        &official_path,
        &config.official_remote,
        deadline.clip(repo::SYNC_TIMEOUT),
    );
    if !community_ok && !official_ok {
        anyhow::bail!("neither repository could be synced");
    }
    if deadline.exceeded() {
        warn!("run budget exceeded after sync, skipping remaining phases");
        return Ok(());
    }

    // Phase 2: count plugins; a failed sync demotes its category to zero.
    let community_count = if community_ok {
        count_community(&community_path) as u64
    } else {
        0
    };
    let official_count = if official_ok {
        count_official(&official_path) as u64
    } else {
        0
    };
    info!(community = community_count, official = official_count, "counted plugins");
    if deadline.exceeded() {
        warn!("run budget exceeded after counting, skipping remaining phases");
        return Ok(());
    }

    // Phase 3: classify recent changes.
    let now = Local::now();
    let now_epoch = now.timestamp();
    let mut changes = if community_ok {
        changes_for(
            &community_path,
            RepoKind::Community,
            config.lookback_hours,
            now_epoch,
        )
    } else {
        ChangeSet::default()
    };
    if official_ok {
        changes.merge(changes_for(
            &official_path,
            RepoKind::Official,
            config.lookback_hours,
            now_epoch,
        ));
    }
    info!(events = changes.len(), "classified recent changes");
    if deadline.exceeded() {
        warn!("run budget exceeded after classification, skipping remaining phases");
        return Ok(());
    }

    // Phase 4: history and delta.
    let history_path = config.history_path();
    let mut history = History::load(&history_path);
    let today = now.format("%Y-%m-%d").to_string();
    let delta = history.record_and_delta(&today, community_count, official_count);
    if let Err(e) = history.save(&history_path) {
        warn!(path = %history_path.display(), error = %e, "failed to save history");
    }
    info!(
        community_new = delta.community,
        official_new = delta.official,
        "computed 24h delta"
    );

    // Phase 5: deliver the report.
    let report = Report {
        now,
        community: community_count,
        official: official_count,
        delta,
        changes: &changes,
    };
    let text = report.render();

    if community_count == 0 || official_count == 0 {
        warn!("a category counted zero, skipping notification");
        return Ok(());
    }
    match &config.webhook {
        Some(url) if !deadline.exceeded() => match notify::deliver(url, &text) {
            Ok((200, _)) => info!("report delivered"),
            Ok((status, body)) => {
                warn!(status, body = %body, "webhook rejected report");
            }
            Err(e) => warn!(error = %e, "webhook delivery failed"),
        },
        Some(_) => warn!("run budget exceeded, skipping notification"),
        None => info!(report = %text, "no webhook configured"),
    }

    info!("finished plugin count run");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadline_not_exceeded_with_generous_budget() {
        let deadline = Deadline::new(Duration::from_secs(600));
        assert!(!deadline.exceeded());
        assert!(deadline.remaining() > Duration::from_secs(500));
    }

    #[test]
    fn test_deadline_exceeded_with_zero_budget() {
        let deadline = Deadline::new(Duration::ZERO);
        assert!(deadline.exceeded());
        assert_eq!(deadline.remaining(), Duration::ZERO);
    }

    #[test]
    fn test_deadline_clip() {
        let deadline = Deadline::new(Duration::from_secs(600));
        // a short timeout passes through untouched
        assert_eq!(
            deadline.clip(Duration::from_secs(10)),
            Duration::from_secs(10)
        );
        // a timeout beyond the budget is clipped to what remains
        assert!(deadline.clip(Duration::from_secs(3600)) <= Duration::from_secs(600));
    }

    #[test]
    fn test_changes_for_missing_repo_is_empty() {
        let tmp = tempfile::TempDir::new().expect("tempdir");
        let set = changes_for(tmp.path(), RepoKind::Community, 24, 1_755_900_000);
        assert!(set.is_empty());
    }
}
