// Copyright (c) 2026 - present The difywatch authors
// SPDX-License-Identifier: MIT

//! Report rendering
//!
//! Builds the fixed human-readable text the webhook carries: total and
//! per-category counts, the 24h delta, the classified change lists as
//! `author/name` lines, and a countdown to the next round-number milestone.

use chrono::{DateTime, Local};
use difywatch_scan::{ChangeSet, PluginChange};

use crate::config::{DEFAULT_COMMUNITY_REMOTE, DEFAULT_OFFICIAL_REMOTE};
use crate::history::Delta;

/// Milestone granularity for the countdown line.
const MILESTONE_STEP: u64 = 500;

/// Everything the report template needs for one run.
#[derive(Debug)]
pub struct Report<'a> {
    /// When the run happened, local time.
    pub now: DateTime<Local>,
    /// Community plugin count.
    pub community: u64,
    /// Official plugin count.
    pub official: u64,
    /// New plugins since the previous recorded day.
    pub delta: Delta,
    /// Classified changes across both repositories.
    pub changes: &'a ChangeSet,
}

/// Next multiple of [`MILESTONE_STEP`] strictly above `total`.
fn next_milestone(total: u64) -> u64 {
    (total / MILESTONE_STEP + 1) * MILESTONE_STEP
}

fn push_change_lines(out: &mut String, label: &str, events: &[PluginChange]) {
    if events.is_empty() {
        return;
    }
    out.push_str(label);
    out.push_str(":\n");
    for event in events {
        out.push_str("- ");
        out.push_str(&event.slug());
        out.push('\n');
    }
}

impl Report<'_> {
    /// Render the full report text.
    #[must_use]
    pub fn render(&self) -> String {
        let total = self.community + self.official;
        let milestone = next_milestone(total);

        let mut out = format!(
            "Dify Plugins Count Update ({}):\n\n\
             Total Plugins: {total}\n\
             - Community Plugins: {}\n\
             - Official Plugins: {}\n\n\
             New Plugins (24h): {}\n\n",
            self.now.format("%Y-%m-%d %H:%M:%S"),
            self.community,
            self.official,
            self.delta.total(),
        );

        if self.changes.is_empty() {
            out.push_str("No changes in last 24h\n");
        } else {
            push_change_lines(&mut out, "Added", &self.changes.added);
            push_change_lines(&mut out, "Removed", &self.changes.removed);
            push_change_lines(&mut out, "Modified", &self.changes.modified);
        }

        out.push_str(&format!(
            "\nPlugins needed to reach {milestone}: {}\n\n\
             Repositories:\n- {}\n- {}",
            milestone - total,
            DEFAULT_COMMUNITY_REMOTE.trim_end_matches(".git"),
            DEFAULT_OFFICIAL_REMOTE.trim_end_matches(".git"),
        ));

        out
    }
}
