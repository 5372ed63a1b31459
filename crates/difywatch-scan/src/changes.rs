// Copyright (c) 2026 - present The difywatch authors
// SPDX-License-Identifier: MIT

//! Change classification over raw git log text
//!
//! This module turns the output of
//! `git log --since=... --pretty=format:"commit %H%n%at" --name-status`
//! into three ordered lists of plugin-level change events (added, removed,
//! modified). The log is expected in the usual reverse-chronological order:
//! for each commit a `commit <id>` header line, a line carrying the author
//! timestamp as integer epoch seconds, and zero or more `status<TAB>path`
//! lines.
//!
//! Because a shallow fetch can leave commits in the log that are older than
//! the requested window, the lookback boundary is enforced here as well: a
//! commit timestamped before `now - lookback` contributes no events.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{OFFICIAL_CATEGORIES, SKIP_DIRS};

/// Which repository convention governs path interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepoKind {
    /// Community repository: top-level directories are contributor names.
    Community,
    /// Official repository: top-level directories are the fixed categories.
    Official,
}

/// Kind of change a commit made to a plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    /// File added (`A` status).
    Added,
    /// File removed (`D` status).
    Removed,
    /// File modified (`M` status).
    Modified,
}

impl ChangeKind {
    /// Map a git `--name-status` code to a change kind.
    ///
    /// Returns `None` for codes outside `A`/`D`/`M` (renames, copies,
    /// type changes); those produce no event.
    #[must_use]
    pub fn from_status(code: char) -> Option<Self> {
        match code {
            'A' => Some(Self::Added),
            'D' => Some(Self::Removed),
            'M' => Some(Self::Modified),
            _ => None,
        }
    }
}

/// A single plugin-level change event.
///
/// Identity for deduplication is the full tuple; two events that differ
/// only in change kind are distinct (they live in different lists).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginChange {
    /// Contributor (community) or category (official) directory name.
    pub author: String,
    /// Plugin directory name, the second path segment.
    pub name: String,
    /// Commit id the change was seen in.
    pub commit: String,
    /// Author timestamp of that commit, epoch seconds.
    pub timestamp: i64,
}

impl PluginChange {
    /// Render as the `author/name` form used in reports.
    #[must_use]
    pub fn slug(&self) -> String {
        format!("{}/{}", self.author, self.name)
    }
}

/// The classified changes of one repository over the lookback window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    /// Plugins with added files, most recent first.
    pub added: Vec<PluginChange>,
    /// Plugins with removed files, most recent first.
    pub removed: Vec<PluginChange>,
    /// Plugins with modified files, most recent first.
    pub modified: Vec<PluginChange>,
}

impl ChangeSet {
    /// True when all three lists are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    /// Total number of events across the three lists.
    #[must_use]
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }

    /// Append another set's events, preserving each list's order.
    pub fn merge(&mut self, other: ChangeSet) {
        self.added.extend(other.added);
        self.removed.extend(other.removed);
        self.modified.extend(other.modified);
    }
}

/// Split a repository-relative path into `(author, name)`.
///
/// Rejects paths with fewer than two segments, an empty plugin name, an
/// infrastructure first segment, and (for the official convention) a first
/// segment outside the five fixed categories.
fn classify_path(path: &str, kind: RepoKind) -> Option<(&str, &str)> {
    let mut segments = path.split('/');
    let author = segments.next()?;
    let name = segments.next()?;
    if author.is_empty() || name.is_empty() {
        return None;
    }
    if SKIP_DIRS.contains(&author) {
        return None;
    }
    if kind == RepoKind::Official && !OFFICIAL_CATEGORIES.contains(&author) {
        return None;
    }
    Some((author, name))
}

/// Append `event` unless an identical tuple is already in `list`.
///
/// Lists stay small (one entry per touched plugin per commit), so a linear
/// scan is fine.
fn push_deduped(list: &mut Vec<PluginChange>, event: PluginChange) {
    if !list.contains(&event) {
        list.push(event);
    }
}

/// Classify raw log text into added/removed/modified plugin events.
///
/// `now` and `lookback_secs` define the window: commits with an author
/// timestamp strictly older than `now - lookback_secs` are discarded. Each
/// output list is deduplicated on the full event tuple and sorted by
/// timestamp descending; ties keep input order.
#[must_use]
pub fn classify_log(log: &str, kind: RepoKind, now: i64, lookback_secs: i64) -> ChangeSet {
    let cutoff = now - lookback_secs;
    let mut set = ChangeSet::default();

    let mut current_commit: Option<&str> = None;
    let mut current_time: Option<i64> = None;

    for line in log.lines() {
        if let Some(rest) = line.strip_prefix("commit ") {
            current_commit = Some(rest.trim());
            current_time = None;
        } else if !line.is_empty() && line.bytes().all(|b| b.is_ascii_digit()) {
            match line.parse::<i64>() {
                Ok(ts) if ts < cutoff => {
                    // Older than the window: drop the commit so its file
                    // lines are skipped too.
                    debug!(timestamp = ts, cutoff, "commit outside lookback window");
                    current_commit = None;
                    current_time = None;
                }
                Ok(ts) => current_time = Some(ts),
                Err(_) => {
                    current_commit = None;
                    current_time = None;
                }
            }
        } else if let Some((status, path)) = line.split_once('\t') {
            // A file line counts only when both the commit id and an
            // in-window timestamp are known.
            let (Some(commit), Some(timestamp)) = (current_commit, current_time) else {
                continue;
            };
            let Some(code) = status.chars().next() else {
                continue;
            };
            let Some(change) = ChangeKind::from_status(code) else {
                continue;
            };
            let Some((author, name)) = classify_path(path, kind) else {
                continue;
            };
            let event = PluginChange {
                author: author.to_string(),
                name: name.to_string(),
                commit: commit.to_string(),
                timestamp,
            };
            let list = match change {
                ChangeKind::Added => &mut set.added,
                ChangeKind::Removed => &mut set.removed,
                ChangeKind::Modified => &mut set.modified,
            };
            push_deduped(list, event);
        }
    }

    // Most recent first; sort_by is stable so ties keep input order.
    for list in [&mut set.added, &mut set.removed, &mut set.modified] {
        list.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    }

    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    const NOW: i64 = 1_700_000_000;
    const DAY: i64 = 86_400;

    fn classify(log: &str) -> ChangeSet {
        classify_log(log, RepoKind::Community, NOW, DAY)
    }

    #[test]
    fn test_single_added_event() {
        let log = format!(
            "commit aaa111\n{}\nA\tauthor1/pluginX/file.py\n",
            NOW - 3600
        );
        let set = classify(&log);
        assert_eq!(set.added.len(), 1);
        assert_eq!(set.added[0].author, "author1");
        assert_eq!(set.added[0].name, "pluginX");
        assert_eq!(set.added[0].commit, "aaa111");
        assert_eq!(set.added[0].timestamp, NOW - 3600);
        assert!(set.removed.is_empty());
        assert!(set.modified.is_empty());
    }

    #[test]
    fn test_added_and_modified_same_plugin_both_retained() {
        let log = format!(
            "commit aaa111\n{}\nA\tauthor1/pluginX/file.py\nM\tauthor1/pluginX/other.py\n",
            NOW - 3600
        );
        let set = classify(&log);
        assert_eq!(set.added.len(), 1);
        assert_eq!(set.modified.len(), 1);
        assert_eq!(set.added[0].slug(), "author1/pluginX");
        assert_eq!(set.modified[0].slug(), "author1/pluginX");
    }

    #[test]
    fn test_duplicate_tuple_deduplicated() {
        let log = format!(
            "commit aaa111\n{}\nA\talice/p1/a.py\nA\talice/p1/b.py\n",
            NOW - 10
        );
        let set = classify(&log);
        // Two files of the same plugin in the same commit: one event.
        assert_eq!(set.added.len(), 1);
    }

    #[test]
    fn test_ordering_descending_by_timestamp() {
        let log = format!(
            "commit c1\n{}\nA\ta/x/f\ncommit c2\n{}\nA\tb/y/f\ncommit c3\n{}\nA\tc/z/f\n",
            NOW - DAY + 100,
            NOW - DAY + 300,
            NOW - DAY + 200
        );
        let set = classify(&log);
        let times: Vec<i64> = set.added.iter().map(|e| e.timestamp).collect();
        assert_eq!(
            times,
            vec![NOW - DAY + 300, NOW - DAY + 200, NOW - DAY + 100]
        );
    }

    #[test]
    fn test_lookback_boundary() {
        let log = format!(
            "commit old\n{}\nA\ta/too-old/f\ncommit fresh\n{}\nA\ta/fresh/f\n",
            NOW - DAY - 1,
            NOW - DAY + 1
        );
        let set = classify(&log);
        assert_eq!(set.added.len(), 1);
        assert_eq!(set.added[0].name, "fresh");
    }

    #[test]
    fn test_timestamp_exactly_at_cutoff_kept() {
        let log = format!("commit edge\n{}\nA\ta/edge/f\n", NOW - DAY);
        let set = classify(&log);
        assert_eq!(set.added.len(), 1);
    }

    #[test]
    fn test_commit_without_timestamp_yields_no_events() {
        let log = format!(
            "commit broken\nA\ta/ghost/f\ncommit ok\n{}\nA\ta/real/f\n",
            NOW - 10
        );
        let set = classify(&log);
        assert_eq!(set.added.len(), 1);
        assert_eq!(set.added[0].name, "real");
    }

    #[test]
    fn test_path_rejections() {
        let log = format!(
            "commit c\n{}\nA\tonlyonesegment\nA\tauthor/\nA\t.github/x/y\nA\tlogs/a/b\n",
            NOW - 10
        );
        let set = classify(&log);
        assert!(set.is_empty());
    }

    #[test]
    fn test_official_rejects_unknown_category() {
        let log = format!(
            "commit c\n{}\nA\ttools/foo/main.py\nA\trandom/bar/main.py\n",
            NOW - 10
        );
        let set = classify_log(&log, RepoKind::Official, NOW, DAY);
        assert_eq!(set.added.len(), 1);
        assert_eq!(set.added[0].slug(), "tools/foo");
    }

    #[test]
    fn test_unknown_status_code_ignored() {
        let log = format!("commit c\n{}\nR100\ta/p/f\nT\ta/p/g\n", NOW - 10);
        let set = classify(&log);
        assert!(set.is_empty());
    }

    #[test]
    fn test_removed_status() {
        let log = format!("commit c\n{}\nD\talice/gone/f.py\n", NOW - 10);
        let set = classify(&log);
        assert_eq!(set.removed.len(), 1);
        assert_eq!(set.removed[0].slug(), "alice/gone");
    }

    #[test]
    fn test_empty_log() {
        let set = classify("");
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_merge_preserves_order() {
        let mut a = classify(&format!("commit c1\n{}\nA\tx/p/f\n", NOW - 10));
        let b = classify(&format!("commit c2\n{}\nA\ty/q/f\n", NOW - 20));
        a.merge(b);
        assert_eq!(a.added.len(), 2);
        assert_eq!(a.added[0].author, "x");
        assert_eq!(a.added[1].author, "y");
    }

    #[test]
    fn test_change_kind_from_status() {
        assert_eq!(ChangeKind::from_status('A'), Some(ChangeKind::Added));
        assert_eq!(ChangeKind::from_status('D'), Some(ChangeKind::Removed));
        assert_eq!(ChangeKind::from_status('M'), Some(ChangeKind::Modified));
        assert_eq!(ChangeKind::from_status('R'), None);
        assert_eq!(ChangeKind::from_status('?'), None);
    }

    #[test]
    fn test_changeset_serialization_roundtrip() {
        let set = classify(&format!("commit c\n{}\nA\talice/p1/f\n", NOW - 10));
        let json = serde_json::to_string(&set).expect("serialize");
        let back: ChangeSet = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(set, back);
    }
}
