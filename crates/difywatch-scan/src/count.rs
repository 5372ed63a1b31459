// Copyright (c) 2026 - present The difywatch authors
// SPDX-License-Identifier: MIT

//! Plugin counting over a repository checkout
//!
//! Two counting policies, one per repository convention:
//!
//! - Community: each top-level directory is a contributor. A contributor
//!   directory with subdirectories contributes one plugin per subdirectory;
//!   one with only packaged `.difypkg` files contributes one per file.
//! - Official: each immediate subdirectory of the five fixed category
//!   directories is one plugin.
//!
//! A directory that cannot be listed is logged and contributes zero; the
//! walk never aborts on a single bad entry.

use std::fs;
use std::path::Path;

use tracing::{debug, warn};

use crate::{OFFICIAL_CATEGORIES, PACKAGE_EXT, SKIP_DIRS};

/// One directory entry, reduced to what counting needs.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    name: String,
    is_dir: bool,
}

/// List a directory as `Entry` values, logging and returning `None` on
/// failure so the caller can treat it as an empty contribution.
fn list_dir(path: &Path) -> Option<Vec<Entry>> {
    let read = match fs::read_dir(path) {
        Ok(read) => read,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to list directory");
            return None;
        }
    };

    let mut entries = Vec::new();
    for item in read {
        let item = match item {
            Ok(item) => item,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read directory entry");
                continue;
            }
        };
        let is_dir = item.file_type().map(|t| t.is_dir()).unwrap_or(false);
        entries.push(Entry {
            name: item.file_name().to_string_lossy().into_owned(),
            is_dir,
        });
    }
    Some(entries)
}

/// How many plugins one contributor directory holds.
///
/// Subdirectories win: when at least one exists, each counts as a plugin
/// and loose package files are ignored. Otherwise each `.difypkg` file is
/// a standalone plugin.
fn count_author_entries(entries: &[Entry]) -> usize {
    let subdirs = entries.iter().filter(|e| e.is_dir).count();
    if subdirs > 0 {
        return subdirs;
    }
    entries
        .iter()
        .filter(|e| !e.is_dir && e.name.ends_with(PACKAGE_EXT))
        .count()
}

/// Count plugins in a community repository checkout.
///
/// Infrastructure directories and dot-prefixed names at the top level are
/// skipped. Always returns a count; an unreadable root counts as zero.
#[must_use]
pub fn count_community(root: &Path) -> usize {
    let Some(top) = list_dir(root) else {
        return 0;
    };

    let mut total = 0;
    for entry in top {
        if !entry.is_dir || entry.name.starts_with('.') || SKIP_DIRS.contains(&entry.name.as_str())
        {
            continue;
        }
        let author_path = root.join(&entry.name);
        let Some(entries) = list_dir(&author_path) else {
            continue;
        };
        let found = count_author_entries(&entries);
        debug!(author = %entry.name, plugins = found, "counted author directory");
        total += found;
    }
    total
}

/// Count plugins in an official repository checkout.
///
/// Each immediate subdirectory of the five category directories is one
/// plugin; missing categories contribute zero.
#[must_use]
pub fn count_official(root: &Path) -> usize {
    let mut total = 0;
    for category in OFFICIAL_CATEGORIES {
        let category_path = root.join(category);
        if !category_path.is_dir() {
            continue;
        }
        let Some(entries) = list_dir(&category_path) else {
            continue;
        };
        let found = entries.iter().filter(|e| e.is_dir).count();
        debug!(category, plugins = found, "counted official category");
        total += found;
    }
    total
}
