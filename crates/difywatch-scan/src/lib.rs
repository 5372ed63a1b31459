// Copyright (c) 2026 - present The difywatch authors
// SPDX-License-Identifier: MIT

//! difywatch-scan: plugin counting and change classification for difywatch
//!
//! This library crate walks a local checkout of a Dify plugin repository to
//! count plugins under the repository's directory conventions, and turns raw
//! `git log --name-status` text into typed plugin-level change events.
//!
//! Both halves are pure analysis: nothing here touches the network or
//! mutates the checkout.

#![warn(missing_docs)]

pub mod changes;
pub mod count;

pub use changes::{ChangeKind, ChangeSet, PluginChange, RepoKind, classify_log};
pub use count::{count_community, count_official};

/// Top-level directories that are repository infrastructure, never plugins.
pub const SKIP_DIRS: [&str; 4] = [".git", ".github", ".assets", "logs"];

/// The five plugin category directories of the official repository.
pub const OFFICIAL_CATEGORIES: [&str; 5] = [
    "agent-strategies",
    "extensions",
    "models",
    "tools",
    "migrations",
];

/// File extension of a packaged standalone plugin artifact.
pub const PACKAGE_EXT: &str = ".difypkg";
