// Copyright (c) 2026 - present The difywatch authors
// SPDX-License-Identifier: MIT

//! Integration tests for difywatch-scan
//!
//! These exercise the counter against a synthetic checkout on disk and the
//! classifier against log text shaped like real `git log --name-status`
//! output, including the blank separator lines git emits between commits.

use std::fs::{self, File};

use difywatch_scan::{RepoKind, classify_log, count_community, count_official};
use similar_asserts::assert_eq;
use tempfile::TempDir;

const NOW: i64 = 1_755_900_000;
const DAY: i64 = 86_400;

#[test]
fn community_and_official_counts_over_one_tree() {
    let tmp = TempDir::new().expect("tempdir");
    let community = tmp.path().join("dify-plugins");
    let official = tmp.path().join("dify-official-plugins");

    fs::create_dir_all(community.join("alice/plugin1")).expect("mkdir");
    fs::create_dir_all(community.join("alice/plugin2")).expect("mkdir");
    fs::create_dir_all(community.join("bob")).expect("mkdir");
    for name in ["a.difypkg", "b.difypkg", "c.difypkg"] {
        File::create(community.join("bob").join(name)).expect("touch");
    }
    fs::create_dir_all(community.join(".assets")).expect("mkdir");

    fs::create_dir_all(official.join("tools/foo")).expect("mkdir");
    fs::create_dir_all(official.join("tools/bar")).expect("mkdir");
    fs::create_dir_all(official.join("models/baz")).expect("mkdir");

    assert_eq!(count_community(&community), 5);
    assert_eq!(count_official(&official), 3);
}

#[test]
fn classifier_handles_real_log_shape() {
    // What `git log --pretty=format:"commit %H%n%at" --name-status` emits:
    // blank lines between the timestamp and the file list, and between
    // commits.
    let log = format!(
        "commit 1945ab9c752534e733c38ba0109dc3b741f0a6eb\n\
         {recent}\n\
         \n\
         A\talice/weather/manifest.yaml\n\
         A\talice/weather/main.py\n\
         M\tbob/translator/main.py\n\
         \n\
         commit c460aeb7fb2d109c17e43de0ce681faec0b7374d\n\
         {older}\n\
         \n\
         D\tcarol/retired/main.py\n\
         \n\
         commit 0000000000000000000000000000000000000000\n\
         {stale}\n\
         \n\
         A\tdave/ancient/main.py\n",
        recent = NOW - 3_600,
        older = NOW - 7_200,
        stale = NOW - 2 * DAY,
    );

    let set = classify_log(&log, RepoKind::Community, NOW, DAY);

    assert_eq!(set.added.len(), 1);
    assert_eq!(set.added[0].slug(), "alice/weather");
    assert_eq!(set.modified.len(), 1);
    assert_eq!(set.modified[0].slug(), "bob/translator");
    assert_eq!(set.removed.len(), 1);
    assert_eq!(set.removed[0].slug(), "carol/retired");
    // dave's commit is outside the 24h window despite being in the log
    assert_eq!(set.len(), 3);
}

#[test]
fn official_classification_filters_categories() {
    let log = format!(
        "commit aaa\n{ts}\n\
         A\ttools/new-tool/main.py\n\
         A\tmigrations/fixup/run.py\n\
         A\t.github/workflows/ci.yaml\n\
         A\tREADME.md\n",
        ts = NOW - 60
    );
    let set = classify_log(&log, RepoKind::Official, NOW, DAY);
    let slugs: Vec<String> = set.added.iter().map(|e| e.slug()).collect();
    assert_eq!(slugs, vec!["tools/new-tool", "migrations/fixup"]);
}
