// Copyright (c) 2026 - present The difywatch authors
// SPDX-License-Identifier: MIT

//! difywatch: count Dify plugins and report 24h changes to a chat webhook
//!
//! Intended to run once per invocation from a non-overlapping scheduler
//! (cron); there is no retry within a run, the next invocation is the
//! retry.

use clap::Parser;
use tracing::error;

use difywatch::config::Config;
use difywatch::{limits, run};

fn main() {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .init();

    if let Err(e) = config.validate() {
        error!(error = %e, "invalid configuration");
        std::process::exit(1);
    }

    limits::apply();

    if let Err(e) = run::run(&config) {
        error!(error = %e, "run failed");
        std::process::exit(1);
    }
}
