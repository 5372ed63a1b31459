//! difywatch library
//!
//! This module exports the components of the difywatch binary for use in
//! integration tests.

pub mod config;
pub mod history;
pub mod limits;
pub mod notify;
pub mod repo;
pub mod report;
pub mod run;
