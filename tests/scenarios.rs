//! Scenario tests for pystrano.
//!
//! Each scenario drives the real binary end to end against the fake
//! `ssh`/`scp` programs from `common`.
//!
//! Run with: cargo test --test scenarios

#![cfg(unix)]

mod common;

#[path = "scenarios/deploy_dry_run.rs"]
mod deploy_dry_run;

#[path = "scenarios/deploy_release.rs"]
mod deploy_release;

#[path = "scenarios/setup_server.rs"]
mod setup_server;

#[path = "scenarios/multi_server.rs"]
mod multi_server;
