//! Common test utilities for pystrano CLI and scenario tests.
//!
//! This module provides:
//! - `TestEnv`: isolated temp directory with fake `ssh`/`scp` programs
//! - Fixtures: manifest builders

#![allow(dead_code)]

pub mod env;
pub mod fixtures;

pub use env::*;
pub use fixtures::*;
