//! Terminal UI for the `pystrano` binary
//!
//! - `theme` - color, icon and border tokens
//! - `terminal` / `context` - capability detection and `--color` resolution
//! - `primitives`, `widgets`, `blocks` - building blocks
//! - `views` - the run header and summary

pub mod blocks;
pub mod context;
pub mod primitives;
pub mod terminal;
pub mod theme;
pub mod views;
pub mod widgets;
