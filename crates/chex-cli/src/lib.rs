//! chex CLI library.
//!
//! This crate provides the core functionality for the `chex` binary: the
//! build pipeline stages and the command implementations wired to them.

pub mod commands;
pub mod pipeline;
