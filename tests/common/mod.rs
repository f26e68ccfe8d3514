//! Common test utilities for Hoist CLI tests.
//!
//! This module provides:
//! - `TestEnv`: Isolated project directory plus helpers to run the binary
//! - `FakeSsh`: A scripted stand-in for the OpenSSH client (unix only)
//! - Fixtures: Reusable config and project content

#![allow(dead_code)]

pub mod env;
#[cfg(unix)]
pub mod fake_ssh;
pub mod fixtures;

pub use env::*;
#[cfg(unix)]
pub use fake_ssh::*;
pub use fixtures::*;
