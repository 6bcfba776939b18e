// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! # Oxiclone
//!
//! Create a __linked clone__ of a game-engine project: a sibling directory
//! that shares the original's source-controlled folders through filesystem
//! links, and carries an independent copy of the regenerable library cache.
//! A second editor instance can open the clone in parallel with the
//! original, e.g., to test a multiplayer host and client against each other,
//! without reimporting every asset from scratch.
//!
//! # Layout
//!
//! - [`project`]: derive conventional subpaths from a project root, and
//!   resolve the clone/original counterpart relationship.
//! - [`clone`]: lifecycle orchestration, with the recursive
//!   copy-with-progress and platform link dispatch underneath it.
//! - [`config`]: explicit, injectable settings for the whole environment.
//! - [`launch`]: open a project through the external editor hub binary.
//! - [`path`]: default locations for Oxiclone's own files.

pub mod clone;
pub mod config;
pub mod launch;
pub mod path;
pub mod project;

pub use clone::{CloneEnvironment, CloneError};
pub use config::CloneSettings;
pub use project::Project;
