// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! External editor hub invocation.
//!
//! Opening a project in a second editor instance goes through the engine's
//! hub application, launched as a child process with a `--projectPath`
//! argument. The hub forks off the actual editor, so the child itself exits
//! quickly. Nothing is parsed from its output beyond the error stream.
//!
//! One consistent failure policy applies: a non-zero exit status or any
//! output on the error stream counts as a launch failure. The hub is a GUI
//! application, a healthy launch has nothing to say on stderr.

use std::{
    ffi::OsStr,
    path::{Path, PathBuf},
    process::Command,
};
use tracing::{info, instrument};

/// Open the project at target root through the editor hub binary.
///
/// Blocks until the spawned hub process exits, then drains its error
/// stream.
///
/// # Errors
///
/// - Return [`LaunchError::MissingProject`] if the project directory does
///   not exist.
/// - Return [`LaunchError::MissingLauncher`] if the hub binary does not
///   exist.
/// - Return [`LaunchError::Spawn`] if the child process cannot be spawned.
/// - Return [`LaunchError::Launcher`] if the hub exits non-zero or writes
///   anything to its error stream.
#[instrument(level = "debug")]
pub fn open_project(
    hub: impl AsRef<Path> + std::fmt::Debug,
    project_root: impl AsRef<Path> + std::fmt::Debug,
) -> Result<()> {
    let hub = hub.as_ref();
    let project_root = project_root.as_ref();

    if !project_root.is_dir() {
        return Err(LaunchError::MissingProject {
            path: project_root.to_path_buf(),
        });
    }

    if !hub.exists() {
        return Err(LaunchError::MissingLauncher {
            path: hub.to_path_buf(),
        });
    }

    info!(
        "opening project {:?} through {:?}",
        project_root.display(),
        hub.display()
    );

    syscall_drain_stderr(hub, [OsStr::new("--projectPath"), project_root.as_os_str()])
}

/// Run an external command synchronously, draining its error stream.
///
/// Any stderr output is treated as failure, even on a zero exit status.
fn syscall_drain_stderr(
    cmd: impl AsRef<OsStr>,
    args: impl IntoIterator<Item = impl AsRef<OsStr>>,
) -> Result<()> {
    let output = Command::new(cmd.as_ref())
        .args(args)
        .output()
        .map_err(|err| LaunchError::Spawn {
            source: err,
            command: PathBuf::from(cmd.as_ref()),
        })?;

    let stderr = String::from_utf8_lossy(output.stderr.as_slice())
        .trim()
        .to_owned();

    if !output.status.success() || !stderr.is_empty() {
        return Err(LaunchError::Launcher {
            command: PathBuf::from(cmd.as_ref()),
            stderr,
        });
    }

    Ok(())
}

/// Launcher invocation error types.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    /// Project directory does not exist.
    #[error("cannot open project, folder {:?} does not exist", path.display())]
    MissingProject { path: PathBuf },

    /// Hub binary does not exist.
    #[error("hub binary {:?} does not exist", path.display())]
    MissingLauncher { path: PathBuf },

    /// Child process cannot be spawned at all.
    #[error("failed to spawn {:?}", command.display())]
    Spawn {
        #[source]
        source: std::io::Error,
        command: PathBuf,
    },

    /// Hub process reported failure through exit status or error stream.
    #[error("launcher {:?} failed: {stderr}", command.display())]
    Launcher { command: PathBuf, stderr: String },
}

/// Friendly result alias :3
pub type Result<T, E = LaunchError> = std::result::Result<T, E>;
