// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout for the configuration file that Oxiclone uses to
//! simplify the process of serialization and deserialization. File I/O is
//! left to the caller to figure out.
//!
//! There is no implicit process-wide state in here. Whatever settings an
//! operation needs get passed into it explicitly, so a caller can carry
//! several differently configured environments side by side without them
//! stepping on each other.
//!
//! # Stability Warning
//!
//! The clone suffix and marker file name identify clones that already exist
//! on disk. Changing either after a clone was created severs the connection
//! between the clone and its original, because counterpart resolution is a
//! pure naming derivation.

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    path::PathBuf,
    str::FromStr,
};

/// Clone environment settings.
///
/// Everything that shapes how a clone is derived, created, and opened: the
/// naming convention, the marker file, which conventional folders get an
/// independent copy versus a link back to the original, and where the
/// external editor hub binary lives.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CloneSettings {
    /// Suffix appended to the original's name to derive the clone's name.
    pub clone_suffix: String,

    /// Name of the zero-byte sentinel file identifying a clone root.
    pub marker_file: String,

    /// Conventional folders copied into the clone as independent trees.
    pub copy_folders: Vec<String>,

    /// Conventional folders linked back into the original.
    pub link_folders: Vec<String>,

    /// Path to the editor hub binary used to open projects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hub_path: Option<PathBuf>,
}

impl CloneSettings {
    /// Construct new clone environment settings with stock defaults.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Default for CloneSettings {
    fn default() -> Self {
        Self {
            clone_suffix: "_clone".into(),
            marker_file: ".clone".into(),
            copy_folders: vec![crate::project::LIBRARY_DIR.into()],
            link_folders: vec![
                crate::project::ASSETS_DIR.into(),
                crate::project::SETTINGS_DIR.into(),
                crate::project::PACKAGES_DIR.into(),
                crate::project::AUTO_BUILD_DIR.into(),
            ],
            hub_path: default_hub_path(),
        }
    }
}

impl FromStr for CloneSettings {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut settings: CloneSettings =
            toml::de::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on hub path field.
        if let Some(hub_path) = settings.hub_path {
            settings.hub_path = Some(PathBuf::from(
                shellexpand::full(hub_path.to_string_lossy().as_ref())
                    .map_err(ConfigError::ShellExpansion)?
                    .into_owned(),
            ));
        }

        Ok(settings)
    }
}

impl Display for CloneSettings {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::ser::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// Stock hub binary location for the host platform, if there is one.
fn default_hub_path() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    return Some(PathBuf::from(
        "/Applications/Unity Hub.app/Contents/MacOS/Unity Hub",
    ));

    #[cfg(windows)]
    return Some(PathBuf::from("C:/Program Files/Unity Hub/Unity Hub.exe"));

    #[cfg(not(any(target_os = "macos", windows)))]
    None
}

/// Configuration error types.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[sealed_test(env = [("HUBS", "/opt/hubs")])]
    fn deserialize_clone_settings() -> anyhow::Result<()> {
        let result: CloneSettings = indoc! {r#"
            clone_suffix = "_twin"
            marker_file = ".twin"
            copy_folders = ["Library", "Temp"]
            link_folders = ["Assets", "Packages"]
            hub_path = "$HUBS/unity-hub"
        "#}
        .parse()?;

        let expect = CloneSettings {
            clone_suffix: "_twin".into(),
            marker_file: ".twin".into(),
            copy_folders: vec!["Library".into(), "Temp".into()],
            link_folders: vec!["Assets".into(), "Packages".into()],
            hub_path: Some(PathBuf::from("/opt/hubs/unity-hub")),
        };

        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn deserialize_fills_missing_fields_with_defaults() -> anyhow::Result<()> {
        let result: CloneSettings = indoc! {r#"
            clone_suffix = "_twin"
        "#}
        .parse()?;

        assert_eq!(result.clone_suffix, "_twin");
        assert_eq!(result.marker_file, ".clone");
        assert_eq!(result.copy_folders, vec!["Library".to_string()]);

        Ok(())
    }

    #[test]
    fn settings_round_trip_through_toml() -> anyhow::Result<()> {
        let settings = CloneSettings {
            clone_suffix: "_clone".into(),
            marker_file: ".clone".into(),
            copy_folders: vec!["Library".into(), "Temp".into()],
            link_folders: vec!["Assets".into(), "ProjectSettings".into()],
            hub_path: Some(PathBuf::from("/opt/hubs/unity-hub")),
        };

        let result: CloneSettings = settings.to_string().parse()?;
        assert_eq!(result, settings);

        Ok(())
    }
}
