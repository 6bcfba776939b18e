// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Project path resolution.
//!
//! A game-engine project is just a directory whose conventional subfolders sit
//! directly under its root: assets, settings, packages, the regenerable
//! library cache, and automated build output. Everything Oxiclone needs to
//! know about a project is derived from its root path by plain suffix joins.
//! Nothing in here touches the asset pipeline of any particular engine.
//!
//! # Clone Detection
//!
//! A project is a __clone__ if and only if its root contains the zero-byte
//! marker file. The marker's content is ignored, its presence is the whole
//! signal. The counterpart relationship between an original and its clone is
//! a pure naming convention: clone root = original root + clone suffix. It is
//! a derivation, not a stored record, so renaming either directory silently
//! breaks the relationship. Resolution functions report [`None`] in that case
//! rather than erroring.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

/// Conventional asset folder name.
pub const ASSETS_DIR: &str = "Assets";

/// Conventional project settings folder name.
pub const SETTINGS_DIR: &str = "ProjectSettings";

/// Conventional library cache folder name.
pub const LIBRARY_DIR: &str = "Library";

/// Conventional package manifest folder name.
pub const PACKAGES_DIR: &str = "Packages";

/// Conventional automated build output folder name.
pub const AUTO_BUILD_DIR: &str = "AutoBuild";

/// A project descriptor.
///
/// Holds a project root path, and derives every conventional subpath from it
/// on demand. Derived paths are never stored, so they can never drift out of
/// sync with the root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Project {
    root: PathBuf,
    name: String,
}

impl Project {
    /// Construct new project descriptor from root path.
    ///
    /// The display name is the last path segment of the root, with trailing
    /// separators ignored. Does not check if the root actually exists.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let name = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self { root, name }
    }

    /// Rename project, re-deriving the root under the same parent directory.
    pub fn rename(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.root = match self.root.parent() {
            Some(parent) => parent.join(&name),
            None => PathBuf::from(&name),
        };
        self.name = name;
    }

    /// Project root path.
    pub fn root(&self) -> &Path {
        self.root.as_path()
    }

    /// Project display name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Path of a conventional subfolder directly under the project root.
    pub fn folder_path(&self, folder: impl AsRef<Path>) -> PathBuf {
        self.root.join(folder)
    }

    /// Asset folder path.
    pub fn asset_path(&self) -> PathBuf {
        self.folder_path(ASSETS_DIR)
    }

    /// Project settings folder path.
    pub fn settings_path(&self) -> PathBuf {
        self.folder_path(SETTINGS_DIR)
    }

    /// Library cache folder path.
    pub fn library_path(&self) -> PathBuf {
        self.folder_path(LIBRARY_DIR)
    }

    /// Package manifest folder path.
    pub fn packages_path(&self) -> PathBuf {
        self.folder_path(PACKAGES_DIR)
    }

    /// Automated build output folder path.
    pub fn auto_build_path(&self) -> PathBuf {
        self.folder_path(AUTO_BUILD_DIR)
    }
}

impl Display for Project {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        writeln!(fmt, "{}", self.name)?;
        writeln!(fmt, "  root:     {}", self.root.display())?;
        writeln!(fmt, "  assets:   {}", self.asset_path().display())?;
        writeln!(fmt, "  settings: {}", self.settings_path().display())?;
        writeln!(fmt, "  library:  {}", self.library_path().display())?;
        writeln!(fmt, "  packages: {}", self.packages_path().display())?;
        write!(fmt, "  builds:   {}", self.auto_build_path().display())
    }
}

/// Check if project at target root is a clone.
///
/// True if and only if the marker file exists directly under the root. No
/// other state is consulted.
pub fn is_clone(root: impl AsRef<Path>, marker: impl AsRef<Path>) -> bool {
    root.as_ref().join(marker).is_file()
}

/// Derive the clone root path for an original project root.
///
/// Pure derivation by naming convention. Does not check if the derived path
/// exists, so it can be used to pick the location of a clone that has not
/// been created yet. Trailing separators on the root are ignored.
pub fn clone_root(original: impl AsRef<Path>, suffix: impl AsRef<str>) -> PathBuf {
    let original = Project::new(original.as_ref());
    let mut project = original.clone();
    project.rename(format!("{}{}", original.name(), suffix.as_ref()));
    project.root().to_path_buf()
}

/// Strip the clone suffix from a clone root path.
///
/// Pure textual derivation. Returns [`None`] if the last path segment does
/// not end with the suffix.
pub fn strip_clone_suffix(clone: impl AsRef<Path>, suffix: impl AsRef<str>) -> Option<PathBuf> {
    let clone = Project::new(clone.as_ref());
    let original_name = clone.name().strip_suffix(suffix.as_ref())?;
    if original_name.is_empty() {
        return None;
    }

    let mut project = clone.clone();
    project.rename(original_name);
    Some(project.root().to_path_buf())
}

/// Locate the existing clone of an original project.
///
/// Returns [`None`] if no directory exists at the derived clone path, e.g.,
/// when the clone was never created, or was renamed out from under the
/// naming convention.
pub fn clone_path_of(original: impl AsRef<Path>, suffix: impl AsRef<str>) -> Option<PathBuf> {
    let path = clone_root(original, suffix);
    path.is_dir().then_some(path)
}

/// Locate the existing original of a clone project.
///
/// Returns [`None`] if the clone's name does not carry the suffix, or if no
/// directory exists at the derived original path.
pub fn original_path_of(clone: impl AsRef<Path>, suffix: impl AsRef<str>) -> Option<PathBuf> {
    let path = strip_clone_suffix(clone, suffix)?;
    path.is_dir().then_some(path)
}

/// Locate the counterpart of a project, in whichever direction applies.
///
/// A clone resolves to its original, an original resolves to its clone.
/// Returns [`None`] when the counterpart directory cannot be found on disk.
pub fn counterpart_path_of(
    root: impl AsRef<Path>,
    suffix: impl AsRef<str>,
    marker: impl AsRef<Path>,
) -> Option<PathBuf> {
    if is_clone(root.as_ref(), marker) {
        original_path_of(root, suffix)
    } else {
        clone_path_of(root, suffix)
    }
}
