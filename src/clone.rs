// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Clone lifecycle orchestration.
//!
//! A __clone__ is a sibling directory of an original project that shares the
//! original's source-controlled folders through directory links, and carries
//! an independent copy of the regenerable library cache. Two editor
//! instances can then work on the same project in parallel, e.g., to run a
//! multiplayer session with a host and a client, without the clone paying
//! for a full asset reimport on first open.
//!
//! # Lifecycle
//!
//! There are exactly two states, original and clone, and the only signal
//! distinguishing them is the presence of the zero-byte marker file in the
//! clone's root. Creation drives the whole chain: derive the clone path by
//! naming convention, create the root, copy the cache folders with progress
//! reporting, link the remaining conventional folders, then register the
//! marker and collaboration ignore file. Deletion removes the entire clone
//! tree, and is only callable from the original's side. There is no promote
//! or re-sync transition.
//!
//! # Failure Semantics
//!
//! Precondition violations return typed errors before any filesystem
//! mutation. Once creation is underway there is no rollback: a cancelled
//! cache copy or a failed link leaves whatever was already created on disk,
//! and the operation reports the clone as unusable so the caller can delete
//! and retry.

pub mod copy;
pub mod link;

use crate::{
    clone::{
        copy::{copy_dir_with_progress, CopyObserver, CopyOutcome},
        link::{platform_linker, LinkMaker, PlatformLinker},
    },
    config::CloneSettings,
    project::{self, Project},
};

use std::{fs, path::{Path, PathBuf}};
use tracing::{info, instrument, warn};

/// Name of the ignore file written into a fresh clone.
///
/// Contains the single wildcard pattern `*` so that an external
/// collaboration tool ignores every file in the clone. Consumed by that
/// tool, never read back by Oxiclone.
pub const COLLAB_IGNORE_FILE: &str = "collabignore.txt";

/// A clone environment.
///
/// Bundles the injected [`CloneSettings`] with a platform [`LinkMaker`], and
/// exposes the two lifecycle transitions plus the resolution queries a
/// front-end needs to render state. No process-wide initialization happens
/// anywhere in here, two environments with different settings can coexist.
#[derive(Debug)]
pub struct CloneEnvironment<L = PlatformLinker>
where
    L: LinkMaker,
{
    settings: CloneSettings,
    linker: L,
}

impl CloneEnvironment<PlatformLinker> {
    /// Construct new clone environment with the host platform's link maker.
    pub fn host(settings: CloneSettings) -> Self {
        Self::new(settings, platform_linker())
    }
}

impl<L> CloneEnvironment<L>
where
    L: LinkMaker,
{
    /// Construct new clone environment from settings and a link maker.
    pub fn new(settings: CloneSettings, linker: L) -> Self {
        Self { settings, linker }
    }

    /// Settings this environment was built with.
    pub fn settings(&self) -> &CloneSettings {
        &self.settings
    }

    /// Check if the project at target root is a clone.
    pub fn is_clone(&self, root: impl AsRef<Path>) -> bool {
        project::is_clone(root, &self.settings.marker_file)
    }

    /// Locate the existing clone of an original project, if any.
    pub fn clone_path_of(&self, original: impl AsRef<Path>) -> Option<PathBuf> {
        project::clone_path_of(original, &self.settings.clone_suffix)
    }

    /// Locate the existing original of a clone project, if any.
    pub fn original_path_of(&self, clone: impl AsRef<Path>) -> Option<PathBuf> {
        project::original_path_of(clone, &self.settings.clone_suffix)
    }

    /// Locate the counterpart of a project, in whichever direction applies.
    pub fn counterpart_path_of(&self, root: impl AsRef<Path>) -> Option<PathBuf> {
        project::counterpart_path_of(
            root,
            &self.settings.clone_suffix,
            &self.settings.marker_file,
        )
    }

    /// Create a linked clone of the original project at target root.
    ///
    /// Creates the clone root, copies each configured cache folder with
    /// progress reported to the observer, links each configured
    /// source-controlled folder back into the original, then registers the
    /// clone with its marker and collaboration ignore file.
    ///
    /// # Errors
    ///
    /// - Return [`CloneError::SourceIsClone`] if the source project is
    ///   itself a clone. Clones of clones are not a thing.
    /// - Return [`CloneError::CloneAlreadyExists`] if a directory already
    ///   sits at the derived clone path.
    /// - Return [`CloneError::CopyCancelled`] if the observer cancelled a
    ///   cache copy. The partial tree is left in place and must be treated
    ///   as unusable.
    /// - Return [`CloneError::Copy`] or [`CloneError::Link`] if a cache copy
    ///   or folder link fails. No rollback of prior steps is attempted.
    #[instrument(skip(self, observer), level = "debug")]
    pub fn create_clone(
        &self,
        original_root: impl AsRef<Path> + std::fmt::Debug,
        observer: &mut impl CopyObserver,
    ) -> Result<Project> {
        let original_root = original_root.as_ref();
        if self.is_clone(original_root) {
            return Err(CloneError::SourceIsClone {
                path: original_root.to_path_buf(),
            });
        }

        let original = Project::new(original_root);
        let clone = Project::new(project::clone_root(
            original_root,
            &self.settings.clone_suffix,
        ));
        if clone.root().exists() {
            return Err(CloneError::CloneAlreadyExists {
                path: clone.root().to_path_buf(),
            });
        }

        info!("cloning project:\n{original}");
        info!("into:\n{clone}");

        mkdirp::mkdirp(clone.root()).map_err(|err| CloneError::CreateCloneRoot {
            source: err,
            path: clone.root().to_path_buf(),
        })?;

        for folder in &self.settings.copy_folders {
            let source = original.folder_path(folder);
            let destination = clone.folder_path(folder);

            if destination.exists() {
                warn!("cache copy: destination already exists: {:?}", destination.display());
                continue;
            }

            if !source.is_dir() {
                warn!("cache copy: source is missing: {:?}", source.display());
                continue;
            }

            info!("cache copy: {:?}", destination.display());
            if copy_dir_with_progress(&source, &destination, observer)? == CopyOutcome::Cancelled {
                return Err(CloneError::CopyCancelled {
                    path: clone.root().to_path_buf(),
                });
            }
        }

        for folder in &self.settings.link_folders {
            self.linker
                .link_dirs(&original.folder_path(folder), &clone.folder_path(folder))?;
        }

        self.register_clone(&clone)?;

        Ok(clone)
    }

    /// Delete the clone of the original project at target root.
    ///
    /// Only callable from the original's context. Returns the path of the
    /// deleted clone.
    ///
    /// # Errors
    ///
    /// - Return [`CloneError::SelfDelete`] if called from a clone's own
    ///   root. A clone cannot delete itself.
    /// - Return [`CloneError::NoCloneFound`] if no clone directory exists at
    ///   the derived path.
    /// - Return [`CloneError::DeleteGuard`] if the derived path fails the
    ///   misconfiguration guards: it must end with the clone suffix, and
    ///   must not be the original itself.
    /// - Return [`CloneError::DeleteCloneTree`] if recursive deletion fails.
    #[instrument(skip(self), level = "debug")]
    pub fn delete_clone(
        &self,
        original_root: impl AsRef<Path> + std::fmt::Debug,
    ) -> Result<PathBuf> {
        let original_root = original_root.as_ref();
        if self.is_clone(original_root) {
            return Err(CloneError::SelfDelete {
                path: original_root.to_path_buf(),
            });
        }

        let clone_path = self
            .clone_path_of(original_root)
            .ok_or_else(|| CloneError::NoCloneFound {
                path: original_root.to_path_buf(),
            })?;

        // INVARIANT: Never delete anything that is not suffix-named, and
        // never the original itself.
        let clone_name = clone_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        if clone_path == original_root || !clone_name.ends_with(&self.settings.clone_suffix) {
            return Err(CloneError::DeleteGuard { path: clone_path });
        }

        info!("deleting clone at {:?}", clone_path.display());
        fs::remove_dir_all(&clone_path).map_err(|err| CloneError::DeleteCloneTree {
            source: err,
            path: clone_path.clone(),
        })?;

        Ok(clone_path)
    }

    /// Register a freshly created clone.
    ///
    /// Writes the zero-byte marker file, and the collaboration ignore file
    /// containing the single wildcard pattern `*`.
    fn register_clone(&self, clone: &Project) -> Result<()> {
        let marker = clone.folder_path(&self.settings.marker_file);
        fs::File::create(&marker).map_err(|err| CloneError::RegisterClone {
            source: err,
            path: marker.clone(),
        })?;

        let ignore = clone.folder_path(COLLAB_IGNORE_FILE);
        fs::write(&ignore, "*").map_err(|err| CloneError::RegisterClone {
            source: err,
            path: ignore,
        })?;

        Ok(())
    }
}

/// Clone lifecycle error types.
#[derive(Debug, thiserror::Error)]
pub enum CloneError {
    /// Source project is already a clone.
    #[error("project at {:?} is already a clone, cannot clone it", path.display())]
    SourceIsClone { path: PathBuf },

    /// Derived clone directory already exists.
    #[error("clone already exists at {:?}", path.display())]
    CloneAlreadyExists { path: PathBuf },

    /// Clone root directory cannot be created.
    #[error("failed to create clone root at {:?}", path.display())]
    CreateCloneRoot {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Cache copy was cancelled, leaving a partial clone behind.
    #[error("cache copy cancelled, partial clone at {:?} is unusable", path.display())]
    CopyCancelled { path: PathBuf },

    /// Marker or ignore file cannot be written into the clone root.
    #[error("failed to register clone file at {:?}", path.display())]
    RegisterClone {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Clone attempted to delete itself.
    #[error("project at {:?} is a clone, it cannot delete itself", path.display())]
    SelfDelete { path: PathBuf },

    /// No clone directory exists for the original.
    #[error("no clone found for project at {:?}", path.display())]
    NoCloneFound { path: PathBuf },

    /// Derived deletion target failed the misconfiguration guards.
    #[error("refusing to delete {:?}, it does not look like a clone", path.display())]
    DeleteGuard { path: PathBuf },

    /// Recursive deletion of the clone tree failed.
    #[error("failed to delete clone tree at {:?}", path.display())]
    DeleteCloneTree {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Cache copy logic fails.
    #[error(transparent)]
    Copy(#[from] copy::CopyError),

    /// Folder link logic fails.
    #[error(transparent)]
    Link(#[from] link::LinkError),
}

/// Friendly result alias :3
pub type Result<T, E = CloneError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clone::copy::SilentObserver;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    fn environment() -> CloneEnvironment<link::UnsupportedLinker> {
        // Linkless settings so lifecycle guards can be exercised on any
        // platform without touching a link primitive.
        let settings = CloneSettings {
            link_folders: Vec::new(),
            ..CloneSettings::default()
        };

        CloneEnvironment::new(settings, link::UnsupportedLinker)
    }

    fn build_original() -> anyhow::Result<()> {
        fs::create_dir_all("space_game/Library/Artifacts")?;
        fs::write("space_game/Library/Artifacts/blob.bin", vec![7u8; 512])?;
        fs::create_dir("space_game/Assets")?;
        Ok(())
    }

    #[sealed_test]
    fn create_clone_registers_marker_and_ignore_file() -> anyhow::Result<()> {
        build_original()?;

        let env = environment();
        let clone = env.create_clone("space_game", &mut SilentObserver)?;

        assert_eq!(clone.root(), Path::new("space_game_clone"));
        assert_eq!(fs::metadata("space_game_clone/.clone")?.len(), 0);
        assert_eq!(
            fs::read_to_string("space_game_clone/collabignore.txt")?,
            "*"
        );
        assert_eq!(
            fs::read("space_game_clone/Library/Artifacts/blob.bin")?,
            vec![7u8; 512]
        );

        Ok(())
    }

    #[sealed_test]
    fn create_clone_refuses_cloning_a_clone() -> anyhow::Result<()> {
        build_original()?;

        let env = environment();
        env.create_clone("space_game", &mut SilentObserver)?;

        let result = env.create_clone("space_game_clone", &mut SilentObserver);
        assert!(matches!(result, Err(CloneError::SourceIsClone { .. })));

        Ok(())
    }

    #[sealed_test]
    fn create_clone_fails_fast_when_clone_exists() -> anyhow::Result<()> {
        build_original()?;
        fs::create_dir("space_game_clone")?;

        let env = environment();
        let result = env.create_clone("space_game", &mut SilentObserver);
        assert!(matches!(result, Err(CloneError::CloneAlreadyExists { .. })));

        Ok(())
    }

    #[sealed_test]
    fn delete_clone_removes_whole_tree() -> anyhow::Result<()> {
        build_original()?;

        let env = environment();
        env.create_clone("space_game", &mut SilentObserver)?;
        let deleted = env.delete_clone("space_game")?;

        assert_eq!(deleted, PathBuf::from("space_game_clone"));
        assert!(!Path::new("space_game_clone").exists());
        assert_eq!(env.clone_path_of("space_game"), None);

        Ok(())
    }

    #[sealed_test]
    fn delete_clone_refuses_self_delete() -> anyhow::Result<()> {
        build_original()?;

        let env = environment();
        env.create_clone("space_game", &mut SilentObserver)?;

        let result = env.delete_clone("space_game_clone");
        assert!(matches!(result, Err(CloneError::SelfDelete { .. })));
        assert!(Path::new("space_game_clone").exists());

        Ok(())
    }

    #[sealed_test]
    fn delete_clone_without_clone_is_an_error() -> anyhow::Result<()> {
        build_original()?;

        let env = environment();
        let result = env.delete_clone("space_game");
        assert!(matches!(result, Err(CloneError::NoCloneFound { .. })));

        Ok(())
    }

    #[sealed_test]
    fn cancelled_cache_copy_aborts_creation() -> anyhow::Result<()> {
        build_original()?;

        struct CancelEverything;
        impl CopyObserver for CancelEverything {
            fn progress(&mut self, _: u64, _: u64, _: &Path) -> copy::CopyFlow {
                copy::CopyFlow::Cancel
            }
        }

        let env = environment();
        let result = env.create_clone("space_game", &mut CancelEverything);

        assert!(matches!(result, Err(CloneError::CopyCancelled { .. })));
        // Partial tree is left in place, but never registered as a clone.
        assert!(Path::new("space_game_clone").exists());
        assert!(!Path::new("space_game_clone/.clone").exists());

        Ok(())
    }
}
