// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Directory link creation.
//!
//! The source-controlled folders of a clone are not copies. They are
//! filesystem links pointing back into the original, so the original and the
//! clone always see the exact same assets, settings, and packages. How such a
//! link gets created is the one genuinely platform-specific piece of this
//! crate, so it hides behind the [`LinkMaker`] capability trait with one
//! implementation per host platform family.
//!
//! Link creation goes through the platform's native filesystem API rather
//! than shelling out to `mklink` or `ln -s`. That removes an entire class of
//! argument-escaping and stderr-parsing problems, and failures surface as
//! typed [`std::io::Error`] values instead of opaque console output.
//!
//! On Windows, linking a directory with [`std::os::windows::fs::symlink_dir`]
//! requires either Developer Mode or elevation. That is a documented platform
//! restriction, not something this crate can paper over.

use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Create directory links, platform-specifically.
///
/// Implementations provide the raw link primitive. Precondition handling is
/// shared across platforms through [`LinkMaker::link_dirs`].
pub trait LinkMaker {
    /// Name of the platform family this link maker serves.
    fn name(&self) -> &'static str;

    /// Create a directory link at `destination` resolving into `source`.
    ///
    /// # Errors
    ///
    /// - Return [`LinkError::UnsupportedPlatform`] if the host platform has
    ///   no link primitive.
    /// - Return [`LinkError::CreateLink`] if the platform API fails.
    fn symlink_dir(&self, source: &Path, destination: &Path) -> Result<()>;

    /// Link a folder with precondition checks.
    ///
    /// The destination must not exist and the source must exist. Violating
    /// either precondition skips the link with a warning instead of failing,
    /// so a partially linked clone can be re-driven without errors.
    fn link_dirs(&self, source: &Path, destination: &Path) -> Result<()> {
        if destination.exists() {
            warn!("skipping link, it already exists: {:?}", destination.display());
            return Ok(());
        }

        if !source.is_dir() {
            warn!("skipping link, source is missing: {:?}", source.display());
            return Ok(());
        }

        info!(
            "linking {:?} -> {:?}",
            destination.display(),
            source.display()
        );

        self.symlink_dir(source, destination)
    }
}

/// Link maker for the Unix platform family, macOS included.
#[cfg(unix)]
#[derive(Clone, Copy, Debug, Default)]
pub struct UnixLinker;

#[cfg(unix)]
impl LinkMaker for UnixLinker {
    fn name(&self) -> &'static str {
        "unix"
    }

    fn symlink_dir(&self, source: &Path, destination: &Path) -> Result<()> {
        std::os::unix::fs::symlink(source, destination).map_err(|err| LinkError::CreateLink {
            source: err,
            destination: destination.to_path_buf(),
        })
    }
}

/// Link maker for the Windows platform family.
#[cfg(windows)]
#[derive(Clone, Copy, Debug, Default)]
pub struct WindowsLinker;

#[cfg(windows)]
impl LinkMaker for WindowsLinker {
    fn name(&self) -> &'static str {
        "windows"
    }

    fn symlink_dir(&self, source: &Path, destination: &Path) -> Result<()> {
        std::os::windows::fs::symlink_dir(source, destination).map_err(|err| {
            LinkError::CreateLink {
                source: err,
                destination: destination.to_path_buf(),
            }
        })
    }
}

/// Link maker for platforms without a known link primitive.
///
/// Every link attempt fails with an explicit unsupported-platform error.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnsupportedLinker;

impl LinkMaker for UnsupportedLinker {
    fn name(&self) -> &'static str {
        "unsupported"
    }

    fn symlink_dir(&self, _: &Path, _: &Path) -> Result<()> {
        Err(LinkError::UnsupportedPlatform)
    }
}

/// Link maker matching the host platform family.
#[cfg(unix)]
pub type PlatformLinker = UnixLinker;

/// Link maker matching the host platform family.
#[cfg(windows)]
pub type PlatformLinker = WindowsLinker;

/// Link maker matching the host platform family.
#[cfg(not(any(unix, windows)))]
pub type PlatformLinker = UnsupportedLinker;

/// Detect the host platform and hand out its link maker.
pub fn platform_linker() -> PlatformLinker {
    PlatformLinker::default()
}

/// Link creation error types.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// Host platform has no known directory link primitive.
    #[error("directory links are not supported on this platform")]
    UnsupportedPlatform,

    /// Platform link API failed.
    #[error("failed to create directory link at {:?}", destination.display())]
    CreateLink {
        #[source]
        source: std::io::Error,
        destination: PathBuf,
    },
}

/// Friendly result alias :3
pub type Result<T, E = LinkError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;
    use std::fs;

    #[cfg(unix)]
    #[sealed_test]
    fn link_resolves_into_source_contents() -> anyhow::Result<()> {
        fs::create_dir("original")?;
        fs::write("original/scene.meta", "guid")?;

        UnixLinker.link_dirs(Path::new("original"), Path::new("linked"))?;

        assert!(fs::symlink_metadata("linked")?.file_type().is_symlink());
        assert_eq!(fs::read_to_string("linked/scene.meta")?, "guid");

        Ok(())
    }

    #[cfg(unix)]
    #[sealed_test]
    fn existing_destination_is_skipped_without_error() -> anyhow::Result<()> {
        fs::create_dir("original")?;
        fs::create_dir("linked")?;

        UnixLinker.link_dirs(Path::new("original"), Path::new("linked"))?;

        // Still a plain directory, no link was layered on top.
        assert!(!fs::symlink_metadata("linked")?.file_type().is_symlink());

        Ok(())
    }

    #[cfg(unix)]
    #[sealed_test]
    fn missing_source_is_skipped_without_error() -> anyhow::Result<()> {
        UnixLinker.link_dirs(Path::new("nowhere"), Path::new("linked"))?;
        assert!(!Path::new("linked").exists());
        Ok(())
    }

    #[sealed_test]
    fn unsupported_platform_fails_explicitly() -> anyhow::Result<()> {
        fs::create_dir("original")?;

        let result = UnsupportedLinker.link_dirs(Path::new("original"), Path::new("linked"));

        assert!(matches!(result, Err(LinkError::UnsupportedPlatform)));
        assert!(!Path::new("linked").exists());

        Ok(())
    }
}
