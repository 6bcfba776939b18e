// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Recursive directory copy with progress reporting.
//!
//! The library cache of a project is the one conventional folder that must
//! not be shared between an original and its clone, because two editor
//! instances writing into one cache corrupt it. So the cache gets a full
//! independent copy, and since caches easily run into gigabytes, the copy
//! reports fractional progress to an observer and honors cancellation.
//!
//! # Best-Effort Semantics
//!
//! The copy is best-effort, not all-or-nothing. A file that cannot be read,
//! typically because an editor instance holds it open, is skipped with a
//! warning while the rest of the tree continues. A cancelled or partially
//! failed copy leaves the destination present but incomplete. Callers must
//! treat such a tree as unusable, and either delete it or retry.

use indicatif::{ProgressBar, ProgressStyle};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, instrument, warn};
use walkdir::WalkDir;

/// Observer decision after a progress report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CopyFlow {
    /// Keep copying.
    #[default]
    Continue,

    /// Stop recursion immediately, leaving a partial tree behind.
    Cancel,
}

/// Terminal state of a copy operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Every file was visited, and the reported fraction reached 1.0.
    Completed,

    /// The observer requested cancellation mid-copy.
    Cancelled,
}

/// Observe fractional progress of a directory copy.
///
/// Polled once per file visited, never preemptively. The cumulative byte
/// count is monotonically non-decreasing, and equals the total on an
/// uncancelled run.
pub trait CopyObserver {
    /// Report cumulative progress after visiting one file.
    ///
    /// Return [`CopyFlow::Cancel`] to stop the copy at this point.
    fn progress(&mut self, copied_bytes: u64, total_bytes: u64, file: &Path) -> CopyFlow;
}

/// Copy observer that reports nothing and never cancels.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentObserver;

impl CopyObserver for SilentObserver {
    fn progress(&mut self, _: u64, _: u64, _: &Path) -> CopyFlow {
        CopyFlow::Continue
    }
}

/// Copy observer rendering an indicatif progress bar.
#[derive(Debug)]
pub struct BarObserver {
    bar: ProgressBar,
}

impl BarObserver {
    /// Construct new progress bar observer.
    ///
    /// # Errors
    ///
    /// - Return [`CopyError::IndicatifStyleTemplate`] if the style template
    ///   cannot be parsed.
    pub fn new(bar: ProgressBar) -> Result<Self> {
        let style = ProgressStyle::with_template(
            "{elapsed_precise:.green}  {msg:<50}  [{wide_bar:.yellow/blue}] {bytes}/{total_bytes}",
        )?
        .progress_chars("-Cco.");
        bar.set_style(style);

        Ok(Self { bar })
    }

    /// Finish and remove the progress bar from the terminal.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl CopyObserver for BarObserver {
    fn progress(&mut self, copied_bytes: u64, total_bytes: u64, file: &Path) -> CopyFlow {
        self.bar.set_length(total_bytes);
        self.bar.set_position(copied_bytes);
        if let Some(name) = file.file_name() {
            self.bar.set_message(name.to_string_lossy().into_owned());
        }

        CopyFlow::Continue
    }
}

/// Total byte size of all files under a directory, recursively.
///
/// # Errors
///
/// - Return [`CopyError::Walk`] if the directory tree cannot be traversed.
pub fn dir_size(path: impl AsRef<Path>) -> Result<u64> {
    let mut total = 0;
    for entry in WalkDir::new(path.as_ref()) {
        let entry = entry?;
        if entry.file_type().is_file() {
            total += entry.metadata()?.len();
        }
    }

    Ok(total)
}

/// Copy a directory tree, reporting fractional progress to an observer.
///
/// Creates destination directories as needed, preserving relative structure.
/// Total size is computed up front so that the observer receives meaningful
/// fractions from the first file onward. Unreadable files are skipped with a
/// warning, but still count toward progress so the fraction can reach 1.0.
///
/// # Errors
///
/// - Return [`CopyError::MissingSource`] if the source is not a directory.
/// - Return [`CopyError::SelfCopy`] if source and destination resolve to the
///   same absolute path. Nothing is created or modified in that case.
/// - Return [`CopyError::Walk`] if the upfront size computation fails.
/// - Return structured I/O errors if destination directories cannot be
///   created or the source cannot be enumerated.
#[instrument(skip(observer), level = "debug")]
pub fn copy_dir_with_progress(
    source: impl AsRef<Path> + std::fmt::Debug,
    destination: impl AsRef<Path> + std::fmt::Debug,
    observer: &mut impl CopyObserver,
) -> Result<CopyOutcome> {
    let source = source.as_ref();
    let destination = destination.as_ref();

    if !source.is_dir() {
        return Err(CopyError::MissingSource {
            path: source.to_path_buf(),
        });
    }

    // INVARIANT: Reject self-copy before any filesystem mutation.
    //   - A nonexistent destination cannot be the source, so only an
    //     existing destination needs the canonical comparison.
    if destination.exists() && canonical(source)? == canonical(destination)? {
        return Err(CopyError::SelfCopy {
            path: source.to_path_buf(),
        });
    }

    let total_bytes = dir_size(source)?;
    debug!(
        "copying {total_bytes} bytes from {:?} to {:?}",
        source.display(),
        destination.display()
    );

    let mut copied_bytes = 0;
    copy_tree(source, destination, total_bytes, &mut copied_bytes, observer)
}

fn copy_tree(
    source: &Path,
    destination: &Path,
    total_bytes: u64,
    copied_bytes: &mut u64,
    observer: &mut impl CopyObserver,
) -> Result<CopyOutcome> {
    fs::create_dir_all(destination).map_err(|err| CopyError::CreateDestDir {
        source: err,
        path: destination.to_path_buf(),
    })?;

    let entries = fs::read_dir(source).map_err(|err| CopyError::ReadSourceDir {
        source: err,
        path: source.to_path_buf(),
    })?;

    for entry in entries {
        let entry = entry.map_err(|err| CopyError::ReadSourceDir {
            source: err,
            path: source.to_path_buf(),
        })?;
        let entry_path = entry.path();
        let target_path = destination.join(entry.file_name());

        if entry_path.is_dir() {
            if copy_tree(&entry_path, &target_path, total_bytes, copied_bytes, observer)?
                == CopyOutcome::Cancelled
            {
                return Ok(CopyOutcome::Cancelled);
            }

            continue;
        }

        let file_size = entry.metadata().map(|data| data.len()).unwrap_or(0);
        if let Err(err) = fs::copy(&entry_path, &target_path) {
            // A file held open by a running editor instance lands here.
            warn!("skipping {:?}: {err}", entry_path.display());
        }

        // INVARIANT: Skipped files still count toward progress.
        *copied_bytes += file_size;
        if observer.progress(*copied_bytes, total_bytes, &entry_path) == CopyFlow::Cancel {
            warn!("copy cancelled, partial tree left at {:?}", destination.display());
            return Ok(CopyOutcome::Cancelled);
        }
    }

    Ok(CopyOutcome::Completed)
}

fn canonical(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path).map_err(|err| CopyError::Canonicalize {
        source: err,
        path: path.to_path_buf(),
    })
}

/// Directory copy error types.
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    /// Source directory is missing, or is not a directory at all.
    #[error("copy source {:?} is not a directory", path.display())]
    MissingSource { path: PathBuf },

    /// Directory cannot be copied into itself.
    #[error("cannot copy directory {:?} into itself", path.display())]
    SelfCopy { path: PathBuf },

    /// Absolute path resolution failed on source or destination.
    #[error("failed to resolve absolute path of {:?}", path.display())]
    Canonicalize {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Destination directory cannot be created.
    #[error("failed to create destination directory at {:?}", path.display())]
    CreateDestDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Source directory cannot be enumerated.
    #[error("failed to read source directory at {:?}", path.display())]
    ReadSourceDir {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Directory tree traversal failed while computing total size.
    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    /// Style template cannot be set for progress bars.
    #[error(transparent)]
    IndicatifStyleTemplate(#[from] indicatif::style::TemplateError),
}

/// Friendly result alias :3
pub type Result<T, E = CopyError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    /// Records every reported fraction, cancelling after a set file count.
    struct RecordingObserver {
        fractions: Vec<(u64, u64)>,
        cancel_after: Option<usize>,
    }

    impl RecordingObserver {
        fn new() -> Self {
            Self {
                fractions: Vec::new(),
                cancel_after: None,
            }
        }

        fn cancel_after(count: usize) -> Self {
            Self {
                fractions: Vec::new(),
                cancel_after: Some(count),
            }
        }
    }

    impl CopyObserver for RecordingObserver {
        fn progress(&mut self, copied_bytes: u64, total_bytes: u64, _: &Path) -> CopyFlow {
            self.fractions.push((copied_bytes, total_bytes));
            match self.cancel_after {
                Some(count) if self.fractions.len() >= count => CopyFlow::Cancel,
                _ => CopyFlow::Continue,
            }
        }
    }

    fn build_source_tree() -> anyhow::Result<()> {
        fs::create_dir_all("source/nested/deeper")?;
        fs::write("source/one.bin", vec![1u8; 64])?;
        fs::write("source/nested/two.bin", vec![2u8; 128])?;
        fs::write("source/nested/deeper/three.bin", vec![3u8; 256])?;
        Ok(())
    }

    #[sealed_test]
    fn copy_preserves_relative_structure_and_contents() -> anyhow::Result<()> {
        build_source_tree()?;

        let mut observer = RecordingObserver::new();
        let outcome = copy_dir_with_progress("source", "target", &mut observer)?;

        assert_eq!(outcome, CopyOutcome::Completed);
        assert_eq!(fs::read("target/one.bin")?, vec![1u8; 64]);
        assert_eq!(fs::read("target/nested/two.bin")?, vec![2u8; 128]);
        assert_eq!(fs::read("target/nested/deeper/three.bin")?, vec![3u8; 256]);

        Ok(())
    }

    #[sealed_test]
    fn progress_is_monotonic_and_ends_at_total() -> anyhow::Result<()> {
        build_source_tree()?;

        let mut observer = RecordingObserver::new();
        copy_dir_with_progress("source", "target", &mut observer)?;

        assert_eq!(observer.fractions.len(), 3);
        let mut last = 0;
        for (copied, total) in &observer.fractions {
            assert!(*copied >= last, "progress went backwards");
            assert_eq!(*total, 64 + 128 + 256);
            last = *copied;
        }
        assert_eq!(last, 64 + 128 + 256);

        Ok(())
    }

    #[sealed_test]
    fn copy_into_itself_is_rejected_without_mutation() -> anyhow::Result<()> {
        build_source_tree()?;

        let mut observer = RecordingObserver::new();
        let result = copy_dir_with_progress("source", "source", &mut observer);

        assert!(matches!(result, Err(CopyError::SelfCopy { .. })));
        assert!(observer.fractions.is_empty());
        assert_eq!(fs::read_dir("source")?.count(), 2);

        Ok(())
    }

    #[sealed_test]
    fn cancellation_stops_recursion_but_keeps_copied_files() -> anyhow::Result<()> {
        build_source_tree()?;

        let mut observer = RecordingObserver::cancel_after(1);
        let outcome = copy_dir_with_progress("source", "target", &mut observer)?;

        assert_eq!(outcome, CopyOutcome::Cancelled);
        assert_eq!(observer.fractions.len(), 1);

        // Exactly one file survived, and it is byte-identical to its source.
        let copied: Vec<_> = WalkDir::new("target")
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .collect();
        assert_eq!(copied.len(), 1);

        let relative = copied[0].path().strip_prefix("target")?;
        assert_eq!(
            fs::read(copied[0].path())?,
            fs::read(Path::new("source").join(relative))?
        );

        Ok(())
    }

    #[sealed_test]
    fn missing_source_is_a_precondition_error() {
        let mut observer = RecordingObserver::new();
        let result = copy_dir_with_progress("nowhere", "target", &mut observer);

        assert!(matches!(result, Err(CopyError::MissingSource { .. })));
        assert!(!Path::new("target").exists());
    }

    #[sealed_test]
    fn dir_size_sums_nested_files() -> anyhow::Result<()> {
        build_source_tree()?;
        assert_eq!(dir_size("source")?, 64 + 128 + 256);
        Ok(())
    }
}
