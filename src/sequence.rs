//! Frame file discovery and numeric ordering.
//!
//! Frames are files named `<number>.<ext>` (`0.png`, `1.png`, ...). The
//! sequence is ordered by that number, not lexicographically, so `2.png`
//! comes before `10.png`.
//!
//! # Example
//!
//! ```no_run
//! use framereel::{AssembleOptions, FrameSequence};
//!
//! let sequence = FrameSequence::collect("frames", &AssembleOptions::new())?;
//! for entry in sequence.iter() {
//!     println!("{} -> {}", entry.index, entry.path.display());
//! }
//! # Ok::<(), framereel::FramereelError>(())
//! ```

use std::collections::HashMap;
use std::fs;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use crate::configuration::{AssembleOptions, MalformedNamePolicy};
use crate::error::FramereelError;

/// One frame file and the number parsed from its name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameEntry {
    /// Frame number taken from the file name.
    pub index: u64,
    /// Full path of the frame file.
    pub path: PathBuf,
}

/// Frame files of a directory in ascending frame-number order.
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct FrameSequence {
    entries: Vec<FrameEntry>,
}

impl FrameSequence {
    /// List `directory`, keep files with the configured extension, and sort
    /// them by frame number.
    ///
    /// # Errors
    ///
    /// - [`FramereelError::DirectoryRead`] if the directory cannot be listed.
    /// - [`FramereelError::MalformedFrameName`] for a non-numeric name under
    ///   [`MalformedNamePolicy::Reject`].
    /// - [`FramereelError::FrameIndexOutOfRange`] for a numeric name above
    ///   `u64::MAX` under [`MalformedNamePolicy::Reject`].
    /// - [`FramereelError::DuplicateFrameIndex`] if two files share a number.
    pub fn collect<P: AsRef<Path>>(
        directory: P,
        options: &AssembleOptions,
    ) -> Result<Self, FramereelError> {
        let directory = directory.as_ref();
        let read_error = |error: std::io::Error| FramereelError::DirectoryRead {
            path: directory.to_path_buf(),
            reason: error.to_string(),
        };

        let mut paths = Vec::new();
        for entry in fs::read_dir(directory).map_err(read_error)? {
            let path = entry.map_err(read_error)?.path();
            if path.is_file() && has_extension(&path, &options.extension) {
                paths.push(path);
            }
        }
        log::debug!(
            "Found {} *.{} files in {:?}",
            paths.len(),
            options.extension,
            directory,
        );

        Self::from_paths(paths, options.malformed_names)
    }

    /// Build a sequence from an explicit list of paths.
    ///
    /// No extension filtering happens here; every path must carry a frame
    /// number unless `policy` is [`MalformedNamePolicy::Skip`].
    pub fn from_paths<I>(paths: I, policy: MalformedNamePolicy) -> Result<Self, FramereelError>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut seen: HashMap<u64, PathBuf> = HashMap::new();
        let mut entries = Vec::new();

        for path in paths {
            let Some(index) = parse_frame_index(&path) else {
                let oversized = frame_stem(&path).is_some_and(is_digits);
                match (policy, oversized) {
                    (MalformedNamePolicy::Reject, true) => {
                        return Err(FramereelError::FrameIndexOutOfRange { path });
                    }
                    (MalformedNamePolicy::Reject, false) => {
                        return Err(FramereelError::MalformedFrameName { path });
                    }
                    (MalformedNamePolicy::Skip, true) => {
                        log::warn!("Skipping {path:?}: frame number does not fit in 64 bits");
                        continue;
                    }
                    (MalformedNamePolicy::Skip, false) => {
                        log::warn!("Skipping {path:?}: name does not start with a frame number");
                        continue;
                    }
                }
            };

            if let Some(first) = seen.get(&index) {
                return Err(FramereelError::DuplicateFrameIndex {
                    index,
                    first: first.clone(),
                    second: path,
                });
            }
            seen.insert(index, path.clone());
            entries.push(FrameEntry { index, path });
        }

        entries.sort_by_key(|entry| entry.index);
        Ok(Self { entries })
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` if no frame matched.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the frames in order.
    pub fn iter(&self) -> std::slice::Iter<'_, FrameEntry> {
        self.entries.iter()
    }

    /// Runs of frame numbers missing between the first and last frame.
    ///
    /// Gaps do not stop assembly; the video simply has fewer frames. Each run
    /// is reported as one range, so sparse numbering stays cheap.
    pub fn gaps(&self) -> Vec<RangeInclusive<u64>> {
        self.entries
            .windows(2)
            .filter(|pair| pair[1].index - pair[0].index > 1)
            .map(|pair| pair[0].index + 1..=pair[1].index - 1)
            .collect()
    }

    /// Total count of missing frame numbers across all gaps.
    pub fn missing_frames(&self) -> u64 {
        self.entries
            .windows(2)
            .map(|pair| pair[1].index - pair[0].index - 1)
            .fold(0, u64::saturating_add)
    }
}

impl<'a> IntoIterator for &'a FrameSequence {
    type Item = &'a FrameEntry;
    type IntoIter = std::slice::Iter<'a, FrameEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Parse the frame number of a file: the part of its name before the first
/// `.`, as an unsigned integer. Leading zeros are accepted.
///
/// Frame numbers are bounded by `u64::MAX`; a longer run of digits yields
/// `None` here and [`FramereelError::FrameIndexOutOfRange`] when collected.
///
/// ```
/// use std::path::Path;
///
/// use framereel::parse_frame_index;
///
/// assert_eq!(parse_frame_index(Path::new("frames/12.png")), Some(12));
/// assert_eq!(parse_frame_index(Path::new("007.png")), Some(7));
/// assert_eq!(parse_frame_index(Path::new("frame_a.png")), None);
/// ```
pub fn parse_frame_index(path: &Path) -> Option<u64> {
    frame_stem(path).filter(|stem| is_digits(stem))?.parse().ok()
}

fn frame_stem(path: &Path) -> Option<&str> {
    path.file_name()?.to_str()?.split('.').next()
}

fn is_digits(stem: &str) -> bool {
    !stem.is_empty() && stem.bytes().all(|b| b.is_ascii_digit())
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}
