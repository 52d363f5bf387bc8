//! Input file discovery.
//!
//! [`discover`] lists a directory (non-recursively) and returns the video
//! files that pass a [`DiscoveryOptions`] extension filter, sorted by path so
//! that repeated scans of an unchanged directory line up positionally.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    fs,
    path::{Path, PathBuf},
};

use crate::configuration::DiscoveryOptions;
use crate::error::LightscanError;

/// One input video.
///
/// The label is the file name (`clip.mp4`); it names the series in plots and
/// is the stem of every output file written for it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VideoFileRef {
    path: PathBuf,
    label: String,
}

impl VideoFileRef {
    /// Reference a video by path. The label is the path's file name, or the
    /// whole path when it has none.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        let label = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self { path, label }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Display for VideoFileRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.path.display())
    }
}

/// Find the video files directly inside `directory`.
///
/// Symlinks are followed; subdirectories are not descended into. An empty
/// result is not an error.
///
/// # Errors
///
/// Returns [`LightscanError::PathError`] if `directory` does not exist, is
/// not a directory, or cannot be listed.
///
/// # Example
///
/// ```no_run
/// use lightscan::{DiscoveryOptions, discover};
///
/// let videos = discover("recordings", &DiscoveryOptions::new())?;
/// for video in &videos {
///     println!("{}", video.label());
/// }
/// # Ok::<(), lightscan::LightscanError>(())
/// ```
pub fn discover<P: AsRef<Path>>(
    directory: P,
    options: &DiscoveryOptions,
) -> Result<Vec<VideoFileRef>, LightscanError> {
    let directory = directory.as_ref();
    let path_error = |reason: String| LightscanError::PathError {
        path: directory.to_path_buf(),
        reason,
    };

    let metadata = fs::metadata(directory).map_err(|error| path_error(error.to_string()))?;
    if !metadata.is_dir() {
        return Err(path_error("not a directory".to_string()));
    }

    let mut paths = Vec::new();
    for entry in fs::read_dir(directory).map_err(|error| path_error(error.to_string()))? {
        let path = entry.map_err(|error| path_error(error.to_string()))?.path();

        let Some(extension) = path.extension().and_then(|extension| extension.to_str()) else {
            continue;
        };
        if !options.matches(extension) {
            continue;
        }

        // Broken symlinks and entries that vanish mid-listing are not videos.
        match fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => paths.push(path),
            Ok(_) => {}
            Err(error) => log::debug!("Skipping {}: {error}", path.display()),
        }
    }

    paths.sort();
    log::debug!(
        "Discovered {} video file(s) in {}",
        paths.len(),
        directory.display()
    );

    Ok(paths.into_iter().map(VideoFileRef::new).collect())
}

#[cfg(test)]
mod tests {
    use super::VideoFileRef;

    #[test]
    fn label_is_file_name() {
        let video = VideoFileRef::new("/data/session 1/clip.MP4");
        assert_eq!(video.label(), "clip.MP4");
    }

    #[test]
    fn label_falls_back_to_path() {
        let video = VideoFileRef::new("/");
        assert_eq!(video.label(), "/");
    }
}
