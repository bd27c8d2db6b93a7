use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::cache::container::FrameContainer;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::fingerprint::is_valid_identifier;
use crate::frame::packed::Frame;

/// File extension of cache files.
pub const CONTAINER_EXT: &str = "afc";

/// Directory holding frame-cache files.
///
/// A file's path is a pure function of `(width, height, identifier)`:
/// `<root>/<width>x<height>-<identifier>.afc`. The file body is every frame's packed bytes
/// concatenated in display order, with no header.
#[derive(Clone, Debug)]
pub struct ContainerStore {
    root: PathBuf,
}

impl ContainerStore {
    /// Store rooted at `root`. The directory is created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted in the OS temporary directory.
    pub fn in_temp_dir() -> Self {
        Self::new(std::env::temp_dir())
    }

    /// Directory holding the cache files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Cache file path for `(width, height, identifier)`.
    pub fn path_for(&self, width: u32, height: u32, identifier: &str) -> PathBuf {
        self.root
            .join(format!("{width}x{height}-{identifier}.{CONTAINER_EXT}"))
    }

    /// Whether a cache file exists for the key. Invalid identifiers never exist.
    pub fn exists(&self, width: u32, height: u32, identifier: &str) -> bool {
        is_valid_identifier(identifier) && self.path_for(width, height, identifier).is_file()
    }

    /// Write `container`, replacing any existing file at its path.
    ///
    /// The body goes to a temporary file in the same directory first and is renamed into place,
    /// so a reader never observes a half-written cache file.
    pub fn save(&self, container: &FrameContainer) -> ReelResult<PathBuf> {
        check_identifier(container.identifier())?;
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create cache directory '{}'", self.root.display()))?;

        let path = self.path_for(
            container.width(),
            container.height(),
            container.identifier(),
        );
        let tmp = tempfile::NamedTempFile::new_in(&self.root)?;
        {
            let mut w = BufWriter::new(tmp.as_file());
            for frame in container.frames() {
                w.write_all(frame.as_bytes())?;
            }
            w.flush()?;
        }
        tmp.persist(&path).map_err(|e| {
            anyhow::Error::new(e.error)
                .context(format!("failed to write container '{}'", path.display()))
        })?;

        tracing::info!(
            path = %path.display(),
            frames = container.len(),
            bytes = container.len() * container.frame_size(),
            "saved frame container"
        );
        Ok(path)
    }

    /// Read back the container for `(width, height, identifier)`.
    ///
    /// Returns `Ok(None)` when no file exists. A file shorter than one frame is
    /// [`ReelError::CorruptContainer`]; a partial trailing frame is dropped.
    pub fn load(
        &self,
        width: u32,
        height: u32,
        identifier: &str,
    ) -> ReelResult<Option<FrameContainer>> {
        check_identifier(identifier)?;
        if width == 0 || height == 0 {
            return Err(ReelError::InvalidDimensions { width, height });
        }

        let path = self.path_for(width, height, identifier);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "frame container does not exist");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let frame_size = Frame::packed_len(width, height);
        if bytes.len() < frame_size {
            return Err(ReelError::corrupt(
                &path,
                format!(
                    "{} bytes is less than one {width}x{height} frame ({frame_size} bytes)",
                    bytes.len()
                ),
            ));
        }

        let tail = bytes.len() % frame_size;
        if tail != 0 {
            tracing::warn!(
                path = %path.display(),
                trailing_bytes = tail,
                "ignoring partial trailing frame in container"
            );
        }

        let frames = bytes
            .chunks_exact(frame_size)
            .map(|chunk| Frame::from_packed(width, height, chunk.to_vec()))
            .collect::<ReelResult<Vec<_>>>()?;

        tracing::info!(path = %path.display(), frames = frames.len(), "loaded frame container");
        FrameContainer::build(identifier, frames).map(Some)
    }
}

impl Default for ContainerStore {
    fn default() -> Self {
        Self::in_temp_dir()
    }
}

fn check_identifier(identifier: &str) -> ReelResult<()> {
    if !is_valid_identifier(identifier) {
        return Err(ReelError::validation(format!(
            "container identifier '{identifier}' must be 1-128 chars of [A-Za-z0-9_-]"
        )));
    }
    Ok(())
}
