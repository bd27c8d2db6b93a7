use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use image::imageops::FilterType;

use crate::cache::store::ContainerStore;
use crate::foundation::core::Fps;
use crate::foundation::error::{ReelError, ReelResult};
use crate::foundation::fingerprint::ContentId;
use crate::frame::packed::Frame;
use crate::frame::palette::quantize_rgb8;
use crate::source::FrameSource;

/// Frames decoded from a video file through the system `ffmpeg`.
///
/// Decoding writes one numbered PNG per output frame into a temporary directory, resampled to
/// the target fps and resolution. When the frame cache already holds this video at this
/// resolution, decoding is deferred until a frame is actually requested.
pub struct VideoSource {
    video_path: PathBuf,
    width: u32,
    height: u32,
    fps: Fps,
    identity: String,
    decoded: Option<DecodedFrames>,
    cursor: usize,
}

struct DecodedFrames {
    // Keeps the PNG directory alive for the lifetime of the source.
    _dir: tempfile::TempDir,
    paths: Vec<PathBuf>,
}

impl VideoSource {
    /// Open `video_path` for playback at `width` x `height` and `fps`.
    ///
    /// With a `store` that already holds a matching container, `ffmpeg` is not run here.
    #[tracing::instrument(skip_all, fields(path = %video_path.as_ref().display(), width = width, height = height))]
    pub fn open(
        video_path: impl AsRef<Path>,
        width: u32,
        height: u32,
        fps: Fps,
        store: Option<&ContainerStore>,
    ) -> ReelResult<Self> {
        if width == 0 || height == 0 {
            return Err(ReelError::InvalidDimensions { width, height });
        }
        let video_path = video_path.as_ref().to_path_buf();
        let identity = video_identity(&video_path, fps)?;

        let mut source = Self {
            video_path,
            width,
            height,
            fps,
            identity,
            decoded: None,
            cursor: 0,
        };

        if store.is_some_and(|s| s.exists(width, height, &source.identity)) {
            tracing::info!("frame cache present; deferring video decode");
        } else {
            source.ensure_decoded()?;
        }
        Ok(source)
    }

    /// Whether `ffmpeg` has already been run for this source.
    pub fn is_decoded(&self) -> bool {
        self.decoded.is_some()
    }

    fn ensure_decoded(&mut self) -> ReelResult<&DecodedFrames> {
        if self.decoded.is_none() {
            let decoded = self.decode()?;
            self.decoded = Some(decoded);
        }
        self.decoded
            .as_ref()
            .ok_or_else(|| ReelError::source("video decode produced no state"))
    }

    fn decode(&self) -> ReelResult<DecodedFrames> {
        if !is_ffmpeg_on_path() {
            return Err(ReelError::source(
                "ffmpeg is required for video playback, but was not found on PATH",
            ));
        }

        let dir = tempfile::Builder::new()
            .prefix("blockreel-frames-")
            .tempdir()?;
        tracing::info!(
            out_dir = %dir.path().display(),
            width = self.width,
            height = self.height,
            fps = self.fps.as_f64(),
            "decoding video frames"
        );

        let out = Command::new("ffmpeg")
            .args(["-v", "error", "-nostdin", "-y", "-i"])
            .arg(&self.video_path)
            .args([
                "-vf",
                &format!(
                    "fps={}/{},scale={}:{}",
                    self.fps.num, self.fps.den, self.width, self.height
                ),
                "-c:v",
                "png",
            ])
            .arg(dir.path().join("%08d.png"))
            .stdout(Stdio::null())
            .output()
            .map_err(|e| ReelError::source(format!("failed to run ffmpeg: {e}")))?;
        if !out.status.success() {
            return Err(ReelError::source(format!(
                "ffmpeg failed for '{}': {}",
                self.video_path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }

        let mut paths = std::fs::read_dir(dir.path())?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()?;
        paths.retain(|p| p.extension().is_some_and(|ext| ext == "png"));
        paths.sort();

        tracing::info!(frames = paths.len(), "video decoded");
        Ok(DecodedFrames { _dir: dir, paths })
    }

    fn load_frame(&self, path: &Path) -> ReelResult<Frame> {
        let img = image::open(path)
            .map_err(|e| ReelError::source(format!("failed to decode '{}': {e}", path.display())))?
            .to_rgb8();
        let img = if img.dimensions() == (self.width, self.height) {
            img
        } else {
            image::imageops::resize(&img, self.width, self.height, FilterType::Triangle)
        };
        let colors = quantize_rgb8(img.as_raw())?;
        Frame::from_colors(self.width, self.height, &colors)
    }
}

impl FrameSource for VideoSource {
    fn has_next(&mut self) -> ReelResult<bool> {
        let cursor = self.cursor;
        Ok(cursor < self.ensure_decoded()?.paths.len())
    }

    fn next_frame(&mut self) -> ReelResult<Frame> {
        let cursor = self.cursor;
        let path = self
            .ensure_decoded()?
            .paths
            .get(cursor)
            .cloned()
            .ok_or_else(|| ReelError::source("video source is exhausted"))?;
        let frame = self.load_frame(&path)?;
        self.cursor += 1;
        Ok(frame)
    }

    fn reset(&mut self) {
        self.cursor = 0;
    }

    fn advance(&mut self, count: u64) -> ReelResult<u64> {
        let cursor = self.cursor;
        let remaining = self.ensure_decoded()?.paths.len().saturating_sub(cursor);
        let skipped = usize::try_from(count).unwrap_or(usize::MAX).min(remaining);
        self.cursor += skipped;
        Ok(skipped as u64)
    }

    fn identity(&self) -> ReelResult<String> {
        Ok(self.identity.clone())
    }
}

/// Digest of the video file bytes followed by the target frame rate.
pub fn video_identity(path: &Path, fps: Fps) -> ReelResult<String> {
    let file = File::open(path).map_err(|e| {
        ReelError::source(format!("failed to open video '{}': {e}", path.display()))
    })?;
    let mut id = ContentId::new();
    id.write_reader(std::io::BufReader::new(file))?
        .write_u32(fps.num)
        .write_u32(fps.den);
    Ok(id.finish())
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::container::FrameContainer;

    #[test]
    fn identity_covers_bytes_and_fps() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.mp4");
        let b = dir.path().join("b.mp4");
        std::fs::write(&a, b"not really a video").unwrap();
        std::fs::write(&b, b"not really a video").unwrap();

        let fps30 = Fps::whole(30).unwrap();
        let fps60 = Fps::whole(60).unwrap();
        assert_eq!(
            video_identity(&a, fps30).unwrap(),
            video_identity(&b, fps30).unwrap()
        );
        assert_ne!(
            video_identity(&a, fps30).unwrap(),
            video_identity(&a, fps60).unwrap()
        );
    }

    #[test]
    fn missing_video_is_a_source_error() {
        let err = video_identity(Path::new("/definitely/not/here.mp4"), Fps::default());
        assert!(matches!(err, Err(ReelError::Source(_))));
    }

    #[test]
    fn cached_video_defers_decode() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("clip.mp4");
        std::fs::write(&video, b"bytes").unwrap();
        let fps = Fps::whole(24).unwrap();

        let store = ContainerStore::new(dir.path().join("cache"));
        let id = video_identity(&video, fps).unwrap();
        FrameContainer::build(id, vec![Frame::blank(4, 2).unwrap()])
            .unwrap()
            .save(&store)
            .unwrap();

        let src = VideoSource::open(&video, 4, 2, fps, Some(&store)).unwrap();
        assert!(!src.is_decoded());
        assert_eq!(src.identity().unwrap(), video_identity(&video, fps).unwrap());
    }
}
