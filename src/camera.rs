//! Still-image capture.
//!
//! A [`CameraDevice`] hands out a live [`CameraStream`]; callers hold it through
//! a [`CameraSession`] which stops every track when dropped, so a device is
//! never left held after a capture is completed or abandoned.

use std::path::PathBuf;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_JPEG_QUALITY: u8 = 80;

const JPEG_SOI: [u8; 3] = [0xFF, 0xD8, 0xFF];

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera unavailable: {0}")]
    Unavailable(String),
    #[error("capture failed: {0}")]
    Capture(String),
    #[error("image is not a JPEG")]
    NotJpeg,
    #[error("invalid base64 image payload")]
    InvalidBase64,
}

/// An encoded still frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    jpeg: Bytes,
}

impl CapturedImage {
    pub fn from_jpeg(jpeg: Bytes) -> Result<Self, CameraError> {
        if !jpeg.starts_with(&JPEG_SOI) {
            return Err(CameraError::NotJpeg);
        }
        Ok(Self { jpeg })
    }

    /// Accepts bare base64 or a `data:image/jpeg;base64,` URL.
    pub fn from_base64(payload: &str) -> Result<Self, CameraError> {
        let data = payload
            .trim()
            .split_once("base64,")
            .map(|(_, rest)| rest)
            .unwrap_or_else(|| payload.trim());
        let raw = STANDARD
            .decode(data)
            .map_err(|_| CameraError::InvalidBase64)?;
        Self::from_jpeg(Bytes::from(raw))
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.jpeg)
    }

    pub(crate) fn len(&self) -> usize {
        self.jpeg.len()
    }
}

#[async_trait]
pub trait CameraStream: Send {
    async fn capture_still(&mut self, quality: u8) -> Result<CapturedImage, CameraError>;
    /// Stops all underlying tracks. Must be idempotent.
    fn stop(&mut self);
}

#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Opens an environment-facing video stream.
    async fn open(&self) -> Result<Box<dyn CameraStream>, CameraError>;
}

pub struct CameraSession {
    stream: Box<dyn CameraStream>,
}

impl CameraSession {
    pub async fn acquire(device: &dyn CameraDevice) -> Result<Self, CameraError> {
        let stream = device.open().await?;
        Ok(Self { stream })
    }

    pub async fn capture_still(&mut self, quality: u8) -> Result<CapturedImage, CameraError> {
        self.stream.capture_still(quality).await
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.stream.stop();
        debug!("camera session released");
    }
}

/// Acquire, take one still, release.
pub async fn capture_once(
    device: &dyn CameraDevice,
    quality: u8,
) -> Result<CapturedImage, CameraError> {
    let mut session = CameraSession::acquire(device).await.map_err(|e| {
        warn!(error = %e, "camera acquisition failed");
        e
    })?;
    session.capture_still(quality).await
}

/// Used when no capture device is configured.
pub struct NoCamera;

#[async_trait]
impl CameraDevice for NoCamera {
    async fn open(&self) -> Result<Box<dyn CameraStream>, CameraError> {
        Err(CameraError::Unavailable("no camera configured".into()))
    }
}

/// Reads stills that an external capture daemon keeps writing to one path.
/// The daemon owns encoding, so `quality` is advisory here.
pub struct SnapshotCamera {
    path: PathBuf,
}

impl SnapshotCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

struct SnapshotStream {
    path: PathBuf,
    live: bool,
}

#[async_trait]
impl CameraDevice for SnapshotCamera {
    async fn open(&self) -> Result<Box<dyn CameraStream>, CameraError> {
        tokio::fs::metadata(&self.path).await.map_err(|e| {
            CameraError::Unavailable(format!("{}: {e}", self.path.display()))
        })?;
        Ok(Box::new(SnapshotStream {
            path: self.path.clone(),
            live: true,
        }))
    }
}

#[async_trait]
impl CameraStream for SnapshotStream {
    async fn capture_still(&mut self, quality: u8) -> Result<CapturedImage, CameraError> {
        if !self.live {
            return Err(CameraError::Capture("stream already stopped".into()));
        }
        debug!(path = %self.path.display(), quality, "reading snapshot");
        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|e| CameraError::Capture(e.to_string()))?;
        CapturedImage::from_jpeg(Bytes::from(raw))
    }

    fn stop(&mut self) {
        self.live = false;
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::{FakeCamera, TINY_JPEG};
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn rejects_non_jpeg_bytes() {
        let png = Bytes::from_static(&[0x89, b'P', b'N', b'G']);
        assert!(matches!(CapturedImage::from_jpeg(png), Err(CameraError::NotJpeg)));
    }

    #[test]
    fn base64_accepts_data_urls() {
        let img = CapturedImage::from_jpeg(Bytes::from_static(TINY_JPEG)).unwrap();
        let b64 = img.to_base64();
        assert_eq!(CapturedImage::from_base64(&b64).unwrap(), img);
        let url = format!("data:image/jpeg;base64,{b64}");
        assert_eq!(CapturedImage::from_base64(&url).unwrap(), img);
        assert!(matches!(
            CapturedImage::from_base64("%%%"),
            Err(CameraError::InvalidBase64)
        ));
    }

    #[tokio::test]
    async fn capture_once_releases_the_stream() {
        let camera = FakeCamera::default();
        let img = capture_once(&camera, DEFAULT_JPEG_QUALITY).await.unwrap();
        assert_eq!(img.len(), TINY_JPEG.len());
        assert_eq!(camera.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn abandoned_session_is_released() {
        let camera = FakeCamera::default();
        {
            let _session = CameraSession::acquire(&camera).await.unwrap();
        }
        assert_eq!(camera.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn no_camera_is_unavailable() {
        assert!(matches!(
            capture_once(&NoCamera, DEFAULT_JPEG_QUALITY).await,
            Err(CameraError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn snapshot_camera_reads_file() {
        let path = std::env::temp_dir().join(format!("nutrimap-{}.jpg", uuid::Uuid::new_v4()));
        let missing = SnapshotCamera::new(&path);
        assert!(matches!(
            capture_once(&missing, 80).await,
            Err(CameraError::Unavailable(_))
        ));

        tokio::fs::write(&path, TINY_JPEG).await.unwrap();
        let img = capture_once(&SnapshotCamera::new(&path), 80).await.unwrap();
        assert_eq!(img.len(), TINY_JPEG.len());
        tokio::fs::remove_file(&path).await.unwrap();
    }
}
