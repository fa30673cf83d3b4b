use crate::analysis::{FoodAnalyzer, GeminiAnalyzer};
use crate::camera::{CameraDevice, NoCamera, SnapshotCamera};
use crate::clock::Clock;
use crate::config::AppConfig;
use crate::session::Session;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub session: Arc<Session>,
    pub analyzer: Arc<dyn FoodAnalyzer>,
    pub camera: Arc<dyn CameraDevice>,
}

impl AppState {
    pub fn init(config: AppConfig) -> anyhow::Result<Self> {
        let analyzer =
            Arc::new(GeminiAnalyzer::new(config.gemini.clone())?) as Arc<dyn FoodAnalyzer>;

        let camera = match &config.camera_snapshot_path {
            Some(path) => Arc::new(SnapshotCamera::new(path)) as Arc<dyn CameraDevice>,
            None => Arc::new(NoCamera) as Arc<dyn CameraDevice>,
        };

        let session = Arc::new(Session::start(
            Clock::new(config.local_offset),
            config.seed_demo_logs,
        ));

        Ok(Self::from_parts(Arc::new(config), session, analyzer, camera))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        session: Arc<Session>,
        analyzer: Arc<dyn FoodAnalyzer>,
        camera: Arc<dyn CameraDevice>,
    ) -> Self {
        Self {
            config,
            session,
            analyzer,
            camera,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::analysis::{ScriptedClient, TWO_ITEMS};
        use crate::camera::fakes::FakeCamera;

        Self::fake_with(
            Arc::new(ScriptedClient::replying(TWO_ITEMS)),
            Arc::new(FakeCamera::default()),
        )
    }

    #[cfg(test)]
    pub fn fake_with(analyzer: Arc<dyn FoodAnalyzer>, camera: Arc<dyn CameraDevice>) -> Self {
        use crate::config::GeminiConfig;

        let config = Arc::new(AppConfig {
            gemini: GeminiConfig {
                api_key: "test".into(),
                model: "test".into(),
                base_url: "http://fake.local".into(),
                timeout_secs: 5,
            },
            camera_snapshot_path: None,
            jpeg_quality: crate::camera::DEFAULT_JPEG_QUALITY,
            local_offset: time::UtcOffset::UTC,
            seed_demo_logs: true,
        });
        let session = Arc::new(Session::start(Clock::utc(), true));
        Self::from_parts(config, session, analyzer, camera)
    }
}
