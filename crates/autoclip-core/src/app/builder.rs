//! AppBuilder - アプリケーションの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - 足りないコラボレーターは build() 時に BuildError で報告

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use super::cycle::{CycleDriver, CycleReport};
use super::generators::GeneratorRegistry;
use super::monitor::QuiescenceMonitor;
use super::pipeline::GenerationPipeline;
use super::retry::Requeuer;
use super::worker_pool::WorkerPool;
use crate::config::AppConfig;
use crate::domain::{DefaultDecider, GenerationKind};
use crate::impls::TracingEventSink;
use crate::ports::{
    CoverExtractor, EventSink, ImageGenerator, InputMode, PromptSource, Publisher, VideoGenerator,
};
use crate::queue::TaskQueue;

/// AppBuilder はアプリケーションを構築
///
/// # 使用例
/// ```ignore
/// let app = AppBuilder::new(AppConfig::from_env()?)
///     .prompts(Arc::new(CannedPrompts::default()))
///     .video_generator(Arc::new(luma))
///     .image_generator(Arc::new(images))
///     .cover_extractor(Arc::new(FirstSecondCover))
///     .publisher(Arc::new(LoggingPublisher::default()))
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - 全コラボレーターが揃っているかチェック
/// - 各入力モード (text / image) に対応する generator が最低1つあるかチェック
pub struct AppBuilder {
    config: AppConfig,
    prompts: Option<Arc<dyn PromptSource>>,
    generators: GeneratorRegistry,
    images: Option<Arc<dyn ImageGenerator>>,
    covers: Option<Arc<dyn CoverExtractor>>,
    publisher: Option<Arc<dyn Publisher>>,
    events: Arc<dyn EventSink>,
}

/// BuildError はアプリケーション構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    #[error("no video generator accepts {mode} input")]
    NoGenerator { mode: InputMode },
}

impl AppBuilder {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            prompts: None,
            generators: GeneratorRegistry::default(),
            images: None,
            covers: None,
            publisher: None,
            events: Arc::new(TracingEventSink),
        }
    }

    pub fn prompts(mut self, prompts: Arc<dyn PromptSource>) -> Self {
        self.prompts = Some(prompts);
        self
    }

    /// Register one more video provider.
    pub fn video_generator(mut self, generator: Arc<dyn VideoGenerator>) -> Self {
        self.generators.register(generator);
        self
    }

    pub fn image_generator(mut self, images: Arc<dyn ImageGenerator>) -> Self {
        self.images = Some(images);
        self
    }

    pub fn cover_extractor(mut self, covers: Arc<dyn CoverExtractor>) -> Self {
        self.covers = Some(covers);
        self
    }

    pub fn publisher(mut self, publisher: Arc<dyn Publisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// Replace the default tracing sink.
    pub fn events(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// AppBuilder を構築して App を生成
    pub fn build(self) -> Result<App, BuildError> {
        let prompts = self
            .prompts
            .ok_or(BuildError::MissingCollaborator("prompt source"))?;
        let images = self
            .images
            .ok_or(BuildError::MissingCollaborator("image generator"))?;
        let covers = self
            .covers
            .ok_or(BuildError::MissingCollaborator("cover extractor"))?;
        let publisher = self
            .publisher
            .ok_or(BuildError::MissingCollaborator("publisher"))?;
        for mode in [InputMode::Text, InputMode::Image] {
            if !self.generators.supports(mode) {
                return Err(BuildError::NoGenerator { mode });
            }
        }

        let queue = TaskQueue::with_events(self.config.queue_capacity, Arc::clone(&self.events));
        let decider = Arc::new(DefaultDecider::new(self.config.retry_policy));
        let requeuer = Requeuer::new(queue.clone(), decider, Arc::clone(&self.events));
        let pipeline = GenerationPipeline::new(prompts, self.generators, images, covers, publisher)
            .with_aspect_ratio(self.config.aspect_ratio);

        Ok(App {
            queue,
            requeuer,
            pipeline: Arc::new(pipeline),
            events: self.events,
            config: self.config,
        })
    }
}

/// App はアプリケーションのランタイム
///
/// - TaskQueue / Requeuer / GenerationPipeline を保持
/// - run() でワーカー、モニター、サイクルを起動
pub struct App {
    queue: TaskQueue,
    requeuer: Requeuer,
    pipeline: Arc<GenerationPipeline>,
    events: Arc<dyn EventSink>,
    config: AppConfig,
}

impl App {
    pub fn queue(&self) -> &TaskQueue {
        &self.queue
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &GenerationPipeline {
        &self.pipeline
    }

    fn cycle_driver(&self) -> CycleDriver<GenerationPipeline> {
        CycleDriver::new(
            self.requeuer.clone(),
            Arc::clone(&self.pipeline),
            GenerationKind::ALL.to_vec(),
        )
        .with_interval(self.config.cycle_interval)
    }

    /// Enqueue a single cycle without starting the loop.
    pub fn enqueue_cycle(&self) -> CycleReport {
        self.cycle_driver().enqueue_cycle()
    }

    /// Run until `shutdown` turns true. In-flight tasks are allowed to finish
    /// before this returns.
    pub async fn run(self, shutdown: watch::Receiver<bool>) {
        info!(
            capacity = self.config.queue_capacity,
            workers = self.config.workers,
            max_retries = self.config.retry_policy.max_retries,
            "starting video generation daemon"
        );

        let pool = WorkerPool::spawn(
            self.config.workers,
            self.queue.clone(),
            Arc::clone(&self.events),
        );
        let monitor = QuiescenceMonitor::new(self.queue.clone(), Arc::clone(&self.events)).spawn();

        self.cycle_driver().run(shutdown).await;

        info!(counts = ?self.queue.counts(), "shutting down workers");
        pool.shutdown_and_join().await;
        monitor.abort();
    }
}
