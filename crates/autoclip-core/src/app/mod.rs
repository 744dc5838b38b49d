//! App - アプリケーション層
//!
//! このモジュールは、queue と ports を組み合わせてデーモンを実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: アプリケーションの構築とワイヤリング
//! - **WorkerPool**: 固定数ワーカーによるタスク実行ループ（take→run→mark_done）
//! - **Requeuer**: 失敗した試行をキューへ再投入
//! - **GenerationPipeline**: prompt→video→cover→import の生成フロー
//! - **QuiescenceMonitor**: キューが空になったことの通知
//! - **CycleDriver**: 30分ごとの生成タスク投入

pub mod builder;
pub mod cycle;
pub mod generators;
pub mod monitor;
pub mod pipeline;
pub mod retry;
pub mod worker_pool;

// 主要な型を再エクスポート
pub use self::builder::{App, AppBuilder, BuildError};
pub use self::cycle::{CycleDriver, CycleReport, DEFAULT_CYCLE_INTERVAL};
pub use self::generators::GeneratorRegistry;
pub use self::monitor::QuiescenceMonitor;
pub use self::pipeline::GenerationPipeline;
pub use self::retry::{Requeuer, RetryableOperation};
pub use self::worker_pool::{DEFAULT_WORKERS, WorkerPool};
