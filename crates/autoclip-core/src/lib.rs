//! autoclip-core
//!
//! Core building blocks for the autoclip generation daemon: a bounded task
//! queue drained by a fixed worker pool, retry by requeue, a quiescence
//! monitor and a periodic cycle driver.
//!
//! # モジュール構成
//! - **queue**: 有界 TaskQueue（submit / take / mark_done / wait_until_idle）
//! - **domain**: ドメインモデル（ids, retry state, outcome, decision, media, events）
//! - **ports**: 外部コラボレーターの抽象（prompt, generator, cover, publisher, event sink）
//! - **app**: アプリケーションロジック（worker_pool, retry, monitor, cycle, pipeline, builder）
//! - **impls**: 実装（tracing sink, polling, simulated collaborators）
//! - **config**: AUTOCLIP_* 環境変数からの設定
//! - **observability**: QueueCounts スナップショット
//! - **error**: QueueError / TaskError

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod impls;
pub mod observability;
pub mod ports;
pub mod queue;

pub use app::{App, AppBuilder, BuildError};
pub use config::{AppConfig, ConfigError};
pub use error::{QueueError, TaskError};
pub use observability::QueueCounts;
pub use queue::{Task, TaskQueue};
