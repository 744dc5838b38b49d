//! Impls - ports の実装
//!
//! - **TracingEventSink**: default event sink (structured logs)
//! - **RecordingEventSink**: in-memory sink for tests and status views
//! - **polling**: remote job polling shared by provider clients
//! - **simulated**: in-process collaborators for the demo daemon

pub mod polling;
pub mod recording;
pub mod simulated;
pub mod tracing_sink;

pub use self::polling::{PollSchedule, PollStatus, poll_job};
pub use self::recording::RecordingEventSink;
pub use self::simulated::{
    CannedPrompts, FirstSecondCover, LoggingPublisher, SimulatedImageGenerator,
    SimulatedVideoGenerator,
};
pub use self::tracing_sink::TracingEventSink;
