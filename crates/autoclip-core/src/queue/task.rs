//! A queued unit of work: a callable plus whatever it captured.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::domain::TaskId;
use crate::error::TaskError;

/// Boxed future produced by running a task.
pub type TaskFuture = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send + 'static>>;

type TaskFn = Box<dyn FnOnce() -> TaskFuture + Send + 'static>;

/// An opaque unit of work. Consumed exactly once by whichever worker takes it.
pub struct Task {
    id: TaskId,
    name: String,
    run: TaskFn,
}

impl Task {
    /// Wrap a zero-argument async callable.
    pub fn new<F, Fut>(name: impl Into<String>, f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Self {
            id: TaskId::generate(),
            name: name.into(),
            run: Box::new(move || -> TaskFuture { Box::pin(f()) }),
        }
    }

    /// Wrap a callable together with its arguments.
    pub fn with_args<A, F, Fut>(name: impl Into<String>, f: F, args: A) -> Self
    where
        A: Send + 'static,
        F: FnOnce(A) -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Self::new(name, move || f(args))
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Consume the task and produce its future. Nothing runs until it is polled.
    pub fn into_future(self) -> TaskFuture {
        (self.run)()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
