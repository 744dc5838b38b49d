//! Video generator selection.

use std::sync::Arc;

use rand::seq::SliceRandom;
use tracing::{error, info};

use crate::error::TaskError;
use crate::ports::{InputMode, VideoGenerator};

/// The configured video providers. One is picked at random per attempt.
#[derive(Clone, Default)]
pub struct GeneratorRegistry {
    generators: Vec<Arc<dyn VideoGenerator>>,
}

impl GeneratorRegistry {
    pub fn new(generators: Vec<Arc<dyn VideoGenerator>>) -> Self {
        Self { generators }
    }

    pub fn register(&mut self, generator: Arc<dyn VideoGenerator>) {
        self.generators.push(generator);
    }

    pub fn len(&self) -> usize {
        self.generators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// Whether at least one generator can take `mode` input.
    pub fn supports(&self, mode: InputMode) -> bool {
        self.generators
            .iter()
            .any(|g| mode.accepts(g.capability()))
    }

    /// Names of the generators that can take `mode` input.
    pub fn candidates(&self, mode: InputMode) -> Vec<&str> {
        self.generators
            .iter()
            .filter(|g| mode.accepts(g.capability()))
            .map(|g| g.name())
            .collect()
    }

    /// Pick a random generator compatible with `mode`.
    pub fn choose(&self, mode: InputMode) -> Result<Arc<dyn VideoGenerator>, TaskError> {
        let candidates: Vec<&Arc<dyn VideoGenerator>> = self
            .generators
            .iter()
            .filter(|g| mode.accepts(g.capability()))
            .collect();

        let Some(chosen) = candidates.choose(&mut rand::thread_rng()) else {
            error!(mode = %mode, "no compatible video generator");
            return Err(TaskError::NoGenerator {
                mode: mode.to_string(),
            });
        };

        info!(
            mode = %mode,
            candidates = candidates.len(),
            generator = chosen.name(),
            "selected video generator"
        );
        Ok(Arc::clone(*chosen))
    }
}

impl std::fmt::Debug for GeneratorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.generators.iter().map(|g| g.name()))
            .finish()
    }
}
