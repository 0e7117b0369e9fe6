//! Shared application state for the HTTP server

use crate::processing::ExamPipeline;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<ExamPipeline>,
}

impl AppState {
    pub fn new(pipeline: Arc<ExamPipeline>) -> Self {
        Self { pipeline }
    }

    /// Handle to the pipeline, cheap to move into a blocking task
    pub fn pipeline(&self) -> Arc<ExamPipeline> {
        Arc::clone(&self.pipeline)
    }
}
