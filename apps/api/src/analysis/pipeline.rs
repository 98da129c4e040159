//! The upload-and-analyze pipeline: Idle → Extracting → Analyzing → Done,
//! with failures landing in Failed and user-initiated resets back to Idle.
//!
//! One pipeline instance exists per authenticated session. Requests are not
//! cancellable mid-flight; instead each carries a sequence number, and a
//! superseded request's transitions are discarded so a stale response can
//! never overwrite newer state (last selection wins).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::analysis::extractor::{PdfTextExtractor, ResumeFile};
use crate::analysis::prompts::{build_prompt, ATS_ANALYSIS_PROMPT};
use crate::errors::AppError;
use crate::llm_client::AnalysisBackend;

const EXTRACTION_FAILED_MSG: &str = "Failed to read the resume. Please upload a readable PDF.";
const NOTHING_TO_ANALYZE_MSG: &str = "No text could be extracted from the resume.";
const ANALYSIS_FAILED_MSG: &str = "Resume analysis failed. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Extracting,
    Analyzing,
    Done,
    Failed,
}

/// What the status endpoint reports: the state plus the held result or the
/// client-safe error message.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineSnapshot {
    pub state: PipelineState,
    pub analysis: Option<String>,
    pub error: Option<String>,
}

impl PipelineSnapshot {
    fn idle() -> Self {
        PipelineSnapshot {
            state: PipelineState::Idle,
            analysis: None,
            error: None,
        }
    }
}

struct Inner {
    /// Sequence number of the request the snapshot belongs to.
    seq: u64,
    snapshot: PipelineSnapshot,
}

pub struct AnalysisPipeline {
    extractor: PdfTextExtractor,
    backend: Arc<dyn AnalysisBackend>,
    next_seq: AtomicU64,
    inner: Mutex<Inner>,
}

impl AnalysisPipeline {
    pub fn new(backend: Arc<dyn AnalysisBackend>) -> Self {
        AnalysisPipeline {
            extractor: PdfTextExtractor,
            backend,
            next_seq: AtomicU64::new(0),
            inner: Mutex::new(Inner {
                seq: 0,
                snapshot: PipelineSnapshot::idle(),
            }),
        }
    }

    pub async fn snapshot(&self) -> PipelineSnapshot {
        self.inner.lock().await.snapshot.clone()
    }

    /// Runs one analysis request through the pipeline and returns the report.
    ///
    /// Non-PDF input is refused before any state change — the pipeline stays
    /// where it was. Extraction always completes before the prompt is built,
    /// and the prompt is built before the remote call goes out. A request
    /// superseded mid-flight still resolves for its own caller, but its
    /// transitions are dropped.
    pub async fn submit(&self, file: ResumeFile) -> Result<String, AppError> {
        if !file.is_pdf() {
            return Err(AppError::InvalidFormat(
                "Please upload a valid PDF file.".to_string(),
            ));
        }

        let seq = self.begin().await;

        let extracted = match self.extractor.extract(&file).await {
            Ok(text) => text,
            Err(e) => {
                self.fail(seq, EXTRACTION_FAILED_MSG).await;
                return Err(e.into());
            }
        };
        if extracted.trim().is_empty() {
            self.fail(seq, NOTHING_TO_ANALYZE_MSG).await;
            return Err(AppError::Extraction(
                "document contains no extractable text".to_string(),
            ));
        }

        self.apply(seq, PipelineState::Analyzing, None, None).await;

        let prompt = build_prompt(ATS_ANALYSIS_PROMPT, &extracted);
        match self.backend.generate(&prompt).await {
            Ok(analysis) => {
                self.apply(seq, PipelineState::Done, Some(analysis.clone()), None)
                    .await;
                Ok(analysis)
            }
            Err(e) => {
                self.fail(seq, ANALYSIS_FAILED_MSG).await;
                Err(AppError::Analysis(e.to_string()))
            }
        }
    }

    /// Clears back to Idle. Any in-flight request is invalidated; its
    /// eventual result will not land.
    pub async fn reset(&self) {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let mut inner = self.inner.lock().await;
        inner.seq = seq;
        inner.snapshot = PipelineSnapshot::idle();
    }

    /// Starts a new request: takes over the pipeline (dropping any previous
    /// request's claim on it) and enters Extracting.
    async fn begin(&self) -> u64 {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let mut inner = self.inner.lock().await;
        inner.seq = seq;
        inner.snapshot = PipelineSnapshot {
            state: PipelineState::Extracting,
            analysis: None,
            error: None,
        };
        seq
    }

    /// Applies a transition for request `seq` unless it has been superseded.
    async fn apply(
        &self,
        seq: u64,
        state: PipelineState,
        analysis: Option<String>,
        error: Option<String>,
    ) {
        let mut inner = self.inner.lock().await;
        if inner.seq != seq {
            tracing::debug!("request {seq} superseded; dropping {state:?} transition");
            return;
        }
        inner.snapshot = PipelineSnapshot {
            state,
            analysis,
            error,
        };
    }

    async fn fail(&self, seq: u64, message: &str) {
        self.apply(seq, PipelineState::Failed, None, Some(message.to_string()))
            .await;
    }
}

/// One pipeline per authenticated session, created lazily on first use.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    pipelines: Arc<RwLock<HashMap<Uuid, Arc<AnalysisPipeline>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn pipeline_for(
        &self,
        user_id: Uuid,
        backend: &Arc<dyn AnalysisBackend>,
    ) -> Arc<AnalysisPipeline> {
        if let Some(pipeline) = self.pipelines.read().await.get(&user_id) {
            return pipeline.clone();
        }
        let mut pipelines = self.pipelines.write().await;
        pipelines
            .entry(user_id)
            .or_insert_with(|| Arc::new(AnalysisPipeline::new(backend.clone())))
            .clone()
    }
}
