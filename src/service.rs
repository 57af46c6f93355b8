//! Application service: the one place that ties validation, assessment,
//! persistence, tracking and reports together for a request handler.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::config::{self, GenerationConfig};
use crate::medications::{self, MedicationError, MedicationInput};
use crate::models::assessment::AssessmentResult;
use crate::models::profile::{HealthProfile, ProfileInput, ValidationError};
use crate::models::record::UserRecord;
use crate::pipeline::{assess, fallback_assessment, AssessmentPipeline, ChatCompletionsClient};
use crate::report::{Report, ReportGenerator};
use crate::scoring::ScoreEngine;
use crate::state::{Mutation, PersistenceError, StateStore};
use crate::tracker;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Medication(#[from] MedicationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// A freshly computed assessment and the record it was merged into.
/// A failed save is reported here instead of discarding the result.
#[derive(Debug)]
pub struct AssessmentOutcome {
    pub record: UserRecord,
    pub result: AssessmentResult,
    pub persistence_error: Option<PersistenceError>,
}

pub struct HealthService {
    store: StateStore,
    pipeline: Option<AssessmentPipeline>,
    engine: ScoreEngine,
    reports: ReportGenerator,
}

impl HealthService {
    /// Deterministic-only service over `store`.
    pub fn new(store: StateStore) -> Self {
        Self {
            store,
            pipeline: None,
            engine: ScoreEngine::default(),
            reports: ReportGenerator::new(None),
        }
    }

    pub fn with_pipeline(mut self, pipeline: AssessmentPipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    pub fn with_engine(mut self, engine: ScoreEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_report_generator(mut self, reports: ReportGenerator) -> Self {
        self.reports = reports;
        self
    }

    /// Service over the default database, with AI generation when an API
    /// key is configured.
    pub fn from_env() -> Result<Self, ServiceError> {
        let store = StateStore::open(&config::database_path())?;
        let mut service = Self::new(store);

        let generation = GenerationConfig::from_env();
        if !generation.is_enabled() {
            tracing::info!("No generation API key configured, AI assessment disabled");
            return Ok(service);
        }

        match (
            ChatCompletionsClient::new(&generation),
            ChatCompletionsClient::new(&generation),
        ) {
            (Ok(pipeline_client), Ok(report_client)) => {
                tracing::info!(model = pipeline_client.model(), "AI assessment enabled");
                service = service
                    .with_pipeline(AssessmentPipeline::new(Box::new(pipeline_client)))
                    .with_report_generator(ReportGenerator::new(Some(Box::new(report_client))));
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "Generation client unavailable, AI assessment disabled");
            }
        }
        Ok(service)
    }

    pub fn ai_enabled(&self) -> bool {
        self.pipeline.is_some()
    }

    pub fn record(&self) -> Result<UserRecord, ServiceError> {
        Ok(self.store.load_or_default()?)
    }

    /// Validate, assess (AI or fallback), merge into the record and save.
    pub fn submit_assessment(&self, input: ProfileInput) -> Result<AssessmentOutcome, ServiceError> {
        let profile = HealthProfile::from_input(input)?;
        let result = assess(&profile, self.pipeline.as_ref(), &self.engine);
        Ok(self.commit(&profile, result))
    }

    /// As [`submit_assessment`](Self::submit_assessment), but generation
    /// that has not finished within `deadline` is abandoned in favour of
    /// the deterministic result.
    pub async fn submit_assessment_with_deadline(
        self: Arc<Self>,
        input: ProfileInput,
        deadline: Duration,
    ) -> Result<AssessmentOutcome, ServiceError> {
        let profile = HealthProfile::from_input(input)?;

        let worker = Arc::clone(&self);
        let task_profile = profile.clone();
        let task = tokio::task::spawn_blocking(move || {
            assess(&task_profile, worker.pipeline.as_ref(), &worker.engine)
        });

        let result = match tokio::time::timeout(deadline, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Assessment task failed, using deterministic scoring");
                AssessmentResult::Fallback(fallback_assessment(&profile, &self.engine))
            }
            Err(_) => {
                tracing::warn!(
                    deadline_ms = deadline.as_millis() as u64,
                    "Assessment deadline elapsed, using deterministic scoring"
                );
                AssessmentResult::Fallback(fallback_assessment(&profile, &self.engine))
            }
        };

        Ok(self.commit(&profile, result))
    }

    fn commit(&self, profile: &HealthProfile, result: AssessmentResult) -> AssessmentOutcome {
        let attach = |record: &mut UserRecord, result: AssessmentResult| {
            record.apply_profile(profile);
            record.attach_assessment(result);
        };

        match self.store.update(|record| attach(record, result.clone())) {
            Ok(Mutation {
                record, persisted, ..
            }) => {
                tracing::info!(
                    assessment_id = %result.id(),
                    ai_generated = result.is_ai_generated(),
                    saved = persisted.is_ok(),
                    "Assessment recorded"
                );
                AssessmentOutcome {
                    record,
                    result,
                    persistence_error: persisted.err(),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "User record unavailable, returning unsaved assessment");
                let mut record = UserRecord::default();
                attach(&mut record, result.clone());
                AssessmentOutcome {
                    record,
                    result,
                    persistence_error: Some(e),
                }
            }
        }
    }

    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut UserRecord) -> T,
    ) -> Result<(UserRecord, T), ServiceError> {
        let Mutation {
            record,
            output,
            persisted,
        } = self.store.update(f)?;
        persisted?;
        Ok((record, output))
    }

    pub fn toggle_recommendation(
        &self,
        category: &str,
        index: usize,
    ) -> Result<UserRecord, ServiceError> {
        let (record, ()) = self.mutate(|record| {
            *record = tracker::toggle(std::mem::take(record), category, index);
        })?;
        Ok(record)
    }

    pub fn complete_recommendation(
        &self,
        category: &str,
        index: usize,
    ) -> Result<UserRecord, ServiceError> {
        let (record, ()) = self.mutate(|record| {
            *record = tracker::ensure_completed(std::mem::take(record), category, index);
        })?;
        Ok(record)
    }

    pub fn add_medication(&self, input: &MedicationInput) -> Result<UserRecord, ServiceError> {
        let (record, added) = self.mutate(|record| medications::add_medication(record, input))?;
        added?;
        Ok(record)
    }

    /// Returns the record and whether a medication with that name existed.
    pub fn mark_medication_taken(&self, name: &str) -> Result<(UserRecord, bool), ServiceError> {
        self.mutate(|record| medications::mark_medication_taken(record, name))
    }

    pub fn generate_report(&self) -> Result<Report, ServiceError> {
        let record = self.store.load_or_default()?;
        Ok(self.reports.generate(&record))
    }
}
