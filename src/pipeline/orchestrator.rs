use std::fmt;
use std::time::Instant;

use chrono::Utc;
use uuid::Uuid;

use super::generation::{GenerationClient, GenerationError, GenerationOptions};
use super::parser::{parse_analysis, parse_meal_plan, parse_recommendations};
use super::prompt::{build_analysis_prompt, build_meal_plan_prompt, build_recommendations_prompt};
use crate::models::assessment::{AiAssessment, ScoreSummary};
use crate::models::profile::HealthProfile;
use crate::scoring::bmi;

/// The three dependent generation stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Analysis,
    Recommendations,
    MealPlan,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Analysis => "analysis",
            Self::Recommendations => "recommendations",
            Self::MealPlan => "meal_plan",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stage failed; nothing generated by earlier stages is kept.
#[derive(Debug, thiserror::Error)]
#[error("Assessment generation failed at the {stage} stage: {cause}")]
pub struct PipelineFailure {
    pub stage: Stage,
    #[source]
    pub cause: GenerationError,
}

/// Orchestrates the AI assessment:
/// analysis → recommendations → meal plan, each prompt built from the
/// previous stage's parsed output. Compose-or-fail: no retry, no fallback.
pub struct AssessmentPipeline {
    client: Box<dyn GenerationClient + Send + Sync>,
}

impl AssessmentPipeline {
    pub fn new(client: Box<dyn GenerationClient + Send + Sync>) -> Self {
        Self { client }
    }

    /// Call the client for one stage and parse its output. Transport and
    /// parse failures both surface as the same `PipelineFailure`.
    fn run_stage<T>(
        &self,
        stage: Stage,
        prompt: &str,
        options: &GenerationOptions,
        parse: impl FnOnce(&str) -> Result<T, GenerationError>,
    ) -> Result<T, PipelineFailure> {
        let _span = tracing::info_span!("pipeline_stage", stage = %stage).entered();
        let started = Instant::now();

        let output = self
            .client
            .generate(prompt, options)
            .and_then(|text| parse(&text))
            .map_err(|cause| {
                tracing::warn!(stage = %stage, error = %cause, "Stage failed");
                PipelineFailure { stage, cause }
            })?;

        tracing::debug!(
            stage = %stage,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Stage complete"
        );
        Ok(output)
    }

    pub fn run(&self, profile: &HealthProfile) -> Result<AiAssessment, PipelineFailure> {
        let id = Uuid::new_v4();
        let _span = tracing::info_span!("assessment_pipeline", assessment_id = %id).entered();
        let bmi = bmi(profile.weight_kg, profile.height_cm);

        let analysis = self.run_stage(
            Stage::Analysis,
            &build_analysis_prompt(profile, bmi),
            &GenerationOptions::ANALYSIS,
            parse_analysis,
        )?;

        let recommendations = self.run_stage(
            Stage::Recommendations,
            &build_recommendations_prompt(profile, bmi, &analysis),
            &GenerationOptions::RECOMMENDATIONS,
            parse_recommendations,
        )?;

        let meal_plan = self.run_stage(
            Stage::MealPlan,
            &build_meal_plan_prompt(profile, &analysis),
            &GenerationOptions::MEAL_PLAN,
            parse_meal_plan,
        )?;

        tracing::info!(
            categories = recommendations.len(),
            days = meal_plan.days.len(),
            "AI assessment generated"
        );

        Ok(AiAssessment {
            id,
            score: ScoreSummary {
                bmi,
                health_score: analysis.health_score,
                risk_level: analysis.risk_level,
            },
            analysis,
            recommendations,
            meal_plan,
            generated_at: Utc::now(),
        })
    }
}
