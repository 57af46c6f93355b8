//! Caller-level recovery: run the AI pipeline when one is available and
//! downgrade to deterministic scoring when it is absent or fails.

use chrono::Utc;
use uuid::Uuid;

use super::orchestrator::AssessmentPipeline;
use crate::models::assessment::{AssessmentResult, FallbackAssessment};
use crate::models::profile::HealthProfile;
use crate::scoring::{insights, ScoreEngine};

/// Deterministic result: score, risk and rule-based insights only.
pub fn fallback_assessment(profile: &HealthProfile, engine: &ScoreEngine) -> FallbackAssessment {
    let score = engine.score(profile);
    FallbackAssessment {
        id: Uuid::new_v4(),
        insights: insights(profile, score.health_score, score.risk_level),
        score,
        generated_at: Utc::now(),
    }
}

pub fn assess(
    profile: &HealthProfile,
    pipeline: Option<&AssessmentPipeline>,
    engine: &ScoreEngine,
) -> AssessmentResult {
    let Some(pipeline) = pipeline else {
        tracing::info!("AI generation disabled, using deterministic scoring");
        return AssessmentResult::Fallback(fallback_assessment(profile, engine));
    };

    match pipeline.run(profile) {
        Ok(ai) => AssessmentResult::AiGenerated(ai),
        Err(failure) => {
            tracing::warn!(
                stage = %failure.stage,
                error = %failure.cause,
                "AI assessment unavailable, falling back to deterministic scoring"
            );
            AssessmentResult::Fallback(fallback_assessment(profile, engine))
        }
    }
}
