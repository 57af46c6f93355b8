//! Completion tracking for generated recommendations.
//!
//! Identifiers are `"<category>-<index>"` and only meaningful against the
//! recommendations they were created for.

use crate::models::record::UserRecord;

pub fn recommendation_id(category: &str, index: usize) -> String {
    format!("{category}-{index}")
}

/// Flip completion for one recommendation. Applying it twice restores
/// the original set; use [`ensure_completed`] to mark done idempotently.
pub fn toggle(mut record: UserRecord, category: &str, index: usize) -> UserRecord {
    let id = recommendation_id(category, index);
    if !record.completed_recommendation_ids.remove(&id) {
        record.completed_recommendation_ids.insert(id);
    }
    record
}

pub fn is_completed(record: &UserRecord, category: &str, index: usize) -> bool {
    record
        .completed_recommendation_ids
        .contains(&recommendation_id(category, index))
}

pub fn ensure_completed(mut record: UserRecord, category: &str, index: usize) -> UserRecord {
    record
        .completed_recommendation_ids
        .insert(recommendation_id(category, index));
    record
}

/// (completed, total), counting only identifiers that resolve against the
/// current recommendations. Fallback results have none.
pub fn completion_progress(record: &UserRecord) -> (usize, usize) {
    let Some(recommendations) = record.assessment.as_ref().and_then(|a| a.recommendations())
    else {
        return (0, 0);
    };

    let mut completed = 0;
    let mut total = 0;
    for (category, items) in recommendations {
        for index in 0..items.len() {
            total += 1;
            if is_completed(record, category, index) {
                completed += 1;
            }
        }
    }
    (completed, total)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::models::assessment::{
        AiAssessment, Analysis, AssessmentResult, MealPlan, Recommendation, ScoreSummary,
    };
    use crate::models::enums::{Priority, RiskLevel};

    fn rec(title: &str) -> Recommendation {
        Recommendation {
            title: title.into(),
            description: "desc".into(),
            priority: Priority::Medium,
            timeframe: "2 weeks".into(),
        }
    }

    fn record_with_recommendations() -> UserRecord {
        let mut recommendations = BTreeMap::new();
        recommendations.insert("exercise".to_string(), vec![rec("Walk"), rec("Stretch")]);
        recommendations.insert("nutrition".to_string(), vec![rec("Fiber")]);

        let mut record = UserRecord::default();
        record.attach_assessment(AssessmentResult::AiGenerated(AiAssessment {
            id: Uuid::new_v4(),
            score: ScoreSummary {
                bmi: 24.5,
                health_score: 88,
                risk_level: RiskLevel::Low,
            },
            analysis: Analysis {
                health_score: 88,
                risk_level: RiskLevel::Low,
                summary: "ok".into(),
                key_insights: vec![],
                positive_aspects: vec![],
            },
            recommendations,
            meal_plan: MealPlan::default(),
            generated_at: Utc::now(),
        }));
        record
    }

    #[test]
    fn toggle_twice_restores_original_set() {
        let mut original = UserRecord::default();
        original
            .completed_recommendation_ids
            .insert("nutrition-0".into());

        for (category, index) in [("exercise", 0), ("nutrition", 0), ("sleep", 7)] {
            let twice = toggle(toggle(original.clone(), category, index), category, index);
            assert_eq!(
                twice.completed_recommendation_ids,
                original.completed_recommendation_ids
            );
        }
    }

    #[test]
    fn toggle_adds_then_removes() {
        let record = toggle(UserRecord::default(), "exercise", 1);
        assert!(is_completed(&record, "exercise", 1));
        assert!(record.completed_recommendation_ids.contains("exercise-1"));
        let record = toggle(record, "exercise", 1);
        assert!(!is_completed(&record, "exercise", 1));
    }

    #[test]
    fn ensure_completed_is_idempotent() {
        let once = ensure_completed(UserRecord::default(), "lifestyle", 2);
        let twice = ensure_completed(once.clone(), "lifestyle", 2);
        assert_eq!(once.completed_recommendation_ids, twice.completed_recommendation_ids);
        assert!(is_completed(&twice, "lifestyle", 2));
    }

    #[test]
    fn progress_counts_only_resolvable_ids() {
        let record = record_with_recommendations();
        assert_eq!(completion_progress(&record), (0, 3));

        let record = toggle(record, "exercise", 1);
        let record = toggle(record, "exercise", 5);
        let record = toggle(record, "monitoring", 0);
        assert_eq!(completion_progress(&record), (1, 3));
    }

    #[test]
    fn fallback_record_has_no_progress() {
        let record = toggle(UserRecord::default(), "exercise", 0);
        assert_eq!(completion_progress(&record), (0, 0));
    }
}
