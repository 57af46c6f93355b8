//! Rule-based insights for the deterministic path.

use std::sync::LazyLock;

use regex::Regex;

use super::engine::bmi;
use crate::models::enums::{PhysicalActivity, RiskLevel};
use crate::models::profile::HealthProfile;

const UNDERWEIGHT_BELOW: f64 = 18.5;
const OVERWEIGHT_ABOVE: f64 = 25.0;
const ELEVATED_SYSTOLIC: u32 = 140;

/// Chronic conditions that warrant screening when they run in the family.
static CHRONIC_FAMILY_HISTORY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(diabet\w*|hypertension|high blood pressure|heart disease|cardiovascular|stroke|cancer|high cholesterol|kidney disease|obesity)\b",
    )
    .expect("static regex")
});

/// First chronic-condition keyword found in a family-history note.
pub fn chronic_family_condition(family_history: &str) -> Option<String> {
    CHRONIC_FAMILY_HISTORY
        .find(family_history)
        .map(|m| m.as_str().to_lowercase())
}

/// Short, deterministic observations about a profile and its score.
pub fn insights(profile: &HealthProfile, health_score: u8, risk_level: RiskLevel) -> Vec<String> {
    let mut out = Vec::new();
    let bmi = bmi(profile.weight_kg, profile.height_cm);

    if bmi < UNDERWEIGHT_BELOW {
        out.push(format!(
            "Your BMI of {bmi:.1} indicates you may be underweight. Consider consulting a nutritionist."
        ));
    } else if bmi > OVERWEIGHT_ABOVE {
        out.push(format!(
            "Your BMI of {bmi:.1} suggests you may benefit from weight management strategies."
        ));
    }

    if profile.physical_activity == PhysicalActivity::Sedentary {
        out.push(
            "Increasing physical activity could significantly improve your health score.".into(),
        );
    }

    if profile.systolic_bp > ELEVATED_SYSTOLIC {
        out.push(
            "Your blood pressure reading suggests monitoring and potential medical consultation."
                .into(),
        );
    }

    let mut effective = risk_level;
    if profile.has_existing_conditions() {
        effective = effective.escalate();
        out.push(format!(
            "Living with {} raises your effective risk to {}; keep up regular check-ups.",
            profile.existing_conditions.trim(),
            effective.as_str().to_uppercase(),
        ));
    }

    if let Some(condition) = chronic_family_condition(&profile.family_history) {
        if effective == RiskLevel::Low {
            effective = RiskLevel::Moderate;
            out.push(format!(
                "A family history of {condition} raises your effective risk to {}; ask about routine screening.",
                effective.as_str().to_uppercase(),
            ));
        } else {
            out.push(format!(
                "A family history of {condition} makes routine screening worthwhile."
            ));
        }
    }

    if out.is_empty() && health_score >= 80 {
        out.push("Your vitals and habits are in healthy ranges. Keep up your current routine.".into());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn healthy_profile_gets_encouragement_only() {
        let out = insights(&HealthProfile::example(), 98, RiskLevel::Low);
        assert_eq!(out.len(), 1);
        assert!(out[0].contains("healthy ranges"));
    }

    #[test]
    fn flags_underweight_and_overweight() {
        let mut profile = HealthProfile::example();
        profile.weight_kg = 50.0; // 16.3
        assert!(insights(&profile, 80, RiskLevel::Low)[0].contains("underweight"));

        profile.weight_kg = 90.0; // 29.4
        assert!(insights(&profile, 80, RiskLevel::Low)[0].contains("weight management"));
    }

    #[test]
    fn thresholds_are_strictly_above_the_limit() {
        let flagged = |profile: &HealthProfile, needle: &str| {
            insights(profile, 80, RiskLevel::Low)
                .iter()
                .any(|i| i.contains(needle))
        };
        let mut profile = HealthProfile::example();

        profile.weight_kg = 76.6; // 25.0
        assert!(!flagged(&profile, "weight management"));
        profile.weight_kg = 76.9; // 25.1
        assert!(flagged(&profile, "weight management"));

        profile.weight_kg = 75.0;
        profile.systolic_bp = 140;
        assert!(!flagged(&profile, "blood pressure"));
        profile.systolic_bp = 141;
        assert!(flagged(&profile, "blood pressure"));
    }

    #[test]
    fn flags_sedentary_and_blood_pressure() {
        let mut profile = HealthProfile::example();
        profile.physical_activity = PhysicalActivity::Sedentary;
        profile.systolic_bp = 150;
        let out = insights(&profile, 70, RiskLevel::Moderate);
        assert!(out.iter().any(|i| i.contains("physical activity")));
        assert!(out.iter().any(|i| i.contains("blood pressure")));
    }

    #[test]
    fn existing_condition_escalates_effective_risk() {
        let mut profile = HealthProfile::example();
        profile.existing_conditions = "diabetes".into();
        let out = insights(&profile, 85, RiskLevel::Low);
        assert!(out.iter().any(|i| i.contains("MODERATE")));

        let out = insights(&profile, 65, RiskLevel::Moderate);
        assert!(out.iter().any(|i| i.contains("HIGH")));
    }

    #[test]
    fn family_history_keyword_detected() {
        assert_eq!(
            chronic_family_condition("Mother had Type 2 Diabetes"),
            Some("diabetes".to_string())
        );
        assert_eq!(
            chronic_family_condition("father: heart disease at 60"),
            Some("heart disease".to_string())
        );
        assert!(chronic_family_condition("no known issues").is_none());
    }

    #[test]
    fn family_history_escalates_low_only() {
        let mut profile = HealthProfile::example();
        profile.family_history = "grandfather had a stroke".into();
        let out = insights(&profile, 90, RiskLevel::Low);
        assert!(out.iter().any(|i| i.contains("stroke") && i.contains("MODERATE")));

        let out = insights(&profile, 70, RiskLevel::Moderate);
        assert!(out.iter().any(|i| i.contains("stroke") && !i.contains("MODERATE")));
    }
}
