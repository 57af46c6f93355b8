//! Prompt builders for each generation stage. Every stage after the first
//! embeds the previous stage's parsed output, which is what makes the
//! stages strictly sequential.

use crate::models::assessment::{Analysis, Recommendations, MEAL_PLAN_DAYS};
use crate::models::profile::HealthProfile;
use crate::models::record::UserRecord;

/// Recommendation categories requested from the model, as JSON keys.
pub const RECOMMENDATION_CATEGORIES: &[(&str, &str)] = &[
    ("exercise", "Exercise & Physical Activity (3-4 recommendations)"),
    ("nutrition", "Nutrition & Diet (3-4 recommendations)"),
    ("lifestyle", "Lifestyle Changes (2-3 recommendations)"),
    ("monitoring", "Health Monitoring (2-3 recommendations)"),
    ("riskManagement", "Risk Management (only if applicable)"),
];

const JSON_ONLY: &str = "Respond with a single JSON object and nothing else.";

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

pub fn build_analysis_prompt(profile: &HealthProfile, bmi: f64) -> String {
    format!(
        r#"As a health analytics assistant, analyze this health assessment:

PERSONAL INFO:
- Age: {age}
- Weight: {weight}kg
- Height: {height}cm
- BMI: {bmi:.1}

HEALTH METRICS:
- Resting Heart Rate: {hr} BPM
- Systolic Blood Pressure: {bp} mmHg

LIFESTYLE FACTORS:
- Physical Activity: {activity}
- General Lifestyle: {lifestyle}
- Dietary Habits: {diet}
- Smoking Status: {smoking}
- Existing Conditions: {conditions}
- Family History: {family}

Provide:
1. Overall health score (integer 0-100)
2. Risk level: low for a score of 80 or more, moderate for 60-79, high below 60
3. Key health insights and areas of concern
4. Positive aspects to maintain

{JSON_ONLY}
{{
  "healthScore": 0,
  "riskLevel": "low | moderate | high",
  "summary": "2-4 sentence narrative",
  "keyInsights": ["insight"],
  "positiveAspects": ["aspect"]
}}"#,
        age = profile.age,
        weight = profile.weight_kg,
        height = profile.height_cm,
        hr = profile.resting_heart_rate,
        bp = profile.systolic_bp,
        activity = profile.physical_activity,
        lifestyle = profile.general_lifestyle,
        diet = profile.dietary_habits,
        smoking = profile.smoking_habits,
        conditions = profile.existing_conditions,
        family = if profile.family_history.is_empty() {
            "not provided"
        } else {
            profile.family_history.as_str()
        },
    )
}

pub fn build_recommendations_prompt(
    profile: &HealthProfile,
    bmi: f64,
    analysis: &Analysis,
) -> String {
    let categories: String = RECOMMENDATION_CATEGORIES
        .iter()
        .map(|(key, label)| format!("- \"{key}\": {label}\n"))
        .collect();

    format!(
        r#"Based on this health analysis, generate personalized lifestyle recommendations.

HEALTH DATA: {profile}
BMI: {bmi:.1}
ANALYSIS: {analysis}

Use these category keys:
{categories}
Each recommendation must be specific and actionable, tailored to the current
fitness level and conditions, and include frequency or duration where relevant.

{JSON_ONLY} Map each category key to an array of:
{{"title": "...", "description": "...", "priority": "high | medium | low", "timeframe": "..."}}"#,
        profile = to_json(profile),
        analysis = to_json(analysis),
    )
}

pub fn build_meal_plan_prompt(profile: &HealthProfile, analysis: &Analysis) -> String {
    format!(
        r#"Create a personalized {MEAL_PLAN_DAYS}-day meal plan.

HEALTH DATA: {profile}
ANALYSIS: {analysis}

Consider:
- Dietary preferences: {diet}
- Health conditions: {conditions}
- Activity level: {activity}
- Family history: {family}

Each day has breakfast, lunch, dinner and 2 snacks, with nutritional focus areas
based on the health profile, preparation difficulty (easy, medium or hard)
and estimated calories per meal.

{JSON_ONLY} Use exactly {MEAL_PLAN_DAYS} entries in "days":
{{"days": [{{"day": "Day 1", "meals": {{
  "breakfast": [MEAL], "lunch": [MEAL], "dinner": [MEAL], "snacks": [MEAL, MEAL]
}}}}]}}
where MEAL is
{{"name": "...", "ingredients": ["..."], "calories": 0, "prepTime": "15 minutes", "difficulty": "easy", "nutritionalFocus": "..."}}"#,
        profile = to_json(profile),
        analysis = to_json(analysis),
        diet = profile.dietary_habits,
        conditions = profile.existing_conditions,
        activity = profile.physical_activity,
        family = profile.family_history,
    )
}

/// Narrative report prompt; only built when AI content exists.
pub fn build_report_prompt(
    record: &UserRecord,
    analysis: &Analysis,
    recommendations: &Recommendations,
) -> String {
    format!(
        r#"Generate a comprehensive health assessment report in markdown format.

HEALTH DATA: {profile}
HEALTH SCORE: {score} ({risk} risk), BMI {bmi:.1}
ANALYSIS: {analysis}
RECOMMENDATIONS: {recommendations}
MEAL PLAN: Available

Create a professional report with these sections:
1. Executive Summary
2. Health Assessment Results
3. Risk Analysis
4. Personalized Recommendations
5. Meal Planning Guide
6. Progress Tracking Suggestions
7. Next Steps

Make it professional, encouraging and actionable. Include specific metrics and timelines."#,
        profile = to_json(&record.profile()),
        score = record.health_score,
        risk = record.risk_level,
        bmi = record.bmi,
        analysis = to_json(analysis),
        recommendations = to_json(recommendations),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::RiskLevel;

    fn analysis() -> Analysis {
        Analysis {
            health_score: 91,
            risk_level: RiskLevel::Low,
            summary: "Strong cardiovascular baseline.".into(),
            key_insights: vec!["BMI in healthy range".into()],
            positive_aspects: vec!["Never smoked".into()],
        }
    }

    #[test]
    fn analysis_prompt_includes_vitals() {
        let prompt = build_analysis_prompt(&HealthProfile::example(), 24.5);
        assert!(prompt.contains("Age: 30"));
        assert!(prompt.contains("BMI: 24.5"));
        assert!(prompt.contains("Systolic Blood Pressure: 120 mmHg"));
        assert!(prompt.contains("Physical Activity: moderately-active"));
        assert!(prompt.contains("Family History: not provided"));
        assert!(prompt.contains("\"positiveAspects\""));
    }

    #[test]
    fn recommendations_prompt_embeds_analysis() {
        let prompt = build_recommendations_prompt(&HealthProfile::example(), 24.5, &analysis());
        assert!(prompt.contains("Strong cardiovascular baseline."));
        assert!(prompt.contains("\"riskManagement\""));
        assert!(prompt.contains("\"weightKg\":75.0"));
    }

    #[test]
    fn meal_plan_prompt_embeds_analysis_and_day_count() {
        let prompt = build_meal_plan_prompt(&HealthProfile::example(), &analysis());
        assert!(prompt.contains("7-day meal plan"));
        assert!(prompt.contains("exactly 7 entries"));
        assert!(prompt.contains("Never smoked"));
        assert!(prompt.contains("Dietary preferences: balanced"));
    }

    #[test]
    fn report_prompt_lists_sections() {
        let record = UserRecord::default();
        let prompt = build_report_prompt(&record, &analysis(), &Recommendations::new());
        assert!(prompt.contains("Executive Summary"));
        assert!(prompt.contains("HEALTH SCORE: 85 (low risk)"));
    }
}
