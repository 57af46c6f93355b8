//! Assessment results and the AI-generated content they may carry.
//!
//! `AssessmentResult` is tagged by source: an `AiGenerated` result always
//! carries analysis, recommendations and a meal plan together; a `Fallback`
//! result carries none of them. There is no way to build a partial mix.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::enums::{Difficulty, MealSlot, Priority, RiskLevel};

/// Number of days in a generated meal plan.
pub const MEAL_PLAN_DAYS: usize = 7;

/// Deterministic score triple shared by both result kinds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreSummary {
    /// Body-mass index, one decimal.
    pub bmi: f64,
    /// 0..=100
    pub health_score: u8,
    pub risk_level: RiskLevel,
}

/// Parsed output of the analysis stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub health_score: u8,
    pub risk_level: RiskLevel,
    pub summary: String,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub key_insights: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub positive_aspects: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    #[serde(default, deserialize_with = "lenient::text")]
    pub timeframe: String,
}

/// Category name → ordered recommendations. Identifiers are positional.
pub type Recommendations = BTreeMap<String, Vec<Recommendation>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    pub name: String,
    #[serde(deserialize_with = "lenient::ingredients")]
    pub ingredients: BTreeSet<String>,
    #[serde(deserialize_with = "lenient::calories")]
    pub calories: u32,
    #[serde(default, deserialize_with = "lenient::text")]
    pub prep_time: String,
    pub difficulty: Difficulty,
    #[serde(default, deserialize_with = "lenient::text")]
    pub nutritional_focus: String,
}

/// One day of the plan: every slot maps to its ordered meals.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<String>,
    pub meals: BTreeMap<MealSlot, Vec<Meal>>,
}

impl DayPlan {
    pub fn meals_for(&self, slot: MealSlot) -> &[Meal] {
        self.meals.get(&slot).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn total_calories(&self) -> u32 {
        self.meals.values().flatten().map(|m| m.calories).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MealPlan {
    pub days: Vec<DayPlan>,
}

/// Result of a run where every generation stage succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAssessment {
    pub id: Uuid,
    pub score: ScoreSummary,
    pub analysis: Analysis,
    pub recommendations: Recommendations,
    pub meal_plan: MealPlan,
    pub generated_at: DateTime<Utc>,
}

/// Result computed locally without any generated content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FallbackAssessment {
    pub id: Uuid,
    pub score: ScoreSummary,
    #[serde(default)]
    pub insights: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum AssessmentResult {
    AiGenerated(AiAssessment),
    Fallback(FallbackAssessment),
}

impl AssessmentResult {
    pub fn id(&self) -> Uuid {
        match self {
            Self::AiGenerated(ai) => ai.id,
            Self::Fallback(fb) => fb.id,
        }
    }

    pub fn score(&self) -> ScoreSummary {
        match self {
            Self::AiGenerated(ai) => ai.score,
            Self::Fallback(fb) => fb.score,
        }
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        match self {
            Self::AiGenerated(ai) => ai.generated_at,
            Self::Fallback(fb) => fb.generated_at,
        }
    }

    pub fn is_ai_generated(&self) -> bool {
        matches!(self, Self::AiGenerated(_))
    }

    pub fn analysis_summary(&self) -> Option<&str> {
        match self {
            Self::AiGenerated(ai) => Some(ai.analysis.summary.as_str()),
            Self::Fallback(_) => None,
        }
    }

    pub fn recommendations(&self) -> Option<&Recommendations> {
        match self {
            Self::AiGenerated(ai) => Some(&ai.recommendations),
            Self::Fallback(_) => None,
        }
    }

    pub fn meal_plan(&self) -> Option<&MealPlan> {
        match self {
            Self::AiGenerated(ai) => Some(&ai.meal_plan),
            Self::Fallback(_) => None,
        }
    }
}

/// Deserializers that tolerate the loose shapes language models emit.
mod lenient {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Number(f64),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrText {
        List(Vec<String>),
        Text(String),
    }

    fn split_list(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split([',', ';', '\n'])
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    /// Free text that may arrive as a bare number ("15" vs 15).
    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(match Option::<TextOrNumber>::deserialize(deserializer)? {
            Some(TextOrNumber::Text(s)) => s,
            Some(TextOrNumber::Number(n)) => n.to_string(),
            None => String::new(),
        })
    }

    pub fn string_list<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<String>, D::Error> {
        Ok(match Option::<ListOrText>::deserialize(deserializer)? {
            Some(ListOrText::List(items)) => items,
            Some(ListOrText::Text(s)) if s.trim().is_empty() => Vec::new(),
            Some(ListOrText::Text(s)) => vec![s],
            None => Vec::new(),
        })
    }

    pub fn ingredients<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeSet<String>, D::Error> {
        Ok(match ListOrText::deserialize(deserializer)? {
            ListOrText::List(items) => items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            ListOrText::Text(s) => split_list(&s).collect(),
        })
    }

    /// Calories as a whole number; accepts 350, 350.4 or "350 kcal".
    pub fn calories<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        use serde::de::Error;

        match TextOrNumber::deserialize(deserializer)? {
            TextOrNumber::Number(n) if n.is_finite() && n >= 0.0 => Ok(n.round() as u32),
            TextOrNumber::Number(n) => Err(D::Error::custom(format!("invalid calories: {n}"))),
            TextOrNumber::Text(s) => {
                let digits: String = s
                    .trim()
                    .chars()
                    .take_while(|c| c.is_ascii_digit())
                    .collect();
                digits
                    .parse()
                    .map_err(|_| D::Error::custom(format!("invalid calories: '{s}'")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fallback() -> AssessmentResult {
        AssessmentResult::Fallback(FallbackAssessment {
            id: Uuid::new_v4(),
            score: ScoreSummary {
                bmi: 24.5,
                health_score: 98,
                risk_level: RiskLevel::Low,
            },
            insights: vec![],
            generated_at: Utc::now(),
        })
    }

    #[test]
    fn fallback_has_no_generated_content() {
        let result = fallback();
        assert!(!result.is_ai_generated());
        assert!(result.analysis_summary().is_none());
        assert!(result.recommendations().is_none());
        assert!(result.meal_plan().is_none());
        assert_eq!(result.score().health_score, 98);
    }

    #[test]
    fn tagged_serialization_round_trips() {
        let result = fallback();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["source"], "fallback");
        assert_eq!(json["score"]["riskLevel"], "low");
        let back: AssessmentResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn meal_accepts_loose_model_output() {
        let meal: Meal = serde_json::from_str(
            r#"{
                "name": "Oatmeal",
                "ingredients": "oats, milk, blueberries, oats",
                "calories": "350 kcal",
                "prepTime": 10,
                "difficulty": "Easy",
                "nutritionalFocus": "fiber"
            }"#,
        )
        .unwrap();
        assert_eq!(meal.ingredients.len(), 3);
        assert!(meal.ingredients.contains("blueberries"));
        assert_eq!(meal.calories, 350);
        assert_eq!(meal.prep_time, "10");
        assert_eq!(meal.difficulty, Difficulty::Easy);
    }

    #[test]
    fn meal_rejects_unparseable_calories() {
        let result: Result<Meal, _> = serde_json::from_str(
            r#"{"name":"Soup","ingredients":["leek"],"calories":"lots","difficulty":"easy"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn day_plan_slot_lookup_and_calories() {
        let day: DayPlan = serde_json::from_str(
            r#"{"meals":{
                "breakfast":[{"name":"Eggs","ingredients":["egg"],"calories":200,"difficulty":"easy"}],
                "snacks":[{"name":"Apple","ingredients":["apple"],"calories":95.4,"difficulty":"easy"}]
            }}"#,
        )
        .unwrap();
        assert_eq!(day.meals_for(MealSlot::Breakfast).len(), 1);
        assert!(day.meals_for(MealSlot::Dinner).is_empty());
        assert_eq!(day.total_calories(), 295);
    }

    #[test]
    fn analysis_list_fields_accept_single_string() {
        let analysis: Analysis = serde_json::from_str(
            r#"{"healthScore":82,"riskLevel":"low","summary":"Good","keyInsights":"Keep moving"}"#,
        )
        .unwrap();
        assert_eq!(analysis.key_insights, vec!["Keep moving".to_string()]);
        assert!(analysis.positive_aspects.is_empty());
    }
}
