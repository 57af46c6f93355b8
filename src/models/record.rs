//! The persisted user record: profile fields, the latest assessment,
//! the medication list and recommendation completion state.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::assessment::AssessmentResult;
use super::enums::{PhysicalActivity, RiskLevel, SmokingHabit};
use super::profile::{HealthProfile, NO_CONDITIONS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    /// Display time, e.g. "8:00 AM".
    pub time: String,
    #[serde(default)]
    pub taken: bool,
}

impl Medication {
    pub fn new(name: &str, time: &str) -> Self {
        Self {
            name: name.to_string(),
            time: time.to_string(),
            taken: false,
        }
    }
}

/// Single current-user aggregate, stored whole under one key.
///
/// Profile and score fields are flat so that loading an older record
/// can keep every field it has and default only the ones it lacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub full_name: String,
    pub date_of_birth: Option<String>,
    pub age: u32,
    pub weight_kg: f64,
    pub height_cm: u32,
    pub resting_heart_rate: u32,
    #[serde(rename = "systolicBP")]
    pub systolic_bp: u32,
    pub physical_activity: PhysicalActivity,
    pub general_lifestyle: String,
    pub dietary_habits: String,
    pub smoking_habits: SmokingHabit,
    pub existing_conditions: String,
    pub family_history: String,

    pub bmi: f64,
    pub health_score: u8,
    pub risk_level: RiskLevel,
    pub assessment: Option<AssessmentResult>,

    pub medications: Vec<Medication>,
    #[serde(alias = "completedRecommendations")]
    pub completed_recommendation_ids: BTreeSet<String>,
}

impl Default for UserRecord {
    /// First-run record for a new user.
    fn default() -> Self {
        Self {
            full_name: "John Doe".into(),
            date_of_birth: None,
            age: 30,
            weight_kg: 75.0,
            height_cm: 175,
            resting_heart_rate: 72,
            systolic_bp: 120,
            physical_activity: PhysicalActivity::ModeratelyActive,
            general_lifestyle: "moderate".into(),
            dietary_habits: "balanced".into(),
            smoking_habits: SmokingHabit::Never,
            existing_conditions: NO_CONDITIONS.into(),
            family_history: String::new(),
            bmi: 0.0,
            health_score: 85,
            risk_level: RiskLevel::Low,
            assessment: None,
            medications: vec![
                Medication {
                    name: "Vitamin D".into(),
                    time: "8:00 AM".into(),
                    taken: true,
                },
                Medication::new("Omega-3", "12:00 PM"),
            ],
            completed_recommendation_ids: BTreeSet::new(),
        }
    }
}

impl UserRecord {
    /// Snapshot of the profile fields.
    pub fn profile(&self) -> HealthProfile {
        HealthProfile {
            full_name: self.full_name.clone(),
            date_of_birth: self.date_of_birth.clone(),
            age: self.age,
            weight_kg: self.weight_kg,
            height_cm: self.height_cm,
            resting_heart_rate: self.resting_heart_rate,
            systolic_bp: self.systolic_bp,
            physical_activity: self.physical_activity,
            general_lifestyle: self.general_lifestyle.clone(),
            dietary_habits: self.dietary_habits.clone(),
            smoking_habits: self.smoking_habits,
            existing_conditions: self.existing_conditions.clone(),
            family_history: self.family_history.clone(),
        }
    }

    /// Replace every profile field.
    pub fn apply_profile(&mut self, profile: &HealthProfile) {
        self.full_name = profile.full_name.clone();
        self.date_of_birth = profile.date_of_birth.clone();
        self.age = profile.age;
        self.weight_kg = profile.weight_kg;
        self.height_cm = profile.height_cm;
        self.resting_heart_rate = profile.resting_heart_rate;
        self.systolic_bp = profile.systolic_bp;
        self.physical_activity = profile.physical_activity;
        self.general_lifestyle = profile.general_lifestyle.clone();
        self.dietary_habits = profile.dietary_habits.clone();
        self.smoking_habits = profile.smoking_habits;
        self.existing_conditions = profile.existing_conditions.clone();
        self.family_history = profile.family_history.clone();
    }

    /// Attach a new assessment. Completion state is cleared because
    /// recommendation identifiers are positional and do not survive regeneration.
    pub fn attach_assessment(&mut self, result: AssessmentResult) {
        let score = result.score();
        self.bmi = score.bmi;
        self.health_score = score.health_score;
        self.risk_level = score.risk_level;
        self.assessment = Some(result);
        self.completed_recommendation_ids.clear();
    }
}
