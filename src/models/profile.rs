//! Health profile: the validated vitals and lifestyle input to every assessment.
//!
//! Two entry points share the same field rules:
//! - `HealthProfile::from_input()` for loosely typed form data (every field optional)
//! - `HealthProfile::validate()` for an already typed profile
//!
//! Both collect every failing field before returning, so a caller can show
//! all corrections at once.

use serde::{Deserialize, Serialize};

use super::enums::{PhysicalActivity, SmokingHabit};

/// Sentinel for "no existing conditions".
pub const NO_CONDITIONS: &str = "none";

const AGE_RANGE: (f64, f64) = (1.0, 120.0);
const WEIGHT_RANGE: (f64, f64) = (20.0, 300.0);
const HEIGHT_RANGE: (f64, f64) = (100.0, 250.0);
const HEART_RATE_RANGE: (f64, f64) = (40.0, 200.0);
const SYSTOLIC_RANGE: (f64, f64) = (70.0, 200.0);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthProfile {
    pub full_name: String,
    #[serde(default)]
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
    #[serde(default)]
    pub family_history: String,
}

/// Raw, unvalidated profile fields as submitted by a form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    pub full_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub age: Option<f64>,
    pub weight_kg: Option<f64>,
    pub height_cm: Option<f64>,
    pub resting_heart_rate: Option<f64>,
    #[serde(rename = "systolicBP")]
    pub systolic_bp: Option<f64>,
    pub physical_activity: Option<String>,
    pub general_lifestyle: Option<String>,
    pub dietary_habits: Option<String>,
    pub smoking_habits: Option<String>,
    pub existing_conditions: Option<String>,
    pub family_history: Option<String>,
}

/// One rejected field with a message fit to show next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Please correct the highlighted fields ({} invalid)", errors.len())]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

/// Accumulates field errors across a whole profile.
#[derive(Default)]
struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    fn push(&mut self, field: &str, message: &str) {
        self.0.push(FieldError {
            field: field.to_string(),
            message: message.to_string(),
        });
    }

    fn finish(self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { errors: self.0 })
        }
    }
}

fn message_for(field: &str) -> &'static str {
    match field {
        "fullName" => "Please enter your full name",
        "age" => "Please enter a valid age between 1-120",
        "weightKg" => "Please enter a valid weight between 20-300 kg",
        "heightCm" => "Please enter a valid height between 100-250 cm",
        "restingHeartRate" => "Please enter a valid heart rate between 40-200 BPM",
        "systolicBP" => "Please enter a valid systolic BP between 70-200 mmHg",
        "physicalActivity" => "Please select your physical activity level",
        "generalLifestyle" => "Please select your general lifestyle pattern",
        "dietaryHabits" => "Please select your dietary habits",
        "smokingHabits" => "Please select your smoking status",
        "existingConditions" => "Please select existing health conditions",
        _ => "Please check this field",
    }
}

fn in_range(value: f64, (min, max): (f64, f64)) -> bool {
    value.is_finite() && value >= min && value <= max
}

fn valid_name(name: &str) -> bool {
    name.trim().chars().count() >= 2
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Range check for a field that must also be a whole number.
fn whole_in_range(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<f64>,
    range: (f64, f64),
) -> u32 {
    match value {
        Some(v) if in_range(v, range) && v.fract() == 0.0 => v as u32,
        _ => {
            errors.push(field, message_for(field));
            0
        }
    }
}

impl HealthProfile {
    /// Validate and convert raw form input. Every field is checked.
    pub fn from_input(input: ProfileInput) -> Result<Self, ValidationError> {
        let mut errors = FieldErrors::default();

        let full_name = non_blank(input.full_name).filter(|n| valid_name(n));
        if full_name.is_none() {
            errors.push("fullName", message_for("fullName"));
        }

        let age = whole_in_range(&mut errors, "age", input.age, AGE_RANGE);

        let weight_kg = match input.weight_kg {
            Some(w) if in_range(w, WEIGHT_RANGE) => w,
            _ => {
                errors.push("weightKg", message_for("weightKg"));
                0.0
            }
        };

        let height_cm = whole_in_range(&mut errors, "heightCm", input.height_cm, HEIGHT_RANGE);
        let resting_heart_rate = whole_in_range(
            &mut errors,
            "restingHeartRate",
            input.resting_heart_rate,
            HEART_RATE_RANGE,
        );
        let systolic_bp =
            whole_in_range(&mut errors, "systolicBP", input.systolic_bp, SYSTOLIC_RANGE);

        let physical_activity = non_blank(input.physical_activity)
            .and_then(|v| v.parse::<PhysicalActivity>().ok());
        if physical_activity.is_none() {
            errors.push("physicalActivity", message_for("physicalActivity"));
        }

        let general_lifestyle = non_blank(input.general_lifestyle);
        if general_lifestyle.is_none() {
            errors.push("generalLifestyle", message_for("generalLifestyle"));
        }

        let dietary_habits = non_blank(input.dietary_habits);
        if dietary_habits.is_none() {
            errors.push("dietaryHabits", message_for("dietaryHabits"));
        }

        let smoking_habits =
            non_blank(input.smoking_habits).and_then(|v| v.parse::<SmokingHabit>().ok());
        if smoking_habits.is_none() {
            errors.push("smokingHabits", message_for("smokingHabits"));
        }

        let existing_conditions = non_blank(input.existing_conditions);
        if existing_conditions.is_none() {
            errors.push("existingConditions", message_for("existingConditions"));
        }

        errors.finish()?;

        // finish() returned Ok, so every Option above is Some.
        match (
            full_name,
            physical_activity,
            general_lifestyle,
            dietary_habits,
            smoking_habits,
            existing_conditions,
        ) {
            (
                Some(full_name),
                Some(physical_activity),
                Some(general_lifestyle),
                Some(dietary_habits),
                Some(smoking_habits),
                Some(existing_conditions),
            ) => Ok(Self {
                full_name,
                date_of_birth: non_blank(input.date_of_birth),
                age,
                weight_kg,
                height_cm,
                resting_heart_rate,
                systolic_bp,
                physical_activity,
                general_lifestyle,
                dietary_habits,
                smoking_habits,
                existing_conditions,
                family_history: input.family_history.unwrap_or_default().trim().to_string(),
            }),
            _ => Err(ValidationError { errors: Vec::new() }),
        }
    }

    /// Re-check the range rules on a typed profile.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = FieldErrors::default();

        if !valid_name(&self.full_name) {
            errors.push("fullName", message_for("fullName"));
        }
        let numeric = [
            ("age", f64::from(self.age), AGE_RANGE),
            ("weightKg", self.weight_kg, WEIGHT_RANGE),
            ("heightCm", f64::from(self.height_cm), HEIGHT_RANGE),
            ("restingHeartRate", f64::from(self.resting_heart_rate), HEART_RATE_RANGE),
            ("systolicBP", f64::from(self.systolic_bp), SYSTOLIC_RANGE),
        ];
        for (field, value, range) in numeric {
            if !in_range(value, range) {
                errors.push(field, message_for(field));
            }
        }
        for (field, value) in [
            ("generalLifestyle", &self.general_lifestyle),
            ("dietaryHabits", &self.dietary_habits),
            ("existingConditions", &self.existing_conditions),
        ] {
            if value.trim().is_empty() {
                errors.push(field, message_for(field));
            }
        }

        errors.finish()
    }

    /// True unless existing conditions is the "none" sentinel.
    pub fn has_existing_conditions(&self) -> bool {
        !self.existing_conditions.trim().eq_ignore_ascii_case(NO_CONDITIONS)
    }
}

#[cfg(test)]
impl HealthProfile {
    /// A healthy 30-year-old used across module tests.
    pub(crate) fn example() -> Self {
        Self {
            full_name: "Jordan Avery".into(),
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
        }
    }
}
