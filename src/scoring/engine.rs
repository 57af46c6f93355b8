use serde::Serialize;

use super::table::ScoringTable;
use crate::models::assessment::ScoreSummary;
use crate::models::enums::RiskLevel;
use crate::models::profile::HealthProfile;

/// Round to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Body-mass index from kilograms and centimetres, one decimal.
pub fn bmi(weight_kg: f64, height_cm: u32) -> f64 {
    let height_m = f64::from(height_cm) / 100.0;
    round1(weight_kg / (height_m * height_m))
}

/// Points earned by each factor, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FactorPoints {
    pub age: u32,
    pub bmi: u32,
    pub resting_heart_rate: u32,
    pub systolic_bp: u32,
    pub activity: u32,
    pub smoking: u32,
    pub conditions: u32,
}

impl FactorPoints {
    pub fn total(&self) -> u32 {
        self.age
            + self.bmi
            + self.resting_heart_rate
            + self.systolic_bp
            + self.activity
            + self.smoking
            + self.conditions
    }
}

/// Deterministic scorer over a validated profile. Pure: no I/O, no clock.
#[derive(Debug, Clone, Default)]
pub struct ScoreEngine {
    table: ScoringTable,
}

impl ScoreEngine {
    pub fn new(table: ScoringTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &ScoringTable {
        &self.table
    }

    pub fn factor_points(&self, profile: &HealthProfile) -> FactorPoints {
        let t = &self.table;
        FactorPoints {
            age: t.age.points_for(f64::from(profile.age)),
            bmi: t.bmi.points_for(bmi(profile.weight_kg, profile.height_cm)),
            resting_heart_rate: t
                .resting_heart_rate
                .points_for(f64::from(profile.resting_heart_rate)),
            systolic_bp: t.systolic_bp.points_for(f64::from(profile.systolic_bp)),
            activity: t
                .activity
                .get(&profile.physical_activity)
                .copied()
                .unwrap_or(0),
            smoking: t.smoking.get(&profile.smoking_habits).copied().unwrap_or(0),
            conditions: self.condition_points(&profile.existing_conditions),
        }
    }

    fn condition_points(&self, existing_conditions: &str) -> u32 {
        let tiers = &self.table.conditions;
        let condition = existing_conditions.trim().to_lowercase();
        if condition == crate::models::profile::NO_CONDITIONS {
            tiers.none_points
        } else if tiers.reduced_conditions.iter().any(|c| *c == condition) {
            tiers.reduced_points
        } else {
            tiers.other_points
        }
    }

    /// Compute BMI, health score and risk level.
    pub fn score(&self, profile: &HealthProfile) -> ScoreSummary {
        let earned = self.factor_points(profile).total();
        let max = self.table.max_points().max(1);
        let health_score = (100.0 * f64::from(earned) / f64::from(max)).round();

        let health_score = health_score.clamp(0.0, 100.0) as u8;
        ScoreSummary {
            bmi: bmi(profile.weight_kg, profile.height_cm),
            health_score,
            risk_level: self.risk_level_for(health_score),
        }
    }

    /// Risk level as a function of the score alone.
    pub fn risk_level_for(&self, health_score: u8) -> RiskLevel {
        let thresholds = self.table.risk;
        if health_score >= thresholds.low_min {
            RiskLevel::Low
        } else if health_score >= thresholds.moderate_min {
            RiskLevel::Moderate
        } else {
            RiskLevel::High
        }
    }
}
