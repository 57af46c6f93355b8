//! Canonical scoring table.
//!
//! The table is plain data so the same bands serve every scoring caller and
//! can be shipped or replaced as configuration. `version` identifies the
//! point allocation a score was computed with.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::enums::{PhysicalActivity, SmokingHabit};

/// Inclusive `[min, max]` range worth `points`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f64,
    pub max: f64,
    pub points: u32,
}

impl Band {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// A numeric factor: bands are tried in order, first match wins,
/// otherwise `floor_points`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandedFactor {
    pub max_points: u32,
    pub bands: Vec<Band>,
    pub floor_points: u32,
}

impl BandedFactor {
    pub fn points_for(&self, value: f64) -> u32 {
        self.bands
            .iter()
            .find(|band| band.contains(value))
            .map(|band| band.points)
            .unwrap_or(self.floor_points)
    }

    fn highest_award(&self) -> u32 {
        self.bands
            .iter()
            .map(|b| b.points)
            .chain(std::iter::once(self.floor_points))
            .max()
            .unwrap_or(0)
    }
}

/// Existing-conditions tiers: none, a recognised reduced-impact condition, anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionTiers {
    pub max_points: u32,
    pub none_points: u32,
    /// Lower-case condition names scored at `reduced_points`.
    pub reduced_conditions: Vec<String>,
    pub reduced_points: u32,
    pub other_points: u32,
}

/// Score thresholds for risk levels: `>= low_min` is low, `>= moderate_min` moderate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub low_min: u8,
    pub moderate_min: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringTable {
    pub version: String,
    pub age: BandedFactor,
    pub bmi: BandedFactor,
    pub resting_heart_rate: BandedFactor,
    pub systolic_bp: BandedFactor,
    pub activity_max_points: u32,
    pub activity: BTreeMap<PhysicalActivity, u32>,
    pub smoking_max_points: u32,
    pub smoking: BTreeMap<SmokingHabit, u32>,
    pub conditions: ConditionTiers,
    pub risk: RiskThresholds,
}

#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("Scoring table is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Scoring table factor '{factor}' awards more than its {max} maximum points")]
    PointsExceedMax { factor: &'static str, max: u32 },

    #[error("Scoring table has no tier for '{0}'")]
    MissingTier(String),

    #[error("Scoring table has a zero point maximum")]
    ZeroMaximum,

    #[error("Risk thresholds must satisfy moderate_min <= low_min <= 100")]
    InvalidThresholds,
}

fn band(min: f64, max: f64, points: u32) -> Band {
    Band { min, max, points }
}

impl ScoringTable {
    pub const CANONICAL_VERSION: &'static str = "2024.1";

    /// The single authoritative point allocation (100 points total).
    ///
    /// | factor | max | tiers |
    /// |---|---|---|
    /// | age | 15 | 18–65: 15, 13–80: 12, else 8 |
    /// | BMI | 20 | 18.5–24.9: 20, 17–29.9: 15, else 10 |
    /// | resting HR | 15 | 60–100: 15, 50–110: 12, else 8 |
    /// | systolic BP | 15 | <120: 15, <140: 12, else 8 |
    /// | activity | 15 | very/extremely: 15, moderately: 13, lightly: 10, sedentary: 5 |
    /// | smoking | 10 | never 10, former 8, occasional 5, regular 3, heavy 1 |
    /// | conditions | 10 | none 10, diabetes/hypertension 6, other 4 |
    pub fn canonical() -> Self {
        Self {
            version: Self::CANONICAL_VERSION.to_string(),
            age: BandedFactor {
                max_points: 15,
                bands: vec![band(18.0, 65.0, 15), band(13.0, 80.0, 12)],
                floor_points: 8,
            },
            bmi: BandedFactor {
                max_points: 20,
                bands: vec![band(18.5, 24.9, 20), band(17.0, 29.9, 15)],
                floor_points: 10,
            },
            resting_heart_rate: BandedFactor {
                max_points: 15,
                bands: vec![band(60.0, 100.0, 15), band(50.0, 110.0, 12)],
                floor_points: 8,
            },
            // Systolic readings are whole mmHg, so 119 is "< 120".
            systolic_bp: BandedFactor {
                max_points: 15,
                bands: vec![band(0.0, 119.0, 15), band(0.0, 139.0, 12)],
                floor_points: 8,
            },
            activity_max_points: 15,
            activity: BTreeMap::from([
                (PhysicalActivity::ExtremelyActive, 15),
                (PhysicalActivity::VeryActive, 15),
                (PhysicalActivity::ModeratelyActive, 13),
                (PhysicalActivity::LightlyActive, 10),
                (PhysicalActivity::Sedentary, 5),
            ]),
            smoking_max_points: 10,
            smoking: BTreeMap::from([
                (SmokingHabit::Never, 10),
                (SmokingHabit::Former, 8),
                (SmokingHabit::Occasional, 5),
                (SmokingHabit::Regular, 3),
                (SmokingHabit::Heavy, 1),
            ]),
            conditions: ConditionTiers {
                max_points: 10,
                none_points: 10,
                reduced_conditions: vec!["diabetes".into(), "hypertension".into()],
                reduced_points: 6,
                other_points: 4,
            },
            risk: RiskThresholds {
                low_min: 80,
                moderate_min: 60,
            },
        }
    }

    /// Load a table shipped as JSON and check it before use.
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        let table: Self = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    pub fn max_points(&self) -> u32 {
        self.age.max_points
            + self.bmi.max_points
            + self.resting_heart_rate.max_points
            + self.systolic_bp.max_points
            + self.activity_max_points
            + self.smoking_max_points
            + self.conditions.max_points
    }

    /// Every award must fit its factor maximum and every enum value needs a tier,
    /// otherwise a score could exceed 100 or silently drop a factor.
    pub fn validate(&self) -> Result<(), TableError> {
        for (factor, banded) in [
            ("age", &self.age),
            ("bmi", &self.bmi),
            ("resting_heart_rate", &self.resting_heart_rate),
            ("systolic_bp", &self.systolic_bp),
        ] {
            if banded.highest_award() > banded.max_points {
                return Err(TableError::PointsExceedMax {
                    factor,
                    max: banded.max_points,
                });
            }
        }

        for activity in PhysicalActivity::ALL {
            match self.activity.get(activity) {
                None => return Err(TableError::MissingTier(activity.to_string())),
                Some(points) if *points > self.activity_max_points => {
                    return Err(TableError::PointsExceedMax {
                        factor: "activity",
                        max: self.activity_max_points,
                    })
                }
                Some(_) => {}
            }
        }

        for habit in SmokingHabit::ALL {
            match self.smoking.get(habit) {
                None => return Err(TableError::MissingTier(habit.to_string())),
                Some(points) if *points > self.smoking_max_points => {
                    return Err(TableError::PointsExceedMax {
                        factor: "smoking",
                        max: self.smoking_max_points,
                    })
                }
                Some(_) => {}
            }
        }

        let c = &self.conditions;
        if c.none_points.max(c.reduced_points).max(c.other_points) > c.max_points {
            return Err(TableError::PointsExceedMax {
                factor: "conditions",
                max: c.max_points,
            });
        }

        if self.max_points() == 0 {
            return Err(TableError::ZeroMaximum);
        }

        if self.risk.moderate_min > self.risk.low_min || self.risk.low_min > 100 {
            return Err(TableError::InvalidThresholds);
        }

        Ok(())
    }
}

impl Default for ScoringTable {
    fn default() -> Self {
        Self::canonical()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_totals_one_hundred() {
        let table = ScoringTable::canonical();
        assert_eq!(table.max_points(), 100);
        assert!(table.validate().is_ok());
    }

    #[test]
    fn first_matching_band_wins() {
        let table = ScoringTable::canonical();
        assert_eq!(table.bmi.points_for(24.9), 20);
        assert_eq!(table.bmi.points_for(25.0), 15);
        assert_eq!(table.bmi.points_for(16.9), 10);
        assert_eq!(table.systolic_bp.points_for(119.0), 15);
        assert_eq!(table.systolic_bp.points_for(120.0), 12);
        assert_eq!(table.systolic_bp.points_for(140.0), 8);
    }

    #[test]
    fn json_round_trip_is_validated() {
        let json = serde_json::to_string(&ScoringTable::canonical()).unwrap();
        let table = ScoringTable::from_json(&json).unwrap();
        assert_eq!(table.version, ScoringTable::CANONICAL_VERSION);
    }

    #[test]
    fn award_above_maximum_rejected() {
        let mut table = ScoringTable::canonical();
        table.age.bands[0].points = 16;
        assert!(matches!(
            table.validate(),
            Err(TableError::PointsExceedMax { factor: "age", .. })
        ));
    }

    #[test]
    fn missing_tier_rejected() {
        let mut table = ScoringTable::canonical();
        table.smoking.remove(&SmokingHabit::Heavy);
        assert!(matches!(table.validate(), Err(TableError::MissingTier(_))));
    }

    #[test]
    fn inverted_thresholds_rejected() {
        let mut table = ScoringTable::canonical();
        table.risk = RiskThresholds {
            low_min: 50,
            moderate_min: 70,
        };
        assert!(matches!(table.validate(), Err(TableError::InvalidThresholds)));
    }

    #[test]
    fn malformed_json_rejected() {
        assert!(matches!(
            ScoringTable::from_json("{\"version\": 1"),
            Err(TableError::Parse(_))
        ));
    }
}
