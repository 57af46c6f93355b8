//! Deterministic scoring: BMI, banded health score, risk level and
//! rule-based insights. Used directly on the fallback path and for the
//! locally computed BMI on the AI path.

pub mod engine;
pub mod insights;
pub mod table;

pub use engine::{bmi, round1, FactorPoints, ScoreEngine};
pub use insights::{chronic_family_condition, insights};
pub use table::{Band, BandedFactor, ConditionTiers, RiskThresholds, ScoringTable, TableError};
