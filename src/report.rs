//! Downloadable markdown reports. The kind of report follows the explicit
//! assessment tag: a narrative is only requested when AI content exists.

use std::fmt::Write as _;

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::medications::adherence;
use crate::models::assessment::{AiAssessment, AssessmentResult};
use crate::models::record::UserRecord;
use crate::pipeline::generation::{GenerationClient, GenerationOptions};
use crate::pipeline::prompt::build_report_prompt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Narrative,
    Basic,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub kind: ReportKind,
    pub filename: String,
    pub content: String,
}

pub struct ReportGenerator {
    client: Option<Box<dyn GenerationClient + Send + Sync>>,
}

impl ReportGenerator {
    pub fn new(client: Option<Box<dyn GenerationClient + Send + Sync>>) -> Self {
        Self { client }
    }

    pub fn generate(&self, record: &UserRecord) -> Report {
        self.generate_on(record, Utc::now().date_naive())
    }

    /// Narrative report for AI assessments when a client is available,
    /// otherwise (or if the narrative fails) the basic template.
    pub fn generate_on(&self, record: &UserRecord, date: NaiveDate) -> Report {
        if let (Some(AssessmentResult::AiGenerated(ai)), Some(client)) =
            (record.assessment.as_ref(), self.client.as_deref())
        {
            match narrative(client, record, ai) {
                Ok(content) => {
                    return Report {
                        kind: ReportKind::Narrative,
                        filename: format!("HealthWise_Health_Report_{date}.md"),
                        content,
                    };
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Narrative report failed, using basic report");
                }
            }
        }

        Report {
            kind: ReportKind::Basic,
            filename: format!("HealthWise_Basic_Report_{date}.md"),
            content: basic_report(record, date),
        }
    }
}

fn narrative(
    client: &(dyn GenerationClient + Send + Sync),
    record: &UserRecord,
    ai: &AiAssessment,
) -> Result<String, crate::pipeline::GenerationError> {
    let prompt = build_report_prompt(record, &ai.analysis, &ai.recommendations);
    let text = client.generate(&prompt, &GenerationOptions::REPORT)?;
    Ok(text.trim().to_string())
}

/// Templated report built from the record alone.
pub fn basic_report(record: &UserRecord, date: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# HealthWise Basic Health Report\n");
    let _ = writeln!(out, "**Date:** {}", date.format("%Y-%m-%d"));
    let _ = writeln!(out, "**Full Name:** {}\n", record.full_name);

    let _ = writeln!(out, "## Health Metrics");
    let _ = writeln!(out, "- **BMI:** {:.1}", record.bmi);
    let _ = writeln!(out, "- **Resting Heart Rate:** {} BPM", record.resting_heart_rate);
    let _ = writeln!(out, "- **Systolic BP:** {} mmHg", record.systolic_bp);
    let _ = writeln!(out, "- **Weight:** {} kg", record.weight_kg);
    let _ = writeln!(out, "- **Height:** {} cm\n", record.height_cm);

    let _ = writeln!(out, "## Health Summary");
    let _ = writeln!(out, "- **Health Score:** {}", record.health_score);
    let _ = writeln!(
        out,
        "- **Risk Level:** {}",
        record.risk_level.as_str().to_uppercase()
    );
    if let Some(AssessmentResult::Fallback(fb)) = &record.assessment {
        for insight in &fb.insights {
            let _ = writeln!(out, "- {insight}");
        }
    }
    out.push('\n');

    let _ = writeln!(out, "## Lifestyle");
    let _ = writeln!(out, "- **Physical Activity:** {}", record.physical_activity);
    let _ = writeln!(out, "- **Dietary Habits:** {}", record.dietary_habits);
    let _ = writeln!(out, "- **Smoking Habits:** {}", record.smoking_habits);
    let _ = writeln!(out, "- **Existing Conditions:** {}\n", record.existing_conditions);

    let _ = writeln!(out, "## Medication Tracker");
    if record.medications.is_empty() {
        let _ = writeln!(out, "- No medications recorded");
    } else {
        let (taken, total) = adherence(record);
        let _ = writeln!(out, "- **Taken today:** {taken} of {total}");
    }
    for med in &record.medications {
        let _ = writeln!(
            out,
            "- {} at {} (Taken: {})",
            med.name,
            med.time,
            if med.taken { "Yes" } else { "No" }
        );
    }

    let _ = write!(
        out,
        "\n*This is a basic report. For detailed insights and personalized recommendations, \
         please complete the AI-powered health assessment.*\n"
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::HealthProfile;
    use crate::pipeline::generation::{GenerationError, MockGenerationClient};
    use crate::pipeline::parser::fixtures;
    use crate::pipeline::{assess, AssessmentPipeline};
    use crate::scoring::ScoreEngine;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn ai_record() -> UserRecord {
        let pipeline = AssessmentPipeline::new(Box::new(
            MockGenerationClient::new()
                .with_text(fixtures::ANALYSIS)
                .with_text(fixtures::RECOMMENDATIONS)
                .with_text(&fixtures::meal_plan()),
        ));
        let profile = HealthProfile::example();
        let mut record = UserRecord::default();
        record.apply_profile(&profile);
        record.attach_assessment(assess(&profile, Some(&pipeline), &ScoreEngine::default()));
        record
    }

    fn fallback_record() -> UserRecord {
        let mut profile = HealthProfile::example();
        profile.physical_activity = crate::models::enums::PhysicalActivity::Sedentary;
        let mut record = UserRecord::default();
        record.apply_profile(&profile);
        record.attach_assessment(assess(&profile, None, &ScoreEngine::default()));
        record
    }

    #[test]
    fn basic_report_lists_metrics_and_medications() {
        let report = ReportGenerator::new(None).generate_on(&UserRecord::default(), date());
        assert_eq!(report.kind, ReportKind::Basic);
        assert_eq!(report.filename, "HealthWise_Basic_Report_2025-03-14.md");
        assert!(report.content.contains("**Full Name:** John Doe"));
        assert!(report.content.contains("- **Risk Level:** LOW"));
        assert!(report.content.contains("- Vitamin D at 8:00 AM (Taken: Yes)"));
        assert!(report.content.contains("- Omega-3 at 12:00 PM (Taken: No)"));
        assert!(report.content.contains("- **Taken today:** 1 of 2"));
    }

    #[test]
    fn fallback_record_never_requests_narrative() {
        let client = MockGenerationClient::new().with_text("# Narrative");
        let generator = ReportGenerator::new(Some(Box::new(client)));
        let report = generator.generate_on(&fallback_record(), date());
        assert_eq!(report.kind, ReportKind::Basic);
        assert!(report.content.contains("physical activity"));
    }

    #[test]
    fn ai_record_gets_narrative() {
        let client = MockGenerationClient::new().with_text("\n# Your Health Report\n\nAll good.\n");
        let generator = ReportGenerator::new(Some(Box::new(client)));
        let report = generator.generate_on(&ai_record(), date());
        assert_eq!(report.kind, ReportKind::Narrative);
        assert_eq!(report.content, "# Your Health Report\n\nAll good.");
        assert_eq!(report.filename, "HealthWise_Health_Report_2025-03-14.md");
    }

    #[test]
    fn narrative_failure_degrades_to_basic() {
        let client = MockGenerationClient::new().with_failure(GenerationError::Timeout(60));
        let generator = ReportGenerator::new(Some(Box::new(client)));
        let report = generator.generate_on(&ai_record(), date());
        assert_eq!(report.kind, ReportKind::Basic);
    }

    #[test]
    fn ai_record_without_client_is_basic() {
        let report = ReportGenerator::new(None).generate_on(&ai_record(), date());
        assert_eq!(report.kind, ReportKind::Basic);
        assert!(report.content.contains("- **Health Score:** 88"));
    }
}
