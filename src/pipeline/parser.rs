use std::collections::BTreeMap;
use std::str::FromStr;

use serde_json::{Map, Value};

use super::generation::GenerationError;
use crate::models::assessment::{
    Analysis, DayPlan, Meal, MealPlan, Recommendation, Recommendations, MEAL_PLAN_DAYS,
};
use crate::models::enums::MealSlot;
use crate::scoring::ScoreEngine;

fn malformed(message: impl Into<String>) -> GenerationError {
    GenerationError::MalformedResponse(message.into())
}

/// Pull the JSON payload out of a model response: a fenced block if there
/// is one, otherwise the outermost `{...}` or `[...]` span.
pub fn extract_json(response: &str) -> Result<Value, GenerationError> {
    let candidate = fenced_block(response).unwrap_or_else(|| outer_span(response));
    if candidate.is_empty() {
        return Err(malformed("No JSON found in response"));
    }
    serde_json::from_str(candidate).map_err(|e| malformed(format!("Invalid JSON: {e}")))
}

fn fenced_block(response: &str) -> Option<&str> {
    let start = response.find("```")?;
    let after_fence = &response[start + 3..];
    // Skip an info string such as `json`.
    let body_start = after_fence.find('\n').map(|i| i + 1).unwrap_or(0);
    let body = &after_fence[body_start..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}

fn outer_span(response: &str) -> &str {
    let open = match response.find(['{', '[']) {
        Some(i) => i,
        None => return "",
    };
    let close_char = if response[open..].starts_with('{') { '}' } else { ']' };
    match response.rfind(close_char) {
        Some(close) if close > open => &response[open..=close],
        _ => "",
    }
}

/// Unwrap `{"<key>": {...}}` envelopes some models add around the payload.
fn unwrap_envelope(value: Value, key: &str) -> Value {
    match value {
        Value::Object(mut obj) if obj.len() == 1 && obj.contains_key(key) => {
            obj.remove(key).unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Score must be a whole number in 0..=100; accepts `82`, `82.0` or `"82"`.
fn health_score(value: &Value) -> Option<u8> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if n.fract() != 0.0 || !(0.0..=100.0).contains(&n) {
        return None;
    }
    Some(n as u8)
}

pub fn parse_analysis(response: &str) -> Result<Analysis, GenerationError> {
    let mut value = unwrap_envelope(extract_json(response)?, "analysis");
    let obj = value
        .as_object_mut()
        .ok_or_else(|| malformed("Analysis is not a JSON object"))?;

    let raw_score = obj
        .get("healthScore")
        .ok_or_else(|| malformed("Analysis has no healthScore"))?;
    let score = health_score(raw_score)
        .ok_or_else(|| malformed(format!("healthScore out of range: {raw_score}")))?;
    obj.insert("healthScore".into(), Value::from(score));

    let analysis: Analysis =
        serde_json::from_value(value).map_err(|e| malformed(format!("Analysis: {e}")))?;
    if analysis.summary.trim().is_empty() {
        return Err(malformed("Analysis summary is empty"));
    }
    let expected = ScoreEngine::default().risk_level_for(analysis.health_score);
    if analysis.risk_level != expected {
        return Err(malformed(format!(
            "riskLevel {} does not match healthScore {} (expected {expected})",
            analysis.risk_level, analysis.health_score
        )));
    }
    Ok(analysis)
}

/// Recommendations keyed by category. Keys whose value is not an array
/// (model notes, disclaimers) are ignored. Any malformed item inside a
/// category fails the whole stage, as does an empty result.
pub fn parse_recommendations(response: &str) -> Result<Recommendations, GenerationError> {
    let value = unwrap_envelope(extract_json(response)?, "recommendations");
    let Value::Object(categories) = value else {
        return Err(malformed("Recommendations are not a JSON object"));
    };

    let mut out = Recommendations::new();
    for (category, items) in categories {
        let Value::Array(items) = items else {
            continue;
        };
        let parsed = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                serde_json::from_value::<Recommendation>(item).map_err(|e| {
                    malformed(format!("Recommendation {category}[{i}]: {e}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if !parsed.is_empty() {
            out.insert(category, parsed);
        }
    }

    if out.is_empty() {
        return Err(malformed("No usable recommendations"));
    }
    Ok(out)
}

pub fn parse_meal_plan(response: &str) -> Result<MealPlan, GenerationError> {
    let value = unwrap_envelope(extract_json(response)?, "mealPlan");
    let days = match value {
        Value::Array(days) => days,
        Value::Object(mut obj) => match obj.remove("days") {
            Some(Value::Array(days)) => days,
            _ => return Err(malformed("Meal plan has no days array")),
        },
        _ => return Err(malformed("Meal plan is not JSON object or array")),
    };

    if days.len() != MEAL_PLAN_DAYS {
        return Err(malformed(format!(
            "Meal plan has {} days, expected {MEAL_PLAN_DAYS}",
            days.len()
        )));
    }

    let days = days
        .into_iter()
        .enumerate()
        .map(|(i, day)| parse_day(i, day))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(MealPlan { days })
}

fn slot_for(key: &str) -> Option<MealSlot> {
    match key {
        "snack" => Some(MealSlot::Snacks),
        other => MealSlot::from_str(other).ok(),
    }
}

/// A day's meals may sit under `meals` or directly on the day object.
fn parse_day(index: usize, day: Value) -> Result<DayPlan, GenerationError> {
    let Value::Object(mut obj) = day else {
        return Err(malformed(format!("Day {} is not an object", index + 1)));
    };

    let label = obj.get("day").and_then(|d| match d {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(format!("Day {n}")),
        _ => None,
    });

    let slots: Map<String, Value> = match obj.remove("meals") {
        Some(Value::Object(meals)) => meals,
        _ => obj,
    };

    let mut meals: BTreeMap<MealSlot, Vec<Meal>> = BTreeMap::new();
    for (key, entries) in slots {
        let Some(slot) = slot_for(&key) else {
            continue;
        };
        let entries = match entries {
            Value::Array(list) => list,
            single @ Value::Object(_) => vec![single],
            _ => continue,
        };
        for entry in entries {
            let meal: Meal = serde_json::from_value(entry).map_err(|e| {
                malformed(format!("Day {} {}: {e}", index + 1, slot.as_str()))
            })?;
            meals.entry(slot).or_default().push(meal);
        }
    }

    if meals.is_empty() {
        return Err(malformed(format!("Day {} has no meals", index + 1)));
    }
    Ok(DayPlan { day: label, meals })
}
