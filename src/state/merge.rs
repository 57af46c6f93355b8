use serde_json::{Map, Value};

use crate::models::record::UserRecord;

const COMPLETED_IDS: &str = "completedRecommendationIds";
const LEGACY_COMPLETED_IDS: &str = "completedRecommendations";

/// Overlay a loaded record onto `defaults`, one field at a time.
///
/// A field present in `loaded` replaces the default when its value is
/// usable; a missing, unknown or ill-typed field keeps the default. Never
/// fails: anything that is not a JSON object yields `defaults` unchanged.
pub fn merge(defaults: &UserRecord, loaded: &Value) -> UserRecord {
    let Value::Object(loaded) = loaded else {
        return defaults.clone();
    };
    let Ok(Value::Object(mut base)) = serde_json::to_value(defaults) else {
        return defaults.clone();
    };

    for (key, value) in loaded {
        let key = match key.as_str() {
            LEGACY_COMPLETED_IDS if !loaded.contains_key(COMPLETED_IDS) => COMPLETED_IDS,
            other => other,
        };
        if !base.contains_key(key) {
            continue;
        }
        let previous = base.insert(key.to_string(), value.clone());
        if !deserializes(&base) {
            tracing::debug!(field = key, "Ignoring unusable stored field");
            if let Some(previous) = previous {
                base.insert(key.to_string(), previous);
            }
        }
    }

    serde_json::from_value(Value::Object(base)).unwrap_or_else(|_| defaults.clone())
}

fn deserializes(candidate: &Map<String, Value>) -> bool {
    serde_json::from_value::<UserRecord>(Value::Object(candidate.clone())).is_ok()
}
