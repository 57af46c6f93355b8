use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A string did not name any variant of a closed enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid value for {field}: '{value}'")]
pub struct ParseEnumError {
    pub field: String,
    pub value: String,
}

/// Normalise wire spellings: case, surrounding whitespace, `_` or ` ` separators.
fn normalize(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace(['_', ' '], "-")
}

/// Macro to generate enum with as_str + std::str::FromStr pattern.
///
/// Serde goes through the same string form, so stored records and
/// generated JSON share one spelling.
macro_rules! str_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match normalize(s).as_str() {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ParseEnumError {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

str_enum!(
    /// Self-reported physical activity level.
    PhysicalActivity {
        Sedentary => "sedentary",
        LightlyActive => "lightly-active",
        ModeratelyActive => "moderately-active",
        VeryActive => "very-active",
        ExtremelyActive => "extremely-active",
    }
);

str_enum!(
    /// Smoking status, ordered from least to most exposure.
    SmokingHabit {
        Never => "never",
        Former => "former",
        Occasional => "occasional",
        Regular => "regular",
        Heavy => "heavy",
    }
);

str_enum!(
    /// Overall risk bracket derived from a health score.
    RiskLevel {
        Low => "low",
        Moderate => "moderate",
        High => "high",
    }
);

str_enum!(Priority {
    High => "high",
    Medium => "medium",
    Low => "low",
});

str_enum!(Difficulty {
    Easy => "easy",
    Medium => "medium",
    Hard => "hard",
});

str_enum!(
    /// Meal slots of a single meal-plan day, in serving order.
    MealSlot {
        Breakfast => "breakfast",
        Lunch => "lunch",
        Dinner => "dinner",
        Snacks => "snacks",
    }
);

impl RiskLevel {
    /// One step more severe, saturating at `High`.
    pub fn escalate(self) -> Self {
        match self {
            Self::Low => Self::Moderate,
            Self::Moderate | Self::High => Self::High,
        }
    }
}
