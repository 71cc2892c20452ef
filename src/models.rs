use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A single exercise as it appears on a scanned plan.
/// Value type: replaced wholesale on edit, never mutated field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub name: String,
    pub sets: u32,
    /// Free-form rep scheme, e.g. "8-12" or "5,5,3".
    pub reps: String,
    pub muscle_group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Rest between sets, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_time: Option<u32>,
}

/// An exercise slot inside a stored plan.
/// The id is assigned once at plan creation and keys the edit history,
/// so reordering or removing slots can never mix up their histories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanExercise {
    pub id: String,
    #[serde(flatten)]
    pub details: Exercise,
}

/// A named, dated workout plan.
/// `exercises` order is the session traversal order and is stable under edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutPlan {
    pub id: String,
    pub title: String,
    /// Pinned to noon of the scheduled day so the serialized form carries
    /// no offset and cannot shift across timezones when re-parsed.
    pub date_created: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_played: Option<DateTime<Local>>,
    pub exercises: Vec<PlanExercise>,
}

/// One routine as returned by the AI extraction step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedRoutine {
    pub routine_name: String,
    pub exercises: Vec<Exercise>,
}

/// A provisional routine between extraction and user confirmation.
/// Discarded on cancel; superseded by permanent plans on finalize.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftRoutine {
    pub id: String,
    pub routine_name: String,
    pub selected_date: NaiveDate,
    pub exercises: Vec<Exercise>,
}

/// UI accent colours, persisted alongside the plan collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub primary: String,
    pub secondary: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            primary: "#10b981".to_string(),
            secondary: "#3b82f6".to_string(),
        }
    }
}

impl ThemeConfig {
    /// Parses a `#rrggbb` colour into its channels, `None` if malformed.
    pub fn parse_hex(hex: &str) -> Option<(u8, u8, u8)> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some((r, g, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exercise_round_trips_with_camel_case_fields() {
        let json = r#"{"name":"Bench Press","sets":4,"reps":"8-10","muscleGroup":"chest","restTime":90}"#;
        let ex: Exercise = serde_json::from_str(json).unwrap();
        assert_eq!(ex.name, "Bench Press");
        assert_eq!(ex.muscle_group, "chest");
        assert_eq!(ex.rest_time, Some(90));
        assert_eq!(ex.notes, None);

        let back = serde_json::to_value(&ex).unwrap();
        assert_eq!(back["muscleGroup"], "chest");
        assert!(back.get("notes").is_none());
    }

    #[test]
    fn plan_exercise_flattens_details() {
        let json = r#"{"id":"abc","name":"Squat","sets":5,"reps":"5","muscleGroup":"quads"}"#;
        let slot: PlanExercise = serde_json::from_str(json).unwrap();
        assert_eq!(slot.id, "abc");
        assert_eq!(slot.details.name, "Squat");
    }

    #[test]
    fn parse_hex_accepts_default_theme() {
        assert_eq!(ThemeConfig::parse_hex("#10b981"), Some((0x10, 0xb9, 0x81)));
        assert_eq!(ThemeConfig::parse_hex("3b82f6"), Some((0x3b, 0x82, 0xf6)));
        assert_eq!(ThemeConfig::parse_hex("#fff"), None);
        assert_eq!(ThemeConfig::parse_hex("#zzzzzz"), None);
    }
}
