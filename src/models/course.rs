use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// A single offered course as stored in the search index
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecord {
    /// Stable identifier, used as the document key
    #[serde(default)]
    pub id: String,

    /// Course title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Exact-match category (e.g. "Math")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Exact-match course type (e.g. "ONE_TIME", "COURSE", "CLUB")
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub course_type: Option<String>,

    /// Informational grade band (e.g. "1st-3rd")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade_range: Option<String>,

    /// Lower bound of the inclusive age band
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_age: Option<i32>,

    /// Upper bound of the inclusive age band
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,

    /// Next scheduled session, offset preserved
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_session_date: Option<DateTime<FixedOffset>>,

    /// Autocomplete input, always derived from `title` before indexing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggest: Option<SuggestField>,
}

/// Completion-field payload: `{"input": [...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestField {
    pub input: Vec<String>,
}

/// Derive the autocomplete input for a title.
///
/// Returns `Some([title])` for a non-blank title and `None` otherwise.
pub fn derive_suggest(title: Option<&str>) -> Option<SuggestField> {
    title
        .filter(|t| !t.trim().is_empty())
        .map(|t| SuggestField {
            input: vec![t.to_string()],
        })
}

impl CourseRecord {
    /// Create a record with only the identifier and title set
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Return the record with `suggest` recomputed from `title`.
    ///
    /// Any value already present in `suggest` is discarded.
    pub fn with_derived_suggest(mut self) -> Self {
        self.suggest = derive_suggest(self.title.as_deref());
        self
    }

    /// Title, or the empty string when absent
    pub fn title_str(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_suggest_from_title() {
        let suggest = derive_suggest(Some("Math Explorers")).unwrap();
        assert_eq!(suggest.input, vec!["Math Explorers".to_string()]);
    }

    #[test]
    fn test_derive_suggest_blank_title() {
        assert!(derive_suggest(None).is_none());
        assert!(derive_suggest(Some("")).is_none());
        assert!(derive_suggest(Some("   \t")).is_none());
    }

    #[test]
    fn test_with_derived_suggest_overwrites_stale_value() {
        let mut course = CourseRecord::new("c-1", "Science Quest");
        course.suggest = Some(SuggestField {
            input: vec!["Old Title".to_string()],
        });

        let course = course.with_derived_suggest();
        assert_eq!(course.suggest.unwrap().input, vec!["Science Quest".to_string()]);

        let mut untitled = CourseRecord::new("c-2", " ");
        untitled.suggest = Some(SuggestField {
            input: vec!["stale".to_string()],
        });
        assert!(untitled.with_derived_suggest().suggest.is_none());
    }

    #[test]
    fn test_camel_case_wire_format() {
        let json = serde_json::json!({
            "id": "c-1",
            "title": "Math Explorers",
            "category": "Math",
            "type": "COURSE",
            "gradeRange": "1st-3rd",
            "minAge": 6,
            "maxAge": 10,
            "price": 100.0,
            "nextSessionDate": "2025-06-10T15:00:00+05:30"
        });

        let course: CourseRecord = serde_json::from_value(json).unwrap();
        assert_eq!(course.course_type.as_deref(), Some("COURSE"));
        assert_eq!(course.grade_range.as_deref(), Some("1st-3rd"));
        assert_eq!(course.min_age, Some(6));
        assert_eq!(
            course.next_session_date.unwrap().offset().local_minus_utc(),
            5 * 3600 + 30 * 60
        );

        let value = serde_json::to_value(course.with_derived_suggest()).unwrap();
        assert_eq!(value["suggest"]["input"][0], "Math Explorers");
        assert_eq!(value["type"], "COURSE");
        assert!(value.get("description").is_none());
    }
}
