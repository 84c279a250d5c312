//! Index schema for course documents

use serde_json::{json, Value};

/// Field names as stored in the document store
pub mod fields {
    pub const TITLE: &str = "title";
    /// Unanalyzed form of the title, used by the prefix suggestion strategy
    pub const TITLE_KEYWORD: &str = "title.keyword";
    pub const DESCRIPTION: &str = "description";
    pub const CATEGORY: &str = "category";
    pub const TYPE: &str = "type";
    pub const MIN_AGE: &str = "minAge";
    pub const MAX_AGE: &str = "maxAge";
    pub const PRICE: &str = "price";
    pub const NEXT_SESSION_DATE: &str = "nextSessionDate";
    pub const SUGGEST: &str = "suggest";
}

/// Build the index mapping for course documents.
///
/// `title` and `description` are full-text, `category`, `type` and `gradeRange`
/// are exact tokens, and `suggest` is a completion field. `title` carries a
/// `keyword` sub-field so prefix lookups can run against the raw title.
pub fn course_index_mapping() -> Value {
    json!({
        "mappings": {
            "properties": {
                "title": {
                    "type": "text",
                    "fields": {
                        "keyword": { "type": "keyword", "ignore_above": 256 }
                    }
                },
                "description": { "type": "text" },
                "category": { "type": "keyword" },
                "type": { "type": "keyword" },
                "gradeRange": { "type": "keyword" },
                "minAge": { "type": "integer" },
                "maxAge": { "type": "integer" },
                "price": { "type": "double" },
                "nextSessionDate": { "type": "date" },
                "suggest": { "type": "completion" }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_field_types() {
        let mapping = course_index_mapping();
        let props = &mapping["mappings"]["properties"];

        assert_eq!(props["title"]["type"], "text");
        assert_eq!(props["title"]["fields"]["keyword"]["type"], "keyword");
        assert_eq!(props["category"]["type"], "keyword");
        assert_eq!(props["type"]["type"], "keyword");
        assert_eq!(props["gradeRange"]["type"], "keyword");
        assert_eq!(props["minAge"]["type"], "integer");
        assert_eq!(props["price"]["type"], "double");
        assert_eq!(props["nextSessionDate"]["type"], "date");
        assert_eq!(props["suggest"]["type"], "completion");
    }
}
