//! Search query building and rendering

use crate::search::schema::fields;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Sort order for search results
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

/// Result ordering requested by the caller
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum SortMode {
    /// Soonest `nextSessionDate` first
    #[default]
    Upcoming,
    PriceAsc,
    PriceDesc,
}

impl SortMode {
    /// Parse a sort parameter, ignoring case. Unknown values mean `Upcoming`.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.eq_ignore_ascii_case("priceAsc") {
            SortMode::PriceAsc
        } else if value.eq_ignore_ascii_case("priceDesc") {
            SortMode::PriceDesc
        } else {
            SortMode::Upcoming
        }
    }

    /// Field and direction this mode sorts by
    pub fn sort_spec(&self) -> SortSpec {
        match self {
            SortMode::PriceAsc => SortSpec::new(fields::PRICE, SortOrder::Ascending),
            SortMode::PriceDesc => SortSpec::new(fields::PRICE, SortOrder::Descending),
            SortMode::Upcoming => SortSpec::new(fields::NEXT_SESSION_DATE, SortOrder::Ascending),
        }
    }
}

impl From<&str> for SortMode {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

/// Caller-facing search parameters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchQuery {
    /// Free-text term matched against title and description
    pub text: Option<String>,

    /// Caller's age window; overlaps the course's age band
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,

    /// Exact category
    pub category: Option<String>,

    /// Exact course type
    pub course_type: Option<String>,

    /// Price window (inclusive)
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,

    /// Only courses whose next session starts at or after this instant
    pub start_date: Option<DateTime<FixedOffset>>,

    pub sort: SortMode,

    /// Zero-based page index
    pub page: usize,

    /// Page length
    pub size: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            text: None,
            min_age: None,
            max_age: None,
            category: None,
            course_type: None,
            min_price: None,
            max_price: None,
            start_date: None,
            sort: SortMode::Upcoming,
            page: 0,
            size: 10,
        }
    }
}

impl SearchQuery {
    /// Create a query with no text and no filters
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_age_range(mut self, min_age: Option<i32>, max_age: Option<i32>) -> Self {
        self.min_age = min_age;
        self.max_age = max_age;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_type(mut self, course_type: impl Into<String>) -> Self {
        self.course_type = Some(course_type.into());
        self
    }

    pub fn with_price_range(mut self, min_price: Option<f64>, max_price: Option<f64>) -> Self {
        self.min_price = min_price;
        self.max_price = max_price;
        self
    }

    pub fn with_start_date(mut self, start_date: DateTime<FixedOffset>) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn with_sort(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_page(mut self, page: usize, size: usize) -> Self {
        self.page = page;
        self.size = size;
        self
    }

    /// Document offset of the requested page
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }
}

/// Edit-distance tolerance for fuzzy matching
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Fuzziness {
    /// 0 edits up to 2 chars, 1 edit up to 5 chars, 2 edits beyond
    Auto,
}

impl Fuzziness {
    /// Maximum edits allowed for a term of `term_len` characters
    pub fn max_edits(&self, term_len: usize) -> usize {
        match self {
            Fuzziness::Auto => match term_len {
                0..=2 => 0,
                3..=5 => 1,
                _ => 2,
            },
        }
    }
}

/// A field reference with a relevance multiplier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BoostedField {
    pub name: String,
    pub boost: f32,
}

impl BoostedField {
    pub fn new(name: impl Into<String>, boost: f32) -> Self {
        Self {
            name: name.into(),
            boost,
        }
    }

    fn to_dsl(&self) -> String {
        if (self.boost - 1.0).abs() < f32::EPSILON {
            self.name.clone()
        } else {
            format!("{}^{}", self.name, self.boost)
        }
    }
}

/// Typed bound for range clauses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum RangeValue {
    Integer(i64),
    Float(f64),
    Date(DateTime<FixedOffset>),
}

impl RangeValue {
    fn to_dsl(&self) -> Value {
        match self {
            RangeValue::Integer(v) => json!(v),
            RangeValue::Float(v) => json!(v),
            RangeValue::Date(v) => json!(v.to_rfc3339()),
        }
    }
}

/// One node of the structured query
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum QueryClause {
    /// Matches every document
    MatchAll,

    /// Fuzzy full-text match across several fields
    MultiMatch {
        query: String,
        fields: Vec<BoostedField>,
        fuzziness: Fuzziness,
    },

    /// Exact token match on an unanalyzed field
    Term { field: String, value: String },

    /// Inclusive bounds; an absent bound is open
    Range {
        field: String,
        gte: Option<RangeValue>,
        lte: Option<RangeValue>,
    },

    /// Prefix match on an unanalyzed field
    Prefix {
        field: String,
        value: String,
        case_insensitive: bool,
    },

    Bool(BoolQuery),
}

/// `must` clauses score and restrict; `filter` clauses only restrict
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BoolQuery {
    pub must: Vec<QueryClause>,
    pub filter: Vec<QueryClause>,
}

/// Sort directive
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SortSpec {
    pub field: String,
    pub order: SortOrder,
}

impl SortSpec {
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }
}

/// Complete, store-agnostic description of one search request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuerySpec {
    pub query: QueryClause,
    pub sort: Vec<SortSpec>,
    /// Offset of the first hit
    pub from: usize,
    /// Maximum number of hits
    pub size: usize,
    /// Restrict returned source to these fields
    pub source_includes: Option<Vec<String>>,
}

impl QueryClause {
    /// Render as Elasticsearch query DSL
    pub fn to_dsl(&self) -> Value {
        match self {
            QueryClause::MatchAll => json!({ "match_all": {} }),
            QueryClause::MultiMatch {
                query,
                fields,
                fuzziness,
            } => {
                let fields: Vec<String> = fields.iter().map(BoostedField::to_dsl).collect();
                let fuzziness = match fuzziness {
                    Fuzziness::Auto => "AUTO",
                };
                json!({
                    "multi_match": {
                        "query": query,
                        "fields": fields,
                        "fuzziness": fuzziness
                    }
                })
            }
            QueryClause::Term { field, value } => {
                let mut term = Map::new();
                term.insert(field.clone(), json!({ "value": value }));
                json!({ "term": term })
            }
            QueryClause::Range { field, gte, lte } => {
                let mut bounds = Map::new();
                if let Some(gte) = gte {
                    bounds.insert("gte".to_string(), gte.to_dsl());
                }
                if let Some(lte) = lte {
                    bounds.insert("lte".to_string(), lte.to_dsl());
                }
                let mut range = Map::new();
                range.insert(field.clone(), Value::Object(bounds));
                json!({ "range": range })
            }
            QueryClause::Prefix {
                field,
                value,
                case_insensitive,
            } => {
                let mut prefix = Map::new();
                prefix.insert(
                    field.clone(),
                    json!({ "value": value, "case_insensitive": case_insensitive }),
                );
                json!({ "prefix": prefix })
            }
            QueryClause::Bool(bool_query) => {
                let must: Vec<Value> = bool_query.must.iter().map(QueryClause::to_dsl).collect();
                let filter: Vec<Value> =
                    bool_query.filter.iter().map(QueryClause::to_dsl).collect();
                json!({ "bool": { "must": must, "filter": filter } })
            }
        }
    }
}

impl QuerySpec {
    /// Render the full `_search` request body
    pub fn to_dsl(&self) -> Value {
        let sort: Vec<Value> = self
            .sort
            .iter()
            .map(|s| {
                let mut entry = Map::new();
                entry.insert(s.field.clone(), json!({ "order": s.order.as_str() }));
                Value::Object(entry)
            })
            .collect();

        let mut body = json!({
            "query": self.query.to_dsl(),
            "from": self.from,
            "size": self.size,
            "track_total_hits": true
        });

        if !sort.is_empty() {
            body["sort"] = Value::Array(sort);
        }
        if let Some(ref includes) = self.source_includes {
            body["_source"] = json!({ "includes": includes });
        }

        body
    }
}

/// Translates search parameters into a `QuerySpec`
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryBuilder;

impl QueryBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the structured query for a set of search parameters.
    ///
    /// The text clause is always present as a `must`: a fuzzy multi-field
    /// match for non-blank text, `MatchAll` otherwise. Every other parameter
    /// contributes an independent `filter` clause.
    pub fn build(&self, query: &SearchQuery) -> QuerySpec {
        let mut bool_query = BoolQuery::default();

        bool_query.must.push(Self::text_clause(query.text.as_deref()));

        if let Some(category) = non_blank(query.category.as_deref()) {
            bool_query.filter.push(QueryClause::Term {
                field: fields::CATEGORY.to_string(),
                value: category.to_string(),
            });
        }

        if let Some(course_type) = non_blank(query.course_type.as_deref()) {
            bool_query.filter.push(QueryClause::Term {
                field: fields::TYPE.to_string(),
                value: course_type.to_string(),
            });
        }

        if let Some(start_date) = query.start_date {
            bool_query.filter.push(range_gte(
                fields::NEXT_SESSION_DATE,
                RangeValue::Date(start_date),
            ));
        }

        // NaN and infinities are not bounds; treat them as absent
        if let Some(min_price) = query.min_price.filter(|p| p.is_finite()) {
            bool_query
                .filter
                .push(range_gte(fields::PRICE, RangeValue::Float(min_price)));
        }

        if let Some(max_price) = query.max_price.filter(|p| p.is_finite()) {
            bool_query
                .filter
                .push(range_lte(fields::PRICE, RangeValue::Float(max_price)));
        }

        // Age overlap: course.maxAge >= caller.minAge AND course.minAge <= caller.maxAge
        if let Some(min_age) = query.min_age {
            bool_query.filter.push(range_gte(
                fields::MAX_AGE,
                RangeValue::Integer(i64::from(min_age)),
            ));
        }

        if let Some(max_age) = query.max_age {
            bool_query.filter.push(range_lte(
                fields::MIN_AGE,
                RangeValue::Integer(i64::from(max_age)),
            ));
        }

        QuerySpec {
            query: QueryClause::Bool(bool_query),
            sort: vec![query.sort.sort_spec()],
            from: query.offset(),
            size: query.size,
            source_includes: None,
        }
    }

    /// Build a title prefix lookup used by the prefix suggestion strategy
    pub fn title_prefix(&self, prefix: &str, size: usize) -> QuerySpec {
        QuerySpec {
            query: QueryClause::Prefix {
                field: fields::TITLE_KEYWORD.to_string(),
                value: prefix.to_string(),
                case_insensitive: true,
            },
            sort: Vec::new(),
            from: 0,
            size,
            source_includes: Some(vec![fields::TITLE.to_string()]),
        }
    }

    fn text_clause(text: Option<&str>) -> QueryClause {
        match non_blank(text) {
            Some(text) => QueryClause::MultiMatch {
                query: text.to_string(),
                fields: vec![
                    BoostedField::new(fields::TITLE, 2.0),
                    BoostedField::new(fields::DESCRIPTION, 1.0),
                ],
                fuzziness: Fuzziness::Auto,
            },
            None => QueryClause::MatchAll,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn range_gte(field: &str, value: RangeValue) -> QueryClause {
    QueryClause::Range {
        field: field.to_string(),
        gte: Some(value),
        lte: None,
    }
}

fn range_lte(field: &str, value: RangeValue) -> QueryClause {
    QueryClause::Range {
        field: field.to_string(),
        gte: None,
        lte: Some(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bool_of(spec: &QuerySpec) -> &BoolQuery {
        match &spec.query {
            QueryClause::Bool(b) => b,
            other => panic!("expected bool query, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_text_matches_all() {
        let builder = QueryBuilder::new();

        for query in [SearchQuery::new(), SearchQuery::new().with_text("   ")] {
            let spec = builder.build(&query);
            let b = bool_of(&spec);
            assert_eq!(b.must, vec![QueryClause::MatchAll]);
            assert!(b.filter.is_empty());
        }
    }

    #[test]
    fn test_text_is_fuzzy_multi_match_with_title_boost() {
        let spec = QueryBuilder::new().build(&SearchQuery::new().with_text("math"));

        match &bool_of(&spec).must[0] {
            QueryClause::MultiMatch {
                query,
                fields,
                fuzziness,
            } => {
                assert_eq!(query, "math");
                assert_eq!(fields[0], BoostedField::new("title", 2.0));
                assert_eq!(fields[1], BoostedField::new("description", 1.0));
                assert_eq!(*fuzziness, Fuzziness::Auto);
            }
            other => panic!("unexpected clause {:?}", other),
        }
    }

    #[test]
    fn test_age_window_is_overlap() {
        let spec = QueryBuilder::new().build(&SearchQuery::new().with_age_range(Some(8), Some(12)));
        let b = bool_of(&spec);

        assert_eq!(
            b.filter,
            vec![
                QueryClause::Range {
                    field: "maxAge".to_string(),
                    gte: Some(RangeValue::Integer(8)),
                    lte: None,
                },
                QueryClause::Range {
                    field: "minAge".to_string(),
                    gte: None,
                    lte: Some(RangeValue::Integer(12)),
                },
            ]
        );
    }

    #[test]
    fn test_blank_category_is_ignored() {
        let spec = QueryBuilder::new().build(&SearchQuery::new().with_category(" ").with_type("CLUB"));
        let b = bool_of(&spec);

        assert_eq!(b.filter.len(), 1);
        assert_eq!(
            b.filter[0],
            QueryClause::Term {
                field: "type".to_string(),
                value: "CLUB".to_string()
            }
        );
    }

    #[test]
    fn test_non_finite_price_bounds_are_ignored() {
        let builder = QueryBuilder::new();

        for (min, max) in [
            (Some(f64::NAN), None),
            (None, Some(f64::INFINITY)),
            (Some(f64::NEG_INFINITY), Some(f64::NAN)),
        ] {
            let spec = builder.build(&SearchQuery::new().with_price_range(min, max));
            assert!(bool_of(&spec).filter.is_empty());
            assert!(!spec.to_dsl().to_string().contains("null"));
        }

        let spec = builder.build(&SearchQuery::new().with_price_range(Some(f64::NAN), Some(90.0)));
        assert_eq!(
            bool_of(&spec).filter,
            vec![range_lte("price", RangeValue::Float(90.0))]
        );
    }

    #[test]
    fn test_sort_modes() {
        assert_eq!(SortMode::parse("priceAsc"), SortMode::PriceAsc);
        assert_eq!(SortMode::parse("PRICEDESC"), SortMode::PriceDesc);
        assert_eq!(SortMode::parse("upcoming"), SortMode::Upcoming);
        assert_eq!(SortMode::parse("bogus"), SortMode::Upcoming);

        let spec = QueryBuilder::new().build(&SearchQuery::new().with_sort(SortMode::PriceDesc));
        assert_eq!(spec.sort, vec![SortSpec::new("price", SortOrder::Descending)]);

        let spec = QueryBuilder::new().build(&SearchQuery::new());
        assert_eq!(spec.sort, vec![SortSpec::new("nextSessionDate", SortOrder::Ascending)]);
    }

    #[test]
    fn test_pagination_offset() {
        let spec = QueryBuilder::new().build(&SearchQuery::new().with_page(3, 25));
        assert_eq!(spec.from, 75);
        assert_eq!(spec.size, 25);

        let huge = SearchQuery::new().with_page(usize::MAX, 2);
        assert_eq!(huge.offset(), usize::MAX);
    }

    #[test]
    fn test_fuzziness_auto() {
        assert_eq!(Fuzziness::Auto.max_edits(2), 0);
        assert_eq!(Fuzziness::Auto.max_edits(4), 1);
        assert_eq!(Fuzziness::Auto.max_edits(9), 2);
    }

    #[test]
    fn test_dsl_rendering() {
        let start = DateTime::parse_from_rfc3339("2025-06-01T00:00:00Z").unwrap();
        let query = SearchQuery::new()
            .with_text("robots")
            .with_category("Science")
            .with_price_range(Some(10.0), None)
            .with_start_date(start)
            .with_sort(SortMode::PriceAsc)
            .with_page(1, 5);

        let dsl = QueryBuilder::new().build(&query).to_dsl();

        assert_eq!(dsl["from"], 5);
        assert_eq!(dsl["size"], 5);
        assert_eq!(dsl["track_total_hits"], true);
        assert_eq!(dsl["sort"][0]["price"]["order"], "asc");

        let must = &dsl["query"]["bool"]["must"][0]["multi_match"];
        assert_eq!(must["fields"][0], "title^2");
        assert_eq!(must["fields"][1], "description");
        assert_eq!(must["fuzziness"], "AUTO");

        let filter = &dsl["query"]["bool"]["filter"];
        assert_eq!(filter[0]["term"]["category"]["value"], "Science");
        assert_eq!(
            filter[1]["range"]["nextSessionDate"]["gte"],
            "2025-06-01T00:00:00+00:00"
        );
        assert_eq!(filter[2]["range"]["price"]["gte"], 10.0);
    }

    #[test]
    fn test_title_prefix_spec() {
        let dsl = QueryBuilder::new().title_prefix("Math", 10).to_dsl();
        assert_eq!(dsl["query"]["prefix"]["title.keyword"]["value"], "Math");
        assert_eq!(dsl["query"]["prefix"]["title.keyword"]["case_insensitive"], true);
        assert_eq!(dsl["_source"]["includes"][0], "title");
        assert!(dsl.get("sort").is_none());
    }
}
