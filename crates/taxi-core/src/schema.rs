//! Header detection for loosely formatted reference tables.
//!
//! Survey exports name their columns inconsistently ("Vertex_Index",
//! "vertex id", "LATITUDE"...). A [`ColumnMatcher`] holds an ordered list of
//! case-insensitive predicates; the first predicate that matches any header
//! wins, and within a predicate the leftmost header wins.

use crate::error::{Result, TaxiError};

/// A single case-insensitive header predicate.
#[derive(Debug, Clone)]
pub enum HeaderRule {
    /// Header contains the needle
    Contains(&'static str),
    /// Header contains every needle
    ContainsAll(&'static [&'static str]),
    /// Header contains the needle and none of the excluded words
    ContainsExcept(&'static str, &'static [&'static str]),
    /// Header contains the needle and at least one of the qualifiers
    ContainsWithAny(&'static str, &'static [&'static str]),
}

impl HeaderRule {
    fn matches(&self, header: &str) -> bool {
        match self {
            HeaderRule::Contains(needle) => header.contains(needle),
            HeaderRule::ContainsAll(needles) => needles.iter().all(|n| header.contains(n)),
            HeaderRule::ContainsExcept(needle, excluded) => {
                header.contains(needle) && !excluded.iter().any(|e| header.contains(e))
            }
            HeaderRule::ContainsWithAny(needle, qualifiers) => {
                header.contains(needle) && qualifiers.iter().any(|q| header.contains(q))
            }
        }
    }
}

/// Prioritized header matcher for one logical column.
#[derive(Debug, Clone)]
pub struct ColumnMatcher {
    pub name: &'static str,
    rules: Vec<HeaderRule>,
}

impl ColumnMatcher {
    pub fn new(name: &'static str, rules: Vec<HeaderRule>) -> Self {
        Self { name, rules }
    }

    /// Position of the matching header, if any.
    pub fn find<S: AsRef<str>>(&self, headers: &[S]) -> Option<usize> {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| h.as_ref().trim().to_lowercase())
            .collect();
        self.rules
            .iter()
            .find_map(|rule| normalized.iter().position(|header| rule.matches(header)))
    }

    /// Like [`ColumnMatcher::find`] but missing columns are a schema error.
    pub fn require<S: AsRef<str>>(&self, table: &str, headers: &[S]) -> Result<usize> {
        self.find(headers).ok_or_else(|| TaxiError::Schema {
            table: table.to_string(),
            column: self.name.to_string(),
            headers: headers
                .iter()
                .map(|h| h.as_ref().trim())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }
}

pub fn vertex_id_column() -> ColumnMatcher {
    ColumnMatcher::new(
        "vertex index",
        vec![
            HeaderRule::ContainsWithAny("vertex", &["index", "id"]),
            HeaderRule::Contains("vertex"),
        ],
    )
}

pub fn latitude_column() -> ColumnMatcher {
    ColumnMatcher::new("latitude", vec![HeaderRule::Contains("lat")])
}

pub fn longitude_column() -> ColumnMatcher {
    ColumnMatcher::new("longitude", vec![HeaderRule::Contains("lon")])
}

pub fn ident_column() -> ColumnMatcher {
    ColumnMatcher::new("ident", vec![HeaderRule::Contains("ident")])
}

/// Segment tables usually also carry a "Vertex_Count" column, which must not
/// be mistaken for the vertex list.
pub fn vertex_list_column() -> ColumnMatcher {
    ColumnMatcher::new(
        "vertex list",
        vec![
            HeaderRule::ContainsAll(&["vertex", "indices"]),
            HeaderRule::ContainsExcept("vertex", &["count"]),
            HeaderRule::Contains("vertex"),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_is_case_insensitive_and_trims() {
        let headers = [" Vertex_Index ", "LATITUDE", "Longitude"];
        assert_eq!(vertex_id_column().find(&headers), Some(0));
        assert_eq!(latitude_column().find(&headers), Some(1));
        assert_eq!(longitude_column().find(&headers), Some(2));
    }

    #[test]
    fn vertex_list_skips_count_column() {
        let headers = ["Ident", "Vertex_Count", "Vertex_Indices"];
        assert_eq!(vertex_list_column().find(&headers), Some(2));

        let headers = ["Ident", "Vertex_Count", "Vertices"];
        assert_eq!(vertex_list_column().find(&headers), Some(2));
    }

    #[test]
    fn earlier_rule_beats_earlier_header() {
        let headers = ["vertex_label", "vertex_id"];
        assert_eq!(vertex_id_column().find(&headers), Some(1));
    }

    #[test]
    fn missing_column_is_schema_error() {
        let err = ident_column()
            .require("segment", &["name", "vertices"])
            .unwrap_err();
        assert!(matches!(err, TaxiError::Schema { .. }));
        assert!(err.to_string().contains("ident"));
    }
}
