/// Configuration for the parsing pipeline.
#[derive(Debug, Clone)]
pub struct ParseConfig {
    /// Maximum nesting depth tolerated by the flattener and the row
    /// expander before they fail with `ParseError::DepthExceeded`.
    pub max_depth: usize,

    /// When false, fields whose names match the datetime allow-list are
    /// typed as String instead of Datetime (values are still normalized).
    pub allow_datetime: bool,

    /// Name substrings that mark a field as a timestamp. Matching is
    /// case-sensitive substring match against the cleaned field name.
    pub datetime_fields: Vec<String>,
}

/// Timestamp-bearing field names used by the metadata API.
pub const DEFAULT_DATETIME_FIELDS: &[&str] = &[
    "createdAt",
    "updatedAt",
    "extractLastRefreshTime",
    "extractLastIncrementalUpdateTime",
    "extractLastUpdateTime",
    "extractLastRefreshedAt",
    "extractLastRefreshedAtWithin",
];

impl Default for ParseConfig {
    fn default() -> Self {
        ParseConfig {
            max_depth: 32,
            allow_datetime: true,
            datetime_fields: DEFAULT_DATETIME_FIELDS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}
