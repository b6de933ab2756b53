use serde::Serialize;

/// One fetched result set, every value already rendered as text.
/// `None` is a SQL NULL.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl QueryResult {
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Text blob compared by the classifier: rows joined by `\n`, columns by `\t`,
/// whole blob trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CanonicalForm(String);

impl CanonicalForm {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CanonicalForm {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for CanonicalForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn normalize(result: &QueryResult) -> CanonicalForm {
    let mut out = String::new();
    for (i, row) in result.rows.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for (j, value) in row.iter().enumerate() {
            if j > 0 {
                out.push('\t');
            }
            out.push_str(value.as_deref().unwrap_or(""));
        }
    }
    CanonicalForm(out.trim().to_string())
}
