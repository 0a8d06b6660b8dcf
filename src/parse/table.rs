use serde::Serialize;

/// One logical CSV line. Field count is not tied to the header's.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Row(Vec<String>);

impl Row {
    pub fn new(fields: Vec<String>) -> Self {
        Row(fields)
    }

    /// Field at `idx`, or `""` when the column was not found or the row is short.
    pub fn get(&self, idx: Option<usize>) -> &str {
        idx.and_then(|i| self.0.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn fields(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First position whose value equals `name` exactly.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.0.iter().position(|f| f == name)
    }
}

impl From<Vec<&str>> for Row {
    fn from(fields: Vec<&str>) -> Self {
        Row(fields.into_iter().map(str::to_string).collect())
    }
}

/// Output of a single parse call; row 0 is conventionally the header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    pub(crate) fn from_rows(rows: Vec<Row>) -> Self {
        Table { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn header(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Every row after the header.
    pub fn data_rows(&self) -> &[Row] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// Header lookup by exact, case-sensitive name. Duplicates resolve to the first.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header().and_then(|h| h.position(name))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
