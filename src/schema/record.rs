use csv::StringRecord;
use std::collections::{BTreeMap, HashMap};

/// A single input row, addressed by column name.
pub trait Record {
    /// Cell value for `column`, or `None` when the row has no such column.
    fn get(&self, column: &str) -> Option<&str>;
}

impl Record for HashMap<String, String> {
    fn get(&self, column: &str) -> Option<&str> {
        HashMap::get(self, column).map(String::as_str)
    }
}

impl Record for BTreeMap<String, String> {
    fn get(&self, column: &str) -> Option<&str> {
        BTreeMap::get(self, column).map(String::as_str)
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn get(&self, column: &str) -> Option<&str> {
        (**self).get(column)
    }
}

/// Column name → position, built once from a CSV header record.
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    /// Duplicate header names resolve to the last occurrence.
    pub fn new(headers: &StringRecord) -> Self {
        let positions = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.to_string(), i))
            .collect();
        Self { positions }
    }

    fn contains(&self, column: &str) -> bool {
        self.positions.contains_key(column)
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.positions.get(column).copied()
    }

    /// Distinct column names in the header.
    pub fn column_count(&self) -> usize {
        self.positions.len()
    }
}

/// A CSV record viewed through its file's header.
pub struct HeaderedRecord<'a> {
    headers: &'a HeaderIndex,
    record: &'a StringRecord,
}

impl<'a> HeaderedRecord<'a> {
    pub fn new(headers: &'a HeaderIndex, record: &'a StringRecord) -> Self {
        Self { headers, record }
    }
}

impl Record for HeaderedRecord<'_> {
    fn get(&self, column: &str) -> Option<&str> {
        self.headers
            .position(column)
            .and_then(|idx| self.record.get(idx))
    }
}

/// The header alone, answering "is this column present" with an empty value.
/// Lets header-only inspection reuse the row resolution logic.
impl Record for HeaderIndex {
    fn get(&self, column: &str) -> Option<&str> {
        self.contains(column).then_some("")
    }
}
