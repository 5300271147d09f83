use indexmap::IndexMap;
use serde::Serialize;

/// A validated `(model, disposition, quantity)` triple.
///
/// Within a [`CleanedTable`] each `(model, disposition)` pair is unique and
/// `quantity` is strictly positive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanedRecord {
    pub model: String,
    pub disposition: String,
    pub quantity: f64,
}

impl CleanedRecord {
    pub fn new(model: impl Into<String>, disposition: impl Into<String>, quantity: f64) -> Self {
        Self {
            model: model.into(),
            disposition: disposition.into(),
            quantity,
        }
    }
}

/// Cleaned records of one sheet, in first-encountered key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CleanedTable {
    records: Vec<CleanedRecord>,
}

impl CleanedTable {
    /// Build a table from already-aggregated records.
    #[must_use]
    pub fn from_records(records: Vec<CleanedRecord>) -> Self {
        Self { records }
    }

    #[must_use]
    pub fn records(&self) -> &[CleanedRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CleanedRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of all quantities.
    #[must_use]
    pub fn total_quantity(&self) -> f64 {
        self.records.iter().map(|r| r.quantity).sum()
    }

    /// Quantity for one `(model, disposition)` pair, if present.
    #[must_use]
    pub fn quantity_of(&self, model: &str, disposition: &str) -> Option<f64> {
        self.records
            .iter()
            .find(|r| r.model == model && r.disposition == disposition)
            .map(|r| r.quantity)
    }
}

impl<'a> IntoIterator for &'a CleanedTable {
    type Item = &'a CleanedRecord;
    type IntoIter = std::slice::Iter<'a, CleanedRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Ordered mapping from sheet name to its non-empty cleaned table.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct SheetCollection {
    sheets: IndexMap<String, CleanedTable>,
}

impl SheetCollection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a table; empty tables are refused and `false` is returned.
    pub fn insert(&mut self, name: impl Into<String>, table: CleanedTable) -> bool {
        if table.is_empty() {
            return false;
        }
        self.sheets.insert(name.into(), table);
        true
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CleanedTable> {
        self.sheets.get(name)
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.sheets.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CleanedTable)> {
        self.sheets.iter().map(|(name, table)| (name.as_str(), table))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_refuses_empty_tables() {
        let mut sheets = SheetCollection::new();
        assert!(!sheets.insert("empty", CleanedTable::default()));
        assert!(sheets.insert(
            "full",
            CleanedTable::from_records(vec![CleanedRecord::new("M1", "단순변심", 1.0)])
        ));
        assert_eq!(sheets.names(), vec!["full"]);
    }

    #[test]
    fn test_table_totals() {
        let table = CleanedTable::from_records(vec![
            CleanedRecord::new("M1", "단순변심", 2.0),
            CleanedRecord::new("M2", "물량교환", 3.5),
        ]);
        assert_eq!(table.len(), 2);
        assert!((table.total_quantity() - 5.5).abs() < f64::EPSILON);
        assert_eq!(table.quantity_of("M2", "물량교환"), Some(3.5));
        assert_eq!(table.quantity_of("M2", "단순변심"), None);
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let table = CleanedTable::from_records(vec![CleanedRecord::new("M1", "단순변심", 2.0)]);
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"model": "M1", "disposition": "단순변심", "quantity": 2.0}])
        );
    }
}
