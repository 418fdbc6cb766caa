//! Domain types for the sales dataset.

/// Feature column names, in the order they appear in a feature row.
pub const FEATURE_COLUMNS: [&str; 3] = ["ProductID", "HolidayIndicator", "SpecialEvent"];

/// Target column name.
pub const TARGET_COLUMN: &str = "SalesQuantity";

/// One row of the sales table.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct SalesRecord {
    /// Integer-coded product identifier.
    #[serde(rename = "ProductID")]
    pub product_id: u32,
    /// 1 on holidays, 0 otherwise.
    #[serde(rename = "HolidayIndicator")]
    pub holiday_indicator: u8,
    /// 1 when a special event ran, 0 otherwise.
    #[serde(rename = "SpecialEvent")]
    pub special_event: u8,
    /// Units sold.
    #[serde(rename = "SalesQuantity")]
    pub sales_quantity: f64,
}

impl SalesRecord {
    /// Feature row in [`FEATURE_COLUMNS`] order.
    #[must_use]
    pub fn features(&self) -> Vec<f64> {
        vec![
            f64::from(self.product_id),
            f64::from(self.holiday_indicator),
            f64::from(self.special_event),
        ]
    }
}

/// An ordered collection of [`SalesRecord`]s.
///
/// Row order is significant: split indices refer to positions in it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesDataset {
    records: Vec<SalesRecord>,
}

impl SalesDataset {
    /// Wrap a list of records.
    #[must_use]
    pub fn new(records: Vec<SalesRecord>) -> Self {
        Self { records }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// `true` when the dataset has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Borrow the rows.
    #[must_use]
    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    /// Feature column names as owned strings.
    #[must_use]
    pub fn feature_names(&self) -> Vec<String> {
        FEATURE_COLUMNS.iter().map(|c| (*c).to_string()).collect()
    }

    /// Row-major feature matrix.
    #[must_use]
    pub fn features(&self) -> Vec<Vec<f64>> {
        self.records.iter().map(SalesRecord::features).collect()
    }

    /// Target column.
    #[must_use]
    pub fn targets(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.sales_quantity).collect()
    }

    /// Build a new dataset from the rows at `indices`, in that order.
    ///
    /// # Panics
    ///
    /// Panics if any index is out of bounds.
    #[must_use]
    pub fn select(&self, indices: &[usize]) -> Self {
        Self {
            records: indices.iter().map(|&i| self.records[i]).collect(),
        }
    }
}

impl FromIterator<SalesRecord> for SalesDataset {
    fn from_iter<I: IntoIterator<Item = SalesRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
