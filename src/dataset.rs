use std::cmp::Ordering;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Deserialize;

/// A date cell: parsed when the value is a real calendar date, otherwise the
/// raw text is kept so summaries can still show something instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateValue {
    Parsed(NaiveDate),
    Raw(String),
}

impl DateValue {
    fn parse(text: &str) -> Self {
        for pattern in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"] {
            if let Ok(d) = NaiveDate::parse_from_str(text, pattern) {
                return DateValue::Parsed(d);
            }
        }
        DateValue::Raw(text.to_string())
    }
}

impl fmt::Display for DateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // ISO calendar date, which also sorts correctly as text
            DateValue::Parsed(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            DateValue::Raw(s) => f.write_str(s),
        }
    }
}

impl PartialOrd for DateValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DateValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (DateValue::Parsed(a), DateValue::Parsed(b)) => a.cmp(b),
            _ => self.to_string().cmp(&other.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    revenue: Option<String>,
    #[serde(default)]
    expenses: Option<String>,
}

/// Lenient numeric parse; anything that is not a number counts as absent.
fn parse_f64_safe(cell: Option<&str>) -> Option<f64> {
    cell.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
}

/// One transaction record. Absent cells stay absent; nothing is imputed.
#[derive(Debug, Clone)]
pub struct Record {
    pub date: Option<DateValue>,
    pub revenue: Option<f64>,
    pub expenses: Option<f64>,
}

/// The loaded table plus which columns the header actually declared.
/// Column presence drives which KPI groups get computed, independent of
/// whether individual cells were filled.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<Record>,
    pub has_date: bool,
    pub has_revenue: bool,
    pub has_expenses: bool,
}

/// Load a financial CSV. The header may carry any subset of
/// `date`, `revenue`, `expenses`; extra columns are ignored.
pub fn load_financial_csv(path: &Path) -> Result<Dataset> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let headers = rdr
        .headers()
        .with_context(|| format!("failed to read CSV header of {}", path.display()))?;
    let has_date = headers.iter().any(|h| h == "date");
    let has_revenue = headers.iter().any(|h| h == "revenue");
    let has_expenses = headers.iter().any(|h| h == "expenses");

    let mut records = Vec::new();
    for result in rdr.deserialize::<RawRow>() {
        let row = result.with_context(|| format!("malformed CSV row in {}", path.display()))?;
        records.push(Record {
            date: row
                .date
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(DateValue::parse),
            revenue: parse_f64_safe(row.revenue.as_deref()),
            expenses: parse_f64_safe(row.expenses.as_deref()),
        });
    }

    Ok(Dataset {
        records,
        has_date,
        has_revenue,
        has_expenses,
    })
}
