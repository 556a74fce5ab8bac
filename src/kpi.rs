use serde::Serialize;

use crate::dataset::Dataset;

/// Aggregate indicators for one run. Every field is optional: a group is
/// populated only when the dataset declared the columns it needs, and absent
/// fields are omitted from the serialized form.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Kpis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expenses_total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_total: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub margin_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_end: Option<String>,
}

/// Compute aggregate KPIs from the dataset. Pure; never fails.
///
/// The money group needs both `revenue` and `expenses` columns; the period
/// group needs a `date` column. Each group is added independently, so a
/// dataset with only dates yields only `period_start`/`period_end`.
pub fn summarize(dataset: &Dataset) -> Kpis {
    let mut out = Kpis::default();

    if dataset.has_revenue && dataset.has_expenses {
        let revenue_total: f64 = dataset.records.iter().filter_map(|r| r.revenue).sum();
        let expenses_total: f64 = dataset.records.iter().filter_map(|r| r.expenses).sum();
        let profit_total = revenue_total - expenses_total;
        // Zero revenue maps to a 0.0 margin instead of a division error
        let margin_pct = if revenue_total != 0.0 {
            profit_total / revenue_total * 100.0
        } else {
            0.0
        };
        out.revenue_total = Some(revenue_total);
        out.expenses_total = Some(expenses_total);
        out.profit_total = Some(profit_total);
        out.margin_pct = Some(margin_pct);
    }

    if dataset.has_date {
        let dates: Vec<_> = dataset.records.iter().filter_map(|r| r.date.clone()).collect();
        out.period_start = dates.iter().min().map(|d| d.to_string());
        out.period_end = dates.iter().max().map(|d| d.to_string());
    }

    out
}
