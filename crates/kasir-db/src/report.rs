//! # Sales Report Aggregator
//!
//! Read-only summaries of committed sales over a range of calendar days.

use chrono::NaiveDate;
use kasir_core::{DateRange, SalesReport};
use tracing::info;

use crate::error::ReportError;
use crate::store::SalesReportSource;

/// Report front-end over any [`SalesReportSource`].
#[derive(Debug, Clone)]
pub struct SalesReportAggregator<R> {
    source: R,
}

impl<R: SalesReportSource> SalesReportAggregator<R> {
    pub fn new(source: R) -> Self {
        SalesReportAggregator { source }
    }

    pub fn source(&self) -> &R {
        &self.source
    }

    /// Report for `[range.start(), range.end()]`, both days inclusive.
    pub async fn report(&self, range: &DateRange) -> Result<SalesReport, ReportError> {
        let report = self.source.sales_report(range).await?;

        info!(
            start = %range.start(),
            end = %range.end(),
            total_revenue = report.total_revenue,
            transactions = report.total_transaction_count,
            best_seller = %report.best_selling_product.name,
            "Sales report generated"
        );

        Ok(report)
    }

    /// Report for a single day.
    pub async fn report_for_day(&self, day: NaiveDate) -> Result<SalesReport, ReportError> {
        let range = DateRange::single_day(day)?;
        self.report(&range).await
    }

    /// Report from raw `YYYY-MM-DD` bounds; a missing bound means `today`.
    pub async fn report_from_query(
        &self,
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
    ) -> Result<SalesReport, ReportError> {
        let range = DateRange::from_query(start, end, today)?;
        self.report(&range).await
    }
}
