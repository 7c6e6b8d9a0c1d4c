//! # Sales Reporting
//!
//! Calendar-day ranges and the in-memory sales tally.
//!
//! ## Day Boundaries
//! ```text
//! DateRange::new(2026-03-01, 2026-03-02)
//!
//!    2026-03-01 00:00 UTC                          2026-03-03 00:00 UTC
//!          [──────────────── in range ────────────────)
//!          from                                     until
//!
//! A transaction is in range when from <= created_at < until.
//! ```
//!
//! Both the PostgreSQL report query and [`SalesTally`] use the same
//! half-open bounds, so they agree on transactions committed exactly at
//! midnight.
//!
//! ## Best Seller
//! The product with the highest summed quantity across in-range detail rows.
//! Ties go to the lowest product id.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::error::ValidationError;
use crate::types::{BestSellingProduct, ProductId, SalesReport, Transaction};
use crate::validation::{parse_report_date, ValidationResult};

// =============================================================================
// Date Range
// =============================================================================

/// An inclusive range of UTC calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
}

impl DateRange {
    /// Creates a range covering `start` through `end`, both inclusive.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::NaiveDate;
    /// use kasir_core::DateRange;
    ///
    /// let day = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    /// let range = DateRange::new(day, day).unwrap();
    /// assert_eq!(range.until() - range.from(), chrono::Duration::days(1));
    /// ```
    pub fn new(start: NaiveDate, end: NaiveDate) -> ValidationResult<Self> {
        if start > end {
            return Err(ValidationError::InvertedRange {
                start_field: "start_date".to_string(),
                end_field: "end_date".to_string(),
            });
        }

        let from = midnight_utc(start).ok_or_else(|| out_of_range("start_date"))?;
        let until = end
            .succ_opt()
            .and_then(midnight_utc)
            .ok_or_else(|| out_of_range("end_date"))?;

        Ok(DateRange {
            start,
            end,
            from,
            until,
        })
    }

    /// A range covering exactly one day.
    pub fn single_day(day: NaiveDate) -> ValidationResult<Self> {
        Self::new(day, day)
    }

    /// Builds a range from raw query parameters.
    ///
    /// A missing or blank bound defaults to `today`.
    pub fn from_query(
        start: Option<&str>,
        end: Option<&str>,
        today: NaiveDate,
    ) -> ValidationResult<Self> {
        let start = match start.filter(|s| !s.trim().is_empty()) {
            Some(raw) => parse_report_date("start_date", raw)?,
            None => today,
        };
        let end = match end.filter(|s| !s.trim().is_empty()) {
            Some(raw) => parse_report_date("end_date", raw)?,
            None => today,
        };

        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// First instant in range.
    pub fn from(&self) -> DateTime<Utc> {
        self.from
    }

    /// First instant after the range.
    pub fn until(&self) -> DateTime<Utc> {
        self.until
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.from <= at && at < self.until
    }
}

fn midnight_utc(day: NaiveDate) -> Option<DateTime<Utc>> {
    day.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn out_of_range(field: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "date is outside the supported range".to_string(),
    }
}

// =============================================================================
// Sales Tally
// =============================================================================

#[derive(Debug, Clone)]
struct ProductTally {
    quantity: i64,
    latest_name: String,
    latest_at: DateTime<Utc>,
}

/// Accumulates committed transactions into a [`SalesReport`].
///
/// Transactions outside the range are ignored, so a caller may feed the
/// whole ledger.
#[derive(Debug, Clone)]
pub struct SalesTally {
    range: DateRange,
    revenue: i64,
    count: i64,
    products: BTreeMap<ProductId, ProductTally>,
}

impl SalesTally {
    pub fn new(range: DateRange) -> Self {
        SalesTally {
            range,
            revenue: 0,
            count: 0,
            products: BTreeMap::new(),
        }
    }

    /// Adds one transaction. Returns `false` if it falls outside the range.
    pub fn record(&mut self, tx: &Transaction) -> bool {
        if !self.range.contains(tx.created_at) {
            return false;
        }

        self.revenue = self.revenue.saturating_add(tx.total_amount);
        self.count += 1;

        for detail in &tx.details {
            let entry = self
                .products
                .entry(detail.product_id)
                .or_insert_with(|| ProductTally {
                    quantity: 0,
                    latest_name: detail.product_name.clone(),
                    latest_at: tx.created_at,
                });

            entry.quantity = entry.quantity.saturating_add(detail.quantity);
            if tx.created_at >= entry.latest_at {
                entry.latest_at = tx.created_at;
                entry.latest_name.clone_from(&detail.product_name);
            }
        }

        true
    }

    /// Produces the report.
    ///
    /// `current_name` resolves a product's live name; when it returns `None`
    /// (product row gone) the latest in-range snapshot name is used.
    pub fn finish<F>(self, current_name: F) -> SalesReport
    where
        F: Fn(ProductId) -> Option<String>,
    {
        let mut best: Option<(ProductId, &ProductTally)> = None;

        // ascending ids with a strict comparison keep the lowest id on ties
        for (id, tally) in &self.products {
            let better = match best {
                Some((_, current)) => tally.quantity > current.quantity,
                None => true,
            };
            if better {
                best = Some((*id, tally));
            }
        }

        let best_selling_product = match best {
            Some((id, tally)) => BestSellingProduct {
                name: current_name(id).unwrap_or_else(|| tally.latest_name.clone()),
                quantity_sold: tally.quantity,
            },
            None => BestSellingProduct::default(),
        };

        SalesReport {
            total_revenue: self.revenue,
            total_transaction_count: self.count,
            best_selling_product,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionDetail;
    use chrono::Duration;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn sale(id: i64, created_at: DateTime<Utc>, lines: &[(ProductId, &str, i64, i64)]) -> Transaction {
        let details: Vec<TransactionDetail> = lines
            .iter()
            .map(|(product_id, name, quantity, subtotal)| TransactionDetail {
                transaction_id: id,
                product_id: *product_id,
                product_name: name.to_string(),
                quantity: *quantity,
                subtotal: *subtotal,
            })
            .collect();
        Transaction {
            id,
            created_at,
            total_amount: details.iter().map(|d| d.subtotal).sum(),
            details,
        }
    }

    #[test]
    fn test_range_bounds_are_half_open() {
        let range = DateRange::new(day(2026, 3, 1), day(2026, 3, 2)).unwrap();
        assert_eq!(range.from(), at(2026, 3, 1, 0));
        assert_eq!(range.until(), at(2026, 3, 3, 0));

        assert!(range.contains(at(2026, 3, 1, 0)));
        assert!(range.contains(at(2026, 3, 3, 0) - Duration::seconds(1)));
        assert!(!range.contains(at(2026, 3, 3, 0)));
        assert!(!range.contains(at(2026, 2, 28, 23)));
    }

    #[test]
    fn test_inverted_range_is_rejected() {
        assert!(matches!(
            DateRange::new(day(2026, 3, 2), day(2026, 3, 1)),
            Err(ValidationError::InvertedRange { .. })
        ));
    }

    #[test]
    fn test_last_representable_day_is_rejected() {
        assert!(matches!(
            DateRange::single_day(NaiveDate::MAX),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_from_query_defaults_to_today() {
        let today = day(2026, 5, 10);

        let range = DateRange::from_query(None, None, today).unwrap();
        assert_eq!((range.start(), range.end()), (today, today));

        let range = DateRange::from_query(Some("2026-05-01"), Some(""), today).unwrap();
        assert_eq!((range.start(), range.end()), (day(2026, 5, 1), today));

        assert!(DateRange::from_query(Some("2026-06-01"), None, today).is_err());
        assert!(DateRange::from_query(Some("yesterday"), None, today).is_err());
    }

    #[test]
    fn test_empty_tally() {
        let range = DateRange::single_day(day(2026, 1, 1)).unwrap();
        let report = SalesTally::new(range).finish(|_| None);
        assert_eq!(report, SalesReport::default());
    }

    #[test]
    fn test_tally_counts_only_in_range() {
        let range = DateRange::single_day(day(2026, 1, 2)).unwrap();
        let mut tally = SalesTally::new(range);

        assert!(!tally.record(&sale(1, at(2026, 1, 1, 23), &[(1, "A", 9, 900)])));
        assert!(tally.record(&sale(2, at(2026, 1, 2, 8), &[(1, "A", 3, 300), (2, "B", 2, 100)])));
        assert!(tally.record(&sale(3, at(2026, 1, 2, 9), &[(2, "B", 2, 100)])));
        assert!(!tally.record(&sale(4, at(2026, 1, 3, 0), &[(2, "B", 50, 2500)])));

        let report = tally.finish(|_| None);
        assert_eq!(report.total_revenue, 500);
        assert_eq!(report.total_transaction_count, 2);
        assert_eq!(report.best_selling_product.name, "B");
        assert_eq!(report.best_selling_product.quantity_sold, 4);
    }

    #[test]
    fn test_tie_goes_to_lowest_product_id() {
        let range = DateRange::single_day(day(2026, 1, 2)).unwrap();
        let mut tally = SalesTally::new(range);
        tally.record(&sale(1, at(2026, 1, 2, 8), &[(7, "Seven", 4, 40), (3, "Three", 4, 40)]));

        let report = tally.finish(|_| None);
        assert_eq!(report.best_selling_product.name, "Three");
    }

    #[test]
    fn test_best_seller_prefers_current_name() {
        let range = DateRange::single_day(day(2026, 1, 2)).unwrap();
        let mut tally = SalesTally::new(range);
        tally.record(&sale(1, at(2026, 1, 2, 8), &[(1, "Old", 1, 10)]));
        tally.record(&sale(2, at(2026, 1, 2, 9), &[(1, "Newer", 1, 10)]));

        let renamed = tally.clone().finish(|id| (id == 1).then(|| "Live".to_string()));
        assert_eq!(renamed.best_selling_product.name, "Live");

        let deleted = tally.finish(|_| None);
        assert_eq!(deleted.best_selling_product.name, "Newer");
    }
}
