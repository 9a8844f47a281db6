//! Quarter-level funding accounting
//!
//! PRE line items are consumed quarter by quarter. Approved documents consume;
//! documents under review reserve. Validation of new requests accounts for
//! both, which prevents front-loading spending in early quarters.

use std::collections::HashMap;

use crate::error::{FundwatchError, FundwatchResult};
use crate::models::{
    ActivityDesignId, Funding, LineItem, LineItemId, Money, Pre, PurchaseRequestId, Quarter,
};
use crate::storage::Storage;

/// Identifies the document being validated, so its own reservation is not
/// counted against itself on re-validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentRef {
    Pr(PurchaseRequestId),
    Ad(ActivityDesignId),
}

/// Usage figures for one line item quarter
#[derive(Debug, Clone)]
pub struct QuarterUsage {
    pub quarter: Quarter,
    pub allocated: Money,
    pub consumed: Money,
    pub reserved: Money,
    pub pr_count: usize,
    pub ad_count: usize,
}

impl QuarterUsage {
    /// Allocated minus consumed and reserved (may be negative)
    pub fn available(&self) -> Money {
        self.allocated - self.consumed - self.reserved
    }

    /// Available floored at zero, for display
    pub fn available_clamped(&self) -> Money {
        let available = self.available();
        if available.is_negative() {
            Money::zero()
        } else {
            available
        }
    }

    /// Percentage of the quarter committed (consumed + reserved)
    pub fn utilization_percent(&self) -> f64 {
        (self.consumed + self.reserved).percent_of(self.allocated)
    }
}

/// Compute consumed/reserved figures for a line item quarter
///
/// Scans all active purchase requests and activity designs; `exclude` skips
/// the document being re-validated so it doesn't count against itself.
pub fn quarter_usage(
    storage: &Storage,
    line_item_id: LineItemId,
    quarter: Quarter,
    allocated: Money,
    exclude: Option<DocumentRef>,
) -> FundwatchResult<QuarterUsage> {
    let mut consumed = Money::zero();
    let mut reserved = Money::zero();
    let mut pr_count = 0;
    let mut ad_count = 0;

    for pr in storage.purchase_requests.active()? {
        if exclude == Some(DocumentRef::Pr(pr.id)) {
            continue;
        }
        if !pr.status.consumes_budget() && !pr.status.reserves_budget() {
            continue;
        }
        let matched: Money = pr
            .fundings
            .iter()
            .filter(|f| f.line_item_id == line_item_id && f.quarter == quarter)
            .map(|f| f.amount)
            .sum();
        if matched.is_zero() {
            continue;
        }
        pr_count += 1;
        if pr.status.consumes_budget() {
            consumed += matched;
        } else {
            reserved += matched;
        }
    }

    for ad in storage.activity_designs.active()? {
        if exclude == Some(DocumentRef::Ad(ad.id)) {
            continue;
        }
        if !ad.status.consumes_budget() && !ad.status.reserves_budget() {
            continue;
        }
        let matched: Money = ad
            .fundings
            .iter()
            .filter(|f| f.line_item_id == line_item_id && f.quarter == quarter)
            .map(|f| f.amount)
            .sum();
        if matched.is_zero() {
            continue;
        }
        ad_count += 1;
        if ad.status.consumes_budget() {
            consumed += matched;
        } else {
            reserved += matched;
        }
    }

    Ok(QuarterUsage {
        quarter,
        allocated,
        consumed,
        reserved,
        pr_count,
        ad_count,
    })
}

/// Resolve a funding row to its PRE and line item
pub fn resolve_line_item(storage: &Storage, funding: &Funding) -> FundwatchResult<(Pre, LineItem)> {
    let pre = storage
        .pres
        .get(funding.pre_id)?
        .ok_or_else(|| FundwatchError::pre_not_found(funding.pre_id.to_string()))?;
    let item = pre
        .line_item(funding.line_item_id)
        .cloned()
        .ok_or_else(|| FundwatchError::line_item_not_found(funding.line_item_id.to_string()))?;
    Ok((pre, item))
}

/// Validate a document's funding rows against quarterly limits
///
/// Groups the rows by line item and quarter, then checks each group against
/// what the quarter still has after consumed and reserved amounts.
pub fn validate_fundings(
    storage: &Storage,
    fundings: &[Funding],
    exclude: Option<DocumentRef>,
) -> FundwatchResult<()> {
    if fundings.is_empty() {
        return Err(FundwatchError::Validation(
            "Document has no funding source".into(),
        ));
    }

    let mut grouped: HashMap<(LineItemId, Quarter), (Money, &Funding)> = HashMap::new();
    for funding in fundings {
        if !funding.amount.is_positive() {
            return Err(FundwatchError::Validation(
                "Funding amounts must be greater than zero".into(),
            ));
        }
        grouped
            .entry((funding.line_item_id, funding.quarter))
            .and_modify(|(total, _)| *total += funding.amount)
            .or_insert((funding.amount, funding));
    }

    for ((line_item_id, quarter), (requested, funding)) in grouped {
        let (_pre, item) = resolve_line_item(storage, funding)?;

        let allocated = item.quarters.get(quarter);
        let usage = quarter_usage(storage, line_item_id, quarter, allocated, exclude)?;
        let available = usage.available();

        if requested > available {
            return Err(FundwatchError::InsufficientFunds {
                line_item: item.name.clone(),
                quarter: quarter.label().to_string(),
                needed_centavos: requested.centavos(),
                available_centavos: available.centavos(),
            });
        }
    }

    Ok(())
}

/// Pending realignment outflows against a source line item quarter
///
/// Used when validating a new realignment, so amounts already requested from
/// the same line item are not promised twice.
pub fn pending_realignment_outflow(
    storage: &Storage,
    line_item_id: LineItemId,
    quarter: Quarter,
    exclude: Option<crate::models::RealignmentId>,
) -> FundwatchResult<Money> {
    let pending = storage
        .realignments
        .pending_for_source_item(line_item_id, exclude)?;
    Ok(pending.iter().map(|r| r.quarters.get(quarter)).sum())
}
