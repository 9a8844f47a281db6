//! Activity design service
//!
//! Mirrors the purchase request lifecycle for non-procurement documents:
//! funding from approved PRE line items, review, and fund deduction on final
//! approval.

use tracing::info;

use crate::audit::{EntityType, Operation};
use crate::error::{FundwatchError, FundwatchResult};
use crate::models::{
    ActivityDesign, ActivityDesignId, AllocationId, Funding, LedgerKind, LineItemId, Money, PreId,
    Quarter, RequestStatus,
};
use crate::services::funding::{self, DocumentRef};
use crate::services::ledger;
use crate::storage::Storage;

/// Service for activity design management
pub struct ActivityDesignService<'a> {
    storage: &'a Storage,
}

impl<'a> ActivityDesignService<'a> {
    /// Create a new activity design service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a draft activity design
    pub fn create(
        &self,
        ad_number: &str,
        allocation_id: AllocationId,
        activity_title: &str,
        total_amount: Money,
        actor: &str,
    ) -> FundwatchResult<ActivityDesign> {
        if ad_number.trim().is_empty() {
            return Err(FundwatchError::Validation(
                "AD number cannot be empty".into(),
            ));
        }
        if !total_amount.is_positive() {
            return Err(FundwatchError::Validation(
                "Activity design total must be greater than zero".into(),
            ));
        }
        if self
            .storage
            .activity_designs
            .find_by_number(ad_number)?
            .is_some()
        {
            return Err(FundwatchError::Duplicate {
                entity_type: "Activity design",
                identifier: ad_number.to_string(),
            });
        }

        let allocation = self
            .storage
            .allocations
            .get(allocation_id)?
            .ok_or_else(|| FundwatchError::allocation_not_found(allocation_id.to_string()))?;
        if allocation.archive.is_archived() {
            return Err(FundwatchError::Archived(allocation.department));
        }

        let ad = ActivityDesign::new(
            ad_number,
            allocation_id,
            allocation.department,
            activity_title,
            total_amount,
            actor,
        );

        self.storage.activity_designs.upsert(ad.clone())?;
        self.storage.activity_designs.save()?;

        self.storage.log_create(
            EntityType::ActivityDesign,
            ad.id.to_string(),
            Some(ad.ad_number.clone()),
            actor,
            &ad,
        )?;

        Ok(ad)
    }

    /// Fund a draft from an approved PRE line item quarter
    pub fn fund(
        &self,
        ad_id: ActivityDesignId,
        pre_id: PreId,
        line_item_id: LineItemId,
        quarter: Quarter,
        amount: Money,
        notes: &str,
        actor: &str,
    ) -> FundwatchResult<ActivityDesign> {
        let mut ad = self.get(ad_id)?;
        if ad.status != RequestStatus::Draft {
            return Err(FundwatchError::Workflow(format!(
                "activity design can only be edited as a draft (status: {})",
                ad.status
            )));
        }

        if !amount.is_positive() {
            return Err(FundwatchError::Validation(
                "Funding amount must be greater than zero".into(),
            ));
        }

        let pre = self
            .storage
            .pres
            .get(pre_id)?
            .ok_or_else(|| FundwatchError::pre_not_found(pre_id.to_string()))?;
        if pre.status != RequestStatus::Approved {
            return Err(FundwatchError::Validation(
                "Funding source must be an approved PRE".into(),
            ));
        }
        if pre.allocation_id != ad.allocation_id {
            return Err(FundwatchError::Validation(
                "Funding PRE belongs to a different allocation".into(),
            ));
        }
        if pre.line_item(line_item_id).is_none() {
            return Err(FundwatchError::line_item_not_found(line_item_id.to_string()));
        }

        let before = ad.clone();
        ad.push_funding(Funding {
            pre_id,
            line_item_id,
            quarter,
            amount,
            notes: notes.to_string(),
        });

        self.storage.activity_designs.upsert(ad.clone())?;
        self.storage.activity_designs.save()?;

        self.storage.log_update(
            EntityType::ActivityDesign,
            ad.id.to_string(),
            Some(ad.ad_number.clone()),
            actor,
            &before,
            &ad,
        )?;

        Ok(ad)
    }

    /// Submit a draft for review
    pub fn submit(&self, ad_id: ActivityDesignId, actor: &str) -> FundwatchResult<ActivityDesign> {
        let mut ad = self.get(ad_id)?;
        if ad.archive.is_archived() {
            return Err(FundwatchError::Archived(ad.ad_number));
        }

        self.validate_amounts(&ad, None)?;

        ad.submit()
            .map_err(|e| FundwatchError::Workflow(e.to_string()))?;

        self.storage.activity_designs.upsert(ad.clone())?;
        self.storage.activity_designs.save()?;

        self.storage.log_action(
            Operation::Submit,
            EntityType::ActivityDesign,
            ad.id.to_string(),
            Some(ad.ad_number.clone()),
            actor,
            None,
        )?;

        Ok(ad)
    }

    /// Partially approve a pending activity design
    pub fn partial_approve(
        &self,
        ad_id: ActivityDesignId,
        notes: &str,
        actor: &str,
    ) -> FundwatchResult<ActivityDesign> {
        let mut ad = self.get(ad_id)?;
        ad.partial_approve(notes)
            .map_err(|e| FundwatchError::Workflow(e.to_string()))?;

        self.storage.activity_designs.upsert(ad.clone())?;
        self.storage.activity_designs.save()?;

        self.storage.log_action(
            Operation::Approve,
            EntityType::ActivityDesign,
            ad.id.to_string(),
            Some(ad.ad_number.clone()),
            actor,
            Some("partial approval".into()),
        )?;

        Ok(ad)
    }

    /// Record that the signed document came back from the approving officer
    pub fn countersign(
        &self,
        ad_id: ActivityDesignId,
        actor: &str,
    ) -> FundwatchResult<ActivityDesign> {
        let mut ad = self.get(ad_id)?;
        ad.countersign()
            .map_err(|e| FundwatchError::Workflow(e.to_string()))?;

        self.storage.activity_designs.upsert(ad.clone())?;
        self.storage.activity_designs.save()?;

        self.storage.log_action(
            Operation::Update,
            EntityType::ActivityDesign,
            ad.id.to_string(),
            Some(ad.ad_number.clone()),
            actor,
            Some("signed documents received".into()),
        )?;

        Ok(ad)
    }

    /// Final approval: deducts the total from the allocation balance
    pub fn finalize(&self, ad_id: ActivityDesignId, actor: &str) -> FundwatchResult<ActivityDesign> {
        let mut ad = self.get(ad_id)?;

        self.validate_amounts(&ad, Some(DocumentRef::Ad(ad.id)))?;

        ad.finalize()
            .map_err(|e| FundwatchError::Workflow(e.to_string()))?;

        let total = ad.total_amount;
        let mut allocation = self
            .storage
            .allocations
            .get(ad.allocation_id)?
            .ok_or_else(|| FundwatchError::allocation_not_found(ad.allocation_id.to_string()))?;

        let previous_balance = allocation.remaining_balance();
        allocation.apply_ad(total);

        self.storage.activity_designs.upsert(ad.clone())?;
        self.storage.allocations.upsert(allocation.clone())?;

        ledger::record(
            self.storage,
            &allocation,
            LedgerKind::AdApproved,
            -total,
            previous_balance,
            actor,
            ad.ad_number.clone(),
        )?;

        self.storage.activity_designs.save()?;
        self.storage.allocations.save()?;
        self.storage.ledger.save()?;

        self.storage.log_action(
            Operation::Approve,
            EntityType::ActivityDesign,
            ad.id.to_string(),
            Some(ad.ad_number.clone()),
            actor,
            Some("final approval".into()),
        )?;

        info!(ad = %ad.ad_number, total = %total, "activity design approved");
        Ok(ad)
    }

    /// Reject an activity design under review
    pub fn reject(
        &self,
        ad_id: ActivityDesignId,
        reason: &str,
        actor: &str,
    ) -> FundwatchResult<ActivityDesign> {
        if reason.trim().is_empty() {
            return Err(FundwatchError::Validation(
                "A rejection reason is required".into(),
            ));
        }

        let mut ad = self.get(ad_id)?;
        ad.reject(reason)
            .map_err(|e| FundwatchError::Workflow(e.to_string()))?;

        self.storage.activity_designs.upsert(ad.clone())?;
        self.storage.activity_designs.save()?;

        self.storage.log_action(
            Operation::Reject,
            EntityType::ActivityDesign,
            ad.id.to_string(),
            Some(ad.ad_number.clone()),
            actor,
            Some(reason.to_string()),
        )?;

        Ok(ad)
    }

    /// Get an activity design by id
    pub fn get(&self, id: ActivityDesignId) -> FundwatchResult<ActivityDesign> {
        self.storage
            .activity_designs
            .get(id)?
            .ok_or_else(|| FundwatchError::activity_design_not_found(id.to_string()))
    }

    /// Resolve from a document number or id string
    pub fn resolve(&self, reference: &str) -> FundwatchResult<ActivityDesign> {
        if let Some(ad) = self.storage.activity_designs.find_by_number(reference)? {
            return Ok(ad);
        }
        if let Ok(id) = reference.parse::<ActivityDesignId>() {
            if let Some(ad) = self.storage.activity_designs.get(id)? {
                return Ok(ad);
            }
        }
        Err(FundwatchError::activity_design_not_found(reference))
    }

    /// List active activity designs, optionally limited to one allocation
    pub fn list(&self, allocation_id: Option<AllocationId>) -> FundwatchResult<Vec<ActivityDesign>> {
        match allocation_id {
            Some(id) => self.storage.activity_designs.for_allocation(id),
            None => self.storage.activity_designs.active(),
        }
    }

    fn validate_amounts(
        &self,
        ad: &ActivityDesign,
        exclude: Option<DocumentRef>,
    ) -> FundwatchResult<()> {
        if ad.funding_total() != ad.total_amount {
            return Err(FundwatchError::Validation(format!(
                "Funding total ({}) does not match the activity total ({})",
                ad.funding_total(),
                ad.total_amount
            )));
        }

        let allocation = self
            .storage
            .allocations
            .get(ad.allocation_id)?
            .ok_or_else(|| FundwatchError::allocation_not_found(ad.allocation_id.to_string()))?;
        if ad.total_amount > allocation.remaining_balance() {
            return Err(FundwatchError::Budget(format!(
                "AD amount ({}) would exceed the available budget ({})",
                ad.total_amount,
                allocation.remaining_balance()
            )));
        }

        funding::validate_fundings(self.storage, &ad.fundings, exclude)
    }
}
