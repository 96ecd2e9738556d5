//! Project entity.
//!
//! A project is opened for a customer in PLANNING, moves to IN_PROGRESS when
//! a quotation is accepted (contract award) and ends COMPLETED or CANCELED.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tradeerp_admin::CompanyId;
use tradeerp_core::{
    Currency, DocumentNumber, DomainError, DomainResult, Entity, EntityId, checked_add,
    ensure_positive_amount, typed_id,
};

typed_id!(ProjectId, "project id");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectStatus {
    Planning,
    InProgress,
    Completed,
    Canceled,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Planning => "PLANNING",
            ProjectStatus::InProgress => "IN_PROGRESS",
            ProjectStatus::Completed => "COMPLETED",
            ProjectStatus::Canceled => "CANCELED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    pub customer_id: CompanyId,
    pub currency: Currency,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    id: ProjectId,
    code: DocumentNumber,
    name: String,
    customer_id: CompanyId,
    status: ProjectStatus,
    contract_amount: Option<Decimal>,
    currency: Currency,
    /// Quotation whose acceptance awarded the contract.
    awarded_quotation_id: Option<EntityId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Project {
    pub fn create(
        id: ProjectId,
        code: DocumentNumber,
        input: NewProject,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name must not be empty"));
        }
        Ok(Self {
            id,
            code,
            name,
            customer_id: input.customer_id,
            status: ProjectStatus::Planning,
            contract_amount: None,
            currency: input.currency,
            awarded_quotation_id: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn code(&self) -> &DocumentNumber {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn customer_id(&self) -> CompanyId {
        self.customer_id
    }

    pub fn status(&self) -> ProjectStatus {
        self.status
    }

    pub fn contract_amount(&self) -> Option<Decimal> {
        self.contract_amount
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn awarded_quotation_id(&self) -> Option<EntityId> {
        self.awarded_quotation_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Award the contract from an accepted quotation (PLANNING → IN_PROGRESS).
    pub fn award_contract(
        &mut self,
        quotation_id: EntityId,
        amount: Decimal,
        currency: &Currency,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if self.awarded_quotation_id.is_some() {
            return Err(DomainError::business(
                "PROJECT_ALREADY_AWARDED",
                format!("project {} already has an awarded contract", self.code),
            ));
        }
        if self.status != ProjectStatus::Planning {
            return Err(invalid_status(self, "award a contract for"));
        }
        ensure_positive_amount("contract_amount", amount)?;
        if currency != &self.currency {
            return Err(DomainError::business(
                "CURRENCY_MISMATCH",
                format!(
                    "quotation currency {currency} does not match project currency {}",
                    self.currency
                ),
            ));
        }

        self.contract_amount = Some(amount);
        self.awarded_quotation_id = Some(quotation_id);
        self.status = ProjectStatus::InProgress;
        self.updated_at = now;
        Ok(())
    }

    pub fn complete(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != ProjectStatus::InProgress {
            return Err(invalid_status(self, "complete"));
        }
        self.status = ProjectStatus::Completed;
        self.updated_at = now;
        Ok(())
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        match self.status {
            ProjectStatus::Planning | ProjectStatus::InProgress => {
                self.status = ProjectStatus::Canceled;
                self.updated_at = now;
                Ok(())
            }
            _ => Err(invalid_status(self, "cancel")),
        }
    }

    /// Check that a new delivery of `amount` fits: the project must be
    /// running and the scheduled total must stay within the contract.
    pub fn ensure_accepts_delivery(&self, scheduled: Decimal, amount: Decimal) -> DomainResult<()> {
        if self.status != ProjectStatus::InProgress {
            return Err(invalid_status(self, "schedule a delivery for"));
        }
        ensure_positive_amount("amount", amount)?;
        let contract = self.contract_amount.unwrap_or(Decimal::ZERO);
        let total = checked_add(scheduled, amount)?;
        if total > contract {
            return Err(DomainError::business(
                "DELIVERY_EXCEEDS_CONTRACT",
                format!("deliveries would total {total} but the contract amount is {contract}"),
            ));
        }
        Ok(())
    }
}

fn invalid_status(project: &Project, action: &str) -> DomainError {
    DomainError::business(
        "PROJECT_INVALID_STATUS",
        format!(
            "cannot {action} project {} in status {}",
            project.code,
            project.status.as_str()
        ),
    )
}

impl Entity for Project {
    type Id = ProjectId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn krw() -> Currency {
        Currency::new("KRW").unwrap()
    }

    fn planning() -> Project {
        Project::create(
            ProjectId::generate(),
            DocumentNumber::format("PRJ", Utc::now(), 1),
            NewProject {
                name: "Plant retrofit".to_string(),
                customer_id: CompanyId::generate(),
                currency: krw(),
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn award_moves_planning_to_in_progress() {
        let mut p = planning();
        let q = EntityId::new();
        p.award_contract(q, Decimal::from(12_000), &krw(), Utc::now()).unwrap();
        assert_eq!(p.status(), ProjectStatus::InProgress);
        assert_eq!(p.contract_amount(), Some(Decimal::from(12_000)));
        assert_eq!(p.awarded_quotation_id(), Some(q));
    }

    #[test]
    fn second_award_is_rejected() {
        let mut p = planning();
        p.award_contract(EntityId::new(), Decimal::from(10), &krw(), Utc::now()).unwrap();
        let err = p
            .award_contract(EntityId::new(), Decimal::from(20), &krw(), Utc::now())
            .unwrap_err();
        assert_eq!(err.code(), Some("PROJECT_ALREADY_AWARDED"));
        assert_eq!(p.contract_amount(), Some(Decimal::from(10)));
    }

    #[test]
    fn award_rejects_other_currency() {
        let mut p = planning();
        let usd = Currency::new("USD").unwrap();
        let err = p
            .award_contract(EntityId::new(), Decimal::from(10), &usd, Utc::now())
            .unwrap_err();
        assert_eq!(err.code(), Some("CURRENCY_MISMATCH"));
        assert_eq!(p.status(), ProjectStatus::Planning);
    }

    #[test]
    fn complete_requires_in_progress() {
        let mut p = planning();
        assert_eq!(p.complete(Utc::now()).unwrap_err().code(), Some("PROJECT_INVALID_STATUS"));
        p.cancel(Utc::now()).unwrap();
        assert_eq!(p.cancel(Utc::now()).unwrap_err().code(), Some("PROJECT_INVALID_STATUS"));
    }

    #[test]
    fn deliveries_cannot_exceed_contract() {
        let mut p = planning();
        p.award_contract(EntityId::new(), Decimal::from(1000), &krw(), Utc::now()).unwrap();
        assert!(p.ensure_accepts_delivery(Decimal::from(600), Decimal::from(400)).is_ok());
        let err = p
            .ensure_accepts_delivery(Decimal::from(600), Decimal::from(401))
            .unwrap_err();
        assert_eq!(err.code(), Some("DELIVERY_EXCEEDS_CONTRACT"));
    }

    #[test]
    fn delivery_total_out_of_range_is_a_validation_error() {
        let mut p = planning();
        p.award_contract(EntityId::new(), Decimal::from(1000), &krw(), Utc::now()).unwrap();
        let err = p
            .ensure_accepts_delivery(Decimal::from(100), Decimal::MAX)
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
