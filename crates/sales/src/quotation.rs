use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tradeerp_admin::CompanyId;
use tradeerp_core::{
    Currency, DocumentNumber, DomainError, DomainResult, Entity, checked_add, checked_mul,
    ensure_positive_amount, typed_id,
};
use tradeerp_projects::{Project, ProjectId, ProjectStatus};

use crate::events::QuotationAcceptedEvent;

typed_id!(
    /// Quotation identifier.
    QuotationId,
    "quotation id"
);

/// Quotation status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuotationStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
}

impl QuotationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuotationStatus::Draft => "DRAFT",
            QuotationStatus::Sent => "SENT",
            QuotationStatus::Accepted => "ACCEPTED",
            QuotationStatus::Rejected => "REJECTED",
        }
    }
}

/// Quotation line: description, quantity, unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotationLine {
    pub line_no: u32,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

impl QuotationLine {
    /// Never overflows: `add_line` rejects lines whose amount, or whose
    /// quotation total, is out of range.
    pub fn amount(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuotationLine {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewQuotation {
    pub project_id: ProjectId,
    pub valid_until: NaiveDate,
    #[serde(default)]
    pub lines: Vec<NewQuotationLine>,
}

/// Entity: Quotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quotation {
    id: QuotationId,
    quotation_number: DocumentNumber,
    project_id: ProjectId,
    customer_id: CompanyId,
    lines: Vec<QuotationLine>,
    currency: Currency,
    status: QuotationStatus,
    valid_until: NaiveDate,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Quotation {
    /// Draft a quotation for a project still in planning.
    pub fn create(
        id: QuotationId,
        quotation_number: DocumentNumber,
        project: &Project,
        input: NewQuotation,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        if project.status() != ProjectStatus::Planning {
            return Err(DomainError::business(
                "PROJECT_INVALID_STATUS",
                format!(
                    "cannot quote project {} in status {}",
                    project.code(),
                    project.status().as_str()
                ),
            ));
        }
        if input.valid_until < now.date_naive() {
            return Err(DomainError::validation("valid_until must not be in the past"));
        }

        let mut quotation = Self {
            id,
            quotation_number,
            project_id: *project.id(),
            customer_id: project.customer_id(),
            lines: Vec::new(),
            currency: project.currency().clone(),
            status: QuotationStatus::Draft,
            valid_until: input.valid_until,
            created_at: now,
            updated_at: now,
        };
        for line in input.lines {
            quotation.add_line(line, now)?;
        }
        Ok(quotation)
    }

    pub fn quotation_number(&self) -> &DocumentNumber {
        &self.quotation_number
    }

    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    pub fn customer_id(&self) -> CompanyId {
        self.customer_id
    }

    pub fn lines(&self) -> &[QuotationLine] {
        &self.lines
    }

    pub fn currency(&self) -> &Currency {
        &self.currency
    }

    pub fn status(&self) -> QuotationStatus {
        self.status
    }

    pub fn valid_until(&self) -> NaiveDate {
        self.valid_until
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn total_amount(&self) -> Decimal {
        self.lines.iter().map(QuotationLine::amount).sum()
    }

    pub fn add_line(&mut self, line: NewQuotationLine, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != QuotationStatus::Draft {
            return Err(self.invalid_status("add a line to"));
        }
        let description = line.description.trim().to_string();
        if description.is_empty() {
            return Err(DomainError::validation("line description must not be empty"));
        }
        ensure_positive_amount("quantity", line.quantity)?;
        ensure_positive_amount("unit_price", line.unit_price)?;
        let amount = checked_mul(line.quantity, line.unit_price)?;
        checked_add(self.total_amount(), amount)?;

        let line_no = self.lines.len() as u32 + 1;
        self.lines.push(QuotationLine {
            line_no,
            description,
            quantity: line.quantity,
            unit_price: line.unit_price,
        });
        self.updated_at = now;
        Ok(())
    }

    pub fn send(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != QuotationStatus::Draft {
            return Err(self.invalid_status("send"));
        }
        if self.lines.is_empty() {
            return Err(DomainError::business(
                "QUOTATION_EMPTY",
                format!("quotation {} has no lines", self.quotation_number),
            ));
        }
        self.status = QuotationStatus::Sent;
        self.updated_at = now;
        Ok(())
    }

    /// SENT → ACCEPTED while still valid. Returns the event to publish.
    pub fn accept(&mut self, now: DateTime<Utc>) -> DomainResult<QuotationAcceptedEvent> {
        if self.status != QuotationStatus::Sent {
            return Err(self.invalid_status("accept"));
        }
        if now.date_naive() > self.valid_until {
            return Err(DomainError::business(
                "QUOTATION_EXPIRED",
                format!(
                    "quotation {} expired on {}",
                    self.quotation_number, self.valid_until
                ),
            ));
        }
        self.status = QuotationStatus::Accepted;
        self.updated_at = now;

        Ok(QuotationAcceptedEvent {
            quotation_id: self.id,
            project_id: self.project_id,
            customer_id: self.customer_id,
            total_amount: self.total_amount(),
            currency: self.currency.clone(),
            occurred_at: now,
        })
    }

    pub fn reject(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status != QuotationStatus::Sent {
            return Err(self.invalid_status("reject"));
        }
        self.status = QuotationStatus::Rejected;
        self.updated_at = now;
        Ok(())
    }

    fn invalid_status(&self, action: &str) -> DomainError {
        DomainError::business(
            "QUOTATION_INVALID_STATUS",
            format!(
                "cannot {action} quotation {} in status {}",
                self.quotation_number,
                self.status.as_str()
            ),
        )
    }
}

impl Entity for Quotation {
    type Id = QuotationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;
    use tradeerp_projects::NewProject;

    fn project() -> Project {
        Project::create(
            ProjectId::generate(),
            DocumentNumber::format("PRJ", Utc::now(), 1),
            NewProject {
                name: "Warehouse racking".to_string(),
                customer_id: CompanyId::generate(),
                currency: Currency::new("KRW").unwrap(),
            },
            Utc::now(),
        )
        .unwrap()
    }

    fn line(qty: i64, price: i64) -> NewQuotationLine {
        NewQuotationLine {
            description: "Rack unit".to_string(),
            quantity: Decimal::from(qty),
            unit_price: Decimal::from(price),
        }
    }

    fn draft(lines: Vec<NewQuotationLine>) -> Quotation {
        let p = project();
        Quotation::create(
            QuotationId::generate(),
            DocumentNumber::format("QT", Utc::now(), 1),
            &p,
            NewQuotation {
                project_id: *p.id(),
                valid_until: (Utc::now() + Duration::days(30)).date_naive(),
                lines,
            },
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn send_requires_a_line() {
        let mut q = draft(vec![]);
        assert_eq!(q.send(Utc::now()).unwrap_err().code(), Some("QUOTATION_EMPTY"));
        q.add_line(line(2, 500), Utc::now()).unwrap();
        q.send(Utc::now()).unwrap();
        assert_eq!(q.status(), QuotationStatus::Sent);
    }

    #[test]
    fn line_amount_out_of_range_is_rejected() {
        let huge = Decimal::from(1_000_000_000_000_000_i64);
        let mut q = draft(vec![]);
        let err = q
            .add_line(
                NewQuotationLine {
                    description: "Rack unit".to_string(),
                    quantity: huge,
                    unit_price: huge,
                },
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(q.lines().is_empty());
    }

    #[test]
    fn quotation_total_out_of_range_is_rejected() {
        let mut q = draft(vec![]);
        let half = NewQuotationLine {
            description: "Rack unit".to_string(),
            quantity: Decimal::ONE,
            unit_price: Decimal::MAX,
        };
        q.add_line(half.clone(), Utc::now()).unwrap();
        assert!(q.add_line(half, Utc::now()).is_err());
        assert_eq!(q.lines().len(), 1);
        assert_eq!(q.total_amount(), Decimal::MAX);
    }

    #[test]
    fn lines_are_frozen_after_send() {
        let mut q = draft(vec![line(1, 100)]);
        q.send(Utc::now()).unwrap();
        let err = q.add_line(line(1, 1), Utc::now()).unwrap_err();
        assert_eq!(err.code(), Some("QUOTATION_INVALID_STATUS"));
    }

    #[test]
    fn accept_emits_event_with_total() {
        let mut q = draft(vec![line(2, 500), line(3, 1000)]);
        q.send(Utc::now()).unwrap();
        let event = q.accept(Utc::now()).unwrap();
        assert_eq!(q.status(), QuotationStatus::Accepted);
        assert_eq!(event.total_amount, Decimal::from(4000));
        assert_eq!(event.project_id, q.project_id());
    }

    #[test]
    fn accept_after_valid_until_is_rejected() {
        let mut q = draft(vec![line(1, 100)]);
        q.send(Utc::now()).unwrap();
        let later = Utc::now() + Duration::days(31);
        let err = q.accept(later).unwrap_err();
        assert_eq!(err.code(), Some("QUOTATION_EXPIRED"));
        assert_eq!(q.status(), QuotationStatus::Sent);
    }

    #[test]
    fn draft_cannot_be_accepted_or_rejected() {
        let mut q = draft(vec![line(1, 100)]);
        assert!(q.accept(Utc::now()).is_err());
        assert!(q.reject(Utc::now()).is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 256, ..ProptestConfig::default() })]

        #[test]
        fn total_is_sum_of_line_amounts(items in proptest::collection::vec((1i64..1_000, 1i64..100_000), 1..10)) {
            let lines: Vec<_> = items.iter().map(|(q, p)| line(*q, *p)).collect();
            let q = draft(lines);
            let expected: i64 = items.iter().map(|(q, p)| q * p).sum();
            prop_assert_eq!(q.total_amount(), Decimal::from(expected));
            prop_assert_eq!(q.lines().len(), items.len());
        }
    }
}
