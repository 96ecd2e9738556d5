use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

use tradeerp_accounting::NewVendorPayment;
use tradeerp_admin::{CompanyId, CompanyKind, ContactInfo, NewCompany, NewUser, Role};
use tradeerp_core::Currency;
use tradeerp_invoicing::{NewPayment, NewTaxInvoice};
use tradeerp_projects::{NewDelivery, NewProject, ProjectId};
use tradeerp_purchasing::{NewPurchaseRequest, PurchaseRequestId, RfqItemId};
use tradeerp_sales::{NewQuotation, NewQuotationLine};

use crate::app::errors;

// -------------------------
// Field validation
// -------------------------

/// Collects per-field messages; an empty set means the request is valid.
#[derive(Debug, Default)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    fn check(&mut self, field: impl Into<String>, ok: bool, message: &str) -> &mut Self {
        if !ok {
            self.0.entry(field.into()).or_insert_with(|| message.to_string());
        }
        self
    }

    fn text(&mut self, field: impl Into<String>, value: &str) -> &mut Self {
        self.check(field, !value.trim().is_empty(), "must not be empty")
    }

    fn positive(&mut self, field: impl Into<String>, value: Decimal) -> &mut Self {
        self.check(field, value > Decimal::ZERO, "must be positive")
    }

    fn finish(&mut self) -> Result<(), axum::response::Response> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(errors::field_errors(std::mem::take(&mut self.0)))
        }
    }
}

/// Shape checks done before a request reaches a service.
pub trait Validate {
    fn validate(&self) -> Result<(), axum::response::Response>;
}

// -------------------------
// Admin
// -------------------------

#[derive(Debug, Deserialize)]
pub struct RegisterCompanyRequest {
    pub name: String,
    pub registration_number: String,
    pub kind: CompanyKind,
    #[serde(default)]
    pub contact: ContactInfo,
}

impl Validate for RegisterCompanyRequest {
    fn validate(&self) -> Result<(), axum::response::Response> {
        FieldErrors::default()
            .text("name", &self.name)
            .text("registration_number", &self.registration_number)
            .finish()
    }
}

impl From<RegisterCompanyRequest> for NewCompany {
    fn from(r: RegisterCompanyRequest) -> Self {
        NewCompany {
            name: r.name,
            registration_number: r.registration_number,
            kind: r.kind,
            contact: r.contact,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateCompanyRequest {
    pub name: Option<String>,
    pub contact: Option<ContactInfo>,
}

impl Validate for UpdateCompanyRequest {
    fn validate(&self) -> Result<(), axum::response::Response> {
        let mut errs = FieldErrors::default();
        if let Some(name) = &self.name {
            errs.text("name", name);
        }
        errs.finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

impl Validate for CreateUserRequest {
    fn validate(&self) -> Result<(), axum::response::Response> {
        FieldErrors::default()
            .text("username", &self.username)
            .text("display_name", &self.display_name)
            .check("email", self.email.contains('@'), "must be an email address")
            .finish()
    }
}

impl From<CreateUserRequest> for NewUser {
    fn from(r: CreateUserRequest) -> Self {
        NewUser {
            username: r.username,
            email: r.email,
            display_name: r.display_name,
            role: r.role,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: Role,
}

// -------------------------
// Projects & sales
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name: String,
    pub customer_id: CompanyId,
    pub currency: Option<Currency>,
}

impl Validate for CreateProjectRequest {
    fn validate(&self) -> Result<(), axum::response::Response> {
        FieldErrors::default().text("name", &self.name).finish()
    }
}

impl CreateProjectRequest {
    pub fn into_new(self, default_currency: &Currency) -> NewProject {
        NewProject {
            name: self.name,
            customer_id: self.customer_id,
            currency: self.currency.unwrap_or_else(|| default_currency.clone()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ScheduleDeliveryRequest {
    pub project_id: ProjectId,
    pub description: String,
    pub amount: Decimal,
    pub scheduled_date: NaiveDate,
}

impl Validate for ScheduleDeliveryRequest {
    fn validate(&self) -> Result<(), axum::response::Response> {
        FieldErrors::default()
            .text("description", &self.description)
            .positive("amount", self.amount)
            .finish()
    }
}

impl From<ScheduleDeliveryRequest> for NewDelivery {
    fn from(r: ScheduleDeliveryRequest) -> Self {
        NewDelivery {
            project_id: r.project_id,
            description: r.description,
            amount: r.amount,
            scheduled_date: r.scheduled_date,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct QuotationLineRequest {
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

impl QuotationLineRequest {
    fn check(&self, prefix: &str, errs: &mut FieldErrors) {
        errs.text(format!("{prefix}description"), &self.description)
            .positive(format!("{prefix}quantity"), self.quantity)
            .check(
                format!("{prefix}unit_price"),
                self.unit_price >= Decimal::ZERO,
                "must not be negative",
            );
    }
}

impl Validate for QuotationLineRequest {
    fn validate(&self) -> Result<(), axum::response::Response> {
        let mut errs = FieldErrors::default();
        self.check("", &mut errs);
        errs.finish()
    }
}

impl From<QuotationLineRequest> for NewQuotationLine {
    fn from(r: QuotationLineRequest) -> Self {
        NewQuotationLine {
            description: r.description,
            quantity: r.quantity,
            unit_price: r.unit_price,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateQuotationRequest {
    pub project_id: ProjectId,
    pub valid_until: NaiveDate,
    #[serde(default)]
    pub lines: Vec<QuotationLineRequest>,
}

impl Validate for CreateQuotationRequest {
    fn validate(&self) -> Result<(), axum::response::Response> {
        let mut errs = FieldErrors::default();
        for (i, line) in self.lines.iter().enumerate() {
            line.check(&format!("lines[{i}]."), &mut errs);
        }
        errs.finish()
    }
}

impl From<CreateQuotationRequest> for NewQuotation {
    fn from(r: CreateQuotationRequest) -> Self {
        NewQuotation {
            project_id: r.project_id,
            valid_until: r.valid_until,
            lines: r.lines.into_iter().map(NewQuotationLine::from).collect(),
        }
    }
}

// -------------------------
// Purchasing
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreatePurchaseRequestRequest {
    pub title: String,
    pub description: Option<String>,
    pub project_id: Option<ProjectId>,
    pub currency: Option<Currency>,
    pub needed_by: Option<NaiveDate>,
}

impl Validate for CreatePurchaseRequestRequest {
    fn validate(&self) -> Result<(), axum::response::Response> {
        FieldErrors::default().text("title", &self.title).finish()
    }
}

impl CreatePurchaseRequestRequest {
    pub fn into_new(self, default_currency: &Currency) -> NewPurchaseRequest {
        NewPurchaseRequest {
            title: self.title,
            description: self.description,
            project_id: self.project_id,
            currency: self.currency.unwrap_or_else(|| default_currency.clone()),
            needed_by: self.needed_by,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SendRfqRequest {
    pub vendor_ids: Vec<CompanyId>,
}

impl Validate for SendRfqRequest {
    fn validate(&self) -> Result<(), axum::response::Response> {
        FieldErrors::default()
            .check("vendor_ids", !self.vendor_ids.is_empty(), "must name at least one vendor")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct RecordReplyRequest {
    pub amount: Decimal,
    pub lead_time_days: u32,
}

impl Validate for RecordReplyRequest {
    fn validate(&self) -> Result<(), axum::response::Response> {
        FieldErrors::default().positive("amount", self.amount).finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct CreatePurchaseOrderRequest {
    pub purchase_request_id: PurchaseRequestId,
    pub rfq_item_id: RfqItemId,
}

#[derive(Debug, Default, Deserialize)]
pub struct CancelOrderRequest {
    pub reason: Option<String>,
}

// -------------------------
// Payments & invoices
// -------------------------

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub amount: Decimal,
    pub reference: Option<String>,
}

impl Validate for PaymentRequest {
    fn validate(&self) -> Result<(), axum::response::Response> {
        FieldErrors::default().positive("amount", self.amount).finish()
    }
}

impl From<PaymentRequest> for NewVendorPayment {
    fn from(r: PaymentRequest) -> Self {
        NewVendorPayment {
            amount: r.amount,
            reference: r.reference,
        }
    }
}

impl From<PaymentRequest> for NewPayment {
    fn from(r: PaymentRequest) -> Self {
        NewPayment {
            amount: r.amount,
            reference: r.reference,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DraftInvoiceRequest {
    pub project_id: ProjectId,
    pub customer_id: CompanyId,
    pub supply_amount: Decimal,
    pub currency: Option<Currency>,
}

impl Validate for DraftInvoiceRequest {
    fn validate(&self) -> Result<(), axum::response::Response> {
        FieldErrors::default()
            .positive("supply_amount", self.supply_amount)
            .finish()
    }
}

impl DraftInvoiceRequest {
    pub fn into_new(self, default_currency: &Currency) -> NewTaxInvoice {
        NewTaxInvoice {
            project_id: self.project_id,
            customer_id: self.customer_id,
            supply_amount: self.supply_amount,
            currency: self.currency.unwrap_or_else(|| default_currency.clone()),
        }
    }
}

// -------------------------
// Activity
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<usize>,
}
