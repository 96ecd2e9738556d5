use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tradeerp_core::{DomainError, DomainResult, Entity, typed_id};

typed_id!(
    /// Company identifier.
    CompanyId,
    "company id"
);

/// What a company is to us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompanyKind {
    Customer,
    Vendor,
    Both,
}

/// Contact information for a company.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Input for registering a company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCompany {
    pub name: String,
    pub registration_number: String,
    pub kind: CompanyKind,
    #[serde(default)]
    pub contact: ContactInfo,
}

/// A trading partner (customer, vendor, or both).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Company {
    id: CompanyId,
    name: String,
    registration_number: String,
    kind: CompanyKind,
    contact: ContactInfo,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Strip separators so `123-45-67890` and `1234567890` collide.
pub fn normalize_registration_number(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

impl Company {
    /// Register a new, active company.
    ///
    /// Uniqueness of the registration number is a store-level check done by
    /// the admin service before this is called.
    pub fn register(id: CompanyId, input: NewCompany, now: DateTime<Utc>) -> DomainResult<Self> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("name must not be empty"));
        }
        let registration_number = normalize_registration_number(&input.registration_number);
        if registration_number.is_empty() {
            return Err(DomainError::validation(
                "registration_number must contain at least one letter or digit",
            ));
        }

        Ok(Self {
            id,
            name,
            registration_number,
            kind: input.kind,
            contact: input.contact,
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registration_number(&self) -> &str {
        &self.registration_number
    }

    pub fn kind(&self) -> CompanyKind {
        self.kind
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_vendor(&self) -> bool {
        matches!(self.kind, CompanyKind::Vendor | CompanyKind::Both)
    }

    pub fn is_customer(&self) -> bool {
        matches!(self.kind, CompanyKind::Customer | CompanyKind::Both)
    }

    pub fn update_profile(
        &mut self,
        name: Option<String>,
        contact: Option<ContactInfo>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        if let Some(name) = name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(DomainError::validation("name must not be empty"));
            }
            self.name = name;
        }
        if let Some(contact) = contact {
            self.contact = contact;
        }
        self.updated_at = now;
        Ok(())
    }

    pub fn deactivate(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if !self.active {
            return Err(DomainError::business(
                "COMPANY_ALREADY_INACTIVE",
                format!("company {} is already inactive", self.id),
            ));
        }
        self.active = false;
        self.updated_at = now;
        Ok(())
    }

    pub fn reactivate(&mut self, now: DateTime<Utc>) -> DomainResult<()> {
        if self.active {
            return Err(DomainError::business(
                "COMPANY_ALREADY_ACTIVE",
                format!("company {} is already active", self.id),
            ));
        }
        self.active = true;
        self.updated_at = now;
        Ok(())
    }

    /// Guard for purchasing: RFQs and orders go only to active vendors.
    pub fn ensure_active_vendor(&self) -> DomainResult<()> {
        if !self.is_vendor() {
            return Err(DomainError::business(
                "COMPANY_NOT_VENDOR",
                format!("{} is not registered as a vendor", self.name),
            ));
        }
        if !self.active {
            return Err(DomainError::business(
                "COMPANY_INACTIVE",
                format!("vendor {} is inactive", self.name),
            ));
        }
        Ok(())
    }

    /// Guard for sales and projects: only active customers are billed.
    pub fn ensure_active_customer(&self) -> DomainResult<()> {
        if !self.is_customer() {
            return Err(DomainError::business(
                "COMPANY_NOT_CUSTOMER",
                format!("{} is not registered as a customer", self.name),
            ));
        }
        if !self.active {
            return Err(DomainError::business(
                "COMPANY_INACTIVE",
                format!("customer {} is inactive", self.name),
            ));
        }
        Ok(())
    }
}

impl Entity for Company {
    type Id = CompanyId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
