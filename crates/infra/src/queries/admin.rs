use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tradeerp_admin::{Company, CompanyId, CompanyKind, ContactInfo, Role, User, UserId};
use tradeerp_core::{DomainResult, Entity};

use super::{Page, PageRequest};
use crate::store::Tables;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyView {
    pub id: CompanyId,
    pub name: String,
    pub registration_number: String,
    pub kind: CompanyKind,
    pub contact: ContactInfo,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Company> for CompanyView {
    fn from(c: &Company) -> Self {
        Self {
            id: *c.id(),
            name: c.name().to_string(),
            registration_number: c.registration_number().to_string(),
            kind: c.kind(),
            contact: c.contact().clone(),
            active: c.is_active(),
            created_at: c.created_at(),
            updated_at: c.updated_at(),
        }
    }
}

/// `?kind=VENDOR&active=true&name=acme`
///
/// `kind=VENDOR` also matches `BOTH`; `name` is a case-insensitive substring.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyFilter {
    pub kind: Option<CompanyKind>,
    pub active: Option<bool>,
    pub name: Option<String>,
}

impl CompanyFilter {
    fn matches(&self, c: &Company) -> bool {
        let kind_ok = match self.kind {
            None => true,
            Some(CompanyKind::Vendor) => c.is_vendor(),
            Some(CompanyKind::Customer) => c.is_customer(),
            Some(CompanyKind::Both) => c.kind() == CompanyKind::Both,
        };
        let name_ok = self.name.as_deref().is_none_or(|needle| {
            c.name().to_lowercase().contains(&needle.to_lowercase())
        });
        kind_ok && name_ok && self.active.is_none_or(|a| c.is_active() == a)
    }
}

pub fn list_companies(tables: &Tables, filter: &CompanyFilter, page: PageRequest) -> Page<CompanyView> {
    Page::collect(
        tables
            .companies()
            .iter()
            .rev()
            .filter(|c| filter.matches(c))
            .map(CompanyView::from),
        page,
    )
}

pub fn company_detail(tables: &Tables, id: CompanyId) -> DomainResult<CompanyView> {
    tables.companies().require(&id, "company").map(CompanyView::from)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(u: &User) -> Self {
        Self {
            id: *u.id(),
            username: u.username().to_string(),
            email: u.email().to_string(),
            display_name: u.display_name().to_string(),
            role: u.role(),
            active: u.is_active(),
            created_at: u.created_at(),
            updated_at: u.updated_at(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub active: Option<bool>,
}

pub fn list_users(tables: &Tables, filter: &UserFilter, page: PageRequest) -> Page<UserView> {
    Page::collect(
        tables
            .users()
            .iter()
            .rev()
            .filter(|u| filter.role.is_none_or(|r| u.role() == r))
            .filter(|u| filter.active.is_none_or(|a| u.is_active() == a))
            .map(UserView::from),
        page,
    )
}

pub fn user_detail(tables: &Tables, id: UserId) -> DomainResult<UserView> {
    tables.users().require(&id, "user").map(UserView::from)
}
