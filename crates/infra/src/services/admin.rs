use std::sync::Arc;

use tracing::{info, instrument};

use tradeerp_admin::{
    Company, CompanyId, ContactInfo, NewCompany, NewUser, Role, User, UserId,
    normalize_registration_number,
};
use tradeerp_core::{DomainError, Entity};

use super::{ServiceResult, in_transaction};
use crate::store::Database;

/// Company and user administration.
#[derive(Debug, Clone)]
pub struct AdminService {
    db: Arc<Database>,
}

impl AdminService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub fn register_company(&self, input: NewCompany) -> ServiceResult<CompanyId> {
        in_transaction(&self.db, |tx| {
            let reg = normalize_registration_number(&input.registration_number);
            let taken = reg.clone();
            if tx
                .companies()
                .find(move |c| c.registration_number() == taken)
                .is_some()
            {
                return Err(DomainError::business(
                    "DUPLICATE_REGISTRATION_NUMBER",
                    format!("registration number {reg} is already registered"),
                )
                .into());
            }
            let company = Company::register(CompanyId::generate(), input, tx.now())?;
            let id = *company.id();
            tx.companies_mut().insert(company);
            info!(company_id = %id, "company registered");
            Ok(id)
        })
    }

    #[instrument(skip(self))]
    pub fn update_company(
        &self,
        id: CompanyId,
        name: Option<String>,
        contact: Option<ContactInfo>,
    ) -> ServiceResult<CompanyId> {
        in_transaction(&self.db, |tx| {
            let now = tx.now();
            tx.companies_mut()
                .require_mut(&id, "company")?
                .update_profile(name, contact, now)?;
            Ok(id)
        })
    }

    #[instrument(skip(self))]
    pub fn deactivate_company(&self, id: CompanyId) -> ServiceResult<CompanyId> {
        in_transaction(&self.db, |tx| {
            let now = tx.now();
            tx.companies_mut().require_mut(&id, "company")?.deactivate(now)?;
            info!(company_id = %id, "company deactivated");
            Ok(id)
        })
    }

    #[instrument(skip(self))]
    pub fn reactivate_company(&self, id: CompanyId) -> ServiceResult<CompanyId> {
        in_transaction(&self.db, |tx| {
            let now = tx.now();
            tx.companies_mut().require_mut(&id, "company")?.reactivate(now)?;
            Ok(id)
        })
    }

    #[instrument(skip(self))]
    pub fn create_user(&self, input: NewUser) -> ServiceResult<UserId> {
        in_transaction(&self.db, |tx| {
            let user = User::create(UserId::generate(), input, tx.now())?;
            let username = user.username().to_string();
            if tx
                .users()
                .find(move |u| u.username() == username)
                .is_some()
            {
                return Err(DomainError::business(
                    "DUPLICATE_USERNAME",
                    format!("username {} is already taken", user.username()),
                )
                .into());
            }
            let id = *user.id();
            tx.users_mut().insert(user);
            info!(user_id = %id, "user created");
            Ok(id)
        })
    }

    #[instrument(skip(self))]
    pub fn change_user_role(&self, id: UserId, role: Role) -> ServiceResult<UserId> {
        in_transaction(&self.db, |tx| {
            let now = tx.now();
            tx.users_mut().require_mut(&id, "user")?.change_role(role, now)?;
            info!(user_id = %id, role = role.as_str(), "user role changed");
            Ok(id)
        })
    }

    #[instrument(skip(self))]
    pub fn deactivate_user(&self, id: UserId) -> ServiceResult<UserId> {
        in_transaction(&self.db, |tx| {
            let now = tx.now();
            tx.users_mut().require_mut(&id, "user")?.deactivate(now)?;
            Ok(id)
        })
    }

    #[instrument(skip(self))]
    pub fn reactivate_user(&self, id: UserId) -> ServiceResult<UserId> {
        in_transaction(&self.db, |tx| {
            let now = tx.now();
            tx.users_mut().require_mut(&id, "user")?.reactivate(now)?;
            Ok(id)
        })
    }
}
