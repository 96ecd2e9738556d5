use axum::Router;

pub mod activity;
pub mod common;
pub mod companies;
pub mod deliveries;
pub mod invoices;
pub mod payables;
pub mod projects;
pub mod purchase_orders;
pub mod purchase_requests;
pub mod quotations;
pub mod system;
pub mod users;

/// Router for every resource endpoint.
pub fn router() -> Router {
    Router::new()
        .nest("/companies", companies::router())
        .nest("/users", users::router())
        .nest("/projects", projects::router())
        .nest("/deliveries", deliveries::router())
        .nest("/quotations", quotations::router())
        .nest("/purchase-requests", purchase_requests::router())
        .nest("/purchase-orders", purchase_orders::router())
        .nest("/accounts-payable", payables::router())
        .nest("/tax-invoices", invoices::router())
        .nest("/activity", activity::router())
}
