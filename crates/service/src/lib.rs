//! Service layer providing business-oriented CRUD operations on top of models.
//! - Separates business logic from data access.
//! - Reuses validation and entity definitions in the `models` crate.
//! - Enforces the unified soft-delete policy and optimistic version checks.

pub mod errors;
pub mod pagination;
#[cfg(test)]
pub mod test_support;

pub mod tenant_service;
pub mod currency_service;
pub mod code_service;
pub mod customer_service;
pub mod employee_service;
pub mod product_service;
pub mod warehouse_service;
pub mod plan_service;
pub mod invoice_service;
pub mod purchase_order_service;
pub mod sales_order_service;
pub mod workflow_service;
