//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_tenant;
mod m20240101_000002_create_currency;
mod m20240101_000003_create_code_group;
mod m20240101_000004_create_code;
mod m20240101_000005_create_customer;
mod m20240101_000006_create_employee;
mod m20240101_000007_create_product;
mod m20240101_000008_create_warehouse;
mod m20240101_000009_create_plan;
mod m20240101_000010_create_invoice;
mod m20240101_000011_create_purchase_order;
mod m20240101_000012_create_sales_order;
mod m20240101_000013_create_workflow;
mod m20240101_000014_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_tenant::Migration),
            Box::new(m20240101_000002_create_currency::Migration),
            Box::new(m20240101_000003_create_code_group::Migration),
            Box::new(m20240101_000004_create_code::Migration),
            Box::new(m20240101_000005_create_customer::Migration),
            Box::new(m20240101_000006_create_employee::Migration),
            Box::new(m20240101_000007_create_product::Migration),
            Box::new(m20240101_000008_create_warehouse::Migration),
            Box::new(m20240101_000009_create_plan::Migration),
            Box::new(m20240101_000010_create_invoice::Migration),
            Box::new(m20240101_000011_create_purchase_order::Migration),
            Box::new(m20240101_000012_create_sales_order::Migration),
            Box::new(m20240101_000013_create_workflow::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000014_add_indexes::Migration),
        ]
    }
}
