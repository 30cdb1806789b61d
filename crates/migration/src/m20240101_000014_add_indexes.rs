//! Lookup indexes for hot list/uniqueness columns.
//!
//! Uniqueness of business codes/numbers is enforced at the service layer
//! among live (non-soft-deleted) rows, so these stay non-unique; a unique
//! index would block re-creating a soft-deleted code.
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .name("idx_currency_code")
                    .table(Currency::Table)
                    .col(Currency::Code)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_code_group_code")
                    .table(Code::Table)
                    .col(Code::GroupId)
                    .col(Code::Code)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_customer_tenant")
                    .table(Customer::Table)
                    .col(Customer::TenantId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_employee_tenant_no")
                    .table(Employee::Table)
                    .col(Employee::TenantId)
                    .col(Employee::EmployeeNo)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_product_tenant_sku")
                    .table(Product::Table)
                    .col(Product::TenantId)
                    .col(Product::Sku)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_warehouse_tenant_code")
                    .table(Warehouse::Table)
                    .col(Warehouse::TenantId)
                    .col(Warehouse::Code)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_plan_code")
                    .table(Plan::Table)
                    .col(Plan::Code)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_invoice_number")
                    .table(Invoice::Table)
                    .col(Invoice::Number)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_invoice_tenant_status")
                    .table(Invoice::Table)
                    .col(Invoice::TenantId)
                    .col(Invoice::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_purchase_order_number")
                    .table(PurchaseOrder::Table)
                    .col(PurchaseOrder::Number)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sales_order_number")
                    .table(SalesOrder::Table)
                    .col(SalesOrder::Number)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_workflow_task_workflow")
                    .table(WorkflowTask::Table)
                    .col(WorkflowTask::WorkflowId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_currency_code").table(Currency::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_code_group_code").table(Code::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_customer_tenant").table(Customer::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_employee_tenant_no").table(Employee::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_product_tenant_sku").table(Product::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_warehouse_tenant_code").table(Warehouse::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_plan_code").table(Plan::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_invoice_number").table(Invoice::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_invoice_tenant_status").table(Invoice::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_purchase_order_number").table(PurchaseOrder::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_sales_order_number").table(SalesOrder::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_workflow_task_workflow").table(WorkflowTask::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Currency { Table, Code }

#[derive(DeriveIden)]
enum Code { Table, GroupId, Code }

#[derive(DeriveIden)]
enum Customer { Table, TenantId }

#[derive(DeriveIden)]
enum Employee { Table, TenantId, EmployeeNo }

#[derive(DeriveIden)]
enum Product { Table, TenantId, Sku }

#[derive(DeriveIden)]
enum Warehouse { Table, TenantId, Code }

#[derive(DeriveIden)]
enum Plan { Table, Code }

#[derive(DeriveIden)]
enum Invoice { Table, TenantId, Number, Status }

#[derive(DeriveIden)]
enum PurchaseOrder { Table, Number }

#[derive(DeriveIden)]
enum SalesOrder { Table, Number }

#[derive(DeriveIden)]
enum WorkflowTask { Table, WorkflowId }
