//! Invoices carry a cross-field money invariant:
//! `total = base + usage - discount + tax`. Creates check the payload,
//! updates check the merge of stored values and payload so a partial
//! patch can never leave a row unbalanced.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    pagination::{Paged, Pagination},
};
use models::invoice::{self, InvoiceStatus};
use models::{currency, customer, tenant};

#[derive(Clone, Debug, Deserialize)]
pub struct CreateInvoice {
    pub tenant_id: Uuid,
    pub customer_id: Uuid,
    pub number: String,
    #[serde(default = "default_status")]
    pub status: InvoiceStatus,
    pub currency_code: String,
    pub base_amount: Decimal,
    pub usage_amount: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub issued_on: chrono::NaiveDate,
    pub due_on: chrono::NaiveDate,
    pub notes: Option<String>,
}

fn default_status() -> InvoiceStatus {
    InvoiceStatus::Pending
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateInvoice {
    pub status: Option<InvoiceStatus>,
    pub base_amount: Option<Decimal>,
    pub usage_amount: Option<Decimal>,
    pub discount_amount: Option<Decimal>,
    pub tax_amount: Option<Decimal>,
    pub total_amount: Option<Decimal>,
    pub due_on: Option<chrono::NaiveDate>,
    pub notes: Option<String>,
    pub version: Option<i32>,
}

impl UpdateInvoice {
    fn touches_amounts(&self) -> bool {
        self.base_amount.is_some()
            || self.usage_amount.is_some()
            || self.discount_amount.is_some()
            || self.tax_amount.is_some()
            || self.total_amount.is_some()
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct InvoiceFilter {
    pub tenant_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub status: Option<InvoiceStatus>,
    pub issued_from: Option<chrono::NaiveDate>,
    pub issued_to: Option<chrono::NaiveDate>,
    pub q: Option<String>,
}

pub async fn create_invoice(
    db: &DatabaseConnection,
    input: CreateInvoice,
    actor: Uuid,
) -> Result<invoice::Model, ServiceError> {
    invoice::validate_number(&input.number)?;
    let currency_code = currency::validate_code(&input.currency_code)?;
    invoice::validate_amounts(
        input.base_amount,
        input.usage_amount,
        input.discount_amount,
        input.tax_amount,
        input.total_amount,
    )?;
    if input.due_on < input.issued_on {
        return Err(ServiceError::Validation("due_on must not precede issued_on".into()));
    }
    if tenant::Entity::find_by_id(input.tenant_id)
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .is_none()
    {
        return Err(ServiceError::Validation("tenant does not exist".into()));
    }
    let cust = customer::Entity::find_by_id(input.customer_id)
        .filter(customer::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::Validation("customer does not exist".into()))?;
    if cust.tenant_id != input.tenant_id {
        return Err(ServiceError::Validation("customer belongs to a different tenant".into()));
    }
    let dup = invoice::Entity::find()
        .filter(invoice::Column::TenantId.eq(input.tenant_id))
        .filter(invoice::Column::Number.eq(&input.number))
        .filter(invoice::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(ServiceError::db)?;
    if dup.is_some() {
        return Err(ServiceError::duplicate("invoice", "number"));
    }

    let now = Utc::now();
    let am = invoice::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(input.tenant_id),
        customer_id: Set(input.customer_id),
        number: Set(input.number),
        status: Set(input.status),
        currency_code: Set(currency_code),
        base_amount: Set(input.base_amount),
        usage_amount: Set(input.usage_amount),
        discount_amount: Set(input.discount_amount),
        tax_amount: Set(input.tax_amount),
        total_amount: Set(input.total_amount),
        issued_on: Set(input.issued_on),
        due_on: Set(input.due_on),
        notes: Set(input.notes),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        created_by: Set(actor),
        updated_by: Set(actor),
        deleted_at: Set(None),
        version: Set(1),
    };
    let created = am.insert(db).await.map_err(ServiceError::db)?;
    tracing::info!(invoice_id = %created.id, number = %created.number, "invoice created");
    Ok(created)
}

pub async fn get_invoice(db: &DatabaseConnection, id: Uuid) -> Result<invoice::Model, ServiceError> {
    invoice::Entity::find_by_id(id)
        .filter(invoice::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("invoice"))
}

pub async fn list_invoices(
    db: &DatabaseConnection,
    filter: InvoiceFilter,
    opts: Pagination,
) -> Result<Paged<invoice::Model>, ServiceError> {
    let mut query = invoice::Entity::find().filter(invoice::Column::DeletedAt.is_null());
    if let Some(tenant_id) = filter.tenant_id {
        query = query.filter(invoice::Column::TenantId.eq(tenant_id));
    }
    if let Some(customer_id) = filter.customer_id {
        query = query.filter(invoice::Column::CustomerId.eq(customer_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(invoice::Column::Status.eq(status));
    }
    if let Some(from) = filter.issued_from {
        query = query.filter(invoice::Column::IssuedOn.gte(from));
    }
    if let Some(to) = filter.issued_to {
        query = query.filter(invoice::Column::IssuedOn.lte(to));
    }
    if let Some(q) = filter.q.as_deref().filter(|s| !s.trim().is_empty()) {
        query = query.filter(
            Condition::any()
                .add(invoice::Column::Number.contains(q))
                .add(invoice::Column::Notes.contains(q)),
        );
    }
    let (page_idx, per_page) = opts.normalize();
    let paginator = query
        .order_by_desc(invoice::Column::IssuedOn)
        .paginate(db, per_page);
    let total = paginator.num_items().await.map_err(ServiceError::db)?;
    let items = paginator.fetch_page(page_idx).await.map_err(ServiceError::db)?;
    Ok(Paged::new(items, total, opts))
}

pub async fn update_invoice(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdateInvoice,
    actor: Uuid,
) -> Result<invoice::Model, ServiceError> {
    let found = get_invoice(db, id).await?;
    if let Some(expected) = input.version {
        if expected != found.version {
            return Err(ServiceError::version_conflict(expected, found.version));
        }
    }
    if input.touches_amounts() {
        let base = input.base_amount.unwrap_or(found.base_amount);
        let usage = input.usage_amount.unwrap_or(found.usage_amount);
        let discount = input.discount_amount.unwrap_or(found.discount_amount);
        let tax = input.tax_amount.unwrap_or(found.tax_amount);
        let total = input.total_amount.unwrap_or(found.total_amount);
        invoice::validate_amounts(base, usage, discount, tax, total)?;
    }
    if let Some(due_on) = input.due_on {
        if due_on < found.issued_on {
            return Err(ServiceError::Validation("due_on must not precede issued_on".into()));
        }
    }

    let current_version = found.version;
    let mut am: invoice::ActiveModel = found.into();
    if let Some(status) = input.status {
        am.status = Set(status);
    }
    if let Some(v) = input.base_amount {
        am.base_amount = Set(v);
    }
    if let Some(v) = input.usage_amount {
        am.usage_amount = Set(v);
    }
    if let Some(v) = input.discount_amount {
        am.discount_amount = Set(v);
    }
    if let Some(v) = input.tax_amount {
        am.tax_amount = Set(v);
    }
    if let Some(v) = input.total_amount {
        am.total_amount = Set(v);
    }
    if let Some(due_on) = input.due_on {
        am.due_on = Set(due_on);
    }
    if let Some(notes) = input.notes {
        am.notes = Set(Some(notes));
    }
    am.updated_at = Set(Utc::now().into());
    am.updated_by = Set(actor);
    am.version = Set(current_version + 1);
    if input.version.is_some() {
        let rows = invoice::Entity::update_many()
            .set(am)
            .filter(invoice::Column::Id.eq(id))
            .filter(invoice::Column::Version.eq(current_version))
            .exec(db)
            .await
            .map_err(ServiceError::db)?
            .rows_affected;
        if rows == 0 {
            let row = get_invoice(db, id).await?;
            return Err(ServiceError::version_conflict(current_version, row.version));
        }
        get_invoice(db, id).await
    } else {
        am.update(db).await.map_err(ServiceError::db)
    }
}

pub async fn delete_invoice(db: &DatabaseConnection, id: Uuid, actor: Uuid) -> Result<(), ServiceError> {
    let found = get_invoice(db, id).await?;
    let mut am: invoice::ActiveModel = found.into();
    let now = Utc::now();
    am.deleted_at = Set(Some(now.into()));
    am.updated_at = Set(now.into());
    am.updated_by = Set(actor);
    am.update(db).await.map_err(ServiceError::db)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer_service::{self, CreateCustomer};
    use crate::tenant_service::{self, CreateTenant};
    use crate::test_support::get_db;
    use chrono::NaiveDate;

    fn dec(v: i64) -> Decimal {
        Decimal::new(v * 100, 2)
    }

    // validate_number caps at 32 chars, so keep generated numbers short
    fn inv_number(prefix: &str) -> String {
        let id = Uuid::new_v4().simple().to_string();
        format!("{}-{}", prefix, &id[..8])
    }

    async fn seed(db: &DatabaseConnection, actor: Uuid) -> anyhow::Result<(Uuid, Uuid)> {
        let t = tenant_service::create_tenant(
            db,
            CreateTenant { name: format!("bill_{}", Uuid::new_v4()) },
        )
        .await?;
        let c = customer_service::create_customer(
            db,
            CreateCustomer { tenant_id: t.id, name: "Billable Inc".into(), email: None, phone: None },
            actor,
        )
        .await?;
        Ok((t.id, c.id))
    }

    fn base_input(tenant_id: Uuid, customer_id: Uuid) -> CreateInvoice {
        CreateInvoice {
            tenant_id,
            customer_id,
            number: inv_number("INV"),
            status: InvoiceStatus::Pending,
            currency_code: "EUR".into(),
            base_amount: dec(100),
            usage_amount: dec(20),
            discount_amount: dec(10),
            tax_amount: dec(5),
            total_amount: dec(115),
            issued_on: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            due_on: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn unbalanced_create_rejected() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return Ok(());
            }
        };
        let actor = Uuid::new_v4();
        let (tid, cid) = seed(&db, actor).await?;

        let mut bad = base_input(tid, cid);
        bad.total_amount = dec(999);
        let res = create_invoice(&db, bad, actor).await;
        match res {
            Err(ServiceError::Model(e)) => assert!(e.to_string().contains("amount_mismatch")),
            other => panic!("expected amount mismatch, got {:?}", other.map(|m| m.id)),
        }

        // an invalid currency code is a validation error, not a db error
        let mut bad_ccy = base_input(tid, cid);
        bad_ccy.currency_code = "DOLLARS".into();
        let res = create_invoice(&db, bad_ccy, actor).await;
        assert!(matches!(res, Err(ServiceError::Model(_))));

        tenant_service::delete_tenant(&db, tid).await?;
        Ok(())
    }

    #[tokio::test]
    async fn partial_amount_patch_checks_merged_values() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return Ok(());
            }
        };
        let actor = Uuid::new_v4();
        let (tid, cid) = seed(&db, actor).await?;
        let inv = create_invoice(&db, base_input(tid, cid), actor).await?;

        // bumping discount alone unbalances the stored total
        let res = update_invoice(
            &db,
            inv.id,
            UpdateInvoice { discount_amount: Some(dec(50)), ..Default::default() },
            actor,
        )
        .await;
        assert!(matches!(res, Err(ServiceError::Model(_))));

        // the same patch with a matching total goes through
        let updated = update_invoice(
            &db,
            inv.id,
            UpdateInvoice {
                discount_amount: Some(dec(50)),
                total_amount: Some(dec(75)),
                ..Default::default()
            },
            actor,
        )
        .await?;
        assert_eq!(updated.total_amount, dec(75));
        assert_eq!(updated.version, 2);

        // a status-only patch never trips the amount check
        let paid = update_invoice(
            &db,
            inv.id,
            UpdateInvoice { status: Some(InvoiceStatus::Paid), ..Default::default() },
            actor,
        )
        .await?;
        assert_eq!(paid.status, InvoiceStatus::Paid);

        tenant_service::delete_tenant(&db, tid).await?;
        Ok(())
    }

    #[tokio::test]
    async fn number_unique_per_tenant_among_live() -> Result<(), anyhow::Error> {
        if std::env::var("SKIP_DB_TESTS").is_ok() {
            return Ok(());
        }
        let db = match get_db().await {
            Ok(db) => db,
            Err(e) => {
                eprintln!("skip: cannot connect to db: {}", e);
                return Ok(());
            }
        };
        let actor = Uuid::new_v4();
        let (tid, cid) = seed(&db, actor).await?;

        let mut input = base_input(tid, cid);
        input.number = inv_number("INV-D");
        let first = create_invoice(&db, input.clone(), actor).await?;
        let dup = create_invoice(&db, input.clone(), actor).await;
        assert!(matches!(dup, Err(ServiceError::Validation(_))));

        // soft-deleted numbers are reusable
        delete_invoice(&db, first.id, actor).await?;
        create_invoice(&db, input, actor).await?;

        tenant_service::delete_tenant(&db, tid).await?;
        Ok(())
    }
}
