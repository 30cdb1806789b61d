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
use models::purchase_order::{self, PurchaseOrderStatus};
use models::tenant;

#[derive(Clone, Debug, Deserialize)]
pub struct CreatePurchaseOrder {
    pub tenant_id: Uuid,
    pub number: String,
    pub supplier_name: String,
    #[serde(default = "default_status")]
    pub status: PurchaseOrderStatus,
    pub total_amount: Decimal,
    pub ordered_on: chrono::NaiveDate,
}

fn default_status() -> PurchaseOrderStatus {
    PurchaseOrderStatus::Draft
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdatePurchaseOrder {
    pub supplier_name: Option<String>,
    pub status: Option<PurchaseOrderStatus>,
    pub total_amount: Option<Decimal>,
    pub ordered_on: Option<chrono::NaiveDate>,
    pub version: Option<i32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PurchaseOrderFilter {
    pub tenant_id: Option<Uuid>,
    pub status: Option<PurchaseOrderStatus>,
    pub q: Option<String>,
}

pub async fn create_purchase_order(
    db: &DatabaseConnection,
    input: CreatePurchaseOrder,
    actor: Uuid,
) -> Result<purchase_order::Model, ServiceError> {
    purchase_order::validate_number(&input.number)?;
    purchase_order::validate_supplier_name(&input.supplier_name)?;
    purchase_order::validate_total_amount(input.total_amount)?;
    if tenant::Entity::find_by_id(input.tenant_id)
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .is_none()
    {
        return Err(ServiceError::Validation("tenant does not exist".into()));
    }
    let dup = purchase_order::Entity::find()
        .filter(purchase_order::Column::TenantId.eq(input.tenant_id))
        .filter(purchase_order::Column::Number.eq(&input.number))
        .filter(purchase_order::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(ServiceError::db)?;
    if dup.is_some() {
        return Err(ServiceError::duplicate("purchase_order", "number"));
    }

    let now = Utc::now();
    let am = purchase_order::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(input.tenant_id),
        number: Set(input.number),
        supplier_name: Set(input.supplier_name),
        status: Set(input.status),
        total_amount: Set(input.total_amount),
        ordered_on: Set(input.ordered_on),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        created_by: Set(actor),
        updated_by: Set(actor),
        deleted_at: Set(None),
        version: Set(1),
    };
    am.insert(db).await.map_err(ServiceError::db)
}

pub async fn get_purchase_order(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<purchase_order::Model, ServiceError> {
    purchase_order::Entity::find_by_id(id)
        .filter(purchase_order::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("purchase_order"))
}

pub async fn list_purchase_orders(
    db: &DatabaseConnection,
    filter: PurchaseOrderFilter,
    opts: Pagination,
) -> Result<Paged<purchase_order::Model>, ServiceError> {
    let mut query =
        purchase_order::Entity::find().filter(purchase_order::Column::DeletedAt.is_null());
    if let Some(tenant_id) = filter.tenant_id {
        query = query.filter(purchase_order::Column::TenantId.eq(tenant_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(purchase_order::Column::Status.eq(status));
    }
    if let Some(q) = filter.q.as_deref().filter(|s| !s.trim().is_empty()) {
        query = query.filter(
            Condition::any()
                .add(purchase_order::Column::Number.contains(q))
                .add(purchase_order::Column::SupplierName.contains(q)),
        );
    }
    let (page_idx, per_page) = opts.normalize();
    let paginator = query
        .order_by_desc(purchase_order::Column::OrderedOn)
        .paginate(db, per_page);
    let total = paginator.num_items().await.map_err(ServiceError::db)?;
    let items = paginator.fetch_page(page_idx).await.map_err(ServiceError::db)?;
    Ok(Paged::new(items, total, opts))
}

pub async fn update_purchase_order(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdatePurchaseOrder,
    actor: Uuid,
) -> Result<purchase_order::Model, ServiceError> {
    let found = get_purchase_order(db, id).await?;
    if let Some(expected) = input.version {
        if expected != found.version {
            return Err(ServiceError::version_conflict(expected, found.version));
        }
    }
    let current_version = found.version;
    let mut am: purchase_order::ActiveModel = found.into();
    if let Some(supplier_name) = input.supplier_name {
        purchase_order::validate_supplier_name(&supplier_name)?;
        am.supplier_name = Set(supplier_name);
    }
    if let Some(status) = input.status {
        am.status = Set(status);
    }
    if let Some(total) = input.total_amount {
        purchase_order::validate_total_amount(total)?;
        am.total_amount = Set(total);
    }
    if let Some(ordered_on) = input.ordered_on {
        am.ordered_on = Set(ordered_on);
    }
    am.updated_at = Set(Utc::now().into());
    am.updated_by = Set(actor);
    am.version = Set(current_version + 1);
    if input.version.is_some() {
        let rows = purchase_order::Entity::update_many()
            .set(am)
            .filter(purchase_order::Column::Id.eq(id))
            .filter(purchase_order::Column::Version.eq(current_version))
            .exec(db)
            .await
            .map_err(ServiceError::db)?
            .rows_affected;
        if rows == 0 {
            let row = get_purchase_order(db, id).await?;
            return Err(ServiceError::version_conflict(current_version, row.version));
        }
        get_purchase_order(db, id).await
    } else {
        am.update(db).await.map_err(ServiceError::db)
    }
}

pub async fn delete_purchase_order(
    db: &DatabaseConnection,
    id: Uuid,
    actor: Uuid,
) -> Result<(), ServiceError> {
    let found = get_purchase_order(db, id).await?;
    let mut am: purchase_order::ActiveModel = found.into();
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
    use crate::tenant_service::{self, CreateTenant};
    use crate::test_support::get_db;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn po_lifecycle() -> Result<(), anyhow::Error> {
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
        let t = tenant_service::create_tenant(
            &db,
            CreateTenant { name: format!("proc_{}", Uuid::new_v4()) },
        )
        .await?;

        let po = create_purchase_order(
            &db,
            CreatePurchaseOrder {
                tenant_id: t.id,
                number: "PO-1001".into(),
                supplier_name: "Steel Supply Co".into(),
                status: PurchaseOrderStatus::Draft,
                total_amount: Decimal::new(250000, 2),
                ordered_on: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            },
            actor,
        )
        .await?;

        let approved = update_purchase_order(
            &db,
            po.id,
            UpdatePurchaseOrder { status: Some(PurchaseOrderStatus::Approved), ..Default::default() },
            actor,
        )
        .await?;
        assert_eq!(approved.status, PurchaseOrderStatus::Approved);
        assert_eq!(approved.version, 2);

        let page = list_purchase_orders(
            &db,
            PurchaseOrderFilter {
                tenant_id: Some(t.id),
                status: Some(PurchaseOrderStatus::Approved),
                q: Some("Steel".into()),
            },
            Pagination::default(),
        )
        .await?;
        assert!(page.items.iter().any(|m| m.id == po.id));

        tenant_service::delete_tenant(&db, t.id).await?;
        Ok(())
    }
}
