use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    errors::ServiceError,
    pagination::{Paged, Pagination},
};
use models::sales_order::{self, SalesOrderStatus};
use models::{customer, tenant};

#[derive(Clone, Debug, Deserialize)]
pub struct CreateSalesOrder {
    pub tenant_id: Uuid,
    pub customer_id: Uuid,
    pub number: String,
    #[serde(default = "default_status")]
    pub status: SalesOrderStatus,
    pub total_amount: Decimal,
    pub ordered_on: chrono::NaiveDate,
}

fn default_status() -> SalesOrderStatus {
    SalesOrderStatus::Draft
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateSalesOrder {
    pub status: Option<SalesOrderStatus>,
    pub total_amount: Option<Decimal>,
    pub ordered_on: Option<chrono::NaiveDate>,
    pub version: Option<i32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SalesOrderFilter {
    pub tenant_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub status: Option<SalesOrderStatus>,
    pub q: Option<String>,
}

pub async fn create_sales_order(
    db: &DatabaseConnection,
    input: CreateSalesOrder,
    actor: Uuid,
) -> Result<sales_order::Model, ServiceError> {
    sales_order::validate_number(&input.number)?;
    sales_order::validate_total_amount(input.total_amount)?;
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
    let dup = sales_order::Entity::find()
        .filter(sales_order::Column::TenantId.eq(input.tenant_id))
        .filter(sales_order::Column::Number.eq(&input.number))
        .filter(sales_order::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(ServiceError::db)?;
    if dup.is_some() {
        return Err(ServiceError::duplicate("sales_order", "number"));
    }

    let now = Utc::now();
    let am = sales_order::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(input.tenant_id),
        customer_id: Set(input.customer_id),
        number: Set(input.number),
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

pub async fn get_sales_order(db: &DatabaseConnection, id: Uuid) -> Result<sales_order::Model, ServiceError> {
    sales_order::Entity::find_by_id(id)
        .filter(sales_order::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("sales_order"))
}

pub async fn list_sales_orders(
    db: &DatabaseConnection,
    filter: SalesOrderFilter,
    opts: Pagination,
) -> Result<Paged<sales_order::Model>, ServiceError> {
    let mut query = sales_order::Entity::find().filter(sales_order::Column::DeletedAt.is_null());
    if let Some(tenant_id) = filter.tenant_id {
        query = query.filter(sales_order::Column::TenantId.eq(tenant_id));
    }
    if let Some(customer_id) = filter.customer_id {
        query = query.filter(sales_order::Column::CustomerId.eq(customer_id));
    }
    if let Some(status) = filter.status {
        query = query.filter(sales_order::Column::Status.eq(status));
    }
    if let Some(q) = filter.q.as_deref().filter(|s| !s.trim().is_empty()) {
        query = query.filter(sales_order::Column::Number.contains(q));
    }
    let (page_idx, per_page) = opts.normalize();
    let paginator = query
        .order_by_desc(sales_order::Column::OrderedOn)
        .paginate(db, per_page);
    let total = paginator.num_items().await.map_err(ServiceError::db)?;
    let items = paginator.fetch_page(page_idx).await.map_err(ServiceError::db)?;
    Ok(Paged::new(items, total, opts))
}

pub async fn update_sales_order(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdateSalesOrder,
    actor: Uuid,
) -> Result<sales_order::Model, ServiceError> {
    let found = get_sales_order(db, id).await?;
    if let Some(expected) = input.version {
        if expected != found.version {
            return Err(ServiceError::version_conflict(expected, found.version));
        }
    }
    let current_version = found.version;
    let mut am: sales_order::ActiveModel = found.into();
    if let Some(status) = input.status {
        am.status = Set(status);
    }
    if let Some(total) = input.total_amount {
        sales_order::validate_total_amount(total)?;
        am.total_amount = Set(total);
    }
    if let Some(ordered_on) = input.ordered_on {
        am.ordered_on = Set(ordered_on);
    }
    am.updated_at = Set(Utc::now().into());
    am.updated_by = Set(actor);
    am.version = Set(current_version + 1);
    if input.version.is_some() {
        let rows = sales_order::Entity::update_many()
            .set(am)
            .filter(sales_order::Column::Id.eq(id))
            .filter(sales_order::Column::Version.eq(current_version))
            .exec(db)
            .await
            .map_err(ServiceError::db)?
            .rows_affected;
        if rows == 0 {
            let row = get_sales_order(db, id).await?;
            return Err(ServiceError::version_conflict(current_version, row.version));
        }
        get_sales_order(db, id).await
    } else {
        am.update(db).await.map_err(ServiceError::db)
    }
}

pub async fn delete_sales_order(db: &DatabaseConnection, id: Uuid, actor: Uuid) -> Result<(), ServiceError> {
    let found = get_sales_order(db, id).await?;
    let mut am: sales_order::ActiveModel = found.into();
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

    #[tokio::test]
    async fn so_requires_customer_in_same_tenant() -> Result<(), anyhow::Error> {
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
        let t1 = tenant_service::create_tenant(
            &db,
            CreateTenant { name: format!("sales_a_{}", Uuid::new_v4()) },
        )
        .await?;
        let t2 = tenant_service::create_tenant(
            &db,
            CreateTenant { name: format!("sales_b_{}", Uuid::new_v4()) },
        )
        .await?;
        let other_cust = customer_service::create_customer(
            &db,
            CreateCustomer { tenant_id: t2.id, name: "Elsewhere Ltd".into(), email: None, phone: None },
            actor,
        )
        .await?;

        let cross = create_sales_order(
            &db,
            CreateSalesOrder {
                tenant_id: t1.id,
                customer_id: other_cust.id,
                number: "SO-1".into(),
                status: SalesOrderStatus::Draft,
                total_amount: Decimal::ZERO,
                ordered_on: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            },
            actor,
        )
        .await;
        assert!(matches!(cross, Err(ServiceError::Validation(_))));

        tenant_service::delete_tenant(&db, t1.id).await?;
        tenant_service::delete_tenant(&db, t2.id).await?;
        Ok(())
    }
}
