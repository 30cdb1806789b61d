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
use models::{product, tenant};

#[derive(Clone, Debug, Deserialize)]
pub struct CreateProduct {
    pub tenant_id: Uuid,
    pub sku: String,
    pub name: String,
    pub description: Option<String>,
    pub unit_price: Decimal,
    pub uom: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub description: Option<String>,
    pub unit_price: Option<Decimal>,
    pub uom: Option<String>,
    pub version: Option<i32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProductFilter {
    pub tenant_id: Option<Uuid>,
    pub q: Option<String>,
}

pub async fn create_product(
    db: &DatabaseConnection,
    input: CreateProduct,
    actor: Uuid,
) -> Result<product::Model, ServiceError> {
    product::validate_sku(&input.sku)?;
    product::validate_name(&input.name)?;
    product::validate_unit_price(input.unit_price)?;
    if tenant::Entity::find_by_id(input.tenant_id)
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .is_none()
    {
        return Err(ServiceError::Validation("tenant does not exist".into()));
    }
    let dup = product::Entity::find()
        .filter(product::Column::TenantId.eq(input.tenant_id))
        .filter(product::Column::Sku.eq(&input.sku))
        .filter(product::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(ServiceError::db)?;
    if dup.is_some() {
        return Err(ServiceError::duplicate("product", "sku"));
    }

    let now = Utc::now();
    let am = product::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(input.tenant_id),
        sku: Set(input.sku),
        name: Set(input.name),
        description: Set(input.description),
        unit_price: Set(input.unit_price),
        uom: Set(input.uom),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        created_by: Set(actor),
        updated_by: Set(actor),
        deleted_at: Set(None),
        version: Set(1),
    };
    am.insert(db).await.map_err(ServiceError::db)
}

pub async fn get_product(db: &DatabaseConnection, id: Uuid) -> Result<product::Model, ServiceError> {
    product::Entity::find_by_id(id)
        .filter(product::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("product"))
}

pub async fn list_products(
    db: &DatabaseConnection,
    filter: ProductFilter,
    opts: Pagination,
) -> Result<Paged<product::Model>, ServiceError> {
    let mut query = product::Entity::find().filter(product::Column::DeletedAt.is_null());
    if let Some(tenant_id) = filter.tenant_id {
        query = query.filter(product::Column::TenantId.eq(tenant_id));
    }
    if let Some(q) = filter.q.as_deref().filter(|s| !s.trim().is_empty()) {
        query = query.filter(
            Condition::any()
                .add(product::Column::Sku.contains(q))
                .add(product::Column::Name.contains(q)),
        );
    }
    let (page_idx, per_page) = opts.normalize();
    let paginator = query.order_by_asc(product::Column::Sku).paginate(db, per_page);
    let total = paginator.num_items().await.map_err(ServiceError::db)?;
    let items = paginator.fetch_page(page_idx).await.map_err(ServiceError::db)?;
    Ok(Paged::new(items, total, opts))
}

pub async fn update_product(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdateProduct,
    actor: Uuid,
) -> Result<product::Model, ServiceError> {
    let found = get_product(db, id).await?;
    if let Some(expected) = input.version {
        if expected != found.version {
            return Err(ServiceError::version_conflict(expected, found.version));
        }
    }
    let current_version = found.version;
    let mut am: product::ActiveModel = found.into();
    if let Some(name) = input.name {
        product::validate_name(&name)?;
        am.name = Set(name);
    }
    if let Some(description) = input.description {
        am.description = Set(Some(description));
    }
    if let Some(unit_price) = input.unit_price {
        product::validate_unit_price(unit_price)?;
        am.unit_price = Set(unit_price);
    }
    if let Some(uom) = input.uom {
        am.uom = Set(uom);
    }
    am.updated_at = Set(Utc::now().into());
    am.updated_by = Set(actor);
    am.version = Set(current_version + 1);
    if input.version.is_some() {
        let rows = product::Entity::update_many()
            .set(am)
            .filter(product::Column::Id.eq(id))
            .filter(product::Column::Version.eq(current_version))
            .exec(db)
            .await
            .map_err(ServiceError::db)?
            .rows_affected;
        if rows == 0 {
            let row = get_product(db, id).await?;
            return Err(ServiceError::version_conflict(current_version, row.version));
        }
        get_product(db, id).await
    } else {
        am.update(db).await.map_err(ServiceError::db)
    }
}

pub async fn delete_product(db: &DatabaseConnection, id: Uuid, actor: Uuid) -> Result<(), ServiceError> {
    let found = get_product(db, id).await?;
    let mut am: product::ActiveModel = found.into();
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

    #[tokio::test]
    async fn sku_unique_and_price_validated() -> Result<(), anyhow::Error> {
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
            CreateTenant { name: format!("inv_{}", Uuid::new_v4()) },
        )
        .await?;

        let p = create_product(
            &db,
            CreateProduct {
                tenant_id: t.id,
                sku: "WIDGET-1".into(),
                name: "Widget".into(),
                description: None,
                unit_price: Decimal::new(999, 2),
                uom: "EA".into(),
            },
            actor,
        )
        .await?;

        let dup = create_product(
            &db,
            CreateProduct {
                tenant_id: t.id,
                sku: "WIDGET-1".into(),
                name: "Widget clone".into(),
                description: None,
                unit_price: Decimal::ZERO,
                uom: "EA".into(),
            },
            actor,
        )
        .await;
        assert!(matches!(dup, Err(ServiceError::Validation(_))));

        let neg = update_product(
            &db,
            p.id,
            UpdateProduct { unit_price: Some(Decimal::new(-100, 2)), ..Default::default() },
            actor,
        )
        .await;
        assert!(matches!(neg, Err(ServiceError::Model(_))));

        tenant_service::delete_tenant(&db, t.id).await?;
        Ok(())
    }
}
