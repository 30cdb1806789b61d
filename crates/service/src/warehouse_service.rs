use chrono::Utc;
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
use models::{tenant, warehouse};

#[derive(Clone, Debug, Deserialize)]
pub struct CreateWarehouse {
    pub tenant_id: Uuid,
    pub code: String,
    pub name: String,
    pub address: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateWarehouse {
    pub name: Option<String>,
    pub address: Option<String>,
    pub version: Option<i32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct WarehouseFilter {
    pub tenant_id: Option<Uuid>,
    pub q: Option<String>,
}

pub async fn create_warehouse(
    db: &DatabaseConnection,
    input: CreateWarehouse,
    actor: Uuid,
) -> Result<warehouse::Model, ServiceError> {
    warehouse::validate_code(&input.code)?;
    warehouse::validate_name(&input.name)?;
    if tenant::Entity::find_by_id(input.tenant_id)
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .is_none()
    {
        return Err(ServiceError::Validation("tenant does not exist".into()));
    }
    let dup = warehouse::Entity::find()
        .filter(warehouse::Column::TenantId.eq(input.tenant_id))
        .filter(warehouse::Column::Code.eq(&input.code))
        .filter(warehouse::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(ServiceError::db)?;
    if dup.is_some() {
        return Err(ServiceError::duplicate("warehouse", "code"));
    }

    let now = Utc::now();
    let am = warehouse::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(input.tenant_id),
        code: Set(input.code),
        name: Set(input.name),
        address: Set(input.address),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        created_by: Set(actor),
        updated_by: Set(actor),
        deleted_at: Set(None),
        version: Set(1),
    };
    am.insert(db).await.map_err(ServiceError::db)
}

pub async fn get_warehouse(db: &DatabaseConnection, id: Uuid) -> Result<warehouse::Model, ServiceError> {
    warehouse::Entity::find_by_id(id)
        .filter(warehouse::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("warehouse"))
}

pub async fn list_warehouses(
    db: &DatabaseConnection,
    filter: WarehouseFilter,
    opts: Pagination,
) -> Result<Paged<warehouse::Model>, ServiceError> {
    let mut query = warehouse::Entity::find().filter(warehouse::Column::DeletedAt.is_null());
    if let Some(tenant_id) = filter.tenant_id {
        query = query.filter(warehouse::Column::TenantId.eq(tenant_id));
    }
    if let Some(q) = filter.q.as_deref().filter(|s| !s.trim().is_empty()) {
        query = query.filter(
            Condition::any()
                .add(warehouse::Column::Code.contains(q))
                .add(warehouse::Column::Name.contains(q)),
        );
    }
    let (page_idx, per_page) = opts.normalize();
    let paginator = query.order_by_asc(warehouse::Column::Code).paginate(db, per_page);
    let total = paginator.num_items().await.map_err(ServiceError::db)?;
    let items = paginator.fetch_page(page_idx).await.map_err(ServiceError::db)?;
    Ok(Paged::new(items, total, opts))
}

pub async fn update_warehouse(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdateWarehouse,
    actor: Uuid,
) -> Result<warehouse::Model, ServiceError> {
    let found = get_warehouse(db, id).await?;
    if let Some(expected) = input.version {
        if expected != found.version {
            return Err(ServiceError::version_conflict(expected, found.version));
        }
    }
    let current_version = found.version;
    let mut am: warehouse::ActiveModel = found.into();
    if let Some(name) = input.name {
        warehouse::validate_name(&name)?;
        am.name = Set(name);
    }
    if let Some(address) = input.address {
        am.address = Set(Some(address));
    }
    am.updated_at = Set(Utc::now().into());
    am.updated_by = Set(actor);
    am.version = Set(current_version + 1);
    if input.version.is_some() {
        let rows = warehouse::Entity::update_many()
            .set(am)
            .filter(warehouse::Column::Id.eq(id))
            .filter(warehouse::Column::Version.eq(current_version))
            .exec(db)
            .await
            .map_err(ServiceError::db)?
            .rows_affected;
        if rows == 0 {
            let row = get_warehouse(db, id).await?;
            return Err(ServiceError::version_conflict(current_version, row.version));
        }
        get_warehouse(db, id).await
    } else {
        am.update(db).await.map_err(ServiceError::db)
    }
}

pub async fn delete_warehouse(db: &DatabaseConnection, id: Uuid, actor: Uuid) -> Result<(), ServiceError> {
    let found = get_warehouse(db, id).await?;
    let mut am: warehouse::ActiveModel = found.into();
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
    async fn warehouse_code_unique_per_tenant() -> Result<(), anyhow::Error> {
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
            CreateTenant { name: format!("wh_{}", Uuid::new_v4()) },
        )
        .await?;

        create_warehouse(
            &db,
            CreateWarehouse { tenant_id: t.id, code: "MAIN".into(), name: "Main DC".into(), address: None },
            actor,
        )
        .await?;
        let dup = create_warehouse(
            &db,
            CreateWarehouse { tenant_id: t.id, code: "MAIN".into(), name: "Main DC 2".into(), address: None },
            actor,
        )
        .await;
        assert!(matches!(dup, Err(ServiceError::Validation(_))));

        tenant_service::delete_tenant(&db, t.id).await?;
        Ok(())
    }
}
