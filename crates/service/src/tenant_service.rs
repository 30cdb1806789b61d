use chrono::Utc;
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
use models::tenant;

#[derive(Clone, Debug, Deserialize)]
pub struct CreateTenant {
    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateTenant {
    pub name: Option<String>,
}

/// Create a tenant. Tenants carry no audit suffix; they are the audit root.
pub async fn create_tenant(db: &DatabaseConnection, input: CreateTenant) -> Result<tenant::Model, ServiceError> {
    tenant::validate_name(&input.name)?;
    let am = tenant::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name),
        created_at: Set(Utc::now().into()),
    };
    let created = am.insert(db).await.map_err(ServiceError::db)?;
    tracing::info!(tenant_id = %created.id, "tenant created");
    Ok(created)
}

/// Get tenant by id.
pub async fn get_tenant(db: &DatabaseConnection, id: Uuid) -> Result<tenant::Model, ServiceError> {
    tenant::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("tenant"))
}

pub async fn list_tenants(
    db: &DatabaseConnection,
    q: Option<String>,
    opts: Pagination,
) -> Result<Paged<tenant::Model>, ServiceError> {
    let mut query = tenant::Entity::find();
    if let Some(q) = q.as_deref().filter(|s| !s.trim().is_empty()) {
        query = query.filter(tenant::Column::Name.contains(q));
    }
    let (page_idx, per_page) = opts.normalize();
    let paginator = query.order_by_asc(tenant::Column::Name).paginate(db, per_page);
    let total = paginator.num_items().await.map_err(ServiceError::db)?;
    let items = paginator.fetch_page(page_idx).await.map_err(ServiceError::db)?;
    Ok(Paged::new(items, total, opts))
}

/// Update tenant name.
pub async fn update_tenant(db: &DatabaseConnection, id: Uuid, input: UpdateTenant) -> Result<tenant::Model, ServiceError> {
    let found = get_tenant(db, id).await?;
    let mut am: tenant::ActiveModel = found.into();
    if let Some(name) = input.name {
        tenant::validate_name(&name)?;
        am.name = Set(name);
    }
    am.update(db).await.map_err(ServiceError::db)
}

/// Hard delete a tenant; child rows cascade at the schema level.
pub async fn delete_tenant(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let res = tenant::Entity::delete_by_id(id).exec(db).await.map_err(ServiceError::db)?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("tenant"));
    }
    tracing::info!(tenant_id = %id, "tenant deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;

    #[tokio::test]
    async fn tenant_crud_service() -> Result<(), anyhow::Error> {
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

        let name = format!("svc_tenant_{}", Uuid::new_v4());
        let t = create_tenant(&db, CreateTenant { name: name.clone() }).await?;
        assert_eq!(t.name, name);

        let found = get_tenant(&db, t.id).await?;
        assert_eq!(found.id, t.id);

        let updated = update_tenant(&db, t.id, UpdateTenant { name: Some("new_name".into()) }).await?;
        assert_eq!(updated.name, "new_name");

        delete_tenant(&db, t.id).await?;
        assert!(matches!(get_tenant(&db, t.id).await, Err(ServiceError::NotFound(_))));

        Ok(())
    }

    #[tokio::test]
    async fn empty_name_rejected_without_db() {
        // Validation fires before any query; no database required.
        let err = tenant::validate_name("  ").unwrap_err();
        assert!(err.to_string().contains("name required"));
    }
}
