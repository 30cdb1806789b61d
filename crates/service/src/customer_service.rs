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
use models::{customer, tenant};

#[derive(Clone, Debug, Deserialize)]
pub struct CreateCustomer {
    pub tenant_id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateCustomer {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Optimistic lock: reject when it no longer matches the stored row.
    pub version: Option<i32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CustomerFilter {
    pub tenant_id: Option<Uuid>,
    /// Substring match against name and email.
    pub q: Option<String>,
}

pub async fn create_customer(
    db: &DatabaseConnection,
    input: CreateCustomer,
    actor: Uuid,
) -> Result<customer::Model, ServiceError> {
    customer::validate_name(&input.name)?;
    if let Some(email) = &input.email {
        customer::validate_email(email)?;
    }
    if tenant::Entity::find_by_id(input.tenant_id)
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .is_none()
    {
        return Err(ServiceError::Validation("tenant does not exist".into()));
    }

    let now = Utc::now();
    let am = customer::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(input.tenant_id),
        name: Set(input.name),
        email: Set(input.email),
        phone: Set(input.phone),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        created_by: Set(actor),
        updated_by: Set(actor),
        deleted_at: Set(None),
        version: Set(1),
    };
    am.insert(db).await.map_err(ServiceError::db)
}

pub async fn get_customer(db: &DatabaseConnection, id: Uuid) -> Result<customer::Model, ServiceError> {
    customer::Entity::find_by_id(id)
        .filter(customer::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("customer"))
}

pub async fn list_customers(
    db: &DatabaseConnection,
    filter: CustomerFilter,
    opts: Pagination,
) -> Result<Paged<customer::Model>, ServiceError> {
    let mut query = customer::Entity::find().filter(customer::Column::DeletedAt.is_null());
    if let Some(tenant_id) = filter.tenant_id {
        query = query.filter(customer::Column::TenantId.eq(tenant_id));
    }
    if let Some(q) = filter.q.as_deref().filter(|s| !s.trim().is_empty()) {
        query = query.filter(
            Condition::any()
                .add(customer::Column::Name.contains(q))
                .add(customer::Column::Email.contains(q)),
        );
    }
    let (page_idx, per_page) = opts.normalize();
    let paginator = query
        .order_by_desc(customer::Column::CreatedAt)
        .paginate(db, per_page);
    let total = paginator.num_items().await.map_err(ServiceError::db)?;
    let items = paginator.fetch_page(page_idx).await.map_err(ServiceError::db)?;
    Ok(Paged::new(items, total, opts))
}

pub async fn update_customer(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdateCustomer,
    actor: Uuid,
) -> Result<customer::Model, ServiceError> {
    let found = get_customer(db, id).await?;
    if let Some(expected) = input.version {
        if expected != found.version {
            return Err(ServiceError::version_conflict(expected, found.version));
        }
    }
    let current_version = found.version;
    let mut am: customer::ActiveModel = found.into();
    if let Some(name) = input.name {
        customer::validate_name(&name)?;
        am.name = Set(name);
    }
    if let Some(email) = input.email {
        customer::validate_email(&email)?;
        am.email = Set(Some(email));
    }
    if let Some(phone) = input.phone {
        am.phone = Set(Some(phone));
    }
    am.updated_at = Set(Utc::now().into());
    am.updated_by = Set(actor);
    am.version = Set(current_version + 1);
    if input.version.is_some() {
        let rows = customer::Entity::update_many()
            .set(am)
            .filter(customer::Column::Id.eq(id))
            .filter(customer::Column::Version.eq(current_version))
            .exec(db)
            .await
            .map_err(ServiceError::db)?
            .rows_affected;
        if rows == 0 {
            let row = get_customer(db, id).await?;
            return Err(ServiceError::version_conflict(current_version, row.version));
        }
        get_customer(db, id).await
    } else {
        am.update(db).await.map_err(ServiceError::db)
    }
}

/// Soft delete: flips `deleted_at` and stamps the actor.
pub async fn delete_customer(db: &DatabaseConnection, id: Uuid, actor: Uuid) -> Result<(), ServiceError> {
    let found = get_customer(db, id).await?;
    let mut am: customer::ActiveModel = found.into();
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
    async fn customer_crud_and_soft_delete() -> Result<(), anyhow::Error> {
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
            CreateTenant { name: format!("cust_tenant_{}", Uuid::new_v4()) },
        )
        .await?;

        let c = create_customer(
            &db,
            CreateCustomer {
                tenant_id: t.id,
                name: "Acme GmbH".into(),
                email: Some("billing@acme.test".into()),
                phone: None,
            },
            actor,
        )
        .await?;
        assert_eq!(c.version, 1);
        assert_eq!(c.created_by, actor);

        let updated = update_customer(
            &db,
            c.id,
            UpdateCustomer { phone: Some("+49 30 123".into()), ..Default::default() },
            actor,
        )
        .await?;
        assert_eq!(updated.version, 2);
        assert_eq!(updated.phone.as_deref(), Some("+49 30 123"));

        // stale version is rejected
        let stale = update_customer(
            &db,
            c.id,
            UpdateCustomer { name: Some("Other".into()), version: Some(1), ..Default::default() },
            actor,
        )
        .await;
        assert!(matches!(stale, Err(ServiceError::Conflict(_))));

        // soft delete hides the row from get and list
        delete_customer(&db, c.id, actor).await?;
        assert!(matches!(get_customer(&db, c.id).await, Err(ServiceError::NotFound(_))));
        let page = list_customers(
            &db,
            CustomerFilter { tenant_id: Some(t.id), q: None },
            Pagination::default(),
        )
        .await?;
        assert!(page.items.iter().all(|m| m.id != c.id));

        tenant_service::delete_tenant(&db, t.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_versioned_updates_lose_exactly_one() -> Result<(), anyhow::Error> {
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
            CreateTenant { name: format!("race_tenant_{}", Uuid::new_v4()) },
        )
        .await?;
        let c = create_customer(
            &db,
            CreateCustomer { tenant_id: t.id, name: "Race Co".into(), email: None, phone: None },
            actor,
        )
        .await?;

        // both writers carry the version they read; the guarded write lets
        // only one of them through
        let first = update_customer(
            &db,
            c.id,
            UpdateCustomer { name: Some("Writer A".into()), version: Some(1), ..Default::default() },
            actor,
        );
        let second = update_customer(
            &db,
            c.id,
            UpdateCustomer { name: Some("Writer B".into()), version: Some(1), ..Default::default() },
            actor,
        );
        let (a, b) = tokio::join!(first, second);
        let winners = [&a, &b].iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1);
        let loser = if a.is_ok() { b } else { a };
        assert!(matches!(loser, Err(ServiceError::Conflict(_))));

        let current = get_customer(&db, c.id).await?;
        assert_eq!(current.version, 2);

        tenant_service::delete_tenant(&db, t.id).await?;
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_missing_tenant() -> Result<(), anyhow::Error> {
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
        let res = create_customer(
            &db,
            CreateCustomer {
                tenant_id: Uuid::new_v4(),
                name: "Nobody".into(),
                email: None,
                phone: None,
            },
            Uuid::new_v4(),
        )
        .await;
        assert!(matches!(res, Err(ServiceError::Validation(_))));
        Ok(())
    }
}
