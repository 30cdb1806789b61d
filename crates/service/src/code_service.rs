//! Shared code tables: groups of enumerated values (payment terms,
//! departments, units of measure and so on). System codes are seeded
//! rows that applications rely on and therefore refuse deletion.

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
use models::{code, code_group};

// ---------------------------------------------------------------------------
// Code groups
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Deserialize)]
pub struct CreateCodeGroup {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateCodeGroup {
    pub name: Option<String>,
    pub description: Option<String>,
    pub version: Option<i32>,
}

pub async fn create_code_group(
    db: &DatabaseConnection,
    input: CreateCodeGroup,
    actor: Uuid,
) -> Result<code_group::Model, ServiceError> {
    code_group::validate_name(&input.name)?;
    let dup = code_group::Entity::find()
        .filter(code_group::Column::Name.eq(&input.name))
        .filter(code_group::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(ServiceError::db)?;
    if dup.is_some() {
        return Err(ServiceError::duplicate("code_group", "name"));
    }

    let now = Utc::now();
    let am = code_group::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name),
        description: Set(input.description),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        created_by: Set(actor),
        updated_by: Set(actor),
        deleted_at: Set(None),
        version: Set(1),
    };
    am.insert(db).await.map_err(ServiceError::db)
}

pub async fn get_code_group(db: &DatabaseConnection, id: Uuid) -> Result<code_group::Model, ServiceError> {
    code_group::Entity::find_by_id(id)
        .filter(code_group::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("code_group"))
}

pub async fn list_code_groups(
    db: &DatabaseConnection,
    q: Option<String>,
    opts: Pagination,
) -> Result<Paged<code_group::Model>, ServiceError> {
    let mut query = code_group::Entity::find().filter(code_group::Column::DeletedAt.is_null());
    if let Some(q) = q.as_deref().filter(|s| !s.trim().is_empty()) {
        query = query.filter(code_group::Column::Name.contains(q));
    }
    let (page_idx, per_page) = opts.normalize();
    let paginator = query.order_by_asc(code_group::Column::Name).paginate(db, per_page);
    let total = paginator.num_items().await.map_err(ServiceError::db)?;
    let items = paginator.fetch_page(page_idx).await.map_err(ServiceError::db)?;
    Ok(Paged::new(items, total, opts))
}

pub async fn update_code_group(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdateCodeGroup,
    actor: Uuid,
) -> Result<code_group::Model, ServiceError> {
    let found = get_code_group(db, id).await?;
    if let Some(expected) = input.version {
        if expected != found.version {
            return Err(ServiceError::version_conflict(expected, found.version));
        }
    }
    let current_version = found.version;
    let mut am: code_group::ActiveModel = found.into();
    if let Some(name) = input.name {
        code_group::validate_name(&name)?;
        am.name = Set(name);
    }
    if let Some(description) = input.description {
        am.description = Set(Some(description));
    }
    am.updated_at = Set(Utc::now().into());
    am.updated_by = Set(actor);
    am.version = Set(current_version + 1);
    if input.version.is_some() {
        let rows = code_group::Entity::update_many()
            .set(am)
            .filter(code_group::Column::Id.eq(id))
            .filter(code_group::Column::Version.eq(current_version))
            .exec(db)
            .await
            .map_err(ServiceError::db)?
            .rows_affected;
        if rows == 0 {
            let row = get_code_group(db, id).await?;
            return Err(ServiceError::version_conflict(current_version, row.version));
        }
        get_code_group(db, id).await
    } else {
        am.update(db).await.map_err(ServiceError::db)
    }
}

pub async fn delete_code_group(db: &DatabaseConnection, id: Uuid, actor: Uuid) -> Result<(), ServiceError> {
    let found = get_code_group(db, id).await?;
    // A group with live codes cannot be removed.
    let live_children = code::Entity::find()
        .filter(code::Column::GroupId.eq(id))
        .filter(code::Column::DeletedAt.is_null())
        .count(db)
        .await
        .map_err(ServiceError::db)?;
    if live_children > 0 {
        return Err(ServiceError::Validation("code_group still has codes".into()));
    }
    let mut am: code_group::ActiveModel = found.into();
    let now = Utc::now();
    am.deleted_at = Set(Some(now.into()));
    am.updated_at = Set(now.into());
    am.updated_by = Set(actor);
    am.update(db).await.map_err(ServiceError::db)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Codes
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Deserialize)]
pub struct CreateCode {
    pub group_id: Uuid,
    pub code: String,
    pub label: String,
    #[serde(default)]
    pub is_system: bool,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateCode {
    pub label: Option<String>,
    pub sort_order: Option<i32>,
    pub version: Option<i32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct CodeFilter {
    pub group_id: Option<Uuid>,
    pub q: Option<String>,
}

pub async fn create_code(
    db: &DatabaseConnection,
    input: CreateCode,
    actor: Uuid,
) -> Result<code::Model, ServiceError> {
    code::validate_code(&input.code)?;
    code::validate_label(&input.label)?;
    // The group must exist and be live.
    get_code_group(db, input.group_id).await.map_err(|e| match e {
        ServiceError::NotFound(_) => ServiceError::Validation("code_group does not exist".into()),
        other => other,
    })?;
    let dup = code::Entity::find()
        .filter(code::Column::GroupId.eq(input.group_id))
        .filter(code::Column::Code.eq(&input.code))
        .filter(code::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(ServiceError::db)?;
    if dup.is_some() {
        return Err(ServiceError::duplicate("code", "code"));
    }

    let now = Utc::now();
    let am = code::ActiveModel {
        id: Set(Uuid::new_v4()),
        group_id: Set(input.group_id),
        code: Set(input.code),
        label: Set(input.label),
        is_system: Set(input.is_system),
        sort_order: Set(input.sort_order),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        created_by: Set(actor),
        updated_by: Set(actor),
        deleted_at: Set(None),
        version: Set(1),
    };
    am.insert(db).await.map_err(ServiceError::db)
}

pub async fn get_code(db: &DatabaseConnection, id: Uuid) -> Result<code::Model, ServiceError> {
    code::Entity::find_by_id(id)
        .filter(code::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("code"))
}

pub async fn list_codes(
    db: &DatabaseConnection,
    filter: CodeFilter,
    opts: Pagination,
) -> Result<Paged<code::Model>, ServiceError> {
    let mut query = code::Entity::find().filter(code::Column::DeletedAt.is_null());
    if let Some(group_id) = filter.group_id {
        query = query.filter(code::Column::GroupId.eq(group_id));
    }
    if let Some(q) = filter.q.as_deref().filter(|s| !s.trim().is_empty()) {
        query = query.filter(
            Condition::any()
                .add(code::Column::Code.contains(q))
                .add(code::Column::Label.contains(q)),
        );
    }
    let (page_idx, per_page) = opts.normalize();
    let paginator = query
        .order_by_asc(code::Column::SortOrder)
        .paginate(db, per_page);
    let total = paginator.num_items().await.map_err(ServiceError::db)?;
    let items = paginator.fetch_page(page_idx).await.map_err(ServiceError::db)?;
    Ok(Paged::new(items, total, opts))
}

pub async fn update_code(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdateCode,
    actor: Uuid,
) -> Result<code::Model, ServiceError> {
    let found = get_code(db, id).await?;
    if let Some(expected) = input.version {
        if expected != found.version {
            return Err(ServiceError::version_conflict(expected, found.version));
        }
    }
    let current_version = found.version;
    let mut am: code::ActiveModel = found.into();
    if let Some(label) = input.label {
        code::validate_label(&label)?;
        am.label = Set(label);
    }
    if let Some(sort_order) = input.sort_order {
        am.sort_order = Set(sort_order);
    }
    am.updated_at = Set(Utc::now().into());
    am.updated_by = Set(actor);
    am.version = Set(current_version + 1);
    if input.version.is_some() {
        let rows = code::Entity::update_many()
            .set(am)
            .filter(code::Column::Id.eq(id))
            .filter(code::Column::Version.eq(current_version))
            .exec(db)
            .await
            .map_err(ServiceError::db)?
            .rows_affected;
        if rows == 0 {
            let row = get_code(db, id).await?;
            return Err(ServiceError::version_conflict(current_version, row.version));
        }
        get_code(db, id).await
    } else {
        am.update(db).await.map_err(ServiceError::db)
    }
}

pub async fn delete_code(db: &DatabaseConnection, id: Uuid, actor: Uuid) -> Result<(), ServiceError> {
    let found = get_code(db, id).await?;
    if found.is_system {
        return Err(ServiceError::Validation("system codes cannot be deleted".into()));
    }
    let mut am: code::ActiveModel = found.into();
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
    use crate::test_support::get_db;

    #[tokio::test]
    async fn system_code_refuses_delete() -> Result<(), anyhow::Error> {
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

        let group = create_code_group(
            &db,
            CreateCodeGroup {
                name: format!("payment_terms_{}", Uuid::new_v4()),
                description: None,
            },
            actor,
        )
        .await?;

        let sys = create_code(
            &db,
            CreateCode {
                group_id: group.id,
                code: "NET30".into(),
                label: "Net 30".into(),
                is_system: true,
                sort_order: 1,
            },
            actor,
        )
        .await?;

        let res = delete_code(&db, sys.id, actor).await;
        assert!(matches!(res, Err(ServiceError::Validation(_))));
        // The row is untouched.
        let still = get_code(&db, sys.id).await?;
        assert_eq!(still.id, sys.id);

        // Non-system codes delete normally.
        let plain = create_code(
            &db,
            CreateCode {
                group_id: group.id,
                code: "NET60".into(),
                label: "Net 60".into(),
                is_system: false,
                sort_order: 2,
            },
            actor,
        )
        .await?;
        delete_code(&db, plain.id, actor).await?;
        assert!(matches!(get_code(&db, plain.id).await, Err(ServiceError::NotFound(_))));

        // Group deletion is blocked while the system code is live.
        let blocked = delete_code_group(&db, group.id, actor).await;
        assert!(matches!(blocked, Err(ServiceError::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_code_within_group() -> Result<(), anyhow::Error> {
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
        let group = create_code_group(
            &db,
            CreateCodeGroup { name: format!("uom_{}", Uuid::new_v4()), description: None },
            actor,
        )
        .await?;
        create_code(
            &db,
            CreateCode { group_id: group.id, code: "EA".into(), label: "Each".into(), is_system: false, sort_order: 1 },
            actor,
        )
        .await?;
        let dup = create_code(
            &db,
            CreateCode { group_id: group.id, code: "EA".into(), label: "Each again".into(), is_system: false, sort_order: 2 },
            actor,
        )
        .await;
        assert!(matches!(dup, Err(ServiceError::Validation(_))));
        Ok(())
    }
}
