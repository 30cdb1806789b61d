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
use models::plan::{self, PlanStatus};

#[derive(Clone, Debug, Deserialize)]
pub struct CreatePlan {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_status")]
    pub status: PlanStatus,
    pub starts_on: chrono::NaiveDate,
    pub ends_on: Option<chrono::NaiveDate>,
}

fn default_status() -> PlanStatus {
    PlanStatus::Draft
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdatePlan {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<PlanStatus>,
    pub starts_on: Option<chrono::NaiveDate>,
    pub ends_on: Option<chrono::NaiveDate>,
    pub version: Option<i32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct PlanFilter {
    pub status: Option<PlanStatus>,
    pub q: Option<String>,
}

pub async fn create_plan(
    db: &DatabaseConnection,
    input: CreatePlan,
    actor: Uuid,
) -> Result<plan::Model, ServiceError> {
    plan::validate_code(&input.code)?;
    plan::validate_name(&input.name)?;
    plan::validate_dates(input.starts_on, input.ends_on)?;
    let dup = plan::Entity::find()
        .filter(plan::Column::Code.eq(&input.code))
        .filter(plan::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(ServiceError::db)?;
    if dup.is_some() {
        return Err(ServiceError::duplicate("plan", "code"));
    }

    let now = Utc::now();
    let am = plan::ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(input.code),
        name: Set(input.name),
        description: Set(input.description),
        status: Set(input.status),
        starts_on: Set(input.starts_on),
        ends_on: Set(input.ends_on),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        created_by: Set(actor),
        updated_by: Set(actor),
        deleted_at: Set(None),
        version: Set(1),
    };
    am.insert(db).await.map_err(ServiceError::db)
}

pub async fn get_plan(db: &DatabaseConnection, id: Uuid) -> Result<plan::Model, ServiceError> {
    plan::Entity::find_by_id(id)
        .filter(plan::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("plan"))
}

pub async fn list_plans(
    db: &DatabaseConnection,
    filter: PlanFilter,
    opts: Pagination,
) -> Result<Paged<plan::Model>, ServiceError> {
    let mut query = plan::Entity::find().filter(plan::Column::DeletedAt.is_null());
    if let Some(status) = filter.status {
        query = query.filter(plan::Column::Status.eq(status));
    }
    if let Some(q) = filter.q.as_deref().filter(|s| !s.trim().is_empty()) {
        query = query.filter(
            Condition::any()
                .add(plan::Column::Code.contains(q))
                .add(plan::Column::Name.contains(q)),
        );
    }
    let (page_idx, per_page) = opts.normalize();
    let paginator = query.order_by_asc(plan::Column::Code).paginate(db, per_page);
    let total = paginator.num_items().await.map_err(ServiceError::db)?;
    let items = paginator.fetch_page(page_idx).await.map_err(ServiceError::db)?;
    Ok(Paged::new(items, total, opts))
}

/// Partial update. The date-ordering invariant is re-checked against the
/// merged value of both date fields, not just the ones in the payload.
pub async fn update_plan(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdatePlan,
    actor: Uuid,
) -> Result<plan::Model, ServiceError> {
    let found = get_plan(db, id).await?;
    if let Some(expected) = input.version {
        if expected != found.version {
            return Err(ServiceError::version_conflict(expected, found.version));
        }
    }
    let starts_on = input.starts_on.unwrap_or(found.starts_on);
    let ends_on = input.ends_on.or(found.ends_on);
    plan::validate_dates(starts_on, ends_on)?;

    let current_version = found.version;
    let mut am: plan::ActiveModel = found.into();
    if let Some(name) = input.name {
        plan::validate_name(&name)?;
        am.name = Set(name);
    }
    if let Some(description) = input.description {
        am.description = Set(Some(description));
    }
    if let Some(status) = input.status {
        am.status = Set(status);
    }
    am.starts_on = Set(starts_on);
    am.ends_on = Set(ends_on);
    am.updated_at = Set(Utc::now().into());
    am.updated_by = Set(actor);
    am.version = Set(current_version + 1);
    if input.version.is_some() {
        let rows = plan::Entity::update_many()
            .set(am)
            .filter(plan::Column::Id.eq(id))
            .filter(plan::Column::Version.eq(current_version))
            .exec(db)
            .await
            .map_err(ServiceError::db)?
            .rows_affected;
        if rows == 0 {
            let row = get_plan(db, id).await?;
            return Err(ServiceError::version_conflict(current_version, row.version));
        }
        get_plan(db, id).await
    } else {
        am.update(db).await.map_err(ServiceError::db)
    }
}

pub async fn delete_plan(db: &DatabaseConnection, id: Uuid, actor: Uuid) -> Result<(), ServiceError> {
    let found = get_plan(db, id).await?;
    let mut am: plan::ActiveModel = found.into();
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
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[tokio::test]
    async fn plan_duplicate_code_and_date_order() -> Result<(), anyhow::Error> {
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
        let code = format!("plan_{}", Uuid::new_v4());

        let p = create_plan(
            &db,
            CreatePlan {
                code: code.clone(),
                name: "Starter".into(),
                description: None,
                status: PlanStatus::Active,
                starts_on: d(2024, 1, 1),
                ends_on: Some(d(2024, 12, 31)),
            },
            actor,
        )
        .await?;

        let dup = create_plan(
            &db,
            CreatePlan {
                code: code.clone(),
                name: "Starter Copy".into(),
                description: None,
                status: PlanStatus::Draft,
                starts_on: d(2024, 1, 1),
                ends_on: None,
            },
            actor,
        )
        .await;
        assert!(matches!(dup, Err(ServiceError::Validation(_))));

        // moving starts_on past the stored ends_on must fail
        let bad = update_plan(
            &db,
            p.id,
            UpdatePlan { starts_on: Some(d(2025, 6, 1)), ..Default::default() },
            actor,
        )
        .await;
        assert!(matches!(bad, Err(ServiceError::Model(_)) | Err(ServiceError::Validation(_))));

        delete_plan(&db, p.id, actor).await?;
        Ok(())
    }
}
