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
use models::{employee, tenant};

#[derive(Clone, Debug, Deserialize)]
pub struct CreateEmployee {
    pub tenant_id: Uuid,
    pub employee_no: String,
    pub name: String,
    pub email: String,
    pub department: Option<String>,
    pub hired_on: chrono::NaiveDate,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UpdateEmployee {
    pub name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub hired_on: Option<chrono::NaiveDate>,
    pub version: Option<i32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct EmployeeFilter {
    pub tenant_id: Option<Uuid>,
    pub department: Option<String>,
    pub q: Option<String>,
}

pub async fn create_employee(
    db: &DatabaseConnection,
    input: CreateEmployee,
    actor: Uuid,
) -> Result<employee::Model, ServiceError> {
    employee::validate_employee_no(&input.employee_no)?;
    employee::validate_name(&input.name)?;
    employee::validate_email(&input.email)?;
    if tenant::Entity::find_by_id(input.tenant_id)
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .is_none()
    {
        return Err(ServiceError::Validation("tenant does not exist".into()));
    }
    // employee_no is unique per tenant among live rows
    let dup = employee::Entity::find()
        .filter(employee::Column::TenantId.eq(input.tenant_id))
        .filter(employee::Column::EmployeeNo.eq(&input.employee_no))
        .filter(employee::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(ServiceError::db)?;
    if dup.is_some() {
        return Err(ServiceError::duplicate("employee", "employee_no"));
    }

    let now = Utc::now();
    let am = employee::ActiveModel {
        id: Set(Uuid::new_v4()),
        tenant_id: Set(input.tenant_id),
        employee_no: Set(input.employee_no),
        name: Set(input.name),
        email: Set(input.email),
        department: Set(input.department),
        hired_on: Set(input.hired_on),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        created_by: Set(actor),
        updated_by: Set(actor),
        deleted_at: Set(None),
        version: Set(1),
    };
    am.insert(db).await.map_err(ServiceError::db)
}

pub async fn get_employee(db: &DatabaseConnection, id: Uuid) -> Result<employee::Model, ServiceError> {
    employee::Entity::find_by_id(id)
        .filter(employee::Column::DeletedAt.is_null())
        .one(db)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("employee"))
}

pub async fn list_employees(
    db: &DatabaseConnection,
    filter: EmployeeFilter,
    opts: Pagination,
) -> Result<Paged<employee::Model>, ServiceError> {
    let mut query = employee::Entity::find().filter(employee::Column::DeletedAt.is_null());
    if let Some(tenant_id) = filter.tenant_id {
        query = query.filter(employee::Column::TenantId.eq(tenant_id));
    }
    if let Some(dept) = filter.department.as_deref().filter(|s| !s.trim().is_empty()) {
        query = query.filter(employee::Column::Department.eq(dept));
    }
    if let Some(q) = filter.q.as_deref().filter(|s| !s.trim().is_empty()) {
        query = query.filter(
            Condition::any()
                .add(employee::Column::Name.contains(q))
                .add(employee::Column::Email.contains(q))
                .add(employee::Column::EmployeeNo.contains(q)),
        );
    }
    let (page_idx, per_page) = opts.normalize();
    let paginator = query
        .order_by_asc(employee::Column::EmployeeNo)
        .paginate(db, per_page);
    let total = paginator.num_items().await.map_err(ServiceError::db)?;
    let items = paginator.fetch_page(page_idx).await.map_err(ServiceError::db)?;
    Ok(Paged::new(items, total, opts))
}

pub async fn update_employee(
    db: &DatabaseConnection,
    id: Uuid,
    input: UpdateEmployee,
    actor: Uuid,
) -> Result<employee::Model, ServiceError> {
    let found = get_employee(db, id).await?;
    if let Some(expected) = input.version {
        if expected != found.version {
            return Err(ServiceError::version_conflict(expected, found.version));
        }
    }
    let current_version = found.version;
    let mut am: employee::ActiveModel = found.into();
    if let Some(name) = input.name {
        employee::validate_name(&name)?;
        am.name = Set(name);
    }
    if let Some(email) = input.email {
        employee::validate_email(&email)?;
        am.email = Set(email);
    }
    if let Some(department) = input.department {
        am.department = Set(Some(department));
    }
    if let Some(hired_on) = input.hired_on {
        am.hired_on = Set(hired_on);
    }
    am.updated_at = Set(Utc::now().into());
    am.updated_by = Set(actor);
    am.version = Set(current_version + 1);
    if input.version.is_some() {
        let rows = employee::Entity::update_many()
            .set(am)
            .filter(employee::Column::Id.eq(id))
            .filter(employee::Column::Version.eq(current_version))
            .exec(db)
            .await
            .map_err(ServiceError::db)?
            .rows_affected;
        if rows == 0 {
            let row = get_employee(db, id).await?;
            return Err(ServiceError::version_conflict(current_version, row.version));
        }
        get_employee(db, id).await
    } else {
        am.update(db).await.map_err(ServiceError::db)
    }
}

pub async fn delete_employee(db: &DatabaseConnection, id: Uuid, actor: Uuid) -> Result<(), ServiceError> {
    let found = get_employee(db, id).await?;
    let mut am: employee::ActiveModel = found.into();
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
    async fn employee_no_unique_per_tenant() -> Result<(), anyhow::Error> {
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
            CreateTenant { name: format!("hr_a_{}", Uuid::new_v4()) },
        )
        .await?;
        let t2 = tenant_service::create_tenant(
            &db,
            CreateTenant { name: format!("hr_b_{}", Uuid::new_v4()) },
        )
        .await?;
        let hired = NaiveDate::from_ymd_opt(2023, 4, 1).unwrap();

        let mk = |tenant_id| CreateEmployee {
            tenant_id,
            employee_no: "E-001".into(),
            name: "Kim Lee".into(),
            email: "kim@corp.test".into(),
            department: Some("Finance".into()),
            hired_on: hired,
        };

        create_employee(&db, mk(t1.id), actor).await?;
        let dup = create_employee(&db, mk(t1.id), actor).await;
        assert!(matches!(dup, Err(ServiceError::Validation(_))));

        // Same number in another tenant is fine.
        create_employee(&db, mk(t2.id), actor).await?;

        tenant_service::delete_tenant(&db, t1.id).await?;
        tenant_service::delete_tenant(&db, t2.id).await?;
        Ok(())
    }
}
