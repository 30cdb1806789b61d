use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "plan")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub status: PlanStatus,
    pub starts_on: Date,
    pub ends_on: Option<Date>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub version: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    #[sea_orm(string_value = "RETIRED")]
    Retired,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        panic!("no relations defined here")
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_code(code: &str) -> Result<(), ModelError> {
    if code.trim().is_empty() {
        return Err(ModelError::Validation("code required".into()));
    }
    if code.len() > 64 {
        return Err(ModelError::Validation("code too long (max 64)".into()));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("name required".into()));
    }
    Ok(())
}

/// A plan window must open before it closes.
pub fn validate_dates(starts_on: Date, ends_on: Option<Date>) -> Result<(), ModelError> {
    if let Some(ends) = ends_on {
        if starts_on >= ends {
            return Err(ModelError::Validation("starts_on must be before ends_on".into()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> Date {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn open_ended_plan_is_valid() {
        assert!(validate_dates(d(2024, 1, 1), None).is_ok());
    }

    #[test]
    fn ordered_dates_are_valid() {
        assert!(validate_dates(d(2024, 1, 1), Some(d(2024, 12, 31))).is_ok());
    }

    #[test]
    fn equal_or_reversed_dates_rejected() {
        assert!(validate_dates(d(2024, 1, 1), Some(d(2024, 1, 1))).is_err());
        assert!(validate_dates(d(2024, 6, 1), Some(d(2024, 1, 1))).is_err());
    }

    #[test]
    fn status_serde_uses_screaming_snake() {
        let v = serde_json::to_value(PlanStatus::Active).unwrap();
        assert_eq!(v, "ACTIVE");
        let s: PlanStatus = serde_json::from_value(serde_json::json!("RETIRED")).unwrap();
        assert_eq!(s, PlanStatus::Retired);
        assert!(serde_json::from_value::<PlanStatus>(serde_json::json!("bogus")).is_err());
    }
}
