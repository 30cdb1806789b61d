use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{code_group, errors::ModelError};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "code")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub group_id: Uuid,
    pub code: String,
    pub label: String,
    /// System codes are seeded/reserved rows; they refuse deletion.
    pub is_system: bool,
    pub sort_order: i32,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Group,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Group => Entity::belongs_to(code_group::Entity)
                .from(Column::GroupId)
                .to(code_group::Column::Id)
                .into(),
        }
    }
}

impl Related<code_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Group.def()
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

pub fn validate_label(label: &str) -> Result<(), ModelError> {
    if label.trim().is_empty() {
        return Err(ModelError::Validation("label required".into()));
    }
    Ok(())
}
