use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "currency")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub symbol: String,
    pub minor_units: i16,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub created_by: Uuid,
    pub updated_by: Uuid,
    pub deleted_at: Option<DateTimeWithTimeZone>,
    pub version: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        panic!("no relations defined here")
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// ISO-4217 style code: exactly three ASCII letters, stored uppercase.
pub fn validate_code(code: &str) -> Result<String, ModelError> {
    let up = code.trim().to_ascii_uppercase();
    if up.len() != 3 || !up.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(ModelError::Validation("currency code must be 3 letters".into()));
    }
    Ok(up)
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    if name.trim().is_empty() {
        return Err(ModelError::Validation("name required".into()));
    }
    Ok(())
}

pub fn validate_minor_units(n: i16) -> Result<(), ModelError> {
    if !(0..=6).contains(&n) {
        return Err(ModelError::Validation("minor_units must be in 0..=6".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_uppercased() {
        assert_eq!(validate_code("usd").unwrap(), "USD");
        assert_eq!(validate_code(" EUR ").unwrap(), "EUR");
    }

    #[test]
    fn code_rejects_wrong_shapes() {
        assert!(validate_code("US").is_err());
        assert!(validate_code("USDT").is_err());
        assert!(validate_code("U5D").is_err());
        assert!(validate_code("").is_err());
    }

    #[test]
    fn minor_units_bounds() {
        assert!(validate_minor_units(0).is_ok());
        assert!(validate_minor_units(2).is_ok());
        assert!(validate_minor_units(7).is_err());
        assert!(validate_minor_units(-1).is_err());
    }
}
