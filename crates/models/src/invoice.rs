use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{customer, errors::ModelError, tenant};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoice")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub customer_id: Uuid,
    pub number: String,
    pub status: InvoiceStatus,
    pub currency_code: String,
    pub base_amount: Decimal,
    pub usage_amount: Decimal,
    pub discount_amount: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
    pub issued_on: Date,
    pub due_on: Date,
    pub notes: Option<String>,
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
pub enum InvoiceStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "SENT")]
    Sent,
    #[sea_orm(string_value = "PAID")]
    Paid,
    #[sea_orm(string_value = "OVERDUE")]
    Overdue,
    #[sea_orm(string_value = "CANCELED")]
    Canceled,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Tenant,
    Customer,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Tenant => Entity::belongs_to(tenant::Entity)
                .from(Column::TenantId)
                .to(tenant::Column::Id)
                .into(),
            Relation::Customer => Entity::belongs_to(customer::Entity)
                .from(Column::CustomerId)
                .to(customer::Column::Id)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_number(number: &str) -> Result<(), ModelError> {
    if number.trim().is_empty() {
        return Err(ModelError::Validation("number required".into()));
    }
    if number.len() > 32 {
        return Err(ModelError::Validation("number too long (max 32)".into()));
    }
    Ok(())
}

/// Cross-field amount invariant:
/// `total = base + usage - discount + tax`, all inputs non-negative.
pub fn validate_amounts(
    base: Decimal,
    usage: Decimal,
    discount: Decimal,
    tax: Decimal,
    total: Decimal,
) -> Result<(), ModelError> {
    for (name, v) in [("base_amount", base), ("usage_amount", usage), ("discount_amount", discount), ("tax_amount", tax)] {
        if v < Decimal::ZERO {
            return Err(ModelError::Validation(format!("{} must be >= 0", name)));
        }
    }
    if base + usage - discount + tax != total {
        return Err(ModelError::Validation(
            "amount_mismatch: total must equal base + usage - discount + tax".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn dec(v: i64) -> Decimal {
        Decimal::new(v * 100, 2)
    }

    #[test]
    fn balanced_amounts_pass() {
        // 100 + 20 - 10 + 5 = 115
        assert!(validate_amounts(dec(100), dec(20), dec(10), dec(5), dec(115)).is_ok());
    }

    #[test]
    fn mismatched_total_rejected() {
        let err = validate_amounts(dec(100), dec(20), dec(10), dec(5), dec(100)).unwrap_err();
        assert!(err.to_string().contains("amount_mismatch"));
    }

    #[test]
    fn negative_component_rejected() {
        assert!(validate_amounts(dec(-1), dec(0), dec(0), dec(0), dec(-1)).is_err());
        assert!(validate_amounts(dec(10), dec(0), dec(-5), dec(0), dec(15)).is_err());
    }

    #[test]
    fn zero_invoice_is_valid() {
        assert!(validate_amounts(dec(0), dec(0), dec(0), dec(0), dec(0)).is_ok());
    }

    #[test]
    fn cent_precision_respected() {
        let base = Decimal::new(10050, 2); // 100.50
        let usage = Decimal::new(25, 2); // 0.25
        let total = Decimal::new(10075, 2); // 100.75
        assert!(validate_amounts(base, usage, Decimal::ZERO, Decimal::ZERO, total).is_ok());
        let off = Decimal::new(10076, 2);
        assert!(validate_amounts(base, usage, Decimal::ZERO, Decimal::ZERO, off).is_err());
    }

    #[test]
    fn status_serde_round_trip() {
        let v = serde_json::to_value(InvoiceStatus::Overdue).unwrap();
        assert_eq!(v, "OVERDUE");
        let s: InvoiceStatus = serde_json::from_value(serde_json::json!("PAID")).unwrap();
        assert_eq!(s, InvoiceStatus::Paid);
        assert!(serde_json::from_value::<InvoiceStatus>(serde_json::json!("paid")).is_err());
    }
}
