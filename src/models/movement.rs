use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::movement::Movement as DomainMovement;
use crate::domain::types::{
    Balance, Catalog, MovementKind, ProductCode, ProductName, Quantity, ResponsibleParty,
    TypeConstraintError,
};

/// Diesel model representing the `movements` table of a catalog store.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::catalog::movements)]
pub struct Movement {
    pub id: i32,
    pub product_code: String,
    pub product_name: String,
    pub kind: String,
    pub quantity: i32,
    pub moved_at: NaiveDateTime,
    pub balance_before: i32,
    pub balance_after: i32,
    pub responsible: String,
    pub notes: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::catalog::movements)]
pub struct NewMovement<'a> {
    pub product_code: &'a str,
    pub product_name: &'a str,
    pub kind: &'a str,
    pub quantity: i32,
    pub moved_at: NaiveDateTime,
    pub balance_before: i32,
    pub balance_after: i32,
    pub responsible: &'a str,
    pub notes: Option<&'a str>,
}

impl Movement {
    pub fn into_domain(self, catalog: Catalog) -> Result<DomainMovement, TypeConstraintError> {
        Ok(DomainMovement {
            id: self.id.try_into()?,
            catalog,
            product_code: ProductCode::new(self.product_code)?,
            product_name: ProductName::new(self.product_name)?,
            kind: MovementKind::try_from(self.kind)?,
            quantity: Quantity::new(self.quantity)?,
            moved_at: self.moved_at,
            balance_before: Balance::new(self.balance_before)?,
            balance_after: Balance::new(self.balance_after)?,
            responsible: ResponsibleParty::new(self.responsible)?,
            notes: self.notes,
        })
    }
}
