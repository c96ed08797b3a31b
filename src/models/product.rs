use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::product::{
    CatalogDetails, ChemicalDetails, NewProduct as DomainNewProduct, PostharvestDetails,
    Product as DomainProduct, ProductUpdate as DomainProductUpdate,
};
use crate::domain::types::{
    Balance, Catalog, HazardLevel, MinStock, ProductCode, ProductName, TypeConstraintError,
    UnitOfMeasure, UnitValue,
};

/// Diesel model representing the `products` table of a catalog store.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::catalog::products)]
pub struct Product {
    pub id: i32,
    pub code: String,
    pub name: String,
    pub unit: String,
    pub unit_value: f64,
    pub balance: i32,
    pub min_stock: i32,
    pub location: Option<String>,
    pub supplier: Option<String>,
    pub active: bool,
    pub hazard_level: Option<String>,
    pub active_ingredient: Option<String>,
    pub concentration: Option<String>,
    pub registration_number: Option<String>,
    pub expiration_date: Option<NaiveDate>,
    pub batch: Option<String>,
    pub category: Option<String>,
    pub product_type: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Catalog-specific columns, flattened for storage.
#[derive(Debug, Default, Clone)]
struct DetailColumns {
    hazard_level: Option<String>,
    active_ingredient: Option<String>,
    concentration: Option<String>,
    registration_number: Option<String>,
    expiration_date: Option<NaiveDate>,
    batch: Option<String>,
    category: Option<String>,
    product_type: Option<String>,
}

impl From<CatalogDetails> for DetailColumns {
    fn from(details: CatalogDetails) -> Self {
        match details {
            CatalogDetails::Chemicals(c) => Self {
                hazard_level: c.hazard_level.map(String::from),
                active_ingredient: c.active_ingredient,
                concentration: c.concentration,
                registration_number: c.registration_number,
                expiration_date: c.expiration_date,
                batch: c.batch,
                ..Self::default()
            },
            CatalogDetails::Warehouse => Self::default(),
            CatalogDetails::Postharvest(p) => Self {
                category: p.category,
                product_type: p.product_type,
                ..Self::default()
            },
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::catalog::products)]
pub struct NewProduct {
    pub code: String,
    pub name: String,
    pub unit: String,
    pub unit_value: f64,
    pub balance: i32,
    pub min_stock: i32,
    pub location: Option<String>,
    pub supplier: Option<String>,
    pub active: bool,
    pub hazard_level: Option<String>,
    pub active_ingredient: Option<String>,
    pub concentration: Option<String>,
    pub registration_number: Option<String>,
    pub expiration_date: Option<NaiveDate>,
    pub batch: Option<String>,
    pub category: Option<String>,
    pub product_type: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Editable columns; deliberately excludes `balance`.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::catalog::products)]
#[diesel(treat_none_as_null = true)]
pub struct ProductChangeset {
    pub name: String,
    pub unit: String,
    pub unit_value: f64,
    pub min_stock: i32,
    pub location: Option<String>,
    pub supplier: Option<String>,
    pub hazard_level: Option<String>,
    pub active_ingredient: Option<String>,
    pub concentration: Option<String>,
    pub registration_number: Option<String>,
    pub expiration_date: Option<NaiveDate>,
    pub batch: Option<String>,
    pub category: Option<String>,
    pub product_type: Option<String>,
    pub updated_at: NaiveDateTime,
}

impl Product {
    /// Converts the row into a domain product of the given catalog.
    pub fn into_domain(self, catalog: Catalog) -> Result<DomainProduct, TypeConstraintError> {
        let details = match catalog {
            Catalog::Chemicals => CatalogDetails::Chemicals(ChemicalDetails {
                hazard_level: self
                    .hazard_level
                    .map(HazardLevel::try_from)
                    .transpose()?,
                active_ingredient: self.active_ingredient,
                concentration: self.concentration,
                registration_number: self.registration_number,
                expiration_date: self.expiration_date,
                batch: self.batch,
            }),
            Catalog::Warehouse => CatalogDetails::Warehouse,
            Catalog::Postharvest => CatalogDetails::Postharvest(PostharvestDetails {
                category: self.category,
                product_type: self.product_type,
            }),
        };

        Ok(DomainProduct {
            id: self.id.try_into()?,
            catalog,
            code: ProductCode::new(self.code)?,
            name: ProductName::new(self.name)?,
            unit: UnitOfMeasure::new(self.unit)?,
            unit_value: UnitValue::new(self.unit_value)?,
            balance: Balance::new(self.balance)?,
            min_stock: MinStock::new(self.min_stock)?,
            location: self.location,
            supplier: self.supplier,
            active: self.active,
            details,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl From<DomainNewProduct> for NewProduct {
    fn from(product: DomainNewProduct) -> Self {
        let columns = DetailColumns::from(product.details);
        Self {
            code: product.code.into_inner(),
            name: product.name.into_inner(),
            unit: product.unit.into_inner(),
            unit_value: product.unit_value.get(),
            balance: product.initial_balance.get(),
            min_stock: product.min_stock.get(),
            location: product.location,
            supplier: product.supplier,
            active: true,
            hazard_level: columns.hazard_level,
            active_ingredient: columns.active_ingredient,
            concentration: columns.concentration,
            registration_number: columns.registration_number,
            expiration_date: columns.expiration_date,
            batch: columns.batch,
            category: columns.category,
            product_type: columns.product_type,
            created_at: product.created_at,
            updated_at: product.created_at,
        }
    }
}

impl ProductChangeset {
    pub fn new(update: DomainProductUpdate, updated_at: NaiveDateTime) -> Self {
        let columns = DetailColumns::from(update.details);
        Self {
            name: update.name.into_inner(),
            unit: update.unit.into_inner(),
            unit_value: update.unit_value.get(),
            min_stock: update.min_stock.get(),
            location: update.location,
            supplier: update.supplier,
            hazard_level: columns.hazard_level,
            active_ingredient: columns.active_ingredient,
            concentration: columns.concentration,
            registration_number: columns.registration_number,
            expiration_date: columns.expiration_date,
            batch: columns.batch,
            category: columns.category,
            product_type: columns.product_type,
            updated_at,
        }
    }
}
