use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    Balance, Catalog, HazardLevel, MinStock, ProductCode, ProductId, ProductName, UnitOfMeasure,
    UnitValue,
};

/// A product of one catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub catalog: Catalog,
    pub code: ProductCode,
    pub name: ProductName,
    pub unit: UnitOfMeasure,
    pub unit_value: UnitValue,
    /// Running balance maintained by the movement ledger.
    pub balance: Balance,
    pub min_stock: MinStock,
    pub location: Option<String>,
    pub supplier: Option<String>,
    pub active: bool,
    pub details: CatalogDetails,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Catalog-specific product attributes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "catalogo", rename_all = "snake_case")]
pub enum CatalogDetails {
    Chemicals(ChemicalDetails),
    Warehouse,
    Postharvest(PostharvestDetails),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChemicalDetails {
    pub hazard_level: Option<HazardLevel>,
    pub active_ingredient: Option<String>,
    pub concentration: Option<String>,
    pub registration_number: Option<String>,
    pub expiration_date: Option<NaiveDate>,
    pub batch: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PostharvestDetails {
    pub category: Option<String>,
    pub product_type: Option<String>,
}

impl CatalogDetails {
    /// Empty details matching the given catalog.
    pub fn empty(catalog: Catalog) -> Self {
        match catalog {
            Catalog::Chemicals => Self::Chemicals(ChemicalDetails::default()),
            Catalog::Warehouse => Self::Warehouse,
            Catalog::Postharvest => Self::Postharvest(PostharvestDetails::default()),
        }
    }

    pub fn catalog(&self) -> Catalog {
        match self {
            Self::Chemicals(_) => Catalog::Chemicals,
            Self::Warehouse => Catalog::Warehouse,
            Self::Postharvest(_) => Catalog::Postharvest,
        }
    }

    pub fn expiration_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Chemicals(details) => details.expiration_date,
            _ => None,
        }
    }
}

impl Product {
    pub fn stock_value(&self) -> f64 {
        f64::from(self.balance.get()) * self.unit_value.get()
    }

    pub fn is_below_minimum(&self) -> bool {
        self.min_stock.get() > 0 && self.balance.get() <= self.min_stock.get()
    }
}

/// Data required to register a product in a catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProduct {
    pub code: ProductCode,
    pub name: ProductName,
    pub unit: UnitOfMeasure,
    pub unit_value: UnitValue,
    pub initial_balance: Balance,
    pub min_stock: MinStock,
    pub location: Option<String>,
    pub supplier: Option<String>,
    pub details: CatalogDetails,
    pub created_at: NaiveDateTime,
}

/// Editable product attributes. The balance only changes through the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductUpdate {
    pub name: ProductName,
    pub unit: UnitOfMeasure,
    pub unit_value: UnitValue,
    pub min_stock: MinStock,
    pub location: Option<String>,
    pub supplier: Option<String>,
    pub details: CatalogDetails,
}

/// Aggregate figures for one catalog.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StockSummary {
    pub catalog: Catalog,
    pub products: usize,
    pub total_units: i64,
    pub total_value: f64,
    pub below_minimum: usize,
}

impl StockSummary {
    pub fn from_products(catalog: Catalog, products: &[Product]) -> Self {
        Self {
            catalog,
            products: products.len(),
            total_units: products.iter().map(|p| i64::from(p.balance.get())).sum(),
            total_value: products.iter().map(Product::stock_value).sum(),
            below_minimum: products.iter().filter(|p| p.is_below_minimum()).count(),
        }
    }
}
