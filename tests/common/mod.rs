//! Helpers for integration tests.
#![allow(dead_code)]

use campo_asistencia::db::Stores;
use campo_asistencia::domain::product::{CatalogDetails, ChemicalDetails, NewProduct};
use campo_asistencia::domain::types::{
    Balance, Catalog, MinStock, ProductCode, ProductName, UnitOfMeasure, UnitValue,
};
use campo_asistencia::repository::Repositories;
use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

/// Temporary directory holding all five store files.
pub struct TestDb {
    dir: TempDir,
    stores: Stores,
}

impl TestDb {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let stores = Stores::open(dir.path()).expect("Failed to open SQLite stores.");
        TestDb { dir, stores }
    }

    pub fn path(&self) -> &std::path::Path {
        self.dir.path()
    }

    pub fn stores(&self) -> Stores {
        self.stores.clone()
    }

    pub fn repos(&self) -> Repositories {
        Repositories::new(&self.stores)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn at(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, mi, s).expect("valid time")
}

/// Product with the given opening balance and minimum stock.
pub fn new_product(catalog: Catalog, code: &str, balance: i32, min_stock: i32) -> NewProduct {
    NewProduct {
        code: ProductCode::new(code).expect("valid code"),
        name: ProductName::new(format!("Producto {code}")).expect("valid name"),
        unit: UnitOfMeasure::new("und").expect("valid unit"),
        unit_value: UnitValue::new(2.5).expect("valid unit value"),
        initial_balance: Balance::new(balance).expect("valid balance"),
        min_stock: MinStock::new(min_stock).expect("valid minimum"),
        location: None,
        supplier: None,
        details: CatalogDetails::empty(catalog),
        created_at: at(2025, 1, 1, 8, 0, 0),
    }
}

/// Chemical product expiring on `expires`.
pub fn expiring_chemical(code: &str, balance: i32, expires: NaiveDate) -> NewProduct {
    NewProduct {
        details: CatalogDetails::Chemicals(ChemicalDetails {
            expiration_date: Some(expires),
            ..ChemicalDetails::default()
        }),
        ..new_product(Catalog::Chemicals, code, balance, 0)
    }
}
