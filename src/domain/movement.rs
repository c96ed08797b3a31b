//! Append-only inventory movements.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::types::{
    Balance, Catalog, MovementId, MovementKind, ProductCode, ProductName, Quantity,
    ResponsibleParty,
};

/// A recorded change to a product's balance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movement {
    pub id: MovementId,
    pub catalog: Catalog,
    pub product_code: ProductCode,
    /// Copied from the product at append time for audit.
    pub product_name: ProductName,
    pub kind: MovementKind,
    pub quantity: Quantity,
    pub moved_at: NaiveDateTime,
    pub balance_before: Balance,
    pub balance_after: Balance,
    pub responsible: ResponsibleParty,
    pub notes: Option<String>,
}

/// A movement request before the ledger resolves balances.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewMovement {
    pub product_code: ProductCode,
    pub kind: MovementKind,
    pub quantity: Quantity,
    pub responsible: ResponsibleParty,
    pub notes: Option<String>,
    pub moved_at: NaiveDateTime,
}

/// Reasons the ledger refuses an append; the ledger is left unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerRejection {
    #[error("unknown product: {0}")]
    UnknownProduct(String),
    #[error("insufficient stock: available {available}, requested {requested}")]
    InsufficientStock { available: i32, requested: i32 },
    /// The entry would push the balance past the storable maximum.
    #[error("balance overflow: {balance} + {quantity} exceeds the maximum")]
    BalanceOverflow { balance: i32, quantity: i32 },
}

/// Balance after applying `quantity` in direction `kind` to `before`.
pub fn next_balance(
    kind: MovementKind,
    before: Balance,
    quantity: Quantity,
) -> Result<Balance, LedgerRejection> {
    match kind {
        MovementKind::Entry => before
            .get()
            .checked_add(quantity.get())
            .and_then(|value| Balance::new(value).ok())
            .ok_or(LedgerRejection::BalanceOverflow {
                balance: before.get(),
                quantity: quantity.get(),
            }),
        MovementKind::Exit if before.get() >= quantity.get() => {
            Balance::new(before.get() - quantity.get()).map_err(|_| {
                LedgerRejection::InsufficientStock {
                    available: before.get(),
                    requested: quantity.get(),
                }
            })
        }
        MovementKind::Exit => Err(LedgerRejection::InsufficientStock {
            available: before.get(),
            requested: quantity.get(),
        }),
    }
}

/// Filters for movement history; results are always newest-first.
#[derive(Debug, Clone, Default)]
pub struct MovementFilter {
    pub product_code: Option<ProductCode>,
    pub kind: Option<MovementKind>,
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
    pub limit: Option<usize>,
}

impl MovementFilter {
    pub fn product(mut self, code: ProductCode) -> Self {
        self.product_code = Some(code);
        self
    }
    pub fn kind(mut self, kind: MovementKind) -> Self {
        self.kind = Some(kind);
        self
    }
    pub fn between(mut self, from: NaiveDateTime, to: NaiveDateTime) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
