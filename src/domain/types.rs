//! Strongly-typed value objects used by domain entities.
//!
//! Domain structs should carry these wrappers instead of raw primitives so that
//! identifiers, text values and numeric constraints are enforced at the
//! boundary.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Errors produced when attempting to construct constrained domain types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// An identifier was zero or negative.
    #[error("{0} must be greater than zero")]
    NonPositiveId(&'static str),
    /// A numeric value required to be positive was zero/negative or invalid.
    #[error("{0} must be greater than zero")]
    NonPositiveNumber(&'static str),
    /// A numeric value required to be non-negative was negative.
    #[error("{0} must be zero or greater")]
    NegativeNumber(&'static str),
    /// A string was empty or whitespace-only after trimming.
    #[error("{0} cannot be empty")]
    EmptyString(&'static str),
    /// A string exceeded the maximum accepted length.
    #[error("{0} is too long")]
    TooLong(&'static str),
    /// A daily token did not follow the `YYYY-MM-DD_xxxxxxxx` format.
    #[error("malformed attendance token")]
    MalformedToken,
    /// Catch-all for custom validation failures.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

fn trim_and_require_non_empty<S: Into<String>>(
    value: S,
    field: &'static str,
) -> Result<String, TypeConstraintError> {
    let trimmed = value.into().trim().to_string();
    if trimmed.is_empty() {
        Err(TypeConstraintError::EmptyString(field))
    } else {
        Ok(trimmed)
    }
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(
            Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId($field))
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<i32> for $name {
            fn eq(&self, other: &i32) -> bool {
                self.0 == *other
            }
        }
    };
}

/// Trimmed, non-empty text with an upper bound on its length.
macro_rules! non_empty_string_newtype {
    ($name:ident, $doc:expr, $field:expr, $max:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Constructs a trimmed, non-empty value.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let inner = trim_and_require_non_empty(value, $field)?;
                if inner.chars().count() > $max {
                    return Err(TypeConstraintError::TooLong($field));
                }
                Ok(Self(inner))
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                self.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }
    };
}

macro_rules! non_negative_i32_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(
            Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        #[serde(try_from = "i32", into = "i32")]
        pub struct $name(i32);

        impl $name {
            /// Constructs a value that must be zero or greater.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value >= 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NegativeNumber($field))
                }
            }

            /// Returns the raw `i32` value.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<i32> for $name {
            fn eq(&self, other: &i32) -> bool {
                self.0 == *other
            }
        }
    };
}

/// Macro for closed string enumerations persisted as text.
macro_rules! text_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $field:expr, { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(try_from = "String", into = "String")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// String representation used in persistence.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                match value.trim() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(TypeConstraintError::InvalidValue(format!(
                        "{}: {other}",
                        $field
                    ))),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::try_from(value.as_str())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }
    };
}

id_newtype!(EmployeeId, "Unique identifier for an employee row.", "employee_id");
id_newtype!(
    AttendanceId,
    "Unique identifier for an attendance record.",
    "attendance_id"
);
id_newtype!(ContractId, "Unique identifier for a contract.", "contract_id");
id_newtype!(ProductId, "Surrogate identifier for a product row.", "product_id");
id_newtype!(
    MovementId,
    "Monotonic identifier of a movement within its catalog.",
    "movement_id"
);
id_newtype!(AlertId, "Unique identifier for an alert.", "alert_id");

non_empty_string_newtype!(
    NationalId,
    "National identity document number (cédula).",
    "national id",
    32
);
non_empty_string_newtype!(FullName, "Employee full name.", "full name", 150);
non_empty_string_newtype!(ProductCode, "Product code, unique within a catalog.", "product code", 32);
non_empty_string_newtype!(ProductName, "Product display name.", "product name", 200);
non_empty_string_newtype!(UnitOfMeasure, "Unit of measure (kg, l, und).", "unit", 20);
non_empty_string_newtype!(
    ResponsibleParty,
    "Person accountable for a movement or an alert resolution.",
    "responsible",
    150
);

non_negative_i32_newtype!(Balance, "Current stock balance of a product.", "balance");
non_negative_i32_newtype!(
    MinStock,
    "Minimum stock threshold below which alerts are raised.",
    "minimum stock"
);

/// Strictly positive quantity moved in a single ledger entry.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "i32", into = "i32")]
pub struct Quantity(i32);

impl Quantity {
    pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::NonPositiveNumber("quantity"))
        }
    }

    pub const fn get(self) -> i32 {
        self.0
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i32> for Quantity {
    type Error = TypeConstraintError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for i32 {
    fn from(value: Quantity) -> Self {
        value.0
    }
}

/// Non-negative monetary value of one unit of a product.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(try_from = "f64", into = "f64")]
pub struct UnitValue(f64);

impl UnitValue {
    /// Constructs a finite numeric value that is zero or greater.
    pub fn new(value: f64) -> Result<Self, TypeConstraintError> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::NegativeNumber("unit value"))
        }
    }

    pub const fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for UnitValue {
    type Error = TypeConstraintError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<UnitValue> for f64 {
    fn from(value: UnitValue) -> Self {
        value.0
    }
}

/// Monthly base salary in whole units of local currency.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(try_from = "i64", into = "i64")]
pub struct BaseSalary(i64);

impl BaseSalary {
    pub fn new(value: i64) -> Result<Self, TypeConstraintError> {
        if value >= 0 {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::NegativeNumber("base salary"))
        }
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl TryFrom<i64> for BaseSalary {
    type Error = TypeConstraintError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BaseSalary> for i64 {
    fn from(value: BaseSalary) -> Self {
        value.0
    }
}

text_enum!(
    /// Direction of an attendance mark. The wire and storage form is Spanish.
    AttendanceKind, "attendance kind", {
        Entry => "entrada",
        Exit => "salida",
    }
);

text_enum!(
    /// Direction of an inventory movement.
    MovementKind, "movement kind", {
        Entry => "entrada",
        Exit => "salida",
    }
);

text_enum!(
    /// The three independent product inventories.
    Catalog, "catalog", {
        Chemicals => "quimicos",
        Warehouse => "almacen",
        Postharvest => "poscosecha",
    }
);

text_enum!(
    /// Handling risk of a chemical product.
    HazardLevel, "hazard level", {
        High => "alto",
        Medium => "medio",
        Low => "bajo",
    }
);

text_enum!(
    /// Category of a monitor alert.
    AlertKind, "alert kind", {
        LowStock => "stock_bajo",
        CriticalStock => "stock_critico",
        Expiring => "vencimiento",
        ContractExpiring => "contrato_vencimiento",
        SystemError => "error_sistema",
    }
);

text_enum!(
    /// Urgency of a monitor alert.
    Severity, "severity", {
        High => "alta",
        Medium => "media",
        Low => "baja",
    }
);

text_enum!(
    /// One of the five independent store files.
    StoreKind, "store", {
        Personnel => "personal",
        Chemicals => "quimicos",
        Warehouse => "almacen",
        Postharvest => "poscosecha",
        Alerts => "alertas",
    }
);

impl Catalog {
    /// Every catalog, in the order the monitor scans them.
    pub const ALL: [Catalog; 3] = [Catalog::Chemicals, Catalog::Warehouse, Catalog::Postharvest];
}

impl From<Catalog> for StoreKind {
    fn from(value: Catalog) -> Self {
        match value {
            Catalog::Chemicals => StoreKind::Chemicals,
            Catalog::Warehouse => StoreKind::Warehouse,
            Catalog::Postharvest => StoreKind::Postharvest,
        }
    }
}

impl StoreKind {
    pub const ALL: [StoreKind; 5] = [
        StoreKind::Personnel,
        StoreKind::Chemicals,
        StoreKind::Warehouse,
        StoreKind::Postharvest,
        StoreKind::Alerts,
    ];

    /// File name of the store under the database directory.
    pub fn file_name(self) -> String {
        format!("{}.db", self.as_str())
    }
}

impl AlertKind {
    pub const ALL: [AlertKind; 5] = [
        AlertKind::LowStock,
        AlertKind::CriticalStock,
        AlertKind::Expiring,
        AlertKind::ContractExpiring,
        AlertKind::SystemError,
    ];
}

impl Severity {
    /// Severity for a product expiring in `days` days.
    pub fn for_expiry(days: i64) -> Self {
        match days {
            ..=7 => Severity::High,
            8..=15 => Severity::Medium,
            _ => Severity::Low,
        }
    }

    /// Severity for a contract ending in `days` days.
    pub fn for_contract(days: i64) -> Self {
        match days {
            ..=15 => Severity::High,
            16..=30 => Severity::Medium,
            _ => Severity::Low,
        }
    }
}
