use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{BaseSalary, ContractId, EmployeeId, FullName, NationalId};

/// Employment contract of an employee.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contract {
    pub id: ContractId,
    pub employee_id: EmployeeId,
    pub contract_type: String,
    pub start_date: NaiveDate,
    /// Open-ended contracts have no end date.
    pub end_date: Option<NaiveDate>,
    pub salary: Option<BaseSalary>,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewContract {
    pub employee_id: EmployeeId,
    pub contract_type: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub salary: Option<BaseSalary>,
    pub created_at: NaiveDateTime,
}

/// An active contract ending soon, joined with its employee's identity.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ExpiringContract {
    pub contract: Contract,
    pub national_id: NationalId,
    pub full_name: FullName,
}
