use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::types::{BaseSalary, EmployeeId, FullName, NationalId};

/// A person on the payroll, keyed by national ID.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Employee {
    pub id: EmployeeId,
    pub national_id: NationalId,
    pub full_name: FullName,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub work_area: Option<String>,
    pub role: Option<String>,
    pub base_salary: Option<BaseSalary>,
    /// Soft-delete flag; employees are never physically removed.
    pub active: bool,
    pub created_at: NaiveDateTime,
}

/// Information required to create a new [`Employee`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewEmployee {
    pub national_id: NationalId,
    pub full_name: FullName,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub work_area: Option<String>,
    pub role: Option<String>,
    pub base_salary: Option<BaseSalary>,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

impl NewEmployee {
    /// Minimal record created the first time a person marks attendance.
    pub fn first_sighting(
        national_id: NationalId,
        full_name: FullName,
        created_at: NaiveDateTime,
    ) -> Self {
        Self {
            national_id,
            full_name,
            phone: None,
            email: None,
            address: None,
            hire_date: None,
            work_area: None,
            role: None,
            base_salary: None,
            active: true,
            created_at,
        }
    }
}

/// Mutable attributes of an employee. The national ID is immutable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmployeeUpdate {
    pub full_name: FullName,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub work_area: Option<String>,
    pub role: Option<String>,
    pub base_salary: Option<BaseSalary>,
    pub active: bool,
}

impl From<NewEmployee> for EmployeeUpdate {
    fn from(value: NewEmployee) -> Self {
        Self {
            full_name: value.full_name,
            phone: value.phone,
            email: value.email,
            address: value.address,
            hire_date: value.hire_date,
            work_area: value.work_area,
            role: value.role,
            base_salary: value.base_salary,
            active: value.active,
        }
    }
}
