use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::employee::{
    Employee as DomainEmployee, EmployeeUpdate as DomainEmployeeUpdate,
    NewEmployee as DomainNewEmployee,
};
use crate::domain::types::{BaseSalary, FullName, NationalId, TypeConstraintError};

/// Diesel model representing the `employees` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::personnel::employees)]
pub struct Employee {
    pub id: i32,
    pub national_id: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub work_area: Option<String>,
    pub role: Option<String>,
    pub base_salary: Option<i64>,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::personnel::employees)]
pub struct NewEmployee {
    pub national_id: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub work_area: Option<String>,
    pub role: Option<String>,
    pub base_salary: Option<i64>,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

/// Full replacement of the mutable columns; `None` clears a column.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::personnel::employees)]
#[diesel(treat_none_as_null = true)]
pub struct EmployeeChangeset {
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub work_area: Option<String>,
    pub role: Option<String>,
    pub base_salary: Option<i64>,
    pub active: bool,
}

/// Partial update used by replication; `None` leaves a column untouched.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = crate::schema::personnel::employees)]
pub struct EmployeeMergeChangeset {
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub work_area: Option<String>,
    pub role: Option<String>,
    pub base_salary: Option<i64>,
    pub active: bool,
}

impl TryFrom<Employee> for DomainEmployee {
    type Error = TypeConstraintError;

    fn try_from(employee: Employee) -> Result<Self, Self::Error> {
        Ok(Self {
            id: employee.id.try_into()?,
            national_id: NationalId::new(employee.national_id)?,
            full_name: FullName::new(employee.full_name)?,
            phone: employee.phone,
            email: employee.email,
            address: employee.address,
            hire_date: employee.hire_date,
            work_area: employee.work_area,
            role: employee.role,
            base_salary: employee.base_salary.map(BaseSalary::new).transpose()?,
            active: employee.active,
            created_at: employee.created_at,
        })
    }
}

impl From<DomainNewEmployee> for NewEmployee {
    fn from(employee: DomainNewEmployee) -> Self {
        Self {
            national_id: employee.national_id.into_inner(),
            full_name: employee.full_name.into_inner(),
            phone: employee.phone,
            email: employee.email,
            address: employee.address,
            hire_date: employee.hire_date,
            work_area: employee.work_area,
            role: employee.role,
            base_salary: employee.base_salary.map(BaseSalary::get),
            active: employee.active,
            created_at: employee.created_at,
        }
    }
}

impl From<DomainEmployeeUpdate> for EmployeeChangeset {
    fn from(update: DomainEmployeeUpdate) -> Self {
        Self {
            full_name: update.full_name.into_inner(),
            phone: update.phone,
            email: update.email,
            address: update.address,
            hire_date: update.hire_date,
            work_area: update.work_area,
            role: update.role,
            base_salary: update.base_salary.map(BaseSalary::get),
            active: update.active,
        }
    }
}

impl From<DomainEmployeeUpdate> for EmployeeMergeChangeset {
    fn from(update: DomainEmployeeUpdate) -> Self {
        Self {
            full_name: update.full_name.into_inner(),
            phone: update.phone,
            email: update.email,
            address: update.address,
            hire_date: update.hire_date,
            work_area: update.work_area,
            role: update.role,
            base_salary: update.base_salary.map(BaseSalary::get),
            active: update.active,
        }
    }
}
