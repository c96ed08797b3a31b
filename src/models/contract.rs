use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::contract::{Contract as DomainContract, NewContract as DomainNewContract};
use crate::domain::types::{BaseSalary, TypeConstraintError};

/// Diesel model representing the `contracts` table.
#[derive(Debug, Clone, Identifiable, Queryable)]
#[diesel(table_name = crate::schema::personnel::contracts)]
pub struct Contract {
    pub id: i32,
    pub employee_id: i32,
    pub contract_type: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub salary: Option<i64>,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::personnel::contracts)]
pub struct NewContract {
    pub employee_id: i32,
    pub contract_type: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub salary: Option<i64>,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

impl TryFrom<Contract> for DomainContract {
    type Error = TypeConstraintError;

    fn try_from(contract: Contract) -> Result<Self, Self::Error> {
        Ok(Self {
            id: contract.id.try_into()?,
            employee_id: contract.employee_id.try_into()?,
            contract_type: contract.contract_type,
            start_date: contract.start_date,
            end_date: contract.end_date,
            salary: contract.salary.map(BaseSalary::new).transpose()?,
            active: contract.active,
            created_at: contract.created_at,
        })
    }
}

impl From<DomainNewContract> for NewContract {
    fn from(contract: DomainNewContract) -> Self {
        Self {
            employee_id: contract.employee_id.get(),
            contract_type: contract.contract_type,
            start_date: contract.start_date,
            end_date: contract.end_date,
            salary: contract.salary.map(BaseSalary::get),
            active: true,
            created_at: contract.created_at,
        }
    }
}
