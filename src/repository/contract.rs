use chrono::NaiveDate;
use diesel::prelude::*;

use crate::domain::contract::{Contract, ExpiringContract, NewContract};
use crate::domain::types::{ContractId, EmployeeId, FullName, NationalId};
use crate::models::contract::{Contract as DbContract, NewContract as DbNewContract};
use crate::repository::{
    ContractReader, ContractWriter, DieselPersonnelRepository, RepositoryResult,
};

impl ContractReader for DieselPersonnelRepository {
    fn list_contracts(&self, employee_id: EmployeeId) -> RepositoryResult<Vec<Contract>> {
        use crate::schema::personnel::contracts;

        let mut conn = self.conn()?;

        let items = contracts::table
            .filter(contracts::employee_id.eq(employee_id.get()))
            .order(contracts::start_date.desc())
            .load::<DbContract>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Contract>, _>>()?;

        Ok(items)
    }

    fn list_expiring_contracts(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> RepositoryResult<Vec<ExpiringContract>> {
        use crate::schema::personnel::{contracts, employees};

        let mut conn = self.conn()?;

        let rows = contracts::table
            .inner_join(employees::table)
            .filter(contracts::active.eq(true))
            .filter(employees::active.eq(true))
            .filter(contracts::end_date.ge(from))
            .filter(contracts::end_date.le(until))
            .order(contracts::end_date.asc())
            .select((
                contracts::all_columns,
                employees::national_id,
                employees::full_name,
            ))
            .load::<(DbContract, String, String)>(&mut conn)?;

        let mut items = Vec::with_capacity(rows.len());
        for (contract, national_id, full_name) in rows {
            items.push(ExpiringContract {
                contract: contract.try_into()?,
                national_id: NationalId::new(national_id)?,
                full_name: FullName::new(full_name)?,
            });
        }

        Ok(items)
    }
}

impl ContractWriter for DieselPersonnelRepository {
    fn create_contract(&self, contract: &NewContract) -> RepositoryResult<Contract> {
        use crate::schema::personnel::contracts;

        let mut conn = self.conn()?;
        let db_contract: DbNewContract = contract.clone().into();

        let created = diesel::insert_into(contracts::table)
            .values(db_contract)
            .get_result::<DbContract>(&mut conn)?;

        Ok(created.try_into()?)
    }

    fn deactivate_contract(&self, id: ContractId) -> RepositoryResult<usize> {
        use crate::schema::personnel::contracts;

        let mut conn = self.conn()?;

        let affected = diesel::update(contracts::table.find(id.get()))
            .set(contracts::active.eq(false))
            .execute(&mut conn)?;

        Ok(affected)
    }
}
