use diesel::prelude::*;

use crate::domain::employee::{Employee, EmployeeUpdate, NewEmployee};
use crate::domain::types::{EmployeeId, NationalId};
use crate::models::employee::{
    Employee as DbEmployee, EmployeeChangeset, EmployeeMergeChangeset,
    NewEmployee as DbNewEmployee,
};
use crate::repository::{
    DieselPersonnelRepository, EmployeeListQuery, EmployeeReader, EmployeeWriter,
    RepositoryError, RepositoryResult,
};

impl EmployeeReader for DieselPersonnelRepository {
    fn get_employee_by_national_id(
        &self,
        national_id: &NationalId,
    ) -> RepositoryResult<Option<Employee>> {
        use crate::schema::personnel::employees;

        let mut conn = self.conn()?;

        let employee = employees::table
            .filter(employees::national_id.eq(national_id.as_str()))
            .first::<DbEmployee>(&mut conn)
            .optional()?;

        Ok(employee.map(TryInto::try_into).transpose()?)
    }

    fn get_employee_by_id(&self, id: EmployeeId) -> RepositoryResult<Option<Employee>> {
        use crate::schema::personnel::employees;

        let mut conn = self.conn()?;

        let employee = employees::table
            .find(id.get())
            .first::<DbEmployee>(&mut conn)
            .optional()?;

        Ok(employee.map(TryInto::try_into).transpose()?)
    }

    fn list_employees(
        &self,
        query: EmployeeListQuery,
    ) -> RepositoryResult<(usize, Vec<Employee>)> {
        use crate::schema::personnel::employees;

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = employees::table.into_boxed::<diesel::sqlite::Sqlite>();

            if query.active_only {
                items = items.filter(employees::active.eq(true));
            }

            if let Some(search) = query.search.as_deref().map(str::trim) {
                if !search.is_empty() {
                    let pattern = format!("%{search}%");
                    items = items.filter(
                        employees::full_name
                            .like(pattern.clone())
                            .or(employees::national_id.like(pattern)),
                    );
                }
            }

            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder();
        if let Some(pagination) = query.pagination {
            let (offset, limit) = pagination.offset_limit();
            items = items.offset(offset).limit(limit);
        }

        let items = items
            .order(employees::full_name.asc())
            .load::<DbEmployee>(&mut conn)?
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Employee>, _>>()?;

        Ok((total, items))
    }

    fn count_employees(&self, active_only: bool) -> RepositoryResult<usize> {
        use crate::schema::personnel::employees;

        let mut conn = self.conn()?;

        let mut query = employees::table.into_boxed::<diesel::sqlite::Sqlite>();
        if active_only {
            query = query.filter(employees::active.eq(true));
        }
        let total = query.count().get_result::<i64>(&mut conn)?;

        Ok(total as usize)
    }
}

impl EmployeeWriter for DieselPersonnelRepository {
    fn create_employee(&self, employee: &NewEmployee) -> RepositoryResult<Employee> {
        use crate::schema::personnel::employees;

        let mut conn = self.conn()?;
        let db_employee: DbNewEmployee = employee.clone().into();

        let created = diesel::insert_into(employees::table)
            .values(db_employee)
            .get_result::<DbEmployee>(&mut conn)?;

        Ok(created.try_into()?)
    }

    fn update_employee(
        &self,
        national_id: &NationalId,
        update: &EmployeeUpdate,
    ) -> RepositoryResult<Employee> {
        use crate::schema::personnel::employees;

        let mut conn = self.conn()?;
        let changeset: EmployeeChangeset = update.clone().into();

        let updated = diesel::update(
            employees::table.filter(employees::national_id.eq(national_id.as_str())),
        )
        .set(changeset)
        .get_result::<DbEmployee>(&mut conn)
        .optional()?
        .ok_or(RepositoryError::NotFound)?;

        Ok(updated.try_into()?)
    }

    fn deactivate_employee(&self, national_id: &NationalId) -> RepositoryResult<usize> {
        use crate::schema::personnel::employees;

        let mut conn = self.conn()?;

        let affected = diesel::update(
            employees::table.filter(employees::national_id.eq(national_id.as_str())),
        )
        .set(employees::active.eq(false))
        .execute(&mut conn)?;

        Ok(affected)
    }

    fn upsert_employee(&self, employee: &NewEmployee) -> RepositoryResult<Employee> {
        use crate::schema::personnel::employees;

        let mut conn = self.conn()?;
        let insert: DbNewEmployee = employee.clone().into();
        let merge: EmployeeMergeChangeset = EmployeeUpdate::from(employee.clone()).into();

        let stored = conn.immediate_transaction(|conn| {
            diesel::insert_into(employees::table)
                .values(insert)
                .on_conflict(employees::national_id)
                .do_update()
                .set(merge)
                .get_result::<DbEmployee>(conn)
        })?;

        Ok(stored.try_into()?)
    }
}
