//! Employee and contract records.

use crate::domain::contract::{Contract, NewContract};
use crate::domain::employee::{Employee, EmployeeUpdate, NewEmployee};
use crate::domain::types::{ContractId, NationalId};
use crate::repository::{
    ContractReader, ContractWriter, EmployeeListQuery, EmployeeReader, EmployeeWriter,
    RepositoryError,
};

use super::{ServiceError, ServiceResult};

/// Employees shown per page by list views.
pub const EMPLOYEES_PER_PAGE: usize = 50;

/// Registers a new employee; the national ID must not be taken.
pub fn register_employee<R>(repo: &R, employee: &NewEmployee) -> ServiceResult<Employee>
where
    R: EmployeeWriter,
{
    match repo.create_employee(employee) {
        Ok(created) => {
            log::info!("Registered employee {}", created.national_id);
            Ok(created)
        }
        Err(RepositoryError::ConstraintViolation(_)) => Err(ServiceError::Form(format!(
            "ya existe un empleado con documento {}",
            employee.national_id
        ))),
        Err(e) => {
            log::error!("Failed to register employee: {e}");
            Err(e.into())
        }
    }
}

pub fn update_employee<R>(
    repo: &R,
    national_id: &NationalId,
    update: &EmployeeUpdate,
) -> ServiceResult<Employee>
where
    R: EmployeeWriter,
{
    repo.update_employee(national_id, update).map_err(|e| {
        if !matches!(e, RepositoryError::NotFound) {
            log::error!("Failed to update employee {national_id}: {e}");
        }
        e.into()
    })
}

/// One page of employees and the total number of matches.
pub fn list_employees<R>(
    repo: &R,
    active_only: bool,
    search: Option<&str>,
    page: usize,
) -> ServiceResult<(usize, Vec<Employee>)>
where
    R: EmployeeReader,
{
    let mut query = EmployeeListQuery::default().paginate(page, EMPLOYEES_PER_PAGE);
    if active_only {
        query = query.active();
    }
    if let Some(search) = search {
        query = query.search(search);
    }
    repo.list_employees(query).map_err(|e| {
        log::error!("Failed to list employees: {e}");
        e.into()
    })
}

/// Soft delete; attendance history stays attached to the row.
pub fn deactivate_employee<R>(repo: &R, national_id: &NationalId) -> ServiceResult<()>
where
    R: EmployeeWriter,
{
    match repo.deactivate_employee(national_id) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => {
            log::info!("Deactivated employee {national_id}");
            Ok(())
        }
        Err(e) => {
            log::error!("Failed to deactivate employee {national_id}: {e}");
            Err(e.into())
        }
    }
}

pub fn count_employees<R>(repo: &R, active_only: bool) -> ServiceResult<usize>
where
    R: EmployeeReader,
{
    repo.count_employees(active_only).map_err(|e| {
        log::error!("Failed to count employees: {e}");
        e.into()
    })
}

pub fn create_contract<R>(repo: &R, contract: &NewContract) -> ServiceResult<Contract>
where
    R: EmployeeReader + ContractWriter,
{
    if let Some(end) = contract.end_date {
        if end < contract.start_date {
            return Err(ServiceError::Form(
                "la fecha de fin no puede ser anterior a la de inicio".to_string(),
            ));
        }
    }

    match repo.get_employee_by_id(contract.employee_id) {
        Ok(Some(_)) => {}
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get employee {}: {e}", contract.employee_id);
            return Err(e.into());
        }
    }

    repo.create_contract(contract).map_err(|e| {
        log::error!("Failed to create contract: {e}");
        e.into()
    })
}

pub fn list_contracts<R>(repo: &R, national_id: &NationalId) -> ServiceResult<Vec<Contract>>
where
    R: EmployeeReader + ContractReader,
{
    let employee = match repo.get_employee_by_national_id(national_id) {
        Ok(Some(employee)) => employee,
        Ok(None) => return Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get employee {national_id}: {e}");
            return Err(e.into());
        }
    };

    repo.list_contracts(employee.id).map_err(|e| {
        log::error!("Failed to list contracts: {e}");
        e.into()
    })
}

pub fn deactivate_contract<R>(repo: &R, id: ContractId) -> ServiceResult<()>
where
    R: ContractWriter,
{
    match repo.deactivate_contract(id) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Failed to deactivate contract {id}: {e}");
            Err(e.into())
        }
    }
}
