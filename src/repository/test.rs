use std::sync::{Mutex, MutexGuard};

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::alert::{Alert, AlertHistoryEntry, AlertKey, NewAlert};
use crate::domain::attendance::{
    AttendanceOutcome, AttendanceRecord, AttendanceState, EmployeeAttendance, RequestMetadata,
};
use crate::domain::contract::{Contract, ExpiringContract, NewContract};
use crate::domain::employee::{Employee, EmployeeUpdate, NewEmployee};
use crate::domain::movement::{
    LedgerRejection, Movement, MovementFilter, NewMovement, next_balance,
};
use crate::domain::product::{NewProduct, Product, ProductUpdate};
use crate::domain::token::DailyToken;
use crate::domain::types::{
    AlertId, AlertKind, AttendanceId, AttendanceKind, Catalog, ContractId, EmployeeId,
    MovementId, NationalId, ProductCode, ProductId, StoreKind,
};
use crate::repository::{
    AlertListQuery, AlertReader, AlertWriter, AttendanceListQuery, AttendanceMerge,
    AttendanceReader, AttendanceWriter, ContractReader, ContractWriter, EmployeeListQuery,
    EmployeeReader, EmployeeWriter, MovementReader, MovementWriter, ProductListQuery,
    ProductReader, ProductWriter, RepositoryError, RepositoryResult, StoreHealth, TokenReader,
    TokenWriter,
};

#[derive(Default)]
struct State {
    employees: Vec<Employee>,
    attendance: Vec<AttendanceRecord>,
    tokens: Vec<DailyToken>,
    contracts: Vec<Contract>,
    products: Vec<Product>,
    movements: Vec<Movement>,
    alerts: Vec<Alert>,
    history: Vec<AlertHistoryEntry>,
    next_alert_id: i32,
}

/// Simple in-memory repository used for unit tests.
///
/// One instance stands in for one store: personnel, a catalog or alerts.
/// Marking it unreachable makes every call fail with
/// [`RepositoryError::StoreUnavailable`].
pub struct TestRepository {
    store: StoreKind,
    catalog: Catalog,
    reachable: bool,
    state: Mutex<State>,
}

impl Default for TestRepository {
    fn default() -> Self {
        Self::personnel()
    }
}

impl TestRepository {
    fn for_store(store: StoreKind, catalog: Catalog) -> Self {
        Self {
            store,
            catalog,
            reachable: true,
            state: Mutex::new(State {
                next_alert_id: 1,
                ..State::default()
            }),
        }
    }

    pub fn personnel() -> Self {
        Self::for_store(StoreKind::Personnel, Catalog::Warehouse)
    }

    pub fn catalog_store(catalog: Catalog) -> Self {
        Self::for_store(catalog.into(), catalog)
    }

    pub fn alerts() -> Self {
        Self::for_store(StoreKind::Alerts, Catalog::Warehouse)
    }

    pub fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }

    pub fn with_employees(self, employees: Vec<Employee>) -> Self {
        self.lock().employees = employees;
        self
    }

    pub fn with_contracts(self, contracts: Vec<Contract>) -> Self {
        self.lock().contracts = contracts;
        self
    }

    pub fn with_products(self, products: Vec<Product>) -> Self {
        self.lock().products = products;
        self
    }

    pub fn with_tokens(self, tokens: Vec<DailyToken>) -> Self {
        self.lock().tokens = tokens;
        self
    }

    pub fn employees(&self) -> Vec<Employee> {
        self.lock().employees.clone()
    }

    pub fn attendance_rows(&self) -> Vec<AttendanceRecord> {
        self.lock().attendance.clone()
    }

    pub fn tokens(&self) -> Vec<DailyToken> {
        self.lock().tokens.clone()
    }

    pub fn products(&self) -> Vec<Product> {
        self.lock().products.clone()
    }

    pub fn movements(&self) -> Vec<Movement> {
        self.lock().movements.clone()
    }

    pub fn all_alerts(&self) -> Vec<Alert> {
        self.lock().alerts.clone()
    }

    /// Backdates the resolution of an alert, for retention tests.
    pub fn set_resolved_at(&self, id: AlertId, at: NaiveDateTime) {
        if let Some(alert) = self.lock().alerts.iter_mut().find(|a| a.id == id) {
            alert.resolved_at = Some(at);
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn state(&self) -> RepositoryResult<MutexGuard<'_, State>> {
        if !self.reachable {
            return Err(RepositoryError::StoreUnavailable(format!(
                "{} store is unreachable",
                self.store
            )));
        }
        Ok(self.lock())
    }
}

fn next_id<T>(items: &[T]) -> i32 {
    items.len() as i32 + 1
}

impl EmployeeReader for TestRepository {
    fn get_employee_by_national_id(
        &self,
        national_id: &NationalId,
    ) -> RepositoryResult<Option<Employee>> {
        Ok(self
            .state()?
            .employees
            .iter()
            .find(|e| &e.national_id == national_id)
            .cloned())
    }

    fn get_employee_by_id(&self, id: EmployeeId) -> RepositoryResult<Option<Employee>> {
        Ok(self.state()?.employees.iter().find(|e| e.id == id).cloned())
    }

    fn list_employees(
        &self,
        query: EmployeeListQuery,
    ) -> RepositoryResult<(usize, Vec<Employee>)> {
        let mut items: Vec<Employee> = self.state()?.employees.clone();
        if query.active_only {
            items.retain(|e| e.active);
        }
        if let Some(search) = query.search.as_deref().map(str::trim) {
            let search = search.to_lowercase();
            items.retain(|e| {
                e.full_name.as_str().to_lowercase().contains(&search)
                    || e.national_id.as_str().contains(&search)
            });
        }
        items.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        let total = items.len();
        if let Some(p) = query.pagination {
            items = items
                .into_iter()
                .skip(p.offset())
                .take(p.per_page)
                .collect();
        }
        Ok((total, items))
    }

    fn count_employees(&self, active_only: bool) -> RepositoryResult<usize> {
        Ok(self
            .state()?
            .employees
            .iter()
            .filter(|e| !active_only || e.active)
            .count())
    }
}

impl EmployeeWriter for TestRepository {
    fn create_employee(&self, employee: &NewEmployee) -> RepositoryResult<Employee> {
        let mut state = self.state()?;
        if state
            .employees
            .iter()
            .any(|e| e.national_id == employee.national_id)
        {
            return Err(RepositoryError::ConstraintViolation(
                "UNIQUE constraint failed: employees.national_id".to_string(),
            ));
        }
        let created = Employee {
            id: EmployeeId::new(next_id(&state.employees))?,
            national_id: employee.national_id.clone(),
            full_name: employee.full_name.clone(),
            phone: employee.phone.clone(),
            email: employee.email.clone(),
            address: employee.address.clone(),
            hire_date: employee.hire_date,
            work_area: employee.work_area.clone(),
            role: employee.role.clone(),
            base_salary: employee.base_salary,
            active: employee.active,
            created_at: employee.created_at,
        };
        state.employees.push(created.clone());
        Ok(created)
    }

    fn update_employee(
        &self,
        national_id: &NationalId,
        update: &EmployeeUpdate,
    ) -> RepositoryResult<Employee> {
        let mut state = self.state()?;
        let employee = state
            .employees
            .iter_mut()
            .find(|e| &e.national_id == national_id)
            .ok_or(RepositoryError::NotFound)?;
        employee.full_name = update.full_name.clone();
        employee.phone = update.phone.clone();
        employee.email = update.email.clone();
        employee.address = update.address.clone();
        employee.hire_date = update.hire_date;
        employee.work_area = update.work_area.clone();
        employee.role = update.role.clone();
        employee.base_salary = update.base_salary;
        employee.active = update.active;
        Ok(employee.clone())
    }

    fn deactivate_employee(&self, national_id: &NationalId) -> RepositoryResult<usize> {
        let mut state = self.state()?;
        let mut affected = 0;
        for employee in state
            .employees
            .iter_mut()
            .filter(|e| &e.national_id == national_id)
        {
            employee.active = false;
            affected += 1;
        }
        Ok(affected)
    }

    fn upsert_employee(&self, employee: &NewEmployee) -> RepositoryResult<Employee> {
        {
            let mut state = self.state()?;
            if let Some(existing) = state
                .employees
                .iter_mut()
                .find(|e| e.national_id == employee.national_id)
            {
                existing.full_name = employee.full_name.clone();
                existing.phone = employee.phone.clone().or(existing.phone.take());
                existing.email = employee.email.clone().or(existing.email.take());
                existing.address = employee.address.clone().or(existing.address.take());
                existing.hire_date = employee.hire_date.or(existing.hire_date);
                existing.work_area = employee.work_area.clone().or(existing.work_area.take());
                existing.role = employee.role.clone().or(existing.role.take());
                existing.base_salary = employee.base_salary.or(existing.base_salary);
                existing.active = employee.active;
                return Ok(existing.clone());
            }
        }
        self.create_employee(employee)
    }
}

impl AttendanceReader for TestRepository {
    fn get_attendance(
        &self,
        employee_id: EmployeeId,
        date: NaiveDate,
    ) -> RepositoryResult<Option<AttendanceRecord>> {
        Ok(self
            .state()?
            .attendance
            .iter()
            .find(|r| r.employee_id == employee_id && r.work_date == date)
            .cloned())
    }

    fn list_attendance(
        &self,
        query: AttendanceListQuery,
    ) -> RepositoryResult<Vec<EmployeeAttendance>> {
        let state = self.state()?;
        let mut items: Vec<EmployeeAttendance> = state
            .attendance
            .iter()
            .filter(|r| query.from.is_none_or(|from| r.work_date >= from))
            .filter(|r| query.to.is_none_or(|to| r.work_date <= to))
            .filter_map(|r| {
                let employee = state.employees.iter().find(|e| e.id == r.employee_id)?;
                Some(EmployeeAttendance {
                    employee: employee.clone(),
                    record: r.clone(),
                })
            })
            .filter(|a| {
                query
                    .national_id
                    .as_ref()
                    .is_none_or(|id| &a.employee.national_id == id)
            })
            .collect();
        items.sort_by(|a, b| {
            b.record
                .work_date
                .cmp(&a.record.work_date)
                .then(b.record.id.cmp(&a.record.id))
        });
        Ok(items)
    }
}

impl AttendanceWriter for TestRepository {
    fn record_attendance(
        &self,
        employee_id: EmployeeId,
        kind: AttendanceKind,
        now: NaiveDateTime,
        metadata: &RequestMetadata,
    ) -> RepositoryResult<AttendanceOutcome> {
        let mut state = self.state()?;
        let work_date = now.date();
        let position = state
            .attendance
            .iter()
            .position(|r| r.employee_id == employee_id && r.work_date == work_date);

        AttendanceState::of(position.map(|i| &state.attendance[i])).transition(kind)?;

        let record = match position {
            Some(i) => {
                let record = &mut state.attendance[i];
                match kind {
                    AttendanceKind::Entry => record.entry_at = Some(now),
                    AttendanceKind::Exit => record.exit_at = Some(now),
                }
                record.last_action = kind;
                record.token = metadata.token.clone();
                record.ip_address = metadata.ip_address.clone();
                record.user_agent = metadata.user_agent.clone();
                record.clone()
            }
            None => {
                let record = AttendanceRecord {
                    id: AttendanceId::new(next_id(&state.attendance))?,
                    employee_id,
                    work_date,
                    entry_at: Some(now),
                    exit_at: None,
                    last_action: kind,
                    token: metadata.token.clone(),
                    ip_address: metadata.ip_address.clone(),
                    user_agent: metadata.user_agent.clone(),
                };
                state.attendance.push(record.clone());
                record
            }
        };

        let worked_hours = match kind {
            AttendanceKind::Entry => None,
            AttendanceKind::Exit => record.worked_hours(),
        };
        Ok(AttendanceOutcome {
            record,
            kind,
            worked_hours,
        })
    }

    fn merge_attendance(
        &self,
        employee_id: EmployeeId,
        merge: &AttendanceMerge,
    ) -> RepositoryResult<AttendanceRecord> {
        let mut state = self.state()?;
        let position = state
            .attendance
            .iter()
            .position(|r| r.employee_id == employee_id && r.work_date == merge.work_date);

        let existing = position.map(|i| state.attendance[i].clone());
        let entry_at = existing
            .as_ref()
            .and_then(|r| r.entry_at)
            .or(merge.entry_at);
        let exit_at = existing
            .as_ref()
            .and_then(|r| r.exit_at)
            .or(merge.exit_at)
            .filter(|exit| entry_at.is_some_and(|entry| *exit > entry));
        let last_action = if exit_at.is_some() {
            AttendanceKind::Exit
        } else {
            AttendanceKind::Entry
        };

        match position {
            Some(i) => {
                let record = &mut state.attendance[i];
                record.entry_at = entry_at;
                record.exit_at = exit_at;
                record.last_action = last_action;
                Ok(record.clone())
            }
            None if entry_at.is_none() => Err(RepositoryError::ValidationError(
                "attendance without entry timestamp".to_string(),
            )),
            None => {
                let record = AttendanceRecord {
                    id: AttendanceId::new(next_id(&state.attendance))?,
                    employee_id,
                    work_date: merge.work_date,
                    entry_at,
                    exit_at,
                    last_action,
                    token: merge.metadata.token.clone(),
                    ip_address: merge.metadata.ip_address.clone(),
                    user_agent: merge.metadata.user_agent.clone(),
                };
                state.attendance.push(record.clone());
                Ok(record)
            }
        }
    }
}

impl TokenReader for TestRepository {
    fn find_active_token(&self, date: NaiveDate) -> RepositoryResult<Option<DailyToken>> {
        Ok(self
            .state()?
            .tokens
            .iter()
            .find(|t| t.active && t.issued_on == date)
            .cloned())
    }

    fn find_token(&self, token: &str) -> RepositoryResult<Option<DailyToken>> {
        Ok(self
            .state()?
            .tokens
            .iter()
            .find(|t| t.token.as_str() == token)
            .cloned())
    }

    fn list_tokens(&self, limit: usize) -> RepositoryResult<Vec<DailyToken>> {
        let mut tokens = self.state()?.tokens.clone();
        tokens.sort_by(|a, b| b.issued_on.cmp(&a.issued_on));
        tokens.truncate(limit);
        Ok(tokens)
    }
}

impl TokenWriter for TestRepository {
    fn get_or_insert_token(&self, token: &DailyToken) -> RepositoryResult<DailyToken> {
        let mut state = self.state()?;
        if let Some(existing) = state
            .tokens
            .iter()
            .find(|t| t.active && t.issued_on == token.issued_on)
        {
            return Ok(existing.clone());
        }
        for older in state
            .tokens
            .iter_mut()
            .filter(|t| t.issued_on < token.issued_on)
        {
            older.active = false;
        }
        state.tokens.push(token.clone());
        Ok(token.clone())
    }
}

impl ContractReader for TestRepository {
    fn list_contracts(&self, employee_id: EmployeeId) -> RepositoryResult<Vec<Contract>> {
        Ok(self
            .state()?
            .contracts
            .iter()
            .filter(|c| c.employee_id == employee_id)
            .cloned()
            .collect())
    }

    fn list_expiring_contracts(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> RepositoryResult<Vec<ExpiringContract>> {
        let state = self.state()?;
        let mut items: Vec<ExpiringContract> = state
            .contracts
            .iter()
            .filter(|c| c.active)
            .filter(|c| c.end_date.is_some_and(|end| end >= from && end <= until))
            .filter_map(|c| {
                let employee = state
                    .employees
                    .iter()
                    .find(|e| e.id == c.employee_id && e.active)?;
                Some(ExpiringContract {
                    contract: c.clone(),
                    national_id: employee.national_id.clone(),
                    full_name: employee.full_name.clone(),
                })
            })
            .collect();
        items.sort_by_key(|c| c.contract.end_date);
        Ok(items)
    }
}

impl ContractWriter for TestRepository {
    fn create_contract(&self, contract: &NewContract) -> RepositoryResult<Contract> {
        let mut state = self.state()?;
        if !state.employees.iter().any(|e| e.id == contract.employee_id) {
            return Err(RepositoryError::ConstraintViolation(
                "FOREIGN KEY constraint failed".to_string(),
            ));
        }
        let created = Contract {
            id: ContractId::new(next_id(&state.contracts))?,
            employee_id: contract.employee_id,
            contract_type: contract.contract_type.clone(),
            start_date: contract.start_date,
            end_date: contract.end_date,
            salary: contract.salary,
            active: true,
            created_at: contract.created_at,
        };
        state.contracts.push(created.clone());
        Ok(created)
    }

    fn deactivate_contract(&self, id: ContractId) -> RepositoryResult<usize> {
        let mut state = self.state()?;
        match state.contracts.iter_mut().find(|c| c.id == id) {
            Some(contract) => {
                contract.active = false;
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

impl ProductReader for TestRepository {
    fn catalog(&self) -> Catalog {
        self.catalog
    }

    fn get_product(&self, code: &ProductCode) -> RepositoryResult<Option<Product>> {
        Ok(self
            .state()?
            .products
            .iter()
            .find(|p| &p.code == code)
            .cloned())
    }

    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)> {
        let mut items: Vec<Product> = self.state()?.products.clone();
        if query.active_only {
            items.retain(|p| p.active);
        }
        if query.with_min_stock {
            items.retain(|p| p.min_stock.get() > 0);
        }
        if let Some(search) = query.search.as_deref().map(str::trim) {
            let search = search.to_lowercase();
            items.retain(|p| {
                p.name.as_str().to_lowercase().contains(&search)
                    || p.code.as_str().to_lowercase().contains(&search)
            });
        }
        items.sort_by(|a, b| a.code.cmp(&b.code));
        let total = items.len();
        if let Some(p) = query.pagination {
            items = items
                .into_iter()
                .skip(p.offset())
                .take(p.per_page)
                .collect();
        }
        Ok((total, items))
    }

    fn list_expiring_products(
        &self,
        after: NaiveDate,
        until: NaiveDate,
    ) -> RepositoryResult<Vec<Product>> {
        Ok(self
            .state()?
            .products
            .iter()
            .filter(|p| p.active && p.balance.get() > 0)
            .filter(|p| {
                p.details
                    .expiration_date()
                    .is_some_and(|date| date > after && date <= until)
            })
            .cloned()
            .collect())
    }
}

impl ProductWriter for TestRepository {
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product> {
        let mut state = self.state()?;
        if state.products.iter().any(|p| p.code == product.code) {
            return Err(RepositoryError::ConstraintViolation(
                "UNIQUE constraint failed: products.code".to_string(),
            ));
        }
        let created = Product {
            id: ProductId::new(next_id(&state.products))?,
            catalog: self.catalog,
            code: product.code.clone(),
            name: product.name.clone(),
            unit: product.unit.clone(),
            unit_value: product.unit_value,
            balance: product.initial_balance,
            min_stock: product.min_stock,
            location: product.location.clone(),
            supplier: product.supplier.clone(),
            active: true,
            details: product.details.clone(),
            created_at: product.created_at,
            updated_at: product.created_at,
        };
        state.products.push(created.clone());
        Ok(created)
    }

    fn update_product(
        &self,
        code: &ProductCode,
        update: &ProductUpdate,
        now: NaiveDateTime,
    ) -> RepositoryResult<Product> {
        let mut state = self.state()?;
        let product = state
            .products
            .iter_mut()
            .find(|p| &p.code == code)
            .ok_or(RepositoryError::NotFound)?;
        product.name = update.name.clone();
        product.unit = update.unit.clone();
        product.unit_value = update.unit_value;
        product.min_stock = update.min_stock;
        product.location = update.location.clone();
        product.supplier = update.supplier.clone();
        product.details = update.details.clone();
        product.updated_at = now;
        Ok(product.clone())
    }

    fn deactivate_product(
        &self,
        code: &ProductCode,
        now: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        let mut state = self.state()?;
        match state.products.iter_mut().find(|p| &p.code == code) {
            Some(product) => {
                product.active = false;
                product.updated_at = now;
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

impl MovementReader for TestRepository {
    fn ledger_catalog(&self) -> Catalog {
        self.catalog
    }

    fn list_movements(
        &self,
        filter: &MovementFilter,
        before: Option<MovementId>,
        page_size: usize,
    ) -> RepositoryResult<Vec<Movement>> {
        Ok(self
            .state()?
            .movements
            .iter()
            .rev()
            .filter(|m| before.is_none_or(|id| m.id < id))
            .filter(|m| {
                filter
                    .product_code
                    .as_ref()
                    .is_none_or(|code| &m.product_code == code)
            })
            .filter(|m| filter.kind.is_none_or(|kind| m.kind == kind))
            .filter(|m| filter.from.is_none_or(|from| m.moved_at >= from))
            .filter(|m| filter.to.is_none_or(|to| m.moved_at <= to))
            .take(page_size)
            .cloned()
            .collect())
    }
}

impl MovementWriter for TestRepository {
    fn append_movement(&self, movement: &NewMovement) -> RepositoryResult<Movement> {
        let mut state = self.state()?;
        let id = MovementId::new(next_id(&state.movements))?;
        let product = state
            .products
            .iter_mut()
            .find(|p| p.code == movement.product_code && p.active)
            .ok_or_else(|| LedgerRejection::UnknownProduct(movement.product_code.to_string()))?;

        let before = product.balance;
        let after = next_balance(movement.kind, before, movement.quantity)?;
        product.balance = after;
        product.updated_at = movement.moved_at;

        let appended = Movement {
            id,
            catalog: self.catalog,
            product_code: product.code.clone(),
            product_name: product.name.clone(),
            kind: movement.kind,
            quantity: movement.quantity,
            moved_at: movement.moved_at,
            balance_before: before,
            balance_after: after,
            responsible: movement.responsible.clone(),
            notes: movement.notes.clone(),
        };
        state.movements.push(appended.clone());
        Ok(appended)
    }
}

impl AlertReader for TestRepository {
    fn get_alert(&self, id: AlertId) -> RepositoryResult<Option<Alert>> {
        Ok(self.state()?.alerts.iter().find(|a| a.id == id).cloned())
    }

    fn find_active_alert(&self, key: &AlertKey) -> RepositoryResult<Option<Alert>> {
        Ok(self
            .state()?
            .alerts
            .iter()
            .find(|a| a.active && &a.key() == key)
            .cloned())
    }

    fn count_active_alerts(&self, kind: AlertKind) -> RepositoryResult<usize> {
        Ok(self
            .state()?
            .alerts
            .iter()
            .filter(|a| a.active && a.kind == kind)
            .count())
    }

    fn list_alerts(&self, query: AlertListQuery) -> RepositoryResult<Vec<Alert>> {
        let mut items: Vec<Alert> = self
            .state()?
            .alerts
            .iter()
            .rev()
            .filter(|a| !query.active_only || a.active)
            .filter(|a| query.kind.is_none_or(|kind| a.kind == kind))
            .filter(|a| query.severity.is_none_or(|severity| a.severity == severity))
            .filter(|a| query.source_catalog.is_none_or(|s| a.source_catalog == s))
            .cloned()
            .collect();
        if let Some(limit) = query.limit {
            items.truncate(limit);
        }
        Ok(items)
    }

    fn list_alert_history(&self, id: AlertId) -> RepositoryResult<Vec<AlertHistoryEntry>> {
        Ok(self
            .state()?
            .history
            .iter()
            .filter(|h| h.alert_id == id)
            .cloned()
            .collect())
    }
}

impl AlertWriter for TestRepository {
    fn create_alert(&self, alert: &NewAlert) -> RepositoryResult<Alert> {
        let mut state = self.state()?;
        if state.alerts.iter().any(|a| a.active && a.key() == alert.key()) {
            return Err(RepositoryError::ConstraintViolation(
                "UNIQUE constraint failed: alerts.kind, alerts.source_catalog, alerts.source_key"
                    .to_string(),
            ));
        }
        let id = AlertId::new(state.next_alert_id)?;
        state.next_alert_id += 1;
        let created = Alert {
            id,
            kind: alert.kind,
            severity: alert.severity,
            title: alert.title.clone(),
            message: alert.message.clone(),
            source_catalog: alert.source_catalog,
            source_key: alert.source_key.clone(),
            created_at: alert.created_at,
            resolved_at: None,
            active: true,
            payload: alert.payload.clone(),
        };
        state.alerts.push(created.clone());
        let history_id = next_id(&state.history);
        state.history.push(AlertHistoryEntry {
            id: history_id,
            alert_id: id,
            action: super::alert::ACTION_CREATED.to_string(),
            actor: None,
            notes: None,
            recorded_at: alert.created_at,
        });
        Ok(created)
    }

    fn resolve_alert(
        &self,
        id: AlertId,
        actor: Option<&str>,
        notes: Option<&str>,
        now: NaiveDateTime,
    ) -> RepositoryResult<Alert> {
        let mut state = self.state()?;
        let alert = state
            .alerts
            .iter_mut()
            .find(|a| a.id == id && a.active)
            .ok_or(RepositoryError::NotFound)?;
        alert.active = false;
        alert.resolved_at = Some(now);
        let resolved = alert.clone();
        let history_id = next_id(&state.history);
        state.history.push(AlertHistoryEntry {
            id: history_id,
            alert_id: id,
            action: super::alert::ACTION_RESOLVED.to_string(),
            actor: actor.map(str::to_string),
            notes: notes.map(str::to_string),
            recorded_at: now,
        });
        Ok(resolved)
    }

    fn delete_resolved_before(&self, cutoff: NaiveDateTime) -> RepositoryResult<usize> {
        let mut state = self.state()?;
        let expired: Vec<AlertId> = state
            .alerts
            .iter()
            .filter(|a| !a.active && a.resolved_at.is_some_and(|at| at < cutoff))
            .map(|a| a.id)
            .collect();
        state.alerts.retain(|a| !expired.contains(&a.id));
        state.history.retain(|h| !expired.contains(&h.alert_id));
        Ok(expired.len())
    }
}

impl StoreHealth for TestRepository {
    fn store(&self) -> StoreKind {
        self.store
    }

    fn ping(&self) -> RepositoryResult<()> {
        self.state().map(|_| ())
    }
}
