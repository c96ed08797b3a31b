use chrono::{NaiveDate, NaiveDateTime};

use crate::db::{DbConnection, DbPool, Stores};
use crate::domain::alert::{Alert, AlertHistoryEntry, AlertKey, NewAlert};
use crate::domain::attendance::{
    AttendanceOutcome, AttendanceRecord, EmployeeAttendance, RequestMetadata,
};
use crate::domain::contract::{Contract, ExpiringContract, NewContract};
use crate::domain::employee::{Employee, EmployeeUpdate, NewEmployee};
use crate::domain::movement::{Movement, MovementFilter, NewMovement};
use crate::domain::product::{NewProduct, Product, ProductUpdate};
use crate::domain::token::DailyToken;
use crate::domain::types::{
    AlertId, AlertKind, AttendanceKind, Catalog, ContractId, EmployeeId, MovementId, NationalId,
    ProductCode, Severity, StoreKind,
};

pub mod alert;
pub mod attendance;
pub mod contract;
pub mod employee;
pub mod errors;
pub mod health;
pub mod movement;
pub mod product;
#[cfg(test)]
pub mod test;
pub mod token;

pub use errors::{RepositoryError, RepositoryResult};
pub use movement::MovementHistory;

/// Page selection for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

impl Pagination {
    /// Rows skipped before this page; saturates for out-of-range pages.
    pub fn offset(self) -> usize {
        (self.page.max(1) - 1).saturating_mul(self.per_page)
    }

    fn offset_limit(self) -> (i64, i64) {
        let offset = i64::try_from(self.offset()).unwrap_or(i64::MAX);
        let limit = i64::try_from(self.per_page).unwrap_or(i64::MAX);
        (offset, limit)
    }
}

/// Repository over the personnel store: employees, attendance, tokens and contracts.
///
/// The underlying `r2d2::Pool` is cheap to clone, allowing the repository to
/// be passed around freely between handlers.
#[derive(Clone)]
pub struct DieselPersonnelRepository {
    pool: DbPool,
}

impl DieselPersonnelRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Repository over one catalog store: products and their movement ledger.
#[derive(Clone)]
pub struct DieselCatalogRepository {
    pool: DbPool,
    catalog: Catalog,
}

impl DieselCatalogRepository {
    pub fn new(pool: DbPool, catalog: Catalog) -> Self {
        Self { pool, catalog }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Repository over the alert store.
#[derive(Clone)]
pub struct DieselAlertRepository {
    pool: DbPool,
}

impl DieselAlertRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Repositories over every store, built from the shared pools.
#[derive(Clone)]
pub struct Repositories {
    pub personnel: DieselPersonnelRepository,
    /// One per catalog, in [`Catalog::ALL`] order.
    pub catalogs: [DieselCatalogRepository; 3],
    pub alerts: DieselAlertRepository,
}

impl Repositories {
    pub fn new(stores: &Stores) -> Self {
        Self {
            personnel: DieselPersonnelRepository::new(stores.personnel.clone()),
            catalogs: Catalog::ALL.map(|catalog| {
                DieselCatalogRepository::new(stores.catalog(catalog).clone(), catalog)
            }),
            alerts: DieselAlertRepository::new(stores.alerts.clone()),
        }
    }

    pub fn catalog(&self, catalog: Catalog) -> &DieselCatalogRepository {
        let index = match catalog {
            Catalog::Chemicals => 0,
            Catalog::Warehouse => 1,
            Catalog::Postharvest => 2,
        };
        &self.catalogs[index]
    }
}

/// Query parameters used when listing employees.
#[derive(Debug, Clone, Default)]
pub struct EmployeeListQuery {
    /// Restrict to employees with the active flag set.
    pub active_only: bool,
    /// Case-insensitive match on name or national ID.
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl EmployeeListQuery {
    pub fn active(mut self) -> Self {
        self.active_only = true;
        self
    }
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Query parameters used when listing attendance records.
#[derive(Debug, Clone, Default)]
pub struct AttendanceListQuery {
    pub national_id: Option<NationalId>,
    /// Inclusive lower bound on the work date.
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on the work date.
    pub to: Option<NaiveDate>,
}

impl AttendanceListQuery {
    pub fn employee(mut self, national_id: NationalId) -> Self {
        self.national_id = Some(national_id);
        self
    }
    pub fn since(mut self, from: NaiveDate) -> Self {
        self.from = Some(from);
        self
    }
    pub fn until(mut self, to: NaiveDate) -> Self {
        self.to = Some(to);
        self
    }
    pub fn day(self, date: NaiveDate) -> Self {
        self.since(date).until(date)
    }
}

/// Attendance timestamps received from a peer, merged into the local row.
#[derive(Debug, Clone, PartialEq)]
pub struct AttendanceMerge {
    pub work_date: NaiveDate,
    pub entry_at: Option<NaiveDateTime>,
    pub exit_at: Option<NaiveDateTime>,
    pub metadata: RequestMetadata,
    pub updated_at: NaiveDateTime,
}

/// Query parameters used when listing products of a catalog.
#[derive(Debug, Clone, Default)]
pub struct ProductListQuery {
    pub active_only: bool,
    /// Only products with a positive minimum-stock threshold.
    pub with_min_stock: bool,
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl ProductListQuery {
    pub fn active(mut self) -> Self {
        self.active_only = true;
        self
    }
    pub fn with_min_stock(mut self) -> Self {
        self.with_min_stock = true;
        self
    }
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

/// Query parameters used when listing alerts.
#[derive(Debug, Clone, Default)]
pub struct AlertListQuery {
    pub active_only: bool,
    pub kind: Option<AlertKind>,
    pub severity: Option<Severity>,
    pub source_catalog: Option<StoreKind>,
    pub limit: Option<usize>,
}

impl AlertListQuery {
    pub fn active(mut self) -> Self {
        self.active_only = true;
        self
    }
    pub fn kind(mut self, kind: AlertKind) -> Self {
        self.kind = Some(kind);
        self
    }
    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }
    pub fn source(mut self, source: StoreKind) -> Self {
        self.source_catalog = Some(source);
        self
    }
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Read-only operations for employees.
pub trait EmployeeReader {
    /// Retrieve an employee (active or not) by national ID.
    fn get_employee_by_national_id(
        &self,
        national_id: &NationalId,
    ) -> RepositoryResult<Option<Employee>>;
    fn get_employee_by_id(&self, id: EmployeeId) -> RepositoryResult<Option<Employee>>;
    /// List employees matching the supplied query, with the unpaginated total.
    fn list_employees(&self, query: EmployeeListQuery) -> RepositoryResult<(usize, Vec<Employee>)>;
    fn count_employees(&self, active_only: bool) -> RepositoryResult<usize>;
}

/// Write operations for employees.
pub trait EmployeeWriter {
    fn create_employee(&self, employee: &NewEmployee) -> RepositoryResult<Employee>;
    fn update_employee(
        &self,
        national_id: &NationalId,
        update: &EmployeeUpdate,
    ) -> RepositoryResult<Employee>;
    /// Soft delete: clears the active flag, never removes the row.
    fn deactivate_employee(&self, national_id: &NationalId) -> RepositoryResult<usize>;
    /// Insert keyed by national ID, or merge into the existing row.
    ///
    /// Optional fields that are `None` leave the stored column untouched.
    fn upsert_employee(&self, employee: &NewEmployee) -> RepositoryResult<Employee>;
}

/// Read-only operations for attendance records.
pub trait AttendanceReader {
    fn get_attendance(
        &self,
        employee_id: EmployeeId,
        date: NaiveDate,
    ) -> RepositoryResult<Option<AttendanceRecord>>;
    /// Records joined with their employee, newest day first.
    fn list_attendance(
        &self,
        query: AttendanceListQuery,
    ) -> RepositoryResult<Vec<EmployeeAttendance>>;
}

/// Write operations for attendance records.
pub trait AttendanceWriter {
    /// Applies one state-machine transition for `now`'s date atomically.
    ///
    /// Rejections come back as [`RepositoryError::Attendance`] with nothing
    /// written.
    fn record_attendance(
        &self,
        employee_id: EmployeeId,
        kind: AttendanceKind,
        now: NaiveDateTime,
        metadata: &RequestMetadata,
    ) -> RepositoryResult<AttendanceOutcome>;
    /// Idempotent upsert keyed by (employee, date) used by replication.
    fn merge_attendance(
        &self,
        employee_id: EmployeeId,
        merge: &AttendanceMerge,
    ) -> RepositoryResult<AttendanceRecord>;
}

/// Read-only operations for daily tokens.
pub trait TokenReader {
    fn find_active_token(&self, date: NaiveDate) -> RepositoryResult<Option<DailyToken>>;
    fn find_token(&self, token: &str) -> RepositoryResult<Option<DailyToken>>;
    /// Issued tokens, newest first.
    fn list_tokens(&self, limit: usize) -> RepositoryResult<Vec<DailyToken>>;
}

/// Write operations for daily tokens.
pub trait TokenWriter {
    /// Returns the active token for `token.issued_on`, inserting `token` if
    /// there is none. Tokens of earlier days are deactivated.
    fn get_or_insert_token(&self, token: &DailyToken) -> RepositoryResult<DailyToken>;
}

/// Read-only operations for contracts.
pub trait ContractReader {
    fn list_contracts(&self, employee_id: EmployeeId) -> RepositoryResult<Vec<Contract>>;
    /// Active contracts of active employees whose end date falls in `[from, until]`.
    fn list_expiring_contracts(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> RepositoryResult<Vec<ExpiringContract>>;
}

/// Write operations for contracts.
pub trait ContractWriter {
    fn create_contract(&self, contract: &NewContract) -> RepositoryResult<Contract>;
    fn deactivate_contract(&self, id: ContractId) -> RepositoryResult<usize>;
}

/// Read-only operations for the products of one catalog.
pub trait ProductReader {
    /// The catalog this repository serves.
    fn catalog(&self) -> Catalog;
    fn get_product(&self, code: &ProductCode) -> RepositoryResult<Option<Product>>;
    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)>;
    /// Active products with stock whose expiration date falls in `(after, until]`.
    fn list_expiring_products(
        &self,
        after: NaiveDate,
        until: NaiveDate,
    ) -> RepositoryResult<Vec<Product>>;
}

/// Write operations for the products of one catalog. Balances are only
/// changed through [`MovementWriter`].
pub trait ProductWriter {
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product>;
    fn update_product(
        &self,
        code: &ProductCode,
        update: &ProductUpdate,
        now: NaiveDateTime,
    ) -> RepositoryResult<Product>;
    fn deactivate_product(&self, code: &ProductCode, now: NaiveDateTime)
    -> RepositoryResult<usize>;
}

/// Read-only access to the movement ledger.
pub trait MovementReader {
    fn ledger_catalog(&self) -> Catalog;
    /// One page of movements newest-first, strictly older than `before` when set.
    fn list_movements(
        &self,
        filter: &MovementFilter,
        before: Option<MovementId>,
        page_size: usize,
    ) -> RepositoryResult<Vec<Movement>>;
}

/// Append-only access to the movement ledger.
pub trait MovementWriter {
    /// Resolves the product, checks stock, updates the balance and appends the
    /// movement row in one transaction.
    fn append_movement(&self, movement: &NewMovement) -> RepositoryResult<Movement>;
}

/// Read-only operations for alerts.
pub trait AlertReader {
    fn get_alert(&self, id: AlertId) -> RepositoryResult<Option<Alert>>;
    fn find_active_alert(&self, key: &AlertKey) -> RepositoryResult<Option<Alert>>;
    fn count_active_alerts(&self, kind: AlertKind) -> RepositoryResult<usize>;
    /// Alerts newest first.
    fn list_alerts(&self, query: AlertListQuery) -> RepositoryResult<Vec<Alert>>;
    fn list_alert_history(&self, id: AlertId) -> RepositoryResult<Vec<AlertHistoryEntry>>;
}

/// Write operations for alerts.
pub trait AlertWriter {
    fn create_alert(&self, alert: &NewAlert) -> RepositoryResult<Alert>;
    /// Marks an active alert resolved and appends a history row.
    fn resolve_alert(
        &self,
        id: AlertId,
        actor: Option<&str>,
        notes: Option<&str>,
        now: NaiveDateTime,
    ) -> RepositoryResult<Alert>;
    /// Deletes resolved alerts whose resolution predates `cutoff`.
    fn delete_resolved_before(&self, cutoff: NaiveDateTime) -> RepositoryResult<usize>;
}

/// Reachability probe of a store.
pub trait StoreHealth {
    fn store(&self) -> StoreKind;
    fn ping(&self) -> RepositoryResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_pages_offset_by_page_size() {
        let page = |page| Pagination { page, per_page: 50 };
        assert_eq!(page(0).offset_limit(), (0, 50));
        assert_eq!(page(1).offset_limit(), (0, 50));
        assert_eq!(page(3).offset_limit(), (100, 50));
    }

    #[test]
    fn huge_page_saturates_instead_of_overflowing() {
        let pagination = Pagination {
            page: usize::MAX,
            per_page: 50,
        };
        assert_eq!(pagination.offset(), usize::MAX);
        assert_eq!(pagination.offset_limit(), (i64::MAX, 50));
    }
}
