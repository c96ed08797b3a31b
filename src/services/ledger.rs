//! Catalog products and the append-only movement ledger.

use chrono::NaiveDateTime;

use crate::domain::movement::{Movement, MovementFilter, NewMovement};
use crate::domain::product::{NewProduct, Product, ProductUpdate, StockSummary};
use crate::domain::types::{MovementKind, ProductCode, Quantity, ResponsibleParty};
use crate::repository::{
    MovementHistory, MovementReader, MovementWriter, ProductListQuery, ProductReader,
    ProductWriter, RepositoryError,
};

use super::{ServiceError, ServiceResult};

/// Products shown per page by list views.
pub const PRODUCTS_PER_PAGE: usize = 50;

fn append<R>(repo: &R, movement: NewMovement) -> ServiceResult<Movement>
where
    R: MovementReader + MovementWriter,
{
    let catalog = repo.ledger_catalog();
    match repo.append_movement(&movement) {
        Ok(appended) => {
            log::info!(
                "Ledger {catalog}: {} {} x{} -> balance {}",
                appended.kind,
                appended.product_code,
                appended.quantity,
                appended.balance_after
            );
            Ok(appended)
        }
        Err(RepositoryError::Ledger(rejection)) => {
            log::info!(
                "Ledger {catalog}: {} {} x{} rejected: {rejection}",
                movement.kind,
                movement.product_code,
                movement.quantity
            );
            Err(rejection.into())
        }
        Err(e) => {
            log::error!("Failed to append movement to {catalog}: {e}");
            Err(e.into())
        }
    }
}

/// Appends a movement built by a caller (form or API).
pub fn append_movement<R>(repo: &R, movement: NewMovement) -> ServiceResult<Movement>
where
    R: MovementReader + MovementWriter,
{
    append(repo, movement)
}

/// Adds `quantity` units of `code` to its catalog.
pub fn append_entry<R>(
    repo: &R,
    code: ProductCode,
    quantity: Quantity,
    responsible: ResponsibleParty,
    notes: Option<String>,
    now: NaiveDateTime,
) -> ServiceResult<Movement>
where
    R: MovementReader + MovementWriter,
{
    append(
        repo,
        NewMovement {
            product_code: code,
            kind: MovementKind::Entry,
            quantity,
            responsible,
            notes,
            moved_at: now,
        },
    )
}

/// Removes `quantity` units of `code`; fails when the balance cannot cover it.
pub fn append_exit<R>(
    repo: &R,
    code: ProductCode,
    quantity: Quantity,
    responsible: ResponsibleParty,
    notes: Option<String>,
    now: NaiveDateTime,
) -> ServiceResult<Movement>
where
    R: MovementReader + MovementWriter,
{
    append(
        repo,
        NewMovement {
            product_code: code,
            kind: MovementKind::Exit,
            quantity,
            responsible,
            notes,
            moved_at: now,
        },
    )
}

/// Lazy newest-first view of the ledger.
pub fn history<R>(repo: &R, filter: MovementFilter) -> MovementHistory<'_, R>
where
    R: MovementReader,
{
    MovementHistory::new(repo, filter)
}

/// Collects [`history`] into a vector, for callers that need it all at once.
pub fn collect_history<R>(repo: &R, filter: MovementFilter) -> ServiceResult<Vec<Movement>>
where
    R: MovementReader,
{
    history(repo, filter)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| {
            log::error!("Failed to read {} ledger: {e}", repo.ledger_catalog());
            e.into()
        })
}

pub fn stock_summary<R>(repo: &R) -> ServiceResult<StockSummary>
where
    R: ProductReader,
{
    match repo.list_products(ProductListQuery::default().active()) {
        Ok((_, products)) => Ok(StockSummary::from_products(repo.catalog(), &products)),
        Err(e) => {
            log::error!("Failed to list {} products: {e}", repo.catalog());
            Err(e.into())
        }
    }
}

pub fn create_product<R>(repo: &R, product: &NewProduct) -> ServiceResult<Product>
where
    R: ProductReader + ProductWriter,
{
    if product.details.catalog() != repo.catalog() {
        return Err(ServiceError::Form(format!(
            "el producto no corresponde al catálogo {}",
            repo.catalog()
        )));
    }

    match repo.create_product(product) {
        Ok(created) => {
            log::info!("Created product {} in {}", created.code, repo.catalog());
            Ok(created)
        }
        Err(RepositoryError::ConstraintViolation(_)) => Err(ServiceError::Form(format!(
            "ya existe un producto con código {}",
            product.code
        ))),
        Err(e) => {
            log::error!("Failed to create product: {e}");
            Err(e.into())
        }
    }
}

pub fn get_product<R>(repo: &R, code: &ProductCode) -> ServiceResult<Product>
where
    R: ProductReader,
{
    match repo.get_product(code) {
        Ok(Some(product)) => Ok(product),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get product {code}: {e}");
            Err(e.into())
        }
    }
}

/// One page of products and the total number of matches.
pub fn list_products<R>(
    repo: &R,
    active_only: bool,
    search: Option<&str>,
    page: usize,
) -> ServiceResult<(usize, Vec<Product>)>
where
    R: ProductReader,
{
    let mut query = ProductListQuery::default().paginate(page, PRODUCTS_PER_PAGE);
    if active_only {
        query = query.active();
    }
    if let Some(search) = search {
        query = query.search(search);
    }
    repo.list_products(query).map_err(|e| {
        log::error!("Failed to list {} products: {e}", repo.catalog());
        e.into()
    })
}

/// Edits a product's attributes. The balance is untouched.
pub fn update_product<R>(
    repo: &R,
    code: &ProductCode,
    update: &ProductUpdate,
    now: NaiveDateTime,
) -> ServiceResult<Product>
where
    R: ProductReader + ProductWriter,
{
    if update.details.catalog() != repo.catalog() {
        return Err(ServiceError::Form(format!(
            "el producto no corresponde al catálogo {}",
            repo.catalog()
        )));
    }

    repo.update_product(code, update, now).map_err(|e| {
        if !matches!(e, RepositoryError::NotFound) {
            log::error!("Failed to update product {code}: {e}");
        }
        e.into()
    })
}

pub fn deactivate_product<R>(repo: &R, code: &ProductCode, now: NaiveDateTime) -> ServiceResult<()>
where
    R: ProductWriter,
{
    match repo.deactivate_product(code, now) {
        Ok(0) => Err(ServiceError::NotFound),
        Ok(_) => Ok(()),
        Err(e) => {
            log::error!("Failed to deactivate product {code}: {e}");
            Err(e.into())
        }
    }
}
