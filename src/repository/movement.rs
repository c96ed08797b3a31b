use std::collections::VecDeque;

use diesel::prelude::*;

use crate::domain::movement::{
    LedgerRejection, Movement, MovementFilter, NewMovement, next_balance,
};
use crate::domain::types::{Balance, Catalog, MovementId};
use crate::models::movement::{Movement as DbMovement, NewMovement as DbNewMovement};
use crate::models::product::Product as DbProduct;
use crate::repository::{
    DieselCatalogRepository, MovementReader, MovementWriter, RepositoryError, RepositoryResult,
};

/// Rows fetched per round trip by [`MovementHistory`].
pub const HISTORY_PAGE_SIZE: usize = 100;

impl MovementReader for DieselCatalogRepository {
    fn ledger_catalog(&self) -> Catalog {
        self.catalog
    }

    fn list_movements(
        &self,
        filter: &MovementFilter,
        before: Option<MovementId>,
        page_size: usize,
    ) -> RepositoryResult<Vec<Movement>> {
        use crate::schema::catalog::movements;

        let mut conn = self.conn()?;

        let mut items = movements::table.into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(code) = &filter.product_code {
            items = items.filter(movements::product_code.eq(code.as_str().to_string()));
        }
        if let Some(kind) = filter.kind {
            items = items.filter(movements::kind.eq(kind.as_str()));
        }
        if let Some(from) = filter.from {
            items = items.filter(movements::moved_at.ge(from));
        }
        if let Some(to) = filter.to {
            items = items.filter(movements::moved_at.le(to));
        }
        if let Some(before) = before {
            items = items.filter(movements::id.lt(before.get()));
        }

        let items = items
            .order(movements::id.desc())
            .limit(page_size as i64)
            .load::<DbMovement>(&mut conn)?
            .into_iter()
            .map(|m| m.into_domain(self.catalog))
            .collect::<Result<Vec<Movement>, _>>()?;

        Ok(items)
    }
}

impl MovementWriter for DieselCatalogRepository {
    fn append_movement(&self, movement: &NewMovement) -> RepositoryResult<Movement> {
        use crate::schema::catalog::{movements, products};

        let mut conn = self.conn()?;

        let appended = conn.immediate_transaction::<_, RepositoryError, _>(|conn| {
            let product = products::table
                .filter(products::code.eq(movement.product_code.as_str()))
                .filter(products::active.eq(true))
                .first::<DbProduct>(conn)
                .optional()?
                .ok_or_else(|| {
                    LedgerRejection::UnknownProduct(movement.product_code.to_string())
                })?;

            let before = Balance::new(product.balance)?;
            let after = next_balance(movement.kind, before, movement.quantity)?;

            diesel::update(products::table.find(product.id))
                .set((
                    products::balance.eq(after.get()),
                    products::updated_at.eq(movement.moved_at),
                ))
                .execute(conn)?;

            let row = diesel::insert_into(movements::table)
                .values(DbNewMovement {
                    product_code: &product.code,
                    product_name: &product.name,
                    kind: movement.kind.as_str(),
                    quantity: movement.quantity.get(),
                    moved_at: movement.moved_at,
                    balance_before: before.get(),
                    balance_after: after.get(),
                    responsible: movement.responsible.as_str(),
                    notes: movement.notes.as_deref(),
                })
                .get_result::<DbMovement>(conn)?;

            Ok(row)
        })?;

        Ok(appended.into_domain(self.catalog)?)
    }
}

/// Lazy newest-first walk over a catalog's ledger.
///
/// Pages are fetched by keyset on the movement ID, so rows appended while the
/// walk is in progress never shift the pages still to come.
pub struct MovementHistory<'a, R: MovementReader + ?Sized> {
    reader: &'a R,
    filter: MovementFilter,
    page_size: usize,
    before: Option<MovementId>,
    remaining: Option<usize>,
    buffer: VecDeque<Movement>,
    exhausted: bool,
}

impl<'a, R: MovementReader + ?Sized> MovementHistory<'a, R> {
    pub fn new(reader: &'a R, filter: MovementFilter) -> Self {
        Self::with_page_size(reader, filter, HISTORY_PAGE_SIZE)
    }

    pub fn with_page_size(reader: &'a R, filter: MovementFilter, page_size: usize) -> Self {
        let remaining = filter.limit;
        Self {
            reader,
            filter,
            page_size: page_size.max(1),
            before: None,
            remaining,
            buffer: VecDeque::new(),
            exhausted: false,
        }
    }

    fn fetch_page(&mut self) -> RepositoryResult<()> {
        let size = match self.remaining {
            Some(remaining) => remaining.min(self.page_size),
            None => self.page_size,
        };
        let page = self.reader.list_movements(&self.filter, self.before, size)?;
        if page.len() < size {
            self.exhausted = true;
        }
        self.before = page.last().map(|m| m.id);
        self.buffer.extend(page);
        Ok(())
    }
}

impl<R: MovementReader + ?Sized> Iterator for MovementHistory<'_, R> {
    type Item = RepositoryResult<Movement>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == Some(0) {
            return None;
        }

        if self.buffer.is_empty() && !self.exhausted {
            if let Err(e) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }

        let movement = self.buffer.pop_front()?;
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining -= 1;
        }
        Some(Ok(movement))
    }
}
