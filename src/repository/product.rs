use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::product::{NewProduct, Product, ProductUpdate};
use crate::domain::types::{Catalog, ProductCode};
use crate::models::product::{
    NewProduct as DbNewProduct, Product as DbProduct, ProductChangeset,
};
use crate::repository::{
    DieselCatalogRepository, ProductListQuery, ProductReader, ProductWriter, RepositoryError,
    RepositoryResult,
};

impl ProductReader for DieselCatalogRepository {
    fn catalog(&self) -> Catalog {
        self.catalog
    }

    fn get_product(&self, code: &ProductCode) -> RepositoryResult<Option<Product>> {
        use crate::schema::catalog::products;

        let mut conn = self.conn()?;

        let product = products::table
            .filter(products::code.eq(code.as_str()))
            .first::<DbProduct>(&mut conn)
            .optional()?;

        Ok(product
            .map(|p| p.into_domain(self.catalog))
            .transpose()?)
    }

    fn list_products(&self, query: ProductListQuery) -> RepositoryResult<(usize, Vec<Product>)> {
        use crate::schema::catalog::products;

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = products::table.into_boxed::<diesel::sqlite::Sqlite>();

            if query.active_only {
                items = items.filter(products::active.eq(true));
            }

            if query.with_min_stock {
                items = items.filter(products::min_stock.gt(0));
            }

            if let Some(search) = query.search.as_deref().map(str::trim) {
                if !search.is_empty() {
                    let pattern = format!("%{search}%");
                    items = items.filter(
                        products::name
                            .like(pattern.clone())
                            .or(products::code.like(pattern)),
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
            .order(products::code.asc())
            .load::<DbProduct>(&mut conn)?
            .into_iter()
            .map(|p| p.into_domain(self.catalog))
            .collect::<Result<Vec<Product>, _>>()?;

        Ok((total, items))
    }

    fn list_expiring_products(
        &self,
        after: NaiveDate,
        until: NaiveDate,
    ) -> RepositoryResult<Vec<Product>> {
        use crate::schema::catalog::products;

        let mut conn = self.conn()?;

        let items = products::table
            .filter(products::active.eq(true))
            .filter(products::balance.gt(0))
            .filter(products::expiration_date.gt(after))
            .filter(products::expiration_date.le(until))
            .order(products::expiration_date.asc())
            .load::<DbProduct>(&mut conn)?
            .into_iter()
            .map(|p| p.into_domain(self.catalog))
            .collect::<Result<Vec<Product>, _>>()?;

        Ok(items)
    }
}

impl ProductWriter for DieselCatalogRepository {
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product> {
        use crate::schema::catalog::products;

        if product.details.catalog() != self.catalog {
            return Err(RepositoryError::ValidationError(format!(
                "product details do not belong to catalog {}",
                self.catalog
            )));
        }

        let mut conn = self.conn()?;
        let db_product: DbNewProduct = product.clone().into();

        let created = diesel::insert_into(products::table)
            .values(db_product)
            .get_result::<DbProduct>(&mut conn)?;

        Ok(created.into_domain(self.catalog)?)
    }

    fn update_product(
        &self,
        code: &ProductCode,
        update: &ProductUpdate,
        now: NaiveDateTime,
    ) -> RepositoryResult<Product> {
        use crate::schema::catalog::products;

        if update.details.catalog() != self.catalog {
            return Err(RepositoryError::ValidationError(format!(
                "product details do not belong to catalog {}",
                self.catalog
            )));
        }

        let mut conn = self.conn()?;
        let changeset = ProductChangeset::new(update.clone(), now);

        let updated = diesel::update(products::table.filter(products::code.eq(code.as_str())))
            .set(changeset)
            .get_result::<DbProduct>(&mut conn)
            .optional()?
            .ok_or(RepositoryError::NotFound)?;

        Ok(updated.into_domain(self.catalog)?)
    }

    fn deactivate_product(
        &self,
        code: &ProductCode,
        now: NaiveDateTime,
    ) -> RepositoryResult<usize> {
        use crate::schema::catalog::products;

        let mut conn = self.conn()?;

        let affected = diesel::update(products::table.filter(products::code.eq(code.as_str())))
            .set((products::active.eq(false), products::updated_at.eq(now)))
            .execute(&mut conn)?;

        Ok(affected)
    }
}
