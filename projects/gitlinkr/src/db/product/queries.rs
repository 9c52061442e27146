use diesel::prelude::*;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{product::models::*, schema::products::dsl::*, DbError};

#[derive(Debug, Error)]
pub enum InsertProductError {
    #[error("InsertProduct: {source}")]
    InsertProduct {
        #[from]
        source: diesel::result::Error,
    },
}

impl From<InsertProductError> for DbError {
    fn from(err: InsertProductError) -> Self {
        let InsertProductError::InsertProduct { source } = err;
        DbError::Write {
            operation: "InsertProduct",
            source,
        }
    }
}

pub fn insert_product(conn: &mut PgConnection, new: &NewProduct) -> Result<Product, InsertProductError> {
    diesel::insert_into(products)
        .values(new)
        .returning(Product::as_returning())
        .get_result(conn)
        .map_err(|source| InsertProductError::InsertProduct { source })
}

pub fn list_products(conn: &mut PgConnection, owner: Option<&str>) -> QueryResult<Vec<Product>> {
    let mut query = products
        .order(created_at.desc())
        .select(Product::as_select())
        .into_boxed();

    if let Some(owner) = owner {
        query = query.filter(owner_github_login.eq(owner.to_string()));
    }

    query.load(conn)
}

pub fn get_product(conn: &mut PgConnection, product_id: Uuid) -> QueryResult<Option<Product>> {
    products
        .find(product_id)
        .select(Product::as_select())
        .first(conn)
        .optional()
}

#[derive(Debug, Error)]
pub enum UpdateProductError {
    #[error("UpdateProduct: {source}")]
    UpdateProduct {
        #[from]
        source: diesel::result::Error,
    },
}

impl From<UpdateProductError> for DbError {
    fn from(err: UpdateProductError) -> Self {
        let UpdateProductError::UpdateProduct { source } = err;
        DbError::Write {
            operation: "UpdateProduct",
            source,
        }
    }
}

pub fn update_product(
    conn: &mut PgConnection,
    product_id: Uuid,
    changes: &ProductChanges,
) -> Result<Option<Product>, UpdateProductError> {
    diesel::update(products.find(product_id))
        .set(changes)
        .returning(Product::as_returning())
        .get_result(conn)
        .optional()
        .map_err(|source| UpdateProductError::UpdateProduct { source })
}

pub fn delete_product(conn: &mut PgConnection, product_id: Uuid) -> QueryResult<usize> {
    diesel::delete(products.find(product_id)).execute(conn)
}

/// Most recently updated products of `owners`, used as feed events.
pub fn list_recent_by_owners(conn: &mut PgConnection, owners: &[String], limit: i64) -> QueryResult<Vec<Product>> {
    products
        .filter(owner_github_login.eq_any(owners))
        .order(updated_at.desc())
        .limit(limit)
        .select(Product::as_select())
        .load(conn)
}

pub fn list_top_by_mrr(conn: &mut PgConnection, limit: i64) -> QueryResult<Vec<Product>> {
    products
        .order(mrr_usd.desc().nulls_last())
        .limit(limit)
        .select(Product::as_select())
        .load(conn)
}
