//! Product catalog repository.

use invoicely_core::directory::{DirectoryError, ProductFields, ProductPatch, ProductUpdate};
use invoicely_core::invoice::Actor;
use invoicely_shared::types::{PageRequest, PageResponse};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use super::stats::ProductStats;
use super::{contains_ci, directory_db_error, require_admin};
use crate::entities::{invoice_items, products};

const ENTITY: &str = "Product";

/// An entry of a bulk update that was not applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkUpdateFailure {
    /// Position of the entry in the request, from 0.
    pub index: usize,
    /// The entry's product ID, when it had one.
    pub product_id: Option<Uuid>,
    /// Why it was skipped.
    pub errors: Vec<String>,
}

/// Result of [`ProductRepository::bulk_update`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkUpdateOutcome {
    /// Products written.
    pub updated_count: u64,
    /// Entries skipped, in request order.
    pub errors: Vec<BulkUpdateFailure>,
}

/// Repository for catalog products.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    db: DatabaseConnection,
}

impl ProductRepository {
    /// Creates a new product repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists products ordered by category then name, optionally restricted
    /// to one category.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Database` if the query fails.
    pub async fn list(
        &self,
        category: Option<&str>,
        page: &PageRequest,
    ) -> Result<PageResponse<products::Model>, DirectoryError> {
        let mut query = products::Entity::find();
        if let Some(category) = category {
            query = query.filter(products::Column::Category.eq(category));
        }
        let query = query
            .order_by_asc(products::Column::Category)
            .order_by_asc(products::Column::Name);

        let total = query
            .clone()
            .count(&self.db)
            .await
            .map_err(directory_db_error)?;
        let data = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(directory_db_error)?;

        Ok(PageResponse::new(data, page, total))
    }

    /// Gets a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::NotFound` if there is no such product.
    pub async fn get(&self, id: Uuid) -> Result<products::Model, DirectoryError> {
        products::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(directory_db_error)?
            .ok_or(DirectoryError::NotFound { entity: ENTITY, id })
    }

    /// Case-insensitive search on name, description and category.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Database` if the query fails.
    pub async fn search(&self, query: &str) -> Result<Vec<products::Model>, DirectoryError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        products::Entity::find()
            .filter(
                Condition::any()
                    .add(contains_ci(products::Column::Name, query))
                    .add(contains_ci(products::Column::Description, query))
                    .add(contains_ci(products::Column::Category, query)),
            )
            .order_by_asc(products::Column::Name)
            .all(&self.db)
            .await
            .map_err(directory_db_error)
    }

    /// Distinct non-empty categories in alphabetical order.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Database` if the query fails.
    pub async fn categories(&self) -> Result<Vec<String>, DirectoryError> {
        let categories: Vec<Option<String>> = products::Entity::find()
            .select_only()
            .column(products::Column::Category)
            .distinct()
            .filter(products::Column::Category.is_not_null())
            .order_by_asc(products::Column::Category)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(directory_db_error)?;

        Ok(categories
            .into_iter()
            .flatten()
            .filter(|category| !category.trim().is_empty())
            .collect())
    }

    /// All products in one category, by name.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Database` if the query fails.
    pub async fn by_category(&self, category: &str) -> Result<Vec<products::Model>, DirectoryError> {
        products::Entity::find()
            .filter(products::Column::Category.eq(category))
            .order_by_asc(products::Column::Name)
            .all(&self.db)
            .await
            .map_err(directory_db_error)
    }

    /// Catalog counts and rates per category, with the extreme list prices.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Database` if the query fails.
    pub async fn stats(&self) -> Result<ProductStats, DirectoryError> {
        let rows = products::Entity::find()
            .all(&self.db)
            .await
            .map_err(directory_db_error)?;
        Ok(ProductStats::from_rows(rows))
    }

    /// Creates a product.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Validation` if a field rule is broken.
    pub async fn create(&self, fields: ProductFields) -> Result<products::Model, DirectoryError> {
        DirectoryError::check(fields.validate())?;

        let now = chrono::Utc::now().into();
        let mut product = products::ActiveModel {
            id: Set(Uuid::now_v7()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        product.set_fields(fields);

        let product = product.insert(&self.db).await.map_err(directory_db_error)?;
        tracing::info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }

    /// Applies a patch to a product and validates the result.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::NotFound` or `DirectoryError::Validation`.
    pub async fn update(
        &self,
        id: Uuid,
        patch: &ProductPatch,
    ) -> Result<products::Model, DirectoryError> {
        let existing = self.get(id).await?;
        let fields = patch.apply(&existing.fields());
        DirectoryError::check(fields.validate())?;

        let mut product: products::ActiveModel = existing.into();
        product.set_fields(fields);
        product.updated_at = Set(chrono::Utc::now().into());

        let product = product.update(&self.db).await.map_err(directory_db_error)?;
        tracing::info!(product_id = %id, "Product updated");
        Ok(product)
    }

    /// Deletes a product that no invoice item references. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::InUse` with the number of referencing
    /// invoice items, or `DirectoryError::PermissionDenied` / `NotFound`.
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), DirectoryError> {
        require_admin(actor)?;
        let product = self.get(id).await?;

        let reference_count = invoice_items::Entity::find()
            .filter(invoice_items::Column::ProductId.eq(id))
            .count(&self.db)
            .await
            .map_err(directory_db_error)?;
        if reference_count > 0 {
            return Err(DirectoryError::InUse {
                entity: "product",
                referenced_by: "invoice items",
                reference_count,
            });
        }

        products::Entity::delete_by_id(product.id)
            .exec(&self.db)
            .await
            .map_err(directory_db_error)?;
        tracing::info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// Applies many patches at once. Admin only.
    ///
    /// Each entry is checked on its own: a missing ID, an unknown product or
    /// a patched record that fails validation is reported and skipped while
    /// the rest are written. All writes share one transaction, so a database
    /// failure leaves every product unchanged.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::PermissionDenied` for non-admins and
    /// `DirectoryError::Database` if a query fails.
    pub async fn bulk_update(
        &self,
        actor: &Actor,
        updates: &[ProductUpdate],
    ) -> Result<BulkUpdateOutcome, DirectoryError> {
        require_admin(actor)?;

        let txn = self.db.begin().await.map_err(directory_db_error)?;
        let mut outcome = BulkUpdateOutcome::default();

        for (index, update) in updates.iter().enumerate() {
            let mut skip = |errors: Vec<String>| {
                outcome.errors.push(BulkUpdateFailure {
                    index,
                    product_id: update.id,
                    errors,
                });
            };

            let Some(id) = update.id else {
                skip(vec!["Product ID is required".to_string()]);
                continue;
            };
            let Some(existing) = products::Entity::find_by_id(id)
                .one(&txn)
                .await
                .map_err(directory_db_error)?
            else {
                skip(vec!["Product not found".to_string()]);
                continue;
            };

            let fields = update.patch.apply(&existing.fields());
            let errors = fields.validate();
            if !errors.is_empty() {
                skip(errors);
                continue;
            }

            let mut product: products::ActiveModel = existing.into();
            product.set_fields(fields);
            product.updated_at = Set(chrono::Utc::now().into());
            product.update(&txn).await.map_err(directory_db_error)?;
            outcome.updated_count += 1;
        }

        txn.commit().await.map_err(directory_db_error)?;
        tracing::info!(
            updated = outcome.updated_count,
            skipped = outcome.errors.len(),
            "Products bulk updated"
        );
        Ok(outcome)
    }
}
