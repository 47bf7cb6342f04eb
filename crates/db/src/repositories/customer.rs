//! Customer repository.

use invoicely_core::directory::{CustomerFields, CustomerPatch, DirectoryError};
use invoicely_core::invoice::{Actor, InvoiceStatus};
use invoicely_shared::types::{PageRequest, PageResponse};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::stats::CustomerStats;
use super::{contains_ci, directory_db_error, require_admin};
use crate::entities::{customers, invoices, sea_orm_active_enums};

const ENTITY: &str = "Customer";

/// Repository for billed customers.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    db: DatabaseConnection,
}

impl CustomerRepository {
    /// Creates a new customer repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists customers ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Database` if the query fails.
    pub async fn list(
        &self,
        page: &PageRequest,
    ) -> Result<PageResponse<customers::Model>, DirectoryError> {
        let query = customers::Entity::find().order_by_asc(customers::Column::Name);
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

    /// Gets a customer by ID.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::NotFound` if there is no such customer.
    pub async fn get(&self, id: Uuid) -> Result<customers::Model, DirectoryError> {
        customers::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(directory_db_error)?
            .ok_or(DirectoryError::NotFound { entity: ENTITY, id })
    }

    /// Case-insensitive search on name, city, state and contact person.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Database` if the query fails.
    pub async fn search(&self, query: &str) -> Result<Vec<customers::Model>, DirectoryError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        customers::Entity::find()
            .filter(
                Condition::any()
                    .add(contains_ci(customers::Column::Name, query))
                    .add(contains_ci(customers::Column::City, query))
                    .add(contains_ci(customers::Column::State, query))
                    .add(contains_ci(customers::Column::ContactPerson, query)),
            )
            .order_by_asc(customers::Column::Name)
            .all(&self.db)
            .await
            .map_err(directory_db_error)
    }

    /// Customer counts per state plus the customers with the most invoices.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Database` if a query fails.
    pub async fn stats(&self) -> Result<CustomerStats, DirectoryError> {
        let rows: Vec<(Uuid, String, Option<String>)> = customers::Entity::find()
            .select_only()
            .column(customers::Column::Id)
            .column(customers::Column::Name)
            .column(customers::Column::State)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(directory_db_error)?;
        let invoiced: Vec<Uuid> = invoices::Entity::find()
            .select_only()
            .column(invoices::Column::CustomerId)
            .filter(invoices::Column::CustomerId.is_not_null())
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(directory_db_error)?;

        Ok(CustomerStats::from_rows(rows, invoiced))
    }

    /// Creates a customer.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Validation` if a field rule is broken.
    pub async fn create(&self, fields: CustomerFields) -> Result<customers::Model, DirectoryError> {
        DirectoryError::check(fields.validate())?;

        let now = chrono::Utc::now().into();
        let mut customer = customers::ActiveModel {
            id: Set(Uuid::now_v7()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        customer.set_fields(fields);

        let customer = customer.insert(&self.db).await.map_err(directory_db_error)?;
        tracing::info!(customer_id = %customer.id, name = %customer.name, "Customer created");
        Ok(customer)
    }

    /// Applies a patch to a customer and validates the result.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::NotFound` or `DirectoryError::Validation`.
    pub async fn update(
        &self,
        id: Uuid,
        patch: &CustomerPatch,
    ) -> Result<customers::Model, DirectoryError> {
        let existing = self.get(id).await?;
        let fields = patch.apply(&existing.fields());
        DirectoryError::check(fields.validate())?;

        let mut customer: customers::ActiveModel = existing.into();
        customer.set_fields(fields);
        customer.updated_at = Set(chrono::Utc::now().into());

        let customer = customer.update(&self.db).await.map_err(directory_db_error)?;
        tracing::info!(customer_id = %id, "Customer updated");
        Ok(customer)
    }

    /// Deletes a customer that no invoice references. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::InUse` with the number of referencing
    /// invoices, or `DirectoryError::PermissionDenied` / `NotFound`.
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), DirectoryError> {
        require_admin(actor)?;
        let customer = self.get(id).await?;

        let reference_count = invoices::Entity::find()
            .filter(invoices::Column::CustomerId.eq(id))
            .count(&self.db)
            .await
            .map_err(directory_db_error)?;
        if reference_count > 0 {
            return Err(DirectoryError::InUse {
                entity: "customer",
                referenced_by: "invoices",
                reference_count,
            });
        }

        customers::Entity::delete_by_id(customer.id)
            .exec(&self.db)
            .await
            .map_err(directory_db_error)?;
        tracing::info!(customer_id = %id, "Customer deleted");
        Ok(())
    }

    /// Invoices billed to a customer, newest first, optionally by status.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::NotFound` if there is no such customer.
    pub async fn invoices(
        &self,
        id: Uuid,
        status: Option<InvoiceStatus>,
        page: &PageRequest,
    ) -> Result<PageResponse<invoices::Model>, DirectoryError> {
        self.get(id).await?;

        let mut query = invoices::Entity::find().filter(invoices::Column::CustomerId.eq(id));
        if let Some(status) = status {
            query = query.filter(
                invoices::Column::Status.eq(sea_orm_active_enums::InvoiceStatus::from(status)),
            );
        }
        let query = query.order_by_desc(invoices::Column::CreatedAt);

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
}
