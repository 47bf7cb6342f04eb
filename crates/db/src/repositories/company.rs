//! Company repository.

use invoicely_core::directory::{CompanyFields, CompanyPatch, DirectoryError};
use invoicely_core::invoice::{Actor, InvoiceStatus};
use invoicely_shared::types::{PageRequest, PageResponse};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use super::stats::CompanyStats;
use super::{contains_ci, directory_db_error, require_admin};
use crate::entities::{companies, invoices, sea_orm_active_enums};

const ENTITY: &str = "Company";

/// Repository for issuing companies.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    db: DatabaseConnection,
}

impl CompanyRepository {
    /// Creates a new company repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists companies ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Database` if the query fails.
    pub async fn list(
        &self,
        page: &PageRequest,
    ) -> Result<PageResponse<companies::Model>, DirectoryError> {
        let query = companies::Entity::find().order_by_asc(companies::Column::Name);
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

    /// Gets a company by ID.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::NotFound` if there is no such company.
    pub async fn get(&self, id: Uuid) -> Result<companies::Model, DirectoryError> {
        companies::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(directory_db_error)?
            .ok_or(DirectoryError::NotFound { entity: ENTITY, id })
    }

    /// Case-insensitive search on name, city and state. A blank query
    /// matches nothing.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Database` if the query fails.
    pub async fn search(&self, query: &str) -> Result<Vec<companies::Model>, DirectoryError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        companies::Entity::find()
            .filter(
                Condition::any()
                    .add(contains_ci(companies::Column::Name, query))
                    .add(contains_ci(companies::Column::City, query))
                    .add(contains_ci(companies::Column::State, query)),
            )
            .order_by_asc(companies::Column::Name)
            .all(&self.db)
            .await
            .map_err(directory_db_error)
    }

    /// Company counts: total, invoiced, and per state.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Database` if a query fails.
    pub async fn stats(&self) -> Result<CompanyStats, DirectoryError> {
        let states: Vec<Option<String>> = companies::Entity::find()
            .select_only()
            .column(companies::Column::State)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(directory_db_error)?;
        let invoiced: Vec<Uuid> = invoices::Entity::find()
            .select_only()
            .column(invoices::Column::CompanyId)
            .filter(invoices::Column::CompanyId.is_not_null())
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(directory_db_error)?;

        Ok(CompanyStats::from_rows(states, invoiced))
    }

    /// Creates a company. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::PermissionDenied` for non-admins and
    /// `DirectoryError::Validation` if a field rule is broken.
    pub async fn create(
        &self,
        actor: &Actor,
        fields: CompanyFields,
    ) -> Result<companies::Model, DirectoryError> {
        require_admin(actor)?;
        DirectoryError::check(fields.validate())?;

        let now = chrono::Utc::now().into();
        let mut company = companies::ActiveModel {
            id: Set(Uuid::now_v7()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        company.set_fields(fields);

        let company = company.insert(&self.db).await.map_err(directory_db_error)?;
        tracing::info!(company_id = %company.id, name = %company.name, "Company created");
        Ok(company)
    }

    /// Applies a patch to a company. Admin only. The patched record is
    /// validated as a whole before anything is written.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::PermissionDenied`, `DirectoryError::NotFound`
    /// or `DirectoryError::Validation`.
    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: &CompanyPatch,
    ) -> Result<companies::Model, DirectoryError> {
        require_admin(actor)?;
        let existing = self.get(id).await?;
        let fields = patch.apply(&existing.fields());
        DirectoryError::check(fields.validate())?;

        let mut company: companies::ActiveModel = existing.into();
        company.set_fields(fields);
        company.updated_at = Set(chrono::Utc::now().into());

        let company = company.update(&self.db).await.map_err(directory_db_error)?;
        tracing::info!(company_id = %id, "Company updated");
        Ok(company)
    }

    /// Deletes a company that no invoice references. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::InUse` with the number of referencing
    /// invoices, or `DirectoryError::PermissionDenied` / `NotFound`.
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), DirectoryError> {
        require_admin(actor)?;
        let company = self.get(id).await?;

        let reference_count = invoices::Entity::find()
            .filter(invoices::Column::CompanyId.eq(id))
            .count(&self.db)
            .await
            .map_err(directory_db_error)?;
        if reference_count > 0 {
            return Err(DirectoryError::InUse {
                entity: "company",
                referenced_by: "invoices",
                reference_count,
            });
        }

        companies::Entity::delete_by_id(company.id)
            .exec(&self.db)
            .await
            .map_err(directory_db_error)?;
        tracing::info!(company_id = %id, "Company deleted");
        Ok(())
    }

    /// Invoices issued by a company, newest first, optionally by status.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::NotFound` if there is no such company.
    pub async fn invoices(
        &self,
        id: Uuid,
        status: Option<InvoiceStatus>,
        page: &PageRequest,
    ) -> Result<PageResponse<invoices::Model>, DirectoryError> {
        self.get(id).await?;

        let mut query = invoices::Entity::find().filter(invoices::Column::CompanyId.eq(id));
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
