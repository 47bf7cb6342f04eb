//! Invoice repository.
//!
//! Every mutating operation runs inside one database transaction and ends by
//! recomputing the invoice totals from the items as stored, so a caller never
//! observes an invoice whose totals disagree with its items.

use chrono::NaiveDate;
use invoicely_core::invoice::{
    Actor, InvoiceError, InvoiceHeader, InvoiceInput, InvoicePatch, InvoiceStatus, InvoiceTotals,
    ItemPatch, ItemSpec, LineItem, build_items, can_delete, can_edit, month_prefix,
    next_invoice_number,
};
use invoicely_shared::types::{PageRequest, PageResponse};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, SqlErr, TransactionTrait,
};
use serde::Serialize;
use uuid::Uuid;

use super::stats::InvoiceStats;
use super::{contains_ci, invoice_db_error};
use crate::entities::{companies, customers, invoice_items, invoices, products, sea_orm_active_enums};

/// Attempts at allocating a fresh number before giving up.
pub const DEFAULT_NUMBER_RETRY_ATTEMPTS: u32 = 5;

/// An invoice header with its items in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvoiceWithItems {
    /// Header row.
    #[serde(flatten)]
    pub invoice: invoices::Model,
    /// Item rows.
    pub items: Vec<invoice_items::Model>,
}

/// Result of a single-item change: the item and the refreshed totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemChange {
    /// The item as stored.
    pub item: invoice_items::Model,
    /// Invoice totals after recalculation.
    pub totals: InvoiceTotals,
}

/// Filter options for listing invoices.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    /// Only this status.
    pub status: Option<InvoiceStatus>,
    /// Only this customer.
    pub customer_id: Option<Uuid>,
    /// Only this company.
    pub company_id: Option<Uuid>,
    /// Dated on or after.
    pub date_from: Option<NaiveDate>,
    /// Dated on or before.
    pub date_to: Option<NaiveDate>,
}

/// Repository for the invoice aggregate.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    db: DatabaseConnection,
    number_retry_attempts: u32,
}

impl InvoiceRepository {
    /// Creates a new invoice repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self {
            db,
            number_retry_attempts: DEFAULT_NUMBER_RETRY_ATTEMPTS,
        }
    }

    /// Sets how many times a colliding auto-allocated number is retried.
    #[must_use]
    pub const fn with_number_retry_attempts(mut self, attempts: u32) -> Self {
        self.number_retry_attempts = if attempts == 0 { 1 } else { attempts };
        self
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Gets an invoice with its items.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::NotFound` if there is no such invoice.
    pub async fn get(&self, id: Uuid) -> Result<InvoiceWithItems, InvoiceError> {
        let invoice = find_invoice(&self.db, id).await?;
        let items = load_items(&self.db, id).await?;
        Ok(InvoiceWithItems { invoice, items })
    }

    /// Lists invoices, newest first.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::Database` if the query fails.
    pub async fn list(
        &self,
        filter: &InvoiceFilter,
        page: &PageRequest,
    ) -> Result<PageResponse<invoices::Model>, InvoiceError> {
        let mut query = invoices::Entity::find();
        if let Some(status) = filter.status {
            query = query.filter(
                invoices::Column::Status.eq(sea_orm_active_enums::InvoiceStatus::from(status)),
            );
        }
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(invoices::Column::CustomerId.eq(customer_id));
        }
        if let Some(company_id) = filter.company_id {
            query = query.filter(invoices::Column::CompanyId.eq(company_id));
        }
        if let Some(date_from) = filter.date_from {
            query = query.filter(invoices::Column::InvoiceDate.gte(date_from));
        }
        if let Some(date_to) = filter.date_to {
            query = query.filter(invoices::Column::InvoiceDate.lte(date_to));
        }
        let query = query
            .order_by_desc(invoices::Column::InvoiceDate)
            .order_by_desc(invoices::Column::Id);

        let total = query
            .clone()
            .count(&self.db)
            .await
            .map_err(invoice_db_error)?;
        let data = query
            .offset(page.offset())
            .limit(page.limit())
            .all(&self.db)
            .await
            .map_err(invoice_db_error)?;

        tracing::debug!(total, "Listed invoices");
        Ok(PageResponse::new(data, page, total))
    }

    /// Case-insensitive search on invoice number and PO number.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::Database` if the query fails.
    pub async fn search(&self, query: &str) -> Result<Vec<invoices::Model>, InvoiceError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        invoices::Entity::find()
            .filter(
                Condition::any()
                    .add(contains_ci(invoices::Column::InvoiceNumber, query))
                    .add(contains_ci(invoices::Column::PoNumber, query)),
            )
            .order_by_desc(invoices::Column::InvoiceDate)
            .all(&self.db)
            .await
            .map_err(invoice_db_error)
    }

    /// Items of an invoice in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::NotFound` if there is no such invoice.
    pub async fn list_items(&self, id: Uuid) -> Result<Vec<invoice_items::Model>, InvoiceError> {
        find_invoice(&self.db, id).await?;
        load_items(&self.db, id).await
    }

    /// The number the next auto-numbered invoice dated `today` would get.
    /// Nothing is reserved.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::MalformedInvoiceNumber` if the month's highest
    /// sequence cannot be incremented.
    pub async fn next_number(&self, today: NaiveDate) -> Result<String, InvoiceError> {
        next_number_in(&self.db, today).await
    }

    /// Statistics over every invoice, with monthly figures for `year`.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::Database` if the query fails.
    pub async fn stats(&self, year: i32) -> Result<InvoiceStats, InvoiceError> {
        let rows: Vec<(sea_orm_active_enums::InvoiceStatus, NaiveDate, Decimal)> =
            invoices::Entity::find()
                .select_only()
                .column(invoices::Column::Status)
                .column(invoices::Column::InvoiceDate)
                .column(invoices::Column::TotalAmount)
                .into_tuple()
                .all(&self.db)
                .await
                .map_err(invoice_db_error)?;

        Ok(InvoiceStats::from_rows(
            year,
            rows.into_iter()
                .map(|(status, date, total)| (status.into(), date, total)),
        ))
    }

    // ========================================================================
    // Aggregate writes
    // ========================================================================

    /// Creates an invoice with its items.
    ///
    /// Dates are parsed and the header and every item are validated before
    /// anything is written. Without an explicit number the next one for the
    /// month is allocated, retrying if a concurrent writer took it first.
    ///
    /// # Errors
    ///
    /// - `InvoiceError::Validation` / `InvalidDate` for bad input
    /// - `InvoiceError::NotFound` for an unknown customer, company or product
    /// - `InvoiceError::DuplicateInvoiceNumber` if an explicit number is taken
    /// - `InvoiceError::NumberAllocationExhausted` after repeated collisions
    pub async fn create(
        &self,
        actor: &Actor,
        input: InvoiceInput,
        today: NaiveDate,
    ) -> Result<InvoiceWithItems, InvoiceError> {
        if !actor.is_active {
            return Err(InvoiceError::PermissionDenied);
        }

        let new_invoice = input.prepare(today)?;
        ensure_references(&self.db, &new_invoice.header, &new_invoice.items).await?;

        let created = if new_invoice.needs_number() {
            self.insert_with_fresh_number(new_invoice.header, new_invoice.items, today)
                .await?
        } else {
            let txn = self.db.begin().await.map_err(invoice_db_error)?;
            let created = insert_aggregate(&txn, new_invoice.header, new_invoice.items).await?;
            txn.commit().await.map_err(invoice_db_error)?;
            created
        };

        tracing::info!(
            invoice_id = %created.invoice.id,
            invoice_number = %created.invoice.invoice_number,
            user_id = %actor.user_id,
            "Invoice created"
        );
        Ok(created)
    }

    /// Updates the header and, when `patch.items` is present, replaces every
    /// item.
    ///
    /// # Errors
    ///
    /// - `InvoiceError::PermissionDenied` if the gate refuses the edit
    /// - `InvoiceError::Validation` / `InvalidDate` for bad input
    /// - `InvoiceError::DuplicateInvoiceNumber` if the new number is taken
    pub async fn update(
        &self,
        actor: &Actor,
        id: Uuid,
        patch: InvoicePatch,
        today: NaiveDate,
    ) -> Result<InvoiceWithItems, InvoiceError> {
        let txn = self.db.begin().await.map_err(invoice_db_error)?;
        let invoice = find_invoice(&txn, id).await?;
        ensure_editable(actor, &invoice)?;

        let header = patch.apply(&invoice.header(), today);
        let items = patch.items.map(build_items).transpose();
        let (header, items) = match (header, items) {
            (Ok(header), Ok(items)) => (header, items),
            (Err(InvoiceError::Validation(mut errors)), Err(InvoiceError::Validation(more))) => {
                errors.extend(more);
                return Err(InvoiceError::Validation(errors));
            }
            (Err(e), _) | (_, Err(e)) => return Err(e),
        };
        ensure_references(&txn, &header, items.as_deref().unwrap_or_default()).await?;

        let number = header.invoice_number.clone();
        let mut active: invoices::ActiveModel = invoice.into();
        active.set_header(header);
        active.updated_at = Set(chrono::Utc::now().into());
        active
            .update(&txn)
            .await
            .map_err(|e| duplicate_or_db_error(e, &number))?;

        if let Some(items) = items {
            replace_items(&txn, id, items)
                .await
                .map_err(invoice_db_error)?;
        }
        let invoice = recalculate_in(&txn, id).await?;
        let items = load_items(&txn, id).await?;
        txn.commit().await.map_err(invoice_db_error)?;

        tracing::info!(invoice_id = %id, user_id = %actor.user_id, "Invoice updated");
        Ok(InvoiceWithItems { invoice, items })
    }

    /// Deletes an invoice and its items.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::PermissionDenied` if the gate refuses, or
    /// `InvoiceError::NotFound`.
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<(), InvoiceError> {
        let txn = self.db.begin().await.map_err(invoice_db_error)?;
        let invoice = find_invoice(&txn, id).await?;
        if !can_delete(actor, invoice.status.into()) {
            return Err(InvoiceError::PermissionDenied);
        }

        invoice_items::Entity::delete_many()
            .filter(invoice_items::Column::InvoiceId.eq(id))
            .exec(&txn)
            .await
            .map_err(invoice_db_error)?;
        invoices::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .map_err(invoice_db_error)?;
        txn.commit().await.map_err(invoice_db_error)?;

        tracing::info!(invoice_id = %id, user_id = %actor.user_id, "Invoice deleted");
        Ok(())
    }

    /// Sets the status. Any status may follow any other, and the edit gate
    /// is not consulted.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::InvalidStatus` for an unknown status string or
    /// `InvoiceError::NotFound`.
    pub async fn update_status(
        &self,
        id: Uuid,
        status: &str,
    ) -> Result<invoices::Model, InvoiceError> {
        let status = InvoiceStatus::parse(status)
            .ok_or_else(|| InvoiceError::InvalidStatus(status.to_string()))?;
        let invoice = find_invoice(&self.db, id).await?;
        let previous: InvoiceStatus = invoice.status.into();

        let mut active: invoices::ActiveModel = invoice.into();
        active.status = Set(status.into());
        active.updated_at = Set(chrono::Utc::now().into());
        let invoice = active.update(&self.db).await.map_err(invoice_db_error)?;

        tracing::info!(invoice_id = %id, from = %previous, to = %status, "Invoice status changed");
        Ok(invoice)
    }

    /// Recomputes every item amount and then the invoice totals. Running it
    /// twice in a row changes nothing the second time.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::NotFound` if there is no such invoice.
    pub async fn recalculate(&self, id: Uuid) -> Result<InvoiceWithItems, InvoiceError> {
        let txn = self.db.begin().await.map_err(invoice_db_error)?;
        find_invoice(&txn, id).await?;

        for item in load_items(&txn, id).await? {
            let mut line = item.line_item();
            let amount = line.recompute_amount()?;
            if amount != item.amount {
                let mut active: invoice_items::ActiveModel = item.into();
                active.amount = Set(amount);
                active.update(&txn).await.map_err(invoice_db_error)?;
            }
        }
        let invoice = recalculate_in(&txn, id).await?;
        let items = load_items(&txn, id).await?;
        txn.commit().await.map_err(invoice_db_error)?;

        tracing::debug!(invoice_id = %id, total = %invoice.total_amount, "Invoice recalculated");
        Ok(InvoiceWithItems { invoice, items })
    }

    /// Copies an invoice as a new draft dated `today` with a fresh number.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::NotFound` for an unknown source invoice or
    /// `InvoiceError::NumberAllocationExhausted`.
    pub async fn duplicate(
        &self,
        actor: &Actor,
        id: Uuid,
        today: NaiveDate,
    ) -> Result<InvoiceWithItems, InvoiceError> {
        let source = self.get(id).await?;
        let header = source.invoice.header().duplicate(String::new(), today);
        let items = source
            .items
            .iter()
            .map(invoice_items::Model::line_item)
            .collect();

        let copy = self.insert_with_fresh_number(header, items, today).await?;
        tracing::info!(
            source_id = %id,
            invoice_id = %copy.invoice.id,
            invoice_number = %copy.invoice.invoice_number,
            user_id = %actor.user_id,
            "Invoice duplicated"
        );
        Ok(copy)
    }

    // ========================================================================
    // Item writes
    // ========================================================================

    /// Adds one item to an invoice.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::PermissionDenied`, `InvoiceError::NotFound` or
    /// `InvoiceError::Validation`.
    pub async fn add_item(
        &self,
        actor: &Actor,
        invoice_id: Uuid,
        spec: ItemSpec,
    ) -> Result<ItemChange, InvoiceError> {
        let txn = self.db.begin().await.map_err(invoice_db_error)?;
        let invoice = find_invoice(&txn, invoice_id).await?;
        ensure_editable(actor, &invoice)?;

        let line = spec.build().map_err(InvoiceError::Validation)?;
        ensure_product(&txn, line.product_id).await?;
        let item = insert_item(&txn, invoice_id, line)
            .await
            .map_err(invoice_db_error)?;
        let totals = recalculate_in(&txn, invoice_id).await?.totals();
        txn.commit().await.map_err(invoice_db_error)?;

        tracing::info!(%invoice_id, item_id = %item.id, amount = %item.amount, "Invoice item added");
        Ok(ItemChange { item, totals })
    }

    /// Applies a partial update to one item of an invoice.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::PermissionDenied`, `InvoiceError::NotFound` or
    /// `InvoiceError::Validation`.
    pub async fn update_item(
        &self,
        actor: &Actor,
        invoice_id: Uuid,
        item_id: Uuid,
        patch: ItemPatch,
    ) -> Result<ItemChange, InvoiceError> {
        let txn = self.db.begin().await.map_err(invoice_db_error)?;
        let invoice = find_invoice(&txn, invoice_id).await?;
        ensure_editable(actor, &invoice)?;

        let item = invoice_items::Entity::find_by_id(item_id)
            .filter(invoice_items::Column::InvoiceId.eq(invoice_id))
            .one(&txn)
            .await
            .map_err(invoice_db_error)?
            .ok_or_else(|| InvoiceError::item_not_found(item_id))?;

        let mut line = item.line_item();
        patch.apply(&mut line)?;
        ensure_product(&txn, line.product_id).await?;

        let mut active: invoice_items::ActiveModel = item.into();
        active.set_line_item(line);
        let item = active.update(&txn).await.map_err(invoice_db_error)?;
        let totals = recalculate_in(&txn, invoice_id).await?.totals();
        txn.commit().await.map_err(invoice_db_error)?;

        tracing::info!(%invoice_id, %item_id, amount = %item.amount, "Invoice item updated");
        Ok(ItemChange { item, totals })
    }

    /// Removes one item from an invoice.
    ///
    /// # Errors
    ///
    /// Returns `InvoiceError::PermissionDenied`, or `InvoiceError::NotFound`
    /// if the item does not belong to the invoice.
    pub async fn remove_item(
        &self,
        actor: &Actor,
        invoice_id: Uuid,
        item_id: Uuid,
    ) -> Result<InvoiceTotals, InvoiceError> {
        let txn = self.db.begin().await.map_err(invoice_db_error)?;
        let invoice = find_invoice(&txn, invoice_id).await?;
        ensure_editable(actor, &invoice)?;

        if !remove_owned_item(&txn, invoice_id, item_id)
            .await
            .map_err(invoice_db_error)?
        {
            return Err(InvoiceError::item_not_found(item_id));
        }
        let totals = recalculate_in(&txn, invoice_id).await?.totals();
        txn.commit().await.map_err(invoice_db_error)?;

        tracing::info!(%invoice_id, %item_id, "Invoice item removed");
        Ok(totals)
    }

    /// Inserts a header and items under the next free number for `today`'s
    /// month, retrying when the unique constraint reports a collision.
    async fn insert_with_fresh_number(
        &self,
        mut header: InvoiceHeader,
        items: Vec<LineItem>,
        today: NaiveDate,
    ) -> Result<InvoiceWithItems, InvoiceError> {
        for attempt in 1..=self.number_retry_attempts {
            let txn = self.db.begin().await.map_err(invoice_db_error)?;
            header.invoice_number = next_number_in(&txn, today).await?;

            match insert_aggregate(&txn, header.clone(), items.clone()).await {
                Ok(created) => {
                    txn.commit().await.map_err(invoice_db_error)?;
                    return Ok(created);
                }
                Err(InvoiceError::DuplicateInvoiceNumber(_)) => {
                    tracing::warn!(
                        attempt,
                        invoice_number = %header.invoice_number,
                        "Invoice number taken concurrently, retrying"
                    );
                    txn.rollback().await.map_err(invoice_db_error)?;
                }
                Err(e) => return Err(e),
            }
        }

        Err(InvoiceError::NumberAllocationExhausted {
            attempts: self.number_retry_attempts,
        })
    }
}

// ============================================================================
// Helpers shared by the operations above. They take any connection so they
// run on the pool or inside a transaction.
// ============================================================================

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn duplicate_or_db_error(err: DbErr, invoice_number: &str) -> InvoiceError {
    if is_unique_violation(&err) {
        InvoiceError::DuplicateInvoiceNumber(invoice_number.to_string())
    } else {
        invoice_db_error(err)
    }
}

fn ensure_editable(actor: &Actor, invoice: &invoices::Model) -> Result<(), InvoiceError> {
    if can_edit(actor, invoice.status.into()) {
        Ok(())
    } else {
        Err(InvoiceError::PermissionDenied)
    }
}

async fn find_invoice<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<invoices::Model, InvoiceError> {
    invoices::Entity::find_by_id(id)
        .one(conn)
        .await
        .map_err(invoice_db_error)?
        .ok_or_else(|| InvoiceError::invoice_not_found(id))
}

async fn load_items<C: ConnectionTrait>(
    conn: &C,
    invoice_id: Uuid,
) -> Result<Vec<invoice_items::Model>, InvoiceError> {
    invoice_items::Entity::find()
        .filter(invoice_items::Column::InvoiceId.eq(invoice_id))
        .order_by_asc(invoice_items::Column::Id)
        .all(conn)
        .await
        .map_err(invoice_db_error)
}

/// Reads every number issued in `today`'s month. Sequences can outgrow their
/// padding, so the highest one is picked after parsing, not by `ORDER BY`.
async fn next_number_in<C: ConnectionTrait>(conn: &C, today: NaiveDate) -> Result<String, InvoiceError> {
    let issued: Vec<String> = invoices::Entity::find()
        .select_only()
        .column(invoices::Column::InvoiceNumber)
        .filter(invoices::Column::InvoiceNumber.starts_with(month_prefix(today)))
        .into_tuple()
        .all(conn)
        .await
        .map_err(invoice_db_error)?;

    next_invoice_number(today, issued.iter().map(String::as_str))
}

async fn ensure_references<C: ConnectionTrait>(
    conn: &C,
    header: &InvoiceHeader,
    items: &[LineItem],
) -> Result<(), InvoiceError> {
    if let Some(id) = header.customer_id {
        let found = customers::Entity::find_by_id(id)
            .count(conn)
            .await
            .map_err(invoice_db_error)?;
        if found == 0 {
            return Err(InvoiceError::NotFound { entity: "Customer", id });
        }
    }
    if let Some(id) = header.company_id {
        let found = companies::Entity::find_by_id(id)
            .count(conn)
            .await
            .map_err(invoice_db_error)?;
        if found == 0 {
            return Err(InvoiceError::NotFound { entity: "Company", id });
        }
    }
    for item in items {
        ensure_product(conn, item.product_id).await?;
    }
    Ok(())
}

async fn ensure_product<C: ConnectionTrait>(conn: &C, product_id: Option<Uuid>) -> Result<(), InvoiceError> {
    let Some(id) = product_id else {
        return Ok(());
    };
    let found = products::Entity::find_by_id(id)
        .count(conn)
        .await
        .map_err(invoice_db_error)?;
    if found == 0 {
        return Err(InvoiceError::NotFound { entity: "Product", id });
    }
    Ok(())
}

/// Writes a new header with its items. A taken number surfaces as
/// `InvoiceError::DuplicateInvoiceNumber`.
async fn insert_aggregate(
    txn: &DatabaseTransaction,
    header: InvoiceHeader,
    items: Vec<LineItem>,
) -> Result<InvoiceWithItems, InvoiceError> {
    let now = chrono::Utc::now().into();
    let id = Uuid::now_v7();
    let number = header.invoice_number.clone();

    let mut invoice = invoices::ActiveModel {
        id: Set(id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    invoice.set_header(header);
    invoice.set_totals(InvoiceTotals::default());
    invoice
        .insert(txn)
        .await
        .map_err(|e| duplicate_or_db_error(e, &number))?;

    let mut stored = Vec::with_capacity(items.len());
    for item in items {
        stored.push(insert_item(txn, id, item).await.map_err(invoice_db_error)?);
    }
    let invoice = store_totals(txn, id, &stored).await?;

    Ok(InvoiceWithItems {
        invoice,
        items: stored,
    })
}

/// Stores `line` as is; its amount was computed when it was built.
async fn insert_item(
    txn: &DatabaseTransaction,
    invoice_id: Uuid,
    line: LineItem,
) -> Result<invoice_items::Model, DbErr> {
    let mut item = invoice_items::ActiveModel {
        id: Set(Uuid::now_v7()),
        invoice_id: Set(invoice_id),
        created_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };
    item.set_line_item(line);
    item.insert(txn).await
}

/// Full replace: every existing item goes, `items` takes their place.
async fn replace_items(
    txn: &DatabaseTransaction,
    invoice_id: Uuid,
    items: Vec<LineItem>,
) -> Result<(), DbErr> {
    let removed = invoice_items::Entity::delete_many()
        .filter(invoice_items::Column::InvoiceId.eq(invoice_id))
        .exec(txn)
        .await?;
    let added = items.len();
    for item in items {
        insert_item(txn, invoice_id, item).await?;
    }

    tracing::debug!(%invoice_id, removed = removed.rows_affected, added, "Invoice items replaced");
    Ok(())
}

/// Deletes the item only if it belongs to `invoice_id`. Returns whether a
/// row was deleted.
async fn remove_owned_item(
    txn: &DatabaseTransaction,
    invoice_id: Uuid,
    item_id: Uuid,
) -> Result<bool, DbErr> {
    let result = invoice_items::Entity::delete_many()
        .filter(invoice_items::Column::Id.eq(item_id))
        .filter(invoice_items::Column::InvoiceId.eq(invoice_id))
        .exec(txn)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Recomputes totals from the items currently stored for `invoice_id`.
async fn recalculate_in(txn: &DatabaseTransaction, invoice_id: Uuid) -> Result<invoices::Model, InvoiceError> {
    let items = load_items(txn, invoice_id).await?;
    store_totals(txn, invoice_id, &items).await
}

async fn store_totals(
    txn: &DatabaseTransaction,
    invoice_id: Uuid,
    items: &[invoice_items::Model],
) -> Result<invoices::Model, InvoiceError> {
    let totals = InvoiceTotals::from_amounts(items.iter().map(|item| item.amount))?;
    let mut invoice = invoices::ActiveModel {
        id: Set(invoice_id),
        updated_at: Set(chrono::Utc::now().into()),
        ..Default::default()
    };
    invoice.set_totals(totals);
    invoice.update(txn).await.map_err(invoice_db_error)
}
