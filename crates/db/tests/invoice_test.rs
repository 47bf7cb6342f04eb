//! Integration tests for the invoice repository.

mod common;

use common::{acme, admin, beta_corp, invoice_input, item, setup, staff, today, widget};
use invoicely_core::invoice::{InvoiceError, InvoicePatch, InvoiceStatus, ItemPatch};
use invoicely_db::entities::{invoice_items, invoices, sea_orm_active_enums};
use invoicely_db::{InvoiceFilter, InvoiceRepository};
use invoicely_shared::types::PageRequest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{EntityTrait, PaginatorTrait};
use uuid::Uuid;

#[tokio::test]
async fn test_end_to_end_invoice_lifecycle() {
    let db = setup().await;
    let company = acme(&db).await;
    let customer = beta_corp(&db).await;
    let product = widget(&db).await;
    let repo = InvoiceRepository::new(db.clone());
    let user = staff();

    let mut first = item(10, 100, 5);
    first.product_id = Some(product.id);
    let mut input = invoice_input(customer.id, vec![first, item(5, 200, 10)]);
    input.company_id = Some(company.id);

    let created = repo.create(&user, input, today()).await.unwrap();
    assert_eq!(created.invoice.invoice_number, "INV-2024-03-0001");
    assert_eq!(created.invoice.status, sea_orm_active_enums::InvoiceStatus::Draft);
    assert_eq!(created.invoice.payment_mode.as_deref(), Some("RTGS/NEFT"));
    assert_eq!(created.items.len(), 2);
    assert_eq!(created.items[0].amount, dec!(950));
    assert_eq!(created.items[1].amount, dec!(900));
    assert_eq!(created.invoice.subtotal, dec!(1850));
    assert_eq!(created.invoice.gst_amount, dec!(333));
    assert_eq!(created.invoice.total_amount, dec!(2183));

    let id = created.invoice.id;
    repo.update_status(id, "SENT").await.unwrap();
    let paid = repo.update_status(id, "PAID").await.unwrap();
    assert_eq!(paid.status, sea_orm_active_enums::InvoiceStatus::Paid);

    let denied = repo.delete(&user, id).await;
    assert!(matches!(denied, Err(InvoiceError::PermissionDenied)));

    repo.delete(&admin(), id).await.unwrap();
    assert!(matches!(
        repo.get(id).await,
        Err(InvoiceError::NotFound { entity: "Invoice", .. })
    ));
    let orphans = invoice_items::Entity::find().count(&db).await.unwrap();
    assert_eq!(orphans, 0);
}

#[tokio::test]
async fn test_invalid_item_writes_nothing() {
    let db = setup().await;
    let customer = beta_corp(&db).await;
    let repo = InvoiceRepository::new(db.clone());

    let mut bad = item(1, 100, 0);
    bad.unit = Some(String::new());
    let input = invoice_input(customer.id, vec![item(2, 50, 0), bad]);

    let err = repo.create(&staff(), input, today()).await.unwrap_err();
    match err {
        InvoiceError::Validation(errors) => {
            assert_eq!(errors, vec!["Item 2: Unit is required".to_string()]);
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    let page = repo
        .list(&InvoiceFilter::default(), &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.meta.total, 0);
    assert_eq!(invoice_items::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_header_and_item_errors_reported_together() {
    let db = setup().await;
    let repo = InvoiceRepository::new(db);

    let mut input = invoice_input(Uuid::now_v7(), vec![item(0, 100, 0)]);
    input.customer_id = None;

    let Err(InvoiceError::Validation(errors)) = repo.create(&staff(), input, today()).await else {
        panic!("expected validation error");
    };
    assert_eq!(
        errors,
        vec![
            "Customer is required".to_string(),
            "Item 1: Quantity must be greater than 0".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_unknown_customer_is_not_found() {
    let db = setup().await;
    let repo = InvoiceRepository::new(db);
    let missing = Uuid::now_v7();

    let err = repo
        .create(&staff(), invoice_input(missing, vec![]), today())
        .await
        .unwrap_err();
    assert!(matches!(err, InvoiceError::NotFound { entity: "Customer", id } if id == missing));
}

#[tokio::test]
async fn test_malformed_date_is_parse_error() {
    let db = setup().await;
    let customer = beta_corp(&db).await;
    let repo = InvoiceRepository::new(db);

    let mut input = invoice_input(customer.id, vec![]);
    input.invoice_date = Some("10/03/2024".to_string());

    let err = repo.create(&staff(), input, today()).await.unwrap_err();
    assert!(matches!(err, InvoiceError::InvalidDate { field: "invoice_date", .. }));
}

#[tokio::test]
async fn test_numbers_are_sequential_within_month() {
    let db = setup().await;
    let customer = beta_corp(&db).await;
    let repo = InvoiceRepository::new(db);

    assert_eq!(repo.next_number(today()).await.unwrap(), "INV-2024-03-0001");
    let mut numbers = Vec::new();
    for _ in 0..3 {
        let created = repo
            .create(&staff(), invoice_input(customer.id, vec![]), today())
            .await
            .unwrap();
        numbers.push(created.invoice.invoice_number);
    }

    assert_eq!(
        numbers,
        vec!["INV-2024-03-0001", "INV-2024-03-0002", "INV-2024-03-0003"]
    );
    assert_eq!(repo.next_number(today()).await.unwrap(), "INV-2024-03-0004");

    let april = chrono::NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
    assert_eq!(repo.next_number(april).await.unwrap(), "INV-2024-04-0001");
}

#[tokio::test]
async fn test_explicit_duplicate_number_conflicts() {
    let db = setup().await;
    let customer = beta_corp(&db).await;
    let repo = InvoiceRepository::new(db);

    let mut input = invoice_input(customer.id, vec![]);
    input.invoice_number = Some("INV-2024-03-0042".to_string());
    repo.create(&staff(), input.clone(), today()).await.unwrap();

    let err = repo.create(&staff(), input, today()).await.unwrap_err();
    assert!(matches!(err, InvoiceError::DuplicateInvoiceNumber(n) if n == "INV-2024-03-0042"));

    // Auto-numbering continues after the explicit number.
    let next = repo
        .create(&staff(), invoice_input(customer.id, vec![]), today())
        .await
        .unwrap();
    assert_eq!(next.invoice.invoice_number, "INV-2024-03-0043");
}

#[tokio::test]
async fn test_free_text_number_does_not_block_allocation() {
    let db = setup().await;
    let customer = beta_corp(&db).await;
    let repo = InvoiceRepository::new(db);

    let mut input = invoice_input(customer.id, vec![]);
    input.invoice_number = Some("INV-2024-03-ABCD".to_string());
    repo.create(&staff(), input, today()).await.unwrap();

    assert_eq!(repo.next_number(today()).await.unwrap(), "INV-2024-03-0001");
}

#[tokio::test]
async fn test_numbering_continues_past_9999() {
    let db = setup().await;
    let customer = beta_corp(&db).await;
    let repo = InvoiceRepository::new(db);

    let mut input = invoice_input(customer.id, vec![]);
    input.invoice_number = Some("INV-2024-03-9999".to_string());
    repo.create(&staff(), input, today()).await.unwrap();

    let mut numbers = Vec::new();
    for _ in 0..2 {
        let created = repo
            .create(&staff(), invoice_input(customer.id, vec![]), today())
            .await
            .unwrap();
        numbers.push(created.invoice.invoice_number);
    }

    assert_eq!(numbers, vec!["INV-2024-03-10000", "INV-2024-03-10001"]);
    assert_eq!(repo.next_number(today()).await.unwrap(), "INV-2024-03-10002");
}

#[tokio::test]
async fn test_replace_items_is_full_replace() {
    let db = setup().await;
    let customer = beta_corp(&db).await;
    let repo = InvoiceRepository::new(db);
    let user = staff();

    let created = repo
        .create(&user, invoice_input(customer.id, vec![item(10, 100, 5), item(5, 200, 10)]), today())
        .await
        .unwrap();
    let id = created.invoice.id;

    let patch = InvoicePatch {
        items: Some(vec![item(3, 150, 0)]),
        ..Default::default()
    };
    let updated = repo.update(&user, id, patch, today()).await.unwrap();
    assert_eq!(updated.items.len(), 1);
    assert_eq!(updated.invoice.subtotal, dec!(450));
    assert_eq!(updated.invoice.total_amount, dec!(531));

    let patch = InvoicePatch {
        items: Some(Vec::new()),
        ..Default::default()
    };
    let emptied = repo.update(&user, id, patch, today()).await.unwrap();
    assert!(emptied.items.is_empty());
    assert_eq!(emptied.invoice.subtotal, Decimal::ZERO);
    assert_eq!(emptied.invoice.total_amount, Decimal::ZERO);
}

#[tokio::test]
async fn test_header_patch_keeps_items() {
    let db = setup().await;
    let customer = beta_corp(&db).await;
    let repo = InvoiceRepository::new(db);
    let user = staff();

    let created = repo
        .create(&user, invoice_input(customer.id, vec![item(1, 100, 0)]), today())
        .await
        .unwrap();

    let patch = InvoicePatch {
        po_number: Some(Some("PO-77".to_string())),
        transport: Some(Some("By road".to_string())),
        ..Default::default()
    };
    let updated = repo
        .update(&user, created.invoice.id, patch, today())
        .await
        .unwrap();

    assert_eq!(updated.invoice.po_number.as_deref(), Some("PO-77"));
    assert_eq!(updated.invoice.transport.as_deref(), Some("By road"));
    assert_eq!(updated.items, created.items);
}

#[tokio::test]
async fn test_non_admin_cannot_edit_sent_invoice_but_can_change_status() {
    let db = setup().await;
    let customer = beta_corp(&db).await;
    let repo = InvoiceRepository::new(db);
    let user = staff();

    let created = repo
        .create(&user, invoice_input(customer.id, vec![item(1, 100, 0)]), today())
        .await
        .unwrap();
    let id = created.invoice.id;
    repo.update_status(id, "SENT").await.unwrap();

    let err = repo
        .update(&user, id, InvoicePatch::default(), today())
        .await
        .unwrap_err();
    assert!(matches!(err, InvoiceError::PermissionDenied));

    let err = repo.add_item(&user, id, item(1, 10, 0)).await.unwrap_err();
    assert!(matches!(err, InvoiceError::PermissionDenied));

    // The status path is not gated: any status may follow any other.
    let back = repo.update_status(id, "DRAFT").await.unwrap();
    assert_eq!(InvoiceStatus::from(back.status), InvoiceStatus::Draft);
    repo.update(&user, id, InvoicePatch::default(), today())
        .await
        .unwrap();

    repo.update_status(id, "CANCELLED").await.unwrap();
    repo.update(&admin(), id, InvoicePatch::default(), today())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unknown_status_rejected() {
    let db = setup().await;
    let customer = beta_corp(&db).await;
    let repo = InvoiceRepository::new(db);

    let created = repo
        .create(&staff(), invoice_input(customer.id, vec![]), today())
        .await
        .unwrap();

    let err = repo
        .update_status(created.invoice.id, "ARCHIVED")
        .await
        .unwrap_err();
    assert!(matches!(err, InvoiceError::InvalidStatus(s) if s == "ARCHIVED"));
}

#[tokio::test]
async fn test_item_operations_refresh_totals() {
    let db = setup().await;
    let customer = beta_corp(&db).await;
    let repo = InvoiceRepository::new(db);
    let user = staff();

    let created = repo
        .create(&user, invoice_input(customer.id, vec![item(10, 100, 5)]), today())
        .await
        .unwrap();
    let id = created.invoice.id;

    let added = repo.add_item(&user, id, item(5, 200, 10)).await.unwrap();
    assert_eq!(added.item.amount, dec!(900));
    assert_eq!(added.totals.subtotal, dec!(1850));
    assert_eq!(added.totals.total_amount, dec!(2183));

    let patch = ItemPatch {
        discount_percent: Some(Decimal::ZERO),
        ..Default::default()
    };
    let changed = repo
        .update_item(&user, id, added.item.id, patch)
        .await
        .unwrap();
    assert_eq!(changed.item.amount, dec!(1000));
    assert_eq!(changed.totals.subtotal, dec!(1950));

    let totals = repo.remove_item(&user, id, added.item.id).await.unwrap();
    assert_eq!(totals.subtotal, dec!(950));

    let items = repo.list_items(id).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, created.items[0].id);
}

#[tokio::test]
async fn test_invalid_item_patch_leaves_item_unchanged() {
    let db = setup().await;
    let customer = beta_corp(&db).await;
    let repo = InvoiceRepository::new(db);
    let user = staff();

    let created = repo
        .create(&user, invoice_input(customer.id, vec![item(2, 100, 0)]), today())
        .await
        .unwrap();
    let item_id = created.items[0].id;

    let patch = ItemPatch {
        quantity: Some(Decimal::ZERO),
        ..Default::default()
    };
    let err = repo
        .update_item(&user, created.invoice.id, item_id, patch)
        .await
        .unwrap_err();
    assert!(matches!(err, InvoiceError::Validation(_)));

    let items = repo.list_items(created.invoice.id).await.unwrap();
    assert_eq!(items[0].quantity, dec!(2));
    assert_eq!(items[0].amount, dec!(200));
}

#[tokio::test]
async fn test_remove_item_of_other_invoice_is_not_found() {
    let db = setup().await;
    let customer = beta_corp(&db).await;
    let repo = InvoiceRepository::new(db);
    let user = staff();

    let first = repo
        .create(&user, invoice_input(customer.id, vec![item(1, 100, 0)]), today())
        .await
        .unwrap();
    let second = repo
        .create(&user, invoice_input(customer.id, vec![item(1, 100, 0)]), today())
        .await
        .unwrap();

    let err = repo
        .remove_item(&user, first.invoice.id, second.items[0].id)
        .await
        .unwrap_err();
    assert!(matches!(err, InvoiceError::NotFound { entity: "Item", .. }));
    assert_eq!(repo.list_items(second.invoice.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_recalculate_is_idempotent() {
    let db = setup().await;
    let customer = beta_corp(&db).await;
    let repo = InvoiceRepository::new(db);

    let created = repo
        .create(&staff(), invoice_input(customer.id, vec![item(10, 100, 5), item(5, 200, 10)]), today())
        .await
        .unwrap();

    let once = repo.recalculate(created.invoice.id).await.unwrap();
    let twice = repo.recalculate(created.invoice.id).await.unwrap();

    assert_eq!(once.invoice.subtotal, dec!(1850));
    assert_eq!(once.invoice.totals(), twice.invoice.totals());
    assert_eq!(once.items, twice.items);
}

#[tokio::test]
async fn test_duplicate_creates_fresh_draft() {
    let db = setup().await;
    let customer = beta_corp(&db).await;
    let repo = InvoiceRepository::new(db);
    let user = staff();

    let source = repo
        .create(&user, invoice_input(customer.id, vec![item(10, 100, 5), item(5, 200, 10)]), today())
        .await
        .unwrap();
    repo.update_status(source.invoice.id, "PAID").await.unwrap();

    let copy = repo.duplicate(&user, source.invoice.id, today()).await.unwrap();
    assert_ne!(copy.invoice.id, source.invoice.id);
    assert_eq!(copy.invoice.invoice_number, "INV-2024-03-0002");
    assert_eq!(copy.invoice.invoice_date, today());
    assert_eq!(copy.invoice.status, sea_orm_active_enums::InvoiceStatus::Draft);
    assert_eq!(copy.invoice.customer_id, Some(customer.id));
    assert_eq!(copy.items.len(), 2);
    assert_eq!(copy.invoice.total_amount, dec!(2183));
}

#[tokio::test]
async fn test_list_filters_and_search() {
    let db = setup().await;
    let customer = beta_corp(&db).await;
    let repo = InvoiceRepository::new(db);
    let user = staff();

    let mut with_po = invoice_input(customer.id, vec![]);
    with_po.po_number = Some("PO-Alpha-9".to_string());
    let a = repo.create(&user, with_po, today()).await.unwrap();

    let mut earlier = invoice_input(customer.id, vec![]);
    earlier.invoice_date = Some("2024-02-01".to_string());
    let b = repo.create(&user, earlier, today()).await.unwrap();
    repo.update_status(b.invoice.id, "SENT").await.unwrap();

    let all = repo
        .list(&InvoiceFilter::default(), &PageRequest::default())
        .await
        .unwrap();
    assert_eq!(all.meta.total, 2);
    assert_eq!(all.data[0].id, a.invoice.id);

    let sent = InvoiceFilter {
        status: Some(InvoiceStatus::Sent),
        ..Default::default()
    };
    let page = repo.list(&sent, &PageRequest::default()).await.unwrap();
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.data[0].id, b.invoice.id);

    let march = InvoiceFilter {
        date_from: chrono::NaiveDate::from_ymd_opt(2024, 3, 1),
        ..Default::default()
    };
    let page = repo.list(&march, &PageRequest::default()).await.unwrap();
    assert_eq!(page.meta.total, 1);

    let found = repo.search("alpha").await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, a.invoice.id);
    assert!(repo.search("   ").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_stats() {
    let db = setup().await;
    let customer = beta_corp(&db).await;
    let repo = InvoiceRepository::new(db);
    let user = staff();

    let paid = repo
        .create(&user, invoice_input(customer.id, vec![item(10, 100, 5)]), today())
        .await
        .unwrap();
    repo.update_status(paid.invoice.id, "PAID").await.unwrap();
    let cancelled = repo
        .create(&user, invoice_input(customer.id, vec![item(1, 100, 0)]), today())
        .await
        .unwrap();
    repo.update_status(cancelled.invoice.id, "CANCELLED").await.unwrap();

    let stats = repo.stats(2024).await.unwrap();
    assert_eq!(stats.total_invoices, 2);
    assert_eq!(stats.status_breakdown.paid, 1);
    assert_eq!(stats.status_breakdown.cancelled, 1);
    assert_eq!(stats.amounts.paid, paid.invoice.total_amount);
    assert_eq!(stats.amounts.total, paid.invoice.total_amount);
    assert_eq!(stats.monthly_stats.len(), 1);
    assert_eq!(stats.monthly_stats[0].month, 3);
}

#[tokio::test]
async fn test_totals_beyond_storage_are_rejected_atomically() {
    let db = setup().await;
    let customer = beta_corp(&db).await;
    let repo = InvoiceRepository::new(db.clone());
    let user = staff();

    let err = repo
        .create(
            &user,
            invoice_input(
                customer.id,
                vec![item(4_000_000, 1000, 0), item(4_000_000, 1000, 0), item(4_000_000, 1000, 0)],
            ),
            today(),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, InvoiceError::AmountOutOfRange));
    assert_eq!(invoices::Entity::find().count(&db).await.unwrap(), 0);

    let created = repo
        .create(&user, invoice_input(customer.id, vec![item(4_000_000, 1000, 0)]), today())
        .await
        .unwrap();
    let id = created.invoice.id;

    let err = repo
        .add_item(&user, id, item(5_000_000, 1000, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, InvoiceError::AmountOutOfRange));

    let unchanged = repo.get(id).await.unwrap();
    assert_eq!(unchanged.items.len(), 1);
    assert_eq!(unchanged.invoice.subtotal, dec!(4000000000));
}

#[tokio::test]
async fn test_sub_precision_item_is_rejected() {
    let db = setup().await;
    let customer = beta_corp(&db).await;
    let repo = InvoiceRepository::new(db);

    let mut tiny = item(1, 1, 0);
    tiny.quantity = Some(dec!(0.0004));
    tiny.rate = Some(dec!(0.004));

    let err = repo
        .create(&staff(), invoice_input(customer.id, vec![tiny]), today())
        .await
        .unwrap_err();
    match err {
        InvoiceError::Validation(errors) => assert_eq!(
            errors,
            vec![
                "Item 1: Quantity must be greater than 0",
                "Item 1: Rate must be greater than 0",
            ]
        ),
        other => panic!("expected validation error, got {other:?}"),
    }
}
