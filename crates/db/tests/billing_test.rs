//! Integration tests for transactions, invoices and checkout.
//!
//! Each test dates its documents in its own month so that parallel tests
//! never compete for the same monthly sequence.

mod common;

use chrono::Duration;
use hisaab_core::billing::{SuppliedTotals, TransactionType};
use hisaab_core::invoice::{InvoiceError, PaymentDetails, PaymentMethod};
use hisaab_core::stock::StockError;
use hisaab_db::RepositoryError;
use hisaab_db::entities::sea_orm_active_enums::{InvoiceStatus, PartyType, PaymentStatus};
use hisaab_db::repositories::{
    CheckoutInput, CreateInvoiceInput, CreateTransactionInput, InvoiceOptions, InvoiceRepository,
    ItemRepository, PosRepository, TransactionRepository,
};
use hisaab_shared::BillingConfig;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

fn sale(
    customer_id: Option<Uuid>,
    lines: Vec<hisaab_core::billing::LineInput>,
    date: chrono::DateTime<chrono::Utc>,
) -> CreateTransactionInput {
    CreateTransactionInput {
        transaction_type: TransactionType::Sale,
        customer_id,
        supplier_id: None,
        transaction_date: Some(date),
        notes: None,
        lines,
        supplied: SuppliedTotals::default(),
    }
}

async fn stock_of(db: &DatabaseConnection, id: Uuid) -> Decimal {
    ItemRepository::new(db.clone())
        .get(id)
        .await
        .unwrap()
        .stock_quantity
}

#[tokio::test]
async fn test_sale_records_totals_and_moves_stock() {
    let Some(db) = common::test_db().await else {
        return;
    };
    let customer = common::party(&db, PartyType::Customer, "Maharashtra").await;
    let item = common::item(&db, dec!(100), dec!(10)).await;
    let repo = TransactionRepository::new(db.clone());

    let created = repo
        .create(sale(
            Some(customer.id),
            vec![common::line(&item, dec!(3))],
            common::day(2031, 1, 10),
        ))
        .await
        .unwrap();

    let header = &created.transaction;
    assert!(header.transaction_number.starts_with("SAL-203101-"));
    assert_eq!(header.subtotal, dec!(300));
    assert_eq!(header.tax_amount, dec!(54));
    assert_eq!(header.total_amount, dec!(354));
    assert_eq!(created.items.len(), 1);
    assert_eq!(created.items[0].line_total, dec!(354));
    assert_eq!(stock_of(&db, item.id).await, dec!(7));

    repo.delete(header.id).await.unwrap();
    assert_eq!(stock_of(&db, item.id).await, dec!(10));
}

#[tokio::test]
async fn test_oversell_writes_nothing() {
    let Some(db) = common::test_db().await else {
        return;
    };
    let plenty = common::item(&db, dec!(10), dec!(50)).await;
    let scarce = common::item(&db, dec!(10), dec!(1)).await;

    let err = TransactionRepository::new(db.clone())
        .create(sale(
            None,
            vec![
                common::line(&plenty, dec!(5)),
                common::line(&scarce, dec!(2)),
            ],
            common::day(2031, 2, 10),
        ))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        RepositoryError::Stock(StockError::InsufficientStock { .. })
    ));
    // The first line's movement was rolled back with the rest.
    assert_eq!(stock_of(&db, plenty.id).await, dec!(50));
    assert_eq!(stock_of(&db, scarce.id).await, dec!(1));
}

#[tokio::test]
async fn test_supplied_totals_must_match() {
    let Some(db) = common::test_db().await else {
        return;
    };
    let item = common::item(&db, dec!(100), dec!(10)).await;
    let mut input = sale(None, vec![common::line(&item, dec!(1))], common::day(2031, 3, 10));
    input.supplied.total_amount = Some(dec!(100));

    let err = TransactionRepository::new(db.clone())
        .create(input)
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Billing(_)));
    assert_eq!(stock_of(&db, item.id).await, dec!(10));
}

#[tokio::test]
async fn test_invoice_from_transaction_splits_gst() {
    let Some(db) = common::test_db().await else {
        return;
    };
    let local = common::party(&db, PartyType::Customer, "Maharashtra").await;
    let remote = common::party(&db, PartyType::Customer, "Karnataka").await;
    let item = common::item(&db, dec!(100), dec!(20)).await;
    let transactions = TransactionRepository::new(db.clone());
    let invoices = InvoiceRepository::new(db.clone(), BillingConfig::default());
    let issued_on = common::day(2032, 3, 1);

    let local_sale = transactions
        .create(sale(Some(local.id), vec![common::line(&item, dec!(3))], issued_on))
        .await
        .unwrap();
    let options = InvoiceOptions {
        issue_date: Some(issued_on),
        ..InvoiceOptions::default()
    };
    let local_invoice = invoices
        .create_from_transaction(local_sale.transaction.id, options.clone())
        .await
        .unwrap()
        .invoice;
    assert!(local_invoice.invoice_number.starts_with("INV-203203-"));
    assert_eq!(local_invoice.status, InvoiceStatus::Draft);
    assert_eq!(local_invoice.party_id, Some(local.id));
    assert_eq!(local_invoice.cgst_amount, dec!(27));
    assert_eq!(local_invoice.sgst_amount, dec!(27));
    assert_eq!(local_invoice.igst_amount, dec!(0));
    assert_eq!(local_invoice.balance_amount, dec!(354));
    assert_eq!(
        local_invoice.due_date,
        (issued_on + Duration::days(15)).fixed_offset()
    );

    let remote_sale = transactions
        .create(sale(Some(remote.id), vec![common::line(&item, dec!(3))], issued_on))
        .await
        .unwrap();
    let remote_invoice = invoices
        .create_from_transaction(remote_sale.transaction.id, options.clone())
        .await
        .unwrap()
        .invoice;
    assert_eq!(remote_invoice.igst_amount, dec!(54));
    assert_eq!(remote_invoice.cgst_amount, dec!(0));

    let again = invoices
        .create_from_transaction(remote_sale.transaction.id, options)
        .await
        .unwrap_err();
    assert!(matches!(
        again,
        RepositoryError::Invoice(InvoiceError::AlreadyInvoiced(_))
    ));

    // Invoiced transactions stay put.
    assert!(matches!(
        transactions.delete(remote_sale.transaction.id).await,
        Err(RepositoryError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_paid_records_payment_atomically() {
    let Some(db) = common::test_db().await else {
        return;
    };
    let item = common::item(&db, dec!(500), dec!(0)).await;
    let invoices = InvoiceRepository::new(db.clone(), BillingConfig::default());
    let mut line = common::line(&item, dec!(1));
    line.tax_rate = dec!(0);

    let invoice = invoices
        .create(CreateInvoiceInput {
            party_id: None,
            lines: vec![line],
            supplied: SuppliedTotals::default(),
            options: InvoiceOptions {
                issue_date: Some(common::day(2032, 4, 1)),
                ..InvoiceOptions::default()
            },
        })
        .await
        .unwrap()
        .invoice;
    assert_eq!(invoice.total_amount, dec!(500));

    let change = invoices
        .update_status(
            invoice.id,
            "paid",
            Some(PaymentDetails {
                amount: Some(dec!(500)),
                method: PaymentMethod::Cash,
                reference: None,
            }),
            common::day(2032, 4, 5),
        )
        .await
        .unwrap();

    assert!(change.status_changed);
    assert_eq!(change.invoice.status, InvoiceStatus::Paid);
    assert_eq!(change.invoice.paid_amount, dec!(500));
    assert_eq!(change.invoice.balance_amount, dec!(0));
    let payment = change.payment.unwrap();
    assert_eq!(payment.amount, dec!(500));
    assert_eq!(payment.status, PaymentStatus::Completed);
    assert!(payment.payment_number.starts_with("PAY-20320405-"));

    let recorded = invoices.list_payments(invoice.id).await.unwrap();
    assert_eq!(recorded.len(), 1);

    // Paid invoices are neither editable nor deletable.
    assert!(matches!(
        invoices.delete(invoice.id).await,
        Err(RepositoryError::Invoice(InvoiceError::NotDeletable(_)))
    ));
}

#[tokio::test]
async fn test_invalid_payment_rolls_back_status() {
    let Some(db) = common::test_db().await else {
        return;
    };
    let item = common::item(&db, dec!(100), dec!(0)).await;
    let invoices = InvoiceRepository::new(db.clone(), BillingConfig::default());
    let invoice = invoices
        .create(CreateInvoiceInput {
            party_id: None,
            lines: vec![common::line(&item, dec!(1))],
            supplied: SuppliedTotals::default(),
            options: InvoiceOptions {
                issue_date: Some(common::day(2032, 5, 1)),
                ..InvoiceOptions::default()
            },
        })
        .await
        .unwrap()
        .invoice;

    let err = invoices
        .update_status(
            invoice.id,
            "PAID",
            Some(PaymentDetails {
                amount: Some(dec!(-1)),
                method: PaymentMethod::Upi,
                reference: None,
            }),
            common::day(2032, 5, 2),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::Invoice(InvoiceError::InvalidPayment(_))
    ));

    let unchanged = invoices.get(invoice.id).await.unwrap();
    assert_eq!(unchanged.invoice.status, InvoiceStatus::Draft);
    assert_eq!(unchanged.invoice.paid_amount, dec!(0));
    assert!(unchanged.payments.is_empty());

    let err = invoices
        .update_status(invoice.id, "ARCHIVED", None, common::day(2032, 5, 2))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::Invoice(InvoiceError::InvalidStatus(_))
    ));
}

#[tokio::test]
async fn test_sent_and_overdue_rules() {
    let Some(db) = common::test_db().await else {
        return;
    };
    let item = common::item(&db, dec!(100), dec!(0)).await;
    let invoices = InvoiceRepository::new(db.clone(), BillingConfig::default());
    let issued_on = common::day(2032, 6, 1);
    let invoice = invoices
        .create(CreateInvoiceInput {
            party_id: None,
            lines: vec![common::line(&item, dec!(1))],
            supplied: SuppliedTotals::default(),
            options: InvoiceOptions {
                issue_date: Some(issued_on),
                payment_terms_days: Some(10),
                notes: None,
            },
        })
        .await
        .unwrap()
        .invoice;

    let first = invoices
        .update_status(invoice.id, "SENT", None, common::day(2032, 6, 2))
        .await
        .unwrap();
    let second = invoices
        .update_status(invoice.id, "SENT", None, common::day(2032, 6, 3))
        .await
        .unwrap();
    assert_eq!(first.invoice.sent_date, second.invoice.sent_date);

    let early = invoices
        .update_status(invoice.id, "OVERDUE", None, common::day(2032, 6, 5))
        .await
        .unwrap();
    assert!(!early.status_changed);
    assert_eq!(early.invoice.status, InvoiceStatus::Sent);

    let late = invoices
        .update_status(invoice.id, "OVERDUE", None, common::day(2032, 6, 20))
        .await
        .unwrap();
    assert!(late.status_changed);
    assert_eq!(late.invoice.status, InvoiceStatus::Overdue);

    let cancelled = invoices
        .update_status(invoice.id, "CANCELLED", None, common::day(2032, 6, 21))
        .await
        .unwrap();
    assert_eq!(cancelled.invoice.paid_amount, dec!(0));
    assert_eq!(cancelled.invoice.balance_amount, cancelled.invoice.total_amount);
}

#[tokio::test]
async fn test_replace_items_only_on_draft() {
    let Some(db) = common::test_db().await else {
        return;
    };
    let rice = common::item(&db, dec!(100), dec!(0)).await;
    let dal = common::item(&db, dec!(80), dec!(0)).await;
    let invoices = InvoiceRepository::new(db.clone(), BillingConfig::default());
    let invoice = invoices
        .create(CreateInvoiceInput {
            party_id: None,
            lines: vec![common::line(&rice, dec!(1))],
            supplied: SuppliedTotals::default(),
            options: InvoiceOptions {
                issue_date: Some(common::day(2032, 7, 1)),
                ..InvoiceOptions::default()
            },
        })
        .await
        .unwrap()
        .invoice;

    let replaced = invoices
        .replace_items(
            invoice.id,
            vec![common::line(&rice, dec!(2)), common::line(&dal, dec!(1))],
            SuppliedTotals::default(),
        )
        .await
        .unwrap();
    assert_eq!(replaced.items.len(), 2);
    assert_eq!(replaced.invoice.subtotal, dec!(280));
    assert_eq!(replaced.invoice.tax_amount, dec!(50.40));
    assert_eq!(replaced.invoice.total_amount, dec!(330.40));
    assert_eq!(replaced.invoice.balance_amount, dec!(330.40));
    assert_eq!(replaced.items[1].description, dal.name);

    invoices
        .update_status(invoice.id, "SENT", None, common::day(2032, 7, 2))
        .await
        .unwrap();
    let err = invoices
        .replace_items(
            invoice.id,
            vec![common::line(&rice, dec!(1))],
            SuppliedTotals::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RepositoryError::Invoice(InvoiceError::NotEditable(_))
    ));
}

#[tokio::test]
async fn test_draft_invoice_delete() {
    let Some(db) = common::test_db().await else {
        return;
    };
    let item = common::item(&db, dec!(100), dec!(0)).await;
    let invoices = InvoiceRepository::new(db.clone(), BillingConfig::default());
    let invoice = invoices
        .create(CreateInvoiceInput {
            party_id: None,
            lines: vec![common::line(&item, dec!(1))],
            supplied: SuppliedTotals::default(),
            options: InvoiceOptions {
                issue_date: Some(common::day(2032, 8, 1)),
                ..InvoiceOptions::default()
            },
        })
        .await
        .unwrap()
        .invoice;

    invoices.delete(invoice.id).await.unwrap();
    assert!(matches!(
        invoices.get(invoice.id).await,
        Err(RepositoryError::Invoice(InvoiceError::InvoiceNotFound(_)))
    ));
}

#[tokio::test]
async fn test_pos_checkout() {
    let Some(db) = common::test_db().await else {
        return;
    };
    let customer = common::party(&db, PartyType::Customer, "Maharashtra").await;
    let item = common::item(&db, dec!(250), dec!(5)).await;

    let receipt = PosRepository::new(db.clone(), BillingConfig::default())
        .checkout(
            CheckoutInput {
                customer_id: Some(customer.id),
                lines: vec![common::line(&item, dec!(2))],
                payment_method: PaymentMethod::Upi,
                payment_reference: Some("UPI-778812".into()),
                notes: None,
            },
            chrono::Utc::now(),
        )
        .await
        .unwrap();

    assert_eq!(receipt.invoice.invoice.status, InvoiceStatus::Paid);
    assert_eq!(receipt.invoice.invoice.total_amount, dec!(590));
    assert_eq!(receipt.invoice.invoice.balance_amount, dec!(0));
    assert_eq!(receipt.payment.amount, dec!(590));
    assert_eq!(receipt.payment.reference.as_deref(), Some("UPI-778812"));
    assert_eq!(stock_of(&db, item.id).await, dec!(3));
}
