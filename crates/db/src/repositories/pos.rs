//! Point-of-sale checkout.

use chrono::{DateTime, Utc};
use hisaab_core::billing::{LineInput, SuppliedTotals, TransactionType};
use hisaab_core::invoice::{InvoiceStatus, PaymentDetails, PaymentMethod};
use hisaab_shared::BillingConfig;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::Serialize;
use uuid::Uuid;

use super::error::{RepositoryError, RepositoryResult};
use super::invoice::{self, InvoiceOptions, InvoiceWithDetails};
use super::transaction::{self, CreateTransactionInput};
use crate::entities::payments;

/// A counter sale.
#[derive(Debug, Clone)]
pub struct CheckoutInput {
    /// Walk-in sales leave this empty.
    pub customer_id: Option<Uuid>,
    /// Lines, at least one.
    pub lines: Vec<LineInput>,
    /// How the customer paid.
    pub payment_method: PaymentMethod,
    /// Card or UPI reference.
    pub payment_reference: Option<String>,
    /// Free text, copied to the transaction and the invoice.
    pub notes: Option<String>,
}

/// Everything a checkout wrote.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    /// The paid invoice.
    pub invoice: InvoiceWithDetails,
    /// The payment settling it.
    pub payment: payments::Model,
    /// The recorded sale.
    pub transaction_id: Uuid,
}

/// Point-of-sale repository.
#[derive(Debug, Clone)]
pub struct PosRepository {
    db: DatabaseConnection,
    billing: BillingConfig,
}

impl PosRepository {
    /// Creates a new point-of-sale repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, billing: BillingConfig) -> Self {
        Self { db, billing }
    }

    /// Records a sale, invoices it and marks the invoice paid in full.
    ///
    /// # Errors
    ///
    /// Returns the first error of the sale, invoice or payment step; none
    /// of them is written then.
    pub async fn checkout(
        &self,
        input: CheckoutInput,
        now: DateTime<Utc>,
    ) -> RepositoryResult<CheckoutReceipt> {
        let sale = CreateTransactionInput {
            transaction_type: TransactionType::Sale,
            customer_id: input.customer_id,
            supplier_id: None,
            transaction_date: Some(now),
            notes: input.notes.clone(),
            lines: input.lines,
            supplied: SuppliedTotals::default(),
        };
        let bill = transaction::resolve_bill(&sale)?;

        let txn = self.db.begin().await?;
        let sale = transaction::create_in(&txn, &sale, bill).await?;
        let transaction_id = sale.transaction.id;

        let issued = invoice::create_from_transaction_in(
            &txn,
            &self.billing,
            transaction_id,
            &InvoiceOptions {
                issue_date: Some(now),
                payment_terms_days: Some(0),
                notes: input.notes,
            },
        )
        .await?;

        let change = invoice::update_status_in(
            &txn,
            issued.invoice.id,
            InvoiceStatus::Paid.as_str(),
            Some(PaymentDetails {
                amount: None,
                method: input.payment_method,
                reference: input.payment_reference,
            }),
            now,
        )
        .await?;
        let Some(payment) = change.payment else {
            return Err(RepositoryError::Conflict(format!(
                "Invoice {} was not settled",
                change.invoice.invoice_number
            )));
        };

        txn.commit().await?;

        tracing::info!(
            %transaction_id,
            invoice_number = %change.invoice.invoice_number,
            payment_number = %payment.payment_number,
            amount = %payment.amount,
            "Checkout completed"
        );

        Ok(CheckoutReceipt {
            invoice: InvoiceWithDetails {
                invoice: change.invoice,
                items: issued.items,
                payments: vec![payment.clone()],
            },
            payment,
            transaction_id,
        })
    }
}
