//! Postgres enum types and their mapping to core domain enums.

use hisaab_core::billing::TransactionType as CoreTransactionType;
use hisaab_core::invoice::{
    InvoiceStatus as CoreInvoiceStatus, PaymentMethod as CorePaymentMethod,
    PaymentStatus as CorePaymentStatus,
};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// `party_type` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "party_type")]
#[serde(rename_all = "UPPERCASE")]
pub enum PartyType {
    /// Buys from the business.
    #[sea_orm(string_value = "CUSTOMER")]
    Customer,
    /// Sells goods to the business.
    #[sea_orm(string_value = "SUPPLIER")]
    Supplier,
    /// Provides services to the business.
    #[sea_orm(string_value = "VENDOR")]
    Vendor,
}

/// `transaction_type` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "transaction_type")]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Sale.
    #[sea_orm(string_value = "SALE")]
    Sale,
    /// Purchase.
    #[sea_orm(string_value = "PURCHASE")]
    Purchase,
}

/// `invoice_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "invoice_status")]
#[serde(rename_all = "UPPERCASE")]
pub enum InvoiceStatus {
    /// Draft.
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    /// Sent.
    #[sea_orm(string_value = "SENT")]
    Sent,
    /// Paid.
    #[sea_orm(string_value = "PAID")]
    Paid,
    /// Overdue.
    #[sea_orm(string_value = "OVERDUE")]
    Overdue,
    /// Cancelled.
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

/// `payment_method` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    /// Cash.
    #[sea_orm(string_value = "CASH")]
    Cash,
    /// Card.
    #[sea_orm(string_value = "CARD")]
    Card,
    /// UPI.
    #[sea_orm(string_value = "UPI")]
    Upi,
    /// Bank transfer.
    #[sea_orm(string_value = "BANK_TRANSFER")]
    BankTransfer,
    /// Cheque.
    #[sea_orm(string_value = "CHEQUE")]
    Cheque,
    /// Other.
    #[sea_orm(string_value = "OTHER")]
    Other,
}

/// `payment_status` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_status")]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    /// Pending.
    #[sea_orm(string_value = "PENDING")]
    Pending,
    /// Completed.
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    /// Failed.
    #[sea_orm(string_value = "FAILED")]
    Failed,
    /// Refunded.
    #[sea_orm(string_value = "REFUNDED")]
    Refunded,
}

impl From<CoreTransactionType> for TransactionType {
    fn from(value: CoreTransactionType) -> Self {
        match value {
            CoreTransactionType::Sale => Self::Sale,
            CoreTransactionType::Purchase => Self::Purchase,
        }
    }
}

impl From<TransactionType> for CoreTransactionType {
    fn from(value: TransactionType) -> Self {
        match value {
            TransactionType::Sale => Self::Sale,
            TransactionType::Purchase => Self::Purchase,
        }
    }
}

impl From<CoreInvoiceStatus> for InvoiceStatus {
    fn from(value: CoreInvoiceStatus) -> Self {
        match value {
            CoreInvoiceStatus::Draft => Self::Draft,
            CoreInvoiceStatus::Sent => Self::Sent,
            CoreInvoiceStatus::Paid => Self::Paid,
            CoreInvoiceStatus::Overdue => Self::Overdue,
            CoreInvoiceStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<InvoiceStatus> for CoreInvoiceStatus {
    fn from(value: InvoiceStatus) -> Self {
        match value {
            InvoiceStatus::Draft => Self::Draft,
            InvoiceStatus::Sent => Self::Sent,
            InvoiceStatus::Paid => Self::Paid,
            InvoiceStatus::Overdue => Self::Overdue,
            InvoiceStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<CorePaymentMethod> for PaymentMethod {
    fn from(value: CorePaymentMethod) -> Self {
        match value {
            CorePaymentMethod::Cash => Self::Cash,
            CorePaymentMethod::Card => Self::Card,
            CorePaymentMethod::Upi => Self::Upi,
            CorePaymentMethod::BankTransfer => Self::BankTransfer,
            CorePaymentMethod::Cheque => Self::Cheque,
            CorePaymentMethod::Other => Self::Other,
        }
    }
}

impl From<CorePaymentStatus> for PaymentStatus {
    fn from(value: CorePaymentStatus) -> Self {
        match value {
            CorePaymentStatus::Pending => Self::Pending,
            CorePaymentStatus::Completed => Self::Completed,
            CorePaymentStatus::Failed => Self::Failed,
            CorePaymentStatus::Refunded => Self::Refunded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_status_round_trip() {
        for status in CoreInvoiceStatus::ALL {
            let db: InvoiceStatus = status.into();
            assert_eq!(CoreInvoiceStatus::from(db), status);
            assert_eq!(db.to_value(), status.as_str());
        }
    }

    #[test]
    fn test_payment_method_values_match_core() {
        let method: PaymentMethod = CorePaymentMethod::BankTransfer.into();
        assert_eq!(method.to_value(), CorePaymentMethod::BankTransfer.as_str());
    }

    #[test]
    fn test_transaction_type_values_match_core() {
        for kind in [CoreTransactionType::Sale, CoreTransactionType::Purchase] {
            let db: TransactionType = kind.into();
            assert_eq!(db.to_value(), kind.as_str());
            assert_eq!(CoreTransactionType::from(db), kind);
        }
    }
}
