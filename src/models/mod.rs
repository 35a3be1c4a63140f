pub mod chat;
pub mod document;
pub mod edit;
pub mod upload;

pub use chat::{ChatMessage, ChatRole, QuickAction};
pub use document::{
    ClassifiedData, ClassifiedTransaction, DocType, DocumentSummary, InvoiceData,
    InvoiceDocument, InvoiceItem, ReceiptData, ReceiptDocument, ReceiptItem, TotalsCheck,
    TransactionList, VerificationResponse,
};
pub use edit::{
    DocumentEdit, InvoiceEdit, InvoiceItemEdit, ReceiptEdit, ReceiptItemEdit, TransactionEdit,
    TRANSACTION_CATEGORIES,
};
pub use upload::{UploadedFile, VerificationRequest};
