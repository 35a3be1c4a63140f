use crate::error::AppError;
use crate::models::document::{
    ClassifiedData, ClassifiedTransaction, DocType, InvoiceData, InvoiceItem, ReceiptData,
    ReceiptItem, VerificationResponse,
};
use serde::{Deserialize, Serialize};

/// 字段级修改, 按 `doc_type` 区分; 未出现的字段保持原值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "doc_type", rename_all = "lowercase")]
pub enum DocumentEdit {
    Invoice(InvoiceEdit),
    Receipt(ReceiptEdit),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InvoiceEdit {
    pub invoice_number: Option<String>,
    pub invoice_date: Option<String>,
    pub due_date: Option<String>,
    pub bill_to_name: Option<String>,
    pub bill_to_address: Option<String>,
    pub subtotal: Option<f64>,
    pub sales_tax: Option<f64>,
    pub total: Option<f64>,
    pub payment_due: Option<String>,
    pub items: Vec<InvoiceItemEdit>,
    pub transactions: Vec<TransactionEdit>,
}

/// `index` 必填, 指向 `invoice_items` 中的行
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InvoiceItemEdit {
    pub index: usize,
    pub quantity: Option<f64>,
    pub description: Option<String>,
    pub unit_price: Option<f64>,
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReceiptEdit {
    pub receipt_id: Option<String>,
    pub purchase_date: Option<String>,
    pub purchase_time: Option<String>,
    pub vendor_name: Option<String>,
    pub vendor_address: Option<String>,
    pub subtotal: Option<f64>,
    pub tax: Option<f64>,
    pub total: Option<f64>,
    pub items: Vec<ReceiptItemEdit>,
    pub transactions: Vec<TransactionEdit>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReceiptItemEdit {
    pub index: usize,
    pub quantity: Option<f64>,
    pub name: Option<String>,
    pub unit_price: Option<f64>,
    pub total: Option<f64>,
}

/// 记账流水修改, `index` 指向 `classified_data.transactions.transactions`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransactionEdit {
    pub index: usize,
    pub description: Option<String>,
    pub category: Option<String>,
}

/// 可选的流水分类
pub const TRANSACTION_CATEGORIES: [&str; 6] = [
    "Software & Technology",
    "Office Supplies",
    "Travel & Entertainment",
    "Professional Services",
    "Marketing & Advertising",
    "Other",
];

impl DocumentEdit {
    pub fn doc_type(&self) -> DocType {
        match self {
            DocumentEdit::Invoice(_) => DocType::Invoice,
            DocumentEdit::Receipt(_) => DocType::Receipt,
        }
    }
}

impl VerificationResponse {
    /// 生成修改后的新结果; 出错时原结果不变
    pub fn apply_edit(&self, edit: &DocumentEdit) -> Result<VerificationResponse, AppError> {
        match (self, edit) {
            (VerificationResponse::Invoice(doc), DocumentEdit::Invoice(edit)) => {
                let mut doc = doc.clone();
                doc.processed_data = edit.apply(&doc.processed_data)?;
                doc.classified_data = apply_transactions(&doc.classified_data, &edit.transactions)?;
                Ok(VerificationResponse::Invoice(doc))
            }
            (VerificationResponse::Receipt(doc), DocumentEdit::Receipt(edit)) => {
                let mut doc = doc.clone();
                doc.processed_data = edit.apply(&doc.processed_data)?;
                doc.classified_data = apply_transactions(&doc.classified_data, &edit.transactions)?;
                Ok(VerificationResponse::Receipt(doc))
            }
            _ => Err(AppError::VariantMismatch {
                expected: self.doc_type().to_string(),
                found: edit.doc_type().to_string(),
            }),
        }
    }
}

impl InvoiceEdit {
    fn apply(&self, data: &InvoiceData) -> Result<InvoiceData, AppError> {
        let mut next = data.clone();

        set_text(&mut next.invoice_number, &self.invoice_number, "invoice_number", 1)?;
        set_text(&mut next.invoice_date, &self.invoice_date, "invoice_date", 1)?;
        set_text(&mut next.due_date, &self.due_date, "due_date", 1)?;
        set_text(&mut next.bill_to_name, &self.bill_to_name, "bill_to_name", 2)?;
        set_text(&mut next.bill_to_address, &self.bill_to_address, "bill_to_address", 0)?;
        set_amount(&mut next.subtotal, self.subtotal, "subtotal")?;
        set_amount(&mut next.sales_tax, self.sales_tax, "sales_tax")?;
        set_amount(&mut next.total, self.total, "total")?;
        set_text(&mut next.payment_due, &self.payment_due, "payment_due", 0)?;

        let len = next.invoice_items.len();
        for item_edit in &self.items {
            let item = next
                .invoice_items
                .get_mut(item_edit.index)
                .ok_or(AppError::LineItemOutOfRange { index: item_edit.index, len })?;
            item_edit.apply(item)?;
        }

        Ok(next)
    }
}

impl InvoiceItemEdit {
    fn apply(&self, item: &mut InvoiceItem) -> Result<(), AppError> {
        set_amount(&mut item.quantity, self.quantity, "invoice_items.quantity")?;
        set_text(&mut item.description, &self.description, "invoice_items.description", 1)?;
        set_amount(&mut item.unit_price, self.unit_price, "invoice_items.unit_price")?;
        set_amount(&mut item.amount, self.amount, "invoice_items.amount")
    }
}

impl ReceiptEdit {
    fn apply(&self, data: &ReceiptData) -> Result<ReceiptData, AppError> {
        let mut next = data.clone();

        set_text(&mut next.receipt_id, &self.receipt_id, "receipt_id", 1)?;
        set_text(&mut next.purchase_date, &self.purchase_date, "purchase_date", 1)?;
        if let Some(time) = &self.purchase_time {
            next.purchase_time = Some(time.trim().to_string()).filter(|t| !t.is_empty());
        }
        set_text(&mut next.vendor_name, &self.vendor_name, "vendor_name", 2)?;
        set_text(&mut next.vendor_address, &self.vendor_address, "vendor_address", 0)?;
        set_amount(&mut next.subtotal, self.subtotal, "subtotal")?;
        set_amount(&mut next.tax, self.tax, "tax")?;
        set_amount(&mut next.total, self.total, "total")?;

        let len = next.receipt_items.len();
        for item_edit in &self.items {
            let item = next
                .receipt_items
                .get_mut(item_edit.index)
                .ok_or(AppError::LineItemOutOfRange { index: item_edit.index, len })?;
            item_edit.apply(item)?;
        }

        Ok(next)
    }
}

impl ReceiptItemEdit {
    fn apply(&self, item: &mut ReceiptItem) -> Result<(), AppError> {
        set_amount(&mut item.quantity, self.quantity, "receipt_items.quantity")?;
        set_text(&mut item.name, &self.name, "receipt_items.name", 1)?;
        set_amount(&mut item.unit_price, self.unit_price, "receipt_items.unit_price")?;
        set_amount(&mut item.total, self.total, "receipt_items.total")
    }
}

fn apply_transactions(
    data: &ClassifiedData,
    edits: &[TransactionEdit],
) -> Result<ClassifiedData, AppError> {
    if edits.is_empty() {
        return Ok(data.clone());
    }

    let mut next = data.clone();
    let transactions = &mut next.transactions.transactions;
    let len = transactions.len();
    for edit in edits {
        let tx = transactions
            .get_mut(edit.index)
            .ok_or(AppError::TransactionOutOfRange { index: edit.index, len })?;
        edit.apply(tx)?;
    }
    Ok(next)
}

impl TransactionEdit {
    fn apply(&self, tx: &mut ClassifiedTransaction) -> Result<(), AppError> {
        set_text(&mut tx.description, &self.description, "transactions.description", 1)?;
        if let Some(category) = &self.category {
            let category = category.trim();
            if !TRANSACTION_CATEGORIES.contains(&category) {
                return Err(AppError::invalid_field(
                    "transactions.category",
                    format!("must be one of: {}", TRANSACTION_CATEGORIES.join(", ")),
                ));
            }
            tx.category = category.to_string();
        }
        Ok(())
    }
}

fn set_text(
    slot: &mut String,
    value: &Option<String>,
    field: &str,
    min_chars: usize,
) -> Result<(), AppError> {
    let Some(value) = value else {
        return Ok(());
    };
    let trimmed = value.trim();
    if trimmed.chars().count() < min_chars {
        let reason = if min_chars <= 1 {
            "is required".to_string()
        } else {
            format!("must be at least {} characters", min_chars)
        };
        return Err(AppError::invalid_field(field, reason));
    }
    *slot = trimmed.to_string();
    Ok(())
}

fn set_amount(slot: &mut f64, value: Option<f64>, field: &str) -> Result<(), AppError> {
    let Some(value) = value else {
        return Ok(());
    };
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::invalid_field(field, "must be a number >= 0"));
    }
    *slot = value;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::fixtures::*;
    use serde_json::json;

    #[test]
    fn single_header_edit_leaves_everything_else_untouched() {
        let original = invoice();
        let edit = DocumentEdit::Invoice(InvoiceEdit {
            bill_to_name: Some("Golden Tech Holdings".to_string()),
            ..Default::default()
        });

        let edited = original.apply_edit(&edit).unwrap();

        let mut expected = invoice_json();
        expected["processed_data"]["bill_to_name"] = "Golden Tech Holdings".into();
        assert_eq!(serde_json::to_value(&edited).unwrap(), expected);
        assert_eq!(edited.doc_type(), DocType::Invoice);
    }

    #[test]
    fn line_item_edit_touches_only_that_item() {
        let original = receipt();
        let edit = DocumentEdit::Receipt(ReceiptEdit {
            items: vec![ReceiptItemEdit {
                index: 1,
                name: Some("Desk chair".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        });

        let edited = original.apply_edit(&edit).unwrap();

        let mut expected = receipt_json();
        expected["processed_data"]["receipt_items"][1]["name"] = "Desk chair".into();
        assert_eq!(serde_json::to_value(&edited).unwrap(), expected);
    }

    #[test]
    fn cross_variant_edit_is_rejected() {
        let original = invoice();
        let edit = DocumentEdit::Receipt(ReceiptEdit {
            vendor_name: Some("Someone Else".to_string()),
            ..Default::default()
        });

        let err = original.apply_edit(&edit).unwrap_err();
        assert!(matches!(err, AppError::VariantMismatch { .. }));
        assert_eq!(original, invoice());
    }

    #[test]
    fn validation_follows_form_rules() {
        let original = receipt();

        let short_vendor = DocumentEdit::Receipt(ReceiptEdit {
            vendor_name: Some(" A ".to_string()),
            ..Default::default()
        });
        assert!(matches!(
            original.apply_edit(&short_vendor),
            Err(AppError::InvalidField { ref field, .. }) if field == "vendor_name"
        ));

        let negative_total = DocumentEdit::Receipt(ReceiptEdit {
            total: Some(-1.0),
            ..Default::default()
        });
        assert!(original.apply_edit(&negative_total).is_err());

        let blank_date = DocumentEdit::Receipt(ReceiptEdit {
            purchase_date: Some("  ".to_string()),
            ..Default::default()
        });
        assert!(original.apply_edit(&blank_date).is_err());
    }

    #[test]
    fn failed_edit_is_all_or_nothing() {
        let original = invoice();
        let edit = DocumentEdit::Invoice(InvoiceEdit {
            bill_to_name: Some("Valid Name".to_string()),
            items: vec![InvoiceItemEdit {
                index: 5,
                amount: Some(10.0),
                ..Default::default()
            }],
            ..Default::default()
        });

        let err = original.apply_edit(&edit).unwrap_err();
        assert!(matches!(err, AppError::LineItemOutOfRange { index: 5, len: 2 }));
        assert_eq!(original, invoice());
    }

    #[test]
    fn edit_deserializes_from_tagged_json() {
        let edit: DocumentEdit = serde_json::from_value(json!({
            "doc_type": "invoice",
            "total": 1300.0,
            "items": [{ "index": 0, "quantity": 3.0 }]
        }))
        .unwrap();

        match edit {
            DocumentEdit::Invoice(edit) => {
                assert_eq!(edit.total, Some(1300.0));
                assert_eq!(edit.items[0].quantity, Some(3.0));
                assert_eq!(edit.invoice_number, None);
            }
            other => panic!("unexpected {:?}", other.doc_type()),
        }
    }

    #[test]
    fn item_edit_without_index_is_rejected() {
        let parsed = serde_json::from_value::<DocumentEdit>(json!({
            "doc_type": "receipt",
            "items": [{ "name": "Oops" }]
        }));
        assert!(parsed.is_err());

        let parsed = serde_json::from_value::<DocumentEdit>(json!({
            "doc_type": "invoice",
            "transactions": [{ "category": "Other" }]
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn category_edit_touches_only_that_transaction() {
        let mut value = receipt_json();
        let second = json!({
            "description": "Delivery",
            "amount": 12.5,
            "transaction_date": "2024-01-16",
            "transaction_type": "expense",
            "category": "Other",
            "account": "Cash",
            "source_document_type": "receipt",
            "source_document_id": "R-7781"
        });
        value["classified_data"]["transactions"]["transactions"]
            .as_array_mut()
            .unwrap()
            .push(second);
        let original: VerificationResponse = serde_json::from_value(value.clone()).unwrap();

        let edit: DocumentEdit = serde_json::from_value(json!({
            "doc_type": "receipt",
            "transactions": [{ "index": 0, "category": "Professional Services" }]
        }))
        .unwrap();
        let edited = original.apply_edit(&edit).unwrap();

        let mut expected = value;
        expected["classified_data"]["transactions"]["transactions"][0]["category"] =
            "Professional Services".into();
        assert_eq!(serde_json::to_value(&edited).unwrap(), expected);
        assert_eq!(edited.summary().category.as_deref(), Some("Professional Services"));
    }

    #[test]
    fn category_must_come_from_the_fixed_list() {
        let original = invoice();
        let edit = DocumentEdit::Invoice(InvoiceEdit {
            bill_to_name: Some("Valid Name".to_string()),
            transactions: vec![TransactionEdit {
                index: 0,
                category: Some("Groceries".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        });
        assert!(matches!(
            original.apply_edit(&edit),
            Err(AppError::InvalidField { ref field, .. }) if field == "transactions.category"
        ));

        let out_of_range = DocumentEdit::Invoice(InvoiceEdit {
            transactions: vec![TransactionEdit {
                index: 3,
                category: Some("Other".to_string()),
                ..Default::default()
            }],
            ..Default::default()
        });
        assert!(matches!(
            original.apply_edit(&out_of_range),
            Err(AppError::TransactionOutOfRange { index: 3, len: 1 })
        ));
        assert_eq!(original, invoice());
    }

    #[test]
    fn edit_with_field_of_other_variant_is_rejected() {
        let parsed = serde_json::from_value::<DocumentEdit>(json!({
            "doc_type": "invoice",
            "vendor_name": "Mixed"
        }));
        assert!(parsed.is_err());
    }
}
