use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 单据类型 (判别字段 `doc_type` 的取值)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Invoice,
    Receipt,
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocType::Invoice => f.write_str("invoice"),
            DocType::Receipt => f.write_str("receipt"),
        }
    }
}

/// 远程核验结果, 按 `doc_type` 区分发票/收据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "doc_type", rename_all = "lowercase")]
pub enum VerificationResponse {
    Invoice(InvoiceDocument),
    Receipt(ReceiptDocument),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDocument {
    pub verification_id: String,
    pub processed_data: InvoiceData,
    pub classified_data: ClassifiedData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptDocument {
    pub verification_id: String,
    pub processed_data: ReceiptData,
    pub classified_data: ClassifiedData,
}

/// 发票抬头 + 明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceData {
    pub invoice_number: String,
    pub invoice_date: String,
    pub due_date: String,
    pub bill_to_name: String,
    pub bill_to_address: String,
    pub subtotal: f64,
    pub sales_tax: f64,
    pub total: f64,
    pub payment_due: String,
    pub invoice_items: Vec<InvoiceItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub quantity: f64,
    pub description: String,
    pub unit_price: f64,
    pub amount: f64,
}

/// 收据抬头 + 明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptData {
    pub receipt_id: String,
    pub purchase_date: String,
    pub purchase_time: Option<String>,
    pub vendor_name: String,
    pub vendor_address: String,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub item_count: f64,
    pub receipt_items: Vec<ReceiptItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub quantity: f64,
    pub name: String,
    pub unit_price: f64,
    pub total: f64,
}

/// 分类后的记账流水 (两种单据共用)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedData {
    pub transactions: TransactionList,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionList {
    pub transactions: Vec<ClassifiedTransaction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedTransaction {
    pub description: String,
    pub amount: f64,
    pub transaction_date: String,
    pub transaction_type: String,
    pub category: String,
    pub account: String,
    pub source_document_type: String,
    pub source_document_id: String,
}

/// 结果卡片摘要
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSummary {
    pub doc_type: DocType,
    pub verification_id: String,
    pub party: String,
    pub document_date: String,
    pub total: f64,
    /// 首条记账流水的分类
    pub category: Option<String>,
    pub line_item_count: usize,
    pub transaction_count: usize,
}

/// 金额核对结果 (按分取整后比较)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalsCheck {
    pub items_sum: BigDecimal,
    pub subtotal: BigDecimal,
    pub tax: BigDecimal,
    pub total: BigDecimal,
    pub items_match_subtotal: bool,
    pub subtotal_plus_tax_matches_total: bool,
}

impl VerificationResponse {
    pub fn doc_type(&self) -> DocType {
        match self {
            VerificationResponse::Invoice(_) => DocType::Invoice,
            VerificationResponse::Receipt(_) => DocType::Receipt,
        }
    }

    pub fn verification_id(&self) -> &str {
        match self {
            VerificationResponse::Invoice(doc) => &doc.verification_id,
            VerificationResponse::Receipt(doc) => &doc.verification_id,
        }
    }

    pub fn transactions(&self) -> &[ClassifiedTransaction] {
        match self {
            VerificationResponse::Invoice(doc) => &doc.classified_data.transactions.transactions,
            VerificationResponse::Receipt(doc) => &doc.classified_data.transactions.transactions,
        }
    }

    pub fn category(&self) -> Option<String> {
        self.transactions().first().map(|tx| tx.category.clone())
    }

    pub fn summary(&self) -> DocumentSummary {
        match self {
            VerificationResponse::Invoice(doc) => DocumentSummary {
                doc_type: DocType::Invoice,
                verification_id: doc.verification_id.clone(),
                party: doc.processed_data.bill_to_name.clone(),
                document_date: doc.processed_data.invoice_date.clone(),
                total: doc.processed_data.total,
                category: self.category(),
                line_item_count: doc.processed_data.invoice_items.len(),
                transaction_count: doc.classified_data.transactions.transactions.len(),
            },
            VerificationResponse::Receipt(doc) => DocumentSummary {
                doc_type: DocType::Receipt,
                verification_id: doc.verification_id.clone(),
                party: doc.processed_data.vendor_name.clone(),
                document_date: doc.processed_data.purchase_date.clone(),
                total: doc.processed_data.total,
                category: self.category(),
                line_item_count: doc.processed_data.receipt_items.len(),
                transaction_count: doc.classified_data.transactions.transactions.len(),
            },
        }
    }

    /// 核对明细合计/小计/税额/总额; 任一金额非有限数时返回 None
    pub fn check_totals(&self) -> Option<TotalsCheck> {
        let (line_amounts, subtotal, tax, total): (Vec<f64>, f64, f64, f64) = match self {
            VerificationResponse::Invoice(doc) => {
                let data = &doc.processed_data;
                (
                    data.invoice_items.iter().map(|i| i.amount).collect(),
                    data.subtotal,
                    data.sales_tax,
                    data.total,
                )
            }
            VerificationResponse::Receipt(doc) => {
                let data = &doc.processed_data;
                (
                    data.receipt_items.iter().map(|i| i.total).collect(),
                    data.subtotal,
                    data.tax,
                    data.total,
                )
            }
        };

        let mut items_sum = BigDecimal::from(0);
        for amount in line_amounts {
            items_sum += to_cents(amount)?;
        }
        let subtotal = to_cents(subtotal)?;
        let tax = to_cents(tax)?;
        let total = to_cents(total)?;

        Some(TotalsCheck {
            items_match_subtotal: items_sum == subtotal,
            subtotal_plus_tax_matches_total: &subtotal + &tax == total,
            items_sum,
            subtotal,
            tax,
            total,
        })
    }
}

fn to_cents(value: f64) -> Option<BigDecimal> {
    if !value.is_finite() {
        return None;
    }
    value.to_string().parse::<BigDecimal>().ok().map(|d| d.round(2))
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn discriminant_selects_variant() {
        assert_eq!(invoice().doc_type(), DocType::Invoice);
        assert_eq!(receipt().doc_type(), DocType::Receipt);
        match receipt() {
            VerificationResponse::Receipt(doc) => {
                assert_eq!(doc.processed_data.purchase_time, None);
                assert_eq!(doc.processed_data.receipt_items.len(), 2);
            }
            other => panic!("expected receipt, got {:?}", other.doc_type()),
        }
    }

    #[test]
    fn serialization_keeps_doc_type_at_top_level() {
        let value = serde_json::to_value(invoice()).unwrap();
        assert_eq!(value, invoice_json());
    }

    #[test]
    fn unknown_doc_type_is_rejected() {
        let mut value = invoice_json();
        value["doc_type"] = "purchase_order".into();
        assert!(serde_json::from_value::<VerificationResponse>(value).is_err());
    }

    #[test]
    fn invoice_shape_under_receipt_tag_is_rejected() {
        let mut value = invoice_json();
        value["doc_type"] = "receipt".into();
        assert!(serde_json::from_value::<VerificationResponse>(value).is_err());
    }

    #[test]
    fn summary_uses_variant_specific_party_and_date() {
        let summary = receipt().summary();
        assert_eq!(summary.party, "Premium Office Supplies Co.");
        assert_eq!(summary.document_date, "2024-01-16");
        assert_eq!(summary.total, 245.67);
        assert_eq!(summary.category.as_deref(), Some("Office Supplies"));
        assert_eq!(summary.line_item_count, 2);
        assert_eq!(summary.transaction_count, 1);
    }

    #[test]
    fn totals_check_matches_consistent_documents() {
        let check = receipt().check_totals().unwrap();
        assert!(check.items_match_subtotal);
        assert!(check.subtotal_plus_tax_matches_total);

        let check = invoice().check_totals().unwrap();
        assert!(check.items_match_subtotal);
        assert!(check.subtotal_plus_tax_matches_total);
    }

    #[test]
    fn totals_check_flags_mismatch() {
        let mut value = invoice_json();
        value["processed_data"]["total"] = 1300.0.into();
        let doc: VerificationResponse = serde_json::from_value(value).unwrap();
        let check = doc.check_totals().unwrap();
        assert!(check.items_match_subtotal);
        assert!(!check.subtotal_plus_tax_matches_total);
    }
}
