#![allow(dead_code)]

use serde_json::{json, Value};

pub fn receipt_json() -> Value {
    json!({
        "verification_id": "ver-100",
        "doc_type": "receipt",
        "processed_data": {
            "receipt_id": "R-1001",
            "purchase_date": "2024-03-02",
            "purchase_time": "14:05",
            "vendor_name": "Premium Office Supplies Co.",
            "vendor_address": "4 Side Road",
            "subtotal": 225.0,
            "tax": 20.67,
            "total": 245.67,
            "item_count": 2.0,
            "receipt_items": [
                { "quantity": 3.0, "name": "Paper", "unit_price": 25.0, "total": 75.0 },
                { "quantity": 1.0, "name": "Chair", "unit_price": 150.0, "total": 150.0 }
            ]
        },
        "classified_data": {
            "transactions": {
                "transactions": [
                    {
                        "description": "Office supplies",
                        "amount": 245.67,
                        "transaction_date": "2024-03-02",
                        "transaction_type": "expense",
                        "category": "Office Supplies",
                        "account": "Cash",
                        "source_document_type": "receipt",
                        "source_document_id": "R-1001"
                    }
                ]
            }
        }
    })
}

pub const BOUNDARY: &str = "scan-test-boundary";

/// 构造单字段 multipart 请求体
pub fn multipart_body(field: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}
