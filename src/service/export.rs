use crate::error::AppError;
use crate::models::ClassifiedTransaction;

/// 导出记账流水到 CSV (带表头)
pub fn transactions_to_csv(transactions: &[ClassifiedTransaction]) -> Result<String, AppError> {
    use csv::Writer;

    let mut writer = Writer::from_writer(Vec::new());
    writer
        .write_record([
            "description",
            "amount",
            "transaction_date",
            "transaction_type",
            "category",
            "account",
            "source_document_type",
            "source_document_id",
        ])
        .map_err(|e| AppError::Export(e.to_string()))?;

    for tx in transactions {
        writer
            .write_record([
                tx.description.as_str(),
                format!("{:.2}", tx.amount).as_str(),
                tx.transaction_date.as_str(),
                tx.transaction_type.as_str(),
                tx.category.as_str(),
                tx.account.as_str(),
                tx.source_document_type.as_str(),
                tx.source_document_id.as_str(),
            ])
            .map_err(|e| AppError::Export(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AppError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| AppError::Export(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_header_and_quotes_commas() {
        let tx = ClassifiedTransaction {
            description: "Paper, A4".to_string(),
            amount: 75.0,
            transaction_date: "2024-01-16".to_string(),
            transaction_type: "expense".to_string(),
            category: "Office Supplies".to_string(),
            account: "Cash".to_string(),
            source_document_type: "receipt".to_string(),
            source_document_id: "R-7781".to_string(),
        };

        let csv = transactions_to_csv(&[tx]).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some("description,amount,transaction_date,transaction_type,category,account,source_document_type,source_document_id")
        );
        assert_eq!(
            lines.next(),
            Some("\"Paper, A4\",75.00,2024-01-16,expense,Office Supplies,Cash,receipt,R-7781")
        );
        assert_eq!(lines.next(), None);
    }
}
