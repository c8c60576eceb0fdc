//! Rendering extraction results for the terminal and for files.

use invex_core::ExtractionResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    /// File extension used for per-file output.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Text => "txt",
        }
    }
}

pub fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

pub const CSV_HEADER: [&str; 5] = ["merchant", "amount", "currency", "date", "extraction_method"];

/// Field values in [`CSV_HEADER`] order.
pub fn csv_fields(result: &ExtractionResult) -> [String; 5] {
    [
        result.merchant.clone().unwrap_or_default(),
        result.amount.map(|a| a.to_string()).unwrap_or_default(),
        result.currency.clone(),
        result.date.map(|d| d.to_string()).unwrap_or_default(),
        result.extraction_method.to_string(),
    ]
}

fn format_csv(result: &ExtractionResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(CSV_HEADER)?;
    wtr.write_record(csv_fields(result))?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(result: &ExtractionResult) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "Merchant: {}\n",
        result.merchant.as_deref().unwrap_or("-")
    ));
    match result.amount {
        Some(amount) => output.push_str(&format!("Amount:   {} {}\n", amount, result.currency)),
        None => output.push_str("Amount:   -\n"),
    }
    match result.date {
        Some(date) => output.push_str(&format!("Date:     {}\n", date)),
        None => output.push_str("Date:     -\n"),
    }
    output.push_str(&format!("Source:   {}\n", result.extraction_method));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use invex_core::extract_from_pdf_text;
    use pretty_assertions::assert_eq;

    fn sample() -> ExtractionResult {
        extract_from_pdf_text(&["Invoice\nAcme Co\nTotal: $99.99\nDate: 01/15/2024"]).unwrap()
    }

    #[test]
    fn test_csv() {
        let csv = format_result(&sample(), OutputFormat::Csv).unwrap();
        assert_eq!(
            csv,
            "merchant,amount,currency,date,extraction_method\nAcme Co,99.99,USD,2024-01-15,pdf\n"
        );
    }

    #[test]
    fn test_text() {
        let text = format_result(&sample(), OutputFormat::Text).unwrap();
        assert_eq!(
            text,
            "Merchant: Acme Co\nAmount:   99.99 USD\nDate:     2024-01-15\nSource:   pdf\n"
        );
    }

    #[test]
    fn test_json() {
        let json = format_result(&sample(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["merchant"], "Acme Co");
        assert_eq!(value["extractionMethod"], "pdf");
    }
}
