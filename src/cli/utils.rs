use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Print a success message, with `record` merged in for JSON output
pub fn output_success<T: Serialize>(
    output_format: OutputFormat,
    message: &str,
    record: Option<&T>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });
            if let Some(record) = record {
                response["data"] = serde_json::to_value(record)?;
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Key/value detail lines for text output
pub fn output_fields(output_format: OutputFormat, fields: &[(&str, Value)]) {
    if output_format == OutputFormat::Text {
        for (key, value) in fields {
            let shown = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            println!("  {:<14} {}", format!("{}:", key), shown);
        }
    }
}
