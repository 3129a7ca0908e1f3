//! Report preprocessing (spec §4.4, §9's "fixed tokenizer"), ported
//! verbatim from `genetic_improvement/monitor.py`'s `mal_tokenizer` /
//! `preprocess_report`.

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("report is not valid JSON: {0}")]
    MalformedJson(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct Report {
    #[serde(default)]
    dynamic: Vec<DynamicEvent>,
}

#[derive(Debug, Deserialize)]
struct DynamicEvent {
    #[serde(default)]
    #[serde(rename = "Operation")]
    operation: String,
    #[serde(default)]
    #[serde(rename = "Path")]
    path: String,
    #[serde(default)]
    #[serde(rename = "Result")]
    result: String,
}

/// Lowercase, replace `,` and `\` with spaces, whitespace-split (spec
/// §4.4: "apply the tokenizer").
pub fn mal_tokenizer(line: &str) -> Vec<String> {
    line.to_lowercase()
        .replace(',', " ")
        .replace('\\', " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Concatenate every `dynamic[].{Operation, Path, Result}` triplet and
/// tokenize the result (spec §4.4). Only the `dynamic` array is
/// required by the core (spec §6).
pub fn preprocess_report(report_json: &str) -> Result<Vec<String>, ReportError> {
    let report: Report = serde_json::from_str(report_json)?;

    let mut tokens = Vec::new();
    for event in &report.dynamic {
        let line = format!("{}, {}, {}", event.operation, event.path, event.result);
        tokens.extend(mal_tokenizer(&line));
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_strips_separators() {
        let tokens = mal_tokenizer(r"CreateFile, C:\Windows\System32, SUCCESS");
        assert_eq!(tokens, vec!["createfile", "c:", "windows", "system32", "success"]);
    }

    #[test]
    fn preprocesses_dynamic_events_in_order() {
        let report = r#"{
            "static": {"imphash": "deadbeef"},
            "dynamic": [
                {"Operation": "RegOpenKey", "Path": "HKLM\\Software", "Result": "SUCCESS"},
                {"Operation": "Exit", "Path": "", "Result": "SUCCESS"}
            ]
        }"#;
        let tokens = preprocess_report(report).unwrap();
        assert_eq!(
            tokens,
            vec!["regopenkey", "hklm", "software", "success", "exit", "success"]
        );
    }

    #[test]
    fn missing_dynamic_section_yields_no_tokens() {
        let tokens = preprocess_report(r#"{"static": {}}"#).unwrap();
        assert!(tokens.is_empty());
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(preprocess_report("not json").is_err());
    }
}
