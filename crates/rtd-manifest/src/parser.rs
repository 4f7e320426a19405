//! Multi-document manifest parsing.

use crate::errors::ParseError;
use serde_yaml::{Mapping, Value};

const DOCUMENT_SEPARATOR: &str = "---";

/// Parse raw manifest text into one mapping per document.
///
/// Documents are separated by a line holding only `---`. Every document must
/// be a mapping at the top level. Blank and comment-only documents are
/// skipped and do not count towards document indexes; a text with no
/// remaining document is an error.
pub fn parse(raw: &str) -> Result<Vec<Mapping>, ParseError> {
    let documents: Vec<String> = split_documents(raw)
        .into_iter()
        .filter(|segment| !is_blank(segment))
        .collect();
    if documents.is_empty() {
        return Err(ParseError::new("Config file is empty"));
    }

    documents
        .iter()
        .enumerate()
        .map(|(index, segment)| parse_document(segment, index))
        .collect()
}

fn split_documents(raw: &str) -> Vec<String> {
    let mut documents = vec![String::new()];
    for line in raw.lines() {
        if line.trim_end() == DOCUMENT_SEPARATOR {
            documents.push(String::new());
            continue;
        }
        if let Some(current) = documents.last_mut() {
            current.push_str(line);
            current.push('\n');
        }
    }
    documents
}

/// Whitespace and comments only
fn is_blank(segment: &str) -> bool {
    segment
        .lines()
        .map(str::trim)
        .all(|line| line.is_empty() || line.starts_with('#'))
}

fn parse_document(segment: &str, index: usize) -> Result<Mapping, ParseError> {
    let value: Value = serde_yaml::from_str(segment)
        .map_err(|e| ParseError::new(format!("Document {} is not valid YAML: {}", index, e)))?;
    match value {
        Value::Mapping(mapping) => Ok(mapping),
        other => Err(ParseError::new(format!(
            "Document {} is not a mapping, found {}",
            index,
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get<'a>(mapping: &'a Mapping, key: &str) -> Option<&'a Value> {
        mapping.get(Value::String(key.to_string()))
    }

    #[test]
    fn test_parse_empty_config_file() {
        assert!(parse("").is_err());
        assert!(parse("  \n\n").is_err());
        assert!(parse("# c").is_err_and(|e| e.message.contains("empty")));
        assert!(parse("---\n---\n").is_err_and(|e| e.message.contains("empty")));
        assert!(parse("---\n# todo\n---\n\n").is_err());
    }

    #[test]
    fn test_parse_invalid_yaml() {
        assert!(parse("- - !asdf").is_err());
        assert!(parse("name: [unclosed").is_err());
    }

    #[test]
    fn test_parse_bad_type() {
        let result = parse("Hello");
        assert!(result.is_err_and(|e| e.message.contains("not a mapping")));
    }

    #[test]
    fn test_parse_single_config() {
        let Ok(configs) = parse("base: path") else {
            assert!(false, "expected a single document");
            return;
        };
        assert_eq!(configs.len(), 1);
        assert_eq!(
            get(&configs[0], "base"),
            Some(&Value::String("path".to_string()))
        );
    }

    #[test]
    fn test_parse_multiple_configs_in_one_file() {
        let raw = "
base: path
---
base: other_path
name: second
nested:
    works: true
        ";
        let Ok(configs) = parse(raw) else {
            assert!(false, "expected two documents");
            return;
        };
        assert_eq!(configs.len(), 2);
        assert_eq!(
            get(&configs[0], "base"),
            Some(&Value::String("path".to_string()))
        );
        let Some(Value::Mapping(nested)) = get(&configs[1], "nested") else {
            assert!(false, "nested should be a mapping");
            return;
        };
        assert_eq!(get(nested, "works"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_parse_leading_separator() {
        let result = parse("---\nname: docs\n---\nname: api\n");
        assert!(result.is_ok_and(|configs| configs.len() == 2));
    }

    #[test]
    fn test_parse_rejects_non_mapping_document_among_mappings() {
        let result = parse("name: docs\n---\n- a\n- b\n");
        assert!(result.is_err_and(|e| e.message.contains("Document 1")));
    }

    #[test]
    fn test_parse_document_index_skips_blank_documents() {
        let result = parse("---\nname: a\n---\n- x");
        assert!(result.is_err_and(|e| e.message.contains("Document 1")));

        let result = parse("# header\n---\n- x\n");
        assert!(result.is_err_and(|e| e.message.contains("Document 0")));
    }
}
