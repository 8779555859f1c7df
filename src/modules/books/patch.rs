//! Applies JSON Patch operations to a book.
//!
//! Operations address fields by path (`title` / `/title`, `description` /
//! `/description`) and run in list order. The whole list is applied to a
//! scratch copy, so a failing operation leaves the caller's record untouched.

use bookstore_db::BookRecord;
use serde_json::Value;
use thiserror::Error;

use super::models::{PatchOp, PatchOperation};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("patch document contains no operations")]
    Empty,

    #[error("malformed patch document: {0}")]
    Malformed(String),

    #[error("unknown path '{0}'")]
    UnknownPath(String),

    #[error("operation '{op}' is not supported on '{path}'")]
    Unsupported { op: String, path: String },

    #[error("value for '{0}' must be a string")]
    NotAString(String),

    #[error("test failed: '{0}' does not hold the expected value")]
    TestFailed(String),

    #[error("title must not be blank")]
    BlankTitle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Description,
}

impl Field {
    fn parse(path: &str) -> Option<Self> {
        match path.strip_prefix('/').unwrap_or(path) {
            "title" => Some(Field::Title),
            "description" => Some(Field::Description),
            _ => None,
        }
    }

    fn slot<'a>(&self, book: &'a mut BookRecord) -> &'a mut String {
        match self {
            Field::Title => &mut book.title,
            Field::Description => &mut book.description,
        }
    }
}

fn string_value<'a>(operation: &'a PatchOperation) -> Result<&'a str, PatchError> {
    match &operation.value {
        Some(Value::String(value)) => Ok(value),
        _ => Err(PatchError::NotAString(operation.path.clone())),
    }
}

/// Decode a raw patch document. Unknown operation kinds are reported as
/// [`PatchError::Unsupported`], any other shape problem as
/// [`PatchError::Malformed`].
pub fn parse(document: &Value) -> Result<Vec<PatchOperation>, PatchError> {
    let entries = document
        .as_array()
        .ok_or_else(|| PatchError::Malformed("expected an array of operations".to_string()))?;

    entries.iter().map(parse_operation).collect()
}

fn parse_operation(entry: &Value) -> Result<PatchOperation, PatchError> {
    serde_json::from_value(entry.clone()).map_err(|err| {
        let op = entry.get("op").and_then(Value::as_str);
        match op {
            Some(op) if PatchOp::from_name(op).is_none() => PatchError::Unsupported {
                op: op.to_string(),
                path: entry
                    .get("path")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            },
            _ => PatchError::Malformed(err.to_string()),
        }
    })
}

/// Apply `operations` in order and return the patched copy of `book`
pub fn apply(book: &BookRecord, operations: &[PatchOperation]) -> Result<BookRecord, PatchError> {
    if operations.is_empty() {
        return Err(PatchError::Empty);
    }

    let mut patched = book.clone();
    for operation in operations {
        let field = Field::parse(&operation.path)
            .ok_or_else(|| PatchError::UnknownPath(operation.path.clone()))?;

        match operation.op {
            // Both fields always exist, so `add` behaves like `replace`.
            PatchOp::Replace | PatchOp::Add => {
                *field.slot(&mut patched) = string_value(operation)?.to_string();
            }
            PatchOp::Test => {
                if field.slot(&mut patched).as_str() != string_value(operation)? {
                    return Err(PatchError::TestFailed(operation.path.clone()));
                }
            }
            PatchOp::Remove | PatchOp::Move | PatchOp::Copy => {
                return Err(PatchError::Unsupported {
                    op: operation.op.as_str().to_string(),
                    path: operation.path.clone(),
                });
            }
        }
    }

    if patched.title.trim().is_empty() {
        return Err(PatchError::BlankTitle);
    }

    Ok(patched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn book() -> BookRecord {
        BookRecord {
            id: 1,
            title: "Rust".to_string(),
            description: "Systems language".to_string(),
        }
    }

    #[test]
    fn replaces_both_fields_in_any_order() {
        let ops = vec![
            PatchOperation::replace("description", "This is a description for Javascript language"),
            PatchOperation::replace("/title", "Javascript"),
        ];
        let patched = apply(&book(), &ops).unwrap();
        assert_eq!(patched.title, "Javascript");
        assert_eq!(
            patched.description,
            "This is a description for Javascript language"
        );
        assert_eq!(patched.id, 1);
    }

    #[test]
    fn single_operation_touches_only_its_field() {
        let patched = apply(&book(), &[PatchOperation::replace("title", "Go")]).unwrap();
        assert_eq!(patched.title, "Go");
        assert_eq!(patched.description, "Systems language");
    }

    #[test]
    fn empty_patch_is_an_error() {
        assert_eq!(apply(&book(), &[]).unwrap_err(), PatchError::Empty);
    }

    #[test]
    fn unknown_path_is_rejected() {
        let err = apply(&book(), &[PatchOperation::replace("/author", "me")]).unwrap_err();
        assert_eq!(err, PatchError::UnknownPath("/author".to_string()));
    }

    #[test]
    fn remove_is_not_supported() {
        let op = PatchOperation {
            op: PatchOp::Remove,
            path: "description".to_string(),
            value: None,
            from: None,
        };
        assert!(matches!(
            apply(&book(), &[op]),
            Err(PatchError::Unsupported { op, .. }) if op == "remove"
        ));
    }

    #[test]
    fn non_string_value_is_rejected() {
        let op = PatchOperation {
            op: PatchOp::Replace,
            path: "title".to_string(),
            value: Some(json!(42)),
            from: None,
        };
        assert_eq!(
            apply(&book(), &[op]).unwrap_err(),
            PatchError::NotAString("title".to_string())
        );
    }

    #[test]
    fn blanking_the_title_is_rejected() {
        let err = apply(&book(), &[PatchOperation::replace("title", " ")]).unwrap_err();
        assert_eq!(err, PatchError::BlankTitle);
    }

    #[test]
    fn failed_test_aborts_the_whole_patch() {
        let original = book();
        let ops = vec![
            PatchOperation::replace("title", "Changed"),
            PatchOperation {
                op: PatchOp::Test,
                path: "description".to_string(),
                value: Some(json!("something else")),
                from: None,
            },
        ];
        assert_eq!(
            apply(&original, &ops).unwrap_err(),
            PatchError::TestFailed("description".to_string())
        );
        assert_eq!(original, book());
    }

    #[test]
    fn passing_test_guards_a_replace() {
        let ops = vec![
            PatchOperation {
                op: PatchOp::Test,
                path: "/title".to_string(),
                value: Some(json!("Rust")),
                from: None,
            },
            PatchOperation::replace("title", "Rust 2024"),
        ];
        assert_eq!(apply(&book(), &ops).unwrap().title, "Rust 2024");
    }

    #[test]
    fn parse_reads_rfc6902_operations() {
        let ops = parse(&json!([
            { "op": "replace", "path": "/title", "value": "Dune" },
            { "op": "test", "path": "description", "value": "" }
        ]))
        .unwrap();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0], PatchOperation::replace("/title", "Dune"));
        assert_eq!(ops[1].op, PatchOp::Test);
    }

    #[test]
    fn parse_reports_unknown_kinds_as_unsupported() {
        let err = parse(&json!([{ "op": "upsert", "path": "/title", "value": "x" }])).unwrap_err();
        assert_eq!(
            err,
            PatchError::Unsupported {
                op: "upsert".to_string(),
                path: "/title".to_string(),
            }
        );
    }

    #[test]
    fn parse_rejects_other_shapes() {
        assert!(matches!(
            parse(&json!({ "op": "replace" })),
            Err(PatchError::Malformed(_))
        ));
        assert!(matches!(
            parse(&json!([{ "path": "/title" }])),
            Err(PatchError::Malformed(_))
        ));
        assert!(matches!(
            parse(&json!([42])),
            Err(PatchError::Malformed(_))
        ));
        assert!(parse(&json!([])).unwrap().is_empty());
    }
}
