use bookstore_db::{BookRecord, NewBook};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub use bookstore_db::BookId;

/// A book as exposed over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Store-assigned identifier
    pub id: BookId,
    pub title: String,
    pub description: String,
}

impl From<BookRecord> for Book {
    fn from(record: BookRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            description: record.description,
        }
    }
}

impl From<Book> for BookRecord {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            description: book.description,
        }
    }
}

/// Body of `POST /books` and `PUT /books/{id}`. Any `id` sent by the
/// client is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl BookInput {
    /// Per-field problems, empty when the input is acceptable
    pub fn problems(&self) -> Vec<Value> {
        let mut problems = Vec::new();
        if self.title.trim().is_empty() {
            problems.push(json!({ "field": "title", "error": "required" }));
        }
        problems
    }
}

impl From<BookInput> for NewBook {
    fn from(input: BookInput) -> Self {
        Self {
            title: input.title,
            description: input.description,
        }
    }
}

/// JSON Patch operation kinds (RFC 6902)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Add,
    Remove,
    Replace,
    Move,
    Copy,
    Test,
}

impl PatchOp {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "add" => Some(PatchOp::Add),
            "remove" => Some(PatchOp::Remove),
            "replace" => Some(PatchOp::Replace),
            "move" => Some(PatchOp::Move),
            "copy" => Some(PatchOp::Copy),
            "test" => Some(PatchOp::Test),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PatchOp::Add => "add",
            PatchOp::Remove => "remove",
            PatchOp::Replace => "replace",
            PatchOp::Move => "move",
            PatchOp::Copy => "copy",
            PatchOp::Test => "test",
        }
    }
}

/// One entry of a `PATCH /books/{id}` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: PatchOp,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
}

impl PatchOperation {
    pub fn replace(path: &str, value: &str) -> Self {
        Self {
            op: PatchOp::Replace,
            path: path.to_string(),
            value: Some(Value::String(value.to_string())),
            from: None,
        }
    }
}
