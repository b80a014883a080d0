use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use super::error::{DomainError, DomainResult};
use super::priority::{Priority, PriorityFilter};

pub const MIN_TODO_LEN: usize = 3;
pub const MAX_TODO_LEN: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(pub i64);

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TodoId {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        s.trim()
            .parse::<i64>()
            .map(TodoId)
            .map_err(|_| DomainError::InvalidId(s.to_string()))
    }
}

/// A single entry in the list. The id is always assigned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: TodoId,
    pub todo: String,
    #[serde(default, deserialize_with = "lenient_priority")]
    pub priority: Priority,
}

// Stored rows are not checked against the enum. A null, blank or unknown priority reads as low
// so one bad row cannot fail the whole list.
fn lenient_priority<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Priority, D::Error> {
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()).unwrap_or_default())
}

impl Todo {
    pub fn matches(&self, filter: PriorityFilter) -> bool {
        filter.admits(self.priority)
    }
}

/// Trims `text` and checks it against the length bounds shared by create and update.
///
/// Length is counted in characters, not bytes.
pub fn validate_todo_text(text: &str) -> DomainResult<String> {
    let trimmed = text.trim();
    let len = trimmed.chars().count();

    if len < MIN_TODO_LEN || len > MAX_TODO_LEN {
        return Err(DomainError::Validation(format!(
            "To-Do must be between {MIN_TODO_LEN} and {MAX_TODO_LEN} characters"
        )));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_trims_and_accepts_bounds() {
        assert_eq!(validate_todo_text("  abc  ").unwrap(), "abc");
        assert!(validate_todo_text(&"x".repeat(100)).is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        for text in ["", "  ", "ab", "  ab  "] {
            assert!(validate_todo_text(text).is_err(), "{text:?} should be rejected");
        }
        assert!(validate_todo_text(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_counts_chars_not_bytes() {
        // three chars, nine bytes
        assert!(validate_todo_text("日本語").is_ok());
        assert!(validate_todo_text(&"é".repeat(100)).is_ok());
    }

    #[test]
    fn test_todo_deserializes_without_priority() {
        let todo: Todo = serde_json::from_str(r#"{"id": 7, "todo": "Walk dog"}"#).unwrap();
        assert_eq!(todo.id, TodoId(7));
        assert_eq!(todo.priority, Priority::Low);
    }

    #[test]
    fn test_list_with_null_or_unknown_priority_still_parses() {
        let todos: Vec<Todo> = serde_json::from_str(
            r#"[
                {"id": 1, "todo": "Walk dog", "priority": null},
                {"id": 2, "todo": "Buy milk", "priority": "HIGH"},
                {"id": 3, "todo": "Call mum", "priority": ""},
                {"id": 4, "todo": "Pay rent", "priority": "urgent"}
            ]"#,
        )
        .unwrap();

        let priorities: Vec<Priority> = todos.iter().map(|t| t.priority).collect();
        assert_eq!(
            priorities,
            vec![Priority::Low, Priority::High, Priority::Low, Priority::Low]
        );
        assert_eq!(todos[0].todo, "Walk dog");
    }

    #[test]
    fn test_todo_id_from_str() {
        assert_eq!(" 42 ".parse::<TodoId>().unwrap(), TodoId(42));
        assert!("abc".parse::<TodoId>().is_err());
    }
}
