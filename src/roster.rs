//! Roster loading and validation.
//!
//! A roster is a JSON array of spreadsheet rows, each carrying a `name`
//! and a `username` column. Validation happens before any network call.

use crate::error::RankError;
use crate::models::Identity;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// Load and validate a roster file.
pub fn load_roster(path: &Path) -> Result<Vec<Identity>, RankError> {
    debug!("Reading roster from {}", path.display());
    let content = std::fs::read_to_string(path)?;
    parse_roster(&content)
}

/// Parse roster rows from JSON text.
///
/// Every row must carry a non-empty `name` and `username`. Numeric cells
/// are accepted and converted to text, as spreadsheet exports often
/// produce them for numeric handles.
pub fn parse_roster(content: &str) -> Result<Vec<Identity>, RankError> {
    let value: Value = serde_json::from_str(content)?;

    let rows = match value {
        Value::Array(rows) => rows,
        _ => {
            return Err(RankError::InvalidRosterFormat(
                "expected a JSON array of rows with \"name\" and \"username\" columns".to_string(),
            ))
        }
    };

    if rows.is_empty() {
        return Err(RankError::InvalidRosterFormat(
            "roster is empty; expected rows with \"name\" and \"username\" columns".to_string(),
        ));
    }

    let mut roster = Vec::with_capacity(rows.len());
    for (index, row) in rows.iter().enumerate() {
        let row_number = index + 1;
        let fields = row.as_object().ok_or_else(|| {
            RankError::InvalidRosterFormat(format!("row {} is not an object", row_number))
        })?;

        let handle = required_cell(fields, "username", row_number)?;
        let name = required_cell(fields, "name", row_number)?;
        roster.push(Identity::new(handle, name));
    }

    debug!("Parsed {} roster rows", roster.len());
    Ok(roster)
}

/// Handles in roster order.
pub fn handles(roster: &[Identity]) -> Vec<String> {
    roster.iter().map(|i| i.handle.clone()).collect()
}

fn required_cell(fields: &Map<String, Value>, column: &str, row: usize) -> Result<String, RankError> {
    let text = match fields.get(column) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    };

    if text.is_empty() {
        return Err(RankError::InvalidRosterFormat(format!(
            "row {} is missing the \"{}\" column",
            row, column
        )));
    }

    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const FIXTURE: &str = include_str!("../fixtures/roster.json");

    #[test]
    fn test_parse_fixture() {
        let roster = parse_roster(FIXTURE).unwrap();
        assert_eq!(roster.len(), 5);
        assert_eq!(roster[0], Identity::new("aisha_v", "Aisha Verma"));
        assert_eq!(roster[4].handle, "elif.s");
    }

    #[test]
    fn test_handles_keep_order() {
        let roster = parse_roster(FIXTURE).unwrap();
        assert_eq!(
            handles(&roster),
            vec!["aisha_v", "brunoc", "chenwei42", "dokafor", "elif.s"]
        );
    }

    #[test]
    fn test_first_row_missing_username() {
        let err = parse_roster(r#"[{"name": "Only Name"}]"#).unwrap_err();
        assert!(matches!(err, RankError::InvalidRosterFormat(_)));
        assert!(err.to_string().contains("username"));
    }

    #[test]
    fn test_later_row_missing_name() {
        let err = parse_roster(r#"[{"name": "A", "username": "a"}, {"username": "b"}]"#)
            .unwrap_err();
        assert!(err.to_string().contains("row 2"));
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_empty_cells_rejected() {
        let err = parse_roster(r#"[{"name": "  ", "username": "a"}]"#).unwrap_err();
        assert!(matches!(err, RankError::InvalidRosterFormat(_)));
    }

    #[test]
    fn test_empty_roster_rejected() {
        assert!(matches!(
            parse_roster("[]"),
            Err(RankError::InvalidRosterFormat(_))
        ));
    }

    #[test]
    fn test_not_an_array() {
        assert!(matches!(
            parse_roster(r#"{"name": "A", "username": "a"}"#),
            Err(RankError::InvalidRosterFormat(_))
        ));
    }

    #[test]
    fn test_numeric_handle_accepted() {
        let roster = parse_roster(r#"[{"name": "Numbers", "username": 12345}]"#).unwrap();
        assert_eq!(roster[0].handle, "12345");
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(parse_roster("not json"), Err(RankError::Json(_))));
    }

    #[test]
    fn test_load_roster_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(FIXTURE.as_bytes()).unwrap();

        let roster = load_roster(file.path()).unwrap();
        assert_eq!(roster.len(), 5);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_roster(Path::new("/nonexistent/roster.json")).unwrap_err();
        assert!(matches!(err, RankError::Io(_)));
    }
}
