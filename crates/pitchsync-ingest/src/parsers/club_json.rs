//! OpenFootball club registry JSON files: a top-level array of club
//! objects with optional `alt_names`, `founded`, `stadium`, `city` and
//! `country` keys.

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::error::{IngestError, IngestResult};
use crate::mapper::TeamMapper;
use crate::record::ClubRecord;

/// Parse a club JSON file, canonicalizing names through the mapper.
/// Objects without a `name` key are skipped.
pub fn parse(path: &Path, mapper: &TeamMapper) -> IngestResult<Vec<ClubRecord>> {
    let text = fs::read_to_string(path)?;
    let data: Value = serde_json::from_str(&text)?;

    let Some(entries) = data.as_array() else {
        return Err(IngestError::InvalidData(format!(
            "unexpected JSON structure in {}: expected a top-level array",
            path.display()
        )));
    };

    let mut clubs = Vec::new();
    for entry in entries {
        let Some(raw_name) = entry.get("name").and_then(Value::as_str) else {
            continue;
        };
        let name = mapper.canonical(raw_name).to_string();

        let alt_names = match entry.get("alt_names") {
            Some(Value::Array(values)) => values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect::<Vec<_>>(),
            Some(Value::String(value)) => vec![value.clone()],
            _ => Vec::new(),
        };

        clubs.push(ClubRecord {
            name,
            founded_year: entry
                .get("founded")
                .and_then(Value::as_i64)
                .map(|y| y as i32),
            stadium_name: entry
                .get("stadium")
                .and_then(Value::as_str)
                .map(str::to_string),
            city: entry.get("city").and_then(Value::as_str).map(str::to_string),
            country: entry
                .get("country")
                .and_then(Value::as_str)
                .map(str::to_string),
            alternative_names: (!alt_names.is_empty()).then(|| alt_names.join(",")),
        });
    }

    Ok(clubs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_json(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clubs.json");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn test_array_of_clubs() {
        let (_dir, path) = write_json(
            r#"[
                {"name": "Arsenal", "founded": 1886, "stadium": "Emirates Stadium",
                 "city": "London", "country": "England", "alt_names": ["The Gunners"]},
                {"name": "Chelsea", "alt_names": "The Blues"},
                {"founded": 1900}
            ]"#,
        );
        let mut mapper = TeamMapper::empty();
        mapper.insert("Arsenal", "Arsenal FC");

        let clubs = parse(&path, &mapper).unwrap();
        assert_eq!(clubs.len(), 2);
        assert_eq!(clubs[0].name, "Arsenal FC");
        assert_eq!(clubs[0].founded_year, Some(1886));
        assert_eq!(clubs[0].alternative_names.as_deref(), Some("The Gunners"));
        assert_eq!(clubs[1].name, "Chelsea");
        assert_eq!(clubs[1].alternative_names.as_deref(), Some("The Blues"));
    }

    #[test]
    fn test_non_array_is_an_error() {
        let (_dir, path) = write_json(r#"{"name": "Arsenal"}"#);
        assert!(parse(&path, &TeamMapper::empty()).is_err());
    }
}
