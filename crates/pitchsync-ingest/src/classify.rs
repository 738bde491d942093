//! File classification for the sync driver.
//!
//! Routing is heuristic, driven by path segments and filenames the way
//! the OpenFootball repositories lay files out. The classifier is a
//! total function over a closed enum so the heuristics stay testable;
//! misclassification remains possible (a fixture file named
//! `clubfixtures.txt` would route to the club parser), which is part of
//! why the repair pass exists.

use std::path::Path;

/// The file shapes the ingestion core understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    ClubText,
    ClubJson,
    FixtureText,
    FixtureCsv,
    SquadText,
    Unrecognized,
}

impl FileKind {
    /// Classify a file path relative to its repository root.
    #[must_use]
    pub fn classify(path: &Path) -> Self {
        let file_name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_lowercase(),
            None => return Self::Unrecognized,
        };

        if file_name.starts_with("readme") || file_name.starts_with('.') {
            return Self::Unrecognized;
        }

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        let in_dir = |needle: &str| {
            path.parent()
                .map(|parent| {
                    parent.components().any(|c| {
                        c.as_os_str()
                            .to_str()
                            .is_some_and(|s| s.to_lowercase().contains(needle))
                    })
                })
                .unwrap_or(false)
        };

        let in_squads_dir = in_dir("squads");
        let in_clubs_dir = in_dir("clubs");
        let is_club_file = file_name.contains("club");

        match extension.as_str() {
            "json" if is_club_file || in_clubs_dir => Self::ClubJson,
            "csv" => Self::FixtureCsv,
            "txt" if is_club_file || in_clubs_dir => Self::ClubText,
            "txt" if in_squads_dir => Self::SquadText,
            "txt" => Self::FixtureText,
            _ => Self::Unrecognized,
        }
    }
}
