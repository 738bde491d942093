use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A squad member parsed from OpenFootball squad files.
///
/// Squad files carry partial data; every field except the name is
/// optional. Birth dates derived from a bare `b. YYYY` token are stored
/// as January 1st of that year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub nationality: Option<String>,
    pub position: Option<String>,
    pub team_id: Option<i64>,
    pub club_id: Option<i64>,
}

impl Player {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            date_of_birth: None,
            nationality: None,
            position: None,
            team_id: None,
            club_id: None,
        }
    }
}
