use serde::{Deserialize, Serialize};

/// A stadium.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ground {
    pub id: i64,
    pub name: String,
    pub city: Option<String>,
    pub country: Option<String>,
    pub capacity: Option<i32>,
}

impl Ground {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            city: None,
            country: None,
            capacity: None,
        }
    }
}

/// A group within a season (cup group stages).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub season_id: i64,
    pub name: String,
}
