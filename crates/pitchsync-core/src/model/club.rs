use serde::{Deserialize, Serialize};

/// A real-world football organization.
///
/// `name` is the canonical display identity. It is near-unique rather
/// than strictly unique: the resolver creates placeholder clubs
/// speculatively for team names it has never seen, and a later club file
/// may fill in the details. `alternative_names` accumulates as a
/// comma-joined list while club files are ingested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Club {
    pub id: i64,
    pub name: String,
    pub founded_year: Option<i32>,
    pub stadium_name: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub alternative_names: Option<String>,
}

impl Club {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            founded_year: None,
            stadium_name: None,
            city: None,
            country: None,
            alternative_names: None,
        }
    }

    #[must_use]
    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }

    /// Split the stored comma-joined alternative names back into a list.
    #[must_use]
    pub fn alternative_name_list(&self) -> Vec<&str> {
        self.alternative_names
            .as_deref()
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }
}
