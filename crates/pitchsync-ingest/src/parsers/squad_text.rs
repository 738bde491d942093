//! OpenFootball squad text files, one player per comma-separated line:
//!
//! ```text
//!  1,  Aaron Ramsdale,  GK,  b. 1998,  (ENG),  Sheffield United
//! ```
//!
//! Shirt number is optional; everything after the position is sniffed
//! by shape (a `b. YYYY` birth year, a parenthesized nationality code,
//! else a current-club note).

use std::fs;
use std::path::Path;

use crate::error::IngestResult;
use crate::record::PlayerRecord;

/// Parse a squad file. Lines with fewer than three comma-separated
/// fields are skipped.
pub fn parse(path: &Path) -> IngestResult<Vec<PlayerRecord>> {
    let text = fs::read_to_string(path)?;

    let mut players = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('=') || line.starts_with('#') {
            continue;
        }

        let parts: Vec<&str> = line.split(',').map(str::trim).collect();
        if parts.len() < 3 {
            continue;
        }

        let number = parts[0]
            .chars()
            .all(|c| c.is_ascii_digit())
            .then(|| parts[0].parse::<i32>().ok())
            .flatten();

        let name = parts[1].to_string();
        if name.is_empty() {
            continue;
        }
        let position = (!parts[2].is_empty()).then(|| parts[2].to_string());

        let mut birth_year = None;
        let mut nationality = None;
        let mut current_club = None;
        for part in parts.iter().skip(3) {
            if let Some(year) = part.strip_prefix("b. ") {
                birth_year = year.trim().parse::<i32>().ok();
            } else if let (Some(open), Some(close)) = (part.find('('), part.find(')')) {
                let code = &part[open + 1..close];
                if code.len() <= 4 {
                    nationality = Some(code.to_string());
                }
            } else if !part.is_empty() {
                current_club = Some((*part).to_string());
            }
        }

        players.push(PlayerRecord {
            name,
            position,
            birth_year,
            nationality,
            number,
            current_club,
        });
    }

    Ok(players)
}
