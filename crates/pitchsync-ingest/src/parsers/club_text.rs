//! OpenFootball club registry text files.
//!
//! ```text
//! Arsenal FC, 1886, @ Emirates Stadium, London (Greater London)
//! | Arsenal | The Gunners
//! ```
//!
//! One club per main line; continuation lines starting with `|` carry
//! alternative names, with everything after `#` treated as a comment.

use std::fs;
use std::path::Path;

use crate::error::IngestResult;
use crate::record::ClubRecord;

/// Parse a club registry file. `country` is a hint derived from the
/// repository the file came from; the file itself never says.
pub fn parse(path: &Path, country: Option<&str>) -> IngestResult<Vec<ClubRecord>> {
    let text = fs::read_to_string(path)?;
    let lines: Vec<&str> = text.lines().collect();

    let mut clubs = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i].trim();
        if line.is_empty() || line.starts_with('=') || line.starts_with('#') {
            i += 1;
            continue;
        }

        let parts: Vec<&str> = line.split(',').map(str::trim).collect();
        let name = parts[0].to_string();
        if name.is_empty() {
            i += 1;
            continue;
        }

        let founded_year = parts
            .get(1)
            .filter(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
            .and_then(|p| p.parse::<i32>().ok());

        let mut stadium_name = None;
        let mut city = None;
        for part in parts.iter().skip(2) {
            if let Some(stadium) = part.strip_prefix('@') {
                stadium_name = Some(stadium.trim().to_string());
            } else if part.contains('(') && part.contains(')') {
                // "London (Greater London)" keeps just the city.
                if let Some((city_part, _)) = part.split_once('(') {
                    city = Some(city_part.trim().to_string());
                }
            } else if !part.is_empty() {
                city = Some((*part).to_string());
            }
        }

        // Continuation lines list alternative names.
        let mut alt_names = Vec::new();
        let mut j = i + 1;
        while j < lines.len() && lines[j].trim().starts_with('|') {
            let alt_line = lines[j].trim().trim_start_matches('|').trim();
            let alt_line = alt_line.split('#').next().unwrap_or_default().trim();
            for alt in alt_line.split('|') {
                let alt = alt.trim();
                if !alt.is_empty() {
                    alt_names.push(alt.to_string());
                }
            }
            j += 1;
        }

        clubs.push(ClubRecord {
            name,
            founded_year,
            stadium_name,
            city,
            country: country.map(str::to_string),
            alternative_names: (!alt_names.is_empty()).then(|| alt_names.join(",")),
        });

        i = j.max(i + 1);
    }

    Ok(clubs)
}
