//! Post-hoc repair for resolution misfires.
//!
//! Fuzzy name resolution occasionally lands a team's fixture in the
//! wrong country's competition, and the same real-world match can end
//! up inserted under two competitions. Both are cheaper to detect
//! after the fact than to prevent during ingest, so this pass runs
//! over the whole fixtures table and deletes the offenders. Running it
//! twice finds nothing the second time.
//!
//! Country attribution is a hand-maintained keyword table, matched by
//! substring against club names. Keywords are only as good as the
//! table; a country absent from it is simply never checked.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use pitchsync_core::{Database, FixtureDetail};

use crate::error::IngestResult;

/// Distinctive club-name substrings per country. Umlaut spellings and
/// their ASCII fallbacks both appear because the raw files use both.
const COUNTRY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Germany",
        &[
            "München",
            "Munchen",
            "Dortmund",
            "Bayern",
            "Nürnberg",
            "Nurnberg",
            "Köln",
            "Koln",
            "Werder",
            "Hertha",
            "Stuttgart",
            "Hamburg",
            "Leverkusen",
            "Flensburg",
            "Oldenburg",
            "Lübeck",
            "Jeddeloh",
            "Havelse",
            "Kickers Emden",
            "Norderstedt",
            "Türkgücü",
        ],
    ),
    (
        "Spain",
        &[
            "Madrid",
            "Barcelona",
            "Sevilla",
            "Valencia",
            "Atletico",
            "Atlético",
            "Villarreal",
            "Real",
            "Getafe",
            "Mallorca",
            "Vallecano",
            "Sociedad",
            "Almeria",
            "Cadiz",
            "Cádiz",
            "Las Palmas",
            "Girona",
            "Betis",
        ],
    ),
];

fn matches_country(team_name: &str, country: &str) -> bool {
    COUNTRY_KEYWORDS
        .iter()
        .find(|(name, _)| *name == country)
        .is_some_and(|(_, keywords)| keywords.iter().any(|k| team_name.contains(k)))
}

/// What a repair run removed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RepairReport {
    /// Fixtures whose teams belong to a different country than their
    /// competition.
    pub misassigned_removed: u64,
    /// Surplus copies of duplicated `(home, away, date)` fixtures.
    pub duplicates_removed: u64,
}

impl RepairReport {
    #[must_use]
    pub fn is_clean(self) -> bool {
        self.misassigned_removed == 0 && self.duplicates_removed == 0
    }
}

/// Run both repair phases in one transaction and return what was
/// deleted.
pub fn run_repair(db: &Database) -> IngestResult<RepairReport> {
    db.in_transaction(|db| {
        let details = db.list_fixture_details()?;
        let mut report = RepairReport::default();
        let mut doomed: HashSet<i64> = HashSet::new();

        find_misassigned(&details, &mut doomed);
        report.misassigned_removed = doomed.len() as u64;

        let priority = competition_priority(db)?;
        report.duplicates_removed = find_duplicates(&details, &priority, &mut doomed);

        for fixture_id in &doomed {
            db.delete_fixture(*fixture_id)?;
        }
        if !report.is_clean() {
            log::info!(
                "repair removed {} misassigned and {} duplicate fixtures",
                report.misassigned_removed,
                report.duplicates_removed
            );
        }
        Ok(report)
    })
}

/// A fixture is misassigned when a team keyword-matches some other
/// country than its competition's, and the pairing does not also look
/// native. "Does not look native" is the `!(home && away)` guard: a
/// derby between two clubs of the competition's own country never gets
/// deleted even if one name also matches a foreign keyword.
fn find_misassigned(details: &[FixtureDetail], doomed: &mut HashSet<i64>) {
    for detail in details {
        let Some(comp_country) = detail.competition_country.as_deref() else {
            continue;
        };

        let home_native = matches_country(&detail.home_name, comp_country);
        let away_native = matches_country(&detail.away_name, comp_country);

        for (foreign, _) in COUNTRY_KEYWORDS {
            if *foreign == comp_country {
                continue;
            }
            let home_foreign = matches_country(&detail.home_name, foreign);
            let away_foreign = matches_country(&detail.away_name, foreign);
            if (home_foreign || away_foreign) && !(home_native && away_native) {
                log::info!(
                    "misassigned fixture {}: {} vs {} in {comp_country} competition {:?}",
                    detail.fixture_id,
                    detail.home_name,
                    detail.away_name,
                    detail.competition_name
                );
                doomed.insert(detail.fixture_id);
                break;
            }
        }
    }
}

/// Competition id to priority index, in creation order: the earlier a
/// competition was first seen, the more authoritative its copy of a
/// duplicated fixture.
fn competition_priority(db: &Database) -> pitchsync_core::Result<HashMap<i64, usize>> {
    Ok(db
        .list_competitions()?
        .into_iter()
        .enumerate()
        .map(|(index, competition)| (competition.id, index))
        .collect())
}

fn find_duplicates(
    details: &[FixtureDetail],
    priority: &HashMap<i64, usize>,
    doomed: &mut HashSet<i64>,
) -> u64 {
    let mut groups: HashMap<(&str, &str, NaiveDate), Vec<&FixtureDetail>> = HashMap::new();
    for detail in details {
        if doomed.contains(&detail.fixture_id) {
            continue;
        }
        let Some(date) = detail.match_date else {
            continue;
        };
        groups
            .entry((detail.home_name.as_str(), detail.away_name.as_str(), date))
            .or_default()
            .push(detail);
    }

    let mut removed = 0;
    for ((home, away, date), mut group) in groups {
        if group.len() < 2 {
            continue;
        }

        // When both teams unambiguously belong to one keyword country,
        // copies in other countries' competitions lose outright.
        let correct_country = COUNTRY_KEYWORDS
            .iter()
            .map(|(country, _)| *country)
            .find(|country| matches_country(home, country) && matches_country(away, country));

        group.sort_by_key(|detail| {
            let wrong_country = correct_country.is_some_and(|country| {
                detail.competition_country.as_deref() != Some(country)
            });
            let rank = detail
                .competition_id
                .and_then(|id| priority.get(&id).copied())
                .unwrap_or(usize::MAX);
            (wrong_country, rank, detail.fixture_id)
        });

        let keep = group[0];
        log::info!(
            "duplicate fixture {home} vs {away} on {date}: keeping copy in {:?}",
            keep.competition_name
        );
        for detail in &group[1..] {
            doomed.insert(detail.fixture_id);
            removed += 1;
        }
    }
    removed
}
