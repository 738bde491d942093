//! Team-name canonicalization.
//!
//! The raw repositories spell the same club half a dozen ways: the club
//! registry says `Manchester City FC`, fixture files say `Man City`,
//! squad files are named `manchester_city.txt`. The mapper is a flat
//! variant-to-canonical dictionary built ahead of a sync run from every
//! spelling the data tree contains, plus a normalized form of each so
//! that suffix noise (`FC`, `AFC`, founding years) collapses too.
//!
//! Lookup is a plain dictionary lookup. Nothing fuzzy happens at sync
//! time; if a spelling is missing from the mapper it passes through
//! unchanged and resolves (or placeholder-creates) under its own name.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use walkdir::WalkDir;

use crate::classify::FileKind;
use crate::error::IngestResult;
use crate::parsers;

/// Suffix tokens stripped from the end of a name, repeatedly, during
/// normalization. Order matters only in that multi-word entries must
/// come before their tails.
const STRIP_SUFFIXES: &[&str] = &[
    "football club",
    // what "F.C." becomes after punctuation is spaced out
    "f c",
    "fc",
    "afc",
    "cf",
    "sc",
    "ac",
    "united",
    "utd",
    "city",
];

static PUNCT_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"['\.&\-]").unwrap()
});

static WS_RE: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"\s+").unwrap()
});

/// Reduce a team name to a comparison key: lowercase, punctuation to
/// spaces, common suffixes and founding-year digits stripped, runs of
/// whitespace collapsed.
///
/// `Manchester United FC` and `Man Utd` do not collapse to one key
/// (abbreviation is out of scope), but `Arsenal FC`, `Arsenal F.C.`
/// and `Arsenal` all do.
#[must_use]
pub fn normalize_team_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let spaced = PUNCT_RE.replace_all(&lowered, " ");
    let collapsed = WS_RE.replace_all(spaced.trim(), " ").to_string();

    let mut tokens: Vec<&str> = collapsed.split(' ').collect();
    loop {
        let mut stripped = false;
        for suffix in STRIP_SUFFIXES {
            let words: Vec<&str> = suffix.split(' ').collect();
            if tokens.len() > words.len() && tokens.ends_with(&words) {
                tokens.truncate(tokens.len() - words.len());
                stripped = true;
                break;
            }
        }
        // Founding years tacked onto German-style names (Schalke 04,
        // Hannover 96, Bayer 04 Leverkusen keeps its infix).
        if !stripped {
            if let Some(last) = tokens.last() {
                if tokens.len() > 1 && last.chars().all(|c| c.is_ascii_digit()) {
                    tokens.pop();
                    stripped = true;
                }
            }
        }
        if !stripped {
            break;
        }
    }

    tokens.join(" ")
}

/// A flat variant-to-canonical name dictionary.
#[derive(Debug, Clone, Default)]
pub struct TeamMapper {
    map: HashMap<String, String>,
}

impl TeamMapper {
    /// An empty mapper; every lookup passes through unchanged.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a mapper from a JSON file.
    ///
    /// A missing or corrupt file degrades to an empty mapper with a
    /// warning; a sync run works without canonicalization, just less
    /// well.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                log::warn!(
                    "team mapper not loaded from {}: {err}; names pass through unmapped",
                    path.display()
                );
                return Self::empty();
            }
        };

        match serde_json::from_str::<HashMap<String, String>>(&text) {
            Ok(map) => {
                log::info!("loaded team mapper with {} entries", map.len());
                Self { map }
            }
            Err(err) => {
                log::warn!(
                    "team mapper at {} is not valid JSON: {err}; names pass through unmapped",
                    path.display()
                );
                Self::empty()
            }
        }
    }

    /// Write the mapper as JSON with sorted keys, so rebuilds diff
    /// cleanly under version control.
    pub fn save(&self, path: &Path) -> IngestResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let sorted: BTreeMap<&String, &String> = self.map.iter().collect();
        let json = serde_json::to_string_pretty(&sorted)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Map a spelling to its canonical name. Tries the exact spelling,
    /// then its normalized form; an unknown name passes through.
    #[must_use]
    pub fn canonical<'a>(&'a self, name: &'a str) -> &'a str {
        if let Some(canonical) = self.map.get(name) {
            return canonical;
        }
        if let Some(canonical) = self.map.get(&normalize_team_name(name)) {
            return canonical;
        }
        name
    }

    /// Register a variant spelling for a canonical name, along with its
    /// normalized form. First registration of a key wins.
    pub fn insert(&mut self, variant: &str, canonical: &str) {
        let variant = variant.trim();
        if variant.is_empty() {
            return;
        }
        self.map
            .entry(variant.to_string())
            .or_insert_with(|| canonical.to_string());
        let normalized = normalize_team_name(variant);
        if !normalized.is_empty() {
            self.map
                .entry(normalized)
                .or_insert_with(|| canonical.to_string());
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Build a mapper by harvesting every team spelling under the data
    /// root: club registries (main plus alternative names), squad
    /// filenames, and team tokens from fixture files.
    ///
    /// Club registries are walked first so that canonical names come
    /// from the authoritative source; fixture tokens and squad
    /// filenames only add self-mappings for spellings nothing else
    /// claimed.
    pub fn build(data_root: &Path) -> IngestResult<Self> {
        let mut mapper = Self::empty();
        let passthrough = Self::empty();

        let mut club_files = Vec::new();
        let mut squad_files = Vec::new();
        let mut fixture_files = Vec::new();
        for entry in WalkDir::new(data_root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_file())
        {
            match FileKind::classify(entry.path()) {
                FileKind::ClubText | FileKind::ClubJson => club_files.push(entry.into_path()),
                FileKind::SquadText => squad_files.push(entry.into_path()),
                FileKind::FixtureText => fixture_files.push(entry.into_path()),
                _ => {}
            }
        }

        for path in &club_files {
            let records = match FileKind::classify(path) {
                FileKind::ClubJson => parsers::club_json::parse(path, &passthrough),
                _ => parsers::club_text::parse(path, None),
            };
            let records = match records {
                Ok(records) => records,
                Err(err) => {
                    log::warn!("skipping {} while building mapper: {err}", path.display());
                    continue;
                }
            };
            for club in records {
                mapper.insert(&club.name, &club.name);
                for alt in club
                    .alternative_names
                    .as_deref()
                    .unwrap_or_default()
                    .split(',')
                {
                    mapper.insert(alt.trim(), &club.name);
                }
            }
        }

        for path in &squad_files {
            if let Some(name) = squad_file_team_name(path) {
                let canonical = mapper.canonical(&name).to_string();
                mapper.insert(&name, &canonical);
            }
        }

        for path in &fixture_files {
            let names = match parsers::fixture_text::extract_team_names(path) {
                Ok(names) => names,
                Err(err) => {
                    log::warn!("skipping {} while building mapper: {err}", path.display());
                    continue;
                }
            };
            for name in names {
                let canonical = mapper.canonical(&name).to_string();
                mapper.insert(&name, &canonical);
            }
        }

        log::info!("built team mapper with {} entries", mapper.len());
        Ok(mapper)
    }
}

/// Turn a squad filename like `manchester_city.txt` into a display
/// spelling (`Manchester City`).
fn squad_file_team_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let spaced = stem.replace('_', " ");
    let titled = spaced
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    (!titled.is_empty()).then_some(titled)
}
