use rphonetic::{Encoder, Metaphone};
use std::collections::HashMap;

use crate::types::Location;

/// US states, DC and inhabited territories: (code, name, FIPS)
const US_REGIONS: &[(&str, &str, &str)] = &[
    ("AL", "Alabama", "01"),
    ("AK", "Alaska", "02"),
    ("AZ", "Arizona", "04"),
    ("AR", "Arkansas", "05"),
    ("CA", "California", "06"),
    ("CO", "Colorado", "08"),
    ("CT", "Connecticut", "09"),
    ("DE", "Delaware", "10"),
    ("DC", "District of Columbia", "11"),
    ("FL", "Florida", "12"),
    ("GA", "Georgia", "13"),
    ("HI", "Hawaii", "15"),
    ("ID", "Idaho", "16"),
    ("IL", "Illinois", "17"),
    ("IN", "Indiana", "18"),
    ("IA", "Iowa", "19"),
    ("KS", "Kansas", "20"),
    ("KY", "Kentucky", "21"),
    ("LA", "Louisiana", "22"),
    ("ME", "Maine", "23"),
    ("MD", "Maryland", "24"),
    ("MA", "Massachusetts", "25"),
    ("MI", "Michigan", "26"),
    ("MN", "Minnesota", "27"),
    ("MS", "Mississippi", "28"),
    ("MO", "Missouri", "29"),
    ("MT", "Montana", "30"),
    ("NE", "Nebraska", "31"),
    ("NV", "Nevada", "32"),
    ("NH", "New Hampshire", "33"),
    ("NJ", "New Jersey", "34"),
    ("NM", "New Mexico", "35"),
    ("NY", "New York", "36"),
    ("NC", "North Carolina", "37"),
    ("ND", "North Dakota", "38"),
    ("OH", "Ohio", "39"),
    ("OK", "Oklahoma", "40"),
    ("OR", "Oregon", "41"),
    ("PA", "Pennsylvania", "42"),
    ("RI", "Rhode Island", "44"),
    ("SC", "South Carolina", "45"),
    ("SD", "South Dakota", "46"),
    ("TN", "Tennessee", "47"),
    ("TX", "Texas", "48"),
    ("UT", "Utah", "49"),
    ("VT", "Vermont", "50"),
    ("VA", "Virginia", "51"),
    ("WA", "Washington", "53"),
    ("WV", "West Virginia", "54"),
    ("WI", "Wisconsin", "55"),
    ("WY", "Wyoming", "56"),
    ("AS", "American Samoa", "60"),
    ("GU", "Guam", "66"),
    ("MP", "Northern Mariana Islands", "69"),
    ("PR", "Puerto Rico", "72"),
    ("VI", "Virgin Islands", "78"),
];

/// How a location string was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationMatch {
    /// Field absent or blank
    Missing,
    /// Text mentions remote work
    Remote,
    /// Last comma segment matched the region table
    Resolved(&'static str),
    /// Lookup failed; reported as remote
    Unrecognized,
}

impl LocationMatch {
    pub fn location(&self) -> Location {
        match self {
            LocationMatch::Resolved(code) => Location::State(*code),
            LocationMatch::Missing | LocationMatch::Remote | LocationMatch::Unrecognized => {
                Location::Remote
            }
        }
    }
}

/// Lookup table from region names, codes and FIPS numbers to a two-letter code.
///
/// Names also resolve by Metaphone key, so misspelled or hyphenated names
/// ("Massachusets", "New-York") still match. Keys shared by more than one
/// region never resolve phonetically.
#[derive(Debug, Clone)]
pub struct RegionTable {
    index: HashMap<String, &'static str>,
    /// `None` marks a key claimed by several regions
    phonetic: HashMap<String, Option<&'static str>>,
}

/// Names shorter than this are never matched phonetically
const MIN_PHONETIC_LETTERS: usize = 3;

impl RegionTable {
    pub fn us() -> Self {
        let mut index = HashMap::with_capacity(US_REGIONS.len() * 3);
        let mut phonetic: HashMap<String, Option<&'static str>> = HashMap::with_capacity(US_REGIONS.len());
        for (code, name, fips) in US_REGIONS {
            index.insert(code.to_lowercase(), *code);
            index.insert(name.to_lowercase(), *code);
            index.insert((*fips).to_string(), *code);

            if let Some(key) = phonetic_key(name) {
                phonetic
                    .entry(key)
                    .and_modify(|existing| {
                        if *existing != Some(*code) {
                            *existing = None;
                        }
                    })
                    .or_insert(Some(*code));
            }
        }
        Self { index, phonetic }
    }

    /// Case-insensitive lookup; inner whitespace runs count as one space.
    /// Codes and FIPS numbers must match exactly; names fall back to their
    /// phonetic key.
    pub fn lookup(&self, text: &str) -> Option<&'static str> {
        let key = text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        if key.is_empty() {
            return None;
        }
        if let Some(code) = self.index.get(&key) {
            return Some(*code);
        }
        let phonetic = phonetic_key(&key)?;
        self.phonetic.get(&phonetic).copied().flatten()
    }
}

/// Metaphone key of the letters in `text`, ignoring spaces and punctuation
fn phonetic_key(text: &str) -> Option<String> {
    let letters: String = text.chars().filter(char::is_ascii_alphabetic).collect();
    if letters.len() < MIN_PHONETIC_LETTERS {
        return None;
    }
    let key = Metaphone::default().encode(&letters);
    (!key.is_empty()).then_some(key)
}

impl Default for RegionTable {
    fn default() -> Self {
        Self::us()
    }
}

/// Maps free-text location or remote-option text to a region code or `Remote`
#[derive(Debug, Clone, Default)]
pub struct LocationNormalizer {
    table: RegionTable,
}

impl LocationNormalizer {
    pub fn new(table: RegionTable) -> Self {
        Self { table }
    }

    pub fn resolve(&self, text: Option<&str>) -> LocationMatch {
        let text = match text.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return LocationMatch::Missing,
        };

        if text.to_lowercase().contains("remote") {
            return LocationMatch::Remote;
        }

        let region = text.rsplit(',').next().unwrap_or(text);
        match self.table.lookup(region) {
            Some(code) => LocationMatch::Resolved(code),
            None => LocationMatch::Unrecognized,
        }
    }

    pub fn normalize(&self, text: Option<&str>) -> Location {
        self.resolve(text).location()
    }
}
