use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Roster for one jurisdiction: district name to the seat(s) in that
/// district. Districts missing from the source pages never appear as keys.
pub type SubDistrictMap = BTreeMap<String, Vec<Prosecutor>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Party {
    Democratic,
    Republican,
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::Democratic => write!(f, "Democratic"),
            Party::Republican => write!(f, "Republican"),
        }
    }
}

/// One lead prosecuting attorney as scraped from a listing page.
///
/// Jurisdiction, district and name are fixed at construction; the contact
/// and political fields start empty and are filled in only when a source
/// page carries them. Records are never merged across scrapes.
#[derive(Debug, Clone, Serialize)]
pub struct Prosecutor {
    pub jurisdiction: String,
    pub district: String,
    pub name: String,
    pub as_of: DateTime<Utc>,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub election_year: Option<i32>,
    pub party: Option<Party>,
    pub terms_served: Option<u32>,
}

impl Prosecutor {
    pub fn new(jurisdiction: &str, district: &str, name: &str) -> Self {
        Self {
            jurisdiction: jurisdiction.to_string(),
            district: district.to_string(),
            name: name.to_string(),
            as_of: Utc::now(),
            email: String::new(),
            phone: String::new(),
            website: String::new(),
            election_year: None,
            party: None,
            terms_served: None,
        }
    }
}

impl fmt::Display for Prosecutor {
    // Stable rendering the listing front-end prints verbatim.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}: {}", self.jurisdiction, self.district, self.name)
    }
}
