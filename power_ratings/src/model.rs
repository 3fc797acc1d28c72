// ********* Stored documents ***********
//
// These mirror the records written by the rating pipeline. They are read-only
// from the point of view of this crate: everything else is derived per request.

use std::fmt::Display;

use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoliticianId(pub u64);

impl Display for PoliticianId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContestId(pub u64);

impl Display for ContestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A belief about the skill of a politician: `mu` is the point estimate,
/// `sigma` the uncertainty around it.
#[derive(PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Rating {
    pub mu: f64,
    pub sigma: f64,
}

impl Rating {
    pub fn new(mu: f64, sigma: f64) -> Rating {
        Rating { mu, sigma }
    }
}

/// The current rating of a politician.
///
/// `low_confidence` is decided upstream (sigma above the pipeline's cutoff)
/// and is never recomputed here.
#[derive(PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PoliticianRating {
    pub mu: f64,
    pub sigma: f64,
    #[serde(default)]
    pub low_confidence: bool,
}

impl PoliticianRating {
    pub fn rating(&self) -> Rating {
        Rating::new(self.mu, self.sigma)
    }
}

/// A political party, with the color used to represent it.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
#[serde(from = "PartyRecord")]
pub struct Party {
    pub name: String,
    pub color: String,
}

impl Party {
    pub const DEFAULT_COLOR: &'static str = "#d3d3d3";

    /// Builds a party out of the older free-text form (`"Democratic Party"`).
    ///
    /// The color is looked up with the last word dropped.
    pub fn from_legacy(label: &str) -> Party {
        let parts: Vec<&str> = label.split_whitespace().collect();
        let short_name = parts[..parts.len().saturating_sub(1)].join(" ");
        Party {
            name: label.to_string(),
            color: party_color(&short_name).to_string(),
        }
    }
}

fn party_color(short_name: &str) -> &'static str {
    match short_name {
        "Democratic" => "#0015bc",
        "Republican" => "#e91d0e",
        _ => Party::DEFAULT_COLOR,
    }
}

// Older documents store the party as a plain string.
#[derive(Deserialize)]
#[serde(untagged)]
enum PartyRecord {
    Structured { name: String, color: Option<String> },
    Legacy(String),
}

impl From<PartyRecord> for Party {
    fn from(record: PartyRecord) -> Party {
        match record {
            PartyRecord::Structured {
                name,
                color: Some(color),
            } => Party { name, color },
            PartyRecord::Structured { name, color: None } => Party {
                color: party_color(&name).to_string(),
                name,
            },
            PartyRecord::Legacy(label) => Party::from_legacy(&label),
        }
    }
}

/// One step of a rating history.
///
/// The first entry of a history is the prior rating and carries no contest.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RatedContest {
    #[serde(default)]
    pub contest_id: Option<ContestId>,
    pub rating: Rating,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Politician {
    #[serde(rename = "_id")]
    pub id: PoliticianId,
    pub name: String,
    /// Name with accents and middle initials stripped, used for searching.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub searchable_name: Option<String>,
    pub rating: PoliticianRating,
    pub ranking: u32,
    #[serde(default)]
    pub previous_ranking: Option<u32>,
    #[serde(default)]
    pub retired: bool,
    pub last_ran_in: i32,
    pub party: Party,
    #[serde(default)]
    pub rating_history: Vec<RatedContest>,
}

impl Politician {
    /// Only ranked politicians get a global rank displayed.
    pub fn is_ranked(&self) -> bool {
        !self.rating.low_confidence && !self.retired
    }

    /// The ids of the contests in the history, in application order.
    pub fn contest_ids(&self) -> Vec<ContestId> {
        self.rating_history
            .iter()
            .filter_map(|rc| rc.contest_id)
            .collect()
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// The politician record behind this candidate, when it is known.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PoliticianId>,
    pub name: String,
    pub party: Party,
    /// Absent for contests without public counts.
    #[serde(default)]
    pub votes: Option<u64>,
    #[serde(default)]
    pub won: bool,
    #[serde(default)]
    pub incumbent: bool,
}

/// When a contest took place. Less detailed sources only give the year.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContestDate {
    Timestamp(DateTime<Utc>),
    Day(NaiveDate),
    Year(i32),
}

impl ContestDate {
    pub fn year(&self) -> i32 {
        match self {
            ContestDate::Timestamp(ts) => ts.year(),
            ContestDate::Day(d) => d.year(),
            ContestDate::Year(y) => *y,
        }
    }

    /// The earliest instant covered by this date.
    pub fn start(&self) -> Option<DateTime<Utc>> {
        let day = match self {
            ContestDate::Timestamp(ts) => return Some(*ts),
            ContestDate::Day(d) => *d,
            ContestDate::Year(y) => NaiveDate::from_ymd_opt(*y, 1, 1)?,
        };
        Some(Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0)?))
    }
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Contest {
    #[serde(rename = "_id")]
    pub id: ContestId,
    pub name: String,
    pub date: ContestDate,
    #[serde(default)]
    pub upcoming: bool,
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Attribution for the results: usually a URL, sometimes free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}
