use std::fmt::Display;

use log::debug;
use serde::{Serialize, Serializer};

use crate::model::Politician;
use crate::tier::Tier;

/// Why a politician is left out of the ranking.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Exclusion {
    LowConfidence,
    Retired { last_ran_in: i32 },
}

impl Exclusion {
    /// Low confidence takes precedence when both apply.
    pub fn of(politician: &Politician) -> Option<Exclusion> {
        if politician.rating.low_confidence {
            Some(Exclusion::LowConfidence)
        } else if politician.retired {
            Some(Exclusion::Retired {
                last_ran_in: politician.last_ran_in,
            })
        } else {
            None
        }
    }
}

impl Display for Exclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Exclusion::LowConfidence => write!(f, "this rating has a low confidence"),
            Exclusion::Retired { last_ran_in } => {
                write!(f, "they have not run since {}", last_ran_in)
            }
        }
    }
}

/// The rank shown for a politician: a number, or a marker when unranked.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Standing {
    Ranked(u32),
    Unknown,
    Inactive,
}

impl Standing {
    pub fn of(politician: &Politician) -> Standing {
        match Exclusion::of(politician) {
            None => Standing::Ranked(politician.ranking),
            Some(Exclusion::LowConfidence) => Standing::Unknown,
            Some(Exclusion::Retired { .. }) => Standing::Inactive,
        }
    }

    pub fn is_ranked(&self) -> bool {
        matches!(self, Standing::Ranked(_))
    }
}

impl Display for Standing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Standing::Ranked(r) => write!(f, "{}", r),
            Standing::Unknown => write!(f, "unknown"),
            Standing::Inactive => write!(f, "inactive"),
        }
    }
}

// Ranked politicians serialize as their number, the others as the marker.
impl Serialize for Standing {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Standing::Ranked(r) => serializer.serialize_u32(*r),
            Standing::Unknown => serializer.serialize_str("unknown"),
            Standing::Inactive => serializer.serialize_str("inactive"),
        }
    }
}

/// Movement in the ranking since the previous snapshot.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RankChange {
    New,
    Up { magnitude: u32 },
    Down { magnitude: u32 },
}

impl RankChange {
    /// Only ranked politicians whose rank moved get an indicator.
    pub fn of(politician: &Politician) -> Option<RankChange> {
        if !politician.is_ranked() {
            return None;
        }
        let ranking = politician.ranking;
        match politician.previous_ranking {
            None => Some(RankChange::New),
            Some(previous) if previous == ranking => None,
            Some(previous) if ranking < previous => Some(RankChange::Up {
                magnitude: previous - ranking,
            }),
            Some(previous) => Some(RankChange::Down {
                magnitude: ranking - previous,
            }),
        }
    }
}

/// One line of the leaderboard.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct LeaderboardRow<'a> {
    pub politician: &'a Politician,
    pub standing: Standing,
    pub rank_change: Option<RankChange>,
    pub tier: Tier,
}

impl<'a> LeaderboardRow<'a> {
    pub fn new(politician: &'a Politician) -> LeaderboardRow<'a> {
        LeaderboardRow {
            politician,
            standing: Standing::of(politician),
            rank_change: RankChange::of(politician),
            tier: Tier::classify(politician.rating.mu),
        }
    }
}

/// Annotates a page of politicians, as returned by the store, for display.
///
/// The store decides the order; unranked politicians keep their position
/// and are only flagged.
pub fn compose(politicians: &[Politician]) -> Vec<LeaderboardRow<'_>> {
    let rows: Vec<LeaderboardRow<'_>> = politicians.iter().map(LeaderboardRow::new).collect();
    debug!(
        "compose: {} rows, {} ranked",
        rows.len(),
        rows.iter().filter(|r| r.standing.is_ranked()).count()
    );
    rows
}
