//! View models derived from the rating core for one response.
//!
//! Nothing here knows about markup: these are the values a page or an API
//! client needs to display a politician, already ordered and formatted.

use chrono::{DateTime, Months, Utc};
use serde::Serialize;
use url::Url;

use crate::grouping::TimelineGroup;
use crate::model::*;
use crate::tier::{Tier, TIERS};
use crate::timeline::{Timeline, TimelineEntry};

/// Direction of a rating change.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Flat,
    Down,
}

impl Trend {
    pub fn of(delta: f64) -> Trend {
        if delta > 0.0 {
            Trend::Up
        } else if delta < 0.0 {
            Trend::Down
        } else {
            Trend::Flat
        }
    }
}

/// `+12`, `0`, `-7`: the delta rounded to an integer, with a plus sign for gains.
pub fn delta_label(delta: f64) -> String {
    let rounded = delta.round() as i64;
    if delta > 0.0 {
        format!("+{}", rounded)
    } else {
        format!("{}", rounded)
    }
}

/// Vote counts with thousands separators; a dash when there is no real count.
///
/// Digits are grouped by three with commas, as in the en-US locale.
pub fn format_votes(votes: Option<u64>) -> String {
    match votes {
        Some(v) if v > 1 => {
            let digits = v.to_string();
            let mut out = String::with_capacity(digits.len() + digits.len() / 3);
            for (idx, c) in digits.chars().enumerate() {
                if idx > 0 && (digits.len() - idx) % 3 == 0 {
                    out.push(',');
                }
                out.push(c);
            }
            out
        }
        _ => "—".to_string(),
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct CandidateRow {
    pub name: String,
    pub party: Party,
    pub votes: String,
    pub won: bool,
    pub incumbent: bool,
    /// The row of the politician being viewed.
    pub highlighted: bool,
}

/// Minimum number of candidates listed for a contest.
pub const MIN_CANDIDATE_ROWS: usize = 5;

/// The candidates of a contest as listed on the page of `politician`.
///
/// Upcoming contests list the politician first and the others in their
/// original order. Past contests are ordered by votes. The list is cut after
/// [`MIN_CANDIDATE_ROWS`] rows, or after the politician if they come later.
pub fn candidate_table(contest: &Contest, politician: &Politician) -> Vec<CandidateRow> {
    let is_subject = |c: &Candidate| c.id == Some(politician.id) || c.name == politician.name;
    let mut ordered: Vec<&Candidate> = contest.candidates.iter().collect();
    if contest.upcoming {
        ordered.sort_by_key(|c| !is_subject(*c));
    } else {
        ordered.sort_by(|a, b| b.votes.cmp(&a.votes));
    }
    let shown = ordered
        .iter()
        .position(|c| c.name.contains(politician.name.as_str()))
        .map(|idx| (idx + 1).max(MIN_CANDIDATE_ROWS))
        .unwrap_or(MIN_CANDIDATE_ROWS);
    ordered
        .into_iter()
        .take(shown)
        .map(|c| CandidateRow {
            name: c.name.clone(),
            party: c.party.clone(),
            votes: format_votes(c.votes),
            won: c.won,
            incumbent: c.incumbent,
            highlighted: is_subject(c),
        })
        .collect()
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PrimarySource {
    Link { url: String, host: String },
    /// Free-text attribution, HTML-escaped.
    Text { escaped: String },
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct SourceAttribution {
    pub primary: Option<PrimarySource>,
    pub secondary: String,
}

const OURCAMPAIGNS_RACE_URL: &str = "https://www.ourcampaigns.com/RaceDetail.html?RaceID=";

pub fn source_attribution(contest: &Contest) -> SourceAttribution {
    let primary = contest
        .source
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(|s| match web_uri_host(s) {
            Some(host) => PrimarySource::Link {
                url: s.to_string(),
                host,
            },
            None => PrimarySource::Text {
                escaped: escape_html(s),
            },
        });
    SourceAttribution {
        primary,
        secondary: format!("{}{}", OURCAMPAIGNS_RACE_URL, contest.id),
    }
}

/// The host name of a well-formed http(s) URI, lower-cased.
pub fn web_uri_host(source: &str) -> Option<String> {
    Url::parse(source)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .and_then(|u| u.host_str().map(str::to_string))
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct ContestView {
    pub id: ContestId,
    pub name: String,
    pub date: ContestDate,
    pub upcoming: bool,
    pub rating_before: Rating,
    pub rating_after: Rating,
    pub delta: f64,
    pub delta_label: String,
    pub trend: Trend,
    pub candidates: Vec<CandidateRow>,
    pub sources: SourceAttribution,
}

impl ContestView {
    pub fn new(entry: &TimelineEntry<'_>, politician: &Politician) -> ContestView {
        ContestView {
            id: entry.contest.id,
            name: entry.contest.name.clone(),
            date: entry.contest.date,
            upcoming: entry.contest.upcoming,
            rating_before: entry.rating_before,
            rating_after: entry.rating_after,
            delta: entry.delta,
            delta_label: delta_label(entry.delta),
            trend: Trend::of(entry.delta),
            candidates: candidate_table(entry.contest, politician),
            sources: source_attribution(entry.contest),
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct ContestGroupView {
    pub label: String,
    pub contests: Vec<ContestView>,
}

impl ContestGroupView {
    pub fn new(group: &TimelineGroup<'_>, politician: &Politician) -> ContestGroupView {
        ContestGroupView {
            label: group.key.to_string(),
            contests: group
                .entries
                .iter()
                .map(|e| ContestView::new(e, politician))
                .collect(),
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct ChartPoint {
    pub at: DateTime<Utc>,
    pub mu: f64,
    /// `mu + 2 sigma`
    pub upper: f64,
    /// `mu - 2 sigma`
    pub lower: f64,
}

impl ChartPoint {
    fn new(at: DateTime<Utc>, rating: Rating) -> ChartPoint {
        ChartPoint {
            at,
            mu: rating.mu,
            upper: rating.mu + 2.0 * rating.sigma,
            lower: rating.mu - 2.0 * rating.sigma,
        }
    }
}

#[derive(PartialEq, Debug, Clone, Copy, Serialize)]
pub struct TierGuide {
    pub tier: Tier,
    pub rating: f64,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct RatingChart {
    pub points: Vec<ChartPoint>,
    pub guides: Vec<TierGuide>,
    pub domain: (f64, f64),
}

pub const CHART_DOMAIN: (f64, f64) = (0.0, 3000.0);

/// Rating over time, from a year before the first contest.
///
/// There is nothing to chart with fewer than two contests.
pub fn rating_chart(timeline: &Timeline<'_>) -> Option<RatingChart> {
    if timeline.len() < 2 {
        return None;
    }
    let first = timeline.entries().first()?.contest.date.start()?;
    let mut points = vec![ChartPoint::new(
        first.checked_sub_months(Months::new(12))?,
        timeline.baseline(),
    )];
    for entry in timeline.entries() {
        points.push(ChartPoint::new(
            entry.contest.date.start()?,
            entry.rating_after,
        ));
    }
    Some(RatingChart {
        points,
        guides: TIERS
            .iter()
            .skip(1)
            .map(|(tier, rating)| TierGuide {
                tier: *tier,
                rating: *rating,
            })
            .collect(),
        domain: CHART_DOMAIN,
    })
}

#[derive(PartialEq, Debug, Clone, Copy, Serialize)]
pub struct SparkBar {
    pub mu: f64,
    /// Relative to the range of the history, in `[0, 1]`.
    pub height: f64,
    pub trend: Trend,
}

/// A compact bar chart of a rating history.
///
/// Bars are scaled over `[0.8 * lowest, highest]` and colored by the change
/// from the previous entry.
pub fn sparkline(history: &[RatedContest]) -> Vec<SparkBar> {
    let peak = history.iter().map(|rc| rc.rating.mu).fold(0.0, f64::max);
    let lowest = history
        .iter()
        .map(|rc| rc.rating.mu)
        .fold(f64::INFINITY, f64::min);
    let floor = lowest * 0.8;
    let range = peak - floor;
    history
        .iter()
        .enumerate()
        .map(|(idx, rc)| {
            let mu = rc.rating.mu;
            let height = if range > 0.0 && range.is_finite() {
                ((mu - floor) / range).clamp(0.0, 1.0)
            } else {
                1.0
            };
            let trend = match idx {
                0 => Trend::Flat,
                _ => Trend::of(mu - history[idx - 1].rating.mu),
            };
            SparkBar { mu, height, trend }
        })
        .collect()
}
