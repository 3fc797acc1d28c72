//! The operations exposed to clients, each answering one request from a
//! snapshot of the store.

use chrono::{DateTime, Utc};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use snafu::{OptionExt, ResultExt};

use crate::error::*;
use crate::grouping::group_by_year;
use crate::leaderboard::{compose, Exclusion, LeaderboardRow, RankChange, Standing};
use crate::model::*;
use crate::store::{NameFilter, PoliticianKey, RatingStore};
use crate::tier::Tier;
use crate::timeline::correlate;
use crate::views::{rating_chart, sparkline, ContestGroupView, RatingChart, SparkBar};

/// Number of politicians in a leaderboard page or a search response.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// A politician as listed on the leaderboard or in search results.
///
/// Contest ids are left out of the rating history, only the sparkline is kept.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct PoliticianSummary {
    pub id: PoliticianId,
    pub name: String,
    pub party: Party,
    pub rating: PoliticianRating,
    pub tier: Tier,
    pub ranking: u32,
    pub ranked: bool,
    pub standing: Standing,
    pub rank_change: Option<RankChange>,
    pub last_ran_in: i32,
    pub sparkline: Vec<SparkBar>,
}

impl PoliticianSummary {
    pub fn new(row: &LeaderboardRow<'_>) -> PoliticianSummary {
        let p = row.politician;
        PoliticianSummary {
            id: p.id,
            name: p.name.clone(),
            party: p.party.clone(),
            rating: p.rating,
            tier: row.tier,
            ranking: p.ranking,
            ranked: row.standing.is_ranked(),
            standing: row.standing,
            rank_change: row.rank_change,
            last_ran_in: p.last_ran_in,
            sparkline: sparkline(&p.rating_history),
        }
    }
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct LeaderboardPage {
    pub last_updated: Option<DateTime<Utc>>,
    pub entries: Vec<PoliticianSummary>,
}

/// The top of the leaderboard.
pub fn leaderboard(store: &dyn RatingStore, limit: usize) -> ServiceResult<LeaderboardPage> {
    let page = store.ranked_page(None, limit).context(StoreSnafu {})?;
    let last_updated = store.last_updated().context(StoreSnafu {})?;
    let entries: Vec<PoliticianSummary> =
        compose(&page).iter().map(PoliticianSummary::new).collect();
    info!("leaderboard: {} entries", entries.len());
    Ok(LeaderboardPage {
        last_updated,
        entries,
    })
}

/// Parameters of the search endpoint, as they come from the query string.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub results: Vec<PoliticianSummary>,
}

/// The search endpoint: `search` is required.
pub fn search(
    store: &dyn RatingStore,
    params: &SearchParams,
    limit: usize,
) -> ServiceResult<SearchResponse> {
    let text = params.search.as_deref().context(ValidationSnafu {
        parameter: "search",
    })?;
    let results = search_politicians(store, text, limit)?;
    Ok(SearchResponse { results })
}

/// Politicians whose name contains `text`, by ascending ranking.
pub fn search_politicians(
    store: &dyn RatingStore,
    text: &str,
    limit: usize,
) -> ServiceResult<Vec<PoliticianSummary>> {
    let filter = NameFilter::new(text);
    let page = store
        .ranked_page(Some(&filter), limit)
        .context(StoreSnafu {})?;
    debug!("search_politicians: {:?} matched {}", text, page.len());
    Ok(compose(&page).iter().map(PoliticianSummary::new).collect())
}

/// Everything shown on the page of one politician.
#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct PoliticianDetail {
    pub id: PoliticianId,
    pub name: String,
    pub party: Party,
    pub rating: PoliticianRating,
    pub tier: Tier,
    pub ranking: u32,
    pub ranked: bool,
    pub standing: Standing,
    pub rank_change: Option<RankChange>,
    pub last_ran_in: i32,
    /// Why the politician is unranked, if they are.
    pub exclusion: Option<String>,
    pub description: String,
    pub contest_groups: Vec<ContestGroupView>,
    pub chart: Option<RatingChart>,
}

/// One-line description of a politician, used as the page summary.
pub fn describe(politician: &Politician) -> String {
    let mut description = format!(
        "{} has a power rating of {}",
        politician.name,
        politician.rating.mu.round() as i64
    );
    if politician.is_ranked() {
        description.push_str(&format!(" and is ranked #{}", politician.ranking));
    }
    description
}

/// The detail lookup. `Ok(None)` when no politician matches the key.
///
/// A history that does not line up with its contests is reported as an
/// error rather than shown partially.
pub fn politician_detail(
    store: &dyn RatingStore,
    key: &PoliticianKey,
) -> ServiceResult<Option<PoliticianDetail>> {
    let politician = match store.politician(key).context(StoreSnafu {})? {
        Some(p) => p,
        None => {
            info!("politician_detail: no politician for {:?}", key);
            return Ok(None);
        }
    };
    let contests = store
        .contests_by_ids(&politician.contest_ids())
        .context(StoreSnafu {})?;

    let timeline = match correlate(&politician.rating_history, &contests) {
        Ok(t) => t,
        Err(source) => {
            error!(
                "politician_detail: history of {} ({}) is inconsistent: {}",
                politician.name, politician.id, source
            );
            return Err(ServiceError::DataIntegrity {
                politician: politician.id,
                source,
            });
        }
    };
    let contest_groups: Vec<ContestGroupView> = group_by_year(&timeline)
        .iter()
        .map(|g| ContestGroupView::new(g, &politician))
        .collect();
    let chart = rating_chart(&timeline);
    let row = LeaderboardRow::new(&politician);

    Ok(Some(PoliticianDetail {
        id: politician.id,
        name: politician.name.clone(),
        party: politician.party.clone(),
        rating: politician.rating,
        tier: row.tier,
        ranking: politician.ranking,
        ranked: row.standing.is_ranked(),
        standing: row.standing,
        rank_change: row.rank_change,
        last_ran_in: politician.last_ran_in,
        exclusion: Exclusion::of(&politician).map(|e| e.to_string()),
        description: describe(&politician),
        contest_groups,
        chart,
    }))
}
