use std::collections::HashMap;

use log::debug;
use snafu::{ensure, OptionExt};

use crate::error::*;
use crate::model::{Contest, ContestId, RatedContest, Rating};

/// A contest together with the rating it moved a politician from and to.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct TimelineEntry<'a> {
    pub contest: &'a Contest,
    pub rating_before: Rating,
    pub rating_after: Rating,
    /// `rating_after.mu - rating_before.mu`
    pub delta: f64,
}

/// The contests of one politician, in the order they were applied to the rating.
#[derive(PartialEq, Debug, Clone)]
pub struct Timeline<'a> {
    baseline: Rating,
    entries: Vec<TimelineEntry<'a>>,
}

impl<'a> Timeline<'a> {
    /// The prior rating, before any contest.
    pub fn baseline(&self) -> Rating {
        self.baseline
    }

    pub fn entries(&self) -> &[TimelineEntry<'a>] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The rating after the last contest, or the prior if there is none.
    pub fn latest(&self) -> Rating {
        self.entries
            .last()
            .map(|e| e.rating_after)
            .unwrap_or(self.baseline)
    }
}

/// Lines up a rating history with the contests that produced it.
///
/// `history` holds the prior rating followed by one entry per contest, in the
/// order the contests were applied. `full_contests` are the records joined on
/// the contest ids of the history, in any order. Every history entry must find
/// its record and every record must be used exactly once, otherwise the data is
/// rejected.
///
/// ```
/// use power_ratings::*;
///
/// let contest = Contest {
///     id: ContestId(1),
///     name: "Governor - VT".to_string(),
///     date: ContestDate::Year(2016),
///     upcoming: false,
///     candidates: vec![],
///     source: None,
/// };
/// let history = vec![
///     RatedContest { contest_id: None, rating: Rating::new(1000.0, 250.0) },
///     RatedContest { contest_id: Some(ContestId(1)), rating: Rating::new(1100.0, 200.0) },
/// ];
/// let contests = [contest];
/// let timeline = correlate(&history, &contests)?;
/// assert_eq!(timeline.entries()[0].delta, 100.0);
/// # Ok::<(), CorrelationError>(())
/// ```
pub fn correlate<'a>(
    history: &[RatedContest],
    full_contests: &'a [Contest],
) -> CorrelationResult<Timeline<'a>> {
    let (baseline, applied) = history.split_first().context(MissingBaselineSnafu {})?;

    let mut positions: HashMap<ContestId, usize> = HashMap::with_capacity(full_contests.len());
    for (idx, contest) in full_contests.iter().enumerate() {
        ensure!(
            positions.insert(contest.id, idx).is_none(),
            DuplicateContestSnafu {
                contest_id: contest.id
            }
        );
    }

    let mut used = vec![false; full_contests.len()];
    let mut entries: Vec<TimelineEntry<'a>> = Vec::with_capacity(applied.len());
    let mut rating_before = baseline.rating;
    for (offset, rc) in applied.iter().enumerate() {
        let contest_id = rc
            .contest_id
            .context(UnlabeledHistoryEntrySnafu { index: offset + 1 })?;
        let idx = *positions
            .get(&contest_id)
            .context(MissingContestSnafu { contest_id })?;
        ensure!(
            !used[idx],
            RepeatedHistoryContestSnafu {
                contest_id,
                index: offset + 1
            }
        );
        used[idx] = true;
        entries.push(TimelineEntry {
            contest: &full_contests[idx],
            rating_before,
            rating_after: rc.rating,
            delta: rc.rating.mu - rating_before.mu,
        });
        rating_before = rc.rating;
    }

    if let Some(idx) = used.iter().position(|u| !u) {
        return UnreferencedContestSnafu {
            contest_id: full_contests[idx].id,
        }
        .fail();
    }

    debug!(
        "correlate: {} contests, rating {:?} -> {:?}",
        entries.len(),
        baseline.rating.mu,
        rating_before.mu
    );
    Ok(Timeline {
        baseline: baseline.rating,
        entries,
    })
}
