use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Display;

use crate::timeline::{Timeline, TimelineEntry};

/// The bucket a contest is listed under.
///
/// Buckets sort with `Upcoming` first, then years from the most recent.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum GroupKey {
    Upcoming,
    Year(i32),
}

impl GroupKey {
    pub fn of(entry: &TimelineEntry<'_>) -> GroupKey {
        if entry.contest.upcoming {
            GroupKey::Upcoming
        } else {
            GroupKey::Year(entry.contest.date.year())
        }
    }
}

impl Ord for GroupKey {
    fn cmp(&self, other: &GroupKey) -> Ordering {
        match (self, other) {
            (GroupKey::Upcoming, GroupKey::Upcoming) => Ordering::Equal,
            (GroupKey::Upcoming, GroupKey::Year(_)) => Ordering::Less,
            (GroupKey::Year(_), GroupKey::Upcoming) => Ordering::Greater,
            (GroupKey::Year(a), GroupKey::Year(b)) => b.cmp(a),
        }
    }
}

impl PartialOrd for GroupKey {
    fn partial_cmp(&self, other: &GroupKey) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GroupKey::Upcoming => write!(f, "Upcoming"),
            GroupKey::Year(y) => write!(f, "{}", y),
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct TimelineGroup<'a> {
    pub key: GroupKey,
    /// Most recent contest first.
    pub entries: Vec<TimelineEntry<'a>>,
}

/// Splits a timeline into the upcoming contests and one bucket per year.
///
/// Within a bucket the contests are listed most recent first, which is the
/// reverse of the application order of the timeline.
pub fn group_by_year<'a>(timeline: &Timeline<'a>) -> Vec<TimelineGroup<'a>> {
    let mut buckets: BTreeMap<GroupKey, Vec<TimelineEntry<'a>>> = BTreeMap::new();
    for entry in timeline.entries().iter().rev() {
        buckets.entry(GroupKey::of(entry)).or_default().push(*entry);
    }
    buckets
        .into_iter()
        .map(|(key, entries)| TimelineGroup { key, entries })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Contest, ContestId};
    use crate::timeline::correlate;
    use crate::timeline::tests::{contest, history};

    fn upcoming(id: u64, year: i32) -> Contest {
        Contest {
            upcoming: true,
            ..contest(id, year)
        }
    }

    #[test]
    fn upcoming_then_years_descending() {
        let h = history(&[
            (None, 1000.0),
            (Some(1), 1010.0),
            (Some(2), 1020.0),
            (Some(3), 1020.0),
        ]);
        let contests = vec![contest(1, 2020), contest(2, 2022), upcoming(3, 2024)];
        let t = correlate(&h, &contests).unwrap();
        let groups = group_by_year(&t);
        let keys: Vec<GroupKey> = groups.iter().map(|g| g.key).collect();
        assert_eq!(
            keys,
            vec![GroupKey::Upcoming, GroupKey::Year(2022), GroupKey::Year(2020)]
        );
        let labels: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(labels, vec!["Upcoming", "2022", "2020"]);
    }

    #[test]
    fn most_recent_first_within_year() {
        let h = history(&[
            (None, 1000.0),
            (Some(1), 1010.0),
            (Some(2), 990.0),
            (Some(3), 1030.0),
            (Some(4), 1040.0),
        ]);
        let contests = vec![
            contest(4, 2018),
            contest(3, 2016),
            contest(2, 2016),
            contest(1, 2016),
        ];
        let t = correlate(&h, &contests).unwrap();
        let groups = group_by_year(&t);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key, GroupKey::Year(2018));
        let ids: Vec<ContestId> = groups[1].entries.iter().map(|e| e.contest.id).collect();
        assert_eq!(ids, vec![ContestId(3), ContestId(2), ContestId(1)]);
        // Deltas are carried over untouched.
        let deltas: Vec<f64> = groups[1].entries.iter().map(|e| e.delta).collect();
        assert_eq!(deltas, vec![40.0, -20.0, 10.0]);
    }

    #[test]
    fn empty_timeline() {
        let h = history(&[(None, 1000.0)]);
        let t = correlate(&h, &[]).unwrap();
        assert!(group_by_year(&t).is_empty());
    }
}
