use crate::cli::*;

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Keystroke {
    /// Milliseconds since the start of the replay.
    pub at: u64,
    /// The whole content of the search box after the keystroke.
    pub text: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ReplayScript {
    pub keystrokes: Vec<Keystroke>,
    /// Round-trip time of each request, in milliseconds, used in turn.
    #[serde(default)]
    pub latencies: Vec<u64>,
}

#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum ReplayEvent {
    Typed {
        at: u64,
        text: String,
    },
    Fired {
        at: u64,
        token: RequestToken,
        query: String,
    },
    Applied {
        at: u64,
        token: RequestToken,
        results: Vec<String>,
    },
    Discarded {
        at: u64,
        token: RequestToken,
        current: Option<RequestToken>,
    },
    Failed {
        at: u64,
        token: RequestToken,
        error: String,
    },
}

/// The view left on screen at the end of the replay.
#[derive(PartialEq, Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "lowercase")]
pub enum FinalView {
    Default,
    Search { query: String, results: Vec<String> },
}

#[derive(PartialEq, Debug, Clone, Serialize)]
pub struct ReplayReport {
    pub events: Vec<ReplayEvent>,
    pub displayed: FinalView,
}

pub fn read_script(path: &Path) -> CliResult<ReplayScript> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })
}

struct InFlight {
    complete_at: u64,
    request: SearchRequest,
    outcome: ServiceResult<Vec<PoliticianSummary>>,
}

fn names(results: &[PoliticianSummary]) -> Vec<String> {
    results.iter().map(|r| r.name.clone()).collect()
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Drives a search coordinator with the keystrokes of `script` on a virtual
/// clock, answering its requests from `store`.
///
/// At a given instant, due responses are handled first, then keystrokes, then
/// the coordinator is polled.
pub fn replay(
    store: &dyn RatingStore,
    script: &ReplayScript,
    quiet_period: Duration,
    limit: usize,
) -> ReplayReport {
    let mut keystrokes: Vec<&Keystroke> = script.keystrokes.iter().collect();
    keystrokes.sort_by_key(|k| k.at);
    let mut keystrokes = keystrokes.into_iter().peekable();

    let mut coordinator: SearchCoordinator<PoliticianSummary> =
        SearchCoordinator::new(quiet_period);
    let mut in_flight: Vec<InFlight> = vec![];
    let mut fired: usize = 0;
    let mut events: Vec<ReplayEvent> = vec![];

    loop {
        let now = match [
            keystrokes.peek().map(|k| k.at),
            coordinator.next_deadline().map(millis),
            in_flight.iter().map(|f| f.complete_at).min(),
        ]
        .iter()
        .flatten()
        .min()
        {
            Some(t) => *t,
            None => break,
        };

        let (due, pending): (Vec<InFlight>, Vec<InFlight>) =
            in_flight.into_iter().partition(|f| f.complete_at <= now);
        in_flight = pending;
        for f in due {
            let token = f.request.token;
            match f.outcome {
                Ok(results) => {
                    let shown = names(&results);
                    match coordinator.complete(token, results) {
                        Completion::Applied => events.push(ReplayEvent::Applied {
                            at: now,
                            token,
                            results: shown,
                        }),
                        Completion::Discarded(discard) => events.push(ReplayEvent::Discarded {
                            at: now,
                            token,
                            current: discard.current,
                        }),
                    }
                }
                Err(e) => {
                    coordinator.fail(token, &e);
                    events.push(ReplayEvent::Failed {
                        at: now,
                        token,
                        error: e.to_string(),
                    });
                }
            }
        }

        while let Some(k) = keystrokes.next_if(|k| k.at <= now) {
            coordinator.on_query_change(&k.text, Duration::from_millis(now));
            events.push(ReplayEvent::Typed {
                at: now,
                text: k.text.clone(),
            });
        }

        // A deadline past the end of the clock fires at its last instant.
        let clock = match coordinator.next_deadline() {
            Some(deadline) if millis(deadline) <= now => {
                deadline.max(Duration::from_millis(now))
            }
            _ => Duration::from_millis(now),
        };
        if let Some(request) = coordinator.poll(clock) {
            let latency = match script.latencies.len() {
                0 => 0,
                n => script.latencies[fired % n],
            };
            fired += 1;
            events.push(ReplayEvent::Fired {
                at: now,
                token: request.token,
                query: request.query.clone(),
            });
            let outcome = search_politicians(store, &request.query, limit);
            in_flight.push(InFlight {
                complete_at: now.saturating_add(latency),
                request,
                outcome,
            });
        }
    }

    let displayed = match coordinator.displayed() {
        DisplayedResults::Default => FinalView::Default,
        DisplayedResults::Search { query, results } => FinalView::Search {
            query: query.clone(),
            results: names(results),
        },
    };
    info!("replay: {} requests fired, {} events", fired, events.len());
    ReplayReport { events, displayed }
}
