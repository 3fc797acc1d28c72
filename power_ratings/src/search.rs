//! Debounced search over the leaderboard.
//!
//! The coordinator is a plain state machine driven by its caller: the event
//! loop reports query changes with the current time, polls for requests whose
//! quiet period has elapsed, and reports completions. Time is a `Duration`
//! since an arbitrary origin chosen by the caller.
//!
//! Each fired request gets a token from a monotonically increasing counter.
//! A completion is applied only when its token is the latest one issued, so a
//! slow response can never overwrite the results of a more recent query.

use std::fmt::Display;
use std::time::Duration;

use log::{debug, info, warn};
use serde::Serialize;

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct RequestToken(u64);

impl Display for RequestToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SearchState {
    Idle,
    /// A request for `query` is scheduled to fire at `fire_at`.
    Pending { query: String, fire_at: Duration },
}

/// A request that the caller must now send to the search backend.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub token: RequestToken,
    pub query: String,
}

/// What is currently shown to the user.
#[derive(PartialEq, Debug, Clone)]
pub enum DisplayedResults<T> {
    /// The default leaderboard, no query active.
    Default,
    Search { query: String, results: Vec<T> },
}

/// A response that arrived after a newer request superseded it.
///
/// This is not a failure: the results are dropped on purpose.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct StaleResultDiscard {
    pub token: RequestToken,
    pub current: Option<RequestToken>,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Completion {
    Applied,
    Discarded(StaleResultDiscard),
}

pub struct SearchCoordinator<T> {
    quiet_period: Duration,
    state: SearchState,
    last_token: u64,
    current: Option<SearchRequest>,
    displayed: DisplayedResults<T>,
}

impl<T> SearchCoordinator<T> {
    pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(100);

    pub fn new(quiet_period: Duration) -> SearchCoordinator<T> {
        SearchCoordinator {
            quiet_period,
            state: SearchState::Idle,
            last_token: 0,
            current: None,
            displayed: DisplayedResults::Default,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn displayed(&self) -> &DisplayedResults<T> {
        &self.displayed
    }

    /// The token of the latest request that fired, if it still counts.
    pub fn current_token(&self) -> Option<RequestToken> {
        self.current.as_ref().map(|r| r.token)
    }

    /// When the scheduled request, if any, is due.
    pub fn next_deadline(&self) -> Option<Duration> {
        match &self.state {
            SearchState::Idle => None,
            SearchState::Pending { fire_at, .. } => Some(*fire_at),
        }
    }

    /// Records a change of the query text.
    ///
    /// An empty text drops both the scheduled and the in-flight request and
    /// goes back to the default view. Any other text replaces the scheduled
    /// request by one due after a full quiet period.
    pub fn on_query_change(&mut self, text: &str, now: Duration) {
        if text.is_empty() {
            debug!("on_query_change: empty query, back to default view");
            self.state = SearchState::Idle;
            self.current = None;
            self.displayed = DisplayedResults::Default;
            return;
        }
        let fire_at = now + self.quiet_period;
        debug!(
            "on_query_change: {:?} scheduled at {:?} (was {:?})",
            text, fire_at, self.state
        );
        self.state = SearchState::Pending {
            query: text.to_string(),
            fire_at,
        };
    }

    /// Fires the scheduled request if its quiet period is over.
    ///
    /// The returned request becomes the current one before the caller issues it.
    pub fn poll(&mut self, now: Duration) -> Option<SearchRequest> {
        match &self.state {
            SearchState::Pending { fire_at, .. } if *fire_at <= now => {}
            _ => return None,
        }
        let query = match std::mem::replace(&mut self.state, SearchState::Idle) {
            SearchState::Pending { query, .. } => query,
            SearchState::Idle => return None,
        };
        self.last_token += 1;
        let request = SearchRequest {
            token: RequestToken(self.last_token),
            query,
        };
        info!(
            "poll: firing request {} for {:?} at {:?}",
            request.token, request.query, now
        );
        self.current = Some(request.clone());
        Some(request)
    }

    /// Reports the results of a request. They replace the displayed results
    /// only if no newer request was issued in the meantime.
    pub fn complete(&mut self, token: RequestToken, results: Vec<T>) -> Completion {
        match &self.current {
            Some(current) if current.token == token => {
                debug!(
                    "complete: applying {} results of request {}",
                    results.len(),
                    token
                );
                self.displayed = DisplayedResults::Search {
                    query: current.query.clone(),
                    results,
                };
                Completion::Applied
            }
            _ => {
                let discard = StaleResultDiscard {
                    token,
                    current: self.current_token(),
                };
                debug!(
                    "complete: stale result discarded for request {} (current: {:?})",
                    token, discard.current
                );
                Completion::Discarded(discard)
            }
        }
    }

    /// Reports a request that failed. The displayed results stay as they are.
    pub fn fail(&mut self, token: RequestToken, error: &dyn Display) {
        if self.current_token() == Some(token) {
            warn!("fail: search request {} failed: {}", token, error);
        } else {
            debug!(
                "fail: superseded search request {} failed: {}",
                token, error
            );
        }
    }
}
