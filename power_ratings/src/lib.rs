/*!
Power ratings of politicians, computed from their electoral contests.

The ratings themselves are produced by an offline pipeline and stored as JSON
documents. This crate reads them back and answers the questions a client
asks: the leaderboard, the search box, and the page of a single politician.

The main entry points are:
* [`leaderboard()`], [`search()`] and [`politician_detail`] for the exposed operations
* [`correlate`] and [`group_by_year`] to turn a rating history into a timeline
* [`SearchCoordinator`] to debounce the search box of an interactive client
* [`JsonStore`] and [`shared_store`] to load the documents

See the [manual] for the layout of the data directory and the command line.
*/

mod error;
mod grouping;
mod leaderboard;
mod model;
mod search;
mod service;
mod store;
mod tier;
mod timeline;
pub mod manual;
pub mod views;

pub use crate::error::*;
pub use crate::grouping::*;
pub use crate::leaderboard::*;
pub use crate::model::*;
pub use crate::search::*;
pub use crate::service::*;
pub use crate::store::*;
pub use crate::tier::*;
pub use crate::timeline::*;
