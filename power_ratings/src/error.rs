use std::path::PathBuf;

use snafu::Snafu;

use crate::model::{ContestId, PoliticianId};

/// The rating history of a politician cannot be lined up with its contests.
///
/// This always points at a defect in the data written by the rating pipeline.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CorrelationError {
    #[snafu(display("rating history is empty, the prior rating is missing"))]
    MissingBaseline {},
    #[snafu(display("rating history entry {index} does not name a contest"))]
    UnlabeledHistoryEntry { index: usize },
    #[snafu(display("contest {contest_id} is in the rating history but has no record"))]
    MissingContest { contest_id: ContestId },
    #[snafu(display("contest {contest_id} was joined but is not in the rating history"))]
    UnreferencedContest { contest_id: ContestId },
    #[snafu(display("contest {contest_id} was joined more than once"))]
    DuplicateContest { contest_id: ContestId },
    #[snafu(display("rating history entry {index} repeats contest {contest_id}"))]
    RepeatedHistoryContest { contest_id: ContestId, index: usize },
}

pub type CorrelationResult<T> = Result<T, CorrelationError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum StoreError {
    #[snafu(display("Error opening file {}", path.display()))]
    OpeningJson {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Error parsing file {}", path.display()))]
    ParsingJson {
        source: serde_json::Error,
        path: PathBuf,
    },
    #[snafu(display("{} is not a data directory", path.display()))]
    InvalidDataDirectory { path: PathBuf },
    #[snafu(display("politician {id} is stored more than once"))]
    DuplicatePolitician { id: PoliticianId },
    #[snafu(display("contest {id} is stored more than once"))]
    DuplicateStoredContest { id: ContestId },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures of the exposed operations.
///
/// A politician that does not exist is not an error: lookups return `None`
/// and leave the choice of a status to the caller.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ServiceError {
    #[snafu(display("Must provide a \"{parameter}\" parameter"))]
    Validation { parameter: String },
    #[snafu(display("history of politician {politician} is inconsistent: {source}"))]
    DataIntegrity {
        politician: PoliticianId,
        source: CorrelationError,
    },
    #[snafu(display("storage query failed: {source}"))]
    Store { source: StoreError },
}

impl ServiceError {
    /// The HTTP-equivalent status of this failure.
    ///
    /// Integrity failures degrade to "not found" for the caller; they are
    /// logged as errors where they are detected.
    pub fn status_code(&self) -> u16 {
        match self {
            ServiceError::Validation { .. } => 400,
            ServiceError::DataIntegrity { .. } => 404,
            ServiceError::Store { .. } => 500,
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
