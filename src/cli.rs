use log::{debug, info, warn};

use power_ratings::*;
use snafu::{prelude::*, ErrorCompat, Snafu};

use std::path::PathBuf;

use serde_json::json;
use serde_json::Value as JSValue;

use crate::args::{Args, Command};
use crate::cli::config_reader::*;
use crate::cli::io_common::*;
use crate::cli::replay::*;

pub mod config_reader;
pub mod io_common;
pub mod replay;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CliError {
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
    #[snafu(display("Error writing file {}", path.display()))]
    WritingOutput {
        source: std::io::Error,
        path: PathBuf,
    },
    #[snafu(display("Error formatting the result"))]
    FormattingJson { source: serde_json::Error },
    #[snafu(display("No data directory: pass --data or set dataDirectory in the configuration"))]
    MissingDataDirectory {},
    #[snafu(display("Error loading the ratings: {source}"))]
    LoadingStore { source: StoreError },
    #[snafu(display("{source}"))]
    Service { source: ServiceError },
    #[snafu(display("No politician found for {key}"))]
    PoliticianNotFound { key: String },
    #[snafu(display("Difference detected between the result and the reference {}", path.display()))]
    ReferenceMismatch { path: PathBuf },
}

impl CliError {
    /// The status reported in the error payload, for failures of an operation.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            CliError::Service { source } => Some(source.status_code()),
            CliError::PoliticianNotFound { .. } => Some(404),
            CliError::LoadingStore { .. } => Some(500),
            _ => None,
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;

/// Runs the command against the process-wide store.
pub fn run(args: &Args) -> CliResult<()> {
    let settings = resolve_settings(args)?;
    info!("settings: {:?}", settings);
    let store = shared_store(&settings.data_directory).context(LoadingStoreSnafu {})?;

    let result_js = execute(&args.command, store, &settings)?;
    let pretty_js = to_pretty_json(&result_js)?;
    write_output(args.out.as_deref(), &pretty_js)?;

    // The reference result, if provided for comparison
    if let Some(reference_p) = &args.reference {
        check_reference(reference_p.as_ref(), &pretty_js)?;
    }
    Ok(())
}

/// The JSON result of one command.
pub fn execute(
    command: &Command,
    store: &dyn RatingStore,
    settings: &Settings,
) -> CliResult<JSValue> {
    debug!("execute: {:?}", command);
    let js = match command {
        Command::Leaderboard { limit } => {
            let page = leaderboard(store, limit.unwrap_or(settings.leaderboard_size))
                .context(ServiceSnafu {})?;
            serde_json::to_value(page).context(FormattingJsonSnafu {})?
        }
        Command::Search { query, limit } => {
            let params = SearchParams {
                search: query.clone(),
            };
            let response = search(store, &params, limit.unwrap_or(settings.search_limit))
                .context(ServiceSnafu {})?;
            serde_json::to_value(response).context(FormattingJsonSnafu {})?
        }
        Command::Show { id, name } => {
            let key = match (id, name) {
                (Some(id), _) => PoliticianKey::Id(PoliticianId(*id)),
                (None, Some(name)) => PoliticianKey::Name(name.clone()),
                // Clap requires one of --id or --name.
                (None, None) => PoliticianKey::Name(String::new()),
            };
            let detail = politician_detail(store, &key).context(ServiceSnafu {})?;
            let detail = detail.context(PoliticianNotFoundSnafu {
                key: describe_key(&key),
            })?;
            serde_json::to_value(detail).context(FormattingJsonSnafu {})?
        }
        Command::Replay { script } => {
            let script = read_script(script.as_ref())?;
            let report = replay(store, &script, settings.quiet_period, settings.search_limit);
            serde_json::to_value(report).context(FormattingJsonSnafu {})?
        }
    };
    Ok(js)
}

fn describe_key(key: &PoliticianKey) -> String {
    match key {
        PoliticianKey::Id(id) => format!("id {}", id),
        PoliticianKey::Name(name) => format!("name {:?}", name),
    }
}

/// The payload written for a failed operation: `{"error": .., "status": ..}`.
pub fn error_payload(e: &CliError) -> Option<JSValue> {
    e.status_code()
        .map(|status| json!({"error": e.to_string(), "status": status}))
}

pub fn report_error(e: &CliError) {
    warn!("Error occured {:?}", e);
    if let Some(payload) = error_payload(e) {
        println!("{}", payload);
    }
    eprintln!("An error occured {}", e);
    if let Some(bt) = ErrorCompat::backtrace(e) {
        eprintln!("trace: {}", bt);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use std::time::Duration;

    pub(crate) fn write_data_directory(dir: &Path) {
        let politicians = json!([
            {
                "_id": 1,
                "name": "Ann Arbor",
                "rating": {"mu": 2134.4, "sigma": 60.0},
                "ranking": 1,
                "previous_ranking": 3,
                "last_ran_in": 2022,
                "party": "Democratic Party",
                "rating_history": [
                    {"rating": {"mu": 1500.0, "sigma": 500.0}},
                    {"contest_id": 10, "rating": {"mu": 1900.0, "sigma": 200.0}},
                    {"contest_id": 11, "rating": {"mu": 2134.4, "sigma": 60.0}}
                ]
            },
            {
                "_id": 2,
                "name": "Bob Annis",
                "searchable_name": "robert annis",
                "rating": {"mu": 1700.0, "sigma": 300.0, "low_confidence": true},
                "ranking": 2,
                "last_ran_in": 2020,
                "party": {"name": "Republican", "color": "#e91d0e"},
                "rating_history": [
                    {"rating": {"mu": 1500.0, "sigma": 500.0}},
                    {"contest_id": 10, "rating": {"mu": 1700.0, "sigma": 300.0}}
                ]
            }
        ]);
        let contests = json!([
            {
                "_id": 10,
                "name": "2020 Primary",
                "date": "2020-03-03",
                "source": "https://results.example.org/2020/primary",
                "candidates": [
                    {"_id": 2, "name": "Bob Annis", "party": "Republican Party", "votes": 900, "won": true},
                    {"_id": 1, "name": "Ann Arbor", "party": "Democratic Party", "votes": 12000, "won": true}
                ]
            },
            {
                "_id": 11,
                "name": "2022 General",
                "date": "2022-11-08T00:00:00Z",
                "source": "County clerk <records>",
                "candidates": [
                    {"_id": 1, "name": "Ann Arbor", "party": "Democratic Party", "votes": 1, "incumbent": true}
                ]
            }
        ]);
        fs::write(dir.join("politicians.json"), politicians.to_string()).unwrap();
        fs::write(dir.join("contests.json"), contests.to_string()).unwrap();
        fs::write(
            dir.join("metadata.json"),
            json!({"last_updated": "2023-01-02T03:04:05Z"}).to_string(),
        )
        .unwrap();
    }

    fn settings(dir: &Path) -> Settings {
        Settings {
            data_directory: dir.to_path_buf(),
            leaderboard_size: 100,
            search_limit: 100,
            quiet_period: Duration::from_millis(100),
        }
    }

    #[test]
    fn leaderboard_command() {
        let dir = tempfile::tempdir().unwrap();
        write_data_directory(dir.path());
        let store = JsonStore::open(dir.path()).unwrap();
        let js = execute(
            &Command::Leaderboard { limit: None },
            &store,
            &settings(dir.path()),
        )
        .unwrap();
        assert_eq!(js["last_updated"], json!("2023-01-02T03:04:05Z"));
        assert_eq!(js["entries"][0]["standing"], json!(1));
        assert_eq!(js["entries"][0]["tier"], json!("Platinum"));
        assert_eq!(js["entries"][0]["rank_change"], json!({"kind": "up", "magnitude": 2}));
        assert_eq!(js["entries"][1]["standing"], json!("unknown"));
        assert_eq!(js["entries"][1]["rank_change"], JSValue::Null);
    }

    #[test]
    fn search_command() {
        let dir = tempfile::tempdir().unwrap();
        write_data_directory(dir.path());
        let store = JsonStore::open(dir.path()).unwrap();
        let s = settings(dir.path());

        let js = execute(
            &Command::Search {
                query: Some("robert".to_string()),
                limit: None,
            },
            &store,
            &s,
        )
        .unwrap();
        assert_eq!(js["results"].as_array().unwrap().len(), 1);
        assert_eq!(js["results"][0]["name"], json!("Bob Annis"));

        let err = execute(
            &Command::Search {
                query: None,
                limit: None,
            },
            &store,
            &s,
        )
        .unwrap_err();
        assert_eq!(
            error_payload(&err),
            Some(json!({"error": "Must provide a \"search\" parameter", "status": 400}))
        );
    }

    #[test]
    fn show_command() {
        let dir = tempfile::tempdir().unwrap();
        write_data_directory(dir.path());
        let store = JsonStore::open(dir.path()).unwrap();
        let s = settings(dir.path());

        let js = execute(
            &Command::Show {
                id: Some(1),
                name: None,
            },
            &store,
            &s,
        )
        .unwrap();
        assert_eq!(
            js["description"],
            json!("Ann Arbor has a power rating of 2134 and is ranked #1")
        );
        let group = &js["contest_groups"][0];
        assert_eq!(group["label"], json!("2022"));
        let contest = &group["contests"][0];
        assert_eq!(contest["delta_label"], json!("+234"));
        assert_eq!(contest["candidates"][0]["votes"], json!("—"));
        assert_eq!(
            contest["sources"]["primary"],
            json!({"kind": "text", "escaped": "County clerk &lt;records&gt;"})
        );
        let earlier = &js["contest_groups"][1]["contests"][0];
        assert_eq!(earlier["candidates"][0]["name"], json!("Ann Arbor"));
        assert_eq!(earlier["candidates"][0]["votes"], json!("12,000"));
        assert_eq!(js["chart"]["points"].as_array().unwrap().len(), 3);

        let err = execute(
            &Command::Show {
                id: None,
                name: Some("Nobody".to_string()),
            },
            &store,
            &s,
        )
        .unwrap_err();
        assert_eq!(err.status_code(), Some(404));
    }

    #[test]
    fn reference_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("reference.json");
        fs::write(&reference, r#"{"a": 1}"#).unwrap();
        assert!(check_reference(&reference, &to_pretty_json(&json!({"a": 1})).unwrap()).is_ok());
        assert!(matches!(
            check_reference(&reference, &to_pretty_json(&json!({"a": 2})).unwrap()),
            Err(CliError::ReferenceMismatch { .. })
        ));
    }
}
