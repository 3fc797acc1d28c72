use crate::cli::*;

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct FirebrandConfig {
    #[serde(rename = "dataDirectory")]
    pub data_directory: Option<String>,
    #[serde(rename = "leaderboardSize")]
    pub leaderboard_size: Option<usize>,
    #[serde(rename = "searchLimit")]
    pub search_limit: Option<usize>,
    #[serde(rename = "debounceMillis")]
    pub debounce_millis: Option<u64>,
}

/// The configuration file combined with the command line.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Settings {
    pub data_directory: PathBuf,
    pub leaderboard_size: usize,
    pub search_limit: usize,
    pub quiet_period: Duration,
}

pub fn read_config(path: &Path) -> CliResult<FirebrandConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read config: {:?}", contents);
    serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })
}

pub fn resolve_settings(args: &Args) -> CliResult<Settings> {
    let (config, config_dir) = match &args.config {
        Some(config_p) => {
            let config_p = Path::new(config_p);
            let config = read_config(config_p)?;
            info!("config: {:?}", config);
            (config, config_p.parent().map(Path::to_path_buf))
        }
        None => (FirebrandConfig::default(), None),
    };

    let data_directory = match (&args.data, &config.data_directory) {
        (Some(data), _) => PathBuf::from(data),
        (None, Some(data)) => {
            let data_p = Path::new(data);
            match config_dir {
                Some(dir) if data_p.is_relative() => dir.join(data_p),
                _ => data_p.to_path_buf(),
            }
        }
        (None, None) => return MissingDataDirectorySnafu {}.fail(),
    };

    Ok(Settings {
        data_directory,
        leaderboard_size: config.leaderboard_size.unwrap_or(DEFAULT_PAGE_SIZE),
        search_limit: config.search_limit.unwrap_or(DEFAULT_PAGE_SIZE),
        quiet_period: config
            .debounce_millis
            .map(Duration::from_millis)
            .unwrap_or(SearchCoordinator::<PoliticianSummary>::DEFAULT_QUIET_PERIOD),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn defaults_without_config() {
        let args = Args::parse_from(["firebrand", "--data", "ratings", "leaderboard"]);
        let settings = resolve_settings(&args).unwrap();
        assert_eq!(settings.data_directory, PathBuf::from("ratings"));
        assert_eq!(settings.leaderboard_size, 100);
        assert_eq!(settings.search_limit, 100);
        assert_eq!(settings.quiet_period, Duration::from_millis(100));
    }

    #[test]
    fn config_file_relative_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config_p = dir.path().join("firebrand.json");
        fs::write(
            &config_p,
            r#"{"dataDirectory": "data", "leaderboardSize": 25, "debounceMillis": 250}"#,
        )
        .unwrap();
        let config_s = config_p.to_str().unwrap();

        let args = Args::parse_from(["firebrand", "--config", config_s, "leaderboard"]);
        let settings = resolve_settings(&args).unwrap();
        assert_eq!(settings.data_directory, dir.path().join("data"));
        assert_eq!(settings.leaderboard_size, 25);
        assert_eq!(settings.search_limit, 100);
        assert_eq!(settings.quiet_period, Duration::from_millis(250));

        // The command line wins over the file.
        let args = Args::parse_from([
            "firebrand", "--config", config_s, "--data", "/srv/ratings", "leaderboard",
        ]);
        assert_eq!(
            resolve_settings(&args).unwrap().data_directory,
            PathBuf::from("/srv/ratings")
        );
    }

    #[test]
    fn missing_data_directory() {
        let args = Args::parse_from(["firebrand", "search", "--query", "ann"]);
        assert!(matches!(
            resolve_settings(&args),
            Err(CliError::MissingDataDirectory {})
        ));
    }

    #[test]
    fn unreadable_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_p = dir.path().join("broken.json");
        fs::write(&config_p, "{ not json").unwrap();
        assert!(matches!(
            read_config(&config_p),
            Err(CliError::ParsingJson { .. })
        ));
        assert!(matches!(
            read_config(&dir.path().join("absent.json")),
            Err(CliError::OpeningJson { .. })
        ));
    }
}
