use log::debug;

use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use std::fs;
use std::path::{Path, PathBuf};

use crate::args::Args;
use crate::booth::*;

pub const DEFAULT_RECORD_FILE: &str = "vote_records.csv";
pub const DEFAULT_BOOTH_NAME: &str = "Vote Menu";

/// The content of the JSON configuration file. All the fields are optional.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoothConfig {
    #[serde(rename = "recordFile")]
    pub record_file: Option<String>,
    #[serde(rename = "summaryOutput")]
    pub summary_output: Option<String>,
    #[serde(rename = "boothName")]
    pub booth_name: Option<String>,
}

/// The settings of a run, once the command line is applied over the configuration file.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BoothSettings {
    pub record_file: PathBuf,
    pub summary_output: Option<String>,
    pub booth_name: String,
}

pub fn read_config(path: &str) -> BoothResult<BoothConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    debug!("read_config: content: {:?}", contents);
    let config: BoothConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    Ok(config)
}

pub fn resolve_settings(args: &Args) -> BoothResult<BoothSettings> {
    let (config, root_p) = match args.config.as_deref() {
        Some(config_path) => {
            let config = read_config(config_path)?;
            let root_p = Path::new(config_path)
                .parent()
                .context(MissingParentDirSnafu { path: config_path })?
                .to_path_buf();
            (config, Some(root_p))
        }
        None => (BoothConfig::default(), None),
    };

    let record_file = match (&args.records, &config.record_file, &root_p) {
        (Some(p), _, _) => PathBuf::from(p),
        (None, Some(p), Some(root)) => root.join(p),
        (None, Some(p), None) => PathBuf::from(p),
        (None, None, _) => PathBuf::from(DEFAULT_RECORD_FILE),
    };

    Ok(BoothSettings {
        record_file,
        summary_output: args.out.clone().or(config.summary_output),
        booth_name: config
            .booth_name
            .unwrap_or_else(|| DEFAULT_BOOTH_NAME.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &Path, content: &str) -> String {
        let p = dir.join("booth_config.json");
        fs::write(&p, content).unwrap();
        p.display().to_string()
    }

    #[test]
    fn defaults_without_config() {
        let settings = resolve_settings(&Args::default()).unwrap();
        assert_eq!(settings.record_file, PathBuf::from(DEFAULT_RECORD_FILE));
        assert_eq!(settings.summary_output, None);
        assert_eq!(settings.booth_name, DEFAULT_BOOTH_NAME);
    }

    #[test]
    fn config_paths_are_relative_to_the_config() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(
            dir.path(),
            r#"{"recordFile": "records.csv", "summaryOutput": "stdout", "boothName": "Precinct 4"}"#,
        );
        let args = Args {
            config: Some(config_path),
            ..Args::default()
        };
        let settings = resolve_settings(&args).unwrap();
        assert_eq!(settings.record_file, dir.path().join("records.csv"));
        assert_eq!(settings.summary_output.as_deref(), Some("stdout"));
        assert_eq!(settings.booth_name, "Precinct 4");
    }

    #[test]
    fn command_line_wins() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(
            dir.path(),
            r#"{"recordFile": "records.csv", "summaryOutput": "summary.json"}"#,
        );
        let args = Args {
            config: Some(config_path),
            records: Some("other.csv".to_string()),
            out: Some("stdout".to_string()),
            verbose: false,
        };
        let settings = resolve_settings(&args).unwrap();
        assert_eq!(settings.record_file, PathBuf::from("other.csv"));
        assert_eq!(settings.summary_output.as_deref(), Some("stdout"));
    }

    #[test]
    fn missing_fields_are_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(dir.path(), "{}");
        let config = read_config(&config_path).unwrap();
        assert_eq!(config, BoothConfig::default());
    }

    #[test]
    fn bad_configs() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = write_config(dir.path(), r#"{"recordFile": 3}"#);
        assert!(matches!(
            read_config(&config_path),
            Err(BoothError::ParsingJson { .. })
        ));
        let missing = dir.path().join("missing.json").display().to_string();
        assert!(matches!(
            read_config(&missing),
            Err(BoothError::OpeningJson { .. })
        ));
    }
}
