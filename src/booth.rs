use log::{debug, info};

use snafu::{prelude::*, Snafu};
use voting_booth::flow::Flow;
use voting_booth::*;

use std::fs;
use std::io;

use serde_json::json;
use serde_json::Value as JSValue;

use crate::args::Args;
use crate::booth::config_reader::*;
use crate::booth::console::Console;
use crate::booth::io_csv::CsvRecordStore;

pub mod config_reader;
pub mod console;
pub mod io_csv;

#[derive(Debug, Snafu)]
pub enum BoothError {
    #[snafu(display("Record file {path} is not available"))]
    StoreUnavailable { source: io::Error, path: String },
    #[snafu(display("Error reading or writing the CSV record file {path}"))]
    CsvRecord { source: csv::Error, path: String },
    #[snafu(display("Malformed row at line {lineno} of {path}: {content}"))]
    MalformedRecord {
        path: String,
        lineno: usize,
        content: String,
    },
    #[snafu(display("Record file {path} has no 'Voter ID' column"))]
    MissingColumn { path: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson { source: io::Error, path: String },
    #[snafu(display("Error parsing the JSON content of {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error serializing the session summary"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Error writing file {path}"))]
    WritingJson { source: io::Error, path: String },
    #[snafu(display("The configuration file {path} has no parent directory"))]
    MissingParentDir { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type BoothResult<T> = Result<T, BoothError>;

/// The JSON summary of the session, written each time the votes are recorded.
pub fn build_summary_js(booth_name: &str, session: &SessionState, num_recorded: usize) -> JSValue {
    let tally = session.tally();
    json!({
        "booth": booth_name,
        "results": {
            "john": tally.john,
            "jane": tally.jane,
            "total": tally.total(),
            "winner": session.winner().to_string(),
        },
        "recorded": num_recorded,
    })
}

pub fn write_summary(
    settings: &BoothSettings,
    session: &SessionState,
    num_recorded: usize,
) -> BoothResult<()> {
    let out = match settings.summary_output.as_deref() {
        Some(out) if !out.is_empty() => out,
        _ => return Ok(()),
    };
    let summary_js = build_summary_js(&settings.booth_name, session, num_recorded);
    let pretty_js = serde_json::to_string_pretty(&summary_js).context(SerializingJsonSnafu {})?;
    if out == "stdout" {
        println!("{}", pretty_js);
    } else {
        debug!("write_summary: writing summary to {}", out);
        fs::write(out, pretty_js).context(WritingJsonSnafu { path: out })?;
    }
    Ok(())
}

/// Runs the booth in the terminal until the user closes it.
pub fn run_booth(args: &Args) -> BoothResult<()> {
    let settings = resolve_settings(args)?;
    info!("settings: {:?}", settings);

    let mut store = CsvRecordStore::new(&settings.record_file);
    info!("run_booth: record file {}", store.path().display());
    // A missing or corrupt record file is fatal.
    let session = SessionState::initialize(&mut store)?;
    let mut flow = Flow::new(session);

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut console = Console::new(stdin.lock(), stdout.lock(), settings.booth_name.clone());
    console.run(&mut flow, &mut store, |session, num_recorded| {
        write_summary(&settings, session, num_recorded)
    })?;

    let tally = flow.session().tally();
    info!(
        "run_booth: closing with John - {}, Jane - {}, {} votes not recorded",
        tally.john,
        tally.jane,
        flow.session().pending().len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn session_with(votes: &[(&str, &str)]) -> SessionState {
        let mut session = SessionState::default();
        for (id, c) in votes {
            session.register_voter(id).unwrap();
            session.cast_vote(c).unwrap();
        }
        session
    }

    #[test]
    fn summary_content() {
        let session = session_with(&[("1", "john"), ("2", "jane"), ("3", "john")]);
        let js = build_summary_js("Town hall", &session, 3);
        assert_eq!(
            js,
            json!({
                "booth": "Town hall",
                "results": {"john": 2, "jane": 1, "total": 3, "winner": "John"},
                "recorded": 3
            })
        );
    }

    #[test]
    fn summary_written_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("summary.json");
        let settings = BoothSettings {
            record_file: PathBuf::from("unused.csv"),
            summary_output: Some(out.display().to_string()),
            booth_name: DEFAULT_BOOTH_NAME.to_string(),
        };
        let session = session_with(&[("10", "jane")]);
        write_summary(&settings, &session, 1).unwrap();

        let js: JSValue = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(js["results"]["winner"], json!("Jane"));
        assert_eq!(js["booth"], json!(DEFAULT_BOOTH_NAME));
    }

    #[test]
    fn no_summary_without_output() {
        let settings = BoothSettings {
            record_file: PathBuf::from("unused.csv"),
            summary_output: None,
            booth_name: DEFAULT_BOOTH_NAME.to_string(),
        };
        assert!(write_summary(&settings, &SessionState::default(), 0).is_ok());
    }

    #[test]
    fn summary_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nope").join("summary.json");
        let settings = BoothSettings {
            record_file: PathBuf::from("unused.csv"),
            summary_output: Some(out.display().to_string()),
            booth_name: DEFAULT_BOOTH_NAME.to_string(),
        };
        let res = write_summary(&settings, &SessionState::default(), 0);
        assert!(matches!(res, Err(BoothError::WritingJson { .. })));
    }
}
