// The CSV record of the votes.

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use snafu::prelude::*;
use voting_booth::*;

use crate::booth::*;

pub const RECORD_HEADER: [&str; 2] = ["Voter ID", "Candidate"];

/// A record store backed by a CSV file with a `Voter ID,Candidate` header.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CsvRecordStore {
    path: PathBuf,
}

impl CsvRecordStore {
    pub fn new<P: AsRef<Path>>(path: P) -> CsvRecordStore {
        CsvRecordStore {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn path_str(&self) -> String {
        self.path.display().to_string()
    }

    /// Writes a file that only contains the header, replacing any content.
    fn write_header(&self) -> BoothResult<()> {
        let path = self.path_str();
        let mut wtr = csv::Writer::from_path(&self.path).context(CsvRecordSnafu { path: &path })?;
        wtr.write_record(RECORD_HEADER)
            .context(CsvRecordSnafu { path: &path })?;
        wtr.flush().context(StoreUnavailableSnafu { path })?;
        Ok(())
    }

    fn read_voter_ids(&self) -> BoothResult<HashSet<VoterId>> {
        let path = self.path_str();
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(&self.path)
            .context(CsvRecordSnafu { path: &path })?;
        let headers = rdr
            .headers()
            .context(CsvRecordSnafu { path: &path })?
            .clone();
        debug!("read_voter_ids: header: {:?}", headers);
        let id_idx = headers
            .iter()
            .position(|h| h == RECORD_HEADER[0])
            .context(MissingColumnSnafu { path: &path })?;

        let mut res: HashSet<VoterId> = HashSet::new();
        for (idx, line_r) in rdr.records().enumerate() {
            // The header is the first line.
            let lineno = idx + 2;
            let line = line_r.context(CsvRecordSnafu { path: &path })?;
            debug!("read_voter_ids: lineno: {:?} row: {:?}", lineno, line);
            let id = line
                .get(id_idx)
                .and_then(|s| s.parse::<VoterId>().ok())
                .context(MalformedRecordSnafu {
                    path: &path,
                    lineno,
                    content: format!("{:?}", line),
                })?;
            res.insert(id);
        }
        Ok(res)
    }
}

impl RecordStore for CsvRecordStore {
    type Error = BoothError;

    fn load_voter_ids(&mut self) -> BoothResult<HashSet<VoterId>> {
        match fs::metadata(&self.path) {
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("Creating record file {}", self.path_str());
                self.write_header()?;
                Ok(HashSet::new())
            }
            Err(e) => Err(e).context(StoreUnavailableSnafu {
                path: self.path_str(),
            }),
            Ok(m) if m.len() == 0 => {
                info!("Record file {} is empty, adding the header", self.path_str());
                self.write_header()?;
                Ok(HashSet::new())
            }
            Ok(_) => {
                info!("Reading record file {}", self.path_str());
                self.read_voter_ids()
            }
        }
    }

    fn append(&mut self, votes: &[Vote]) -> BoothResult<()> {
        let path = self.path_str();
        // The file must still be there: it holds the header.
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .open(&self.path)
            .context(StoreUnavailableSnafu { path: &path })?;
        if lacks_final_newline(&mut file).context(StoreUnavailableSnafu { path: &path })? {
            debug!("append: adding the missing line break at the end of {}", path);
            file.write_all(b"\n")
                .context(StoreUnavailableSnafu { path: &path })?;
        }
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        for v in votes {
            wtr.write_record([v.voter.to_string().as_str(), v.candidate.code()])
                .context(CsvRecordSnafu { path: &path })?;
        }
        wtr.flush().context(StoreUnavailableSnafu { path })?;
        debug!("append: {} rows", votes.len());
        Ok(())
    }
}

/// True when the last line of a non-empty file is not terminated.
fn lacks_final_newline(file: &mut File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n' && last[0] != b'\r')
}
