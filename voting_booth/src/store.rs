use std::collections::HashSet;
use std::error::Error;
use std::io;

use crate::config::*;

/// The durable, append-only log of the votes.
///
/// Implementations only need to know how to list the identifiers that already
/// voted and how to append new rows at the end.
pub trait RecordStore {
    type Error: Error;

    /// Returns the identifiers of all the recorded votes.
    ///
    /// A store that does not exist yet must be created empty. A store with
    /// malformed content must be reported as an error.
    fn load_voter_ids(&mut self) -> Result<HashSet<VoterId>, Self::Error>;

    /// Appends the votes, in order, after all the existing rows.
    fn append(&mut self, votes: &[Vote]) -> Result<(), Self::Error>;
}

/// A record store that lives in memory.
///
/// Mostly useful for tests. Appends can be made to fail with `fail_appends`.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct MemoryStore {
    pub rows: Vec<Vote>,
    pub fail_appends: bool,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn with_rows(rows: &[Vote]) -> MemoryStore {
        MemoryStore {
            rows: rows.to_vec(),
            fail_appends: false,
        }
    }
}

impl RecordStore for MemoryStore {
    type Error = io::Error;

    fn load_voter_ids(&mut self) -> Result<HashSet<VoterId>, io::Error> {
        Ok(self.rows.iter().map(|v| v.voter).collect())
    }

    fn append(&mut self, votes: &[Vote]) -> Result<(), io::Error> {
        if self.fail_appends {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "memory store refuses appends",
            ));
        }
        self.rows.extend_from_slice(votes);
        Ok(())
    }
}
