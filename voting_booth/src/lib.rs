/*!

The core of a two-candidate voting booth.

A [`SessionState`] keeps the tally of one running booth and the identifiers that
are no longer allowed to vote. The [`flow::Flow`] controller walks a voter through
the screens of the booth and mutates the session accordingly. The votes are
made durable through a [`RecordStore`].

```
use voting_booth::*;

let mut store = MemoryStore::new();
let mut session = SessionState::initialize(&mut store)?;

session.register_voter("42").unwrap();
session.cast_vote("John ").unwrap();
session.register_voter("43").unwrap();
session.cast_vote("jane").unwrap();

assert_eq!(session.winner(), Winner::Tie);
assert_eq!(session.flush(&mut store)?, 2);
assert_eq!(store.rows.len(), 2);
# Ok::<(), std::io::Error>(())
```
*/
mod config;
pub mod flow;
mod store;

use log::{debug, info};

use std::collections::HashSet;

pub use crate::config::*;
pub use crate::store::*;

/// The state of one running booth.
///
/// Invariants:
/// - the tally of each candidate is the number of votes for this candidate
/// - every voter in the votes is one of the used identifiers
/// - the flushed votes are a prefix of the votes
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct SessionState {
    used_ids: HashSet<VoterId>,
    tally: Tally,
    current_voter: Option<VoterId>,
    votes: Vec<Vote>,
    // Number of leading votes already appended to the record store.
    flushed: usize,
}

impl SessionState {
    /// A fresh session in which the given identifiers have already voted.
    pub fn new(used_ids: impl IntoIterator<Item = VoterId>) -> SessionState {
        SessionState {
            used_ids: used_ids.into_iter().collect(),
            ..SessionState::default()
        }
    }

    /// Starts a session from the content of the record store.
    ///
    /// Fails if the store cannot be read or created.
    pub fn initialize<S: RecordStore>(store: &mut S) -> Result<SessionState, S::Error> {
        let used_ids = store.load_voter_ids()?;
        info!(
            "initialize: {} voter ids found in the record store",
            used_ids.len()
        );
        Ok(SessionState::new(used_ids))
    }

    /// Checks the identifier of a new voter and makes it the current voter.
    ///
    /// The checks are done in order: the input must be a number, within
    /// the allowed range, and must not have been used before.
    pub fn register_voter(&mut self, raw: &str) -> Result<VoterId, VoteError> {
        let id: VoterId = raw.parse()?;
        if self.used_ids.contains(&id) {
            debug!("register_voter: {} already voted", id);
            return Err(VoteError::DuplicateVoter);
        }
        self.used_ids.insert(id);
        self.current_voter = Some(id);
        info!("register_voter: voter {} registered", id);
        Ok(id)
    }

    /// Records the vote of the current voter.
    ///
    /// On success the turn of the current voter ends: a voter votes at most once.
    pub fn cast_vote(&mut self, raw: &str) -> Result<CandidateChoice, VoteError> {
        let candidate: CandidateChoice = raw.parse()?;
        let voter = self.current_voter.ok_or(VoteError::NoActiveVoter)?;
        self.tally.add(candidate);
        self.votes.push(Vote { voter, candidate });
        self.current_voter = None;
        info!("cast_vote: voter {} voted for {}", voter, candidate);
        Ok(candidate)
    }

    /// Ends the turn of the current voter, if any.
    ///
    /// The identifier stays used even if no vote was cast.
    pub fn end_voter_turn(&mut self) -> Option<VoterId> {
        let voter = self.current_voter.take();
        if let Some(id) = voter {
            debug!("end_voter_turn: voter {}", id);
        }
        voter
    }

    /// Appends the votes that were not recorded yet to the store.
    ///
    /// Returns the number of appended votes. Calling it again without new votes
    /// appends nothing. If the store fails, the votes stay pending.
    pub fn flush<S: RecordStore>(&mut self, store: &mut S) -> Result<usize, S::Error> {
        let pending = self.pending();
        if pending.is_empty() {
            debug!("flush: nothing to record");
            return Ok(0);
        }
        store.append(pending)?;
        let num_recorded = pending.len();
        self.flushed = self.votes.len();
        info!("flush: recorded {} votes", num_recorded);
        Ok(num_recorded)
    }

    /// Computed from the live tally.
    pub fn winner(&self) -> Winner {
        self.tally.winner()
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    pub fn votes(&self) -> &[Vote] {
        &self.votes
    }

    /// The votes that have not been appended to the store yet.
    pub fn pending(&self) -> &[Vote] {
        &self.votes[self.flushed..]
    }

    pub fn current_voter(&self) -> Option<VoterId> {
        self.current_voter
    }

    pub fn is_used(&self, id: VoterId) -> bool {
        self.used_ids.contains(&id)
    }

    pub fn used_ids(&self) -> &HashSet<VoterId> {
        &self.used_ids
    }
}
