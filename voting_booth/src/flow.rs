//! The screens of the booth and the transitions between them.
//!
//! ```text
//! Intent --vote--> Identify --submit ok--> Candidate --proceed--> Intent
//!   |                 |  ^--submit failed        ^--submit
//!   |                 '--cancel--> Intent
//!   '--view results--> Results --record--> Results --close--> Closed
//! ```

use log::{debug, warn};

use std::error::Error;
use std::fmt::Display;

use crate::{CandidateChoice, RecordStore, SessionState, VoteError, VoterId, Winner};

/// A gesture of the user.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Action {
    /// Intent: start voting.
    Vote,
    /// Intent: go to the results.
    ViewResults,
    /// Identify or Candidate: submit the content of the input field.
    Submit(String),
    /// Identify: go back to the start.
    Cancel,
    /// Candidate: done with this voter.
    Proceed,
    /// Results: append the session votes to the record store.
    Record,
    /// Results: quit the booth.
    Close,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Vote => ActionKind::Vote,
            Action::ViewResults => ActionKind::ViewResults,
            Action::Submit(_) => ActionKind::Submit,
            Action::Cancel => ActionKind::Cancel,
            Action::Proceed => ActionKind::Proceed,
            Action::Record => ActionKind::Record,
            Action::Close => ActionKind::Close,
        }
    }
}

/// An action without its payload, as offered by a screen.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum ActionKind {
    Vote,
    ViewResults,
    Submit,
    Cancel,
    Proceed,
    Record,
    Close,
}

impl ActionKind {
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::Vote => "Yes",
            ActionKind::ViewResults => "No, show results",
            ActionKind::Submit => "Submit",
            ActionKind::Cancel => "Return",
            ActionKind::Proceed => "Vote again or view results",
            ActionKind::Record => "Record",
            ActionKind::Close => "Close",
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Stage {
    Intent,
    Identify,
    Candidate,
    Results,
    Closed,
}

/// What happened the last time the votes were recorded.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum RecordOutcome {
    Appended(usize),
    Failed(String),
}

/// The current screen, with what it needs to remember.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum State {
    Intent,
    Identify {
        rejection: Option<VoteError>,
    },
    Candidate {
        voter: VoterId,
        last: Option<Result<CandidateChoice, VoteError>>,
    },
    Results {
        record: Option<RecordOutcome>,
    },
    Closed,
}

impl State {
    pub fn stage(&self) -> Stage {
        match self {
            State::Intent => Stage::Intent,
            State::Identify { .. } => Stage::Identify,
            State::Candidate { .. } => Stage::Candidate,
            State::Results { .. } => Stage::Results,
            State::Closed => Stage::Closed,
        }
    }
}

/// What the presentation layer needs to draw the current state.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Screen {
    pub title: &'static str,
    /// The lines of text, the first one being the prompt.
    pub lines: Vec<String>,
    /// The label of the input field, if the screen has one.
    pub input: Option<&'static str>,
    pub actions: Vec<ActionKind>,
}

#[derive(Debug)]
pub enum FlowError<E> {
    /// The action is not offered by the current screen. Nothing changed.
    UnexpectedAction { stage: Stage, action: ActionKind },
    /// The votes could not be recorded. They stay pending.
    Store(E),
}

impl<E: Error> Display for FlowError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowError::UnexpectedAction { stage, action } => {
                write!(f, "action {:?} is not available in {:?}", action, stage)
            }
            FlowError::Store(e) => write!(f, "could not record the votes: {}", e),
        }
    }
}

impl<E: Error + 'static> Error for FlowError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FlowError::UnexpectedAction { .. } => None,
            FlowError::Store(e) => Some(e),
        }
    }
}

pub fn rejection_message(e: &VoteError) -> &'static str {
    match e {
        VoteError::InvalidId => "INVALID ID",
        VoteError::DuplicateVoter => "YOU ALREADY VOTED",
        VoteError::NoActiveVoter => "Your vote is in. Proceed to let the next voter in",
        VoteError::InvalidCandidate => "Must be John or Jane",
    }
}

pub fn winner_message(w: &Winner) -> String {
    match w {
        Winner::Elected(c) => format!("Winner is {}!", c),
        Winner::Tie => "Tie! Maybe try rock-paper-scissors?".to_string(),
    }
}

/// The booth: the current screen and the session it works on.
///
/// ```
/// use voting_booth::flow::{Action, Flow, Stage};
/// use voting_booth::{MemoryStore, SessionState, Tally};
///
/// let mut store = MemoryStore::new();
/// let mut flow = Flow::new(SessionState::default());
/// flow.handle(Action::Vote, &mut store)?;
/// flow.handle(Action::Submit("42".to_string()), &mut store)?;
/// flow.handle(Action::Submit("jane".to_string()), &mut store)?;
/// flow.handle(Action::Proceed, &mut store)?;
/// assert_eq!(flow.stage(), Stage::Intent);
/// assert_eq!(flow.session().tally(), Tally { john: 0, jane: 1 });
/// # Ok::<(), voting_booth::flow::FlowError<std::io::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Flow {
    session: SessionState,
    state: State,
}

impl Flow {
    pub fn new(session: SessionState) -> Flow {
        Flow {
            session,
            state: State::Intent,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn stage(&self) -> Stage {
        self.state.stage()
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn into_session(self) -> SessionState {
        self.session
    }

    /// Applies one action of the user and returns the resulting stage.
    ///
    /// Rejected inputs are not errors: they are kept in the state and shown on
    /// the screen. The store is only touched by `Action::Record`.
    pub fn handle<S: RecordStore>(
        &mut self,
        action: Action,
        store: &mut S,
    ) -> Result<Stage, FlowError<S::Error>> {
        debug!("handle: {:?} in {:?}", action, self.stage());
        let mut failure = None;
        let next = match (&self.state, action) {
            (State::Intent, Action::Vote) => State::Identify { rejection: None },
            (State::Intent, Action::ViewResults) => State::Results { record: None },

            (State::Identify { .. }, Action::Submit(raw)) => {
                match self.session.register_voter(&raw) {
                    Ok(voter) => State::Candidate { voter, last: None },
                    Err(e) => {
                        warn!("handle: voter id {:?} rejected: {}", raw, e);
                        State::Identify { rejection: Some(e) }
                    }
                }
            }
            (State::Identify { .. }, Action::Cancel) => State::Intent,

            (State::Candidate { voter, .. }, Action::Submit(raw)) => {
                let voter = *voter;
                let last = self.session.cast_vote(&raw);
                if let Err(e) = last {
                    warn!("handle: vote {:?} of voter {} rejected: {}", raw, voter, e);
                }
                State::Candidate {
                    voter,
                    last: Some(last),
                }
            }
            (State::Candidate { .. }, Action::Proceed) => {
                self.session.end_voter_turn();
                State::Intent
            }

            (State::Results { .. }, Action::Record) => {
                let outcome = match self.session.flush(store) {
                    Ok(num_rows) => RecordOutcome::Appended(num_rows),
                    Err(e) => {
                        warn!("handle: failed to record the votes: {}", e);
                        let outcome = RecordOutcome::Failed(e.to_string());
                        failure = Some(e);
                        outcome
                    }
                };
                State::Results {
                    record: Some(outcome),
                }
            }
            (State::Results { .. }, Action::Close) => State::Closed,

            (state, action) => {
                return Err(FlowError::UnexpectedAction {
                    stage: state.stage(),
                    action: action.kind(),
                });
            }
        };
        self.state = next;
        match failure {
            Some(e) => Err(FlowError::Store(e)),
            None => Ok(self.stage()),
        }
    }

    /// Describes the current state for the presentation layer.
    pub fn screen(&self) -> Screen {
        match &self.state {
            State::Intent => Screen {
                title: "Vote Menu",
                lines: vec!["Would you like to vote?".to_string()],
                input: None,
                actions: vec![ActionKind::Vote, ActionKind::ViewResults],
            },
            State::Identify { rejection } => Screen {
                title: "Voter ID",
                lines: vec![match rejection {
                    Some(e) => rejection_message(e).to_string(),
                    None => "Input your Voter ID".to_string(),
                }],
                input: Some("Voter ID"),
                actions: vec![ActionKind::Submit, ActionKind::Cancel],
            },
            State::Candidate { last, .. } => Screen {
                title: "Candidates",
                lines: vec![match last {
                    Some(Ok(c)) => format!("Voted {}", c),
                    Some(Err(e)) => rejection_message(e).to_string(),
                    None => "Input the name of your candidate:".to_string(),
                }],
                input: Some("Candidate"),
                actions: vec![ActionKind::Submit, ActionKind::Proceed],
            },
            State::Results { record } => {
                let tally = self.session.tally();
                let mut lines = vec![format!(
                    "This session: John - {}, Jane - {}, Total - {}",
                    tally.john,
                    tally.jane,
                    tally.total()
                )];
                match record {
                    Some(RecordOutcome::Appended(num_rows)) => {
                        lines.push(winner_message(&self.session.winner()));
                        lines.push(format!("{} new votes recorded", num_rows));
                    }
                    Some(RecordOutcome::Failed(msg)) => {
                        lines.push(winner_message(&self.session.winner()));
                        lines.push(format!("Could not record the votes: {}", msg));
                    }
                    None => {}
                }
                Screen {
                    title: "Results",
                    lines,
                    input: None,
                    actions: vec![ActionKind::Record, ActionKind::Close],
                }
            }
            State::Closed => Screen {
                title: "Closed",
                lines: vec![],
                input: None,
                actions: vec![],
            },
        }
    }
}
