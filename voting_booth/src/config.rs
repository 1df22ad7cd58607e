// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;

/// Smallest identifier that can be handed to a voter.
pub const MIN_VOTER_ID: u16 = 1;
/// Largest identifier that can be handed to a voter.
pub const MAX_VOTER_ID: u16 = 9999;

/// The identifier of a voter.
///
/// It is always within `MIN_VOTER_ID..=MAX_VOTER_ID`. Parsing from text trims the
/// surrounding whitespace first:
///
/// ```
/// use voting_booth::{VoteError, VoterId};
///
/// let id: VoterId = " 42 ".parse()?;
/// assert_eq!(id.get(), 42);
/// assert_eq!("0".parse::<VoterId>(), Err(VoteError::InvalidId));
/// assert_eq!("abc".parse::<VoterId>(), Err(VoteError::InvalidId));
/// # Ok::<(), VoteError>(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub struct VoterId(u16);

impl VoterId {
    pub fn new(id: i64) -> Result<VoterId, VoteError> {
        if (MIN_VOTER_ID as i64..=MAX_VOTER_ID as i64).contains(&id) {
            Ok(VoterId(id as u16))
        } else {
            Err(VoteError::InvalidId)
        }
    }

    pub fn get(&self) -> u16 {
        self.0
    }
}

impl FromStr for VoterId {
    type Err = VoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Anything that does not fit in an i64 is out of range anyway.
        let id = s.trim().parse::<i64>().map_err(|_| VoteError::InvalidId)?;
        VoterId::new(id)
    }
}

impl Display for VoterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two candidates of the booth.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub enum CandidateChoice {
    John,
    Jane,
}

impl CandidateChoice {
    pub const ALL: [CandidateChoice; 2] = [CandidateChoice::John, CandidateChoice::Jane];

    /// The normalized form, as written in the record store.
    pub fn code(&self) -> &'static str {
        match self {
            CandidateChoice::John => "john",
            CandidateChoice::Jane => "jane",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            CandidateChoice::John => "John",
            CandidateChoice::Jane => "Jane",
        }
    }
}

impl FromStr for CandidateChoice {
    type Err = VoteError;

    /// Case-insensitive, ignores the surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        CandidateChoice::ALL
            .iter()
            .find(|c| c.code() == normalized)
            .copied()
            .ok_or(VoteError::InvalidCandidate)
    }
}

impl Display for CandidateChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub struct Vote {
    pub voter: VoterId,
    pub candidate: CandidateChoice,
}

// ******** Output data structures *********

/// Running count of the votes cast during one session.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Default)]
pub struct Tally {
    pub john: u64,
    pub jane: u64,
}

impl Tally {
    pub fn count(&self, candidate: CandidateChoice) -> u64 {
        match candidate {
            CandidateChoice::John => self.john,
            CandidateChoice::Jane => self.jane,
        }
    }

    pub fn total(&self) -> u64 {
        self.john + self.jane
    }

    pub(crate) fn add(&mut self, candidate: CandidateChoice) {
        match candidate {
            CandidateChoice::John => self.john += 1,
            CandidateChoice::Jane => self.jane += 1,
        }
    }

    /// The candidate with strictly more votes, or a tie.
    ///
    /// ```
    /// use voting_booth::{CandidateChoice, Tally, Winner};
    ///
    /// assert_eq!(Tally { john: 3, jane: 1 }.winner(), Winner::Elected(CandidateChoice::John));
    /// assert_eq!(Tally { john: 0, jane: 0 }.winner(), Winner::Tie);
    /// ```
    pub fn winner(&self) -> Winner {
        match self.john.cmp(&self.jane) {
            std::cmp::Ordering::Greater => Winner::Elected(CandidateChoice::John),
            std::cmp::Ordering::Less => Winner::Elected(CandidateChoice::Jane),
            std::cmp::Ordering::Equal => Winner::Tie,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Winner {
    Elected(CandidateChoice),
    Tie,
}

impl Display for Winner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Winner::Elected(c) => write!(f, "{}", c),
            Winner::Tie => write!(f, "Tie"),
        }
    }
}

/// Rejections of a voter's input. None of them is fatal: the voter may try again.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum VoteError {
    /// Not a number, or outside of `MIN_VOTER_ID..=MAX_VOTER_ID`.
    InvalidId,
    /// The identifier was already used, in this session or in the record store.
    DuplicateVoter,
    /// Anything that is neither John nor Jane.
    InvalidCandidate,
    /// A vote was submitted while no voter is identified, typically because
    /// the current voter already voted.
    NoActiveVoter,
}

impl Error for VoteError {}

impl Display for VoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteError::InvalidId => write!(
                f,
                "voter id must be a number between {} and {}",
                MIN_VOTER_ID, MAX_VOTER_ID
            ),
            VoteError::DuplicateVoter => write!(f, "this voter id was already used"),
            VoteError::InvalidCandidate => write!(f, "candidate must be John or Jane"),
            VoteError::NoActiveVoter => write!(f, "no voter is waiting to vote"),
        }
    }
}
