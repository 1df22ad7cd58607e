// A line-oriented rendering of the booth screens.

use std::io::{BufRead, Write};

use log::{debug, warn};
use snafu::prelude::*;
use voting_booth::flow::{
    Action, ActionKind, Flow, FlowError, RecordOutcome, Screen, Stage, State,
};
use voting_booth::*;

use crate::booth::*;

/// Draws the screens of a flow and reads the choices of the user.
///
/// Actions are picked by number. When `Submit` is picked, the content of the
/// input field is read on the next line.
pub struct Console<R: BufRead, W: Write> {
    input: R,
    output: W,
    booth_name: String,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W, booth_name: String) -> Console<R, W> {
        Console {
            input,
            output,
            booth_name,
        }
    }

    /// Runs the flow until it is closed or the input ends.
    ///
    /// `on_record` is called after every successful recording of the votes. Its
    /// failures are shown under the next screen and do not stop the booth.
    pub fn run<S, F>(&mut self, flow: &mut Flow, store: &mut S, mut on_record: F) -> BoothResult<()>
    where
        S: RecordStore,
        F: FnMut(&SessionState, usize) -> BoothResult<()>,
    {
        let mut notice: Option<String> = None;
        while flow.stage() != Stage::Closed {
            let screen = flow.screen();
            self.draw(&screen, notice.take())?;
            let action = match self.read_action(&screen)? {
                Some(a) => a,
                None => {
                    debug!("run: end of input");
                    return Ok(());
                }
            };
            let is_record = action == Action::Record;
            match flow.handle(action, store) {
                Ok(_) if is_record => {
                    if let Some(RecordOutcome::Appended(num_rows)) = record_outcome(flow) {
                        if let Err(e) = on_record(flow.session(), num_rows) {
                            warn!("run: session summary not written: {}", e);
                            notice = Some(format!("Could not write the session summary: {}", e));
                        }
                    }
                }
                Ok(_) => {}
                // Already shown on the results screen.
                Err(FlowError::Store(e)) => warn!("run: votes not recorded: {}", e),
                Err(e @ FlowError::UnexpectedAction { .. }) => warn!("run: {}", e),
            }
        }
        Ok(())
    }

    fn draw(&mut self, screen: &Screen, notice: Option<String>) -> BoothResult<()> {
        self.write_out(format!("\n== {} - {} ==\n", self.booth_name, screen.title))?;
        for line in screen.lines.iter() {
            self.write_out(format!("{}\n", line))?;
        }
        if let Some(n) = notice {
            self.write_out(format!("{}\n", n))?;
        }
        for (idx, kind) in screen.actions.iter().enumerate() {
            self.write_out(format!("  {}) {}\n", idx + 1, kind.label()))?;
        }
        Ok(())
    }

    /// Returns None when the input is exhausted.
    fn read_action(&mut self, screen: &Screen) -> BoothResult<Option<Action>> {
        loop {
            self.write_out("> ".to_string())?;
            let line = match self.read_line()? {
                Some(l) => l,
                None => return Ok(None),
            };
            let picked = line
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|idx| idx.checked_sub(1))
                .and_then(|idx| screen.actions.get(idx));
            let kind = match picked {
                Some(k) => *k,
                None => {
                    self.write_out(format!(
                        "Please pick a number between 1 and {}\n",
                        screen.actions.len()
                    ))?;
                    continue;
                }
            };
            let action = match kind {
                ActionKind::Submit => {
                    let label = screen.input.unwrap_or("Input");
                    self.write_out(format!("{}: ", label))?;
                    match self.read_line()? {
                        Some(text) => Action::Submit(text),
                        None => return Ok(None),
                    }
                }
                ActionKind::Vote => Action::Vote,
                ActionKind::ViewResults => Action::ViewResults,
                ActionKind::Cancel => Action::Cancel,
                ActionKind::Proceed => Action::Proceed,
                ActionKind::Record => Action::Record,
                ActionKind::Close => Action::Close,
            };
            return Ok(Some(action));
        }
    }

    fn read_line(&mut self) -> BoothResult<Option<String>> {
        let mut buf = String::new();
        let num_read = self
            .input
            .read_line(&mut buf)
            .whatever_context::<_, BoothError>("could not read from the terminal")?;
        if num_read == 0 {
            return Ok(None);
        }
        Ok(Some(buf.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }

    fn write_out(&mut self, text: String) -> BoothResult<()> {
        self.output
            .write_all(text.as_bytes())
            .whatever_context::<_, BoothError>("could not write to the terminal")?;
        self.output
            .flush()
            .whatever_context::<_, BoothError>("could not write to the terminal")?;
        Ok(())
    }
}

fn record_outcome(flow: &Flow) -> Option<RecordOutcome> {
    match flow.state() {
        State::Results { record } => record.clone(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run_script(
        script: &str,
        store: &mut MemoryStore,
    ) -> (Flow, String, Vec<(Tally, usize)>) {
        let mut flow = Flow::new(SessionState::initialize(store).unwrap());
        let mut output: Vec<u8> = Vec::new();
        let mut recorded: Vec<(Tally, usize)> = Vec::new();
        {
            let mut console = Console::new(
                Cursor::new(script.as_bytes().to_vec()),
                &mut output,
                "Test booth".to_string(),
            );
            console
                .run(&mut flow, store, |session, num_rows| {
                    recorded.push((session.tally(), num_rows));
                    Ok(())
                })
                .unwrap();
        }
        (flow, String::from_utf8(output).unwrap(), recorded)
    }

    #[test]
    fn full_session() {
        let mut store = MemoryStore::new();
        // vote, id 42, John, proceed, vote, id 43, jane, proceed, results, record, close
        let script = "1\n1\n42\n1\nJohn \n2\n1\n1\n43\n1\njane\n2\n2\n1\n2\n";
        let (flow, output, recorded) = run_script(script, &mut store);

        assert_eq!(flow.stage(), Stage::Closed);
        assert_eq!(flow.session().tally(), Tally { john: 1, jane: 1 });
        assert_eq!(store.rows.len(), 2);
        assert_eq!(store.rows[0].voter, VoterId::new(42).unwrap());
        assert_eq!(store.rows[1].candidate, CandidateChoice::Jane);
        assert_eq!(recorded, vec![(Tally { john: 1, jane: 1 }, 2)]);

        assert!(output.contains("== Test booth - Vote Menu =="));
        assert!(output.contains("Voter ID: "));
        assert!(output.contains("Voted John"));
        assert!(output.contains("This session: John - 1, Jane - 1, Total - 2"));
        assert!(output.contains("Tie! Maybe try rock-paper-scissors?"));
    }

    #[test]
    fn rejections_are_shown() {
        let mut store = MemoryStore::new();
        // vote, id abc, id 0, id 7, candidate bob, candidate jane
        let script = "1\n1\nabc\n1\n0\n1\n7\n1\nbob\n1\njane\n";
        let (flow, output, recorded) = run_script(script, &mut store);

        assert_eq!(output.matches("INVALID ID").count(), 2);
        assert!(output.contains("Must be John or Jane"));
        assert!(output.contains("Voted Jane"));
        assert_eq!(flow.stage(), Stage::Candidate);
        assert_eq!(flow.session().tally(), Tally { john: 0, jane: 1 });
        // The input ended before recording.
        assert!(store.rows.is_empty());
        assert!(recorded.is_empty());
    }

    #[test]
    fn bad_choices_are_asked_again() {
        let mut store = MemoryStore::new();
        let script = "x\n0\n3\n\n2\n2\n";
        let (flow, output, _) = run_script(script, &mut store);
        assert_eq!(output.matches("Please pick a number between 1 and 2").count(), 4);
        assert_eq!(flow.stage(), Stage::Closed);
    }

    #[test]
    fn known_voters_are_refused() {
        let mut store = MemoryStore::with_rows(&[Vote {
            voter: VoterId::new(42).unwrap(),
            candidate: CandidateChoice::John,
        }]);
        let script = "1\n1\n42\n2\n2\n2\n";
        let (flow, output, recorded) = run_script(script, &mut store);
        assert!(output.contains("YOU ALREADY VOTED"));
        assert_eq!(flow.stage(), Stage::Closed);
        assert_eq!(flow.session().tally(), Tally::default());
        assert!(recorded.is_empty());
    }

    #[test]
    fn failed_summary_keeps_running() {
        let mut store = MemoryStore::new();
        let mut flow = Flow::new(SessionState::initialize(&mut store).unwrap());
        let mut output: Vec<u8> = Vec::new();
        // vote, id 5, john, proceed, results, record, close
        let script = "1\n1\n5\n1\njohn\n2\n2\n1\n2\n";
        let mut calls = 0;
        let res = {
            let mut console = Console::new(
                Cursor::new(script.as_bytes().to_vec()),
                &mut output,
                "Test booth".to_string(),
            );
            console.run(&mut flow, &mut store, |_, _| {
                calls += 1;
                Err(BoothError::MissingParentDir {
                    path: "x".to_string(),
                })
            })
        };
        assert!(res.is_ok());
        assert_eq!(calls, 1);
        assert_eq!(flow.stage(), Stage::Closed);
        assert_eq!(store.rows.len(), 1);
        assert!(flow.session().pending().is_empty());

        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("1 new votes recorded"));
        assert!(output.contains("Could not write the session summary"));
    }

    #[test]
    fn failed_record_keeps_running() {
        let mut store = MemoryStore {
            fail_appends: true,
            ..MemoryStore::default()
        };
        // vote, id 5, john, proceed, results, record, record
        let script = "1\n1\n5\n1\njohn\n2\n2\n1\n1\n";
        let (flow, output, recorded) = run_script(script, &mut store);
        assert!(output.contains("Could not record the votes"));
        assert!(recorded.is_empty());
        assert_eq!(flow.stage(), Stage::Results);
        assert_eq!(flow.session().pending().len(), 1);
    }
}
