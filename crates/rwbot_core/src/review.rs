use anyhow::Result;

use crate::actions::BotAction;
use crate::client::WikiWriteApi;
use crate::config::{Credentials, DEFAULT_MIN_MANUAL_CHANGES};
use crate::modify::Modification;

const SEPARATOR: &str =
    "===============================================================================";

/// Operator interaction surface for the review loop. The terminal
/// implementation lives in the CLI crate; tests script it.
pub trait ReviewPrompt {
    fn show(&mut self, text: &str) -> Result<()>;
    /// One raw keypress, no newline required.
    fn read_key(&mut self) -> Result<char>;
    /// One full input line with the trailing newline stripped.
    fn read_line(&mut self) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct ReviewOptions {
    /// Number of changes the operator must commit one at a time before the
    /// batch-commit choice is offered.
    pub min_manual_changes: usize,
}

impl Default for ReviewOptions {
    fn default() -> Self {
        Self {
            min_manual_changes: DEFAULT_MIN_MANUAL_CHANGES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReviewReport {
    pub proposed: usize,
    pub committed: usize,
    pub skipped: usize,
    /// Items neither committed nor skipped because the operator quit; the
    /// item the quit landed on counts as unvisited.
    pub unvisited: usize,
}

/// Run one action end to end: propose modifications, then review them.
///
/// Credentials are resolved and the login performed only when at least one
/// modification was proposed; a run with nothing to commit never touches
/// `credentials`.
pub fn run_action<A, F>(
    action: &dyn BotAction,
    api: &mut A,
    prompt: &mut dyn ReviewPrompt,
    options: &ReviewOptions,
    credentials: F,
) -> Result<ReviewReport>
where
    A: WikiWriteApi,
    F: FnOnce() -> Result<Credentials>,
{
    let changes = action.propose_modifications(api)?;
    prompt.show(&format!("Identified {} changes to make.", changes.len()))?;

    if changes.is_empty() {
        return Ok(ReviewReport::default());
    }

    let credentials = credentials()?;
    api.login(&credentials.username, &credentials.password)?;

    review_changes(&changes, api, prompt, options)
}

/// Drive interactive review of each modification, in input order.
///
/// Per item the operator chooses (y)es, (n)o, (q)uit, or, once
/// `min_manual_changes` items were committed manually, (a)ll. Choosing `a`
/// requires typing a verification phrase embedding the exact number of
/// remaining items; afterwards every remaining item commits without
/// prompting. Collaborator failures abort the run with already-committed
/// changes left applied.
pub fn review_changes<A: WikiWriteApi>(
    changes: &[Box<dyn Modification>],
    api: &mut A,
    prompt: &mut dyn ReviewPrompt,
    options: &ReviewOptions,
) -> Result<ReviewReport> {
    let total = changes.len();
    let mut committed = 0usize;
    let mut skipped = 0usize;
    let mut unvisited = 0usize;
    let mut committing_all = false;

    for (index, change) in changes.iter().enumerate() {
        // Count of unresolved items, the current one included.
        let remaining = total - index;

        prompt.show(SEPARATOR)?;
        prompt.show(&change.preview(api)?)?;

        if committing_all {
            prompt.show("Committing change...")?;
            change.commit(api)?;
            committed += 1;
            continue;
        }

        let suffix = if committed >= options.min_manual_changes {
            format!(", apply (a)ll {remaining} remaining changes")
        } else {
            String::new()
        };
        prompt.show(&format!("Commit this change? (y)es, (n)o, (q)uit{suffix}"))?;

        let mut commit = false;
        let mut quit = false;
        loop {
            match prompt.read_key()? {
                'y' => commit = true,
                'n' => {
                    prompt.show("Skipping this change.")?;
                    skipped += 1;
                }
                'q' => quit = true,
                'a' if committed >= options.min_manual_changes => {
                    let phrase = format!("yes, commit {remaining} changes");
                    prompt.show(&format!(
                        "Are you SURE you want to commit {remaining} changes?  \
                         Enter \"{phrase}\" to continue"
                    ))?;
                    if prompt.read_line()? == phrase {
                        committing_all = true;
                    } else {
                        prompt.show(
                            "Verification was not typed correctly.  \
                             You must type the content in quotes exactly.",
                        )?;
                        continue;
                    }
                }
                _ => continue,
            }
            break;
        }

        if quit {
            unvisited = remaining;
            break;
        }
        if commit || committing_all {
            prompt.show("Committing change...")?;
            change.commit(api)?;
            committed += 1;
        }
    }

    Ok(ReviewReport {
        proposed: total,
        committed,
        skipped,
        unvisited,
    })
}
