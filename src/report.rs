/// Per-item outcomes of best-effort operations.
///
/// Collapse, undo and reset keep going when a single tab, group or window
/// refuses a change. Each of those decisions lands in a [`Report`] so the
/// caller (and the tests) can see what was applied, what was skipped and
/// what failed.
use crate::error::HostError;
use crate::tab_data::{GroupId, TabId, WindowId};
use log::warn;
use std::fmt;

/// The thing an outcome is about
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    Tab(TabId),
    Group(GroupId),
    Window(WindowId),
    Domain(String),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Tab(id) => write!(f, "tab {}", id),
            Subject::Group(id) => write!(f, "group {}", id),
            Subject::Window(id) => write!(f, "window {}", id),
            Subject::Domain(domain) => write!(f, "domain '{}'", domain),
        }
    }
}

/// The change that was attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Ungroup,
    Move,
    Group,
    UpdateGroup,
    Activate,
    CreateWindow,
    CreateTab,
    RemoveTab,
    CloseWindow,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Ungroup => "ungroup",
            Step::Move => "move",
            Step::Group => "group",
            Step::UpdateGroup => "update group",
            Step::Activate => "activate",
            Step::CreateWindow => "create window",
            Step::CreateTab => "create tab",
            Step::RemoveTab => "remove tab",
            Step::CloseWindow => "close window",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub step: Step,
    pub subject: Subject,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    entries: Vec<Entry>,
}

impl Report {
    pub fn new() -> Self {
        Report {
            entries: Vec::new(),
        }
    }

    pub fn applied(&mut self, step: Step, subject: Subject) {
        self.push(step, subject, Outcome::Applied);
    }

    pub fn skipped(&mut self, step: Step, subject: Subject, reason: impl Into<String>) {
        self.push(step, subject, Outcome::Skipped(reason.into()));
    }

    /// Record a rejected change. The failure is logged and the caller moves on.
    pub fn failed(&mut self, step: Step, subject: Subject, error: &HostError) {
        warn!("Could not {} {}: {}", step, subject, error);
        self.push(step, subject, Outcome::Failed(error.to_string()));
    }

    /// Record the result of a host call, returning whether it succeeded
    pub fn record(&mut self, step: Step, subject: Subject, result: Result<(), HostError>) -> bool {
        match result {
            Ok(()) => {
                self.applied(step, subject);
                true
            }
            Err(error) => {
                self.failed(step, subject, &error);
                false
            }
        }
    }

    fn push(&mut self, step: Step, subject: Subject, outcome: Outcome) {
        self.entries.push(Entry {
            step,
            subject,
            outcome,
        });
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Latest outcome recorded for `step` on `subject`
    pub fn outcome(&self, step: Step, subject: &Subject) -> Option<&Outcome> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.step == step && &entry.subject == subject)
            .map(|entry| &entry.outcome)
    }

    pub fn count(&self, step: Step) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.step == step && entry.outcome == Outcome::Applied)
            .count()
    }

    pub fn applied_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.outcome, Outcome::Applied))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.outcome, Outcome::Skipped(_)))
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|entry| matches!(entry.outcome, Outcome::Failed(_)))
            .count()
    }

    /// True when nothing failed. Skips are expected and do not count.
    pub fn is_clean(&self) -> bool {
        self.failed_count() == 0
    }

    pub fn summary(&self) -> String {
        format!(
            "{} applied, {} skipped, {} failed",
            self.applied_count(),
            self.skipped_count(),
            self.failed_count()
        )
    }
}
