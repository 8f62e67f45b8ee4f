use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use crate::paragraph::ParagraphType;

/// Edits arriving closer together than this share one undo step.
pub const COALESCE_WINDOW: Duration = Duration::from_millis(200);

/// Undo steps kept before the oldest are dropped.
pub const MAX_UNDO_BUNDLES: usize = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistoryConfig {
    pub window: Duration,
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            window: COALESCE_WINDOW,
            capacity: MAX_UNDO_BUNDLES,
        }
    }
}

/// One primitive mutation of a screenplay, carrying enough data to replay or revert it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Insert {
        paragraph: usize,
        position: usize,
        text: String,
    },
    Delete {
        paragraph: usize,
        position: usize,
        text: String,
    },
    NewParagraph {
        paragraph: usize,
        paragraph_type: ParagraphType,
        text: String,
    },
    DeleteParagraph {
        paragraph: usize,
        paragraph_type: ParagraphType,
        text: String,
    },
    ChangeType {
        paragraph: usize,
        from: ParagraphType,
        to: ParagraphType,
    },
}

impl Action {
    pub fn inverse(&self) -> Action {
        match self.clone() {
            Action::Insert {
                paragraph,
                position,
                text,
            } => Action::Delete {
                paragraph,
                position,
                text,
            },
            Action::Delete {
                paragraph,
                position,
                text,
            } => Action::Insert {
                paragraph,
                position,
                text,
            },
            Action::NewParagraph {
                paragraph,
                paragraph_type,
                text,
            } => Action::DeleteParagraph {
                paragraph,
                paragraph_type,
                text,
            },
            Action::DeleteParagraph {
                paragraph,
                paragraph_type,
                text,
            } => Action::NewParagraph {
                paragraph,
                paragraph_type,
                text,
            },
            Action::ChangeType {
                paragraph,
                from,
                to,
            } => Action::ChangeType {
                paragraph,
                from: to,
                to: from,
            },
        }
    }
}

/// Actions undone and redone together.
#[derive(Clone, Debug)]
pub struct ActionBundle {
    /// Oldest first.
    actions: Vec<Action>,
    last_touched: Instant,
}

impl ActionBundle {
    fn new(action: Action, now: Instant) -> Self {
        Self {
            actions: vec![action],
            last_touched: now,
        }
    }

    fn push(&mut self, action: Action, now: Instant) {
        self.actions.push(action);
        self.last_touched = now;
    }

    fn is_recent(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.last_touched) < window
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
}

/// Linear undo history with time-based coalescing.
#[derive(Clone, Debug)]
pub struct UndoLog {
    /// Newest first.
    bundles: VecDeque<ActionBundle>,
    /// Number of bundles at the front that are currently undone.
    undone: usize,
    config: HistoryConfig,
}

impl Default for UndoLog {
    fn default() -> Self {
        Self::new(HistoryConfig::default())
    }
}

impl UndoLog {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            bundles: VecDeque::new(),
            undone: 0,
            config,
        }
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.undone < self.bundles.len()
    }

    pub fn can_redo(&self) -> bool {
        self.undone > 0
    }

    pub fn record(&mut self, action: Action) {
        self.record_at(action, Instant::now());
    }

    pub(crate) fn record_at(&mut self, action: Action, now: Instant) {
        if self.undone > 0 {
            log::debug!("discarding {} undone history steps", self.undone);
            self.bundles.drain(..self.undone);
            self.undone = 0;
        }

        match self.bundles.front_mut() {
            Some(bundle) if bundle.is_recent(now, self.config.window) => bundle.push(action, now),
            _ => {
                self.bundles.push_front(ActionBundle::new(action, now));
                self.bundles.truncate(self.config.capacity);
            }
        }
    }

    /// Inverted actions of the next bundle to undo, in the order to apply them.
    pub fn undo(&mut self) -> Option<Vec<Action>> {
        let bundle = self.bundles.get(self.undone)?;
        let actions = bundle.actions.iter().rev().map(Action::inverse).collect();
        self.undone += 1;
        Some(actions)
    }

    /// Actions of the most recently undone bundle, in the order to apply them.
    pub fn redo(&mut self) -> Option<Vec<Action>> {
        if self.undone == 0 {
            return None;
        }
        self.undone -= 1;
        self.bundles
            .get(self.undone)
            .map(|bundle| bundle.actions.clone())
    }
}
