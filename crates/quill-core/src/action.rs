#![forbid(unsafe_code)]

//! Input action vocabulary.
//!
//! Raw device input is translated into [`Action`]s by the host. The model
//! consumes only this closed set: edits, plain caret motion, selection-
//! extending caret motion, history, and [`ActionKind::Empty`] for anything
//! unrecognized.

use std::time::Instant;

/// What an action asks the model to do.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Insert text at every caret.
    Typed(String),
    /// Delete the unit after every caret.
    Delete,
    /// Delete the unit before every caret.
    Backspace,
    CaretRight,
    CaretLeft,
    CaretUp,
    CaretDown,
    SelectCaretRight,
    SelectCaretLeft,
    SelectCaretUp,
    SelectCaretDown,
    Undo,
    Redo,
    /// Unrecognized input.
    Empty,
}

impl ActionKind {
    /// Whether this action mutates the text source.
    #[must_use]
    pub const fn is_edit(&self) -> bool {
        matches!(
            self,
            Self::Typed(_) | Self::Delete | Self::Backspace | Self::Undo | Self::Redo
        )
    }

    /// Whether this is caret motion (plain or selecting).
    #[must_use]
    pub const fn is_caret_motion(&self) -> bool {
        matches!(
            self,
            Self::CaretRight
                | Self::CaretLeft
                | Self::CaretUp
                | Self::CaretDown
                | Self::SelectCaretRight
                | Self::SelectCaretLeft
                | Self::SelectCaretUp
                | Self::SelectCaretDown
        )
    }

    /// Whether this motion extends the selection.
    #[must_use]
    pub const fn extends_selection(&self) -> bool {
        matches!(
            self,
            Self::SelectCaretRight
                | Self::SelectCaretLeft
                | Self::SelectCaretUp
                | Self::SelectCaretDown
        )
    }
}

/// An input action with the instant it occurred.
///
/// The timestamp is carried for hosts that group edits or debounce input;
/// the model itself does not inspect it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub kind: ActionKind,
    pub occurred_at: Instant,
}

impl Action {
    /// Create an action stamped with the current instant.
    #[must_use]
    pub fn now(kind: ActionKind) -> Self {
        Self {
            kind,
            occurred_at: Instant::now(),
        }
    }

    /// Create an action with an explicit timestamp.
    #[must_use]
    pub const fn at(kind: ActionKind, occurred_at: Instant) -> Self {
        Self { kind, occurred_at }
    }

    /// Shorthand for a [`ActionKind::Typed`] action.
    #[must_use]
    pub fn typed(text: impl Into<String>) -> Self {
        Self::now(ActionKind::Typed(text.into()))
    }

    /// The empty action.
    #[must_use]
    pub fn empty() -> Self {
        Self::now(ActionKind::Empty)
    }

    /// Whether this is the empty action.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kind == ActionKind::Empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_is_disjoint() {
        let all = [
            ActionKind::Typed("x".into()),
            ActionKind::Delete,
            ActionKind::Backspace,
            ActionKind::CaretRight,
            ActionKind::CaretLeft,
            ActionKind::CaretUp,
            ActionKind::CaretDown,
            ActionKind::SelectCaretRight,
            ActionKind::SelectCaretLeft,
            ActionKind::SelectCaretUp,
            ActionKind::SelectCaretDown,
            ActionKind::Undo,
            ActionKind::Redo,
            ActionKind::Empty,
        ];
        for kind in &all {
            assert!(!(kind.is_edit() && kind.is_caret_motion()), "{kind:?}");
            if kind.extends_selection() {
                assert!(kind.is_caret_motion());
            }
        }
        assert!(!ActionKind::Empty.is_edit());
        assert!(!ActionKind::Empty.is_caret_motion());
    }

    #[test]
    fn timestamps_are_kept() {
        let t = Instant::now();
        let a = Action::at(ActionKind::Delete, t);
        assert_eq!(a.occurred_at, t);
        assert!(Action::empty().is_empty());
        assert_eq!(Action::typed("ab").kind, ActionKind::Typed("ab".into()));
    }
}
