//! Yes/no gate in front of destructive actions

/// Holds the target awaiting confirmation, if any.
#[derive(Debug)]
pub struct ConfirmationGate<T> {
    pending: Option<T>,
}

impl<T> Default for ConfirmationGate<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> ConfirmationGate<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the gate for `target`, replacing any earlier pending target.
    pub fn open(&mut self, target: T) {
        self.pending = Some(target);
    }

    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.pending.is_some()
    }

    /// Run `on_confirm` with the pending target, then close.
    /// Does nothing when the gate is closed.
    pub fn confirm<R>(&mut self, on_confirm: impl FnOnce(T) -> R) -> Option<R> {
        self.pending.take().map(on_confirm)
    }

    /// Close without side effects.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// Question asked before deleting a document
pub fn delete_question(filename: &str) -> String {
    format!(
        "Are you sure you want to permanently delete the document: {}?",
        filename
    )
}

/// Interpret a typed answer to a confirmation question
pub fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
