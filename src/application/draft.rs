use crate::domain::models::Activity;

/// The value handed to the session when a draft commits: a fresh copy of
/// the drafted activity plus the committed-list position it replaces, or
/// `None` to append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftCommit {
    pub editing: Option<usize>,
    pub activity: Activity,
}

/// The in-progress add/edit form.
///
/// Two states: create mode (`editing == None`, the default) and edit mode
/// (`editing == Some(i)` after `start_edit`). A successful commit or an
/// explicit cancel always lands back in create mode with an empty draft.
/// The buffer only ever copies data across the boundary; it never holds a
/// reference into the committed list, so in-progress edits cannot mutate a
/// committed entry before commit.
#[derive(Debug, Default)]
pub struct DraftBuffer {
    draft: Activity,
    editing: Option<usize>,
}

impl DraftBuffer {
    pub fn draft(&self) -> &Activity {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Activity {
        &mut self.draft
    }

    pub fn editing_index(&self) -> Option<usize> {
        self.editing
    }

    /// Copies the committed activity at `index` into the draft and enters
    /// edit mode. An out-of-range index is rejected with no state change.
    pub fn start_edit(&mut self, index: usize, committed: &[Activity]) -> Result<(), String> {
        let Some(activity) = committed.get(index) else {
            return Err(format!("no activity at index {index}"));
        };
        self.draft = activity.clone();
        self.editing = Some(index);
        Ok(())
    }

    /// Validates the draft and, on success, returns the commit value and
    /// resets to create mode. A validation failure leaves the draft and the
    /// editing index untouched so the user can correct the form.
    pub fn commit(&mut self) -> Result<DraftCommit, String> {
        self.draft.validate()?;
        Ok(DraftCommit {
            editing: self.editing.take(),
            activity: std::mem::take(&mut self.draft),
        })
    }

    /// Resets to an empty draft in create mode. Idempotent.
    pub fn cancel(&mut self) {
        self.draft = Activity::default();
        self.editing = None;
    }
}
