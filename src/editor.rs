// ============================================================================
// EDITOR: user-intent interface for interactive front ends
// ============================================================================
//
// A front end (window, dialog, slider) drives edits of one named image by
// sending intents: preview a transform, commit or cancel the preview, undo
// or redo a committed edit. Previews are always computed from the committed
// image, so moving a slider never stacks effects.
// ============================================================================

use std::collections::VecDeque;

use crate::canvas::Image;
use crate::command::Transform;
use crate::error::{EditError, Result};
use crate::log_info;
use crate::session::SessionCache;

/// Default number of committed edits kept for undo.
pub const DEFAULT_HISTORY_SIZE: usize = 50;

/// An intent sent by a front end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorEvent {
    Preview(Transform),
    Commit,
    Cancel,
    Undo,
    Redo,
}

/// Capabilities a front end can call on an image being edited.
pub trait ImageEditor {
    /// Compute `transform` on the committed image and hold it as pending.
    fn preview(&mut self, transform: Transform) -> Result<&Image>;
    /// Install the pending preview. Returns `false` when nothing was pending.
    fn commit(&mut self) -> Result<bool>;
    /// Drop the pending preview.
    fn cancel(&mut self);
    /// Restore the version before the last commit; returns its description.
    fn undo(&mut self) -> Option<String>;
    fn redo(&mut self) -> Option<String>;

    fn handle(&mut self, event: EditorEvent) -> Result<()> {
        match event {
            EditorEvent::Preview(transform) => self.preview(transform).map(|_| ()),
            EditorEvent::Commit => self.commit().map(|_| ()),
            EditorEvent::Cancel => {
                self.cancel();
                Ok(())
            }
            EditorEvent::Undo => {
                self.undo();
                Ok(())
            }
            EditorEvent::Redo => {
                self.redo();
                Ok(())
            }
        }
    }
}

// ============================================================================
// HISTORY
// ============================================================================

struct HistoryEntry {
    description: String,
    before: Image,
    after: Image,
}

/// Undo/redo stacks of whole-image snapshots.
pub struct EditHistory {
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: VecDeque<HistoryEntry>,
    max_history_size: usize,
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_SIZE)
    }
}

impl EditHistory {
    pub fn new(max_history_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_history_size: max_history_size.max(1),
        }
    }

    fn push(&mut self, entry: HistoryEntry) {
        // A new edit invalidates everything that was undone
        self.redo_stack.clear();
        self.undo_stack.push_back(entry);
        while self.undo_stack.len() > self.max_history_size {
            self.undo_stack.pop_front();
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// All undo descriptions, most recent first.
    pub fn undo_history(&self) -> Vec<String> {
        self.undo_stack.iter().rev().map(|e| e.description.clone()).collect()
    }
}

// ============================================================================
// SESSION-BACKED EDITOR
// ============================================================================

/// Edits the image stored under `target` in a session cache.
pub struct EditorSession<'a> {
    cache: &'a mut SessionCache,
    target: String,
    pending: Option<(Transform, Image)>,
    history: EditHistory,
}

impl<'a> EditorSession<'a> {
    pub fn new(cache: &'a mut SessionCache, target: impl Into<String>) -> Self {
        Self {
            cache,
            target: target.into(),
            pending: None,
            history: EditHistory::default(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// The committed image, if the target is loaded.
    pub fn current(&self) -> Option<&Image> {
        self.cache.get(&self.target)
    }

    pub fn pending(&self) -> Option<&Image> {
        self.pending.as_ref().map(|(_, img)| img)
    }

    pub fn history(&self) -> &EditHistory {
        &self.history
    }
}

impl ImageEditor for EditorSession<'_> {
    fn preview(&mut self, transform: Transform) -> Result<&Image> {
        let base = self
            .cache
            .get(&self.target)
            .ok_or_else(|| EditError::MissingOperand(self.target.clone()))?;
        let result = transform.apply(base);
        let (_, img) = self.pending.insert((transform, result));
        Ok(img)
    }

    fn commit(&mut self) -> Result<bool> {
        let Some((transform, after)) = self.pending.take() else {
            return Ok(false);
        };
        let Some(before) = self.cache.get(&self.target).cloned() else {
            return Err(EditError::MissingOperand(self.target.clone()));
        };
        self.cache.insert(self.target.clone(), after.clone());
        let description = transform.command_name().to_string();
        log_info!("editor: committed {} on '{}'", transform.describe(), self.target);
        self.history.push(HistoryEntry {
            description,
            before,
            after,
        });
        Ok(true)
    }

    fn cancel(&mut self) {
        self.pending = None;
    }

    fn undo(&mut self) -> Option<String> {
        self.pending = None;
        let entry = self.history.undo_stack.pop_back()?;
        self.cache.insert(self.target.clone(), entry.before.clone());
        let description = entry.description.clone();
        self.history.redo_stack.push_back(entry);
        Some(description)
    }

    fn redo(&mut self) -> Option<String> {
        self.pending = None;
        let entry = self.history.redo_stack.pop_back()?;
        self.cache.insert(self.target.clone(), entry.after.clone());
        let description = entry.description.clone();
        self.history.undo_stack.push_back(entry);
        Some(description)
    }
}
