use serde::{Deserialize, Serialize};

use crate::autocomplete::{AutocompleteTarget, derive_autocomplete_state};
use crate::config::ComposerConfig;
use crate::core::{ApplyError, Editor, Node};
use crate::paste::{PasteDecision, check_paste, flatten_line_breaks};
use crate::weight::{document_weighted_length, mention_weight, text_weight, weighted_length};

/// Keys the composer reacts to. Everything printable arrives as `Char`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Enter,
    Backspace,
    Tab,
    Escape,
    ArrowUp,
    ArrowDown,
    Char(char),
}

impl Key {
    /// Maps a DOM `KeyboardEvent.key` value. Keys the composer has no use
    /// for (modifiers, function keys, ...) map to `None`.
    pub fn from_dom_key(key: &str) -> Option<Self> {
        match key {
            "Enter" => Some(Key::Enter),
            "Backspace" => Some(Key::Backspace),
            "Tab" => Some(Key::Tab),
            "Escape" => Some(Key::Escape),
            "ArrowUp" => Some(Key::ArrowUp),
            "ArrowDown" => Some(Key::ArrowDown),
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(Key::Char(c)),
                    _ => None,
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    Inserted,
    Deleted,
    /// Suppressed because the edit would exceed the character limit.
    Rejected,
    Highlighted { index: usize },
    Committed { display_name: String },
    Dismissed,
    /// `Enter` outside of autocomplete; the session decides what sending means.
    SendRequested,
    Sent,
    /// A send was requested but there was no transport to hand it to.
    NotSent,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    Rejected,
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposerState {
    Composing,
    AutocompleteActive,
}

/// Keystroke routing plus the derived state it depends on: the weighted
/// length and the autocomplete target, both recomputed from the tree after
/// every mutation.
#[derive(Debug, Clone)]
pub struct InputController {
    config: ComposerConfig,
    target: Option<AutocompleteTarget>,
    weighted_length: usize,
}

impl InputController {
    pub fn new(config: ComposerConfig) -> Self {
        Self {
            config: config.with_defaults(),
            target: None,
            weighted_length: 0,
        }
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    pub fn weighted_length(&self) -> usize {
        self.weighted_length
    }

    pub fn remaining(&self) -> usize {
        self.config
            .character_limit
            .saturating_sub(self.weighted_length)
    }

    pub fn is_at_limit(&self) -> bool {
        self.weighted_length >= self.config.character_limit
    }

    pub fn target(&self) -> Option<&AutocompleteTarget> {
        self.target.as_ref()
    }

    pub fn state(&self) -> ComposerState {
        match &self.target {
            Some(target) if target.is_active() => ComposerState::AutocompleteActive,
            _ => ComposerState::Composing,
        }
    }

    pub fn fits(&self, weight: usize) -> bool {
        self.weighted_length + weight <= self.config.character_limit
    }

    pub fn refresh(&mut self, editor: &Editor, candidates: &[String]) {
        self.weighted_length = document_weighted_length(editor.doc());
        self.target =
            derive_autocomplete_state(editor.doc(), editor.selection(), candidates, &self.config);
    }

    pub fn reset(&mut self) {
        self.weighted_length = 0;
        self.target = None;
    }

    pub fn dismiss(&mut self) -> bool {
        self.target.take().is_some()
    }

    pub fn handle_key(
        &mut self,
        editor: &mut Editor,
        key: Key,
        candidates: &[String],
    ) -> Result<KeyOutcome, ApplyError> {
        let active = self.state() == ComposerState::AutocompleteActive;

        match key {
            Key::Enter if active => return self.commit_highlighted(editor, candidates),
            Key::Enter => return Ok(KeyOutcome::SendRequested),
            Key::Backspace => {
                let deleted = editor.delete_backward()?;
                self.refresh(editor, candidates);
                return Ok(if deleted {
                    KeyOutcome::Deleted
                } else {
                    KeyOutcome::Ignored
                });
            }
            _ => {}
        }

        if matches!(key, Key::Char(_)) && !self.fits(1) {
            tracing::trace!(
                weighted_length = self.weighted_length,
                limit = self.config.character_limit,
                "keystroke rejected at character limit"
            );
            return Ok(KeyOutcome::Rejected);
        }

        if active {
            match key {
                Key::ArrowDown | Key::ArrowUp => {
                    if let Some(target) = self.target.as_mut() {
                        if key == Key::ArrowDown {
                            target.select_next();
                        } else {
                            target.select_previous();
                        }
                        return Ok(KeyOutcome::Highlighted {
                            index: target.index,
                        });
                    }
                }
                Key::Tab => return self.commit_highlighted(editor, candidates),
                Key::Escape => {
                    self.dismiss();
                    return Ok(KeyOutcome::Dismissed);
                }
                _ => {}
            }
        }

        match key {
            Key::Char(c) if !c.is_control() => {
                let mut buf = [0u8; 4];
                editor.insert_text(c.encode_utf8(&mut buf))?;
                self.refresh(editor, candidates);
                Ok(KeyOutcome::Inserted)
            }
            _ => Ok(KeyOutcome::Ignored),
        }
    }

    fn commit_highlighted(
        &mut self,
        editor: &mut Editor,
        candidates: &[String],
    ) -> Result<KeyOutcome, ApplyError> {
        let index = self.target.as_ref().map_or(0, |target| target.index);
        self.commit_candidate(editor, index, candidates)
    }

    /// Replaces the target token with a mention of `matches[index]`.
    pub fn commit_candidate(
        &mut self,
        editor: &mut Editor,
        index: usize,
        candidates: &[String],
    ) -> Result<KeyOutcome, ApplyError> {
        let Some(target) = self.target.as_ref() else {
            return Ok(KeyOutcome::Ignored);
        };
        let Some(display_name) = target.matches.get(index).cloned() else {
            return Ok(KeyOutcome::Ignored);
        };

        let replaced = text_weight(&editor.string(&target.range));
        let next_length =
            self.weighted_length.saturating_sub(replaced) + mention_weight(&display_name);
        if next_length > self.config.character_limit {
            tracing::trace!(%display_name, next_length, "mention rejected at character limit");
            return Ok(KeyOutcome::Rejected);
        }

        editor.select(target.range.clone());
        let mention_path = editor.insert_void_node(Node::mention(display_name.clone()))?;
        editor.move_cursor_past(&mention_path)?;
        self.refresh(editor, candidates);

        tracing::debug!(%display_name, "mention committed");
        Ok(KeyOutcome::Committed { display_name })
    }

    pub fn paste(
        &mut self,
        editor: &mut Editor,
        text: &str,
        candidates: &[String],
    ) -> Result<EditOutcome, ApplyError> {
        if let PasteDecision::Reject { weight, remaining } =
            check_paste(self.weighted_length, text, self.config.character_limit)
        {
            tracing::trace!(weight, remaining, "paste rejected at character limit");
            return Ok(EditOutcome::Rejected);
        }

        let text = flatten_line_breaks(text);
        if text.is_empty() {
            return Ok(EditOutcome::Ignored);
        }
        editor.insert_text(&text)?;
        self.refresh(editor, candidates);
        Ok(EditOutcome::Applied)
    }

    /// Inserts plain text (e.g. a unicode emoji) if it fits in the budget.
    pub fn insert_text(
        &mut self,
        editor: &mut Editor,
        text: &str,
        candidates: &[String],
    ) -> Result<EditOutcome, ApplyError> {
        if text.is_empty() {
            return Ok(EditOutcome::Ignored);
        }
        if !self.fits(text_weight(text)) {
            tracing::trace!(text, "insert rejected at character limit");
            return Ok(EditOutcome::Rejected);
        }
        editor.insert_text(text)?;
        self.refresh(editor, candidates);
        Ok(EditOutcome::Applied)
    }

    /// Inserts a void node at the caret if its weight fits in the budget.
    pub fn insert_void_node(
        &mut self,
        editor: &mut Editor,
        node: Node,
        candidates: &[String],
    ) -> Result<EditOutcome, ApplyError> {
        if !self.fits(weighted_length(&node)) {
            tracing::trace!("void node rejected at character limit");
            return Ok(EditOutcome::Rejected);
        }
        editor.insert_void_node(node)?;
        editor.normalize()?;
        self.refresh(editor, candidates);
        Ok(EditOutcome::Applied)
    }
}
