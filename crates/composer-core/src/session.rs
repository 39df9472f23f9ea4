use std::sync::mpsc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::autocomplete::AutocompleteTarget;
use crate::config::ComposerConfig;
use crate::controller::{ComposerState, EditOutcome, InputController, Key, KeyOutcome};
use crate::core::{ApplyError, Document, Editor, Node, Point, Selection, TextRange};
use crate::serialize::serialize_document;

#[derive(Debug, Error)]
pub enum ComposerError {
    #[error(transparent)]
    Apply(#[from] ApplyError),
    #[error("invalid composer config: {0}")]
    Config(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageType {
    #[serde(rename = "CHAT")]
    Chat,
}

/// Payload handed to the transport: `{"type":"CHAT","body":"<p>...</p>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub body: String,
}

impl ChatMessage {
    pub fn chat(body: impl Into<String>) -> Self {
        Self {
            kind: MessageType::Chat,
            body: body.into(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Delivers finished messages. Delivery is fire-and-forget: the composer
/// clears itself without waiting for, or learning about, the result.
pub trait Transport {
    fn send(&self, message: ChatMessage);
}

impl Transport for mpsc::Sender<ChatMessage> {
    fn send(&self, message: ChatMessage) {
        if let Err(err) = mpsc::Sender::send(self, message) {
            tracing::warn!("chat transport receiver is gone: {err}");
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Sent(ChatMessage),
    NoTransport,
    Disabled,
}

/// One message-composition lifecycle: the editor, the keystroke controller,
/// the candidate pool and the transport.
pub struct ComposerSession {
    editor: Editor,
    controller: InputController,
    candidates: Vec<String>,
    transport: Option<Box<dyn Transport>>,
    enabled: bool,
}

impl ComposerSession {
    pub fn new(config: ComposerConfig) -> Self {
        Self::with_default_text(config, "")
    }

    /// Starts a session pre-seeded with `text`, caret at its end. The seed is
    /// not checked against the character limit; an oversized seed starts at
    /// the limit and only shrinking edits are accepted until it fits.
    pub fn with_default_text(config: ComposerConfig, text: impl Into<String>) -> Self {
        let config = config.with_defaults();
        let mut editor = Editor::with_config(
            Document::with_text(text),
            Selection::collapsed(Point::new(vec![0, 0], 0)),
            config.editor_config(),
        );
        let end = editor.end();
        editor.set_selection(Selection::collapsed(end));

        let mut controller = InputController::new(config);
        controller.refresh(&editor, &[]);
        Self {
            editor,
            controller,
            candidates: Vec::new(),
            transport: None,
            enabled: true,
        }
    }

    pub fn with_candidates(mut self, candidates: Vec<String>) -> Self {
        self.set_candidates(candidates);
        self
    }

    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Box::new(transport));
        self
    }

    pub fn set_transport(&mut self, transport: Option<Box<dyn Transport>>) {
        self.transport = transport;
    }

    pub fn set_candidates(&mut self, candidates: Vec<String>) {
        self.candidates = candidates;
        self.controller.refresh(&self.editor, &self.candidates);
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn document(&self) -> &Document {
        self.editor.doc()
    }

    pub fn selection(&self) -> &Selection {
        self.editor.selection()
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn config(&self) -> &ComposerConfig {
        self.controller.config()
    }

    pub fn weighted_length(&self) -> usize {
        self.controller.weighted_length()
    }

    pub fn remaining(&self) -> usize {
        self.controller.remaining()
    }

    pub fn is_at_limit(&self) -> bool {
        self.controller.is_at_limit()
    }

    pub fn autocomplete(&self) -> Option<&AutocompleteTarget> {
        self.controller.target()
    }

    pub fn state(&self) -> ComposerState {
        self.controller.state()
    }

    /// Pointer selection. Re-runs the matcher for the new caret.
    pub fn set_selection(&mut self, selection: Selection) {
        self.editor.set_selection(selection);
        self.controller.refresh(&self.editor, &self.candidates);
    }

    pub fn select_range(&mut self, range: TextRange) {
        self.set_selection(Selection::from(range));
    }

    pub fn handle_key(&mut self, key: Key) -> Result<KeyOutcome, ComposerError> {
        if !self.enabled {
            return Ok(KeyOutcome::Ignored);
        }
        let outcome = self
            .controller
            .handle_key(&mut self.editor, key, &self.candidates)?;
        if outcome != KeyOutcome::SendRequested {
            return Ok(outcome);
        }
        Ok(match self.send()? {
            SendOutcome::Sent(_) => KeyOutcome::Sent,
            SendOutcome::NoTransport | SendOutcome::Disabled => KeyOutcome::NotSent,
        })
    }

    pub fn paste(&mut self, text: &str) -> Result<EditOutcome, ComposerError> {
        if !self.enabled {
            return Ok(EditOutcome::Ignored);
        }
        Ok(self
            .controller
            .paste(&mut self.editor, text, &self.candidates)?)
    }

    /// Native emoji from the picker, inserted as plain text.
    pub fn insert_emoji(&mut self, emoji: &str) -> Result<EditOutcome, ComposerError> {
        if !self.enabled {
            return Ok(EditOutcome::Ignored);
        }
        Ok(self
            .controller
            .insert_text(&mut self.editor, emoji, &self.candidates)?)
    }

    pub fn insert_custom_emoji(
        &mut self,
        name: &str,
        image_url: &str,
    ) -> Result<EditOutcome, ComposerError> {
        if !self.enabled || image_url.is_empty() {
            return Ok(EditOutcome::Ignored);
        }
        Ok(self.controller.insert_void_node(
            &mut self.editor,
            Node::emoji(name, image_url),
            &self.candidates,
        )?)
    }

    /// Commits the candidate at `index` of the current match list, as a click
    /// on the list would.
    pub fn select_candidate(&mut self, index: usize) -> Result<KeyOutcome, ComposerError> {
        if !self.enabled {
            return Ok(KeyOutcome::Ignored);
        }
        Ok(self
            .controller
            .commit_candidate(&mut self.editor, index, &self.candidates)?)
    }

    pub fn serialize(&self) -> String {
        serialize_document(self.editor.doc())
    }

    pub fn send(&mut self) -> Result<SendOutcome, ComposerError> {
        if !self.enabled {
            return Ok(SendOutcome::Disabled);
        }
        let Some(transport) = self.transport.as_ref() else {
            tracing::warn!("no chat transport available; message not sent");
            return Ok(SendOutcome::NoTransport);
        };

        let message = ChatMessage::chat(self.serialize());
        tracing::debug!(len = message.body.len(), "sending chat message");
        transport.send(message.clone());

        let everything = TextRange::new(self.editor.start(), self.editor.end());
        self.editor.delete_range(&everything)?;
        self.controller.reset();
        Ok(SendOutcome::Sent(message))
    }
}
