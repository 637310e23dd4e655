use std::{
    io,
    time::{Duration, Instant},
};

use tracing::{debug, info, warn};

use crate::{
    MAX_FILE_BYTES,
    counts::{Counts, TextKind},
    document::{DEFAULT_FILENAME, Document},
    error::EditorError,
    export::{DownloadSink, normalize_filename},
    ingest::IncomingFile,
    schedule::DeferredTask,
    settings::Settings,
    store::{CONTENT_KEY, EphemeralStore, SETTINGS_KEY},
};

pub const AUTOSAVE_DELAY: Duration = Duration::from_millis(3000);
/// Inserted by the Tab key instead of moving focus.
pub const INDENT: &str = "    ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Nothing typed or loaded yet; the placeholder is showing.
    Welcome,
    Editing,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AutosaveStatus {
    Active,
    /// Content outgrew the store once this session. Sticky: shrinking the
    /// text again does not re-enable autosave.
    Disabled { bytes: usize },
}

impl AutosaveStatus {
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn warning(self) -> Option<String> {
        match self {
            Self::Active => None,
            Self::Disabled { bytes } => Some(format!(
                "Autosave is off for this session: the document reached {:.1} MiB, over the {} MiB limit. Use Save As to keep your work.",
                bytes as f64 / (1024.0 * 1024.0),
                MAX_FILE_BYTES / (1024 * 1024),
            )),
        }
    }
}

/// An operation that would replace the current content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingAction {
    NewBlank,
    /// Show the file picker; the picked file comes back through
    /// [`Editor::begin_load`].
    Open,
    /// A file that is already in hand, such as a drop.
    Load(IncomingFile),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Discard,
    SaveThenProceed,
    /// Closing the prompt without choosing. Nothing happens.
    Dismiss,
}

/// What the front end has to do next.
#[must_use]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    Done,
    /// Ask the user to resolve unsaved changes, then call [`Editor::resolve`].
    Confirm,
    PickFile,
    /// Read this file as text and hand the result to [`Editor::finish_load`].
    Read(IncomingFile),
}

/// Owns the document, settings, store and autosave timer of one session.
///
/// Every state change goes through a method here; front ends only get
/// shared references back.
#[derive(Debug)]
pub struct Editor<S> {
    doc: Document,
    phase: Phase,
    settings: Settings,
    store: S,
    autosave: DeferredTask<u64>,
    status: AutosaveStatus,
    pending: Option<PendingAction>,
}

impl<S: EphemeralStore> Editor<S> {
    /// Start a session on `store`, picking up settings and any content it
    /// still holds.
    pub fn new(store: S) -> Self {
        let settings = match store.get(SETTINGS_KEY) {
            Some(json) => Settings::from_json(&json).unwrap_or_else(|err| {
                warn!(%err, "ignoring stored settings");
                Settings::default()
            }),
            None => Settings::default(),
        };

        let (doc, phase) = match store.get(CONTENT_KEY) {
            Some(text) if !text.is_empty() => {
                debug!(bytes = text.len(), "restored session content");
                let doc = Document::loaded(settings.current_filename.clone(), text);
                (doc, Phase::Editing)
            }
            _ => {
                let mut doc = Document::default();
                doc.set_filename(settings.current_filename.clone());
                (doc, Phase::Welcome)
            }
        };

        Self {
            doc,
            phase,
            settings,
            store,
            autosave: DeferredTask::new(),
            status: AutosaveStatus::Active,
            pending: None,
        }
    }

    pub const fn document(&self) -> &Document {
        &self.doc
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn autosave_status(&self) -> AutosaveStatus {
        self.status
    }

    pub const fn pending_action(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    pub fn counts(&self) -> Counts {
        Counts::of(self.doc.text(), TextKind::from_filename(self.doc.filename()))
    }

    /// Time until the pending autosave fires, for scheduling a wake-up.
    pub fn autosave_remaining(&self, now: Instant) -> Option<Duration> {
        self.autosave.remaining(now)
    }

    /// Let `f` mutate the text in place. `f` reports whether it changed
    /// anything; only then is the document marked dirty.
    pub fn edit<F>(&mut self, now: Instant, f: F) -> bool
    where
        F: FnOnce(&mut String) -> bool,
    {
        let changed = f(self.doc.text_mut());
        if changed {
            self.note_text_changed(now);
        }
        changed
    }

    pub fn set_text(&mut self, text: impl Into<String>, now: Instant) {
        let text = text.into();
        self.edit(now, |current| {
            *current = text;
            true
        });
    }

    /// Insert [`INDENT`] at a char offset and return the caret after it.
    pub fn insert_indent(&mut self, caret: usize, now: Instant) -> usize {
        self.edit(now, |text| {
            let idx = text.char_indices().nth(caret).map_or(text.len(), |(i, _)| i);
            text.insert_str(idx, INDENT);
            true
        });
        let len = self.doc.text().chars().count();
        caret.min(len - INDENT.len()) + INDENT.len()
    }

    fn note_text_changed(&mut self, now: Instant) {
        self.doc.mark_dirty();
        if self.phase == Phase::Welcome {
            debug!("leaving welcome");
            self.phase = Phase::Editing;
        }
        if self.status.is_active() && self.doc.is_dirty() {
            self.autosave.arm(now, AUTOSAVE_DELAY, self.doc.revision());
        }
    }

    /// Run the autosave if its delay has passed. Returns whether one fired.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(revision) = self.autosave.take_due(now) else {
            return false;
        };
        debug!(revision, "autosave due");
        if let Err(err) = self.persist() {
            debug!(%err, "autosave did not complete");
        }
        true
    }

    /// Explicit save: skips the debounce, same ceiling as autosave.
    pub fn save(&mut self) -> Result<usize, EditorError> {
        self.autosave.cancel();
        self.persist()
    }

    fn persist(&mut self) -> Result<usize, EditorError> {
        let bytes = self.doc.byte_len();
        if bytes as u64 > MAX_FILE_BYTES {
            if self.status.is_active() {
                warn!(bytes, limit = MAX_FILE_BYTES, "content too large; autosave disabled for this session");
            }
            self.status = AutosaveStatus::Disabled { bytes };
            self.autosave.cancel();
            return Err(EditorError::ContentTooLarge {
                bytes,
                limit: MAX_FILE_BYTES,
            });
        }

        match self.store.set(CONTENT_KEY, self.doc.text()) {
            Ok(()) => {
                self.doc.mark_clean();
                debug!(bytes, revision = self.doc.revision(), "content saved");
                Ok(bytes)
            }
            Err(err) => {
                warn!(%err, "content write failed; will retry on the next save");
                Err(err.into())
            }
        }
    }

    fn needs_confirmation(&self) -> bool {
        self.doc.is_dirty() && !self.doc.is_empty()
    }

    /// Ask to run a destructive action, going through the unsaved-changes
    /// guard first.
    pub fn request(&mut self, action: PendingAction) -> Result<Effect, EditorError> {
        if self.pending.is_some() {
            return Err(EditorError::ConfirmationPending);
        }
        if self.needs_confirmation() {
            debug!(?action, "holding action for confirmation");
            self.pending = Some(action);
            return Ok(Effect::Confirm);
        }
        self.apply(action)
    }

    pub fn resolve(&mut self, resolution: Resolution) -> Result<Effect, EditorError> {
        let Some(action) = self.pending.take() else {
            return Ok(Effect::Done);
        };
        match resolution {
            Resolution::Dismiss => {
                debug!(?action, "confirmation dismissed");
                Ok(Effect::Done)
            }
            Resolution::Discard => self.apply(action),
            Resolution::SaveThenProceed => {
                if let Err(err) = self.save() {
                    warn!(%err, "save before continuing failed; continuing anyway");
                }
                self.apply(action)
            }
        }
    }

    fn apply(&mut self, action: PendingAction) -> Result<Effect, EditorError> {
        match action {
            PendingAction::NewBlank => {
                self.new_blank();
                Ok(Effect::Done)
            }
            PendingAction::Open => Ok(Effect::PickFile),
            PendingAction::Load(file) => self.begin_load(file),
        }
    }

    fn new_blank(&mut self) {
        self.doc = Document::default();
        self.phase = Phase::Welcome;
        self.autosave.cancel();
        self.store.remove(CONTENT_KEY);
        self.set_current_filename(DEFAULT_FILENAME);
        info!("new document");
    }

    /// Size-check a picked file. The guard is not consulted here; Open has
    /// already been through it.
    pub fn begin_load(&mut self, file: IncomingFile) -> Result<Effect, EditorError> {
        file.check_size()?;
        debug!(name = %file.name, size = file.size, "reading file");
        Ok(Effect::Read(file))
    }

    /// Apply a completed read. Reads are never cancelled, so whichever
    /// completes last wins.
    pub fn finish_load(&mut self, name: &str, read: io::Result<String>) -> Result<(), EditorError> {
        let text = read.map_err(|source| {
            warn!(%source, name, "file read failed");
            EditorError::Read {
                name: name.to_owned(),
                source,
            }
        })?;
        if text.len() as u64 > MAX_FILE_BYTES {
            return Err(EditorError::FileTooLarge {
                name: name.to_owned(),
                size: text.len() as u64,
                limit: MAX_FILE_BYTES,
            });
        }

        self.doc = Document::loaded(name, text);
        self.phase = Phase::Editing;
        self.autosave.cancel();
        if let Err(err) = self.store.set(CONTENT_KEY, self.doc.text()) {
            warn!(%err, "could not persist loaded file");
        }
        self.set_current_filename(name);
        info!(name, bytes = self.doc.byte_len(), "file loaded");
        Ok(())
    }

    /// Hand the text to `sink` under a cleaned-up `filename`, then adopt
    /// that name and mark the document clean. Returns the name used.
    pub fn save_as<D>(&mut self, filename: &str, sink: &mut D) -> String
    where
        D: DownloadSink + ?Sized,
    {
        let name = normalize_filename(filename);
        sink.download(self.doc.text().as_bytes(), &name);
        self.doc.set_filename(name.clone());
        self.doc.mark_clean();
        self.autosave.cancel();
        self.set_current_filename(&name);
        info!(name = %name, bytes = self.doc.byte_len(), "exported");
        name
    }

    pub fn update_settings<F>(&mut self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        let mut next = self.settings.clone();
        f(&mut next);
        let next = next.normalized();
        if next == self.settings {
            return;
        }
        self.settings = next;
        self.persist_settings();
    }

    fn set_current_filename(&mut self, name: &str) {
        self.update_settings(|s| name.clone_into(&mut s.current_filename));
    }

    fn persist_settings(&mut self) {
        let json = match self.settings.to_json() {
            Ok(json) => json,
            Err(err) => {
                warn!(%err, "could not encode settings");
                return;
            }
        };
        if let Err(err) = self.store.set(SETTINGS_KEY, &json) {
            warn!(%err, "settings write failed");
        }
    }

    /// End of session: the content key never outlives it.
    pub fn shutdown(&mut self) {
        self.autosave.cancel();
        self.store.remove(CONTENT_KEY);
        debug!("session content cleared");
    }
}
