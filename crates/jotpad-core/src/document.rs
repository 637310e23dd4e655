pub const DEFAULT_FILENAME: &str = "document.txt";

/// The single open document.
///
/// `dirty` is set by every text mutation and cleared only when the text has
/// been persisted (store write, file load or export).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    text: String,
    filename: String,
    dirty: bool,
    revision: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            text: String::new(),
            filename: DEFAULT_FILENAME.to_owned(),
            dirty: false,
            revision: 0,
        }
    }
}

impl Document {
    /// A document whose content is already persisted somewhere.
    pub fn loaded(filename: impl Into<String>, text: String) -> Self {
        Self {
            text,
            filename: filename.into(),
            dirty: false,
            revision: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Bumped on every mutation; used to tell autosave attempts apart in logs.
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// Encoded size of the text, which is what the store and ceilings see.
    pub fn byte_len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub(crate) const fn text_mut(&mut self) -> &mut String {
        &mut self.text
    }

    pub(crate) fn set_filename(&mut self, filename: impl Into<String>) {
        self.filename = filename.into();
    }

    pub(crate) const fn mark_dirty(&mut self) {
        self.dirty = true;
        self.revision = self.revision.wrapping_add(1);
    }

    pub(crate) const fn mark_clean(&mut self) {
        self.dirty = false;
    }
}
