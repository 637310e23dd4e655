use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::{MAX_FILE_BYTES, error::EditorError};

/// Extensions accepted by Open and drag-drop; content is treated identically.
pub const TEXT_EXTENSIONS: [&str; 3] = ["txt", "md", "markdown"];
const TEXT_MIME_TYPES: [&str; 2] = ["text/plain", "text/markdown"];

/// A file offered by the picker or a drop, before its content is read.
///
/// `path` is carried for the front end that performs the read; the core only
/// looks at `name`, `size` and `mime`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomingFile {
    pub name: String,
    pub size: u64,
    pub mime: Option<String>,
    pub path: Option<PathBuf>,
}

impl IncomingFile {
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let meta = fs::metadata(path)?;
        if !meta.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "not a regular file",
            ));
        }
        Ok(Self {
            name: display_name(path),
            size: meta.len(),
            mime: None,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn extension(&self) -> Option<&str> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        (!stem.is_empty()).then_some(ext)
    }

    /// Whether a drop should consider this file at all.
    pub fn is_text_like(&self) -> bool {
        let mime_ok = self.mime.as_deref().is_some_and(|mime| {
            let essence = mime.split(';').next().unwrap_or_default().trim();
            TEXT_MIME_TYPES
                .iter()
                .any(|known| essence.eq_ignore_ascii_case(known))
        });
        let ext_ok = self.extension().is_some_and(|ext| {
            TEXT_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        });
        mime_ok || ext_ok
    }

    pub fn check_size(&self) -> Result<(), EditorError> {
        if self.size > MAX_FILE_BYTES {
            return Err(EditorError::FileTooLarge {
                name: self.name.clone(),
                size: self.size,
                limit: MAX_FILE_BYTES,
            });
        }
        Ok(())
    }
}

/// First text-like file of a drop; the rest are ignored.
pub fn pick_dropped<I>(files: I) -> Option<IncomingFile>
where
    I: IntoIterator<Item = IncomingFile>,
{
    files.into_iter().find(IncomingFile::is_text_like)
}

pub(crate) fn display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.to_string_lossy().into_owned(),
        |name| name.to_string_lossy().into_owned(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, mime: Option<&str>) -> IncomingFile {
        IncomingFile {
            name: name.to_owned(),
            size: 10,
            mime: mime.map(str::to_owned),
            path: None,
        }
    }

    #[test]
    fn is_text_like_by_extension_or_mime() {
        let cases = [
            ("notes.md", None, true),
            ("NOTES.MD", None, true),
            ("readme.markdown", None, true),
            ("a.txt", None, true),
            ("photo.png", None, false),
            ("photo.png", Some("image/png"), false),
            ("noext", Some("text/plain"), true),
            ("noext", Some("text/markdown; charset=UTF-8"), true),
            (".md", None, false),
            ("archive.txt.gz", None, false),
        ];
        for (name, mime, expected) in cases {
            assert_eq!(file(name, mime).is_text_like(), expected, "{name} {mime:?}");
        }
    }

    #[test]
    fn pick_dropped_takes_first_text_file() {
        let dropped = vec![
            file("a.png", Some("image/png")),
            file("b.md", None),
            file("c.txt", None),
        ];
        let picked = pick_dropped(dropped).map(|f| f.name);
        assert_eq!(picked.as_deref(), Some("b.md"));

        assert!(pick_dropped(vec![file("a.pdf", None)]).is_none());
        assert!(pick_dropped(Vec::new()).is_none());
    }

    #[test]
    fn check_size_rejects_over_ceiling() {
        let mut f = file("big.txt", None);
        f.size = MAX_FILE_BYTES;
        assert!(f.check_size().is_ok());
        f.size = MAX_FILE_BYTES + 1;
        assert!(matches!(
            f.check_size(),
            Err(EditorError::FileTooLarge { size, .. }) if size == MAX_FILE_BYTES + 1
        ));
    }

    #[test]
    fn from_path_reads_metadata() {
        let mut dir = std::env::temp_dir();
        dir.push(format!("jotpad-ingest-test-{}", std::process::id()));
        let _ = fs::create_dir_all(&dir);
        let path = dir.join("todo.md");
        fs::write(&path, "- [ ] a").ok();

        let result = IncomingFile::from_path(&path);
        assert!(result.is_ok(), "from_path failed: {result:?}");
        if let Ok(f) = result {
            assert_eq!(f.name, "todo.md");
            assert_eq!(f.size, 7);
            assert_eq!(f.path.as_deref(), Some(path.as_path()));
        }

        assert!(IncomingFile::from_path(&dir).is_err());
        let _ = fs::remove_dir_all(&dir);
    }
}
