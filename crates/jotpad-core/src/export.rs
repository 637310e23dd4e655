use crate::document::DEFAULT_FILENAME;

/// Receives the bytes of a Save-As.
///
/// There is no error channel: whatever happens after the hand-off belongs
/// to the sink.
pub trait DownloadSink {
    fn download(&mut self, bytes: &[u8], filename: &str);
}

impl<F> DownloadSink for F
where
    F: FnMut(&[u8], &str),
{
    fn download(&mut self, bytes: &[u8], filename: &str) {
        self(bytes, filename);
    }
}

/// Clean up a user-supplied Save-As name: path separators are dropped, blank
/// names fall back to the default and a bare stem gets `.txt`.
pub fn normalize_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    if base.is_empty() || base.chars().all(|c| c == '.') {
        return DEFAULT_FILENAME.to_owned();
    }
    match base.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => base.to_owned(),
        _ => format!("{}.txt", base.trim_end_matches('.')),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_filename_cases() {
        let cases = [
            ("notes.md", "notes.md"),
            ("  draft  ", "draft.txt"),
            ("draft.", "draft.txt"),
            ("", "document.txt"),
            ("...", "document.txt"),
            ("../../etc/passwd", "passwd.txt"),
            ("C:\\Users\\me\\todo.markdown", "todo.markdown"),
            (".bashrc", ".bashrc.txt"),
        ];
        for (input, expected) in cases {
            assert_eq!(normalize_filename(input), expected, "input {input:?}");
        }
    }

    #[test]
    fn closures_are_sinks() {
        let mut seen = Vec::new();
        let mut sink = |bytes: &[u8], name: &str| seen.push((bytes.len(), name.to_owned()));
        sink.download(b"hello", "a.txt");
        assert_eq!(seen, vec![(5, "a.txt".to_owned())]);
    }
}
