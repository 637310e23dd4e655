use std::{
    fs,
    io::{self, Read as _, Write as _},
    path::{Path, PathBuf},
    time::SystemTime,
};

use jotpad_core::DownloadSink;

/// Read a whole file as UTF-8, refusing to pull in more than `limit` bytes
/// even if the file grew after it was size-checked.
pub(crate) fn read_utf8_capped(path: &Path, limit: u64) -> io::Result<String> {
    let file = fs::File::open(path)?;
    let mut buf = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut buf)?;
    if buf.len() as u64 > limit {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("file is larger than {limit} bytes"),
        ));
    }
    String::from_utf8(buf).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

/// Write through a sibling temp file and rename over the target, so a failed
/// export never leaves a half-written file behind.
pub(crate) fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path is missing a file name"))?
        .to_string_lossy();
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());

    for attempt in 0..10u128 {
        let tmp_path = dir.join(format!(
            ".jotpad-{file_name}-{}",
            nanos ^ u128::from(std::process::id()) ^ attempt
        ));
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp_path)
        {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err),
        };

        let written = file
            .write_all(contents)
            .and_then(|()| file.sync_all())
            .and_then(|()| fs::rename(&tmp_path, path));
        if written.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        return written;
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        "failed to create a temporary file",
    ))
}

/// Save-As target on the local disk: the core's download goes to
/// `dir/filename`.
pub(crate) struct DiskSink {
    pub(crate) dir: PathBuf,
    pub(crate) result: io::Result<()>,
}

impl DiskSink {
    pub(crate) const fn new(dir: PathBuf) -> Self {
        Self { dir, result: Ok(()) }
    }
}

impl DownloadSink for DiskSink {
    fn download(&mut self, bytes: &[u8], filename: &str) {
        let path = self.dir.join(filename);
        self.result = atomic_write(&path, bytes);
        match &self.result {
            Ok(()) => tracing::info!(path = %path.display(), "wrote export"),
            Err(err) => tracing::warn!(%err, path = %path.display(), "export write failed"),
        }
    }
}
