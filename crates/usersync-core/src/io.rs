use crate::error::Result;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Create a directory and all parents, idempotent.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}

/// Open `path` for appending, creating it (and its parent) if needed.
pub fn open_append(path: &Path) -> Result<File> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let f = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(f)
}

/// Append one line, terminated with `\n`, and flush.
pub fn append_line(f: &mut File, line: &str) -> Result<()> {
    f.write_all(line.as_bytes())?;
    f.write_all(b"\n")?;
    f.flush()?;
    Ok(())
}
