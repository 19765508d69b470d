//! Asynchronous line reader over a finished log file

use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

pub struct LogReader {
    path: PathBuf,
    file: BufReader<File>,
    line_number: u64,
    buf: Vec<u8>,
}

impl LogReader {
    /// Open the log file for reading from the start.
    pub async fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).await?;

        log::info!("📖 Reading log: {}", path.display());

        Ok(Self {
            path,
            file: BufReader::new(file),
            line_number: 0,
            buf: Vec::with_capacity(4096),
        })
    }

    /// Read the next line, `None` at end of file.
    ///
    /// Invalid UTF-8 is replaced rather than rejected so one corrupt line
    /// cannot end the run.
    pub async fn read_line(&mut self) -> std::io::Result<Option<String>> {
        self.buf.clear();
        if self.file.read_until(b'\n', &mut self.buf).await? == 0 {
            return Ok(None);
        }
        self.line_number += 1;

        let line = String::from_utf8_lossy(&self.buf);
        Ok(Some(line.trim_end_matches(|c: char| c == '\n' || c == '\r').to_string()))
    }

    /// 1-based number of the line last returned.
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
