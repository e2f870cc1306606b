use crate::audit::AuditEntry;
use crate::error::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Destination for audit entries
///
/// Implementations are shared between concurrently running handlers, so
/// `append` takes `&self`.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Name of the sink, for diagnostics
    fn name(&self) -> &'static str;

    /// Persist a single entry
    async fn append(&self, entry: &AuditEntry) -> Result<()>;
}

/// Appends audit lines to a text file and mirrors them to stdout
///
/// The file is opened, written and closed on every call rather than held
/// open, so the trail on disk is complete after each entry even if the
/// process dies.
pub struct FileAuditSink {
    path: PathBuf,
    escape_newlines: bool,
    mirror_stdout: bool,
}

impl FileAuditSink {
    pub fn new(path: impl Into<PathBuf>, escape_newlines: bool) -> Self {
        let path = path.into();
        tracing::info!(
            path = %path.display(),
            escape_newlines = escape_newlines,
            "Audit log sink configured"
        );

        Self {
            path,
            escape_newlines,
            mirror_stdout: true,
        }
    }

    /// Disable the console mirror (the file is still written)
    pub fn without_mirror(mut self) -> Self {
        self.mirror_stdout = false;
        self
    }

    async fn write_file(&self, line: &str) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    async fn write_stdout(&self, line: &str) -> Result<()> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(line.as_bytes()).await?;
        stdout.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl AuditSink for FileAuditSink {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn append(&self, entry: &AuditEntry) -> Result<()> {
        let mut line = entry.format_line(self.escape_newlines);
        line.push('\n');

        let written = self.write_file(&line).await;

        // Mirror even when the file write failed
        if self.mirror_stdout {
            if let Err(e) = self.write_stdout(&line).await {
                tracing::warn!(error = %e, "Failed to mirror audit line to stdout");
            }
        }

        written
    }
}

/// Keeps formatted audit lines in memory
#[derive(Default)]
pub struct MemoryAuditSink {
    lines: Mutex<Vec<String>>,
    escape_newlines: bool,
}

impl MemoryAuditSink {
    pub fn new(escape_newlines: bool) -> Self {
        Self {
            lines: Mutex::new(Vec::new()),
            escape_newlines,
        }
    }

    /// Snapshot of every line appended so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn append(&self, entry: &AuditEntry) -> Result<()> {
        let line = entry.format_line(self.escape_newlines);
        self.lines.lock().push(line);
        Ok(())
    }
}
