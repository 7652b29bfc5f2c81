//! Download sinks receive finished artifacts.

use crate::error::{Result, SweepError};
use crate::types::OutputArtifact;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Destination for converted files.
///
/// Implement this trait to hand artifacts to a browser download, an upload
/// bucket or anything else that can take a name and some bytes.
pub trait DownloadSink {
    fn deliver(&mut self, artifact: OutputArtifact) -> Result<()>;
}

/// Keeps every delivered artifact in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: Vec<OutputArtifact>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn artifacts(&self) -> &[OutputArtifact] {
        &self.artifacts
    }

    pub fn into_artifacts(self) -> Vec<OutputArtifact> {
        self.artifacts
    }
}

impl DownloadSink for MemorySink {
    fn deliver(&mut self, artifact: OutputArtifact) -> Result<()> {
        debug!("Collected '{}' ({} bytes)", artifact.filename, artifact.len());
        self.artifacts.push(artifact);
        Ok(())
    }
}

/// Writes each artifact to `<dir>/<filename>`, creating `dir` on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, in delivery order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&mut self, artifact: OutputArtifact) -> Result<()> {
        let delivery_error = |reason: String| SweepError::Delivery {
            filename: artifact.filename.clone(),
            reason,
        };

        // Only the final path component is used.
        let file_name = Path::new(&artifact.filename)
            .file_name()
            .ok_or_else(|| delivery_error("not a valid file name".to_string()))?;

        fs::create_dir_all(&self.dir).map_err(|e| delivery_error(e.to_string()))?;
        let path = self.dir.join(file_name);
        fs::write(&path, &artifact.bytes).map_err(|e| delivery_error(e.to_string()))?;

        info!("Saved {} ({} bytes)", path.display(), artifact.len());
        self.written.push(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(name: &str) -> OutputArtifact {
        OutputArtifact {
            filename: name.to_string(),
            mime_type: "text/csv".to_string(),
            bytes: b"a\n1\n".to_vec(),
        }
    }

    #[test]
    fn test_memory_sink_collects_in_order() {
        let mut sink = MemorySink::new();
        sink.deliver(artifact("one.csv")).unwrap();
        sink.deliver(artifact("two.csv")).unwrap();

        let names: Vec<_> = sink.artifacts().iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(names, vec!["one.csv", "two.csv"]);
    }

    #[test]
    fn test_directory_sink_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("nested").join("out");
        let mut sink = DirectorySink::new(&out);

        sink.deliver(artifact("data.csv")).unwrap();

        let written = out.join("data.csv");
        assert_eq!(sink.written(), &[written.clone()]);
        assert_eq!(fs::read(written).unwrap(), b"a\n1\n");
    }

    #[test]
    fn test_directory_sink_keeps_only_file_name() {
        let tmp = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(tmp.path());

        sink.deliver(artifact("../escape.csv")).unwrap();

        assert!(tmp.path().join("escape.csv").exists());
    }

    #[test]
    fn test_directory_sink_reports_delivery_error() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("file");
        fs::write(&blocker, b"").unwrap();

        let mut sink = DirectorySink::new(blocker.join("out"));
        let err = sink.deliver(artifact("data.csv")).unwrap_err();

        assert_eq!(err.error_code(), "DELIVERY_FAILED");
    }
}
