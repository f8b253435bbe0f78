//! The classification seam.
//!
//! Classification is the one step the planner cannot do itself: something
//! outside the crate (a language model, a script, a fixture file) assigns each
//! keyword its theme, pillar, page, relation, intent, and strategy. The rest of
//! the pipeline only sees a [`Classifier`].
//!
//! Two implementations ship:
//!
//! - [`StaticClassifier`] returns records decoded up front (precomputed JSON).
//! - [`CommandClassifier`] runs an external program, writing the keyword batch
//!   as JSON on its stdin and reading a JSON array of records from its stdout.
//!
//! Whatever the classifier reports for volume is discarded later by
//! reattachment.

use std::io::Write;
use std::process::{Command, Stdio};

use serde_json::Value;

use super::model::{decode_records, ClassifiedKeyword, KeywordInput};
use crate::error::{Result, SiteplanError};

pub trait Classifier {
    /// Classify one validated batch. Called at most once per analysis.
    fn classify(&self, inputs: &[KeywordInput]) -> Result<Vec<ClassifiedKeyword>>;
}

/// Precomputed classifier output.
#[derive(Debug, Clone, Default)]
pub struct StaticClassifier {
    records: Vec<ClassifiedKeyword>,
}

impl StaticClassifier {
    pub fn new(records: Vec<ClassifiedKeyword>) -> Self {
        Self { records }
    }

    /// Decode raw classifier JSON leniently.
    pub fn from_values(rows: &[Value]) -> Self {
        Self::new(decode_records(rows))
    }
}

impl Classifier for StaticClassifier {
    fn classify(&self, _inputs: &[KeywordInput]) -> Result<Vec<ClassifiedKeyword>> {
        Ok(self.records.clone())
    }
}

/// External program acting as the classifier.
#[derive(Debug, Clone)]
pub struct CommandClassifier {
    program: String,
    args: Vec<String>,
}

impl CommandClassifier {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a command line on whitespace: program first, then arguments.
    pub fn from_command_line(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| SiteplanError::invalid("classifier command is empty"))?;
        Ok(Self::new(program, parts.collect()))
    }
}

impl Classifier for CommandClassifier {
    fn classify(&self, inputs: &[KeywordInput]) -> Result<Vec<ClassifiedKeyword>> {
        let payload = serde_json::to_vec(inputs)?;
        tracing::debug!(program = %self.program, keywords = inputs.len(), "spawning classifier");

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                SiteplanError::Classification(format!("failed to spawn '{}': {e}", self.program))
            })?;

        // stdin is dropped before waiting so the child sees EOF.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(&payload),
            None => Ok(()),
        };

        let output = child
            .wait_with_output()
            .map_err(|e| SiteplanError::Classification(format!("classifier did not finish: {e}")))?;

        if let Err(e) = written {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SiteplanError::Classification(format!(
                "failed to write keywords to '{}' ({}): {e}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SiteplanError::Classification(format!(
                "'{}' exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let response: Value = serde_json::from_slice(&output.stdout).map_err(|e| {
            SiteplanError::Classification(format!("classifier output is not JSON: {e}"))
        })?;
        let rows = response_rows(&response)?;
        Ok(decode_records(rows))
    }
}

/// The record array of a classifier response: a bare array, or an object
/// wrapping one under `results` or `keywords`.
pub fn response_rows(response: &Value) -> Result<&[Value]> {
    let rows = match response {
        Value::Array(rows) => Some(rows),
        Value::Object(map) => map
            .get("results")
            .or_else(|| map.get("keywords"))
            .and_then(Value::as_array),
        _ => None,
    };
    rows.map(Vec::as_slice).ok_or_else(|| {
        SiteplanError::Classification("classifier response is not an array of records".into())
    })
}
