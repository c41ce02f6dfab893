// src/telemetry.rs
//
// Evaluation sinks.
// - EvalSink: trait used by the experiment loop
// - NoopSink: discards all records
// - JsonlSink: one JSON object per line, for analysis tooling

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::evaluation::{ExperimentSummary, WindowRecord};

/// Abstract sink for periodic evaluation output.
///
/// Records arrive in trial order, interleaved with the learning loop; a
/// sink must not reorder them.
pub trait EvalSink {
    fn record_window(&mut self, record: &WindowRecord);
    fn record_summary(&mut self, summary: &ExperimentSummary);
}

/// Sink that discards all records.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EvalSink for NoopSink {
    fn record_window(&mut self, _record: &WindowRecord) {}
    fn record_summary(&mut self, _summary: &ExperimentSummary) {}
}

/// JSONL file sink. Window records and the final summary are written as
/// single-line JSON objects tagged with a `kind` field.
pub struct JsonlSink {
    writer: BufWriter<File>,
}

impl JsonlSink {
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    fn write_line(&mut self, kind: &str, payload: serde_json::Value) {
        let line = serde_json::json!({ "kind": kind, "data": payload });
        // A failing sink must not bring down the experiment; records are
        // advisory output.
        let _ = writeln!(self.writer, "{}", line);
        let _ = self.writer.flush();
    }
}

impl EvalSink for JsonlSink {
    fn record_window(&mut self, record: &WindowRecord) {
        if let Ok(payload) = serde_json::to_value(record) {
            self.write_line("window", payload);
        }
    }

    fn record_summary(&mut self, summary: &ExperimentSummary) {
        if let Ok(payload) = serde_json::to_value(summary) {
            self.write_line("summary", payload);
        }
    }
}
