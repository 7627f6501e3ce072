#![forbid(unsafe_code)]

//! Gesture trace recording and reading.
//!
//! A trace captures the drag-sensor callbacks of a session with millisecond
//! offsets so that a misbehaving gesture can be replayed against a fixture
//! board deterministically.
//!
//! # Format
//!
//! Each line is a JSON object tagged by `event`. The first line is always a
//! `trace_header`, the last a `trace_summary`.
//!
//! ```json
//! {"event":"trace_header","schema_version":"gesture-trace-v1","board":"demo"}
//! {"event":"start","t_ms":0,"item":"b"}
//! {"event":"hover","t_ms":16,"over":"DOING"}
//! {"event":"end","t_ms":40,"over":"DOING"}
//! {"event":"trace_summary","total_events":3,"duration_ms":40}
//! ```
//!
//! `over` is omitted when the pointer is outside every target.

use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};
use crate::gesture::{GestureEvent, TimedGesture};

/// Current schema version for gesture trace files.
pub const SCHEMA_VERSION: &str = "gesture-trace-v1";

/// A single line in a gesture trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum GestureRecord {
    #[serde(rename = "trace_header")]
    Header {
        schema_version: String,
        board: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<u64>,
    },

    #[serde(rename = "start")]
    Start { t_ms: u64, item: String },

    #[serde(rename = "hover")]
    Hover {
        t_ms: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        over: Option<String>,
    },

    #[serde(rename = "end")]
    End {
        t_ms: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        over: Option<String>,
    },

    #[serde(rename = "trace_summary")]
    Summary { total_events: u64, duration_ms: u64 },
}

impl GestureRecord {
    #[must_use]
    pub fn from_gesture(gesture: &TimedGesture) -> Self {
        let t_ms = gesture.at_ms;
        match &gesture.event {
            GestureEvent::Start { item } => Self::Start {
                t_ms,
                item: item.to_string(),
            },
            GestureEvent::Hover { over } => Self::Hover {
                t_ms,
                over: over.clone(),
            },
            GestureEvent::End { over } => Self::End {
                t_ms,
                over: over.clone(),
            },
        }
    }

    /// The gesture this record describes; `None` for header and summary.
    #[must_use]
    pub fn to_gesture(&self) -> Option<TimedGesture> {
        let (at_ms, event) = match self {
            Self::Start { t_ms, item } => (*t_ms, GestureEvent::start(item.as_str())),
            Self::Hover { t_ms, over } => (*t_ms, GestureEvent::hover(over.as_deref())),
            Self::End { t_ms, over } => (*t_ms, GestureEvent::end(over.as_deref())),
            Self::Header { .. } | Self::Summary { .. } => return None,
        };
        Some(TimedGesture::new(at_ms, event))
    }

    #[must_use]
    pub fn t_ms(&self) -> Option<u64> {
        match self {
            Self::Start { t_ms, .. } | Self::Hover { t_ms, .. } | Self::End { t_ms, .. } => {
                Some(*t_ms)
            }
            Self::Header { .. } | Self::Summary { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Writes gesture records as JSONL.
pub struct GestureTraceWriter<W: Write> {
    writer: BufWriter<W>,
    event_count: u64,
    last_t_ms: u64,
}

impl GestureTraceWriter<std::fs::File> {
    /// Create a writer for a JSONL file on disk.
    pub fn create(path: impl AsRef<Path>, board: &str, seed: Option<u64>) -> io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Self::from_writer(file, board, seed)
    }
}

impl<W: Write> GestureTraceWriter<W> {
    /// Wrap any writer and emit the header line.
    pub fn from_writer(writer: W, board: &str, seed: Option<u64>) -> io::Result<Self> {
        let mut trace = Self {
            writer: BufWriter::new(writer),
            event_count: 0,
            last_t_ms: 0,
        };
        trace.write_line(&GestureRecord::Header {
            schema_version: SCHEMA_VERSION.to_string(),
            board: board.to_string(),
            seed,
        })?;
        Ok(trace)
    }

    pub fn record(&mut self, gesture: &TimedGesture) -> io::Result<()> {
        self.write_line(&GestureRecord::from_gesture(gesture))?;
        self.event_count += 1;
        self.last_t_ms = self.last_t_ms.max(gesture.at_ms);
        Ok(())
    }

    #[inline]
    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    /// Write the summary line, flush, and hand back the inner writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.write_line(&GestureRecord::Summary {
            total_events: self.event_count,
            duration_ms: self.last_t_ms,
        })?;
        self.writer.flush()?;
        self.writer
            .into_inner()
            .map_err(|e| io::Error::other(e.to_string()))
    }

    fn write_line(&mut self, record: &GestureRecord) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, record).map_err(io::Error::other)?;
        self.writer.write_all(b"\n")
    }
}

/// Serialize a whole gesture sequence into JSONL text.
pub fn to_jsonl(board: &str, seed: Option<u64>, gestures: &[TimedGesture]) -> io::Result<String> {
    let mut writer = GestureTraceWriter::from_writer(Vec::new(), board, seed)?;
    for gesture in gestures {
        writer.record(gesture)?;
    }
    let bytes = writer.finish()?;
    String::from_utf8(bytes).map_err(io::Error::other)
}

// ---------------------------------------------------------------------------
// Reader
// ---------------------------------------------------------------------------

/// A parsed gesture trace.
#[derive(Debug, Clone)]
pub struct GestureTrace {
    records: Vec<GestureRecord>,
}

impl GestureTrace {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(HarnessError::MissingPath {
                path: path.to_path_buf(),
            });
        }
        let file = std::fs::File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_jsonl(text: &str) -> Result<Self> {
        Self::from_reader(text.as_bytes())
    }

    /// Parse JSONL, skipping blank lines.
    ///
    /// The first record must be a `trace_header` with a known schema
    /// version; event offsets must not go backwards.
    pub fn from_reader(reader: impl BufRead) -> Result<Self> {
        let mut records = Vec::new();
        let mut last_t_ms = 0;
        for (n, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: GestureRecord = serde_json::from_str(&line)
                .map_err(|e| HarnessError::invalid_trace(n + 1, e.to_string()))?;
            if records.is_empty() {
                match &record {
                    GestureRecord::Header { schema_version, .. }
                        if schema_version == SCHEMA_VERSION => {}
                    GestureRecord::Header { schema_version, .. } => {
                        return Err(HarnessError::invalid_trace(
                            n + 1,
                            format!("unsupported schema {schema_version}"),
                        ));
                    }
                    _ => return Err(HarnessError::invalid_trace(n + 1, "missing trace_header")),
                }
            }
            if let Some(t_ms) = record.t_ms() {
                if t_ms < last_t_ms {
                    return Err(HarnessError::invalid_trace(
                        n + 1,
                        format!("offset {t_ms}ms precedes {last_t_ms}ms"),
                    ));
                }
                last_t_ms = t_ms;
            }
            records.push(record);
        }
        if records.is_empty() {
            return Err(HarnessError::invalid_trace(0, "empty trace"));
        }
        Ok(Self { records })
    }

    #[inline]
    pub fn records(&self) -> &[GestureRecord] {
        &self.records
    }

    #[must_use]
    pub fn board_name(&self) -> Option<&str> {
        match self.records.first()? {
            GestureRecord::Header { board, .. } => Some(board.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn seed(&self) -> Option<u64> {
        match self.records.first()? {
            GestureRecord::Header { seed, .. } => *seed,
            _ => None,
        }
    }

    /// Event count from the summary line, if the trace was finished.
    #[must_use]
    pub fn total_events(&self) -> Option<u64> {
        match self.records.last()? {
            GestureRecord::Summary { total_events, .. } => Some(*total_events),
            _ => None,
        }
    }

    /// The recorded gestures in order.
    #[must_use]
    pub fn gestures(&self) -> Vec<TimedGesture> {
        self.records
            .iter()
            .filter_map(GestureRecord::to_gesture)
            .collect()
    }
}
