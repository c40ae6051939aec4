use thiserror::Error;

pub const DEFAULT_MAX_EVENT_BYTES: usize = 256 * 1024;

/// One dispatched server-sent event. `event` defaults to `message` when the
/// server does not name the event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SseError {
    #[error("event exceeds max size: {size} > {max}")]
    OversizedEvent { size: usize, max: usize },
    #[error("buffer exceeds max size without line break: {size} > {max}")]
    OversizedBuffer { size: usize, max: usize },
}

#[derive(Debug, Clone, Default)]
pub struct SseReport {
    pub events: Vec<SseEvent>,
    pub errors: Vec<SseError>,
}

/// Incremental decoder for a `text/event-stream` body. Feed it raw transport
/// chunks; complete events come back once their terminating blank line has
/// arrived. Chunk boundaries may fall anywhere, including mid-line.
#[derive(Debug)]
pub struct SseFrameDecoder {
    max_event_bytes: usize,
    pending: Vec<u8>,
    event_name: Option<String>,
    data_lines: Vec<String>,
    last_id: Option<String>,
    oversized: bool,
}

impl SseFrameDecoder {
    pub fn new(max_event_bytes: usize) -> Self {
        Self {
            max_event_bytes,
            pending: Vec::new(),
            event_name: None,
            data_lines: Vec::new(),
            last_id: None,
            oversized: false,
        }
    }

    pub fn push_chunk(&mut self, chunk: &[u8]) -> SseReport {
        let mut report = SseReport::default();
        if !chunk.is_empty() {
            self.pending.extend_from_slice(chunk);
        }

        while let Some(newline_idx) = self.pending.iter().position(|byte| *byte == b'\n') {
            let mut line = self.pending.drain(..=newline_idx).collect::<Vec<u8>>();
            if line.ends_with(b"\n") {
                line.pop();
            }
            if line.ends_with(b"\r") {
                line.pop();
            }
            self.consume_line(&line, &mut report);
        }

        if self.pending.len() > self.max_event_bytes {
            report.errors.push(SseError::OversizedBuffer {
                size: self.pending.len(),
                max: self.max_event_bytes,
            });
            self.pending.clear();
            self.reset_event();
        }

        report
    }

    fn consume_line(&mut self, line: &[u8], report: &mut SseReport) {
        if line.is_empty() {
            self.dispatch(report);
            return;
        }
        // Comment lines (used by servers as keep-alives) start with a colon.
        if line.first() == Some(&b':') {
            return;
        }

        let text = String::from_utf8_lossy(line);
        let (field, value) = match text.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (text.as_ref(), ""),
        };

        match field {
            "event" => self.event_name = Some(value.to_string()),
            "data" => {
                self.data_lines.push(value.to_string());
                let accumulated: usize = self.data_lines.iter().map(String::len).sum();
                if accumulated > self.max_event_bytes {
                    report.errors.push(SseError::OversizedEvent {
                        size: accumulated,
                        max: self.max_event_bytes,
                    });
                    self.oversized = true;
                }
            }
            "id" => self.last_id = Some(value.to_string()),
            // `retry` carries the browser reconnect delay; our reconnect
            // policy is owned by the stream controller, so it is ignored.
            _ => {}
        }
    }

    fn dispatch(&mut self, report: &mut SseReport) {
        if self.data_lines.is_empty() || self.oversized {
            self.reset_event();
            return;
        }
        let event = SseEvent {
            event: self
                .event_name
                .take()
                .unwrap_or_else(|| "message".to_string()),
            data: self.data_lines.join("\n"),
            id: self.last_id.clone(),
        };
        report.events.push(event);
        self.reset_event();
    }

    fn reset_event(&mut self) {
        self.event_name = None;
        self.data_lines.clear();
        self.oversized = false;
    }
}

impl Default for SseFrameDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EVENT_BYTES)
    }
}
