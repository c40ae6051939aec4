use crate::model::LogRecord;
use std::collections::VecDeque;

pub const LOG_FEED_CAPACITY: usize = 500;

/// Bounded display buffer for the live log feed, plus the stream context it
/// owns: the resume cursor and the paused flag. Display-only structure; FIFO
/// eviction once the capacity is reached.
#[derive(Debug)]
pub struct LogFeed {
    lines: VecDeque<String>,
    capacity: usize,
    cursor: u64,
    paused: bool,
}

impl LogFeed {
    pub fn new() -> Self {
        Self::with_capacity(LOG_FEED_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(LOG_FEED_CAPACITY)),
            capacity,
            cursor: 0,
            paused: false,
        }
    }

    /// Apply one raw event payload. Paused feeds drop the payload entirely:
    /// nothing is buffered and the cursor does not move, so records seen
    /// while paused are never replayed. A payload that fails to parse is kept
    /// verbatim as a single line so it stays visible for diagnosis.
    ///
    /// Returns true when the feed changed.
    pub fn apply_payload(&mut self, payload: &str) -> bool {
        if self.paused {
            return false;
        }
        match serde_json::from_str::<LogRecord>(payload) {
            Ok(record) => {
                self.cursor = self.cursor.max(record.id);
                self.push_line(format_record(&record));
            }
            Err(_) => self.push_line(payload.to_string()),
        }
        true
    }

    fn push_line(&mut self, line: String) {
        if self.capacity == 0 {
            return;
        }
        while self.lines.len() >= self.capacity {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    /// Empties the display and resets the cursor, so the next subscription
    /// starts from the beginning of the server buffer.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.cursor = 0;
    }

    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn toggle_paused(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Default for LogFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// `[time] level msg {attrs}` — the attrs suffix appears only when the record
/// carries attributes.
pub fn format_record(record: &LogRecord) -> String {
    let attrs = match &record.attrs {
        Some(attrs) => format!(
            " {}",
            serde_json::to_string(attrs).unwrap_or_else(|_| "{}".to_string())
        ),
        None => String::new(),
    };
    format!(
        "[{}] {} {}{}",
        record.time_utc, record.level, record.msg, attrs
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(id: u64, msg: &str) -> String {
        format!(
            r#"{{"id":{id},"time_utc":"2026-08-28T10:00:00Z","level":"info","msg":"{msg}"}}"#
        )
    }

    #[test]
    fn formats_records_in_order_and_advances_cursor() {
        let mut feed = LogFeed::new();
        for id in 1..=3 {
            assert!(feed.apply_payload(&payload(id, "hello")));
        }
        assert_eq!(feed.cursor(), 3);
        assert_eq!(feed.len(), 3);
        let lines: Vec<&str> = feed.lines().collect();
        assert_eq!(lines[0], "[2026-08-28T10:00:00Z] info hello");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn cursor_never_decreases_on_out_of_order_ids() {
        let mut feed = LogFeed::new();
        feed.apply_payload(&payload(9, "late"));
        feed.apply_payload(&payload(4, "early"));
        assert_eq!(feed.cursor(), 9);
        assert_eq!(feed.len(), 2);
    }

    #[test]
    fn capacity_is_enforced_with_fifo_eviction() {
        let mut feed = LogFeed::with_capacity(5);
        for id in 1..=8 {
            feed.apply_payload(&payload(id, &format!("line-{id}")));
        }
        assert_eq!(feed.len(), 5);
        assert_eq!(feed.cursor(), 8);
        // ids 1..=3 evicted; oldest surviving line came from id 4
        let lines: Vec<&str> = feed.lines().collect();
        assert!(lines[0].ends_with("line-4"));
        assert!(lines[4].ends_with("line-8"));
    }

    #[test]
    fn never_exceeds_default_capacity() {
        let mut feed = LogFeed::new();
        for id in 1..=(LOG_FEED_CAPACITY as u64 + 50) {
            feed.apply_payload(&payload(id, "line"));
        }
        assert_eq!(feed.len(), LOG_FEED_CAPACITY);
    }

    #[test]
    fn malformed_payload_kept_verbatim_without_cursor_change() {
        let mut feed = LogFeed::new();
        feed.apply_payload(&payload(5, "ok"));
        feed.apply_payload("not json");
        assert_eq!(feed.cursor(), 5);
        let lines: Vec<&str> = feed.lines().collect();
        assert_eq!(lines[1], "not json");
    }

    #[test]
    fn paused_drops_without_buffering_or_cursor_change() {
        let mut feed = LogFeed::new();
        feed.apply_payload(&payload(1, "before"));
        feed.set_paused(true);
        assert!(!feed.apply_payload(&payload(2, "dropped")));
        assert!(!feed.apply_payload("not json"));
        assert_eq!(feed.cursor(), 1);
        assert_eq!(feed.len(), 1);

        feed.set_paused(false);
        assert!(feed.apply_payload(&payload(3, "after")));
        assert_eq!(feed.cursor(), 3);
        // no replay of what was dropped while paused
        assert_eq!(feed.len(), 2);
    }

    #[test]
    fn clear_resets_cursor_and_lines() {
        let mut feed = LogFeed::new();
        feed.apply_payload(&payload(12, "x"));
        feed.clear();
        assert!(feed.is_empty());
        assert_eq!(feed.cursor(), 0);
    }

    #[test]
    fn attrs_are_rendered_as_json_suffix() {
        let record: LogRecord = serde_json::from_str(
            r#"{"id":1,"time_utc":"t","level":"warn","msg":"m","attrs":{"node":"a-1"}}"#,
        )
        .expect("parse record");
        assert_eq!(format_record(&record), r#"[t] warn m {"node":"a-1"}"#);
    }
}
