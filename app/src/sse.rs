//! Server-sent-event framing for scrape events.

use harvest_scanner::ScrapeEvent;
use std::io::{self, Write};

/// One `data:` frame, terminated by a blank line.
pub fn frame(event: &ScrapeEvent) -> serde_json::Result<String> {
    Ok(format!("data: {}\n\n", serde_json::to_string(event)?))
}

/// Writes frames to an output and flushes after each one.
pub struct SseWriter<W: Write> {
    out: W,
}

impl<W: Write> SseWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn send(&mut self, event: &ScrapeEvent) -> io::Result<()> {
        let frame = frame(event).map_err(io::Error::other)?;
        self.out.write_all(frame.as_bytes())?;
        self.out.flush()
    }
}
