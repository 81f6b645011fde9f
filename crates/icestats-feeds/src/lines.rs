//! Line reassembly for the stats feed.
//!
//! Chunks arrive with no alignment to line boundaries. [`LineBuffer`] scans
//! each chunk for `\r` / `\n`, completes the line carried over from the
//! previous chunk, and keeps the unterminated tail for the next one. Work is
//! done on bytes so a multi-byte character split between chunks survives;
//! each complete line is then decoded as lossy UTF-8 and trimmed.

/// Carry-over state between chunks of a single feed connection.
#[derive(Debug, Default, Clone)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one chunk and return the complete, trimmed, non-empty lines it
    /// terminates, in arrival order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        let mut start = 0;
        for (i, &b) in chunk.iter().enumerate() {
            if b != b'\n' && b != b'\r' {
                continue;
            }
            let segment = &chunk[start..i];
            if self.pending.is_empty() {
                push_line(&mut lines, segment);
            } else {
                self.pending.extend_from_slice(segment);
                let whole = std::mem::take(&mut self.pending);
                push_line(&mut lines, &whole);
            }
            start = i + 1;
        }
        self.pending.extend_from_slice(&chunk[start..]);
        lines
    }

    /// Bytes of the unterminated line carried into the next chunk.
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    /// Take the unterminated tail as a line, as if a terminator had arrived.
    pub fn flush(&mut self) -> Option<String> {
        let tail = std::mem::take(&mut self.pending);
        let mut lines = Vec::with_capacity(1);
        push_line(&mut lines, &tail);
        lines.pop()
    }
}

fn push_line(lines: &mut Vec<String>, bytes: &[u8]) {
    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        lines.push(trimmed.to_string());
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
