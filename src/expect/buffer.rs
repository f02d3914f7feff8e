use super::{Match, Pattern};
use crate::models::MAX_OUTPUT_BUFFER_SIZE;

/// Output received from the child that no wait has consumed yet.
#[derive(Debug, Default)]
pub struct OutputBuffer {
    text: String,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of output, dropping the oldest text once the buffer
    /// grows past its limit.
    pub fn push(&mut self, chunk: &str) {
        self.text.push_str(chunk);
        if self.text.len() > MAX_OUTPUT_BUFFER_SIZE {
            let mut cut = self.text.len() - MAX_OUTPUT_BUFFER_SIZE;
            while !self.text.is_char_boundary(cut) {
                cut += 1;
            }
            self.text.drain(..cut);
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Search for the patterns and consume through the winning match.
    ///
    /// The match starting earliest in the buffer wins; on a tie the pattern
    /// listed first wins. Nothing is consumed when no pattern matches.
    pub fn take_match(&mut self, patterns: &[&Pattern]) -> Option<Match> {
        let mut best: Option<(usize, usize, usize)> = None;
        for (index, pattern) in patterns.iter().enumerate() {
            if let Some((start, end)) = pattern.find(&self.text) {
                match best {
                    Some((_, best_start, _)) if best_start <= start => {}
                    _ => best = Some((index, start, end)),
                }
            }
        }

        let (index, start, end) = best?;
        let matched = self.text[start..end].to_string();
        let before = self.text[..start].to_string();
        self.text.drain(..end);
        Some(Match {
            index,
            before,
            matched,
        })
    }

    /// Consume everything left, used once the stream has ended.
    pub fn take_all(&mut self) -> String {
        std::mem::take(&mut self.text)
    }
}
