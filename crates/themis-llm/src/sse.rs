use std::collections::VecDeque;

/// One decoded server-sent-event frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseFrame {
    /// Joined `data:` payload of a frame
    Data(String),
    /// Literal `[DONE]` sentinel
    Done,
}

/// Incremental SSE decoder over arbitrary byte chunks
///
/// Frames are delimited by a blank line. Carriage returns are dropped on
/// input so `\r\n\r\n` delimiters work too. Frames that are not valid UTF-8
/// or carry no `data:` line are skipped and counted.
pub struct SseDecoder {
    buffer: VecDeque<u8>,
    /// Bytes already searched for a delimiter
    scanned: usize,
    skipped: u64,
}

impl SseDecoder {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            scanned: 0,
            skipped: 0,
        }
    }

    /// Feed bytes and return every frame completed by them
    pub fn push(&mut self, bytes: &[u8]) -> Vec<SseFrame> {
        self.buffer.extend(bytes.iter().copied().filter(|&b| b != b'\r'));

        let mut frames = Vec::new();
        while let Some(end) = self.frame_end() {
            let raw: Vec<u8> = self.buffer.drain(..end + 2).collect();
            self.scanned = 0;
            if let Some(frame) = self.decode(&raw[..end]) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Decode whatever is left once the byte stream ends
    pub fn finish(&mut self) -> Option<SseFrame> {
        self.scanned = 0;
        if self.buffer.iter().all(|b| b.is_ascii_whitespace()) {
            self.buffer.clear();
            return None;
        }
        let raw: Vec<u8> = self.buffer.drain(..).collect();
        self.decode(&raw)
    }

    /// Frames dropped because they could not be decoded
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    fn frame_end(&mut self) -> Option<usize> {
        let len = self.buffer.len();
        // the last scanned byte may open a delimiter finished by this chunk
        let start = self.scanned.saturating_sub(1);
        let end = (start..len.saturating_sub(1))
            .find(|&i| self.buffer[i] == b'\n' && self.buffer[i + 1] == b'\n');
        if end.is_none() {
            self.scanned = len;
        }
        end
    }

    fn decode(&mut self, raw: &[u8]) -> Option<SseFrame> {
        let Ok(text) = std::str::from_utf8(raw) else {
            self.skipped += 1;
            tracing::debug!("Skipping SSE frame with invalid UTF-8");
            return None;
        };

        let data: Vec<&str> = text
            .lines()
            .filter_map(|line| line.strip_prefix("data:"))
            .map(|d| d.strip_prefix(' ').unwrap_or(d))
            .collect();

        if data.is_empty() {
            // comments, `event:` or `id:` only frames
            return None;
        }

        let payload = data.join("\n");
        if payload.trim() == "[DONE]" {
            Some(SseFrame::Done)
        } else {
            Some(SseFrame::Data(payload))
        }
    }
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_capacity(4096)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_split_across_chunks() {
        let mut decoder = SseDecoder::default();

        assert!(decoder.push(b"data: {\"a\"").is_empty());
        let frames = decoder.push(b":1}\n\ndata: [DONE]\n\n");

        assert_eq!(
            frames,
            vec![SseFrame::Data("{\"a\":1}".to_string()), SseFrame::Done]
        );
    }

    #[test]
    fn test_crlf_delimiters() {
        let mut decoder = SseDecoder::default();
        let frames = decoder.push(b"data: one\r\n\r\ndata: two\r\n\r\n");
        assert_eq!(
            frames,
            vec![SseFrame::Data("one".to_string()), SseFrame::Data("two".to_string())]
        );
    }

    #[test]
    fn test_multiline_data_is_joined() {
        let mut decoder = SseDecoder::default();
        let frames = decoder.push(b"event: x\ndata: a\ndata: b\n\n");
        assert_eq!(frames, vec![SseFrame::Data("a\nb".to_string())]);
    }

    #[test]
    fn test_comment_frames_ignored() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b": keep-alive\n\n").is_empty());
        assert_eq!(decoder.skipped(), 0);
    }

    #[test]
    fn test_invalid_utf8_skipped_and_counted() {
        let mut decoder = SseDecoder::default();
        let frames = decoder.push(b"data: \xff\xfe\n\ndata: ok\n\n");
        assert_eq!(frames, vec![SseFrame::Data("ok".to_string())]);
        assert_eq!(decoder.skipped(), 1);
    }

    #[test]
    fn test_finish_flushes_unterminated_frame() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b"data: [DONE]").is_empty());
        assert_eq!(decoder.finish(), Some(SseFrame::Done));
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_byte_at_a_time_frame_resumes_scan() {
        let payload = "x".repeat(8192);
        let body = format!("data: {payload}\n\ndata: [DONE]\n\n");
        let mut decoder = SseDecoder::default();

        let mut frames = Vec::new();
        for byte in body.as_bytes() {
            frames.extend(decoder.push(std::slice::from_ref(byte)));
            assert!(decoder.scanned <= decoder.buffer.len());
        }

        assert_eq!(frames, vec![SseFrame::Data(payload), SseFrame::Done]);
        assert!(decoder.buffer.is_empty());
    }

    #[test]
    fn test_delimiter_split_across_chunks() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b"data: a\n").is_empty());
        assert_eq!(decoder.push(b"\n"), vec![SseFrame::Data("a".to_string())]);
    }
}
