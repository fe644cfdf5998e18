use log::warn;

/// Upper bound on the buffered partial record. A source that never sends a
/// newline is a wedged or misconfigured instrument, not a record; its
/// backlog is discarded instead of growing without bound.
pub const MAX_PENDING_BYTES: usize = 64 * 1024;

/// Splits an arbitrarily chunked text stream into complete newline-terminated
/// records, keeping the trailing partial record for the next chunk.
///
/// Correctness depends only on the eventual concatenation of chunks, not on
/// chunk granularity: a numeric field, a delimiter, or the newline itself may
/// be split across calls.
#[derive(Debug, Default)]
pub struct LineAssembler {
    pending: String,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and returns every completed record, trimmed.
    ///
    /// Records that trim to empty are still emitted; filtering them is the
    /// parser's job, which keeps this stage transport-agnostic. Never blocks,
    /// never fails.
    pub fn feed(&mut self, chunk: &str) -> Vec<String> {
        self.pending.push_str(chunk);
        let records = if self.pending.contains('\n') {
            let mut segments: Vec<&str> = self.pending.split('\n').collect();
            // The last segment (possibly empty) has no terminating newline yet.
            let remainder = segments.pop().unwrap_or("").to_owned();
            let records = segments.iter().map(|s| s.trim().to_owned()).collect();
            self.pending = remainder;
            records
        } else {
            Vec::new()
        };
        if self.pending.len() > MAX_PENDING_BYTES {
            warn!(
                "discarding {} buffered bytes with no record terminator",
                self.pending.len()
            );
            self.pending.clear();
        }
        records
    }

    /// Drops any partial record. Called on connect and clear, when the
    /// buffered tail belongs to a previous session.
    pub fn reset(&mut self) {
        self.pending.clear();
    }

    #[cfg(test)]
    fn pending(&self) -> &str {
        &self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_lines_come_out_in_order() {
        let mut asm = LineAssembler::new();
        let records = asm.feed("1,2\n3,4\n");
        assert_eq!(records, vec!["1,2".to_owned(), "3,4".to_owned()]);
        assert_eq!(asm.pending(), "");
    }

    #[test]
    fn trailing_partial_record_is_retained() {
        let mut asm = LineAssembler::new();
        let records = asm.feed("1,2\n3,");
        assert_eq!(records, vec!["1,2".to_owned()]);
        assert_eq!(asm.pending(), "3,");
        let records = asm.feed("4\n");
        assert_eq!(records, vec!["3,4".to_owned()]);
    }

    #[test]
    fn split_mid_field_mid_delimiter_and_mid_newline() {
        let mut asm = LineAssembler::new();
        assert!(asm.feed("12.").is_empty());
        assert!(asm.feed("5").is_empty());
        assert!(asm.feed(",").is_empty());
        assert!(asm.feed("7\r").is_empty());
        let records = asm.feed("\n");
        assert_eq!(records, vec!["12.5,7".to_owned()]);
    }

    #[test]
    fn crlf_line_endings_are_trimmed() {
        let mut asm = LineAssembler::new();
        let records = asm.feed("1,2\r\n3,4\r\n");
        assert_eq!(records, vec!["1,2".to_owned(), "3,4".to_owned()]);
    }

    #[test]
    fn blank_lines_are_emitted_not_filtered() {
        let mut asm = LineAssembler::new();
        let records = asm.feed("\n  \n1\n");
        assert_eq!(records, vec![String::new(), String::new(), "1".to_owned()]);
    }

    #[test]
    fn pending_never_holds_a_newline_after_feed() {
        let mut asm = LineAssembler::new();
        asm.feed("a\nb\nc");
        assert!(!asm.pending().contains('\n'));
        asm.feed("\n\nd");
        assert!(!asm.pending().contains('\n'));
    }

    #[test]
    fn newline_free_noise_cannot_grow_the_buffer_unbounded() {
        let mut asm = LineAssembler::new();
        let noise = "x".repeat(4096);
        for _ in 0..20 {
            assert!(asm.feed(&noise).is_empty());
            assert!(asm.pending().len() <= MAX_PENDING_BYTES);
        }
        // The wedged backlog was discarded; the stream recovers as soon as
        // terminated records arrive again.
        let records = asm.feed("1,2\n");
        assert_eq!(records, vec!["1,2".to_owned()]);
    }

    #[test]
    fn lines_under_the_cap_are_unaffected_by_it() {
        let mut asm = LineAssembler::new();
        let long_field = "9".repeat(MAX_PENDING_BYTES / 2);
        assert!(asm.feed(&long_field).is_empty());
        let records = asm.feed("\n");
        assert_eq!(records, vec![long_field]);
    }

    #[test]
    fn reset_drops_the_partial_tail() {
        let mut asm = LineAssembler::new();
        asm.feed("half a rec");
        asm.reset();
        let records = asm.feed("1,2\n");
        assert_eq!(records, vec!["1,2".to_owned()]);
    }
}
