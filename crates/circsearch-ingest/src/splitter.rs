//! Streaming record splitter.
//!
//! The source is a flat, loosely structured file: `<item id="N">` … `</item>`
//! blocks spread over one or more lines, interleaved with lines that belong
//! to no record. A general XML parser rejects such a file, so records are cut
//! out line by line with a two-state marker automaton and only complete
//! blocks are handed on.
//!
//! ```text
//!            start tag                    end tag
//!  Outside ─────────────► Inside ─────────────────► Outside (yield unit)
//!     ▲ other lines ┘        ▲ other lines (buffered) ┘
//! ```
//!
//! A self-closing start tag is a complete block on its own. Whatever follows
//! a block's end tag on the same line is fed back to the automaton, so a
//! line such as `</item><item id="2">` closes one block and opens the next.
//! A block still open at end of stream is dropped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::iter::FusedIterator;
use std::path::Path;
use std::sync::LazyLock;

use circsearch_core::error::{IngestError, IngestResult};
use regex::Regex;
use tracing::{debug, trace};

static START_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<item\s+id\s*=\s*["']?\d+["']?[^>]*>"#).expect("start tag pattern compiles")
});

static END_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</item\s*>").expect("end tag pattern compiles"));

/// One complete record block, start and end tags included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecordUnit {
    text: String,
    line: usize,
}

impl RawRecordUnit {
    /// Wrap already-delimited record text. `line` is the 1-based line of the
    /// start tag and is only used in diagnostics.
    #[must_use]
    pub fn new(text: impl Into<String>, line: usize) -> Self {
        Self {
            text: text.into(),
            line,
        }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// 1-based source line of the start tag.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.line
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SplitState {
    Outside,
    Inside,
}

/// Lazy, non-restartable iterator over the record units of a line stream.
///
/// Yields units in source order. A read failure is yielded once as an error,
/// after which the iterator is exhausted.
#[derive(Debug)]
pub struct RecordSplitter<R> {
    reader: R,
    state: SplitState,
    buffer: String,
    pending: Option<String>,
    line_buf: Vec<u8>,
    line_no: usize,
    unit_line: usize,
    dropped_fragments: usize,
    finished: bool,
}

impl RecordSplitter<BufReader<File>> {
    /// Open a source file for splitting.
    ///
    /// # Errors
    ///
    /// Returns `IngestError::SourceMissing` if `path` is not an existing
    /// regular file and `IngestError::SourceUnavailable` if it cannot be
    /// opened for reading.
    pub fn open(path: &Path) -> IngestResult<Self> {
        if !path.is_file() {
            return Err(IngestError::SourceMissing {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path).map_err(|source| IngestError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> RecordSplitter<R> {
    #[must_use]
    pub const fn new(reader: R) -> Self {
        Self {
            reader,
            state: SplitState::Outside,
            buffer: String::new(),
            pending: None,
            line_buf: Vec::new(),
            line_no: 0,
            unit_line: 0,
            dropped_fragments: 0,
            finished: false,
        }
    }

    /// Unterminated blocks discarded at end of stream (zero or one).
    #[must_use]
    pub const fn dropped_fragments(&self) -> usize {
        self.dropped_fragments
    }

    /// Lines consumed so far.
    #[must_use]
    pub const fn lines_read(&self) -> usize {
        self.line_no
    }

    fn read_line(&mut self) -> IngestResult<Option<String>> {
        self.line_buf.clear();
        match self.reader.read_until(b'\n', &mut self.line_buf) {
            Ok(0) => Ok(None),
            Ok(_) => {
                self.line_no += 1;
                Ok(Some(String::from_utf8_lossy(&self.line_buf).into_owned()))
            }
            Err(source) => Err(IngestError::SourceRead {
                line: self.line_no + 1,
                source,
            }),
        }
    }

    /// Feed one line to the automaton. Returns the unit this line completed.
    fn step(&mut self, line: &str) -> Option<RawRecordUnit> {
        match self.state {
            SplitState::Outside => {
                let start = START_TAG.find(line)?;
                self.unit_line = self.line_no;
                self.buffer.clear();
                if start.as_str().ends_with("/>") {
                    self.buffer.push_str(start.as_str());
                    self.hold_rest(&line[start.end()..]);
                    return Some(self.take_unit());
                }
                self.state = SplitState::Inside;
                self.append_or_close(&line[start.start()..])
            }
            SplitState::Inside => self.append_or_close(line),
        }
    }

    fn append_or_close(&mut self, segment: &str) -> Option<RawRecordUnit> {
        let Some(end) = END_TAG.find_iter(segment).last() else {
            self.buffer.push_str(segment);
            return None;
        };
        self.buffer.push_str(&segment[..end.end()]);
        self.state = SplitState::Outside;
        self.hold_rest(&segment[end.end()..]);
        Some(self.take_unit())
    }

    /// Keep the rest of a line for the next step if another block starts in it.
    fn hold_rest(&mut self, rest: &str) {
        if START_TAG.is_match(rest) {
            self.pending = Some(rest.to_owned());
        }
    }

    fn take_unit(&mut self) -> RawRecordUnit {
        trace!(line = self.unit_line, "record unit complete");
        RawRecordUnit {
            text: std::mem::take(&mut self.buffer),
            line: self.unit_line,
        }
    }

    fn finish(&mut self) {
        self.finished = true;
        if self.state == SplitState::Inside {
            debug!(
                line = self.unit_line,
                bytes = self.buffer.len(),
                "dropping unterminated record at end of stream"
            );
            self.dropped_fragments += 1;
            self.buffer.clear();
            self.state = SplitState::Outside;
        }
    }
}

impl<R: BufRead> Iterator for RecordSplitter<R> {
    type Item = IngestResult<RawRecordUnit>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            if let Some(rest) = self.pending.take() {
                if let Some(unit) = self.step(&rest) {
                    return Some(Ok(unit));
                }
                continue;
            }
            match self.read_line() {
                Ok(Some(line)) => {
                    if let Some(unit) = self.step(&line) {
                        return Some(Ok(unit));
                    }
                }
                Ok(None) => {
                    self.finish();
                    return None;
                }
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

impl<R: BufRead> FusedIterator for RecordSplitter<R> {}
