//! Output targets for status reports.

use std::io::{self, Write};

use super::report::StatusReport;

/// Where status reports go.
pub trait ReportSink {
    /// Write one report, returning how many lines it occupies.
    fn emit(&mut self, report: &StatusReport) -> io::Result<usize>;

    /// Prepare to overwrite the previous report of `lines` lines.
    fn rewind(&mut self, lines: usize) -> io::Result<()>;
}

/// Text block for a terminal, redrawn in place with cursor movement.
pub struct TerminalSink<W> {
    out: W,
    rewind: bool,
}

impl<W: Write> TerminalSink<W> {
    /// `rewind` selects in-place redraw; without it successive reports are
    /// appended, which suits pipes and log files.
    pub fn new(out: W, rewind: bool) -> Self {
        Self { out, rewind }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for TerminalSink<W> {
    fn emit(&mut self, report: &StatusReport) -> io::Result<usize> {
        let lines = report.lines();
        for line in &lines {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()?;
        Ok(lines.len())
    }

    fn rewind(&mut self, lines: usize) -> io::Result<()> {
        if self.rewind && lines > 0 {
            // Carriage return, then cursor up `lines` rows.
            write!(self.out, "\r\x1b[{lines}A")?;
        }
        Ok(())
    }
}

/// One JSON object per report, newline delimited.
pub struct JsonSink<W> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for JsonSink<W> {
    fn emit(&mut self, report: &StatusReport) -> io::Result<usize> {
        serde_json::to_writer(&mut self.out, report)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(1)
    }

    fn rewind(&mut self, _lines: usize) -> io::Result<()> {
        Ok(())
    }
}
