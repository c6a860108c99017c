//! In-memory and log-backed output implementations
//!
//! Used by the host-side simulation and tests, and by firmware for the
//! diagnostic channel (routed through the `log` facade).

use log::info;

use crate::presentation::{DiagnosticSink, LapDisplay, PresentationError};

/// Log target for diagnostic lines
pub const DIAGNOSTICS_TARGET: &str = "lap_counter::diagnostics";

/// Character grid with the semantics of a small LCD: the cursor advances
/// left to right and text past the end of a row is dropped.
#[derive(Debug, Clone)]
pub struct TextDisplay {
    cols: u8,
    rows: u8,
    cells: Vec<char>,
    cursor: (u8, u8),
}

impl TextDisplay {
    pub fn new(cols: u8, rows: u8) -> Self {
        Self {
            cols,
            rows,
            cells: vec![' '; cols as usize * rows as usize],
            cursor: (0, 0),
        }
    }

    /// 16 columns by 2 rows
    pub fn lcd1602() -> Self {
        Self::new(16, 2)
    }

    /// Row contents without trailing blanks
    pub fn row_text(&self, row: u8) -> String {
        if row >= self.rows {
            return String::new();
        }
        let start = row as usize * self.cols as usize;
        let line: String = self.cells[start..start + self.cols as usize].iter().collect();
        line.trim_end().to_string()
    }

    pub fn size(&self) -> (u8, u8) {
        (self.cols, self.rows)
    }
}

impl LapDisplay for TextDisplay {
    fn clear(&mut self) -> Result<(), PresentationError> {
        self.cells.fill(' ');
        self.cursor = (0, 0);
        Ok(())
    }

    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), PresentationError> {
        if col >= self.cols || row >= self.rows {
            return Err(PresentationError::CursorOutOfRange { col, row });
        }
        self.cursor = (col, row);
        Ok(())
    }

    fn print(&mut self, text: &str) -> Result<(), PresentationError> {
        let (mut col, row) = self.cursor;
        for ch in text.chars() {
            if col >= self.cols {
                break;
            }
            self.cells[row as usize * self.cols as usize + col as usize] = ch;
            col += 1;
        }
        self.cursor = (col, row);
        Ok(())
    }
}

/// Collects completed diagnostic lines
#[derive(Debug, Clone, Default)]
pub struct LineRecorder {
    pending: String,
    lines: Vec<String>,
}

impl LineRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl DiagnosticSink for LineRecorder {
    fn print(&mut self, text: &str) -> Result<(), PresentationError> {
        self.pending.push_str(text);
        Ok(())
    }

    fn println(&mut self, text: &str) -> Result<(), PresentationError> {
        self.pending.push_str(text);
        self.lines.push(core::mem::take(&mut self.pending));
        Ok(())
    }
}

/// Emits each completed line as an `info!` record on [`DIAGNOSTICS_TARGET`]
#[derive(Debug, Default)]
pub struct LogDiagnostics {
    pending: String,
}

impl LogDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiagnosticSink for LogDiagnostics {
    fn print(&mut self, text: &str) -> Result<(), PresentationError> {
        self.pending.push_str(text);
        Ok(())
    }

    fn println(&mut self, text: &str) -> Result<(), PresentationError> {
        self.pending.push_str(text);
        info!(target: DIAGNOSTICS_TARGET, "{}", self.pending);
        self.pending.clear();
        Ok(())
    }
}
