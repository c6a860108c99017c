//! Display and diagnostic output
//!
//! Both outputs are write-only and best effort. A failing display or
//! diagnostic channel is counted and logged, never propagated: lap counting
//! does not depend on anyone seeing the result.

use log::warn;
use thiserror::Error;

use crate::controller::LapEvent;
use crate::roster::Roster;

/// Row 0 while the clock is being acquired
pub const STATUS_STARTING: &str = "INICIANDO";
/// Row 1 once the clock answered
pub const STATUS_CLOCK_READY: &str = "RTC iniciado";
/// Row 0 of the halt screen
pub const STATUS_CLOCK_FAILED: &str = "RTC nao iniciado";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresentationError {
    #[error("cursor ({col}, {row}) outside the display")]
    CursorOutOfRange { col: u8, row: u8 },
    #[error("output write failed: {0}")]
    Write(String),
}

/// Character display collaborator
pub trait LapDisplay {
    fn clear(&mut self) -> Result<(), PresentationError>;
    fn set_cursor(&mut self, col: u8, row: u8) -> Result<(), PresentationError>;
    fn print(&mut self, text: &str) -> Result<(), PresentationError>;
}

/// Line-oriented diagnostic channel
pub trait DiagnosticSink {
    /// Append to the current line
    fn print(&mut self, text: &str) -> Result<(), PresentationError>;
    /// Append and terminate the current line
    fn println(&mut self, text: &str) -> Result<(), PresentationError>;
}

/// Display row 0: lap number and short code
pub fn status_line(event: &LapEvent) -> String {
    format!("Volta: {} {}", event.lap_number, event.vehicle.short_code)
}

/// Diagnostic line for one lap
pub fn lap_log_line(event: &LapEvent) -> String {
    format!(
        "Volta detectada: {} - Carro: {} - Hora: {}",
        event.lap_number, event.vehicle.name, event.timestamp
    )
}

/// Failure counters for the two outputs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishStats {
    pub display_failures: u32,
    pub diagnostic_failures: u32,
}

/// Fans lap events and status messages out to the optional outputs
pub struct LapPublisher<D, G> {
    display: Option<D>,
    diagnostics: Option<G>,
    stats: PublishStats,
}

impl<D: LapDisplay, G: DiagnosticSink> LapPublisher<D, G> {
    /// Either output may be absent (not fitted, failed to initialize, or
    /// diagnostics disabled in config)
    pub fn new(display: Option<D>, diagnostics: Option<G>) -> Self {
        Self {
            display,
            diagnostics,
            stats: PublishStats::default(),
        }
    }

    pub fn disable_diagnostics(&mut self) {
        self.diagnostics = None;
    }

    /// Write a status message on one display row, leaving the other untouched
    pub fn show_status(&mut self, row: u8, text: &str) {
        self.with_display(|d| {
            d.set_cursor(0, row)?;
            d.print(text)
        });
    }

    /// Replace the whole screen with a single message
    pub fn show_halt(&mut self, text: &str) {
        self.with_display(|d| {
            d.clear()?;
            d.set_cursor(0, 0)?;
            d.print(text)
        });
    }

    /// One diagnostic line per vehicle with its loaded count
    pub fn publish_roster(&mut self, roster: &Roster, counts: &[u16]) {
        for (vehicle, count) in roster.iter().zip(counts) {
            self.with_diagnostics(|g| {
                g.print(&format!("Carro: {}", vehicle.name))?;
                g.println(&format!(", Voltas iniciais: {}", count))
            });
        }
    }

    /// Two-line lap screen plus one diagnostic line
    pub fn publish_lap(&mut self, event: &LapEvent) {
        let status = status_line(event);
        let time = event.timestamp.to_string();
        self.with_display(|d| {
            d.clear()?;
            d.set_cursor(0, 0)?;
            d.print(&status)?;
            d.set_cursor(0, 1)?;
            d.print(&time)
        });

        let line = lap_log_line(event);
        self.with_diagnostics(|g| g.println(&line));
    }

    pub fn display(&self) -> Option<&D> {
        self.display.as_ref()
    }

    pub fn diagnostics(&self) -> Option<&G> {
        self.diagnostics.as_ref()
    }

    pub fn stats(&self) -> PublishStats {
        self.stats
    }

    fn with_display<F>(&mut self, f: F)
    where
        F: FnOnce(&mut D) -> Result<(), PresentationError>,
    {
        let Some(display) = self.display.as_mut() else {
            return;
        };
        if let Err(e) = f(display) {
            self.stats.display_failures += 1;
            warn!("Display update skipped: {}", e);
        }
    }

    fn with_diagnostics<F>(&mut self, f: F)
    where
        F: FnOnce(&mut G) -> Result<(), PresentationError>,
    {
        let Some(diagnostics) = self.diagnostics.as_mut() else {
            return;
        };
        if let Err(e) = f(diagnostics) {
            self.stats.diagnostic_failures += 1;
            warn!("Diagnostic output skipped: {}", e);
        }
    }
}
