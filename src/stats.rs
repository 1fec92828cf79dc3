//! Statistics collection and export.
//!
//! A [`StatsCollector`] is fed every [`CycleReport`] of a run and keeps
//! running totals that can be exported to JSON or CSV, or printed as a
//! human-readable summary.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

use crate::report::{CycleReport, Diagnostic};
use crate::types::Cycle;

/// Aggregate statistics for a simulation run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SimulationStats {
    /// Run metadata
    pub metadata: SimulationMetadata,

    /// Evaluation counters
    pub evaluation: EvaluationStats,

    /// Timing statistics
    pub timing: TimingStats,
}

/// Metadata about the simulation run.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SimulationMetadata {
    /// Run name
    pub name: String,

    /// Start time (seconds since the epoch)
    pub start_time: Option<String>,

    /// End time (seconds since the epoch)
    pub end_time: Option<String>,

    /// Crate version
    pub version: String,
}

/// Counters accumulated from cycle reports.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationStats {
    /// Cycles completed
    pub cycles: u64,

    /// Last completed cycle
    pub final_cycle: Cycle,

    /// Settle iterations over all cycles
    pub total_iterations: u64,

    /// Most iterations spent in one cycle
    pub peak_iterations: u32,

    /// Conflicting nets over all cycles
    pub conflicts: u64,

    /// Cycles with at least one non-converged phase
    pub oscillating_cycles: u64,

    /// Blocks found inert
    pub unresolved_blocks: u64,

    /// Ticks rolled back by cancellation
    pub cancelled_ticks: u64,
}

/// Timing/performance statistics.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TimingStats {
    /// Total wall-clock time in milliseconds
    pub total_wall_time_ms: f64,

    /// Cycles per wall-clock second
    pub cycles_per_second: f64,

    /// Settle iterations per wall-clock second
    pub iterations_per_second: f64,
}

impl SimulationStats {
    /// Creates a new empty statistics container.
    pub fn new() -> Self {
        Self {
            metadata: SimulationMetadata {
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Sets the run name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.metadata.name = name.into();
        self
    }

    /// Records the start time.
    pub fn record_start(&mut self) {
        self.metadata.start_time = Some(timestamp());
    }

    /// Records the end time.
    pub fn record_end(&mut self) {
        self.metadata.end_time = Some(timestamp());
    }

    /// Updates timing statistics from the wall-clock duration of the run.
    pub fn compute_timing(&mut self, wall_time_ms: f64) {
        self.timing.total_wall_time_ms = wall_time_ms;

        if wall_time_ms > 0.0 {
            let seconds = wall_time_ms / 1000.0;
            self.timing.cycles_per_second = self.evaluation.cycles as f64 / seconds;
            self.timing.iterations_per_second = self.evaluation.total_iterations as f64 / seconds;
        }
    }

    /// Mean settle iterations per cycle.
    pub fn mean_iterations(&self) -> f64 {
        if self.evaluation.cycles == 0 {
            0.0
        } else {
            self.evaluation.total_iterations as f64 / self.evaluation.cycles as f64
        }
    }

    /// Exports statistics to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Exports statistics to a JSON file.
    pub fn to_json_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        let json = self
            .to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, json)
    }

    /// Exports summary statistics to CSV.
    pub fn to_csv(&self) -> String {
        let e = &self.evaluation;
        let mut csv = String::from("metric,value\n");

        csv.push_str(&format!("cycles,{}\n", e.cycles));
        csv.push_str(&format!("final_cycle,{}\n", e.final_cycle));
        csv.push_str(&format!("total_iterations,{}\n", e.total_iterations));
        csv.push_str(&format!("peak_iterations,{}\n", e.peak_iterations));
        csv.push_str(&format!("conflicts,{}\n", e.conflicts));
        csv.push_str(&format!("oscillating_cycles,{}\n", e.oscillating_cycles));
        csv.push_str(&format!("unresolved_blocks,{}\n", e.unresolved_blocks));
        csv.push_str(&format!("cancelled_ticks,{}\n", e.cancelled_ticks));

        csv.push_str(&format!("wall_time_ms,{:.2}\n", self.timing.total_wall_time_ms));
        csv.push_str(&format!("cycles_per_second,{:.2}\n", self.timing.cycles_per_second));

        csv
    }

    /// Exports summary statistics to a CSV file.
    pub fn to_csv_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        std::fs::write(path, self.to_csv())
    }

    /// Writes a human-readable summary to a writer.
    pub fn write_summary<W: Write>(&self, mut w: W) -> std::io::Result<()> {
        writeln!(w, "=== Simulation Statistics ===")?;
        writeln!(w)?;

        if !self.metadata.name.is_empty() {
            writeln!(w, "Name: {}", self.metadata.name)?;
        }
        if let Some(ref start) = self.metadata.start_time {
            writeln!(w, "Started: {}", start)?;
        }
        if let Some(ref end) = self.metadata.end_time {
            writeln!(w, "Ended: {}", end)?;
        }
        writeln!(w)?;

        let e = &self.evaluation;
        writeln!(w, "--- Evaluation ---")?;
        writeln!(w, "Cycles: {}", e.cycles)?;
        writeln!(
            w,
            "Iterations: {} (mean {:.2}, peak {})",
            e.total_iterations,
            self.mean_iterations(),
            e.peak_iterations
        )?;
        writeln!(w, "Conflicts: {}", e.conflicts)?;
        writeln!(w, "Oscillating cycles: {}", e.oscillating_cycles)?;
        writeln!(w, "Unresolved blocks: {}", e.unresolved_blocks)?;
        writeln!(w, "Cancelled ticks: {}", e.cancelled_ticks)?;
        writeln!(w)?;

        writeln!(w, "--- Timing ---")?;
        writeln!(w, "Wall time: {:.2} ms", self.timing.total_wall_time_ms)?;
        writeln!(w, "Cycles/sec: {:.2}", self.timing.cycles_per_second)?;

        Ok(())
    }

    /// Returns the summary as a string.
    pub fn summary(&self) -> String {
        let mut buf = Vec::new();
        if self.write_summary(&mut buf).is_err() {
            return String::new();
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// A simple timer for measuring wall-clock time.
#[derive(Debug)]
pub struct Timer {
    start: std::time::Instant,
}

impl Timer {
    /// Starts a new timer.
    pub fn start() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }

    /// Returns elapsed time in milliseconds.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Returns elapsed time in seconds.
    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::start()
    }
}

fn timestamp() -> String {
    let now = std::time::SystemTime::now();
    let duration = now.duration_since(std::time::UNIX_EPOCH).unwrap_or_default();
    format!("{}s", duration.as_secs())
}

/// Accumulates cycle reports into [`SimulationStats`].
#[derive(Debug)]
pub struct StatsCollector {
    stats: SimulationStats,
    timer: Option<Timer>,
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self {
            stats: SimulationStats::new(),
            timer: None,
        }
    }
}

impl StatsCollector {
    /// Creates a new collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the run name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.stats.metadata.name = name.into();
    }

    /// Starts timing.
    pub fn start(&mut self) {
        self.timer = Some(Timer::start());
        self.stats.record_start();
    }

    /// Stops timing and computes throughput.
    pub fn stop(&mut self) {
        self.stats.record_end();
        if let Some(ref timer) = self.timer {
            self.stats.compute_timing(timer.elapsed_ms());
        }
    }

    /// Folds one cycle report into the totals.
    pub fn record(&mut self, report: &CycleReport) {
        let e = &mut self.stats.evaluation;
        e.cycles += 1;
        e.final_cycle = report.cycle;
        e.total_iterations += u64::from(report.iterations);
        e.peak_iterations = e.peak_iterations.max(report.iterations);

        if !report.converged {
            e.oscillating_cycles += 1;
        }
        for diagnostic in &report.diagnostics {
            match diagnostic {
                Diagnostic::Conflict { .. } => e.conflicts += 1,
                Diagnostic::UnresolvedBehavior { .. } => e.unresolved_blocks += 1,
                Diagnostic::Oscillation { .. } => {}
            }
        }
    }

    /// Counts a cancelled tick.
    pub fn record_cancelled(&mut self) {
        self.stats.evaluation.cancelled_ticks += 1;
    }

    /// Returns the collected statistics.
    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    /// Consumes the collector and returns the statistics.
    pub fn into_stats(self) -> SimulationStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(cycle: Cycle, iterations: u32, diagnostics: Vec<Diagnostic>) -> CycleReport {
        CycleReport {
            cycle,
            converged: !diagnostics
                .iter()
                .any(|d| matches!(d, Diagnostic::Oscillation { .. })),
            iterations,
            diagnostics,
            ..Default::default()
        }
    }

    #[test]
    fn test_stats_creation() {
        let stats = SimulationStats::new().with_name("Adder");

        assert_eq!(stats.metadata.name, "Adder");
        assert_eq!(stats.metadata.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_record() {
        let mut collector = StatsCollector::new();
        collector.record(&report(0, 3, Vec::new()));
        collector.record(&report(
            1,
            64,
            vec![
                Diagnostic::Conflict { pins: vec![1, 2] },
                Diagnostic::Oscillation { iterations: 64 },
            ],
        ));
        collector.record(&report(
            2,
            2,
            vec![Diagnostic::UnresolvedBehavior {
                block: 4,
                key: "DFF".to_string(),
            }],
        ));
        collector.record_cancelled();

        let e = &collector.stats().evaluation;
        assert_eq!(e.cycles, 3);
        assert_eq!(e.final_cycle, 2);
        assert_eq!(e.total_iterations, 69);
        assert_eq!(e.peak_iterations, 64);
        assert_eq!(e.conflicts, 1);
        assert_eq!(e.oscillating_cycles, 1);
        assert_eq!(e.unresolved_blocks, 1);
        assert_eq!(e.cancelled_ticks, 1);
        assert!((collector.stats().mean_iterations() - 23.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_stats_json_export() {
        let mut stats = SimulationStats::new();
        stats.evaluation.cycles = 1000;
        stats.evaluation.total_iterations = 4321;

        let json = stats.to_json().unwrap();
        assert!(json.contains("1000"));
        assert!(json.contains("4321"));
    }

    #[test]
    fn test_stats_csv_export() {
        let mut stats = SimulationStats::new();
        stats.evaluation.cycles = 10;
        stats.evaluation.conflicts = 2;

        let csv = stats.to_csv();
        assert!(csv.starts_with("metric,value\n"));
        assert!(csv.contains("cycles,10"));
        assert!(csv.contains("conflicts,2"));
    }

    #[test]
    fn test_summary() {
        let summary = SimulationStats::new().with_name("Latch").summary();
        assert!(summary.contains("Name: Latch"));
        assert!(summary.contains("Cycles: 0"));
    }

    #[test]
    fn test_timer() {
        let timer = Timer::start();
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(timer.elapsed_ms() >= 10.0);
    }

    #[test]
    fn test_stats_collector_timing() {
        let mut collector = StatsCollector::new();
        collector.set_name("Test");
        collector.start();
        collector.record(&report(0, 1, Vec::new()));

        std::thread::sleep(std::time::Duration::from_millis(5));

        collector.stop();

        let stats = collector.stats();
        assert_eq!(stats.metadata.name, "Test");
        assert!(stats.timing.total_wall_time_ms >= 5.0);
        assert!(stats.timing.cycles_per_second > 0.0);
        assert!(stats.metadata.end_time.is_some());
    }
}
