//! Per-tick match recording
//!
//! Keeps the last `capacity` frames (oldest evicted first) for replay and
//! exports them as CSV or JSON with a fixed column order.

use std::collections::VecDeque;
use std::io::Write;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sim::robot::Robot;

/// CSV header, one column per `Frame` field in export order
pub const CSV_COLUMNS: [&str; 11] = [
    "t", "p1x", "p1y", "p1h", "p2x", "p2y", "p2h", "p1ax", "p1ay", "p2ax", "p2ay",
];

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("export write failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("export encode failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Snapshot of one robot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BotSample {
    pub x: f64,
    pub y: f64,
    /// Heading (degrees)
    pub heading: f64,
    /// Acceleration estimate (m/s²)
    pub ax: f64,
    pub ay: f64,
}

impl From<&Robot> for BotSample {
    fn from(robot: &Robot) -> Self {
        let a = robot.acceleration();
        Self {
            x: robot.pos.x,
            y: robot.pos.y,
            heading: robot.heading,
            ax: a.x,
            ay: a.y,
        }
    }
}

/// One recorded tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Match time (ms)
    pub t: f64,
    pub p1: BotSample,
    pub p2: BotSample,
}

impl Frame {
    fn csv_row(&self) -> String {
        let values = [
            self.t,
            self.p1.x,
            self.p1.y,
            self.p1.heading,
            self.p2.x,
            self.p2.y,
            self.p2.heading,
            self.p1.ax,
            self.p1.ay,
            self.p2.ax,
            self.p2.ay,
        ];
        values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Bounded frame history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recorder {
    capacity: usize,
    frames: VecDeque<Frame>,
}

impl Recorder {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            frames: VecDeque::with_capacity(capacity.min(4096)),
        }
    }

    /// Append a frame, evicting the oldest once over capacity
    pub fn record(&mut self, t: f64, p1: &Robot, p2: &Robot) {
        if self.capacity == 0 {
            return;
        }
        self.frames.push_back(Frame {
            t,
            p1: p1.into(),
            p2: p2.into(),
        });
        while self.frames.len() > self.capacity {
            self.frames.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Frames oldest first
    pub fn frames(&self) -> impl Iterator<Item = &Frame> {
        self.frames.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Write header plus one row per frame. Writes nothing when empty.
    /// Returns the number of rows written.
    pub fn export_csv<W: Write>(&self, mut out: W) -> Result<usize, RecorderError> {
        if self.frames.is_empty() {
            return Ok(0);
        }
        writeln!(out, "{}", CSV_COLUMNS.join(","))?;
        for frame in &self.frames {
            writeln!(out, "{}", frame.csv_row())?;
        }
        out.flush()?;
        log::info!("Exported {} frames as CSV", self.frames.len());
        Ok(self.frames.len())
    }

    /// Frames as a JSON array
    pub fn export_json<W: Write>(&self, out: W) -> Result<usize, RecorderError> {
        serde_json::to_writer(out, &self.frames)?;
        Ok(self.frames.len())
    }

    /// Cursor for stepping through the recorded frames
    pub fn replay(&self) -> ReplayCursor<'_> {
        ReplayCursor {
            recorder: self,
            index: 0,
        }
    }
}

/// Replay position over a recorder
#[derive(Debug, Clone)]
pub struct ReplayCursor<'a> {
    recorder: &'a Recorder,
    index: usize,
}

impl<'a> ReplayCursor<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&'a Frame> {
        self.recorder.get(self.index)
    }

    /// Fraction of the recording shown, in [0, 1]
    pub fn progress(&self) -> f64 {
        let total = self.recorder.len();
        if total > 1 {
            (self.index.min(total - 1)) as f64 / (total - 1) as f64
        } else {
            0.0
        }
    }

    /// Seconds since the first recorded frame
    pub fn elapsed_seconds(&self) -> f64 {
        match (self.recorder.get(0), self.current()) {
            (Some(first), Some(frame)) => (frame.t - first.t) / 1000.0,
            _ => 0.0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.recorder.len()
    }
}

impl<'a> Iterator for ReplayCursor<'a> {
    type Item = &'a Frame;

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.recorder.get(self.index)?;
        self.index += 1;
        Some(frame)
    }
}
