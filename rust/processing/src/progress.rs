// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Coarse load milestones reported to the caller.

use serde::Serialize;
use std::fmt;

/// Checkpoints of a single load, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum LoadStage {
    #[serde(rename = "reading")]
    Reading,
    #[serde(rename = "parsing")]
    Opening,
    #[serde(rename = "geometry")]
    GeneratingGeometry,
    #[serde(rename = "rendering")]
    Finalizing,
    #[serde(rename = "complete")]
    Complete,
}

impl LoadStage {
    pub const ALL: [LoadStage; 5] = [
        LoadStage::Reading,
        LoadStage::Opening,
        LoadStage::GeneratingGeometry,
        LoadStage::Finalizing,
        LoadStage::Complete,
    ];

    pub fn percent(self) -> u8 {
        match self {
            LoadStage::Reading => 10,
            LoadStage::Opening => 30,
            LoadStage::GeneratingGeometry => 50,
            LoadStage::Finalizing => 90,
            LoadStage::Complete => 100,
        }
    }

    /// Label reported to hosts
    pub fn label(self) -> &'static str {
        match self {
            LoadStage::Reading => "reading",
            LoadStage::Opening => "parsing",
            LoadStage::GeneratingGeometry => "geometry",
            LoadStage::Finalizing => "rendering",
            LoadStage::Complete => "complete",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            LoadStage::Reading => "Reading file...",
            LoadStage::Opening => "Parsing IFC file...",
            LoadStage::GeneratingGeometry => "Generating geometry...",
            LoadStage::Finalizing => "Preparing model for display...",
            LoadStage::Complete => "Model loaded",
        }
    }
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One progress notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    /// 0-100
    pub percent: u8,
    pub message: String,
    pub stage: LoadStage,
}

impl ProgressEvent {
    pub fn at(stage: LoadStage) -> Self {
        Self {
            percent: stage.percent(),
            message: stage.message().to_string(),
            stage,
        }
    }
}

/// Receives progress synchronously from inside the load call
pub trait ProgressSink {
    fn report(&mut self, event: &ProgressEvent);
}

impl<F: FnMut(&ProgressEvent)> ProgressSink for F {
    fn report(&mut self, event: &ProgressEvent) {
        self(event)
    }
}

/// Sink that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&mut self, _event: &ProgressEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stages_are_monotonic() {
        let percents: Vec<u8> = LoadStage::ALL.iter().map(|s| s.percent()).collect();
        assert_eq!(percents, vec![10, 30, 50, 90, 100]);
        assert!(LoadStage::ALL.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_event_serializes_stage_label() {
        let json = serde_json::to_value(ProgressEvent::at(LoadStage::Finalizing)).unwrap();
        assert_eq!(json["percent"], 90);
        assert_eq!(json["stage"], "rendering");
        assert_eq!(json["message"], "Preparing model for display...");
    }

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        let mut sink = |event: &ProgressEvent| seen.push(event.stage);
        sink.report(&ProgressEvent::at(LoadStage::Reading));
        sink.report(&ProgressEvent::at(LoadStage::Opening));
        assert_eq!(seen, vec![LoadStage::Reading, LoadStage::Opening]);
    }
}
