//! Pipeline stage types and the per-request state machine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

/// One analysis step of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Understanding,
    ActionItems,
    FollowUps,
    Qa,
}

impl StageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Understanding => "understanding",
            Self::ActionItems => "action_items",
            Self::FollowUps => "follow_ups",
            Self::Qa => "qa",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Phase of a full "process" request.
///
/// Understanding → Actions → FollowUps → Done, or Failed(stage) from any
/// running phase. Done and Failed are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    Understanding,
    Actions,
    FollowUps,
    Done,
    Failed(StageKind),
}

impl PipelinePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Understanding => "understanding",
            Self::Actions => "actions",
            Self::FollowUps => "follow_ups",
            Self::Done => "done",
            Self::Failed(_) => "failed",
        }
    }

    /// Stage that runs while in this phase.
    pub fn stage(&self) -> Option<StageKind> {
        match self {
            Self::Understanding => Some(StageKind::Understanding),
            Self::Actions => Some(StageKind::ActionItems),
            Self::FollowUps => Some(StageKind::FollowUps),
            Self::Done | Self::Failed(_) => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }
}

/// Tracks one request through the pipeline phases.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    phase: PipelinePhase,
    started_at: Instant,
}

impl Default for PipelineRun {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineRun {
    pub fn new() -> Self {
        Self {
            phase: PipelinePhase::Understanding,
            started_at: Instant::now(),
        }
    }

    pub fn phase(&self) -> PipelinePhase {
        self.phase
    }

    /// Move to the next phase. Terminal phases stay where they are.
    pub fn advance(&mut self) -> PipelinePhase {
        self.phase = match self.phase {
            PipelinePhase::Understanding => PipelinePhase::Actions,
            PipelinePhase::Actions => PipelinePhase::FollowUps,
            PipelinePhase::FollowUps => PipelinePhase::Done,
            terminal => terminal,
        };
        self.phase
    }

    /// Mark the current stage as failed. Returns the stage that failed, or
    /// `None` if the run had already finished.
    pub fn fail(&mut self) -> Option<StageKind> {
        let stage = self.phase.stage()?;
        self.phase = PipelinePhase::Failed(stage);
        Some(stage)
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}
