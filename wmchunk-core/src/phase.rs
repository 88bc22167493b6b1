use serde::{Deserialize, Serialize};

use crate::error::TrialSpecError;
use crate::trial::TrialSpec;

/// Which half of an encoding/retrieval pair a trial row describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PhaseType {
    Encoding,
    Retrieval,
}

impl TryFrom<u8> for PhaseType {
    type Error = TrialSpecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Encoding),
            1 => Ok(Self::Retrieval),
            value => Err(TrialSpecError::UnknownCode {
                field: "phase_type",
                value,
            }),
        }
    }
}

impl From<PhaseType> for u8 {
    fn from(value: PhaseType) -> Self {
        match value {
            PhaseType::Encoding => 0,
            PhaseType::Retrieval => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum RecallDir {
    Backward,
    Forward,
}

impl RecallDir {
    /// Sequence position (in presentation order) that the `k`-th response
    /// refers to. Backward recall walks the sequence from the right.
    pub fn display_index(self, seq_length: usize, k: usize) -> usize {
        match self {
            Self::Forward => k,
            Self::Backward => seq_length - k - 1,
        }
    }
}

impl TryFrom<u8> for RecallDir {
    type Error = TrialSpecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Backward),
            1 => Ok(Self::Forward),
            value => Err(TrialSpecError::UnknownCode {
                field: "recall_dir",
                value,
            }),
        }
    }
}

impl From<RecallDir> for u8 {
    fn from(value: RecallDir) -> Self {
        match value {
            RecallDir::Backward => 0,
            RecallDir::Forward => 1,
        }
    }
}

/// Stages one trial passes through.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum TrialStage {
    #[default]
    Setup,
    Encoding,
    Retrieval,
    Feedback,
    Iti,
    Complete,
}

impl TrialStage {
    pub fn next(&self, spec: &TrialSpec) -> Option<Self> {
        use TrialStage::*;
        Some(match self {
            Setup => match spec.phase_type {
                PhaseType::Encoding => Encoding,
                PhaseType::Retrieval => Retrieval,
            },
            Encoding | Retrieval if spec.display_feedback => Feedback,
            Encoding | Retrieval | Feedback => Iti,
            Iti => Complete,
            Complete => return None,
        })
    }
}

/// What a phase component hands back to the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub enum PhaseResult {
    Encoding {
        chunks_shown: usize,
    },
    Retrieval {
        /// Seconds between first and last response; NaN when nothing was typed.
        movement_time: f64,
        timed_out: bool,
        /// The input port asked to stop before the sequence was complete.
        interrupted: bool,
        /// Responses received beyond the sequence length, logged but unscored.
        overflow: usize,
    },
}

impl PhaseResult {
    pub fn movement_time(&self) -> f64 {
        match self {
            Self::Encoding { .. } => 0.0,
            Self::Retrieval { movement_time, .. } => *movement_time,
        }
    }

    pub fn timed_out(&self) -> bool {
        matches!(self, Self::Retrieval { timed_out: true, .. })
    }

    pub fn interrupted(&self) -> bool {
        matches!(self, Self::Retrieval { interrupted: true, .. })
    }

    pub fn overflow(&self) -> usize {
        match self {
            Self::Encoding { .. } => 0,
            Self::Retrieval { overflow, .. } => *overflow,
        }
    }
}
