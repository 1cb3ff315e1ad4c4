use alloc::string::String;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::*;

pub type RoverId = u32;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoverStatus {
    #[serde(rename = "Not Started")]
    NotStarted,
    Moving,
    Finished,
    Eliminated,
}

impl RoverStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::Moving => "Moving",
            Self::Finished => "Finished",
            Self::Eliminated => "Eliminated",
        }
    }

    /// Whether a new command string may be stored.
    pub const fn accepts_commands(self) -> bool {
        matches!(self, Self::NotStarted | Self::Finished)
    }
}

impl Default for RoverStatus {
    fn default() -> Self {
        Self::NotStarted
    }
}

impl fmt::Display for RoverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Position plus heading.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Coord2,
    pub orientation: Orientation,
}

impl Pose {
    /// Where a freshly created rover stands.
    pub const LAUNCH: Self = Self::new((0, 0), Orientation::South);

    pub const fn new(position: Coord2, orientation: Orientation) -> Self {
        Self {
            position,
            orientation,
        }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::LAUNCH
    }
}

/// Persisted rover state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rover {
    pub id: RoverId,
    pub status: RoverStatus,
    pub position: Coord2,
    pub orientation: Orientation,
    pub commands: String,
    pub executed_commands: String,
}

impl Rover {
    pub fn new(id: RoverId, commands: impl Into<String>) -> Self {
        Self {
            id,
            status: RoverStatus::NotStarted,
            position: Pose::LAUNCH.position,
            orientation: Pose::LAUNCH.orientation,
            commands: commands.into(),
            executed_commands: String::new(),
        }
    }

    pub fn pose(&self) -> Pose {
        Pose::new(self.position, self.orientation)
    }

    /// Replaces the pending command string. Only allowed before the first
    /// dispatch or after a finished one.
    pub fn set_commands(&mut self, commands: impl Into<String>) -> Result<()> {
        if !self.status.accepts_commands() {
            return Err(RoverError::CommandsLocked {
                status: self.status,
            });
        }
        self.commands = commands.into();
        Ok(())
    }

    /// Copies the outcome of a dispatch into this record.
    pub fn apply_report(&mut self, report: &DispatchReport) {
        self.status = report.status;
        self.position = report.pose.position;
        self.orientation = report.pose.orientation;
        self.executed_commands.clone_from(&report.executed_commands);
    }
}
