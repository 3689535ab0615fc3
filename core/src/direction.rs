//! Absolute and relative directions plus the resolution between them.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Grid-relative directions a signal can travel in.
///
/// The variants are ordered by a clockwise cycle `Left → Up → Right → Down`
/// which the rotation arithmetic relies on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbsoluteDirection {
    /// Toward decreasing column indices.
    Left,
    /// Toward decreasing row indices.
    Up,
    /// Toward increasing column indices.
    Right,
    /// Toward increasing row indices.
    Down,
}

impl AbsoluteDirection {
    /// Every absolute direction in clockwise cycle order.
    pub const ALL: [Self; 4] = [Self::Left, Self::Up, Self::Right, Self::Down];

    /// One-based position of the direction within the clockwise cycle.
    #[must_use]
    pub const fn ordinal(self) -> u8 {
        match self {
            Self::Left => 1,
            Self::Up => 2,
            Self::Right => 3,
            Self::Down => 4,
        }
    }

    const fn from_ordinal(ordinal: u8) -> Self {
        match ordinal {
            1 => Self::Left,
            2 => Self::Up,
            3 => Self::Right,
            _ => Self::Down,
        }
    }

    /// Rotates the direction clockwise by the provided number of quarter turns.
    #[must_use]
    pub const fn rotated(self, quarter_turns: u8) -> Self {
        let zero_based = (self.ordinal() - 1) as u32 + quarter_turns as u32;
        Self::from_ordinal((zero_based % 4) as u8 + 1)
    }

    /// Canonical lowercase name used by configuration files and flags.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Up => "up",
            Self::Right => "right",
            Self::Down => "down",
        }
    }
}

/// Directions expressed relative to the direction a signal arrived from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelativeDirection {
    /// Keep travelling in the incoming direction.
    Forward,
    /// Reverse the incoming direction.
    Backward,
    /// Turn a quarter clockwise from the incoming direction.
    Clockwise,
    /// Turn a quarter counter-clockwise from the incoming direction.
    CounterClockwise,
}

impl RelativeDirection {
    /// Every relative direction.
    pub const ALL: [Self; 4] = [
        Self::Forward,
        Self::Backward,
        Self::Clockwise,
        Self::CounterClockwise,
    ];

    /// Number of clockwise quarter turns the relative direction represents.
    #[must_use]
    pub const fn quarter_turns(self) -> u8 {
        match self {
            Self::Forward => 0,
            Self::Clockwise => 1,
            Self::Backward => 2,
            Self::CounterClockwise => 3,
        }
    }

    /// Canonical lowercase name used by configuration files and flags.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
            Self::Clockwise => "clockwise",
            Self::CounterClockwise => "counter_clockwise",
        }
    }
}

/// Single entry of a cell's behavior list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Behavior {
    /// Fire the neighbor in a fixed grid direction.
    Absolute(AbsoluteDirection),
    /// Fire the neighbor in a direction derived from the incoming signal.
    Relative(RelativeDirection),
}

impl Behavior {
    /// Every behavior, absolute directions first.
    pub const ALL: [Self; 8] = [
        Self::Absolute(AbsoluteDirection::Left),
        Self::Absolute(AbsoluteDirection::Up),
        Self::Absolute(AbsoluteDirection::Right),
        Self::Absolute(AbsoluteDirection::Down),
        Self::Relative(RelativeDirection::Forward),
        Self::Relative(RelativeDirection::Backward),
        Self::Relative(RelativeDirection::Clockwise),
        Self::Relative(RelativeDirection::CounterClockwise),
    ];
}

impl From<AbsoluteDirection> for Behavior {
    fn from(direction: AbsoluteDirection) -> Self {
        Self::Absolute(direction)
    }
}

impl From<RelativeDirection> for Behavior {
    fn from(direction: RelativeDirection) -> Self {
        Self::Relative(direction)
    }
}

/// Resolves a behavior into the absolute direction it fires toward.
///
/// Absolute behaviors ignore `from`. Relative behaviors need the direction the
/// cell was struck from and yield `None` without one, which is the case for
/// direct presses.
#[must_use]
pub fn resolve(from: Option<AbsoluteDirection>, behavior: Behavior) -> Option<AbsoluteDirection> {
    match behavior {
        Behavior::Absolute(direction) => Some(direction),
        Behavior::Relative(relative) => from.map(|incoming| incoming.rotated(relative.quarter_turns())),
    }
}

/// Error returned when a direction or behavior name is not recognised.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown behavior '{0}'")]
pub struct ParseBehaviorError(String);

fn normalise(value: &str) -> String {
    value.trim().to_ascii_lowercase().replace('-', "_")
}

impl FromStr for AbsoluteDirection {
    type Err = ParseBehaviorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let name = normalise(value);
        Self::ALL
            .into_iter()
            .find(|direction| direction.name() == name)
            .ok_or_else(|| ParseBehaviorError(value.to_owned()))
    }
}

impl FromStr for RelativeDirection {
    type Err = ParseBehaviorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let name = normalise(value);
        if name == "counterclockwise" {
            return Ok(Self::CounterClockwise);
        }
        Self::ALL
            .into_iter()
            .find(|direction| direction.name() == name)
            .ok_or_else(|| ParseBehaviorError(value.to_owned()))
    }
}

impl FromStr for Behavior {
    type Err = ParseBehaviorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value
            .parse::<AbsoluteDirection>()
            .map(Self::Absolute)
            .or_else(|_| value.parse::<RelativeDirection>().map(Self::Relative))
    }
}

impl fmt::Display for AbsoluteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for RelativeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Behavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute(direction) => direction.fmt(f),
            Self::Relative(direction) => direction.fmt(f),
        }
    }
}
