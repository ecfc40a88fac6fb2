use crate::{Command, Phase};

/// The error type for building a [`GameSession`](crate::GameSession) from its configuration.
///
/// These errors are fatal: a session that fails to build never starts.
#[derive(Debug)]
pub enum SetupError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    NoTeams,
    ZeroGameTime,
    ZeroChargingTime,
    DuplicateTeam { team: String },
    DuplicateRobot { robot: u32 },
    UnknownRobot { team: String, robot: u32 },
    DuplicateZone { zone: String },
    DegeneratePolygon { zone: String },
    UnknownZone { zone: String, referenced_by: String },
}

impl std::error::Error for SetupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SetupError::Io(err) => Some(err),
            SetupError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for SetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetupError::Io(_) => write!(f, "Could not read the game configuration"),
            SetupError::Parse(_) => write!(f, "Could not parse the game configuration"),
            SetupError::NoTeams => write!(f, "The configuration does not define any teams"),
            SetupError::ZeroGameTime => write!(f, "The game time must be at least one second"),
            SetupError::ZeroChargingTime => write!(
                f,
                "Charging stations are configured, but the charging time is zero"
            ),
            SetupError::DuplicateTeam { team } => {
                write!(f, "Team '{}' is defined more than once", team)
            }
            SetupError::DuplicateRobot { robot } => {
                write!(f, "Robot {} is assigned to more than one team", robot)
            }
            SetupError::UnknownRobot { team, robot } => write!(
                f,
                "Team '{}' uses robot {}, which does not exist in the robot configuration",
                team, robot
            ),
            SetupError::DuplicateZone { zone } => {
                write!(f, "Zone '{}' is defined more than once", zone)
            }
            SetupError::DegeneratePolygon { zone } => {
                write!(f, "Zone '{}' needs at least three boundary points", zone)
            }
            SetupError::UnknownZone {
                zone,
                referenced_by,
            } => write!(
                f,
                "{} refers to zone '{}', which is not defined",
                referenced_by, zone
            ),
        }
    }
}

impl From<std::io::Error> for SetupError {
    fn from(err: std::io::Error) -> Self {
        SetupError::Io(err)
    }
}

impl From<serde_json::Error> for SetupError {
    fn from(err: serde_json::Error) -> Self {
        SetupError::Parse(err)
    }
}

/// The error type for a lifecycle command that is not allowed in the current phase.
///
/// The session is left untouched when this is returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IllegalTransition {
    pub command: Command,
    pub phase: Phase,
}

impl std::error::Error for IllegalTransition {}

impl std::fmt::Display for IllegalTransition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cannot {} the game while it is {}",
            self.command, self.phase
        )
    }
}
