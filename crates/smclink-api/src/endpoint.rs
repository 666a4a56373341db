// SMC REST endpoints
//
// The polled state endpoints are modelled as an enum so ingestion can match
// on them exhaustively; command paths are plain constants.

use strum::Display;

/// A state endpoint fetched on every poll tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Endpoint {
    /// `{serial, hostname, type}`
    #[strum(serialize = "/api/localmachine")]
    LocalMachine,
    /// `{"System Power", "Power Overload", "Main Power Fault", "Power Control Fault"}`
    #[strum(serialize = "/api/chassis/power/status")]
    PowerStatus,
    /// Reserved. Fetched so it counts toward connection health; the body is ignored.
    #[strum(serialize = "/api/vfcs")]
    Vfcs,
    /// `{role}`
    #[strum(serialize = "/api/session")]
    Session,
    /// `{ledMode, ledR, ledG, ledB}`
    #[strum(serialize = "/api/ledstrip")]
    LedStrip,
}

impl Endpoint {
    /// Poll order. Requests are issued in this order but may complete in any order.
    pub const POLL_SET: [Self; 5] = [
        Self::LocalMachine,
        Self::PowerStatus,
        Self::Vfcs,
        Self::Session,
        Self::LedStrip,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Self::LocalMachine => "/api/localmachine",
            Self::PowerStatus => "/api/chassis/power/status",
            Self::Vfcs => "/api/vfcs",
            Self::Session => "/api/session",
            Self::LedStrip => paths::LED_STRIP,
        }
    }

    /// Map a request path back to the state endpoint it refreshes.
    ///
    /// POST responses flow through the same ingestion as polls, so
    /// `POST /api/ledstrip` resolves to [`Endpoint::LedStrip`].
    pub fn from_path(path: &str) -> Option<Self> {
        Self::POLL_SET.into_iter().find(|e| e.path() == path)
    }
}

/// Command (POST) paths.
pub mod paths {
    pub const POWER_ON: &str = "/api/chassis/power/on";
    pub const POWER_OFF: &str = "/api/chassis/power/off";
    pub const POWER_CYCLE: &str = "/api/chassis/power/cycle";
    pub const WHO_AM_I: &str = "/api/chassis/whoami";
    pub const NOTIFICATION_TIME: &str = "/api/oled/notification/time";
    pub const NOTIFICATION: &str = "/api/oled/notification";
    pub const LED_STRIP: &str = "/api/ledstrip";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_path() {
        for endpoint in Endpoint::POLL_SET {
            assert_eq!(endpoint.to_string(), endpoint.path());
        }
    }

    #[test]
    fn from_path_round_trips_poll_set() {
        for endpoint in Endpoint::POLL_SET {
            assert_eq!(Endpoint::from_path(endpoint.path()), Some(endpoint));
        }
        assert_eq!(Endpoint::from_path(paths::POWER_ON), None);
        assert_eq!(Endpoint::from_path(paths::LED_STRIP), Some(Endpoint::LedStrip));
    }
}
