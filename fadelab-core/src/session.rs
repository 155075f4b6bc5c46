//! Session state machine over the Jakarta evening schedule.
//!
//! The trading day is a fixed table of half-open local-time windows:
//!
//! ```text
//! PRE_SESSION  [18:45, 19:00)   reset, BTC context checks
//! SCANNING     [19:00, 19:15)   pick the evening's symbols
//! GOLDEN_HOUR  [19:30, 20:30)   the only window that opens positions
//! MANAGEMENT   [20:30, 22:30)   monitor open positions
//! EXIT_WINDOW  [22:30, 22:45)   trim 50% of everything open
//! SHUTDOWN     everything else  flatten, report, sleep
//! ```
//!
//! The 19:15-19:30 gap and everything outside 18:45-22:45 classify as
//! SHUTDOWN. Classification is pure over a local wall-clock time;
//! Jakarta is UTC+7 year-round so the conversion never hits a DST fold.
//! All schedule arithmetic happens in naive local time and only
//! `jakarta_now` touches the timezone database.

use chrono::{Duration, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Asia::Jakarta;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where the session clock stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    PreSession,
    Scanning,
    GoldenHour,
    Management,
    ExitWindow,
    Shutdown,
}

impl SessionState {
    /// Entries are only ever opened here.
    pub fn can_open(&self) -> bool {
        matches!(self, SessionState::GoldenHour)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::PreSession => write!(f, "PRE_SESSION"),
            SessionState::Scanning => write!(f, "SCANNING"),
            SessionState::GoldenHour => write!(f, "GOLDEN_HOUR"),
            SessionState::Management => write!(f, "MANAGEMENT"),
            SessionState::ExitWindow => write!(f, "EXIT_WINDOW"),
            SessionState::Shutdown => write!(f, "SHUTDOWN"),
        }
    }
}

/// Current state plus the next boundary the clock will cross.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub next_state: SessionState,
    /// Jakarta local time of the next transition.
    pub next_change: NaiveDateTime,
}

impl SessionSnapshot {
    /// Time until the next transition from `now` (Jakarta local).
    pub fn eta(&self, now: NaiveDateTime) -> Duration {
        self.next_change - now
    }
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

/// Boundary times in cycle order, each paired with the state it opens.
/// Between 19:15 and 19:30 the schedule deliberately goes dark.
fn boundaries() -> [(NaiveTime, SessionState); 7] {
    [
        (hm(18, 45), SessionState::PreSession),
        (hm(19, 0), SessionState::Scanning),
        (hm(19, 15), SessionState::Shutdown),
        (hm(19, 30), SessionState::GoldenHour),
        (hm(20, 30), SessionState::Management),
        (hm(22, 30), SessionState::ExitWindow),
        (hm(22, 45), SessionState::Shutdown),
    ]
}

/// Classify a Jakarta wall-clock time.
pub fn state_at(time: NaiveTime) -> SessionState {
    let mut state = SessionState::Shutdown;
    for (boundary, opens) in boundaries() {
        if time >= boundary {
            state = opens;
        } else {
            break;
        }
    }
    state
}

/// Classify `now` and compute the next transition.
pub fn snapshot_at(now: NaiveDateTime) -> SessionSnapshot {
    let time = now.time();
    let state = state_at(time);

    for (boundary, opens) in boundaries() {
        if time < boundary {
            return SessionSnapshot {
                state,
                next_state: opens,
                next_change: now.date().and_time(boundary),
            };
        }
    }

    // Past the last boundary: the next thing that happens is tomorrow's
    // pre-session.
    let (first_boundary, first_state) = boundaries()[0];
    SessionSnapshot {
        state,
        next_state: first_state,
        next_change: (now.date() + Duration::days(1)).and_time(first_boundary),
    }
}

/// Current Jakarta wall-clock time.
pub fn jakarta_now() -> NaiveDateTime {
    Utc::now().with_timezone(&Jakarta).naive_local()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_time(hm(hour, minute))
    }

    #[test]
    fn window_boundary_table() {
        let expected = [
            ((18, 44), SessionState::Shutdown),
            ((18, 45), SessionState::PreSession),
            ((18, 59), SessionState::PreSession),
            ((19, 0), SessionState::Scanning),
            ((19, 14), SessionState::Scanning),
            ((19, 15), SessionState::Shutdown), // unmodeled gap
            ((19, 29), SessionState::Shutdown),
            ((19, 30), SessionState::GoldenHour),
            ((20, 29), SessionState::GoldenHour),
            ((20, 30), SessionState::Management),
            ((22, 29), SessionState::Management),
            ((22, 30), SessionState::ExitWindow),
            ((22, 44), SessionState::ExitWindow),
            ((22, 45), SessionState::Shutdown),
            ((23, 30), SessionState::Shutdown),
            ((0, 0), SessionState::Shutdown),
            ((12, 0), SessionState::Shutdown),
        ];
        for ((hour, minute), state) in expected {
            assert_eq!(
                state_at(hm(hour, minute)),
                state,
                "wrong state at {hour:02}:{minute:02}"
            );
        }
    }

    #[test]
    fn golden_hour_snapshot_points_at_management() {
        let snap = snapshot_at(at(19, 45));
        assert_eq!(snap.state, SessionState::GoldenHour);
        assert_eq!(snap.next_state, SessionState::Management);
        assert_eq!(snap.next_change, at(20, 30));
        assert_eq!(snap.eta(at(19, 45)), Duration::minutes(45));
    }

    #[test]
    fn gap_snapshot_points_at_golden_hour_not_tomorrow() {
        let snap = snapshot_at(at(19, 20));
        assert_eq!(snap.state, SessionState::Shutdown);
        assert_eq!(snap.next_state, SessionState::GoldenHour);
        assert_eq!(snap.next_change, at(19, 30));
    }

    #[test]
    fn late_night_snapshot_points_at_tomorrow() {
        let snap = snapshot_at(at(23, 30));
        assert_eq!(snap.state, SessionState::Shutdown);
        assert_eq!(snap.next_state, SessionState::PreSession);
        assert_eq!(
            snap.next_change,
            NaiveDate::from_ymd_opt(2024, 1, 3).unwrap().and_time(hm(18, 45))
        );
    }

    #[test]
    fn early_morning_snapshot_points_at_today() {
        let snap = snapshot_at(at(6, 0));
        assert_eq!(snap.state, SessionState::Shutdown);
        assert_eq!(snap.next_state, SessionState::PreSession);
        assert_eq!(snap.next_change, at(18, 45));
    }

    #[test]
    fn seconds_do_not_leak_past_boundaries() {
        // 19:14:59 is still scanning, 22:44:59 still exiting
        let t = NaiveTime::from_hms_opt(19, 14, 59).unwrap();
        assert_eq!(state_at(t), SessionState::Scanning);
        let t = NaiveTime::from_hms_opt(22, 44, 59).unwrap();
        assert_eq!(state_at(t), SessionState::ExitWindow);
    }

    #[test]
    fn only_golden_hour_opens() {
        assert!(SessionState::GoldenHour.can_open());
        for state in [
            SessionState::PreSession,
            SessionState::Scanning,
            SessionState::Management,
            SessionState::ExitWindow,
            SessionState::Shutdown,
        ] {
            assert!(!state.can_open());
        }
    }

    #[test]
    fn display_matches_log_names() {
        assert_eq!(SessionState::GoldenHour.to_string(), "GOLDEN_HOUR");
        assert_eq!(SessionState::PreSession.to_string(), "PRE_SESSION");
        assert_eq!(SessionState::Shutdown.to_string(), "SHUTDOWN");
    }

    #[test]
    fn serde_names_match_display() {
        let json = serde_json::to_string(&SessionState::GoldenHour).unwrap();
        assert_eq!(json, "\"GOLDEN_HOUR\"");
    }
}
