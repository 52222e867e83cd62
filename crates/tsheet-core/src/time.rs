//! Resolution of hand-typed clock times.
//!
//! Tokens look like `10`, `10:30`, `1p`, `12:45a`. Without a meridiem the
//! resolver guesses from context: the end of a range follows its start, and
//! a lone hour before [`PM_BEFORE_HOUR`] is read as afternoon.

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

/// Clock time token: hour, optional `:minute`, optional meridiem letter.
static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})(?::(\d{1,2}))?([aApP])?$").unwrap());

/// Hours below this with no meridiem and no range context are taken as PM.
// TODO: expose as a setting once a timesheet needs early-morning starts.
pub const PM_BEFORE_HOUR: u32 = 7;

/// A resolved time and whether the afternoon guess was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub time: NaiveDateTime,
    pub assumed_pm: bool,
}

/// Resolves `token` to a time on `date`.
///
/// `after` is the start of the range when resolving its end. Returns `None`
/// when the token is malformed or names an impossible time.
pub fn resolve(date: NaiveDate, token: &str, after: Option<NaiveDateTime>) -> Option<NaiveDateTime> {
    resolve_detailed(date, token, after).map(|r| r.time)
}

/// Like [`resolve`], also reporting whether the PM heuristic fired.
pub fn resolve_detailed(
    date: NaiveDate,
    token: &str,
    after: Option<NaiveDateTime>,
) -> Option<Resolution> {
    let caps = TIME_RE.captures(token)?;
    let mut hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = match caps.get(2) {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    let mut assumed_pm = false;

    match caps.get(3).map(|m| m.as_str()) {
        Some("p" | "P") if hour != 12 => hour += 12,
        Some("a" | "A") if hour == 12 => hour = 0,
        Some(_) => {}
        None => {
            if let Some(after) = after {
                let naive = date.and_hms_opt(hour, minute, 0)?;
                if after > naive {
                    hour += 12;
                }
            } else if hour < PM_BEFORE_HOUR {
                assumed_pm = true;
                hour += 12;
            }
        }
    }

    let time = date.and_hms_opt(hour, minute, 0)?;
    Some(Resolution { time, assumed_pm })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2015, 6, 3).unwrap()
    }

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        day().and_hms_opt(hour, minute, 0).unwrap()
    }

    #[test]
    fn explicit_meridiem() {
        assert_eq!(resolve(day(), "1a", None), Some(at(1, 0)));
        assert_eq!(resolve(day(), "11:45p", None), Some(at(23, 45)));
        assert_eq!(resolve(day(), "12:45a", None), Some(at(0, 45)));
        assert_eq!(resolve(day(), "12:45p", None), Some(at(12, 45)));
        assert_eq!(resolve(day(), "3P", None), Some(at(15, 0)));
    }

    #[test]
    fn noon_and_midnight() {
        assert_eq!(resolve(day(), "12p", None), Some(at(12, 0)));
        assert_eq!(resolve(day(), "12:00p", None), resolve(day(), "12p", None));
        assert_eq!(resolve(day(), "12a", None), Some(at(0, 0)));
    }

    #[test]
    fn lone_early_hour_is_afternoon() {
        let r = resolve_detailed(day(), "1", None).unwrap();
        assert_eq!(r.time, at(13, 0));
        assert!(r.assumed_pm);

        let r = resolve_detailed(day(), "7", None).unwrap();
        assert_eq!(r.time, at(7, 0));
        assert!(!r.assumed_pm);

        assert_eq!(resolve(day(), "12", None), Some(at(12, 0)));
    }

    #[test]
    fn end_follows_start() {
        assert_eq!(resolve(day(), "11:30", Some(at(10, 0))), Some(at(11, 30)));
        assert_eq!(resolve(day(), "1", Some(at(10, 0))), Some(at(13, 0)));
        assert_eq!(resolve(day(), "5:45", Some(at(15, 0))), Some(at(17, 45)));
        // Equal to the start is not "later", so no shift.
        assert_eq!(resolve(day(), "10", Some(at(10, 0))), Some(at(10, 0)));
    }

    #[test]
    fn end_context_does_not_apply_pm_heuristic() {
        let r = resolve_detailed(day(), "6", Some(at(5, 0))).unwrap();
        assert_eq!(r.time, at(6, 0));
        assert!(!r.assumed_pm);
    }

    #[test]
    fn rejects_malformed_tokens() {
        assert_eq!(resolve(day(), "", None), None);
        assert_eq!(resolve(day(), "abc", None), None);
        assert_eq!(resolve(day(), "123", None), None);
        assert_eq!(resolve(day(), "10:30x", None), None);
    }

    #[test]
    fn rejects_impossible_times() {
        assert_eq!(resolve(day(), "25", None), None);
        assert_eq!(resolve(day(), "10:75", None), None);
        assert_eq!(resolve(day(), "13p", None), None);
        // Shifting past midnight is not supported.
        assert_eq!(resolve(day(), "12", Some(at(13, 0))), None);
    }
}
