//! Weekly opening-hours evaluation.
//!
//! A `WeeklySchedule` holds seven fixed slots, Monday first. Every query
//! takes a `NaiveDateTime` that the caller has already shifted into the
//! facility's local time; use [`localize`] for that.

use chrono::{DateTime, Datelike, NaiveDateTime, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

const TIME_FORMAT: &str = "%H:%M";

/// Errors raised while building a schedule at the data boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// Opening time is after closing time (overnight spans are unsupported).
    OpenAfterClose { day: Weekday, open: NaiveTime, close: NaiveTime },
    UnknownDay(String),
    InvalidTime(String),
    DuplicateDay(Weekday),
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAfterClose { day, open, close } => write!(
                f,
                "{}: opening time {} is after closing time {}",
                weekday_name(*day),
                open.format(TIME_FORMAT),
                close.format(TIME_FORMAT)
            ),
            Self::UnknownDay(s) => write!(f, "Unknown weekday '{}'", s),
            Self::InvalidTime(s) => write!(f, "Invalid time '{}', expected HH:MM", s),
            Self::DuplicateDay(d) => write!(f, "{} listed more than once", weekday_name(*d)),
        }
    }
}

impl std::error::Error for ScheduleError {}

/// Opening span for a single day. Always satisfies `open <= close`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpeningHours {
    open: NaiveTime,
    close: NaiveTime,
}

impl OpeningHours {
    pub fn new(day: Weekday, open: NaiveTime, close: NaiveTime) -> Result<Self, ScheduleError> {
        if open > close {
            return Err(ScheduleError::OpenAfterClose { day, open, close });
        }
        Ok(Self { open, close })
    }

    pub fn open(&self) -> NaiveTime {
        self.open
    }

    pub fn close(&self) -> NaiveTime {
        self.close
    }

    /// Closed interval: both boundaries count as open.
    pub fn contains(&self, t: NaiveTime) -> bool {
        self.open <= t && t <= self.close
    }
}

impl fmt::Display for OpeningHours {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.open.format(TIME_FORMAT), self.close.format(TIME_FORMAT))
    }
}

/// Recurring weekly calendar. An empty slot means closed all day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DayEntry>", into = "Vec<DayEntry>")]
pub struct WeeklySchedule {
    days: [Option<OpeningHours>; 7],
}

impl WeeklySchedule {
    /// A schedule with every day closed.
    pub fn closed() -> Self {
        Self::default()
    }

    /// Set (or replace) one day's hours.
    pub fn with_day(mut self, day: Weekday, open: NaiveTime, close: NaiveTime) -> Result<Self, ScheduleError> {
        self.days[slot(day)] = Some(OpeningHours::new(day, open, close)?);
        Ok(self)
    }

    /// Apply the same hours to several days.
    pub fn with_days(
        mut self,
        days: &[Weekday],
        open: NaiveTime,
        close: NaiveTime,
    ) -> Result<Self, ScheduleError> {
        for &day in days {
            self = self.with_day(day, open, close)?;
        }
        Ok(self)
    }

    pub fn hours_on(&self, day: Weekday) -> Option<OpeningHours> {
        self.days[slot(day)]
    }

    /// True when at least one day has hours.
    pub fn has_any_hours(&self) -> bool {
        self.days.iter().any(Option::is_some)
    }
}

fn slot(day: Weekday) -> usize {
    day.num_days_from_monday() as usize
}

/// Full English name of a weekday ("Monday").
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

// ─── Evaluation ─────────────────────────────────────────────────

/// Whether the facility is open at local instant `at`.
pub fn is_open(schedule: &WeeklySchedule, at: NaiveDateTime) -> bool {
    match schedule.hours_on(at.weekday()) {
        Some(hours) => hours.contains(at.time()),
        None => false,
    }
}

/// Today's span as "HH:MM-HH:MM", or `None` when no hours are on record.
pub fn today_hours(schedule: &WeeklySchedule, at: NaiveDateTime) -> Option<String> {
    schedule.hours_on(at.weekday()).map(|h| h.to_string())
}

/// First day after `at`'s day with hours, scanning a full week forward.
///
/// The seventh step lands on the same weekday one week later, so a facility
/// open only on `at`'s weekday still reports that day.
pub fn next_open(schedule: &WeeklySchedule, at: NaiveDateTime) -> Option<(Weekday, NaiveTime)> {
    let mut day = at.weekday();
    for _ in 0..7 {
        day = day.succ();
        if let Some(hours) = schedule.hours_on(day) {
            return Some((day, hours.open()));
        }
    }
    None
}

/// Shift a UTC instant into the facility's wall-clock time.
pub fn localize(instant: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
    instant.with_timezone(&tz).naive_local()
}

/// English names and abbreviations ("Mon", "monday"), or Japanese
/// ("月", "月曜", "月曜日").
pub fn parse_weekday(s: &str) -> Result<Weekday, ScheduleError> {
    let s = s.trim();
    if let Ok(day) = s.parse::<Weekday>() {
        return Ok(day);
    }
    let kanji = s.strip_suffix("曜日").or_else(|| s.strip_suffix('曜')).unwrap_or(s);
    match kanji {
        "月" => Ok(Weekday::Mon),
        "火" => Ok(Weekday::Tue),
        "水" => Ok(Weekday::Wed),
        "木" => Ok(Weekday::Thu),
        "金" => Ok(Weekday::Fri),
        "土" => Ok(Weekday::Sat),
        "日" => Ok(Weekday::Sun),
        _ => Err(ScheduleError::UnknownDay(s.to_string())),
    }
}

// ─── JSON shape ─────────────────────────────────────────────────

/// One row of the serialized schedule: `{day, open_time, close_time, is_closed}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayEntry {
    pub day: String,
    #[serde(default)]
    pub open_time: String,
    #[serde(default)]
    pub close_time: String,
    #[serde(default)]
    pub is_closed: bool,
}

impl TryFrom<Vec<DayEntry>> for WeeklySchedule {
    type Error = ScheduleError;

    fn try_from(entries: Vec<DayEntry>) -> Result<Self, Self::Error> {
        let mut seen = [false; 7];
        let mut schedule = WeeklySchedule::closed();

        for entry in entries {
            let day = parse_weekday(&entry.day)?;
            if std::mem::replace(&mut seen[slot(day)], true) {
                return Err(ScheduleError::DuplicateDay(day));
            }

            let open = entry.open_time.trim();
            let close = entry.close_time.trim();
            if entry.is_closed || open.is_empty() || close.is_empty() {
                continue;
            }
            schedule = schedule.with_day(day, parse_time(open)?, parse_time(close)?)?;
        }

        Ok(schedule)
    }
}

impl From<WeeklySchedule> for Vec<DayEntry> {
    fn from(schedule: WeeklySchedule) -> Self {
        let mut day = Weekday::Mon;
        let mut out = Vec::with_capacity(7);
        for _ in 0..7 {
            out.push(match schedule.hours_on(day) {
                Some(h) => DayEntry {
                    day: weekday_name(day).to_string(),
                    open_time: h.open().format(TIME_FORMAT).to_string(),
                    close_time: h.close().format(TIME_FORMAT).to_string(),
                    is_closed: false,
                },
                None => DayEntry {
                    day: weekday_name(day).to_string(),
                    open_time: String::new(),
                    close_time: String::new(),
                    is_closed: true,
                },
            });
            day = day.succ();
        }
        out
    }
}

fn parse_time(s: &str) -> Result<NaiveTime, ScheduleError> {
    NaiveTime::parse_from_str(s, TIME_FORMAT).map_err(|_| ScheduleError::InvalidTime(s.to_string()))
}
