//! Per-hospital status view: open now, today's hours, next opening.

use crate::geo;
use crate::hospital::HospitalRecord;
use crate::hours::{self, weekday_name};
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct HospitalDetail {
    #[serde(flatten)]
    pub hospital: HospitalRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted_coords: Option<String>,
    pub is_open_now: bool,
    /// "HH:MM-HH:MM", or null when there are no hours today.
    pub today_hours: Option<String>,
    /// "Tuesday 09:00". Only set while the hospital is closed.
    pub next_open: Option<String>,
}

impl HospitalDetail {
    /// Evaluate `hospital` at facility-local time `now`.
    pub fn at(hospital: &HospitalRecord, now: NaiveDateTime) -> Self {
        let is_open_now = hours::is_open(&hospital.schedule, now);
        let next_open = if is_open_now {
            None
        } else {
            hours::next_open(&hospital.schedule, now)
                .map(|(day, time)| format!("{} {}", weekday_name(day), time.format("%H:%M")))
        };

        Self {
            hospital: hospital.clone(),
            formatted_coords: hospital.location.map(geo::format_coords),
            is_open_now,
            today_hours: hours::today_hours(&hospital.schedule, now),
            next_open,
        }
    }
}
