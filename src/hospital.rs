//! The hospital record passed through every query.

use crate::geo::GeoPoint;
use crate::hours::WeeklySchedule;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A hospital as loaded from the catalog. Queries borrow it; nothing mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalRecord {
    pub id: String,
    pub name: String,
    /// Missing coordinates exclude the hospital from proximity search.
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub schedule: WeeklySchedule,
    #[serde(default)]
    pub emergency_capable: bool,
    #[serde(default)]
    pub specialties: BTreeSet<String>,
    /// Listed specialties that are temporarily not offered. Matched by name,
    /// case-insensitive.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub unavailable_specialties: BTreeSet<String>,
    /// Average wait per specialty, in minutes.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub wait_times: BTreeMap<String, u32>,
    /// Inactive hospitals are hidden from search, nearby and detail lookups.
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Average review score, 0.0 to 5.0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default)]
    pub total_reviews: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
}

fn default_active() -> bool {
    true
}

impl HospitalRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location: None,
            schedule: WeeklySchedule::closed(),
            emergency_capable: false,
            specialties: BTreeSet::new(),
            unavailable_specialties: BTreeSet::new(),
            wait_times: BTreeMap::new(),
            is_active: true,
            rating: None,
            total_reviews: 0,
            address: None,
            phone: None,
            website: None,
        }
    }

    pub fn at(mut self, latitude: f64, longitude: f64) -> Self {
        self.location = Some(GeoPoint::new(latitude, longitude));
        self
    }

    pub fn with_schedule(mut self, schedule: WeeklySchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn with_specialties<I, S>(mut self, specialties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.specialties.extend(specialties.into_iter().map(Into::into));
        self
    }

    pub fn emergency(mut self, capable: bool) -> Self {
        self.emergency_capable = capable;
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn active(mut self, yes: bool) -> Self {
        self.is_active = yes;
        self
    }

    /// Mark a listed specialty as not currently offered.
    pub fn suspend_specialty(mut self, name: impl Into<String>) -> Self {
        self.unavailable_specialties.insert(name.into());
        self
    }

    pub fn with_wait_time(mut self, specialty: impl Into<String>, minutes: u32) -> Self {
        self.wait_times.insert(specialty.into(), minutes);
        self
    }

    /// Specialties currently offered: listed and not suspended.
    pub fn available_specialties(&self) -> impl Iterator<Item = &str> {
        self.specialties
            .iter()
            .filter(|s| {
                let name = s.to_lowercase();
                !self.unavailable_specialties.iter().any(|u| u.to_lowercase() == name)
            })
            .map(String::as_str)
    }

    /// Case-insensitive substring match against any available specialty.
    pub fn offers_specialty(&self, filter: &str) -> bool {
        let needle = filter.to_lowercase();
        self.available_specialties().any(|s| s.to_lowercase().contains(&needle))
    }
}
