//! Hospital catalog: the boundary where records are built.
//!
//! Sources, in order: an explicit JSON file, ~/.hospital-finder/hospitals.json,
//! then the built-in Tokyo sample set.

use crate::hospital::HospitalRecord;
use crate::hours::{DayEntry, WeeklySchedule};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

// ─── Errors ─────────────────────────────────────────────────────

#[derive(Debug)]
pub enum CatalogError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
    DuplicateId(String),
    /// Rating outside 0.0..=5.0 or not finite.
    InvalidRating { id: String, rating: f64 },
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "Cannot read catalog {}: {}", path.display(), source),
            Self::Parse { path, source } => write!(f, "Invalid catalog {}: {}", path.display(), source),
            Self::DuplicateId(id) => write!(f, "Duplicate hospital id '{}'", id),
            Self::InvalidRating { id, rating } => {
                write!(f, "Hospital '{}' has rating {}, expected 0.0 to 5.0", id, rating)
            }
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::DuplicateId(_) | Self::InvalidRating { .. } => None,
        }
    }
}

// ─── Built-in dataset ───────────────────────────────────────────

struct BuiltinHospital {
    id: &'static str,
    name: &'static str,
    lat: f64,
    lon: f64,
    address: &'static str,
    phone: &'static str,
    emergency: bool,
    rating: f64,
    total_reviews: u32,
    /// (name, average wait in minutes)
    specialties: &'static [(&'static str, Option<u32>)],
    /// (open, close) Monday–Friday.
    weekdays: (&'static str, &'static str),
    /// (open, close) Saturday. Sundays are closed.
    saturday: (&'static str, &'static str),
}

const BUILTIN_HOSPITALS: &[BuiltinHospital] = &[
    BuiltinHospital {
        id: "tokyo-general",
        name: "Tokyo General Hospital",
        lat: 35.6896, lon: 139.6917,
        address: "1-1-1 Nishi-Shinjuku, Shinjuku, Tokyo",
        phone: "03-1234-5678",
        emergency: true,
        rating: 4.2,
        total_reviews: 128,
        specialties: &[("Internal Medicine", Some(30)), ("Surgery", Some(45)), ("Pediatrics", Some(25)), ("Orthopedics", Some(40)), ("Emergency Medicine", Some(60))],
        weekdays: ("09:00", "17:00"),
        saturday: ("09:00", "12:00"),
    },
    BuiltinHospital {
        id: "sakura-clinic",
        name: "Sakura Clinic",
        lat: 35.6598, lon: 139.7036,
        address: "2-2-2 Shibuya, Shibuya, Tokyo",
        phone: "03-2345-6789",
        emergency: false,
        rating: 4.5,
        total_reviews: 89,
        specialties: &[("Internal Medicine", Some(20)), ("Pediatrics", Some(15))],
        weekdays: ("09:00", "18:00"),
        saturday: ("09:00", "13:00"),
    },
    BuiltinHospital {
        id: "city-general",
        name: "City General Hospital",
        lat: 35.6762, lon: 139.6503,
        address: "1-2-3 Shibuya, Shibuya, Tokyo",
        phone: "03-3456-7890",
        emergency: true,
        rating: 4.2,
        total_reviews: 0,
        specialties: &[("Internal Medicine", None), ("Surgery", None), ("Pediatrics", None), ("Orthopedics", None), ("Neurology", None)],
        weekdays: ("09:00", "17:00"),
        saturday: ("09:00", "12:00"),
    },
    BuiltinHospital {
        id: "tanaka-clinic",
        name: "Tanaka Clinic",
        lat: 35.6754, lon: 139.6492,
        address: "Shibuya, Tokyo",
        phone: "03-4567-8901",
        emergency: false,
        rating: 4.5,
        total_reviews: 0,
        specialties: &[("Internal Medicine", None), ("Dermatology", None)],
        weekdays: ("09:00", "18:00"),
        saturday: ("09:00", "13:00"),
    },
    BuiltinHospital {
        id: "orthopedic-center",
        name: "Orthopedic Specialty Hospital",
        lat: 35.6745, lon: 139.6515,
        address: "Shibuya, Tokyo",
        phone: "03-5678-9012",
        emergency: false,
        rating: 4.0,
        total_reviews: 0,
        specialties: &[("Orthopedics", None), ("Rehabilitation", None)],
        weekdays: ("08:30", "17:30"),
        saturday: ("08:30", "12:30"),
    },
];

fn builtin_to_record(b: &BuiltinHospital) -> Result<HospitalRecord, crate::hours::ScheduleError> {
    let row = |day: &str, (open, close): (&str, &str)| DayEntry {
        day: day.to_string(),
        open_time: open.to_string(),
        close_time: close.to_string(),
        is_closed: false,
    };
    let mut rows: Vec<DayEntry> = ["Mon", "Tue", "Wed", "Thu", "Fri"]
        .iter()
        .map(|d| row(*d, b.weekdays))
        .collect();
    rows.push(row("Sat", b.saturday));
    let schedule = WeeklySchedule::try_from(rows)?;

    let mut record = HospitalRecord::new(b.id, b.name)
        .at(b.lat, b.lon)
        .with_schedule(schedule)
        .with_specialties(b.specialties.iter().map(|(name, _)| *name))
        .emergency(b.emergency)
        .with_rating(b.rating);
    for (name, wait) in b.specialties {
        if let Some(minutes) = wait {
            record = record.with_wait_time(*name, *minutes);
        }
    }
    record.total_reviews = b.total_reviews;
    record.address = Some(b.address.to_string());
    record.phone = Some(b.phone.to_string());
    Ok(record)
}

// ─── Catalog ────────────────────────────────────────────────────

/// Read-only set of hospitals, in load order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    hospitals: Vec<HospitalRecord>,
}

impl Catalog {
    pub fn new(hospitals: Vec<HospitalRecord>) -> Result<Self, CatalogError> {
        let mut ids = HashSet::new();
        for h in &hospitals {
            if !ids.insert(h.id.as_str()) {
                return Err(CatalogError::DuplicateId(h.id.clone()));
            }
            if let Some(rating) = h.rating {
                // NaN fails the range check too.
                if !(0.0..=5.0).contains(&rating) {
                    return Err(CatalogError::InvalidRating { id: h.id.clone(), rating });
                }
            }
        }
        Ok(Self { hospitals })
    }

    /// The built-in sample hospitals.
    pub fn builtin() -> Self {
        let hospitals = BUILTIN_HOSPITALS
            .iter()
            .filter_map(|b| match builtin_to_record(b) {
                Ok(r) => Some(r),
                Err(e) => {
                    tracing::warn!(id = b.id, error = %e, "skipping built-in hospital");
                    None
                }
            })
            .collect();
        Self { hospitals }
    }

    /// Load a JSON array of hospital records.
    pub fn load_from(path: &Path) -> Result<Self, CatalogError> {
        let data = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let hospitals: Vec<HospitalRecord> = serde_json::from_str(&data).map_err(|source| CatalogError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), count = hospitals.len(), "loaded hospital catalog");
        Self::new(hospitals)
    }

    /// Explicit path if given, else the default file if present, else built-in data.
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        Self::load_with_default(path, &Self::default_path())
    }

    /// Same as [`Catalog::load`] with a caller-chosen default file (for testing).
    pub fn load_with_default(path: Option<&Path>, default: &Path) -> Result<Self, CatalogError> {
        if let Some(p) = path {
            return Self::load_from(p);
        }
        if default.is_file() {
            return Self::load_from(default);
        }
        tracing::warn!(path = %default.display(), "no catalog file, using built-in hospitals");
        Ok(Self::builtin())
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".hospital-finder")
            .join("hospitals.json")
    }

    pub fn hospitals(&self) -> &[HospitalRecord] {
        &self.hospitals
    }

    pub fn len(&self) -> usize {
        self.hospitals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hospitals.is_empty()
    }

    /// Lookup by id. Inactive hospitals are not returned.
    pub fn get(&self, id: &str) -> Option<&HospitalRecord> {
        self.hospitals.iter().find(|h| h.is_active && h.id == id)
    }

    /// Name search: case-insensitive substring, empty query matches everything.
    /// Results keep catalog order and skip inactive hospitals.
    pub fn search(&self, query: &str, specialty: Option<&str>, limit: i64) -> Vec<&HospitalRecord> {
        let needle = query.trim().to_lowercase();
        let specialty = specialty.filter(|s| !s.is_empty());
        let limit = usize::try_from(limit).unwrap_or(0);

        self.hospitals
            .iter()
            .filter(|h| h.is_active)
            .filter(|h| needle.is_empty() || h.name.to_lowercase().contains(&needle))
            .filter(|h| specialty.map_or(true, |s| h.offers_specialty(s)))
            .take(limit)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_builtin_complete() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.len(), BUILTIN_HOSPITALS.len());
        for h in catalog.hospitals() {
            assert!(h.location.is_some(), "{} has no location", h.id);
            assert!(h.schedule.has_any_hours(), "{} has no hours", h.id);
        }
    }

    #[test]
    fn test_get() {
        let catalog = Catalog::builtin();
        let h = catalog.get("tokyo-general").unwrap();
        assert_eq!(h.name, "Tokyo General Hospital");
        assert!(h.emergency_capable);
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn test_builtin_wait_times_and_reviews() {
        let catalog = Catalog::builtin();
        let h = catalog.get("tokyo-general").unwrap();
        assert_eq!(h.total_reviews, 128);
        assert_eq!(h.wait_times.get("Surgery"), Some(&45));
        assert_eq!(h.wait_times.len(), 5);
        assert!(catalog.get("tanaka-clinic").unwrap().wait_times.is_empty());
    }

    #[test]
    fn test_inactive_hidden_from_get_and_search() {
        let catalog = Catalog::new(vec![
            HospitalRecord::new("old", "Old Clinic").active(false),
            HospitalRecord::new("new", "New Clinic"),
        ])
        .unwrap();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.get("old").is_none());
        assert!(catalog.get("new").is_some());
        let ids: Vec<_> = catalog.search("clinic", None, 20).iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["new"]);
    }

    #[test]
    fn test_invalid_rating_rejected() {
        for bad in [17.5, -0.5, f64::NAN, f64::INFINITY] {
            let result = Catalog::new(vec![HospitalRecord::new("x", "X").with_rating(bad)]);
            assert!(
                matches!(result, Err(CatalogError::InvalidRating { ref id, .. }) if id == "x"),
                "rating {} accepted",
                bad
            );
        }
        for ok in [0.0, 3.5, 5.0] {
            assert!(Catalog::new(vec![HospitalRecord::new("x", "X").with_rating(ok)]).is_ok());
        }
    }

    #[test]
    fn test_invalid_rating_in_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hospitals.json");
        fs::write(&path, r#"[{"id": "a", "name": "A", "rating": 17.5}]"#).unwrap();
        let err = Catalog::load_from(&path).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidRating { rating, .. } if rating == 17.5));
        assert!(err.to_string().contains("17.5"));
    }

    #[test]
    fn test_search_by_name() {
        let catalog = Catalog::builtin();
        let names: Vec<_> = catalog.search("clinic", None, 20).iter().map(|h| h.id.as_str()).collect();
        assert_eq!(names, vec!["sakura-clinic", "tanaka-clinic"]);
    }

    #[test]
    fn test_search_with_specialty_and_limit() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.search("", Some("dermatology"), 20).len(), 1);
        assert_eq!(catalog.search("", None, 2).len(), 2);
        assert!(catalog.search("", None, 0).is_empty());
        assert!(catalog.search("hospital", Some("Dermatology"), 20).is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hospitals.json");
        fs::write(
            &path,
            r#"[
                {"id": "a", "name": "Alpha", "location": {"latitude": 1.0, "longitude": 2.0}},
                {"id": "b", "name": "Beta", "specialties": ["Cardiology"]}
            ]"#,
        )
        .unwrap();

        let catalog = Catalog::load(Some(&path)).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("b").unwrap().specialties.len(), 1);
    }

    #[test]
    fn test_load_with_default_file_present() {
        let dir = TempDir::new().unwrap();
        let default = dir.path().join("hospitals.json");
        fs::write(&default, r#"[{"id": "only", "name": "Only Hospital"}]"#).unwrap();

        let catalog = Catalog::load_with_default(None, &default).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("only").is_some());
    }

    #[test]
    fn test_load_with_default_falls_back_to_builtin() {
        let dir = TempDir::new().unwrap();
        let default = dir.path().join("absent.json");

        let catalog = Catalog::load_with_default(None, &default).unwrap();
        assert_eq!(catalog.len(), BUILTIN_HOSPITALS.len());
        assert!(catalog.get("tokyo-general").is_some());
    }

    #[test]
    fn test_explicit_path_wins_over_default() {
        let dir = TempDir::new().unwrap();
        let default = dir.path().join("default.json");
        fs::write(&default, r#"[{"id": "d", "name": "Default"}]"#).unwrap();
        let explicit = dir.path().join("explicit.json");
        fs::write(&explicit, r#"[{"id": "e", "name": "Explicit"}]"#).unwrap();

        let catalog = Catalog::load_with_default(Some(&explicit), &default).unwrap();
        assert!(catalog.get("e").is_some());
        assert!(catalog.get("d").is_none());

        // An explicit path that does not exist is an error, not a fallback.
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            Catalog::load_with_default(Some(&missing), &default),
            Err(CatalogError::Io { .. })
        ));
    }

    #[test]
    fn test_load_errors() {
        let dir = TempDir::new().unwrap();

        let missing = dir.path().join("nope.json");
        assert!(matches!(Catalog::load_from(&missing), Err(CatalogError::Io { .. })));

        let garbage = dir.path().join("bad.json");
        fs::write(&garbage, "{ not json").unwrap();
        assert!(matches!(Catalog::load_from(&garbage), Err(CatalogError::Parse { .. })));

        let reversed = dir.path().join("reversed.json");
        fs::write(
            &reversed,
            r#"[{"id": "a", "name": "A", "schedule": [{"day": "Mon", "open_time": "18:00", "close_time": "09:00"}]}]"#,
        )
        .unwrap();
        assert!(matches!(Catalog::load_from(&reversed), Err(CatalogError::Parse { .. })));

        let dup = dir.path().join("dup.json");
        fs::write(&dup, r#"[{"id": "a", "name": "A"}, {"id": "a", "name": "A again"}]"#).unwrap();
        assert!(matches!(Catalog::load_from(&dup), Err(CatalogError::DuplicateId(ref id)) if id == "a"));
    }
}
