//! Proximity filtering and ranking.
//!
//! Pipeline: drop inactive hospitals and those without coordinates → emergency filter →
//! specialty filter → distance → radius cut → stable sort → limit.
//! Malformed parameters (negative radius, limit ≤ 0) yield an empty result.

use crate::geo::{self, GeoPoint};
use crate::hospital::HospitalRecord;
use serde::Serialize;

pub const DEFAULT_RADIUS_KM: f64 = 10.0;
pub const DEFAULT_LIMIT: i64 = 20;

/// Parameters of a nearby search.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyQuery {
    pub origin: GeoPoint,
    pub max_distance_km: f64,
    pub specialty: Option<String>,
    pub emergency_only: bool,
    pub limit: i64,
}

impl NearbyQuery {
    pub fn new(origin: GeoPoint) -> Self {
        Self {
            origin,
            max_distance_km: DEFAULT_RADIUS_KM,
            specialty: None,
            emergency_only: false,
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn within_km(mut self, km: f64) -> Self {
        self.max_distance_km = km;
        self
    }

    pub fn specialty(mut self, specialty: impl Into<String>) -> Self {
        self.specialty = Some(specialty.into());
        self
    }

    pub fn emergency_only(mut self, yes: bool) -> Self {
        self.emergency_only = yes;
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit;
        self
    }
}

/// A hospital annotated with its distance from the query origin.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProximityResult {
    pub hospital: HospitalRecord,
    pub distance_km: f64,
}

/// Hospitals within `query.max_distance_km` of the origin, nearest first.
///
/// Hospitals at equal distance keep their input order.
pub fn find_nearby(hospitals: &[HospitalRecord], query: &NearbyQuery) -> Vec<ProximityResult> {
    if query.limit <= 0 {
        return Vec::new();
    }
    let specialty = query.specialty.as_deref().filter(|s| !s.is_empty());

    let mut results: Vec<ProximityResult> = hospitals
        .iter()
        .filter(|h| h.is_active)
        .filter(|h| !query.emergency_only || h.emergency_capable)
        .filter(|h| specialty.map_or(true, |s| h.offers_specialty(s)))
        .filter_map(|h| {
            let location = h.location?;
            let distance_km = geo::distance_km(query.origin, location);
            // Also rejects NaN distances and a NaN radius.
            if !(distance_km <= query.max_distance_km) {
                return None;
            }
            Some(ProximityResult { hospital: h.clone(), distance_km })
        })
        .collect();

    // sort_by is stable: ties stay in input order.
    results.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    results.truncate(usize::try_from(query.limit).unwrap_or(usize::MAX));
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: GeoPoint = GeoPoint { latitude: 35.0, longitude: 139.0 };

    /// Roughly `km` kilometers due north of ORIGIN.
    fn north_of_origin(id: &str, km: f64) -> HospitalRecord {
        let deg = km / (6371.0 * std::f64::consts::PI / 180.0);
        HospitalRecord::new(id, id).at(ORIGIN.latitude + deg, ORIGIN.longitude)
    }

    fn ids(results: &[ProximityResult]) -> Vec<&str> {
        results.iter().map(|r| r.hospital.id.as_str()).collect()
    }

    #[test]
    fn test_scenario_radius_and_order() {
        let hospitals = vec![
            north_of_origin("H1", 1.2),
            north_of_origin("H2", 0.8),
            north_of_origin("H3", 15.0),
        ];
        let q = NearbyQuery::new(ORIGIN).within_km(10.0).limit(10);
        let results = find_nearby(&hospitals, &q);
        assert_eq!(ids(&results), vec!["H2", "H1"]);
        assert!((results[0].distance_km - 0.8).abs() < 1e-6);
        assert!((results[1].distance_km - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_empty_input() {
        assert!(find_nearby(&[], &NearbyQuery::new(ORIGIN)).is_empty());
    }

    #[test]
    fn test_limit_zero_and_negative() {
        let hospitals = vec![north_of_origin("H1", 1.0)];
        assert!(find_nearby(&hospitals, &NearbyQuery::new(ORIGIN).limit(0)).is_empty());
        assert!(find_nearby(&hospitals, &NearbyQuery::new(ORIGIN).limit(-3)).is_empty());
    }

    #[test]
    fn test_limit_truncates() {
        let hospitals: Vec<_> = (1..=5).map(|i| north_of_origin(&format!("H{}", i), i as f64)).collect();
        let results = find_nearby(&hospitals, &NearbyQuery::new(ORIGIN).limit(2));
        assert_eq!(ids(&results), vec!["H1", "H2"]);
    }

    #[test]
    fn test_negative_radius_is_empty() {
        let hospitals = vec![HospitalRecord::new("same", "same").at(ORIGIN.latitude, ORIGIN.longitude)];
        assert!(find_nearby(&hospitals, &NearbyQuery::new(ORIGIN).within_km(-1.0)).is_empty());
        assert!(find_nearby(&hospitals, &NearbyQuery::new(ORIGIN).within_km(f64::NAN)).is_empty());
        assert_eq!(find_nearby(&hospitals, &NearbyQuery::new(ORIGIN).within_km(0.0)).len(), 1);
    }

    #[test]
    fn test_missing_location_skipped() {
        let hospitals = vec![HospitalRecord::new("nowhere", "No Coordinates"), north_of_origin("H1", 1.0)];
        assert_eq!(ids(&find_nearby(&hospitals, &NearbyQuery::new(ORIGIN))), vec!["H1"]);
    }

    #[test]
    fn test_inactive_skipped() {
        let hospitals = vec![
            north_of_origin("closed-down", 0.2).active(false),
            north_of_origin("H1", 1.0),
        ];
        assert_eq!(ids(&find_nearby(&hospitals, &NearbyQuery::new(ORIGIN))), vec!["H1"]);
    }

    #[test]
    fn test_suspended_specialty_filtered() {
        let hospitals = vec![
            north_of_origin("peds-paused", 0.5).with_specialties(["Pediatrics"]).suspend_specialty("Pediatrics"),
            north_of_origin("peds", 2.0).with_specialties(["Pediatrics"]),
        ];
        let q = NearbyQuery::new(ORIGIN).specialty("pediatrics");
        assert_eq!(ids(&find_nearby(&hospitals, &q)), vec!["peds"]);
    }

    #[test]
    fn test_emergency_only() {
        let hospitals = vec![
            north_of_origin("clinic", 0.5),
            north_of_origin("er", 2.0).emergency(true),
        ];
        let all = find_nearby(&hospitals, &NearbyQuery::new(ORIGIN));
        assert_eq!(ids(&all), vec!["clinic", "er"]);
        let er = find_nearby(&hospitals, &NearbyQuery::new(ORIGIN).emergency_only(true));
        assert_eq!(ids(&er), vec!["er"]);
    }

    #[test]
    fn test_specialty_filter() {
        let hospitals = vec![
            north_of_origin("derm", 0.5).with_specialties(["Dermatology"]),
            north_of_origin("ortho", 1.0).with_specialties(["Orthopedic Surgery", "Rehabilitation"]),
        ];
        let q = NearbyQuery::new(ORIGIN).specialty("surgery");
        assert_eq!(ids(&find_nearby(&hospitals, &q)), vec!["ortho"]);

        let q = NearbyQuery::new(ORIGIN).specialty("Cardiology");
        assert!(find_nearby(&hospitals, &q).is_empty());

        let q = NearbyQuery::new(ORIGIN).specialty("");
        assert_eq!(find_nearby(&hospitals, &q).len(), 2);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let hospitals = vec![
            north_of_origin("b", 3.0),
            north_of_origin("a", 3.0),
            north_of_origin("c", 1.0),
            north_of_origin("d", 3.0),
        ];
        let results = find_nearby(&hospitals, &NearbyQuery::new(ORIGIN));
        assert_eq!(ids(&results), vec!["c", "b", "a", "d"]);
    }

    #[test]
    fn test_sorted_and_within_radius() {
        let hospitals: Vec<_> = [7.5, 0.3, 12.0, 4.4, 9.99, 10.5, 2.2, 6.1]
            .iter()
            .enumerate()
            .map(|(i, km)| north_of_origin(&format!("H{}", i), *km))
            .collect();
        let q = NearbyQuery::new(ORIGIN).within_km(10.0).limit(100);
        let results = find_nearby(&hospitals, &q);
        assert_eq!(results.len(), 6);
        assert!(results.iter().all(|r| r.distance_km <= q.max_distance_km));
        assert!(results.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
    }

    #[test]
    fn test_input_not_mutated() {
        let hospitals = vec![north_of_origin("H2", 2.0), north_of_origin("H1", 1.0)];
        let before = hospitals.clone();
        let _ = find_nearby(&hospitals, &NearbyQuery::new(ORIGIN));
        assert_eq!(hospitals, before);
    }
}
