use crate::catalog::Catalog;
use chrono_tz::Tz;

pub struct AppState {
    pub catalog: Catalog,
    /// Facility wall-clock zone used to evaluate opening hours.
    pub tz: Tz,
}
