#![forbid(unsafe_code)]
//! Callroster — planification des gardes d'internes (junior + senior par jour).
//!
//! - Calendrier jour par jour, blocs week-end/fériés indivisibles.
//! - Règles d'éligibilité composables, sélection du moins chargé.
//! - Construction gloutonne, chronologique, sans retour arrière.
//! - Profils et export JSON/CSV (feature `serde`).

pub mod calendar;
#[cfg(feature = "serde")]
pub mod config;
#[cfg(feature = "serde")]
pub mod io;
pub mod model;
pub mod scheduler;
pub mod stats;
pub mod storage;

pub use calendar::{CalendarDay, CalendarModel};
#[cfg(feature = "serde")]
pub use config::{HospitalInfo, ResidentDirectory, ResidentProfile};
pub use model::{MidYearWindow, Resident, ResidentId, ResidentYear, Role};
pub use scheduler::{
    detect_violations, BuildState, EligibilityRule, LoadReport, RuleSet, SchedError,
    ScheduleBuilder, ScheduleOptions, ScheduleRow, SelectionPolicy, Violation, ViolationKind,
    MONTHLY_CALL_MAX,
};
pub use stats::{LoadStatistics, ResidentLoad};
