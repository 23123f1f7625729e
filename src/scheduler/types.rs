use crate::model::{MidYearWindow, ResidentId, Role};
use chrono::{Month, NaiveDate};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Plafond mensuel de gardes par défaut.
pub const MONTHLY_CALL_MAX: u32 = 9;

/// Options de planification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScheduleOptions {
    pub monthly_call_max: u32,
    /// Mois d'accueil des nouveaux internes (début de l'année universitaire).
    pub onboarding_month: u32,
    pub mid_year: MidYearWindow,
}

impl Default for ScheduleOptions {
    fn default() -> Self {
        Self {
            monthly_call_max: MONTHLY_CALL_MAX,
            onboarding_month: Month::July.number_from_month(),
            mid_year: MidYearWindow::default(),
        }
    }
}

/// Étapes de construction du planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Unbuilt,
    Building { next: NaiveDate },
    Complete,
    Failed { date: NaiveDate, role: Role },
}

/// Ligne de planning prête à exporter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScheduleRow {
    pub date: NaiveDate,
    pub junior: String,
    pub senior: String,
}

/// Bilan de charge d'un résident, pour les rapports.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LoadReport {
    pub name: String,
    pub year: u8,
    pub total: u32,
    pub by_month: [u32; 12],
}

#[derive(Error, Debug)]
pub enum SchedError {
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("duplicate resident id: {0}")]
    DuplicateResident(ResidentId),
    #[error("no eligible {role} resident for {date}")]
    Depleted { date: NaiveDate, role: Role },
    #[error("day already assigned: {0}")]
    AlreadyAssigned(NaiveDate),
    #[error("schedule already built")]
    AlreadyBuilt,
    #[error("options cannot change once scheduling has started")]
    AlreadyStarted,
    #[error("schedule halted on {date}: no eligible {role} resident")]
    Halted { date: NaiveDate, role: Role },
    #[error("date outside the schedule: {0}")]
    UnknownDate(NaiveDate),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
