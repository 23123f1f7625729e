pub mod audit;
pub mod rules;
pub mod selection;
mod types;

pub use audit::{detect_violations, Violation, ViolationKind};
pub use rules::{EligibilityRule, RuleContext, RuleSet};
pub use selection::SelectionPolicy;
pub use types::{
    BuildState, LoadReport, SchedError, ScheduleOptions, ScheduleRow, MONTHLY_CALL_MAX,
};

use crate::calendar::CalendarModel;
use crate::model::{Resident, ResidentId, Role};
use crate::stats::{LoadStatistics, ResidentLoad};
use chrono::NaiveDate;
use rand::Rng;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// ScheduleBuilder : construit le planning jour après jour, dans l'ordre
/// chronologique, sans retour arrière.
#[derive(Debug)]
pub struct ScheduleBuilder {
    residents: Vec<Resident>,
    index: HashMap<ResidentId, usize>,
    calendar: CalendarModel,
    stats: LoadStatistics,
    options: ScheduleOptions,
    junior_rules: RuleSet,
    senior_rules: RuleSet,
    policy: SelectionPolicy,
    state: BuildState,
}

impl ScheduleBuilder {
    pub fn new<H>(
        residents: Vec<Resident>,
        start: NaiveDate,
        end: NaiveDate,
        holidays: H,
    ) -> Result<Self, SchedError>
    where
        H: IntoIterator<Item = NaiveDate>,
    {
        let calendar = CalendarModel::new(start, end, holidays)?;
        let mut index = HashMap::with_capacity(residents.len());
        for (i, resident) in residents.iter().enumerate() {
            if index.insert(resident.id().clone(), i).is_some() {
                return Err(SchedError::DuplicateResident(resident.id().clone()));
            }
        }
        let stats = LoadStatistics::new(residents.iter().map(Resident::id));
        Ok(Self {
            residents,
            index,
            calendar,
            stats,
            options: ScheduleOptions::default(),
            junior_rules: RuleSet::for_role(Role::Junior),
            senior_rules: RuleSet::for_role(Role::Senior),
            policy: SelectionPolicy,
            state: BuildState::Unbuilt,
        })
    }

    /// Remplace les options ; refusé dès qu'un jour a été résolu.
    pub fn with_options(mut self, options: ScheduleOptions) -> Result<Self, SchedError> {
        if self.state != BuildState::Unbuilt {
            return Err(SchedError::AlreadyStarted);
        }
        self.options = options;
        Ok(self)
    }

    pub fn options(&self) -> &ScheduleOptions {
        &self.options
    }
    pub fn calendar(&self) -> &CalendarModel {
        &self.calendar
    }
    pub fn stats(&self) -> &LoadStatistics {
        &self.stats
    }
    pub fn state(&self) -> BuildState {
        self.state
    }
    pub fn residents(&self) -> &[Resident] {
        &self.residents
    }

    pub fn resident(&self, id: &ResidentId) -> Option<&Resident> {
        self.index.get(id).and_then(|&i| self.residents.get(i))
    }

    pub fn rules(&self, role: Role) -> &RuleSet {
        match role {
            Role::Junior => &self.junior_rules,
            Role::Senior => &self.senior_rules,
        }
    }

    /// Vivier éligible de `role` pour `date`, compte tenu des jours déjà
    /// résolus.
    pub fn eligible(&self, role: Role, date: NaiveDate) -> Result<Vec<&Resident>, SchedError> {
        let day = self
            .calendar
            .get(date)
            .ok_or(SchedError::UnknownDate(date))?;
        let ctx = RuleContext::new(&self.calendar, &self.stats, &self.options, day);
        Ok(self.rules(role).eligible(role, &ctx, &self.residents))
    }

    /// Construit tout le planning. En cas d'épuisement d'un vivier, le
    /// préfixe déjà résolu reste consultable et l'état passe à `Failed`.
    pub fn build<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), SchedError> {
        if self.state == BuildState::Complete {
            return Err(SchedError::AlreadyBuilt);
        }
        while self.step(rng)?.is_some() {}
        info!(
            days = self.calendar.len(),
            residents = self.residents.len(),
            "schedule complete"
        );
        Ok(())
    }

    /// Résout le prochain jour et renvoie sa date, ou `None` si le planning
    /// est complet.
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Option<NaiveDate>, SchedError> {
        let date = match self.state {
            BuildState::Unbuilt => self.calendar.start(),
            BuildState::Building { next } => next,
            BuildState::Complete => return Ok(None),
            BuildState::Failed { date, role } => return Err(SchedError::Halted { date, role }),
        };

        let (junior, senior) = match self.select_for(date, rng) {
            Ok(pair) => pair,
            Err(SchedError::Depleted { date, role }) => {
                warn!(%date, %role, "no eligible resident left, halting");
                self.state = BuildState::Failed { date, role };
                return Err(SchedError::Depleted { date, role });
            }
            Err(other) => return Err(other),
        };

        self.calendar
            .get_mut(date)
            .ok_or(SchedError::UnknownDate(date))?
            .assign(junior.clone(), senior.clone())?;
        self.stats.record(date, &junior, &senior);
        debug!(
            %date,
            junior = self.name_of(&junior),
            senior = self.name_of(&senior),
            "day scheduled"
        );

        self.state = match date.succ_opt() {
            Some(next) if self.calendar.contains(next) => BuildState::Building { next },
            _ => BuildState::Complete,
        };
        Ok(Some(date))
    }

    fn select_for<R: Rng + ?Sized>(
        &self,
        date: NaiveDate,
        rng: &mut R,
    ) -> Result<(ResidentId, ResidentId), SchedError> {
        let juniors = self.eligible(Role::Junior, date)?;
        let seniors = self.eligible(Role::Senior, date)?;
        let (junior, senior) = self
            .policy
            .select_pair(&juniors, &seniors, &self.stats, date, rng)?;
        Ok((junior.id().clone(), senior.id().clone()))
    }

    fn name_of(&self, id: &ResidentId) -> &str {
        self.resident(id).map_or("?", Resident::name)
    }

    /// Lignes (date, junior, senior) des jours résolus, dans l'ordre.
    pub fn rows(&self) -> Vec<ScheduleRow> {
        self.calendar
            .days()
            .iter()
            .filter_map(|day| {
                let junior = self.resident(day.junior()?)?;
                let senior = self.resident(day.senior()?)?;
                Some(ScheduleRow {
                    date: day.date(),
                    junior: junior.name().to_string(),
                    senior: senior.name().to_string(),
                })
            })
            .collect()
    }

    pub fn load(&self, id: &ResidentId) -> ResidentLoad {
        self.stats.load(id)
    }

    /// Bilan par résident, dans l'ordre d'entrée.
    pub fn load_report(&self) -> Vec<LoadReport> {
        self.residents
            .iter()
            .map(|r| {
                let load = self.stats.load(r.id());
                LoadReport {
                    name: r.name().to_string(),
                    year: r.year().number(),
                    total: load.total,
                    by_month: load.by_month,
                }
            })
            .collect()
    }
}
