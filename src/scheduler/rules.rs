//! Règles d'éligibilité.
//!
//! Chaque règle est un prédicat pur sur (jour, résident) ; un [`RuleSet`] est
//! une liste ordonnée de règles qu'un candidat doit toutes satisfaire.

use super::ScheduleOptions;
use crate::calendar::{CalendarDay, CalendarModel};
use crate::model::{Resident, ResidentYear, Role};
use crate::stats::LoadStatistics;
use chrono::{Datelike, NaiveDate};

/// Contexte d'évaluation d'une journée.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub calendar: &'a CalendarModel,
    pub stats: &'a LoadStatistics,
    pub options: &'a ScheduleOptions,
    pub day: &'a CalendarDay,
    /// Longueur du bloc qui démarre ce jour.
    pub run_length: usize,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        calendar: &'a CalendarModel,
        stats: &'a LoadStatistics,
        options: &'a ScheduleOptions,
        day: &'a CalendarDay,
    ) -> Self {
        Self {
            calendar,
            stats,
            options,
            day,
            run_length: calendar.run_length(day.date()),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.day.date()
    }

    fn run_dates(&self) -> impl Iterator<Item = NaiveDate> {
        self.date().iter_days().take(self.run_length)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EligibilityRule {
    /// Aucun jour du bloc ne tombe pendant les congés.
    NotOnVacation,
    /// Week-end ou férié : la personne était de garde la veille.
    OffDutyContinuity,
    /// Jour ouvré : pas de garde la veille.
    NotPostCall,
    /// Vendredi, week-end ou férié : pas de garde au week-end précédent.
    NoConsecutiveWeekends,
    /// Compteur du mois + longueur du bloc <= plafond.
    MonthlyCapacity,
    /// Junior : pas de bloc de plusieurs jours pour un 2e année en mois d'accueil.
    OnboardingBlock,
    /// Senior : pas de 5e année sur un bloc qui touche la fenêtre de mi-année.
    MidYearRotation,
}

impl EligibilityRule {
    pub fn name(&self) -> &'static str {
        match self {
            EligibilityRule::NotOnVacation => "not-on-vacation",
            EligibilityRule::OffDutyContinuity => "off-duty-continuity",
            EligibilityRule::NotPostCall => "not-post-call",
            EligibilityRule::NoConsecutiveWeekends => "no-consecutive-weekends",
            EligibilityRule::MonthlyCapacity => "monthly-capacity",
            EligibilityRule::OnboardingBlock => "onboarding-block",
            EligibilityRule::MidYearRotation => "mid-year-rotation",
        }
    }

    pub fn allows(&self, ctx: &RuleContext<'_>, resident: &Resident) -> bool {
        let id = resident.id();
        match self {
            EligibilityRule::NotOnVacation => {
                ctx.run_dates().all(|date| !resident.is_on_vacation(date))
            }
            EligibilityRule::OffDutyContinuity => {
                if !ctx.day.is_off_duty() {
                    return true;
                }
                ctx.calendar
                    .previous(ctx.date())
                    .map_or(true, |prev| prev.is_on_call(id))
            }
            EligibilityRule::NotPostCall => {
                if ctx.day.is_off_duty() {
                    return true;
                }
                ctx.calendar
                    .previous(ctx.date())
                    .map_or(true, |prev| !prev.is_on_call(id))
            }
            EligibilityRule::NoConsecutiveWeekends => {
                if !(ctx.day.is_off_duty() || ctx.day.is_friday()) {
                    return true;
                }
                ctx.calendar
                    .get(ctx.day.previous_weekend_date())
                    .map_or(true, |anchor| !anchor.is_on_call(id))
            }
            EligibilityRule::MonthlyCapacity => {
                let used = ctx.stats.monthly(id, ctx.date().month()) as usize;
                used + ctx.run_length <= ctx.options.monthly_call_max as usize
            }
            EligibilityRule::OnboardingBlock => {
                !(resident.year() == ResidentYear::Second
                    && ctx.run_length > 1
                    && ctx.date().month() == ctx.options.onboarding_month)
            }
            EligibilityRule::MidYearRotation => {
                resident.year() != ResidentYear::Fifth
                    || !ctx.run_dates().any(|date| ctx.options.mid_year.contains(date))
            }
        }
    }
}

/// Liste ordonnée de règles, composée une fois à la construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<EligibilityRule>,
}

impl RuleSet {
    /// Règles communes aux deux rôles.
    pub fn common() -> Self {
        Self {
            rules: vec![
                EligibilityRule::NotOnVacation,
                EligibilityRule::OffDutyContinuity,
                EligibilityRule::NotPostCall,
                EligibilityRule::NoConsecutiveWeekends,
                EligibilityRule::MonthlyCapacity,
            ],
        }
    }

    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Junior => Self::common().with_rule(EligibilityRule::OnboardingBlock),
            Role::Senior => Self::common().with_rule(EligibilityRule::MidYearRotation),
        }
    }

    pub fn with_rule(mut self, rule: EligibilityRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[EligibilityRule] {
        &self.rules
    }

    pub fn admits(&self, ctx: &RuleContext<'_>, resident: &Resident) -> bool {
        self.rules.iter().all(|rule| rule.allows(ctx, resident))
    }

    /// Première règle qui écarte le résident, s'il y en a une.
    pub fn first_rejection(&self, ctx: &RuleContext<'_>, resident: &Resident) -> Option<EligibilityRule> {
        self.rules
            .iter()
            .copied()
            .find(|rule| !rule.allows(ctx, resident))
    }

    /// Filtre le vivier de `role` pour la journée du contexte.
    pub fn eligible<'r>(
        &self,
        role: Role,
        ctx: &RuleContext<'_>,
        residents: &'r [Resident],
    ) -> Vec<&'r Resident> {
        residents
            .iter()
            .filter(|r| r.holds_role_on(role, ctx.date(), &ctx.options.mid_year))
            .filter(|r| self.admits(ctx, r))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ResidentId;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn resident(id: &str, year: ResidentYear) -> Resident {
        Resident::with_id(ResidentId::new(id), id, year, [])
    }

    fn check(
        calendar: &CalendarModel,
        stats: &LoadStatistics,
        date: NaiveDate,
        rule: EligibilityRule,
        resident: &Resident,
    ) -> bool {
        let options = ScheduleOptions::default();
        let day = calendar.get(date).unwrap();
        let ctx = RuleContext::new(calendar, stats, &options, day);
        rule.allows(&ctx, resident)
    }

    fn assign(calendar: &mut CalendarModel, date: NaiveDate, junior: &str, senior: &str) {
        calendar
            .get_mut(date)
            .unwrap()
            .assign(ResidentId::new(junior), ResidentId::new(senior))
            .unwrap();
    }

    #[test]
    fn vacation_lookahead_covers_whole_block() {
        // vendredi 30 août 2024, lundi 2 septembre férié
        let cal = CalendarModel::new(d(2024, 8, 29), d(2024, 9, 3), [d(2024, 9, 2)]).unwrap();
        let stats = LoadStatistics::default();
        let away = resident("away", ResidentYear::First).on_vacation([d(2024, 9, 2)]);

        assert!(!check(&cal, &stats, d(2024, 8, 30), EligibilityRule::NotOnVacation, &away));
        assert!(check(&cal, &stats, d(2024, 8, 29), EligibilityRule::NotOnVacation, &away));
        assert!(check(&cal, &stats, d(2024, 9, 3), EligibilityRule::NotOnVacation, &away));
    }

    #[test]
    fn off_duty_days_require_previous_day_on_call() {
        let mut cal = CalendarModel::new(d(2024, 9, 6), d(2024, 9, 8), []).unwrap();
        let stats = LoadStatistics::default();
        let a = resident("a", ResidentYear::First);
        let b = resident("b", ResidentYear::First);

        // vendredi : jour ouvré, non concerné
        assert!(check(&cal, &stats, d(2024, 9, 6), EligibilityRule::OffDutyContinuity, &b));

        assign(&mut cal, d(2024, 9, 6), "a", "s");
        assert!(check(&cal, &stats, d(2024, 9, 7), EligibilityRule::OffDutyContinuity, &a));
        assert!(!check(&cal, &stats, d(2024, 9, 7), EligibilityRule::OffDutyContinuity, &b));
    }

    #[test]
    fn first_off_duty_day_in_range_passes_vacuously() {
        let cal = CalendarModel::new(d(2024, 9, 7), d(2024, 9, 8), []).unwrap();
        let stats = LoadStatistics::default();
        let a = resident("a", ResidentYear::First);
        assert!(check(&cal, &stats, d(2024, 9, 7), EligibilityRule::OffDutyContinuity, &a));
    }

    #[test]
    fn weekday_after_call_is_rejected() {
        let mut cal = CalendarModel::new(d(2024, 9, 8), d(2024, 9, 10), []).unwrap();
        let stats = LoadStatistics::default();
        let a = resident("a", ResidentYear::First);
        let b = resident("b", ResidentYear::First);
        assign(&mut cal, d(2024, 9, 8), "a", "s");

        assert!(!check(&cal, &stats, d(2024, 9, 9), EligibilityRule::NotPostCall, &a));
        assert!(check(&cal, &stats, d(2024, 9, 9), EligibilityRule::NotPostCall, &b));
    }

    #[test]
    fn friday_after_worked_weekend_is_rejected() {
        let mut cal = CalendarModel::new(d(2024, 9, 1), d(2024, 9, 8), []).unwrap();
        let stats = LoadStatistics::default();
        let a = resident("a", ResidentYear::First);
        assign(&mut cal, d(2024, 9, 1), "a", "s");

        assert!(!check(&cal, &stats, d(2024, 9, 6), EligibilityRule::NoConsecutiveWeekends, &a));
        assert!(!check(&cal, &stats, d(2024, 9, 7), EligibilityRule::NoConsecutiveWeekends, &a));
        // jeudi : non concerné
        assert!(check(&cal, &stats, d(2024, 9, 5), EligibilityRule::NoConsecutiveWeekends, &a));
    }

    #[test]
    fn capacity_counts_the_whole_block() {
        let cal = CalendarModel::new(d(2024, 9, 5), d(2024, 9, 8), []).unwrap();
        let a = resident("a", ResidentYear::First);
        let s = ResidentId::new("s");
        let mut stats = LoadStatistics::new([a.id(), &s]);
        for day in 1..=6 {
            stats.record(d(2024, 9, day), a.id(), &s);
        }

        // 6 + 3 (vendredi, samedi, dimanche) = 9
        assert!(check(&cal, &stats, d(2024, 9, 6), EligibilityRule::MonthlyCapacity, &a));
        stats.record(d(2024, 9, 20), a.id(), &s);
        assert!(!check(&cal, &stats, d(2024, 9, 6), EligibilityRule::MonthlyCapacity, &a));
        assert!(check(&cal, &stats, d(2024, 9, 5), EligibilityRule::MonthlyCapacity, &a));
    }

    #[test]
    fn second_years_skip_multi_day_blocks_in_july() {
        let cal = CalendarModel::new(d(2024, 7, 4), d(2024, 7, 7), []).unwrap();
        let stats = LoadStatistics::default();
        let second = resident("second", ResidentYear::Second);
        let first = resident("first", ResidentYear::First);

        assert!(!check(&cal, &stats, d(2024, 7, 5), EligibilityRule::OnboardingBlock, &second));
        assert!(check(&cal, &stats, d(2024, 7, 4), EligibilityRule::OnboardingBlock, &second));
        assert!(check(&cal, &stats, d(2024, 7, 5), EligibilityRule::OnboardingBlock, &first));
    }

    #[test]
    fn fifth_years_excluded_when_block_touches_mid_year() {
        // vendredi 31 janvier 2025 : le bloc déborde sur février
        let cal = CalendarModel::new(d(2025, 1, 30), d(2025, 2, 2), []).unwrap();
        let stats = LoadStatistics::default();
        let fifth = resident("fifth", ResidentYear::Fifth);
        let fourth = resident("fourth", ResidentYear::Fourth);

        assert!(!check(&cal, &stats, d(2025, 1, 31), EligibilityRule::MidYearRotation, &fifth));
        assert!(check(&cal, &stats, d(2025, 1, 30), EligibilityRule::MidYearRotation, &fifth));
        assert!(check(&cal, &stats, d(2025, 1, 31), EligibilityRule::MidYearRotation, &fourth));
    }

    #[test]
    fn role_sets_extend_common_rules() {
        assert_eq!(RuleSet::common().rules().len(), 5);
        assert_eq!(
            RuleSet::for_role(Role::Junior).rules().last(),
            Some(&EligibilityRule::OnboardingBlock)
        );
        assert_eq!(
            RuleSet::for_role(Role::Senior).rules().last(),
            Some(&EligibilityRule::MidYearRotation)
        );
    }

    #[test]
    fn first_rejection_names_the_failing_rule() {
        let cal = CalendarModel::new(d(2024, 9, 4), d(2024, 9, 4), []).unwrap();
        let stats = LoadStatistics::default();
        let options = ScheduleOptions::default();
        let day = cal.get(d(2024, 9, 4)).unwrap();
        let ctx = RuleContext::new(&cal, &stats, &options, day);
        let away = resident("away", ResidentYear::First).on_vacation([d(2024, 9, 4)]);

        assert_eq!(
            RuleSet::common().first_rejection(&ctx, &away),
            Some(EligibilityRule::NotOnVacation)
        );
    }
}
