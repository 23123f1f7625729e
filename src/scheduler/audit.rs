use super::{ScheduleBuilder, ScheduleOptions};
use crate::calendar::CalendarModel;
use crate::model::{ResidentId, ResidentYear};
use chrono::{Datelike, NaiveDate};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViolationKind {
    DoubleBooked,          // même personne junior et senior
    PostCall,              // garde en semaine le lendemain d'une garde
    BrokenContinuity,      // bloc week-end/férié non tenu par le même binôme
    ConsecutiveWeekend,    // deux week-ends d'affilée
    OverMonthlyCap,        // plafond mensuel dépassé
    OnVacation,            // garde pendant les congés
    OnboardingBlock,       // 2e année sur un bloc long en mois d'accueil
    MidYearSenior,         // 5e année senior sur un bloc de mi-année
}

#[derive(Debug, Clone)]
pub struct Violation {
    pub resident: ResidentId,
    pub date: NaiveDate,
    pub kind: ViolationKind,
}

/// Revérifie le planning résolu contre l'ensemble des règles.
pub fn detect_violations(builder: &ScheduleBuilder) -> Vec<Violation> {
    let calendar = builder.calendar();
    let options = builder.options();
    let mut out = Vec::new();
    // plafond : une seule alerte par (résident, mois)
    let mut capped: HashSet<(ResidentId, u32)> = HashSet::new();

    for day in calendar.days() {
        let (Some(junior), Some(senior)) = (day.junior(), day.senior()) else {
            continue;
        };
        let date = day.date();
        let mut flag = |resident: &ResidentId, kind: ViolationKind| {
            out.push(Violation {
                resident: resident.clone(),
                date,
                kind,
            })
        };

        if junior == senior {
            flag(junior, ViolationKind::DoubleBooked);
        }

        if let Some(prev) = calendar.previous(date).filter(|p| p.is_assigned()) {
            for id in [junior, senior] {
                if day.is_off_duty() && !prev.is_on_call(id) {
                    flag(id, ViolationKind::BrokenContinuity);
                }
                if !day.is_off_duty() && prev.is_on_call(id) {
                    flag(id, ViolationKind::PostCall);
                }
            }
        }

        if day.is_off_duty() || day.is_friday() {
            if let Some(anchor) = calendar.get(day.previous_weekend_date()) {
                for id in [junior, senior] {
                    if anchor.is_on_call(id) {
                        flag(id, ViolationKind::ConsecutiveWeekend);
                    }
                }
            }
        }

        for id in [junior, senior] {
            if builder.stats().monthly(id, date.month()) > options.monthly_call_max
                && capped.insert((id.clone(), date.month()))
            {
                flag(id, ViolationKind::OverMonthlyCap);
            }
            if builder.resident(id).is_some_and(|r| r.is_on_vacation(date)) {
                flag(id, ViolationKind::OnVacation);
            }
        }

        let run_length = calendar.run_length(date);
        if builder
            .resident(junior)
            .is_some_and(|r| r.year() == ResidentYear::Second)
            && run_length > 1
            && date.month() == options.onboarding_month
        {
            flag(junior, ViolationKind::OnboardingBlock);
        }
        if builder
            .resident(senior)
            .is_some_and(|r| r.year() == ResidentYear::Fifth)
            && run_touches_mid_year(calendar, options, date)
        {
            flag(senior, ViolationKind::MidYearSenior);
        }
    }

    out
}

fn run_touches_mid_year(calendar: &CalendarModel, options: &ScheduleOptions, date: NaiveDate) -> bool {
    calendar
        .run_dates(date)
        .any(|d| options.mid_year.contains(d))
}
