use crate::model::ResidentId;
use crate::scheduler::SchedError;
use chrono::{Datelike, Duration, NaiveDate, Weekday};
use std::collections::BTreeSet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Journée de garde : la date, son statut férié et les deux créneaux.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalendarDay {
    date: NaiveDate,
    is_holiday: bool,
    junior: Option<ResidentId>,
    senior: Option<ResidentId>,
}

impl CalendarDay {
    pub fn new(date: NaiveDate, is_holiday: bool) -> Self {
        Self {
            date,
            is_holiday,
            junior: None,
            senior: None,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn is_weekend(&self) -> bool {
        matches!(self.date.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// Le vendredi ouvre le bloc du week-end.
    pub fn is_friday(&self) -> bool {
        self.date.weekday() == Weekday::Fri
    }

    pub fn is_holiday(&self) -> bool {
        self.is_holiday
    }

    /// Week-end ou jour férié.
    pub fn is_off_duty(&self) -> bool {
        self.is_weekend() || self.is_holiday
    }

    /// Ancre du week-end précédent : `weekday + 1` jours en arrière (le dimanche
    /// qui clôt le dernier week-end). Un lundi férié appartient au week-end
    /// prolongé, l'ancre recule alors de 8 jours.
    pub fn previous_weekend_date(&self) -> NaiveDate {
        let back = if self.date.weekday() == Weekday::Mon && self.is_holiday {
            8
        } else {
            i64::from(self.date.weekday().num_days_from_monday()) + 1
        };
        self.date - Duration::days(back)
    }

    /// Prochain samedi, strictement après cette date.
    pub fn next_weekend_date(&self) -> NaiveDate {
        let ahead = 5 - i64::from(self.date.weekday().num_days_from_monday());
        let ahead = if ahead > 0 { ahead } else { ahead + 7 };
        self.date + Duration::days(ahead)
    }

    pub fn junior(&self) -> Option<&ResidentId> {
        self.junior.as_ref()
    }

    pub fn senior(&self) -> Option<&ResidentId> {
        self.senior.as_ref()
    }

    pub fn is_assigned(&self) -> bool {
        self.junior.is_some() && self.senior.is_some()
    }

    /// Vrai si `id` est de garde ce jour, quel que soit le rôle.
    pub fn is_on_call(&self, id: &ResidentId) -> bool {
        self.junior.as_ref() == Some(id) || self.senior.as_ref() == Some(id)
    }

    pub(crate) fn assign(&mut self, junior: ResidentId, senior: ResidentId) -> Result<(), SchedError> {
        if self.junior.is_some() || self.senior.is_some() {
            return Err(SchedError::AlreadyAssigned(self.date));
        }
        self.junior = Some(junior);
        self.senior = Some(senior);
        Ok(())
    }
}

/// Calendrier complet [start, end], indexé par date.
#[derive(Debug, Clone)]
pub struct CalendarModel {
    start: NaiveDate,
    end: NaiveDate,
    holidays: BTreeSet<NaiveDate>,
    days: Vec<CalendarDay>,
}

impl CalendarModel {
    /// Construit le calendrier vierge ; `start > end` est refusé.
    pub fn new<H>(start: NaiveDate, end: NaiveDate, holidays: H) -> Result<Self, SchedError>
    where
        H: IntoIterator<Item = NaiveDate>,
    {
        if start > end {
            return Err(SchedError::InvalidRange { start, end });
        }
        let holidays: BTreeSet<NaiveDate> = holidays.into_iter().collect();
        let days = start
            .iter_days()
            .take_while(|d| *d <= end)
            .map(|d| CalendarDay::new(d, holidays.contains(&d)))
            .collect();
        Ok(Self {
            start,
            end,
            holidays,
            days,
        })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }
    pub fn end(&self) -> NaiveDate {
        self.end
    }
    pub fn holidays(&self) -> &BTreeSet<NaiveDate> {
        &self.holidays
    }
    pub fn days(&self) -> &[CalendarDay] {
        &self.days
    }
    pub fn len(&self) -> usize {
        self.days.len()
    }
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    fn index_of(&self, date: NaiveDate) -> Option<usize> {
        if !self.contains(date) {
            return None;
        }
        usize::try_from((date - self.start).num_days()).ok()
    }

    pub fn get(&self, date: NaiveDate) -> Option<&CalendarDay> {
        self.index_of(date).and_then(|i| self.days.get(i))
    }

    pub(crate) fn get_mut(&mut self, date: NaiveDate) -> Option<&mut CalendarDay> {
        self.index_of(date).and_then(|i| self.days.get_mut(i))
    }

    /// Jour précédent, s'il appartient à la période.
    pub fn previous(&self, date: NaiveDate) -> Option<&CalendarDay> {
        date.pred_opt().and_then(|d| self.get(d))
    }

    /// Longueur du bloc de garde qui démarre à `date` : 1 plus le nombre de
    /// jours suivants, dans la période, qui sont week-end ou fériés.
    pub fn run_length(&self, date: NaiveDate) -> usize {
        let Some(start) = self.index_of(date) else {
            return 1;
        };
        1 + self.days[start + 1..]
            .iter()
            .take_while(|d| d.is_off_duty())
            .count()
    }

    /// Dates du bloc de garde qui démarre à `date`.
    pub fn run_dates(&self, date: NaiveDate) -> impl Iterator<Item = NaiveDate> {
        date.iter_days().take(self.run_length(date))
    }
}
