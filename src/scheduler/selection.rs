//! Choix du binôme junior/senior parmi les viviers éligibles.
//!
//! Départage : charge totale minimale, puis charge du mois minimale parmi
//! les survivants, puis tirage uniforme.

use super::SchedError;
use crate::model::{Resident, Role};
use crate::stats::LoadStatistics;
use chrono::{Datelike, NaiveDate};
use rand::seq::IndexedRandom;
use rand::Rng;

/// Politique de sélection « moins chargé d'abord ».
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectionPolicy;

impl SelectionPolicy {
    /// Restreint `pool` aux résidents de charge totale minimale.
    pub fn least_total_loaded<'r>(pool: &[&'r Resident], stats: &LoadStatistics) -> Vec<&'r Resident> {
        let Some(min) = pool.iter().map(|r| stats.total(r.id())).min() else {
            return Vec::new();
        };
        pool.iter()
            .copied()
            .filter(|r| stats.total(r.id()) == min)
            .collect()
    }

    /// Restreint `pool` aux résidents de charge minimale pour `month`.
    pub fn least_monthly_loaded<'r>(
        pool: &[&'r Resident],
        stats: &LoadStatistics,
        month: u32,
    ) -> Vec<&'r Resident> {
        let Some(min) = pool.iter().map(|r| stats.monthly(r.id(), month)).min() else {
            return Vec::new();
        };
        pool.iter()
            .copied()
            .filter(|r| stats.monthly(r.id(), month) == min)
            .collect()
    }

    /// Départage complet ; `None` si le vivier est vide.
    pub fn pick<'r, R: Rng + ?Sized>(
        &self,
        pool: &[&'r Resident],
        stats: &LoadStatistics,
        date: NaiveDate,
        rng: &mut R,
    ) -> Option<&'r Resident> {
        let by_total = Self::least_total_loaded(pool, stats);
        let by_month = Self::least_monthly_loaded(&by_total, stats, date.month());
        by_month.choose(rng).copied()
    }

    /// Choisit le binôme du jour.
    ///
    /// S'il ne reste qu'un senior éligible, il est retenu d'emblée et le junior
    /// est tiré hors de lui ; sinon le junior est tiré en premier et le senior
    /// parmi les autres.
    pub fn select_pair<'r, R: Rng + ?Sized>(
        &self,
        juniors: &[&'r Resident],
        seniors: &[&'r Resident],
        stats: &LoadStatistics,
        date: NaiveDate,
        rng: &mut R,
    ) -> Result<(&'r Resident, &'r Resident), SchedError> {
        if juniors.is_empty() {
            return Err(SchedError::Depleted { date, role: Role::Junior });
        }
        if seniors.is_empty() {
            return Err(SchedError::Depleted { date, role: Role::Senior });
        }

        if let &[senior] = seniors {
            let others = excluding(juniors, senior);
            let junior = self
                .pick(&others, stats, date, rng)
                .ok_or(SchedError::Depleted { date, role: Role::Junior })?;
            return Ok((junior, senior));
        }

        let junior = self
            .pick(juniors, stats, date, rng)
            .ok_or(SchedError::Depleted { date, role: Role::Junior })?;
        let others = excluding(seniors, junior);
        let senior = self
            .pick(&others, stats, date, rng)
            .ok_or(SchedError::Depleted { date, role: Role::Senior })?;
        Ok((junior, senior))
    }
}

fn excluding<'r>(pool: &[&'r Resident], chosen: &Resident) -> Vec<&'r Resident> {
    pool.iter()
        .copied()
        .filter(|r| r.id() != chosen.id())
        .collect()
}
