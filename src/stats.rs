//! Compteurs de gardes par résident : total sur la période et par mois.
//!
//! Les compteurs mensuels sont indexés par le seul numéro de mois (1-12). Une
//! période qui couvre deux fois le même mois (deux années civiles) cumule les
//! deux dans le même compteur ; la somme mensuelle n'égale donc le total que
//! pour une période d'au plus douze mois distincts.

use crate::model::ResidentId;
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Charge d'un résident.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResidentLoad {
    pub total: u32,
    pub by_month: [u32; 12],
}

impl ResidentLoad {
    /// Compteur du mois `month` (1-12) ; 0 hors bornes.
    pub fn month(&self, month: u32) -> u32 {
        month
            .checked_sub(1)
            .and_then(|i| self.by_month.get(i as usize))
            .copied()
            .unwrap_or(0)
    }

    pub fn monthly_sum(&self) -> u32 {
        self.by_month.iter().sum()
    }

    fn record(&mut self, date: NaiveDate) {
        self.total += 1;
        self.by_month[date.month0() as usize] += 1;
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadStatistics {
    loads: HashMap<ResidentId, ResidentLoad>,
}

impl LoadStatistics {
    pub fn new<'a, I>(ids: I) -> Self
    where
        I: IntoIterator<Item = &'a ResidentId>,
    {
        Self {
            loads: ids
                .into_iter()
                .map(|id| (id.clone(), ResidentLoad::default()))
                .collect(),
        }
    }

    /// Enregistre une journée : +1 total et +1 mensuel pour chacun des deux.
    pub fn record(&mut self, date: NaiveDate, junior: &ResidentId, senior: &ResidentId) {
        for id in [junior, senior] {
            self.loads.entry(id.clone()).or_default().record(date);
        }
    }

    pub fn load(&self, id: &ResidentId) -> ResidentLoad {
        self.loads.get(id).copied().unwrap_or_default()
    }

    pub fn total(&self, id: &ResidentId) -> u32 {
        self.load(id).total
    }

    pub fn monthly(&self, id: &ResidentId, month: u32) -> u32 {
        self.load(id).month(month)
    }
}
