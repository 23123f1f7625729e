use chrono::{Datelike, NaiveDate};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifiant fort pour Resident
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ResidentId(String);

impl ResidentId {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        Self(s.as_ref().to_owned())
    }
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResidentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Année de résidanat (PGY-1 à PGY-5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub enum ResidentYear {
    First,
    Second,
    Third,
    Fourth,
    Fifth,
}

impl ResidentYear {
    pub const ALL: [ResidentYear; 5] = [
        ResidentYear::First,
        ResidentYear::Second,
        ResidentYear::Third,
        ResidentYear::Fourth,
        ResidentYear::Fifth,
    ];

    pub fn number(self) -> u8 {
        match self {
            ResidentYear::First => 1,
            ResidentYear::Second => 2,
            ResidentYear::Third => 3,
            ResidentYear::Fourth => 4,
            ResidentYear::Fifth => 5,
        }
    }
}

impl TryFrom<u8> for ResidentYear {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ResidentYear::First),
            2 => Ok(ResidentYear::Second),
            3 => Ok(ResidentYear::Third),
            4 => Ok(ResidentYear::Fourth),
            5 => Ok(ResidentYear::Fifth),
            other => Err(format!("resident year must be between 1 and 5, got {other}")),
        }
    }
}

impl From<ResidentYear> for u8 {
    fn from(year: ResidentYear) -> Self {
        year.number()
    }
}

impl fmt::Display for ResidentYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PGY-{}", self.number())
    }
}

/// Role tenu pour une journée de garde.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Role {
    Junior,
    Senior,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Junior => f.write_str("junior"),
            Role::Senior => f.write_str("senior"),
        }
    }
}

/// Mois (bornes incluses, 1-12) pendant lesquels les 3e et 4e années tiennent
/// le rôle senior, les 5e années étant en rotation ailleurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MidYearWindow {
    pub first_month: u32,
    pub last_month: u32,
}

impl Default for MidYearWindow {
    fn default() -> Self {
        Self {
            first_month: 2,
            last_month: 6,
        }
    }
}

impl MidYearWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.first_month..=self.last_month).contains(&date.month())
    }
}

/// Résident (profil immuable)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resident {
    id: ResidentId,
    name: String,
    year: ResidentYear,
    vacation_days: BTreeSet<NaiveDate>,
}

impl Resident {
    pub fn new<N: Into<String>>(name: N, year: ResidentYear) -> Self {
        Self::with_id(ResidentId::random(), name, year, std::iter::empty())
    }

    pub fn with_id<N, V>(id: ResidentId, name: N, year: ResidentYear, vacation_days: V) -> Self
    where
        N: Into<String>,
        V: IntoIterator<Item = NaiveDate>,
    {
        Self {
            id,
            name: name.into(),
            year,
            vacation_days: vacation_days.into_iter().collect(),
        }
    }

    /// Ajoute des jours de congés au profil.
    pub fn on_vacation<V: IntoIterator<Item = NaiveDate>>(mut self, days: V) -> Self {
        self.vacation_days.extend(days);
        self
    }

    pub fn id(&self) -> &ResidentId {
        &self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn year(&self) -> ResidentYear {
        self.year
    }
    pub fn vacation_days(&self) -> &BTreeSet<NaiveDate> {
        &self.vacation_days
    }

    pub fn is_on_vacation(&self, date: NaiveDate) -> bool {
        self.vacation_days.contains(&date)
    }

    /// Senior par l'année seule (4e et 5e années).
    pub fn is_senior(&self) -> bool {
        matches!(self.year, ResidentYear::Fourth | ResidentYear::Fifth)
    }

    /// Vivier junior : toute personne avant la 4e année, quelle que soit la date.
    pub fn is_junior(&self) -> bool {
        !self.is_senior()
    }

    /// Statut senior à une date donnée. Dans la fenêtre de mi-année, les 3e et
    /// 4e années sont seniors ; sinon les 4e et 5e années.
    pub fn is_senior_on(&self, date: NaiveDate, window: &MidYearWindow) -> bool {
        if window.contains(date) {
            matches!(self.year, ResidentYear::Third | ResidentYear::Fourth)
        } else {
            self.is_senior()
        }
    }

    /// Appartenance au vivier de `role` pour `date`.
    pub fn holds_role_on(&self, role: Role, date: NaiveDate, window: &MidYearWindow) -> bool {
        match role {
            Role::Junior => self.is_junior(),
            Role::Senior => self.is_senior_on(date, window),
        }
    }
}
