//! Profils sur disque : un fichier JSON par résident, un fichier
//! d'informations hospitalières (jours fériés, plafond mensuel).

use crate::model::{Resident, ResidentId, ResidentYear};
use crate::scheduler::ScheduleOptions;
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Nom du profil vierge, ignoré au chargement.
pub const RESIDENT_TEMPLATE_FILENAME: &str = "template.json";

/// Profil de résident tel qu'écrit sur disque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidentProfile {
    pub name: String,
    pub year: ResidentYear,
    #[serde(default)]
    pub vacation_days: Vec<NaiveDate>,
}

impl ResidentProfile {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("resident name cannot be empty");
        }
        Ok(())
    }

    /// Profil vierge proposé aux nouveaux résidents.
    pub fn template() -> Self {
        Self {
            name: String::new(),
            year: ResidentYear::First,
            vacation_days: Vec::new(),
        }
    }

    pub fn into_resident(self) -> Resident {
        Resident::with_id(
            ResidentId::random(),
            self.name.trim(),
            self.year,
            self.vacation_days,
        )
    }
}

/// Informations de l'établissement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HospitalInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub holidays: Vec<NaiveDate>,
    #[serde(default)]
    pub monthly_call_max: Option<u32>,
}

impl HospitalInfo {
    pub fn validate(&self) -> Result<()> {
        if self.monthly_call_max == Some(0) {
            bail!("monthly_call_max must be > 0");
        }
        Ok(())
    }

    /// Options de planification, plafond surchargé s'il est renseigné.
    pub fn options(&self) -> ScheduleOptions {
        let defaults = ScheduleOptions::default();
        ScheduleOptions {
            monthly_call_max: self.monthly_call_max.unwrap_or(defaults.monthly_call_max),
            ..defaults
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let mut info: HospitalInfo = serde_json::from_slice(&data)
            .with_context(|| format!("parsing hospital information {}", path.display()))?;
        info.validate()?;
        info.holidays.sort();
        info.holidays.dedup();
        Ok(info)
    }
}

/// Répertoire de profils de résidents.
#[derive(Debug, Clone)]
pub struct ResidentDirectory {
    base_dir: PathBuf,
}

impl ResidentDirectory {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            base_dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Charge les profils par ordre de nom de fichier. Le profil vierge est
    /// ignoré ; un fichier illisible est signalé puis écarté.
    pub fn load(&self) -> Result<Vec<Resident>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.base_dir)
            .with_context(|| format!("reading resident directory {}", self.base_dir.display()))?
        {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            if path.file_name().and_then(|s| s.to_str()) == Some(RESIDENT_TEMPLATE_FILENAME) {
                continue;
            }
            paths.push(path);
        }
        paths.sort();

        let mut residents = Vec::with_capacity(paths.len());
        for path in paths {
            match read_profile(&path) {
                Ok(profile) => residents.push(profile.into_resident()),
                Err(err) => {
                    warn!(path = %path.display(), "skipping resident profile: {err:#}");
                    continue;
                }
            }
        }
        Ok(residents)
    }

    /// Écrit le profil vierge dans le répertoire.
    pub fn write_template(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.base_dir)
            .with_context(|| format!("creating resident directory {}", self.base_dir.display()))?;
        let path = self.base_dir.join(RESIDENT_TEMPLATE_FILENAME);
        crate::io::export_resident_template(&path)?;
        Ok(path)
    }
}

fn read_profile(path: &Path) -> Result<ResidentProfile> {
    let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let profile: ResidentProfile = serde_json::from_slice(&data)
        .with_context(|| format!("parsing {}", path.display()))?;
    profile.validate()?;
    Ok(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn directory_skips_template_and_broken_files() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("b.json"),
            r#"{"name": "Bea", "year": 4, "vacation_days": ["2024-12-24"]}"#,
        )
        .unwrap();
        fs::write(dir.path().join("a.json"), r#"{"name": "Ana", "year": 1}"#).unwrap();
        fs::write(dir.path().join("broken.json"), r#"{"name": "X", "year": 9}"#).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a profile").unwrap();

        let store = ResidentDirectory::new(dir.path());
        store.write_template().unwrap();
        let residents = store.load().unwrap();

        let names: Vec<&str> = residents.iter().map(Resident::name).collect();
        assert_eq!(names, vec!["Ana", "Bea"]);
        assert_eq!(residents[1].year(), ResidentYear::Fourth);
        assert!(residents[1].is_on_vacation(NaiveDate::from_ymd_opt(2024, 12, 24).unwrap()));
        assert_ne!(residents[0].id(), residents[1].id());
    }

    #[test]
    fn hospital_info_overrides_cap_and_sorts_holidays() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hospital_information.json");
        fs::write(
            &path,
            r#"{"holidays": ["2025-01-01", "2024-12-25", "2025-01-01"], "monthly_call_max": 7}"#,
        )
        .unwrap();

        let info = HospitalInfo::load(&path).unwrap();
        assert_eq!(info.holidays.len(), 2);
        assert!(info.holidays[0] < info.holidays[1]);
        assert_eq!(info.options().monthly_call_max, 7);
        assert_eq!(HospitalInfo::default().options(), ScheduleOptions::default());
    }

    #[test]
    fn zero_cap_is_rejected() {
        let info = HospitalInfo {
            monthly_call_max: Some(0),
            ..HospitalInfo::default()
        };
        assert!(info.validate().is_err());
    }
}
