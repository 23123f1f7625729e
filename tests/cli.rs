#![forbid(unsafe_code)]
use assert_cmd::Command;
use chrono::{Datelike, NaiveDate, Utc};
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_profile(dir: &Path, file: &str, name: &str, year: u8) {
    fs::write(
        dir.join(file),
        format!(r#"{{"name": "{name}", "year": {year}, "vacation_days": []}}"#),
    )
    .unwrap();
}

fn write_hospital(path: &Path) {
    fs::write(path, r#"{"name": "General", "holidays": ["2024-09-02"]}"#).unwrap();
}

#[test]
fn generate_writes_full_schedule() {
    let dir = tempdir().unwrap();
    let residents = dir.path().join("residents");
    fs::create_dir(&residents).unwrap();
    for year in 1..=5u8 {
        for i in 1..=4 {
            write_profile(&residents, &format!("pgy{year}-{i}.json"), &format!("R{year}{i}"), year);
        }
    }
    let hospital = dir.path().join("hospital_information.json");
    write_hospital(&hospital);
    let out = dir.path().join("call_schedule.csv");
    let loads = dir.path().join("loads.csv");

    Command::cargo_bin("callroster")
        .unwrap()
        .args(["generate", "--start", "2024-09-02", "--end", "2024-09-15", "--seed", "7"])
        .arg("--residents")
        .arg(&residents)
        .arg("--hospital")
        .arg(&hospital)
        .arg("--out")
        .arg(&out)
        .arg("--loads")
        .arg(&loads)
        .assert()
        .success()
        .stdout(predicate::str::contains("R11 (PGY-1)"));

    let csv = fs::read_to_string(&out).unwrap();
    assert!(csv.starts_with("Date,Junior Resident,Senior Resident\n"));
    assert_eq!(csv.lines().count(), 15);
    assert_eq!(fs::read_to_string(&loads).unwrap().lines().count(), 21);
}

#[test]
fn depletion_reports_date_and_role() {
    let dir = tempdir().unwrap();
    let residents = dir.path().join("residents");
    fs::create_dir(&residents).unwrap();
    write_profile(&residents, "a.json", "Ana", 1);
    write_profile(&residents, "b.json", "Bob", 1);
    write_profile(&residents, "c.json", "Cyd", 4);
    let hospital = dir.path().join("hospital_information.json");
    write_hospital(&hospital);
    let out = dir.path().join("call_schedule.csv");

    // mardi puis mercredi : le seul senior est de repos le mercredi
    Command::cargo_bin("callroster")
        .unwrap()
        .args(["generate", "--start", "2024-09-03", "--end", "2024-09-04"])
        .arg("--residents")
        .arg(&residents)
        .arg("--hospital")
        .arg(&hospital)
        .arg("--out")
        .arg(&out)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No eligible senior resident on 2024-09-04"));

    assert_eq!(fs::read_to_string(&out).unwrap().lines().count(), 2);
}

#[test]
fn template_then_validate() {
    let dir = tempdir().unwrap();
    let residents = dir.path().join("residents");
    let hospital = dir.path().join("hospital_information.json");
    write_hospital(&hospital);

    Command::cargo_bin("callroster")
        .unwrap()
        .arg("template")
        .arg("--dir")
        .arg(&residents)
        .assert()
        .success();
    assert!(residents.join("template.json").exists());

    // le profil vierge seul ne compte pas
    Command::cargo_bin("callroster")
        .unwrap()
        .arg("validate")
        .arg("--residents")
        .arg(&residents)
        .arg("--hospital")
        .arg(&hospital)
        .assert()
        .failure();

    write_profile(&residents, "ana.json", "Ana", 2);
    Command::cargo_bin("callroster")
        .unwrap()
        .arg("validate")
        .arg("--residents")
        .arg(&residents)
        .arg("--hospital")
        .arg(&hospital)
        .assert()
        .success()
        .stdout(predicate::str::contains("PGY-2 : 1"));
}

#[test]
fn generate_from_residents_csv() {
    let dir = tempdir().unwrap();
    let csv_in = dir.path().join("residents.csv");
    let mut rows = String::from("name,year,vacations\n");
    for year in 1..=5u8 {
        for i in 1..=4 {
            rows.push_str(&format!("C{year}{i},{year},\n"));
        }
    }
    // congés sur toute la période : jamais de garde
    rows.push_str("Away,1,2024-09-02..2024-09-15\n");
    fs::write(&csv_in, rows).unwrap();
    let hospital = dir.path().join("hospital_information.json");
    write_hospital(&hospital);
    let out = dir.path().join("call_schedule.csv");
    let loads = dir.path().join("loads.csv");

    Command::cargo_bin("callroster")
        .unwrap()
        .args(["generate", "--start", "2024-09-02", "--end", "2024-09-15", "--seed", "11"])
        .arg("--residents-csv")
        .arg(&csv_in)
        .arg("--hospital")
        .arg(&hospital)
        .arg("--out")
        .arg(&out)
        .arg("--loads")
        .arg(&loads)
        .assert()
        .success()
        .stdout(predicate::str::contains("Away (PGY-1) : 0"));

    let csv = fs::read_to_string(&out).unwrap();
    assert_eq!(csv.lines().count(), 15);
    assert!(!csv.contains("Away"));
    assert_eq!(fs::read_to_string(&loads).unwrap().lines().count(), 22);
}

#[test]
fn generate_defaults_to_current_academic_year() {
    let dir = tempdir().unwrap();
    let residents = dir.path().join("residents");
    fs::create_dir(&residents).unwrap();
    for year in 1..=5u8 {
        for i in 1..=6 {
            write_profile(&residents, &format!("pgy{year}-{i}.json"), &format!("R{year}{i}"), year);
        }
    }
    let hospital = dir.path().join("hospital_information.json");
    fs::write(&hospital, r#"{"name": "General", "holidays": []}"#).unwrap();
    let out = dir.path().join("call_schedule.csv");

    let today = Utc::now().date_naive();
    let first = if today.month() >= 7 { today.year() } else { today.year() - 1 };
    let start = NaiveDate::from_ymd_opt(first, 7, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(first + 1, 6, 30).unwrap();

    Command::cargo_bin("callroster")
        .unwrap()
        .args(["generate", "--seed", "3"])
        .arg("--residents")
        .arg(&residents)
        .arg("--hospital")
        .arg(&hospital)
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let csv = fs::read_to_string(&out).unwrap();
    let dates: Vec<&str> = csv.lines().skip(1).map(|l| &l[..10]).collect();
    assert_eq!(dates.len() as i64, (end - start).num_days() + 1);
    assert_eq!(dates.first().copied(), Some(start.to_string().as_str()));
    assert_eq!(dates.last().copied(), Some(end.to_string().as_str()));
}

#[test]
fn empty_roster_is_refused() {
    let dir = tempdir().unwrap();
    let csv_in = dir.path().join("residents.csv");
    fs::write(&csv_in, "name,year,vacations\n").unwrap();
    let hospital = dir.path().join("hospital_information.json");
    write_hospital(&hospital);

    Command::cargo_bin("callroster")
        .unwrap()
        .args(["generate", "--start", "2024-09-02", "--end", "2024-09-03"])
        .arg("--residents-csv")
        .arg(&csv_in)
        .arg("--hospital")
        .arg(&hospital)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no resident available"));
}
