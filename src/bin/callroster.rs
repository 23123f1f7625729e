#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use callroster::{
    detect_violations, io, HospitalInfo, Resident, ResidentDirectory, ResidentYear, SchedError,
    ScheduleBuilder,
};
use chrono::{Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de planification des gardes d'internes
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Générer le planning de garde
    Generate {
        /// Répertoire de profils JSON (un fichier par résident)
        #[arg(long, conflicts_with = "residents_csv")]
        residents: Option<String>,
        /// Alternative : CSV `name,year[,vacations]`
        #[arg(long)]
        residents_csv: Option<String>,
        /// Informations hospitalières (JSON)
        #[arg(long, default_value = "hospital_information.json")]
        hospital: String,
        /// Premier jour (YYYY-MM-DD), défaut : 1er juillet de l'année universitaire
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Dernier jour (YYYY-MM-DD), défaut : 30 juin suivant
        #[arg(long)]
        end: Option<NaiveDate>,
        #[arg(long, default_value = "call_schedule.csv")]
        out: String,
        /// Export JSON du planning (optionnel)
        #[arg(long)]
        out_json: Option<String>,
        /// Bilan de charge CSV (optionnel)
        #[arg(long)]
        loads: Option<String>,
        /// Graine du tirage au sort (reproductible)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Écrire un profil de résident vierge
    Template {
        #[arg(long, default_value = "residents")]
        dir: String,
    },

    /// Vérifier les profils sans planifier
    Validate {
        #[arg(long, default_value = "residents")]
        residents: String,
        #[arg(long, default_value = "hospital_information.json")]
        hospital: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let code = match cli.cmd {
        Commands::Generate {
            residents,
            residents_csv,
            hospital,
            start,
            end,
            out,
            out_json,
            loads,
            seed,
        } => {
            let people = load_residents(residents.as_deref(), residents_csv.as_deref())?;
            let info = HospitalInfo::load(&hospital)?;
            let (default_start, default_end) = academic_year(Utc::now().date_naive())?;
            let start = start.unwrap_or(default_start);
            let end = end.unwrap_or(default_end);

            let mut builder = ScheduleBuilder::new(people, start, end, info.holidays.iter().copied())?
                .with_options(info.options())?;
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };

            let outcome = builder.build(&mut rng);
            io::export_schedule_csv(&out, &builder.rows())?;
            if let Some(path) = out_json {
                io::export_schedule_json(path, &builder.rows())?;
            }
            if let Some(path) = loads {
                io::export_loads_csv(path, &builder.load_report())?;
            }

            match outcome {
                Ok(()) => {
                    for entry in builder.load_report() {
                        println!("{} (PGY-{}) : {}", entry.name, entry.year, entry.total);
                    }
                    let violations = detect_violations(&builder);
                    if violations.is_empty() {
                        0
                    } else {
                        eprintln!("Found {} rule violation(s)", violations.len());
                        2
                    }
                }
                Err(SchedError::Depleted { date, role }) => {
                    eprintln!(
                        "No eligible {role} resident on {date}; partial schedule written to {out} ({} day(s))",
                        builder.rows().len()
                    );
                    // Code 2 = WARNING/INCOMPLETE
                    2
                }
                Err(err) => return Err(err.into()),
            }
        }
        Commands::Template { dir } => {
            let path = ResidentDirectory::new(&dir).write_template()?;
            println!("Template written to {}", path.display());
            0
        }
        Commands::Validate {
            residents,
            hospital,
        } => {
            let people = ResidentDirectory::new(&residents).load()?;
            let info = HospitalInfo::load(&hospital)?;
            for year in ResidentYear::ALL {
                let count = people.iter().filter(|r| r.year() == year).count();
                println!("{year} : {count}");
            }
            println!("holidays : {}", info.holidays.len());
            println!("monthly cap : {}", info.options().monthly_call_max);
            if people.is_empty() {
                bail!("no resident profile found in {residents}");
            }
            0
        }
    };

    std::process::exit(code);
}

fn load_residents(dir: Option<&str>, csv: Option<&str>) -> Result<Vec<Resident>> {
    let people = match (dir, csv) {
        (_, Some(csv)) => io::import_residents_csv(csv)
            .with_context(|| format!("importing residents from {csv}"))?,
        (Some(dir), None) => ResidentDirectory::new(dir).load()?,
        (None, None) => ResidentDirectory::new("residents").load()?,
    };
    if people.is_empty() {
        bail!("no resident available");
    }
    Ok(people)
}

/// Année universitaire contenant `today` : 1er juillet - 30 juin.
fn academic_year(today: NaiveDate) -> Result<(NaiveDate, NaiveDate)> {
    let first = if today.month() >= 7 {
        today.year()
    } else {
        today.year() - 1
    };
    let start = NaiveDate::from_ymd_opt(first, 7, 1).context("invalid academic year start")?;
    let end = NaiveDate::from_ymd_opt(first + 1, 6, 30).context("invalid academic year end")?;
    Ok((start, end))
}
