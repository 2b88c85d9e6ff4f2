use clap::{Parser, ValueEnum};
use log::{info, warn};
use serde::Serialize;
use std::{error::Error, path::PathBuf};

mod aggregate;
mod cities;
mod error;
mod join;
mod mapping;
mod records;
mod render;

use aggregate::{
    city_scores, serial_to_city, serial_violation_counts, violation_code_counts, CodeSelection,
};
use cities::{restrict_to_map_cities, restrict_to_top_violation_cities, MarkerScale, MAP_CITIES};
use join::{city_violation_totals, JoinMode};
use records::{read_inspections, read_violations};
use render::{render_score_map, render_violation_bars};

const SCORE_MAP_FILE: &str = "score_map.png";
const VIOLATION_BARS_FILE: &str = "city_violations.png";

/// Average inspection scores and violation counts of LA County restaurants, as charts.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Inspections file
    #[arg(long, default_value = "inspections_cleaned.csv", value_parser = csv_path)]
    inspections: PathBuf,

    /// Violations file
    #[arg(long, default_value = "violations.csv", value_parser = csv_path)]
    violations: PathBuf,

    /// Background image for the score map
    #[arg(long, default_value = "map.png")]
    map: PathBuf,

    /// Directory the charts are written to
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// How violation counts of restaurants in the same city combine
    #[arg(long, value_enum, default_value_t = JoinArg::Overwrite)]
    join: JoinArg,

    /// Which violation codes are reported
    #[arg(long, value_enum, default_value_t = CodesArg::FirstSeen)]
    codes: CodesArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum JoinArg {
    Overwrite,
    Sum,
}

impl From<JoinArg> for JoinMode {
    fn from(arg: JoinArg) -> Self {
        match arg {
            JoinArg::Overwrite => JoinMode::Overwrite,
            JoinArg::Sum => JoinMode::Sum,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CodesArg {
    FirstSeen,
    MostFrequent,
}

impl From<CodesArg> for CodeSelection {
    fn from(arg: CodesArg) -> Self {
        match arg {
            CodesArg::FirstSeen => CodeSelection::FirstSeen,
            CodesArg::MostFrequent => CodeSelection::MostFrequent,
        }
    }
}

#[derive(Debug, Serialize)]
struct CodeCount {
    code: u32,
    count: usize,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();
    std::fs::create_dir_all(&args.out_dir)?;

    let inspections = read_inspections(&args.inspections)?;
    info!(
        "read {} inspections from {}",
        inspections.len(),
        args.inspections.display()
    );

    let scores = restrict_to_map_cities(&city_scores(&inspections));
    if scores.is_empty() {
        warn!("no inspected city is on the map");
    }
    render_score_map(
        &scores,
        &MAP_CITIES,
        &args.map,
        &args.out_dir.join(SCORE_MAP_FILE),
        &MarkerScale::default(),
    )?;

    let violations = read_violations(&args.violations)?;
    info!(
        "read {} violations from {}",
        violations.len(),
        args.violations.display()
    );

    let totals = city_violation_totals(
        &serial_to_city(&inspections),
        &serial_violation_counts(&violations),
        args.join.into(),
    );
    let highlighted = restrict_to_top_violation_cities(&totals);
    if highlighted.is_empty() {
        warn!("none of the highlighted cities has violations");
    }
    render_violation_bars(&highlighted, &args.out_dir.join(VIOLATION_BARS_FILE))?;

    let mut wtr = csv::WriterBuilder::new().from_writer(std::io::stdout());
    for (&code, &count) in violation_code_counts(&violations, args.codes.into()).iter() {
        wtr.serialize(CodeCount { code, count })?;
    }

    wtr.flush()?;

    Ok(())
}

fn csv_path(arg: &str) -> Result<PathBuf, String> {
    const CSV_EXTENSION: &str = ".csv";

    if !arg.ends_with(CSV_EXTENSION) {
        return Err("the file must have a .csv extension".to_string());
    }

    Ok(PathBuf::from(arg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_dataset_layout() {
        let args = Args::try_parse_from(["inspection-stats"]).unwrap();

        assert_eq!(args.inspections, PathBuf::from("inspections_cleaned.csv"));
        assert_eq!(args.violations, PathBuf::from("violations.csv"));
        assert_eq!(args.map, PathBuf::from("map.png"));
        assert_eq!(JoinMode::from(args.join), JoinMode::Overwrite);
        assert_eq!(CodeSelection::from(args.codes), CodeSelection::FirstSeen);
    }

    #[test]
    fn options_select_join_and_codes() {
        let args = Args::try_parse_from([
            "inspection-stats",
            "--join",
            "sum",
            "--codes",
            "most-frequent",
            "--out-dir",
            "charts",
        ])
        .unwrap();

        assert_eq!(JoinMode::from(args.join), JoinMode::Sum);
        assert_eq!(CodeSelection::from(args.codes), CodeSelection::MostFrequent);
        assert_eq!(args.out_dir, PathBuf::from("charts"));
    }

    #[test]
    fn rejects_non_csv_input() {
        assert!(Args::try_parse_from(["inspection-stats", "--inspections", "data.txt"]).is_err());
        assert!(csv_path("violations.csv").is_ok());
    }

    #[test]
    fn end_to_end_summaries() {
        let inspections = read_inspections("test-inputs/inspections.csv").unwrap();
        let violations = read_violations("test-inputs/violations.csv").unwrap();

        let scores = restrict_to_map_cities(&city_scores(&inspections));
        assert_eq!(scores.get(&"LOS ANGELES".to_string()), Some(&92.0));
        assert_eq!(scores.get(&"PASADENA".to_string()), Some(&95.0));
        assert!(!scores.contains_key(&"FOOBAR".to_string()));

        let totals = restrict_to_top_violation_cities(&city_violation_totals(
            &serial_to_city(&inspections),
            &serial_violation_counts(&violations),
            JoinMode::Overwrite,
        ));
        let cities: Vec<&str> = totals.keys().map(String::as_str).collect();
        assert_eq!(cities, vec!["HOLLYWOOD"]);
    }
}
