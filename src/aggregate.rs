use std::cmp::Ordering;

use crate::{
    mapping::{sort_by_value_ascending, Mapping},
    records::{InspectionRecord, ViolationRecord},
};

pub type Serial = String;
pub type City = String;
pub type ViolationCode = u32;

/// How many violation codes `violation_code_counts` reports.
pub const TOP_CODES: usize = 10;

/// Which codes make it into the violation code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeSelection {
    /// The first `TOP_CODES` distinct codes in file order, whatever their counts.
    #[default]
    FirstSeen,
    /// The `TOP_CODES` codes with the highest counts.
    MostFrequent,
}

/// Average inspection score per city, rounded to two decimals, ascending by average.
pub fn city_scores(records: &[InspectionRecord]) -> Mapping<City, f64> {
    let mut scores: Mapping<City, Vec<u32>> = Mapping::new();
    for record in records {
        scores
            .get_or_insert_with(record.city.clone(), Vec::new)
            .push(record.score);
    }

    let averages = scores.map_values(|s| {
        let sum: u64 = s.iter().map(|&v| u64::from(v)).sum();
        mean_to_hundredths(sum, s.len() as u64)
    });

    sort_by_value_ascending(averages)
}

/// Serial to city. A serial seen again later keeps the city it was first seen with.
pub fn serial_to_city(records: &[InspectionRecord]) -> Mapping<Serial, City> {
    let mut cities: Mapping<Serial, City> = Mapping::new();
    for record in records {
        if !cities.contains_key(&record.serial) {
            cities.insert(record.serial.clone(), record.city.clone());
        }
    }
    cities
}

/// Number of violations cited per serial, in first-seen order.
pub fn serial_violation_counts(records: &[ViolationRecord]) -> Mapping<Serial, usize> {
    let mut counts: Mapping<Serial, usize> = Mapping::new();
    for record in records {
        *counts.get_or_insert_with(record.serial.clone(), || 0) += 1;
    }
    counts
}

/// Occurrences of violation codes, restricted to `TOP_CODES` codes chosen by `selection`,
/// ascending by count.
pub fn violation_code_counts(
    records: &[ViolationRecord],
    selection: CodeSelection,
) -> Mapping<ViolationCode, usize> {
    let mut counts: Mapping<ViolationCode, usize> = Mapping::new();
    for record in records {
        *counts.get_or_insert_with(record.code, || 0) += 1;
    }

    if selection == CodeSelection::MostFrequent {
        counts.sort_by_values(|a, b| b.cmp(a));
    }
    counts.truncate(TOP_CODES);

    sort_by_value_ascending(counts)
}

/// `sum / n` rounded to two decimal places, an exact half going to the even hundredth.
///
/// Works on integers so that halves such as 92.125 are seen exactly.
pub fn mean_to_hundredths(sum: u64, n: u64) -> f64 {
    let scaled = sum * 100;
    let (mut cents, rem) = (scaled / n, scaled % n);
    match (2 * rem).cmp(&n) {
        Ordering::Greater => cents += 1,
        Ordering::Equal if cents % 2 == 1 => cents += 1,
        _ => {}
    }
    cents as f64 / 100.0
}
