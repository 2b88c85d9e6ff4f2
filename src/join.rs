use crate::{
    aggregate::{City, Serial},
    mapping::{sort_by_value_ascending, Mapping},
};

/// What happens when several serials belong to the same city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinMode {
    /// The count of the last serial joined replaces the city's total.
    #[default]
    Overwrite,
    /// Counts of every serial in the city are added up.
    Sum,
}

/// Violation totals per city, joining serial counts to cities on the serial.
///
/// Serials with no city are skipped. The result is ascending by total.
pub fn city_violation_totals(
    serial_city: &Mapping<Serial, City>,
    serial_counts: &Mapping<Serial, usize>,
    mode: JoinMode,
) -> Mapping<City, usize> {
    let mut totals: Mapping<City, usize> = Mapping::new();

    for (serial, &count) in serial_counts.iter() {
        let Some(city) = serial_city.get(serial) else {
            continue;
        };

        match mode {
            JoinMode::Overwrite => {
                totals.insert(city.clone(), count);
            }
            JoinMode::Sum => *totals.get_or_insert_with(city.clone(), || 0) += count,
        }
    }

    sort_by_value_ascending(totals)
}
