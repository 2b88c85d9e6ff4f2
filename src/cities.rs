use std::hash::Hash;

use crate::mapping::Mapping;

/// A point on the map image, in pixels from its top-left corner.
pub type Pixel = (i32, i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CityEntry {
    pub name: &'static str,
    pub pixel: Option<Pixel>,
}

const fn plotted(name: &'static str, x: i32, y: i32) -> CityEntry {
    CityEntry {
        name,
        pixel: Some((x, y)),
    }
}

const fn listed(name: &'static str) -> CityEntry {
    CityEntry { name, pixel: None }
}

/// A curated list of city names used as a display filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CitySet {
    entries: &'static [CityEntry],
}

/// Cities with a known position on `map.png`. The coordinates are tied to
/// that image and must be re-measured if it changes.
pub const MAP_CITIES: CitySet = CitySet {
    entries: &[
        plotted("LOS ANGELES", 612, 800),
        plotted("LONG BEACH", 649, 1065),
        plotted("SANTA CLARITA", 365, 466),
        plotted("GLENDALE", 595, 710),
        plotted("LANCASTER", 674, 185),
        plotted("POMONA", 997, 796),
        plotted("TORRANCE", 531, 1006),
        plotted("PASADENA", 682, 708),
        plotted("DOWNEY", 696, 903),
        plotted("MALIBU", 158, 836),
        plotted("COVINA", 893, 761),
        plotted("EL MONTE", 778, 781),
        plotted("BURBANK", 551, 675),
        plotted("SANTA MONICA", 408, 827),
        plotted("CARSON", 581, 1008),
        plotted("COMPTON", 627, 950),
        plotted("LA MIRADA", 787, 927),
    ],
};

/// Cities highlighted in the violations bar chart.
pub const TOP_VIOLATION_CITIES: CitySet = CitySet {
    entries: &[
        listed("RANCHO DOMINGUEZ"),
        listed("WEST LOS ANGELES"),
        listed("HOLLYWOOD"),
        listed("ARLETA"),
        listed("TERMINAL ISLAND"),
        listed("SEPULVEDA"),
    ],
};

impl CitySet {
    pub fn contains(&self, city: &str) -> bool {
        self.entry(city).is_some()
    }

    pub fn pixel(&self, city: &str) -> Option<Pixel> {
        self.entry(city).and_then(|e| e.pixel)
    }

    fn entry(&self, city: &str) -> Option<&'static CityEntry> {
        self.entries.iter().find(|e| e.name == city)
    }

    /// Entries of `mapping` whose city is in this set, order and values untouched.
    pub fn restrict<K, V>(&self, mapping: &Mapping<K, V>) -> Mapping<K, V>
    where
        K: AsRef<str> + Eq + Hash + Clone,
        V: Clone,
    {
        mapping
            .iter()
            .filter(|(city, _)| self.contains(AsRef::<str>::as_ref(*city)))
            .map(|(city, value)| (city.clone(), value.clone()))
            .collect()
    }
}

pub fn restrict_to_map_cities<K, V>(mapping: &Mapping<K, V>) -> Mapping<K, V>
where
    K: AsRef<str> + Eq + Hash + Clone,
    V: Clone,
{
    MAP_CITIES.restrict(mapping)
}

pub fn restrict_to_top_violation_cities<K, V>(mapping: &Mapping<K, V>) -> Mapping<K, V>
where
    K: AsRef<str> + Eq + Hash + Clone,
    V: Clone,
{
    TOP_VIOLATION_CITIES.restrict(mapping)
}

/// Turns an average score into a scatter marker area: `((score - baseline) / spread + offset) * factor`.
///
/// `baseline ..= baseline + spread` is also the range of the colour bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerScale {
    pub baseline: f64,
    pub spread: f64,
    pub offset: f64,
    pub factor: f64,
}

impl Default for MarkerScale {
    fn default() -> Self {
        Self {
            baseline: 92.47,
            spread: 3.21,
            offset: 0.1,
            factor: 350.0,
        }
    }
}

impl MarkerScale {
    pub fn marker_area(&self, score: f64) -> f64 {
        ((score - self.baseline) / self.spread + self.offset) * self.factor
    }

    pub fn low(&self) -> f64 {
        self.baseline
    }

    /// Where `score` falls on the colour bar, clamped to `0.0..=1.0`.
    pub fn fraction(&self, score: f64) -> f64 {
        ((score - self.low()) / self.spread).clamp(0.0, 1.0)
    }

    /// `n` evenly spaced tick values across the colour bar.
    pub fn ticks(&self, n: usize) -> Vec<f64> {
        match n {
            0 => Vec::new(),
            1 => vec![self.low()],
            _ => (0..n)
                .map(|i| self.low() + self.spread * i as f64 / (n - 1) as f64)
                .collect(),
        }
    }
}
