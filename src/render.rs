use image::GenericImageView;
use log::{debug, info, warn};
use plotters::{
    coord::Shift,
    prelude::*,
    style::{
        text_anchor::{HPos, Pos, VPos},
        FontDesc, FontTransform,
    },
};
use std::{ops::Range, path::Path};

use crate::{
    aggregate::City,
    cities::{CitySet, MarkerScale},
    error::Result,
    mapping::Mapping,
};

/// Width of the strip right of the map that holds the colour bar.
const COLOUR_BAR_STRIP: u32 = 150;
const COLOUR_BAR_TICKS: usize = 11;
const LABEL_OFFSET: i32 = 15;

const BAR_CHART_SIZE: (u32, u32) = (700, 700);

/// Draws each city's average score as a coloured, sized marker over the map image.
pub fn render_score_map(
    scores: &Mapping<City, f64>,
    cities: &CitySet,
    map_image: &Path,
    out: &Path,
    scale: &MarkerScale,
) -> Result<()> {
    let map = image::open(map_image)?;
    let (width, height) = map.dimensions();

    let root = BitMapBackend::new(out, (width + COLOUR_BAR_STRIP, height)).into_drawing_area();
    root.fill(&WHITE)?;
    let (map_area, bar_area) = root.split_horizontally(width);

    map_area.draw(&BitMapElement::from(((0, 0), map)))?;

    let label_font = ("sans-serif", 10).into_font();

    let mut areas = Vec::with_capacity(scores.len());
    for (city, &score) in scores.iter() {
        let Some((x, y)) = cities.pixel(city) else {
            warn!("no map position for {city}, skipping");
            continue;
        };

        let area = scale.marker_area(score);
        areas.push(area);

        map_area.draw(&Circle::new(
            (x, y),
            marker_radius(area),
            gradient(scale.fraction(score)).filled(),
        ))?;
        draw_label(&map_area, city, (x, y - LABEL_OFFSET), &label_font)?;
    }
    debug!("marker areas: {areas:?}");

    draw_colour_bar(&bar_area, height, scale)?;

    root.present()?;
    info!("score map written to {}", out.display());
    Ok(())
}

/// Black text centred above `at`, ringed in white so it reads on dark parts of the map.
fn draw_label(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    text: &str,
    at: (i32, i32),
    font: &FontDesc<'_>,
) -> Result<()> {
    let halo = TextStyle::from(font.clone())
        .color(&WHITE)
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1), (-1, -1), (1, 1), (-1, 1), (1, -1)] {
        area.draw(&Text::new(text, (at.0 + dx, at.1 + dy), halo.clone()))?;
    }
    area.draw(&Text::new(
        text,
        at,
        TextStyle::from(font.clone())
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Bottom)),
    ))?;
    Ok(())
}

fn draw_colour_bar(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    height: u32,
    scale: &MarkerScale,
) -> Result<()> {
    let top = 40;
    let bottom = height as i32 - 40;
    let (left, right) = (20, 45);
    let span = (bottom - top).max(1);

    for row in top..bottom {
        let t = f64::from(bottom - row) / f64::from(span);
        area.draw(&Rectangle::new(
            [(left, row), (right, row + 1)],
            gradient(t).filled(),
        ))?;
    }
    area.draw(&Rectangle::new([(left, top), (right, bottom)], &BLACK))?;

    let tick_style = TextStyle::from(("sans-serif", 12).into_font())
        .color(&BLACK)
        .pos(Pos::new(HPos::Left, VPos::Center));
    for tick in scale.ticks(COLOUR_BAR_TICKS) {
        let y = bottom - (scale.fraction(tick) * f64::from(span)).round() as i32;
        area.draw(&PathElement::new(vec![(right, y), (right + 4, y)], &BLACK))?;
        // Ticks read as whole scores.
        area.draw(&Text::new(
            format!("{}", tick.trunc() as i64),
            (right + 7, y),
            tick_style.clone(),
        ))?;
    }

    let title_style = TextStyle::from(
        ("sans-serif", 12)
            .into_font()
            .transform(FontTransform::Rotate270),
    )
    .color(&BLACK)
    .pos(Pos::new(HPos::Center, VPos::Center));
    area.draw(&Text::new(
        "Average Restaurant Inspection Scores",
        (right + 55, (top + bottom) / 2),
        title_style,
    ))?;

    Ok(())
}

/// Horizontal bars of violations per city, the first entry at the bottom.
pub fn render_violation_bars(counts: &Mapping<City, usize>, out: &Path) -> Result<()> {
    let root = BitMapBackend::new(out, BAR_CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let names: Vec<&str> = counts.keys().map(String::as_str).collect();
    let (x_range, y_range) = bar_axes(counts);

    let mut chart = ChartBuilder::on(&root)
        .caption("Restaurant Health Code Violations by City", ("sans-serif", 22))
        .margin(15)
        .x_label_area_size(50)
        .y_label_area_size(200)
        .build_cartesian_2d(x_range, y_range.into_segmented())?;

    let city_label = |v: &SegmentValue<i32>| match v {
        SegmentValue::CenterOf(i) => names
            .get(*i as usize)
            .map(|name| name.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("Number of Violations")
        .x_label_style(("sans-serif", 12))
        .y_label_formatter(&city_label)
        .draw()?;

    chart.draw_series(
        Histogram::horizontal(&chart)
            .style(BLUE.filled())
            .margin(8)
            .data(counts.values().enumerate().map(|(i, &count)| (i as i32, count))),
    )?;

    root.present()?;
    info!("violation bar chart written to {}", out.display());
    Ok(())
}

/// Axis ranges for the bar chart: counts with headroom past the longest bar,
/// and one row slot per city. Integer ranges are inclusive once segmented.
fn bar_axes(counts: &Mapping<City, usize>) -> (Range<usize>, Range<i32>) {
    let max = counts.values().copied().max().unwrap_or(0);
    let rows = counts.len().max(1) as i32;
    (0..max + max / 10 + 1, 0..rows - 1)
}

/// Radius in pixels of a marker whose area is `area`. Negative areas draw nothing.
fn marker_radius(area: f64) -> u32 {
    (area.max(0.0).sqrt() / 2.0).round() as u32
}

const GRADIENT_STOPS: [(u8, u8, u8); 3] = [(68, 1, 84), (33, 145, 140), (253, 231, 37)];

/// Colour at `t` in `0.0..=1.0` along a purple, teal, yellow ramp.
fn gradient(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0) * (GRADIENT_STOPS.len() - 1) as f64;
    let i = (t.floor() as usize).min(GRADIENT_STOPS.len() - 2);
    let f = t - i as f64;
    let (a, b) = (GRADIENT_STOPS[i], GRADIENT_STOPS[i + 1]);
    let mix = |x: u8, y: u8| (f64::from(x) + (f64::from(y) - f64::from(x)) * f).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

#[cfg(test)]
mod tests {
    use image::RgbImage;
    use tempfile::tempdir;

    use crate::cities::MAP_CITIES;

    use super::*;

    #[test]
    fn gradient_endpoints() {
        assert_eq!(gradient(0.0), RGBColor(68, 1, 84));
        assert_eq!(gradient(0.5), RGBColor(33, 145, 140));
        assert_eq!(gradient(1.0), RGBColor(253, 231, 37));
        assert_eq!(gradient(7.0), RGBColor(253, 231, 37));
    }

    #[test]
    fn marker_radius_from_area() {
        assert_eq!(marker_radius(400.0), 10);
        assert_eq!(marker_radius(-12.0), 0);
    }

    fn cities(entries: &[(&str, usize)]) -> Mapping<City, usize> {
        entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn write_map(dir: &Path, width: u32, height: u32) -> std::path::PathBuf {
        let path = dir.join("map.png");
        RgbImage::new(width, height).save(&path).unwrap();
        path
    }

    #[test]
    fn bar_axes_one_slot_per_city() {
        let (x, y) = bar_axes(&cities(&[("ARLETA", 3), ("HOLLYWOOD", 5)]));

        assert_eq!((y.start..=y.end).count(), 2);
        assert!(x.end > 5);
    }

    #[test]
    fn bar_axes_for_empty_counts() {
        let (x, y) = bar_axes(&Mapping::new());

        assert_eq!((y.start..=y.end).count(), 1);
        assert_eq!(x, 0..1);
    }

    #[test]
    fn renders_violation_bars() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("city_violations.png");

        render_violation_bars(&cities(&[("SEPULVEDA", 2), ("HOLLYWOOD", 14)]), &out).unwrap();

        let chart = image::open(&out).unwrap();
        assert_eq!(chart.dimensions(), BAR_CHART_SIZE);
    }

    #[test]
    fn renders_empty_violation_bars() {
        let dir = tempdir().unwrap();
        let out = dir.path().join("city_violations.png");

        render_violation_bars(&Mapping::new(), &out).unwrap();

        assert!(out.exists());
    }

    #[test]
    fn renders_score_map_beside_colour_bar() {
        let dir = tempdir().unwrap();
        let map = write_map(dir.path(), 800, 300);
        let out = dir.path().join("score_map.png");
        let scores: Mapping<City, f64> = vec![
            ("LANCASTER".to_string(), 93.1),
            ("HOLLYWOOD".to_string(), 94.0),
        ]
        .into_iter()
        .collect();

        render_score_map(&scores, &MAP_CITIES, &map, &out, &MarkerScale::default()).unwrap();

        let chart = image::open(&out).unwrap();
        assert_eq!(chart.dimensions(), (800 + COLOUR_BAR_STRIP, 300));
    }

    #[test]
    fn renders_empty_score_map() {
        let dir = tempdir().unwrap();
        let map = write_map(dir.path(), 200, 200);
        let out = dir.path().join("score_map.png");

        render_score_map(&Mapping::new(), &MAP_CITIES, &map, &out, &MarkerScale::default())
            .unwrap();

        assert!(out.exists());
    }

    #[test]
    fn labels_stand_out_on_a_dark_map() {
        let dir = tempdir().unwrap();
        let map = write_map(dir.path(), 800, 300);
        let out = dir.path().join("score_map.png");
        let scores: Mapping<City, f64> = vec![("LANCASTER".to_string(), 93.0)].into_iter().collect();

        render_score_map(&scores, &MAP_CITIES, &map, &out, &MarkerScale::default()).unwrap();

        // The label sits above LANCASTER at (674, 185).
        let chart = image::open(&out).unwrap().to_rgb8();
        let light = (634..714)
            .flat_map(|x| (150..170).map(move |y| (x, y)))
            .filter(|&(x, y)| chart.get_pixel(x, y).0.iter().all(|&c| c > 200))
            .count();
        assert!(light > 0);
    }

    #[test]
    fn missing_map_image_is_an_error() {
        let scores = Mapping::new();
        let result = render_score_map(
            &scores,
            &MAP_CITIES,
            Path::new("test-inputs/no_such_map.png"),
            Path::new("test-inputs/unused.png"),
            &MarkerScale::default(),
        );

        assert!(matches!(result, Err(crate::error::Error::Image(_))));
    }
}
