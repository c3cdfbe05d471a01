//! Numeric column selection, validation, and bar chart rendering.

use log::debug;
use plotters::prelude::*;
use polars::prelude::*;

use crate::error::{Error, Result};

pub const WARN_SELECT_ANY: &str = "Please select a column for visualization.";
pub const WARN_SELECT_RANGE: &str = "Please select between 2 and 3 columns for visualization.";

/// Outcome of validating a chart column selection. Warnings are advisory:
/// they block only the chart render, never the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionCheck {
    Ready,
    Warning(&'static str),
}

/// A chart needs at least 2 and at most 3 columns; an empty selection gets
/// its own nudge.
pub fn validate_selection(selected: &[String]) -> SelectionCheck {
    match selected.len() {
        0 => SelectionCheck::Warning(WARN_SELECT_ANY),
        2 | 3 => SelectionCheck::Ready,
        _ => SelectionCheck::Warning(WARN_SELECT_RANGE),
    }
}

/// Names of numeric columns, the selectable set for charting.
pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| c.dtype().is_numeric())
        .map(|c| c.name().to_string())
        .collect()
}

pub struct ChartSeries {
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

pub struct ChartData {
    pub series: Vec<ChartSeries>,
}

/// Prepare bar chart data: one series per selected column, values against
/// row index. Nulls and non-finite values are skipped; rows are capped at
/// `row_limit`.
pub fn bar_chart_data(df: &DataFrame, columns: &[String], row_limit: usize) -> Result<ChartData> {
    if columns.is_empty() {
        return Ok(ChartData { series: Vec::new() });
    }
    let select_exprs: Vec<Expr> = columns
        .iter()
        .map(|name| col(name.as_str()).cast(DataType::Float64))
        .collect();
    let collected = df
        .clone()
        .lazy()
        .select(select_exprs)
        .slice(0, row_limit as u32)
        .collect()?;
    let n_rows = collected.height();
    debug!("charting {} columns over {} rows", columns.len(), n_rows);

    let mut series = Vec::with_capacity(columns.len());
    for name in columns {
        let values = collected.column(name.as_str())?.f64()?;
        let mut points = Vec::with_capacity(n_rows);
        for i in 0..n_rows {
            if let Some(y) = values.get(i) {
                if y.is_finite() {
                    points.push((i as f64, y));
                }
            }
        }
        series.push(ChartSeries {
            name: name.clone(),
            points,
        });
    }
    Ok(ChartData { series })
}

/// Render grouped bars per row index to an SVG document.
pub fn render_bar_chart(data: &ChartData, width: u32, height: u32) -> Result<String> {
    let series: Vec<&ChartSeries> = data
        .series
        .iter()
        .filter(|s| !s.points.is_empty())
        .collect();
    if series.is_empty() {
        return Err(Error::Chart("no data to render".to_string()));
    }

    let xs = series.iter().flat_map(|s| s.points.iter().map(|p| p.0));
    let x_max = xs.fold(0.0_f64, f64::max) + 1.0;
    let ys = || series.iter().flat_map(|s| s.points.iter().map(|p| p.1));
    let y_min = ys().fold(0.0_f64, f64::min);
    let mut y_max = ys().fold(0.0_f64, f64::max);
    if y_max <= y_min {
        y_max = y_min + 1.0;
    }

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| Error::Chart(e.to_string()))?;
        let mut chart = ChartBuilder::on(&root)
            .margin(10)
            .x_label_area_size(30)
            .y_label_area_size(50)
            .build_cartesian_2d(-0.5..x_max, y_min..y_max)
            .map_err(|e| Error::Chart(e.to_string()))?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .draw()
            .map_err(|e| Error::Chart(e.to_string()))?;

        let group_width = 0.8 / series.len() as f64;
        for (series_idx, s) in series.iter().enumerate() {
            let color = Palette99::pick(series_idx).mix(0.9);
            let offset = -0.4 + group_width * series_idx as f64;
            chart
                .draw_series(s.points.iter().map(|&(x, y)| {
                    let x0 = x + offset;
                    let (y0, y1) = if y >= 0.0 { (0.0, y) } else { (y, 0.0) };
                    Rectangle::new([(x0, y0), (x0 + group_width, y1)], color.filled())
                }))
                .map_err(|e| Error::Chart(e.to_string()))?
                .label(s.name.clone())
                .legend(move |(x, y)| {
                    Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled())
                });
        }
        chart
            .configure_series_labels()
            .border_style(&BLACK)
            .draw()
            .map_err(|e| Error::Chart(e.to_string()))?;
        root.present().map_err(|e| Error::Chart(e.to_string()))?;
    }
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn selection_boundaries() {
        assert_eq!(
            validate_selection(&[]),
            SelectionCheck::Warning(WARN_SELECT_ANY)
        );
        assert_eq!(
            validate_selection(&names(&["a"])),
            SelectionCheck::Warning(WARN_SELECT_RANGE)
        );
        assert_eq!(validate_selection(&names(&["a", "b"])), SelectionCheck::Ready);
        assert_eq!(
            validate_selection(&names(&["a", "b", "c"])),
            SelectionCheck::Ready
        );
        assert_eq!(
            validate_selection(&names(&["a", "b", "c", "d"])),
            SelectionCheck::Warning(WARN_SELECT_RANGE)
        );
    }

    #[test]
    fn numeric_columns_excludes_text() {
        let df = df!(
            "a" => &[1, 2],
            "t" => &["x", "y"],
            "b" => &[1.5, 2.5]
        )
        .unwrap();
        assert_eq!(numeric_columns(&df), names(&["a", "b"]));
    }

    #[test]
    fn bar_chart_points_against_row_index() {
        let df = df!("a" => &[10.0_f64, 20.0, 30.0], "b" => &[1.0_f64, 2.0, 3.0]).unwrap();
        let data = bar_chart_data(&df, &names(&["a", "b"]), 100).unwrap();
        assert_eq!(data.series.len(), 2);
        assert_eq!(data.series[0].points, vec![(0.0, 10.0), (1.0, 20.0), (2.0, 30.0)]);
        assert_eq!(data.series[1].name, "b");
    }

    #[test]
    fn bar_chart_skips_nulls() {
        let df = df!("a" => &[Some(1.0_f64), None, Some(3.0)]).unwrap();
        let data = bar_chart_data(&df, &names(&["a"]), 100).unwrap();
        assert_eq!(data.series[0].points, vec![(0.0, 1.0), (2.0, 3.0)]);
    }

    #[test]
    fn bar_chart_respects_row_limit() {
        let df = df!("a" => (0..100).map(|i| i as f64).collect::<Vec<f64>>()).unwrap();
        let data = bar_chart_data(&df, &names(&["a"]), 10).unwrap();
        assert_eq!(data.series[0].points.len(), 10);
    }

    #[test]
    fn empty_selection_yields_no_series() {
        let df = df!("a" => &[1.0_f64]).unwrap();
        let data = bar_chart_data(&df, &[], 100).unwrap();
        assert!(data.series.is_empty());
    }

    #[test]
    fn render_produces_svg() {
        let df = df!("a" => &[1.0_f64, 2.0], "b" => &[3.0_f64, 4.0]).unwrap();
        let data = bar_chart_data(&df, &names(&["a", "b"]), 100).unwrap();
        let svg = render_bar_chart(&data, 320, 240).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("</svg>"));
    }

    #[test]
    fn render_with_no_points_is_an_error() {
        let data = ChartData { series: Vec::new() };
        assert!(matches!(
            render_bar_chart(&data, 320, 240),
            Err(Error::Chart(_))
        ));
    }
}
