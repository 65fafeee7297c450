use std::path::Path;

use plotters::element::Pie;
use plotters::prelude::*;
use thiserror::Error;

use crate::{aggregation::ChartData, config::ReportConfig};

const BAR_COLOR: RGBColor = RGBColor(0x7E, 0x57, 0xC2);
const PIE_START_ANGLE: f64 = 120.0;

const SLICE_COLORS: [RGBColor; 8] = [
    RGBColor(0x42, 0xA5, 0xF5),
    RGBColor(0xEF, 0x53, 0x50),
    RGBColor(0x66, 0xBB, 0x6A),
    RGBColor(0xFF, 0xA7, 0x26),
    RGBColor(0xAB, 0x47, 0xBC),
    RGBColor(0x26, 0xC6, 0xDA),
    RGBColor(0x8D, 0x6E, 0x63),
    RGBColor(0x78, 0x90, 0x9C),
];

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("nothing to plot")]
    Empty,
    #[error("chart rendering failed: {0}")]
    Render(String),
}

fn render_error<E: std::fmt::Display>(e: E) -> ChartError {
    ChartError::Render(e.to_string())
}

/// Draws aggregated expense totals as SVG charts.
pub struct ChartRenderer {
    width: u32,
    height: u32,
    currency_symbol: String,
}

impl ChartRenderer {
    pub fn new(report: &ReportConfig) -> Self {
        Self {
            width: report.chart_width,
            height: report.chart_height,
            currency_symbol: report.currency_symbol.clone(),
        }
    }

    /// One bar per group, in the order the groups were aggregated.
    pub fn render_bar(&self, data: &ChartData, destination: &Path) -> Result<(), ChartError> {
        if data.groups.is_empty() {
            return Err(ChartError::Empty);
        }

        let labels: Vec<String> = data.labels().iter().map(|l| l.to_string()).collect();
        let values = data.values_f64();
        let peak = values.iter().cloned().fold(0.0, f64::max);
        let y_max = if peak > 0.0 { peak * 1.1 } else { 1.0 };

        let root = SVGBackend::new(destination, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(data.title.as_ref(), ("sans-serif", 24))
            .margin(15)
            .x_label_area_size(60)
            .y_label_area_size(70)
            .build_cartesian_2d((0u32..values.len() as u32).into_segmented(), 0f64..y_max)
            .map_err(render_error)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .y_desc(format!("Amount in {}", self.currency_symbol))
            .x_labels(labels.len())
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => {
                    labels.get(*i as usize).cloned().unwrap_or_default()
                }
                SegmentValue::Last => String::new(),
            })
            .draw()
            .map_err(render_error)?;

        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(BAR_COLOR.filled())
                    .margin(10)
                    .data(values.iter().enumerate().map(|(i, v)| (i as u32, *v))),
            )
            .map_err(render_error)?;

        root.present().map_err(render_error)?;
        Ok(())
    }

    /// Proportional view with percentage labels on each slice.
    pub fn render_pie(&self, data: &ChartData, destination: &Path) -> Result<(), ChartError> {
        let sizes = data.values_f64();
        if sizes.iter().sum::<f64>() <= 0.0 {
            return Err(ChartError::Empty);
        }

        let labels: Vec<String> = data.labels().iter().map(|l| l.to_string()).collect();
        let colors: Vec<RGBColor> = (0..sizes.len())
            .map(|i| SLICE_COLORS[i % SLICE_COLORS.len()])
            .collect();

        let root = SVGBackend::new(destination, (self.width, self.height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_error)?;
        let area = root
            .titled(data.title.as_ref(), ("sans-serif", 24))
            .map_err(render_error)?;

        let (w, h) = area.dim_in_pixel();
        let center = ((w / 2) as i32, (h / 2) as i32);
        let radius = f64::from(w.min(h)) * 0.35;

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(PIE_START_ANGLE);
        pie.label_style(("sans-serif", 16).into_font().color(&BLACK));
        pie.percentages(("sans-serif", 14).into_font().color(&WHITE));
        area.draw(&pie).map_err(render_error)?;

        root.present().map_err(render_error)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use spendlog_core::GroupTotal;
    use std::sync::Arc;

    fn data(title: &str) -> ChartData {
        ChartData {
            title: Arc::from(title),
            groups: vec![
                GroupTotal::new("Bills", dec!(1200)),
                GroupTotal::new("Food", dec!(100)),
            ],
        }
    }

    #[test]
    fn test_bar_chart_is_written_as_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bar.svg");
        ChartRenderer::new(&ReportConfig::default())
            .render_bar(&data("Expenses by Category"), &path)
            .unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Expenses by Category"));
        assert!(svg.contains("Bills"));
    }

    #[test]
    fn test_pie_chart_is_written_as_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pie.svg");
        ChartRenderer::new(&ReportConfig::default())
            .render_pie(&data("Expense Allocation by Category"), &path)
            .unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Expense Allocation by Category"));
    }

    #[test]
    fn test_empty_data_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let empty = ChartData {
            title: Arc::from("Nothing"),
            groups: Vec::new(),
        };
        let renderer = ChartRenderer::new(&ReportConfig::default());
        assert!(matches!(
            renderer.render_bar(&empty, &dir.path().join("a.svg")),
            Err(ChartError::Empty)
        ));
        assert!(matches!(
            renderer.render_pie(&empty, &dir.path().join("b.svg")),
            Err(ChartError::Empty)
        ));
    }
}
