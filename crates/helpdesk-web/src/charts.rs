//! Server-side SVG charts
//!
//! Every chart is drawn with plotters into an in-memory SVG string and
//! inlined in the page, so the dashboard renders without any script or
//! network access. Colors follow the usual plotly sequence.

use chrono::{Days, NaiveDate};
use helpdesk_core::{
    Error, Result,
    metrics::{CategoryCount, DailyCount, DashboardSummary},
};
use plotters::prelude::*;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 420;

const PRIMARY: RGBColor = RGBColor(0x63, 0x6e, 0xfa);

const PALETTE: [RGBColor; 10] = [
    PRIMARY,
    RGBColor(0xef, 0x55, 0x3b),
    RGBColor(0x00, 0xcc, 0x96),
    RGBColor(0xab, 0x63, 0xfa),
    RGBColor(0xff, 0xa1, 0x5a),
    RGBColor(0x19, 0xd3, 0xf3),
    RGBColor(0xff, 0x66, 0x92),
    RGBColor(0xb6, 0xe8, 0x80),
    RGBColor(0xff, 0x97, 0xff),
    RGBColor(0xfe, 0xcb, 0x52),
];

const TEXT: RGBColor = RGBColor(0x31, 0x33, 0x3f);
const MUTED: RGBColor = RGBColor(0x8e, 0x8f, 0x99);
const GRID: RGBColor = RGBColor(0xe6, 0xe9, 0xef);

/// Date labels drawn under a timeline
const DATE_LABELS: usize = 6;

/// The four dashboard charts, rendered
#[derive(Debug, Clone)]
pub struct ChartSet {
    /// Ticket status pie
    pub status: String,
    /// Ticket priority bars
    pub priority: String,
    /// Ticket source pie
    pub source: String,
    /// Tickets created per day
    pub timeline: String,
}

impl ChartSet {
    /// Render every chart for a summary
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] if plotters fails to draw a chart.
    pub fn from_summary(summary: &DashboardSummary) -> Result<Self> {
        Ok(Self {
            status: pie_chart("Ticket Status Distribution", &summary.status)?,
            priority: bar_chart(
                "Tickets by Priority",
                "Priority",
                "Number of Tickets",
                &summary.priority,
            )?,
            source: pie_chart("Ticket Source Distribution", &summary.source)?,
            timeline: line_chart(
                "Tickets Created Over Time",
                "Date",
                "Number of Tickets",
                &summary.timeline,
            )?,
        })
    }
}

fn draw_error(err: impl std::fmt::Display) -> Error {
    Error::Template(format!("Chart rendering failed: {err}"))
}

fn to_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

/// Let the page size the chart; plotters emits fixed pixel dimensions
fn make_svg_responsive(svg: String) -> String {
    let needle = format!("width=\"{WIDTH}\" height=\"{HEIGHT}\"");
    let replacement = if svg.contains("viewBox") {
        r#"class="chart" preserveAspectRatio="xMidYMid meet""#.to_string()
    } else {
        format!(
            r#"class="chart" viewBox="0 0 {WIDTH} {HEIGHT}" preserveAspectRatio="xMidYMid meet""#
        )
    };
    svg.replacen(&needle, &replacement, 1)
}

/// Title and a "No data" notice in place of an empty chart
fn empty_chart(title: &str) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;
        let area = root
            .titled(title, ("sans-serif", 18).into_font().color(&TEXT))
            .map_err(draw_error)?;

        let (w, h) = area.dim_in_pixel();
        let x = i32::try_from(w / 2).unwrap_or(0) - 28;
        let y = i32::try_from(h / 2).unwrap_or(0);
        area.draw_text(
            "No data",
            &("sans-serif", 16).into_font().color(&MUTED),
            (x, y),
        )
        .map_err(draw_error)?;
        root.present().map_err(draw_error)?;
    }
    Ok(make_svg_responsive(svg))
}

/// Pie chart, one labelled slice per category
///
/// # Errors
///
/// Returns [`Error::Template`] if drawing fails.
#[allow(clippy::cast_precision_loss)]
pub fn pie_chart(title: &str, slices: &[CategoryCount]) -> Result<String> {
    if slices.is_empty() {
        return empty_chart(title);
    }

    let sizes: Vec<f64> = slices.iter().map(|s| s.count as f64).collect();
    let labels: Vec<&str> = slices.iter().map(|s| s.label.as_str()).collect();
    let colors: Vec<RGBColor> = PALETTE.iter().cycle().take(slices.len()).copied().collect();

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;
        let area = root
            .titled(title, ("sans-serif", 18).into_font().color(&TEXT))
            .map_err(draw_error)?;

        let (w, h) = area.dim_in_pixel();
        let center = (
            i32::try_from(w / 2).unwrap_or(0),
            i32::try_from(h / 2).unwrap_or(0),
        );
        let radius = f64::from(w.min(h)) * 0.34;

        let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
        pie.start_angle(-90.0);
        pie.label_style(("sans-serif", 13).into_font().color(&TEXT));
        pie.percentages(("sans-serif", 12).into_font().color(&WHITE));
        area.draw(&pie).map_err(draw_error)?;

        root.present().map_err(draw_error)?;
    }
    Ok(make_svg_responsive(svg))
}

/// Vertical bar chart over categories, in the order given
///
/// # Errors
///
/// Returns [`Error::Template`] if drawing fails.
pub fn bar_chart(
    title: &str,
    x_desc: &str,
    y_desc: &str,
    bars: &[CategoryCount],
) -> Result<String> {
    if bars.is_empty() {
        return empty_chart(title);
    }

    let labels: Vec<&str> = bars.iter().map(|b| b.label.as_str()).collect();
    let top = bars.iter().map(|b| to_u32(b.count)).max().unwrap_or(0);
    let y_max = top + top / 10 + 1;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 18).into_font().color(&TEXT))
            .margin(12)
            .x_label_area_size(44)
            .y_label_area_size(56)
            .build_cartesian_2d((0u32..to_u32(bars.len())).into_segmented(), 0u32..y_max)
            .map_err(draw_error)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .light_line_style(&GRID)
            .x_labels(bars.len())
            .x_label_formatter(&|value: &SegmentValue<u32>| match value {
                SegmentValue::CenterOf(index) => usize::try_from(*index)
                    .ok()
                    .and_then(|i| labels.get(i))
                    .map(ToString::to_string)
                    .unwrap_or_default(),
                _ => String::new(),
            })
            .x_desc(x_desc)
            .y_desc(y_desc)
            .label_style(("sans-serif", 12).into_font().color(&TEXT))
            .draw()
            .map_err(draw_error)?;

        chart
            .draw_series(
                Histogram::vertical(&chart)
                    .style(PRIMARY.filled())
                    .margin(16)
                    .data(
                        (0u32..)
                            .zip(bars)
                            .map(|(index, bar)| (index, to_u32(bar.count))),
                    ),
            )
            .map_err(draw_error)?;

        root.present().map_err(draw_error)?;
    }
    Ok(make_svg_responsive(svg))
}

/// Line chart of daily counts on a date axis, one marker per day
///
/// # Errors
///
/// Returns [`Error::Template`] if drawing fails.
pub fn line_chart(
    title: &str,
    x_desc: &str,
    y_desc: &str,
    points: &[DailyCount],
) -> Result<String> {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return empty_chart(title);
    };

    // One day of padding keeps single-day series off the plot edges
    let start = first.day.checked_sub_days(Days::new(1)).unwrap_or(first.day);
    let end = last.day.checked_add_days(Days::new(1)).unwrap_or(last.day);
    let top = points.iter().map(|p| to_u32(p.count)).max().unwrap_or(0);
    let y_max = top + top / 10 + 1;

    let series: Vec<(NaiveDate, u32)> = points.iter().map(|p| (p.day, to_u32(p.count))).collect();

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 18).into_font().color(&TEXT))
            .margin(12)
            .x_label_area_size(44)
            .y_label_area_size(56)
            .build_cartesian_2d(start..end, 0u32..y_max)
            .map_err(draw_error)?;

        chart
            .configure_mesh()
            .light_line_style(&GRID)
            .x_labels(DATE_LABELS)
            .x_label_formatter(&|day: &NaiveDate| day.format("%b %d").to_string())
            .x_desc(x_desc)
            .y_desc(y_desc)
            .label_style(("sans-serif", 12).into_font().color(&TEXT))
            .draw()
            .map_err(draw_error)?;

        chart
            .draw_series(LineSeries::new(
                series.iter().copied(),
                ShapeStyle::from(&PRIMARY).stroke_width(2),
            ))
            .map_err(draw_error)?;

        chart
            .draw_series(
                series
                    .iter()
                    .map(|&(day, count)| Circle::new((day, count), 4, PRIMARY.filled())),
            )
            .map_err(draw_error)?;

        root.present().map_err(draw_error)?;
    }
    Ok(make_svg_responsive(svg))
}
