//! Plotters bitmap rendering of a prepared `RegulationChart`.

use std::path::Path;

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::{RegulationChart, figure_pixels};
use crate::error::RenderError;

const FONT: &str = "sans-serif";

/// Draw `chart` to a PNG at `path`, overwriting any existing file.
pub fn render_png(chart: &RegulationChart, path: &Path, dpi: u32) -> Result<(), RenderError> {
    draw(chart, path, dpi).map_err(|e| RenderError::Draw {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn draw(chart: &RegulationChart, path: &Path, dpi: u32) -> Result<(), Box<dyn std::error::Error>> {
    let (width, height) = figure_pixels(dpi);

    // Sizes below are in typographic points, scaled to the output DPI.
    let scale = f64::from(dpi) / 72.0;
    let pt = |size: f64| size * scale;
    let px = |size: f64| (size * scale).round() as u32;

    let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut ctx = ChartBuilder::on(&root)
        .caption("Baltic Imbalance and Regulation Activities", (FONT, pt(14.0)))
        .margin(px(10.0))
        .x_label_area_size(px(110.0))
        .y_label_area_size(px(60.0))
        .build_cartesian_2d(
            chart.x_bounds[0]..chart.x_bounds[1],
            chart.y_bounds[0]..chart.y_bounds[1],
        )?;

    // The x grid and labels are drawn by hand below: one per CET midnight.
    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(0)
        .x_desc("Time (CET)")
        .y_desc("Power (MW)")
        .y_label_formatter(&|v| format!("{v:.0}"))
        .y_label_style((FONT, pt(10.0)))
        .axis_desc_style((FONT, pt(11.0)))
        .axis_style(BLACK)
        .bold_line_style(BLACK.mix(0.3))
        .light_line_style(BLACK.mix(0.08))
        .draw()?;

    let [y_low, y_high] = chart.y_bounds;
    ctx.draw_series(
        chart
            .x_ticks
            .iter()
            .map(|&x| PathElement::new(vec![(x, y_low), (x, y_high)], BLACK.mix(0.3))),
    )?;

    // Plotters only rotates text by right angles.
    let label_style = TextStyle::from((FONT, pt(10.0)))
        .transform(FontTransform::Rotate90)
        .pos(Pos::new(HPos::Left, VPos::Center));
    let label_gap = px(6.0) as i32;
    for &x in &chart.x_ticks {
        let (tick_x, axis_y) = ctx.backend_coord(&(x, y_low));
        root.draw(&Text::new(
            chart.tick_label(x),
            (tick_x, axis_y + label_gap),
            label_style.clone(),
        ))?;
    }

    let stroke = px(1.5);
    let legend_len = px(20.0) as i32;
    let series = [
        ("Baltic Imbalance", &chart.imbalance, BLUE),
        ("Upward Regulation", &chart.up_regulation, GREEN),
        ("Downward Regulation", &chart.down_regulation, RED),
    ];
    for (label, points, color) in series {
        let style = color.stroke_width(stroke);
        ctx.draw_series(LineSeries::new(points.iter().copied(), style))?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + legend_len, y)], style));
    }

    ctx.configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .label_font((FONT, pt(10.0)))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
