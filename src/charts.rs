//! SVG charts of gap minutes over event time.
//!
//! Two chart kinds, matching the dashboard panels: a bar chart and a
//! scatter plot, both with event timestamps on the X axis and gap minutes
//! on the Y axis. Documents are assembled as strings and returned to the
//! caller; rows without a timestamp are not plotted.

use chrono::NaiveDateTime;

use crate::record::Record;

const WIDTH: u32 = 680;
const HEIGHT: u32 = 300;
const MARGIN: u32 = 50;

const BAR_COLOR: &str = "#2563eb";
const DOT_COLOR: &str = "#2563eb";
const AXIS_COLOR: &str = "#e5e7eb";
const TEXT_COLOR: &str = "#6b7280";
const TITLE_COLOR: &str = "#374151";

struct ChartScale {
    points: Vec<(NaiveDateTime, f64)>,
    t_min: NaiveDateTime,
    t_span_seconds: f64,
    max_diff: f64,
}

impl ChartScale {
    fn from_records(records: &[Record]) -> Option<ChartScale> {
        let points: Vec<(NaiveDateTime, f64)> = records
            .iter()
            .filter_map(|r| r.timestamp.map(|t| (t, r.diff_minutes)))
            .collect();

        let t_min = points.iter().map(|(t, _)| *t).min()?;
        let t_max = points.iter().map(|(t, _)| *t).max()?;
        let t_span_seconds = ((t_max - t_min).num_seconds() as f64).max(1.0);
        let max_diff = points.iter().map(|(_, d)| *d).fold(0.0, f64::max).max(1.0);

        Some(ChartScale {
            points,
            t_min,
            t_span_seconds,
            max_diff,
        })
    }

    fn x(&self, t: NaiveDateTime) -> f64 {
        let chart_width = (WIDTH - 2 * MARGIN) as f64;
        MARGIN as f64 + (t - self.t_min).num_seconds() as f64 / self.t_span_seconds * chart_width
    }

    fn y(&self, diff: f64) -> f64 {
        let chart_height = (HEIGHT - 2 * MARGIN) as f64;
        MARGIN as f64 + chart_height - diff / self.max_diff * chart_height
    }
}

fn chart_frame(title: &str, marks: &str, scale: &ChartScale) -> String {
    let x_left = scale.t_min.format("%Y-%m-%d %H:%M");
    let y_top = format!("{:.0}", scale.max_diff);

    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" style="background:white; border-radius:8px">
  <text x="{tx}" y="20" text-anchor="middle" font-size="14" font-weight="600" fill="{title_color}">{title}</text>
  <line x1="{m}" y1="{bottom}" x2="{right}" y2="{bottom}" stroke="{axis}" stroke-width="2"/>
  <line x1="{m}" y1="{m}" x2="{m}" y2="{bottom}" stroke="{axis}" stroke-width="2"/>
  <text x="{m}" y="{label_y}" font-size="11" fill="{text}">{x_left}</text>
  <text x="{y_label_x}" y="{m}" text-anchor="end" font-size="11" fill="{text}">{y_top}</text>
  <text x="{y_label_x}" y="{bottom}" text-anchor="end" font-size="11" fill="{text}">0</text>
  <text x="15" y="{mid}" text-anchor="middle" font-size="12" fill="{text}" transform="rotate(-90, 15, {mid})">minutes</text>
{marks}</svg>
"##,
        w = WIDTH,
        h = HEIGHT,
        tx = WIDTH / 2,
        title_color = TITLE_COLOR,
        title = title,
        m = MARGIN,
        bottom = HEIGHT - MARGIN,
        right = WIDTH - MARGIN,
        axis = AXIS_COLOR,
        label_y = HEIGHT - MARGIN + 20,
        y_label_x = MARGIN - 6,
        text = TEXT_COLOR,
        x_left = x_left,
        y_top = y_top,
        mid = HEIGHT / 2,
        marks = marks,
    )
}

/// Bar chart of gap minutes per event. `None` when nothing is plottable.
pub fn diff_bar_chart(records: &[Record], title: &str) -> Option<String> {
    let scale = ChartScale::from_records(records)?;

    let bar_width = ((WIDTH - 2 * MARGIN) as f64 / scale.points.len() as f64 * 0.8).clamp(1.0, 20.0);
    let bottom = (HEIGHT - MARGIN) as f64;

    let mut marks = String::new();
    for (t, diff) in &scale.points {
        let y = scale.y(*diff);
        let height = bottom - y;
        if height <= 0.0 {
            continue;
        }
        marks.push_str(&format!(
            r##"  <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}" opacity="0.8"/>
"##,
            scale.x(*t) - bar_width / 2.0,
            y,
            bar_width,
            height,
            BAR_COLOR,
        ));
    }

    Some(chart_frame(title, &marks, &scale))
}

/// Scatter plot of gap minutes per event. `None` when nothing is plottable.
pub fn diff_scatter_chart(records: &[Record], title: &str) -> Option<String> {
    let scale = ChartScale::from_records(records)?;

    let mut marks = String::new();
    for (t, diff) in &scale.points {
        marks.push_str(&format!(
            r##"  <circle cx="{:.1}" cy="{:.1}" r="4" fill="{}" opacity="0.8"/>
"##,
            scale.x(*t),
            scale.y(*diff),
            DOT_COLOR,
        ));
    }

    Some(chart_frame(title, &marks, &scale))
}
