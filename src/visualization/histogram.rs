use crate::analysis::{AspectBins, AspectRecord};
use crate::data::save_image;
use crate::error::Result;
use image::{Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CHART_WIDTH: u32 = 800;
pub const CHART_HEIGHT: u32 = 480;
pub const CHART_MARGIN: u32 = 40;

pub const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
pub const BAR_FILL: Rgb<u8> = Rgb([135, 206, 235]);
pub const BAR_EDGE: Rgb<u8> = Rgb([0, 0, 0]);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub label: String,
    pub count: usize,
}

/// Count records per bucket, in bucket order. `invalid` and `unknown` rows are not counted.
pub fn range_counts(records: &[AspectRecord], bins: &AspectBins) -> Vec<HistogramBin> {
    bins.labels()
        .into_iter()
        .map(|label| {
            let count = records
                .iter()
                .filter(|r| r.aspect_ratio_range == label)
                .count();
            HistogramBin { label, count }
        })
        .collect()
}

/// Draw a bar chart, one bar per bin, scaled to the largest count.
pub fn render_histogram(counts: &[HistogramBin]) -> RgbImage {
    let mut chart = RgbImage::from_pixel(CHART_WIDTH, CHART_HEIGHT, BACKGROUND);
    let baseline = CHART_HEIGHT - CHART_MARGIN;
    let plot_width = CHART_WIDTH - 2 * CHART_MARGIN;
    let plot_height = CHART_HEIGHT - 2 * CHART_MARGIN;

    // axes
    for x in CHART_MARGIN - 1..CHART_WIDTH - CHART_MARGIN {
        chart.put_pixel(x, baseline, BAR_EDGE);
    }
    for y in CHART_MARGIN..=baseline {
        chart.put_pixel(CHART_MARGIN - 1, y, BAR_EDGE);
    }

    let max_count = counts.iter().map(|b| b.count).max().unwrap_or(0);
    if counts.is_empty() || max_count == 0 {
        return chart;
    }

    let slot = (plot_width / counts.len() as u32).max(1);
    let bar_width = (slot * 4 / 5).max(1);
    let plot_right = CHART_MARGIN + plot_width;

    for (i, bin) in counts.iter().enumerate() {
        let bar_height = (bin.count as u64 * plot_height as u64 / max_count as u64) as u32;
        if bar_height == 0 {
            continue;
        }

        let x0 = CHART_MARGIN + i as u32 * slot + slot.saturating_sub(bar_width) / 2;
        if x0 >= plot_right {
            break;
        }
        let x1 = (x0 + bar_width - 1).min(plot_right - 1);
        let y0 = baseline - bar_height;
        let y1 = baseline - 1;

        for y in y0..=y1 {
            for x in x0..=x1 {
                let edge = x == x0 || x == x1 || y == y0;
                chart.put_pixel(x, y, if edge { BAR_EDGE } else { BAR_FILL });
            }
        }
    }

    chart
}

pub fn save_histogram<P: AsRef<Path>>(counts: &[HistogramBin], path: P) -> Result<()> {
    let path = path.as_ref();
    save_image(&render_histogram(counts), path)?;
    tracing::info!(path = %path.display(), bins = counts.len(), "Histogram saved");
    Ok(())
}

pub fn print_histogram(counts: &[HistogramBin]) {
    let max_count = counts.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    println!("| Range | Count | Bar |");
    println!("|-------|-------|-----|");
    for bin in counts {
        let bar = "#".repeat(bin.count * 40 / max_count);
        println!("| {} | {} | {} |", bin.label, bin.count, bar);
    }
}
