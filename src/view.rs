use crate::channel::ChannelRegistry;
use crate::config::{ChartConfig, TimeDisplay, YScale};
use crate::sample::Sample;

/// One plot line: the channel's identity plus `[relative_s, value]` points.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSeries {
    pub key: String,
    pub display_name: String,
    pub points: Vec<[f64; 2]>,
}

/// Ready-to-draw snapshot derived from the most recent window of samples.
/// Pure and non-mutating; ingestion appending after this is built cannot
/// touch it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartView {
    pub series: Vec<ChartSeries>,
    pub y_range: Option<(f64, f64)>,
    pub time_display: TimeDisplay,
    pub time_labels: Vec<String>,
}

/// Builds the chart view for the registered channels over `samples`
/// (typically `window(config.window())` output).
pub fn chart_view(
    samples: &[Sample],
    registry: &ChannelRegistry,
    config: &ChartConfig,
) -> ChartView {
    let series = registry
        .channels()
        .iter()
        .enumerate()
        .map(|(index, channel)| ChartSeries {
            key: channel.key.clone(),
            display_name: channel.display_name.clone(),
            points: samples
                .iter()
                .filter_map(|s| s.value_at(index).map(|v| [s.relative_s, v]))
                .collect(),
        })
        .collect();
    ChartView {
        y_range: y_range(samples, registry.len(), config.y_scale),
        series,
        time_display: config.time_display,
        time_labels: samples
            .iter()
            .map(|s| s.time_label(config.time_display))
            .collect(),
    }
}

fn y_range(samples: &[Sample], channel_count: usize, scale: YScale) -> Option<(f64, f64)> {
    match scale {
        YScale::Fixed { min, max } => Some((min, max)),
        YScale::Auto => {
            let mut min = f64::MAX;
            let mut max = f64::MIN;
            for sample in samples {
                for index in 0..channel_count {
                    if let Some(value) = sample.value_at(index) {
                        min = min.min(value);
                        max = max.max(value);
                    }
                }
            }
            if min > max {
                return None;
            }
            // Avoid a zero-height axis.
            let pad = ((max - min) * 0.1).max(0.5);
            Some((min - pad, max + pad))
        }
    }
}
