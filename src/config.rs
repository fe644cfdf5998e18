use serde::Serialize;

/// Standard serial rates the connection dialog offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum BaudRate {
    B9600,
    B19200,
    B38400,
    B57600,
    B115200,
    B230400,
}

impl BaudRate {
    pub const ALL: [BaudRate; 6] = [
        BaudRate::B9600,
        BaudRate::B19200,
        BaudRate::B38400,
        BaudRate::B57600,
        BaudRate::B115200,
        BaudRate::B230400,
    ];

    pub fn bits_per_second(self) -> u32 {
        match self {
            BaudRate::B9600 => 9_600,
            BaudRate::B19200 => 19_200,
            BaudRate::B38400 => 38_400,
            BaudRate::B57600 => 57_600,
            BaudRate::B115200 => 115_200,
            BaudRate::B230400 => 230_400,
        }
    }

    pub fn from_bits_per_second(bits: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.bits_per_second() == bits)
    }
}

impl Default for BaudRate {
    fn default() -> Self {
        BaudRate::B115200
    }
}

/// Y-axis policy for the chart view.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum YScale {
    /// Recompute min/max of the visible window per refresh, with padding.
    Auto,
    /// Fixed axis bounds.
    Fixed { min: f64, max: f64 },
}

impl Default for YScale {
    fn default() -> Self {
        YScale::Auto
    }
}

/// Whether consumers label samples by seconds-since-epoch or wall clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TimeDisplay {
    Relative,
    Absolute,
}

pub const MIN_CHART_WINDOW: usize = 10;
pub const MAX_CHART_WINDOW: usize = 1000;

/// Consumer-side display settings. Read by the windowing view only; none of
/// these affect what gets stored.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct ChartConfig {
    window: usize,
    pub y_scale: YScale,
    pub time_display: TimeDisplay,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            window: 200,
            y_scale: YScale::default(),
            time_display: TimeDisplay::Relative,
        }
    }
}

impl ChartConfig {
    pub fn window(&self) -> usize {
        self.window
    }

    pub fn set_window(&mut self, window: usize) {
        self.window = window.clamp(MIN_CHART_WINDOW, MAX_CHART_WINDOW);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baud_rates_round_trip_through_bits() {
        for rate in BaudRate::ALL {
            assert_eq!(BaudRate::from_bits_per_second(rate.bits_per_second()), Some(rate));
        }
        assert_eq!(BaudRate::from_bits_per_second(1200), None);
    }

    #[test]
    fn chart_window_is_clamped_to_its_range() {
        let mut config = ChartConfig::default();
        config.set_window(1);
        assert_eq!(config.window(), MIN_CHART_WINDOW);
        config.set_window(1_000_000);
        assert_eq!(config.window(), MAX_CHART_WINDOW);
        config.set_window(300);
        assert_eq!(config.window(), 300);
    }
}
