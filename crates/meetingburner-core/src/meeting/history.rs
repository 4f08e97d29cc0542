use serde::{Deserialize, Serialize};

/// One point on the running cost chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostSample {
    /// Active seconds since start.
    pub time: u64,
    pub cost: f64,
    /// `time` rendered with [`format_time`].
    pub label: String,
}

impl CostSample {
    pub fn new(time: u64, cost: f64) -> Self {
        Self {
            time,
            cost,
            label: format_time(time),
        }
    }

    pub fn zero() -> Self {
        Self::new(0, 0.0)
    }
}

/// `HH:MM:SS`, zero-padded; hours keep counting past 24.
pub fn format_time(seconds: u64) -> String {
    let hrs = seconds / 3600;
    let mins = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hrs:02}:{mins:02}:{secs:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_hours_minutes_seconds() {
        assert_eq!(format_time(0), "00:00:00");
        assert_eq!(format_time(59), "00:00:59");
        assert_eq!(format_time(3661), "01:01:01");
    }

    #[test]
    fn hours_do_not_wrap() {
        assert_eq!(format_time(100 * 3600 + 5), "100:00:05");
        assert_eq!(format_time(25 * 3600), "25:00:00");
    }

    #[test]
    fn zero_sample_is_labelled() {
        let s = CostSample::zero();
        assert_eq!(s.label, "00:00:00");
        assert_eq!(s.cost, 0.0);
    }
}
