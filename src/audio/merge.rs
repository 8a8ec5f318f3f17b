use serde::Deserialize;

/// How the channels of one frame collapse into a single value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
pub enum MergePolicy {
    /// Mean of the absolute channel values.
    #[default]
    #[serde(rename = "average")]
    #[value(name = "average")]
    AverageAbs,
    /// The signed sample with the largest magnitude across channels.
    #[serde(rename = "max")]
    #[value(name = "max")]
    MaxMagnitude,
}

impl MergePolicy {
    pub fn merge(self, frame: &[i32]) -> f64 {
        if frame.is_empty() {
            return 0.0;
        }
        match self {
            MergePolicy::AverageAbs => {
                let sum: f64 = frame.iter().map(|&s| f64::from(s).abs()).sum();
                sum / frame.len() as f64
            }
            MergePolicy::MaxMagnitude => {
                let mut loudest = frame[0];
                for &s in &frame[1..] {
                    if s.unsigned_abs() > loudest.unsigned_abs() {
                        loudest = s;
                    }
                }
                f64::from(loudest)
            }
        }
    }
}
