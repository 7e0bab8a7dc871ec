//! Named collections of noise channels.

use serde::{Deserialize, Serialize};

use crate::channel::NoiseChannel;
use crate::error::{NoiseError, NoiseResult};

/// A named noise configuration.
///
/// Channel order in the profile does not matter; the injector always
/// applies them as Depolarizing → BitFlip → Readout → Shots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoiseProfile {
    /// Profile name used in reports.
    pub name: String,
    /// Configured channels.
    #[serde(default)]
    pub channels: Vec<NoiseChannel>,
}

impl NoiseProfile {
    /// Create a profile from channels.
    pub fn new(name: impl Into<String>, channels: Vec<NoiseChannel>) -> Self {
        Self {
            name: name.into(),
            channels,
        }
    }

    /// No noise at all.
    pub fn ideal() -> Self {
        Self::new("ideal", Vec::new())
    }

    /// Gate depolarizing plus measurement error.
    pub fn depolarizing(gate_error: f64, measurement_error: f64) -> Self {
        Self::new(
            "depolarizing",
            vec![
                NoiseChannel::Depolarizing { p: gate_error },
                NoiseChannel::Readout {
                    p: measurement_error,
                },
            ],
        )
    }

    /// Readout error only.
    pub fn readout(readout_error: f64) -> Self {
        Self::new("readout", vec![NoiseChannel::Readout { p: readout_error }])
    }

    /// Gate depolarizing combined with readout error.
    pub fn combined(gate_error: f64, readout_error: f64) -> Self {
        Self::new(
            "combined",
            vec![
                NoiseChannel::Depolarizing { p: gate_error },
                NoiseChannel::Readout { p: readout_error },
            ],
        )
    }

    /// Add finite-shot estimation.
    #[must_use]
    pub fn with_shots(mut self, shots: u32) -> Self {
        self.channels.push(NoiseChannel::Shots { shots });
        self
    }

    /// Add a channel.
    #[must_use]
    pub fn with_channel(mut self, channel: NoiseChannel) -> Self {
        self.channels.push(channel);
        self
    }

    /// Validate every channel.
    pub fn validate(&self) -> NoiseResult<()> {
        self.channels.iter().try_for_each(NoiseChannel::validate)
    }

    /// True if no channel can change any expectation or probability.
    pub fn is_noiseless(&self) -> bool {
        self.channels
            .iter()
            .all(|c| c.flip_probability() == Some(0.0))
    }

    /// Channels sorted into application order.
    pub fn ordered_channels(&self) -> Vec<NoiseChannel> {
        let mut channels = self.channels.clone();
        channels.sort_by_key(NoiseChannel::stage);
        channels
    }
}

impl Default for NoiseProfile {
    fn default() -> Self {
        Self::ideal()
    }
}

impl std::fmt::Display for NoiseProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.channels.is_empty() {
            let parts: Vec<String> = self.channels.iter().map(ToString::to_string).collect();
            write!(f, " [{}]", parts.join(", "))?;
        }
        Ok(())
    }
}

/// Parses `ideal`, `depolarizing:p[,m]`, `readout:p` and `combined:g,r`.
impl std::str::FromStr for NoiseProfile {
    type Err = NoiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse_err = || NoiseError::Parse(s.to_string());
        let (kind, args) = match s.split_once(':') {
            Some((kind, args)) => (kind.trim(), args.trim()),
            None => (s.trim(), ""),
        };
        let values: Vec<f64> = if args.is_empty() {
            Vec::new()
        } else {
            args.split(',')
                .map(|v| v.trim().parse::<f64>().map_err(|_| parse_err()))
                .collect::<Result<_, _>>()?
        };

        let profile = match (kind, values.as_slice()) {
            ("ideal", []) => NoiseProfile::ideal(),
            ("depolarizing", [p]) => NoiseProfile::depolarizing(*p, *p),
            ("depolarizing", [g, m]) => NoiseProfile::depolarizing(*g, *m),
            ("readout", [p]) => NoiseProfile::readout(*p),
            ("combined", [p]) => NoiseProfile::combined(*p, *p),
            ("combined", [g, r]) => NoiseProfile::combined(*g, *r),
            _ => return Err(parse_err()),
        };
        profile.validate()?;
        Ok(profile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factories() {
        assert!(NoiseProfile::ideal().channels.is_empty());
        assert_eq!(NoiseProfile::readout(0.02).channels.len(), 1);
        let c = NoiseProfile::combined(0.01, 0.03);
        assert_eq!(c.name, "combined");
        assert_eq!(c.channels[1], NoiseChannel::Readout { p: 0.03 });
    }

    #[test]
    fn test_ordering_is_fixed() {
        let profile = NoiseProfile::new(
            "scrambled",
            vec![
                NoiseChannel::Shots { shots: 100 },
                NoiseChannel::Readout { p: 0.1 },
                NoiseChannel::Depolarizing { p: 0.1 },
                NoiseChannel::BitFlip { p: 0.1 },
            ],
        );
        let names: Vec<&str> = profile.ordered_channels().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["depolarizing", "bit_flip", "readout", "shots"]);
    }

    #[test]
    fn test_noiseless_detection() {
        assert!(NoiseProfile::ideal().is_noiseless());
        assert!(NoiseProfile::combined(0.0, 0.0).is_noiseless());
        assert!(!NoiseProfile::readout(0.01).is_noiseless());
        assert!(!NoiseProfile::ideal().with_shots(10).is_noiseless());
    }

    #[test]
    fn test_parse() {
        assert_eq!("ideal".parse::<NoiseProfile>().unwrap(), NoiseProfile::ideal());
        assert_eq!(
            "depolarizing:0.01".parse::<NoiseProfile>().unwrap(),
            NoiseProfile::depolarizing(0.01, 0.01)
        );
        assert_eq!(
            "combined:0.01,0.05".parse::<NoiseProfile>().unwrap(),
            NoiseProfile::combined(0.01, 0.05)
        );
        assert!(matches!(
            "thermal:0.1".parse::<NoiseProfile>(),
            Err(NoiseError::Parse(_))
        ));
        assert!(matches!(
            "readout:2.0".parse::<NoiseProfile>(),
            Err(NoiseError::InvalidProbability { .. })
        ));
    }

    #[test]
    fn test_yaml_roundtrip() {
        let yaml = "name: lab\nchannels:\n  - kind: bit_flip\n    p: 0.02\n  - kind: shots\n    shots: 256\n";
        let profile: NoiseProfile = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(profile.channels[0], NoiseChannel::BitFlip { p: 0.02 });
        assert_eq!(profile.channels[1], NoiseChannel::Shots { shots: 256 });
    }
}
