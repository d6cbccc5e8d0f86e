//! Policy configuration and parameter-string parsing.
//!
//! Parameters are given as comma-separated `key=value` pairs with
//! case-insensitive keys, e.g. `"s-ratio=0.1,m-ratio=0.7,lq-ratio=0.2"`.
//! [`DEFAULT_PARAMS`] is applied first and user parameters override it.

use crate::error::ConfigError;
use crate::object::Frequency;

/// Policy name used in diagnostics.
pub const POLICY_NAME: &str = "S3FIFO";

/// Parameters applied before any user-supplied parameters.
pub const DEFAULT_PARAMS: &str = "s-ratio=0.10,m-ratio=0.70,lq-ratio=0.20,\
     ghost-size-ratio=0.90,move-to-main-threshold=2,\
     alpha=1.0,beta=0.5,gamma=2.0";

/// Default retention score threshold.
pub const DEFAULT_SCORE_THRESHOLD: f64 = 5.0;

/// Largest accepted `dcp-window`, in requests.
pub const MAX_PLANNER_WINDOW: usize = 1 << 24;

/// Decay applied to a main-tier object's frequency when it is retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyDecay {
    /// Subtract a fixed amount (floor at 0).
    Linear {
        /// Amount to subtract from frequency.
        amount: Frequency,
    },

    /// Clamp to `ceiling`, then subtract `amount` (floor at 0).
    ///
    /// `Clamped { ceiling: 3, amount: 1 }` behaves like a 2-bit clock.
    Clamped {
        /// Highest frequency kept before subtracting.
        ceiling: Frequency,
        /// Amount to subtract after clamping.
        amount: Frequency,
    },
}

impl FrequencyDecay {
    /// Apply the decay strategy to a frequency value.
    #[inline]
    pub fn apply(&self, freq: Frequency) -> Frequency {
        match self {
            Self::Linear { amount } => freq.saturating_sub(*amount),
            Self::Clamped { ceiling, amount } => freq.min(*ceiling).saturating_sub(*amount),
        }
    }
}

impl Default for FrequencyDecay {
    fn default() -> Self {
        Self::Clamped {
            ceiling: 3,
            amount: 1,
        }
    }
}

/// Capacity planner tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannerConfig {
    /// Number of recent requests the built-in request window covers.
    pub window: usize,
    /// Recent large-request count above which the large tier grows.
    pub large_threshold: f64,
    /// Recent small-request count above which the small and main tiers grow.
    pub small_threshold: f64,
    /// Ratio adjustment step. Zero disables adjustment.
    pub step: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            window: 1000,
            large_threshold: 200.0,
            small_threshold: 400.0,
            step: 0.05,
        }
    }
}

/// Tunable parameters of the policy.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyConfig {
    /// Fraction of capacity for the Small tier.
    pub s_ratio: f64,
    /// Fraction of capacity for the Main tier.
    pub m_ratio: f64,
    /// Fraction of capacity for the Large tier.
    pub lq_ratio: f64,
    /// Ghost capacity as a fraction of total capacity. Zero disables the ghost index.
    pub ghost_size_ratio: f64,
    /// Legacy clock promotion threshold. Only reported in the policy name.
    pub move_to_main_threshold: i32,
    /// Legacy small-tier fraction. Only reported in the policy name.
    pub fifo_size_ratio: f64,
    /// Weight of access frequency in the retention score.
    pub alpha: f64,
    /// Weight of `ln(size)` in the retention score.
    pub beta: f64,
    /// Weight of reload cost in the retention score.
    pub gamma: f64,
    /// Objects scoring at or above this are promoted or retained.
    pub score_threshold: f64,
    /// Objects strictly larger than this are routed to the Large tier.
    /// `None` routes every object to the Small tier.
    pub size_threshold: Option<u64>,
    /// Decay applied when a main-tier object is retained.
    pub main_decay: FrequencyDecay,
    /// Capacity planner tuning.
    pub planner: PlannerConfig,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            s_ratio: 0.10,
            m_ratio: 0.70,
            lq_ratio: 0.20,
            ghost_size_ratio: 0.90,
            move_to_main_threshold: 2,
            fifo_size_ratio: 0.10,
            alpha: 1.0,
            beta: 0.5,
            gamma: 2.0,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            size_threshold: None,
            main_decay: FrequencyDecay::default(),
            planner: PlannerConfig::default(),
        }
    }
}

/// Result of parsing a parameter string.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedParams {
    /// The effective configuration.
    pub config: PolicyConfig,
    /// The `print` flag was present; the caller should print the effective
    /// parameters and stop.
    pub print_requested: bool,
}

impl PolicyConfig {
    /// Create a config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a config from [`DEFAULT_PARAMS`] overridden by `params`.
    pub fn from_params(params: &str) -> Result<ParsedParams, ConfigError> {
        let mut config = Self::default();
        config.apply_params(DEFAULT_PARAMS)?;
        let print_requested = config.apply_params(params)?;
        Ok(ParsedParams {
            config,
            print_requested,
        })
    }

    /// Apply a parameter string on top of the current values.
    ///
    /// Returns `true` if the `print` flag was present.
    pub fn apply_params(&mut self, params: &str) -> Result<bool, ConfigError> {
        let mut print_requested = false;

        for pair in params.split(',') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }

            let (key, value) = match pair.split_once('=') {
                Some((key, value)) => (key.trim(), Some(value.trim())),
                None => (pair, None),
            };

            if key.eq_ignore_ascii_case("print") {
                print_requested = true;
                continue;
            }

            let lower = key.to_ascii_lowercase();
            let value = value.ok_or_else(|| ConfigError::MissingValue {
                key: key.to_string(),
            })?;

            match lower.as_str() {
                "s-ratio" => self.s_ratio = parse_value(key, value)?,
                "m-ratio" => self.m_ratio = parse_value(key, value)?,
                "lq-ratio" => self.lq_ratio = parse_value(key, value)?,
                "ghost-size-ratio" => self.ghost_size_ratio = parse_value(key, value)?,
                "fifo-size-ratio" => self.fifo_size_ratio = parse_value(key, value)?,
                "move-to-main-threshold" => self.move_to_main_threshold = parse_value(key, value)?,
                "alpha" => self.alpha = parse_value(key, value)?,
                "beta" => self.beta = parse_value(key, value)?,
                "gamma" => self.gamma = parse_value(key, value)?,
                "score-threshold" => self.score_threshold = parse_value(key, value)?,
                "size-threshold" => self.size_threshold = Some(parse_value(key, value)?),
                "dcp-window" => self.planner.window = parse_value(key, value)?,
                "dcp-large-threshold" => self.planner.large_threshold = parse_value(key, value)?,
                "dcp-small-threshold" => self.planner.small_threshold = parse_value(key, value)?,
                "dcp-step" => self.planner.step = parse_value(key, value)?,
                _ => {
                    return Err(ConfigError::UnknownKey {
                        policy: POLICY_NAME.to_string(),
                        key: key.to_string(),
                    });
                }
            }
        }

        Ok(print_requested)
    }

    /// Check that every ratio and step is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("s-ratio", self.s_ratio),
            ("m-ratio", self.m_ratio),
            ("lq-ratio", self.lq_ratio),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidRatio { key, value });
            }
        }

        if !self.ghost_size_ratio.is_finite() || self.ghost_size_ratio < 0.0 {
            return Err(ConfigError::InvalidRatio {
                key: "ghost-size-ratio",
                value: self.ghost_size_ratio,
            });
        }

        if self.planner.window > MAX_PLANNER_WINDOW {
            return Err(ConfigError::InvalidValue {
                key: "dcp-window".to_string(),
                value: self.planner.window.to_string(),
            });
        }

        let step = self.planner.step;
        if !step.is_finite() || !(0.0..1.0).contains(&step) {
            return Err(ConfigError::InvalidRatio {
                key: "dcp-step",
                value: step,
            });
        }

        for (key, value) in [
            ("alpha", self.alpha),
            ("beta", self.beta),
            ("gamma", self.gamma),
            ("score-threshold", self.score_threshold),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::InvalidRatio { key, value });
            }
        }

        Ok(())
    }

    /// Display name, e.g. `S3FIFO-0.1000-2`.
    pub fn name(&self) -> String {
        format!(
            "{}-{:.4}-{}",
            POLICY_NAME, self.fifo_size_ratio, self.move_to_main_threshold
        )
    }

    /// Set the tier ratios. They are renormalized when the policy is built.
    pub fn with_ratios(mut self, s_ratio: f64, m_ratio: f64, lq_ratio: f64) -> Self {
        self.s_ratio = s_ratio;
        self.m_ratio = m_ratio;
        self.lq_ratio = lq_ratio;
        self
    }

    /// Set the ghost capacity ratio.
    pub fn with_ghost_size_ratio(mut self, ratio: f64) -> Self {
        self.ghost_size_ratio = ratio;
        self
    }

    /// Set the retention score weights.
    pub fn with_weights(mut self, alpha: f64, beta: f64, gamma: f64) -> Self {
        self.alpha = alpha;
        self.beta = beta;
        self.gamma = gamma;
        self
    }

    /// Set the retention score threshold.
    pub fn with_score_threshold(mut self, threshold: f64) -> Self {
        self.score_threshold = threshold;
        self
    }

    /// Set the small/large size threshold in bytes.
    pub fn with_size_threshold(mut self, threshold: u64) -> Self {
        self.size_threshold = Some(threshold);
        self
    }

    /// Set the main-tier retention decay.
    pub fn with_main_decay(mut self, decay: FrequencyDecay) -> Self {
        self.main_decay = decay;
        self
    }

    /// Set the capacity planner tuning.
    pub fn with_planner(mut self, planner: PlannerConfig) -> Self {
        self.planner = planner;
        self
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_match_default() {
        let parsed = PolicyConfig::from_params("").unwrap();
        assert_eq!(parsed.config, PolicyConfig::default());
        assert!(!parsed.print_requested);
    }

    #[test]
    fn test_overrides_are_case_insensitive() {
        let parsed =
            PolicyConfig::from_params("S-Ratio=0.2, M-RATIO = 0.5 ,lq-ratio=0.3,ALPHA=2").unwrap();
        let config = parsed.config;
        assert!((config.s_ratio - 0.2).abs() < f64::EPSILON);
        assert!((config.m_ratio - 0.5).abs() < f64::EPSILON);
        assert!((config.lq_ratio - 0.3).abs() < f64::EPSILON);
        assert!((config.alpha - 2.0).abs() < f64::EPSILON);
        // Untouched keys keep their defaults
        assert!((config.beta - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_extended_keys() {
        let config = PolicyConfig::from_params(
            "size-threshold=100,score-threshold=1.5,dcp-window=50,dcp-step=0.1,\
             dcp-large-threshold=10,dcp-small-threshold=20,move-to-main-threshold=3,\
             fifo-size-ratio=0.25",
        )
        .unwrap()
        .config;

        assert_eq!(config.size_threshold, Some(100));
        assert!((config.score_threshold - 1.5).abs() < f64::EPSILON);
        assert_eq!(config.planner.window, 50);
        assert!((config.planner.step - 0.1).abs() < f64::EPSILON);
        assert!((config.planner.large_threshold - 10.0).abs() < f64::EPSILON);
        assert!((config.planner.small_threshold - 20.0).abs() < f64::EPSILON);
        assert_eq!(config.name(), "S3FIFO-0.2500-3");
    }

    #[test]
    fn test_print_flag() {
        let parsed = PolicyConfig::from_params("alpha=3,print").unwrap();
        assert!(parsed.print_requested);
        assert!((parsed.config.alpha - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_key() {
        let err = PolicyConfig::from_params("s-ratio=0.1,bogus=1").unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownKey {
                policy: POLICY_NAME.to_string(),
                key: "bogus".to_string(),
            }
        );
    }

    #[test]
    fn test_malformed_value() {
        let err = PolicyConfig::from_params("alpha=abc").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = PolicyConfig::from_params("move-to-main-threshold=1.5").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_missing_value() {
        let err = PolicyConfig::from_params("gamma").unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingValue {
                key: "gamma".to_string()
            }
        );
    }

    #[test]
    fn test_validate_rejects_bad_ratios() {
        assert!(PolicyConfig::new().validate().is_ok());

        let config = PolicyConfig::new().with_ratios(0.0, 0.7, 0.2);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRatio { key: "s-ratio", .. })
        ));

        let config = PolicyConfig::new().with_ratios(0.1, f64::NAN, 0.2);
        assert!(config.validate().is_err());

        let config = PolicyConfig::new().with_ghost_size_ratio(-0.1);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRatio {
                key: "ghost-size-ratio",
                ..
            })
        ));

        let config = PolicyConfig::new().with_planner(PlannerConfig {
            step: 1.0,
            ..PlannerConfig::default()
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_huge_window() {
        let parsed = PolicyConfig::from_params(&format!("dcp-window={}", usize::MAX)).unwrap();
        assert_eq!(parsed.config.planner.window, usize::MAX);
        assert_eq!(
            parsed.config.validate(),
            Err(ConfigError::InvalidValue {
                key: "dcp-window".to_string(),
                value: usize::MAX.to_string(),
            })
        );

        let at_limit = PolicyConfig::new().with_planner(PlannerConfig {
            window: MAX_PLANNER_WINDOW,
            ..PlannerConfig::default()
        });
        assert!(at_limit.validate().is_ok());

        let over_limit = PolicyConfig::new().with_planner(PlannerConfig {
            window: MAX_PLANNER_WINDOW + 1,
            ..PlannerConfig::default()
        });
        assert!(over_limit.validate().is_err());
    }

    #[test]
    fn test_frequency_decay() {
        let decay = FrequencyDecay::default();
        assert_eq!(decay.apply(0), 0);
        assert_eq!(decay.apply(1), 0);
        assert_eq!(decay.apply(3), 2);
        assert_eq!(decay.apply(200), 2);

        let decay = FrequencyDecay::Linear { amount: 2 };
        assert_eq!(decay.apply(10), 8);
        assert_eq!(decay.apply(1), 0);
    }
}
