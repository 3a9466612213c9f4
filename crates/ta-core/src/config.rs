//! Runtime configuration for the core.
//!
//! Everything has a spec'd default; deployments override through `TA_*`
//! environment variables read once at construction.

use std::env;

use crate::irt::StoppingRule;

/// Version string stamped onto finalized score rows and match results.
pub const ENGINE_VERSION: &str = "v2-irt-sten";

#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// CAT stopping parameters for the cognitive section.
    pub cat: StoppingRule,
    /// Weight of the Likert component when a scale has both Likert and
    /// forced-choice evidence. The remainder goes to forced choice.
    pub likert_weight: f64,
    /// Hours before an unfinished assessment is observed as expired.
    pub assessment_ttl_hours: i64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            cat: StoppingRule::default(),
            likert_weight: 0.7,
            assessment_ttl_hours: 24 * 7,
        }
    }
}

impl CoreConfig {
    /// Reads overrides from the environment, falling back to defaults for
    /// anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            cat: StoppingRule {
                min_items: env_parse("TA_CAT_MIN_ITEMS", defaults.cat.min_items),
                max_items: env_parse("TA_CAT_MAX_ITEMS", defaults.cat.max_items),
                target_sem: env_parse("TA_CAT_TARGET_SEM", defaults.cat.target_sem),
            },
            likert_weight: env_parse("TA_LIKERT_FC_WEIGHT", defaults.likert_weight)
                .clamp(0.0, 1.0),
            assessment_ttl_hours: env_parse("TA_ASSESSMENT_TTL_HOURS", defaults.assessment_ttl_hours),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}
