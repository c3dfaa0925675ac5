//! Setup-time configuration: chain length, ribbon width, grouping.
//!
//! Nothing here can change once the [`TrailSet`] is built.
//!
//! ```json
//! { "length": 50, "width": 0.1, "group_size": 5, "seed": 7 }
//! ```
//!
//! Missing fields take their defaults.

use std::fs;
use std::path::Path;

use log::debug;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TrailError};
use crate::chain::DEFAULT_RIBBON_WIDTH;
use crate::ribbon::DEFAULT_INSET;
use crate::trail_set::{GroupId, TrailSet};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    /// Particles per chain.
    pub length:     usize,
    /// Ribbon width, measured outward from the first row.
    pub width:      f32,
    /// Offset of the first ribbon row from the centreline.
    pub inset:      f32,
    /// Chains per group, i.e. per tracked point.
    pub group_size: usize,
    /// Seed for per-chain parameters; `None` draws from the OS.
    pub seed:       Option<u64>,
}

impl Default for TrailConfig {
    fn default() -> Self {
        TrailConfig {
            length:     50,
            width:      DEFAULT_RIBBON_WIDTH,
            inset:      DEFAULT_INSET,
            group_size: 1,
            seed:       None,
        }
    }
}

impl TrailConfig {
    /// Read and validate a JSON config file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let cfg = Self::from_json_str(&text)?;
        debug!("loaded trail config from {}", path.as_ref().display());
        Ok(cfg)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let cfg: TrailConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.length < 2 {
            return Err(TrailError::InvalidConfig(format!(
                "length must be at least 2, got {}", self.length
            )));
        }
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(TrailError::InvalidConfig(format!(
                "width must be positive and finite, got {}", self.width
            )));
        }
        if !self.inset.is_finite() || self.inset < 0.0 {
            return Err(TrailError::InvalidConfig(format!(
                "inset must be non-negative and finite, got {}", self.inset
            )));
        }
        if self.group_size == 0 {
            return Err(TrailError::InvalidConfig("group_size must be at least 1".into()));
        }
        Ok(())
    }

    /// RNG for per-chain parameters, seeded when `seed` is set.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(s) => StdRng::seed_from_u64(s),
            None    => StdRng::from_entropy(),
        }
    }

    /// Build a set with `groups` groups of `group_size` chains each.
    pub fn build(&self, groups: usize) -> Result<(TrailSet, Vec<GroupId>)> {
        self.validate()?;
        let mut rng = self.rng();
        let mut set = TrailSet::with_inset(self.inset);
        let ids: Vec<GroupId> = (0..groups)
            .map(|_| set.add_group(self.group_size, self.length, self.width, &mut rng))
            .collect();
        debug!(
            "built {} groups × {} chains × {} particles",
            groups, self.group_size, self.length
        );
        Ok((set, ids))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(TrailConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = TrailConfig::from_json_str(r#"{ "length": 12, "group_size": 3 }"#).unwrap();
        assert_eq!(cfg.length, 12);
        assert_eq!(cfg.group_size, 3);
        assert_eq!(cfg.width, 0.1);
        assert_eq!(cfg.seed, None);
    }

    #[test]
    fn rejects_bad_values() {
        for bad in [
            r#"{ "length": 1 }"#,
            r#"{ "width": 0.0 }"#,
            r#"{ "width": -1.0 }"#,
            r#"{ "inset": -0.1 }"#,
            r#"{ "group_size": 0 }"#,
        ] {
            assert!(
                matches!(TrailConfig::from_json_str(bad), Err(TrailError::InvalidConfig(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn malformed_json_is_json_error() {
        assert!(matches!(TrailConfig::from_json_str("{ length: "), Err(TrailError::Json(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = TrailConfig::from_json_file("/nonexistent/trails.json").unwrap_err();
        assert!(matches!(err, TrailError::Io(_)));
    }

    #[test]
    fn build_creates_groups() {
        let cfg = TrailConfig { length: 10, group_size: 4, seed: Some(1), ..Default::default() };
        let (set, groups) = cfg.build(3).unwrap();
        assert_eq!(groups.len(), 3);
        assert_eq!(set.len(), 12);
        assert_eq!(set.trails()[0].chain().len(), 10);
    }

    #[test]
    fn seeded_builds_are_reproducible() {
        let cfg = TrailConfig { seed: Some(99), ..Default::default() };
        let (a, _) = cfg.build(1).unwrap();
        let (b, _) = cfg.build(1).unwrap();
        assert_eq!(a.trails()[0].chain().params(), b.trails()[0].chain().params());
    }
}
