//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading benefit
//! configuration from YAML files.

use rust_decimal::Decimal;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{
    PipelineSettings, SplitShares, UnionPolicy, UnionsConfig, VacationPolicy, VoucherConfig,
};

/// Shares must add up to one within this tolerance.
fn share_tolerance() -> Decimal {
    Decimal::new(1, 4)
}

/// Loads and provides access to benefit configuration.
///
/// # Directory Structure
///
/// ```text
/// config/vr_va/
/// ├── settings.yaml   # Thresholds, default shares, keywords, source files
/// └── unions.yaml     # Per-union policies
/// ```
///
/// # Example
///
/// ```no_run
/// use voucher_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/vr_va").unwrap();
/// let shares = loader.shares_for("SINDICATO_BANCARIOS");
/// println!("Employer pays {}", shares.employer);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: VoucherConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - `settings.yaml` or `unions.yaml` is missing
    /// - Either file contains invalid YAML
    /// - A union policy has shares that do not sum to 1.0 or inverted vacation bounds
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<PipelineSettings>(&path.join("settings.yaml"))?;
        let unions = Self::load_yaml::<UnionsConfig>(&path.join("unions.yaml"))?;

        Self::from_parts(settings, unions.unions)
    }

    /// Builds a loader from already-parsed parts, running the same checks as [`ConfigLoader::load`].
    pub fn from_parts(
        settings: PipelineSettings,
        unions: HashMap<String, UnionPolicy>,
    ) -> EngineResult<Self> {
        Self::check_settings(&settings)?;
        for (name, policy) in &unions {
            Self::check_policy(name, policy)?;
        }

        Ok(Self {
            config: VoucherConfig::new(settings, unions),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn check_settings(settings: &PipelineSettings) -> EngineResult<()> {
        if !(1..=31).contains(&settings.termination_day_threshold) {
            return Err(EngineError::ConfigParseError {
                path: "settings.yaml".to_string(),
                message: format!(
                    "termination_day_threshold must be between 1 and 31, got {}",
                    settings.termination_day_threshold
                ),
            });
        }

        let sum = settings.employer_share + settings.employee_share;
        if (sum - Decimal::ONE).abs() > share_tolerance() {
            return Err(EngineError::ConfigParseError {
                path: "settings.yaml".to_string(),
                message: format!("default shares sum to {}, expected 1.0", sum),
            });
        }

        Ok(())
    }

    fn check_policy(name: &str, policy: &UnionPolicy) -> EngineResult<()> {
        let invalid = |message: String| EngineError::InvalidPolicy {
            union: name.to_string(),
            message,
        };

        match (policy.employer_share, policy.employee_share) {
            (Some(employer), Some(employee)) => {
                let sum = employer + employee;
                if (sum - Decimal::ONE).abs() > share_tolerance() {
                    return Err(invalid(format!("shares sum to {}, expected 1.0", sum)));
                }
                if employer.is_sign_negative() || employee.is_sign_negative() {
                    return Err(invalid("shares cannot be negative".to_string()));
                }
            }
            (None, None) => {}
            _ => {
                return Err(invalid(
                    "employer_share and employee_share must be given together".to_string(),
                ));
            }
        }

        if let Some(VacationPolicy::Partial {
            min_days, max_days, ..
        }) = &policy.vacation
        {
            if *min_days < 0 || *max_days > 31 || min_days > max_days {
                return Err(invalid(format!(
                    "partial vacation bounds [{}, {}] are not within 0..=31",
                    min_days, max_days
                )));
            }
        }

        if let Some(value) = policy.daily_value {
            if value <= Decimal::ZERO {
                return Err(invalid(format!("daily_value must be positive, got {}", value)));
            }
        }

        Ok(())
    }

    /// Returns the underlying configuration.
    pub fn config(&self) -> &VoucherConfig {
        &self.config
    }

    /// Returns the pipeline settings.
    pub fn settings(&self) -> &PipelineSettings {
        self.config.settings()
    }

    /// Returns the policy for a canonical union name.
    pub fn policy(&self, union: &str) -> Option<&UnionPolicy> {
        self.config.unions().get(union)
    }

    /// Returns every configured union policy.
    pub fn policies(&self) -> &HashMap<String, UnionPolicy> {
        self.config.unions()
    }

    /// Returns the split shares for a union, falling back to the defaults.
    pub fn shares_for(&self, union: &str) -> SplitShares {
        match self.policy(union) {
            Some(UnionPolicy {
                employer_share: Some(employer),
                employee_share: Some(employee),
                ..
            }) => SplitShares {
                employer: *employer,
                employee: *employee,
            },
            _ => self.settings().default_shares(),
        }
    }
}
