//! Results of a benchmark batch.

use serde::Serialize;

use crate::config::EvalConfig;
use crate::evaluation::AggregateResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigOutcome {
    Completed(AggregateResult),
    /// The configuration aborted; holds the error message.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigReport {
    pub config: EvalConfig,
    pub outcome: ConfigOutcome,
}

impl ConfigReport {
    pub fn success_rate(&self) -> Option<f64> {
        match &self.outcome {
            ConfigOutcome::Completed(result) => Some(result.success_rate()),
            ConfigOutcome::Failed(_) => None,
        }
    }

    /// Console line: `"<sequence>[ (modeled)] - <body>: <rate>"`, or
    /// `"...: FAILED (<reason>)"`.
    pub fn line(&self) -> String {
        match &self.outcome {
            ConfigOutcome::Completed(result) => {
                format!("{}: {}", self.config.label(), result.success_rate())
            }
            ConfigOutcome::Failed(reason) => {
                format!("{}: FAILED ({})", self.config.label(), reason)
            }
        }
    }
}

/// Per-configuration reports in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub reports: Vec<ConfigReport>,
}

impl BatchReport {
    pub fn completed(&self) -> impl Iterator<Item = &ConfigReport> {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, ConfigOutcome::Completed(_)))
    }

    pub fn failed(&self) -> impl Iterator<Item = &ConfigReport> {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, ConfigOutcome::Failed(_)))
    }

    /// Mean success rate over completed configurations.
    pub fn mean_success_rate(&self) -> Option<f64> {
        let rates: Vec<f64> = self.reports.iter().filter_map(|r| r.success_rate()).collect();
        if rates.is_empty() {
            return None;
        }
        Some(rates.iter().sum::<f64>() / rates.len() as f64)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
