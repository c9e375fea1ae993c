//! Board, alight and transfer slack.

use std::collections::BTreeMap;
use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::TripPattern;

/// Minimum buffer times around boarding, alighting and changing vehicles.
pub trait SlackProvider: fmt::Debug + Send + Sync {
    /// Seconds needed at the stop before boarding a trip of this pattern.
    fn board_slack(&self, pattern: &dyn TripPattern) -> i32;

    /// Seconds needed at the stop after alighting a trip of this pattern.
    fn alight_slack(&self, pattern: &dyn TripPattern) -> i32;

    /// Seconds added between two separate rides. One global value.
    fn transfer_slack(&self) -> i32;
}

/// Slack configuration, in seconds.
///
/// Board and alight slack can be overridden per pattern slack index (e.g.
/// longer boarding for ferries); patterns without an override use the
/// default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    /// Default board slack (seconds).
    pub board_slack: i32,

    /// Default alight slack (seconds).
    pub alight_slack: i32,

    /// Transfer slack between rides (seconds).
    pub transfer_slack: i32,

    /// Board slack overrides keyed by pattern slack index.
    pub board_slack_by_index: BTreeMap<usize, i32>,

    /// Alight slack overrides keyed by pattern slack index.
    pub alight_slack_by_index: BTreeMap<usize, i32>,
}

impl SlackConfig {
    /// Create a configuration with the same slack for every pattern.
    pub fn new(transfer_slack: i32, board_slack: i32, alight_slack: i32) -> Self {
        Self {
            board_slack,
            alight_slack,
            transfer_slack,
            board_slack_by_index: BTreeMap::new(),
            alight_slack_by_index: BTreeMap::new(),
        }
    }

    /// Load a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use raptor_path::transit::SlackConfig;
    ///
    /// let config = SlackConfig::from_json(r#"{ "board_slack": 45, "alight_slack": 15 }"#).unwrap();
    /// assert_eq!(config.board_slack, 45);
    /// assert_eq!(config.alight_slack, 15);
    /// assert_eq!(config.transfer_slack, 60);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Override the board slack for one pattern slack index.
    pub fn with_board_slack_for(mut self, slack_index: usize, seconds: i32) -> Self {
        self.board_slack_by_index.insert(slack_index, seconds);
        self
    }

    /// Override the alight slack for one pattern slack index.
    pub fn with_alight_slack_for(mut self, slack_index: usize, seconds: i32) -> Self {
        self.alight_slack_by_index.insert(slack_index, seconds);
        self
    }

    /// Returns the default board slack as a Duration.
    pub fn board(&self) -> Duration {
        Duration::seconds(self.board_slack.into())
    }

    /// Returns the default alight slack as a Duration.
    pub fn alight(&self) -> Duration {
        Duration::seconds(self.alight_slack.into())
    }

    /// Returns the transfer slack as a Duration.
    pub fn transfer(&self) -> Duration {
        Duration::seconds(self.transfer_slack.into())
    }
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self::new(60, 0, 0)
    }
}

impl SlackProvider for SlackConfig {
    fn board_slack(&self, pattern: &dyn TripPattern) -> i32 {
        self.board_slack_by_index
            .get(&pattern.slack_index())
            .copied()
            .unwrap_or(self.board_slack)
    }

    fn alight_slack(&self, pattern: &dyn TripPattern) -> i32 {
        self.alight_slack_by_index
            .get(&pattern.slack_index())
            .copied()
            .unwrap_or(self.alight_slack)
    }

    fn transfer_slack(&self) -> i32 {
        self.transfer_slack
    }
}
