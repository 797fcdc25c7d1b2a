use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::Timestamp;

/// Free-form condition parameters (`ma_period`, `reminder_date`, ...).
pub type AlertParameters = Map<String, Value>;

/// Whether a condition takes a numeric threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdRule {
    Required,
    Forbidden,
    Optional,
}

/// Triggering rule of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCondition {
    PriceAbove,
    PriceBelow,
    PriceChangeUp,
    PriceChangeDown,
    NewHigh,
    NewLow,
    Reminder,
    DailyReminder,
    MaCrossoverGolden,
    MaCrossoverDeath,
    MaTouchAbove,
    MaTouchBelow,
    VolumeChange,
    RsiLimit,
    PeRatioBelow,
    PeRatioAbove,
    ForwardPeBelow,
    ForwardPeAbove,
    EarningsAnnouncement,
    DividendExDate,
    DividendPayment,
    /// A condition this client version does not know about.
    #[serde(other)]
    Unknown,
}

impl AlertCondition {
    pub const ALL: [Self; 21] = [
        Self::PriceAbove,
        Self::PriceBelow,
        Self::PriceChangeUp,
        Self::PriceChangeDown,
        Self::NewHigh,
        Self::NewLow,
        Self::Reminder,
        Self::DailyReminder,
        Self::MaCrossoverGolden,
        Self::MaCrossoverDeath,
        Self::MaTouchAbove,
        Self::MaTouchBelow,
        Self::VolumeChange,
        Self::RsiLimit,
        Self::PeRatioBelow,
        Self::PeRatioAbove,
        Self::ForwardPeBelow,
        Self::ForwardPeAbove,
        Self::EarningsAnnouncement,
        Self::DividendExDate,
        Self::DividendPayment,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PriceAbove => "price_above",
            Self::PriceBelow => "price_below",
            Self::PriceChangeUp => "price_change_up",
            Self::PriceChangeDown => "price_change_down",
            Self::NewHigh => "new_high",
            Self::NewLow => "new_low",
            Self::Reminder => "reminder",
            Self::DailyReminder => "daily_reminder",
            Self::MaCrossoverGolden => "ma_crossover_golden",
            Self::MaCrossoverDeath => "ma_crossover_death",
            Self::MaTouchAbove => "ma_touch_above",
            Self::MaTouchBelow => "ma_touch_below",
            Self::VolumeChange => "volume_change",
            Self::RsiLimit => "rsi_limit",
            Self::PeRatioBelow => "pe_ratio_below",
            Self::PeRatioAbove => "pe_ratio_above",
            Self::ForwardPeBelow => "forward_pe_below",
            Self::ForwardPeAbove => "forward_pe_above",
            Self::EarningsAnnouncement => "earnings_announcement",
            Self::DividendExDate => "dividend_ex_date",
            Self::DividendPayment => "dividend_payment",
            Self::Unknown => "unknown",
        }
    }

    /// Maps a wire name to a condition; unrecognised names become `Unknown`.
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|condition| condition.as_str() == name)
            .unwrap_or(Self::Unknown)
    }

    pub const fn threshold_rule(self) -> ThresholdRule {
        match self {
            Self::PriceAbove
            | Self::PriceBelow
            | Self::PriceChangeUp
            | Self::PriceChangeDown
            | Self::MaTouchAbove
            | Self::MaTouchBelow
            | Self::RsiLimit
            | Self::VolumeChange
            | Self::PeRatioBelow
            | Self::PeRatioAbove
            | Self::ForwardPeBelow
            | Self::ForwardPeAbove => ThresholdRule::Required,
            Self::NewHigh
            | Self::NewLow
            | Self::MaCrossoverGolden
            | Self::MaCrossoverDeath
            | Self::EarningsAnnouncement
            | Self::DividendExDate
            | Self::DividendPayment => ThresholdRule::Forbidden,
            Self::Reminder | Self::DailyReminder | Self::Unknown => ThresholdRule::Optional,
        }
    }
}

impl Display for AlertCondition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<AlertCondition> for String {
    fn from(value: AlertCondition) -> Self {
        value.as_str().to_owned()
    }
}

/// Delivery channel. The API supports exactly these two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationChannel {
    #[default]
    Email,
    Sms,
}

impl NotificationChannel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "email" => Some(Self::Email),
            "sms" => Some(Self::Sms),
            _ => None,
        }
    }
}

impl Display for NotificationChannel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<NotificationChannel> for String {
    fn from(value: NotificationChannel) -> Self {
        value.as_str().to_owned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Active,
    Paused,
    Triggered,
}

impl AlertStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Triggered => "triggered",
        }
    }
}

impl Display for AlertStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub symbol: String,
    pub condition: AlertCondition,
    #[serde(default)]
    pub threshold: Option<f64>,
    pub notification: NotificationChannel,
    pub status: AlertStatus,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub last_triggered: Option<Timestamp>,
    #[serde(default)]
    pub initial_price: Option<f64>,
    #[serde(default)]
    pub parameters: Option<AlertParameters>,
}

/// Body of `POST /alerts`.
///
/// Fields hold raw caller input; [`crate::validation::validate_create_request`]
/// checks and normalises them before anything is sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateAlertRequest {
    pub symbol: String,
    pub condition: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<AlertParameters>,
}

impl CreateAlertRequest {
    pub fn new(symbol: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            condition: condition.into(),
            threshold: None,
            notification: None,
            parameters: None,
        }
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn notification(mut self, channel: impl Into<String>) -> Self {
        self.notification = Some(channel.into());
        self
    }

    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn parameters(mut self, parameters: AlertParameters) -> Self {
        self.parameters = Some(parameters);
        self
    }

    pub fn parsed_condition(&self) -> AlertCondition {
        AlertCondition::from_name(self.condition.trim())
    }

    pub fn parameter_value(&self, name: &str) -> Option<&Value> {
        self.parameters.as_ref()?.get(name)
    }
}

/// Filters for `GET /alerts`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListAlertsParams {
    pub status: Option<AlertStatus>,
    pub symbol: Option<String>,
    pub condition: Option<AlertCondition>,
    pub limit: Option<u32>,
    pub offset: Option<u64>,
}

impl ListAlertsParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: AlertStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn condition(mut self, condition: AlertCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}
