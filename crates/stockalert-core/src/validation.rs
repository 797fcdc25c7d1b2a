//! Pre-flight checks for mutating alert calls.
//!
//! Rules run in a fixed order and the first violation wins, so a request with
//! several problems always reports the same one.

use serde_json::Value;

use crate::domain::{
    AlertCondition, AlertStatus, CreateAlertRequest, NotificationChannel, Symbol, ThresholdRule,
};
use crate::error::ValidationError;

const RSI_BOUNDS: std::ops::RangeInclusive<f64> = 0.0..=100.0;

/// Validates `request` and normalises its symbol (trimmed, uppercase) and
/// condition (trimmed).
///
/// An empty symbol is missing; a whitespace-only one is present but malformed.
pub fn validate_create_request(request: &mut CreateAlertRequest) -> Result<(), ValidationError> {
    if request.symbol.is_empty() {
        return Err(ValidationError::MissingSymbol);
    }
    if request.condition.trim().is_empty() {
        return Err(ValidationError::MissingCondition);
    }

    let symbol = Symbol::parse(&request.symbol).map_err(|err| match err {
        ValidationError::MissingSymbol => ValidationError::InvalidSymbol {
            value: request.symbol.clone(),
        },
        other => other,
    })?;
    request.symbol = symbol.into();
    request.condition = request.condition.trim().to_owned();

    if let Some(channel) = &request.notification {
        if NotificationChannel::from_name(channel).is_none() {
            return Err(ValidationError::InvalidNotification {
                value: channel.clone(),
            });
        }
    }

    validate_condition_requirements(request)
}

fn validate_condition_requirements(request: &CreateAlertRequest) -> Result<(), ValidationError> {
    let condition = request.parsed_condition();
    let name = request.condition.trim();

    match (condition.threshold_rule(), request.threshold) {
        (ThresholdRule::Required, None) => {
            return Err(ValidationError::ThresholdRequired {
                condition: name.to_owned(),
            })
        }
        (ThresholdRule::Forbidden, Some(_)) => {
            return Err(ValidationError::ThresholdNotAllowed {
                condition: name.to_owned(),
            })
        }
        _ => {}
    }

    match condition {
        AlertCondition::MaTouchAbove | AlertCondition::MaTouchBelow
            if !has_parameter(request, "ma_period") =>
        {
            Err(ValidationError::MissingMaPeriod {
                condition: name.to_owned(),
            })
        }
        AlertCondition::RsiLimit => match request.threshold {
            Some(value) if !RSI_BOUNDS.contains(&value) => {
                Err(ValidationError::RsiOutOfRange { value })
            }
            _ => Ok(()),
        },
        AlertCondition::Reminder
            if !has_parameter(request, "reminder_date")
                || !has_parameter(request, "reminder_time") =>
        {
            Err(ValidationError::MissingReminderSchedule)
        }
        AlertCondition::DailyReminder if !has_parameter(request, "reminder_time") => {
            Err(ValidationError::MissingReminderTime)
        }
        _ => Ok(()),
    }
}

/// `PUT /alerts/{id}` only accepts `active` or `paused`.
pub fn validate_status_update(status: AlertStatus) -> Result<(), ValidationError> {
    match status {
        AlertStatus::Active | AlertStatus::Paused => Ok(()),
        AlertStatus::Triggered => Err(ValidationError::InvalidStatusUpdate {
            value: status.as_str().to_owned(),
        }),
    }
}

pub fn require_id(resource: &'static str, id: &str) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        return Err(ValidationError::MissingId { resource });
    }
    Ok(())
}

pub fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(())
}

fn has_parameter(request: &CreateAlertRequest, name: &str) -> bool {
    request.parameter_value(name).is_some_and(is_truthy)
}

// Null, false, zero, and empty strings/collections count as missing.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
