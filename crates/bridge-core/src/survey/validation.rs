// crates/bridge-core/src/survey/validation.rs
// ============================================================================
// Module: Bridge Survey Answer Validation
// Description: Checks submitted answers against question constraints.
// Purpose: Reject invalid survey responses with readable, stable messages.
// Dependencies: crate::{core, survey::model}, time
// ============================================================================

//! ## Overview
//! Every answer must reference a question of the survey revision, carry at
//! least one value unless declined, and carry exactly one value unless the
//! question allows multiple values. Each value must parse as the question's
//! data type and satisfy its bounds. Violations accumulate into one
//! [`ValidationErrors`] for the `SurveyResponse` entity, so a rejected
//! submission reads like
//! `SurveyResponse is invalid: 44 is higher than the maximum value of 8.0`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::Date;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;

use crate::core::LocalTime;
use crate::core::Period;
use crate::core::ValidationErrors;
use crate::survey::model::Constraints;
use crate::survey::model::Survey;
use crate::survey::model::SurveyAnswer;
use crate::survey::model::SurveyElement;

/// Entity name used in response validation messages.
pub const SURVEY_RESPONSE_ENTITY: &str = "SurveyResponse";

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Validates answers against the survey revision they target.
///
/// # Errors
///
/// Returns [`ValidationErrors`] listing every violation in answer order.
pub fn validate_answers(
    survey: &Survey,
    answers: &[SurveyAnswer],
    now: OffsetDateTime,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new(SURVEY_RESPONSE_ENTITY);
    for (index, answer) in answers.iter().enumerate() {
        let field = format!("answers[{index}]");
        let question = match survey.element_by_guid(&answer.question_guid) {
            Some(SurveyElement::Question(question)) => question,
            Some(SurveyElement::InfoScreen(_)) | None => {
                errors.push(
                    field,
                    format!("{} does not refer to a survey question", answer.question_guid),
                );
                continue;
            }
        };
        if answer.declined {
            continue;
        }
        if answer.answers.is_empty() {
            errors.push(field, format!("{} requires an answer", question.identifier));
            continue;
        }
        if answer.answers.len() > 1 && !question.constraints.allows_multiple() {
            errors.push(
                field.clone(),
                format!("{} allows only one answer", question.identifier),
            );
        }
        for value in &answer.answers {
            if let Some(message) = check_value(&question.constraints, value, now) {
                errors.push(field.clone(), message);
            }
        }
    }
    errors.into_result()
}

/// Returns the violation message for one value, if any.
fn check_value(constraints: &Constraints, value: &str, now: OffsetDateTime) -> Option<String> {
    match constraints {
        Constraints::Boolean => match value {
            "true" | "false" => None,
            _ => Some(format!("{value} is not a boolean")),
        },
        Constraints::Integer {
            min_value,
            max_value,
        } => match value.trim().parse::<i64>() {
            #[allow(clippy::cast_precision_loss, reason = "survey bounds are small integers")]
            Ok(number) => check_bounds(value, number as f64, *min_value, *max_value),
            Err(_) => Some(format!("{value} is not a valid integer")),
        },
        Constraints::Decimal {
            min_value,
            max_value,
        } => match value.trim().parse::<f64>() {
            Ok(number) if number.is_finite() => {
                check_bounds(value, number, *min_value, *max_value)
            }
            _ => Some(format!("{value} is not a valid decimal")),
        },
        Constraints::String {
            min_length,
            max_length,
        } => {
            let length = u32::try_from(value.chars().count()).unwrap_or(u32::MAX);
            if let Some(min) = min_length
                && length < *min
            {
                Some(format!("{value} is shorter than the minimum length of {min}"))
            } else if let Some(max) = max_length
                && length > *max
            {
                Some(format!("{value} is longer than the maximum length of {max}"))
            } else {
                None
            }
        }
        Constraints::Date {
            allow_future,
        } => match Date::parse(value, format_description!("[year]-[month]-[day]")) {
            Ok(date) if !allow_future && date > now.date() => {
                Some(format!("{value} is a date in the future"))
            }
            Ok(_) => None,
            Err(_) => Some(format!("{value} is not a valid date")),
        },
        Constraints::DateTime {
            allow_future,
        } => match OffsetDateTime::parse(value, &Rfc3339) {
            Ok(at) if !allow_future && at > now => {
                Some(format!("{value} is a date and time in the future"))
            }
            Ok(_) => None,
            Err(_) => Some(format!("{value} is not a valid date and time")),
        },
        Constraints::Time => match value.parse::<LocalTime>() {
            Ok(_) => None,
            Err(_) => Some(format!("{value} is not a valid time")),
        },
        Constraints::Duration => match value.parse::<Period>() {
            Ok(_) => None,
            Err(_) => Some(format!("{value} is not a valid duration")),
        },
        Constraints::MultiValue {
            enumeration,
            allow_other,
            ..
        } => {
            if *allow_other || enumeration.iter().any(|option| option.value == value) {
                None
            } else {
                Some(format!("{value} is not one of the enumerated values for this question"))
            }
        }
    }
}

/// Compares a number against inclusive bounds.
fn check_bounds(raw: &str, number: f64, min: Option<f64>, max: Option<f64>) -> Option<String> {
    if let Some(max) = max
        && number > max
    {
        return Some(format!("{} is higher than the maximum value of {}", raw.trim(), bound(max)));
    }
    if let Some(min) = min
        && number < min
    {
        return Some(format!("{} is lower than the minimum value of {}", raw.trim(), bound(min)));
    }
    None
}

/// Renders a bound with at least one decimal place (`8` becomes `8.0`).
fn bound(value: f64) -> String {
    if value.fract() == 0.0 { format!("{value:.1}") } else { value.to_string() }
}
