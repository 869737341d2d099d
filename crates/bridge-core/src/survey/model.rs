// crates/bridge-core/src/survey/model.rs
// ============================================================================
// Module: Bridge Survey Model
// Description: Surveys, their elements and constraints, answers, and responses.
// Purpose: Define survey revisions and the responses participants submit.
// Dependencies: crate::core, serde, time
// ============================================================================

//! ## Overview
//! A survey revision is keyed by `(guid, createdOn)`. Its elements are either
//! questions, which carry typed [`Constraints`], or informational screens.
//! Participants answer questions by guid; every answer value travels as a
//! string and is checked against the question's constraints on submission.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;

use crate::core::Guid;
use crate::core::GuidCreatedOnVersionHolder;
use crate::core::ValidationErrors;

// ============================================================================
// SECTION: Constraints
// ============================================================================

/// Selectable option of a multi-value question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyQuestionOption {
    /// Label shown to the participant.
    pub label: String,
    /// Value recorded in the answer.
    pub value: String,
}

impl SurveyQuestionOption {
    /// Creates an option.
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Typed answer constraints, tagged by `dataType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dataType", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum Constraints {
    /// `true` or `false`.
    Boolean,
    /// Whole number within optional bounds.
    Integer {
        /// Inclusive lower bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_value: Option<f64>,
        /// Inclusive upper bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_value: Option<f64>,
    },
    /// Decimal number within optional bounds.
    Decimal {
        /// Inclusive lower bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_value: Option<f64>,
        /// Inclusive upper bound.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_value: Option<f64>,
    },
    /// Free text within optional length bounds.
    String {
        /// Minimum length in characters.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_length: Option<u32>,
        /// Maximum length in characters.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<u32>,
    },
    /// Calendar date (`YYYY-MM-DD`).
    Date {
        /// Whether dates after today are accepted.
        #[serde(default)]
        allow_future: bool,
    },
    /// RFC 3339 timestamp.
    #[serde(rename = "datetime")]
    DateTime {
        /// Whether timestamps after now are accepted.
        #[serde(default)]
        allow_future: bool,
    },
    /// Time of day (`HH:MM[:SS]`).
    Time,
    /// ISO-8601 period.
    Duration,
    /// One or more enumerated values.
    #[serde(rename = "multivalue")]
    MultiValue {
        /// Admitted options.
        enumeration: Vec<SurveyQuestionOption>,
        /// Whether several values may be chosen.
        #[serde(default)]
        allow_multiple: bool,
        /// Whether values outside the enumeration are accepted.
        #[serde(default)]
        allow_other: bool,
    },
}

impl Constraints {
    /// Returns true when an answer may carry more than one value.
    #[must_use]
    pub const fn allows_multiple(&self) -> bool {
        matches!(
            self,
            Self::MultiValue {
                allow_multiple: true,
                ..
            }
        )
    }
}

// ============================================================================
// SECTION: Elements
// ============================================================================

/// Input control suggested for a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiHint {
    /// Checkbox list.
    Checkbox,
    /// Combo box.
    Combobox,
    /// Date picker.
    Datepicker,
    /// Date and time picker.
    Datetimepicker,
    /// Plain list.
    List,
    /// Numeric field.
    Numberfield,
    /// Radio buttons.
    Radiobutton,
    /// Select box.
    Select,
    /// Slider.
    Slider,
    /// Text field.
    Textfield,
    /// Time picker.
    Timepicker,
    /// On/off toggle.
    Toggle,
}

/// Question answered by the participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyQuestion {
    /// Server-assigned element guid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<Guid>,
    /// Identifier unique within the survey.
    pub identifier: String,
    /// Prompt text.
    pub prompt: String,
    /// Suggested input control.
    pub ui_hint: UiHint,
    /// Answer constraints.
    pub constraints: Constraints,
}

impl SurveyQuestion {
    /// Creates a question.
    #[must_use]
    pub fn new(
        identifier: impl Into<String>,
        prompt: impl Into<String>,
        ui_hint: UiHint,
        constraints: Constraints,
    ) -> Self {
        Self {
            guid: None,
            identifier: identifier.into(),
            prompt: prompt.into(),
            ui_hint,
            constraints,
        }
    }

    /// Creates a single-value answer to this question.
    #[must_use]
    pub fn answer(&self, value: impl Into<String>, client: impl Into<String>) -> SurveyAnswer {
        self.answer_values(vec![value.into()], client)
    }

    /// Creates an answer carrying several values.
    #[must_use]
    pub fn answer_values(&self, values: Vec<String>, client: impl Into<String>) -> SurveyAnswer {
        SurveyAnswer {
            question_guid: self.guid.clone().unwrap_or_default(),
            answered_on: OffsetDateTime::now_utc(),
            client: client.into(),
            answers: values,
            declined: false,
        }
    }
}

/// Informational screen without an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyInfoScreen {
    /// Server-assigned element guid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<Guid>,
    /// Identifier unique within the survey.
    pub identifier: String,
    /// Title text.
    pub title: String,
    /// Body text.
    pub prompt: String,
}

/// Survey element, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SurveyElement {
    /// Question.
    #[serde(rename = "SurveyQuestion")]
    Question(SurveyQuestion),
    /// Informational screen.
    #[serde(rename = "SurveyInfoScreen")]
    InfoScreen(SurveyInfoScreen),
}

impl SurveyElement {
    /// Element guid, once assigned.
    #[must_use]
    pub const fn guid(&self) -> Option<&Guid> {
        match self {
            Self::Question(question) => question.guid.as_ref(),
            Self::InfoScreen(screen) => screen.guid.as_ref(),
        }
    }

    /// Element identifier.
    #[must_use]
    pub fn identifier(&self) -> &str {
        match self {
            Self::Question(question) => &question.identifier,
            Self::InfoScreen(screen) => &screen.identifier,
        }
    }

    /// Assigns the element guid.
    pub fn set_guid(&mut self, guid: Guid) {
        match self {
            Self::Question(question) => question.guid = Some(guid),
            Self::InfoScreen(screen) => screen.guid = Some(guid),
        }
    }

    /// Returns the question when this element is one.
    #[must_use]
    pub const fn as_question(&self) -> Option<&SurveyQuestion> {
        match self {
            Self::Question(question) => Some(question),
            Self::InfoScreen(_) => None,
        }
    }
}

// ============================================================================
// SECTION: Survey
// ============================================================================

/// Survey revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Survey {
    /// Server-assigned guid shared by all revisions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<Guid>,
    /// Server-assigned revision timestamp.
    #[serde(default, with = "time::serde::rfc3339::option", skip_serializing_if = "Option::is_none")]
    pub created_on: Option<OffsetDateTime>,
    /// Optimistic-lock version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
    /// Display name.
    pub name: String,
    /// Identifier within the study.
    pub identifier: String,
    /// Whether the revision is published.
    #[serde(default)]
    pub published: bool,
    /// Ordered elements.
    pub elements: Vec<SurveyElement>,
}

impl Survey {
    /// Keys of this revision, once assigned by the service.
    #[must_use]
    pub fn keys(&self) -> Option<GuidCreatedOnVersionHolder> {
        Some(GuidCreatedOnVersionHolder {
            guid: self.guid.clone()?,
            created_on: self.created_on?,
            version: self.version.unwrap_or_default(),
        })
    }

    /// Finds an element by identifier.
    #[must_use]
    pub fn element_by_identifier(&self, identifier: &str) -> Option<&SurveyElement> {
        self.elements.iter().find(|element| element.identifier() == identifier)
    }

    /// Finds a question by identifier.
    #[must_use]
    pub fn question_by_identifier(&self, identifier: &str) -> Option<&SurveyQuestion> {
        self.element_by_identifier(identifier).and_then(SurveyElement::as_question)
    }

    /// Finds an element by guid.
    #[must_use]
    pub fn element_by_guid(&self, guid: &Guid) -> Option<&SurveyElement> {
        self.elements.iter().find(|element| element.guid() == Some(guid))
    }

    /// Validates a survey submitted for creation.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] naming each violated field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new("Survey");
        if self.name.trim().is_empty() {
            errors.push("name", "name is required");
        }
        if self.identifier.trim().is_empty() {
            errors.push("identifier", "identifier is required");
        }
        let mut seen = std::collections::BTreeSet::new();
        for (index, element) in self.elements.iter().enumerate() {
            let field = format!("elements[{index}]");
            if element.identifier().trim().is_empty() {
                errors.push(format!("{field}.identifier"), format!("{field}.identifier is required"));
            } else if !seen.insert(element.identifier()) {
                errors.push(
                    format!("{field}.identifier"),
                    format!("{field}.identifier {} is used more than once", element.identifier()),
                );
            }
            if let SurveyElement::Question(question) = element {
                validate_constraints(&field, &question.constraints, &mut errors);
            }
        }
        errors.into_result()
    }
}

/// Checks that bounds are ordered and enumerations are usable.
fn validate_constraints(field: &str, constraints: &Constraints, errors: &mut ValidationErrors) {
    match constraints {
        Constraints::Integer {
            min_value: Some(min),
            max_value: Some(max),
        }
        | Constraints::Decimal {
            min_value: Some(min),
            max_value: Some(max),
        } if min > max => {
            errors.push(
                format!("{field}.constraints"),
                format!("{field}.constraints minValue is greater than maxValue"),
            );
        }
        Constraints::String {
            min_length: Some(min),
            max_length: Some(max),
        } if min > max => {
            errors.push(
                format!("{field}.constraints"),
                format!("{field}.constraints minLength is greater than maxLength"),
            );
        }
        Constraints::MultiValue {
            enumeration,
            allow_other: false,
            ..
        } if enumeration.is_empty() => {
            errors.push(
                format!("{field}.constraints"),
                format!("{field}.constraints enumeration must have at least one option"),
            );
        }
        _ => {}
    }
}

// ============================================================================
// SECTION: Responses
// ============================================================================

/// Participant answer to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyAnswer {
    /// Answered question guid.
    pub question_guid: Guid,
    /// Time the answer was given.
    #[serde(with = "time::serde::rfc3339")]
    pub answered_on: OffsetDateTime,
    /// Client that recorded the answer (for example `mobile`).
    pub client: String,
    /// Answer values.
    #[serde(default)]
    pub answers: Vec<String>,
    /// Whether the participant declined to answer.
    #[serde(default)]
    pub declined: bool,
}

/// Caller-identified collection of answers for one survey revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyResponse {
    /// Caller-assigned identifier; generated by the service when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    /// Survey guid.
    pub survey_guid: Guid,
    /// Survey revision timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub survey_created_on: OffsetDateTime,
    /// Answers.
    #[serde(default)]
    pub answers: Vec<SurveyAnswer>,
}

impl SurveyResponse {
    /// Starts a response to a survey revision.
    #[must_use]
    pub fn new(keys: &GuidCreatedOnVersionHolder, answers: Vec<SurveyAnswer>) -> Self {
        Self {
            identifier: None,
            survey_guid: keys.guid.clone(),
            survey_created_on: keys.created_on,
            answers,
        }
    }

    /// Sets a caller-assigned identifier.
    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Adds answers, replacing earlier answers to the same question.
    pub fn merge_answers(&mut self, answers: Vec<SurveyAnswer>) {
        for answer in answers {
            match self
                .answers
                .iter_mut()
                .find(|existing| existing.question_guid == answer.question_guid)
            {
                Some(existing) => *existing = answer,
                None => self.answers.push(answer),
            }
        }
    }
}
