// crates/bridge-core/src/core/account.rs
// ============================================================================
// Module: Bridge Accounts and Studies
// Description: Authentication payloads, sessions, roles, consent, and studies.
// Purpose: Model the account lifecycle records exchanged with the service.
// Dependencies: crate::core::{errors, identifiers}, serde, time
// ============================================================================

//! ## Overview
//! Accounts belong to exactly one study and are addressed by `(study, email)`.
//! Sign-in returns a [`UserSessionInfo`] whose token authenticates later
//! requests. Validation helpers return [`ValidationErrors`] so the service can
//! reject entities with the same messages everywhere.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use time::Date;
use time::macros::format_description;

use crate::core::errors::ValidationErrors;
use crate::core::identifiers::StudyId;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

// ============================================================================
// SECTION: Roles
// ============================================================================

/// Account roles granting access to administrative API groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Manages schedule plans and surveys.
    Developer,
    /// Reads participant data.
    Researcher,
    /// Manages studies and accounts.
    Admin,
    /// Backend worker processes.
    Worker,
}

// ============================================================================
// SECTION: Authentication Payloads
// ============================================================================

/// Registration request. Administrators may also assign roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUp {
    /// Target study.
    pub study: StudyId,
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
    /// Roles granted at creation (honored only for administrative creation).
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub roles: BTreeSet<Role>,
}

impl SignUp {
    /// Validates the registration request.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] naming each violated field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new("SignUp");
        if self.study.as_str().trim().is_empty() {
            errors.push("study", "study is required");
        }
        if !is_email(&self.email) {
            errors.push("email", format!("{} is not a valid email address", self.email));
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.push(
                "password",
                format!("password must be at least {MIN_PASSWORD_LENGTH} characters"),
            );
        }
        errors.into_result()
    }
}

/// Sign-in credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignIn {
    /// Target study.
    pub study: StudyId,
    /// Account email.
    pub email: String,
    /// Account password.
    pub password: String,
}

/// Email-only request used for verification resends and password resets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Email {
    /// Target study.
    pub study: StudyId,
    /// Account email.
    pub email: String,
}

/// Email verification token submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailVerification {
    /// Token delivered by email.
    pub sptoken: String,
    /// Target study.
    pub study: StudyId,
}

/// Header carrying the session token on authenticated requests.
pub const SESSION_HEADER: &str = "Bridge-Session";

/// Authenticated session returned by sign-in and consent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSessionInfo {
    /// Account identifier.
    pub id: String,
    /// Account email.
    pub email: String,
    /// Study the session is bound to.
    pub study_id: StudyId,
    /// Session token sent in the `Bridge-Session` header.
    pub session_token: String,
    /// Whether the session is authenticated.
    pub authenticated: bool,
    /// Whether the account has consented to research.
    pub consented: bool,
    /// Account roles.
    #[serde(default)]
    pub roles: BTreeSet<Role>,
}

// ============================================================================
// SECTION: Consent
// ============================================================================

/// Data sharing scope chosen at consent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharingScope {
    /// Data is not shared.
    NoSharing,
    /// Data is shared with the sponsor and partners.
    SponsorsAndPartners,
    /// Data is shared with all qualified researchers.
    AllQualifiedResearchers,
}

/// Consent signature submitted by a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentSignature {
    /// Signer name.
    pub name: String,
    /// Signer birthdate (`YYYY-MM-DD`).
    pub birthdate: String,
    /// Sharing scope.
    pub scope: SharingScope,
}

impl ConsentSignature {
    /// Validates the signature.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] naming each violated field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new("ConsentSignature");
        if self.name.trim().is_empty() {
            errors.push("name", "name is required");
        }
        if Date::parse(&self.birthdate, format_description!("[year]-[month]-[day]")).is_err() {
            errors.push("birthdate", format!("{} is not a valid date", self.birthdate));
        }
        errors.into_result()
    }
}

// ============================================================================
// SECTION: Studies
// ============================================================================

/// Email template used for account flows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailTemplate {
    /// Subject line.
    pub subject: String,
    /// Body text.
    pub body: String,
}

/// Study definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Study {
    /// Study identifier.
    pub identifier: StudyId,
    /// Display name.
    pub name: String,
    /// Sponsor name.
    pub sponsor_name: String,
    /// Participant support address.
    pub support_email: String,
    /// Address notified of consents.
    pub consent_notification_email: String,
    /// Technical contact address.
    pub technical_email: String,
    /// Password reset template.
    pub reset_password_template: EmailTemplate,
    /// Email verification template.
    pub verify_email_template: EmailTemplate,
    /// Optimistic-lock version (server-assigned).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

impl Study {
    /// Validates the study definition.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] naming each violated field.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new("Study");
        let identifier = self.identifier.as_str();
        if identifier.len() < 2
            || !identifier.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            || identifier.starts_with('-')
            || identifier.ends_with('-')
        {
            errors.push(
                "identifier",
                "identifier must contain only lower-case letters, digits, and internal dashes",
            );
        }
        if self.name.trim().is_empty() {
            errors.push("name", "name is required");
        }
        if self.sponsor_name.trim().is_empty() {
            errors.push("sponsorName", "sponsorName is required");
        }
        for (field, value) in [
            ("supportEmail", &self.support_email),
            ("consentNotificationEmail", &self.consent_notification_email),
            ("technicalEmail", &self.technical_email),
        ] {
            if !is_email(value) {
                errors.push(field, format!("{field} is not a valid email address"));
            }
        }
        for (field, template) in [
            ("resetPasswordTemplate", &self.reset_password_template),
            ("verifyEmailTemplate", &self.verify_email_template),
        ] {
            if template.subject.trim().is_empty() || template.body.trim().is_empty() {
                errors.push(field, format!("{field} requires a subject and body"));
            }
        }
        errors.into_result()
    }
}

/// Returns true for `local@domain` shaped addresses.
fn is_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.contains('@')
        }
        None => false,
    }
}
