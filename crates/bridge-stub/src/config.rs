// crates/bridge-stub/src/config.rs
// ============================================================================
// Module: Bridge Stub Configuration
// Description: Seed data for the in-process stub service.
// Purpose: Describe the study and administrative account present at startup.
// Dependencies: bridge-core
// ============================================================================

use bridge_core::EmailTemplate;
use bridge_core::StudyId;
use bridge_core::Study;

/// Administrative email seeded when none is configured.
pub const DEFAULT_ADMIN_EMAIL: &str = "bridge-admin@sagebase.org";
/// Administrative password seeded when none is configured.
pub const DEFAULT_ADMIN_PASSWORD: &str = "P4ssword!";

/// Stub startup configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubConfig {
    /// Study present at startup.
    pub study: Study,
    /// Email of the seeded `admin` account.
    pub admin_email: String,
    /// Password of the seeded `admin` account.
    pub admin_password: String,
}

impl StubConfig {
    /// Configuration seeding `study` and the default admin credentials.
    #[must_use]
    pub fn new(study: StudyId) -> Self {
        Self {
            study: default_study(study),
            admin_email: DEFAULT_ADMIN_EMAIL.to_string(),
            admin_password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }

    /// Replaces the seeded admin credentials.
    #[must_use]
    pub fn with_admin(mut self, email: impl Into<String>, password: impl Into<String>) -> Self {
        self.admin_email = email.into();
        self.admin_password = password.into();
        self
    }
}

impl Default for StubConfig {
    fn default() -> Self {
        Self::new(StudyId::new("api"))
    }
}

/// Builds a valid study record for `identifier`.
#[must_use]
pub fn default_study(identifier: StudyId) -> Study {
    Study {
        name: format!("Study {identifier}"),
        sponsor_name: "Sage Bionetworks".to_string(),
        support_email: "support@sagebase.org".to_string(),
        consent_notification_email: "consent@sagebase.org".to_string(),
        technical_email: "technical@sagebase.org".to_string(),
        reset_password_template: EmailTemplate {
            subject: "Reset your password".to_string(),
            body: "Follow ${url} to reset your password.".to_string(),
        },
        verify_email_template: EmailTemplate {
            subject: "Verify your email".to_string(),
            body: "Follow ${url} to verify your email.".to_string(),
        },
        version: Some(1),
        identifier,
    }
}
