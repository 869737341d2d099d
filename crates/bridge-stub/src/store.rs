// crates/bridge-stub/src/store.rs
// ============================================================================
// Module: Bridge Stub Store
// Description: In-memory accounts, sessions, plans, surveys, and responses.
// Purpose: Apply the service's rules synchronously behind a single lock.
// Dependencies: bridge-core, rand, time, tracing, uuid
// ============================================================================

//! ## Overview
//! [`Store`] owns every record the stub serves. Its methods are synchronous
//! and never block, so handlers lock, call one method, and release before
//! producing a response.
//!
//! # Invariants
//! - Email addresses are unique per study.
//! - Plans, surveys, and responses are scoped to the caller's study; records of
//!   other studies are reported as missing.
//! - Plan versions increase by one per update and stale versions are rejected.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use bridge_core::ActivityProgress;
use bridge_core::ActivityUpdate;
use bridge_core::ClientInfo;
use bridge_core::ConsentSignature;
use bridge_core::EmailVerification;
use bridge_core::Guid;
use bridge_core::GuidCreatedOnVersionHolder;
use bridge_core::GuidVersionHolder;
use bridge_core::IdentifierHolder;
use bridge_core::PlanSchedule;
use bridge_core::Role;
use bridge_core::Schedule;
use bridge_core::SchedulePlan;
use bridge_core::ScheduleWindow;
use bridge_core::ScheduledActivity;
use bridge_core::SignIn;
use bridge_core::SignUp;
use bridge_core::Study;
use bridge_core::StudyId;
use bridge_core::Survey;
use bridge_core::SurveyAnswer;
use bridge_core::SurveyResponse;
use bridge_core::UserSessionInfo;
use bridge_core::VersionHolder;
use bridge_core::project;
use bridge_core::validate_answers;
use time::Duration;
use time::OffsetDateTime;
use time::UtcOffset;
use uuid::Uuid;

use crate::config::StubConfig;
use crate::error::StubError;

/// Message returned for unknown accounts and bad credentials alike.
pub const ACCOUNT_NOT_FOUND: &str = "Account not found.";

// ============================================================================
// SECTION: Records
// ============================================================================

/// Stored participant or staff account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Account identifier.
    pub id: String,
    /// Owning study.
    pub study: StudyId,
    /// Sign-in email.
    pub email: String,
    /// Sign-in password.
    pub password: String,
    /// Granted roles.
    pub roles: BTreeSet<Role>,
    /// Whether the participant has consented.
    pub consented: bool,
    /// Whether the email address has been verified.
    pub verified: bool,
    /// Creation time; the enrollment time for scheduling.
    pub created_on: OffsetDateTime,
}

/// Active session.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Session {
    account_id: String,
    client_info: ClientInfo,
}

/// Authenticated caller resolved from a session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// Session token.
    pub token: String,
    /// Account snapshot.
    pub account: Account,
    /// Client identity captured at sign-in.
    pub client_info: ClientInfo,
}

impl Caller {
    /// Requires `role`; admins satisfy every role check.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::Unauthorized`] when the role is missing.
    pub fn require_role(&self, role: Role) -> Result<(), StubError> {
        if self.account.roles.contains(&role) || self.account.roles.contains(&Role::Admin) {
            Ok(())
        } else {
            Err(StubError::Unauthorized)
        }
    }

    /// Requires a consented participant.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::ConsentRequired`] before consent.
    pub const fn require_consent(&self) -> Result<(), StubError> {
        if self.account.consented { Ok(()) } else { Err(StubError::ConsentRequired) }
    }

    /// Owning study.
    #[must_use]
    pub const fn study(&self) -> &StudyId {
        &self.account.study
    }
}

#[derive(Debug, Clone)]
struct StoredPlan {
    study: StudyId,
    guid: Guid,
    plan: SchedulePlan,
}

#[derive(Debug, Clone)]
struct StoredSurvey {
    study: StudyId,
    survey: Survey,
}

/// Survey revisions are keyed by guid and creation time in milliseconds so that
/// any RFC 3339 rendering of the same instant resolves the same revision.
type SurveyKey = (Guid, i128);

fn survey_key(guid: &Guid, created_on: OffsetDateTime) -> SurveyKey {
    (guid.clone(), created_on.unix_timestamp_nanos() / 1_000_000)
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// In-memory service state.
#[derive(Debug, Default)]
pub struct Store {
    studies: BTreeMap<StudyId, Study>,
    accounts: BTreeMap<String, Account>,
    sessions: BTreeMap<String, Session>,
    verifications: BTreeMap<String, String>,
    plans: BTreeMap<Guid, StoredPlan>,
    surveys: BTreeMap<SurveyKey, StoredSurvey>,
    responses: BTreeMap<(String, String), SurveyResponse>,
    progress: BTreeMap<String, BTreeMap<Guid, ActivityProgress>>,
    issued: BTreeMap<String, BTreeSet<Guid>>,
    zones: BTreeMap<String, UtcOffset>,
}

impl Store {
    /// Seeds the configured study and admin account.
    #[must_use]
    pub fn seeded(config: &StubConfig, now: OffsetDateTime) -> Self {
        let mut store = Self::default();
        let study = config.study.identifier.clone();
        store.studies.insert(study.clone(), config.study.clone());
        let admin = Account {
            id: random_token(),
            study,
            email: config.admin_email.clone(),
            password: config.admin_password.clone(),
            roles: BTreeSet::from([Role::Admin]),
            consented: true,
            verified: true,
            created_on: now,
        };
        store.accounts.insert(admin.id.clone(), admin);
        store
    }

    // ------------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------------

    /// Registers an unverified account. Existing emails are left untouched and
    /// the outcome is indistinguishable to the caller.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::Invalid`] for an invalid sign-up and
    /// [`StubError::NotFound`] for an unknown study.
    pub fn sign_up(&mut self, sign_up: &SignUp, now: OffsetDateTime) -> Result<(), StubError> {
        sign_up.validate()?;
        self.study(&sign_up.study)?;
        if self.account_by_email(&sign_up.study, &sign_up.email).is_some() {
            tracing::debug!(study = %sign_up.study, "sign-up for existing email ignored");
            return Ok(());
        }
        let account = Account {
            id: random_token(),
            study: sign_up.study.clone(),
            email: sign_up.email.clone(),
            password: sign_up.password.clone(),
            roles: BTreeSet::new(),
            consented: false,
            verified: false,
            created_on: now,
        };
        let token = random_token();
        tracing::info!(study = %account.study, account = %account.id, "account signed up");
        self.verifications.insert(token, account.id.clone());
        self.accounts.insert(account.id.clone(), account);
        Ok(())
    }

    /// Opens a session bound to `client_info`.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::NotFound`] for unknown or unverified accounts,
    /// wrong passwords, and accounts of another study.
    pub fn sign_in(
        &mut self,
        sign_in: &SignIn,
        client_info: ClientInfo,
    ) -> Result<UserSessionInfo, StubError> {
        let account = self
            .account_by_email(&sign_in.study, &sign_in.email)
            .filter(|account| account.verified && account.password == sign_in.password)
            .ok_or_else(|| StubError::NotFound(ACCOUNT_NOT_FOUND.to_string()))?
            .clone();
        let token = random_token();
        self.sessions.insert(
            token.clone(),
            Session {
                account_id: account.id.clone(),
                client_info,
            },
        );
        tracing::info!(study = %account.study, account = %account.id, "session opened");
        Ok(session_info(&account, &token))
    }

    /// Closes a session; unknown tokens are ignored.
    pub fn sign_out(&mut self, token: Option<&str>) {
        if let Some(token) = token
            && self.sessions.remove(token).is_some()
        {
            tracing::debug!("session closed");
        }
    }

    /// Number of accounts, admin included.
    #[must_use]
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Outstanding verification token for an account, as it would be mailed.
    #[must_use]
    pub fn pending_verification(&self, study: &StudyId, email: &str) -> Option<String> {
        let account = self.account_by_email(study, email)?;
        self.verifications
            .iter()
            .find(|(_, account_id)| **account_id == account.id)
            .map(|(token, _)| token.clone())
    }

    /// Marks the account owning the token as verified.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::NotFound`] for unknown tokens.
    pub fn verify_email(&mut self, verification: &EmailVerification) -> Result<(), StubError> {
        let account = self
            .verifications
            .get(&verification.sptoken)
            .and_then(|id| self.accounts.get_mut(id))
            .filter(|account| account.study == verification.study)
            .ok_or_else(|| StubError::NotFound(ACCOUNT_NOT_FOUND.to_string()))?;
        account.verified = true;
        self.verifications.remove(&verification.sptoken);
        Ok(())
    }

    /// Resolves the caller for a session token.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::NotAuthenticated`] without a live session.
    pub fn caller(&self, token: Option<&str>) -> Result<Caller, StubError> {
        let token = token.ok_or(StubError::NotAuthenticated)?;
        let session = self.sessions.get(token).ok_or(StubError::NotAuthenticated)?;
        let account =
            self.accounts.get(&session.account_id).ok_or(StubError::NotAuthenticated)?;
        Ok(Caller {
            token: token.to_string(),
            account: account.clone(),
            client_info: session.client_info.clone(),
        })
    }

    /// Records consent and returns the refreshed session.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::Invalid`] for an invalid signature.
    pub fn consent(
        &mut self,
        caller: &Caller,
        signature: &ConsentSignature,
    ) -> Result<UserSessionInfo, StubError> {
        signature.validate()?;
        let account = self
            .accounts
            .get_mut(&caller.account.id)
            .ok_or(StubError::NotAuthenticated)?;
        account.consented = true;
        tracing::info!(account = %account.id, "consent recorded");
        Ok(session_info(account, &caller.token))
    }

    // ------------------------------------------------------------------------
    // Administration
    // ------------------------------------------------------------------------

    /// Creates a study at version 1.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::Invalid`] or [`StubError::AlreadyExists`].
    pub fn create_study(&mut self, study: &Study) -> Result<VersionHolder, StubError> {
        study.validate()?;
        if self.studies.contains_key(&study.identifier) {
            return Err(StubError::AlreadyExists("Study already exists.".to_string()));
        }
        let mut stored = study.clone();
        stored.version = Some(1);
        self.studies.insert(stored.identifier.clone(), stored);
        tracing::info!(study = %study.identifier, "study created");
        Ok(VersionHolder {
            version: 1,
        })
    }

    /// Reads a study.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::NotFound`] for an unknown study.
    pub fn study(&self, study: &StudyId) -> Result<&Study, StubError> {
        self.studies.get(study).ok_or_else(|| StubError::NotFound("Study not found.".to_string()))
    }

    /// Deletes a study.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::NotFound`] for an unknown study.
    pub fn delete_study(&mut self, study: &StudyId) -> Result<(), StubError> {
        if self.studies.remove(study).is_none() {
            return Err(StubError::NotFound("Study not found.".to_string()));
        }
        tracing::info!(study = %study, "study deleted");
        Ok(())
    }

    /// Creates a verified account with roles.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::Invalid`], [`StubError::NotFound`] for an unknown
    /// study, or [`StubError::AlreadyExists`] for a registered email.
    pub fn create_user(
        &mut self,
        sign_up: &SignUp,
        now: OffsetDateTime,
    ) -> Result<IdentifierHolder, StubError> {
        sign_up.validate()?;
        self.study(&sign_up.study)?;
        if self.account_by_email(&sign_up.study, &sign_up.email).is_some() {
            return Err(StubError::AlreadyExists("Account already exists.".to_string()));
        }
        let account = Account {
            id: random_token(),
            study: sign_up.study.clone(),
            email: sign_up.email.clone(),
            password: sign_up.password.clone(),
            roles: sign_up.roles.clone(),
            consented: false,
            verified: true,
            created_on: now,
        };
        tracing::info!(study = %account.study, account = %account.id, "account created");
        let identifier = account.id.clone();
        self.accounts.insert(identifier.clone(), account);
        Ok(IdentifierHolder {
            identifier,
        })
    }

    /// Deletes an account with its sessions, progress, and responses.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::NotFound`] for an unknown account.
    pub fn delete_user(&mut self, id: &str) -> Result<(), StubError> {
        if self.accounts.remove(id).is_none() {
            return Err(StubError::NotFound(ACCOUNT_NOT_FOUND.to_string()));
        }
        self.sessions.retain(|_, session| session.account_id != id);
        self.verifications.retain(|_, account_id| account_id != id);
        self.progress.remove(id);
        self.issued.remove(id);
        self.zones.remove(id);
        self.responses.retain(|(account_id, _), _| account_id != id);
        tracing::info!(account = %id, "account deleted");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Schedule plans
    // ------------------------------------------------------------------------

    /// Lists a study's plans.
    #[must_use]
    pub fn plans(&self, study: &StudyId) -> Vec<SchedulePlan> {
        self.plans
            .values()
            .filter(|stored| &stored.study == study)
            .map(|stored| stored.plan.clone())
            .collect()
    }

    /// Creates a plan, assigning its guid and any missing activity guids.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::Invalid`] for an invalid plan.
    pub fn create_plan(
        &mut self,
        study: &StudyId,
        mut plan: SchedulePlan,
        now: OffsetDateTime,
    ) -> Result<GuidVersionHolder, StubError> {
        plan.validate()?;
        let guid = random_guid();
        plan.guid = Some(guid.clone());
        plan.version = Some(1);
        plan.modified_on = Some(now);
        prepare_schedules(&mut plan);
        self.plans.insert(
            guid.clone(),
            StoredPlan {
                study: study.clone(),
                guid: guid.clone(),
                plan,
            },
        );
        tracing::info!(study = %study, plan = %guid, "schedule plan created");
        Ok(GuidVersionHolder {
            guid,
            version: 1,
        })
    }

    /// Reads a plan.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::NotFound`] for an unknown plan.
    pub fn plan(&self, study: &StudyId, guid: &Guid) -> Result<&SchedulePlan, StubError> {
        self.plans
            .get(guid)
            .filter(|stored| &stored.study == study)
            .map(|stored| &stored.plan)
            .ok_or_else(plan_not_found)
    }

    /// Replaces a plan when the submitted version matches the stored one.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::NotFound`], [`StubError::ConcurrentModification`]
    /// for a stale version, or [`StubError::Invalid`].
    pub fn update_plan(
        &mut self,
        study: &StudyId,
        guid: &Guid,
        mut plan: SchedulePlan,
        now: OffsetDateTime,
    ) -> Result<GuidVersionHolder, StubError> {
        let stored = self
            .plans
            .get_mut(guid)
            .filter(|stored| &stored.study == study)
            .ok_or_else(plan_not_found)?;
        let current = stored.plan.version.unwrap_or_default();
        if plan.version != Some(current) {
            return Err(StubError::ConcurrentModification(
                "SchedulePlan has the wrong version number; it may have been saved in the background."
                    .to_string(),
            ));
        }
        plan.validate()?;
        let version = current.saturating_add(1);
        plan.guid = Some(stored.guid.clone());
        plan.version = Some(version);
        plan.modified_on = Some(now);
        prepare_schedules(&mut plan);
        stored.plan = plan;
        tracing::info!(study = %study, plan = %guid, version, "schedule plan updated");
        Ok(GuidVersionHolder {
            guid: guid.clone(),
            version,
        })
    }

    /// Deletes a plan.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::NotFound`] for an unknown plan.
    pub fn delete_plan(&mut self, study: &StudyId, guid: &Guid) -> Result<(), StubError> {
        self.plan(study, guid)?;
        self.plans.remove(guid);
        tracing::info!(study = %study, plan = %guid, "schedule plan deleted");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Participant schedules
    // ------------------------------------------------------------------------

    /// Selects one schedule per plan for the caller's client identity.
    #[must_use]
    pub fn schedules_for(&self, caller: &Caller) -> Vec<Schedule> {
        self.selected(caller).into_iter().map(|entry| entry.schedule.clone()).collect()
    }

    /// Lists the caller's scheduled activities within `window`.
    ///
    /// The first listing pins the caller's schedule zone to the requested
    /// offset; later listings resolve times of day in that zone and only
    /// change the offset instances are reported in.
    pub fn scheduled_activities(
        &mut self,
        caller: &Caller,
        window: &ScheduleWindow,
    ) -> Vec<ScheduledActivity> {
        let account = &caller.account.id;
        let zone = *self.zones.entry(account.clone()).or_insert_with(|| window.offset());
        let window = window.with_zone(zone);
        let empty = BTreeMap::new();
        let progress = self.progress.get(account).unwrap_or(&empty);
        let activities = project(&window, self.selected(caller), progress);
        self.issued
            .entry(account.clone())
            .or_default()
            .extend(activities.iter().map(|activity| activity.guid.clone()));
        activities
    }

    /// Applies progress updates all-or-nothing. Updates for instances that
    /// were never listed to the caller are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::Invalid`] when any update would finish an activity
    /// before it started; no update is applied in that case.
    pub fn update_activities(
        &mut self,
        caller: &Caller,
        updates: &[ActivityUpdate],
    ) -> Result<(), StubError> {
        let account = &caller.account.id;
        let empty = BTreeSet::new();
        let issued = self.issued.get(account).unwrap_or(&empty);
        let mut progress = self.progress.get(account).cloned().unwrap_or_default();
        for update in updates {
            if !issued.contains(&update.guid) {
                tracing::warn!(account = %account, activity = %update.guid, "ignoring update for unknown activity");
                continue;
            }
            progress
                .entry(update.guid.clone())
                .or_default()
                .apply(update.started_on, update.finished_on)
                .map_err(|err| StubError::Invalid(err.into()))?;
        }
        self.progress.insert(account.clone(), progress);
        tracing::debug!(account = %account, updates = updates.len(), "activities updated");
        Ok(())
    }

    fn selected(&self, caller: &Caller) -> Vec<PlanSchedule<'_>> {
        self.plans
            .values()
            .filter(|stored| &stored.study == caller.study())
            .filter_map(|stored| {
                stored.plan.strategy.select(&caller.client_info).map(|schedule| PlanSchedule {
                    plan_guid: &stored.guid,
                    schedule,
                })
            })
            .collect()
    }

    // ------------------------------------------------------------------------
    // Surveys
    // ------------------------------------------------------------------------

    /// Creates an unpublished survey revision.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::Invalid`] for an invalid survey.
    pub fn create_survey(
        &mut self,
        study: &StudyId,
        mut survey: Survey,
        now: OffsetDateTime,
    ) -> Result<GuidCreatedOnVersionHolder, StubError> {
        survey.validate()?;
        let guid = random_guid();
        let created_on = truncate_to_millis(now);
        survey.guid = Some(guid.clone());
        survey.created_on = Some(created_on);
        survey.version = Some(1);
        survey.published = false;
        for element in &mut survey.elements {
            element.set_guid(random_guid());
        }
        self.surveys.insert(
            survey_key(&guid, created_on),
            StoredSurvey {
                study: study.clone(),
                survey,
            },
        );
        tracing::info!(study = %study, survey = %guid, "survey created");
        Ok(GuidCreatedOnVersionHolder {
            guid,
            created_on,
            version: 1,
        })
    }

    /// Reads a survey revision.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::NotFound`] for an unknown revision.
    pub fn survey(
        &self,
        study: &StudyId,
        guid: &Guid,
        created_on: OffsetDateTime,
    ) -> Result<&Survey, StubError> {
        self.surveys
            .get(&survey_key(guid, created_on))
            .filter(|stored| &stored.study == study)
            .map(|stored| &stored.survey)
            .ok_or_else(survey_not_found)
    }

    /// Publishes a survey revision.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::NotFound`] for an unknown revision.
    pub fn publish_survey(
        &mut self,
        study: &StudyId,
        guid: &Guid,
        created_on: OffsetDateTime,
    ) -> Result<GuidCreatedOnVersionHolder, StubError> {
        let stored = self
            .surveys
            .get_mut(&survey_key(guid, created_on))
            .filter(|stored| &stored.study == study)
            .ok_or_else(survey_not_found)?;
        if !stored.survey.published {
            stored.survey.published = true;
            stored.survey.version = Some(stored.survey.version.unwrap_or_default().saturating_add(1));
        }
        tracing::info!(study = %study, survey = %guid, "survey published");
        stored.survey.keys().ok_or_else(|| StubError::Internal("survey keys missing".to_string()))
    }

    /// Permanently deletes a survey revision.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::NotFound`] for an unknown revision.
    pub fn delete_survey(
        &mut self,
        study: &StudyId,
        guid: &Guid,
        created_on: OffsetDateTime,
    ) -> Result<(), StubError> {
        self.survey(study, guid, created_on)?;
        self.surveys.remove(&survey_key(guid, created_on));
        tracing::info!(study = %study, survey = %guid, "survey deleted");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Survey responses
    // ------------------------------------------------------------------------

    /// Stores a response after validating its answers.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::NotFound`] for an unknown survey,
    /// [`StubError::AlreadyExists`] for a reused identifier, or
    /// [`StubError::Invalid`] for invalid answers.
    pub fn create_response(
        &mut self,
        caller: &Caller,
        mut response: SurveyResponse,
        now: OffsetDateTime,
    ) -> Result<IdentifierHolder, StubError> {
        let survey =
            self.survey(caller.study(), &response.survey_guid, response.survey_created_on)?;
        let identifier = response.identifier.clone().unwrap_or_else(random_token);
        let key = (caller.account.id.clone(), identifier.clone());
        if self.responses.contains_key(&key) {
            return Err(StubError::AlreadyExists("SurveyResponse already exists.".to_string()));
        }
        validate_answers(survey, &response.answers, now)?;
        response.identifier = Some(identifier.clone());
        self.responses.insert(key, response);
        tracing::info!(account = %caller.account.id, response = %identifier, "survey response created");
        Ok(IdentifierHolder {
            identifier,
        })
    }

    /// Reads one of the caller's responses.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::NotFound`] for an unknown identifier.
    pub fn response(&self, caller: &Caller, identifier: &str) -> Result<&SurveyResponse, StubError> {
        self.responses
            .get(&(caller.account.id.clone(), identifier.to_string()))
            .ok_or_else(response_not_found)
    }

    /// Adds answers to an existing response.
    ///
    /// # Errors
    ///
    /// Returns [`StubError::NotFound`] or [`StubError::Invalid`].
    pub fn add_answers(
        &mut self,
        caller: &Caller,
        identifier: &str,
        answers: Vec<SurveyAnswer>,
        now: OffsetDateTime,
    ) -> Result<IdentifierHolder, StubError> {
        let key = (caller.account.id.clone(), identifier.to_string());
        let existing = self.responses.get(&key).ok_or_else(response_not_found)?;
        let survey =
            self.survey(caller.study(), &existing.survey_guid, existing.survey_created_on)?;
        validate_answers(survey, &answers, now)?;
        let response = self.responses.get_mut(&key).ok_or_else(response_not_found)?;
        response.merge_answers(answers);
        Ok(IdentifierHolder {
            identifier: identifier.to_string(),
        })
    }

    fn account_by_email(&self, study: &StudyId, email: &str) -> Option<&Account> {
        self.accounts
            .values()
            .find(|account| &account.study == study && account.email.eq_ignore_ascii_case(email))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn session_info(account: &Account, token: &str) -> UserSessionInfo {
    UserSessionInfo {
        id: account.id.clone(),
        email: account.email.clone(),
        study_id: account.study.clone(),
        session_token: token.to_string(),
        authenticated: true,
        consented: account.consented,
        roles: account.roles.clone(),
    }
}

/// Assigns missing activity guids and derives the persistent flag.
fn prepare_schedules(plan: &mut SchedulePlan) {
    for schedule in plan.strategy.schedules_mut() {
        schedule.persistent = schedule.is_persistent();
        for activity in &mut schedule.activities {
            if activity.guid.is_none() {
                activity.guid = Some(random_guid());
            }
        }
    }
}

fn truncate_to_millis(at: OffsetDateTime) -> OffsetDateTime {
    let excess = i64::from(at.nanosecond() % 1_000_000);
    at.checked_sub(Duration::nanoseconds(excess)).unwrap_or(at)
}

fn plan_not_found() -> StubError {
    StubError::NotFound("SchedulePlan not found.".to_string())
}

fn survey_not_found() -> StubError {
    StubError::NotFound("Survey not found.".to_string())
}

fn response_not_found() -> StubError {
    StubError::NotFound("SurveyResponse not found.".to_string())
}

/// Random version 4 guid.
#[must_use]
pub fn random_guid() -> Guid {
    Guid::new(Uuid::new_v4().to_string())
}

/// Random opaque token.
#[must_use]
pub fn random_token() -> String {
    format!("{:032x}", rand::random::<u128>())
}
