// system-tests/tests/suites/schedules.rs
// ============================================================================
// Module: Schedule Plan Tests
// Description: Schedule plan storage and client-aware schedule selection.
// Purpose: Validate plan round-trips, persistence flags, and criteria filtering.
// Dependencies: system-tests helpers, bridge-client, bridge-core
// ============================================================================

//! Schedule plan system tests.

use bridge_core::ClientInfo;
use bridge_core::Role;
use bridge_core::Schedule;
use bridge_core::SchedulePlan;
use helpers::fixtures::create_schedule_plan;
use helpers::fixtures::criteria_schedule_plan;
use helpers::fixtures::persistent_schedule_plan;
use helpers::fixtures::simple_schedule_plan;
use helpers::harness::TestContext;
use helpers::harness::run_system_test;
use helpers::teardown::TestError;
use helpers::users::TestUser;
use helpers::users::random_identifier;

use crate::helpers;

/// Client identity used by schedule tests before any re-identification.
fn app_client_info() -> ClientInfo {
    ClientInfo::default().with_app("Bridge System Tests", 3).with_device("Integration Tests")
}

fn client_info_with_version(os_name: &str, version: u32) -> ClientInfo {
    ClientInfo::default()
        .with_app("app", version)
        .with_os(os_name, "2.0.0")
        .with_device("Integration Tests")
}

async fn developer(ctx: &TestContext) -> Result<TestUser, TestError> {
    let developer = ctx
        .user()
        .with_client_info(app_client_info())
        .with_consent(true)
        .with_roles(&[Role::Developer])
        .create_and_sign_in()
        .await?;
    ctx.adopt("developer", &developer);
    Ok(developer)
}

async fn participant(ctx: &TestContext) -> Result<TestUser, TestError> {
    let user =
        ctx.user().with_client_info(app_client_info()).with_consent(true).create_and_sign_in().await?;
    ctx.adopt("user", &user);
    Ok(user)
}

fn only_schedule(plan: &SchedulePlan) -> Result<&Schedule, TestError> {
    match plan.strategy.schedules().as_slice() {
        [schedule] => Ok(schedule),
        other => Err(format!("expected one schedule, found {}", other.len()).into()),
    }
}

/// Counts listed activities carrying `label` in a one-day window.
async fn count_activities_labelled(user: &TestUser, label: &str) -> Result<usize, TestError> {
    let listing = user.client().consented().get_scheduled_activities("+00:00", 1, None).await?;
    Ok(listing.items.iter().filter(|activity| activity.activity.label == label).count())
}

#[tokio::test(flavor = "multi_thread")]
async fn schedule_plan_reads_back_as_submitted() -> Result<(), TestError> {
    run_system_test("schedule_plan_round_trip", |ctx| async move {
        let developer = developer(&ctx).await?;
        let submitted = simple_schedule_plan();
        let guid = create_schedule_plan(&developer, &ctx.teardown, &submitted).await?;

        let stored = developer.client().schedules().get_schedule_plan(&guid).await?;
        let mut expected = submitted;
        expected.guid = stored.guid.clone();
        expected.version = stored.version;
        expected.modified_on = stored.modified_on;
        let stored_schedules = stored.strategy.schedules();
        for (mine, theirs) in expected.strategy.schedules_mut().into_iter().zip(stored_schedules) {
            mine.persistent = theirs.persistent;
            for (activity, stored_activity) in mine.activities.iter_mut().zip(&theirs.activities) {
                activity.guid = stored_activity.guid.clone();
            }
        }
        assert_eq!(expected, stored);
        assert_eq!(stored.version, Some(1));
        assert!(stored.modified_on.is_some());
        Ok(())
    })
    .await
}

#[tokio::test(flavor = "multi_thread")]
async fn user_can_retrieve_their_schedules() -> Result<(), TestError> {
    run_system_test("user_retrieves_schedules", |ctx| async move {
        let user = participant(&ctx).await?;
        let developer = developer(&ctx).await?;

        // Other plans may exist in the study; the label identifies ours.
        let label = random_identifier(ctx.name());
        let mut plan = simple_schedule_plan();
        if let Some(schedule) = plan.strategy.schedules_mut().into_iter().next() {
            schedule.label.clone_from(&label);
        }
        create_schedule_plan(&developer, &ctx.teardown, &plan).await?;

        let schedules = user.client().consented().get_schedules().await?;
        assert!(
            schedules.items.iter().any(|schedule| schedule.label == label),
            "schedule {label} not returned"
        );
        Ok(())
    })
    .await
}

#[tokio::test(flavor = "multi_thread")]
async fn persistent_schedule_plan_is_marked_persistent() -> Result<(), TestError> {
    run_system_test("persistent_plan_marked_persistent", |ctx| async move {
        let developer = developer(&ctx).await?;
        let guid = create_schedule_plan(&developer, &ctx.teardown, &persistent_schedule_plan()).await?;

        let stored = developer.client().schedules().get_schedule_plan(&guid).await?;
        assert!(only_schedule(&stored)?.persistent);
        Ok(())
    })
    .await
}

#[tokio::test(flavor = "multi_thread")]
async fn simple_schedule_plan_is_not_marked_persistent() -> Result<(), TestError> {
    run_system_test("simple_plan_not_persistent", |ctx| async move {
        let developer = developer(&ctx).await?;
        let guid = create_schedule_plan(&developer, &ctx.teardown, &simple_schedule_plan()).await?;

        let stored = developer.client().schedules().get_schedule_plan(&guid).await?;
        assert!(!only_schedule(&stored)?.persistent);
        Ok(())
    })
    .await
}

#[tokio::test(flavor = "multi_thread")]
async fn criteria_based_schedule_is_filtered_for_user() -> Result<(), TestError> {
    run_system_test("criteria_schedule_filtering", |ctx| async move {
        let user = participant(&ctx).await?;
        let developer = developer(&ctx).await?;
        let first_label = random_identifier(ctx.name());
        let second_label = random_identifier(ctx.name());

        user.sign_out().await?;
        create_schedule_plan(
            &developer,
            &ctx.teardown,
            &criteria_schedule_plan(&first_label, &second_label),
        )
        .await?;

        user.re_sign_in(client_info_with_version("Android", 2)).await?;
        assert_eq!(count_activities_labelled(&user, &first_label).await?, 1);
        assert_eq!(count_activities_labelled(&user, &second_label).await?, 0);

        user.re_sign_in(client_info_with_version("Android", 12)).await?;
        assert_eq!(count_activities_labelled(&user, &first_label).await?, 0);
        assert_eq!(count_activities_labelled(&user, &second_label).await?, 1);

        // The first pair sets no iPhone OS bound, so it matches directly.
        user.re_sign_in(client_info_with_version("iPhone OS", 12)).await?;
        assert_eq!(count_activities_labelled(&user, &first_label).await?, 1);
        assert_eq!(count_activities_labelled(&user, &second_label).await?, 0);
        Ok(())
    })
    .await
}
