// system-tests/tests/suites/scheduled_activities.rs
// ============================================================================
// Module: Scheduled Activity Tests
// Description: Listing and progress updates for scheduled activities.
// Purpose: Validate the scheduled, started, finished lifecycle and minimums.
// Dependencies: system-tests helpers, bridge-client, bridge-core, time
// ============================================================================

//! Scheduled activity system tests.

use bridge_core::ActivityType;
use bridge_core::Role;
use bridge_core::ScheduleStatus;
use bridge_core::ScheduledActivity;
use helpers::fixtures::TASK_AAA;
use helpers::fixtures::TASK_BBB;
use helpers::fixtures::create_schedule_plan;
use helpers::fixtures::one_time_task_plan;
use helpers::fixtures::recurring_task_plan;
use helpers::harness::TestContext;
use helpers::harness::run_system_test;
use helpers::teardown::TestError;
use helpers::users::TestUser;
use helpers::users::random_identifier;
use time::OffsetDateTime;

use crate::helpers;

/// Participant plus the two task plans every test here lists against.
struct ActivityFixture {
    user: TestUser,
    one_time_label: String,
    recurring_label: String,
}

impl ActivityFixture {
    async fn set_up(ctx: &TestContext) -> Result<Self, TestError> {
        let user = ctx.user().with_consent(true).create_and_sign_in().await?;
        ctx.adopt("user", &user);
        let developer = ctx
            .user()
            .with_consent(true)
            .with_roles(&[Role::Developer])
            .create_and_sign_in()
            .await?;
        ctx.adopt("developer", &developer);

        let one_time_label = random_identifier(ctx.name());
        let recurring_label = random_identifier(ctx.name());
        create_schedule_plan(&developer, &ctx.teardown, &one_time_task_plan(&one_time_label))
            .await?;
        create_schedule_plan(&developer, &ctx.teardown, &recurring_task_plan(&recurring_label))
            .await?;
        Ok(Self {
            user,
            one_time_label,
            recurring_label,
        })
    }

    fn is_ours(&self, activity: &ScheduledActivity) -> bool {
        activity.activity.label == self.one_time_label
            || activity.activity.label == self.recurring_label
    }

    /// Lists activities and keeps the ones produced by this fixture's plans.
    async fn list(
        &self,
        days_ahead: u32,
        minimum: Option<u32>,
    ) -> Result<(Vec<ScheduledActivity>, usize), TestError> {
        let listing = self
            .user
            .client()
            .consented()
            .get_scheduled_activities("+00:00", days_ahead, minimum)
            .await?;
        let total = listing.total;
        let ours = listing.items.into_iter().filter(|activity| self.is_ours(activity)).collect();
        Ok((ours, total))
    }
}

fn task_identifier(activity: &ScheduledActivity) -> Option<&str> {
    activity.activity.task.as_ref().map(|task| task.identifier.as_str())
}

fn count_task(activities: &[ScheduledActivity], identifier: &str) -> usize {
    activities.iter().filter(|activity| task_identifier(activity) == Some(identifier)).count()
}

#[tokio::test(flavor = "multi_thread")]
async fn scheduled_activity_moves_through_started_and_finished() -> Result<(), TestError> {
    run_system_test("scheduled_activity_lifecycle", |ctx| async move {
        let fixture = ActivityFixture::set_up(&ctx).await?;

        let (listed, _) = fixture.list(4, Some(0)).await?;
        let [mut activity] = <[ScheduledActivity; 1]>::try_from(listed)
            .map_err(|listed| format!("expected one activity, found {}", listed.len()))?;
        assert_eq!(activity.status, ScheduleStatus::Scheduled);
        assert_eq!(activity.expires_on, None);
        assert_eq!(activity.activity.activity_type, ActivityType::Task);
        assert_eq!(task_identifier(&activity), Some(TASK_AAA));

        activity.started_on = Some(OffsetDateTime::now_utc());
        fixture.user.client().consented().update_scheduled_activities(&[activity.clone()]).await?;

        let (listed, _) = fixture.list(3, None).await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].guid, activity.guid);
        assert_eq!(listed[0].status, ScheduleStatus::Started);

        activity.finished_on = Some(OffsetDateTime::now_utc());
        fixture.user.client().consented().update_scheduled_activities(&[activity]).await?;

        let (listed, total) = fixture.list(3, None).await?;
        assert!(listed.is_empty(), "finished activity still listed: {listed:?}");
        if ctx.env.stub().is_some() {
            assert_eq!(total, 0);
        }
        Ok(())
    })
    .await
}

#[tokio::test(flavor = "multi_thread")]
async fn minimum_per_schedule_tops_up_later_occurrences() -> Result<(), TestError> {
    run_system_test("scheduled_activity_minimums", |ctx| async move {
        let fixture = ActivityFixture::set_up(&ctx).await?;

        for (minimum, expected_recurring) in [(2, 2), (0, 0), (5, 5)] {
            let (listed, _) = fixture.list(4, Some(minimum)).await?;
            assert_eq!(count_task(&listed, TASK_AAA), 1, "one-time task with minimum {minimum}");
            assert_eq!(
                count_task(&listed, TASK_BBB),
                expected_recurring,
                "recurring task with minimum {minimum}"
            );
        }
        Ok(())
    })
    .await
}
