// system-tests/tests/suites/survey_responses.rs
// ============================================================================
// Module: Survey Response Tests
// Description: Creating, extending, and reading survey responses.
// Purpose: Validate answer storage for every question type and rejection paths.
// Dependencies: system-tests helpers, bridge-client, bridge-core
// ============================================================================

//! ## Overview
//! Each test publishes its own survey with one question of every answer type,
//! then answers it as a consented participant.

use bridge_client::ApiError;
use bridge_core::GuidCreatedOnVersionHolder;
use bridge_core::Role;
use bridge_core::Survey;
use bridge_core::SurveyAnswer;
use bridge_core::SurveyQuestion;
use bridge_core::SurveyResponse;
use helpers::fixtures::BOOLEAN_ID;
use helpers::fixtures::DATE_ID;
use helpers::fixtures::DATETIME_ID;
use helpers::fixtures::DECIMAL_ID;
use helpers::fixtures::DURATION_ID;
use helpers::fixtures::INTEGER_ID;
use helpers::fixtures::MULTIVALUE_ID;
use helpers::fixtures::STRING_ID;
use helpers::fixtures::TIME_ID;
use helpers::fixtures::create_published_survey;
use helpers::fixtures::test_survey;
use helpers::harness::TestContext;
use helpers::harness::run_system_test;
use helpers::teardown::TestError;
use helpers::users::TestUser;
use helpers::users::random_identifier;

use crate::helpers;

const CLIENT: &str = "mobile";

struct SurveyFixture {
    user: TestUser,
    keys: GuidCreatedOnVersionHolder,
    survey: Survey,
}

impl SurveyFixture {
    async fn set_up(ctx: &TestContext) -> Result<Self, TestError> {
        let developer = ctx
            .user()
            .with_consent(true)
            .with_roles(&[Role::Developer])
            .create_and_sign_in()
            .await?;
        ctx.adopt("developer", &developer);
        let user = ctx.user().with_consent(true).create_and_sign_in().await?;
        ctx.adopt("user", &user);

        let (keys, survey) = create_published_survey(
            &ctx.env,
            &developer,
            &ctx.teardown,
            &test_survey(&random_identifier(ctx.name())),
        )
        .await?;
        Ok(Self {
            user,
            keys,
            survey,
        })
    }

    fn question(&self, identifier: &str) -> Result<&SurveyQuestion, TestError> {
        self.survey
            .question_by_identifier(identifier)
            .ok_or_else(|| format!("survey has no question {identifier}").into())
    }

    fn answer(&self, identifier: &str, value: &str) -> Result<SurveyAnswer, TestError> {
        Ok(self.question(identifier)?.answer(value, CLIENT))
    }

    async fn submit(&self, response: &SurveyResponse) -> Result<String, ApiError> {
        let holder = self.user.client().consented().create_survey_response(response).await?;
        Ok(holder.identifier)
    }

    async fn read(&self, identifier: &str) -> Result<SurveyResponse, ApiError> {
        self.user.client().consented().get_survey_response(identifier).await
    }

    fn identifier_of(&self, answer: &SurveyAnswer) -> Option<&str> {
        self.survey
            .element_by_guid(&answer.question_guid)
            .and_then(|element| element.as_question())
            .map(|question| question.identifier.as_str())
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn answers_can_be_added_to_an_empty_response() -> Result<(), TestError> {
    run_system_test("survey_response_add_answers", |ctx| async move {
        let fixture = SurveyFixture::set_up(&ctx).await?;

        let identifier = fixture.submit(&SurveyResponse::new(&fixture.keys, Vec::new())).await?;
        assert!(!identifier.is_empty());
        let stored = fixture.read(&identifier).await?;
        assert_eq!(stored.identifier.as_deref(), Some(identifier.as_str()));
        assert!(stored.answers.is_empty());

        let answer = fixture.answer(BOOLEAN_ID, "true")?;
        fixture
            .user
            .client()
            .consented()
            .add_answers_to_response(&identifier, &[answer])
            .await?;
        let stored = fixture.read(&identifier).await?;
        assert_eq!(stored.answers.len(), 1);
        assert_eq!(fixture.identifier_of(&stored.answers[0]), Some(BOOLEAN_ID));
        assert_eq!(stored.answers[0].answers, vec!["true".to_string()]);
        Ok(())
    })
    .await
}

#[tokio::test(flavor = "multi_thread")]
async fn response_can_be_submitted_with_answers() -> Result<(), TestError> {
    run_system_test("survey_response_cold_submit", |ctx| async move {
        let fixture = SurveyFixture::set_up(&ctx).await?;
        let answers =
            vec![fixture.answer(BOOLEAN_ID, "true")?, fixture.answer(DECIMAL_ID, "5.0")?];

        let identifier = fixture.submit(&SurveyResponse::new(&fixture.keys, answers)).await?;
        let stored = fixture.read(&identifier).await?;
        assert_eq!(stored.survey_guid, fixture.keys.guid);
        assert_eq!(stored.survey_created_on, fixture.keys.created_on);
        assert_eq!(stored.answers.len(), 2);
        Ok(())
    })
    .await
}

#[tokio::test(flavor = "multi_thread")]
async fn every_answer_type_is_stored_as_given() -> Result<(), TestError> {
    run_system_test("survey_response_answer_types", |ctx| async move {
        let fixture = SurveyFixture::set_up(&ctx).await?;
        let singles = [
            (BOOLEAN_ID, "true"),
            (DATETIME_ID, "2014-10-30T18:33:36.081Z"),
            (DATE_ID, "2014-10-30"),
            (STRING_ID, "123-456-7890"),
            (DECIMAL_ID, "4.6"),
            (INTEGER_ID, "4"),
            (TIME_ID, "18:33:36"),
            (DURATION_ID, "PT30M"),
        ];
        let mut answers = singles
            .iter()
            .map(|(identifier, value)| fixture.answer(identifier, value))
            .collect::<Result<Vec<_>, _>>()?;
        answers.push(
            fixture
                .question(MULTIVALUE_ID)?
                .answer_values(vec!["1".to_string(), "3".to_string()], CLIENT),
        );

        let identifier = fixture.submit(&SurveyResponse::new(&fixture.keys, answers)).await?;
        let stored = fixture.read(&identifier).await?;
        assert_eq!(stored.answers.len(), singles.len() + 1);
        for (question, value) in singles {
            let answer = stored
                .answers
                .iter()
                .find(|answer| fixture.identifier_of(answer) == Some(question))
                .ok_or_else(|| format!("no stored answer for {question}"))?;
            assert_eq!(answer.answers, vec![value.to_string()], "answer to {question}");
            assert_eq!(answer.client, CLIENT);
        }
        let feeling = stored
            .answers
            .iter()
            .find(|answer| fixture.identifier_of(answer) == Some(MULTIVALUE_ID))
            .ok_or("no stored answer for the multi-value question")?;
        assert_eq!(feeling.answers, vec!["1".to_string(), "3".to_string()]);
        Ok(())
    })
    .await
}

#[tokio::test(flavor = "multi_thread")]
async fn reused_response_identifier_is_a_conflict() -> Result<(), TestError> {
    run_system_test("survey_response_duplicate_identifier", |ctx| async move {
        let fixture = SurveyFixture::set_up(&ctx).await?;
        let identifier = random_identifier(ctx.name());
        let response = SurveyResponse::new(&fixture.keys, vec![fixture.answer(BOOLEAN_ID, "true")?])
            .with_identifier(identifier.clone());

        assert_eq!(fixture.submit(&response).await?, identifier);
        let err = fixture.submit(&response).await.expect_err("second submit must conflict");
        assert!(matches!(err, ApiError::Conflict { .. }), "unexpected error: {err}");
        assert_eq!(err.status(), Some(409));
        Ok(())
    })
    .await
}

#[tokio::test(flavor = "multi_thread")]
async fn out_of_range_integer_answer_is_rejected() -> Result<(), TestError> {
    run_system_test("survey_response_out_of_range", |ctx| async move {
        let fixture = SurveyFixture::set_up(&ctx).await?;
        let response =
            SurveyResponse::new(&fixture.keys, vec![fixture.answer(INTEGER_ID, "44")?]);

        let err = fixture.submit(&response).await.expect_err("44 is above the maximum");
        match err {
            ApiError::Validation {
                message, ..
            } => assert_eq!(
                message,
                "SurveyResponse is invalid: 44 is higher than the maximum value of 8.0"
            ),
            other => panic!("expected a validation error, got {other}"),
        }
        Ok(())
    })
    .await
}
