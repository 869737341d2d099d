// crates/bridge-core/src/survey/mod.rs
// ============================================================================
// Module: Bridge Surveys
// Description: Survey revisions, responses, and answer validation.
// Purpose: Group survey wire types with the checks applied on submission.
// Dependencies: crate::core, serde, time
// ============================================================================

pub mod model;
pub mod validation;

pub use model::Constraints;
pub use model::Survey;
pub use model::SurveyAnswer;
pub use model::SurveyElement;
pub use model::SurveyInfoScreen;
pub use model::SurveyQuestion;
pub use model::SurveyQuestionOption;
pub use model::SurveyResponse;
pub use model::UiHint;
pub use validation::SURVEY_RESPONSE_ENTITY;
pub use validation::validate_answers;
