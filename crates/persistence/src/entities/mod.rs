//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod member;
pub mod organization;
pub mod question;
pub mod submission;
pub mod template;
pub mod user;

pub use member::{MemberEntity, ModelTypeDb, OrgRoleDb};
pub use organization::{OrganizationEntity, OrganizationSummaryEntity};
pub use question::{InputTypeDb, QuestionEntity, QuestionStatusDb};
pub use submission::SubmissionEntity;
pub use template::{TemplateEntity, TemplateQuestionEntity, TemplateSummaryEntity};
pub use user::{MembershipEntity, UserEntity, UserSessionEntity};
