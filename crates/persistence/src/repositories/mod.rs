//! Repository implementations for database operations.

pub mod organization;
pub mod question;
pub mod session;
pub mod submission;
pub mod template;
pub mod user;

pub use organization::OrganizationRepository;
pub use question::QuestionRepository;
pub use session::SessionRepository;
pub use submission::{SubmissionRepository, SubmissionScope};
pub use template::{NewTemplate, TemplateRepository};
pub use user::UserRepository;
