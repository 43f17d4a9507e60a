pub mod job;
pub mod resume;
pub mod user;

pub use job::{JobFields, JobFilter, JobPatch, JobRecord, JobRow, JobType};
pub use resume::{EducationItem, ExperienceItem, PersonalInfo, ResumeDocument};
pub use user::User;
