pub mod content;
pub mod pathway;
pub mod progress;
pub mod user;

pub use content::{ContentInput, ContentItem, ContentKind, ContentUpdate};
pub use pathway::{Pathway, PathwayInput, PathwayQuery, PathwaySummary, Visibility};
pub use progress::{ProgressInput, ProgressRecord, ProgressState, ResetRequest};
pub use user::{NewUser, UpdateProfileRequest, User, UserRole};
