//! Domain model (handles, statuses, outcomes, resource records).

pub mod errors;
pub mod handle;
pub mod outcome;
pub mod resource;
pub mod status;

pub use self::errors::ApiError;
pub use self::handle::{NotificationHandle, NotificationId};
pub use self::outcome::WaitOutcome;
pub use self::resource::{Application, Database, Environment, EnvironmentFlags, Tag};
pub use self::status::{PollReport, TaskStatus};
