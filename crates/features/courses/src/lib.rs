//! # Courses Slice
//!
//! Web-facing policy for a course: who administers and tutors it, who may see it,
//! who may register to it, and how far each student got.
//!
//! A [`Course`] is loaded from its parsed course file and reads registrations, groups
//! and cached user statistics through the [`CourseStore`] and [`UserDirectory`] seams.
//! With the `server` feature both are backed by `SurrealDB`.

mod access;
mod course;
mod descriptor;
mod error;
mod grades;
mod store;
mod task;
#[cfg(test)]
mod testing;
mod window;

pub use access::AccessControl;
pub use course::{Course, CourseContext};
pub use descriptor::CourseDescriptor;
pub use error::{CourseError, CourseErrorExt};
pub use grades::{completion_percentage, weighted_grade};
pub use store::{CourseStore, UserDirectory};
#[cfg(feature = "server")]
pub use store::{SurrealCourseStore, SurrealUserDirectory};
pub use task::{Task, TaskSet};
pub use window::AccessibleTime;

#[cfg(feature = "server")]
use lyceum_database::{Database, DatabaseBuilder};
#[cfg(feature = "server")]
use lyceum_kernel::domain::config::PlatformConfig;

/// A course backed by `SurrealDB`.
#[cfg(feature = "server")]
pub type SurrealCourse = Course<SurrealCourseStore, SurrealUserDirectory>;

/// Builds the collaborators shared by every course from an open database.
#[cfg(feature = "server")]
pub fn init(
    config: &PlatformConfig,
    database: &Database,
) -> CourseContext<SurrealCourseStore, SurrealUserDirectory> {
    tracing::info!(
        namespace = database.namespace(),
        database = database.database(),
        superadmins = config.superadmins.len(),
        "Courses slice initialized"
    );

    CourseContext::new(
        SurrealCourseStore::new(database.clone()),
        SurrealUserDirectory::new(database.clone()),
        config.clone(),
    )
}

/// Opens the database described by `config` and builds the course collaborators.
///
/// # Errors
/// Returns [`CourseError::Database`] if the database can't be opened or migrated.
#[cfg(feature = "server")]
pub async fn connect(
    config: &PlatformConfig,
) -> Result<CourseContext<SurrealCourseStore, SurrealUserDirectory>, CourseError> {
    let database = DatabaseBuilder::from_config(&config.database)
        .init()
        .await
        .context("Opening course database")?;
    Ok(init(config, &database))
}
