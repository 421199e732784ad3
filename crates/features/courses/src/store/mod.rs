//! Persistence seams of the course policy layer.

#[cfg(feature = "server")]
mod surreal;

use crate::error::CourseError;
use lyceum_kernel::domain::course::{CourseGroup, CourseStats, UserProfile};
#[cfg(feature = "server")]
pub use surreal::{SurrealCourseStore, SurrealUserDirectory};

/// Registrations and student groups, keyed by course id.
///
/// Every call is a single store operation; nothing spans several calls.
pub trait CourseStore: Send + Sync {
    /// Records that `username` registered to `course_id` now.
    fn insert_registration(
        &self,
        course_id: &str,
        username: &str,
    ) -> impl Future<Output = Result<(), CourseError>> + Send;

    /// Deletes the registrations of `username` to `course_id`, if any.
    fn remove_registration(
        &self,
        course_id: &str,
        username: &str,
    ) -> impl Future<Output = Result<(), CourseError>> + Send;

    fn is_registered(
        &self,
        course_id: &str,
        username: &str,
    ) -> impl Future<Output = Result<bool, CourseError>> + Send;

    /// Usernames of every registration to `course_id`, in no particular order.
    fn registered_usernames(
        &self,
        course_id: &str,
    ) -> impl Future<Output = Result<Vec<String>, CourseError>> + Send;

    /// The group of `course_id` listing `username` as a member.
    fn find_group_with_member(
        &self,
        course_id: &str,
        username: &str,
    ) -> impl Future<Output = Result<Option<CourseGroup>, CourseError>> + Send;

    /// Pulls `username` out of the members of the groups of `course_id`.
    fn remove_group_member(
        &self,
        course_id: &str,
        username: &str,
    ) -> impl Future<Output = Result<(), CourseError>> + Send;

    /// Groups of `course_id`, sorted by description.
    fn groups(
        &self,
        course_id: &str,
    ) -> impl Future<Output = Result<Vec<CourseGroup>, CourseError>> + Send;
}

/// Per-user data maintained outside the course policy layer.
pub trait UserDirectory: Send + Sync {
    /// Cached statistics of `username` in `course_id`, if computed yet.
    fn course_stats(
        &self,
        username: &str,
        course_id: &str,
    ) -> impl Future<Output = Result<Option<CourseStats>, CourseError>> + Send;

    fn profile(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<UserProfile>, CourseError>> + Send;
}
