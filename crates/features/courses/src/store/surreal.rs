use crate::error::{CourseError, CourseErrorExt};
use crate::store::{CourseStore, UserDirectory};
use lyceum_database::Database;
use lyceum_kernel::domain::course::{CourseGroup, CourseStats, UserProfile};
use std::collections::BTreeMap;
use surrealdb::types::SurrealValue;
use tracing::instrument;

/// [`CourseStore`] over the `registration` and `groups` tables.
#[derive(Debug, Clone)]
pub struct SurrealCourseStore {
    db: Database,
}

impl SurrealCourseStore {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }
}

/// [`UserDirectory`] over the `user_course` and `user_profile` tables.
#[derive(Debug, Clone)]
pub struct SurrealUserDirectory {
    db: Database,
}

impl SurrealUserDirectory {
    #[must_use]
    pub const fn new(db: Database) -> Self {
        Self { db }
    }
}

#[derive(Debug, SurrealValue)]
struct GroupRow {
    course_id: Option<String>,
    description: Option<String>,
    users: Option<Vec<String>>,
}

impl From<GroupRow> for CourseGroup {
    fn from(row: GroupRow) -> Self {
        Self {
            course_id: row.course_id.unwrap_or_default(),
            description: row.description.unwrap_or_default(),
            users: row.users.unwrap_or_default(),
        }
    }
}

/// Counts and grades arrive cast to `int` and `float` by the statistics query.
#[derive(Debug, SurrealValue)]
struct StatsRow {
    total_tasks: Option<i64>,
    task_succeeded: Option<i64>,
    task_grades: Option<BTreeMap<String, f64>>,
}

impl From<StatsRow> for CourseStats {
    fn from(row: StatsRow) -> Self {
        let count = |value: Option<i64>| {
            u32::try_from(value.unwrap_or_default().max(0)).unwrap_or(u32::MAX)
        };

        Self {
            total_tasks: count(row.total_tasks),
            task_succeeded: count(row.task_succeeded),
            task_grades: row.task_grades.unwrap_or_default().into_iter().collect(),
        }
    }
}

#[derive(Debug, SurrealValue)]
struct ProfileRow {
    realname: Option<String>,
    email: Option<String>,
}

impl From<ProfileRow> for UserProfile {
    fn from(row: ProfileRow) -> Self {
        Self { realname: row.realname.unwrap_or_default(), email: row.email.unwrap_or_default() }
    }
}

impl CourseStore for SurrealCourseStore {
    #[instrument(skip(self))]
    async fn insert_registration(&self, course_id: &str, username: &str) -> Result<(), CourseError> {
        self.db
            .query(
                "CREATE registration CONTENT {
                    username: $username,
                    courseid: $course_id,
                    date: time::now()
                }",
            )
            .bind(("username", username.to_owned()))
            .bind(("course_id", course_id.to_owned()))
            .await
            .context("Inserting registration")?
            .check()
            .map_err(surrealdb::Error::from)
            .context("Inserting registration")?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_registration(&self, course_id: &str, username: &str) -> Result<(), CourseError> {
        self.db
            .query("DELETE registration WHERE username = $username AND courseid = $course_id")
            .bind(("username", username.to_owned()))
            .bind(("course_id", course_id.to_owned()))
            .await
            .context("Removing registration")?
            .check()
            .map_err(surrealdb::Error::from)
            .context("Removing registration")?;

        Ok(())
    }

    async fn is_registered(&self, course_id: &str, username: &str) -> Result<bool, CourseError> {
        let found = self
            .db
            .query(
                "SELECT VALUE username FROM registration
                 WHERE username = $username AND courseid = $course_id LIMIT 1",
            )
            .bind(("username", username.to_owned()))
            .bind(("course_id", course_id.to_owned()))
            .await
            .context("Looking up registration")?
            .take::<Option<String>>(0)
            .context("Parsing registration")?;

        Ok(found.is_some())
    }

    async fn registered_usernames(&self, course_id: &str) -> Result<Vec<String>, CourseError> {
        let usernames = self
            .db
            .query("SELECT VALUE username FROM registration WHERE courseid = $course_id")
            .bind(("course_id", course_id.to_owned()))
            .await
            .context("Listing registrations")?
            .take::<Vec<String>>(0)
            .context("Parsing registrations")?;

        Ok(usernames)
    }

    async fn find_group_with_member(
        &self,
        course_id: &str,
        username: &str,
    ) -> Result<Option<CourseGroup>, CourseError> {
        let group = self
            .db
            .query(
                "SELECT course_id, description, users FROM groups
                 WHERE course_id = $course_id AND users CONTAINS $username LIMIT 1",
            )
            .bind(("username", username.to_owned()))
            .bind(("course_id", course_id.to_owned()))
            .await
            .context("Looking up group")?
            .take::<Option<GroupRow>>(0)
            .context("Parsing group")?;

        Ok(group.map(CourseGroup::from))
    }

    #[instrument(skip(self))]
    async fn remove_group_member(&self, course_id: &str, username: &str) -> Result<(), CourseError> {
        self.db
            .query(
                "UPDATE groups SET users -= $username
                 WHERE course_id = $course_id AND users CONTAINS $username",
            )
            .bind(("username", username.to_owned()))
            .bind(("course_id", course_id.to_owned()))
            .await
            .context("Removing group member")?
            .check()
            .map_err(surrealdb::Error::from)
            .context("Removing group member")?;

        Ok(())
    }

    async fn groups(&self, course_id: &str) -> Result<Vec<CourseGroup>, CourseError> {
        let groups = self
            .db
            .query(
                "SELECT course_id, description, users FROM groups
                 WHERE course_id = $course_id ORDER BY description ASC",
            )
            .bind(("course_id", course_id.to_owned()))
            .await
            .context("Listing groups")?
            .take::<Vec<GroupRow>>(0)
            .context("Parsing groups")?;

        Ok(groups.into_iter().map(CourseGroup::from).collect())
    }
}

impl UserDirectory for SurrealUserDirectory {
    async fn course_stats(
        &self,
        username: &str,
        course_id: &str,
    ) -> Result<Option<CourseStats>, CourseError> {
        let stats = self
            .db
            .query(
                "SELECT
                     <int> math::floor(<float> (total_tasks ?? 0)) AS total_tasks,
                     <int> math::floor(<float> (task_succeeded ?? 0)) AS task_succeeded,
                     object::from_entries(
                         object::entries(task_grades ?? {}).map(|$grade| [$grade[0], <float> $grade[1]])
                     ) AS task_grades
                 FROM user_course
                 WHERE username = $username AND courseid = $course_id LIMIT 1",
            )
            .bind(("username", username.to_owned()))
            .bind(("course_id", course_id.to_owned()))
            .await
            .context("Loading course statistics")?
            .take::<Option<StatsRow>>(0)
            .context("Parsing course statistics")?;

        Ok(stats.map(CourseStats::from))
    }

    async fn profile(&self, username: &str) -> Result<Option<UserProfile>, CourseError> {
        let profile = self
            .db
            .query("SELECT realname, email FROM user_profile WHERE username = $username LIMIT 1")
            .bind(("username", username.to_owned()))
            .await
            .context("Loading user profile")?
            .take::<Option<ProfileRow>>(0)
            .context("Parsing user profile")?;

        Ok(profile.map(UserProfile::from))
    }
}
