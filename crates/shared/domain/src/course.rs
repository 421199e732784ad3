//! Records exchanged between the course policy layer and its collaborators.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Which user attribute is checked against a course's registration allow-list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessControlMethod {
    /// Everybody may register.
    #[default]
    None,
    Username,
    Realname,
    Email,
}

impl AccessControlMethod {
    /// The value used for this method in course files.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Username => "username",
            Self::Realname => "realname",
            Self::Email => "email",
        }
    }
}

impl fmt::Display for AccessControlMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string names no known [`AccessControlMethod`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownAccessControlMethod(pub String);

impl fmt::Display for UnknownAccessControlMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown access-control method '{}'", self.0)
    }
}

impl std::error::Error for UnknownAccessControlMethod {}

impl FromStr for AccessControlMethod {
    type Err = UnknownAccessControlMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "username" => Ok(Self::Username),
            "realname" => Ok(Self::Realname),
            "email" => Ok(Self::Email),
            other => Err(UnknownAccessControlMethod(other.to_owned())),
        }
    }
}

/// A student group of a course, as stored in the `groups` collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseGroup {
    pub course_id: String,
    pub description: String,
    pub users: Vec<String>,
}

impl CourseGroup {
    #[must_use]
    pub fn has_member(&self, username: &str) -> bool {
        self.users.iter().any(|user| user == username)
    }
}

/// Cached per-user statistics for one course.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseStats {
    pub total_tasks: u32,
    pub task_succeeded: u32,
    /// Best grade (0 to 100) per task id.
    pub task_grades: HashMap<String, f64>,
}

/// Profile fields of a user that access control may check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub realname: String,
    pub email: String,
}
