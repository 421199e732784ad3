//! Validated settings of a course file.

use crate::access::AccessControl;
use crate::error::CourseError;
use crate::window::AccessibleTime;
use lyceum_kernel::domain::course::AccessControlMethod;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Web-facing settings of one course, validated once when the course is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseDescriptor {
    pub name: String,
    pub admins: Vec<String>,
    pub tutors: Vec<String>,
    pub accessible: AccessibleTime,
    pub registration: AccessibleTime,
    pub registration_password: Option<String>,
    pub access_control: AccessControl,
    pub groups: bool,
    pub groups_student_choice: bool,
}

#[derive(Deserialize)]
struct RawDescriptor {
    name: String,
    admins: Vec<String>,
    #[serde(default)]
    tutors: Vec<String>,
    #[serde(default)]
    registration_password: Option<String>,
    #[serde(default)]
    registration_ac: Option<Value>,
    #[serde(default)]
    registration_ac_list: Vec<String>,
    #[serde(default)]
    groups: bool,
    #[serde(default)]
    groups_student_choice: bool,
}

impl CourseDescriptor {
    /// Validates the parsed course file of `course_id`.
    ///
    /// Checks run in a fixed order: the `nofrontend` flag, then the required `name`
    /// and `admins` entries, then the time windows and the access-control method.
    ///
    /// # Errors
    /// * [`CourseError::NotDisplayable`] if `nofrontend` is truthy.
    /// * [`CourseError::InvalidDescription`] if `name` or `admins` is missing, `admins`
    ///   is not a list, or another entry has the wrong type.
    /// * [`CourseError::InvalidWindow`] if `accessible` or `registration` can't be parsed.
    /// * [`CourseError::InvalidAccessControl`] if `registration_ac` is not a known method.
    pub fn parse(course_id: &str, content: &Value) -> Result<Self, CourseError> {
        let Some(map) = content.as_object() else {
            return Err(CourseError::InvalidDescription {
                message: "Course file is not a mapping".into(),
                context: Some(course_id.to_owned().into()),
            });
        };

        if map.get("nofrontend").is_some_and(is_truthy) {
            return Err(CourseError::NotDisplayable {
                message: "Course is not allowed to be displayed directly in the webapp".into(),
                context: Some(course_id.to_owned().into()),
            });
        }

        if !map.contains_key("name") || !map.get("admins").is_some_and(Value::is_array) {
            return Err(CourseError::InvalidDescription {
                message: "'name' and an 'admins' list are required".into(),
                context: Some(course_id.to_owned().into()),
            });
        }

        let raw = RawDescriptor::deserialize(content).map_err(|e| {
            CourseError::InvalidDescription {
                message: e.to_string().into(),
                context: Some(course_id.to_owned().into()),
            }
        })?;

        let accessible = window(map, "accessible", course_id)?;
        let registration = window(map, "registration", course_id)?;

        let method = access_control_method(raw.registration_ac.as_ref(), course_id)?;

        Ok(Self {
            name: raw.name,
            admins: raw.admins,
            tutors: raw.tutors,
            accessible,
            registration,
            registration_password: raw.registration_password,
            access_control: AccessControl::new(method, raw.registration_ac_list),
            groups: raw.groups,
            groups_student_choice: raw.groups_student_choice,
        })
    }
}

fn window(map: &Map<String, Value>, key: &str, course_id: &str) -> Result<AccessibleTime, CourseError> {
    AccessibleTime::from_value(map.get(key)).map_err(|e| match e {
        CourseError::InvalidWindow { message, .. } => CourseError::InvalidWindow {
            message: format!("'{key}': {message}").into(),
            context: Some(course_id.to_owned().into()),
        },
        other => other,
    })
}

fn access_control_method(
    value: Option<&Value>,
    course_id: &str,
) -> Result<AccessControlMethod, CourseError> {
    let parsed = match value {
        None | Some(Value::Null) => return Ok(AccessControlMethod::None),
        Some(Value::String(raw)) => raw.parse::<AccessControlMethod>().map_err(|e| e.to_string()),
        Some(other) => Err(format!("expected an access-control method name, got {other}")),
    };

    parsed.map_err(|message| CourseError::InvalidAccessControl {
        message: message.into(),
        context: Some(course_id.to_owned().into()),
    })
}

/// Truthiness of a course-file value: `false`, `null`, zero and empty values are false.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(content: &Value) -> Result<CourseDescriptor, CourseError> {
        CourseDescriptor::parse("algo101", content)
    }

    #[test]
    fn minimal_course_uses_defaults() {
        let descriptor = parse(&json!({ "name": "Algorithms", "admins": ["ada"] })).unwrap();

        assert_eq!(descriptor.name, "Algorithms");
        assert_eq!(descriptor.admins, ["ada"]);
        assert!(descriptor.tutors.is_empty());
        assert_eq!(descriptor.accessible, AccessibleTime::Always);
        assert_eq!(descriptor.registration, AccessibleTime::Always);
        assert_eq!(descriptor.registration_password, None);
        assert_eq!(descriptor.access_control.method(), AccessControlMethod::None);
        assert!(!descriptor.groups);
        assert!(!descriptor.groups_student_choice);
    }

    #[test]
    fn full_course() {
        let descriptor = parse(&json!({
            "name": "Algorithms",
            "admins": ["ada"],
            "tutors": ["tom"],
            "accessible": "2024-09-01/2025-06-30",
            "registration": false,
            "registration_password": "s3cret",
            "registration_ac": "email",
            "registration_ac_list": ["alice@example.org"],
            "groups": true,
            "groups_student_choice": true,
        }))
        .unwrap();

        assert_eq!(descriptor.tutors, ["tom"]);
        assert!(matches!(descriptor.accessible, AccessibleTime::Between { .. }));
        assert_eq!(descriptor.registration, AccessibleTime::Never);
        assert_eq!(descriptor.registration_password.as_deref(), Some("s3cret"));
        assert_eq!(descriptor.access_control.method(), AccessControlMethod::Email);
        assert_eq!(descriptor.access_control.list(), ["alice@example.org"]);
        assert!(descriptor.groups);
        assert!(descriptor.groups_student_choice);
    }

    #[test]
    fn nofrontend_wins_over_everything() {
        for flag in [json!(true), json!(1), json!("yes")] {
            let err = parse(&json!({ "nofrontend": flag, "registration_ac": "bogus" })).unwrap_err();
            assert!(matches!(err, CourseError::NotDisplayable { .. }));
        }

        for flag in [json!(false), json!(0), json!(""), json!(null)] {
            assert!(parse(&json!({ "nofrontend": flag, "name": "A", "admins": [] })).is_ok());
        }
    }

    #[test]
    fn name_and_admin_list_are_required() {
        for content in [
            json!({ "admins": ["ada"] }),
            json!({ "name": "Algorithms" }),
            json!({ "name": "Algorithms", "admins": "ada" }),
            json!({ "name": "Algorithms", "admins": null }),
            json!(["not", "a", "mapping"]),
        ] {
            let err = parse(&content).unwrap_err();
            assert!(matches!(err, CourseError::InvalidDescription { .. }), "{content}");
        }
    }

    #[test]
    fn invalid_description_comes_before_access_control() {
        let err = parse(&json!({ "name": "A", "registration_ac": "bogus" })).unwrap_err();
        assert!(matches!(err, CourseError::InvalidDescription { .. }));
    }

    #[test]
    fn access_control_method_is_validated() {
        let err = parse(&json!({ "name": "A", "admins": [], "registration_ac": "phone" })).unwrap_err();
        assert!(matches!(err, CourseError::InvalidAccessControl { .. }));
        assert!(err.to_string().contains("algo101"));

        for value in [json!(5), json!(true), json!(["username"]), json!({ "method": "email" })] {
            let err = parse(&json!({ "name": "A", "admins": [], "registration_ac": value })).unwrap_err();
            assert!(matches!(err, CourseError::InvalidAccessControl { .. }), "{value}");
        }

        for method in ["none", "username", "realname", "email"] {
            assert!(parse(&json!({ "name": "A", "admins": [], "registration_ac": method })).is_ok());
        }
        let open = parse(&json!({ "name": "A", "admins": [], "registration_ac": null })).unwrap();
        assert_eq!(open.access_control.method(), AccessControlMethod::None);
    }

    #[test]
    fn malformed_window_is_rejected() {
        let err = parse(&json!({ "name": "A", "admins": [], "accessible": "soon" })).unwrap_err();
        assert!(matches!(err, CourseError::InvalidWindow { .. }));
        assert!(err.to_string().contains("accessible"));
    }
}
