use lyceum_kernel::domain::course::{AccessControlMethod, UserProfile};

/// Registration allow-list of a course.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessControl {
    method: AccessControlMethod,
    list: Vec<String>,
}

impl AccessControl {
    #[must_use]
    pub const fn new(method: AccessControlMethod, list: Vec<String>) -> Self {
        Self { method, list }
    }

    #[must_use]
    pub const fn method(&self) -> AccessControlMethod {
        self.method
    }

    #[must_use]
    pub fn list(&self) -> &[String] {
        &self.list
    }

    /// True if evaluating the list requires the user's stored profile.
    #[must_use]
    pub const fn needs_profile(&self) -> bool {
        matches!(self.method, AccessControlMethod::Realname | AccessControlMethod::Email)
    }

    /// Checks `username` against the list.
    ///
    /// `profile` is only consulted for the `realname` and `email` methods; a user
    /// without a stored profile is rejected by them.
    #[must_use]
    pub fn accepts(&self, username: &str, profile: Option<&UserProfile>) -> bool {
        match self.method {
            AccessControlMethod::None => true,
            AccessControlMethod::Username => self.contains(username),
            AccessControlMethod::Realname => {
                profile.is_some_and(|profile| self.contains(&profile.realname))
            },
            AccessControlMethod::Email => profile.is_some_and(|profile| self.contains(&profile.email)),
        }
    }

    fn contains(&self, value: &str) -> bool {
        self.list.iter().any(|entry| entry == value)
    }
}
