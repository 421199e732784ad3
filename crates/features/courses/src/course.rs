use crate::access::AccessControl;
use crate::descriptor::CourseDescriptor;
use crate::error::CourseError;
use crate::grades;
use crate::store::{CourseStore, UserDirectory};
use crate::task::{self, Task, TaskSet};
use crate::window::AccessibleTime;
use fxhash::FxHashSet;
use lyceum_kernel::domain::config::PlatformConfig;
use lyceum_kernel::domain::course::{AccessControlMethod, CourseGroup};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Collaborators shared by every course of the platform.
#[derive(Debug, Clone)]
pub struct CourseContext<S, U> {
    store: S,
    users: U,
    config: PlatformConfig,
}

impl<S, U> CourseContext<S, U> {
    #[must_use]
    pub const fn new(store: S, users: U, config: PlatformConfig) -> Self {
        Self { store, users, config }
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn users(&self) -> &U {
        &self.users
    }

    #[must_use]
    pub const fn config(&self) -> &PlatformConfig {
        &self.config
    }
}

/// A course as seen by the web application.
///
/// Settings are immutable after loading. Registrations and groups live in the
/// [`CourseStore`] and are read on every call.
#[derive(Debug, Clone)]
pub struct Course<S, U> {
    id: String,
    descriptor: CourseDescriptor,
    tasks: TaskSet,
    context: CourseContext<S, U>,
}

impl<S, U> Course<S, U> {
    /// Loads a course from its parsed course file.
    ///
    /// # Errors
    /// Fails when the course file is rejected by [`CourseDescriptor::parse`].
    pub fn new(
        id: impl Into<String>,
        content: &Value,
        context: CourseContext<S, U>,
    ) -> Result<Self, CourseError> {
        let id = id.into();
        let descriptor = CourseDescriptor::parse(&id, content)?;
        Ok(Self::from_descriptor(id, descriptor, context))
    }

    #[must_use]
    pub fn from_descriptor(
        id: impl Into<String>,
        descriptor: CourseDescriptor,
        context: CourseContext<S, U>,
    ) -> Self {
        Self { id: id.into(), descriptor, tasks: TaskSet::new(), context }
    }

    /// Attaches the tasks loaded for this course.
    #[must_use]
    pub fn with_tasks(mut self, tasks: TaskSet) -> Self {
        self.tasks = tasks;
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Administrators of the course, plus the platform super-administrators when
    /// `include_super` is set.
    #[must_use]
    pub fn admins(&self, include_super: bool) -> FxHashSet<String> {
        let mut admins: FxHashSet<String> = self.descriptor.admins.iter().cloned().collect();
        if include_super {
            admins.extend(self.context.config.superadmins.iter().cloned());
        }
        admins
    }

    #[must_use]
    pub fn tutors(&self) -> FxHashSet<String> {
        self.descriptor.tutors.iter().cloned().collect()
    }

    /// Administrators and tutors.
    #[must_use]
    pub fn staff(&self, include_super: bool) -> FxHashSet<String> {
        let mut staff = self.admins(include_super);
        staff.extend(self.descriptor.tutors.iter().cloned());
        staff
    }

    fn is_staff(&self, username: &str) -> bool {
        self.descriptor.admins.iter().any(|admin| admin == username)
            || self.descriptor.tutors.iter().any(|tutor| tutor == username)
            || self.context.config.superadmins.iter().any(|admin| admin == username)
    }

    /// True if the course is open to users outside its staff right now.
    #[must_use]
    pub fn is_open_to_non_staff(&self) -> bool {
        self.descriptor.accessible.is_open()
    }

    #[must_use]
    pub const fn is_password_needed(&self) -> bool {
        self.descriptor.registration_password.is_some()
    }

    #[must_use]
    pub fn registration_password(&self) -> Option<&str> {
        self.descriptor.registration_password.as_deref()
    }

    #[must_use]
    pub const fn accessibility(&self) -> &AccessibleTime {
        &self.descriptor.accessible
    }

    #[must_use]
    pub const fn registration_accessibility(&self) -> &AccessibleTime {
        &self.descriptor.registration
    }

    #[must_use]
    pub const fn access_control_method(&self) -> AccessControlMethod {
        self.descriptor.access_control.method()
    }

    #[must_use]
    pub fn access_control_list(&self) -> &[String] {
        self.descriptor.access_control.list()
    }

    #[must_use]
    pub const fn access_control(&self) -> &AccessControl {
        &self.descriptor.access_control
    }

    /// True if submissions are made by groups.
    #[must_use]
    pub const fn is_group_course(&self) -> bool {
        self.descriptor.groups
    }

    #[must_use]
    pub const fn can_students_choose_group(&self) -> bool {
        self.descriptor.groups_student_choice
    }

    /// Tasks sorted by display order.
    #[must_use]
    pub fn tasks(&self) -> Vec<(String, Arc<dyn Task>)> {
        task::ordered(&self.tasks)
    }
}

impl<S: CourseStore, U: UserDirectory> Course<S, U> {
    /// True if `username` may see the course: staff always can, other users need
    /// the course to be open and a registration (and a group when `check_group` is set).
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn is_open_to_user(
        &self,
        username: &str,
        check_group: bool,
    ) -> Result<bool, CourseError> {
        if self.is_staff(username) {
            return Ok(true);
        }
        if !self.descriptor.accessible.is_open() {
            return Ok(false);
        }
        self.is_user_registered(username, check_group).await
    }

    /// True if `username` is staff or has registered, and is in a group when
    /// `check_group` is set.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn is_user_registered(
        &self,
        username: &str,
        check_group: bool,
    ) -> Result<bool, CourseError> {
        if self.is_staff(username) {
            return Ok(true);
        }
        if !self.context.store.is_registered(&self.id, username).await? {
            return Ok(false);
        }
        if !check_group {
            return Ok(true);
        }
        Ok(self.context.store.find_group_with_member(&self.id, username).await?.is_some())
    }

    /// True if the course and its registration are open and `username` passes
    /// access control.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn is_registration_possible(&self, username: &str) -> Result<bool, CourseError> {
        if !self.descriptor.accessible.is_open() || !self.descriptor.registration.is_open() {
            return Ok(false);
        }
        self.is_user_accepted_by_access_control(username).await
    }

    /// # Errors
    /// Propagates store failures.
    pub async fn is_user_accepted_by_access_control(
        &self,
        username: &str,
    ) -> Result<bool, CourseError> {
        let acl = &self.descriptor.access_control;
        let profile =
            if acl.needs_profile() { self.context.users.profile(username).await? } else { None };
        Ok(acl.accepts(username, profile.as_ref()))
    }

    /// Registers `username` to the course.
    ///
    /// Unless `force` is set, registration must be possible for the user and the
    /// supplied password must equal the configured one. Users who can already see the
    /// course are not registered again.
    ///
    /// Returns whether a registration was recorded.
    ///
    /// # Errors
    /// Propagates store failures.
    #[instrument(skip(self, password), fields(course = %self.id))]
    pub async fn register_user(
        &self,
        username: &str,
        password: Option<&str>,
        force: bool,
    ) -> Result<bool, CourseError> {
        if !force {
            if !self.is_registration_possible(username).await? {
                debug!("Registration refused: closed or not allowed by access control");
                return Ok(false);
            }
            if self.is_password_needed() && self.registration_password() != password {
                debug!("Registration refused: wrong password");
                return Ok(false);
            }
        }

        // Not atomic with the insert below; concurrent calls may both register.
        if self.is_open_to_user(username, false).await? {
            debug!("Registration refused: already registered or staff");
            return Ok(false);
        }

        self.context.store.insert_registration(&self.id, username).await?;
        info!("User registered");
        Ok(true)
    }

    /// Removes the registration of `username`, and their group membership in group
    /// courses. Does nothing for users who never registered.
    ///
    /// # Errors
    /// Propagates store failures.
    #[instrument(skip(self), fields(course = %self.id))]
    pub async fn unregister_user(&self, username: &str) -> Result<(), CourseError> {
        self.context.store.remove_registration(&self.id, username).await?;
        if self.is_group_course() {
            self.context.store.remove_group_member(&self.id, username).await?;
        }
        info!("User unregistered");
        Ok(())
    }

    /// Usernames registered to the course, with the staff (super-administrators
    /// included) when `with_admins` is set. Unordered and deduplicated when staff is added.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn registered_users(&self, with_admins: bool) -> Result<Vec<String>, CourseError> {
        let registered = self.context.store.registered_usernames(&self.id).await?;
        if !with_admins {
            return Ok(registered);
        }

        let mut users = self.staff(true);
        users.extend(registered);
        Ok(users.into_iter().collect())
    }

    /// # Errors
    /// Propagates store failures.
    pub async fn user_group(&self, username: &str) -> Result<Option<CourseGroup>, CourseError> {
        self.context.store.find_group_with_member(&self.id, username).await
    }

    /// Groups of the course sorted by description.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn groups(&self) -> Result<Vec<CourseGroup>, CourseError> {
        self.context.store.groups(&self.id).await
    }

    /// Integer percentage of the course tasks `username` succeeded.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn user_completion_percentage(&self, username: &str) -> Result<u32, CourseError> {
        let stats = self.context.users.course_stats(username, &self.id).await?;
        Ok(grades::completion_percentage(stats.as_ref()))
    }

    /// Weighted average grade (0 to 100) of `username` over the tasks they can see.
    ///
    /// # Errors
    /// Propagates store failures.
    pub async fn user_grade(&self, username: &str) -> Result<f64, CourseError> {
        let stats = self.context.users.course_stats(username, &self.id).await?;
        Ok(grades::weighted_grade(stats.as_ref(), &self.tasks(), username))
    }
}
