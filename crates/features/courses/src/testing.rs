//! In-memory collaborators for unit tests.

use crate::error::CourseError;
use crate::store::{CourseStore, UserDirectory};
use crate::task::Task;
use fxhash::FxHashMap;
use lyceum_kernel::domain::course::{CourseGroup, CourseStats, UserProfile};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Default)]
struct StoreState {
    registrations: Vec<(String, String)>,
    groups: Vec<CourseGroup>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryStore {
    state: Arc<Mutex<StoreState>>,
}

impl MemoryStore {
    pub(crate) fn add_group(&self, course_id: &str, description: &str, users: &[&str]) {
        self.state.lock().groups.push(CourseGroup {
            course_id: course_id.to_owned(),
            description: description.to_owned(),
            users: users.iter().map(|user| (*user).to_owned()).collect(),
        });
    }

    pub(crate) fn registration_count(&self, course_id: &str, username: &str) -> usize {
        self.state
            .lock()
            .registrations
            .iter()
            .filter(|(course, user)| course == course_id && user == username)
            .count()
    }
}

impl CourseStore for MemoryStore {
    async fn insert_registration(&self, course_id: &str, username: &str) -> Result<(), CourseError> {
        self.state.lock().registrations.push((course_id.to_owned(), username.to_owned()));
        Ok(())
    }

    async fn remove_registration(&self, course_id: &str, username: &str) -> Result<(), CourseError> {
        self.state.lock().registrations.retain(|(course, user)| course != course_id || user != username);
        Ok(())
    }

    async fn is_registered(&self, course_id: &str, username: &str) -> Result<bool, CourseError> {
        Ok(self.registration_count(course_id, username) > 0)
    }

    async fn registered_usernames(&self, course_id: &str) -> Result<Vec<String>, CourseError> {
        Ok(self
            .state
            .lock()
            .registrations
            .iter()
            .filter(|(course, _)| course == course_id)
            .map(|(_, user)| user.clone())
            .collect())
    }

    async fn find_group_with_member(
        &self,
        course_id: &str,
        username: &str,
    ) -> Result<Option<CourseGroup>, CourseError> {
        Ok(self
            .state
            .lock()
            .groups
            .iter()
            .find(|group| group.course_id == course_id && group.has_member(username))
            .cloned())
    }

    async fn remove_group_member(&self, course_id: &str, username: &str) -> Result<(), CourseError> {
        for group in self.state.lock().groups.iter_mut().filter(|group| group.course_id == course_id) {
            group.users.retain(|user| user != username);
        }
        Ok(())
    }

    async fn groups(&self, course_id: &str) -> Result<Vec<CourseGroup>, CourseError> {
        let mut groups: Vec<_> = self
            .state
            .lock()
            .groups
            .iter()
            .filter(|group| group.course_id == course_id)
            .cloned()
            .collect();
        groups.sort_by(|a, b| a.description.cmp(&b.description));
        Ok(groups)
    }
}

#[derive(Debug, Default)]
struct UsersState {
    stats: FxHashMap<(String, String), CourseStats>,
    profiles: FxHashMap<String, UserProfile>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryUsers {
    state: Arc<Mutex<UsersState>>,
}

impl MemoryUsers {
    pub(crate) fn set_stats(&self, username: &str, course_id: &str, stats: CourseStats) {
        self.state.lock().stats.insert((username.to_owned(), course_id.to_owned()), stats);
    }

    pub(crate) fn set_profile(&self, username: &str, profile: UserProfile) {
        self.state.lock().profiles.insert(username.to_owned(), profile);
    }
}

impl UserDirectory for MemoryUsers {
    async fn course_stats(
        &self,
        username: &str,
        course_id: &str,
    ) -> Result<Option<CourseStats>, CourseError> {
        Ok(self.state.lock().stats.get(&(username.to_owned(), course_id.to_owned())).cloned())
    }

    async fn profile(&self, username: &str) -> Result<Option<UserProfile>, CourseError> {
        Ok(self.state.lock().profiles.get(username).cloned())
    }
}

/// Task with a fixed weight and order, visible to everybody unless hidden.
#[derive(Debug)]
pub(crate) struct FixedTask {
    weight: f64,
    order: i64,
    visible: bool,
}

impl FixedTask {
    pub(crate) const fn new(weight: f64, order: i64) -> Self {
        Self { weight, order, visible: true }
    }

    pub(crate) const fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub(crate) fn shared(self) -> Arc<dyn Task> {
        Arc::new(self)
    }
}

impl Task for FixedTask {
    fn is_visible_by_user(&self, _username: &str) -> bool {
        self.visible
    }

    fn grading_weight(&self) -> f64 {
        self.weight
    }

    fn order(&self) -> i64 {
        self.order
    }
}
