use std::collections::BTreeMap;
use std::fmt::Debug;
use std::sync::Arc;

/// What the policy layer needs to know about a task of the course.
pub trait Task: Debug + Send + Sync {
    /// True if `username` can see the task.
    fn is_visible_by_user(&self, username: &str) -> bool;

    /// Weight of the task in the course grade.
    fn grading_weight(&self) -> f64;

    /// Display position; lower comes first.
    fn order(&self) -> i64;
}

/// Tasks of a course keyed by task id.
pub type TaskSet = BTreeMap<String, Arc<dyn Task>>;

/// Tasks sorted by display order. Ties keep task id order.
#[must_use]
pub(crate) fn ordered(tasks: &TaskSet) -> Vec<(String, Arc<dyn Task>)> {
    let mut sorted: Vec<_> = tasks.iter().map(|(id, task)| (id.clone(), Arc::clone(task))).collect();
    sorted.sort_by_key(|(_, task)| task.order());
    sorted
}
