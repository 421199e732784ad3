//! Completion and grade aggregation over cached user statistics.

use crate::task::Task;
use lyceum_kernel::domain::course::CourseStats;
use std::sync::Arc;

/// Share of succeeded tasks, truncated to an integer percentage.
///
/// No statistics yields 0, a course without tasks yields 100.
#[must_use]
pub fn completion_percentage(stats: Option<&CourseStats>) -> u32 {
    let Some(stats) = stats else { return 0 };
    if stats.total_tasks == 0 {
        return 100;
    }

    let percent = u64::from(stats.task_succeeded) * 100 / u64::from(stats.total_tasks);
    u32::try_from(percent).unwrap_or(u32::MAX)
}

/// Weighted average of the grades of the tasks `username` can see.
///
/// Tasks without a recorded grade count as 0. Returns 0 when there are no statistics
/// or the visible tasks weigh nothing.
#[must_use]
pub fn weighted_grade(
    stats: Option<&CourseStats>,
    tasks: &[(String, Arc<dyn Task>)],
    username: &str,
) -> f64 {
    let Some(stats) = stats else { return 0.0 };

    let (grade, total_weight) = tasks
        .iter()
        .filter(|(_, task)| task.is_visible_by_user(username))
        .fold((0.0, 0.0), |(grade, weight), (id, task)| {
            let task_weight = task.grading_weight();
            let task_grade = stats.task_grades.get(id).copied().unwrap_or(0.0);
            (task_grade.mul_add(task_weight, grade), weight + task_weight)
        });

    if total_weight == 0.0 { 0.0 } else { grade / total_weight }
}
