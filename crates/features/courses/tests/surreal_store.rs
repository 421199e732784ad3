#![cfg(feature = "server")]

use lyceum_courses::{Course, CourseStore, SurrealCourse, UserDirectory, init};
use lyceum_database::Database;
use lyceum_kernel::domain::config::PlatformConfig;
use serde_json::json;

async fn database() -> Database {
    Database::builder().url("mem://").session("lyceum", "courses").init().await.unwrap()
}

async fn seed(db: &Database, query: &str) {
    db.query(query).await.unwrap().check().unwrap();
}

fn course(db: &Database, content: &serde_json::Value) -> SurrealCourse {
    let context = init(&PlatformConfig::with_superadmins(["root"]), db);
    Course::new("algo101", content, context).unwrap()
}

#[tokio::test]
async fn registration_is_persisted() {
    let db = database().await;
    let course = course(&db, &json!({ "name": "Algorithms", "admins": ["ada"] }));

    assert!(course.register_user("alice", None, false).await.unwrap());
    assert!(!course.register_user("alice", None, false).await.unwrap());
    assert!(course.is_user_registered("alice", false).await.unwrap());

    let mut users = course.registered_users(true).await.unwrap();
    users.sort();
    assert_eq!(users, ["ada", "alice", "root"]);

    course.unregister_user("alice").await.unwrap();
    assert!(!course.is_user_registered("alice", false).await.unwrap());
    assert!(course.registered_users(false).await.unwrap().is_empty());
}

#[tokio::test]
async fn registrations_are_scoped_to_their_course() {
    let db = database().await;
    let context = init(&PlatformConfig::default(), &db);

    context.store().insert_registration("algo101", "alice").await.unwrap();
    context.store().insert_registration("db202", "bob").await.unwrap();

    assert!(context.store().is_registered("algo101", "alice").await.unwrap());
    assert!(!context.store().is_registered("algo101", "bob").await.unwrap());
    assert_eq!(context.store().registered_usernames("db202").await.unwrap(), ["bob"]);
}

#[tokio::test]
async fn groups_are_sorted_and_pruned() {
    let db = database().await;
    seed(
        &db,
        "CREATE groups CONTENT { course_id: 'algo101', description: 'Team B', users: ['bob'] };
         CREATE groups CONTENT { course_id: 'algo101', description: 'Team A', users: ['alice', 'carol'] };
         CREATE groups CONTENT { course_id: 'db202', description: 'Team 0', users: ['alice'] };",
    )
    .await;
    let course = course(&db, &json!({ "name": "Algorithms", "admins": [], "groups": true }));

    let descriptions: Vec<_> =
        course.groups().await.unwrap().into_iter().map(|group| group.description).collect();
    assert_eq!(descriptions, ["Team A", "Team B"]);

    course.register_user("alice", None, false).await.unwrap();
    assert!(course.is_user_registered("alice", true).await.unwrap());

    course.unregister_user("alice").await.unwrap();
    assert!(course.user_group("alice").await.unwrap().is_none());
    assert_eq!(course.user_group("carol").await.unwrap().unwrap().users, ["carol"]);

    // Groups of other courses keep their members.
    let context = init(&PlatformConfig::default(), &db);
    assert!(context.store().find_group_with_member("db202", "alice").await.unwrap().is_some());
}

#[tokio::test]
async fn statistics_and_profiles_are_read() {
    let db = database().await;
    seed(
        &db,
        "CREATE user_course CONTENT {
             username: 'alice',
             courseid: 'algo101',
             total_tasks: 4,
             task_succeeded: 3,
             task_grades: { t1: 50.0, t2: 100.0 }
         };
         CREATE user_profile CONTENT {
             username: 'alice',
             realname: 'Alice Liddell',
             email: 'alice@example.org'
         };",
    )
    .await;
    let context = init(&PlatformConfig::default(), &db);

    let stats = context.users().course_stats("alice", "algo101").await.unwrap().unwrap();
    assert_eq!(stats.total_tasks, 4);
    assert_eq!(stats.task_succeeded, 3);
    assert_eq!(stats.task_grades.get("t2").copied(), Some(100.0));
    assert!(context.users().course_stats("alice", "db202").await.unwrap().is_none());

    let profile = context.users().profile("alice").await.unwrap().unwrap();
    assert_eq!(profile.email, "alice@example.org");
    assert!(context.users().profile("bob").await.unwrap().is_none());

    let course = course(
        &db,
        &json!({
            "name": "Algorithms",
            "admins": [],
            "registration_ac": "realname",
            "registration_ac_list": ["Alice Liddell"],
        }),
    );
    assert_eq!(course.user_completion_percentage("alice").await.unwrap(), 75);
    assert!(course.is_user_accepted_by_access_control("alice").await.unwrap());
    assert!(!course.is_user_accepted_by_access_control("bob").await.unwrap());
}

#[tokio::test]
async fn statistics_accept_integer_grades_and_float_counts() {
    let db = database().await;
    seed(
        &db,
        "CREATE user_course CONTENT {
             username: 'bob',
             courseid: 'algo101',
             total_tasks: 3.0,
             task_succeeded: 1.0,
             task_grades: { t1: 50, t2: 100 }
         };",
    )
    .await;
    let context = init(&PlatformConfig::default(), &db);

    let stats = context.users().course_stats("bob", "algo101").await.unwrap().unwrap();
    assert_eq!(stats.total_tasks, 3);
    assert_eq!(stats.task_succeeded, 1);
    assert_eq!(stats.task_grades.get("t1").copied(), Some(50.0));
    assert_eq!(stats.task_grades.get("t2").copied(), Some(100.0));

    let course = course(&db, &json!({ "name": "Algorithms", "admins": [] }));
    assert_eq!(course.user_completion_percentage("bob").await.unwrap(), 33);
}
