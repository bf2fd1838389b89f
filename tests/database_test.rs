use chrono::{Duration, Utc};
use notebridge::db::Database;
use notebridge::models::{FileOwner, LessonQuery, LocationType, NewFileMetadata, NewLesson, NewUser, Role, User};
use tempfile::TempDir;

fn test_db() -> (TempDir, Database) {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_url = format!("sqlite://{}", dir.path().join("test.db").display());
    let db = Database::open(&db_url).expect("Failed to create database");
    (dir, db)
}

fn add_user(db: &Database, username: &str, role: Role) -> User {
    db.insert_user(&NewUser {
        username: username.to_string(),
        password_hash: "$argon2id$placeholder".to_string(),
        email: format!("{username}@example.com"),
        role,
        instrument: None,
        bio: None,
        first_name: None,
        last_name: None,
        phone_number: None,
    })
    .expect("Failed to add user")
}

fn new_lesson(teacher_id: i64, hours_from_now: i64) -> NewLesson {
    let start_time = Utc::now() + Duration::hours(hours_from_now);
    NewLesson {
        teacher_id,
        description: Some("Scales".to_string()),
        location: LocationType::Online,
        start_time,
        end_time: start_time + Duration::hours(1),
        meeting_link: Some("https://meet.example.com/abc".to_string()),
        physical_address: None,
    }
}

#[test]
fn test_database_creation_and_initialization() {
    let (_dir, db) = test_db();
    let _conn = db.get_connection().expect("Failed to get database connection");
}

#[test]
fn test_user_round_trip() {
    let (_dir, db) = test_db();
    let user = add_user(&db, "alice", Role::Teacher);

    let by_id = db.find_user(user.id).unwrap().expect("user by id");
    assert_eq!(by_id.username, "alice");
    assert_eq!(by_id.role, Role::Teacher);

    let by_name = db.find_user_by_username("alice").unwrap().expect("user by name");
    assert_eq!(by_name.id, user.id);
    assert!(db.find_user_by_email("alice@example.com").unwrap().is_some());
    assert!(db.find_user(9999).unwrap().is_none());
}

#[test]
fn test_duplicate_username_hits_constraint() {
    let (_dir, db) = test_db();
    add_user(&db, "alice", Role::Student);

    let err = db
        .insert_user(&NewUser {
            username: "alice".to_string(),
            password_hash: "x".to_string(),
            email: "other@example.com".to_string(),
            role: Role::Student,
            instrument: None,
            bio: None,
            first_name: None,
            last_name: None,
            phone_number: None,
        })
        .unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[test]
fn test_update_user_persists_fields() {
    let (_dir, db) = test_db();
    let mut user = add_user(&db, "bob", Role::Student);
    user.bio = Some("Learning cello".to_string());
    user.email = "bob@school.org".to_string();
    db.update_user(&user).unwrap();

    let stored = db.find_user(user.id).unwrap().unwrap();
    assert_eq!(stored.bio.as_deref(), Some("Learning cello"));
    assert_eq!(stored.email, "bob@school.org");
}

#[test]
fn test_lesson_queries() {
    let (_dir, db) = test_db();
    let t1 = add_user(&db, "teacher1", Role::Teacher);
    let t2 = add_user(&db, "teacher2", Role::Teacher);

    let later = db.insert_lesson(&new_lesson(t1.id, 48)).unwrap();
    let sooner = db.insert_lesson(&new_lesson(t1.id, 24)).unwrap();
    let other = db.insert_lesson(&new_lesson(t2.id, 72)).unwrap();

    let mut cancelled = other.clone();
    cancelled.is_cancelled = true;
    db.save_lesson(&cancelled).unwrap();

    let active = db.list_lessons(&LessonQuery::active()).unwrap();
    let ids: Vec<i64> = active.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![sooner.id, later.id]);

    assert_eq!(db.list_lessons(&LessonQuery::all()).unwrap().len(), 3);
    assert_eq!(db.list_lessons(&LessonQuery::active().teacher(t2.id)).unwrap().len(), 0);
    assert_eq!(db.list_lessons(&LessonQuery::all().teacher(t2.id)).unwrap().len(), 1);

    let after = Utc::now() + Duration::hours(36);
    let upcoming = db.list_lessons(&LessonQuery::active().starting_after(after)).unwrap();
    assert_eq!(upcoming.len(), 1);
    assert_eq!(upcoming[0].id, later.id);
}

#[test]
fn test_delete_lesson_detaches_files() {
    let (_dir, db) = test_db();
    let teacher = add_user(&db, "teacher1", Role::Teacher);
    let lesson = db.insert_lesson(&new_lesson(teacher.id, 24)).unwrap();

    assert!(db.file_owner_exists(FileOwner::Lesson(lesson.id)).unwrap());
    db.insert_file_metadata(&NewFileMetadata {
        unique_id: "file-1".to_string(),
        object_name: "abc_pic.png".to_string(),
        upload_date: Utc::now(),
        owner: FileOwner::Lesson(lesson.id),
    })
    .unwrap();

    assert_eq!(db.delete_lesson(lesson.id).unwrap(), 1);
    assert_eq!(db.delete_lesson(lesson.id).unwrap(), 0);
    assert!(!db.file_owner_exists(FileOwner::Lesson(lesson.id)).unwrap());

    let file = db.find_file_metadata("file-1").unwrap().expect("file survives");
    assert_eq!(file.lesson_id, None);
}

#[test]
fn test_file_metadata_round_trip() {
    let (_dir, db) = test_db();
    let user = add_user(&db, "carol", Role::Student);

    let saved = db
        .insert_file_metadata(&NewFileMetadata {
            unique_id: "handle".to_string(),
            object_name: "uuid_avatar.png".to_string(),
            upload_date: Utc::now(),
            owner: FileOwner::User(user.id),
        })
        .unwrap();
    assert_eq!(saved.user_id, Some(user.id));
    assert_eq!(saved.lesson_id, None);

    let found = db.find_file_metadata("handle").unwrap().unwrap();
    assert_eq!(found.object_name, "uuid_avatar.png");

    assert_eq!(db.delete_file_metadata("handle").unwrap(), 1);
    assert!(db.find_file_metadata("handle").unwrap().is_none());
    assert!(db.file_owner_exists(FileOwner::Unowned).unwrap());
    assert!(!db.file_owner_exists(FileOwner::User(4242)).unwrap());
}

#[test]
fn test_chat_pair_is_unique() {
    let (_dir, db) = test_db();
    let teacher = add_user(&db, "teacher1", Role::Teacher);
    let student = add_user(&db, "student1", Role::Student);
    let now = Utc::now();

    let first = db.insert_chat(teacher.id, student.id, "Piano", now).unwrap();
    let second = db.insert_chat(teacher.id, student.id, "Piano", now + Duration::minutes(5)).unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.created_at, first.created_at);
}

#[test]
fn test_conflicting_chat_insert_takes_new_subject() {
    let (_dir, db) = test_db();
    let teacher = add_user(&db, "teacher1", Role::Teacher);
    let student = add_user(&db, "student1", Role::Student);
    let now = Utc::now();

    // Two creators that both missed the pair lookup
    let first = db.insert_chat(teacher.id, student.id, "Piano", now).unwrap();
    let second = db.insert_chat(teacher.id, student.id, "Guitar", now + Duration::minutes(1)).unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.subject, "Guitar");
    assert_eq!(second.created_at, first.created_at);
    assert_eq!(second.last_message_at, first.last_message_at);

    let stored = db.find_chat(first.id).unwrap().unwrap();
    assert_eq!(stored.subject, "Guitar");
}

#[test]
fn test_message_insert_bumps_chat() {
    let (_dir, db) = test_db();
    let teacher = add_user(&db, "teacher1", Role::Teacher);
    let student = add_user(&db, "student1", Role::Student);
    let created = Utc::now();
    let chat = db.insert_chat(teacher.id, student.id, "Piano", created).unwrap();

    let sent_at = created + Duration::minutes(5);
    let message = db.insert_message(chat.id, student.id, "Hello", sent_at).unwrap();
    assert!(!message.is_read);

    let chat = db.find_chat(chat.id).unwrap().unwrap();
    assert_eq!(chat.last_message_at, sent_at);
}

#[test]
fn test_unread_counts_and_mark_read() {
    let (_dir, db) = test_db();
    let teacher = add_user(&db, "teacher1", Role::Teacher);
    let student = add_user(&db, "student1", Role::Student);
    let now = Utc::now();
    let chat = db.insert_chat(teacher.id, student.id, "Piano", now).unwrap();

    db.insert_message(chat.id, student.id, "one", now).unwrap();
    db.insert_message(chat.id, student.id, "two", now + Duration::seconds(1)).unwrap();
    db.insert_message(chat.id, teacher.id, "reply", now + Duration::seconds(2)).unwrap();

    assert_eq!(db.count_unread_for_user(teacher.id).unwrap(), 2);
    assert_eq!(db.count_unread_for_user(student.id).unwrap(), 1);
    assert_eq!(db.count_unread_in_chat(chat.id, teacher.id).unwrap(), 2);

    assert_eq!(db.mark_messages_read(chat.id, teacher.id).unwrap(), 2);
    assert_eq!(db.mark_messages_read(chat.id, teacher.id).unwrap(), 0);
    assert_eq!(db.count_unread_for_user(teacher.id).unwrap(), 0);
    assert_eq!(db.count_unread_for_user(student.id).unwrap(), 1);
}

#[test]
fn test_message_pages_newest_first() {
    let (_dir, db) = test_db();
    let teacher = add_user(&db, "teacher1", Role::Teacher);
    let student = add_user(&db, "student1", Role::Student);
    let now = Utc::now();
    let chat = db.insert_chat(teacher.id, student.id, "Piano", now).unwrap();

    for i in 0..5 {
        db.insert_message(chat.id, student.id, &format!("m{i}"), now + Duration::seconds(i))
            .unwrap();
    }

    let (first, total) = db.list_messages_page(chat.id, 0, 2).unwrap();
    assert_eq!(total, 5);
    let contents: Vec<&str> = first.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["m4", "m3"]);

    let (last, _) = db.list_messages_page(chat.id, 2, 2).unwrap();
    assert_eq!(last.len(), 1);
    assert_eq!(last[0].content, "m0");
}

#[test]
fn test_active_chats_ordered_by_recency() {
    let (_dir, db) = test_db();
    let teacher = add_user(&db, "teacher1", Role::Teacher);
    let s1 = add_user(&db, "student1", Role::Student);
    let s2 = add_user(&db, "student2", Role::Student);
    let now = Utc::now();

    let c1 = db.insert_chat(teacher.id, s1.id, "Piano", now).unwrap();
    let c2 = db.insert_chat(teacher.id, s2.id, "Violin", now + Duration::seconds(1)).unwrap();
    db.insert_message(c1.id, s1.id, "bump", now + Duration::seconds(10)).unwrap();

    let chats = db.list_active_chats_for_user(teacher.id).unwrap();
    let ids: Vec<i64> = chats.iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![c1.id, c2.id]);
    assert_eq!(db.list_active_chats_for_user(s2.id).unwrap().len(), 1);
}
