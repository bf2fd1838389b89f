use chrono::{Duration, Utc};
use notebridge::config::ChatConfig;
use notebridge::db::Database;
use notebridge::models::{CreateChatRequest, NewUser, PageRequest, Role, User};
use notebridge::service::ChatService;
use tempfile::TempDir;

struct Fixture {
    _dir: TempDir,
    db: Database,
    chats: ChatService,
    teacher: User,
    student: User,
    outsider: User,
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
    .unwrap()
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("chat.db").to_str().unwrap()).unwrap();
    let chats = ChatService::new(
        db.clone(),
        &ChatConfig {
            default_page_size: 20,
            max_page_size: 100,
        },
    );
    let teacher = add_user(&db, "teacher", Role::Teacher);
    let student = add_user(&db, "student", Role::Student);
    let outsider = add_user(&db, "outsider", Role::Student);
    Fixture {
        _dir: dir,
        db,
        chats,
        teacher,
        student,
        outsider,
    }
}

#[test]
fn test_create_chat_twice_returns_same_chat() {
    let f = fixture();
    let now = Utc::now();

    let first = f.chats.create_or_get_chat(f.teacher.id, f.student.id, "Piano", now).unwrap();
    let second = f.chats.create_or_get_chat(f.teacher.id, f.student.id, "Piano", now).unwrap();
    assert_eq!(first.id, second.id);
}

#[test]
fn test_changed_subject_is_stored() {
    let f = fixture();
    let now = Utc::now();

    let first = f.chats.create_or_get_chat(f.teacher.id, f.student.id, "Piano", now).unwrap();
    let second = f.chats.create_or_get_chat(f.teacher.id, f.student.id, "Jazz piano", now).unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.subject, "Jazz piano");

    let stored = f.db.find_chat(first.id).unwrap().unwrap();
    assert_eq!(stored.subject, "Jazz piano");
}

#[test]
fn test_role_mismatch_and_unknown_users() {
    let f = fixture();
    let now = Utc::now();

    // Swapped roles
    let err = f.chats.create_or_get_chat(f.student.id, f.teacher.id, "Piano", now).unwrap_err();
    assert_eq!(err.status_code(), 400);

    let err = f.chats.create_or_get_chat(9999, f.student.id, "Piano", now).unwrap_err();
    assert_eq!(err.status_code(), 404);

    let err = f.chats.create_or_get_chat(f.teacher.id, 9999, "Piano", now).unwrap_err();
    assert_eq!(err.status_code(), 404);

    let err = f.chats.create_or_get_chat(f.teacher.id, f.student.id, "  ", now).unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[test]
fn test_open_chat_requires_caller_to_be_a_party() {
    let f = fixture();
    let request = CreateChatRequest {
        teacher_id: Some(f.teacher.id),
        student_id: Some(f.student.id),
        subject: Some("Piano".to_string()),
    };

    let err = f.chats.open_chat(&f.outsider, request.clone(), Utc::now()).unwrap_err();
    assert_eq!(err.status_code(), 403);

    let chat = f.chats.open_chat(&f.student, request, Utc::now()).unwrap();
    assert!(chat.is_participant(f.student.id));
}

#[test]
fn test_send_message_updates_recency() {
    let f = fixture();
    let created = Utc::now();
    let chat = f.chats.create_or_get_chat(f.teacher.id, f.student.id, "Piano", created).unwrap();

    let sent_at = created + Duration::minutes(3);
    let message = f.chats.send_message(&f.student, chat.id, "When is the next lesson?", sent_at).unwrap();
    assert_eq!(message.sender_id, f.student.id);
    assert_eq!(message.sent_at, sent_at);

    let chat = f.db.find_chat(chat.id).unwrap().unwrap();
    assert_eq!(chat.last_message_at, sent_at);
}

#[test]
fn test_non_participant_cannot_send() {
    let f = fixture();
    let chat = f
        .chats
        .create_or_get_chat(f.teacher.id, f.student.id, "Piano", Utc::now())
        .unwrap();

    let err = f.chats.send_message(&f.outsider, chat.id, "hi", Utc::now()).unwrap_err();
    assert_eq!(err.status_code(), 403);

    let err = f.chats.send_message(&f.student, 9999, "hi", Utc::now()).unwrap_err();
    assert_eq!(err.status_code(), 404);

    let err = f.chats.send_message(&f.student, chat.id, "   ", Utc::now()).unwrap_err();
    assert_eq!(err.status_code(), 400);
}

#[test]
fn test_mark_as_read_only_flips_other_side() {
    let f = fixture();
    let now = Utc::now();
    let chat = f.chats.create_or_get_chat(f.teacher.id, f.student.id, "Piano", now).unwrap();

    f.chats.send_message(&f.student, chat.id, "question", now).unwrap();
    f.chats.send_message(&f.teacher, chat.id, "answer", now + Duration::seconds(1)).unwrap();

    assert_eq!(f.chats.mark_as_read(&f.teacher, chat.id).unwrap(), 1);

    let page = f.chats.get_messages(&f.teacher, chat.id, PageRequest::default()).unwrap();
    for message in page.content {
        if message.sender_id == f.student.id {
            assert!(message.is_read);
        } else {
            assert!(!message.is_read, "own messages stay unread");
        }
    }

    assert_eq!(f.chats.unread_count(&f.student).unwrap(), 1);
    assert_eq!(f.chats.unread_count(&f.teacher).unwrap(), 0);

    let err = f.chats.mark_as_read(&f.outsider, chat.id).unwrap_err();
    assert_eq!(err.status_code(), 403);
}

#[test]
fn test_message_pagination() {
    let f = fixture();
    let now = Utc::now();
    let chat = f.chats.create_or_get_chat(f.teacher.id, f.student.id, "Piano", now).unwrap();
    for i in 0..25 {
        f.chats
            .send_message(&f.student, chat.id, &format!("message {i}"), now + Duration::seconds(i))
            .unwrap();
    }

    let first = f.chats.get_messages(&f.student, chat.id, PageRequest::default()).unwrap();
    assert_eq!(first.size, 20);
    assert_eq!(first.total_elements, 25);
    assert_eq!(first.total_pages, 2);
    assert_eq!(first.content[0].content, "message 24");

    let second = f
        .chats
        .get_messages(&f.student, chat.id, PageRequest { page: Some(1), size: None })
        .unwrap();
    assert_eq!(second.content.len(), 5);

    let err = f
        .chats
        .get_messages(&f.student, chat.id, PageRequest { page: None, size: Some(0) })
        .unwrap_err();
    assert_eq!(err.status_code(), 400);

    let err = f.chats.get_messages(&f.outsider, chat.id, PageRequest::default()).unwrap_err();
    assert_eq!(err.status_code(), 403);
}

#[test]
fn test_list_chats_includes_unread_counts() {
    let f = fixture();
    let now = Utc::now();
    let chat = f.chats.create_or_get_chat(f.teacher.id, f.student.id, "Piano", now).unwrap();
    f.chats.send_message(&f.student, chat.id, "one", now).unwrap();
    f.chats.send_message(&f.student, chat.id, "two", now).unwrap();

    let chats = f.chats.list_chats(&f.teacher).unwrap();
    assert_eq!(chats.len(), 1);
    assert_eq!(chats[0].chat.id, chat.id);
    assert_eq!(chats[0].unread_count, 2);

    assert!(f.chats.list_chats(&f.outsider).unwrap().is_empty());
}
