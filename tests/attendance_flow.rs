use school_attendance::gateway::{AttendanceGateway, DirectoryGateway};
use school_attendance::models::{NewClass, NewUser, Role, Status};
use school_attendance::sqlite::SqliteGateway;
use school_attendance::writer::MarkRequest;
use school_attendance::{AttendanceError, AttendanceManager, Session, User};
use std::thread;
use std::time::Duration;

struct School {
    manager: AttendanceManager,
    admin: Session,
    teacher: Session,
    other_teacher: Session,
    ada: User,
    bob: User,
    class_id: String,
}

fn user(gateway: &mut SqliteGateway, name: &str, email: &str, role: Role) -> User {
    gateway
        .insert_user(&NewUser {
            email: email.to_string(),
            name: name.to_string(),
            role,
        })
        .expect("insert user")
}

fn school() -> School {
    let mut gateway = SqliteGateway::open(":memory:").expect("open in-memory database");
    let admin = user(&mut gateway, "Admin", "admin@school.test", Role::Admin);
    let teacher = user(&mut gateway, "Ms Teach", "teach@school.test", Role::Teacher);
    let other = user(&mut gateway, "Mr Other", "other@school.test", Role::Teacher);
    let ada = user(&mut gateway, "Ada", "ada@school.test", Role::Student);
    let bob = user(&mut gateway, "Bob", "bob@school.test", Role::Student);

    let mut manager = AttendanceManager::new(gateway);
    let admin = Session::new(admin);

    let class = manager
        .add_class(
            &admin,
            NewClass {
                name: "Algebra".into(),
                description: "Period 1".into(),
                teacher_id: teacher.id.clone(),
            },
        )
        .expect("add class");
    assert!(manager.enroll(&admin, &ada.id, &class.id).expect("enroll ada"));
    assert!(manager.enroll(&admin, &bob.id, &class.id).expect("enroll bob"));

    School {
        manager,
        admin,
        teacher: Session::new(teacher),
        other_teacher: Session::new(other),
        ada,
        bob,
        class_id: class.id,
    }
}

fn mark(school: &mut School, student: &User, date: &str, status: &str) -> Status {
    let request = MarkRequest::new(&student.id, &school.class_id, date, status);
    let teacher = school.teacher.clone();
    school
        .manager
        .mark(&teacher, &request)
        .expect("mark attendance")
        .status
}

#[test]
fn roster_shows_unmarked_students() {
    let mut school = school();
    let ada = school.ada.clone();
    mark(&mut school, &ada, "2024-01-15", "present");

    let roster = school
        .manager
        .class_roster(&school.teacher, &school.class_id, "2024-01-15")
        .unwrap();

    assert_eq!(roster.entries.len(), 2);
    let ada = roster
        .entries
        .iter()
        .find(|e| e.student_id == school.ada.id)
        .unwrap();
    let bob = roster
        .entries
        .iter()
        .find(|e| e.student_id == school.bob.id)
        .unwrap();
    assert_eq!(ada.status, Some(Status::Present));
    assert_eq!(bob.status, None);
    assert!(roster.warnings.is_empty());
}

#[test]
fn marking_twice_is_idempotent() {
    let mut school = school();
    let ada = school.ada.clone();

    mark(&mut school, &ada, "2024-01-15", "late");
    let once = school
        .manager
        .gateway_mut()
        .fetch_attendance_history(&ada.id, None)
        .unwrap();

    // Long enough for a fresh write to carry a different timestamp.
    thread::sleep(Duration::from_millis(5));
    mark(&mut school, &ada, "2024-01-15", "late");
    let twice = school
        .manager
        .gateway_mut()
        .fetch_attendance_history(&ada.id, None)
        .unwrap();

    assert_eq!(once.len(), 1);
    assert_eq!(once[0].status, Status::Late);
    assert_eq!(once, twice);
}

#[test]
fn identical_upsert_returns_the_stored_record_unchanged() {
    let mut school = school();
    let ada = school.ada.clone();
    let teacher = school.teacher.clone();
    let request = MarkRequest::new(&ada.id, &school.class_id, "2024-01-15", "present");
    let mark = request.validate(&teacher).unwrap();

    let gateway = school.manager.gateway_mut();
    let first = gateway.upsert_attendance(&mark).unwrap();
    thread::sleep(Duration::from_millis(5));
    let second = gateway.upsert_attendance(&mark).unwrap();
    assert_eq!(first, second);

    let changed = MarkRequest::new(&ada.id, &school.class_id, "2024-01-15", "late")
        .validate(&teacher)
        .unwrap();
    thread::sleep(Duration::from_millis(5));
    let third = gateway.upsert_attendance(&changed).unwrap();
    assert_eq!(third.status, Status::Late);
    assert!(third.recorded_at > first.recorded_at);
}

#[test]
fn last_write_wins() {
    let mut school = school();
    let ada = school.ada.clone();

    assert_eq!(mark(&mut school, &ada, "2024-01-15", "present"), Status::Present);
    assert_eq!(mark(&mut school, &ada, "2024-01-15", "absent"), Status::Absent);

    let date = school_attendance::models::parse_date("2024-01-15").unwrap();
    let class_id = school.class_id.clone();
    let records = school
        .manager
        .gateway_mut()
        .fetch_attendance(&class_id, date)
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, Status::Absent);
}

#[test]
fn invalid_marks_store_nothing() {
    let mut school = school();
    let teacher = school.teacher.clone();
    let ada = school.ada.clone();

    let bad_date = MarkRequest::new(&ada.id, &school.class_id, "2024-13-01", "present");
    assert!(matches!(
        school.manager.mark(&teacher, &bad_date),
        Err(AttendanceError::InvalidDate(_))
    ));

    let bad_status = MarkRequest::new(&ada.id, &school.class_id, "2024-01-15", "excused");
    assert!(matches!(
        school.manager.mark(&teacher, &bad_status),
        Err(AttendanceError::InvalidStatus(_))
    ));

    let history = school.manager.student_history(&teacher, &ada.id, None).unwrap();
    assert!(history.records.is_empty());
}

#[test]
fn only_the_class_teacher_or_an_admin_may_mark() {
    let mut school = school();
    let ada = school.ada.clone();
    let request = MarkRequest::new(&ada.id, &school.class_id, "2024-01-15", "present");

    let other = school.other_teacher.clone();
    assert!(matches!(
        school.manager.mark(&other, &request),
        Err(AttendanceError::Unauthorized { .. })
    ));

    let student = Session::new(ada.clone());
    assert!(matches!(
        school.manager.mark(&student, &request),
        Err(AttendanceError::Unauthorized { .. })
    ));

    let admin = school.admin.clone();
    let record = school.manager.mark(&admin, &request).unwrap();
    assert_eq!(record.recorded_by, admin.user_id());
}

#[test]
fn history_is_newest_first_with_a_summary() {
    let mut school = school();
    let ada = school.ada.clone();

    mark(&mut school, &ada, "2024-01-15", "present");
    mark(&mut school, &ada, "2024-01-16", "present");
    mark(&mut school, &ada, "2024-01-17", "present");
    mark(&mut school, &ada, "2024-01-18", "absent");

    let me = Session::new(ada.clone());
    let history = school.manager.student_history(&me, &ada.id, None).unwrap();

    let dates: Vec<String> = history
        .records
        .iter()
        .map(|r| school_attendance::models::format_date(r.date))
        .collect();
    assert_eq!(dates, ["2024-01-18", "2024-01-17", "2024-01-16", "2024-01-15"]);
    assert_eq!(history.summary.total, 4);
    assert_eq!(history.summary.rate_percent, 75);

    let trend = school
        .manager
        .student_trend(&me, &ada.id, None, "2024-01-18", 2)
        .unwrap();
    assert_eq!(trend.len(), 2);
    assert_eq!(trend[0].present, 1);
    assert_eq!(trend[1].absent, 1);
}

#[test]
fn students_cannot_read_each_other() {
    let mut school = school();
    let ada = Session::new(school.ada.clone());
    let bob_id = school.bob.id.clone();

    assert!(matches!(
        school.manager.student_history(&ada, &bob_id, None),
        Err(AttendanceError::Unauthorized { .. })
    ));
}

#[test]
fn admin_directory_management() {
    let mut school = school();
    let admin = school.admin.clone();

    let carol = school
        .manager
        .add_user(
            &admin,
            NewUser {
                email: " carol@school.test ".into(),
                name: "Carol".into(),
                role: Role::Student,
            },
        )
        .unwrap();
    assert_eq!(carol.email, "carol@school.test");

    let duplicate = school.manager.add_user(
        &admin,
        NewUser {
            email: "carol@school.test".into(),
            name: "Carol Again".into(),
            role: Role::Student,
        },
    );
    assert!(matches!(duplicate, Err(AttendanceError::InvalidArgument(_))));

    let class_id = school.class_id.clone();
    assert!(school.manager.enroll(&admin, &carol.id, &class_id).unwrap());
    assert!(!school.manager.enroll(&admin, &carol.id, &class_id).unwrap());

    let classes = school.manager.list_classes(&admin).unwrap();
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].teacher_name, "Ms Teach");
    assert_eq!(classes[0].student_count, 3);

    let overview = school.manager.overview(&admin).unwrap();
    assert_eq!(overview.total_users, 6);
    assert_eq!(overview.total_students, 3);
    assert_eq!(overview.total_teachers, 2);
    assert_eq!(overview.total_classes, 1);

    let teacher = school.teacher.clone();
    assert!(matches!(
        school.manager.list_users(&teacher),
        Err(AttendanceError::Unauthorized { .. })
    ));
}

#[test]
fn classes_need_a_real_teacher() {
    let mut school = school();
    let admin = school.admin.clone();
    let ada_id = school.ada.id.clone();

    let result = school.manager.add_class(
        &admin,
        NewClass {
            name: "Biology".into(),
            description: String::new(),
            teacher_id: ada_id,
        },
    );
    assert!(matches!(result, Err(AttendanceError::InvalidArgument(_))));
}

#[test]
fn sign_in_resolves_known_emails_only() {
    let mut school = school();

    let session = school.manager.sign_in("teach@school.test").unwrap();
    assert_eq!(session.role(), Role::Teacher);

    assert!(matches!(
        school.manager.sign_in("nobody@school.test"),
        Err(AttendanceError::NotFound(_))
    ));
}

#[test]
fn my_classes_depends_on_role() {
    let mut school = school();

    let teacher = school.teacher.clone();
    let taught = school.manager.my_classes(&teacher).unwrap();
    assert_eq!(taught.len(), 1);
    assert_eq!(taught[0].student_count, 2);

    let other = school.other_teacher.clone();
    assert!(school.manager.my_classes(&other).unwrap().is_empty());

    let ada = Session::new(school.ada.clone());
    let enrolled = school.manager.my_classes(&ada).unwrap();
    assert_eq!(enrolled.len(), 1);
    assert_eq!(enrolled[0].teacher_name, "Ms Teach");
}

#[test]
fn roster_access_does_not_reveal_which_classes_exist() {
    let mut school = school();
    let ada = Session::new(school.ada.clone());
    let other = school.other_teacher.clone();
    let admin = school.admin.clone();
    let class_id = school.class_id.clone();

    for session in [&ada, &other] {
        for id in [class_id.as_str(), "no-such-class"] {
            assert!(matches!(
                school.manager.class_roster(session, id, "2024-01-15"),
                Err(AttendanceError::Unauthorized { .. })
            ));
        }
    }

    assert!(matches!(
        school.manager.class_roster(&admin, "no-such-class", "2024-01-15"),
        Err(AttendanceError::NotFound(_))
    ));
}
