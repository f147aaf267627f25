// Copyright (C) 2026 Rollbook Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Role gating tests: mutations are Admin-only, reads need only a session.

use rollbook_domain::EnrollmentDraft;
use rollbook_persistence::Persistence;

use crate::auth::AuthorizationService;
use crate::error::{ApiError, AuthError};
use crate::records;
use crate::tests::{
    admin_user, course_draft, create_test_persistence, student_draft, teacher_user,
};

#[test]
fn test_role_predicates_are_exhaustive_over_both_roles() {
    assert!(AuthorizationService::require_admin(&admin_user(), "anything").is_ok());
    assert!(AuthorizationService::require_teacher(&teacher_user(), "anything").is_ok());

    let denied: AuthError =
        AuthorizationService::require_teacher(&admin_user(), "grade_entry").unwrap_err();
    match denied {
        AuthError::Unauthorized {
            action,
            required_role,
        } => {
            assert_eq!(action, "grade_entry");
            assert_eq!(required_role, "Teacher");
        }
        AuthError::AuthenticationFailed { .. } => panic!("Expected Unauthorized"),
    }
}

#[test]
fn test_teacher_cannot_create_a_student() {
    let mut persistence: Persistence = create_test_persistence();

    let result = records::create_student(&mut persistence, &teacher_user(), &student_draft("S100"));

    match result {
        Err(ApiError::Unauthorized { required_role, .. }) => {
            assert_eq!(required_role, "Admin");
        }
        other => panic!("Expected Unauthorized, got: {other:?}"),
    }
    // The rejected mutation must not have persisted anything.
    assert_eq!(persistence.count_students().unwrap(), 0);
}

#[test]
fn test_teacher_cannot_update_or_delete_records() {
    let mut persistence: Persistence = create_test_persistence();
    let admin = admin_user();
    let teacher = teacher_user();
    let student_id: i64 =
        records::create_student(&mut persistence, &admin, &student_draft("S100")).unwrap();
    let course_id: i64 =
        records::create_course(&mut persistence, &admin, &course_draft("CS101")).unwrap();

    assert!(matches!(
        records::update_student(&mut persistence, &teacher, student_id, &student_draft("S100")),
        Err(ApiError::Unauthorized { .. })
    ));
    assert!(matches!(
        records::delete_student(&mut persistence, &teacher, student_id),
        Err(ApiError::Unauthorized { .. })
    ));
    assert!(matches!(
        records::delete_course(&mut persistence, &teacher, course_id),
        Err(ApiError::Unauthorized { .. })
    ));
    assert!(matches!(
        records::create_enrollment(
            &mut persistence,
            &teacher,
            &EnrollmentDraft {
                student_id: Some(student_id),
                course_id: Some(course_id),
                grade: String::new(),
            }
        ),
        Err(ApiError::Unauthorized { .. })
    ));

    // Nothing was touched.
    assert_eq!(persistence.count_students().unwrap(), 1);
    assert_eq!(persistence.count_courses().unwrap(), 1);
    assert_eq!(persistence.count_enrollments().unwrap(), 0);
}

#[test]
fn test_teacher_can_list_and_view_records() {
    let mut persistence: Persistence = create_test_persistence();
    let admin = admin_user();
    let teacher = teacher_user();
    let student_id: i64 =
        records::create_student(&mut persistence, &admin, &student_draft("S100")).unwrap();

    let listed = records::list_students(&mut persistence, &teacher, None).unwrap();
    assert_eq!(listed.len(), 1);

    let fetched = records::get_student(&mut persistence, &teacher, student_id).unwrap();
    assert_eq!(fetched.first_name, "Ada");

    let summary = records::dashboard_summary(&mut persistence, &teacher).unwrap();
    assert_eq!(summary.students, 1);
}

#[test]
fn test_admin_can_mutate_every_record_type() {
    let mut persistence: Persistence = create_test_persistence();
    let admin = admin_user();

    let student_id: i64 =
        records::create_student(&mut persistence, &admin, &student_draft("S100")).unwrap();
    let course_id: i64 =
        records::create_course(&mut persistence, &admin, &course_draft("CS101")).unwrap();
    let enrollment_id: i64 = records::create_enrollment(
        &mut persistence,
        &admin,
        &EnrollmentDraft {
            student_id: Some(student_id),
            course_id: Some(course_id),
            grade: String::from("A"),
        },
    )
    .unwrap();

    records::delete_enrollment(&mut persistence, &admin, enrollment_id).unwrap();
    records::delete_course(&mut persistence, &admin, course_id).unwrap();
    records::delete_student(&mut persistence, &admin, student_id).unwrap();

    assert_eq!(persistence.count_students().unwrap(), 0);
    assert_eq!(persistence.count_courses().unwrap(), 0);
    assert_eq!(persistence.count_enrollments().unwrap(), 0);
}
