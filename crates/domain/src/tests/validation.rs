// Copyright (C) 2026 Rollbook Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    CourseDraft, EnrollmentDraft, FieldError, StudentDraft, validate_course, validate_enrollment,
    validate_student,
};

fn create_valid_student_draft() -> StudentDraft {
    StudentDraft {
        first_name: String::from("Ada"),
        last_name: String::from("Lovelace"),
        student_id: String::from("S100"),
        email: String::from("ada@example.com"),
    }
}

fn fields_with_errors(errors: &[FieldError]) -> Vec<&str> {
    errors.iter().map(|e| e.field.as_str()).collect()
}

#[test]
fn test_valid_student_draft_passes() {
    let errors: Vec<FieldError> = validate_student(&create_valid_student_draft());
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
}

#[test]
fn test_student_draft_reports_all_missing_fields_at_once() {
    let errors: Vec<FieldError> = validate_student(&StudentDraft::default());
    assert_eq!(
        fields_with_errors(&errors),
        vec!["first_name", "last_name", "student_id", "email"]
    );
}

#[test]
fn test_student_first_name_length_cap() {
    let mut draft: StudentDraft = create_valid_student_draft();
    draft.first_name = "x".repeat(51);
    let errors: Vec<FieldError> = validate_student(&draft);
    assert_eq!(fields_with_errors(&errors), vec!["first_name"]);

    draft.first_name = "x".repeat(50);
    assert!(validate_student(&draft).is_empty());
}

#[test]
fn test_student_number_length_cap() {
    let mut draft: StudentDraft = create_valid_student_draft();
    draft.student_id = "9".repeat(21);
    let errors: Vec<FieldError> = validate_student(&draft);
    assert_eq!(fields_with_errors(&errors), vec!["student_id"]);
}

#[test]
fn test_student_email_shape_is_checked() {
    let mut draft: StudentDraft = create_valid_student_draft();
    for bad in ["not-an-email", "@example.com", "ada@", "ada@nodot", "ada@.com"] {
        draft.email = String::from(bad);
        let errors: Vec<FieldError> = validate_student(&draft);
        assert_eq!(fields_with_errors(&errors), vec!["email"], "input: {bad}");
        assert_eq!(errors[0].message, "Enter a valid email address");
    }
}

#[test]
fn test_student_email_length_cap() {
    let mut draft: StudentDraft = create_valid_student_draft();
    // 100 characters total, structurally valid.
    draft.email = format!("{}@example.com", "a".repeat(88));
    assert!(validate_student(&draft).is_empty());

    draft.email = format!("{}@example.com", "a".repeat(89));
    let errors: Vec<FieldError> = validate_student(&draft);
    assert_eq!(fields_with_errors(&errors), vec!["email"]);
    assert_eq!(errors[0].message, "Must be at most 100 characters");
}

#[test]
fn test_whitespace_only_field_counts_as_missing() {
    let mut draft: StudentDraft = create_valid_student_draft();
    draft.last_name = String::from("   ");
    let errors: Vec<FieldError> = validate_student(&draft);
    assert_eq!(fields_with_errors(&errors), vec!["last_name"]);
    assert_eq!(errors[0].message, "This field is required");
}

#[test]
fn test_valid_course_draft_passes() {
    let draft: CourseDraft = CourseDraft {
        name: String::from("Intro to Computing"),
        code: String::from("CS101"),
        teacher: String::new(),
    };
    assert!(validate_course(&draft).is_empty());
}

#[test]
fn test_course_code_length_cap() {
    let draft: CourseDraft = CourseDraft {
        name: String::from("Intro to Computing"),
        code: String::from("CS101-EXTRA"),
        teacher: String::new(),
    };
    let errors: Vec<FieldError> = validate_course(&draft);
    assert_eq!(fields_with_errors(&errors), vec!["code"]);
}

#[test]
fn test_course_teacher_is_optional_but_capped() {
    let mut draft: CourseDraft = CourseDraft {
        name: String::from("Intro to Computing"),
        code: String::from("CS101"),
        teacher: "t".repeat(100),
    };
    assert!(validate_course(&draft).is_empty());

    draft.teacher = "t".repeat(101);
    let errors: Vec<FieldError> = validate_course(&draft);
    assert_eq!(fields_with_errors(&errors), vec!["teacher"]);
}

#[test]
fn test_enrollment_requires_student_and_course_selection() {
    let errors: Vec<FieldError> = validate_enrollment(&EnrollmentDraft::default());
    assert_eq!(fields_with_errors(&errors), vec!["student", "course"]);
}

#[test]
fn test_enrollment_grade_is_optional_but_capped() {
    let mut draft: EnrollmentDraft = EnrollmentDraft {
        student_id: Some(1),
        course_id: Some(2),
        grade: String::new(),
    };
    assert!(validate_enrollment(&draft).is_empty());

    draft.grade = String::from("B+");
    assert!(validate_enrollment(&draft).is_empty());

    draft.grade = String::from("B++");
    let errors: Vec<FieldError> = validate_enrollment(&draft);
    assert_eq!(fields_with_errors(&errors), vec!["grade"]);
}
