// Copyright (C) 2026 Rollbook Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

use axum::{
    Router,
    extract::{Form, Path as AxumPath, Query, State as AxumState},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use clap::Parser;
use handlebars::Handlebars;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use rollbook_api::{
    ApiError, AuthenticatedUser, AuthenticationService, DashboardSummary, records,
};
use rollbook_domain::{
    Course, CourseDraft, EnrollmentDetail, EnrollmentDraft, FieldError, Role, Student,
    StudentDraft,
};
use rollbook_persistence::{Persistence, PersistenceError};

mod pages;
mod session;

use session::{SESSION_COOKIE, SessionUser};

/// Rollbook Server - web interface for student, course, and enrollment
/// records.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 8000)]
    port: u16,

    /// Directory containing the Handlebars page templates
    #[arg(short, long, default_value = "templates")]
    templates: String,

    /// Password for the default admin account provisioned on an empty database
    #[arg(long, default_value = "admin")]
    admin_password: String,
}

/// Application state shared across handlers.
///
/// This contains the persistence layer wrapped in a Mutex to allow
/// safe concurrent access, plus the template registry loaded at startup.
#[derive(Clone)]
struct AppState {
    /// The persistence layer for accounts, sessions, and records.
    persistence: Arc<Mutex<Persistence>>,
    /// Compiled page templates.
    templates: Arc<Handlebars<'static>>,
}

// ============================================================================
// Form and query payloads
// ============================================================================

/// Login form fields.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
struct LoginForm {
    /// The submitted login name.
    login_name: String,
    /// The submitted password.
    password: String,
}

/// Student form fields, as submitted and as re-rendered.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
struct StudentForm {
    first_name: String,
    last_name: String,
    student_id: String,
    email: String,
}

/// Course form fields.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
struct CourseForm {
    name: String,
    code: String,
    teacher: String,
}

/// Enrollment form fields.
///
/// The select inputs submit row ids as text; an empty string means nothing
/// was chosen.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
struct EnrollmentForm {
    student_id: String,
    course_id: String,
    grade: String,
}

impl EnrollmentForm {
    /// Converts the submitted text fields into a draft. Non-numeric or empty
    /// selections become `None` and fail validation downstream.
    fn to_draft(&self) -> EnrollmentDraft {
        EnrollmentDraft {
            student_id: self.student_id.trim().parse().ok(),
            course_id: self.course_id.trim().parse().ok(),
            grade: self.grade.clone(),
        }
    }
}

/// Query parameters for the list pages.
#[derive(Debug, Default, Deserialize)]
struct SearchQuery {
    /// The search term, if any.
    q: Option<String>,
}

// ============================================================================
// Page contexts
// ============================================================================

/// The signed-in account as shown in the page chrome.
#[derive(Debug, Clone, Serialize)]
struct PageUser {
    /// Name shown in the navigation bar.
    display_name: String,
    /// Whether mutation links and buttons should be shown.
    is_admin: bool,
}

impl From<&AuthenticatedUser> for PageUser {
    fn from(user: &AuthenticatedUser) -> Self {
        Self {
            display_name: user.display_name.clone(),
            is_admin: user.role == Role::Admin,
        }
    }
}

/// Context for the login page.
#[derive(Debug, Serialize)]
struct LoginPage {
    /// Error line shown above the form, if the previous attempt failed.
    error: Option<String>,
    /// The previously entered login name, preserved across failures.
    login_name: String,
}

/// Context for the dashboard.
#[derive(Debug, Serialize)]
struct DashboardPage {
    user: PageUser,
    summary: DashboardSummary,
}

/// Context for the student list.
#[derive(Debug, Serialize)]
struct StudentsPage {
    user: PageUser,
    query: String,
    students: Vec<Student>,
}

/// Context for the student form (create and edit).
#[derive(Debug, Serialize)]
struct StudentFormPage {
    user: PageUser,
    heading: String,
    values: StudentForm,
    errors: Vec<FieldError>,
}

/// Context for the course list.
#[derive(Debug, Serialize)]
struct CoursesPage {
    user: PageUser,
    query: String,
    courses: Vec<Course>,
}

/// Context for the course form (create and edit).
#[derive(Debug, Serialize)]
struct CourseFormPage {
    user: PageUser,
    heading: String,
    values: CourseForm,
    errors: Vec<FieldError>,
}

/// Context for the enrollment list.
#[derive(Debug, Serialize)]
struct EnrollmentsPage {
    user: PageUser,
    query: String,
    enrollments: Vec<EnrollmentDetail>,
}

/// One `<option>` in a select input.
#[derive(Debug, Serialize)]
struct SelectOption {
    id: i64,
    label: String,
    selected: bool,
}

/// Context for the enrollment form (create and edit).
#[derive(Debug, Serialize)]
struct EnrollmentFormPage {
    user: PageUser,
    heading: String,
    students: Vec<SelectOption>,
    courses: Vec<SelectOption>,
    grade: String,
    errors: Vec<FieldError>,
}

/// Context for the delete confirmation pages.
#[derive(Debug, Serialize)]
struct ConfirmDeletePage {
    user: PageUser,
    heading: String,
    /// Human-readable summary of what is about to be deleted.
    description: String,
    /// Where the confirmation form posts to.
    action: String,
    /// Where "cancel" goes back to.
    cancel: String,
}

// ============================================================================
// Response helpers
// ============================================================================

/// Redirect target after a non-admin tries a gated page.
fn redirect_to_dashboard(user: &AuthenticatedUser, action: &str) -> Response {
    warn!(
        login_name = %user.login_name,
        role = %user.role,
        action,
        "Blocked non-admin from a gated page"
    );
    Redirect::to("/dashboard").into_response()
}

/// Checks the Admin role before a gated page is served or a mutation is
/// attempted, mirroring the same check inside the API operations. Non-admins
/// land back on the dashboard.
fn require_admin(user: &AuthenticatedUser, action: &str) -> Result<(), Response> {
    if user.role == Role::Admin {
        Ok(())
    } else {
        Err(redirect_to_dashboard(user, action))
    }
}

/// Renders the shared 404 page.
fn not_found_page(app_state: &AppState) -> Response {
    pages::render_page(
        &app_state.templates,
        StatusCode::NOT_FOUND,
        "not_found",
        &(),
    )
}

/// Maps an API failure that is not a validation error onto a page response.
///
/// Validation errors never reach this point; the mutation handlers turn them
/// into a form re-render first.
fn api_failure(app_state: &AppState, err: &ApiError) -> Response {
    match err {
        ApiError::ResourceNotFound { .. } => not_found_page(app_state),
        ApiError::AuthenticationFailed { .. } => Redirect::to("/login").into_response(),
        ApiError::Unauthorized { .. } => Redirect::to("/dashboard").into_response(),
        ApiError::Validation(_) | ApiError::Internal { .. } => {
            error!(error = %err, "Unhandled API error");
            pages::respond_500()
        }
    }
}

/// Builds the redirect-with-cookie response issued after a successful login.
fn login_success_response(session_token: &str) -> Response {
    let cookie: String =
        format!("{SESSION_COOKIE}={session_token}; Path=/; HttpOnly; SameSite=Lax");
    let Ok(value) = HeaderValue::from_str(&cookie) else {
        error!("Session cookie value was not a valid header value");
        return pages::respond_500();
    };
    let mut response: Response = Redirect::to("/dashboard").into_response();
    response.headers_mut().insert(header::SET_COOKIE, value);
    response
}

/// Builds the redirect response issued after logout, clearing the cookie.
fn logout_response() -> Response {
    let cookie: String = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Max-Age=0");
    let Ok(value) = HeaderValue::from_str(&cookie) else {
        error!("Logout cookie value was not a valid header value");
        return pages::respond_500();
    };
    let mut response: Response = Redirect::to("/login").into_response();
    response.headers_mut().insert(header::SET_COOKIE, value);
    response
}

/// Builds select options for the student dropdown.
fn student_options(students: &[Student], selected: Option<i64>) -> Vec<SelectOption> {
    students
        .iter()
        .map(|s| SelectOption {
            id: s.id,
            label: format!("{} {} ({})", s.first_name, s.last_name, s.student_id),
            selected: selected == Some(s.id),
        })
        .collect()
}

/// Builds select options for the course dropdown.
fn course_options(courses: &[Course], selected: Option<i64>) -> Vec<SelectOption> {
    courses
        .iter()
        .map(|c| SelectOption {
            id: c.id,
            label: format!("{} ({})", c.name, c.code),
            selected: selected == Some(c.id),
        })
        .collect()
}

// ============================================================================
// Auth handlers
// ============================================================================

/// Handler for GET `/` endpoint. Everything starts at the dashboard.
async fn handle_root() -> Redirect {
    Redirect::to("/dashboard")
}

/// Handler for GET `/login` endpoint.
async fn handle_login_page(AxumState(app_state): AxumState<AppState>) -> Response {
    pages::render_page(
        &app_state.templates,
        StatusCode::OK,
        "login",
        &LoginPage {
            error: None,
            login_name: String::new(),
        },
    )
}

/// Handler for POST `/login` endpoint.
///
/// On success sets the session cookie and redirects to the dashboard. On
/// failure re-renders the login page with a generic error that does not
/// reveal which credential was wrong.
async fn handle_login_submit(
    AxumState(app_state): AxumState<AppState>,
    Form(form): Form<LoginForm>,
) -> Response {
    info!(login_name = %form.login_name, "Handling login request");

    let mut persistence = app_state.persistence.lock().await;
    let result = AuthenticationService::login(
        &mut persistence,
        form.login_name.trim(),
        &form.password,
    );
    drop(persistence);

    match result {
        Ok((session_token, user)) => {
            info!(login_name = %user.login_name, "Login succeeded");
            login_success_response(&session_token)
        }
        Err(e) => {
            info!(login_name = %form.login_name, error = %e, "Login failed");
            pages::render_page(
                &app_state.templates,
                StatusCode::OK,
                "login",
                &LoginPage {
                    error: Some(String::from("Invalid login name or password")),
                    login_name: form.login_name,
                },
            )
        }
    }
}

/// Handler for POST `/logout` endpoint.
async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    SessionUser { user, token }: SessionUser,
) -> Response {
    info!(login_name = %user.login_name, "Handling logout request");

    let mut persistence = app_state.persistence.lock().await;
    let result = AuthenticationService::logout(&mut persistence, &token);
    drop(persistence);

    if let Err(e) = result {
        error!(error = %e, "Logout failed");
        return pages::respond_500();
    }

    logout_response()
}

/// Handler for GET `/dashboard` endpoint.
async fn handle_dashboard(
    AxumState(app_state): AxumState<AppState>,
    SessionUser { user, .. }: SessionUser,
) -> Response {
    info!(login_name = %user.login_name, "Handling dashboard request");

    let mut persistence = app_state.persistence.lock().await;
    let summary = match records::dashboard_summary(&mut persistence, &user) {
        Ok(summary) => summary,
        Err(e) => return api_failure(&app_state, &e),
    };
    drop(persistence);

    pages::render_page(
        &app_state.templates,
        StatusCode::OK,
        "dashboard",
        &DashboardPage {
            user: PageUser::from(&user),
            summary,
        },
    )
}

// ============================================================================
// Student handlers
// ============================================================================

/// Handler for GET `/students` endpoint.
///
/// Lists students, filtered by `?q=` as a case-insensitive substring match
/// on the first name.
async fn handle_list_students(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<SearchQuery>,
    SessionUser { user, .. }: SessionUser,
) -> Response {
    info!(login_name = %user.login_name, "Handling student list request");

    let mut persistence = app_state.persistence.lock().await;
    let students = match records::list_students(&mut persistence, &user, query.q.as_deref()) {
        Ok(students) => students,
        Err(e) => return api_failure(&app_state, &e),
    };
    drop(persistence);

    pages::render_page(
        &app_state.templates,
        StatusCode::OK,
        "students",
        &StudentsPage {
            user: PageUser::from(&user),
            query: query.q.unwrap_or_default(),
            students,
        },
    )
}

/// Handler for GET `/students/new` endpoint.
async fn handle_new_student_page(
    AxumState(app_state): AxumState<AppState>,
    SessionUser { user, .. }: SessionUser,
) -> Response {
    if let Err(response) = require_admin(&user, "add_student") {
        return response;
    }

    pages::render_page(
        &app_state.templates,
        StatusCode::OK,
        "student_form",
        &StudentFormPage {
            user: PageUser::from(&user),
            heading: String::from("Add Student"),
            values: StudentForm::default(),
            errors: Vec::new(),
        },
    )
}

/// Handler for POST `/students/new` endpoint.
///
/// On a validation failure the form is re-rendered with every field error
/// and the entered values preserved.
async fn handle_create_student(
    AxumState(app_state): AxumState<AppState>,
    SessionUser { user, .. }: SessionUser,
    Form(form): Form<StudentForm>,
) -> Response {
    if let Err(response) = require_admin(&user, "add_student") {
        return response;
    }
    info!(login_name = %user.login_name, "Handling create student request");

    let draft = StudentDraft {
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
        student_id: form.student_id.clone(),
        email: form.email.clone(),
    };

    let mut persistence = app_state.persistence.lock().await;
    let result = records::create_student(&mut persistence, &user, &draft);
    drop(persistence);

    match result {
        Ok(_) => Redirect::to("/students").into_response(),
        Err(ApiError::Validation(errors)) => pages::render_page(
            &app_state.templates,
            StatusCode::OK,
            "student_form",
            &StudentFormPage {
                user: PageUser::from(&user),
                heading: String::from("Add Student"),
                values: form,
                errors,
            },
        ),
        Err(e) => api_failure(&app_state, &e),
    }
}

/// Handler for GET `/students/{id}/edit` endpoint.
async fn handle_edit_student_page(
    AxumState(app_state): AxumState<AppState>,
    AxumPath(id): AxumPath<i64>,
    SessionUser { user, .. }: SessionUser,
) -> Response {
    if let Err(response) = require_admin(&user, "edit_student") {
        return response;
    }

    let mut persistence = app_state.persistence.lock().await;
    let student = match records::get_student(&mut persistence, &user, id) {
        Ok(student) => student,
        Err(e) => return api_failure(&app_state, &e),
    };
    drop(persistence);

    pages::render_page(
        &app_state.templates,
        StatusCode::OK,
        "student_form",
        &StudentFormPage {
            user: PageUser::from(&user),
            heading: String::from("Edit Student"),
            values: StudentForm {
                first_name: student.first_name,
                last_name: student.last_name,
                student_id: student.student_id,
                email: student.email,
            },
            errors: Vec::new(),
        },
    )
}

/// Handler for POST `/students/{id}/edit` endpoint.
async fn handle_update_student(
    AxumState(app_state): AxumState<AppState>,
    AxumPath(id): AxumPath<i64>,
    SessionUser { user, .. }: SessionUser,
    Form(form): Form<StudentForm>,
) -> Response {
    if let Err(response) = require_admin(&user, "edit_student") {
        return response;
    }
    info!(login_name = %user.login_name, id, "Handling update student request");

    let draft = StudentDraft {
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
        student_id: form.student_id.clone(),
        email: form.email.clone(),
    };

    let mut persistence = app_state.persistence.lock().await;
    let result = records::update_student(&mut persistence, &user, id, &draft);
    drop(persistence);

    match result {
        Ok(()) => Redirect::to("/students").into_response(),
        Err(ApiError::Validation(errors)) => pages::render_page(
            &app_state.templates,
            StatusCode::OK,
            "student_form",
            &StudentFormPage {
                user: PageUser::from(&user),
                heading: String::from("Edit Student"),
                values: form,
                errors,
            },
        ),
        Err(e) => api_failure(&app_state, &e),
    }
}

/// Handler for GET `/students/{id}/delete` endpoint.
///
/// Shows a confirmation page; the deletion itself only happens on POST.
async fn handle_delete_student_page(
    AxumState(app_state): AxumState<AppState>,
    AxumPath(id): AxumPath<i64>,
    SessionUser { user, .. }: SessionUser,
) -> Response {
    if let Err(response) = require_admin(&user, "delete_student") {
        return response;
    }

    let mut persistence = app_state.persistence.lock().await;
    let student = match records::get_student(&mut persistence, &user, id) {
        Ok(student) => student,
        Err(e) => return api_failure(&app_state, &e),
    };
    drop(persistence);

    pages::render_page(
        &app_state.templates,
        StatusCode::OK,
        "confirm_delete",
        &ConfirmDeletePage {
            user: PageUser::from(&user),
            heading: String::from("Delete Student"),
            description: format!(
                "{} {} ({})",
                student.first_name, student.last_name, student.student_id
            ),
            action: format!("/students/{id}/delete"),
            cancel: String::from("/students"),
        },
    )
}

/// Handler for POST `/students/{id}/delete` endpoint.
async fn handle_delete_student(
    AxumState(app_state): AxumState<AppState>,
    AxumPath(id): AxumPath<i64>,
    SessionUser { user, .. }: SessionUser,
) -> Response {
    if let Err(response) = require_admin(&user, "delete_student") {
        return response;
    }
    info!(login_name = %user.login_name, id, "Handling delete student request");

    let mut persistence = app_state.persistence.lock().await;
    let result = records::delete_student(&mut persistence, &user, id);
    drop(persistence);

    match result {
        Ok(()) => Redirect::to("/students").into_response(),
        Err(e) => api_failure(&app_state, &e),
    }
}

// ============================================================================
// Course handlers
// ============================================================================

/// Handler for GET `/courses` endpoint.
///
/// Lists courses, filtered by `?q=` as a case-insensitive substring match on
/// the course name.
async fn handle_list_courses(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<SearchQuery>,
    SessionUser { user, .. }: SessionUser,
) -> Response {
    info!(login_name = %user.login_name, "Handling course list request");

    let mut persistence = app_state.persistence.lock().await;
    let courses = match records::list_courses(&mut persistence, &user, query.q.as_deref()) {
        Ok(courses) => courses,
        Err(e) => return api_failure(&app_state, &e),
    };
    drop(persistence);

    pages::render_page(
        &app_state.templates,
        StatusCode::OK,
        "courses",
        &CoursesPage {
            user: PageUser::from(&user),
            query: query.q.unwrap_or_default(),
            courses,
        },
    )
}

/// Handler for GET `/courses/new` endpoint.
async fn handle_new_course_page(
    AxumState(app_state): AxumState<AppState>,
    SessionUser { user, .. }: SessionUser,
) -> Response {
    if let Err(response) = require_admin(&user, "add_course") {
        return response;
    }

    pages::render_page(
        &app_state.templates,
        StatusCode::OK,
        "course_form",
        &CourseFormPage {
            user: PageUser::from(&user),
            heading: String::from("Add Course"),
            values: CourseForm::default(),
            errors: Vec::new(),
        },
    )
}

/// Handler for POST `/courses/new` endpoint.
async fn handle_create_course(
    AxumState(app_state): AxumState<AppState>,
    SessionUser { user, .. }: SessionUser,
    Form(form): Form<CourseForm>,
) -> Response {
    if let Err(response) = require_admin(&user, "add_course") {
        return response;
    }
    info!(login_name = %user.login_name, "Handling create course request");

    let draft = CourseDraft {
        name: form.name.clone(),
        code: form.code.clone(),
        teacher: form.teacher.clone(),
    };

    let mut persistence = app_state.persistence.lock().await;
    let result = records::create_course(&mut persistence, &user, &draft);
    drop(persistence);

    match result {
        Ok(_) => Redirect::to("/courses").into_response(),
        Err(ApiError::Validation(errors)) => pages::render_page(
            &app_state.templates,
            StatusCode::OK,
            "course_form",
            &CourseFormPage {
                user: PageUser::from(&user),
                heading: String::from("Add Course"),
                values: form,
                errors,
            },
        ),
        Err(e) => api_failure(&app_state, &e),
    }
}

/// Handler for GET `/courses/{id}/edit` endpoint.
async fn handle_edit_course_page(
    AxumState(app_state): AxumState<AppState>,
    AxumPath(id): AxumPath<i64>,
    SessionUser { user, .. }: SessionUser,
) -> Response {
    if let Err(response) = require_admin(&user, "edit_course") {
        return response;
    }

    let mut persistence = app_state.persistence.lock().await;
    let course = match records::get_course(&mut persistence, &user, id) {
        Ok(course) => course,
        Err(e) => return api_failure(&app_state, &e),
    };
    drop(persistence);

    pages::render_page(
        &app_state.templates,
        StatusCode::OK,
        "course_form",
        &CourseFormPage {
            user: PageUser::from(&user),
            heading: String::from("Edit Course"),
            values: CourseForm {
                name: course.name,
                code: course.code,
                teacher: course.teacher.unwrap_or_default(),
            },
            errors: Vec::new(),
        },
    )
}

/// Handler for POST `/courses/{id}/edit` endpoint.
async fn handle_update_course(
    AxumState(app_state): AxumState<AppState>,
    AxumPath(id): AxumPath<i64>,
    SessionUser { user, .. }: SessionUser,
    Form(form): Form<CourseForm>,
) -> Response {
    if let Err(response) = require_admin(&user, "edit_course") {
        return response;
    }
    info!(login_name = %user.login_name, id, "Handling update course request");

    let draft = CourseDraft {
        name: form.name.clone(),
        code: form.code.clone(),
        teacher: form.teacher.clone(),
    };

    let mut persistence = app_state.persistence.lock().await;
    let result = records::update_course(&mut persistence, &user, id, &draft);
    drop(persistence);

    match result {
        Ok(()) => Redirect::to("/courses").into_response(),
        Err(ApiError::Validation(errors)) => pages::render_page(
            &app_state.templates,
            StatusCode::OK,
            "course_form",
            &CourseFormPage {
                user: PageUser::from(&user),
                heading: String::from("Edit Course"),
                values: form,
                errors,
            },
        ),
        Err(e) => api_failure(&app_state, &e),
    }
}

/// Handler for GET `/courses/{id}/delete` endpoint.
async fn handle_delete_course_page(
    AxumState(app_state): AxumState<AppState>,
    AxumPath(id): AxumPath<i64>,
    SessionUser { user, .. }: SessionUser,
) -> Response {
    if let Err(response) = require_admin(&user, "delete_course") {
        return response;
    }

    let mut persistence = app_state.persistence.lock().await;
    let course = match records::get_course(&mut persistence, &user, id) {
        Ok(course) => course,
        Err(e) => return api_failure(&app_state, &e),
    };
    drop(persistence);

    pages::render_page(
        &app_state.templates,
        StatusCode::OK,
        "confirm_delete",
        &ConfirmDeletePage {
            user: PageUser::from(&user),
            heading: String::from("Delete Course"),
            description: format!("{} ({})", course.name, course.code),
            action: format!("/courses/{id}/delete"),
            cancel: String::from("/courses"),
        },
    )
}

/// Handler for POST `/courses/{id}/delete` endpoint.
///
/// Deleting a course also removes every enrollment in it.
async fn handle_delete_course(
    AxumState(app_state): AxumState<AppState>,
    AxumPath(id): AxumPath<i64>,
    SessionUser { user, .. }: SessionUser,
) -> Response {
    if let Err(response) = require_admin(&user, "delete_course") {
        return response;
    }
    info!(login_name = %user.login_name, id, "Handling delete course request");

    let mut persistence = app_state.persistence.lock().await;
    let result = records::delete_course(&mut persistence, &user, id);
    drop(persistence);

    match result {
        Ok(()) => Redirect::to("/courses").into_response(),
        Err(e) => api_failure(&app_state, &e),
    }
}

// ============================================================================
// Enrollment handlers
// ============================================================================

/// Handler for GET `/enrollments` endpoint.
///
/// Lists enrollments with student and course display fields, filtered by
/// `?q=` as a case-insensitive substring match on the student's first name.
async fn handle_list_enrollments(
    AxumState(app_state): AxumState<AppState>,
    Query(query): Query<SearchQuery>,
    SessionUser { user, .. }: SessionUser,
) -> Response {
    info!(login_name = %user.login_name, "Handling enrollment list request");

    let mut persistence = app_state.persistence.lock().await;
    let enrollments =
        match records::list_enrollments(&mut persistence, &user, query.q.as_deref()) {
            Ok(enrollments) => enrollments,
            Err(e) => return api_failure(&app_state, &e),
        };
    drop(persistence);

    pages::render_page(
        &app_state.templates,
        StatusCode::OK,
        "enrollments",
        &EnrollmentsPage {
            user: PageUser::from(&user),
            query: query.q.unwrap_or_default(),
            enrollments,
        },
    )
}

/// Loads the select options for the enrollment form.
async fn enrollment_form_options(
    app_state: &AppState,
    user: &AuthenticatedUser,
    selected_student: Option<i64>,
    selected_course: Option<i64>,
) -> Result<(Vec<SelectOption>, Vec<SelectOption>), Response> {
    let mut persistence = app_state.persistence.lock().await;
    let students = records::list_students(&mut persistence, user, None)
        .map_err(|e| api_failure(app_state, &e))?;
    let courses = records::list_courses(&mut persistence, user, None)
        .map_err(|e| api_failure(app_state, &e))?;
    drop(persistence);

    Ok((
        student_options(&students, selected_student),
        course_options(&courses, selected_course),
    ))
}

/// Handler for GET `/enrollments/new` endpoint.
async fn handle_new_enrollment_page(
    AxumState(app_state): AxumState<AppState>,
    SessionUser { user, .. }: SessionUser,
) -> Response {
    if let Err(response) = require_admin(&user, "add_enrollment") {
        return response;
    }

    let (students, courses) = match enrollment_form_options(&app_state, &user, None, None).await {
        Ok(options) => options,
        Err(response) => return response,
    };

    pages::render_page(
        &app_state.templates,
        StatusCode::OK,
        "enrollment_form",
        &EnrollmentFormPage {
            user: PageUser::from(&user),
            heading: String::from("Add Enrollment"),
            students,
            courses,
            grade: String::new(),
            errors: Vec::new(),
        },
    )
}

/// Handler for POST `/enrollments/new` endpoint.
async fn handle_create_enrollment(
    AxumState(app_state): AxumState<AppState>,
    SessionUser { user, .. }: SessionUser,
    Form(form): Form<EnrollmentForm>,
) -> Response {
    if let Err(response) = require_admin(&user, "add_enrollment") {
        return response;
    }
    info!(login_name = %user.login_name, "Handling create enrollment request");

    let draft = form.to_draft();

    let mut persistence = app_state.persistence.lock().await;
    let result = records::create_enrollment(&mut persistence, &user, &draft);
    drop(persistence);

    match result {
        Ok(_) => Redirect::to("/enrollments").into_response(),
        Err(ApiError::Validation(errors)) => {
            let (students, courses) = match enrollment_form_options(
                &app_state,
                &user,
                draft.student_id,
                draft.course_id,
            )
            .await
            {
                Ok(options) => options,
                Err(response) => return response,
            };
            pages::render_page(
                &app_state.templates,
                StatusCode::OK,
                "enrollment_form",
                &EnrollmentFormPage {
                    user: PageUser::from(&user),
                    heading: String::from("Add Enrollment"),
                    students,
                    courses,
                    grade: form.grade,
                    errors,
                },
            )
        }
        Err(e) => api_failure(&app_state, &e),
    }
}

/// Handler for GET `/enrollments/{id}/edit` endpoint.
async fn handle_edit_enrollment_page(
    AxumState(app_state): AxumState<AppState>,
    AxumPath(id): AxumPath<i64>,
    SessionUser { user, .. }: SessionUser,
) -> Response {
    if let Err(response) = require_admin(&user, "edit_enrollment") {
        return response;
    }

    let mut persistence = app_state.persistence.lock().await;
    let enrollment = match records::get_enrollment(&mut persistence, &user, id) {
        Ok(enrollment) => enrollment,
        Err(e) => return api_failure(&app_state, &e),
    };
    drop(persistence);

    let (students, courses) = match enrollment_form_options(
        &app_state,
        &user,
        Some(enrollment.student_id),
        Some(enrollment.course_id),
    )
    .await
    {
        Ok(options) => options,
        Err(response) => return response,
    };

    pages::render_page(
        &app_state.templates,
        StatusCode::OK,
        "enrollment_form",
        &EnrollmentFormPage {
            user: PageUser::from(&user),
            heading: String::from("Edit Enrollment"),
            students,
            courses,
            grade: enrollment.grade.unwrap_or_default(),
            errors: Vec::new(),
        },
    )
}

/// Handler for POST `/enrollments/{id}/edit` endpoint.
async fn handle_update_enrollment(
    AxumState(app_state): AxumState<AppState>,
    AxumPath(id): AxumPath<i64>,
    SessionUser { user, .. }: SessionUser,
    Form(form): Form<EnrollmentForm>,
) -> Response {
    if let Err(response) = require_admin(&user, "edit_enrollment") {
        return response;
    }
    info!(login_name = %user.login_name, id, "Handling update enrollment request");

    let draft = form.to_draft();

    let mut persistence = app_state.persistence.lock().await;
    let result = records::update_enrollment(&mut persistence, &user, id, &draft);
    drop(persistence);

    match result {
        Ok(()) => Redirect::to("/enrollments").into_response(),
        Err(ApiError::Validation(errors)) => {
            let (students, courses) = match enrollment_form_options(
                &app_state,
                &user,
                draft.student_id,
                draft.course_id,
            )
            .await
            {
                Ok(options) => options,
                Err(response) => return response,
            };
            pages::render_page(
                &app_state.templates,
                StatusCode::OK,
                "enrollment_form",
                &EnrollmentFormPage {
                    user: PageUser::from(&user),
                    heading: String::from("Edit Enrollment"),
                    students,
                    courses,
                    grade: form.grade,
                    errors,
                },
            )
        }
        Err(e) => api_failure(&app_state, &e),
    }
}

/// Handler for GET `/enrollments/{id}/delete` endpoint.
async fn handle_delete_enrollment_page(
    AxumState(app_state): AxumState<AppState>,
    AxumPath(id): AxumPath<i64>,
    SessionUser { user, .. }: SessionUser,
) -> Response {
    if let Err(response) = require_admin(&user, "delete_enrollment") {
        return response;
    }

    let mut persistence = app_state.persistence.lock().await;
    let detail = match records::get_enrollment_detail(&mut persistence, &user, id) {
        Ok(detail) => detail,
        Err(e) => return api_failure(&app_state, &e),
    };
    drop(persistence);

    pages::render_page(
        &app_state.templates,
        StatusCode::OK,
        "confirm_delete",
        &ConfirmDeletePage {
            user: PageUser::from(&user),
            heading: String::from("Delete Enrollment"),
            description: format!(
                "{} {} in {} ({})",
                detail.student_first_name,
                detail.student_last_name,
                detail.course_name,
                detail.course_code
            ),
            action: format!("/enrollments/{id}/delete"),
            cancel: String::from("/enrollments"),
        },
    )
}

/// Handler for POST `/enrollments/{id}/delete` endpoint.
async fn handle_delete_enrollment(
    AxumState(app_state): AxumState<AppState>,
    AxumPath(id): AxumPath<i64>,
    SessionUser { user, .. }: SessionUser,
) -> Response {
    if let Err(response) = require_admin(&user, "delete_enrollment") {
        return response;
    }
    info!(login_name = %user.login_name, id, "Handling delete enrollment request");

    let mut persistence = app_state.persistence.lock().await;
    let result = records::delete_enrollment(&mut persistence, &user, id);
    drop(persistence);

    match result {
        Ok(()) => Redirect::to("/enrollments").into_response(),
        Err(e) => api_failure(&app_state, &e),
    }
}

/// Fallback handler: every unmatched path gets the 404 page.
async fn handle_not_found(AxumState(app_state): AxumState<AppState>) -> Response {
    not_found_page(&app_state)
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/login", get(handle_login_page).post(handle_login_submit))
        .route("/logout", axum::routing::post(handle_logout))
        .route("/dashboard", get(handle_dashboard))
        .route("/students", get(handle_list_students))
        .route(
            "/students/new",
            get(handle_new_student_page).post(handle_create_student),
        )
        .route(
            "/students/{id}/edit",
            get(handle_edit_student_page).post(handle_update_student),
        )
        .route(
            "/students/{id}/delete",
            get(handle_delete_student_page).post(handle_delete_student),
        )
        .route("/courses", get(handle_list_courses))
        .route(
            "/courses/new",
            get(handle_new_course_page).post(handle_create_course),
        )
        .route(
            "/courses/{id}/edit",
            get(handle_edit_course_page).post(handle_update_course),
        )
        .route(
            "/courses/{id}/delete",
            get(handle_delete_course_page).post(handle_delete_course),
        )
        .route("/enrollments", get(handle_list_enrollments))
        .route(
            "/enrollments/new",
            get(handle_new_enrollment_page).post(handle_create_enrollment),
        )
        .route(
            "/enrollments/{id}/edit",
            get(handle_edit_enrollment_page).post(handle_update_enrollment),
        )
        .route(
            "/enrollments/{id}/delete",
            get(handle_delete_enrollment_page).post(handle_delete_enrollment),
        )
        .fallback(handle_not_found)
        .with_state(app_state)
}

/// Creates the default admin account if the database has no accounts at all,
/// so a fresh install is reachable.
fn provision_default_admin(
    persistence: &mut Persistence,
    password: &str,
) -> Result<(), PersistenceError> {
    if persistence.count_accounts()? == 0 {
        persistence.create_account("admin", "Administrator", password, Role::Admin)?;
        warn!("Provisioned default 'admin' account; change its password");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Args = Args::parse();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Rollbook Server");

    // Initialize persistence (in-memory or file-based based on CLI argument)
    let mut persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    provision_default_admin(&mut persistence, &args.admin_password)?;

    let swept: usize = AuthenticationService::sweep_expired_sessions(&mut persistence)?;
    if swept > 0 {
        info!(swept, "Removed expired sessions");
    }

    // Load page templates
    let templates: Handlebars<'static> =
        pages::load_templates(std::path::Path::new(&args.templates))?;

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
        templates: Arc::new(templates),
    };

    // Build router
    let app: Router = build_router(app_state);

    // Bind to address
    let addr: std::net::SocketAddr = format!("127.0.0.1:{}", args.port).parse()?;
    info!("Server listening on {}", addr);

    // Run server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode as HttpStatusCode},
    };
    use tower::ServiceExt;

    /// Helper to create test app state with in-memory persistence, an admin
    /// account, and a teacher account.
    fn create_test_app_state() -> AppState {
        let mut persistence: Persistence =
            Persistence::new_in_memory().expect("Failed to create in-memory persistence");
        persistence
            .create_account("admin", "Site Admin", "hunter2", Role::Admin)
            .expect("Failed to create admin account");
        persistence
            .create_account("ghopper", "Grace Hopper", "cobol", Role::Teacher)
            .expect("Failed to create teacher account");
        let templates: Handlebars<'static> =
            pages::load_templates(std::path::Path::new("templates"))
                .expect("Failed to load templates");
        AppState {
            persistence: Arc::new(Mutex::new(persistence)),
            templates: Arc::new(templates),
        }
    }

    /// Logs in via POST /login and returns the session cookie pair.
    async fn login(app: &Router, login_name: &str, password: &str) -> String {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/login")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from(format!(
                        "login_name={login_name}&password={password}"
                    )))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), HttpStatusCode::SEE_OTHER);

        let set_cookie: &str = response
            .headers()
            .get(header::SET_COOKIE)
            .expect("Login did not set a session cookie")
            .to_str()
            .unwrap();
        set_cookie
            .split(';')
            .next()
            .expect("Empty Set-Cookie header")
            .to_string()
    }

    /// Sends a GET with the given session cookie and returns the response.
    async fn get_with_cookie(
        app: &Router,
        uri: &str,
        cookie: &str,
    ) -> axum::http::Response<Body> {
        app.clone()
            .oneshot(
                Request::builder()
                    .method("GET")
                    .uri(uri)
                    .header(header::COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    /// Sends a form POST with the given session cookie.
    async fn post_form_with_cookie(
        app: &Router,
        uri: &str,
        cookie: &str,
        body: &str,
    ) -> axum::http::Response<Body> {
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(header::COOKIE, cookie)
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn body_string(response: axum::http::Response<Body>) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &axum::http::Response<Body>) -> &str {
        response
            .headers()
            .get(header::LOCATION)
            .expect("No Location header")
            .to_str()
            .unwrap()
    }

    #[tokio::test]
    async fn test_unauthenticated_request_redirects_to_login() {
        let app: Router = build_router(create_test_app_state());

        for uri in ["/dashboard", "/students", "/courses", "/enrollments"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), HttpStatusCode::SEE_OTHER);
            assert_eq!(location(&response), "/login");
        }
    }

    #[tokio::test]
    async fn test_login_with_wrong_password_rerenders_with_generic_error() {
        let app: Router = build_router(create_test_app_state());

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/login")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("login_name=admin&password=wrong"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::OK);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        let body: String = body_string(response).await;
        assert!(body.contains("Invalid login name or password"));
        // The entered login name is preserved.
        assert!(body.contains("admin"));
    }

    #[tokio::test]
    async fn test_dashboard_shows_record_counts() {
        let app: Router = build_router(create_test_app_state());
        let cookie: String = login(&app, "admin", "hunter2").await;

        post_form_with_cookie(
            &app,
            "/students/new",
            &cookie,
            "first_name=Ada&last_name=Lovelace&student_id=S100&email=ada%40example.com",
        )
        .await;

        let response = get_with_cookie(&app, "/dashboard", &cookie).await;
        assert_eq!(response.status(), HttpStatusCode::OK);
        let body: String = body_string(response).await;
        assert!(body.contains("Students"));
        assert!(body.contains("Site Admin"));
    }

    #[tokio::test]
    async fn test_admin_creates_a_student_and_sees_it_listed() {
        let app: Router = build_router(create_test_app_state());
        let cookie: String = login(&app, "admin", "hunter2").await;

        let response = post_form_with_cookie(
            &app,
            "/students/new",
            &cookie,
            "first_name=Ada&last_name=Lovelace&student_id=S100&email=ada%40example.com",
        )
        .await;
        assert_eq!(response.status(), HttpStatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/students");

        let listing = get_with_cookie(&app, "/students", &cookie).await;
        let body: String = body_string(listing).await;
        assert!(body.contains("Ada"));
        assert!(body.contains("S100"));
    }

    #[tokio::test]
    async fn test_invalid_student_submission_rerenders_the_form() {
        let app: Router = build_router(create_test_app_state());
        let cookie: String = login(&app, "admin", "hunter2").await;

        let response = post_form_with_cookie(
            &app,
            "/students/new",
            &cookie,
            "first_name=&last_name=&student_id=&email=",
        )
        .await;

        assert_eq!(response.status(), HttpStatusCode::OK);
        let body: String = body_string(response).await;
        assert!(body.contains("This field is required"));
    }

    #[tokio::test]
    async fn test_duplicate_student_number_rerenders_with_field_error() {
        let app: Router = build_router(create_test_app_state());
        let cookie: String = login(&app, "admin", "hunter2").await;

        post_form_with_cookie(
            &app,
            "/students/new",
            &cookie,
            "first_name=Ada&last_name=Lovelace&student_id=S100&email=ada%40example.com",
        )
        .await;

        let response = post_form_with_cookie(
            &app,
            "/students/new",
            &cookie,
            "first_name=Alan&last_name=Turing&student_id=S100&email=alan%40example.com",
        )
        .await;

        assert_eq!(response.status(), HttpStatusCode::OK);
        let body: String = body_string(response).await;
        assert!(body.contains("A student with this student ID already exists"));
        // The entered values are preserved for correction.
        assert!(body.contains("Alan"));
    }

    #[tokio::test]
    async fn test_teacher_is_bounced_from_gated_pages_to_the_dashboard() {
        let app_state: AppState = create_test_app_state();
        let app: Router = build_router(app_state.clone());
        let cookie: String = login(&app, "ghopper", "cobol").await;

        let page = get_with_cookie(&app, "/students/new", &cookie).await;
        assert_eq!(page.status(), HttpStatusCode::SEE_OTHER);
        assert_eq!(location(&page), "/dashboard");

        let submission = post_form_with_cookie(
            &app,
            "/students/new",
            &cookie,
            "first_name=Ada&last_name=Lovelace&student_id=S100&email=ada%40example.com",
        )
        .await;
        assert_eq!(submission.status(), HttpStatusCode::SEE_OTHER);
        assert_eq!(location(&submission), "/dashboard");

        // The rejected submission must not have persisted anything.
        let mut persistence = app_state.persistence.lock().await;
        assert_eq!(persistence.count_students().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_teacher_can_read_the_listings() {
        let app: Router = build_router(create_test_app_state());
        let admin_cookie: String = login(&app, "admin", "hunter2").await;
        post_form_with_cookie(
            &app,
            "/students/new",
            &admin_cookie,
            "first_name=Ada&last_name=Lovelace&student_id=S100&email=ada%40example.com",
        )
        .await;

        let cookie: String = login(&app, "ghopper", "cobol").await;
        let response = get_with_cookie(&app, "/students", &cookie).await;
        assert_eq!(response.status(), HttpStatusCode::OK);
        let body: String = body_string(response).await;
        assert!(body.contains("Ada"));
        // No add link for a read-only role.
        assert!(!body.contains("/students/new"));
    }

    #[tokio::test]
    async fn test_student_search_filters_the_listing() {
        let app: Router = build_router(create_test_app_state());
        let cookie: String = login(&app, "admin", "hunter2").await;

        post_form_with_cookie(
            &app,
            "/students/new",
            &cookie,
            "first_name=Ada&last_name=Lovelace&student_id=S100&email=ada%40example.com",
        )
        .await;
        post_form_with_cookie(
            &app,
            "/students/new",
            &cookie,
            "first_name=Alan&last_name=Turing&student_id=S200&email=alan%40example.com",
        )
        .await;

        let response = get_with_cookie(&app, "/students?q=aDa", &cookie).await;
        let body: String = body_string(response).await;
        assert!(body.contains("Ada"));
        assert!(!body.contains("Alan"));
    }

    #[tokio::test]
    async fn test_delete_flow_confirms_then_deletes() {
        let app_state: AppState = create_test_app_state();
        let app: Router = build_router(app_state.clone());
        let cookie: String = login(&app, "admin", "hunter2").await;

        post_form_with_cookie(
            &app,
            "/students/new",
            &cookie,
            "first_name=Ada&last_name=Lovelace&student_id=S100&email=ada%40example.com",
        )
        .await;
        let id: i64 = {
            let mut persistence = app_state.persistence.lock().await;
            persistence.list_students(None).unwrap()[0].id
        };

        // GET is only the confirmation page; nothing is deleted yet.
        let confirmation =
            get_with_cookie(&app, &format!("/students/{id}/delete"), &cookie).await;
        assert_eq!(confirmation.status(), HttpStatusCode::OK);
        let body: String = body_string(confirmation).await;
        assert!(body.contains("Ada Lovelace"));
        {
            let mut persistence = app_state.persistence.lock().await;
            assert_eq!(persistence.count_students().unwrap(), 1);
        }

        let deletion =
            post_form_with_cookie(&app, &format!("/students/{id}/delete"), &cookie, "").await;
        assert_eq!(deletion.status(), HttpStatusCode::SEE_OTHER);
        assert_eq!(location(&deletion), "/students");
        {
            let mut persistence = app_state.persistence.lock().await;
            assert_eq!(persistence.count_students().unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn test_enrollment_flow_from_form_to_listing() {
        let app_state: AppState = create_test_app_state();
        let app: Router = build_router(app_state.clone());
        let cookie: String = login(&app, "admin", "hunter2").await;

        post_form_with_cookie(
            &app,
            "/students/new",
            &cookie,
            "first_name=Ada&last_name=Lovelace&student_id=S100&email=ada%40example.com",
        )
        .await;
        post_form_with_cookie(
            &app,
            "/courses/new",
            &cookie,
            "name=Intro+to+Computing&code=CS101&teacher=Grace+Hopper",
        )
        .await;
        let (student_id, course_id) = {
            let mut persistence = app_state.persistence.lock().await;
            (
                persistence.list_students(None).unwrap()[0].id,
                persistence.list_courses(None).unwrap()[0].id,
            )
        };

        let response = post_form_with_cookie(
            &app,
            "/enrollments/new",
            &cookie,
            &format!("student_id={student_id}&course_id={course_id}&grade=A"),
        )
        .await;
        assert_eq!(response.status(), HttpStatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/enrollments");

        let listing = get_with_cookie(&app, "/enrollments", &cookie).await;
        let body: String = body_string(listing).await;
        assert!(body.contains("Ada"));
        assert!(body.contains("CS101"));
    }

    #[tokio::test]
    async fn test_enrollment_form_without_selections_rerenders_with_errors() {
        let app: Router = build_router(create_test_app_state());
        let cookie: String = login(&app, "admin", "hunter2").await;

        let response = post_form_with_cookie(
            &app,
            "/enrollments/new",
            &cookie,
            "student_id=&course_id=&grade=",
        )
        .await;

        assert_eq!(response.status(), HttpStatusCode::OK);
        let body: String = body_string(response).await;
        assert!(body.contains("This field is required"));
    }

    #[tokio::test]
    async fn test_logout_invalidates_the_session() {
        let app: Router = build_router(create_test_app_state());
        let cookie: String = login(&app, "admin", "hunter2").await;

        let response = post_form_with_cookie(&app, "/logout", &cookie, "").await;
        assert_eq!(response.status(), HttpStatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");

        // The old cookie no longer grants access.
        let after = get_with_cookie(&app, "/dashboard", &cookie).await;
        assert_eq!(after.status(), HttpStatusCode::SEE_OTHER);
        assert_eq!(location(&after), "/login");
    }

    #[tokio::test]
    async fn test_unknown_path_renders_the_404_page() {
        let app: Router = build_router(create_test_app_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/no/such/page")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), HttpStatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_provision_default_admin_only_runs_on_an_empty_database() {
        let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

        provision_default_admin(&mut persistence, "first-secret").unwrap();
        assert_eq!(persistence.count_accounts().unwrap(), 1);

        // A second run with accounts present is a no-op.
        provision_default_admin(&mut persistence, "other-secret").unwrap();
        assert_eq!(persistence.count_accounts().unwrap(), 1);

        let account = persistence.get_account_by_login("admin").unwrap().unwrap();
        assert!(persistence
            .verify_password("first-secret", &account.password_hash)
            .unwrap());
    }
}
