// Copyright (C) 2026 Rollbook Authors
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HTML page rendering.
//!
//! Templates are Handlebars files loaded once at startup from the template
//! directory. Rendering never panics a request: if a template fails to
//! render, the response falls back to a static 500 page.

use std::path::Path;

use axum::{
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use handlebars::Handlebars;
use serde::Serialize;
use tracing::error;

static ERROR_500: &str = r"<!doctype html>
<html>
<head>
<meta charset=utf-8>
<title>Rollbook | Error</title>
</head>
<body>
<h1>Internal Server Error</h1>
<p>(Error 500)</p>
<p>Something went wrong on our end. No further or more
helpful information is available about the problem.</p>
</body>
</html>";

/// Loads every `.html` template under `template_dir` into a registry.
///
/// Template names are the file names without the extension, so
/// `templates/login.html` renders as `login`.
///
/// # Errors
///
/// Returns an error if the directory cannot be read or a template fails to
/// parse.
pub fn load_templates(template_dir: &Path) -> Result<Handlebars<'static>, String> {
    let mut templates: Handlebars<'static> = Handlebars::new();
    templates
        .register_templates_directory(".html", template_dir)
        .map_err(|e| {
            format!(
                "Error registering templates directory {}: {e}",
                template_dir.display()
            )
        })?;
    Ok(templates)
}

/// The static fallback when rendering itself fails.
pub fn respond_500() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CACHE_CONTROL, "no-store")],
        Html(ERROR_500),
    )
        .into_response()
}

/// Renders a template to an HTML response with the given status code.
///
/// Validation re-renders use `OK` so the browser keeps the form in place;
/// confirmation and listing pages do the same. A broken template logs the
/// failure and degrades to the static 500 page.
pub fn render_page<S>(
    templates: &Handlebars<'_>,
    code: StatusCode,
    template_name: &str,
    data: &S,
) -> Response
where
    S: Serialize,
{
    match templates.render(template_name, data) {
        Ok(body) => (code, [(header::CACHE_CONTROL, "no-store")], Html(body)).into_response(),
        Err(e) => {
            error!(template_name, error = %e, "Template rendering failed");
            respond_500()
        }
    }
}
