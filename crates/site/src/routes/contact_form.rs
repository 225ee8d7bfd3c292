//! Contact page and its HTMX form widget.
//!
//! `GET /contact` renders the page. The form posts to `POST /contact` with
//! HTMX, which answers with the form fragment re-rendered in one of three
//! states: inline field errors, cleared after a successful send, or the
//! submitted values kept alongside an error notice.
//!
//! A successful send also sets `HX-Trigger: contact-sent` so the embedding
//! page can react to the completed submission.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    response::{IntoResponse, Response},
};
use portfolio_contact_core::{ContactForm, EMAIL_PATTERN, FieldErrors};
use tracing::instrument;

use crate::error::{AppError, add_breadcrumb};
use crate::services::ContactError;
use crate::state::AppState;

/// Event fired on the form element after a successful send.
pub const CONTACT_SENT_EVENT: &str = "contact-sent";

/// Full contact page.
#[derive(Template, WebTemplate)]
#[template(path = "contact/page.html")]
pub struct ContactPageTemplate {
    pub form: FormView,
    /// SRI hash for the HTMX script, when pinned
    pub htmx_integrity: Option<String>,
}

/// Form fragment (replaces the form via HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "contact/form.html")]
pub struct ContactFormTemplate {
    pub form: FormView,
}

/// Notice severity, mapped to a CSS modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient status message shown above the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    fn success(auto_reply_sent: bool) -> Self {
        let text = if auto_reply_sent {
            "Thanks! Your message has been sent. A confirmation is on its way to your inbox."
        } else {
            "Thanks! Your message has been sent."
        };
        Self {
            kind: NoticeKind::Success,
            text: text.to_string(),
        }
    }

    fn for_error(err: &AppError) -> Self {
        let text = match err {
            AppError::Contact(ContactError::NotConfigured) => {
                "The contact form is not set up yet. Please reach out by email instead."
            }
            AppError::Contact(ContactError::Delivery(_)) => {
                "Your message could not be delivered. Please try again in a moment."
            }
            AppError::Validation(_) => "Please check the highlighted fields.",
            AppError::BadRequest(_) => {
                "Your message could not be read. Please reload the page and try again."
            }
            AppError::Contact(ContactError::Template(_)) => {
                "Something went wrong. Please try again."
            }
        };
        Self {
            kind: NoticeKind::Error,
            text: text.to_string(),
        }
    }

    /// CSS class for the notice element.
    #[must_use]
    pub const fn css_class(&self) -> &'static str {
        match self.kind {
            NoticeKind::Success => "toast toast-success",
            NoticeKind::Error => "toast toast-error",
        }
    }
}

/// Everything the form template needs to render.
#[derive(Debug, Clone, Default)]
pub struct FormView {
    pub name: String,
    pub email: String,
    pub message: String,
    pub errors: FieldErrors,
    pub notice: Option<Notice>,
}

impl FormView {
    /// Keep the submitted values so the user does not retype them.
    fn refill(form: &ContactForm) -> Self {
        Self {
            name: form.from_name.clone().unwrap_or_default(),
            email: form.from_email.clone().unwrap_or_default(),
            message: form.message.clone().unwrap_or_default(),
            ..Self::default()
        }
    }

    /// Pattern for the email input's `pattern` attribute.
    #[must_use]
    pub const fn email_pattern(&self) -> &'static str {
        EMAIL_PATTERN
    }
}

/// Render the contact page.
///
/// GET /contact
pub async fn page(State(state): State<AppState>) -> impl IntoResponse {
    ContactPageTemplate {
        form: FormView::default(),
        htmx_integrity: state.config().htmx_integrity.clone(),
    }
}

/// Submit the contact form (HTMX).
///
/// POST /contact
///
/// Always answers 200 with a form fragment so HTMX swaps it in; an undecodable
/// body gets an error notice instead of axum's plain-text rejection.
#[instrument(skip_all)]
pub async fn submit(
    State(state): State<AppState>,
    body: Result<Form<ContactForm>, FormRejection>,
) -> Response {
    let form = match body {
        Ok(Form(form)) => form,
        Err(rejection) => {
            let err = AppError::BadRequest(rejection.body_text());
            tracing::warn!(error = %err, "Rejected contact form body");
            return ContactFormTemplate {
                form: FormView {
                    notice: Some(Notice::for_error(&err)),
                    ..FormView::default()
                },
            }
            .into_response();
        }
    };

    let errors = form.field_errors();
    if !errors.is_empty() {
        return ContactFormTemplate {
            form: FormView {
                errors,
                ..FormView::refill(&form)
            },
        }
        .into_response();
    }

    let outcome = match form.validate() {
        Ok(submission) => {
            add_breadcrumb(
                "contact",
                "Contact form submitted",
                Some(&[
                    ("source", "form"),
                    ("sender_domain", submission.sender_email().domain()),
                ]),
            );
            state
                .contact()
                .deliver(&submission)
                .await
                .map_err(AppError::from)
        }
        Err(e) => Err(AppError::from(e)),
    };

    match outcome {
        Ok(result) => (
            [("HX-Trigger", CONTACT_SENT_EVENT)],
            ContactFormTemplate {
                form: FormView {
                    notice: Some(Notice::success(result.auto_reply_sent)),
                    ..FormView::default()
                },
            },
        )
            .into_response(),
        Err(err) => {
            err.report();
            ContactFormTemplate {
                form: FormView {
                    notice: Some(Notice::for_error(&err)),
                    ..FormView::refill(&form)
                },
            }
            .into_response()
        }
    }
}
