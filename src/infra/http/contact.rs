use askama::Template;
use axum::{
    Form,
    response::{IntoResponse, Response},
};
use datastar::prelude::ElementPatchMode;
use tracing::{debug, info};

use crate::{
    application::{
        contact::{CONTACT_THANKS, ContactForm},
        error::HttpError,
        stream::StreamBuilder,
    },
    presentation::{partials::ContactStatusPartial, views::TemplateRenderError},
};

const SOURCE: &str = "folio::infra::http::contact";
const STATUS_SELECTOR: &str = "#contact-status";
const RESET_FORM: &str = "document.getElementById('contact-form')?.reset()";

/// Acknowledge a contact form submission with a status patch.
pub(super) async fn contact_submit(Form(form): Form<ContactForm>) -> Response {
    let outcome = form.validate();
    let status = match &outcome {
        Ok(message) => {
            info!(
                target = SOURCE,
                name_chars = message.name.chars().count(),
                message_chars = message.message.chars().count(),
                "contact message received"
            );
            ContactStatusPartial {
                sent: true,
                message: CONTACT_THANKS.to_string(),
            }
        }
        Err(err) => {
            debug!(target = SOURCE, error = %err, "contact form rejected");
            ContactStatusPartial {
                sent: false,
                message: err.to_string(),
            }
        }
    };

    let html = match status.render() {
        Ok(html) => html,
        Err(err) => {
            return HttpError::from(TemplateRenderError::of::<ContactStatusPartial>(err))
                .into_response();
        }
    };

    let mut stream = StreamBuilder::new();
    stream.push_patch(html, STATUS_SELECTOR, ElementPatchMode::Inner);
    if outcome.is_ok() {
        stream.push_script(RESET_FORM.to_string());
    }
    stream.into_response()
}
