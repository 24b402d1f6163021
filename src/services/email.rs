use std::{error::Error, fmt::Debug};

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use secrecy::{ExposeSecret, SecretString};

use crate::{
    domain::UserEmail,
    email_client::{EmailClient, EmailMessage},
    response,
    utils::error_fmt_chain,
};

/// Escapes text for interpolation into an HTML body.
fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

impl EmailMessage {
    /// Paragraphs are plain text; a `\n` inside one becomes a `<br>`.
    fn from_paragraphs(subject: String, paragraphs: &[String]) -> Self {
        let html = paragraphs
            .iter()
            .map(|p| format!("<p>{}</p>", escape_html(p).replace('\n', "<br>")))
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            subject,
            html,
            text: paragraphs.join("\n\n"),
        }
    }
}

pub fn registration_pending(restaurant_name: &str) -> EmailMessage {
    EmailMessage::from_paragraphs(
        "FrontDash registration received".to_string(),
        &[
            format!("Thank you for registering {} with FrontDash.", restaurant_name),
            "Your application is pending review. We will email you once an administrator has approved it.".to_string(),
        ],
    )
}

/// `temporary_password` is `None` when the owner already had a login.
pub fn approval_credentials(
    restaurant_name: &str,
    username: &str,
    temporary_password: Option<&SecretString>,
    login_url: &str,
) -> EmailMessage {
    let credentials = match temporary_password {
        Some(password) => format!(
            "Username: {}\nTemporary password: {}\nPlease change your password after your first login.",
            username,
            password.expose_secret()
        ),
        None => format!(
            "Sign in with your existing credentials for username {}.",
            username
        ),
    };

    EmailMessage::from_paragraphs(
        "Your FrontDash restaurant has been approved".to_string(),
        &[
            format!("Good news! {} is now live on FrontDash.", restaurant_name),
            credentials,
            format!("Sign in at {}", login_url),
        ],
    )
}

pub fn registration_rejected(restaurant_name: &str, reason: Option<&str>) -> EmailMessage {
    let mut paragraphs = vec![format!(
        "We are sorry, the registration of {} on FrontDash was not approved.",
        restaurant_name
    )];
    if let Some(reason) = reason {
        paragraphs.push(format!("Reason: {}", reason));
    }
    EmailMessage::from_paragraphs("FrontDash registration update".to_string(), &paragraphs)
}

pub fn withdrawal_approved(restaurant_name: &str) -> EmailMessage {
    EmailMessage::from_paragraphs(
        "FrontDash withdrawal approved".to_string(),
        &[
            format!("{} has been withdrawn from FrontDash and no longer accepts orders.", restaurant_name),
            "Thank you for working with us.".to_string(),
        ],
    )
}

pub fn staff_credentials(
    first_name: &str,
    username: &str,
    temporary_password: &SecretString,
    login_url: &str,
) -> EmailMessage {
    EmailMessage::from_paragraphs(
        "Your FrontDash staff account".to_string(),
        &[
            format!("Hello {}, a FrontDash staff account has been created for you.", first_name),
            format!(
                "Username: {}\nTemporary password: {}\nYou will be asked to choose a new password when you first sign in.",
                username,
                temporary_password.expose_secret()
            ),
            format!("Sign in at {}", login_url),
        ],
    )
}

/// Sends a notification that accompanies a state change. Failures are
/// logged and reported as `false`, never propagated.
#[tracing::instrument(
    "Sending notification email",
    skip(email_client, message),
    fields(subject = %message.subject)
)]
pub async fn send_best_effort(
    email_client: &EmailClient,
    recipient: &str,
    message: &EmailMessage,
) -> bool {
    let recipient = match UserEmail::parse(recipient.to_string()) {
        Ok(email) => email,
        Err(e) => {
            tracing::warn!("Skipping notification to invalid address: {}", e);
            return false;
        }
    };

    match email_client
        .send(&recipient, message)
        .await
    {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error.cause_chain = ?e, "Failed to send notification email");
            false
        }
    }
}

#[derive(thiserror::Error)]
pub enum NotificationError {
    #[error("{0}")]
    InvalidRecipient(String),
    #[error("Subject and text are required")]
    MissingContent,
    #[error("Failed to send email")]
    SendFailed(#[from] reqwest::Error),
}

impl Debug for NotificationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

impl ResponseError for NotificationError {
    fn status_code(&self) -> StatusCode {
        match self {
            NotificationError::InvalidRecipient(_) | NotificationError::MissingContent => {
                StatusCode::BAD_REQUEST
            }
            NotificationError::SendFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        response::failure(self.status_code(), self)
    }
}

/// Sends an arbitrary email on behalf of the frontend. Unlike
/// [`send_best_effort`], failures are returned to the caller.
#[tracing::instrument(
    "Sending requested email",
    skip(email_client, text, html)
)]
pub async fn send_requested(
    email_client: &EmailClient,
    to: String,
    subject: String,
    text: String,
    html: Option<String>,
) -> Result<(), NotificationError> {
    let recipient = UserEmail::parse(to).map_err(NotificationError::InvalidRecipient)?;

    if subject.trim().is_empty() || text.trim().is_empty() {
        return Err(NotificationError::MissingContent);
    }

    let message = EmailMessage {
        html: html.unwrap_or_else(|| format!("<p>{}</p>", escape_html(&text))),
        subject,
        text,
    };
    email_client.send(&recipient, &message).await?;

    Ok(())
}
