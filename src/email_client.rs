use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::domain::UserEmail;

/// Transactional stream every FrontDash notification is sent on.
const MESSAGE_STREAM: &str = "outbound";

/// A rendered email, ready to hand to [`EmailClient::send`].
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub subject: String,
    pub html: String,
    pub text: String,
}

// Client for the HTTP email API (Postmark-compatible `/email` endpoint)
#[derive(Clone)]
pub struct EmailClient {
    http_client: Client,
    base_url: String,
    sender: UserEmail,
    authorization_token: SecretString,
}

impl EmailClient {
    pub fn new(
        base_url: String,
        sender: UserEmail,
        authorization_token: SecretString,
        timeout: Duration,
    ) -> Result<EmailClient, reqwest::Error> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            sender,
            authorization_token,
        })
    }

    #[tracing::instrument(
        "Sending email",
        skip(self, message),
        fields(recipient = %recipient.as_ref(), subject = %message.subject)
    )]
    pub async fn send(
        &self,
        recipient: &UserEmail,
        message: &EmailMessage,
    ) -> Result<(), reqwest::Error> {
        let body = SendEmailRequest {
            from: self.sender.as_ref(),
            to: recipient.as_ref(),
            subject: &message.subject,
            html_body: &message.html,
            text_body: &message.text,
            message_stream: MESSAGE_STREAM,
        };

        self.http_client
            .post(format!("{}/email", self.base_url))
            .header(
                "X-Postmark-Server-Token",
                self.authorization_token.expose_secret(),
            )
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html_body: &'a str,
    text_body: &'a str,
    message_stream: &'a str,
}
