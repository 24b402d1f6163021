use config::{Config, ConfigError, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::{domain::UserEmail, email_client::EmailClient};

#[derive(Deserialize, Debug, Clone)]
pub struct Settings{
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub email: EmailClientSettings
}

#[derive(Deserialize, Debug, Clone)]
pub struct ApplicationSettings{
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub cors_origin: String,
    pub uploads_dir: String
}

#[derive(Deserialize, Debug, Clone)]
pub struct DatabaseSettings{
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: SecretString,
    pub name: String
}

impl DatabaseSettings {
    // Server url without a database, used to create databases
    pub fn server_url(&self) -> String{
        format!(
            "postgres://{}:{}@{}:{}",
            self.username,
            self.password.expose_secret(),
            self.host,
            self.port
        )
    }

    pub fn url(&self) -> String{
        format!("{}/{}", self.server_url(), self.name)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct EmailClientSettings{
    pub api_uri: String,
    pub sender: String,
    pub authorization_token: SecretString,
    pub timeout_milliseconds: u64
}

impl EmailClientSettings {
    pub fn sender(&self) -> Result<UserEmail, String>{
        UserEmail::parse(self.sender.clone())
    }

    pub fn client(&self) -> Result<EmailClient, anyhow::Error>{
        let sender = self.sender()
                        .map_err(|e| anyhow::anyhow!(e))?;

        let client = EmailClient::new(
            self.api_uri.clone(),
            sender,
            self.authorization_token.clone(),
            std::time::Duration::from_millis(self.timeout_milliseconds)
        )?;

        Ok(client)
    }
}

// Plain environment variables recognised on top of configuration/base.yaml
const ENV_OVERRIDES: [(&str, &str); 12] = [
    ("PORT", "application.port"),
    ("FRONTEND_URL", "application.frontend_url"),
    ("CORS_ORIGIN", "application.cors_origin"),
    ("UPLOADS_DIR", "application.uploads_dir"),
    ("DB_HOST", "database.host"),
    ("DB_PORT", "database.port"),
    ("DB_USER", "database.username"),
    ("DB_PASSWORD", "database.password"),
    ("DB_NAME", "database.name"),
    ("EMAIL_HOST", "email.api_uri"),
    ("EMAIL_PASS", "email.authorization_token"),
    ("EMAIL_FROM", "email.sender"),
];

impl Settings{
    pub fn get() -> Result<Self, ConfigError>{
        let mut builder = Config::builder()
            .add_source(File::with_name("configuration/base.yaml"))
            .add_source(
                Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
            );

        for (variable, key) in ENV_OVERRIDES {
            builder = builder.set_override_option(key, std::env::var(variable).ok())?;
        }

        builder.build()?.try_deserialize::<Settings>()
    }
}
