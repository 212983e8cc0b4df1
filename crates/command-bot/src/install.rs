//! Provisioning of the shared secret and the Talk bot registration.

use crate::error::AppResult;
use rand::distributions::Alphanumeric;
use rand::Rng;
use secrecy::SecretString;
use std::fmt;
use std::ops::BitOr;
use std::path::Path;
use tokio::fs;
use tracing::info;

/// Length of a generated shared secret.
pub const SECRET_LENGTH: usize = 128;

/// Load the shared secret at `path`, generating and storing one if absent.
///
/// Running this again never replaces an existing secret.
pub async fn provision_secret(path: &Path) -> AppResult<SecretString> {
    match fs::read_to_string(path).await {
        Ok(secret) if !secret.trim().is_empty() => {
            info!("Using existing bot secret from {:?}", path);
            return Ok(SecretString::new(secret.trim().to_string()));
        }
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e.into()),
    }

    let secret: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SECRET_LENGTH)
        .map(char::from)
        .collect();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }
    fs::write(path, &secret).await?;
    restrict_permissions(path).await?;

    info!("Generated new bot secret at {:?}", path);
    Ok(SecretString::new(secret))
}

#[cfg(unix)]
async fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, std::fs::Permissions::from_mode(0o600)).await
}

#[cfg(not(unix))]
async fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// Capabilities requested when installing the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BotFeatures(u32);

impl BotFeatures {
    pub const NONE: Self = Self(0);
    /// Receive chat messages as webhooks.
    pub const WEBHOOK: Self = Self(1);
    /// Post messages and reactions.
    pub const RESPONSE: Self = Self(2);
    /// Receive chat messages as in-process events.
    pub const EVENT: Self = Self(4);
    /// Receive reactions.
    pub const REACTION: Self = Self(8);

    const NAMES: [(Self, &'static str); 4] = [
        (Self::WEBHOOK, "webhook"),
        (Self::RESPONSE, "response"),
        (Self::EVENT, "event"),
        (Self::REACTION, "reaction"),
    ];

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Feature names as understood by `occ talk:bot:install --feature`.
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(feature, _)| self.contains(*feature))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl BitOr for BotFeatures {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Display for BotFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.names();
        if names.is_empty() {
            f.write_str("none")
        } else {
            f.write_str(&names.join(","))
        }
    }
}

/// Registration of the bot with a Talk server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotInstallation {
    pub name: String,
    pub url: String,
    pub description: String,
    pub features: BotFeatures,
}

impl BotInstallation {
    pub fn new(name: &str, url: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            description: description.to_string(),
            features: BotFeatures::WEBHOOK | BotFeatures::RESPONSE,
        }
    }

    /// The `occ` call an administrator runs once to install the bot.
    ///
    /// `secret` is inserted verbatim, so callers may pass a shell expression
    /// instead of the secret itself.
    pub fn occ_command(&self, secret: &str) -> String {
        let mut command = String::from("occ talk:bot:install");
        for feature in self.features.names() {
            command.push_str(" --feature=");
            command.push_str(feature);
        }
        for argument in [self.name.as_str(), secret, self.url.as_str(), self.description.as_str()]
        {
            command.push(' ');
            command.push_str(&shell_quote(argument));
        }
        command
    }
}

fn shell_quote(argument: &str) -> String {
    if argument.starts_with("\"$(") {
        return argument.to_string();
    }
    format!("'{}'", argument.replace('\'', "'\\''"))
}
