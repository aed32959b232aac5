//! OAuth 1.0a credential shapes.
//!
//! The consumer half is provisioned by the operator; the token half is
//! written once by an external authorization flow. Both are plain TOML
//! documents read at startup and merged into [`Credentials`].

use std::{fs, path::Path};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{AvatropeError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppCredentials {
    pub consumer_key: String,
    pub consumer_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCredentials {
    pub token: String,
    pub token_secret: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub token: String,
    pub token_secret: String,
}

impl Credentials {
    pub fn new(app: AppCredentials, user: UserCredentials) -> Self {
        Self {
            consumer_key: app.consumer_key,
            consumer_secret: app.consumer_secret,
            token: user.token,
            token_secret: user.token_secret,
        }
    }

    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(app_path: P, user_path: Q) -> Result<Self> {
        let app: AppCredentials = read_document(app_path.as_ref(), "app")?;
        let user: UserCredentials = read_document(user_path.as_ref(), "user")?;
        let credentials = Self::new(app, user);
        credentials.validate()?;
        Ok(credentials)
    }

    fn validate(&self) -> Result<()> {
        let fields = [
            ("consumer_key", &self.consumer_key),
            ("consumer_secret", &self.consumer_secret),
            ("token", &self.token),
            ("token_secret", &self.token_secret),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(AvatropeError::Credentials(format!("{name} must not be empty")));
            }
        }
        Ok(())
    }
}

fn read_document<T: DeserializeOwned>(path: &Path, label: &str) -> Result<T> {
    let contents = fs::read_to_string(path).map_err(|err| {
        AvatropeError::Credentials(format!(
            "unable to read {label} credentials {}: {err}",
            path.display()
        ))
    })?;
    toml::from_str(&contents).map_err(|err| {
        AvatropeError::Credentials(format!(
            "failed to parse {label} credentials {}: {err}",
            path.display()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_app_and_user_documents() {
        let dir = tempfile::tempdir().expect("temp dir");
        let app = dir.path().join("app.toml");
        let user = dir.path().join("user.toml");
        fs::write(&app, "consumer_key = \"ck\"\nconsumer_secret = \"cs\"\n").unwrap();
        fs::write(&user, "token = \"tk\"\ntoken_secret = \"ts\"\n").unwrap();

        let creds = Credentials::load(&app, &user).expect("load credentials");
        assert_eq!(creds.consumer_key, "ck");
        assert_eq!(creds.consumer_secret, "cs");
        assert_eq!(creds.token, "tk");
        assert_eq!(creds.token_secret, "ts");
    }

    #[test]
    fn missing_user_document_is_reported() {
        let dir = tempfile::tempdir().expect("temp dir");
        let app = dir.path().join("app.toml");
        fs::write(&app, "consumer_key = \"ck\"\nconsumer_secret = \"cs\"\n").unwrap();

        let err = Credentials::load(&app, dir.path().join("user.toml")).unwrap_err();
        assert!(matches!(err, AvatropeError::Credentials(msg) if msg.contains("user")));
    }

    #[test]
    fn blank_secret_is_rejected() {
        let dir = tempfile::tempdir().expect("temp dir");
        let app = dir.path().join("app.toml");
        let user = dir.path().join("user.toml");
        fs::write(&app, "consumer_key = \"ck\"\nconsumer_secret = \"\"\n").unwrap();
        fs::write(&user, "token = \"tk\"\ntoken_secret = \"ts\"\n").unwrap();

        assert!(Credentials::load(&app, &user).is_err());
    }
}
