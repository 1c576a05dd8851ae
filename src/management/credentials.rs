use std::{collections::BTreeMap, io::ErrorKind, path::PathBuf};

use crate::{
    Res,
    types::{PendingAuthorization, Session},
    warning,
};

const ACCESS_TOKEN: &str = "access_token";
const REFRESH_TOKEN: &str = "refresh_token";
const EXPIRES_AT: &str = "expires_at";
const CODE_VERIFIER: &str = "code_verifier";
const AUTH_STATE: &str = "auth_state";

const SESSION_KEYS: [&str; 3] = [ACCESS_TOKEN, REFRESH_TOKEN, EXPIRES_AT];
const PENDING_KEYS: [&str; 2] = [CODE_VERIFIER, AUTH_STATE];

type Entries = BTreeMap<String, String>;

/// Durable key-value storage for the session and the pending authorization.
///
/// All entries live in one JSON object in `credentials.json`. Every write
/// replaces the whole file through a temporary file and a rename, so a reader
/// never sees half of a session.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            path: data_dir.join("credentials.json"),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub async fn save(&self, session: &Session) -> Res<()> {
        let mut entries = self.read_entries().await?;
        for key in SESSION_KEYS {
            entries.remove(key);
        }

        entries.insert(ACCESS_TOKEN.to_string(), session.access_token.clone());
        if let Some(refresh_token) = &session.refresh_token {
            entries.insert(REFRESH_TOKEN.to_string(), refresh_token.clone());
        }
        entries.insert(EXPIRES_AT.to_string(), session.expires_at.to_string());

        self.write_entries(&entries).await
    }

    /// Returns the stored session, or `None` if there is no access token or
    /// the stored expiry is not after `now`. An expired or unreadable session
    /// is removed from the store, as is a file that is not valid JSON.
    pub async fn load(&self, now: i64) -> Res<Option<Session>> {
        let entries = self.read_entries().await?;
        let Some(access_token) = entries.get(ACCESS_TOKEN).filter(|t| !t.is_empty()) else {
            return Ok(None);
        };

        let expires_at = entries.get(EXPIRES_AT).and_then(|v| v.parse::<i64>().ok());
        match expires_at {
            Some(expires_at) if expires_at > now => Ok(Some(Session {
                access_token: access_token.clone(),
                refresh_token: entries.get(REFRESH_TOKEN).cloned(),
                expires_at,
            })),
            _ => {
                self.clear_session().await?;
                Ok(None)
            }
        }
    }

    /// Removes every entry, the session and any pending authorization.
    pub async fn clear(&self) -> Res<()> {
        match async_fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn save_pending(&self, pending: &PendingAuthorization) -> Res<()> {
        let mut entries = self.read_entries().await?;
        entries.insert(CODE_VERIFIER.to_string(), pending.code_verifier.clone());
        entries.insert(AUTH_STATE.to_string(), pending.state.clone());
        self.write_entries(&entries).await
    }

    /// Read-once access to the pending authorization: it is deleted from the
    /// store before being returned.
    pub async fn take_pending(&self) -> Res<Option<PendingAuthorization>> {
        let mut entries = self.read_entries().await?;
        let verifier = entries.remove(CODE_VERIFIER);
        let state = entries.remove(AUTH_STATE);
        if verifier.is_none() && state.is_none() {
            return Ok(None);
        }

        self.write_entries(&entries).await?;
        Ok(verifier
            .zip(state)
            .map(|(code_verifier, state)| PendingAuthorization {
                code_verifier,
                state,
            }))
    }

    pub async fn has_pending(&self) -> Res<bool> {
        let entries = self.read_entries().await?;
        Ok(PENDING_KEYS.iter().any(|k| entries.contains_key(*k)))
    }

    pub async fn clear_pending(&self) -> Res<()> {
        self.remove_keys(&PENDING_KEYS).await
    }

    async fn clear_session(&self) -> Res<()> {
        self.remove_keys(&SESSION_KEYS).await
    }

    async fn remove_keys(&self, keys: &[&str]) -> Res<()> {
        let mut entries = self.read_entries().await?;
        let before = entries.len();
        entries.retain(|k, _| !keys.contains(&k.as_str()));
        if entries.len() == before {
            return Ok(());
        }
        self.write_entries(&entries).await
    }

    async fn read_entries(&self) -> Res<Entries> {
        let content = match async_fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warning!(
                    "Discarding unreadable credentials in {}: {}",
                    self.path.display(),
                    e
                );
                self.clear().await?;
                Ok(Entries::new())
            }
        }
    }

    async fn write_entries(&self, entries: &Entries) -> Res<()> {
        if entries.is_empty() {
            return self.clear().await;
        }

        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        async_fs::write(&tmp, json).await?;
        async_fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
