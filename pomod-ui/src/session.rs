//! Session store
//!
//! SQLite-backed sessions, one row per authenticated client. A session
//! holds the credential for the remote music API; the most recently
//! created session is flagged active and is the one the now-playing
//! poller follows.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use pomod_common::api::types::{
    CreateSessionRequest, CredentialError, SessionView, StoredCredential,
};
use pomod_common::{Error, Result};

/// Value stored in the `token_error` column for a failed refresh
const TOKEN_ERROR_REFRESH_FAILED: &str = "refresh_failed";

/// One authenticated session
#[derive(Debug, Clone)]
pub struct Session {
    pub session_id: Uuid,
    pub display_name: Option<String>,
    pub credential: StoredCredential,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Client-facing view of this session
    pub fn view(&self) -> SessionView {
        SessionView {
            session_id: self.session_id,
            display_name: self.display_name.clone(),
            access_token: self.credential.access_token.clone(),
            expires_at: self.credential.expires_at,
            token_error: self.credential.error,
        }
    }
}

/// CRUD access to the `sessions` table
#[derive(Clone)]
pub struct SessionStore {
    db: SqlitePool,
}

impl SessionStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create a session from an already-obtained credential
    ///
    /// The new session becomes the active one; any previous active flag
    /// is cleared.
    pub async fn create(&self, request: CreateSessionRequest) -> Result<Session> {
        let session_id = Uuid::new_v4();
        let created_at = Utc::now();

        sqlx::query("UPDATE sessions SET is_active = 0 WHERE is_active = 1")
            .execute(&self.db)
            .await?;

        sqlx::query(
            "INSERT INTO sessions
                (session_id, display_name, access_token, refresh_token,
                 expires_at, token_error, is_active, created_at)
             VALUES (?, ?, ?, ?, ?, NULL, 1, ?)",
        )
        .bind(session_id.to_string())
        .bind(&request.display_name)
        .bind(&request.access_token)
        .bind(&request.refresh_token)
        .bind(request.expires_at)
        .bind(created_at.to_rfc3339())
        .execute(&self.db)
        .await?;

        Ok(Session {
            session_id,
            display_name: request.display_name,
            credential: StoredCredential {
                access_token: request.access_token,
                refresh_token: request.refresh_token,
                expires_at: request.expires_at,
                error: None,
            },
            is_active: true,
            created_at,
        })
    }

    /// Look up a session by id
    pub async fn get(&self, session_id: Uuid) -> Result<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT session_id, display_name, access_token, refresh_token,
                    expires_at, token_error, is_active, created_at
             FROM sessions WHERE session_id = ?",
        )
        .bind(session_id.to_string())
        .fetch_optional(&self.db)
        .await?;

        row.map(Session::try_from).transpose()
    }

    /// The session the now-playing poller follows, if any
    pub async fn active(&self) -> Result<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT session_id, display_name, access_token, refresh_token,
                    expires_at, token_error, is_active, created_at
             FROM sessions WHERE is_active = 1
             ORDER BY created_at DESC LIMIT 1",
        )
        .fetch_optional(&self.db)
        .await?;

        row.map(Session::try_from).transpose()
    }

    /// Persist a credential mutated by the token refresher
    ///
    /// Unconditional write: concurrent refreshes race and the last
    /// writer wins, which is acceptable because either credential is
    /// valid and the next expiry heals any divergence.
    pub async fn update_credential(
        &self,
        session_id: Uuid,
        credential: &StoredCredential,
    ) -> Result<()> {
        let token_error = match credential.error {
            Some(CredentialError::RefreshFailed) => Some(TOKEN_ERROR_REFRESH_FAILED),
            None => None,
        };

        sqlx::query(
            "UPDATE sessions
             SET access_token = ?, refresh_token = ?, expires_at = ?, token_error = ?
             WHERE session_id = ?",
        )
        .bind(&credential.access_token)
        .bind(&credential.refresh_token)
        .bind(credential.expires_at)
        .bind(token_error)
        .bind(session_id.to_string())
        .execute(&self.db)
        .await?;

        Ok(())
    }

    /// Remove a session; returns whether a row was deleted
    pub async fn delete(&self, session_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE session_id = ?")
            .bind(session_id.to_string())
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Raw row shape for the sessions table
#[derive(sqlx::FromRow)]
struct SessionRow {
    session_id: String,
    display_name: Option<String>,
    access_token: String,
    refresh_token: Option<String>,
    expires_at: i64,
    token_error: Option<String>,
    is_active: i64,
    created_at: String,
}

impl TryFrom<SessionRow> for Session {
    type Error = Error;

    fn try_from(row: SessionRow) -> Result<Self> {
        let session_id = Uuid::parse_str(&row.session_id)
            .map_err(|e| Error::Internal(format!("Corrupt session id: {}", e)))?;
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| Error::Internal(format!("Corrupt session timestamp: {}", e)))?
            .with_timezone(&Utc);

        let error = match row.token_error.as_deref() {
            Some(TOKEN_ERROR_REFRESH_FAILED) => Some(CredentialError::RefreshFailed),
            Some(other) => {
                return Err(Error::Internal(format!("Unknown token error tag: {}", other)))
            }
            None => None,
        };

        Ok(Session {
            session_id,
            display_name: row.display_name,
            credential: StoredCredential {
                access_token: row.access_token,
                refresh_token: row.refresh_token,
                expires_at: row.expires_at,
                error,
            },
            is_active: row.is_active != 0,
            created_at,
        })
    }
}
