//! REST destination-store client
//!
//! Talks json-server conventions: `POST /teams` and `POST /players` with one
//! object per request, `GET /teams` / `GET /players` for the full contents,
//! `DELETE /{collection}/{id}` per record. The store assigns numeric ids on
//! create; the gateway learns them only by reading back.

use async_trait::async_trait;
use rosterlink_common::model::{PlayerWrite, StoreSnapshot, StoredPlayer, StoredTeam, Team};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::transfer::DestinationStore;

/// REST store client errors
#[derive(Debug, Error)]
pub enum RestError {
    /// Request exceeded the client timeout
    #[error("Destination store timed out")]
    Timeout,

    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Store returned a non-success HTTP status
    #[error("Destination store returned {0}: {1}")]
    Api(u16, String),

    /// Failed to parse a store response body
    #[error("Parse error: {0}")]
    Parse(String),
}

impl RestError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RestError::Timeout
        } else {
            RestError::Network(e.to_string())
        }
    }
}

/// REST destination-store client
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: String,
}

impl RestClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn post_one<T: Serialize>(&self, path: &str, body: &T) -> Result<(), RestError> {
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(RestError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RestError::Api(status.as_u16(), body));
        }
        Ok(())
    }

    async fn get_collection<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, RestError> {
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(RestError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RestError::Api(status.as_u16(), body));
        }

        response
            .json()
            .await
            .map_err(|e| RestError::Parse(e.to_string()))
    }

    async fn delete_one(&self, path: &str, id: i64) -> Result<(), RestError> {
        let response = self
            .http
            .delete(format!("{}/{}", self.url(path), id))
            .send()
            .await
            .map_err(RestError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(RestError::Api(status.as_u16(), String::new()));
        }
        Ok(())
    }
}

#[async_trait]
impl DestinationStore for RestClient {
    /// Delete every current player, then every current team.
    ///
    /// Players go first so team deletion never strands a live foreign key.
    async fn clear(&self) -> Result<(), RestError> {
        let snapshot = self.fetch_all().await?;
        for player in &snapshot.players {
            self.delete_one("players", player.id).await?;
        }
        for team in &snapshot.teams {
            self.delete_one("teams", team.id).await?;
        }
        tracing::debug!(
            teams = snapshot.teams.len(),
            players = snapshot.players.len(),
            "Cleared destination store"
        );
        Ok(())
    }

    async fn create_teams(&self, teams: &[Team]) -> Result<(), RestError> {
        for team in teams {
            self.post_one("teams", team).await?;
        }
        tracing::info!(count = teams.len(), "Wrote teams to destination store");
        Ok(())
    }

    async fn create_players(&self, players: &[PlayerWrite]) -> Result<(), RestError> {
        for player in players {
            self.post_one("players", player).await?;
        }
        tracing::info!(count = players.len(), "Wrote players to destination store");
        Ok(())
    }

    async fn fetch_all(&self) -> Result<StoreSnapshot, RestError> {
        let teams: Vec<StoredTeam> = self.get_collection("teams").await?;
        let players: Vec<StoredPlayer> = self.get_collection("players").await?;
        Ok(StoreSnapshot { teams, players })
    }
}
