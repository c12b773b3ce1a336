//! Admin API client (operator console → pitbet server).
//!
//! All requests carry the plaintext admin secret in the
//! `Pitbet-Admin-Authorization` header.

use reqwest::Client;
use url::Url;
use uuid::Uuid;

use super::{ClientError, parse_response};
use crate::objects::admin::{ListBetsQuery, ListEventsQuery};
use crate::objects::{
    BetResponse, CreateEventRequest, CreateFightRequest, EventResponse, FightResponse, FightResult,
    Page, SettleFightRequest, SettlementResponse, UpdateEventStatusRequest, UserResponse,
    WalletAdjustment, WalletResponse, WalletTransactionResponse,
};
use crate::signature::ADMIN_AUTH_HEADER;

/// Typed HTTP client for the pitbet **Admin API**.
#[derive(Debug, Clone)]
pub struct AdminClient {
    http: Client,
    base_url: Url,
    admin_secret: String,
}

impl AdminClient {
    pub fn new(base_url: Url, admin_secret: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            admin_secret: admin_secret.into(),
        }
    }

    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    pub async fn list_events(
        &self,
        query: &ListEventsQuery,
    ) -> Result<Vec<EventResponse>, ClientError> {
        let url = self.base_url.join("/api/v1/admin/events")?;
        let resp = self
            .http
            .get(url)
            .header(ADMIN_AUTH_HEADER, &self.admin_secret)
            .query(query)
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn create_event(
        &self,
        request: &CreateEventRequest,
    ) -> Result<EventResponse, ClientError> {
        self.post_json("/api/v1/admin/events", request).await
    }

    pub async fn update_event_status(
        &self,
        event_id: Uuid,
        request: &UpdateEventStatusRequest,
    ) -> Result<EventResponse, ClientError> {
        self.post_json(&format!("/api/v1/admin/events/{event_id}/status"), request)
            .await
    }

    pub async fn create_fight(
        &self,
        event_id: Uuid,
        request: &CreateFightRequest,
    ) -> Result<FightResponse, ClientError> {
        self.post_json(&format!("/api/v1/admin/events/{event_id}/fights"), request)
            .await
    }

    pub async fn open_betting(&self, fight_id: Uuid) -> Result<FightResponse, ClientError> {
        self.post_empty(&format!("/api/v1/admin/fights/{fight_id}/open"))
            .await
    }

    /// Closes betting; unmatched bets are refunded.
    pub async fn close_betting(&self, fight_id: Uuid) -> Result<FightResponse, ClientError> {
        self.post_empty(&format!("/api/v1/admin/fights/{fight_id}/close"))
            .await
    }

    pub async fn settle_fight(
        &self,
        fight_id: Uuid,
        result: FightResult,
    ) -> Result<SettlementResponse, ClientError> {
        self.post_json(
            &format!("/api/v1/admin/fights/{fight_id}/settle"),
            &SettleFightRequest { result },
        )
        .await
    }

    pub async fn list_bets(&self, query: &ListBetsQuery) -> Result<Vec<BetResponse>, ClientError> {
        let url = self.base_url.join("/api/v1/admin/bets")?;
        let resp = self
            .http
            .get(url)
            .header(ADMIN_AUTH_HEADER, &self.admin_secret)
            .query(query)
            .send()
            .await?;
        parse_response(resp).await
    }

    /// `GET /api/v1/admin/users/by-name/{username}`
    pub async fn find_user(&self, username: &str) -> Result<UserResponse, ClientError> {
        let url = self.base_url.join(&format!(
            "/api/v1/admin/users/by-name/{}",
            urlencoding::encode(username)
        ))?;
        let resp = self
            .http
            .get(url)
            .header(ADMIN_AUTH_HEADER, &self.admin_secret)
            .send()
            .await?;
        parse_response(resp).await
    }

    pub async fn deposit(
        &self,
        user_id: Uuid,
        adjustment: &WalletAdjustment,
    ) -> Result<WalletResponse, ClientError> {
        self.post_json(&format!("/api/v1/admin/wallets/{user_id}/deposit"), adjustment)
            .await
    }

    pub async fn withdraw(
        &self,
        user_id: Uuid,
        adjustment: &WalletAdjustment,
    ) -> Result<WalletResponse, ClientError> {
        self.post_json(&format!("/api/v1/admin/wallets/{user_id}/withdraw"), adjustment)
            .await
    }

    pub async fn wallet_transactions(
        &self,
        user_id: Uuid,
        page: &Page,
    ) -> Result<Vec<WalletTransactionResponse>, ClientError> {
        let url = self
            .base_url
            .join(&format!("/api/v1/admin/wallets/{user_id}/transactions"))?;
        let resp = self
            .http
            .get(url)
            .header(ADMIN_AUTH_HEADER, &self.admin_secret)
            .query(page)
            .send()
            .await?;
        parse_response(resp).await
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ClientError>
    where
        B: serde::Serialize,
        R: serde::de::DeserializeOwned,
    {
        let url = self.base_url.join(path)?;
        let resp = self
            .http
            .post(url)
            .header(ADMIN_AUTH_HEADER, &self.admin_secret)
            .json(body)
            .send()
            .await?;
        parse_response(resp).await
    }

    async fn post_empty<R>(&self, path: &str) -> Result<R, ClientError>
    where
        R: serde::de::DeserializeOwned,
    {
        let url = self.base_url.join(path)?;
        let resp = self
            .http
            .post(url)
            .header(ADMIN_AUTH_HEADER, &self.admin_secret)
            .send()
            .await?;
        parse_response(resp).await
    }
}
