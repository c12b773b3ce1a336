//! Service API client (player frontend backend → pitbet server).
//!
//! All requests use body-signed HMAC-SHA256 authentication via
//! [`SignedObject`].

use reqwest::Client;
use url::Url;
use uuid::Uuid;

use super::{ClientError, parse_response};
use crate::objects::{
    AcceptBetRequest, BetResponse, CancelBetRequest, GetWalletRequest, IncomingPagoRequest,
    ListWalletTransactionsRequest, MyBetsRequest, PagoProposalResponse, PlaceBetRequest,
    ProposePagoRequest, RegisterUserRequest, ResolvePagoRequest, UserResponse, WalletResponse,
    WalletTransactionResponse,
};
use crate::signature::{SIGNATURE_HEADER, Signature, SignedObject};

/// Typed HTTP client for the pitbet **Service API**.
///
/// Every request body is signed with
/// `HMAC-SHA256("{timestamp}.{json}", service_secret)`.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: Client,
    base_url: Url,
    secret: Vec<u8>,
}

impl ServiceClient {
    pub fn new(base_url: Url, service_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            http: Client::new(),
            base_url,
            secret: service_secret.into(),
        }
    }

    /// Replace the default `reqwest::Client` with a custom one (e.g. to
    /// configure timeouts or a proxy).
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    pub async fn register_user(
        &self,
        request: RegisterUserRequest,
    ) -> Result<UserResponse, ClientError> {
        self.post_signed("/api/v1/service/users", request).await
    }

    pub async fn get_wallet(&self, user_id: Uuid) -> Result<WalletResponse, ClientError> {
        self.post_signed("/api/v1/service/wallets/get", GetWalletRequest { user_id })
            .await
    }

    pub async fn list_wallet_transactions(
        &self,
        request: ListWalletTransactionsRequest,
    ) -> Result<Vec<WalletTransactionResponse>, ClientError> {
        self.post_signed("/api/v1/service/wallets/transactions", request)
            .await
    }

    /// `POST /api/v1/service/bets` – place a bet; the response tells whether
    /// it was matched straight away.
    pub async fn place_bet(&self, request: PlaceBetRequest) -> Result<BetResponse, ClientError> {
        self.post_signed("/api/v1/service/bets", request).await
    }

    /// Returns the acceptor's new (matched) bet.
    pub async fn accept_bet(&self, user_id: Uuid, bet_id: Uuid) -> Result<BetResponse, ClientError> {
        self.post_signed(
            "/api/v1/service/bets/accept",
            AcceptBetRequest { user_id, bet_id },
        )
        .await
    }

    pub async fn cancel_bet(&self, user_id: Uuid, bet_id: Uuid) -> Result<BetResponse, ClientError> {
        self.post_signed(
            "/api/v1/service/bets/cancel",
            CancelBetRequest { user_id, bet_id },
        )
        .await
    }

    pub async fn my_bets(&self, request: MyBetsRequest) -> Result<Vec<BetResponse>, ClientError> {
        self.post_signed("/api/v1/service/bets/mine", request).await
    }

    pub async fn propose_pago(
        &self,
        request: ProposePagoRequest,
    ) -> Result<PagoProposalResponse, ClientError> {
        self.post_signed("/api/v1/service/pago/propose", request)
            .await
    }

    /// Accepting returns the proposer's new bet.
    pub async fn accept_pago(
        &self,
        user_id: Uuid,
        proposal_id: Uuid,
    ) -> Result<BetResponse, ClientError> {
        self.post_signed(
            "/api/v1/service/pago/accept",
            ResolvePagoRequest {
                user_id,
                proposal_id,
            },
        )
        .await
    }

    pub async fn reject_pago(
        &self,
        user_id: Uuid,
        proposal_id: Uuid,
    ) -> Result<PagoProposalResponse, ClientError> {
        self.post_signed(
            "/api/v1/service/pago/reject",
            ResolvePagoRequest {
                user_id,
                proposal_id,
            },
        )
        .await
    }

    pub async fn withdraw_pago(
        &self,
        user_id: Uuid,
        proposal_id: Uuid,
    ) -> Result<PagoProposalResponse, ClientError> {
        self.post_signed(
            "/api/v1/service/pago/withdraw",
            ResolvePagoRequest {
                user_id,
                proposal_id,
            },
        )
        .await
    }

    pub async fn incoming_pago(
        &self,
        request: IncomingPagoRequest,
    ) -> Result<Vec<PagoProposalResponse>, ClientError> {
        self.post_signed("/api/v1/service/pago/incoming", request)
            .await
    }

    async fn post_signed<B, R>(&self, path: &str, body: B) -> Result<R, ClientError>
    where
        B: Signature,
        R: serde::de::DeserializeOwned,
    {
        let signed = SignedObject::new(body, &self.secret).map_err(ClientError::Json)?;
        let url = self.base_url.join(path)?;

        let resp = self
            .http
            .post(url)
            .header(SIGNATURE_HEADER, signed.to_header())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(signed.json)
            .send()
            .await?;

        parse_response(resp).await
    }
}
