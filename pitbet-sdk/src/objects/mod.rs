//! Request and response types shared by the server and its clients.

pub mod admin;
pub mod bets;
pub mod common;
pub mod events;
pub mod pago;
pub mod users;
pub mod wallets;
pub mod ws;

pub use admin::{Page, clamp_pagination};
pub use bets::{AcceptBetRequest, BetResponse, CancelBetRequest, MyBetsRequest, PlaceBetRequest};
pub use common::{
    BetKind, BetStatus, EventStatus, FightResult, FightStatus, ProposalStatus, Side,
    WalletTransactionKind,
};
pub use events::{
    CreateEventRequest, CreateFightRequest, EventResponse, FightResponse, SettleFightRequest,
    SettlementResponse, UpdateEventStatusRequest,
};
pub use pago::{IncomingPagoRequest, PagoProposalResponse, ProposePagoRequest, ResolvePagoRequest};
pub use users::{RegisterUserRequest, UserResponse};
pub use wallets::{
    GetWalletRequest, ListWalletTransactionsRequest, WalletAdjustment, WalletResponse,
    WalletTransactionResponse,
};
