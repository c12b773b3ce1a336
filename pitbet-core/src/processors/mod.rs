//! Background processors.
//!
//! - `PagoExpiryWatcher`: periodically expires stale PAGO proposals and
//!   releases the proposers' frozen stakes.

pub mod pago_expiry;

pub use pago_expiry::PagoExpiryWatcher;
