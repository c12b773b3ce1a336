//! Pure betting rules: wallet arithmetic, settlement and matching.
//!
//! Nothing here touches the database; the bet service loads rows, applies
//! these rules and writes the results back inside one transaction.

pub mod ledger;
pub mod matching;
