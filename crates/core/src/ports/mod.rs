mod ledger;
mod wallet;

pub use ledger::*;
pub use wallet::*;
