mod beneficiary;
mod biller;
mod interest;
mod money;
mod quote;
mod transaction;

pub use beneficiary::*;
pub use biller::*;
pub use interest::*;
pub use money::*;
pub use quote::*;
pub use transaction::*;
