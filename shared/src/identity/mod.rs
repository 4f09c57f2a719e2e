mod error;
mod identity_table;
mod network_id;

pub use error::IdentityError;
pub use identity_table::{IdRange, IdentityTable};
pub use network_id::{NetworkId, FIRST_SELF_ID, ROOT_ID};
