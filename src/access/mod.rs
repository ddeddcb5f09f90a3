//! Static access tables: which tables a role observes, and which cache keys a
//! table change fans out to.

mod role_tables;
mod table_groups;

pub use role_tables::*;
pub use table_groups::*;
