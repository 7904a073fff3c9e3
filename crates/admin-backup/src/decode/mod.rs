//! Pure decoders from markup elements and compact strings to typed values.
//!
//! Nothing in here touches the network; every function is testable against
//! captured fragments.

pub mod permissions;
pub mod timestamp;
pub mod user;
pub mod vote;

pub use permissions::{
    decode_forum_permissions, decode_page_permissions, ForumPermissions, PagePermissions,
    ScopeFlags,
};
pub use timestamp::{decode_timestamp, TIMESTAMP_PREFIX};
pub use user::{decode_user_reference, UserRef};
pub use vote::{decode_vote_spec, Eligibility, VoteKind, VoteSpec, VoteToggle};
