//! The `broker` module holds the subscriber registry.
//!
//! Topics map to the set of mailboxes subscribed to them. A topic exists
//! only while at least one mailbox is registered under it.

pub mod engine;
pub mod mailbox;
pub mod topic;

pub use engine::{Broker, DEFAULT_MAILBOX_CAPACITY, MAX_MAILBOX_CAPACITY};
pub use mailbox::{Mailbox, MailboxId, Subscription};
