pub mod object;
pub mod user;
pub mod work;

pub use object::ObjectSite;
pub use user::{Role, User};
pub use work::{FinishedWork, HistoryWork, ReceivedWork, Recipient, WorkItem};
