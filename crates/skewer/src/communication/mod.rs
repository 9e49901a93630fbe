mod batch_record;
mod pending_call;
mod submission;

pub(crate) use batch_record::{BatchId, BatchRecord};
pub(crate) use pending_call::PendingCall;
pub use submission::Submission;
