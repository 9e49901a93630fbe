mod batcher;
mod session;

pub use batcher::{
    BatchSubmitter,
    SubmitterState
};

pub use session::Session;
