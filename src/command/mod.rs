mod push;
mod status;

pub use push::run_fast_push;
pub use status::run_fast_push_status;
