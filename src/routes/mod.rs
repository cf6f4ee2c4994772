mod fallback;
mod subscriptions;

pub use fallback::fallback;
pub use subscriptions::{
    error_chain_fmt, handle_create_subscription, SubscribeError, MAX_BODY_BYTES,
};
