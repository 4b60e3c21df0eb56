pub mod relay;

pub use relay::{RelayService, RelayState, relay_routes};
