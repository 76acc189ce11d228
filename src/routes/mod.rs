mod dispatch;
mod health_check;
mod preview;
mod single;
mod subscriptions;

pub use dispatch::*;
pub use health_check::*;
pub use preview::*;
pub use single::*;
pub use subscriptions::*;
