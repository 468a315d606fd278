//! Domain models for the HealthHub storefront.

mod audit;
mod order;
mod product;
mod reference;
mod session;
mod vendor;

pub use audit::*;
pub use order::*;
pub use product::*;
pub use reference::*;
pub use session::*;
pub use vendor::*;
