pub mod control;
pub mod server;

pub use control::SharedServer;
pub use server::{DocumentServer, health_check};
