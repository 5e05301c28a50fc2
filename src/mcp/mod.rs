pub mod server;
pub mod stdio;

pub use server::{list_tools, PedalwireMcp};
pub use stdio::serve;
