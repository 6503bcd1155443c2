pub mod document;
pub mod session;
pub mod user;

pub use document::*;
pub use session::*;
pub use user::*;
