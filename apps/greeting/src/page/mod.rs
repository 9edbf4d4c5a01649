// The birthday page: canned content, per-view sessions and their HTTP handlers.

pub mod content;
pub mod handlers;
pub mod session;
pub mod store;

pub use session::{PageFactory, PageSession};
pub use store::SessionStore;
