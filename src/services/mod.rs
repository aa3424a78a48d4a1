pub mod ai;
pub mod conversation;
pub mod emergency;
pub mod faq;
pub mod router;
pub mod session;
