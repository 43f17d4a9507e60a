// Job listings: storage and identity seams, form conversion, lifecycle
// orchestration and the HTTP handlers on top.

pub mod form;
pub mod handlers;
pub mod identity;
pub mod lifecycle;
pub mod store;
