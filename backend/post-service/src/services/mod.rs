/// Business logic services
///
/// Services orchestrate repository calls, validation and metrics so that
/// handlers only translate between HTTP and domain types.
pub mod posts;

pub use posts::PostService;
