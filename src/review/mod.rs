pub mod lifecycle;
pub mod policy;

pub use lifecycle::PullRequestService;
