//! Merge session services: state ownership, recomposition, upload, notices.

pub mod notice;
pub mod recompose;
pub mod session;
pub mod upload;

pub use notice::{Notice, NoticeLevel};
pub use recompose::{Recomposer, Rendered};
pub use session::{MergeSession, Snapshot};
pub use upload::UploadReport;
