pub mod files;
pub mod membership;
pub mod orders;

pub use files::{DownloadedFile, FileLookup, OrderDownloads, OrderFilesState};
pub use membership::{is_membership_active, now_nanos, MembershipGate, MembershipPanel};
pub use orders::{OrderHistory, OrderRow};
