pub mod admin;
pub mod api;
pub mod loader;
pub mod notice;
pub mod optimistic;
pub mod thread;
pub mod timeago;

pub use admin::{UserFilter, UserSort, UserTable};
pub use api::ForumClient;
pub use loader::{
    fetch_with, LoadError, LoadKind, LoadOutcome, PageFetcher, PageState, PaginatedLoader,
    TriggerMode,
};
pub use notice::{ChannelNotifier, LogNotifier, Notice, NoticeLevel, Notifier};
pub use optimistic::{
    EngagementBoard, OptimisticBoard, OptimisticState, Pending, ReadBoard, ReadMark, Reentrancy,
    ToggleOutcome,
};
pub use pitlane_http::{ClientError, MemorySession, Session, SessionStore};
pub use pitlane_settings::{ForumSettings, HttpConfig, PagingSettings};
pub use thread::{CommentThread, VisibleComment};
pub use timeago::{format_relative, time_ago, time_ago_now};
