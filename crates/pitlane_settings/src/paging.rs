use crate::env_or;
use serde::Serialize;

/// Page sizes requested by each list view
#[derive(Debug, Clone, Serialize)]
pub struct PagingSettings {
    pub feed_page_size: u32,
    pub comment_page_size: u32,
    pub notification_page_size: u32,
    pub admin_page_size: u32,
}

impl Default for PagingSettings {
    fn default() -> Self {
        PagingSettings {
            feed_page_size: env_or("PITLANE_FEED_PAGE_SIZE", 10u32).max(1),
            comment_page_size: env_or("PITLANE_COMMENT_PAGE_SIZE", 20u32).max(1),
            notification_page_size: env_or("PITLANE_NOTIFICATION_PAGE_SIZE", 20u32).max(1),
            admin_page_size: env_or("PITLANE_ADMIN_PAGE_SIZE", 10u32).max(1),
        }
    }
}
