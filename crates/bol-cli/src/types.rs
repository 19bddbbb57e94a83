//! Typed records extracted from portal pages.

/// Who is logged in and how many notifications are waiting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSummary {
    pub display_name: String,
    pub unread_count: u32,
}

impl ProfileSummary {
    /// Plural only for more than one unread notification.
    pub fn notification_noun(&self) -> &'static str {
        if self.unread_count > 1 {
            "notifications"
        } else {
            "notification"
        }
    }
}

/// One unread notification as listed on the notifications page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRecord {
    /// 1-based display index, assigned in page order on every load.
    pub index: usize,
    pub title: String,
    /// Display text as shown by the portal; not parsed.
    pub date: String,
    /// Absolute URL of the thread page.
    pub thread_url: String,
}

/// Text content of the first post in a thread view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadBody {
    pub text: String,
}
