use serde::{Deserialize, Serialize};

/// Like state of a single post or comment as seen by the current user
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngagementState {
    pub has_liked: bool,
    pub like_count: u64,
}

/// The exact change a toggle applied, so it can be inverted later
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeDelta {
    pub liked: bool,
    pub count_change: i8,
}

impl EngagementState {
    pub fn new(has_liked: bool, like_count: u64) -> Self {
        EngagementState {
            has_liked,
            like_count,
        }
    }

    /// Derives the state from a list of user ids that liked the item
    pub fn from_likes(likes: &[String], user_id: Option<&str>) -> Self {
        let has_liked = user_id
            .map(|id| likes.iter().any(|like| like == id))
            .unwrap_or(false);

        EngagementState {
            has_liked,
            like_count: likes.len() as u64,
        }
    }

    pub fn toggle(&mut self) -> LikeDelta {
        if self.has_liked {
            self.has_liked = false;
            // a count already at zero stays there; the delta records that
            let count_change = if self.like_count > 0 {
                self.like_count -= 1;
                -1
            } else {
                0
            };
            LikeDelta {
                liked: false,
                count_change,
            }
        } else {
            self.has_liked = true;
            self.like_count += 1;
            LikeDelta {
                liked: true,
                count_change: 1,
            }
        }
    }

    /// Undoes a toggle after its request failed.
    ///
    /// When the state still shows what `delta` produced, the exact inverse is
    /// applied. If an overlapping toggle has flipped it since, the failed call
    /// is undone as one more flip, which is what the server saw: only the
    /// successful toggles landed.
    pub fn revert(&mut self, delta: LikeDelta) {
        if self.has_liked != delta.liked {
            self.toggle();
            return;
        }

        self.has_liked = !delta.liked;
        match delta.count_change {
            1 => self.like_count = self.like_count.saturating_sub(1),
            -1 => self.like_count += 1,
            _ => {}
        }
    }
}
