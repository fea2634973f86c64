use chrono::{Duration, Utc};
use pitlane_types::{Author, Comment, Notification, NotificationKind, Post, Role, User};

pub fn make_user(id: &str, username: &str, role: Role) -> User {
    User {
        id: id.to_string(),
        username: username.to_string(),
        email: Some(format!("{username}@pitlane.test")),
        role,
        avatar: None,
        bio: None,
        car: Some("1991 Mazda MX-5".to_string()),
        banned: false,
        created_at: Utc::now() - Duration::days(30),
    }
}

fn author(id: &str) -> Author {
    Author {
        id: id.to_string(),
        username: format!("driver_{id}"),
        avatar: None,
    }
}

pub fn make_post(id: &str, author_id: &str, likes: &[&str]) -> Post {
    Post {
        id: id.to_string(),
        title: format!("Build thread {id}"),
        content: "Coilovers went in this weekend".to_string(),
        author: author(author_id),
        category: Some("builds".to_string()),
        images: vec![],
        likes: likes.iter().map(|like| like.to_string()).collect(),
        comment_count: 0,
        created_at: Utc::now() - Duration::hours(2),
        updated_at: None,
    }
}

pub fn make_comment(id: &str, post_id: &str, parent_id: Option<&str>) -> Comment {
    Comment {
        id: id.to_string(),
        post_id: post_id.to_string(),
        content: format!("Reply {id}"),
        author: author("u2"),
        parent_id: parent_id.map(str::to_string),
        likes: vec![],
        replies: vec![],
        created_at: Utc::now() - Duration::minutes(5),
    }
}

pub fn make_notification(id: &str, read: bool) -> Notification {
    Notification {
        id: id.to_string(),
        kind: NotificationKind::Like,
        message: "driver_u2 liked your post".to_string(),
        read,
        link: Some("/posts/p1".to_string()),
        created_at: Utc::now() - Duration::minutes(1),
    }
}
