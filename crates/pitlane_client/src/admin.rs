use pitlane_types::{Role, User};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserSort {
    #[default]
    Newest,
    Oldest,
    Username,
}

/// Filters applied to the admin user table
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct UserFilter {
    /// Case-insensitive match against username and email
    pub search: Option<String>,
    pub role: Option<Role>,
    pub banned: Option<bool>,
}

impl UserFilter {
    pub fn matches(&self, user: &User) -> bool {
        if let Some(role) = self.role {
            if user.role != role {
                return false;
            }
        }

        if let Some(banned) = self.banned {
            if user.banned != banned {
                return false;
            }
        }

        match self.search.as_deref().map(str::trim) {
            Some(needle) if !needle.is_empty() => {
                let needle = needle.to_lowercase();
                user.username.to_lowercase().contains(&needle)
                    || user
                        .email
                        .as_deref()
                        .map(|email| email.to_lowercase().contains(&needle))
                        .unwrap_or(false)
            }
            _ => true,
        }
    }
}

/// Client-side sort and filter over the page of users currently loaded
#[derive(Debug, Clone, Default)]
pub struct UserTable {
    users: Vec<User>,
    pub sort: UserSort,
    pub filter: UserFilter,
}

impl UserTable {
    pub fn new(users: Vec<User>) -> Self {
        UserTable {
            users,
            ..Default::default()
        }
    }

    pub fn set_users(&mut self, users: Vec<User>) {
        self.users = users;
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Users to display, filtered then sorted
    pub fn rows(&self) -> Vec<&User> {
        let mut rows: Vec<&User> = self
            .users
            .iter()
            .filter(|user| self.filter.matches(user))
            .collect();

        match self.sort {
            UserSort::Newest => rows.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            UserSort::Oldest => rows.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            UserSort::Username => rows.sort_by_key(|user| user.username.to_lowercase()),
        }
        rows
    }

    /// Replaces a user after a role or ban change came back from the server
    pub fn apply(&mut self, updated: User) -> bool {
        match self.users.iter_mut().find(|user| user.id == updated.id) {
            Some(user) => {
                *user = updated;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<User> {
        let index = self.users.iter().position(|user| user.id == id)?;
        Some(self.users.remove(index))
    }
}
