mod admin;
mod auth;
mod comments;
mod notifications;
mod posts;
