pub mod engagement;
pub mod error;
pub mod forum;
pub mod http;
pub mod pagination;

pub use engagement::{EngagementState, LikeDelta};
pub use error::{EnvelopeError, TypeError};
pub use forum::*;
pub use http::{ApiEnvelope, AuthToken, RequestType, Routes, UnreadCount, SIGN_IN_ROUTE};
pub use pagination::{Page, PageQuery, Pagination};
