use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity minted by the guest-user endpoint. Protected routes require it
/// in the `Authorization` header; host authority is checked per room against
/// the session's host id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject(pub Uuid);
