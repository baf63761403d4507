use crate::database::Document;
use crate::middleware::{ApiResponse, Caller};

/// GET /auth/me - the authenticated user
pub async fn me(caller: Caller) -> ApiResponse<Document> {
    ApiResponse::success(caller.user)
}
