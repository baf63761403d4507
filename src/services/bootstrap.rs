use serde_json::json;
use uuid::Uuid;

use crate::auth::AccessScope;
use crate::config::BootstrapConfig;
use crate::database::store::document_id;
use crate::filter::FilterData;
use crate::observer::ObserverError;
use crate::services::RecordService;
use crate::types::{Collection, Role};

/// Create the first admin account when none exists and credentials are configured.
/// Returns the id of the created user.
pub async fn ensure_admin(records: &RecordService, bootstrap: &BootstrapConfig) -> Result<Option<Uuid>, ObserverError> {
    let Some((username, email, password)) = bootstrap.admin_credentials() else {
        tracing::debug!("No bootstrap admin credentials configured");
        return Ok(None);
    };

    let admins = records
        .store()
        .count(Collection::Users, &FilterData::new().where_eq("role", Role::Admin))
        .await?;
    if admins > 0 {
        return Ok(None);
    }

    let body = json!({
        "username": username,
        "email": email,
        "password": password,
        "role": Role::Admin,
    });
    let serde_json::Value::Object(body) = body else {
        return Ok(None);
    };

    let user = records.create(Collection::Users, body, AccessScope::Unrestricted, None).await?;
    tracing::info!("Created bootstrap admin '{}'", username);
    Ok(document_id(&user))
}
