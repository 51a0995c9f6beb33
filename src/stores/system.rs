use tracing::warn;

use crate::gateway::BackendApi;
use crate::models::PortableStoreStatus;
use crate::observable::{Observable, ReadOnly};
use crate::types::failure_message;

/// Status of the backend's relocatable configuration storage.
#[derive(Clone)]
pub struct SystemStore {
    api: BackendApi,
    portable_status: Observable<Option<PortableStoreStatus>>,
    error: Observable<Option<String>>,
}

impl SystemStore {
    pub fn new(api: BackendApi) -> Self {
        Self {
            api,
            portable_status: Observable::new(None),
            error: Observable::new(None),
        }
    }

    pub fn portable_status(&self) -> ReadOnly<Option<PortableStoreStatus>> {
        self.portable_status.read_only()
    }

    pub fn error(&self) -> ReadOnly<Option<String>> {
        self.error.read_only()
    }

    pub fn set_portable_status(&self, status: Option<PortableStoreStatus>) {
        self.portable_status.set(status);
    }

    pub async fn refresh(&self) {
        match self.api.get_portable_status().await {
            Ok(status) => {
                if status.needs_notice() {
                    warn!(
                        effective_dir = %status.effective_dir,
                        read_only = status.read_only,
                        fallback_used = status.fallback_used,
                        "Configuration is not stored in the portable directory"
                    );
                }
                self.error.set(None);
                self.portable_status.set(Some(status));
            }
            Err(err) => {
                warn!(error = ?err, "Failed to query portable store status");
                self.error
                    .set(Some(failure_message(&err, "Failed to load storage status")));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::testing::scripted;
    use serde_json::json;

    #[tokio::test]
    async fn refresh_stores_backend_status() {
        let (gateway, api) = scripted();
        let store = SystemStore::new(api);
        gateway.respond(
            "get_portable_status",
            json!({
                "portable_dir": "/media/usb/app/config",
                "effective_dir": "/home/user/.config/app",
                "read_only": true,
                "fallback_used": true,
                "encrypted": false
            }),
        );

        store.refresh().await;

        let status = store.portable_status().get().unwrap();
        assert!(status.needs_notice());
        assert_eq!(store.error().get(), None);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_last_status() {
        let (gateway, api) = scripted();
        let store = SystemStore::new(api);
        let status = PortableStoreStatus {
            portable_dir: "/app/config".into(),
            effective_dir: "/app/config".into(),
            read_only: false,
            fallback_used: false,
            encrypted: true,
        };
        store.set_portable_status(Some(status.clone()));
        gateway.reject("get_portable_status", "Backend error");

        store.refresh().await;

        assert_eq!(store.portable_status().get(), Some(status));
        assert_eq!(store.error().get().as_deref(), Some("Backend error"));
    }
}
