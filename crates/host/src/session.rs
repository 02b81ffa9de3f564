//! Session bootstrap payload sent to clients when a session starts.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue, json};

use saledash_auth::SessionContext;
use saledash_core::DomainError;

use crate::host::HostInfo;

/// Field name → value mapping describing the server and the acting user.
///
/// Fields can be added but never removed or overwritten, so a payload only
/// ever grows as augmenters run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionInfo(Map<String, JsonValue>);

impl SessionInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Add a field that is not present yet.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Result<(), DomainError> {
        let key = key.into();
        if self.0.contains_key(&key) {
            return Err(DomainError::conflict(format!("session field '{key}' is already set")));
        }
        self.0.insert(key, value.into());
        Ok(())
    }

    pub fn into_json(self) -> JsonValue {
        JsonValue::Object(self.0)
    }

    /// The payload the host returns before any module adds to it.
    pub(crate) fn host_default(ctx: &SessionContext, info: &HostInfo) -> Self {
        let mut map = Map::new();
        map.insert("uid".into(), json!(ctx.user_id()));
        map.insert("is_public".into(), json!(ctx.is_public()));
        map.insert("is_admin".into(), json!(ctx.is_admin()));
        map.insert("name".into(), json!(ctx.name()));
        map.insert("username".into(), json!(ctx.login()));
        map.insert("db".into(), json!(info.db_name));
        map.insert("server_version".into(), json!(info.server_version));
        map.insert(
            "user_context".into(),
            json!({ "lang": ctx.lang(), "tz": ctx.tz(), "uid": ctx.user_id() }),
        );
        Self(map)
    }
}

/// Adds fields to the session payload after the host built its default.
pub trait SessionInfoAugmenter: Send + Sync {
    fn name(&self) -> &str;

    fn augment(&self, ctx: &SessionContext, info: &mut SessionInfo) -> anyhow::Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use saledash_core::UserId;

    fn info() -> HostInfo {
        HostInfo {
            db_name: "test".to_string(),
            server_version: "18.0".to_string(),
        }
    }

    #[test]
    fn default_payload_describes_user_and_server() {
        let ctx = SessionContext::authenticated(UserId::new(5), "demo", "Demo");
        let si = SessionInfo::host_default(&ctx, &info());

        assert_eq!(si.get("uid"), Some(&json!(5)));
        assert_eq!(si.get("username"), Some(&json!("demo")));
        assert_eq!(si.get("db"), Some(&json!("test")));
        assert_eq!(si.get("is_public"), Some(&json!(false)));
        assert!(!si.contains_key("current_user"));
    }

    #[test]
    fn public_payload_has_null_username() {
        let si = SessionInfo::host_default(&SessionContext::public(UserId::new(4)), &info());
        assert_eq!(si.get("uid"), Some(&json!(4)));
        assert_eq!(si.get("username"), Some(&JsonValue::Null));
        assert_eq!(si.get("is_public"), Some(&json!(true)));
    }

    #[test]
    fn add_never_overwrites() {
        let mut si = SessionInfo::new();
        si.add("a", 1).unwrap();
        assert!(matches!(si.add("a", 2), Err(DomainError::Conflict(_))));
        assert_eq!(si.get("a"), Some(&json!(1)));
        assert_eq!(si.len(), 1);
    }
}
