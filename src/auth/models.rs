use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub is_premium: bool,
    #[serde(rename = "user_metadata", default)]
    pub user_metadata: HashMap<String, Value>,
}

impl User {
    pub fn new(email: String, name: Option<String>) -> Self {
        let mut user_metadata = HashMap::new();
        user_metadata.insert(
            "name".to_string(),
            name.clone().map(Value::String).unwrap_or(Value::Null),
        );

        Self {
            id: Uuid::new_v4(),
            email,
            name,
            is_premium: false,
            user_metadata,
        }
    }

    /// Shallow merge: every field present in the patch replaces the stored
    /// value wholesale.
    pub fn apply(&mut self, patch: UserPatch) {
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(is_premium) = patch.is_premium {
            self.is_premium = is_premium;
        }
        if let Some(user_metadata) = patch.user_metadata {
            self.user_metadata = user_metadata;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPatch {
    pub email: Option<String>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub name: Option<Option<String>>,
    /// Tier changes go through the premium flow only, never a request body.
    #[serde(skip_deserializing)]
    pub is_premium: Option<bool>,
    #[serde(rename = "user_metadata")]
    pub user_metadata: Option<HashMap<String, Value>>,
}

impl UserPatch {
    /// Rejects a blank or malformed email and a blank name. `"name": null`
    /// still clears the name.
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(email) = &self.email {
            let email = email.trim();
            if email.is_empty() || !email.contains('@') {
                return Err(AppError::ValidationError("A valid email address is required".into()));
            }
        }
        if let Some(Some(name)) = &self.name {
            if name.trim().is_empty() {
                return Err(AppError::ValidationError("Name must not be blank".into()));
            }
        }
        Ok(())
    }
}

// Distinguishes `"name": null` (clear) from an absent field (keep).
fn explicit_null<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// What the dashboard knows about the current visitor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub is_logged_in: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_user_metadata_carries_name() {
        let user = User::new("a@b.com".into(), Some("Ada".into()));
        assert_eq!(user.user_metadata.get("name"), Some(&json!("Ada")));
        assert!(!user.is_premium);

        let anonymous = User::new("a@b.com".into(), None);
        assert_eq!(anonymous.user_metadata.get("name"), Some(&Value::Null));
    }

    #[test]
    fn test_user_wire_format() {
        let user = User::new("a@b.com".into(), None);
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["isPremium"], json!(false));
        assert_eq!(value["user_metadata"]["name"], Value::Null);
        assert_eq!(value["name"], Value::Null);
    }

    #[test]
    fn test_patch_distinguishes_null_from_absent() {
        let keep: UserPatch = serde_json::from_value(json!({ "email": "ada@b.com" })).unwrap();
        assert!(keep.name.is_none());

        let clear: UserPatch = serde_json::from_value(json!({ "name": null })).unwrap();
        assert_eq!(clear.name, Some(None));
        assert!(clear.validate().is_ok());

        let mut user = User::new("a@b.com".into(), Some("Ada".into()));
        user.apply(keep);
        assert_eq!(user.name.as_deref(), Some("Ada"));
        assert_eq!(user.email, "ada@b.com");

        user.apply(clear);
        assert_eq!(user.name, None);
    }

    #[test]
    fn test_patch_body_cannot_set_premium() {
        let patch: UserPatch = serde_json::from_value(json!({ "isPremium": true, "name": "Ada" })).unwrap();
        assert_eq!(patch.is_premium, None);

        let mut user = User::new("a@b.com".into(), None);
        user.apply(patch);
        assert!(!user.is_premium);
    }

    #[test]
    fn test_patch_validation() {
        for body in [
            json!({ "email": "" }),
            json!({ "email": "   " }),
            json!({ "email": "no-at-sign" }),
            json!({ "name": "" }),
            json!({ "name": "  " }),
        ] {
            let patch: UserPatch = serde_json::from_value(body.clone()).unwrap();
            assert!(
                matches!(patch.validate(), Err(AppError::ValidationError(_))),
                "accepted {body}"
            );
        }

        let ok: UserPatch = serde_json::from_value(json!({ "email": "b@c.com", "name": "Bea" })).unwrap();
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn test_patch_replaces_metadata_wholesale() {
        let mut user = User::new("a@b.com".into(), Some("Ada".into()));
        let patch: UserPatch = serde_json::from_value(json!({
            "user_metadata": { "bio": "hello" }
        }))
        .unwrap();

        user.apply(patch);
        assert_eq!(user.user_metadata.len(), 1);
        assert_eq!(user.user_metadata.get("bio"), Some(&json!("hello")));
    }
}
