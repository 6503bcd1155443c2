use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::utils::AppError;

/// Who, besides the owner, may read a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Owner only
    #[default]
    Private,
    /// Any signed-in user who has the link
    Unlisted,
    /// Anyone, signed in or not
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Unlisted => "unlisted",
            Visibility::Public => "public",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Visibility::Private),
            "unlisted" => Ok(Visibility::Unlisted),
            "public" => Ok(Visibility::Public),
            other => Err(format!("unknown visibility '{}'", other)),
        }
    }
}

/// A saved document (stored in MongoDB `documents`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Public identifier, unique across the store
    pub document_id: String,

    /// `user_id` of the owner
    pub owner_id: String,

    #[serde(default)]
    pub title: String,

    pub text: String,

    #[serde(default)]
    pub visibility: Visibility,

    pub created_at: i64,
    pub updated_at: i64,
}

/// Body of create/save requests
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct DocumentPayload {
    pub title: Option<String>,
    pub text: Option<String>,
    /// One of `private`, `unlisted`, `public` (default `private`)
    pub visibility: Option<String>,
}

impl UserDocument {
    /// A fresh, unsaved document; `document_id` is assigned on insert.
    pub fn new(owner_id: &str) -> Self {
        let now = chrono::Utc::now().timestamp();
        UserDocument {
            id: None,
            document_id: String::new(),
            owner_id: owner_id.to_string(),
            title: String::new(),
            text: String::new(),
            visibility: Visibility::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites title, text and visibility from a request body.
    ///
    /// All fields are validated before anything is assigned, so a rejected
    /// payload leaves the document untouched.
    pub fn apply_payload(&mut self, payload: &DocumentPayload, max_title_size: usize) -> Result<(), AppError> {
        let text = payload
            .text
            .as_deref()
            .ok_or_else(|| AppError::InvalidRequest("missing text".into()))?;

        let title = payload.title.as_deref().unwrap_or("");
        if title.chars().count() > max_title_size {
            return Err(AppError::InvalidRequest(format!(
                "title longer than {} characters",
                max_title_size
            )));
        }

        let visibility = match payload.visibility.as_deref() {
            Some(raw) => raw.parse::<Visibility>().map_err(AppError::InvalidRequest)?,
            None => Visibility::default(),
        };

        self.title = title.to_string();
        self.text = text.to_string();
        self.visibility = visibility;
        self.updated_at = chrono::Utc::now().timestamp();
        Ok(())
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }

    /// `user_id` is `None` for anonymous readers.
    pub fn is_readable_by(&self, user_id: Option<&str>) -> bool {
        match (self.visibility, user_id) {
            (Visibility::Public, _) => true,
            (Visibility::Unlisted, Some(_)) => true,
            (Visibility::Private, Some(user_id)) => self.is_owned_by(user_id),
            (_, None) => false,
        }
    }

    pub fn is_writable_by(&self, user_id: Option<&str>) -> bool {
        user_id.map(|id| self.is_owned_by(id)).unwrap_or(false)
    }
}

/// Full document as returned by the API
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DocumentJson {
    pub document_id: String,
    pub owner_id: String,
    pub title: String,
    pub text: String,
    pub visibility: Visibility,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<UserDocument> for DocumentJson {
    fn from(document: UserDocument) -> Self {
        DocumentJson {
            document_id: document.document_id,
            owner_id: document.owner_id,
            title: document.title,
            text: document.text,
            visibility: document.visibility,
            created_at: document.created_at,
            updated_at: document.updated_at,
        }
    }
}

/// Document list entry (no source text)
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DocumentSummary {
    pub document_id: String,
    pub title: String,
    pub visibility: Visibility,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<UserDocument> for DocumentSummary {
    fn from(document: UserDocument) -> Self {
        DocumentSummary {
            document_id: document.document_id,
            title: document.title,
            visibility: document.visibility,
            created_at: document.created_at,
            updated_at: document.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(visibility: Visibility) -> UserDocument {
        let mut document = UserDocument::new("owner");
        document.document_id = "doc1".into();
        document.visibility = visibility;
        document
    }

    fn payload(title: Option<&str>, text: Option<&str>, visibility: Option<&str>) -> DocumentPayload {
        DocumentPayload {
            title: title.map(String::from),
            text: text.map(String::from),
            visibility: visibility.map(String::from),
        }
    }

    #[test]
    fn test_private_access() {
        let doc = document(Visibility::Private);
        assert!(doc.is_readable_by(Some("owner")));
        assert!(!doc.is_readable_by(Some("other")));
        assert!(!doc.is_readable_by(None));
        assert!(doc.is_writable_by(Some("owner")));
        assert!(!doc.is_writable_by(Some("other")));
    }

    #[test]
    fn test_unlisted_access() {
        let doc = document(Visibility::Unlisted);
        assert!(doc.is_readable_by(Some("other")));
        assert!(!doc.is_readable_by(None));
        assert!(!doc.is_writable_by(Some("other")));
    }

    #[test]
    fn test_public_access() {
        let doc = document(Visibility::Public);
        assert!(doc.is_readable_by(None));
        assert!(doc.is_readable_by(Some("other")));
        assert!(!doc.is_writable_by(Some("other")));
        assert!(!doc.is_writable_by(None));
    }

    #[test]
    fn test_apply_payload_overwrites_all_fields() {
        let mut doc = document(Visibility::Public);
        doc.title = "Old".into();
        doc.text = "old text".into();

        doc.apply_payload(&payload(None, Some("= New"), None), 256).unwrap();
        assert_eq!(doc.title, "");
        assert_eq!(doc.text, "= New");
        assert_eq!(doc.visibility, Visibility::Private);
    }

    #[test]
    fn test_apply_payload_parses_visibility() {
        let mut doc = document(Visibility::Private);
        doc.apply_payload(&payload(Some("Notes"), Some("x"), Some("unlisted")), 256)
            .unwrap();
        assert_eq!(doc.title, "Notes");
        assert_eq!(doc.visibility, Visibility::Unlisted);
    }

    #[test]
    fn test_apply_payload_rejects_unknown_visibility() {
        let mut doc = document(Visibility::Private);
        let result = doc.apply_payload(&payload(None, Some("new"), Some("friends")), 256);
        assert!(matches!(result, Err(AppError::InvalidRequest(_))));
        // untouched
        assert_eq!(doc.text, "");
    }

    #[test]
    fn test_apply_payload_rejects_long_title() {
        let mut doc = document(Visibility::Private);
        let title = "é".repeat(5);
        assert!(doc.apply_payload(&payload(Some(&title), Some("x"), None), 5).is_ok());

        let title = "é".repeat(6);
        assert!(matches!(
            doc.apply_payload(&payload(Some(&title), Some("x"), None), 5),
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_visibility_serialization() {
        assert_eq!(serde_json::to_string(&Visibility::Unlisted).unwrap(), "\"unlisted\"");
        assert_eq!("public".parse::<Visibility>().unwrap(), Visibility::Public);
        assert!("Public".parse::<Visibility>().is_err());
    }
}
