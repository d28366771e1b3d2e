use crate::item::{ItemRecord, VaultItemPayload};
use serde_json::json;

const REDACTED: &str = "[REDACTED]";

pub fn item_json(payload: &VaultItemPayload, reveal: bool) -> serde_json::Value {
    if reveal {
        json!({
            "title": payload.title.as_str(),
            "username": payload.username.as_str(),
            "password": payload.password.as_str(),
            "url": payload.url.as_str(),
            "notes": payload.notes.as_str(),
        })
    } else {
        json!({
            "title": payload.title.as_str(),
            "username": payload.username.as_str(),
            "password_redacted": true,
            "url": payload.url.as_str(),
            "notes": payload.notes.as_str(),
        })
    }
}

pub fn item_text(payload: &VaultItemPayload, reveal: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!("title:\t{}\n", payload.title));
    if !payload.username.is_empty() {
        out.push_str(&format!("username:\t{}\n", payload.username));
    }
    if !payload.url.is_empty() {
        out.push_str(&format!("url:\t{}\n", payload.url));
    }
    if !payload.notes.is_empty() {
        out.push_str(&format!("notes:\t{}\n", payload.notes));
    }
    out.push_str(&format!(
        "password:\t{}",
        if reveal { payload.password.as_str() } else { REDACTED }
    ));
    out
}

pub fn record_meta_json(record: &ItemRecord) -> serde_json::Value {
    json!({
        "title": record.title.as_str(),
        "type": record.item_type.as_str(),
        "category": record.category.as_deref(),
        "favorite": record.favorite,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> VaultItemPayload {
        VaultItemPayload {
            title: "Gmail".to_string(),
            username: "a@b.com".to_string(),
            password: "xyz".to_string(),
            url: String::new(),
            notes: "2fa on".to_string(),
        }
    }

    #[test]
    fn text_redacts_password_unless_revealed() {
        let hidden = item_text(&payload(), false);
        assert!(hidden.contains("password:\t[REDACTED]"));
        assert!(!hidden.contains("xyz"));
        assert!(!hidden.contains("url:"), "empty fields are skipped");

        let shown = item_text(&payload(), true);
        assert!(shown.ends_with("password:\txyz"));
    }

    #[test]
    fn json_redacts_password_unless_revealed() {
        let hidden = item_json(&payload(), false);
        assert!(hidden.get("password").is_none());
        assert_eq!(hidden["password_redacted"], true);

        let shown = item_json(&payload(), true);
        assert_eq!(shown["password"], "xyz");
    }
}
