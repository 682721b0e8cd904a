use serde::{Deserialize, Serialize};

/// An account as it crosses the service boundary. The password is accepted
/// on input only and is never serialized back to clients; stored credentials
/// are salted hashes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password: String,
}

#[cfg(test)]
mod tests {
    use crate::model::User;

    #[test]
    fn password_is_never_echoed() {
        let user = User {
            username: "alice".to_string(),
            password: "hunter2".to_string(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert_eq!(json, r#"{"username":"alice"}"#);
    }

    #[test]
    fn parses_a_credentials_body() {
        let user: User =
            serde_json::from_str(r#"{"username":"alice","password":"hunter2"}"#).unwrap();
        assert_eq!(user.username, "alice");
        assert_eq!(user.password, "hunter2");
    }
}
