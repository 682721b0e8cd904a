use std::collections::HashMap;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use log::info;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::command;
use crate::model::{Session, User};
use crate::service::ServiceError;

command! {
    pub Signup(username: String, password: String) -> Result<User, ServiceError>;
    pub Login(username: String, password: String) -> Result<Session, ServiceError>;
    /// Resolve a bearer token to its username.
    pub Verify(token: String) -> Result<String, ServiceError>;
}

#[derive(Clone)]
pub struct AuthService {
    pub op: CommandSender,
}

impl AuthService {
    pub fn create() -> AuthService {
        let (op, mut rx) = Command::new_channel();
        let service = AuthService { op };
        tokio::spawn(async move {
            let mut state = AuthServiceInner::default();
            while let Some(command) = rx.recv().await {
                // a dropped reply receiver only means the caller went away
                match command {
                    Command::Signup { username, password, resp_tx } => {
                        let _ = resp_tx.send(state.signup(username, password));
                    }
                    Command::Login { username, password, resp_tx } => {
                        let _ = resp_tx.send(state.login(&username, &password));
                    }
                    Command::Verify { token, resp_tx } => {
                        let _ = resp_tx.send(state.verify(&token));
                    }
                }
            }
        });
        service
    }
}

struct Account {
    salt: [u8; 16],
    password_hash: [u8; 32],
}

#[derive(Default)]
struct AuthServiceInner {
    accounts: HashMap<String, Account>,
    // token -> username
    sessions: HashMap<String, String>,
}

impl AuthServiceInner {
    fn signup(&mut self, username: String, password: String) -> Result<User, ServiceError> {
        if self.accounts.contains_key(&username) {
            return Err(ServiceError::UsernameTaken);
        }
        let mut salt = [0u8; 16];
        OsRng.fill_bytes(&mut salt);
        let account = Account {
            salt,
            password_hash: hash_password(&salt, &password),
        };
        self.accounts.insert(username.clone(), account);
        info!("account `{username}` created (total: {})", self.accounts.len());
        Ok(User {
            username,
            password: String::new(),
        })
    }

    fn login(&mut self, username: &str, password: &str) -> Result<Session, ServiceError> {
        // Unknown usernames and wrong passwords come back identical.
        let account = self
            .accounts
            .get(username)
            .ok_or(ServiceError::InvalidCredentials)?;
        if hash_password(&account.salt, password) != account.password_hash {
            return Err(ServiceError::InvalidCredentials);
        }
        let token = generate_token();
        self.sessions.insert(token.clone(), username.to_string());
        Ok(Session {
            username: username.to_string(),
            token,
        })
    }

    fn verify(&self, token: &str) -> Result<String, ServiceError> {
        self.sessions
            .get(token)
            .cloned()
            .ok_or(ServiceError::InvalidToken)
    }
}

fn hash_password(salt: &[u8], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use crate::service::auth_service::{hash_password, AuthService};
    use crate::service::ServiceError;

    #[test]
    fn hashing_depends_on_salt_and_password() {
        let a = hash_password(b"salt-one........", "hunter2");
        assert_eq!(a, hash_password(b"salt-one........", "hunter2"));
        assert_ne!(a, hash_password(b"salt-two........", "hunter2"));
        assert_ne!(a, hash_password(b"salt-one........", "hunter3"));
    }

    #[tokio::test]
    async fn signup_login_verify_round_trip() {
        let auth = AuthService::create();
        let user = auth
            .op
            .Signup("alice".to_string(), "hunter2".to_string())
            .await
            .unwrap();
        assert_eq!(user.username, "alice");

        let session = auth
            .op
            .Login("alice".to_string(), "hunter2".to_string())
            .await
            .unwrap();
        assert_eq!(session.username, "alice");
        assert!(!session.token.is_empty());

        let username = auth.op.Verify(session.token).await.unwrap();
        assert_eq!(username, "alice");
    }

    #[tokio::test]
    async fn duplicate_usernames_are_rejected() {
        let auth = AuthService::create();
        auth.op
            .Signup("alice".to_string(), "hunter2".to_string())
            .await
            .unwrap();
        let err = auth
            .op
            .Signup("alice".to_string(), "other".to_string())
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::UsernameTaken);
    }

    #[tokio::test]
    async fn bad_credentials_and_tokens_are_rejected() {
        let auth = AuthService::create();
        auth.op
            .Signup("alice".to_string(), "hunter2".to_string())
            .await
            .unwrap();

        let err = auth
            .op
            .Login("alice".to_string(), "wrong".to_string())
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::InvalidCredentials);

        let err = auth
            .op
            .Login("nobody".to_string(), "hunter2".to_string())
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::InvalidCredentials);

        let err = auth.op.Verify("bogus".to_string()).await.unwrap_err();
        assert_eq!(err, ServiceError::InvalidToken);
    }

    #[tokio::test]
    async fn a_dropped_caller_does_not_kill_the_service() {
        let auth = AuthService::create();
        // enqueue a signup, then drop the reply receiver before the actor
        // answers (a handler future aborted mid-flight does exactly this)
        let _ = tokio::time::timeout(
            std::time::Duration::ZERO,
            auth.op.Signup("alice".to_string(), "hunter2".to_string()),
        )
        .await;
        // the abandoned command was still applied and the actor still answers
        let session = auth
            .op
            .Login("alice".to_string(), "hunter2".to_string())
            .await
            .unwrap();
        assert_eq!(session.username, "alice");
        auth.op
            .Signup("bob".to_string(), "pw".to_string())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn each_login_issues_a_fresh_token() {
        let auth = AuthService::create();
        auth.op
            .Signup("alice".to_string(), "hunter2".to_string())
            .await
            .unwrap();
        let first = auth
            .op
            .Login("alice".to_string(), "hunter2".to_string())
            .await
            .unwrap();
        let second = auth
            .op
            .Login("alice".to_string(), "hunter2".to_string())
            .await
            .unwrap();
        assert_ne!(first.token, second.token);
        // both stay valid
        assert_eq!(auth.op.Verify(first.token).await.unwrap(), "alice");
        assert_eq!(auth.op.Verify(second.token).await.unwrap(), "alice");
    }
}
