use crate::{DeleteError, ReadError};

/// Access to the remote spreadsheet on behalf of an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub account: String,
    pub access_token: String,
}

#[allow(async_fn_in_trait)]
pub trait SessionService {
    async fn sign_in(&self, session: Session) -> Result<Session, ReadError>;
    async fn get_session(&self) -> Result<Session, ReadError>;
    async fn sign_out(&self) -> Result<(), DeleteError>;
}

#[allow(async_fn_in_trait)]
pub trait SessionRepository {
    async fn request_session(&self, session: Session) -> Result<Session, ReadError>;
    async fn initialize_session(&self) -> Result<Session, ReadError>;
    async fn delete_session(&self) -> Result<(), DeleteError>;
}
