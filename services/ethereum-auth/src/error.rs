/// Nonce store error variants.
#[derive(Debug, thiserror::Error)]
pub enum NonceError {
    #[error("nonce not found")]
    NotFound,
    #[error("nonce expired")]
    Expired,
    #[error("nonce already used")]
    AlreadyUsed,
    #[error("nonce value already exists")]
    Collision,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl NonceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "NONCE_NOT_FOUND",
            Self::Expired => "NONCE_EXPIRED",
            Self::AlreadyUsed => "NONCE_ALREADY_USED",
            Self::Collision => "NONCE_COLLISION",
            Self::Internal(_) => "INTERNAL",
        }
    }
}
