/// Credentials of the trusted frontend backend calling the service API.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    secret: Box<[u8]>,
}

impl ServiceConfig {
    pub fn new(secret: impl Into<Box<[u8]>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Key for HMAC request signatures.
    pub fn secret_bytes(&self) -> &[u8] {
        &self.secret
    }
}
