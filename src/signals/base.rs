use async_trait::async_trait;

/// Navigation capability injected by the host application. The access layer
/// only ever asks to go somewhere and to know where it currently is (to
/// suppress login redirects inside the authentication flow).
pub trait Navigator: Send + Sync {
    fn go(&self, path: &str);
    fn current_path(&self) -> String;
}

/// Receives each newly issued access credential so the rest of the running
/// application can pick it up.
#[async_trait]
pub trait CredentialSink: Send + Sync {
    async fn publish(&self, access_token: &str);
}
