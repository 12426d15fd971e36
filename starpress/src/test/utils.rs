//! Shared helpers for integration tests.

use url::Url;

use crate::session::{SessionStore, SessionUser};
use crate::{Application, Config};

pub const TEST_API_KEY: &str = "test-secret";
pub const TEST_TOKEN: &str = "tok-abc";

/// Config pointing at a mock backend, with the write credential set.
pub fn create_test_config(backend_url: &str) -> Config {
    let mut config = Config::default();
    config.backend.url = Url::parse(backend_url).expect("test backend URL is valid");
    config.backend.api_key = Some(TEST_API_KEY.to_string());
    config
}

/// Build the real router and wrap it in a test server.
pub async fn create_test_app(config: Config) -> axum_test::TestServer {
    Application::new(config)
        .await
        .expect("Failed to create application")
        .into_test_server()
}

/// Session pre-loaded with a logged-in author.
pub fn logged_in_session() -> SessionStore {
    let session = SessionStore::in_memory();
    session.login(
        TEST_TOKEN,
        &SessionUser {
            username: "ada".to_string(),
            role: "author".to_string(),
        },
    );
    session
}
