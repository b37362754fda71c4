use std::net::TcpListener;

use reqwest::{Client, Method, Response};

use sqlx::PgPool;

use ctms::app;

pub struct TestApp {
    addr: String,

    pub client: Client,
}

impl TestApp {
    pub async fn spawn(pool: &PgPool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to listen on random port");
        let port = listener.local_addr().unwrap().port();

        let addr = format!("http://127.0.0.1:{}", port);

        let server = app::run(listener, pool.clone()).expect("Failed to spawn app instance");
        let _ = tokio::spawn(server);

        let client = Client::new();

        Self { addr, client }
    }

    pub fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", &self.addr, url);
        self.client.request(method, url)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", &self.addr, path)
    }

    pub async fn health_check(&self) -> reqwest::Result<Response> {
        self.request(Method::GET, "health").send().await
    }

    pub async fn contact_create(
        &self,
        new_contact: &serde_json::Value,
    ) -> reqwest::Result<Response> {
        self.request(Method::POST, "ctms")
            .json(new_contact)
            .send()
            .await
    }

    pub async fn contact_read(&self, email_id: &str) -> reqwest::Result<Response> {
        self.request(Method::GET, &format!("ctms/{}", email_id))
            .send()
            .await
    }

    pub async fn contact_find(&self, query: &[(&str, &str)]) -> reqwest::Result<Response> {
        self.request(Method::GET, "ctms").query(query).send().await
    }

    pub async fn identity_read(&self, email_id: &str) -> reqwest::Result<Response> {
        self.request(Method::GET, &format!("identity/{}", email_id))
            .send()
            .await
    }
}
