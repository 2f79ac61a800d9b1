use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaskWsSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// Skip TLS certificate checks for self-signed stands.
    pub accept_invalid_certs: bool,
    pub request_timeout_secs: u64,
}

impl Default for TaskWsSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
            username: String::new(),
            password: String::new(),
            accept_invalid_certs: false,
            request_timeout_secs: 30,
        }
    }
}

impl TaskWsSettings {
    pub fn endpoint(&self) -> String {
        format!(
            "http://{}:{}/cdi/soap/services/15_3/TaskWS",
            self.host, self.port
        )
    }
}
