use crate::{
    config::UpstashConfig,
    error::{ArtyError, Result},
    storage::traits::KeyValueStore,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

/// Upstash Redis over its REST interface. Lets several server instances
/// share one history.
pub struct UpstashStore {
    client: Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct UpstashResponse {
    result: Option<Value>,
    error: Option<String>,
}

impl UpstashStore {
    pub async fn new(config: UpstashConfig) -> Result<Self> {
        let base_url = config
            .url
            .ok_or_else(|| ArtyError::Config("Upstash URL is required".into()))?;

        let token = config
            .token
            .ok_or_else(|| ArtyError::Config("Upstash token is required".into()))?;

        let storage = Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        };

        // Test connection
        if !storage.health_check().await? {
            return Err(ArtyError::Config("Upstash did not answer PING".into()));
        }

        Ok(storage)
    }

    async fn command(&self, command: Value) -> Result<Option<Value>> {
        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.token)
            .json(&command)
            .send()
            .await
            .map_err(|e| ArtyError::Persistence(format!("Upstash request failed: {}", e)))?;

        let status = response.status();
        let body: UpstashResponse = response
            .json()
            .await
            .map_err(|e| ArtyError::Persistence(format!("Upstash response unreadable: {}", e)))?;

        if let Some(error) = body.error {
            return Err(ArtyError::Persistence(format!("Upstash error: {}", error)));
        }
        if !status.is_success() {
            return Err(ArtyError::Persistence(format!(
                "Upstash returned {}",
                status
            )));
        }

        Ok(body.result)
    }
}

#[async_trait]
impl KeyValueStore for UpstashStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match self.command(json!(["GET", key])).await? {
            Some(Value::String(value)) => Ok(Some(value)),
            Some(Value::Null) | None => Ok(None),
            Some(other) => Err(ArtyError::Serialization(format!(
                "Unexpected GET result for {}: {}",
                key, other
            ))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.command(json!(["SET", key, value])).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.command(json!(["DEL", key])).await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        match self.command(json!(["PING"])).await {
            Ok(Some(Value::String(pong))) => Ok(pong == "PONG"),
            Ok(_) => Ok(false),
            Err(e) => {
                log::warn!("Upstash health check failed: {}", e);
                Ok(false)
            }
        }
    }

    fn backend_name(&self) -> &'static str {
        "upstash"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_credentials_are_config_errors() {
        let err = UpstashStore::new(UpstashConfig::new()).await.err().unwrap();
        assert!(matches!(err, ArtyError::Config(_)));

        let config = UpstashConfig {
            url: Some("https://kv.example".into()),
            token: None,
        };
        let err = UpstashStore::new(config).await.err().unwrap();
        assert_eq!(err.to_string(), "Configuration error: Upstash token is required");
    }

    #[test]
    fn test_response_shape() {
        let ok: UpstashResponse = serde_json::from_str(r#"{"result":"PONG"}"#).unwrap();
        assert_eq!(ok.result, Some(Value::String("PONG".into())));
        let failed: UpstashResponse =
            serde_json::from_str(r#"{"error":"WRONGPASS invalid password"}"#).unwrap();
        assert!(failed.result.is_none());
        assert!(failed.error.is_some());
    }

    #[cfg(feature = "server")]
    mod rest {
        use super::*;
        use actix_web::{http::header::AUTHORIZATION, web, App, HttpRequest, HttpResponse, HttpServer};
        use std::collections::HashMap;
        use std::sync::Mutex;

        type Keys = web::Data<Mutex<HashMap<String, String>>>;

        /// Answers the handful of Redis commands the store sends.
        async fn fake_upstash(
            req: HttpRequest,
            keys: Keys,
            command: web::Json<Vec<String>>,
        ) -> HttpResponse {
            let auth = req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok());
            if auth != Some("Bearer secret") {
                return HttpResponse::Unauthorized()
                    .json(json!({"error": "WRONGPASS invalid password"}));
            }

            let mut keys = keys.lock().unwrap();
            let result = match command.as_slice() {
                [cmd] if cmd == "PING" => json!("PONG"),
                [cmd, key] if cmd == "GET" => keys.get(key).map_or(Value::Null, |v| json!(v)),
                [cmd, key, value] if cmd == "SET" => {
                    keys.insert(key.clone(), value.clone());
                    json!("OK")
                }
                [cmd, key] if cmd == "DEL" => json!(keys.remove(key).map_or(0, |_| 1)),
                _ => {
                    return HttpResponse::BadRequest().json(json!({"error": "ERR unknown command"}))
                }
            };
            HttpResponse::Ok().json(json!({ "result": result }))
        }

        fn serve() -> String {
            let keys: Keys = web::Data::new(Mutex::new(HashMap::new()));
            let server = HttpServer::new(move || {
                App::new()
                    .app_data(keys.clone())
                    .route("/", web::post().to(fake_upstash))
            })
            .workers(1)
            .bind(("127.0.0.1", 0))
            .unwrap();
            let addr = server.addrs()[0];
            actix_web::rt::spawn(server.run());
            format!("http://{}/", addr)
        }

        fn config(url: String, token: &str) -> UpstashConfig {
            UpstashConfig {
                url: Some(url),
                token: Some(token.to_string()),
            }
        }

        #[actix_web::test]
        async fn test_get_set_delete_over_rest() {
            let store = UpstashStore::new(config(serve(), "secret")).await.unwrap();
            assert_eq!(store.backend_name(), "upstash");

            assert_eq!(store.get("arty-ai-history").await.unwrap(), None);

            store.set("arty-ai-history", r#"[{"id":"a"}]"#).await.unwrap();
            assert_eq!(
                store.get("arty-ai-history").await.unwrap().as_deref(),
                Some(r#"[{"id":"a"}]"#)
            );

            store.delete("arty-ai-history").await.unwrap();
            assert_eq!(store.get("arty-ai-history").await.unwrap(), None);
            assert!(store.health_check().await.unwrap());
        }

        #[actix_web::test]
        async fn test_rejected_token_fails_startup() {
            let err = UpstashStore::new(config(serve(), "wrong")).await.err().unwrap();
            assert_eq!(
                err.to_string(),
                "Configuration error: Upstash did not answer PING"
            );
        }
    }
}
