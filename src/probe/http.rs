use super::{Prober, PROBE_FAILED};

/// HTTP GET prober
///
/// Redirects are not followed, so a 3xx answer is reported as-is. No timeout is
/// set on the client; the invocation budget bounds every probe.
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("heartbeat/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &str) -> u16 {
        match self.client.get(url).send().await {
            Ok(response) => response.status().as_u16(),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Probe failed");
                PROBE_FAILED
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::get, Router};
    use tokio::net::TcpListener;

    async fn spawn_fixture() -> String {
        let app = Router::new()
            .route("/ok", get(|| async { StatusCode::OK }))
            .route("/error", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .route("/unavailable", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
            .route(
                "/moved",
                get(|| async {
                    (
                        StatusCode::MOVED_PERMANENTLY,
                        [(axum::http::header::LOCATION, "/error")],
                    )
                }),
            );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_probe_status_codes() {
        let base = spawn_fixture().await;
        let prober = HttpProber::new().unwrap();

        assert_eq!(prober.probe(&format!("{}/ok", base)).await, 200);
        assert_eq!(prober.probe(&format!("{}/error", base)).await, 500);
        assert_eq!(prober.probe(&format!("{}/unavailable", base)).await, 503);
        assert_eq!(prober.probe(&format!("{}/missing", base)).await, 404);
    }

    #[tokio::test]
    async fn test_probe_does_not_follow_redirects() {
        let base = spawn_fixture().await;
        let prober = HttpProber::new().unwrap();

        assert_eq!(prober.probe(&format!("{}/moved", base)).await, 301);
    }

    #[tokio::test]
    async fn test_probe_connection_refused() {
        // Grab a free port, then release it so nothing is listening
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let prober = HttpProber::new().unwrap();
        assert_eq!(prober.probe(&format!("http://{}/", addr)).await, PROBE_FAILED);
    }

    #[tokio::test]
    async fn test_probe_invalid_url() {
        let prober = HttpProber::new().unwrap();
        assert_eq!(prober.probe("not a url").await, PROBE_FAILED);
    }
}
