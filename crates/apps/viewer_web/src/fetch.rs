use gloo_net::http::Request;
use streaming::BoundarySource;

/// Boundary and name payloads served over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBoundarySource {
    pub boundaries_url: String,
    pub names_url: String,
}

impl BoundarySource for HttpBoundarySource {
    async fn fetch_boundaries(&self) -> Result<String, String> {
        fetch_text(&self.boundaries_url).await
    }

    async fn fetch_names(&self) -> Result<String, String> {
        fetch_text(&self.names_url).await
    }
}

async fn fetch_text(url: &str) -> Result<String, String> {
    let resp = Request::get(url).send().await.map_err(|e| e.to_string())?;
    if !resp.ok() {
        return Err(format!("{url}: HTTP {}", resp.status()));
    }
    resp.text().await.map_err(|e| e.to_string())
}
