// Tracking API paths and URL composition

pub const INFO_VERSION: &str = "/api/Info/v1";
pub const TRACKING_LIST: &str = "/api/RastreamentoTubaroes/v1";
pub const TRACKING_LATEST: &str = "/api/RastreamentoTubaroes/v1/latest-positions";

pub fn tracking_by_id(id: i64) -> String {
    format!("{}/{}", TRACKING_LIST, id)
}

/// Ordered query parameters. Unset and empty values are never sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<V: ToString>(&mut self, name: &str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            let value = value.to_string();
            if !value.is_empty() {
                self.pairs.push((name.to_string(), value));
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn to_query_string(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlBuilder {
    base_url: String,
}

impl UrlBuilder {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URLs are kept as is; paths resolve against the base.
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub fn build(&self, path: &str, params: &QueryParams) -> String {
        let url = self.resolve(path);
        if params.is_empty() {
            return url;
        }
        let separator = if url.contains('?') { '&' } else { '?' };
        format!("{}{}{}", url, separator, params.to_query_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_and_empty_params_are_omitted() {
        let mut params = QueryParams::new();
        params
            .set("a", Some(""))
            .set("b", None::<String>)
            .set("c", None::<&str>)
            .set("d", Some("x"));

        let builder = UrlBuilder::new("http://localhost:5013");
        assert_eq!(
            builder.build(TRACKING_LIST, &params),
            "http://localhost:5013/api/RastreamentoTubaroes/v1?d=x"
        );
    }

    #[test]
    fn test_values_are_encoded() {
        let mut params = QueryParams::new();
        params.set("Tempo", Some("2024-03-01 10:00")).set("pageNum", Some(2));

        let url = UrlBuilder::new("http://h").build(TRACKING_LIST, &params);
        assert_eq!(url, "http://h/api/RastreamentoTubaroes/v1?Tempo=2024-03-01%2010%3A00&pageNum=2");
    }

    #[test]
    fn test_resolution_against_base() {
        let builder = UrlBuilder::new("https://fb457da07468.ngrok-free.app/");
        assert_eq!(
            builder.build(&tracking_by_id(42), &QueryParams::new()),
            "https://fb457da07468.ngrok-free.app/api/RastreamentoTubaroes/v1/42"
        );
        assert_eq!(builder.resolve("api/Info/v1"), "https://fb457da07468.ngrok-free.app/api/Info/v1");
        assert_eq!(builder.resolve("http://other/x"), "http://other/x");
        assert_eq!(
            builder.build("/x?y=1", QueryParams::new().set("z", Some(2))),
            "https://fb457da07468.ngrok-free.app/x?y=1&z=2"
        );
    }
}
