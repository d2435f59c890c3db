use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::{
    Config,
    error::{Result, SolverError},
    expand::expand,
    http::{CachedFetcher, HttpFetch, HttpResponse, ReqwestFetcher},
    image_cache::ImageCache,
    model::{Context, Step, StructuredResult},
};

use super::Solver;

const SIMPLE_URL: &str = "http://api.wolframalpha.com/v1/simple";
const SPOKEN_URL: &str = "http://api.wolframalpha.com/v1/spoken";
const QUERY_URL: &str = "http://api.wolframalpha.com/v2/query";

/// Bodies the spoken endpoint returns when it has nothing to say.
const NO_ANSWER: &[&str] = &[
    "no spoken result available",
    "wolfram alpha did not understand your input",
];

pub const SOLVER_NAME: &str = "WolframAlpha";
pub const SOLVER_PRIORITY: u8 = 25;

#[derive(Debug)]
pub struct WolframAlphaSolver<F = CachedFetcher<ReqwestFetcher>> {
    config: Config,
    http: F,
    images: ImageCache,
}

impl WolframAlphaSolver {
    /// Solver backed by reqwest with a 5-minute response cache and the
    /// system temp directory as image cache.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_fetcher(config, CachedFetcher::reqwest(), ImageCache::default())
    }
}

impl<F: HttpFetch> WolframAlphaSolver<F> {
    pub fn with_fetcher(config: Config, http: F, images: ImageCache) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            http,
            images,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn images(&self) -> &ImageCache {
        &self.images
    }

    pub fn fetcher(&self) -> &F {
        &self.http
    }

    async fn request(
        &self,
        endpoint: &'static str,
        url: &str,
        params: &[(&str, &str)],
    ) -> Result<HttpResponse> {
        debug!(endpoint, "querying Wolfram Alpha");
        self.http.get(url, params).await
    }

    fn ensure_success(endpoint: &'static str, res: &HttpResponse) -> Result<()> {
        if res.is_success() {
            return Ok(());
        }
        warn!(endpoint, status = res.status, "Wolfram Alpha request failed");
        Err(SolverError::status(endpoint, res.status, &res.text()))
    }

    /// Decoded `/v2/query` result, typed for expansion.
    pub async fn get_structured(&self, query: &str) -> Result<StructuredResult> {
        let value = self.fetch_query(query).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn fetch_query(&self, query: &str) -> Result<serde_json::Value> {
        let params = [
            ("appid", self.config.appid.as_str()),
            ("input", query),
            ("output", "json"),
            ("units", self.config.units.as_str()),
        ];

        let res = self.request("query", QUERY_URL, &params).await?;
        Self::ensure_success("query", &res)?;

        Ok(serde_json::from_slice(&res.body)?)
    }
}

#[async_trait]
impl<F: HttpFetch> Solver for WolframAlphaSolver<F> {
    fn name(&self) -> &'static str {
        SOLVER_NAME
    }

    fn priority(&self) -> u8 {
        SOLVER_PRIORITY
    }

    async fn get_spoken_answer(
        &self,
        query: &str,
        _context: Option<&Context>,
    ) -> Result<Option<String>> {
        let params = [
            ("appid", self.config.appid.as_str()),
            ("i", query),
            ("units", self.config.units.as_str()),
        ];

        let res = self.request("spoken", SPOKEN_URL, &params).await?;
        let answer = res.text();

        // Upstream sends these with a 501, so check before the status.
        if is_no_answer(&answer) {
            debug!(query, "no spoken answer");
            return Ok(None);
        }
        Self::ensure_success("spoken", &res)?;

        Ok(Some(answer))
    }

    async fn get_image(&self, query: &str, _context: Option<&Context>) -> Result<PathBuf> {
        let path = self.images.path_for(query);
        if path.is_file() {
            debug!(path = %path.display(), "answer image already cached");
            return Ok(path);
        }

        let params = [
            ("appid", self.config.appid.as_str()),
            ("i", query),
            ("background", "F5F5F5"),
            ("layout", "labelbar"),
            ("units", self.config.units.as_str()),
        ];

        let res = self.request("simple", SIMPLE_URL, &params).await?;
        Self::ensure_success("simple", &res)?;

        self.images.store(query, &res.body).await
    }

    async fn get_expanded_answer(
        &self,
        query: &str,
        _context: Option<&Context>,
    ) -> Result<Vec<Step>> {
        let data = self.get_structured(query).await?;
        Ok(expand(&data.queryresult.pods))
    }

    async fn get_data(
        &self,
        query: &str,
        _context: Option<&Context>,
    ) -> Result<serde_json::Value> {
        self.fetch_query(query).await
    }
}

fn is_no_answer(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();
    NO_ANSWER.contains(&normalized.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Units, expand::SKIPPED_POD_TITLES, http::tests::FakeFetcher};
    use tempfile::TempDir;

    fn solver(fake: FakeFetcher, tmp: &TempDir) -> WolframAlphaSolver<FakeFetcher> {
        WolframAlphaSolver::with_fetcher(
            Config::new("TEST-APPID", Units::Imperial).unwrap(),
            fake,
            ImageCache::new(tmp.path()),
        )
        .unwrap()
    }

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[tokio::test]
    async fn spoken_sentinel_means_no_answer() {
        let tmp = TempDir::new().unwrap();
        let s = solver(
            FakeFetcher::new(501, "  Wolfram Alpha did not understand your input \n"),
            &tmp,
        );

        let answer = s.get_spoken_answer("asdfgh", None).await.unwrap();
        assert_eq!(answer, None);
    }

    #[tokio::test]
    async fn spoken_no_result_sentinel_means_no_answer() {
        let tmp = TempDir::new().unwrap();
        let s = solver(FakeFetcher::ok("No spoken result available"), &tmp);

        assert_eq!(s.get_spoken_answer("x", None).await.unwrap(), None);
    }

    #[tokio::test]
    async fn spoken_answer_is_returned_verbatim() {
        let tmp = TempDir::new().unwrap();
        let s = solver(FakeFetcher::ok("42"), &tmp);

        let answer = s.get_spoken_answer("6 times 7", None).await.unwrap();
        assert_eq!(answer.as_deref(), Some("42"));

        let (url, params) = s.fetcher().last_request().unwrap();
        assert_eq!(url, SPOKEN_URL);
        assert_eq!(param(&params, "appid"), Some("TEST-APPID"));
        assert_eq!(param(&params, "i"), Some("6 times 7"));
        assert_eq!(param(&params, "units"), Some("imperial"));
    }

    #[tokio::test]
    async fn spoken_server_error_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let s = solver(FakeFetcher::new(500, "boom"), &tmp);

        let err = s.get_spoken_answer("x", None).await.unwrap_err();
        assert!(matches!(err, SolverError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn image_is_fetched_once_per_query() {
        let tmp = TempDir::new().unwrap();
        let s = solver(FakeFetcher::ok(b"GIF89a".to_vec()), &tmp);

        let first = s.get_image("height of everest", None).await.unwrap();
        let second = s.get_image("height of everest", None).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first, tmp.path().join("height_of_everest.gif"));
        assert_eq!(s.fetcher().calls(), 1);
        assert_eq!(std::fs::read(&first).unwrap(), b"GIF89a");

        let (url, params) = s.fetcher().last_request().unwrap();
        assert_eq!(url, SIMPLE_URL);
        assert_eq!(param(&params, "layout"), Some("labelbar"));
        assert_eq!(param(&params, "i"), Some("height of everest"));
    }

    #[tokio::test]
    async fn image_failure_writes_nothing() {
        let tmp = TempDir::new().unwrap();
        let s = solver(FakeFetcher::new(403, "invalid appid"), &tmp);

        assert!(s.get_image("pi", None).await.is_err());
        assert!(!s.images().contains("pi"));
    }

    #[tokio::test]
    async fn data_is_returned_as_is() {
        let tmp = TempDir::new().unwrap();
        let body = r#"{"queryresult": {"success": true, "pods": []}}"#;
        let s = solver(FakeFetcher::ok(body), &tmp);

        let data = s.get_data("pi", None).await.unwrap();
        assert_eq!(data["queryresult"]["success"], true);

        let (url, params) = s.fetcher().last_request().unwrap();
        assert_eq!(url, QUERY_URL);
        assert_eq!(param(&params, "input"), Some("pi"));
        assert_eq!(param(&params, "output"), Some("json"));
    }

    #[tokio::test]
    async fn expanded_answer_reshapes_pods() {
        let tmp = TempDir::new().unwrap();
        let body = r#"{"queryresult": {"pods": [
            {"title": "Input interpretation", "subpods": [
                {"img": {"alt": "cat", "title": "cat", "src": "a"}}]},
            {"title": "Family", "subpods": [
                {"img": {"alt": "Felidae", "title": "", "src": "b"}}]},
            {"title": "Family", "subpods": [
                {"img": {"alt": "cat family", "title": "", "src": "c"}}]},
            {"title": "Image", "subpods": [
                {"img": {"alt": "Image", "title": "", "src": "d"}}]},
            {"title": "Range", "subpods": [
                {"img": {"alt": "Range", "title": "", "src": "e"}},
                {"img": {"alt": "(worldwide)", "title": "", "src": "f"}}]}
        ]}}"#;
        let s = solver(FakeFetcher::ok(body), &tmp);

        let steps = s.get_expanded_answer("cat", None).await.unwrap();

        assert_eq!(
            steps,
            vec![
                Step::summary("Family", "Family\n.Felidae\ncat family"),
                Step::image("Range", "e"),
            ]
        );
        for step in &steps {
            assert!(!SKIPPED_POD_TITLES.contains(&step.title.as_str()));
        }
    }

    #[tokio::test]
    async fn expanded_answer_without_pods_is_a_schema_error() {
        let tmp = TempDir::new().unwrap();
        let s = solver(FakeFetcher::ok(r#"{"queryresult": {"success": false}}"#), &tmp);

        let err = s.get_expanded_answer("asdfgh", None).await.unwrap_err();
        assert!(matches!(err, SolverError::Schema(_)));
    }

    #[tokio::test]
    async fn non_json_query_body_is_a_schema_error() {
        let tmp = TempDir::new().unwrap();
        let s = solver(FakeFetcher::ok("<html>"), &tmp);

        let err = s.get_data("pi", None).await.unwrap_err();
        assert!(matches!(err, SolverError::Schema(_)));
    }

    #[tokio::test]
    async fn default_solver_caches_images_in_temp_dir() {
        let s = WolframAlphaSolver::new(Config::default()).unwrap();
        assert_eq!(s.images().dir(), std::env::temp_dir().as_path());
    }

    #[tokio::test]
    async fn context_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let s = solver(FakeFetcher::ok("42"), &tmp);

        let mut ctx = Context::new();
        ctx.insert("lang".into(), "en-us".into());

        assert_eq!(
            s.get_spoken_answer("6 times 7", Some(&ctx)).await.unwrap(),
            s.get_spoken_answer("6 times 7", None).await.unwrap()
        );
    }

    #[test]
    fn sentinel_matching_is_case_and_whitespace_insensitive() {
        assert!(is_no_answer("NO SPOKEN RESULT AVAILABLE"));
        assert!(is_no_answer("\tWolfram Alpha did not understand your input  "));
        assert!(!is_no_answer("42"));
        assert!(!is_no_answer("no spoken result available, sorry"));
    }
}
