use std::future::Future;

use reqwest::Url;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::models::{JobPosting, JobsPage, RawJobRecord};

pub const DEFAULT_ENDPOINT: &str = "https://testapi.getlokalapp.com/common/jobs";

// --- Source trait ---

/// Anything that can hand back one page of postings.
pub trait JobSource: Send + Sync + 'static {
    fn fetch_page(&self, page: u32) -> impl Future<Output = Result<Vec<JobPosting>, FetchError>> + Send;
}

// --- HTTP source ---

#[derive(Debug, Clone)]
pub struct HttpJobSource {
    endpoint: Url,
    client: reqwest::Client,
}

impl HttpJobSource {
    pub fn new(endpoint: Url) -> Self {
        // No explicit timeout; the transport's own limits apply.
        let client = reqwest::Client::new();
        Self { endpoint, client }
    }

    pub fn page_url(&self, page: u32) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("page", &page.to_string());
        url
    }
}

impl JobSource for HttpJobSource {
    async fn fetch_page(&self, page: u32) -> Result<Vec<JobPosting>, FetchError> {
        let url = self.page_url(page);
        debug!(%url, "fetching job page");

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(page, %status, "job feed returned non-OK status");
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        parse_page(&body)
    }
}

/// Decodes a feed body and maps every record, preserving order. Only a body
/// that is not a page fails; a record that is not an object is skipped.
pub fn parse_page(body: &str) -> Result<Vec<JobPosting>, FetchError> {
    let page: JobsPage = serde_json::from_str(body)?;
    let mut jobs = Vec::with_capacity(page.results.len());
    for (index, value) in page.results.into_iter().enumerate() {
        match serde_json::from_value::<RawJobRecord>(value) {
            Ok(raw) => jobs.push(JobPosting::from(raw)),
            Err(e) => warn!(index, error = %e, "skipping undecodable job record"),
        }
    }
    Ok(jobs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::JobId;

    #[test]
    fn test_page_url_appends_page_param() {
        let source = HttpJobSource::new(Url::parse(DEFAULT_ENDPOINT).unwrap());
        assert_eq!(
            source.page_url(3).as_str(),
            "https://testapi.getlokalapp.com/common/jobs?page=3"
        );
    }

    #[test]
    fn test_page_url_keeps_existing_query() {
        let source = HttpJobSource::new(Url::parse("http://localhost:8080/jobs?lang=en").unwrap());
        assert_eq!(source.page_url(1).as_str(), "http://localhost:8080/jobs?lang=en&page=1");
    }

    #[test]
    fn test_parse_page_maps_in_order() {
        let body = r#"{
            "results": [
                {"id": 3, "company_name": "Acme", "title": "Clerk", "job_hours": "Part-time"},
                {"id": 1, "company_name": "Globex", "title": "Cook"},
                {"id": "x-9", "title": "Ad slot"}
            ]
        }"#;
        let jobs = parse_page(body).unwrap();
        let ids: Vec<_> = jobs.iter().map(|j| j.id.clone().unwrap()).collect();
        assert_eq!(ids, vec![JobId::Int(3), JobId::Int(1), JobId::from("x-9")]);
        assert_eq!(jobs[0].qualification.as_deref(), Some("Part-time"));
        assert_eq!(jobs[1].company_name.as_deref(), Some("Globex"));
    }

    #[test]
    fn test_parse_page_ignores_unknown_fields() {
        let body = r#"{"count": 12, "next": null, "results": [{"id": 1, "whatsapp_no": "123"}]}"#;
        assert_eq!(parse_page(body).unwrap().len(), 1);
    }

    #[test]
    fn test_parse_page_survives_mistyped_fields() {
        let body = r#"{"results": [
            {"id": 1, "title": "A", "experience": 2, "salary_min": "10000"},
            {"id": 2, "title": "B"}
        ]}"#;
        let jobs = parse_page(body).unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].experience.as_deref(), Some("2"));
        assert_eq!(jobs[0].salary_min, Some(10000.0));
        assert_eq!(jobs[1].description.as_deref(), Some("B"));
    }

    #[test]
    fn test_parse_page_skips_non_object_records() {
        let body = r#"{"results": [null, {"id": 4, "title": "Cook"}, 17]}"#;
        let jobs = parse_page(body).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, Some(JobId::Int(4)));
    }

    #[test]
    fn test_parse_page_rejects_garbage() {
        assert!(matches!(parse_page("<html>oops</html>"), Err(FetchError::Decode(_))));
    }
}
