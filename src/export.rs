use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::{RequestBuilder, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::platform::PlatformFlags;

#[derive(Debug, Deserialize)]
struct AnalysisList {
    count: usize,
    #[serde(default)]
    results: Vec<Analysis>,
}

#[derive(Debug, Deserialize)]
struct Analysis {
    slug: String,
}

#[derive(Debug, Deserialize)]
struct UrlPage {
    results: Option<Vec<UrlRow>>,
}

#[derive(Debug, Deserialize)]
struct UrlRow {
    url: Option<String>,
}

/// Returned after the URL list has been written to disk.
#[derive(Debug)]
pub struct ExportSummary {
    pub analysis: String,
    pub urls: usize,
    pub pages: usize,
    pub flags: PlatformFlags,
}

pub struct ExportClient {
    http: reqwest::Client,
    settings: Settings,
}

impl ExportClient {
    pub fn new(settings: Settings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http, settings })
    }

    /// Send with exponential backoff on 429 and 5xx responses.
    async fn send_with_retry<F>(&self, what: &str, build: F) -> Result<reqwest::Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            let response = build()
                .header("accept", "application/json")
                .header("Authorization", format!("token {}", self.settings.api_token))
                .send()
                .await
                .with_context(|| format!("Failed to connect to the API ({})", what))?;

            let status = response.status();
            let retryable = status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error();
            if status.is_success() || !retryable || attempt == self.settings.max_retries {
                if !status.is_success() {
                    bail!("API returned {} for {}", status, what);
                }
                return Ok(response);
            }

            let backoff = self.settings.base_backoff * 2u32.pow(attempt);
            warn!(
                "{} on {} (attempt {}/{}), backing off {:.1}s",
                status,
                what,
                attempt + 1,
                self.settings.max_retries,
                backoff.as_secs_f64()
            );
            tokio::time::sleep(backoff).await;
            attempt += 1;
        }
    }

    /// Slug of the most recent successful analysis of `org/project`.
    pub async fn latest_analysis(&self, org: &str, project: &str) -> Result<String> {
        let url = format!("{}/analyses/{}/{}", self.settings.api_base, org, project);
        let list: AnalysisList = self
            .send_with_retry("analysis list", || {
                self.http
                    .get(&url)
                    .query(&[("page", "1"), ("only_success", "true")])
            })
            .await?
            .json()
            .await
            .context("Failed to decode analysis list")?;

        match list.results.into_iter().next() {
            Some(analysis) if list.count > 0 => Ok(analysis.slug),
            _ => bail!("Invalid crawl or no crawls found in {}/{}", org, project),
        }
    }

    async fn fetch_page(&self, endpoint: &str, page: usize) -> Result<Vec<String>> {
        let page_param = page.to_string();
        let size_param = self.settings.page_size.to_string();
        let body = serde_json::json!({ "fields": ["url"] });

        let parsed: UrlPage = self
            .send_with_retry(&format!("URL page {}", page), || {
                self.http
                    .post(endpoint)
                    .query(&[
                        ("area", "current"),
                        ("page", page_param.as_str()),
                        ("size", size_param.as_str()),
                    ])
                    .json(&body)
            })
            .await?
            .json()
            .await
            .with_context(|| format!("Failed to decode URL page {}", page))?;

        let Some(rows) = parsed.results else {
            bail!("Results not found in response. Check the organisation and project");
        };
        Ok(rows.into_iter().filter_map(|r| r.url).collect())
    }

    /// Write the latest analysis' URLs to `path`, one per line, in API order.
    pub async fn export_urls(&self, org: &str, project: &str, path: &Path) -> Result<ExportSummary> {
        // Phase 1: resolve the analysis to export
        let analysis = self.latest_analysis(org, project).await?;
        info!("Latest analysis for {}/{}: {}", org, project, analysis);

        let endpoint = format!(
            "{}/analyses/{}/{}/{}/urls",
            self.settings.api_base, org, project, analysis
        );
        let file = File::create(path)
            .with_context(|| format!("Failed to create export file {}", path.display()))?;
        let mut writer = BufWriter::new(file);

        let pb = ProgressBar::new(self.settings.max_pages as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} page {pos}/{len} {msg}")?
                .progress_chars("=> "),
        );

        // Phase 2: page through URLs until an empty page or the cap
        let mut flags = PlatformFlags::default();
        let mut total = 0usize;
        let mut pages = 0usize;

        for page in 1..=self.settings.max_pages {
            let urls = self.fetch_page(&endpoint, page).await?;
            pages = page;
            // Empty page means the list is exhausted
            if urls.is_empty() {
                debug!("Page {} empty, export complete", page);
                break;
            }

            for url in &urls {
                flags.observe(url);
                writeln!(writer, "{}", url)
                    .with_context(|| format!("Failed to write to export file {}", path.display()))?;
            }
            total += urls.len();
            pb.inc(1);
            pb.set_message(format!("{} URLs", total));

            if total > self.settings.url_cap {
                info!("Export limit reached at {} URLs", total);
                break;
            }
        }

        writer
            .flush()
            .with_context(|| format!("Failed to flush export file {}", path.display()))?;
        pb.finish_and_clear();

        info!("Exported {} URLs over {} pages", total, pages);
        Ok(ExportSummary {
            analysis,
            urls: total,
            pages,
            flags,
        })
    }
}
