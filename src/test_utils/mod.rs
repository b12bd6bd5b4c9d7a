
/// Archive markup builders and a scripted HTTP client.
///
/// Public (not test-only) so the integration tests can build the same pages.
pub mod mocks {
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;
    use url::Url;

    use crate::error::{FetchError, FetchResult};
    use crate::service::http::ArchiveClient;

    /// One row of a mock listing page.
    pub struct ListingRow<'a> {
        pub date: &'a str,
        pub name: &'a str,
        pub solution_href: Option<&'a str>,
    }

    impl<'a> ListingRow<'a> {
        pub fn solved(date: &'a str, name: &'a str, solution_href: &'a str) -> Self {
            Self {
                date,
                name,
                solution_href: Some(solution_href),
            }
        }

        pub fn open(date: &'a str, name: &'a str) -> Self {
            Self {
                date,
                name,
                solution_href: None,
            }
        }
    }

    /// A listing page with the archive's real nesting.
    pub fn archive_page(rows: &[ListingRow<'_>]) -> String {
        let rows: String = rows
            .iter()
            .map(|row| {
                let link = row
                    .solution_href
                    .map(|href| format!(r#"<a class="solution-link" href="{href}">Solution</a>"#))
                    .unwrap_or_default();
                format!(
                    r#"<div class="row">
                        <div class="left"><span class="date">{}</span> <span class="name">{}</span></div>
                        <div class="right"><a class="puzzle-link" href="/puzzles/">Puzzle</a>{}</div>
                    </div>"#,
                    row.date, row.name, link
                )
            })
            .collect();

        format!(
            r#"<!DOCTYPE html>
            <html>
              <head><title>Puzzle Archive</title></head>
              <body>
                <div class="site-wrap">
                  <main>
                    <div>
                      <div class="container">
                        <div>
                          <div class="puzzle-list">{rows}</div>
                        </div>
                      </div>
                    </div>
                  </main>
                </div>
              </body>
            </html>"#
        )
    }

    /// A solution page, optionally carrying a leaderboard identifier.
    pub fn solution_page(leaderboard_id: Option<&str>) -> String {
        let submissions = leaderboard_id
            .map(|id| {
                format!(r#"<p class="correct-submissions" data-directory="{id}">Correct submissions</p>"#)
            })
            .unwrap_or_default();
        format!(
            r#"<html><body><main><h1>Solution</h1><p>Explanation.</p>{submissions}</main></body></html>"#
        )
    }

    pub fn leaderboard_json(leaders: &[&str]) -> String {
        serde_json::json!({ "leaders": leaders }).to_string()
    }

    enum Reply {
        Body(String),
        Status(u16),
        Error(FetchError),
        Forbidden,
    }

    /// Scripted [`ArchiveClient`]. Unscripted or forbidden URLs panic, so a
    /// test fails loudly when the pipeline makes a request it should not.
    #[derive(Default)]
    pub struct StubClient {
        replies: HashMap<String, Reply>,
        delays: HashMap<String, Duration>,
        calls: Mutex<HashMap<String, usize>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl StubClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_body(mut self, url: &str, body: impl Into<String>) -> Self {
            self.replies.insert(url.to_string(), Reply::Body(body.into()));
            self
        }

        pub fn with_status(mut self, url: &str, status: u16) -> Self {
            self.replies.insert(url.to_string(), Reply::Status(status));
            self
        }

        pub fn with_error(mut self, url: &str, error: FetchError) -> Self {
            self.replies.insert(url.to_string(), Reply::Error(error));
            self
        }

        pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
            self.delays.insert(url.to_string(), delay);
            self
        }

        pub fn forbid(mut self, url: &str) -> Self {
            self.replies.insert(url.to_string(), Reply::Forbidden);
            self
        }

        pub fn calls(&self, url: &str) -> usize {
            self.calls.lock().unwrap().get(url).copied().unwrap_or(0)
        }

        pub fn total_calls(&self) -> usize {
            self.calls.lock().unwrap().values().sum()
        }

        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ArchiveClient for StubClient {
        async fn get_text(&self, url: &Url) -> FetchResult<String> {
            let key = url.as_str();
            *self.calls.lock().unwrap().entry(key.to_string()).or_default() += 1;

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            if let Some(delay) = self.delays.get(key) {
                tokio::time::sleep(*delay).await;
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            match self.replies.get(key) {
                Some(Reply::Body(body)) => Ok(body.clone()),
                Some(Reply::Status(status)) => Err(FetchError::Status(*status)),
                Some(Reply::Error(error)) => Err(error.clone()),
                Some(Reply::Forbidden) => panic!("request to forbidden URL {key}"),
                None => panic!("unscripted request to {key}"),
            }
        }
    }
}
