//! `lexcanon fetch`: download the published crowdsourcing sheet and write the
//! latest edition as `word<TAB>definition` lines.
//!
//! The sheet export is plain TSV. `FetchClient` handles retry, backoff and
//! error classification; `lexcanon_io::sheet` turns the body into rows.

use std::path::Path;
use std::thread;
use std::time::Duration;

use lexcanon_io::sheet;
use url::Url;

use crate::exit_codes;
use crate::CliError;

// ── Constants ───────────────────────────────────────────────────────

const MAX_RETRIES: u32 = 3;
const USER_AGENT: &str = concat!("lexcanon/", env!("CARGO_PKG_VERSION"));
const TIMEOUT_SECS: u64 = 30;
/// How much of an error body ends up in the message.
const ERROR_SNIPPET_CHARS: usize = 200;

// ── FetchClient ─────────────────────────────────────────────────────

/// HTTP client that handles retry, backoff, and error classification.
pub(crate) struct FetchClient {
    http: reqwest::blocking::Client,
    source_name: String,
}

impl FetchClient {
    pub(crate) fn new(source_name: &str) -> Result<Self, CliError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CliError {
                code: exit_codes::EXIT_ERROR,
                message: format!("failed to build HTTP client: {e}"),
                hint: None,
            })?;

        Ok(Self { http, source_name: source_name.to_string() })
    }

    /// GET with retry + exponential backoff, returning the body as text.
    ///
    /// 401/403, 400 and other 4xx fail immediately. 429 and 5xx are retried
    /// up to `MAX_RETRIES` times; 429 honours `Retry-After` (seconds).
    pub(crate) fn get_text(&self, url: &Url) -> Result<String, CliError> {
        let mut backoff_secs = 1u64;

        for attempt in 0..=MAX_RETRIES {
            match self.http.get(url.as_str()).send() {
                Ok(resp) => {
                    let status = resp.status().as_u16();

                    // Auth errors: fail immediately
                    if status == 401 || status == 403 {
                        return Err(CliError {
                            code: exit_codes::EXIT_FETCH_AUTH,
                            message: format!(
                                "{} auth failed ({}): {}",
                                self.source_name,
                                status,
                                error_snippet(resp),
                            ),
                            hint: Some("is the sheet published to the web?".to_string()),
                        });
                    }

                    if status == 400 {
                        return Err(CliError {
                            code: exit_codes::EXIT_FETCH_VALIDATION,
                            message: format!(
                                "{} request rejected ({}): {}",
                                self.source_name,
                                status,
                                error_snippet(resp),
                            ),
                            hint: None,
                        });
                    }

                    // Other 4xx (not 429): fail immediately
                    if (400..500).contains(&status) && status != 429 {
                        return Err(CliError {
                            code: exit_codes::EXIT_FETCH_UPSTREAM,
                            message: format!(
                                "{} error ({}): {}",
                                self.source_name,
                                status,
                                error_snippet(resp),
                            ),
                            hint: None,
                        });
                    }

                    // Retryable: 429, 5xx
                    if status == 429 || status >= 500 {
                        if attempt == MAX_RETRIES {
                            let (code, what) = if status == 429 {
                                (exit_codes::EXIT_FETCH_RATE_LIMIT, "rate limited")
                            } else {
                                (exit_codes::EXIT_FETCH_UPSTREAM, "upstream error")
                            };
                            return Err(CliError {
                                code,
                                message: format!(
                                    "{} {} after {} attempts ({})",
                                    self.source_name, what, MAX_RETRIES, status,
                                ),
                                hint: None,
                            });
                        }

                        let wait = if status == 429 {
                            resp.headers()
                                .get("retry-after")
                                .and_then(|v| v.to_str().ok())
                                .and_then(|v| v.parse::<u64>().ok())
                                .unwrap_or(backoff_secs)
                        } else {
                            backoff_secs
                        };

                        eprintln!(
                            "warning: retry {}/{} in {}s (HTTP {})",
                            attempt + 1,
                            MAX_RETRIES,
                            wait,
                            status,
                        );
                        thread::sleep(Duration::from_secs(wait));
                        backoff_secs *= 2;
                        continue;
                    }

                    let text = resp.text().map_err(|e| CliError {
                        code: exit_codes::EXIT_FETCH_UPSTREAM,
                        message: format!("failed to read {} response body: {}", self.source_name, e),
                        hint: None,
                    })?;
                    return Ok(text.trim_start_matches('\u{feff}').to_string());
                }
                Err(e) => {
                    // Network/timeout errors: retry
                    if attempt == MAX_RETRIES {
                        return Err(CliError {
                            code: exit_codes::EXIT_FETCH_UPSTREAM,
                            message: format!(
                                "{} upstream error after {} attempts: {}",
                                self.source_name, MAX_RETRIES, e,
                            ),
                            hint: None,
                        });
                    }

                    eprintln!(
                        "warning: retry {}/{} in {}s ({})",
                        attempt + 1,
                        MAX_RETRIES,
                        backoff_secs,
                        e,
                    );
                    thread::sleep(Duration::from_secs(backoff_secs));
                    backoff_secs *= 2;
                }
            }
        }

        Err(CliError {
            code: exit_codes::EXIT_FETCH_UPSTREAM,
            message: format!("{} request was never attempted", self.source_name),
            hint: None,
        })
    }
}

fn error_snippet(resp: reqwest::blocking::Response) -> String {
    let body = resp.text().unwrap_or_default();
    let body = body.trim();
    if body.is_empty() {
        return "(empty body)".to_string();
    }
    body.chars().take(ERROR_SNIPPET_CHARS).collect()
}

// ── Source URL ──────────────────────────────────────────────────────

/// Parse a sheet export URL. Only http(s) is accepted.
pub(crate) fn parse_source_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|e| format!("invalid source URL '{raw}': {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported source URL scheme '{other}' (expected http or https)")),
    }
}

// ── Command ─────────────────────────────────────────────────────────

/// Download the sheet export at `url` and write the latest edition to `out`.
/// Returns the number of words written.
pub(crate) fn fetch_latest_edition(url: &Url, out: &Path) -> Result<usize, CliError> {
    let client = FetchClient::new("sheet")?;
    log::info!("fetching {url}");
    let body = client.get_text(url)?;

    let rows = sheet::parse_sheet_export(&body).map_err(|e| CliError {
        code: exit_codes::EXIT_FETCH_UPSTREAM,
        message: format!("malformed sheet export: {e}"),
        hint: Some("the export must have two header rows and at least 6 columns".to_string()),
    })?;

    let count = sheet::write_edition(&rows, out).map_err(|e| CliError::io(e.to_string()))?;
    log::info!("wrote {count} word(s) to {}", out.display());
    Ok(count)
}
