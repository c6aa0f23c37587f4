//! Access log format module
//!
//! Supports multiple log formats:
//! - `combined` (Apache/Nginx combined format)
//! - `common` (Common Log Format - CLF)
//! - `json` (JSON structured logging)
//! - Custom patterns with variables

use chrono::Local;
use hyper::Version;

/// Query parameters whose values never reach the access log
const REDACTED_PARAMS: &[&str] = &["code"];

const REDACTED: &str = "[redacted]";

/// Access log entry for one request/response exchange
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    /// Client socket address
    pub remote_addr: String,
    pub time: chrono::DateTime<Local>,
    pub method: String,
    /// Request path as received (still percent-encoded)
    pub path: String,
    /// Query string (without leading ?), already redacted
    pub query: Option<String>,
    /// HTTP version (1.0, 1.1, 2)
    pub http_version: String,
    pub status: u16,
    pub body_bytes: usize,
    pub user_agent: Option<String>,
    /// Request processing time in microseconds
    pub request_time_us: u64,
}

impl AccessLogEntry {
    /// Create a new access log entry with current timestamp
    pub fn new(remote_addr: String, method: String, path: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            path,
            query: None,
            http_version: "1.1".to_string(),
            status: 200,
            body_bytes: 0,
            user_agent: None,
            request_time_us: 0,
        }
    }

    /// Format the log entry according to the specified format
    pub fn format(&self, format: &str) -> String {
        match format {
            "combined" => self.format_combined(),
            "common" => self.format_common(),
            "json" => self.format_json(),
            custom => self.format_custom(custom),
        }
    }

    fn request_uri(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{}", escape_field(&self.path), escape_field(q)),
            None => escape_field(&self.path),
        }
    }

    fn user_agent_field(&self) -> String {
        self.user_agent
            .as_deref()
            .map_or_else(|| "-".to_string(), escape_field)
    }

    fn time_local(&self) -> String {
        self.time.format("%d/%b/%Y:%H:%M:%S %z").to_string()
    }

    /// Common Log Format (CLF)
    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{} {} HTTP/{}\" {} {}",
            self.remote_addr,
            self.time_local(),
            escape_field(&self.method),
            self.request_uri(),
            self.http_version,
            self.status,
            self.body_bytes,
        )
    }

    /// Combined format without a referer; the redirect callback's referer
    /// is the identity provider and adds nothing
    fn format_combined(&self) -> String {
        format!("{} \"-\" \"{}\"", self.format_common(), self.user_agent_field())
    }

    fn format_json(&self) -> String {
        serde_json::json!({
            "remote_addr": self.remote_addr,
            "time": self.time.to_rfc3339(),
            "method": self.method,
            "path": self.path,
            "query": self.query,
            "http_version": self.http_version,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "user_agent": self.user_agent,
            "request_time_us": self.request_time_us,
        })
        .to_string()
    }

    /// Custom format with variable substitution
    ///
    /// Supported variables: `$remote_addr`, `$time_local`, `$time_iso8601`,
    /// `$request`, `$request_method`, `$request_uri`, `$request_time`,
    /// `$status`, `$body_bytes_sent`, `$http_user_agent`.
    ///
    /// The pattern is scanned once; substituted values are never expanded
    /// again.
    fn format_custom(&self, pattern: &str) -> String {
        let mut output = String::with_capacity(pattern.len() * 2);
        let mut rest = pattern;

        while let Some(pos) = rest.find('$') {
            output.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            // Longest name first: $request_uri over $request
            match VARIABLES
                .iter()
                .filter(|name| tail.starts_with(**name))
                .max_by_key(|name| name.len())
            {
                Some(name) => {
                    output.push_str(&self.variable(name));
                    rest = &tail[name.len()..];
                }
                None => {
                    output.push('$');
                    rest = &tail[1..];
                }
            }
        }
        output.push_str(rest);
        output
    }

    fn variable(&self, name: &str) -> String {
        match name {
            "$remote_addr" => self.remote_addr.clone(),
            "$time_local" => self.time_local(),
            "$time_iso8601" => self.time.to_rfc3339(),
            "$request" => format!(
                "{} {} HTTP/{}",
                escape_field(&self.method),
                self.request_uri(),
                self.http_version
            ),
            "$request_method" => escape_field(&self.method),
            "$request_uri" => self.request_uri(),
            "$request_time" => {
                #[allow(clippy::cast_precision_loss)]
                let seconds = self.request_time_us as f64 / 1_000_000.0;
                format!("{seconds:.3}")
            }
            "$status" => self.status.to_string(),
            "$body_bytes_sent" => self.body_bytes.to_string(),
            "$http_user_agent" => self.user_agent_field(),
            _ => String::new(),
        }
    }
}

/// Variables understood by custom access log patterns
const VARIABLES: &[&str] = &[
    "$remote_addr",
    "$time_local",
    "$time_iso8601",
    "$request",
    "$request_method",
    "$request_uri",
    "$request_time",
    "$status",
    "$body_bytes_sent",
    "$http_user_agent",
];

/// Escape a request-derived value for the text log formats.
/// Quotes and backslashes are backslash-escaped and control characters
/// become `\xHH`, so one entry always stays one line.
fn escape_field(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            c if c.is_control() => escaped.push_str(&format!("\\x{:02X}", u32::from(c))),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Replace sensitive parameter values in a raw query string.
/// Other segments are kept byte for byte.
pub fn redact_query(query: &str) -> String {
    query
        .split('&')
        .map(|segment| match segment.split_once('=') {
            Some((key, _)) if REDACTED_PARAMS.contains(&key) => format!("{key}={REDACTED}"),
            _ => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Version label as it appears in a request line
pub fn http_version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
