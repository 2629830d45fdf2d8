//! `tlk`: command-line client for a Tomolink server.
//!
//! - **`get`** reads a user document, one relationship, or one edge.
//! - **`create`** / **`update`** / **`delete`** mutate a relationship.
//!
//! Responses are printed as pretty JSON. An error response prints
//! `code: message` to stderr and exits 1; a transport failure exits 2.

use std::process;

use clap::{Args, Parser, Subcommand};
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::{StatusCode, Url};
use serde_json::Value;
use tomolink_api::{ErrorResponse, RelationshipBody};

/// tlk: Tomolink relationship client
#[derive(Parser)]
#[command(name = "tlk", version, about, long_about = None)]
struct Cli {
    /// Base URL of the Tomolink server.
    #[arg(long, env = "TOMOLINK_URL", default_value = "http://localhost:8080", global = true)]
    url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read relationships.
    ///
    /// With only SOURCE, prints the user's whole document. With a
    /// RELATIONSHIP, prints that relationship's edges; with a TARGET too,
    /// prints the single edge value.
    Get {
        source: String,
        relationship: Option<String>,
        target: Option<String>,
    },

    /// Create a relationship (increments counters).
    ///
    /// Example:
    ///   tlk create friends alice bob --direction mutual
    Create(Mutation),

    /// Update a relationship.
    Update(Mutation),

    /// Delete a relationship edge.
    Delete(Mutation),
}

#[derive(Args)]
struct Mutation {
    relationship: String,
    source: String,
    target: String,

    /// Counter increment, score value, or timestamp (0 = now).
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    delta: i64,

    /// single | one | uni | unary | discrete | reciprocal | mutual | bi | multiple
    #[arg(long, default_value = "")]
    direction: String,
}

impl Mutation {
    fn into_body(self) -> RelationshipBody {
        RelationshipBody {
            direction: self.direction,
            relationship: self.relationship,
            delta: self.delta,
            uuidsource: self.source,
            uuidtarget: self.target,
            uuids: None,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let base = cli.url.trim_end_matches('/');
    let client = Client::new();

    let request = match cli.command {
        Command::Get {
            source,
            relationship,
            target,
        } => match retrieve_url(base, &source, relationship.as_deref(), target.as_deref()) {
            Ok(url) => client.get(url),
            Err(e) => fatal(&e),
        },
        Command::Create(m) => client
            .post(format!("{base}/createRelationship"))
            .json(&m.into_body()),
        Command::Update(m) => client
            .post(format!("{base}/updateRelationship"))
            .json(&m.into_body()),
        Command::Delete(m) => client
            .delete(format!("{base}/deleteRelationship"))
            .json(&m.into_body()),
    };

    process::exit(send(request));
}

/// Build the retrieval URL; each id is one percent-encoded path segment.
fn retrieve_url(
    base: &str,
    source: &str,
    relationship: Option<&str>,
    target: Option<&str>,
) -> Result<Url, String> {
    let mut url = Url::parse(base).map_err(|e| format!("invalid server URL {base:?}: {e}"))?;
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| format!("invalid server URL {base:?}: cannot be a base"))?;
        segments.pop_if_empty().push("users").push(source);
        if let Some(relationship) = relationship {
            segments.push(relationship);
            if let Some(target) = target {
                segments.push(target);
            }
        }
    }
    Ok(url)
}

/// Send the request, print the outcome, and return the exit code.
fn send(request: RequestBuilder) -> i32 {
    let response = match request.send() {
        Ok(r) => r,
        Err(e) => fatal(&format!("request failed: {e}")),
    };
    let status = response.status();
    let body = match response.text() {
        Ok(b) => b,
        Err(e) => fatal(&format!("failed to read response: {e}")),
    };

    if status.is_success() {
        println!("{}", pretty(&body));
        return 0;
    }
    eprintln!("{}", describe_error(status, &body));
    1
}

fn pretty(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| serde_json::to_string_pretty(&v).ok())
        .unwrap_or_else(|| body.to_string())
}

fn describe_error(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(e) => format!("{}: {}", e.code, e.error),
        Err(_) => format!("{status}: {}", body.trim()),
    }
}

fn fatal(msg: &str) -> ! {
    eprintln!("tlk: {msg}");
    process::exit(2);
}
