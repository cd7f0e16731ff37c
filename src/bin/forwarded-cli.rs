use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use forwarded_echo::forwarded::{self, Extractor, Field, Ordered, Standard, StrategyKind};

#[derive(Parser)]
#[command(name = "forwarded-cli")]
#[command(about = "Inspect Forwarded / X-Forwarded-* metadata", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve metadata from headers given on the command line
    Extract {
        /// Request header, as "Name: value". Repeatable.
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(HeaderName, HeaderValue)>,

        /// Extractors to try, highest priority first.
        #[arg(short, long, value_delimiter = ',', default_values = ["standard", "legacy"])]
        strategy: Vec<StrategyKind>,

        /// Keep the case of Forwarded values.
        #[arg(long)]
        preserve_case: bool,

        /// Print every parsed Forwarded entry instead of the resolved fields.
        #[arg(long, conflicts_with = "field")]
        parsed: bool,

        /// Print a single field (by, for, host or proto) as a JSON string.
        #[arg(short, long)]
        field: Option<Field>,
    },
    /// Send headers to a running forwarded-echo and print its answer
    Request {
        #[arg(short, long, default_value = "http://localhost:8080")]
        url: String,

        /// Request header, as "Name: value". Repeatable.
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(HeaderName, HeaderValue)>,
    },
}

fn parse_header(raw: &str) -> Result<(HeaderName, HeaderValue), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected \"Name: value\", got {raw:?}"))?;
    let name = HeaderName::from_bytes(name.trim().as_bytes()).map_err(|e| e.to_string())?;
    let value = HeaderValue::from_str(value.trim()).map_err(|e| e.to_string())?;
    Ok((name, value))
}

fn header_map(headers: Vec<(HeaderName, HeaderValue)>) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in headers {
        map.append(name, value);
    }
    map
}

/// What `extract` should print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Resolved,
    Parsed,
    Single(Field),
}

fn extract(
    headers: &HeaderMap,
    strategy: &[StrategyKind],
    preserve_case: bool,
    output: Output,
) -> Result<Value, serde_json::Error> {
    match output {
        Output::Parsed => {
            let standard = if preserve_case {
                Standard::preserving_case()
            } else {
                Standard::new()
            };
            serde_json::to_value(standard.parse(headers))
        }
        Output::Single(field) => {
            let extractor = Ordered::from_kinds(strategy, preserve_case);
            Ok(Value::String(extractor.get(field, headers)))
        }
        Output::Resolved => {
            let extractor = Ordered::from_kinds(strategy, preserve_case);
            serde_json::to_value(forwarded::resolve(&extractor, headers))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            headers,
            strategy,
            preserve_case,
            parsed,
            field,
        } => {
            let output = match (parsed, field) {
                (true, _) => Output::Parsed,
                (false, Some(field)) => Output::Single(field),
                (false, None) => Output::Resolved,
            };
            let json = extract(&header_map(headers), &strategy, preserve_case, output)?;
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        Commands::Request { url, headers } => {
            let res = reqwest::Client::new()
                .get(&url)
                .headers(header_map(headers))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

fn ensure_success(status: reqwest::StatusCode) -> Result<(), String> {
    if status.is_success() {
        Ok(())
    } else {
        Err(format!("echo server returned status {}", status))
    }
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if let Err(e) = ensure_success(status) {
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Err(e.into());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const RFC_EXAMPLE: &str =
        "Forwarded: for=192.0.2.43,for=198.51.100.17;by=203.0.113.60;proto=http;host=example.com";

    fn headers(raw: &[&str]) -> HeaderMap {
        header_map(raw.iter().map(|h| parse_header(h).unwrap()).collect())
    }

    #[test]
    fn test_header_without_colon_is_rejected() {
        let err = parse_header("Forwarded").unwrap_err();
        assert!(err.contains("Name: value"), "{err}");
    }

    #[test]
    fn test_invalid_header_name_is_rejected() {
        assert!(parse_header("Bad Name: x").is_err());
        assert!(parse_header(": x").is_err());
    }

    #[test]
    fn test_value_keeps_later_colons() {
        let (name, value) = parse_header("X-Forwarded-For: 1.1.1.1:8080").unwrap();
        assert_eq!(name.as_str(), "x-forwarded-for");
        assert_eq!(value, "1.1.1.1:8080");

        let (_, value) = parse_header("Forwarded:for=\"[2001:db8::1]:4711\"").unwrap();
        assert_eq!(value, "for=\"[2001:db8::1]:4711\"");
    }

    #[test]
    fn test_header_map_appends_repeats() {
        let map = headers(&["X-Forwarded-For: 1.1.1.1", "x-forwarded-for: 2.2.2.2"]);
        let values: Vec<_> = map.get_all("x-forwarded-for").iter().collect();
        assert_eq!(values, vec!["1.1.1.1", "2.2.2.2"]);
    }

    #[test]
    fn test_malformed_header_argument_is_a_cli_error() {
        let result = Cli::try_parse_from(["forwarded-cli", "extract", "-H", "Forwarded"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_strategy_from_arguments() {
        let cli = Cli::try_parse_from(["forwarded-cli", "extract", "-H", RFC_EXAMPLE]).unwrap();
        let Commands::Extract { strategy, .. } = cli.command else {
            panic!("expected extract");
        };
        assert_eq!(strategy, vec![StrategyKind::Standard, StrategyKind::Legacy]);
    }

    #[test]
    fn test_extract_rfc_example() {
        let strategy = [StrategyKind::Standard, StrategyKind::Legacy];
        let json = extract(&headers(&[RFC_EXAMPLE]), &strategy, false, Output::Resolved).unwrap();
        assert_eq!(
            json,
            json!({
                "by": "203.0.113.60",
                "for": "192.0.2.43",
                "host": "example.com",
                "proto": "http",
            })
        );
    }

    #[test]
    fn test_extract_parsed_and_single_field() {
        let map = headers(&[RFC_EXAMPLE, "X-Forwarded-Host: legacy.example"]);
        let parsed = extract(&map, &[], false, Output::Parsed).unwrap();
        assert_eq!(parsed["fors"], json!(["192.0.2.43", "198.51.100.17"]));

        let legacy = [StrategyKind::Legacy];
        let host = extract(&map, &legacy, false, Output::Single(Field::Host)).unwrap();
        assert_eq!(host, json!("legacy.example"));
    }

    #[test]
    fn test_error_status_fails() {
        assert!(ensure_success(reqwest::StatusCode::OK).is_ok());
        assert_eq!(
            ensure_success(reqwest::StatusCode::GATEWAY_TIMEOUT).unwrap_err(),
            "echo server returned status 504 Gateway Timeout"
        );
    }

    #[test]
    fn test_field_argument() {
        let cli = Cli::try_parse_from(["forwarded-cli", "extract", "--field", "FOR"]).unwrap();
        let Commands::Extract { field, .. } = cli.command else {
            panic!("expected extract");
        };
        assert_eq!(field, Some(Field::For));
        assert!(Cli::try_parse_from(["forwarded-cli", "extract", "--field", "secret"]).is_err());
    }
}
