use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue};

/// Status line and body of a completed GET request.
pub struct Response<B> {
    pub status: u16,
    pub body: B,
}

/// The only capability the range client needs from an HTTP stack.
///
/// Implementations perform a plain GET (no query string, no body) and hand
/// back the status code together with a reader over the response body.
pub trait Transport {
    type Body: Read;
    type Error: std::error::Error + Send + Sync + 'static;

    fn get(&self, url: &str) -> Result<Response<Self::Body>, Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &T {
    type Body = T::Body;
    type Error = T::Error;

    fn get(&self, url: &str) -> Result<Response<Self::Body>, Self::Error> {
        (**self).get(url)
    }
}

/// Settings for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Total time allowed for a request, including reading the body.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    /// Ask the server to pad responses with count-0 records so that response
    /// size does not reveal the prefix.
    pub add_padding: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: concat!("pwned-range/", env!("CARGO_PKG_VERSION")).to_string(),
            add_padding: false,
        }
    }
}

/// Blocking [`Transport`] backed by `reqwest`.
///
/// The underlying client owns its own runtime thread, so it must not be
/// created or dropped from inside an async context.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        if config.add_padding {
            headers.insert("Add-Padding", HeaderValue::from_static("true"));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    type Body = reqwest::blocking::Response;
    type Error = reqwest::Error;

    fn get(&self, url: &str) -> Result<Response<Self::Body>, Self::Error> {
        let response = self.client.get(url).send()?;
        Ok(Response { status: response.status().as_u16(), body: response })
    }
}

#[cfg(test)]
mod tests {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    use super::*;
    use crate::{Match, RangeClient, RangeQuery};

    /// Serves a single HTTP/1.1 response and returns the request head it received.
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}/range/", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut head = String::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
                head.push_str(&line);
            }

            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {status_line}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            stream.flush().unwrap();
            head
        });

        (base_url, handle)
    }

    #[test]
    fn test_http_transport_range_query() {
        let (base_url, server) = serve_once(
            "200 OK",
            "0018A45C4D1DEF81644B54AB7F969B88D65:1\r\n00D4F6E8FA6EECAD2A3AA415EEC418D38EC:2\r\n",
        );

        let config = HttpConfig { add_padding: true, ..HttpConfig::default() };
        let transport = HttpTransport::new(&config).unwrap();
        let client = RangeClient::new(transport).with_base_url(base_url);

        let got = client.range("abcde0018A45C4D1DEF81644B54AB7F969B88D65").unwrap();
        assert_eq!(
            got,
            vec![
                Match { digest: "ABCDE0018A45C4D1DEF81644B54AB7F969B88D65".into(), count: 1 },
                Match { digest: "ABCDE00D4F6E8FA6EECAD2A3AA415EEC418D38EC".into(), count: 2 },
            ]
        );

        let head = server.join().unwrap();
        assert!(head.starts_with("GET /range/ABCDE HTTP/1.1\r\n"), "request head: {head}");
        assert!(head.to_ascii_lowercase().contains("add-padding: true"), "request head: {head}");
    }

    #[test]
    fn test_http_transport_reports_status() {
        let (base_url, server) = serve_once("503 Service Unavailable", "");

        let transport = HttpTransport::new(&HttpConfig::default()).unwrap();
        let client = RangeClient::new(transport).with_base_url(base_url);

        let err = client.range(crate::Sha1Hex::digest("password").as_str()).unwrap_err();
        assert!(
            matches!(err, crate::Error::UnexpectedStatus { ref prefix, status: 503 } if prefix == "5BAA6"),
            "unexpected error: {err}"
        );
        assert!(err.is_retryable());
        server.join().unwrap();
    }

    #[test]
    fn test_http_transport_connection_refused() {
        // Bind then drop to get a local port nothing listens on.
        let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();

        let transport = HttpTransport::new(&HttpConfig::default()).unwrap();
        let client = RangeClient::new(transport).with_base_url(format!("http://{addr}/range/"));

        let err = client.range("ABCDE").unwrap_err();
        assert!(matches!(err, crate::Error::Transport { ref prefix, .. } if prefix == "ABCDE"));
    }

    #[test]
    #[ignore = "requires network access"]
    fn test_live_range_query() {
        let transport = HttpTransport::new(&HttpConfig::default()).unwrap();
        let client = RangeClient::new(transport);

        // "password123" is a commonly breached password
        // SHA1: CBFDAC6008F9CAB4083784CBD1874F76618D2A97
        let digest = crate::Sha1Hex::digest("password123");
        let matches = client.range(digest.as_str()).unwrap();
        assert!(matches.iter().all(|m| m.digest.starts_with("CBFDA")));
        assert!(crate::count_for(&matches, digest.as_str()) > 0);
    }
}
