// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use reqwest::Method;
use reqwest::blocking::Client;

use crate::Error;
use crate::ErrorKind;
use crate::sink::http::HttpClient;

/// An [`HttpClient`] backed by a blocking `reqwest` client.
///
/// `POST`, `PUT` and `PATCH` requests carry the fields as a form body; any other method sends
/// them as query parameters. Only transport failures are reported; the response is dropped.
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: Client,
    url: String,
    method: Method,
}

impl ReqwestClient {
    /// Create a client posting to `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url)
    }

    /// Create a client posting to `url` through an existing `reqwest` client.
    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            method: Method::POST,
        }
    }

    /// Set the request method.
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// The target URL.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl HttpClient for ReqwestClient {
    fn send(&self, fields: &[(&str, String)]) -> Result<(), Error> {
        let request = self.client.request(self.method.clone(), &self.url);
        let request = if [Method::POST, Method::PUT, Method::PATCH].contains(&self.method) {
            request.form(fields)
        } else {
            request.query(fields)
        };

        // the response status is not inspected
        request.send().map_err(|err| {
            Error::new(ErrorKind::Http, "failed to send log request")
                .with_context("url", &self.url)
                .with_source(err)
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;
    use std::io::Write;
    use std::net::TcpListener;
    use std::net::TcpStream;
    use std::sync::mpsc;
    use std::thread;

    use super::*;

    // Answers every request with `status` and forwards the raw request text.
    fn serve(status: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/log", listener.local_addr().unwrap());
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            for stream in listener.incoming() {
                let mut stream = stream.unwrap();
                let request = read_request(&mut stream);
                let _ = write!(
                    stream,
                    "HTTP/1.1 {status}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
                );
                if tx.send(request).is_err() {
                    break;
                }
            }
        });
        (url, rx)
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0; 1024];
        loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8(buf).unwrap()
    }

    fn fields() -> Vec<(&'static str, String)> {
        vec![("level", "3".to_string()), ("message", "disk full".to_string())]
    }

    #[test]
    fn test_post_sends_form_body() {
        let (url, requests) = serve("200 OK");
        let client = ReqwestClient::new(&url);
        assert_eq!(client.url(), url);

        client.send(&fields()).unwrap();

        let request = requests.recv().unwrap();
        assert!(request.starts_with("POST /log HTTP/1.1\r\n"), "{request}");
        assert!(
            request
                .to_ascii_lowercase()
                .contains("content-type: application/x-www-form-urlencoded"),
            "{request}"
        );
        assert!(request.ends_with("\r\n\r\nlevel=3&message=disk+full"), "{request}");
    }

    #[test]
    fn test_get_sends_query() {
        let (url, requests) = serve("200 OK");
        let client = ReqwestClient::new(&url).method(Method::GET);

        client.send(&fields()).unwrap();

        let request = requests.recv().unwrap();
        assert!(
            request.starts_with("GET /log?level=3&message=disk+full HTTP/1.1\r\n"),
            "{request}"
        );
    }

    #[test]
    fn test_response_status_is_ignored() {
        let (url, requests) = serve("500 Internal Server Error");
        ReqwestClient::new(&url).send(&fields()).unwrap();
        assert!(requests.recv().is_ok());
    }

    #[test]
    fn test_refused_connection_is_http_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/log", listener.local_addr().unwrap());
        drop(listener);

        let err = ReqwestClient::new(&url).send(&fields()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Http);
    }
}
