//! Raw S3 bucket API and its blocking REST implementation.
//!
//! # Responsibility
//! - Expose the three bucket calls the S3 adapter needs.
//! - Sign, send and decode S3 REST requests.
//!
//! # Invariants
//! - Provider error codes are carried unchanged inside `ApiError`.
//! - Requests are sent once; there is no retry loop here.

use crate::adapter::{AdapterError, AdapterResult};
use crate::aws::session::{AwsSession, Credentials, SessionError};
use crate::aws::signing::{sha256_hex, uri_encode, RequestSigner, SignableRequest};
use crate::aws::xml;
use crate::model::tag::Tag;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::Utc;
use log::debug;
use std::time::Duration;

const SERVICE: &str = "s3";
const TAGGING_QUERY: &str = "tagging=";

/// One entry of a bucket listing. Only the name is extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSummary {
    pub name: String,
}

/// Raw S3 bucket calls used by `S3Adapter`.
///
/// `get_bucket_tagging` reports a bucket without tags exactly as the
/// provider does: an error with code `NoSuchTagSet`.
pub trait BucketApi: Send + Sync {
    /// Lists all buckets owned by the session's account in one response.
    fn list_buckets(&self) -> AdapterResult<Vec<BucketSummary>>;

    fn get_bucket_tagging(&self, bucket: &str) -> AdapterResult<Vec<Tag>>;

    /// Replaces the bucket's whole tag set.
    fn put_bucket_tagging(&self, bucket: &str, tags: &[Tag]) -> AdapterResult<()>;
}

/// Blocking S3 REST client using path-style addressing.
pub struct S3RestClient {
    agent: ureq::Agent,
    base_url: String,
    host: String,
    region: String,
    credentials: Credentials,
}

impl S3RestClient {
    /// Builds a client from a validated session.
    pub fn new(session: &AwsSession) -> Result<Self, SessionError> {
        session.validate()?;
        let endpoint = session.s3_endpoint()?;
        let host_name = endpoint
            .host_str()
            .ok_or_else(|| SessionError::InvalidEndpoint(endpoint.to_string()))?;
        let host = match endpoint.port() {
            Some(port) => format!("{host_name}:{port}"),
            None => host_name.to_string(),
        };
        // Region redirects must surface as errors, not be followed or read as bodies.
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(session.timeout_secs))
            .redirects(0)
            .build();

        Ok(Self {
            agent,
            base_url: format!("{}://{host}", endpoint.scheme()),
            host,
            region: session.region.clone(),
            credentials: session.credentials.clone(),
        })
    }

    fn send(
        &self,
        method: &str,
        path: &str,
        query: &str,
        payload: &[u8],
        extra_headers: Vec<(String, String)>,
    ) -> AdapterResult<String> {
        let payload_hash = sha256_hex(payload);
        let mut headers = vec![
            ("host".to_string(), self.host.clone()),
            ("x-amz-content-sha256".to_string(), payload_hash.clone()),
        ];
        headers.extend(extra_headers);

        let signer = RequestSigner::new(&self.credentials, &self.region, SERVICE);
        let signed = signer.sign(
            &SignableRequest {
                method,
                path,
                query,
                headers: &headers,
                payload_hash: &payload_hash,
            },
            Utc::now(),
        );

        let url = if query.is_empty() {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}{path}?{query}", self.base_url)
        };
        let mut request = self.agent.request(method, &url);
        for (name, value) in &signed {
            request = request.set(name, value);
        }

        debug!(
            "event=s3_request module=aws status=sent method={} path={} query={}",
            method, path, query
        );
        let result = if payload.is_empty() {
            request.call()
        } else {
            request.send_bytes(payload)
        };

        match result {
            Ok(response) if (200..300).contains(&response.status()) => {
                response.into_string().map_err(|err| {
                    AdapterError::transport(format!("failed to read S3 response body: {err}"))
                })
            }
            Ok(response) => Err(self.status_error(method, path, response)),
            Err(ureq::Error::Status(_, response)) => Err(self.status_error(method, path, response)),
            Err(ureq::Error::Transport(transport)) => {
                Err(AdapterError::transport(transport.to_string()))
            }
        }
    }

    fn status_error(&self, method: &str, path: &str, response: ureq::Response) -> AdapterError {
        let status = response.status();
        let body = response.into_string().unwrap_or_default();
        let api_error = xml::parse_error(status, &body);
        debug!(
            "event=s3_request module=aws status=error method={} path={} http_status={} code={}",
            method, path, status, api_error.code
        );
        AdapterError::from_api(api_error)
    }
}

impl BucketApi for S3RestClient {
    fn list_buckets(&self) -> AdapterResult<Vec<BucketSummary>> {
        let body = self.send("GET", "/", "", &[], Vec::new())?;
        xml::parse_list_buckets(&body)
    }

    fn get_bucket_tagging(&self, bucket: &str) -> AdapterResult<Vec<Tag>> {
        let path = bucket_path(bucket);
        let body = self.send("GET", &path, TAGGING_QUERY, &[], Vec::new())?;
        xml::parse_tagging(&body)
    }

    fn put_bucket_tagging(&self, bucket: &str, tags: &[Tag]) -> AdapterResult<()> {
        let path = bucket_path(bucket);
        let body = xml::render_tagging(tags)?;
        let content_md5 = BASE64.encode(md5::compute(body.as_bytes()).0);
        let headers = vec![
            ("content-md5".to_string(), content_md5),
            ("content-type".to_string(), "application/xml".to_string()),
        ];
        self.send("PUT", &path, TAGGING_QUERY, body.as_bytes(), headers)?;
        Ok(())
    }
}

fn bucket_path(bucket: &str) -> String {
    format!("/{}", uri_encode(bucket, true))
}
