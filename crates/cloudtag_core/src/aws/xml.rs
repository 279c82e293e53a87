//! S3 REST XML bodies.

use crate::adapter::{AdapterError, ApiError};
use crate::aws::s3_client::BucketSummary;
use crate::model::tag::Tag;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

const S3_XMLNS: &str = "http://s3.amazonaws.com/doc/2006-03-01/";
const MAX_ERROR_BODY_CHARS: usize = 200;

#[derive(Debug, Deserialize)]
struct ListAllMyBucketsResult {
    #[serde(rename = "Buckets", default)]
    buckets: BucketList,
}

#[derive(Debug, Default, Deserialize)]
struct BucketList {
    #[serde(rename = "Bucket", default)]
    entries: Vec<BucketEntry>,
}

#[derive(Debug, Deserialize)]
struct BucketEntry {
    #[serde(rename = "Name")]
    name: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "Tagging")]
struct Tagging {
    #[serde(rename = "@xmlns", default, skip_serializing_if = "Option::is_none")]
    xmlns: Option<String>,
    #[serde(rename = "TagSet", default)]
    tag_set: TagSet,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct TagSet {
    #[serde(rename = "Tag", default)]
    tags: Vec<TagEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct TagEntry {
    #[serde(rename = "Key")]
    key: String,
    #[serde(rename = "Value", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(rename = "Code")]
    code: String,
    #[serde(rename = "Message", default)]
    message: String,
    #[serde(rename = "RequestId", default)]
    request_id: Option<String>,
}

/// Decodes `body` only when its root element is `root`.
///
/// Serde decoding ignores the root name, so an `<Error>` body would
/// otherwise decode as an empty result.
fn parse_rooted<T: DeserializeOwned>(
    body: &str,
    root: &str,
    operation: &str,
) -> Result<T, AdapterError> {
    match root_element(body) {
        Some(found) if found == root => {}
        Some(found) => {
            return Err(AdapterError::MalformedResponse(format!(
                "{operation}: expected <{root}>, got <{found}>"
            )))
        }
        None => {
            return Err(AdapterError::MalformedResponse(format!(
                "{operation}: no root element"
            )))
        }
    }
    quick_xml::de::from_str(body)
        .map_err(|err| AdapterError::MalformedResponse(format!("{operation}: {err}")))
}

fn root_element(body: &str) -> Option<String> {
    let mut reader = Reader::from_str(body);
    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) | Ok(Event::Empty(start)) => {
                return Some(String::from_utf8_lossy(start.local_name().as_ref()).into_owned())
            }
            Ok(Event::Eof) | Err(_) => return None,
            Ok(_) => {}
        }
    }
}

pub(crate) fn parse_list_buckets(body: &str) -> Result<Vec<BucketSummary>, AdapterError> {
    let result: ListAllMyBucketsResult =
        parse_rooted(body, "ListAllMyBucketsResult", "ListBuckets")?;
    Ok(result
        .buckets
        .entries
        .into_iter()
        .map(|entry| BucketSummary { name: entry.name })
        .collect())
}

pub(crate) fn parse_tagging(body: &str) -> Result<Vec<Tag>, AdapterError> {
    let tagging: Tagging = parse_rooted(body, "Tagging", "GetBucketTagging")?;
    Ok(tagging
        .tag_set
        .tags
        .into_iter()
        .map(|entry| Tag::new(entry.key, entry.value))
        .collect())
}

pub(crate) fn render_tagging(tags: &[Tag]) -> Result<String, AdapterError> {
    let tagging = Tagging {
        xmlns: Some(S3_XMLNS.to_string()),
        tag_set: TagSet {
            tags: tags
                .iter()
                .map(|tag| TagEntry {
                    key: tag.key.clone(),
                    value: tag.value.clone(),
                })
                .collect(),
        },
    };
    quick_xml::se::to_string(&tagging)
        .map_err(|err| AdapterError::MalformedResponse(format!("PutBucketTagging body: {err}")))
}

/// Decodes an S3 error response, falling back to the HTTP status.
pub(crate) fn parse_error(status: u16, body: &str) -> ApiError {
    match quick_xml::de::from_str::<ErrorBody>(body) {
        Ok(parsed) => ApiError {
            status: Some(status),
            code: parsed.code,
            message: parsed.message,
            request_id: parsed.request_id,
        },
        Err(_) => {
            let snippet: String = body
                .replace(['\n', '\r'], " ")
                .chars()
                .take(MAX_ERROR_BODY_CHARS)
                .collect();
            ApiError::new(status, format!("Http{status}"), snippet)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_error, parse_list_buckets, parse_tagging, render_tagging};
    use crate::adapter::AdapterError;
    use crate::model::tag::Tag;

    #[test]
    fn list_buckets_keeps_response_order() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListAllMyBucketsResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Owner><ID>abc</ID><DisplayName>me</DisplayName></Owner>
  <Buckets>
    <Bucket><Name>b-logs</Name><CreationDate>2019-12-11T23:32:47+00:00</CreationDate></Bucket>
    <Bucket><Name>a-assets</Name><CreationDate>2020-01-01T00:00:00+00:00</CreationDate></Bucket>
  </Buckets>
</ListAllMyBucketsResult>"#;
        let buckets = parse_list_buckets(body).expect("body should parse");
        let names: Vec<&str> = buckets.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["b-logs", "a-assets"]);
    }

    #[test]
    fn list_buckets_accepts_account_without_buckets() {
        let body = r#"<ListAllMyBucketsResult><Owner><ID>abc</ID></Owner><Buckets></Buckets></ListAllMyBucketsResult>"#;
        assert!(parse_list_buckets(body).expect("body should parse").is_empty());
    }

    const REDIRECT_BODY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>PermanentRedirect</Code><Message>The bucket you are attempting to access must be addressed using the specified endpoint.</Message><Endpoint>s3.eu-west-1.amazonaws.com</Endpoint><Bucket>far</Bucket><RequestId>R2</RequestId></Error>"#;

    #[test]
    fn list_buckets_rejects_error_body() {
        let err = parse_list_buckets(REDIRECT_BODY).expect_err("error body must not parse as a listing");
        assert!(matches!(err, AdapterError::MalformedResponse(ref message) if message.contains("<Error>")));
    }

    #[test]
    fn tagging_rejects_error_body() {
        let err = parse_tagging(REDIRECT_BODY).expect_err("error body must not parse as tags");
        assert!(matches!(err, AdapterError::MalformedResponse(ref message) if message.contains("<Error>")));
    }

    #[test]
    fn tagging_rejects_empty_body() {
        assert!(matches!(
            parse_tagging(""),
            Err(AdapterError::MalformedResponse(_))
        ));
    }

    #[test]
    fn tagging_parses_keys_and_values() {
        let body = r#"<Tagging xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <TagSet>
    <Tag><Key>env</Key><Value>prod</Value></Tag>
    <Tag><Key>owner</Key><Value>team-x</Value></Tag>
  </TagSet>
</Tagging>"#;
        let tags = parse_tagging(body).expect("body should parse");
        assert_eq!(tags, vec![Tag::new("env", "prod"), Tag::new("owner", "team-x")]);
    }

    #[test]
    fn render_tagging_emits_every_tag_in_order() {
        let body = render_tagging(&[Tag::new("env", "staging"), Tag::new("owner", "team-x")])
            .expect("body should render");
        assert!(body.starts_with("<Tagging"));
        let env = body.find("<Key>env</Key>").expect("env key rendered");
        let owner = body.find("<Key>owner</Key>").expect("owner key rendered");
        assert!(env < owner);
        assert!(body.contains("<Value>staging</Value>"));
    }

    #[test]
    fn error_body_exposes_provider_code() {
        let body = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>NoSuchTagSet</Code><Message>The TagSet does not exist</Message><BucketName>a</BucketName><RequestId>R1</RequestId></Error>"#;
        let err = parse_error(404, body);
        assert_eq!(err.code, "NoSuchTagSet");
        assert_eq!(err.status, Some(404));
        assert_eq!(err.request_id.as_deref(), Some("R1"));
    }

    #[test]
    fn unparsable_error_body_falls_back_to_status_code() {
        let err = parse_error(503, "<html>\nbusy</html>");
        assert_eq!(err.code, "Http503");
        assert!(!err.message.contains('\n'));
    }
}
