use std::path::Path;

use serde_json::Value;
use tokio::fs;

use crate::error::{BatchError, BatchResult};

use super::model::RequestDescriptor;

/// Reads and decodes a request file, then hands the value to [`load`].
pub async fn read_request_file(path: &Path) -> BatchResult<Vec<RequestDescriptor>> {
    let raw = fs::read_to_string(path)
        .await
        .map_err(|source| BatchError::ReadInput {
            path: path.to_path_buf(),
            source,
        })?;

    let value: Value = serde_json::from_str(&raw).map_err(|source| BatchError::ParseInput {
        path: path.to_path_buf(),
        source,
    })?;

    load(value)
}

/// Turns a decoded JSON value into indexed descriptors.
///
/// The only check is that the value is an array. Elements are taken as they
/// come: a non-object element loads with every field absent, and fields of
/// the wrong type are kept as-is. Both fail later, when the request is sent.
pub fn load(raw: Value) -> BatchResult<Vec<RequestDescriptor>> {
    let Value::Array(items) = raw else {
        return Err(BatchError::InvalidInputShape {
            found: json_kind(&raw),
        });
    };

    Ok(items
        .into_iter()
        .enumerate()
        .map(|(index, item)| descriptor_from_value(index, item))
        .collect())
}

fn descriptor_from_value(index: usize, item: Value) -> RequestDescriptor {
    let Value::Object(mut fields) = item else {
        return RequestDescriptor {
            index,
            method: None,
            url: None,
            body: None,
            token: None,
        };
    };

    RequestDescriptor {
        index,
        method: fields.remove("method"),
        url: fields.remove("url"),
        body: fields.remove("body"),
        token: fields.remove("token"),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn assigns_indices_in_input_order() -> Result<()> {
        let descriptors = load(json!([
            {"method": "GET", "url": "https://example.test/a"},
            {"method": "POST", "url": "https://example.test/b", "body": {"a": 1}, "token": "abc"},
        ]))?;

        assert_eq!(descriptors.len(), 2);
        assert_eq!(
            descriptors[0],
            RequestDescriptor::new(0, "GET", "https://example.test/a")
        );
        assert_eq!(
            descriptors[1],
            RequestDescriptor::new(1, "POST", "https://example.test/b")
                .with_body(json!({"a": 1}))
                .with_token("abc")
        );
        Ok(())
    }

    #[test]
    fn rejects_objects_before_anything_else() {
        let err = load(json!({})).unwrap_err();
        assert!(matches!(
            err,
            BatchError::InvalidInputShape { found: "object" }
        ));
        assert!(err.to_string().contains("array of requests"));
    }

    #[test]
    fn rejects_scalars() {
        for (value, kind) in [
            (json!("GET"), "string"),
            (json!(3), "number"),
            (Value::Null, "null"),
        ] {
            match load(value) {
                Err(BatchError::InvalidInputShape { found }) => assert_eq!(found, kind),
                other => panic!("expected shape error, got {other:?}"),
            }
        }
    }

    #[test]
    fn empty_array_loads_nothing() -> Result<()> {
        assert!(load(json!([]))?.is_empty());
        Ok(())
    }

    #[test]
    fn malformed_elements_keep_their_raw_values() -> Result<()> {
        let descriptors = load(json!([
            "not an object",
            {"method": 7, "url": ["nope"], "body": null, "token": 123},
        ]))?;

        assert_eq!(descriptors[0].index, 0);
        assert_eq!(descriptors[0].url, None);
        assert_eq!(descriptors[1].method, Some(json!(7)));
        assert_eq!(descriptors[1].url, Some(json!(["nope"])));
        assert_eq!(descriptors[1].body, Some(Value::Null));
        assert_eq!(descriptors[1].token, Some(json!(123)));

        let echo = serde_json::to_value(&descriptors[1])?;
        assert_eq!(
            echo,
            json!({"index": 1, "method": 7, "url": ["nope"], "body": null, "token": 123})
        );
        Ok(())
    }

    #[tokio::test]
    async fn read_request_file_reports_parse_errors() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("requests.json");
        std::fs::write(&path, "[{")?;

        let err = read_request_file(&path).await.unwrap_err();
        assert!(matches!(err, BatchError::ParseInput { .. }));
        assert!(err.to_string().contains("requests.json"));
        Ok(())
    }

    #[tokio::test]
    async fn read_request_file_reports_missing_files() {
        let err = read_request_file(Path::new("does-not-exist.json"))
            .await
            .unwrap_err();
        assert!(matches!(err, BatchError::ReadInput { .. }));
    }
}
