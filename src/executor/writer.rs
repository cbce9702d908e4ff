use std::{fs, path::Path};

use crate::error::{BatchError, BatchResult};

use super::models::ExecutionResult;

/// Writes the results as a pretty-printed JSON array, creating parent
/// directories as needed.
pub fn write_results(path: &Path, results: &[ExecutionResult]) -> BatchResult<()> {
    let persistence = |source| BatchError::Persistence {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(persistence)?;
    }

    let mut encoded = serde_json::to_string_pretty(results)?;
    encoded.push('\n');
    fs::write(path, encoded).map_err(persistence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::RequestDescriptor;
    use crate::executor::models::{ResponseRecord, ResponseStatus};
    use anyhow::Result;
    use serde_json::{json, Value};
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn sample(index: usize) -> ExecutionResult {
        ExecutionResult {
            request: RequestDescriptor::new(index, "GET", "https://example.test/ok"),
            response: ResponseRecord {
                status: ResponseStatus::Code(200),
                status_text: "OK".to_string(),
                data: json!({"x": 1}),
                headers: BTreeMap::from([(
                    "content-type".to_string(),
                    "application/json".to_string(),
                )]),
            },
        }
    }

    #[test]
    fn writes_pretty_json_into_new_directories() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("out/nested/responses.json");

        write_results(&path, &[sample(0), sample(1)])?;

        let contents = std::fs::read_to_string(&path)?;
        assert!(contents.starts_with("[\n  {\n    \"request\""));
        let value: Value = serde_json::from_str(&contents)?;
        assert_eq!(value.as_array().map(Vec::len), Some(2));
        assert_eq!(
            value[0],
            json!({
                "request": {"index": 0, "method": "GET", "url": "https://example.test/ok"},
                "response": {
                    "status": 200,
                    "statusText": "OK",
                    "data": {"x": 1},
                    "headers": {"content-type": "application/json"}
                }
            })
        );
        Ok(())
    }

    #[test]
    fn writes_empty_array_for_empty_batch() -> Result<()> {
        let temp = tempdir()?;
        let path = temp.path().join("responses.json");

        write_results(&path, &[])?;

        assert_eq!(std::fs::read_to_string(&path)?, "[]\n");
        Ok(())
    }

    #[test]
    fn reports_persistence_failures() -> Result<()> {
        let temp = tempdir()?;
        let blocker = temp.path().join("file");
        std::fs::write(&blocker, "")?;

        let err = write_results(&blocker.join("responses.json"), &[sample(0)]).unwrap_err();
        assert!(matches!(err, BatchError::Persistence { .. }));
        Ok(())
    }
}
