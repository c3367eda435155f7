//! Local document tools: text file reading and directory listing.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::tools::schema::ToolParameters;
use crate::tools::tool::{ResearchTool, Tool};

const DEFAULT_DIRECTORY: &str = "./data";

/// Create the `read_text_file` tool.
pub fn read_text_file_tool() -> Arc<dyn Tool> {
    Arc::new(ResearchTool::new(
        "read_text_file",
        "Read the content of a local text file. Use for notes, data files and \
         other plain-text material the user points at.",
        ToolParameters::object()
            .string("file_path", "Path to the text file", true)
            .build(),
        |args| async move {
            let file_path = args.get_str("file_path")?.to_string();

            debug!(path = %file_path, "reading text file");

            match tokio::fs::read_to_string(&file_path).await {
                Ok(content) => Ok(serde_json::json!({
                    "status": "success",
                    "file_path": file_path,
                    "content_length": content.len(),
                    "content": content,
                })),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Ok(serde_json::json!({
                        "status": "error",
                        "message": format!("File not found: {file_path}"),
                        "file_path": file_path,
                    }))
                }
                Err(e) => Ok(serde_json::json!({
                    "status": "error",
                    "message": format!("Failed to read file: {e}"),
                    "file_path": file_path,
                })),
            }
        },
    ))
}

/// Create the `list_directory` tool.
pub fn list_directory_tool() -> Arc<dyn Tool> {
    Arc::new(ResearchTool::new(
        "list_directory",
        "List the files and subdirectories of a local directory.",
        ToolParameters::object()
            .string(
                "directory_path",
                "Path to the directory (default ./data)",
                false,
            )
            .build(),
        |args| async move {
            let directory = args
                .get_str_opt("directory_path")
                .unwrap_or(DEFAULT_DIRECTORY)
                .to_string();

            let mut entries = match tokio::fs::read_dir(Path::new(&directory)).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Ok(serde_json::json!({
                        "status": "error",
                        "message": format!("Directory not found: {directory}"),
                        "directory": directory,
                    }));
                }
                Err(e) => {
                    return Ok(serde_json::json!({
                        "status": "error",
                        "message": format!("Failed to list directory: {e}"),
                        "directory": directory,
                    }));
                }
            };

            let mut items = Vec::new();
            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name().to_string_lossy().into_owned();
                let metadata = entry.metadata().await?;
                items.push(serde_json::json!({
                    "name": name,
                    "type": if metadata.is_dir() { "directory" } else { "file" },
                    "size": if metadata.is_file() {
                        serde_json::Value::from(metadata.len())
                    } else {
                        serde_json::Value::Null
                    },
                }));
            }
            // Directory iteration order is platform-dependent.
            items.sort_by(|a, b| a["name"].as_str().cmp(&b["name"].as_str()));

            Ok(serde_json::json!({
                "status": "success",
                "directory": directory,
                "count": items.len(),
                "items": items,
            }))
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::arguments::ToolArguments;

    #[tokio::test]
    async fn read_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "solar capacity grew 24% in 2024").unwrap();

        let tool = read_text_file_tool();
        let args = ToolArguments::new(serde_json::json!({
            "file_path": path.to_string_lossy(),
        }));
        let result = tool.execute(&args).await.unwrap();

        assert_eq!(result["status"], "success");
        assert_eq!(result["content"], "solar capacity grew 24% in 2024");
        assert_eq!(result["content_length"], 31);
    }

    #[tokio::test]
    async fn missing_file_is_error_status() {
        let tool = read_text_file_tool();
        let args = ToolArguments::new(serde_json::json!({
            "file_path": "/no/such/file.txt",
        }));
        let result = tool.execute(&args).await.unwrap();
        assert_eq!(result["status"], "error");
        assert!(result["message"]
            .as_str()
            .unwrap()
            .contains("File not found"));
    }

    #[tokio::test]
    async fn list_directory_reports_files_and_subdirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "aa").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let tool = list_directory_tool();
        let args = ToolArguments::new(serde_json::json!({
            "directory_path": dir.path().to_string_lossy(),
        }));
        let result = tool.execute(&args).await.unwrap();

        assert_eq!(result["status"], "success");
        assert_eq!(result["count"], 2);
        let items = result["items"].as_array().unwrap();
        assert_eq!(items[0]["name"], "a.txt");
        assert_eq!(items[0]["type"], "file");
        assert_eq!(items[0]["size"], 2);
        assert_eq!(items[1]["name"], "sub");
        assert_eq!(items[1]["type"], "directory");
        assert!(items[1]["size"].is_null());
    }

    #[tokio::test]
    async fn missing_directory_is_error_status() {
        let tool = list_directory_tool();
        let args = ToolArguments::new(serde_json::json!({
            "directory_path": "/no/such/dir",
        }));
        let result = tool.execute(&args).await.unwrap();
        assert_eq!(result["status"], "error");
        assert!(result["message"]
            .as_str()
            .unwrap()
            .contains("Directory not found"));
    }
}
