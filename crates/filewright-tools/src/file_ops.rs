//! File and folder operation handler.
//!
//! A single dispatcher turns a sparse set of optional parameters into file
//! system actions - ensure a folder, read a file, create/overwrite a file -
//! performed in that fixed order, and reports what it did as a newline-joined
//! narrative the model can quote back to the user.

use filewright_core::error::ToolError;
use filewright_core::types::ToolDefinition;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

pub const TOOL_NAME: &str = "file_and_folder_handler";

/// Arguments of one tool call. Every field is optional; any subset,
/// including the empty one, is a valid request. Empty strings count as
/// absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FileOpRequest {
    /// Name of a file to create or overwrite, joined with `folder_name`
    /// when one is given.
    pub file_name: Option<String>,
    /// Directory to create if missing, and to prefix `file_name` with.
    pub folder_name: Option<String>,
    /// Payload for the write; absent or empty means an empty file.
    pub content: Option<String>,
    /// Read target. Used as given, never joined with `folder_name`.
    pub file_path: Option<String>,
    pub read: Option<bool>,
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

impl FileOpRequest {
    pub fn wants_folder(&self) -> Option<&str> {
        present(&self.folder_name)
    }

    /// The read intent requires both the flag and a path.
    pub fn wants_read(&self) -> Option<&str> {
        if self.read.unwrap_or(false) {
            present(&self.file_path)
        } else {
            None
        }
    }

    pub fn wants_write(&self) -> Option<&str> {
        present(&self.file_name)
    }
}

/// Runs the requested operations in fixed order (folder, then read, then
/// write) and returns one status line per action performed. An all-absent
/// request is a no-op and yields an empty narrative.
pub fn dispatch(request: &FileOpRequest) -> Result<String, ToolError> {
    let mut lines: Vec<String> = Vec::new();

    if let Some(folder) = request.wants_folder() {
        fs::create_dir_all(folder)?;
        lines.push(format!("Folder '{}' is ready.", folder));
    }

    if let Some(path) = request.wants_read() {
        if Path::new(path).exists() {
            let data = fs::read_to_string(path)?;
            lines.push(format!("Content of {} is {}.", path, data));
        } else {
            lines.push(format!("File {} does not exist.", path));
        }
    }

    if let Some(file) = request.wants_write() {
        let target: PathBuf = match request.wants_folder() {
            Some(folder) => Path::new(folder).join(file),
            None => PathBuf::from(file),
        };
        let payload = present(&request.content).unwrap_or("");
        fs::write(&target, payload)?;
        lines.push(format!(
            "File '{}' has been created successfully.",
            target.display()
        ));
        if !payload.is_empty() {
            lines.push(format!("Content written to '{}'.", target.display()));
        }
    }

    Ok(lines.join("\n"))
}

/// The one tool the assistant exposes to the model.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileOpsTool;

impl FileOpsTool {
    pub fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: TOOL_NAME.to_string(),
            description: "Create folders, create or overwrite files with optional content, \
                          and read file contents. Pass only the parameters for the operations \
                          you want; they can be combined in one call."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "file_name": {
                        "type": "string",
                        "description": "Name of a file to create or overwrite, relative to folder_name when given"
                    },
                    "folder_name": {
                        "type": "string",
                        "description": "Name of a directory to create if it does not exist"
                    },
                    "content": {
                        "type": "string",
                        "description": "Text to write into file_name; omit to create an empty file"
                    },
                    "file_path": {
                        "type": "string",
                        "description": "Path of a file to read"
                    },
                    "read": {
                        "type": "boolean",
                        "description": "Read file_path and include its content in the result"
                    }
                }
            }),
        }
    }

    fn run(&self, args: &Value) -> Result<String, ToolError> {
        let request: FileOpRequest =
            serde_json::from_value(args.clone()).map_err(ToolError::Arguments)?;
        debug!(?request, "dispatching file operation");
        dispatch(&request)
    }

    /// Tool boundary: nothing fails past this point. The caller receives the
    /// narrative on success and `None` on any internal failure, with the
    /// cause going to the log instead.
    pub fn invoke(&self, args: &Value) -> Option<String> {
        match self.run(args) {
            Ok(narrative) => Some(narrative),
            Err(e) => {
                error!(error = %e, "file operation failed");
                None
            }
        }
    }
}
