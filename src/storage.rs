//! Browser local-storage persistence for workflow graphs.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Storage;

use crate::catalog::WorkflowKind;
use crate::components::workflow_canvas::WorkflowGraph;

pub const STORAGE_PREFIX: &str = "forge.workflow.";
const DOCUMENT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StorageError {
	#[error("local storage is unavailable")]
	Unavailable,
	#[error("local storage access failed: {0}")]
	Access(String),
	#[error("invalid workflow document: {0}")]
	Serde(#[from] serde_json::Error),
	#[error("unsupported workflow document version {0}")]
	UnsupportedVersion(u32),
}

impl From<JsValue> for StorageError {
	fn from(value: JsValue) -> Self {
		let text = match value.dyn_into::<js_sys::Error>() {
			Ok(err) => String::from(err.message()),
			Err(other) => other.as_string().unwrap_or_else(|| format!("{:?}", other)),
		};
		StorageError::Access(text)
	}
}

#[derive(Serialize, Deserialize)]
struct StoredWorkflow {
	version: u32,
	graph: WorkflowGraph,
}

pub fn storage_key(kind: WorkflowKind) -> String {
	format!("{}{}", STORAGE_PREFIX, kind.slug())
}

pub fn encode(graph: &WorkflowGraph) -> Result<String, StorageError> {
	#[derive(Serialize)]
	struct Borrowed<'a> {
		version: u32,
		graph: &'a WorkflowGraph,
	}
	Ok(serde_json::to_string(&Borrowed {
		version: DOCUMENT_VERSION,
		graph,
	})?)
}

pub fn decode(json: &str) -> Result<WorkflowGraph, StorageError> {
	let stored: StoredWorkflow = serde_json::from_str(json)?;
	if stored.version != DOCUMENT_VERSION {
		return Err(StorageError::UnsupportedVersion(stored.version));
	}
	Ok(stored.graph)
}

fn local_storage() -> Result<Storage, StorageError> {
	let window = web_sys::window().ok_or(StorageError::Unavailable)?;
	window.local_storage()?.ok_or(StorageError::Unavailable)
}

pub fn save(kind: WorkflowKind, graph: &WorkflowGraph) -> Result<(), StorageError> {
	let json = encode(graph)?;
	local_storage()?.set_item(&storage_key(kind), &json)?;
	Ok(())
}

/// `Ok(None)` when nothing has been saved for `kind` yet.
pub fn load(kind: WorkflowKind) -> Result<Option<WorkflowGraph>, StorageError> {
	match local_storage()?.get_item(&storage_key(kind))? {
		Some(json) => decode(&json).map(Some),
		None => Ok(None),
	}
}

pub fn clear(kind: WorkflowKind) -> Result<(), StorageError> {
	local_storage()?.remove_item(&storage_key(kind))?;
	Ok(())
}
