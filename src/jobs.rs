//! Status checks for long-running provider jobs (stem separation, video
//! renders). The job id lives in the node's payload under `jobId`; the
//! outcome is written back next to it.

use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::components::workflow_canvas::WorkflowNode;
use crate::poll::{PollError, PollStatus};

const JOB_ID_KEY: &str = "jobId";
const JOB_STATUS_KEY: &str = "jobStatus";
const JOB_RESULT_KEY: &str = "jobResult";
const JOB_ERROR_KEY: &str = "jobError";

/// Node types whose providers finish work asynchronously.
const ASYNC_PROVIDERS: &[&str] = &["suno", "fadr", "piapi_video"];

#[derive(Debug, Error)]
pub enum JobError {
	#[error("status request failed: {0}")]
	Http(#[from] reqwest::Error),
	#[error("provider rejected status check: {0}")]
	Rejected(String),
	#[error("job failed: {0}")]
	Failed(String),
}

pub fn is_async_provider(node_type: &str) -> bool {
	ASYNC_PROVIDERS.contains(&node_type)
}

/// A job recorded on a node that has not settled yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingJob {
	pub node_id: String,
	pub job_id: String,
	pub endpoint: String,
}

impl PendingJob {
	/// Provider routes live under `<origin>/api/<node type>`.
	pub fn from_node(node: &WorkflowNode, origin: &str) -> Option<Self> {
		let job_id = node.data.get(JOB_ID_KEY)?.as_str()?.trim();
		if job_id.is_empty() || job_status(&node.data).is_some() {
			return None;
		}
		Some(Self {
			node_id: node.id.clone(),
			job_id: job_id.to_string(),
			endpoint: format!("{}/api/{}", origin.trim_end_matches('/'), node.node_type),
		})
	}
}

pub fn job_id(data: &Map<String, Value>) -> Option<&str> {
	data.get(JOB_ID_KEY).and_then(Value::as_str)
}

/// `None` while the job is running or no job has been recorded.
pub fn job_status(data: &Map<String, Value>) -> Option<&str> {
	data.get(JOB_STATUS_KEY).and_then(Value::as_str)
}

/// Short human-readable state for the inspector.
pub fn describe_job(data: &Map<String, Value>) -> String {
	if job_id(data).is_none_or(str::is_empty) {
		return "no job".to_string();
	}
	match (job_status(data), data.get(JOB_ERROR_KEY).and_then(Value::as_str)) {
		(None, _) => "running".to_string(),
		(Some(status), Some(error)) => format!("{}: {}", status, error),
		(Some(status), None) => status.to_string(),
	}
}

/// Starts tracking `job_id`, discarding any earlier outcome.
pub fn assign_job(data: &mut Map<String, Value>, job_id: &str) {
	for key in [JOB_STATUS_KEY, JOB_RESULT_KEY, JOB_ERROR_KEY] {
		data.remove(key);
	}
	data.insert(JOB_ID_KEY.to_string(), Value::from(job_id.trim()));
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
	success: bool,
	#[serde(default)]
	data: Value,
	#[serde(default)]
	error: Option<String>,
}

fn interpret(response: StatusResponse) -> Result<PollStatus<Value>, JobError> {
	if !response.success {
		let message = response.error.unwrap_or_else(|| "no details".to_string());
		return Err(JobError::Rejected(message));
	}
	let status = response
		.data
		.get("status")
		.and_then(Value::as_str)
		.unwrap_or_default()
		.to_ascii_lowercase();
	match status.as_str() {
		"complete" | "completed" | "succeeded" | "success" | "done" => {
			Ok(PollStatus::Ready(response.data))
		}
		"failed" | "error" | "cancelled" | "canceled" => {
			let message = response
				.data
				.get("error")
				.and_then(Value::as_str)
				.unwrap_or(status.as_str())
				.to_string();
			Err(JobError::Failed(message))
		}
		_ => Ok(PollStatus::Pending),
	}
}

/// One `{"action": "status"}` round trip. Error bodies from the route are
/// still JSON, so the HTTP status is not checked separately.
pub async fn check_status(
	client: &Client,
	job: &PendingJob,
) -> Result<PollStatus<Value>, JobError> {
	let response: StatusResponse = client
		.post(&job.endpoint)
		.json(&json!({ "action": "status", "jobId": job.job_id }))
		.send()
		.await?
		.json()
		.await?;
	interpret(response)
}

/// Writes a finished poll into the node payload. Returns `false` for a
/// cancelled poll, which leaves the payload alone.
pub fn record_outcome(
	data: &mut Map<String, Value>,
	outcome: Result<Value, PollError<JobError>>,
) -> bool {
	let status = match outcome {
		Ok(result) => {
			data.remove(JOB_ERROR_KEY);
			data.insert(JOB_RESULT_KEY.to_string(), result);
			"complete"
		}
		Err(PollError::Cancelled) => return false,
		Err(err @ PollError::Exhausted { .. }) => {
			data.insert(JOB_ERROR_KEY.to_string(), Value::from(err.to_string()));
			"timed_out"
		}
		Err(err) => {
			data.insert(JOB_ERROR_KEY.to_string(), Value::from(err.to_string()));
			"failed"
		}
	};
	data.insert(JOB_STATUS_KEY.to_string(), Value::from(status));
	true
}
