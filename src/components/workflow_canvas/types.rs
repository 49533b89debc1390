use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A position in canvas or screen space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn offset(self, dx: f64, dy: f64) -> Self {
		Self::new(self.x + dx, self.y + dy)
	}

	pub fn sub(self, other: Point) -> Self {
		Self::new(self.x - other.x, self.y - other.y)
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size {
	pub width: f64,
	pub height: f64,
}

/// Semantic kind of data flowing through a port. Only drives colouring.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDataType {
	#[default]
	Any,
	Video,
	Audio,
	Image,
	Text,
	Tensor,
	Prompt,
}

impl PortDataType {
	pub fn color(self) -> &'static str {
		match self {
			PortDataType::Any => "#9ca3af",
			PortDataType::Video => "#ef4444",
			PortDataType::Audio => "#22c55e",
			PortDataType::Image => "#3b82f6",
			PortDataType::Text => "#eab308",
			PortDataType::Tensor => "#ec4899",
			PortDataType::Prompt => "#f97316",
		}
	}

	/// Lowercase name, matching the serialized form.
	pub fn label(self) -> &'static str {
		match self {
			PortDataType::Any => "any",
			PortDataType::Video => "video",
			PortDataType::Audio => "audio",
			PortDataType::Image => "image",
			PortDataType::Text => "text",
			PortDataType::Tensor => "tensor",
			PortDataType::Prompt => "prompt",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortDirection {
	Input,
	Output,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Port {
	pub id: String,
	#[serde(rename = "type")]
	pub direction: PortDirection,
	pub label: String,
	#[serde(default)]
	pub data_type: PortDataType,
}

impl Port {
	pub fn input(id: &str, label: &str, data_type: PortDataType) -> Self {
		Self {
			id: id.to_string(),
			direction: PortDirection::Input,
			label: label.to_string(),
			data_type,
		}
	}

	pub fn output(id: &str, label: &str, data_type: PortDataType) -> Self {
		Self {
			id: id.to_string(),
			direction: PortDirection::Output,
			label: label.to_string(),
			data_type,
		}
	}
}

/// A visual unit in the graph.
///
/// `data` is owned by whichever configuration panel edits the node; the
/// canvas carries it around but never reads it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowNode {
	pub id: String,
	#[serde(rename = "type")]
	pub node_type: String,
	pub title: String,
	#[serde(default)]
	pub icon: String,
	pub position: Point,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub size: Option<Size>,
	#[serde(default)]
	pub inputs: Vec<Port>,
	#[serde(default)]
	pub outputs: Vec<Port>,
	#[serde(default)]
	pub color: String,
	#[serde(default)]
	pub data: Map<String, Value>,
}

impl WorkflowNode {
	pub fn ports(&self, direction: PortDirection) -> &[Port] {
		match direction {
			PortDirection::Input => &self.inputs,
			PortDirection::Output => &self.outputs,
		}
	}

	pub fn port(&self, direction: PortDirection, port_id: &str) -> Option<(usize, &Port)> {
		self.ports(direction)
			.iter()
			.enumerate()
			.find(|(_, p)| p.id == port_id)
	}
}

/// One end of a connection.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PortRef {
	pub node_id: String,
	pub port_id: String,
}

impl PortRef {
	pub fn new(node_id: &str, port_id: &str) -> Self {
		Self {
			node_id: node_id.to_string(),
			port_id: port_id.to_string(),
		}
	}
}

/// Directed edge from an output port to an input port.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
	pub id: String,
	pub from_node: String,
	pub from_port: String,
	pub to_node: String,
	pub to_port: String,
	#[serde(default)]
	pub animated: bool,
}

impl Connection {
	pub fn touches(&self, node_id: &str) -> bool {
		self.from_node == node_id || self.to_node == node_id
	}
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowGraph {
	pub nodes: Vec<WorkflowNode>,
	pub connections: Vec<Connection>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn node_serializes_with_camel_case_and_type_tag() {
		let node = WorkflowNode {
			id: "tts_1".into(),
			node_type: "tts".into(),
			title: "Voice".into(),
			icon: "🎙".into(),
			position: Point::new(40.0, 60.0),
			size: None,
			inputs: vec![Port::input("text", "Text", PortDataType::Text)],
			outputs: vec![Port::output("audio", "Audio", PortDataType::Audio)],
			color: "#22c55e".into(),
			data: Map::new(),
		};
		let json = serde_json::to_value(&node).unwrap();
		assert_eq!(json["type"], "tts");
		assert_eq!(json["inputs"][0]["type"], "input");
		assert_eq!(json["inputs"][0]["dataType"], "text");
		assert!(json.get("size").is_none());
	}

	#[test]
	fn data_type_labels_match_serialized_names() {
		for data_type in [
			PortDataType::Any,
			PortDataType::Video,
			PortDataType::Audio,
			PortDataType::Image,
			PortDataType::Text,
			PortDataType::Tensor,
			PortDataType::Prompt,
		] {
			let json = serde_json::to_value(data_type).unwrap();
			assert_eq!(json, data_type.label());
		}
	}

	#[test]
	fn opaque_data_survives_unchanged() {
		let raw = r#"{
			"id": "n1", "type": "lyria", "title": "Lyria", "position": {"x": 0.0, "y": 0.0},
			"data": {"prompt": "lofi", "bpm": 82, "nested": {"tags": ["a", "b"]}}
		}"#;
		let node: WorkflowNode = serde_json::from_str(raw).unwrap();
		assert_eq!(node.data["bpm"], 82);
		assert_eq!(node.data["nested"]["tags"][1], "b");
		assert!(node.inputs.is_empty());
		assert_eq!(node.icon, "");
	}

	#[test]
	fn port_lookup_reports_index() {
		let node = WorkflowNode {
			id: "mix".into(),
			node_type: "mixer".into(),
			title: "Mixer".into(),
			icon: String::new(),
			position: Point::default(),
			size: None,
			inputs: vec![
				Port::input("a", "A", PortDataType::Audio),
				Port::input("b", "B", PortDataType::Audio),
			],
			outputs: vec![],
			color: String::new(),
			data: Map::new(),
		};
		assert_eq!(node.port(PortDirection::Input, "b").map(|(i, _)| i), Some(1));
		assert!(node.port(PortDirection::Output, "b").is_none());
	}
}
