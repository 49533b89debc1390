//! Node palettes and starter graphs for each workflow editor.

use serde_json::Map;

use crate::components::workflow_canvas::{
	Connection, Point, Port, PortDataType, WorkflowGraph, WorkflowNode, new_node_id,
};

pub struct PortSpec {
	pub id: &'static str,
	pub label: &'static str,
	pub data_type: PortDataType,
}

const fn port(id: &'static str, label: &'static str, data_type: PortDataType) -> PortSpec {
	PortSpec {
		id,
		label,
		data_type,
	}
}

pub struct NodeTemplate {
	pub node_type: &'static str,
	pub title: &'static str,
	pub icon: &'static str,
	pub color: &'static str,
	pub inputs: &'static [PortSpec],
	pub outputs: &'static [PortSpec],
}

impl NodeTemplate {
	pub fn instantiate(&self, position: Point) -> WorkflowNode {
		self.build(new_node_id(self.node_type), position)
	}

	fn build(&self, id: String, position: Point) -> WorkflowNode {
		WorkflowNode {
			id,
			node_type: self.node_type.to_string(),
			title: self.title.to_string(),
			icon: self.icon.to_string(),
			position,
			size: None,
			inputs: self
				.inputs
				.iter()
				.map(|p| Port::input(p.id, p.label, p.data_type))
				.collect(),
			outputs: self
				.outputs
				.iter()
				.map(|p| Port::output(p.id, p.label, p.data_type))
				.collect(),
			color: self.color.to_string(),
			data: Map::new(),
		}
	}
}

/// Where the `index`-th palette addition lands, so repeated clicks fan out
/// instead of stacking.
pub fn stagger(index: usize) -> Point {
	let step = (index % 8) as f64;
	Point::new(140.0 + step * 40.0, 100.0 + step * 40.0)
}

const PROMPT: NodeTemplate = NodeTemplate {
	node_type: "prompt",
	title: "Prompt",
	icon: "✎",
	color: "#f97316",
	inputs: &[],
	outputs: &[port("prompt", "Prompt", PortDataType::Prompt)],
};

const SUNO: NodeTemplate = NodeTemplate {
	node_type: "suno",
	title: "Suno Song",
	icon: "♫",
	color: "#8b5cf6",
	inputs: &[
		port("prompt", "Prompt", PortDataType::Prompt),
		port("lyrics", "Lyrics", PortDataType::Text),
	],
	outputs: &[port("audio", "Song", PortDataType::Audio)],
};

const LYRIA: NodeTemplate = NodeTemplate {
	node_type: "lyria",
	title: "Lyria Music",
	icon: "♪",
	color: "#6366f1",
	inputs: &[port("prompt", "Prompt", PortDataType::Prompt)],
	outputs: &[port("audio", "Music", PortDataType::Audio)],
};

const ELEVENLABS: NodeTemplate = NodeTemplate {
	node_type: "elevenlabs",
	title: "ElevenLabs Voice",
	icon: "🎙",
	color: "#22c55e",
	inputs: &[port("text", "Script", PortDataType::Text)],
	outputs: &[port("audio", "Voice", PortDataType::Audio)],
};

const FADR: NodeTemplate = NodeTemplate {
	node_type: "fadr",
	title: "Fadr Stems",
	icon: "≋",
	color: "#14b8a6",
	inputs: &[port("audio", "Mix", PortDataType::Audio)],
	outputs: &[
		port("vocals", "Vocals", PortDataType::Audio),
		port("drums", "Drums", PortDataType::Audio),
		port("bass", "Bass", PortDataType::Audio),
	],
};

const MIXER: NodeTemplate = NodeTemplate {
	node_type: "mixer",
	title: "Mixer",
	icon: "⧉",
	color: "#0ea5e9",
	inputs: &[
		port("a", "Track A", PortDataType::Audio),
		port("b", "Track B", PortDataType::Audio),
	],
	outputs: &[port("audio", "Mix", PortDataType::Audio)],
};

const STABILITY: NodeTemplate = NodeTemplate {
	node_type: "stability",
	title: "Stability Image",
	icon: "◧",
	color: "#3b82f6",
	inputs: &[port("prompt", "Prompt", PortDataType::Prompt)],
	outputs: &[port("image", "Image", PortDataType::Image)],
};

const UPSCALE: NodeTemplate = NodeTemplate {
	node_type: "upscale",
	title: "Upscale",
	icon: "⤢",
	color: "#60a5fa",
	inputs: &[port("image", "Image", PortDataType::Image)],
	outputs: &[port("image", "Image", PortDataType::Image)],
};

const PIAPI_VIDEO: NodeTemplate = NodeTemplate {
	node_type: "piapi_video",
	title: "PiAPI Video",
	icon: "▶",
	color: "#ef4444",
	inputs: &[
		port("prompt", "Prompt", PortDataType::Prompt),
		port("image", "Keyframe", PortDataType::Image),
	],
	outputs: &[port("video", "Video", PortDataType::Video)],
};

const VIDEO_MERGE: NodeTemplate = NodeTemplate {
	node_type: "video_merge",
	title: "Merge A/V",
	icon: "⊕",
	color: "#f43f5e",
	inputs: &[
		port("video", "Video", PortDataType::Video),
		port("audio", "Audio", PortDataType::Audio),
	],
	outputs: &[port("video", "Video", PortDataType::Video)],
};

const BRIEF: NodeTemplate = NodeTemplate {
	node_type: "brief",
	title: "Campaign Brief",
	icon: "☰",
	color: "#eab308",
	inputs: &[],
	outputs: &[port("text", "Brief", PortDataType::Text)],
};

const COPYWRITER: NodeTemplate = NodeTemplate {
	node_type: "copywriter",
	title: "Copywriter",
	icon: "✍",
	color: "#facc15",
	inputs: &[port("text", "Brief", PortDataType::Text)],
	outputs: &[
		port("subject", "Subject", PortDataType::Text),
		port("body", "Body", PortDataType::Text),
	],
};

const EMAIL_LAYOUT: NodeTemplate = NodeTemplate {
	node_type: "email_layout",
	title: "Email Layout",
	icon: "✉",
	color: "#f59e0b",
	inputs: &[
		port("subject", "Subject", PortDataType::Text),
		port("body", "Body", PortDataType::Text),
		port("hero", "Hero", PortDataType::Image),
	],
	outputs: &[port("html", "HTML", PortDataType::Text)],
};

const TRIGGER: NodeTemplate = NodeTemplate {
	node_type: "trigger",
	title: "Trigger",
	icon: "⚡",
	color: "#a3a3a3",
	inputs: &[],
	outputs: &[port("event", "Event", PortDataType::Any)],
};

const EMBED: NodeTemplate = NodeTemplate {
	node_type: "embed",
	title: "Embed",
	icon: "∷",
	color: "#ec4899",
	inputs: &[port("text", "Text", PortDataType::Text)],
	outputs: &[port("tensor", "Vector", PortDataType::Tensor)],
};

const WEBHOOK: NodeTemplate = NodeTemplate {
	node_type: "webhook",
	title: "Webhook",
	icon: "↗",
	color: "#737373",
	inputs: &[port("payload", "Payload", PortDataType::Any)],
	outputs: &[],
};

const OUTPUT: NodeTemplate = NodeTemplate {
	node_type: "output",
	title: "Output",
	icon: "◎",
	color: "#64748b",
	inputs: &[port("result", "Result", PortDataType::Any)],
	outputs: &[],
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WorkflowKind {
	Audio,
	Video,
	Image,
	Email,
	Automation,
}

impl WorkflowKind {
	pub const ALL: [WorkflowKind; 5] = [
		WorkflowKind::Audio,
		WorkflowKind::Video,
		WorkflowKind::Image,
		WorkflowKind::Email,
		WorkflowKind::Automation,
	];

	pub fn slug(self) -> &'static str {
		match self {
			WorkflowKind::Audio => "audio",
			WorkflowKind::Video => "video",
			WorkflowKind::Image => "image",
			WorkflowKind::Email => "email",
			WorkflowKind::Automation => "automation",
		}
	}

	pub fn from_slug(slug: &str) -> Option<Self> {
		Self::ALL.into_iter().find(|k| k.slug() == slug)
	}

	pub fn title(self) -> &'static str {
		match self {
			WorkflowKind::Audio => "Audio Studio",
			WorkflowKind::Video => "Video Studio",
			WorkflowKind::Image => "Image Studio",
			WorkflowKind::Email => "Email Designer",
			WorkflowKind::Automation => "Automation",
		}
	}

	pub fn accent(self) -> &'static str {
		match self {
			WorkflowKind::Audio => "#a855f7",
			WorkflowKind::Video => "#ef4444",
			WorkflowKind::Image => "#3b82f6",
			WorkflowKind::Email => "#f59e0b",
			WorkflowKind::Automation => "#14b8a6",
		}
	}

	pub fn templates(self) -> &'static [NodeTemplate] {
		match self {
			WorkflowKind::Audio => &[PROMPT, SUNO, LYRIA, ELEVENLABS, FADR, MIXER, OUTPUT],
			WorkflowKind::Video => &[
				PROMPT,
				STABILITY,
				PIAPI_VIDEO,
				ELEVENLABS,
				VIDEO_MERGE,
				OUTPUT,
			],
			WorkflowKind::Image => &[PROMPT, STABILITY, UPSCALE, OUTPUT],
			WorkflowKind::Email => &[BRIEF, COPYWRITER, PROMPT, STABILITY, EMAIL_LAYOUT, OUTPUT],
			WorkflowKind::Automation => &[TRIGGER, EMBED, WEBHOOK, OUTPUT],
		}
	}

	/// Starter graph shown before anything has been saved.
	pub fn seed(self) -> WorkflowGraph {
		let chain: &[(&NodeTemplate, &str, &str)] = match self {
			WorkflowKind::Audio => &[
				(&PROMPT, "", "prompt"),
				(&SUNO, "prompt", "audio"),
				(&OUTPUT, "result", ""),
			],
			WorkflowKind::Video => &[
				(&PROMPT, "", "prompt"),
				(&PIAPI_VIDEO, "prompt", "video"),
				(&OUTPUT, "result", ""),
			],
			WorkflowKind::Image => &[
				(&PROMPT, "", "prompt"),
				(&STABILITY, "prompt", "image"),
				(&UPSCALE, "image", "image"),
				(&OUTPUT, "result", ""),
			],
			WorkflowKind::Email => &[
				(&BRIEF, "", "text"),
				(&COPYWRITER, "text", "body"),
				(&EMAIL_LAYOUT, "body", "html"),
				(&OUTPUT, "result", ""),
			],
			WorkflowKind::Automation => &[
				(&TRIGGER, "", "event"),
				(&WEBHOOK, "payload", ""),
			],
		};

		let nodes: Vec<WorkflowNode> = chain
			.iter()
			.enumerate()
			.map(|(i, (template, _, _))| {
				template.build(
					format!("{}_seed", template.node_type),
					Point::new(80.0 + i as f64 * 260.0, 160.0),
				)
			})
			.collect();

		let connections = chain
			.windows(2)
			.zip(nodes.windows(2))
			.enumerate()
			.map(|(i, (links, pair))| Connection {
				id: format!("conn_seed_{}", i),
				from_node: pair[0].id.clone(),
				from_port: links[0].2.to_string(),
				to_node: pair[1].id.clone(),
				to_port: links[1].1.to_string(),
				animated: true,
			})
			.collect();

		WorkflowGraph { nodes, connections }
	}
}
