pub mod workflow_canvas;
