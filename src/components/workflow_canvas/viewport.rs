use super::types::Point;

pub const MIN_ZOOM: f64 = 0.25;
pub const MAX_ZOOM: f64 = 2.0;
const ZOOM_OUT_FACTOR: f64 = 0.9;
const ZOOM_IN_FACTOR: f64 = 1.1;

/// Pan/zoom transform between screen pixels and canvas space.
///
/// Zoom is anchored at the canvas element origin rather than the pointer, so
/// content under the cursor drifts while zooming.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
	/// Pan offset in screen pixels.
	pub pan: Point,
	pub zoom: f64,
}

impl Default for Viewport {
	fn default() -> Self {
		Self {
			pan: Point::default(),
			zoom: 1.0,
		}
	}
}

impl Viewport {
	/// `origin` is the top-left of the canvas element's bounding rect.
	pub fn screen_to_canvas(&self, screen: Point, origin: Point) -> Point {
		Point::new(
			(screen.x - origin.x - self.pan.x) / self.zoom,
			(screen.y - origin.y - self.pan.y) / self.zoom,
		)
	}

	pub fn apply_zoom(&mut self, wheel_delta_y: f64) {
		let factor = if wheel_delta_y > 0.0 {
			ZOOM_OUT_FACTOR
		} else {
			ZOOM_IN_FACTOR
		};
		self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
	}

	/// Deltas accumulate in screen pixels and are not scaled by zoom.
	pub fn pan(&mut self, dx: f64, dy: f64) {
		self.pan = self.pan.offset(dx, dy);
	}

	/// CSS/SVG transform placing canvas space inside the element.
	pub fn transform(&self) -> String {
		format!(
			"translate({}px, {}px) scale({})",
			self.pan.x, self.pan.y, self.zoom
		)
	}
}

pub fn snap_to_grid(value: f64, grid_size: f64) -> f64 {
	if grid_size <= 0.0 {
		return value;
	}
	(value / grid_size).round() * grid_size
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn screen_to_canvas_removes_origin_pan_and_zoom() {
		let vp = Viewport {
			pan: Point::new(50.0, -20.0),
			zoom: 2.0,
		};
		let origin = Point::new(10.0, 30.0);
		let canvas = vp.screen_to_canvas(Point::new(160.0, 110.0), origin);
		assert_eq!(canvas, Point::new(50.0, 50.0));
	}

	#[test]
	fn zoom_saturates_at_both_bounds() {
		let mut vp = Viewport::default();
		for _ in 0..50 {
			vp.apply_zoom(-120.0);
			assert!((MIN_ZOOM..=MAX_ZOOM).contains(&vp.zoom));
		}
		assert_eq!(vp.zoom, MAX_ZOOM);
		for _ in 0..50 {
			vp.apply_zoom(120.0);
			assert!((MIN_ZOOM..=MAX_ZOOM).contains(&vp.zoom));
		}
		assert_eq!(vp.zoom, MIN_ZOOM);
	}

	#[test]
	fn zero_delta_zooms_in() {
		let mut vp = Viewport::default();
		vp.apply_zoom(0.0);
		assert!((vp.zoom - 1.1).abs() < 1e-9);
	}

	#[test]
	fn pan_ignores_zoom() {
		let mut vp = Viewport {
			pan: Point::default(),
			zoom: 0.5,
		};
		vp.pan(10.0, 4.0);
		vp.pan(-3.0, 1.0);
		assert_eq!(vp.pan, Point::new(7.0, 5.0));
	}

	#[test]
	fn snapping_is_idempotent() {
		for raw in [-41.0, -10.0, 0.0, 9.99, 10.0, 137.0, 88.0, 1234.5] {
			let once = snap_to_grid(raw, 20.0);
			assert_eq!(once % 20.0, 0.0);
			assert_eq!(snap_to_grid(once, 20.0), once);
		}
		assert_eq!(snap_to_grid(137.0, 20.0), 140.0);
		assert_eq!(snap_to_grid(88.0, 20.0), 80.0);
	}
}
