use std::fmt;

use serde::Deserialize;

use super::error::SimError;

/// Stable identifier of a hub, as written in the ecosystem definition.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct HubId(String);

impl HubId {
	/// Wrap a raw id.
	pub fn new(id: impl Into<String>) -> Self {
		Self(id.into())
	}

	/// The raw id.
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for HubId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for HubId {
	fn from(id: &str) -> Self {
		Self::new(id)
	}
}

/// A point in simulation (world) space. Y grows upwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct Point {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate.
	pub y: f64,
}

impl Point {
	/// Build a point.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Linear interpolation towards `other`; `t` is not clamped.
	pub fn lerp(self, other: Point, t: f64) -> Point {
		Point::new(
			self.x + (other.x - self.x) * t,
			self.y + (other.y - self.y) * t,
		)
	}

	/// Euclidean distance to `other`.
	pub fn distance(self, other: Point) -> f64 {
		(other.x - self.x).hypot(other.y - self.y)
	}

	/// Halfway point between `self` and `other`.
	pub fn midpoint(self, other: Point) -> Point {
		self.lerp(other, 0.5)
	}

	/// Angle of the vector `self -> other`, in radians.
	pub fn angle_to(self, other: Point) -> f64 {
		(other.y - self.y).atan2(other.x - self.x)
	}
}

/// An opaque sRGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Rgb {
	/// Red channel.
	pub r: u8,
	/// Green channel.
	pub g: u8,
	/// Blue channel.
	pub b: u8,
}

impl Rgb {
	/// Build a color from its channels.
	pub const fn new(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b }
	}

	/// Parse a `#rrggbb` (or `rrggbb`) hex string.
	pub fn parse_hex(hex: &str) -> Result<Self, SimError> {
		let digits = hex.strip_prefix('#').unwrap_or(hex);
		if digits.len() != 6 || !digits.is_ascii() {
			return Err(SimError::InvalidColor(hex.to_owned()));
		}
		let channel = |range: std::ops::Range<usize>| {
			u8::from_str_radix(&digits[range], 16).map_err(|_| SimError::InvalidColor(hex.to_owned()))
		};
		Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
	}

	/// Per-channel linear blend; `t` is clamped to `[0, 1]`.
	pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
		let t = t.clamp(0.0, 1.0);
		let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
		Rgb::new(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
	}

	/// CSS `rgba(...)` string with the given alpha.
	pub fn to_css(self, alpha: f64) -> String {
		format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, alpha.clamp(0.0, 1.0))
	}
}

impl fmt::Display for Rgb {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
	}
}

impl TryFrom<String> for Rgb {
	type Error = SimError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		Rgb::parse_hex(&value)
	}
}

/// What a connection between two hubs stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeCategory {
	/// Creative influence flowing out of a hub.
	#[serde(alias = "red")]
	Inspire,
	/// Tools and infrastructure flowing out of a hub.
	#[serde(alias = "green")]
	Equip,
}

impl EdgeCategory {
	/// Human readable legend text.
	pub const fn legend(self) -> &'static str {
		match self {
			EdgeCategory::Inspire => "Inspire",
			EdgeCategory::Equip => "Equip",
		}
	}
}

/// A named node of the ecosystem graph.
#[derive(Clone, Debug, PartialEq)]
pub struct Hub {
	/// Identifier.
	pub id: HubId,
	/// Label shown next to the hub.
	pub display_name: String,
	/// Fixed world position.
	pub position: Point,
	/// Color of the hub and of everything homed there.
	pub color: Rgb,
	/// Number of particles whose home is this hub.
	pub population: u32,
}

/// A directed connection between two hubs.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	/// Hub pulses travel from.
	pub source: HubId,
	/// Hub pulses travel to.
	pub target: HubId,
	/// Category of the relationship.
	pub category: EdgeCategory,
	/// Short description of the relationship.
	pub label: String,
	/// Line weight; starts at 1 and only grows.
	pub thickness: f64,
}
