//! Expansion rings fired by pulse impacts.

use super::config::SimulationConfig;
use super::types::{HubId, Point, Rgb};

/// Identifier of an expansion, unique within one simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectId(pub u64);

/// Back ease-out: overshoots past 1, then settles.
pub fn ease_out_back(t: f64) -> f64 {
	const C1: f64 = 1.70158;
	const C3: f64 = C1 + 1.0;
	1.0 + C3 * (t - 1.0).powi(3) + C1 * (t - 1.0).powi(2)
}

/// A ring that swells out of a hub and fades away.
#[derive(Clone, Debug, PartialEq)]
pub struct ExpansionEffect {
	/// Identifier.
	pub id: EffectId,
	/// Hub the ring surrounds.
	pub hub: HubId,
	/// Center of the ring.
	pub position: Point,
	/// Color of the pulse that caused it.
	pub source_color: Rgb,
	/// Creation time.
	pub start_time: f64,
	/// Lifetime.
	pub duration: f64,
	/// Peak scale.
	pub max_scale: f64,
	growth_ratio: f64,
	start_scale: f64,
	base_opacity: f64,
}

impl ExpansionEffect {
	/// Ring for a pulse of weight `pulse_thickness` hitting `hub`.
	pub fn new(
		id: EffectId,
		hub: HubId,
		position: Point,
		source_color: Rgb,
		pulse_thickness: f64,
		now: f64,
		config: &SimulationConfig,
	) -> Self {
		Self {
			id,
			hub,
			position,
			source_color,
			start_time: now,
			duration: config.expansion_duration,
			max_scale: config.expansion_base_scale + (pulse_thickness - 1.0) * 0.5,
			growth_ratio: config.expansion_growth_ratio.clamp(f64::EPSILON, 1.0 - f64::EPSILON),
			start_scale: config.expansion_start_scale,
			base_opacity: config.expansion_opacity,
		}
	}

	/// Lifetime fraction elapsed at `now`, in `[0, 1]`.
	pub fn progress(&self, now: f64) -> f64 {
		if self.duration <= 0.0 {
			return 1.0;
		}
		((now - self.start_time) / self.duration).clamp(0.0, 1.0)
	}

	/// Scale at `now`: back-out growth to `max_scale`, then quadratic shrink.
	pub fn scale(&self, now: f64) -> f64 {
		let t = self.progress(now);
		let span = self.max_scale - self.start_scale;
		if t < self.growth_ratio {
			self.start_scale + span * ease_out_back(t / self.growth_ratio)
		} else {
			let shrink = (t - self.growth_ratio) / (1.0 - self.growth_ratio);
			self.start_scale + span * (1.0 - shrink * shrink)
		}
	}

	/// Opacity at `now`; linear fade to zero over the lifetime.
	pub fn opacity(&self, now: f64) -> f64 {
		self.base_opacity * (1.0 - self.progress(now))
	}

	/// Whether the lifetime has run out.
	pub fn is_finished(&self, now: f64) -> bool {
		self.progress(now) >= 1.0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn effect(thickness: f64) -> ExpansionEffect {
		ExpansionEffect::new(
			EffectId(1),
			"a".into(),
			Point::new(0.0, 0.0),
			Rgb::new(255, 152, 0),
			thickness,
			1000.0,
			&SimulationConfig::default(),
		)
	}

	#[test]
	fn max_scale_grows_with_pulse_thickness() {
		assert_eq!(effect(1.0).max_scale, 1.5);
		assert_eq!(effect(4.0).max_scale, 3.0);
	}

	#[test]
	fn back_easing_overshoots_then_lands() {
		assert!(ease_out_back(0.0).abs() < 1e-12);
		assert!((ease_out_back(1.0) - 1.0).abs() < 1e-12);
		let overshoots = (1..100)
			.map(|i| f64::from(i) / 100.0)
			.any(|t| ease_out_back(t) > 1.0);
		assert!(overshoots);
	}

	#[test]
	fn scale_curve_peaks_at_growth_ratio() {
		let e = effect(3.0);
		assert!((e.scale(1000.0) - 0.5).abs() < 1e-12);
		assert!((e.scale(1300.0) - e.max_scale).abs() < 1e-12);
		let shrink_half = 0.5 + (e.max_scale - 0.5) * 0.75;
		assert!((e.scale(1650.0) - shrink_half).abs() < 1e-9);
		assert!((e.scale(2000.0) - 0.5).abs() < 1e-12);
	}

	#[test]
	fn opacity_fades_linearly() {
		let e = effect(1.0);
		assert!((e.opacity(1000.0) - 0.7).abs() < 1e-12);
		assert!((e.opacity(1500.0) - 0.35).abs() < 1e-12);
		assert_eq!(e.opacity(2000.0), 0.0);
		assert!(!e.is_finished(1999.0));
		assert!(e.is_finished(2000.0));
	}
}
