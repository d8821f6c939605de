//! Shapes and angles.

use rand::Rng;

use super::Problem;
use crate::answer::Answer;

/// Returns the polygon name for a side count, if it has a common one.
#[must_use]
pub const fn polygon_name(sides: u32) -> Option<&'static str> {
    match sides {
        3 => Some("triangle"),
        4 => Some("quadrilateral"),
        5 => Some("pentagon"),
        6 => Some("hexagon"),
        7 => Some("heptagon"),
        8 => Some("octagon"),
        9 => Some("nonagon"),
        10 => Some("decagon"),
        _ => None,
    }
}

/// Classifies an angle in degrees.
#[must_use]
pub const fn angle_kind(degrees: u32) -> &'static str {
    match degrees {
        0..=89 => "acute",
        90 => "right",
        91..=179 => "obtuse",
        180 => "straight",
        _ => "reflex",
    }
}

/// Asks for a polygon's name or an angle's type.
pub fn generate(rng: &mut impl Rng) -> Problem {
    if rng.gen_bool(0.5) {
        let sides = rng.gen_range(3..=10);
        let name = polygon_name(sides).unwrap_or("polygon");
        Problem::new(
            format!("A flat shape has {sides} straight sides. What is it called?"),
            Answer::text(name),
        )
    } else {
        let degrees = match rng.gen_range(0..4) {
            0 => rng.gen_range(5..=85),
            1 => 90,
            2 => rng.gen_range(95..=175),
            _ => 180,
        };
        Problem::new(
            format!("An angle measures {degrees}°. Is it acute, right, obtuse or straight?"),
            Answer::text(angle_kind(degrees)),
        )
    }
}
