//! Fixed-point maths utilities
//!
//! All distances in the rig software are integer micrometers. The functions in
//! this module work purely on integers so that the motion path never depends on
//! floating point.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::warn;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Maximum number of Newton-Raphson iterations before the square root gives up.
pub const SQRT_MAX_ITERATIONS: u32 = 20;

/// Micrometers in one millimeter.
pub const UM_PER_MM: i32 = 1000;

/// Fixed-point scale of the trig helpers, a result of `TRIG_SCALE` is `1.0`.
pub const TRIG_SCALE: i32 = 1000;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Result of an integer square root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sqrt {
    /// The calculated root.
    pub root: u32,

    /// Number of iterations used.
    pub iterations: u32,

    /// False if the iteration cap was hit and `root` is only the last guess.
    pub converged: bool,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Integer square root by Newton-Raphson iteration from `seed`.
///
/// Iterates `next = (guess + value/guess) / 2` until two consecutive guesses
/// differ by less than 2. A zero seed returns zero straight away. After
/// [`SQRT_MAX_ITERATIONS`] a warning is logged and the last guess returned.
///
/// On convergence the root is trimmed so that `root² <= value < (root + 1)²`.
pub fn integer_sqrt(value: u32, seed: u32) -> Sqrt {
    if seed == 0 || value == 0 {
        return Sqrt {
            root: 0,
            iterations: 0,
            converged: true,
        };
    }

    let value = value as u64;
    let mut guess = seed as u64;

    for iteration in 1..=SQRT_MAX_ITERATIONS {
        let next = (guess + value / guess) / 2;

        if (guess as i64 - next as i64).abs() < 2 {
            return Sqrt {
                root: trim_root(next, value),
                iterations: iteration,
                converged: true,
            };
        }

        // A zero guess can only come from a value of zero, handled above, but
        // guard the division anyway.
        guess = next.max(1);
    }

    warn!(
        "Square root of {} from seed {} did not converge in {} iterations, using {}",
        value, seed, SQRT_MAX_ITERATIONS, guess
    );

    Sqrt {
        root: guess as u32,
        iterations: SQRT_MAX_ITERATIONS,
        converged: false,
    }
}

/// Convert micrometers to millimeters, truncating towards zero.
pub fn micro_to_milli(um: i32) -> i32 {
    um / UM_PER_MM
}

/// Convert micrometers to actuator steps.
///
/// The scale is given in tenths of a micrometer per step so that sub-micrometer
/// step sizes can be represented.
pub fn micro_to_steps(um: i32, um10_per_step: i32) -> i32 {
    if um10_per_step == 0 {
        return 0;
    }
    ((um as i64 * 10) / um10_per_step as i64) as i32
}

/// Clamp a value into the inclusive range `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T
where
    T: PartialOrd
{
    if value > max {
        max
    }
    else if value < min {
        min
    }
    else {
        value
    }
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn wrap_degrees(degrees: i32) -> i32 {
    degrees.rem_euclid(360)
}

/// Sine of an integer angle in degrees, scaled by [`TRIG_SCALE`].
///
/// Uses Bhaskara's rational approximation, accurate to within 2 parts in a
/// thousand.
pub fn sine_scaled(degrees: i32) -> i32 {
    let d = wrap_degrees(degrees);

    let (d, sign) = if d > 180 { (d - 180, -1) } else { (d, 1) };

    let p = (d * (180 - d)) as i64;

    sign * ((4 * TRIG_SCALE as i64 * p) / (40_500 - p)) as i32
}

/// Cosine of an integer angle in degrees, scaled by [`TRIG_SCALE`].
pub fn cosine_scaled(degrees: i32) -> i32 {
    sine_scaled(degrees + 90)
}

/// Compass heading in degrees of the direction `(dx, dy)`, with 0 = north
/// (+Y) and 90 = east (+X), snapped to the nearest 45 degrees.
///
/// Returns `None` for the zero vector.
pub fn compass_heading(dx: i32, dy: i32) -> Option<i32> {
    match (dx.signum(), dy.signum()) {
        (0, 0) => None,
        (0, 1) => Some(0),
        (1, 1) => Some(45),
        (1, 0) => Some(90),
        (1, -1) => Some(135),
        (0, -1) => Some(180),
        (-1, -1) => Some(225),
        (-1, 0) => Some(270),
        _ => Some(315),
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Step a converged root by at most a couple of units so it is the floor root.
fn trim_root(root: u64, value: u64) -> u32 {
    let mut root = root;

    while root * root > value {
        root -= 1;
    }
    while (root + 1) * (root + 1) <= value {
        root += 1;
    }

    root as u32
}

#[cfg(test)]
mod test {
    use super::*;

    fn is_floor_root(y: u32, v: u32) -> bool {
        let (y, v) = (y as u64, v as u64);
        y * y <= v && v < (y + 1) * (y + 1)
    }

    #[test]
    fn test_integer_sqrt_small() {
        for v in 0..25_000u32 {
            let s = integer_sqrt(v, 500);
            assert!(s.converged, "{} did not converge", v);
            assert!(is_floor_root(s.root, v), "bad root {} for {}", s.root, v);
            assert!(s.iterations <= SQRT_MAX_ITERATIONS);
        }
    }

    #[test]
    fn test_integer_sqrt_large() {
        let mut v = 0u32;
        while v < 68_240_000 {
            let s = integer_sqrt(v, 500);
            assert!(s.converged);
            assert!(is_floor_root(s.root, v));
            v += 68_240_000 / 32 + 7;
        }

        assert_eq!(integer_sqrt(1_000_000, 500).root, 1000);
        assert_eq!(integer_sqrt(u32::MAX, 500).root, 65535);
    }

    #[test]
    fn test_integer_sqrt_degenerate() {
        assert_eq!(integer_sqrt(0, 500).root, 0);
        assert_eq!(integer_sqrt(0, 1).root, 0);
        assert_eq!(integer_sqrt(12345, 0).root, 0);
        assert_eq!(integer_sqrt(12345, 0).iterations, 0);
    }

    #[test]
    fn test_integer_sqrt_cap() {
        // A huge seed for a tiny value only halves each iteration
        let s = integer_sqrt(1, u32::MAX);
        assert!(!s.converged);
        assert_eq!(s.iterations, SQRT_MAX_ITERATIONS);
    }

    #[test]
    fn test_unit_conversions() {
        assert_eq!(micro_to_milli(12_345), 12);
        assert_eq!(micro_to_milli(-12_345), -12);

        // 100 um per step
        assert_eq!(micro_to_steps(500_000, 1000), 5000);
        assert_eq!(micro_to_steps(-150, 1000), -1);
        assert_eq!(micro_to_steps(1000, 0), 0);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(5, 0, 10), 5);
        assert_eq!(clamp(-5, 0, 10), 0);
        assert_eq!(clamp(15, 0, 10), 10);
    }

    #[test]
    fn test_trig() {
        assert_eq!(sine_scaled(0), 0);
        assert_eq!(sine_scaled(90), 1000);
        assert_eq!(sine_scaled(30), 500);
        assert_eq!(sine_scaled(270), -1000);
        assert_eq!(sine_scaled(-90), -1000);
        assert_eq!(cosine_scaled(0), 1000);
        assert_eq!(cosine_scaled(180), -1000);
        assert!((sine_scaled(45) - 707).abs() <= 2);
        assert!((cosine_scaled(45) - 707).abs() <= 2);
    }

    #[test]
    fn test_compass_heading() {
        assert_eq!(compass_heading(0, 0), None);
        assert_eq!(compass_heading(0, 100), Some(0));
        assert_eq!(compass_heading(20, -3), Some(135));
        assert_eq!(compass_heading(-1, 1), Some(315));
    }
}
