//! High/low splitting of double-precision values
//!
//! GPUs mostly work in single precision. Storing a double as the sum of two
//! floats (a coarse part on a 65536 grid and a fine remainder) lets a shader
//! subtract a similarly split eye position and recover precision near the
//! camera.

/// Grid spacing of the high part
const ENCODED_SCALAR: f64 = 65536.0;

/// A double split into single-precision high and low parts
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EncodedDouble {
    pub high: f32,
    pub low: f32,
}

/// Split `value` so that `high + low ≈ value`
///
/// `high` is `value` truncated toward zero to a multiple of 65536.
pub fn encode_double(value: f64) -> EncodedDouble {
    let (high, low) = if value >= 0.0 {
        let high = (value / ENCODED_SCALAR).floor() * ENCODED_SCALAR;
        (high, value - high)
    } else {
        let high = (-value / ENCODED_SCALAR).floor() * ENCODED_SCALAR;
        (-high, value + high)
    };
    EncodedDouble {
        high: high as f32,
        low: low as f32,
    }
}
