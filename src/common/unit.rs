//! Unit conversion utilities.
//!
//! WordprocessingML mixes several length units: drawing extents are in EMU
//! (English Metric Units), page geometry and table widths in twips
//! (twentieths of a point), font sizes in half-points and border widths in
//! eighth-points.

pub const EMUS_PER_INCH: i64 = 914_400;
pub const EMUS_PER_PX: i64 = 9_525;
pub const EMUS_PER_TWIP: i64 = 635;
pub const TWIPS_PER_INCH: u32 = 1_440;

/// Convert pixels (at 96 DPI) to EMU: 1 px = 9525 EMU.
#[inline]
pub fn px_to_emu(px: u32) -> i64 {
    px as i64 * EMUS_PER_PX
}

/// Convert EMU back to whole pixels, rounding to nearest.
#[inline]
pub fn emu_to_px(emu: i64) -> u32 {
    ((emu + EMUS_PER_PX / 2) / EMUS_PER_PX).max(0) as u32
}

#[inline]
pub fn inches_to_twips(inches: f64) -> u32 {
    (inches * TWIPS_PER_INCH as f64).round().max(0.0) as u32
}

#[inline]
pub fn twips_to_inches(twips: u32) -> f64 {
    twips as f64 / TWIPS_PER_INCH as f64
}

#[inline]
pub fn twips_to_emu(twips: u32) -> i64 {
    twips as i64 * EMUS_PER_TWIP
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_px_to_emu() {
        assert_eq!(px_to_emu(100), 952_500);
        assert_eq!(px_to_emu(96), EMUS_PER_INCH);
        assert_eq!(emu_to_px(952_500), 100);
    }

    #[test]
    fn test_twips() {
        assert_eq!(inches_to_twips(1.0), 1440);
        assert_eq!(inches_to_twips(0.5), 720);
        assert!((twips_to_inches(2160) - 1.5).abs() < f64::EPSILON);
        assert_eq!(twips_to_emu(1440), EMUS_PER_INCH);
    }
}
