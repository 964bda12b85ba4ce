//! Spectral colorimetry for authoring light-source colours.
//!
//! A spectral power distribution is integrated against the CIE standard
//! observer to obtain XYZ tristimulus values, which are normalised to a
//! target luminance and converted to linear sRGB. Both the distributions and
//! the colour-matching functions are interpolated with cubic Hermite
//! (Catmull-Rom) splines between their tabulated samples.

use glam::DVec3;

use crate::cie::{CIE_1931_2DEG, CIE_1964_10DEG, ILLUMINANT_D65, TABLE_START_NM, TABLE_STEP_NM};
use crate::color::Color;

/// Integration range and step, in nanometres.
const LAMBDA_MIN: u32 = 380;
const LAMBDA_MAX: u32 = 780;

/// Search range for [`rgb_to_kelvin`].
const KELVIN_MIN: f64 = 1000.0;
const KELVIN_MAX: f64 = 40000.0;

// Second radiation constant (m*K) and first radiation constant (W*m^2).
const PLANCK_C2: f64 = 1.438_776_877e-2;
const PLANCK_C1: f64 = 3.741_771_852e-16;

/// Linear sRGB (D65) from XYZ.
const XYZ_TO_SRGB: [[f64; 3]; 3] = [
    [3.240_454_2, -1.537_138_5, -0.498_531_4],
    [-0.969_266_0, 1.876_010_8, 0.041_556_0],
    [0.055_643_4, -0.204_025_9, 1.057_225_2],
];

/// XYZ from linear sRGB (D65).
const SRGB_TO_XYZ: [[f64; 3]; 3] = [
    [0.412_456_4, 0.357_576_1, 0.180_437_5],
    [0.212_672_9, 0.715_152_2, 0.072_175_0],
    [0.019_333_9, 0.119_192_0, 0.950_304_1],
];

/// CIE standard observer used for integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Observer {
    /// CIE 1931 2-degree observer.
    #[default]
    Cie1931TwoDegree,
    /// CIE 1964 10-degree observer.
    Cie1964TenDegree,
}

impl Observer {
    fn table(&self) -> &'static [[f64; 3]; 41] {
        match self {
            Observer::Cie1931TwoDegree => &CIE_1931_2DEG,
            Observer::Cie1964TenDegree => &CIE_1964_10DEG,
        }
    }

    /// Interpolated colour-matching functions at `nm`.
    pub fn matching(&self, nm: f64) -> DVec3 {
        let table = self.table();
        DVec3::new(
            hermite(|i| table[i][0], table.len(), TABLE_START_NM, TABLE_STEP_NM, nm),
            hermite(|i| table[i][1], table.len(), TABLE_START_NM, TABLE_STEP_NM, nm),
            hermite(|i| table[i][2], table.len(), TABLE_START_NM, TABLE_STEP_NM, nm),
        )
    }
}

/// A spectral power distribution.
#[derive(Debug, Clone, PartialEq)]
pub enum Spectrum {
    /// Evenly spaced samples starting at `start_nm`. Zero outside the table.
    Tabulated {
        start_nm: f64,
        step_nm: f64,
        values: Vec<f64>,
    },
    /// Ideal black-body radiator at the given temperature.
    Blackbody { kelvin: f64 },
}

impl Spectrum {
    /// CIE standard illuminant D65 (average daylight, about 6504 K).
    pub fn d65() -> Self {
        Spectrum::Tabulated {
            start_nm: TABLE_START_NM,
            step_nm: TABLE_STEP_NM,
            values: ILLUMINANT_D65.to_vec(),
        }
    }

    /// CIE standard illuminant A (incandescent tungsten), tabulated from its
    /// defining formula and normalised to 100 at 560 nm.
    pub fn illuminant_a() -> Self {
        let c2: f64 = 1.435e7;
        let t: f64 = 2848.0;
        let values = (LAMBDA_MIN..=LAMBDA_MAX)
            .step_by(TABLE_STEP_NM as usize)
            .map(|nm| {
                let nm = nm as f64;
                100.0 * (560.0 / nm).powi(5) * ((c2 / (t * 560.0)).exp() - 1.0)
                    / ((c2 / (t * nm)).exp() - 1.0)
            })
            .collect();
        Spectrum::Tabulated {
            start_nm: TABLE_START_NM,
            step_nm: TABLE_STEP_NM,
            values,
        }
    }

    pub fn blackbody(kelvin: f64) -> Self {
        Spectrum::Blackbody { kelvin }
    }

    /// Spectral power at wavelength `nm`.
    pub fn power(&self, nm: f64) -> f64 {
        match self {
            Spectrum::Tabulated {
                start_nm,
                step_nm,
                values,
            } => {
                if values.is_empty() || step_nm.is_nan() || *step_nm <= 0.0 {
                    return 0.0;
                }
                let last = start_nm + step_nm * (values.len() - 1) as f64;
                if nm < *start_nm || nm > last {
                    return 0.0;
                }
                hermite(|i| values[i], values.len(), *start_nm, *step_nm, nm)
            }
            Spectrum::Blackbody { kelvin } => planck(*kelvin, nm),
        }
    }
}

/// Spectral radiance of a black body (Planck's law), wavelength in nm.
pub fn planck(kelvin: f64, nm: f64) -> f64 {
    if kelvin <= 0.0 || nm <= 0.0 {
        return 0.0;
    }
    let lambda = nm * 1e-9;
    PLANCK_C1 / (lambda.powi(5) * ((PLANCK_C2 / (lambda * kelvin)).exp() - 1.0))
}

/// Catmull-Rom cubic Hermite interpolation of a table of `len` samples.
/// Clamps to the end samples outside the table.
fn hermite(sample: impl Fn(usize) -> f64, len: usize, start: f64, step: f64, x: f64) -> f64 {
    if len == 0 || step.is_nan() || step <= 0.0 {
        return 0.0;
    }
    let t = (x - start) / step;
    if t <= 0.0 {
        return sample(0);
    }
    if t >= (len - 1) as f64 {
        return sample(len - 1);
    }

    let i = t.floor() as usize;
    let f = t - i as f64;
    let p0 = sample(i.saturating_sub(1));
    let p1 = sample(i);
    let p2 = sample(i + 1);
    let p3 = sample((i + 2).min(len - 1));
    let m1 = (p2 - p0) * 0.5;
    let m2 = (p3 - p1) * 0.5;

    let f2 = f * f;
    let f3 = f2 * f;
    (2.0 * f3 - 3.0 * f2 + 1.0) * p1
        + (f3 - 2.0 * f2 + f) * m1
        + (-2.0 * f3 + 3.0 * f2) * p2
        + (f3 - f2) * m2
}

/// Integrate a spectrum against the observer, 1 nm steps over 380-780 nm.
pub fn spectrum_to_xyz(spectrum: &Spectrum, observer: Observer) -> DVec3 {
    (LAMBDA_MIN..=LAMBDA_MAX)
        .map(|nm| {
            let nm = nm as f64;
            observer.matching(nm) * spectrum.power(nm)
        })
        .fold(DVec3::ZERO, |acc, v| acc + v)
}

/// Scale XYZ so that Y equals `luminance`. Black input stays black.
pub fn normalize_luminance(xyz: DVec3, luminance: f64) -> DVec3 {
    if xyz.y <= 0.0 || !xyz.is_finite() {
        return DVec3::ZERO;
    }
    xyz * (luminance / xyz.y)
}

fn mul(m: &[[f64; 3]; 3], v: DVec3) -> DVec3 {
    DVec3::new(
        m[0][0] * v.x + m[0][1] * v.y + m[0][2] * v.z,
        m[1][0] * v.x + m[1][1] * v.y + m[1][2] * v.z,
        m[2][0] * v.x + m[2][1] * v.y + m[2][2] * v.z,
    )
}

/// Linear sRGB from XYZ. Out-of-gamut colours keep their negative channels.
pub fn xyz_to_rgb(xyz: DVec3) -> DVec3 {
    mul(&XYZ_TO_SRGB, xyz)
}

pub fn rgb_to_xyz(rgb: DVec3) -> DVec3 {
    mul(&SRGB_TO_XYZ, rgb)
}

/// Display colour of a spectrum at the given luminance, negative channels clamped.
pub fn spectrum_to_rgb(spectrum: &Spectrum, observer: Observer, luminance: f64) -> Color {
    let xyz = normalize_luminance(spectrum_to_xyz(spectrum, observer), luminance);
    let rgb = xyz_to_rgb(xyz).max(DVec3::ZERO);
    rgb.as_vec3()
}

/// Linear sRGB colour of a black body at `kelvin`, normalised to unit luminance.
pub fn kelvin_to_rgb(kelvin: f32) -> Color {
    spectrum_to_rgb(
        &Spectrum::blackbody(kelvin as f64),
        Observer::Cie1931TwoDegree,
        1.0,
    )
}

/// CIE 1960 UCS chromaticity.
fn uv_1960(xyz: DVec3) -> Option<(f64, f64)> {
    let denom = xyz.x + 15.0 * xyz.y + 3.0 * xyz.z;
    if denom <= 0.0 || !denom.is_finite() {
        return None;
    }
    Some((4.0 * xyz.x / denom, 6.0 * xyz.y / denom))
}

/// McCamy's cubic approximation of correlated colour temperature.
fn mccamy(xyz: DVec3) -> Option<f64> {
    let sum = xyz.x + xyz.y + xyz.z;
    if sum <= 0.0 {
        return None;
    }
    let (x, y) = (xyz.x / sum, xyz.y / sum);
    let denom = 0.1858 - y;
    if denom.abs() < 1e-12 {
        return None;
    }
    let n = (x - 0.3320) / denom;
    let cct = 449.0 * n.powi(3) + 3525.0 * n.powi(2) + 6823.3 * n + 5520.33;
    cct.is_finite().then_some(cct)
}

/// Approximate correlated colour temperature of a linear sRGB colour.
///
/// Starts from McCamy's estimate and refines it by golden-section search
/// on the Planckian locus in CIE 1960 uv. Returns `None` for black or
/// otherwise unusable colours.
pub fn rgb_to_kelvin(rgb: Color) -> Option<f32> {
    let xyz = rgb_to_xyz(rgb.as_dvec3());
    let (u, v) = uv_1960(xyz)?;

    let estimate = mccamy(xyz)
        .unwrap_or(6500.0)
        .clamp(KELVIN_MIN, KELVIN_MAX);
    let mut lo = (estimate * 0.5).max(KELVIN_MIN).ln();
    let mut hi = (estimate * 2.0).min(KELVIN_MAX).ln();

    let distance = |ln_t: f64| -> f64 {
        let locus = spectrum_to_xyz(&Spectrum::blackbody(ln_t.exp()), Observer::Cie1931TwoDegree);
        match uv_1960(locus) {
            Some((lu, lv)) => (lu - u).powi(2) + (lv - v).powi(2),
            None => f64::INFINITY,
        }
    };

    let ratio = (5.0_f64.sqrt() - 1.0) * 0.5;
    let mut a = hi - ratio * (hi - lo);
    let mut b = lo + ratio * (hi - lo);
    let mut fa = distance(a);
    let mut fb = distance(b);
    for _ in 0..60 {
        if fa < fb {
            hi = b;
            b = a;
            fb = fa;
            a = hi - ratio * (hi - lo);
            fa = distance(a);
        } else {
            lo = a;
            a = b;
            fa = fb;
            b = lo + ratio * (hi - lo);
            fb = distance(b);
        }
    }

    let kelvin = ((lo + hi) * 0.5).exp();
    kelvin.is_finite().then_some(kelvin as f32)
}
