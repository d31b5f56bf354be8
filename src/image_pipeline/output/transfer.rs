//! Transfer curves applied when quantizing linear display RGB

/// Plain power-law encoding, `v^(1/gamma)` on [0, 1].
#[inline]
pub fn gamma_encode(v: f64, gamma: f64) -> f64 {
    v.clamp(0.0, 1.0).powf(1.0 / gamma)
}

/// ST 2084 PQ constants.
mod st_2084 {
    /// m1 = 0.25 * 2610 / 4096
    pub const M1: f64 = 0.1593017578125;
    /// m2 = 128 * 2523 / 4096
    pub const M2: f64 = 78.84375;
    /// c1 = c3 - c2 + 1
    pub const C1: f64 = 0.8359375;
    /// c2 = 32 * 2413 / 4096
    pub const C2: f64 = 18.8515625;
    /// c3 = 32 * 2392 / 4096
    pub const C3: f64 = 18.6875;
}

/// PQ inverse EOTF. Input is linear light where 1.0 is the 10000 nit peak.
#[inline]
pub fn pq_encode(v: f64) -> f64 {
    use st_2084::*;

    let y = v.clamp(0.0, 1.0).powf(M1);
    ((C1 + C2 * y) / (1.0 + C3 * y)).powf(M2)
}

/// BT.2100 HLG OETF on normalized scene light.
#[inline]
pub fn hlg_encode(e: f64) -> f64 {
    const A: f64 = 0.17883277;
    const B: f64 = 0.28466892;
    const C: f64 = 0.55991073;

    let e = e.clamp(0.0, 1.0);
    if e <= 1.0 / 12.0 {
        (3.0 * e).sqrt()
    } else {
        A * (12.0 * e - B).ln() + C
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curves_fix_endpoints() {
        for curve in [gamma_encode(0.0, 2.2), pq_encode(0.0), hlg_encode(0.0)] {
            assert!(curve.abs() < 1e-6, "{curve}");
        }
        assert_eq!(gamma_encode(1.0, 2.2), 1.0);
        assert!((pq_encode(1.0) - 1.0).abs() < 1e-9);
        assert!((hlg_encode(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_hlg_segments_meet() {
        let knee = 1.0 / 12.0;
        assert!((hlg_encode(knee) - 0.5).abs() < 1e-9);
        assert!((hlg_encode(knee + 1e-9) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_gamma_brightens_midtones() {
        let encoded = gamma_encode(0.5, 2.2);
        assert!((encoded - 0.5f64.powf(1.0 / 2.2)).abs() < 1e-15);
        assert!(encoded > 0.7);
    }
}
