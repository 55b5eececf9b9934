use num_complex::Complex64;

/// A 2×2 complex transfer matrix representing an acoustic element.
///
/// Relates pressure and volume velocity at the throat (input) side to
/// the mouth (output) side:
///
/// ```text
/// [p_in ]   [a  b] [p_out]
/// [U_in ] = [c  d] [U_out]
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TransferMatrix {
    pub a: Complex64,
    pub b: Complex64,
    pub c: Complex64,
    pub d: Complex64,
}

impl TransferMatrix {
    pub fn new(a: Complex64, b: Complex64, c: Complex64, d: Complex64) -> Self {
        Self { a, b, c, d }
    }

    /// Identity matrix (no-op element).
    pub fn identity() -> Self {
        Self {
            a: Complex64::new(1.0, 0.0),
            b: Complex64::new(0.0, 0.0),
            c: Complex64::new(0.0, 0.0),
            d: Complex64::new(1.0, 0.0),
        }
    }

    /// Chain (multiply) this matrix with another: self · other.
    ///
    /// With the throat→mouth convention above, a cascade of segments
    /// multiplies in throat→mouth order: `T₁.chain(&T₂).chain(&T₃)…`.
    pub fn chain(&self, other: &TransferMatrix) -> TransferMatrix {
        TransferMatrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
        }
    }

    /// Determinant a·d − b·c. Unity magnitude for any lossless,
    /// reciprocal element.
    pub fn det(&self) -> Complex64 {
        self.a * self.d - self.b * self.c
    }

    /// True when every entry is finite in both parts.
    pub fn is_finite(&self) -> bool {
        [self.a, self.b, self.c, self.d]
            .iter()
            .all(|z| z.re.is_finite() && z.im.is_finite())
    }

    /// Input impedance seen at the throat when the mouth is terminated
    /// with `z_load`:
    ///
    /// ```text
    /// Z_in = (a·Z_load + b) / (c·Z_load + d)
    /// ```
    pub fn terminate(&self, z_load: Complex64) -> Complex64 {
        (self.a * z_load + self.b) / (self.c * z_load + self.d)
    }
}
