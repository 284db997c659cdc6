/// Forward and inverse gamma lookup tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GammaTables {
    forward: [u8; 256],
    inverse: [u8; 256],
}

impl GammaTables {
    /// Builds `forward[i] = 255 * (i/255)^gamma` and its inverse with
    /// exponent `1/gamma`. Non-positive or non-finite gamma means 1.0.
    pub fn new(gamma: f32) -> Self {
        let gamma = if gamma.is_finite() && gamma > 0.0 { gamma } else { 1.0 };
        Self { forward: curve(gamma), inverse: curve(1.0 / gamma) }
    }

    /// Picture intensity to device intensity.
    #[inline]
    pub fn forward(&self, v: u8) -> u8 {
        self.forward[v as usize]
    }

    /// Device intensity to picture intensity.
    #[inline]
    pub fn inverse(&self, v: u8) -> u8 {
        self.inverse[v as usize]
    }

    pub fn is_identity(&self) -> bool {
        self.forward.iter().enumerate().all(|(i, &v)| v as usize == i)
    }
}

impl Default for GammaTables {
    fn default() -> Self {
        Self::new(1.0)
    }
}

fn curve(exponent: f32) -> [u8; 256] {
    let mut table = [0u8; 256];
    for (i, v) in table.iter_mut().enumerate() {
        let x = (i as f64 / 255.0).powf(exponent as f64);
        *v = (255.0 * x).round().clamp(0.0, 255.0) as u8;
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_gamma_is_identity() {
        let g = GammaTables::new(1.0);
        assert!(g.is_identity());
        assert_eq!(g.inverse(77), 77);
        assert_eq!(GammaTables::new(-3.0), g);
        assert_eq!(GammaTables::new(f32::NAN), g);
    }

    #[test]
    fn gamma_curves_are_monotonic_with_fixed_ends() {
        let g = GammaTables::new(2.2);
        assert_eq!((g.forward(0), g.forward(255)), (0, 255));
        assert_eq!((g.inverse(0), g.inverse(255)), (0, 255));
        assert!(g.forward(128) < 128);
        assert!(g.inverse(128) > 128);
        for i in 0..255u8 {
            assert!(g.forward(i) <= g.forward(i + 1));
        }
        let back = g.inverse(g.forward(200));
        assert!(back.abs_diff(200) <= 2, "{back}");
    }
}
