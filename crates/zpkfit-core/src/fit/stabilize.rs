//! Reflection of right-half-plane poles

use num_complex::Complex64;
use tracing::debug;

use crate::error::{FitError, Result};

/// Poles after reflection together with the parity-corrected gain
#[derive(Debug, Clone, PartialEq)]
pub struct Stabilized {
    pub poles: Vec<Complex64>,
    pub gain: f64,
    /// Number of reflected poles, counted on the full-plane list
    pub reflected: usize,
}

/// Reflect every pole with positive real part to `-conj(p)`
///
/// Each reflection flips the sign of `(s - p)` at `s = 0`, so the gain is
/// multiplied by `(-1)^k` for `k` reflected poles.
pub fn reflect_unstable_poles(poles: &[Complex64], gain: f64) -> Stabilized {
    let mut reflected = 0;
    let poles = poles
        .iter()
        .map(|&p| {
            if p.re > 0.0 {
                reflected += 1;
                -p.conj()
            } else {
                p
            }
        })
        .collect();

    let gain = if reflected % 2 == 1 { -gain } else { gain };
    if reflected > 0 {
        debug!(reflected, "reflected unstable poles");
    }
    Stabilized {
        poles,
        gain,
        reflected,
    }
}

/// Fail unless every pole lies strictly in the open left half-plane
pub fn check_stable(poles: &[Complex64]) -> Result<()> {
    let offending: Vec<Complex64> = poles.iter().copied().filter(|p| p.re >= 0.0).collect();
    if offending.is_empty() {
        Ok(())
    } else {
        Err(FitError::UnstablePoles { poles: offending })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reflects_and_flips_gain_per_pole() {
        let poles = vec![
            Complex64::new(0.5, 2.0),
            Complex64::new(0.5, -2.0),
            Complex64::new(3.0, 0.0),
            Complex64::new(-1.0, 0.0),
        ];
        let out = reflect_unstable_poles(&poles, 2.0);

        assert_eq!(out.reflected, 3);
        assert_eq!(out.gain, -2.0);
        assert_eq!(
            out.poles,
            vec![
                Complex64::new(-0.5, 2.0),
                Complex64::new(-0.5, -2.0),
                Complex64::new(-3.0, 0.0),
                Complex64::new(-1.0, 0.0),
            ]
        );
        assert!(check_stable(&out.poles).is_ok());
    }

    #[test]
    fn test_conjugate_pair_keeps_gain_sign() {
        let poles = vec![Complex64::new(1.0, 1.0), Complex64::new(1.0, -1.0)];
        let out = reflect_unstable_poles(&poles, 4.0);
        assert_eq!(out.reflected, 2);
        assert_eq!(out.gain, 4.0);
    }

    #[test]
    fn test_idempotent_on_stable_poles() {
        let poles = vec![Complex64::new(-2.0, 5.0), Complex64::new(-2.0, -5.0)];
        let once = reflect_unstable_poles(&poles, -1.5);
        let twice = reflect_unstable_poles(&once.poles, once.gain);
        assert_eq!(once.poles, poles);
        assert_eq!(once.gain, -1.5);
        assert_eq!(twice, once);
    }

    #[test]
    fn test_imaginary_axis_pole_is_rejected() {
        let poles = vec![Complex64::new(0.0, 3.0), Complex64::new(-1.0, 0.0)];
        let out = reflect_unstable_poles(&poles, 1.0);
        assert_eq!(out.reflected, 0);
        match check_stable(&out.poles) {
            Err(FitError::UnstablePoles { poles }) => {
                assert_eq!(poles, vec![Complex64::new(0.0, 3.0)]);
            }
            other => panic!("expected UnstablePoles, got {:?}", other),
        }
    }
}
