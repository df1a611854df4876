//! Synthetic cloud-model runs with predictable contents.
//!
//! Arrays follow the model's layout: `q` is `(time, 1, y, z, variable)` and
//! `p` is `(time, 1, y, z)`, both flattened row-major.

/// Value stored at `q[t, 0, y, z, v]` by [`SyntheticRun::predictable`].
///
/// Each index lands in its own decimal digit so a wrong axis shows up
/// immediately in a failing assertion.
pub fn predictable_q_value(t: usize, y: usize, z: usize, v: usize) -> f64 {
    (t * 1000 + y * 100 + z * 10 + v) as f64
}

/// Value stored at `p[t, 0, y, z]` by [`SyntheticRun::predictable`].
pub fn predictable_p_value(t: usize, y: usize, z: usize) -> f64 {
    t as f64 - y as f64 * 0.5 + z as f64 * 0.01
}

/// In-memory description of one model output file.
#[derive(Debug, Clone)]
pub struct SyntheticRun {
    pub times: Vec<f64>,
    pub horizontal: Vec<f64>,
    pub heights: Vec<f64>,
    pub variables: usize,
    pub q: Vec<f64>,
    pub p: Vec<f64>,
    pub fill_value: Option<f64>,
}

impl SyntheticRun {
    /// Build a run by evaluating `q_fn(t, y, z, v)` and `p_fn(t, y, z)` on every index.
    pub fn from_fn<Q, P>(
        times: Vec<f64>,
        horizontal: Vec<f64>,
        heights: Vec<f64>,
        variables: usize,
        q_fn: Q,
        p_fn: P,
    ) -> Self
    where
        Q: Fn(usize, usize, usize, usize) -> f64,
        P: Fn(usize, usize, usize) -> f64,
    {
        let (nt, ny, nz) = (times.len(), horizontal.len(), heights.len());
        let mut q = Vec::with_capacity(nt * ny * nz * variables);
        let mut p = Vec::with_capacity(nt * ny * nz);
        for t in 0..nt {
            for y in 0..ny {
                for z in 0..nz {
                    for v in 0..variables {
                        q.push(q_fn(t, y, z, v));
                    }
                    p.push(p_fn(t, y, z));
                }
            }
        }

        Self {
            times,
            horizontal,
            heights,
            variables,
            q,
            p,
            fill_value: None,
        }
    }

    /// A small run filled with [`predictable_q_value`] / [`predictable_p_value`].
    ///
    /// Times are 600 s apart, horizontal points 250 m apart and heights
    /// 200 m apart starting at 1000 m.
    pub fn predictable(times: usize, horizontal: usize, heights: usize, variables: usize) -> Self {
        Self::from_fn(
            (0..times).map(|t| t as f64 * 600.0).collect(),
            (0..horizontal).map(|y| y as f64 * 250.0 - 500.0).collect(),
            (0..heights).map(|z| 1000.0 + z as f64 * 200.0).collect(),
            variables,
            predictable_q_value,
            predictable_p_value,
        )
    }

    /// A run whose `q[.., variable]` is constant in time and horizontal
    /// position, so its vertical mean equals `profile`.
    ///
    /// Two times by two positions: summing four equal values and dividing by
    /// four is exact, so the mean reproduces `profile` bit for bit.
    pub fn with_profile(heights: Vec<f64>, variables: usize, variable: usize, profile: &[f64]) -> Self {
        assert_eq!(heights.len(), profile.len(), "one profile value per height");
        let profile = profile.to_vec();
        Self::from_fn(
            vec![0.0, 900.0],
            vec![-250.0, 250.0],
            heights,
            variables,
            move |_, _, z, v| if v == variable { profile[z] } else { 0.0 },
            |_, _, _| 0.0,
        )
    }

    /// Mark `q[t, 0, y, z, v]` as missing using `fill`.
    pub fn mask_q(&mut self, t: usize, y: usize, z: usize, v: usize, fill: f64) {
        let (ny, nz) = (self.horizontal.len(), self.heights.len());
        let idx = ((t * ny + y) * nz + z) * self.variables + v;
        self.q[idx] = fill;
        self.fill_value = Some(fill);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predictable_layout() {
        let run = SyntheticRun::predictable(2, 3, 4, 5);
        assert_eq!(run.q.len(), 2 * 3 * 4 * 5);
        assert_eq!(run.p.len(), 2 * 3 * 4);
        // q[1, 0, 2, 3, 4] is the last variable of z=3, y=2, t=1
        let idx = ((1 * 3 + 2) * 4 + 3) * 5 + 4;
        assert_eq!(run.q[idx], 1234.0);
    }

    #[test]
    fn test_with_profile_is_constant_in_time() {
        let run = SyntheticRun::with_profile(vec![1000.0, 1200.0], 3, 1, &[7.0, 9.0]);
        let nz = 2;
        let nv = 3;
        assert_eq!(run.q[1 * nv + 1], 9.0);
        assert_eq!(run.q[nz * nv * 2 + 1], 7.0); // t=1, y=0, z=0
        assert_eq!(run.q[0], 0.0);
    }
}
