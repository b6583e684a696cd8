// Small numeric helpers shared by the feature modules

use std::cmp::Ordering;

/// Arithmetic mean; None for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by n); None for an empty slice
pub fn std_dev(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    Some(var.sqrt())
}

/// Least-squares line through (x, y)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LineFit {
    pub fn at(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// First-degree least-squares fit
///
/// None when fewer than two points are given or every x is identical.
pub fn linear_fit(x: &[f64], y: &[f64]) -> Option<LineFit> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mx = mean(x)?;
    let my = mean(y)?;
    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (&xi, &yi) in x.iter().zip(y) {
        let dx = xi - mx;
        sxy += dx * (yi - my);
        sxx += dx * dx;
    }
    if sxx <= 0.0 {
        return None;
    }
    let slope = sxy / sxx;
    Some(LineFit {
        slope,
        intercept: my - slope * mx,
    })
}

/// Index of the first maximum, ignoring NaN ordering issues
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v.partial_cmp(&b) != Some(Ordering::Greater) => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Index of the first value closest to `target`
pub fn nearest_index(values: &[f64], target: f64) -> Option<usize> {
    let distances: Vec<f64> = values.iter().map(|v| -(v - target).abs()).collect();
    argmax(&distances)
}

/// Piecewise-linear interpolation at `x` through increasing points `xp`
///
/// Values outside the sampled range hold the nearest end point.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> Option<f64> {
    if xp.is_empty() || xp.len() != fp.len() {
        return None;
    }
    let last = xp.len() - 1;
    if x <= xp[0] {
        return Some(fp[0]);
    }
    if x >= xp[last] {
        return Some(fp[last]);
    }
    // First index whose x is greater than the query
    let hi = xp.partition_point(|&p| p <= x);
    let lo = hi - 1;
    let span = xp[hi] - xp[lo];
    if span <= 0.0 {
        return Some(fp[hi]);
    }
    let t = (x - xp[lo]) / span;
    Some(fp[lo] + t * (fp[hi] - fp[lo]))
}
