//! Weighted path state for the TreeSHAP recursion (Lundberg et al.,
//! "Consistent Individualized Feature Attribution for Tree Ensembles").
//!
//! Each element records a feature encountered on the root-to-node path
//! together with the fraction of subsets flowing through when the
//! feature is excluded (`zero`) or included (`one`); `pweight` tracks
//! the permutation weights of all subset sizes simultaneously.

#[derive(Debug, Clone)]
pub(crate) struct PathState {
    features: Vec<i32>,
    zero: Vec<f64>,
    one: Vec<f64>,
    pweight: Vec<f64>,
}

impl PathState {
    pub(crate) fn new() -> Self {
        Self {
            features: Vec::with_capacity(16),
            zero: Vec::with_capacity(16),
            one: Vec::with_capacity(16),
            pweight: Vec::with_capacity(16),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.features.len()
    }

    pub(crate) fn feature(&self, index: usize) -> i32 {
        self.features[index]
    }

    pub(crate) fn zero_fraction(&self, index: usize) -> f64 {
        self.zero[index]
    }

    pub(crate) fn one_fraction(&self, index: usize) -> f64 {
        self.one[index]
    }

    pub(crate) fn position(&self, feature: i32) -> Option<usize> {
        self.features.iter().position(|&f| f == feature)
    }

    /// Grow the path with a new feature split.
    pub(crate) fn extend(&mut self, feature: i32, zero_fraction: f64, one_fraction: f64) {
        let depth = self.len();
        self.features.push(feature);
        self.zero.push(zero_fraction);
        self.one.push(one_fraction);
        self.pweight.push(if depth == 0 { 1.0 } else { 0.0 });

        for i in (0..depth).rev() {
            self.pweight[i + 1] +=
                one_fraction * self.pweight[i] * (i + 1) as f64 / (depth + 1) as f64;
            self.pweight[i] =
                zero_fraction * self.pweight[i] * (depth - i) as f64 / (depth + 1) as f64;
        }
    }

    /// Remove the element at `index`, undoing its effect on the weights.
    pub(crate) fn unwind(&mut self, index: usize) {
        let depth = self.len() - 1;
        let one_fraction = self.one[index];
        let zero_fraction = self.zero[index];
        let mut next_one_portion = self.pweight[depth];

        for i in (0..depth).rev() {
            if one_fraction != 0.0 {
                let tmp = self.pweight[i];
                self.pweight[i] =
                    next_one_portion * (depth + 1) as f64 / ((i + 1) as f64 * one_fraction);
                next_one_portion =
                    tmp - self.pweight[i] * zero_fraction * (depth - i) as f64 / (depth + 1) as f64;
            } else if zero_fraction != 0.0 {
                self.pweight[i] =
                    self.pweight[i] * (depth + 1) as f64 / (zero_fraction * (depth - i) as f64);
            } else {
                self.pweight[i] = 0.0;
            }
        }

        for i in index..depth {
            self.features[i] = self.features[i + 1];
            self.zero[i] = self.zero[i + 1];
            self.one[i] = self.one[i + 1];
        }
        self.features.pop();
        self.zero.pop();
        self.one.pop();
        self.pweight.pop();
    }

    /// Total permutation weight the path would carry with the element
    /// at `index` removed, used to read off a feature's contribution.
    pub(crate) fn unwound_sum(&self, index: usize) -> f64 {
        let depth = self.len() - 1;
        let one_fraction = self.one[index];
        let zero_fraction = self.zero[index];
        let mut total = 0.0;
        let mut next_one_portion = self.pweight[depth];

        for i in (0..depth).rev() {
            if one_fraction != 0.0 {
                let tmp =
                    next_one_portion * (depth + 1) as f64 / ((i + 1) as f64 * one_fraction);
                total += tmp;
                next_one_portion = self.pweight[i]
                    - tmp * zero_fraction * (depth - i) as f64 / (depth + 1) as f64;
            } else if zero_fraction != 0.0 {
                total += self.pweight[i] * (depth + 1) as f64 / (zero_fraction * (depth - i) as f64);
            }
            // both fractions zero: the element carries no weight
        }

        total
    }
}
