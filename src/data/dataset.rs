use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;

const ASCII_RAMP: &[u8] = b" .:-=+*#%@";

/// One sample: an input vector, an optional class label and the image
/// dimensions it came from (`0 × 0` when it is not an image).
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    width: usize,
    height: usize,
    input: Vec<f64>,
    label: Option<usize>,
}

impl Match {
    pub fn labeled(input: Vec<f64>, label: usize) -> Match {
        Match { width: 0, height: 0, input, label: Some(label) }
    }

    pub fn unlabeled(input: Vec<f64>) -> Match {
        Match { width: 0, height: 0, input, label: None }
    }

    /// A sample decoded from a `width × height` image.
    pub fn image(width: usize, height: usize, input: Vec<f64>, label: Option<usize>) -> Match {
        Match { width, height, input, label }
    }

    pub fn input(&self) -> &[f64] {
        &self.input
    }

    pub fn label(&self) -> Option<usize> {
        self.label
    }

    pub fn has_label(&self) -> bool {
        self.label.is_some()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn set_label(&mut self, label: Option<usize>) {
        self.label = label;
    }
}

/// Renders image samples as ASCII art, one character per pixel, darker
/// characters for values closer to 1.
impl fmt::Display for Match {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.width == 0 {
            return Ok(());
        }
        for row in self.input.chunks(self.width).take(self.height) {
            let line: String = row
                .iter()
                .map(|&v| {
                    let idx = ((v * 10.0).max(0.0) as usize).min(ASCII_RAMP.len() - 1);
                    ASCII_RAMP[idx] as char
                })
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Ordered, shuffleable collection of samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSet {
    matches: Vec<Match>,
}

impl DataSet {
    pub fn new() -> DataSet {
        DataSet::default()
    }

    pub fn push(&mut self, sample: Match) {
        self.matches.push(sample);
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Match> {
        self.matches.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Match> {
        self.matches.iter()
    }

    pub fn shuffle(&mut self) {
        self.shuffle_with(&mut rand::thread_rng());
    }

    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.matches.shuffle(rng);
    }
}

impl FromIterator<Match> for DataSet {
    fn from_iter<I: IntoIterator<Item = Match>>(iter: I) -> Self {
        DataSet { matches: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a DataSet {
    type Item = &'a Match;
    type IntoIter = std::slice::Iter<'a, Match>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn shuffle_keeps_every_sample() {
        let mut set: DataSet = (0..20).map(|i| Match::labeled(vec![i as f64], i)).collect();
        set.shuffle_with(&mut StdRng::seed_from_u64(9));
        let mut labels: Vec<usize> = set.iter().filter_map(Match::label).collect();
        labels.sort_unstable();
        assert_eq!(labels, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn unlabeled_samples_report_no_label() {
        let m = Match::unlabeled(vec![0.0, 1.0]);
        assert!(!m.has_label());
        assert_eq!(m.label(), None);
    }

    #[test]
    fn display_draws_image_rows() {
        let m = Match::image(3, 2, vec![0.0, 0.5, 1.0, 0.95, 0.25, 0.05], Some(1));
        assert_eq!(m.to_string(), " +@\n@: \n");
        assert_eq!(Match::labeled(vec![1.0], 0).to_string(), "");
    }
}
