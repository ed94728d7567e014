//! Statistical outlier detection over playlist feature vectors.

use serde::Serialize;

/// Audio features a track is checked against, plus display metadata.
///
/// Valence is carried for display only, it does not participate in the
/// outlier computation.
#[derive(Debug, Clone, Serialize)]
pub struct TrackFeatures {
    pub id: String,
    pub name: String,
    pub artists: Vec<String>,
    pub danceability: f64,
    pub energy: f64,
    pub tempo: f64,
    pub valence: f64,
}

/// A feature participating in the outlier computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Danceability,
    Energy,
    Tempo,
}

/// The fixed feature set the detector checks. [`TrackFeatures`] is the
/// other half of this contract: the aggregator populates exactly these
/// values (plus display metadata), so the fetch and compute stages cannot
/// drift apart.
pub const CHECKED_FEATURES: [Feature; 3] =
    [Feature::Danceability, Feature::Energy, Feature::Tempo];

/// Default deviation threshold, in standard deviations.
pub const DEFAULT_THRESHOLD: f64 = 2.0;

impl TrackFeatures {
    pub fn value(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Danceability => self.danceability,
            Feature::Energy => self.energy,
            Feature::Tempo => self.tempo,
        }
    }
}

/// Mean and population standard deviation of one feature over a playlist.
#[derive(Debug, Clone, Copy)]
pub struct FeatureStats {
    pub mean: f64,
    pub std_dev: f64,
}

impl FeatureStats {
    /// Compute stats over a non-empty set of vectors.
    ///
    /// Uses the population variance (divide by N, not N-1): the playlist is
    /// the whole population, not a sample of one.
    fn over(vectors: &[TrackFeatures], feature: Feature) -> Self {
        let count = vectors.len() as f64;
        let mean = vectors.iter().map(|v| v.value(feature)).sum::<f64>() / count;
        let variance = vectors
            .iter()
            .map(|v| {
                let deviation = v.value(feature) - mean;
                deviation * deviation
            })
            .sum::<f64>()
            / count;
        Self {
            mean,
            std_dev: variance.sqrt(),
        }
    }
}

/// Return the vectors deviating from the playlist profile on at least one
/// checked feature by strictly more than `threshold` standard deviations.
///
/// The result preserves the input order. An empty input or an empty result
/// are both valid outcomes, not errors. A feature with zero spread can
/// never flag a vector since the comparison is strict.
pub fn find_outliers(vectors: &[TrackFeatures], threshold: f64) -> Vec<TrackFeatures> {
    if vectors.is_empty() {
        return Vec::new();
    }

    let stats: Vec<(Feature, FeatureStats)> = CHECKED_FEATURES
        .iter()
        .map(|&feature| (feature, FeatureStats::over(vectors, feature)))
        .collect();

    vectors
        .iter()
        .filter(|v| {
            stats
                .iter()
                .any(|(feature, s)| (v.value(*feature) - s.mean).abs() > threshold * s.std_dev)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(id: &str, danceability: f64, energy: f64, tempo: f64) -> TrackFeatures {
        TrackFeatures {
            id: id.to_string(),
            name: format!("Track {}", id),
            artists: vec!["Artist".to_string()],
            danceability,
            energy,
            tempo,
            valence: 0.5,
        }
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(find_outliers(&[], DEFAULT_THRESHOLD).is_empty());
    }

    #[test]
    fn identical_vectors_yield_no_outliers() {
        // Zero spread on every feature: the strict inequality can never hold.
        let vectors: Vec<TrackFeatures> =
            (0..5).map(|i| vector(&i.to_string(), 0.7, 0.4, 128.0)).collect();
        assert!(find_outliers(&vectors, DEFAULT_THRESHOLD).is_empty());
        assert!(find_outliers(&vectors, 0.0).is_empty());
    }

    #[test]
    fn extreme_tempo_is_flagged_at_default_threshold_but_not_at_ten() {
        // Nine tracks at 120 bpm, one at 200. mean = 128, population
        // std dev = 24, the extreme track deviates by 72 = 3 sigma.
        let mut vectors: Vec<TrackFeatures> =
            (0..9).map(|i| vector(&i.to_string(), 0.5, 0.5, 120.0)).collect();
        vectors.push(vector("odd", 0.5, 0.5, 200.0));

        let at_default = find_outliers(&vectors, DEFAULT_THRESHOLD);
        assert_eq!(at_default.len(), 1);
        assert_eq!(at_default[0].id, "odd");

        let at_ten = find_outliers(&vectors, 10.0);
        assert!(at_ten.is_empty());

        // Higher threshold result is a subset of the lower threshold result.
        for v in &at_ten {
            assert!(at_default.iter().any(|o| o.id == v.id));
        }
    }

    #[test]
    fn three_vector_example_matches_the_formulas() {
        // With N = 3 the largest possible deviation is sqrt(2) sigma, so
        // nothing can exceed 2 sigma no matter how extreme a track looks.
        let vectors = vec![
            vector("a", 0.5, 0.5, 120.0),
            vector("b", 0.5, 0.5, 120.0),
            vector("c", 0.9, 0.1, 200.0),
        ];

        let tempo_stats = FeatureStats::over(&vectors, Feature::Tempo);
        assert!((tempo_stats.mean - 440.0 / 3.0).abs() < 1e-9);
        assert!((tempo_stats.std_dev - (4266.666666666667_f64 / 3.0).sqrt()).abs() < 1e-9);

        // Deviation of the third vector: |200 - 146.67| = 53.33, the bar is
        // 2 * 37.71 = 75.42. Same shape on danceability and energy.
        assert!(find_outliers(&vectors, DEFAULT_THRESHOLD).is_empty());
    }

    #[test]
    fn outliers_keep_input_order() {
        let mut vectors: Vec<TrackFeatures> =
            (0..20).map(|i| vector(&format!("t{}", i), 0.5, 0.5, 120.0)).collect();
        vectors[3] = vector("low", 0.5, 0.5, 20.0);
        vectors[11] = vector("high", 0.5, 0.5, 240.0);

        let outliers = find_outliers(&vectors, DEFAULT_THRESHOLD);
        let ids: Vec<&str> = outliers.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["low", "high"]);
    }

    #[test]
    fn single_deviating_feature_is_enough() {
        let mut vectors: Vec<TrackFeatures> =
            (0..10).map(|i| vector(&i.to_string(), 0.5, 0.5, 120.0)).collect();
        // Tempo and danceability in line with the rest, energy far off.
        vectors[4] = vector("quiet", 0.5, 0.01, 120.0);

        let outliers = find_outliers(&vectors, DEFAULT_THRESHOLD);
        assert_eq!(outliers.len(), 1);
        assert_eq!(outliers[0].id, "quiet");
    }
}
