use crate::models::TopicMatch;

pub const FALLBACK_TOPIC: &str = "Wireless";

/// Upper bound for a keyword-derived confidence.
const MAX_CONFIDENCE: f64 = 95.0;
/// Flat bonus added to any topic with at least one keyword hit.
const MATCH_BONUS: f64 = 20.0;

/// Ordered topic -> keywords table used for classification.
///
/// Built once at startup and shared read-only between requests. Order matters:
/// when two topics reach the same confidence the one defined first wins.
#[derive(Debug, Clone)]
pub struct TopicKeywordTable {
    topics: Vec<(String, Vec<String>)>,
    fallback: String,
}

impl Default for TopicKeywordTable {
    fn default() -> Self {
        Self::new(FALLBACK_TOPIC)
            .with_topic("5G", &["5g", "nr", "new radio", "5g network", "next generation"])
            .with_topic("LTE", &["lte", "4g", "long term evolution", "evolved packet"])
            .with_topic(
                "RF",
                &["rf", "radio frequency", "modulation", "spectrum", "propagation"],
            )
            .with_topic(
                "Antennas",
                &["antenna", "mimo", "beam", "radiation pattern", "array"],
            )
            .with_topic(
                "IoT",
                &["iot", "internet of things", "sensor", "m2m", "machine to machine"],
            )
            .with_topic(
                "Satellite",
                &["satellite", "orbit", "geo", "leo", "satellite communication"],
            )
            .with_topic("Bluetooth", &["bluetooth", "ble", "low energy", "pairing"])
            .with_topic("Wireless", &["wireless", "wi-fi", "wifi", "802.11"])
    }
}

impl TopicKeywordTable {
    pub fn new(fallback: &str) -> Self {
        Self {
            topics: Vec::new(),
            fallback: fallback.to_string(),
        }
    }

    /// Append a topic. Keywords are stored lowercase.
    pub fn with_topic(mut self, topic: &str, keywords: &[&str]) -> Self {
        let keywords = keywords.iter().map(|k| k.to_lowercase()).collect();
        self.topics.push((topic.to_string(), keywords));
        self
    }

    pub fn topic_names(&self) -> impl Iterator<Item = &str> {
        self.topics.iter().map(|(name, _)| name.as_str())
    }

    /// Pick the best matching topic for a title/description pair.
    ///
    /// Keywords are matched as plain substrings of the lowercased text, so "5g"
    /// also hits inside "5gram". A topic with `m` of `n` keywords present scores
    /// `min(95, m / n * 100 + 20)`.
    pub fn classify(&self, title: &str, description: &str) -> TopicMatch {
        let text = format!("{title} {description}").to_lowercase();

        let mut best: Option<(&str, f64)> = None;

        for (topic, keywords) in &self.topics {
            if keywords.is_empty() {
                continue;
            }

            let matches = keywords
                .iter()
                .filter(|keyword| text.contains(keyword.as_str()))
                .count();
            if matches == 0 {
                continue;
            }

            let confidence =
                (matches as f64 / keywords.len() as f64 * 100.0 + MATCH_BONUS).min(MAX_CONFIDENCE);

            // strict comparison: earlier topics keep ties
            if best.map_or(true, |(_, current)| confidence > current) {
                best = Some((topic.as_str(), confidence));
            }
        }

        match best {
            Some((topic, confidence)) => TopicMatch {
                topic: topic.to_string(),
                confidence: confidence.round() as u8,
            },
            None => TopicMatch {
                topic: self.fallback.clone(),
                confidence: 0,
            },
        }
    }
}
