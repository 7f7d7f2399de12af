//! Channel whitelisting: recorded label list → analysis column indices.
use tracing::warn;

/// The subset of recorded channels retained for analysis.
///
/// Resolved once per session and applied uniformly to every epoch.
#[derive(Debug, Clone)]
pub struct ChannelSet {
    /// Retained labels, in whitelist order.
    pub labels: Vec<String>,
    /// Column index of each retained label within the recorded data matrix.
    pub indices: Vec<usize>,
}

impl ChannelSet {
    /// Map each whitelisted label to its column in `all_labels`.
    ///
    /// Whitelisted labels absent from the recording are warned about and
    /// dropped, so `labels` and `indices` stay in lockstep.
    pub fn resolve(all_labels: &[String], valid_labels: &[String]) -> Self {
        let mut labels = Vec::with_capacity(valid_labels.len());
        let mut indices = Vec::with_capacity(valid_labels.len());
        for label in valid_labels {
            match all_labels.iter().position(|l| l == label) {
                Some(idx) => {
                    labels.push(label.clone());
                    indices.push(idx);
                }
                None => warn!(%label, "whitelisted channel not in recording, dropping"),
            }
        }
        Self { labels, indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn resolves_whitelist_order() {
        let all = labels(&["MEG0111", "MEG0112", "EOG001", "MEG0113"]);
        let valid = labels(&["MEG0113", "MEG0111"]);
        let set = ChannelSet::resolve(&all, &valid);
        assert_eq!(set.indices, vec![3, 0]);
        assert_eq!(set.labels, valid);
    }

    #[test]
    fn absent_label_dropped() {
        let all = labels(&["MEG0111", "MEG0112"]);
        let valid = labels(&["MEG0111", "MEG9999"]);
        let set = ChannelSet::resolve(&all, &valid);
        assert_eq!(set.indices, vec![0]);
        assert_eq!(set.labels, labels(&["MEG0111"]));
    }
}
