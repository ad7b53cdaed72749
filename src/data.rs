use crate::params::CaseId;

/// Observations the moves read. Only the case count is needed here; the
/// likelihood oracle is free to look at anything else an implementor carries.
pub trait CaseData {
    fn num_cases(&self) -> usize;

    /// Name used for a case in log output.
    fn case_label(&self, case: CaseId) -> String {
        case.to_string()
    }
}

#[derive(Debug, Clone)]
pub struct OutbreakData {
    pub labels: Vec<String>,
}

impl OutbreakData {
    pub fn from_labels(labels: Vec<String>) -> Self {
        Self { labels }
    }

    /// Cases labelled "1".."N".
    pub fn unlabelled(n_cases: usize) -> Self {
        Self { labels: (1..=n_cases).map(|i| i.to_string()).collect() }
    }

    pub fn label(&self, case: CaseId) -> &str {
        &self.labels[case.index()]
    }
}

impl CaseData for OutbreakData {
    fn num_cases(&self) -> usize {
        self.labels.len()
    }

    fn case_label(&self, case: CaseId) -> String {
        self.label(case).to_string()
    }
}
