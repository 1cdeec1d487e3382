use std::sync::Mutex;

use matriq_core::ScanResult;

/// Append-only, most-recent-first log of scan results for one
/// pipeline-viewing session.
///
/// Entries are never reordered and never deduplicated: re-scanning the same
/// physical label is a second, independent inspection record. The log only
/// empties on session teardown.
#[derive(Default)]
pub struct ResultLog {
    entries: Mutex<Vec<ScanResult>>,
}

impl ResultLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a freshly completed scan.
    pub fn append(&self, result: ScanResult) {
        self.entries.lock().unwrap().insert(0, result);
    }

    /// Ordered copy for rendering, most recent first.
    pub fn snapshot(&self) -> Vec<ScanResult> {
        self.entries.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    /// Drop all entries; called only on session teardown.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn result(material_code: &str) -> ScanResult {
        ScanResult {
            pipeline_id: "p1".into(),
            pipeline_code: None,
            material_code: Some(material_code.into()),
            quantity: None,
            batch: None,
            date: None,
            brand: None,
            electrical_characteristics: None,
            raw_ocr_text: material_code.into(),
            image_filename: None,
            scan_time: "2025-01-02T08:30:00Z".parse::<DateTime<Utc>>().unwrap(),
        }
    }

    #[test]
    fn test_snapshot_is_most_recent_first() {
        let log = ResultLog::new();
        log.append(result("first"));
        log.append(result("second"));
        log.append(result("third"));

        let snapshot = log.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[0].material_code.as_deref(), Some("third"));
        assert_eq!(snapshot[1].material_code.as_deref(), Some("second"));
        assert_eq!(snapshot[2].material_code.as_deref(), Some("first"));
    }

    #[test]
    fn test_rescans_are_not_deduplicated() {
        let log = ResultLog::new();
        log.append(result("M-100"));
        log.append(result("M-100"));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let log = ResultLog::new();
        log.append(result("M-100"));
        let snapshot = log.snapshot();
        log.append(result("M-200"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_clear_empties_the_log() {
        let log = ResultLog::new();
        log.append(result("M-100"));
        assert!(!log.is_empty());
        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.snapshot().len(), 0);
    }
}
