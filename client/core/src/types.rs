use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder rendered for extraction fields the OCR step did not find.
pub const FIELD_PLACEHOLDER: &str = "-";

/// A named inspection line that groups scans.
///
/// Created by the remote service; `id`, `code`, and `created_at` are
/// server-assigned and immutable. `total_scans` is authoritative only on
/// the server and is never incremented locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: String,
    pub code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub total_scans: u64,
}

/// The structured outcome of one successful scan submission.
///
/// The extraction fields are true optionals: an absent field means the OCR
/// step found nothing, which is a valid outcome, not an error. Only
/// `raw_ocr_text` is always present on success (possibly empty).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub pipeline_id: String,
    pub pipeline_code: Option<String>,
    pub material_code: Option<String>,
    pub quantity: Option<u32>,
    pub batch: Option<String>,
    pub date: Option<String>,
    pub brand: Option<String>,
    pub electrical_characteristics: Option<String>,
    #[serde(default)]
    pub raw_ocr_text: String,
    pub image_filename: Option<String>,
    pub scan_time: DateTime<Utc>,
}

impl ScanResult {
    /// Labeled extraction fields for rendering, absent values as `-`.
    pub fn display_fields(&self) -> Vec<(&'static str, String)> {
        let text = |v: &Option<String>| v.clone().unwrap_or_else(|| FIELD_PLACEHOLDER.to_string());
        vec![
            ("Material code", text(&self.material_code)),
            (
                "Quantity",
                self.quantity
                    .map(|q| q.to_string())
                    .unwrap_or_else(|| FIELD_PLACEHOLDER.to_string()),
            ),
            ("Batch", text(&self.batch)),
            ("Date", text(&self.date)),
            ("Brand", text(&self.brand)),
            ("Electrical characteristics", text(&self.electrical_characteristics)),
            (
                "Raw OCR",
                if self.raw_ocr_text.is_empty() {
                    FIELD_PLACEHOLDER.to_string()
                } else {
                    self.raw_ocr_text.clone()
                },
            ),
        ]
    }
}

/// An image yielded by the capture capability, already loaded into memory.
///
/// Loading happens at the capability boundary so that an unreadable file
/// fails there, before the workflow ever leaves its idle state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}
