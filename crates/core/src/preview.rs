//! Preview of a worksheet as returned by the preview endpoint.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetInfo {
    pub index: usize,
    pub name: String,
    pub rows: u32,
    pub cols: u32,
}

/// First rows of the active sheet plus the extent used for validation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetPreview {
    pub sheets: Vec<SheetInfo>,
    pub total_rows: u32,
    pub total_cols: u32,
    pub preview_data: Vec<Vec<String>>,
    pub column_letters: Vec<String>,
}

impl SheetPreview {
    /// The only sheet's index, when the workbook has exactly one.
    pub fn single_sheet(&self) -> Option<usize> {
        match self.sheets.as_slice() {
            [only] => Some(only.index),
            _ => None,
        }
    }

    pub fn sheet(&self, index: usize) -> Option<&SheetInfo> {
        self.sheets.iter().find(|s| s.index == index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_payload() {
        let json = r#"{
            "sheets": [
                {"index": 0, "name": "Sheet1", "rows": 100, "cols": 20},
                {"index": 1, "name": "Sheet2", "rows": 50, "cols": 10}
            ],
            "preview_data": [["No.", "Device", "Model"], ["1", "DDC controller", "ML-5000"]],
            "total_rows": 100,
            "total_cols": 20,
            "column_letters": ["A", "B", "C"]
        }"#;

        let preview: SheetPreview = serde_json::from_str(json).unwrap();
        assert_eq!(preview.total_rows, 100);
        assert_eq!(preview.total_cols, 20);
        assert_eq!(preview.sheets.len(), 2);
        assert_eq!(preview.sheet(1).map(|s| s.name.as_str()), Some("Sheet2"));
        assert_eq!(preview.single_sheet(), None);
        assert_eq!(preview.preview_data[1][1], "DDC controller");
    }

    #[test]
    fn test_single_sheet() {
        let preview = SheetPreview {
            sheets: vec![SheetInfo { index: 0, name: "Only".into(), rows: 5, cols: 3 }],
            ..SheetPreview::default()
        };
        assert_eq!(preview.single_sheet(), Some(0));
    }
}
