//! The record: one photo reference plus three free-text fields.

use serde::{Deserialize, Serialize};

/// Column headers of the persisted record file, in the order they are written.
pub const RECORD_COLUMNS: [&str; 4] = ["Image Path", "Field1", "Field2", "Field3"];

/// One row of user data: a reference to a managed image plus three free-text fields.
///
/// Records carry no identity of their own; their position in the collection is
/// their only handle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    #[serde(rename = "Image Path")]
    pub image_path: String,
    #[serde(rename = "Field1")]
    pub field1: String,
    #[serde(rename = "Field2")]
    pub field2: String,
    #[serde(rename = "Field3")]
    pub field3: String,
}

/// The three text fields entered by the user, before an image is attached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFields {
    pub field1: String,
    pub field2: String,
    pub field3: String,
}

impl RecordFields {
    pub fn new(
        field1: impl Into<String>,
        field2: impl Into<String>,
        field3: impl Into<String>,
    ) -> Self {
        Self {
            field1: field1.into(),
            field2: field2.into(),
            field3: field3.into(),
        }
    }

    /// Attaches `image_path` and produces a storable [`Record`].
    pub fn into_record(self, image_path: impl Into<String>) -> Record {
        Record {
            image_path: image_path.into(),
            field1: self.field1,
            field2: self.field2,
            field3: self.field3,
        }
    }
}

impl Record {
    /// The three fields paired with their display labels, in fixed order.
    pub fn labeled_fields(&self) -> [(&'static str, &str); 3] {
        [
            ("Field 1", self.field1.as_str()),
            ("Field 2", self.field2.as_str()),
            ("Field 3", self.field3.as_str()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_record_keeps_field_order() {
        let record = RecordFields::new("a", "b", "c").into_record("/pics/x.png");
        assert_eq!(record.image_path, "/pics/x.png");
        assert_eq!(
            record.labeled_fields(),
            [("Field 1", "a"), ("Field 2", "b"), ("Field 3", "c")]
        );
    }
}
