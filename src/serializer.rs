use crate::{postgres::ChangeEvent, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SerializationFormat {
    #[default]
    JsonCompact,
    JsonPretty,
}

pub struct JsonSerializer {
    format: SerializationFormat,
}

impl JsonSerializer {
    pub fn new(format: SerializationFormat) -> Self {
        Self { format }
    }

    pub fn serialize(&self, event: &ChangeEvent) -> Result<String> {
        let json = match self.format {
            SerializationFormat::JsonCompact => serde_json::to_string(event)?,
            SerializationFormat::JsonPretty => serde_json::to_string_pretty(event)?,
        };
        Ok(json)
    }
}

impl Default for JsonSerializer {
    fn default() -> Self {
        Self::new(SerializationFormat::default())
    }
}
