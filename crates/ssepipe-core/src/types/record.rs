use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A field the formatter knows how to emit, in emission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Id,
    Event,
    Data,
    Retry,
    /// Comment line (`:<value>`), keyed as `$comment` in JSON input
    Comment,
}

impl Field {
    /// Fixed emission order, independent of the input's key order
    pub const ORDER: [Field; 5] = [
        Field::Id,
        Field::Event,
        Field::Data,
        Field::Retry,
        Field::Comment,
    ];

    /// Key of this field in a JSON object
    pub fn key(self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::Event => "event",
            Field::Data => "data",
            Field::Retry => "retry",
            Field::Comment => "$comment",
        }
    }

    /// Name written before the colon on the wire
    pub fn name(self) -> &'static str {
        match self {
            Field::Comment => "",
            other => other.key(),
        }
    }

    /// Only `data` keeps every line of a multi-line value
    pub fn is_multiline(self) -> bool {
        matches!(self, Field::Data)
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ORDER.into_iter().find(|field| field.key() == key)
    }
}

/// Value of a recognized field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Emitted verbatim, split into lines
    Text(String),
    /// Emitted as compact JSON on a single line
    Json(Value),
    /// Present without a value; emitted as the literal `undefined`
    Undefined,
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    pub fn json(value: impl Into<Value>) -> Self {
        Self::from(value.into())
    }
}

impl From<Value> for FieldValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => FieldValue::Text(text),
            other => FieldValue::Json(other),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// One logical event: an optional value per recognized field.
///
/// `None` means the field is absent. A present `null` is
/// `Some(FieldValue::Json(Value::Null))` and is still emitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub id: Option<FieldValue>,
    pub event: Option<FieldValue>,
    pub data: Option<FieldValue>,
    pub retry: Option<FieldValue>,
    pub comment: Option<FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from a decoded JSON value.
    ///
    /// Only objects carry fields; unrecognized keys are ignored and
    /// any other value yields an empty record.
    pub fn from_json(value: &Value) -> Self {
        let mut record = Record::new();
        if let Value::Object(map) = value {
            for (key, value) in map {
                if let Some(field) = Field::from_key(key) {
                    record.set(field, FieldValue::from(value.clone()));
                }
            }
        }
        record
    }

    pub fn id(mut self, value: impl Into<FieldValue>) -> Self {
        self.id = Some(value.into());
        self
    }

    pub fn event(mut self, value: impl Into<FieldValue>) -> Self {
        self.event = Some(value.into());
        self
    }

    pub fn data(mut self, value: impl Into<FieldValue>) -> Self {
        self.data = Some(value.into());
        self
    }

    pub fn retry(mut self, value: impl Into<FieldValue>) -> Self {
        self.retry = Some(value.into());
        self
    }

    pub fn comment(mut self, value: impl Into<FieldValue>) -> Self {
        self.comment = Some(value.into());
        self
    }

    pub fn get(&self, field: Field) -> Option<&FieldValue> {
        match field {
            Field::Id => self.id.as_ref(),
            Field::Event => self.event.as_ref(),
            Field::Data => self.data.as_ref(),
            Field::Retry => self.retry.as_ref(),
            Field::Comment => self.comment.as_ref(),
        }
    }

    pub fn set(&mut self, field: Field, value: FieldValue) {
        let slot = match field {
            Field::Id => &mut self.id,
            Field::Event => &mut self.event,
            Field::Data => &mut self.data,
            Field::Retry => &mut self.retry,
            Field::Comment => &mut self.comment,
        };
        *slot = Some(value);
    }

    /// Present fields in emission order
    pub fn fields(&self) -> impl Iterator<Item = (Field, &FieldValue)> {
        Field::ORDER
            .into_iter()
            .filter_map(move |field| self.get(field).map(|value| (field, value)))
    }

    pub fn is_empty(&self) -> bool {
        self.fields().next().is_none()
    }
}

impl From<Value> for Record {
    fn from(value: Value) -> Self {
        Record::from_json(&value)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let present: Vec<_> = self
            .fields()
            .filter(|(_, value)| !matches!(value, FieldValue::Undefined))
            .collect();

        let mut map = serializer.serialize_map(Some(present.len()))?;
        for (field, value) in present {
            match value {
                FieldValue::Text(text) => map.serialize_entry(field.key(), text)?,
                FieldValue::Json(json) => map.serialize_entry(field.key(), json)?,
                FieldValue::Undefined => {}
            }
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Record::from_json(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_keeps_recognized_fields() {
        let record = Record::from_json(&json!({
            "event": "test",
            "id": 123,
            "invalid": "invalid",
            "$comment": "note"
        }));

        assert_eq!(record.event, Some(FieldValue::text("test")));
        assert_eq!(record.id, Some(FieldValue::Json(json!(123))));
        assert_eq!(record.comment, Some(FieldValue::text("note")));
        assert!(record.data.is_none());
        assert!(record.retry.is_none());
    }

    #[test]
    fn test_present_null_is_not_absent() {
        let record = Record::from_json(&json!({ "event": null }));
        assert_eq!(record.event, Some(FieldValue::Json(Value::Null)));
        assert!(!record.is_empty());
    }

    #[test]
    fn test_non_object_is_empty() {
        for value in [json!(0), json!(""), json!(false), json!(null), json!([1, 2]), json!("data")] {
            assert!(Record::from_json(&value).is_empty(), "{value} should be empty");
        }
    }

    #[test]
    fn test_fields_follow_fixed_order() {
        let record = Record::new().retry(json!(10)).comment("c").data("d").id("1");
        let order: Vec<Field> = record.fields().map(|(field, _)| field).collect();
        assert_eq!(order, vec![Field::Id, Field::Data, Field::Retry, Field::Comment]);
    }

    #[test]
    fn test_field_names() {
        assert_eq!(Field::Comment.key(), "$comment");
        assert_eq!(Field::Comment.name(), "");
        assert_eq!(Field::from_key("retry"), Some(Field::Retry));
        assert_eq!(Field::from_key("invalid"), None);
    }

    #[test]
    fn test_serde_roundtrip_skips_undefined() {
        let record = Record::new().data(FieldValue::Undefined).event(Value::Null).id("7");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, json!({ "id": "7", "event": null }));

        let back: Record = serde_json::from_value(json).unwrap();
        assert_eq!(back.id, Some(FieldValue::text("7")));
        assert!(back.data.is_none());
    }
}
