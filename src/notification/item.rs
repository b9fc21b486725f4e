use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::AppError;

use super::EventCode;

/// Key of the array holding the batch in the request body
const ITEMS_KEY: &str = "notificationItems";
/// Key wrapping each notification inside the array
const ITEM_WRAPPER_KEY: &str = "NotificationRequestItem";
const EVENT_CODE_KEY: &str = "eventCode";

/// One payment notification.
///
/// Only `eventCode` is required. Every other field is carried through
/// untouched so the sink sees exactly what the provider sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct NotificationItem {
    fields: Map<String, Value>,
}

impl NotificationItem {
    /// Wrap a `NotificationRequestItem` object, checking it has an event code.
    ///
    /// Any non-null value counts; non-string codes are classified by their
    /// JSON text and end up unrecognized.
    pub fn from_fields(fields: Map<String, Value>) -> Result<Self, AppError> {
        match fields.get(EVENT_CODE_KEY) {
            Some(Value::Null) | None => Err(AppError::MalformedPayload(format!(
                "notification item is missing {}",
                EVENT_CODE_KEY
            ))),
            Some(_) => Ok(Self { fields }),
        }
    }

    /// Raw `eventCode` as sent.
    pub fn event_code_raw(&self) -> String {
        match self.fields.get(EVENT_CODE_KEY) {
            Some(Value::String(code)) => code.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }

    pub fn event_code(&self) -> EventCode {
        EventCode::classify(&self.event_code_raw())
    }

    pub fn psp_reference(&self) -> Option<&str> {
        self.str_field("pspReference")
    }

    pub fn original_reference(&self) -> Option<&str> {
        self.str_field("originalReference")
    }

    pub fn merchant_reference(&self) -> Option<&str> {
        self.str_field("merchantReference")
    }

    pub fn merchant_account_code(&self) -> Option<&str> {
        self.str_field("merchantAccountCode")
    }

    pub fn event_date(&self) -> Option<&str> {
        self.str_field("eventDate")
    }

    pub fn payment_method(&self) -> Option<&str> {
        self.str_field("paymentMethod")
    }

    pub fn reason(&self) -> Option<&str> {
        self.str_field("reason")
    }

    pub fn currency(&self) -> Option<&str> {
        self.str_field("currency")
    }

    pub fn operations(&self) -> Option<&Value> {
        self.fields.get("operations")
    }

    pub fn live(&self) -> Option<&Value> {
        self.fields.get("live")
    }

    pub fn success(&self) -> Option<&Value> {
        self.fields.get("success")
    }

    /// `live` read as a boolean, accepting `true` or `"true"`.
    pub fn is_live(&self) -> Option<bool> {
        self.live().and_then(lenient_bool)
    }

    /// `success` read as a boolean, accepting `true` or `"true"`.
    pub fn is_success(&self) -> Option<bool> {
        self.success().and_then(lenient_bool)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.fields.clone())
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }
}

fn lenient_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// All notifications delivered in one request, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct NotificationBatch {
    items: Vec<NotificationItem>,
}

impl NotificationBatch {
    /// Parse a request body of the form
    /// `{"notificationItems": [{"NotificationRequestItem": {...}}, ...]}`.
    ///
    /// The whole batch is validated before anything is returned, so a bad
    /// item anywhere rejects the request without side effects.
    pub fn from_slice(body: &[u8]) -> Result<Self, AppError> {
        let root: Value = serde_json::from_slice(body)
            .map_err(|e| AppError::MalformedPayload(format!("Invalid JSON body: {}", e)))?;

        let Value::Object(mut root) = root else {
            return Err(AppError::MalformedPayload(
                "request body must be a JSON object".into(),
            ));
        };

        let entries = match root.remove(ITEMS_KEY) {
            Some(Value::Array(entries)) => entries,
            Some(_) => {
                return Err(AppError::MalformedPayload(format!(
                    "{} must be an array",
                    ITEMS_KEY
                )))
            }
            None => {
                return Err(AppError::MalformedPayload(format!(
                    "request body is missing {}",
                    ITEMS_KEY
                )))
            }
        };

        let items = entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| parse_entry(entry).map_err(|e| at_index(index, e)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { items })
    }

    pub fn items(&self) -> &[NotificationItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl From<Vec<NotificationItem>> for NotificationBatch {
    fn from(items: Vec<NotificationItem>) -> Self {
        Self { items }
    }
}

fn parse_entry(entry: Value) -> Result<NotificationItem, AppError> {
    let Value::Object(mut wrapper) = entry else {
        return Err(AppError::MalformedPayload("entry must be a JSON object".into()));
    };

    match wrapper.remove(ITEM_WRAPPER_KEY) {
        Some(Value::Object(fields)) => NotificationItem::from_fields(fields),
        _ => Err(AppError::MalformedPayload(format!(
            "entry has no {} object",
            ITEM_WRAPPER_KEY
        ))),
    }
}

fn at_index(index: usize, error: AppError) -> AppError {
    match error {
        AppError::MalformedPayload(msg) => {
            AppError::MalformedPayload(format!("{}[{}]: {}", ITEMS_KEY, index, msg))
        }
        other => other,
    }
}
