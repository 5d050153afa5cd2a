use std::collections::BTreeMap;

pub type AnyValue = serde_json::Value;

/// `x-...` extension fields captured from the document.
///
/// Extra fields land in this map; the `x-` prefix is checked at validation time.
pub type Extensions = BTreeMap<String, serde_json::Value>;
