use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{Map, Value as Json};

use crate::node::Node;
use crate::store::{StoreError, View};

use super::error::ServiceError;

/// Decode a base64 request payload into query text.
pub fn decode_query(encoded: &str) -> Result<String, ServiceError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| ServiceError::DecodeFailed(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ServiceError::DecodeFailed(e.to_string()))
}

/// Encode query text the way a client sends it.
pub fn encode_query(text: &str) -> String {
    STANDARD.encode(text)
}

/// Decode a base64 result payload back into JSON text.
pub fn decode_result(encoded: &str) -> Result<String, ServiceError> {
    decode_query(encoded)
}

/// One result item: the payload fields plus `kind`, `key`, `_path` and
/// `_version`.
pub fn node_json(view: &View, node: &Node) -> Result<Json, StoreError> {
    let mut item: Map<String, Json> = node
        .payload
        .iter()
        .map(|(name, value)| (name.clone(), value.to_json()))
        .collect();
    item.insert("kind".into(), Json::from(node.kind()));
    item.insert("key".into(), Json::from(node.id.as_str()));
    item.insert("_path".into(), view.path(&node.id)?.map_or(Json::Null, Json::from));
    item.insert("_version".into(), Json::from(node.version));
    Ok(Json::Object(item))
}

pub(crate) fn encode_nodes(view: &View, nodes: &[Node]) -> Result<String, ServiceError> {
    let items = nodes
        .iter()
        .map(|node| node_json(view, node))
        .collect::<Result<Vec<_>, _>>()?;
    let text = serde_json::to_string(&items)?;
    Ok(STANDARD.encode(text))
}
