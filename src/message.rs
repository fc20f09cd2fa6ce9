//! The plumbing envelope exchanged between `plumb` and the daemon.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::MessageError;

/// A key/value attribute attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

/// One plumbing event: a piece of data plus where it came from.
///
/// Field names on the wire are `Data`, `Dst`, `Src`, `Type`, `Wdir` and
/// `Attr`. Missing fields decode as empty, and a `null` attribute list
/// decodes as an empty one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Message {
    #[serde(deserialize_with = "null_as_empty")]
    pub attr: Vec<Attribute>,
    /// Body text.
    pub data: String,
    /// Destination port name.
    pub dst: String,
    /// Source application.
    pub src: String,
    /// Content type tag.
    #[serde(rename = "Type")]
    pub kind: String,
    /// Working directory the message was sent from.
    pub wdir: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Attribute>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Attribute>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Message {
    /// Decode one envelope.
    pub fn decode(bytes: &[u8]) -> Result<Self, MessageError> {
        serde_json::from_slice(bytes).map_err(MessageError::Decode)
    }

    /// Encode as a single newline-terminated JSON line.
    pub fn encode(&self) -> Result<Vec<u8>, MessageError> {
        let mut bytes = serde_json::to_vec(self).map_err(MessageError::Encode)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

/// Parse a space-separated `key=value` attribute list as given to `plumb -a`.
pub fn parse_attributes(list: &str) -> Result<Vec<Attribute>, MessageError> {
    list.split_whitespace()
        .map(|token| match token.split_once('=') {
            Some((key, value)) if !key.is_empty() && !value.is_empty() => Ok(Attribute {
                key: key.to_string(),
                value: value.to_string(),
            }),
            _ => Err(MessageError::InvalidAttribute(token.to_string())),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_client_envelope() {
        let raw = br#"{"Attr":[{"Key":"action","Value":"showfile"}],"Data":"report.txt","Dst":"edit","Src":"plumb","Type":"text","Wdir":"/home/glenda"}"#;
        let msg = Message::decode(raw).unwrap();
        assert_eq!(msg.data, "report.txt");
        assert_eq!(msg.dst, "edit");
        assert_eq!(msg.kind, "text");
        assert_eq!(msg.wdir, "/home/glenda");
        assert_eq!(
            msg.attr,
            vec![Attribute {
                key: "action".into(),
                value: "showfile".into()
            }]
        );
    }

    #[test]
    fn null_attributes_and_missing_fields_decode_empty() {
        let msg = Message::decode(br#"{"Attr":null,"Data":"hi"}"#).unwrap();
        assert!(msg.attr.is_empty());
        assert_eq!(msg.data, "hi");
        assert_eq!(msg.src, "");
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            Message::decode(b"not json"),
            Err(MessageError::Decode(_))
        ));
    }

    #[test]
    fn concatenated_envelopes_do_not_decode() {
        let one = Message {
            data: "a".into(),
            ..Default::default()
        }
        .encode()
        .unwrap();
        let mut two = one.clone();
        two.extend_from_slice(&one);
        assert!(Message::decode(&two).is_err());
    }

    #[test]
    fn encode_uses_wire_field_names() {
        let msg = Message {
            kind: "text".into(),
            ..Default::default()
        };
        let encoded = String::from_utf8(msg.encode().unwrap()).unwrap();
        assert!(encoded.contains(r#""Type":"text""#));
        assert!(encoded.ends_with('\n'));
        assert_eq!(Message::decode(encoded.as_bytes()).unwrap(), msg);
    }

    #[test]
    fn parses_attribute_list() {
        let attrs = parse_attributes("action=showfile  addr=42").unwrap();
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[1].key, "addr");
        assert_eq!(attrs[1].value, "42");
    }

    #[test]
    fn rejects_inconsistent_attributes() {
        for bad in ["a=", "=b", "ab", "k=v junk"] {
            assert!(
                matches!(parse_attributes(bad), Err(MessageError::InvalidAttribute(_))),
                "{bad} should be rejected"
            );
        }
    }
}
