//! Tag identifiers and the registry mapping them to URIs.
//!
//! Tags travel through the event stream as small integers so events stay
//! `Copy`-cheap; the registry is the bidirectional mapping. A handful of ids
//! are reserved and always present; everything else is assigned on first
//! registration. The registry is an explicit parameter of every construction
//! and representation call rather than process-wide state.

use std::collections::HashMap;

use urlencoding::decode_binary;

/// Opaque tag identifier.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct TagId(u32);

impl TagId {
    /// `?`: unknown / to be resolved by the schema.
    pub const QUESTION: TagId = TagId(0);
    /// `!`: the non-specific tag.
    pub const EXCLAMATION: TagId = TagId(1);
    pub const STRING: TagId = TagId(2);
    pub const INTEGER: TagId = TagId(3);
    pub const FLOAT: TagId = TagId(4);
    pub const BOOLEAN: TagId = TagId(5);
    pub const NULL: TagId = TagId(6);
    /// Sentinel for a null string value.
    pub const NIL_STRING: TagId = TagId(7);
    /// Sentinel for a null sequence value.
    pub const NIL_SEQ: TagId = TagId(8);
    pub const SEQ: TagId = TagId(9);
    pub const MAP: TagId = TagId(10);
    pub const OMAP: TagId = TagId(11);
    pub const SET: TagId = TagId(12);

    pub fn index(self) -> u32 {
        self.0
    }
}

const RESERVED_URIS: [&str; 13] = [
    "?",
    "!",
    "tag:yaml.org,2002:str",
    "tag:yaml.org,2002:int",
    "tag:yaml.org,2002:float",
    "tag:yaml.org,2002:bool",
    "tag:yaml.org,2002:null",
    "!forge:nil:string",
    "!forge:nil:seq",
    "tag:yaml.org,2002:seq",
    "tag:yaml.org,2002:map",
    "tag:yaml.org,2002:omap",
    "tag:yaml.org,2002:set",
];

/// Bidirectional URI ↔ [`TagId`] mapping with lazy registration.
pub struct TagRegistry {
    uris: Vec<String>,
    ids: HashMap<String, TagId>,
    handles: HashMap<Vec<u8>, String>,
}

impl Default for TagRegistry {
    fn default() -> TagRegistry {
        let mut reg = TagRegistry {
            uris: Vec::with_capacity(RESERVED_URIS.len()),
            ids: HashMap::new(),
            handles: HashMap::new(),
        };
        for uri in RESERVED_URIS {
            reg.register(uri);
        }
        reg.handles.insert(b"!".to_vec(), "!".to_string());
        reg.handles
            .insert(b"!!".to_vec(), "tag:yaml.org,2002:".to_string());
        reg
    }
}

impl TagRegistry {
    pub fn new() -> TagRegistry {
        TagRegistry::default()
    }

    /// Register a URI, returning its id. Idempotent.
    pub fn register(&mut self, uri: &str) -> TagId {
        if let Some(id) = self.ids.get(uri) {
            return *id;
        }
        let id = TagId(self.uris.len() as u32);
        self.uris.push(uri.to_string());
        self.ids.insert(uri.to_string(), id);
        id
    }

    /// URI of a registered id.
    pub fn uri(&self, id: TagId) -> &str {
        &self.uris[id.0 as usize]
    }

    pub fn lookup(&self, uri: &str) -> Option<TagId> {
        self.ids.get(uri).copied()
    }

    /// Bind a `%TAG` handle to its URI prefix.
    pub fn register_handle(&mut self, handle: &[u8], prefix: &str) {
        self.handles.insert(handle.to_vec(), prefix.to_string());
    }

    /// Resolve a tag shorthand (handle + suffix, both as emitted by the
    /// lexer) into a registered tag. Percent-escapes in the suffix are
    /// decoded; an unknown handle falls back to the verbatim spelling.
    pub fn resolve_shorthand(&mut self, handle: &[u8], suffix: &[u8]) -> TagId {
        let decoded = decode_binary(suffix);
        let suffix = String::from_utf8_lossy(&decoded).into_owned();
        let uri = match self.handles.get(handle) {
            Some(prefix) if prefix == "!" && suffix.is_empty() => return TagId::EXCLAMATION,
            Some(prefix) => format!("{prefix}{suffix}"),
            None => format!("{}{suffix}", String::from_utf8_lossy(handle)),
        };
        self.register(&uri)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_ids_are_stable() {
        let reg = TagRegistry::new();
        assert_eq!(reg.uri(TagId::QUESTION), "?");
        assert_eq!(reg.uri(TagId::EXCLAMATION), "!");
        assert_eq!(reg.uri(TagId::STRING), "tag:yaml.org,2002:str");
        assert_eq!(reg.uri(TagId::NIL_SEQ), "!forge:nil:seq");
    }

    #[test]
    fn registration_is_idempotent() {
        let mut reg = TagRegistry::new();
        let a = reg.register("!mine");
        let b = reg.register("!mine");
        assert_eq!(a, b);
        assert_eq!(reg.uri(a), "!mine");
        assert_eq!(reg.lookup("!mine"), Some(a));
    }

    #[test]
    fn shorthand_resolution() {
        let mut reg = TagRegistry::new();
        let id = reg.resolve_shorthand(b"!!", b"str");
        assert_eq!(id, TagId::STRING);
        let local = reg.resolve_shorthand(b"!", b"thing");
        assert_eq!(reg.uri(local), "!thing");
        reg.register_handle(b"!e!", "tag:example.com,2024:");
        let named = reg.resolve_shorthand(b"!e!", b"kind");
        assert_eq!(reg.uri(named), "tag:example.com,2024:kind");
    }

    #[test]
    fn percent_escapes_decode() {
        let mut reg = TagRegistry::new();
        let id = reg.resolve_shorthand(b"!", b"a%20b");
        assert_eq!(reg.uri(id), "!a b");
    }
}
