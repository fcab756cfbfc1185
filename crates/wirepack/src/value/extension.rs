use bytes::Bytes;

/// An application-defined type tag plus an opaque payload.
///
/// The codec never interprets the tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Extension {
    type_tag: i8,
    data: Bytes,
}

impl Extension {
    pub fn new(type_tag: i8, data: impl Into<Bytes>) -> Self {
        Extension {
            type_tag,
            data: data.into(),
        }
    }

    pub fn type_tag(&self) -> i8 {
        self.type_tag
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_parts(self) -> (i8, Bytes) {
        (self.type_tag, self.data)
    }
}
