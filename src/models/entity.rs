use crate::pagination::{EntityMetadata, FieldValue};

/// A persisted record that list endpoints can paginate.
pub trait Entity: Clone + Send + Sync + Unpin + 'static {
    const METADATA: EntityMetadata;

    fn id(&self) -> i64;

    /// Value of an API field declared in `METADATA`; `None` for unknown names
    fn field_value(&self, field: &str) -> Option<FieldValue>;
}
