use std::{
    any::{type_name, Any, TypeId},
    collections::{BTreeMap, HashMap},
    fmt, hash,
    sync::Arc,
};

/// A type-erased attribute value.
pub type AttributeValue = Arc<dyn Any + Send + Sync>;

/// The attributes of a context element, by name.
pub type Attributes = HashMap<String, AttributeValue>;

/// The type of the thing a context element describes.
///
/// Identifiers compare equal when they were created from the same type. The type name is only kept for display
/// purposes.
#[derive(Clone, Copy)]
pub struct Identifier {
    type_id: TypeId,
    name: &'static str,
}

impl Identifier {
    /// Returns the identifier for `T`.
    pub fn of<T>() -> Self
    where
        T: Any + ?Sized,
    {
        Self {
            type_id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Returns `true` if this identifier was created from `T`.
    pub fn is<T>(&self) -> bool
    where
        T: Any + ?Sized,
    {
        self.type_id == TypeId::of::<T>()
    }

    /// Returns the name of the type this identifier was created from.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for Identifier {}

impl hash::Hash for Identifier {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Identifier").field(&self.name).finish()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Describes a place in the context tree.
pub trait ContextElement: Send + Sync {
    /// Returns the type of the thing this element describes.
    fn identifier(&self) -> Identifier;

    /// Returns the current attributes of this element.
    fn attributes(&self) -> Attributes;
}

type Supplier = Box<dyn Fn() -> AttributeValue + Send + Sync>;

/// A context element whose attributes are computed on demand.
///
/// Each attribute is backed by a supplier, and every call to [`attributes`][ContextElement::attributes] runs all of
/// them again. Nothing is cached, so attributes such as the current value of a statistic are always fresh when
/// queried.
pub struct LazyContextElement {
    identifier: Identifier,
    suppliers: BTreeMap<String, Supplier>,
}

impl LazyContextElement {
    /// Creates a new `LazyContextElement` with no attributes.
    pub fn new(identifier: Identifier) -> Self {
        Self {
            identifier,
            suppliers: BTreeMap::new(),
        }
    }

    /// Adds an attribute computed by calling `supplier`, replacing any existing attribute with the same name.
    pub fn with_attribute<F, V>(mut self, name: impl Into<String>, supplier: F) -> Self
    where
        F: Fn() -> V + Send + Sync + 'static,
        V: Any + Send + Sync,
    {
        let supplier: Supplier = Box::new(move || -> AttributeValue { Arc::new(supplier()) });
        self.suppliers.insert(name.into(), supplier);
        self
    }

    /// Adds an attribute with a fixed value, replacing any existing attribute with the same name.
    pub fn with_value<V>(mut self, name: impl Into<String>, value: V) -> Self
    where
        V: Any + Send + Sync,
    {
        let value: AttributeValue = Arc::new(value);
        let supplier: Supplier = Box::new(move || Arc::clone(&value));
        self.suppliers.insert(name.into(), supplier);
        self
    }
}

impl ContextElement for LazyContextElement {
    fn identifier(&self) -> Identifier {
        self.identifier
    }

    fn attributes(&self) -> Attributes {
        self.suppliers
            .iter()
            .map(|(name, supplier)| (name.clone(), supplier()))
            .collect()
    }
}

impl fmt::Display for LazyContextElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {{", self.identifier)?;
        for (i, name) in self.suppliers.keys().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(name)?;
        }
        f.write_str("}")
    }
}

impl fmt::Debug for LazyContextElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyContextElement")
            .field("identifier", &self.identifier)
            .field("attributes", &self.suppliers.keys().collect::<Vec<_>>())
            .finish()
    }
}
