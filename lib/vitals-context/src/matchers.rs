//! Matchers for filtering nodes in a context query.
//!
//! A [`Matcher`] tests a type-erased value. Most matchers only accept values of one type, and reject anything else:
//! [`TypedMatcher`] does the type check and then defers to a typed predicate. The functions in this module build the
//! matchers needed to navigate from a [`TreeNode`] to its context element, and from there to the element's identifier
//! or attributes, so that a filter on tree nodes can be expressed as, for example:
//!
//! ```
//! use vitals_context::matchers::{all_of, attributes, context, has_attribute, identifier, subtype_of, Matcher};
//!
//! struct Tier;
//!
//! let matcher = context(all_of(vec![
//!     Box::new(identifier(subtype_of::<Tier>())) as Box<dyn Matcher>,
//!     Box::new(attributes(has_attribute("name", "heap"))),
//! ]));
//! assert_eq!(
//!     matcher.to_string(),
//!     format!(
//!         "context with (all of (identifier that is {}, attributes with \"name\" = \"heap\"))",
//!         std::any::type_name::<Tier>()
//!     )
//! );
//! ```
use std::{any::Any, fmt, marker::PhantomData, sync::Arc};

use crate::{Attributes, ContextElement, Identifier, TreeNode};

/// A test against a type-erased value.
pub trait Matcher: fmt::Display + Send + Sync {
    /// Returns `true` if the value matches.
    fn matches(&self, value: &dyn Any) -> bool;
}

impl<M> Matcher for Box<M>
where
    M: Matcher + ?Sized,
{
    fn matches(&self, value: &dyn Any) -> bool {
        (**self).matches(value)
    }
}

/// A matcher for values of type `T`.
///
/// Values of any other type never match.
pub struct TypedMatcher<T, F> {
    description: String,
    predicate: F,
    _value: PhantomData<fn(&T)>,
}

impl<T, F> TypedMatcher<T, F>
where
    T: Any,
    F: Fn(&T) -> bool + Send + Sync,
{
    /// Creates a new `TypedMatcher` from the given predicate.
    ///
    /// The description is used when displaying the matcher, and so should read naturally after "nodes with".
    pub fn new(description: impl Into<String>, predicate: F) -> Self {
        Self {
            description: description.into(),
            predicate,
            _value: PhantomData,
        }
    }
}

impl<T, F> Matcher for TypedMatcher<T, F>
where
    T: Any,
    F: Fn(&T) -> bool + Send + Sync,
{
    fn matches(&self, value: &dyn Any) -> bool {
        value.downcast_ref::<T>().is_some_and(|value| (self.predicate)(value))
    }
}

impl<T, F> fmt::Display for TypedMatcher<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, prefix: &str, matchers: &[Box<dyn Matcher>]) -> fmt::Result {
    write!(f, "{} (", prefix)?;
    for (i, matcher) in matchers.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", matcher)?;
    }
    f.write_str(")")
}

/// Matches values that match every one of a set of matchers.
pub struct AllOf {
    matchers: Vec<Box<dyn Matcher>>,
}

impl Matcher for AllOf {
    fn matches(&self, value: &dyn Any) -> bool {
        self.matchers.iter().all(|matcher| matcher.matches(value))
    }
}

impl fmt::Display for AllOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, "all of", &self.matchers)
    }
}

/// Matches values that match at least one of a set of matchers.
pub struct AnyOf {
    matchers: Vec<Box<dyn Matcher>>,
}

impl Matcher for AnyOf {
    fn matches(&self, value: &dyn Any) -> bool {
        self.matchers.iter().any(|matcher| matcher.matches(value))
    }
}

impl fmt::Display for AnyOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_list(f, "any of", &self.matchers)
    }
}

/// Matches values that do not match a matcher.
pub struct Not<M> {
    matcher: M,
}

impl<M> Matcher for Not<M>
where
    M: Matcher,
{
    fn matches(&self, value: &dyn Any) -> bool {
        !self.matcher.matches(value)
    }
}

impl<M> fmt::Display for Not<M>
where
    M: Matcher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not ({})", self.matcher)
    }
}

/// Matches values matching all of the given matchers.
///
/// With no matchers, every value matches.
pub fn all_of(matchers: Vec<Box<dyn Matcher>>) -> AllOf {
    AllOf { matchers }
}

/// Matches values matching any of the given matchers.
///
/// With no matchers, no value matches.
pub fn any_of(matchers: Vec<Box<dyn Matcher>>) -> AnyOf {
    AnyOf { matchers }
}

/// Matches values not matching the given matcher.
pub fn not<M>(matcher: M) -> Not<M>
where
    M: Matcher,
{
    Not { matcher }
}

/// Matches tree nodes whose context element matches `matcher`.
///
/// The context element is handed to `matcher` as an `Arc<dyn ContextElement>`.
pub fn context<M>(matcher: M) -> impl Matcher
where
    M: Matcher + 'static,
{
    let description = format!("context with ({})", matcher);
    TypedMatcher::new(description, move |node: &TreeNode| matcher.matches(&node.context()))
}

/// Matches context elements whose identifier matches `matcher`.
///
/// The identifier is handed to `matcher` as an [`Identifier`].
pub fn identifier<M>(matcher: M) -> impl Matcher
where
    M: Matcher + 'static,
{
    let description = format!("identifier that is {}", matcher);
    TypedMatcher::new(description, move |element: &Arc<dyn ContextElement>| {
        matcher.matches(&element.identifier())
    })
}

/// Matches identifiers of the type `T`.
///
/// Rust types have no subtype relationships, so this only matches identifiers created from `T` itself.
pub fn subtype_of<T>() -> impl Matcher
where
    T: Any + ?Sized,
{
    let expected = Identifier::of::<T>();
    TypedMatcher::new(expected.name(), move |identifier: &Identifier| *identifier == expected)
}

/// Matches context elements whose attributes match `matcher`.
///
/// The attributes are handed to `matcher` as an [`Attributes`] map.
pub fn attributes<M>(matcher: M) -> impl Matcher
where
    M: Matcher + 'static,
{
    let description = format!("attributes with {}", matcher);
    TypedMatcher::new(description, move |element: &Arc<dyn ContextElement>| {
        matcher.matches(&element.attributes())
    })
}

/// Matches attribute maps holding `value` under `name`.
///
/// The attribute must hold a value of exactly type `V`.
pub fn has_attribute<V>(name: &str, value: V) -> impl Matcher
where
    V: Any + fmt::Debug + PartialEq + Send + Sync,
{
    let name = name.to_owned();
    let description = format!("{:?} = {:?}", name, value);
    TypedMatcher::new(description, move |attributes: &Attributes| {
        attributes
            .get(&name)
            .and_then(|attribute| attribute.downcast_ref::<V>())
            .is_some_and(|attribute| *attribute == value)
    })
}

/// Matches attribute maps with a value under `name` that matches `matcher`.
pub fn has_attribute_matching<M>(name: &str, matcher: M) -> impl Matcher
where
    M: Matcher + 'static,
{
    let name = name.to_owned();
    let description = format!("{:?} matching ({})", name, matcher);
    TypedMatcher::new(description, move |attributes: &Attributes| {
        attributes
            .get(&name)
            .is_some_and(|attribute| matcher.matches(&**attribute))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LazyContextElement;

    struct Heap;
    struct Disk;

    fn is_even() -> impl Matcher {
        TypedMatcher::new("even", |value: &u64| value % 2 == 0)
    }

    fn node<T: Any>(name: &'static str, size: u64) -> TreeNode {
        let element = LazyContextElement::new(Identifier::of::<T>())
            .with_value("name", name)
            .with_value("size", size);
        TreeNode::new(Arc::new(element))
    }

    #[test]
    fn typed_matcher_rejects_other_types() {
        let matcher = is_even();
        assert!(matcher.matches(&4u64));
        assert!(!matcher.matches(&3u64));
        assert!(!matcher.matches(&4u32));
        assert!(!matcher.matches(&"4"));
    }

    #[test]
    fn combinators() {
        let small = || Box::new(TypedMatcher::new("small", |value: &u64| *value < 10)) as Box<dyn Matcher>;
        let even = || Box::new(is_even()) as Box<dyn Matcher>;

        let both = all_of(vec![small(), even()]);
        assert!(both.matches(&4u64));
        assert!(!both.matches(&12u64));
        assert!(all_of(Vec::new()).matches(&12u64));

        let either = any_of(vec![small(), even()]);
        assert!(either.matches(&12u64));
        assert!(!either.matches(&13u64));
        assert!(!any_of(Vec::new()).matches(&12u64));

        assert!(not(is_even()).matches(&3u64));
        assert!(not(is_even()).matches(&"text"));

        assert_eq!(both.to_string(), "all of (small, even)");
        assert_eq!(not(either).to_string(), "not (any of (small, even))");
    }

    #[test]
    fn navigates_from_node_to_identifier() {
        let heap = node::<Heap>("heap", 10);
        let disk = node::<Disk>("disk", 100);

        let matcher = context(identifier(subtype_of::<Heap>()));
        assert!(matcher.matches(&heap));
        assert!(!matcher.matches(&disk));
        assert!(!matcher.matches(&heap.context()));
    }

    #[test]
    fn navigates_from_node_to_attributes() {
        let heap = node::<Heap>("heap", 10);
        let disk = node::<Disk>("disk", 100);

        let named = context(attributes(has_attribute("name", "disk")));
        assert!(!named.matches(&heap));
        assert!(named.matches(&disk));

        // Values must have exactly the attribute's type.
        let wrong_type = context(attributes(has_attribute("size", 10u32)));
        assert!(!wrong_type.matches(&heap));

        let missing = context(attributes(has_attribute("owner", "me")));
        assert!(!missing.matches(&heap));

        let sized = context(attributes(has_attribute_matching("size", is_even())));
        assert!(sized.matches(&heap));
        assert!(sized.matches(&disk));
        assert_eq!(sized.to_string(), "context with (attributes with \"size\" matching (even))");
    }
}
