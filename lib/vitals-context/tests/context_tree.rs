use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use exponential_histogram::{ExponentialHistogram, Window};
use proptest::prelude::*;
use rand::{rngs::SmallRng, Rng as _, SeedableRng as _};
use vitals_context::{
    matchers::{any_of, attributes, context, has_attribute, has_attribute_matching, identifier, not, subtype_of},
    query::{Descendants, Filter},
    ContextElement, ContextRegistry, Identifier, LazyContextElement, Matcher, Query, QueryBuilder, TreeNode,
};

struct Cache;
struct Statistic;
struct Tier;

fn named<T: 'static>(name: &'static str) -> Arc<dyn ContextElement> {
    Arc::new(LazyContextElement::new(Identifier::of::<T>()).with_value("name", name))
}

#[test]
fn statistics_are_read_through_lazy_attributes() {
    let registry = ContextRegistry::new();
    let cache = registry.register(registry.root(), named::<Cache>("users"));

    let histogram = Arc::new(Mutex::new(ExponentialHistogram::new(0.1, Window::Bounded(10)).unwrap()));
    let observed = Arc::clone(&histogram);
    let statistic = LazyContextElement::new(Identifier::of::<Statistic>())
        .with_value("name", "gets")
        .with_attribute("count", move || observed.lock().unwrap().count());
    registry.register(&cache, Arc::new(statistic));

    let query = QueryBuilder::new()
        .descendants()
        .filter(context(identifier(subtype_of::<Statistic>())))
        .filter(context(attributes(has_attribute("name", "gets"))))
        .build();
    let node = registry.query_for_singleton(query.as_ref()).unwrap();
    let count = || *node.context().attributes()["count"].downcast_ref::<u64>().unwrap();

    assert_eq!(count(), 0);
    for t in 0..5 {
        histogram.lock().unwrap().insert(t);
    }
    assert_eq!(count(), 5);

    histogram.lock().unwrap().expire(100);
    assert_eq!(count(), 0);
}

#[test]
fn query_by_attribute_value() {
    let registry = ContextRegistry::new();
    for name in ["users", "sessions"] {
        let cache = registry.register(registry.root(), named::<Cache>(name));
        for tier in ["heap", "offheap", "disk"] {
            registry.register(&cache, named::<Tier>(tier));
        }
    }

    let sessions_heap = QueryBuilder::new()
        .children()
        .filter(context(attributes(has_attribute("name", "sessions"))))
        .children()
        .filter(context(attributes(has_attribute("name", "heap"))))
        .build();
    let heap = registry.query_for_singleton(sessions_heap.as_ref()).unwrap();
    assert!(heap.context().identifier().is::<Tier>());
    assert!(heap.children().is_empty());

    let not_heap_tiers = QueryBuilder::new()
        .descendants()
        .filter(context(identifier(subtype_of::<Tier>())))
        .filter(not(context(attributes(has_attribute("name", "heap")))))
        .build();
    assert_eq!(registry.query(not_heap_tiers.as_ref()).len(), 4);

    let short_names = ShortName::shorter_than(5);
    let short_or_users = QueryBuilder::new()
        .descendants()
        .filter(any_of(vec![
            Box::new(context(attributes(has_attribute_matching("name", short_names)))) as Box<dyn Matcher>,
            Box::new(context(attributes(has_attribute("name", "users")))),
        ]))
        .build();
    // "heap" and "disk" under both caches, plus the "users" cache.
    assert_eq!(registry.query(short_or_users.as_ref()).len(), 5);
}

struct ShortName {
    limit: usize,
}

impl ShortName {
    fn shorter_than(limit: usize) -> Self {
        Self { limit }
    }
}

impl Matcher for ShortName {
    fn matches(&self, value: &dyn std::any::Any) -> bool {
        value.downcast_ref::<&'static str>().is_some_and(|name| name.len() < self.limit)
    }
}

impl std::fmt::Display for ShortName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "names shorter than {}", self.limit)
    }
}

#[test]
fn removed_nodes_are_no_longer_found() {
    let registry = ContextRegistry::new();
    let cache = registry.register(registry.root(), named::<Cache>("users"));
    let tier = registry.register(&cache, named::<Tier>("heap"));

    let tiers = QueryBuilder::new()
        .descendants()
        .filter(context(identifier(subtype_of::<Tier>())))
        .build();
    assert_eq!(registry.query_for_singleton(tiers.as_ref()), Ok(tier.clone()));

    assert!(cache.remove_child(&tier));
    assert!(registry.query(tiers.as_ref()).is_empty());
}

#[test]
fn custom_stages_chain_with_builtin_ones() {
    let registry = ContextRegistry::new();
    let cache = registry.register(registry.root(), named::<Cache>("users"));
    registry.register(&cache, named::<Tier>("heap"));

    let query = QueryBuilder::new()
        .chain(Descendants)
        .chain(Filter::new(context(identifier(subtype_of::<Cache>()))))
        .children()
        .build();
    let matched = registry.query(query.as_ref());
    assert_eq!(matched.len(), 1);
    assert!(matched.iter().all(|node| node.context().identifier().is::<Tier>()));
}

fn random_tree(rng: &mut SmallRng, size: usize) -> (TreeNode, Vec<TreeNode>) {
    let root = TreeNode::new(named::<Cache>("root"));
    let mut nodes = vec![root.clone()];
    for _ in 1..size {
        let parent = nodes[rng.random_range(0..nodes.len())].clone();
        let child = TreeNode::new(named::<Tier>("tier"));
        parent.add_child(child.clone());
        nodes.push(child);
    }
    (root, nodes)
}

proptest! {
    #[test]
    fn property_test_descendants_reach_every_node(seed in any::<u64>(), size in 1usize..200) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let (root, nodes) = random_tree(&mut rng, size);

        let descendants = Descendants.execute(&HashSet::from([root.clone()]));
        prop_assert_eq!(descendants.len(), size - 1);
        prop_assert!(!descendants.contains(&root));
        prop_assert!(nodes[1..].iter().all(|node| descendants.contains(node)));
    }
}
