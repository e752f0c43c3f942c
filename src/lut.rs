//! Look-Up Table (LUT) of classic distance multisets with known reconstructions

use lazy_static::lazy_static;

/// A built-in distance multiset and one point set that produces it
#[derive(Debug, Clone)]
pub struct Instance {
    pub name: &'static str,
    pub distances: Vec<u64>,
    pub known_points: Vec<u64>,
}

lazy_static! {
    /// Instances run by `turnpike --demo`
    static ref INSTANCES: Vec<Instance> = vec![
        Instance {
            name: "six-points",
            distances: vec![1, 2, 2, 2, 3, 3, 3, 4, 5, 5, 5, 6, 7, 8, 10],
            known_points: vec![0, 3, 5, 6, 8, 10],
        },
        Instance {
            name: "five-points",
            distances: vec![1, 1, 2, 2, 6, 7, 8, 8, 9, 10],
            known_points: vec![0, 2, 8, 9, 10],
        },
        Instance {
            name: "two-families",
            distances: vec![11, 10, 9, 8, 7, 6, 6, 5, 5, 4, 3, 2, 2, 1, 1],
            known_points: vec![0, 3, 5, 9, 10, 11],
        },
    ];
}

/// Returns all built-in instances
pub fn instances() -> &'static [Instance] {
    &INSTANCES
}

/// Returns the built-in instance with the given name, if any
pub fn get_instance(name: &str) -> Option<&'static Instance> {
    INSTANCES.iter().find(|instance| instance.name == name)
}
