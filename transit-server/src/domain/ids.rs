//! Identifier newtypes for timetable entities.
//!
//! GTFS identifiers are arbitrary strings. Wrapping them keeps stop ids,
//! trip ids, route ids and shape ids from being mixed up, and the `Arc<str>`
//! backing makes clones cheap enough to store in search results.

use std::fmt;
use std::sync::Arc;

macro_rules! identifier {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, PartialEq, Eq, Hash)]
        pub struct $name(Arc<str>);

        impl $name {
            pub fn new(s: impl AsRef<str>) -> Self {
                Self(s.as_ref().into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }
    };
}

identifier! {
    /// Identifier of a timetable stop.
    StopId
}
identifier! {
    /// Identifier of one scheduled trip of a vehicle.
    TripId
}
identifier! {
    /// Identifier of a transit route (line).
    RouteId
}
identifier! {
    /// Identifier of a shape polyline shared by one or more trips.
    ShapeId
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn equality_and_hash() {
        let a = StopId::new("stop_1");
        let b = StopId::new("stop_1");
        let c = StopId::new("stop_2");

        assert_eq!(a, b);
        assert_ne!(a, c);

        let mut map = HashMap::new();
        map.insert(a.clone(), 1);
        assert_eq!(map.get(&b), Some(&1));
        assert_eq!(map.get(&c), None);
    }

    #[test]
    fn display_and_debug() {
        let id = TripId::new("trip_9");
        assert_eq!(id.to_string(), "trip_9");
        assert_eq!(format!("{id:?}"), "TripId(trip_9)");
    }

    #[test]
    fn conversions() {
        let _a: RouteId = "r1".into();
        let _b: ShapeId = String::from("s1").into();
    }
}
