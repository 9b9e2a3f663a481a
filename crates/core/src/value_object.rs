//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**: two instances
/// holding the same attributes are interchangeable. A coupon code is one; the
/// coupon that carries it is not (it has an id).
///
/// Construct value objects through a validating constructor so that an invalid
/// instance can never be observed.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
