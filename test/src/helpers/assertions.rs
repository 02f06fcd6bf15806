/// Assert that a copy of an entity holds the same value for a property as
/// the real entity
#[macro_export]
macro_rules! assert_replicated {
    ($harness:expr, $copy:ident, $property:expr) => {
        assert_eq!(
            $harness.$copy.property($property),
            $harness.real.property($property),
            "{} of the {} copy differs from the real entity",
            $property,
            stringify!($copy)
        );
    };
}

/// Assert that a copy of an entity still holds the default for a property
#[macro_export]
macro_rules! assert_untouched {
    ($entity:expr, $property:expr, $default:expr) => {
        assert_eq!(
            $entity.property($property),
            Some(&$default),
            "{} should not have been replicated here",
            $property
        );
    };
}
