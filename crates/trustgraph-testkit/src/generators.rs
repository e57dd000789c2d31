//! Proptest generators for property-based testing.

use proptest::prelude::*;

use trustgraph_core::{KeyId, Keypair, Namespace, PermissionMask, PublicKey};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate a random public key.
pub fn public_key() -> impl Strategy<Value = PublicKey> {
    keypair().prop_map(|kp| kp.public_key())
}

/// Generate a random KeyId that need not belong to any keypair.
pub fn key_id() -> impl Strategy<Value = KeyId> {
    any::<[u8; 32]>().prop_map(KeyId::from_bytes)
}

/// Generate a single namespace segment.
pub fn segment() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9_-]{0,11}".prop_map(String::from)
}

/// Generate a valid namespace of one to five segments.
pub fn namespace() -> impl Strategy<Value = Namespace> {
    prop::collection::vec(segment(), 1..=5).prop_map(|segments| {
        Namespace::new(&segments.join("/")).expect("generated segments are valid")
    })
}

/// Generate a namespace together with one of its descendants.
pub fn namespace_with_descendant() -> impl Strategy<Value = (Namespace, Namespace)> {
    (namespace(), prop::collection::vec(segment(), 0..=3)).prop_map(|(parent, extra)| {
        let mut child = parent.as_str().to_string();
        for seg in extra {
            child.push('/');
            child.push_str(&seg);
        }
        let child = Namespace::new(&child).expect("generated segments are valid");
        (parent, child)
    })
}

/// Generate a non-empty mask of defined bits.
pub fn permission_mask() -> impl Strategy<Value = PermissionMask> {
    (1u32..=PermissionMask::all().bits()).prop_map(PermissionMask::from_bits_truncate)
}

/// Generate a non-empty submask of `mask`.
pub fn submask(mask: PermissionMask) -> impl Strategy<Value = PermissionMask> {
    let bits = mask.bits();
    (1u32..=bits)
        .prop_filter("must be a submask", move |b| b & !bits == 0)
        .prop_map(PermissionMask::from_bits_truncate)
}

/// Generate a time within a few years of the reference time.
pub fn timestamp() -> impl Strategy<Value = i64> {
    1_600_000_000_000i64..=1_800_000_000_000i64
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn test_descendant_is_within_parent((parent, child) in namespace_with_descendant()) {
            prop_assert!(child.is_within(&parent));
            prop_assert!(child.depth() >= parent.depth());
        }

        #[test]
        fn test_submask_is_contained(
            (mask, sub) in permission_mask().prop_flat_map(|m| (Just(m), submask(m)))
        ) {
            prop_assert!(!sub.is_empty());
            prop_assert!(mask.contains(sub));
        }

        #[test]
        fn test_generated_namespace_round_trips(ns in namespace()) {
            let reparsed = Namespace::new(ns.as_str()).unwrap();
            prop_assert_eq!(reparsed, ns);
        }
    }
}
