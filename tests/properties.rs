use phash_eval::{Fingerprint, SUPPORTED_HASH_SIZES, aggregate, classify, compare, distance};
use proptest::prelude::*;

fn fingerprint() -> impl Strategy<Value = Fingerprint> {
    prop::sample::select(SUPPORTED_HASH_SIZES.to_vec()).prop_flat_map(|size| {
        prop::collection::vec(any::<bool>(), size * size)
            .prop_map(move |bits| Fingerprint::from_bits(size, bits).unwrap())
    })
}

fn pair() -> impl Strategy<Value = (Fingerprint, Fingerprint)> {
    prop::sample::select(SUPPORTED_HASH_SIZES.to_vec()).prop_flat_map(|size| {
        let bits = || prop::collection::vec(any::<bool>(), size * size);
        (bits(), bits()).prop_map(move |(a, b)| {
            (
                Fingerprint::from_bits(size, a).unwrap(),
                Fingerprint::from_bits(size, b).unwrap(),
            )
        })
    })
}

fn triple() -> impl Strategy<Value = (Fingerprint, Fingerprint, Fingerprint)> {
    prop::sample::select(SUPPORTED_HASH_SIZES.to_vec()).prop_flat_map(|size| {
        let bits = || prop::collection::vec(any::<bool>(), size * size);
        (bits(), bits(), bits()).prop_map(move |(a, b, c)| {
            (
                Fingerprint::from_bits(size, a).unwrap(),
                Fingerprint::from_bits(size, b).unwrap(),
                Fingerprint::from_bits(size, c).unwrap(),
            )
        })
    })
}

proptest! {
    #[test]
    fn self_distance_is_zero(f in fingerprint()) {
        let d = distance(&f, &f).unwrap();
        prop_assert_eq!(d.hamming, 0);
        prop_assert_eq!(d.normalized, 1.0);
    }

    #[test]
    fn distance_is_symmetric_and_bounded((a, b) in pair()) {
        let ab = distance(&a, &b).unwrap();
        let ba = distance(&b, &a).unwrap();
        prop_assert_eq!(ab, ba);
        prop_assert!((0.0..=1.0).contains(&ab.normalized));
        prop_assert!(ab.hamming as usize <= a.bit_len());
    }

    #[test]
    fn triangle_inequality((a, b, c) in triple()) {
        let ab = distance(&a, &b).unwrap().hamming;
        let bc = distance(&b, &c).unwrap().hamming;
        let ac = distance(&a, &c).unwrap().hamming;
        prop_assert!(ac <= ab + bc, "{} > {} + {}", ac, ab, bc);
    }

    #[test]
    fn complement_is_maximally_distant(f in fingerprint()) {
        let d = distance(&f, &f.complement()).unwrap();
        prop_assert_eq!(d.hamming as usize, f.bit_len());
        prop_assert_eq!(d.normalized, 0.0);
    }

    #[test]
    fn aggregate_of_copies_is_identity(f in fingerprint(), copies in 1usize..6) {
        let set = vec![f.clone(); copies];
        prop_assert_eq!(aggregate(&set).unwrap(), f);
    }

    #[test]
    fn even_split_resolves_to_zero(f in fingerprint()) {
        let baseline = aggregate(&[f.clone(), f.complement()]).unwrap();
        prop_assert_eq!(baseline.count_ones(), 0);
    }

    #[test]
    fn aggregate_ignores_order((a, b) in pair(), c_bit in any::<bool>()) {
        let c = if c_bit { a.clone() } else { b.clone() };
        let forward = aggregate(&[a.clone(), b.clone(), c.clone()]).unwrap();
        let backward = aggregate(&[c, b, a]).unwrap();
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn classify_is_inclusive(threshold in 0.01f64..0.99) {
        prop_assert!(classify(threshold, threshold));
        prop_assert!(!classify(threshold - 1e-9, threshold));
    }

    #[test]
    fn compare_agrees_with_classify((a, b) in pair(), threshold in 0.01f64..0.99) {
        let result = compare(&a, &b, threshold).unwrap();
        prop_assert_eq!(result.valid, classify(result.normalized, threshold));
    }

    #[test]
    fn token_roundtrip(f in fingerprint()) {
        let token = f.to_token();
        prop_assert_eq!(token.len(), f.bit_len().div_ceil(4));
        prop_assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        prop_assert_eq!(Fingerprint::from_token(&token, f.size()).unwrap(), f);
    }
}

#[test]
fn single_flipped_bit_in_two_way_split_is_zero() {
    let zeros = Fingerprint::from_fn(8, |_, _| false);
    let one = Fingerprint::from_fn(8, |r, c| r == 3 && c == 5);
    let baseline = aggregate(&[zeros, one]).unwrap();
    assert!(!baseline.bit(3, 5));
}
