//! Canonical fixed-width encoding of order terms and the order hash.
//!
//! Every integer is written little-endian at its declared width. Optional
//! accounts are a tag byte followed by 32 bytes when present; sequences are
//! a `u64` length followed by their elements. Engine and clients share this
//! one implementation, so two callers encoding the same terms always
//! produce the same bytes.

use sha2::{Digest, Sha256};

use crate::{
    Address, AssetKind, AuctionTerms, FeeTerms, MintId, OrderHash, OrderTerms, RatePoint,
    constants,
};

/// Fixed-width canonical serialization.
pub trait CanonicalEncode {
    /// Append this value's canonical bytes to `out`.
    fn encode_into(&self, out: &mut Vec<u8>);

    /// Canonical bytes of this value.
    fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_into(&mut out);
        out
    }
}

impl CanonicalEncode for u8 {
    fn encode_into(&self, out: &mut Vec<u8>) {
        out.push(*self);
    }
}

impl CanonicalEncode for u16 {
    fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

impl CanonicalEncode for u32 {
    fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

impl CanonicalEncode for u64 {
    fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

impl CanonicalEncode for Address {
    fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.as_bytes());
    }
}

impl CanonicalEncode for MintId {
    fn encode_into(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(self.as_bytes());
    }
}

impl<T: CanonicalEncode> CanonicalEncode for Option<T> {
    fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            None => out.push(0),
            Some(value) => {
                out.push(1);
                value.encode_into(out);
            }
        }
    }
}

impl<T: CanonicalEncode> CanonicalEncode for [T] {
    fn encode_into(&self, out: &mut Vec<u8>) {
        (self.len() as u64).encode_into(out);
        for item in self {
            item.encode_into(out);
        }
    }
}

impl CanonicalEncode for AssetKind {
    fn encode_into(&self, out: &mut Vec<u8>) {
        match self {
            Self::Native => out.push(0),
            Self::Fungible(_) => out.push(1),
        }
        self.mint().encode_into(out);
    }
}

impl CanonicalEncode for RatePoint {
    fn encode_into(&self, out: &mut Vec<u8>) {
        self.rate_bump.encode_into(out);
        self.time_delta.encode_into(out);
    }
}

impl CanonicalEncode for AuctionTerms {
    fn encode_into(&self, out: &mut Vec<u8>) {
        self.start_time.encode_into(out);
        self.duration.encode_into(out);
        self.initial_rate_bump.encode_into(out);
        self.points.as_slice().encode_into(out);
    }
}

impl CanonicalEncode for FeeTerms {
    fn encode_into(&self, out: &mut Vec<u8>) {
        self.protocol_fee.encode_into(out);
        self.integrator_fee.encode_into(out);
        self.surplus_percentage.encode_into(out);
        self.max_cancellation_premium.encode_into(out);
        self.protocol_dst_account.encode_into(out);
        self.integrator_dst_account.encode_into(out);
    }
}

impl CanonicalEncode for OrderTerms {
    fn encode_into(&self, out: &mut Vec<u8>) {
        self.id.encode_into(out);
        self.src_amount.encode_into(out);
        self.min_dst_amount.encode_into(out);
        self.estimated_dst_amount.encode_into(out);
        self.expiration_time.encode_into(out);
        self.src_asset.encode_into(out);
        self.dst_asset.encode_into(out);
        self.fee.encode_into(out);
        self.auction.encode_into(out);
        self.cancellation_auction_duration.encode_into(out);
    }
}

/// Compute the order hash.
///
/// Commits to every field of `terms` (including the fee recipient accounts
/// and both asset identities, which live inside the terms) and to the
/// maker's payout `receiver`.
#[must_use]
pub fn order_hash(terms: &OrderTerms, receiver: &Address) -> OrderHash {
    let mut payload = Vec::with_capacity(256);
    terms.encode_into(&mut payload);
    receiver.encode_into(&mut payload);

    let mut hasher = Sha256::new();
    hasher.update(constants::ORDER_HASH_DOMAIN);
    hasher.update(&payload);
    let result = hasher.finalize();
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&result);
    OrderHash(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FungibleMint;

    const NOW: u32 = 1_700_000_000;
    const RECEIVER: Address = Address([0x0D; 32]);

    fn base_terms() -> OrderTerms {
        let mut terms = OrderTerms::dummy(
            AssetKind::Native,
            AssetKind::fungible(MintId([0x55; 32])).unwrap(),
            NOW,
        );
        terms.id = 7;
        terms
    }

    #[test]
    fn integers_are_fixed_width_little_endian() {
        assert_eq!(0x0102u16.to_canonical_bytes(), vec![0x02, 0x01]);
        assert_eq!(1u32.to_canonical_bytes(), vec![1, 0, 0, 0]);
        assert_eq!(u64::MAX.to_canonical_bytes(), vec![0xFF; 8]);
    }

    #[test]
    fn full_u64_range_survives_encoding() {
        // 2^53 + 1 is the first integer a double-precision client would lose.
        let mut a = base_terms();
        a.src_amount = (1u64 << 53) + 1;
        let mut b = a.clone();
        b.src_amount = 1u64 << 53;
        assert_ne!(a.to_canonical_bytes(), b.to_canonical_bytes());
        assert_ne!(order_hash(&a, &RECEIVER), order_hash(&b, &RECEIVER));
    }

    #[test]
    fn encoded_length_is_stable() {
        let terms = base_terms();
        // id 4 + amounts 24 + expiration 4 + assets 2*33
        // + fee (2+2+1+8+1+1) + auction (4+4+2+8) + cancel duration 4
        assert_eq!(terms.to_canonical_bytes().len(), 4 + 24 + 4 + 66 + 15 + 18 + 4);
    }

    #[test]
    fn optional_account_tagging() {
        assert_eq!(None::<Address>.to_canonical_bytes(), vec![0]);
        let some = Some(Address([3; 32])).to_canonical_bytes();
        assert_eq!(some.len(), 33);
        assert_eq!(some[0], 1);
    }

    #[test]
    fn hash_is_deterministic() {
        let terms = base_terms();
        assert_eq!(order_hash(&terms, &RECEIVER), order_hash(&terms, &RECEIVER));
    }

    fn variant(base: &OrderTerms, change: impl FnOnce(&mut OrderTerms)) -> OrderTerms {
        let mut terms = base.clone();
        change(&mut terms);
        terms
    }

    #[test]
    fn every_field_changes_the_hash() {
        let base = base_terms();
        let reference = order_hash(&base, &RECEIVER);

        let variants = vec![
            variant(&base, |t| t.id += 1),
            variant(&base, |t| t.src_amount += 1),
            variant(&base, |t| t.min_dst_amount += 1),
            variant(&base, |t| t.estimated_dst_amount += 1),
            variant(&base, |t| t.expiration_time += 1),
            variant(&base, |t| {
                t.src_asset = AssetKind::fungible(MintId([0x66; 32])).unwrap();
            }),
            variant(&base, |t| t.dst_asset = AssetKind::Native),
            variant(&base, |t| t.fee.protocol_fee = 1),
            variant(&base, |t| t.fee.integrator_fee = 1),
            variant(&base, |t| t.fee.surplus_percentage = 1),
            variant(&base, |t| t.fee.max_cancellation_premium = 1),
            variant(&base, |t| t.fee.protocol_dst_account = Some(Address([1; 32]))),
            variant(&base, |t| t.fee.integrator_dst_account = Some(Address([2; 32]))),
            variant(&base, |t| t.auction.start_time += 1),
            variant(&base, |t| t.auction.duration += 1),
            variant(&base, |t| t.auction.initial_rate_bump += 1),
            variant(&base, |t| {
                t.auction.points.push(RatePoint {
                    rate_bump: 0,
                    time_delta: 0,
                });
            }),
            variant(&base, |t| t.cancellation_auction_duration += 1),
        ];

        for (i, variant) in variants.iter().enumerate() {
            assert_ne!(
                order_hash(variant, &RECEIVER),
                reference,
                "variant {i} did not change the hash"
            );
        }
        assert_ne!(order_hash(&base, &Address([0x0E; 32])), reference);
    }

    #[test]
    fn random_single_field_changes_never_collide() {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        let base = base_terms();
        let reference = order_hash(&base, &RECEIVER);
        for _ in 0..200 {
            let mut t = base.clone();
            let delta: u64 = rng.gen_range(1..u64::from(u32::MAX));
            t.src_amount = t.src_amount.wrapping_add(delta);
            assert_ne!(order_hash(&t, &RECEIVER), reference);
        }
    }

    #[test]
    fn native_and_fungible_tags_differ() {
        let native = AssetKind::Native.to_canonical_bytes();
        let fungible =
            AssetKind::Fungible(FungibleMint::new(MintId([0x55; 32])).unwrap()).to_canonical_bytes();
        assert_eq!(native[0], 0);
        assert_eq!(fungible[0], 1);
        assert_eq!(&native[1..], MintId::NATIVE.as_bytes());
    }
}
