use codec::{Decode, DecodeWithMemTracking, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

/// Asset identifier accepted by every forwarding and recovery call.
///
/// - `Native`: the base network asset (managed by pallet-balances). It plays the role of the
///   base-asset sentinel: there is no token contract behind it.
/// - `Local(u32)` / `Foreign(u32)`: fungible tokens managed by pallet-assets.
#[derive(
  Clone,
  Copy,
  Debug,
  Decode,
  DecodeWithMemTracking,
  Default,
  Encode,
  Eq,
  MaxEncodedLen,
  Ord,
  PartialEq,
  PartialOrd,
  TypeInfo,
  Serialize,
  Deserialize,
)]
pub enum AssetKind {
  /// Native token managed by pallet-balances
  #[default]
  Native,
  /// Local asset managed by pallet-assets
  Local(u32),
  /// Foreign asset managed by pallet-assets (0xF... namespace)
  Foreign(u32),
}

impl AssetKind {
  pub fn is_native(&self) -> bool {
    matches!(self, AssetKind::Native)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn native_is_the_default_sentinel() {
    assert_eq!(AssetKind::default(), AssetKind::Native);
    assert!(AssetKind::Native.is_native());
    assert!(!AssetKind::Local(7).is_native());
    assert!(!AssetKind::Foreign(7).is_native());
  }

  #[test]
  fn ordering_keeps_native_first() {
    let mut assets = [
      AssetKind::Foreign(1),
      AssetKind::Local(2),
      AssetKind::Native,
    ];
    assets.sort();
    assert_eq!(assets[0], AssetKind::Native);
    assert_eq!(assets[1], AssetKind::Local(2));
  }
}
