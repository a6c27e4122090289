//! Adapter traits for the forwarder factory.
//!
//! The settlement bridge and the non-fungible registry are external collaborators. The pallet only
//! sees them through these traits, so a runtime can plug in any bridge endpoint or NFT pallet.

use core::marker::PhantomData;
use frame::prelude::*;
use polkadot_sdk::frame_support::traits::tokens::nonfungibles;
use primitives::{AssetKind, Balance};

/// Downstream settlement layer.
///
/// `deposit` pulls `amount` of `asset` out of `depositor` and records it under `recipient` on the
/// settlement layer. An `Err` means the bridge did not accept the deposit. The pallet runs every
/// deposit inside its own storage layer, so whatever the bridge touched before failing is undone.
pub trait SettlementBridge<AccountId> {
  fn deposit(
    depositor: &AccountId,
    asset: AssetKind,
    amount: Balance,
    recipient: &AccountId,
  ) -> DispatchResult;
}

/// Non-fungible item queries and transfers used by item recovery.
pub trait NftOps<AccountId, CollectionId, ItemId> {
  fn owner(collection: &CollectionId, item: &ItemId) -> Option<AccountId>;

  fn transfer(collection: &CollectionId, item: &ItemId, to: &AccountId) -> DispatchResult;
}

/// A bridge that accepts nothing. Every relay falls through to recovery.
impl<AccountId> SettlementBridge<AccountId> for () {
  fn deposit(_: &AccountId, _: AssetKind, _: Balance, _: &AccountId) -> DispatchResult {
    Err(DispatchError::Other("SettlementBridge not configured"))
  }
}

/// No-op `NftOps` for runtimes without a non-fungible pallet.
impl<AccountId, CollectionId, ItemId> NftOps<AccountId, CollectionId, ItemId> for () {
  fn owner(_: &CollectionId, _: &ItemId) -> Option<AccountId> {
    None
  }

  fn transfer(_: &CollectionId, _: &ItemId, _: &AccountId) -> DispatchResult {
    Err(DispatchError::Other("NftOps not configured"))
  }
}

/// Bridges any `nonfungibles::{Inspect, Transfer}` implementation (pallet-uniques, pallet-nfts)
/// into [`NftOps`].
pub struct NonfungiblesAdapter<N>(PhantomData<N>);

impl<AccountId, N>
  NftOps<
    AccountId,
    <N as nonfungibles::Inspect<AccountId>>::CollectionId,
    <N as nonfungibles::Inspect<AccountId>>::ItemId,
  > for NonfungiblesAdapter<N>
where
  N: nonfungibles::Inspect<AccountId> + nonfungibles::Transfer<AccountId>,
{
  fn owner(
    collection: &<N as nonfungibles::Inspect<AccountId>>::CollectionId,
    item: &<N as nonfungibles::Inspect<AccountId>>::ItemId,
  ) -> Option<AccountId> {
    <N as nonfungibles::Inspect<AccountId>>::owner(collection, item)
  }

  fn transfer(
    collection: &<N as nonfungibles::Inspect<AccountId>>::CollectionId,
    item: &<N as nonfungibles::Inspect<AccountId>>::ItemId,
    to: &AccountId,
  ) -> DispatchResult {
    <N as nonfungibles::Transfer<AccountId>>::transfer(collection, item, to)
  }
}
