extern crate alloc;

use crate as pallet_forwarder_factory;
use codec::Encode;
use polkadot_sdk::frame_support::traits::fungible::Mutate as NativeMutate;
use polkadot_sdk::frame_support::traits::fungibles::Mutate as FungiblesMutate;
use polkadot_sdk::frame_support::traits::tokens::Preservation;
use polkadot_sdk::frame_support::{
  PalletId, construct_runtime, derive_impl,
  storage::unhashed,
  traits::{ConstU32, ConstU128, Get},
};
use polkadot_sdk::frame_system;
use polkadot_sdk::sp_runtime::{
  BuildStorage, DispatchError, DispatchResult, TokenError,
  testing::H256,
  traits::{BlakeTwo256, IdentityLookup},
};
use primitives::{AssetKind, Balance, pallet_ids::FORWARDER_FACTORY_PALLET_ID};
use std::cell::RefCell;
use std::collections::BTreeSet;

pub const ALICE: u64 = 1;
pub const BOB: u64 = 2;
pub const CHARLIE: u64 = 3;
pub const BRIDGE_ACCOUNT: u64 = 777;

pub const UNIT: Balance = 1_000_000_000_000;
pub const INITIAL_BALANCE: Balance = 100 * UNIT;
/// pallet-assets id of the test token
pub const TOKEN_ID: u32 = 1;
pub const TOKEN: AssetKind = AssetKind::Local(TOKEN_ID);

// Only switches live here. Anything the bridge or the item registry records goes to storage so
// nested rollbacks undo it.
thread_local! {
    pub static BRIDGE_REJECTS: RefCell<BTreeSet<AssetKind>> = const { RefCell::new(BTreeSet::new()) };
    pub static BRIDGE_SHORT_COLLECT: RefCell<bool> = const { RefCell::new(false) };
}

pub fn set_bridge_rejects(asset: AssetKind, reject: bool) {
  BRIDGE_REJECTS.with(|r| {
    let mut rejects = r.borrow_mut();
    if reject {
      rejects.insert(asset);
    } else {
      rejects.remove(&asset);
    }
  });
}

pub fn set_bridge_short_collect(short: bool) {
  BRIDGE_SHORT_COLLECT.with(|s| *s.borrow_mut() = short);
}

fn bridge_key(recipient: &u64, asset: AssetKind) -> alloc::vec::Vec<u8> {
  (b"mock/bridge", recipient, asset).encode()
}

fn item_key(collection: &u32, item: &u32) -> alloc::vec::Vec<u8> {
  (b"mock/items", collection, item).encode()
}

/// Amount the bridge has credited to `recipient` on the settlement layer
pub fn bridge_balance(recipient: u64, asset: AssetKind) -> Balance {
  unhashed::get_or_default::<Balance>(&bridge_key(&recipient, asset))
}

pub fn set_item_owner(collection: u32, item: u32, owner: u64) {
  unhashed::put(&item_key(&collection, &item), &owner);
}

pub fn item_owner(collection: u32, item: u32) -> Option<u64> {
  unhashed::get::<u64>(&item_key(&collection, &item))
}

type Block = frame_system::mocking::MockBlock<Test>;

construct_runtime!(
  pub struct Test {
    System: frame_system,
    Balances: polkadot_sdk::pallet_balances,
    Assets: polkadot_sdk::pallet_assets,
    ForwarderFactory: pallet_forwarder_factory,
  }
);

#[derive_impl(frame_system::config_preludes::TestDefaultConfig)]
impl frame_system::Config for Test {
  type Block = Block;
  type AccountId = u64;
  type Lookup = IdentityLookup<Self::AccountId>;
  type Hash = H256;
  type Hashing = BlakeTwo256;
  type AccountData = polkadot_sdk::pallet_balances::AccountData<u128>;
}

impl polkadot_sdk::pallet_balances::Config for Test {
  type MaxLocks = ();
  type MaxReserves = ();
  type ReserveIdentifier = [u8; 8];
  type Balance = u128;
  type DustRemoval = ();
  type RuntimeEvent = RuntimeEvent;
  type ExistentialDeposit = ConstU128<1>;
  type AccountStore = System;
  type WeightInfo = ();
  type FreezeIdentifier = ();
  type MaxFreezes = ();
  type RuntimeHoldReason = ();
  type RuntimeFreezeReason = ();
  type DoneSlashHandler = ();
}

impl polkadot_sdk::pallet_assets::Config for Test {
  type RuntimeEvent = RuntimeEvent;
  type Balance = u128;
  type AssetId = u32;
  type AssetIdParameter = u32;
  type Currency = Balances;
  type CreateOrigin = polkadot_sdk::frame_support::traits::AsEnsureOriginWithArg<
    frame_system::EnsureSigned<Self::AccountId>,
  >;
  type ForceOrigin = frame_system::EnsureRoot<Self::AccountId>;
  type AssetDeposit = ConstU128<1>;
  type AssetAccountDeposit = ConstU128<1>;
  type MetadataDepositBase = ConstU128<1>;
  type MetadataDepositPerByte = ConstU128<1>;
  type ApprovalDeposit = ConstU128<1>;
  type StringLimit = ConstU32<50>;
  type Freezer = ();
  type Extra = ();
  type CallbackHandle = ();
  type WeightInfo = ();
  type RemoveItemsLimit = ConstU32<5>;
  type Holder = ();
  type ReserveData = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = ();
}

/// Settlement bridge backed by a real custody account.
///
/// Collects into [`BRIDGE_ACCOUNT`] and books the amount under the recipient before deciding
/// whether to refuse, so a refusal always has partial effects to undo.
pub struct MockBridge;
impl pallet_forwarder_factory::SettlementBridge<u64> for MockBridge {
  fn deposit(depositor: &u64, asset: AssetKind, amount: Balance, recipient: &u64) -> DispatchResult {
    let collected = if BRIDGE_SHORT_COLLECT.with(|s| *s.borrow()) {
      amount.saturating_sub(1)
    } else {
      amount
    };
    match asset {
      AssetKind::Native => {
        <Balances as NativeMutate<u64>>::transfer(
          depositor,
          &BRIDGE_ACCOUNT,
          collected,
          Preservation::Expendable,
        )?;
      }
      AssetKind::Local(id) | AssetKind::Foreign(id) => {
        <Assets as FungiblesMutate<u64>>::transfer(
          id,
          depositor,
          &BRIDGE_ACCOUNT,
          collected,
          Preservation::Expendable,
        )?;
      }
    }
    let key = bridge_key(recipient, asset);
    unhashed::put(
      &key,
      &unhashed::get_or_default::<Balance>(&key).saturating_add(collected),
    );

    if BRIDGE_REJECTS.with(|r| r.borrow().contains(&asset)) {
      return Err(TokenError::Blocked.into());
    }
    Ok(())
  }
}

pub struct MockNfts;
impl pallet_forwarder_factory::NftOps<u64, u32, u32> for MockNfts {
  fn owner(collection: &u32, item: &u32) -> Option<u64> {
    item_owner(*collection, *item)
  }

  fn transfer(collection: &u32, item: &u32, to: &u64) -> DispatchResult {
    if item_owner(*collection, *item).is_none() {
      return Err(DispatchError::Other("Unknown item"));
    }
    set_item_owner(*collection, *item, *to);
    Ok(())
  }
}

pub struct FactoryPalletId;
impl Get<PalletId> for FactoryPalletId {
  fn get() -> PalletId {
    PalletId(*FORWARDER_FACTORY_PALLET_ID)
  }
}

#[cfg(feature = "runtime-benchmarks")]
pub struct MockBenchmarkHelper;
#[cfg(feature = "runtime-benchmarks")]
impl pallet_forwarder_factory::BenchmarkHelper<u64, u32, u32> for MockBenchmarkHelper {
  fn create_item(owner: &u64) -> (u32, u32) {
    set_item_owner(0, 0, *owner);
    (0, 0)
  }
}

impl pallet_forwarder_factory::Config for Test {
  type Currency = Balances;
  type Assets = Assets;
  type CollectionId = u32;
  type ItemId = u32;
  type Nfts = MockNfts;
  type Bridge = MockBridge;
  type PalletId = FactoryPalletId;
  type WeightInfo = ();
  #[cfg(feature = "runtime-benchmarks")]
  type BenchmarkHelper = MockBenchmarkHelper;
}

pub fn new_test_ext() -> polkadot_sdk::sp_io::TestExternalities {
  let mut t = frame_system::GenesisConfig::<Test>::default()
    .build_storage()
    .unwrap();

  polkadot_sdk::pallet_balances::GenesisConfig::<Test> {
    balances: alloc::vec![
      (ALICE, INITIAL_BALANCE),
      (BOB, INITIAL_BALANCE),
      (CHARLIE, INITIAL_BALANCE),
    ],
    dev_accounts: None,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  polkadot_sdk::pallet_assets::GenesisConfig::<Test> {
    assets: alloc::vec![(TOKEN_ID, ALICE, true, 1)],
    metadata: alloc::vec![],
    accounts: alloc::vec![(TOKEN_ID, ALICE, INITIAL_BALANCE), (TOKEN_ID, BOB, INITIAL_BALANCE)],
    reserves: alloc::vec![],
    next_asset_id: None,
  }
  .assimilate_storage(&mut t)
  .unwrap();

  BRIDGE_REJECTS.with(|r| r.borrow_mut().clear());
  BRIDGE_SHORT_COLLECT.with(|s| *s.borrow_mut() = false);

  let mut ext = polkadot_sdk::sp_io::TestExternalities::new(t);
  ext.execute_with(|| System::set_block_number(1));
  ext
}
