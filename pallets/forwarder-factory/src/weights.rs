#![cfg_attr(rustfmt, rustfmt_skip)]
#![allow(unused_parens)]
#![allow(unused_imports)]
#![allow(missing_docs)]

use core::marker::PhantomData;
use polkadot_sdk::frame_support::{
  traits::Get,
  weights::{constants::RocksDbWeight, Weight},
};

pub trait WeightInfo {
  fn forward() -> Weight;
  fn deploy_and_forward() -> Weight;
  fn forward_and_destruct() -> Weight;
  fn deploy_forward_and_destruct() -> Weight;
  fn safe_forward() -> Weight;
  fn recover_token() -> Weight;
  fn recover_own_asset() -> Weight;
  fn recover_own_item() -> Weight;
  fn fund_agent() -> Weight;
  fn call_agent() -> Weight;
}

/// Bridge deposits are charged as two account reads and two writes on top of the pallet's own
/// accesses.
pub struct SubstrateWeight<T>(PhantomData<T>);
impl<T: polkadot_sdk::frame_system::Config + crate::Config> WeightInfo for SubstrateWeight<T> {
  fn forward() -> Weight {
    Weight::from_parts(30_000_000, 2400)
      .saturating_add(T::DbWeight::get().reads(4))
      .saturating_add(T::DbWeight::get().writes(2))
  }

  fn deploy_and_forward() -> Weight {
    Weight::from_parts(38_000_000, 2800)
      .saturating_add(T::DbWeight::get().reads(5))
      .saturating_add(T::DbWeight::get().writes(4))
  }

  fn forward_and_destruct() -> Weight {
    Weight::from_parts(34_000_000, 2600)
      .saturating_add(T::DbWeight::get().reads(4))
      .saturating_add(T::DbWeight::get().writes(3))
  }

  fn deploy_forward_and_destruct() -> Weight {
    Weight::from_parts(42_000_000, 3000)
      .saturating_add(T::DbWeight::get().reads(5))
      .saturating_add(T::DbWeight::get().writes(5))
  }

  fn safe_forward() -> Weight {
    Weight::from_parts(38_000_000, 2800)
      .saturating_add(T::DbWeight::get().reads(5))
      .saturating_add(T::DbWeight::get().writes(4))
  }

  // Worst case: bridge refusal followed by the direct return leg
  fn recover_token() -> Weight {
    Weight::from_parts(55_000_000, 3400)
      .saturating_add(T::DbWeight::get().reads(6))
      .saturating_add(T::DbWeight::get().writes(7))
  }

  fn recover_own_asset() -> Weight {
    Weight::from_parts(32_000_000, 2400)
      .saturating_add(T::DbWeight::get().reads(4))
      .saturating_add(T::DbWeight::get().writes(5))
  }

  fn recover_own_item() -> Weight {
    Weight::from_parts(35_000_000, 2600)
      .saturating_add(T::DbWeight::get().reads(5))
      .saturating_add(T::DbWeight::get().writes(5))
  }

  fn fund_agent() -> Weight {
    Weight::from_parts(20_000_000, 1800)
      .saturating_add(T::DbWeight::get().reads(3))
      .saturating_add(T::DbWeight::get().writes(2))
  }

  fn call_agent() -> Weight {
    Weight::from_parts(30_000_000, 2400)
      .saturating_add(T::DbWeight::get().reads(4))
      .saturating_add(T::DbWeight::get().writes(3))
  }
}

impl WeightInfo for () {
  fn forward() -> Weight { Weight::from_parts(30_000_000, 2400) }
  fn deploy_and_forward() -> Weight { Weight::from_parts(38_000_000, 2800) }
  fn forward_and_destruct() -> Weight { Weight::from_parts(34_000_000, 2600) }
  fn deploy_forward_and_destruct() -> Weight { Weight::from_parts(42_000_000, 3000) }
  fn safe_forward() -> Weight { Weight::from_parts(38_000_000, 2800) }
  fn recover_token() -> Weight { Weight::from_parts(55_000_000, 3400) }
  fn recover_own_asset() -> Weight { Weight::from_parts(32_000_000, 2400) }
  fn recover_own_item() -> Weight { Weight::from_parts(35_000_000, 2600) }
  fn fund_agent() -> Weight { Weight::from_parts(20_000_000, 1800) }
  fn call_agent() -> Weight { Weight::from_parts(30_000_000, 2400) }
}
