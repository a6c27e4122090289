extern crate alloc;

use crate::*;
use frame::deps::frame_benchmarking::{account, v2::*};
use frame::deps::frame_support::traits::fungible::{Inspect as NativeInspect, Mutate as NativeMutate};
use frame::deps::frame_system::RawOrigin;
use primitives::AssetKind;

const AMOUNT: u128 = 1_000_000_000_000; // 1 unit

fn seed_agent<T: Config>(account: &T::AccountId) -> T::AccountId {
  let agent = Pallet::<T>::agent_address(account);
  let _ = T::Currency::mint_into(&agent, AMOUNT);
  agent
}

fn instantiate<T: Config>(account: &T::AccountId) -> T::AccountId {
  let agent = seed_agent::<T>(account);
  Agent::<T>::instantiate(&Pallet::<T>::account_id(), agent.clone())
    .map(|_| ())
    .expect("dormant slot must accept an agent");
  agent
}

#[benchmarks]
mod benches {
  use super::*;

  #[benchmark]
  fn forward() {
    let caller: T::AccountId = account("caller", 0, 0);
    let owner: T::AccountId = account("owner", 0, 0);
    let agent = instantiate::<T>(&owner);

    #[extrinsic_call]
    forward(RawOrigin::Signed(caller), owner, AssetKind::Native);

    assert_eq!(T::Currency::balance(&agent), 0);
  }

  #[benchmark]
  fn deploy_and_forward() {
    let caller: T::AccountId = account("caller", 0, 0);
    let owner: T::AccountId = account("owner", 0, 0);
    let agent = seed_agent::<T>(&owner);

    #[extrinsic_call]
    deploy_and_forward(RawOrigin::Signed(caller), owner.clone(), AssetKind::Native);

    assert_eq!(T::Currency::balance(&agent), 0);
    assert!(Pallet::<T>::is_instantiated(&owner));
  }

  #[benchmark]
  fn forward_and_destruct() {
    let caller: T::AccountId = account("caller", 0, 0);
    let owner: T::AccountId = account("owner", 0, 0);
    instantiate::<T>(&owner);

    #[extrinsic_call]
    forward_and_destruct(RawOrigin::Signed(caller), owner.clone(), AssetKind::Native);

    assert!(!Pallet::<T>::is_instantiated(&owner));
  }

  #[benchmark]
  fn deploy_forward_and_destruct() {
    let caller: T::AccountId = account("caller", 0, 0);
    let owner: T::AccountId = account("owner", 0, 0);
    let agent = seed_agent::<T>(&owner);

    #[extrinsic_call]
    deploy_forward_and_destruct(RawOrigin::Signed(caller), owner.clone(), AssetKind::Native);

    assert_eq!(T::Currency::balance(&agent), 0);
    assert!(!Pallet::<T>::is_instantiated(&owner));
  }

  #[benchmark]
  fn safe_forward() {
    let caller: T::AccountId = account("caller", 0, 0);
    let owner: T::AccountId = account("owner", 0, 0);
    seed_agent::<T>(&owner);

    #[extrinsic_call]
    safe_forward(RawOrigin::Signed(caller), owner.clone(), AssetKind::Native);

    assert!(Pallet::<T>::is_instantiated(&owner));
  }

  #[benchmark]
  fn recover_token() {
    let caller: T::AccountId = account("caller", 0, 0);
    let owner: T::AccountId = account("owner", 0, 0);
    let agent = seed_agent::<T>(&owner);

    #[extrinsic_call]
    recover_token(RawOrigin::Signed(caller), owner.clone(), AssetKind::Native, true);

    assert_eq!(T::Currency::balance(&agent), 0);
    assert!(!Pallet::<T>::is_instantiated(&owner));
  }

  #[benchmark]
  fn recover_own_asset() {
    let owner: T::AccountId = account("owner", 0, 0);
    let _ = T::Currency::mint_into(&owner, AMOUNT);
    let agent = seed_agent::<T>(&owner);

    #[extrinsic_call]
    recover_own_asset(RawOrigin::Signed(owner.clone()), AssetKind::Native);

    assert_eq!(T::Currency::balance(&agent), 0);
    assert_eq!(T::Currency::balance(&owner), AMOUNT * 2);
  }

  #[benchmark]
  fn recover_own_item() {
    let owner: T::AccountId = account("owner", 0, 0);
    let agent = Pallet::<T>::agent_address(&owner);
    let (collection, item) = T::BenchmarkHelper::create_item(&agent);

    #[extrinsic_call]
    recover_own_item(RawOrigin::Signed(owner.clone()), collection, item);

    assert_eq!(T::Nfts::owner(&collection, &item), Some(owner));
  }

  #[benchmark]
  fn fund_agent() {
    let caller: T::AccountId = account("caller", 0, 0);
    let owner: T::AccountId = account("owner", 0, 0);
    let _ = T::Currency::mint_into(&caller, AMOUNT * 10);
    instantiate::<T>(&owner);
    let agent = Pallet::<T>::agent_address(&owner);

    #[extrinsic_call]
    fund_agent(RawOrigin::Signed(caller), owner, AssetKind::Native, AMOUNT);

    assert_eq!(T::Currency::balance(&agent), AMOUNT * 2);
  }

  // Every route through `call_agent` ends in a refusal
  #[benchmark]
  fn call_agent() {
    let caller: T::AccountId = account("caller", 0, 0);
    let owner: T::AccountId = account("owner", 0, 0);
    let agent = instantiate::<T>(&owner);
    let call = AgentCall::RecoverOut {
      asset: AssetKind::Native,
      owner: caller.clone(),
    };
    let result;

    #[block]
    {
      result = Pallet::<T>::call_agent(RawOrigin::Signed(caller).into(), agent.clone(), call);
    }

    assert!(result.is_err());
    assert_eq!(T::Currency::balance(&agent), AMOUNT);
  }

  #[cfg(test)]
  use crate::mock::{Test, new_test_ext};
  #[cfg(test)]
  impl_benchmark_test_suite!(Pallet, new_test_ext(), Test);
}
