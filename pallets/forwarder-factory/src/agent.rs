//! Forwarding agents.
//!
//! An agent is a slot in the [`Agents`] registry keyed by its derived address. A present key is an
//! active agent, an absent key a dormant one. Instantiating again after removal binds a fresh
//! instance to the same address.
//!
//! Every privileged operation compares the caller with the factory account recorded at
//! instantiation before it reads or writes anything else.

use crate::{
  LOG_TARGET, SettlementBridge,
  adapters::NftOps,
  pallet::{Agents, Config, Error, Event, NextInstanceId, Pallet},
};
use frame::prelude::*;
use polkadot_sdk::{
  frame_support::{storage::with_transaction, traits::tokens::Preservation},
  frame_system::{self, pallet_prelude::BlockNumberFor},
  sp_runtime::{TransactionOutcome, traits::Zero},
};
use primitives::{AssetKind, Balance};

#[derive(Clone, Debug, Decode, Encode, Eq, PartialEq, TypeInfo, MaxEncodedLen)]
pub struct AgentInstance<AccountId, BlockNumber> {
  /// Globally unique, never reused across destroy/recreate cycles
  pub instance_id: u64,
  /// The only caller allowed to drive this instance
  pub factory: AccountId,
  pub deployed_at: BlockNumber,
}

pub type AgentInstanceOf<T> =
  AgentInstance<<T as frame_system::Config>::AccountId, BlockNumberFor<T>>;

/// Result of a relay attempt that got as far as the bridge.
///
/// `Rejected` is not an error: the bridge refused, everything it touched was rolled back and the
/// funds are still held by the agent, ready for recovery.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RelayOutcome<Balance> {
  Relayed { amount: Balance },
  Rejected { amount: Balance, reason: DispatchError },
}

/// How a recovery call disposed of the agent's balance.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RecoveryOutcome<Balance> {
  /// The bridge accepted after all
  Settled { amount: Balance },
  /// Returned straight to the owning account
  Returned { amount: Balance },
}

/// Privileged agent operations reachable through `call_agent`.
#[derive(Clone, Debug, Decode, DecodeWithMemTracking, Encode, Eq, PartialEq, TypeInfo)]
pub enum AgentCall<AccountId, CollectionId, ItemId> {
  Receive {
    amount: Balance,
  },
  RelayOut {
    asset: AssetKind,
    owner: AccountId,
  },
  RecoverOut {
    asset: AssetKind,
    owner: AccountId,
  },
  RecoverItem {
    collection: CollectionId,
    item: ItemId,
    owner: AccountId,
  },
  SelfRemove,
}

/// Handle to an active agent.
pub struct Agent<T: Config> {
  address: T::AccountId,
  instance: AgentInstanceOf<T>,
}

impl<T: Config> Agent<T> {
  pub fn load(address: &T::AccountId) -> Option<Self> {
    Agents::<T>::get(address).map(|instance| Self {
      address: address.clone(),
      instance,
    })
  }

  /// Bind a fresh instance to `address`. Only the factory may do this, and only on a dormant slot.
  pub fn instantiate(caller: &T::AccountId, address: T::AccountId) -> Result<Self, DispatchError> {
    ensure!(*caller == Pallet::<T>::account_id(), Error::<T>::Unauthorized);
    ensure!(
      !Agents::<T>::contains_key(&address),
      Error::<T>::AgentAlreadyInstantiated
    );
    let instance_id = NextInstanceId::<T>::get();
    let next_id = instance_id
      .checked_add(1)
      .ok_or(Error::<T>::InstanceIdOverflow)?;
    let instance = AgentInstance {
      instance_id,
      factory: caller.clone(),
      deployed_at: frame_system::Pallet::<T>::block_number(),
    };
    Agents::<T>::insert(&address, &instance);
    NextInstanceId::<T>::put(next_id);
    log::debug!(
      target: LOG_TARGET,
      "agent {:?} instantiated as instance {}",
      address,
      instance_id
    );
    Pallet::<T>::deposit_event(Event::AgentDeployed {
      agent: address.clone(),
      instance_id,
    });
    Ok(Self { address, instance })
  }

  pub fn address(&self) -> &T::AccountId {
    &self.address
  }

  pub fn instance_id(&self) -> u64 {
    self.instance.instance_id
  }

  /// Amount of `asset` a relay or recovery would move right now.
  pub fn movable_balance(&self, asset: AssetKind) -> Balance {
    Pallet::<T>::reducible_balance(asset, &self.address)
  }

  /// Receipt signal for inbound base-asset value. The value itself has already landed.
  pub fn receive(&self, caller: &T::AccountId, amount: Balance) -> DispatchResult {
    self.ensure_live(caller)?;
    Pallet::<T>::deposit_event(Event::Received {
      agent: self.address.clone(),
      amount,
    });
    Ok(())
  }

  /// Hand the whole movable balance of `asset` to the bridge, credited to `owner`.
  ///
  /// The deposit runs in a nested storage layer. A refusal, or a bridge that reports success
  /// without collecting the full amount, rolls that layer back and yields
  /// [`RelayOutcome::Rejected`]. Failing to open the layer is an error, not a rejection.
  pub fn relay_out(
    &self,
    caller: &T::AccountId,
    asset: AssetKind,
    owner: &T::AccountId,
  ) -> Result<RelayOutcome<Balance>, DispatchError> {
    self.ensure_live(caller)?;
    let held = Pallet::<T>::balance_of(asset, &self.address);
    let amount = self.movable_balance(asset);
    ensure!(!amount.is_zero(), Error::<T>::NothingToForward);

    // Outer `Err` is the storage layer failing to open, inner `Err` is the bridge refusing
    let settled = with_transaction::<_, DispatchError, _>(|| {
      let result = T::Bridge::deposit(&self.address, asset, amount, owner).and_then(|()| {
        let remaining = Pallet::<T>::balance_of(asset, &self.address);
        ensure!(
          remaining == held.saturating_sub(amount),
          Error::<T>::IncompleteSettlement
        );
        Ok(())
      });
      match result {
        Ok(()) => TransactionOutcome::Commit(Ok(Ok(()))),
        Err(e) => TransactionOutcome::Rollback(Ok(Err(e))),
      }
    })?;

    match settled {
      Ok(()) => {
        Pallet::<T>::deposit_event(Event::Forwarded {
          account: owner.clone(),
          agent: self.address.clone(),
          asset,
          amount,
        });
        Ok(RelayOutcome::Relayed { amount })
      }
      Err(reason) => {
        log::warn!(
          target: LOG_TARGET,
          "bridge refused {:?} of {:?} from agent {:?}: {:?}",
          amount,
          asset,
          self.address,
          reason
        );
        Ok(RelayOutcome::Rejected { amount, reason })
      }
    }
  }

  /// Return the whole movable balance of `asset` to `owner`, bypassing the bridge.
  pub fn recover_out(
    &self,
    caller: &T::AccountId,
    asset: AssetKind,
    owner: &T::AccountId,
  ) -> Result<Balance, DispatchError> {
    self.ensure_live(caller)?;
    let amount = self.movable_balance(asset);
    ensure!(!amount.is_zero(), Error::<T>::NothingToRecover);
    Pallet::<T>::transfer(
      asset,
      &self.address,
      owner,
      amount,
      Preservation::Expendable,
    )?;
    Pallet::<T>::deposit_event(Event::Recovered {
      account: owner.clone(),
      agent: self.address.clone(),
      asset,
      amount,
    });
    Ok(amount)
  }

  /// Return a non-fungible item held by the agent to `owner`.
  pub fn recover_item(
    &self,
    caller: &T::AccountId,
    collection: T::CollectionId,
    item: T::ItemId,
    owner: &T::AccountId,
  ) -> DispatchResult {
    self.ensure_live(caller)?;
    ensure!(
      T::Nfts::owner(&collection, &item).as_ref() == Some(&self.address),
      Error::<T>::ItemNotHeld
    );
    T::Nfts::transfer(&collection, &item, owner)?;
    Pallet::<T>::deposit_event(Event::ItemRecovered {
      account: owner.clone(),
      agent: self.address.clone(),
      collection,
      item,
    });
    Ok(())
  }

  /// Vacate the slot. The address stays derivable and can be instantiated again.
  pub fn self_remove(self, caller: &T::AccountId) -> DispatchResult {
    self.ensure_live(caller)?;
    Agents::<T>::remove(&self.address);
    log::debug!(
      target: LOG_TARGET,
      "agent {:?} instance {} removed",
      self.address,
      self.instance.instance_id
    );
    Pallet::<T>::deposit_event(Event::AgentRemoved {
      agent: self.address,
      instance_id: self.instance.instance_id,
    });
    Ok(())
  }

  fn ensure_live(&self, caller: &T::AccountId) -> DispatchResult {
    ensure!(*caller == self.instance.factory, Error::<T>::Unauthorized);
    // A handle outliving its instance must not act on a recreated one
    ensure!(
      Agents::<T>::get(&self.address).map(|live| live.instance_id)
        == Some(self.instance.instance_id),
      Error::<T>::AgentNotInstantiated
    );
    Ok(())
  }
}
