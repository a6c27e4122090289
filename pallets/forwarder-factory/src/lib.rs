//! Forwarder Factory Pallet
//!
//! Collects value deposited at per-account agent addresses and relays it to a settlement bridge.
//! A bridge refusal never strands funds: the value stays in the agent and can be recovered back to
//! the owning account.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use pallet::*;

pub mod adapters;
pub use adapters::{NftOps, NonfungiblesAdapter, SettlementBridge};

pub mod agent;
pub use agent::{Agent, AgentCall, AgentInstance, AgentInstanceOf, RecoveryOutcome, RelayOutcome};

pub mod weights;
pub use weights::WeightInfo;

#[cfg(test)]
mod mock;

#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;

pub const LOG_TARGET: &str = "runtime::forwarder-factory";

#[cfg(feature = "runtime-benchmarks")]
pub trait BenchmarkHelper<AccountId, CollectionId, ItemId> {
  /// Put a non-fungible item under `owner` and return its reference.
  fn create_item(owner: &AccountId) -> (CollectionId, ItemId);
}

#[frame::pallet]
pub mod pallet {
  use super::{
    Agent, AgentCall, AgentInstanceOf, LOG_TARGET, NftOps, RecoveryOutcome, RelayOutcome,
    SettlementBridge, WeightInfo,
  };
  use frame::prelude::*;
  use polkadot_sdk::{
    frame_support::{
      PalletId,
      traits::{
        fungible::{Inspect as NativeInspect, Mutate as NativeMutate},
        fungibles::{Inspect as FungiblesInspect, Mutate as FungiblesMutate},
        tokens::{Fortitude, Preservation},
      },
    },
    sp_runtime::traits::{AccountIdConversion, Zero},
  };
  use primitives::{AGENT_TEMPLATE, AssetKind, Balance};

  #[pallet::config]
  pub trait Config: frame_system::Config {
    /// Base asset interface
    type Currency: NativeInspect<Self::AccountId, Balance = Balance>
      + NativeMutate<Self::AccountId, Balance = Balance>;
    /// Fungible token interface
    type Assets: FungiblesInspect<Self::AccountId, AssetId = u32, Balance = Balance>
      + FungiblesMutate<Self::AccountId, AssetId = u32, Balance = Balance>;
    type CollectionId: Parameter + Member + Copy + MaxEncodedLen;
    type ItemId: Parameter + Member + Copy + MaxEncodedLen;
    /// Non-fungible item interface used by item recovery
    type Nfts: NftOps<Self::AccountId, Self::CollectionId, Self::ItemId>;
    /// Settlement endpoint every relay goes to
    type Bridge: SettlementBridge<Self::AccountId>;
    /// Pallet ID for the factory account and agent address derivation
    #[pallet::constant]
    type PalletId: Get<PalletId>;
    /// Weight information for extrinsics
    type WeightInfo: WeightInfo;
    #[cfg(feature = "runtime-benchmarks")]
    type BenchmarkHelper: crate::BenchmarkHelper<Self::AccountId, Self::CollectionId, Self::ItemId>;
  }

  /// ## Lifecycle
  /// Agent addresses exist (and can receive value) before any agent does. An agent is
  /// instantiated lazily by the first call that needs one, and a forward-and-destruct or a
  /// transient recovery removes it again. Recreation reuses the address, never the instance.
  ///
  /// ## Access
  /// Forwarding calls are open to any signed origin: their only effect is moving an account's own
  /// funds toward that account. Agents obey only the factory account.
  #[pallet::pallet]
  pub struct Pallet<T>(_);

  /// Active agents keyed by derived address
  #[pallet::storage]
  #[pallet::getter(fn agents)]
  pub type Agents<T: Config> =
    StorageMap<_, Blake2_128Concat, T::AccountId, AgentInstanceOf<T>, OptionQuery>;

  /// Instance id handed to the next instantiated agent
  #[pallet::storage]
  #[pallet::getter(fn next_instance_id)]
  pub type NextInstanceId<T> = StorageValue<_, u64, ValueQuery>;

  #[pallet::event]
  #[pallet::generate_deposit(pub(super) fn deposit_event)]
  pub enum Event<T: Config> {
    /// An agent was instantiated at its derived address
    AgentDeployed {
      agent: T::AccountId,
      instance_id: u64,
    },
    /// An agent vacated its address
    AgentRemoved {
      agent: T::AccountId,
      instance_id: u64,
    },
    /// An active agent received base-asset value
    Received { agent: T::AccountId, amount: Balance },
    /// Value was paid into an agent address through the factory
    Funded {
      account: T::AccountId,
      agent: T::AccountId,
      from: T::AccountId,
      asset: AssetKind,
      amount: Balance,
    },
    /// The bridge accepted a relay on behalf of `account`
    Forwarded {
      account: T::AccountId,
      agent: T::AccountId,
      asset: AssetKind,
      amount: Balance,
    },
    /// The bridge refused a relay; the funds are still held by the agent
    ForwardRejected {
      account: T::AccountId,
      agent: T::AccountId,
      asset: AssetKind,
      amount: Balance,
      reason: DispatchError,
    },
    /// Funds were returned from an agent to its owning account
    Recovered {
      account: T::AccountId,
      agent: T::AccountId,
      asset: AssetKind,
      amount: Balance,
    },
    /// A non-fungible item was returned from an agent to its owning account
    ItemRecovered {
      account: T::AccountId,
      agent: T::AccountId,
      collection: T::CollectionId,
      item: T::ItemId,
    },
  }

  #[pallet::error]
  pub enum Error<T> {
    /// Privileged agent operation attempted by someone other than the factory
    Unauthorized,
    /// No agent is instantiated at the derived address
    AgentNotInstantiated,
    /// An agent already occupies the derived address
    AgentAlreadyInstantiated,
    /// The bridge did not accept the transfer
    BridgeRejected,
    /// Destruction requested for an agent that predates the recovery call
    CannotDestructExisting,
    /// The agent holds none of the asset
    NothingToForward,
    /// The agent holds none of the asset
    NothingToRecover,
    /// The agent does not own the item
    ItemNotHeld,
    /// The bridge reported success without collecting the full amount
    IncompleteSettlement,
    /// Amount must be non-zero
    AmountZero,
    /// Instance id counter exhausted
    InstanceIdOverflow,
    /// The factory drives agents only from within forward and recovery calls
    StandaloneAgentCall,
  }

  #[pallet::call]
  impl<T: Config> Pallet<T> {
    /// Relay the agent's whole balance of `asset` to the bridge on behalf of `account`.
    ///
    /// The agent must already be instantiated.
    #[pallet::call_index(0)]
    #[pallet::weight(T::WeightInfo::forward())]
    pub fn forward(origin: OriginFor<T>, account: T::AccountId, asset: AssetKind) -> DispatchResult {
      ensure_signed(origin)?;
      let agent = Self::active_agent(&account)?;
      Self::relay_or_fail(&agent, &account, asset)?;
      Ok(())
    }

    /// Instantiate the agent if needed, then relay as `forward` does.
    #[pallet::call_index(1)]
    #[pallet::weight(T::WeightInfo::deploy_and_forward())]
    pub fn deploy_and_forward(
      origin: OriginFor<T>,
      account: T::AccountId,
      asset: AssetKind,
    ) -> DispatchResult {
      ensure_signed(origin)?;
      let (agent, _) = Self::ensure_agent(&account)?;
      Self::relay_or_fail(&agent, &account, asset)?;
      Ok(())
    }

    /// Relay, then remove the agent. A refused relay leaves the agent untouched.
    #[pallet::call_index(2)]
    #[pallet::weight(T::WeightInfo::forward_and_destruct())]
    pub fn forward_and_destruct(
      origin: OriginFor<T>,
      account: T::AccountId,
      asset: AssetKind,
    ) -> DispatchResult {
      ensure_signed(origin)?;
      let agent = Self::active_agent(&account)?;
      Self::relay_or_fail(&agent, &account, asset)?;
      agent.self_remove(&Self::account_id())
    }

    /// Instantiate if needed, relay, remove. On success the address ends dormant.
    #[pallet::call_index(3)]
    #[pallet::weight(T::WeightInfo::deploy_forward_and_destruct())]
    pub fn deploy_forward_and_destruct(
      origin: OriginFor<T>,
      account: T::AccountId,
      asset: AssetKind,
    ) -> DispatchResult {
      ensure_signed(origin)?;
      let (agent, _) = Self::ensure_agent(&account)?;
      Self::relay_or_fail(&agent, &account, asset)?;
      agent.self_remove(&Self::account_id())
    }

    /// Like `deploy_and_forward`, but a bridge refusal is reported as `ForwardRejected` instead of
    /// failing the call. The agent stays instantiated and keeps the funds for `recover_token`.
    #[pallet::call_index(4)]
    #[pallet::weight(T::WeightInfo::safe_forward())]
    pub fn safe_forward(
      origin: OriginFor<T>,
      account: T::AccountId,
      asset: AssetKind,
    ) -> DispatchResult {
      ensure_signed(origin)?;
      Self::try_safe_forward(&account, asset).map(|_| ())
    }

    /// Get `asset` out of `account`'s agent: through the bridge if it accepts, straight back to
    /// `account` otherwise.
    ///
    /// `destroy` is only honoured when this call instantiated the agent; requesting it for an
    /// agent that already existed fails with `CannotDestructExisting` before anything moves.
    #[pallet::call_index(5)]
    #[pallet::weight(T::WeightInfo::recover_token())]
    pub fn recover_token(
      origin: OriginFor<T>,
      account: T::AccountId,
      asset: AssetKind,
      destroy: bool,
    ) -> DispatchResult {
      ensure_signed(origin)?;
      Self::do_recover_token(&account, asset, destroy).map(|_| ())
    }

    /// Self-service: return `asset` mistakenly sent to the caller's own agent address.
    ///
    /// Never touches the bridge. The agent's lifecycle state is the same before and after. On a
    /// dormant address this still emits `AgentDeployed` and `AgentRemoved` and consumes one
    /// instance id for the transient agent.
    #[pallet::call_index(6)]
    #[pallet::weight(T::WeightInfo::recover_own_asset())]
    pub fn recover_own_asset(origin: OriginFor<T>, asset: AssetKind) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::with_transient_agent(&who, |agent, factory| {
        agent.recover_out(factory, asset, &who).map(|_| ())
      })
    }

    /// Self-service: return a non-fungible item held by the caller's own agent address.
    ///
    /// Same lifecycle behaviour as `recover_own_asset`.
    #[pallet::call_index(7)]
    #[pallet::weight(T::WeightInfo::recover_own_item())]
    pub fn recover_own_item(
      origin: OriginFor<T>,
      collection: T::CollectionId,
      item: T::ItemId,
    ) -> DispatchResult {
      let who = ensure_signed(origin)?;
      Self::with_transient_agent(&who, |agent, factory| {
        agent.recover_item(factory, collection, item, &who)
      })
    }

    /// Pay `amount` of `asset` into `account`'s agent address.
    ///
    /// Works whether or not the agent exists. An active agent gets the receipt signal for
    /// base-asset value.
    #[pallet::call_index(8)]
    #[pallet::weight(T::WeightInfo::fund_agent())]
    pub fn fund_agent(
      origin: OriginFor<T>,
      account: T::AccountId,
      asset: AssetKind,
      amount: Balance,
    ) -> DispatchResult {
      let from = ensure_signed(origin)?;
      ensure!(!amount.is_zero(), Error::<T>::AmountZero);
      let agent_address = Self::agent_address(&account);
      Self::transfer(
        asset,
        &from,
        &agent_address,
        amount,
        Preservation::Preserve,
      )?;
      if asset.is_native() {
        if let Some(agent) = Agent::<T>::load(&agent_address) {
          agent.receive(&Self::account_id(), amount)?;
        }
      }
      Self::deposit_event(Event::Funded {
        account,
        agent: agent_address,
        from,
        asset,
        amount,
      });
      Ok(())
    }

    /// Direct entry into an agent's privileged operations.
    ///
    /// Agents obey only the factory, so any other caller gets `Unauthorized` from the agent's own
    /// guard. The factory itself is refused with `StandaloneAgentCall`: it never removes or
    /// drains an agent outside a forward or recovery call.
    #[pallet::call_index(9)]
    #[pallet::weight(T::WeightInfo::call_agent())]
    pub fn call_agent(
      origin: OriginFor<T>,
      agent: T::AccountId,
      call: AgentCall<T::AccountId, T::CollectionId, T::ItemId>,
    ) -> DispatchResult {
      let caller = ensure_signed(origin)?;
      Self::dispatch_agent_call(&caller, &agent, call)
    }
  }

  impl<T: Config> Pallet<T> {
    /// The factory account: the identity agents accept privileged calls from
    pub fn account_id() -> T::AccountId {
      T::PalletId::get().into_account_truncating()
    }

    /// Address `account`'s agent occupies whenever it is instantiated.
    ///
    /// Pure function of `account`, the agent template and the pallet id. It never reads storage,
    /// so it is identical before instantiation, while active and after any number of
    /// destroy/recreate cycles.
    pub fn agent_address(account: &T::AccountId) -> T::AccountId {
      let mut seed_input = frame::hashing::blake2_256(AGENT_TEMPLATE).to_vec();
      seed_input.extend_from_slice(&account.encode());
      let seed = frame::hashing::blake2_256(&seed_input);
      // Fold the seed into the PalletId as well: small AccountId types keep only a prefix of the
      // sub-account payload.
      let mut id_bytes = T::PalletId::get().0;
      for (i, b) in seed.iter().enumerate() {
        id_bytes[i % 8] ^= b;
      }
      PalletId(id_bytes).into_sub_account_truncating(seed)
    }

    pub fn is_instantiated(account: &T::AccountId) -> bool {
      Agents::<T>::contains_key(Self::agent_address(account))
    }

    pub fn agent_of(account: &T::AccountId) -> Option<AgentInstanceOf<T>> {
      Agents::<T>::get(Self::agent_address(account))
    }

    /// `safe_forward` for in-runtime callers: the refusal comes back as a typed outcome.
    pub fn try_safe_forward(
      account: &T::AccountId,
      asset: AssetKind,
    ) -> Result<RelayOutcome<Balance>, DispatchError> {
      let (agent, _) = Self::ensure_agent(account)?;
      let outcome = agent.relay_out(&Self::account_id(), asset, account)?;
      if let RelayOutcome::Rejected { amount, reason } = outcome {
        Self::note_rejection(account, &agent, asset, amount, reason);
      }
      Ok(outcome)
    }

    pub fn do_recover_token(
      account: &T::AccountId,
      asset: AssetKind,
      destroy: bool,
    ) -> Result<RecoveryOutcome<Balance>, DispatchError> {
      let factory = Self::account_id();
      let agent_address = Self::agent_address(account);
      let agent = match Agent::<T>::load(&agent_address) {
        Some(existing) => {
          ensure!(!destroy, Error::<T>::CannotDestructExisting);
          existing
        }
        None => Agent::<T>::instantiate(&factory, agent_address)?,
      };
      ensure!(
        !agent.movable_balance(asset).is_zero(),
        Error::<T>::NothingToRecover
      );

      let outcome = match agent.relay_out(&factory, asset, account)? {
        RelayOutcome::Relayed { amount } => RecoveryOutcome::Settled { amount },
        RelayOutcome::Rejected { amount, reason } => {
          Self::note_rejection(account, &agent, asset, amount, reason);
          let amount = agent.recover_out(&factory, asset, account)?;
          RecoveryOutcome::Returned { amount }
        }
      };

      // Reaching here with `destroy` set means the agent was instantiated above
      if destroy {
        agent.self_remove(&factory)?;
      }
      Ok(outcome)
    }

    pub fn dispatch_agent_call(
      caller: &T::AccountId,
      agent: &T::AccountId,
      call: AgentCall<T::AccountId, T::CollectionId, T::ItemId>,
    ) -> DispatchResult {
      ensure!(
        *caller != Self::account_id(),
        Error::<T>::StandaloneAgentCall
      );
      let Some(target) = Agent::<T>::load(agent) else {
        return Err(Error::<T>::Unauthorized.into());
      };
      match call {
        AgentCall::Receive { amount } => target.receive(caller, amount),
        AgentCall::RelayOut { asset, owner } => match target.relay_out(caller, asset, &owner)? {
          RelayOutcome::Relayed { .. } => Ok(()),
          RelayOutcome::Rejected { .. } => Err(Error::<T>::BridgeRejected.into()),
        },
        AgentCall::RecoverOut { asset, owner } => {
          target.recover_out(caller, asset, &owner).map(|_| ())
        }
        AgentCall::RecoverItem {
          collection,
          item,
          owner,
        } => target.recover_item(caller, collection, item, &owner),
        AgentCall::SelfRemove => target.self_remove(caller),
      }
    }

    fn active_agent(account: &T::AccountId) -> Result<Agent<T>, DispatchError> {
      Agent::<T>::load(&Self::agent_address(account))
        .ok_or_else(|| Error::<T>::AgentNotInstantiated.into())
    }

    /// Load the agent, instantiating it if dormant. The flag tells whether this call created it.
    fn ensure_agent(account: &T::AccountId) -> Result<(Agent<T>, bool), DispatchError> {
      let agent_address = Self::agent_address(account);
      match Agent::<T>::load(&agent_address) {
        Some(agent) => Ok((agent, false)),
        None => Agent::<T>::instantiate(&Self::account_id(), agent_address).map(|a| (a, true)),
      }
    }

    /// Run `f` against `account`'s agent. A dormant agent is instantiated for the duration of
    /// the call and removed afterwards, so the registry ends as it started while the instance id
    /// counter and the event log record the transient agent.
    fn with_transient_agent(
      account: &T::AccountId,
      f: impl FnOnce(&Agent<T>, &T::AccountId) -> DispatchResult,
    ) -> DispatchResult {
      let factory = Self::account_id();
      let (agent, fresh) = Self::ensure_agent(account)?;
      f(&agent, &factory)?;
      if fresh {
        agent.self_remove(&factory)?;
      }
      Ok(())
    }

    fn relay_or_fail(
      agent: &Agent<T>,
      account: &T::AccountId,
      asset: AssetKind,
    ) -> Result<Balance, DispatchError> {
      match agent.relay_out(&Self::account_id(), asset, account)? {
        RelayOutcome::Relayed { amount } => Ok(amount),
        RelayOutcome::Rejected { .. } => Err(Error::<T>::BridgeRejected.into()),
      }
    }

    fn note_rejection(
      account: &T::AccountId,
      agent: &Agent<T>,
      asset: AssetKind,
      amount: Balance,
      reason: DispatchError,
    ) {
      log::info!(
        target: LOG_TARGET,
        "relay for {:?} refused, {:?} of {:?} kept in agent",
        account,
        amount,
        asset
      );
      Self::deposit_event(Event::ForwardRejected {
        account: account.clone(),
        agent: agent.address().clone(),
        asset,
        amount,
        reason,
      });
    }

    pub fn balance_of(asset: AssetKind, who: &T::AccountId) -> Balance {
      match asset {
        AssetKind::Native => <T::Currency as NativeInspect<T::AccountId>>::balance(who),
        AssetKind::Local(id) | AssetKind::Foreign(id) => T::Assets::balance(id, who),
      }
    }

    pub fn reducible_balance(asset: AssetKind, who: &T::AccountId) -> Balance {
      match asset {
        AssetKind::Native => <T::Currency as NativeInspect<T::AccountId>>::reducible_balance(
          who,
          Preservation::Expendable,
          Fortitude::Polite,
        ),
        AssetKind::Local(id) | AssetKind::Foreign(id) => {
          T::Assets::reducible_balance(id, who, Preservation::Expendable, Fortitude::Polite)
        }
      }
    }

    pub(crate) fn transfer(
      asset: AssetKind,
      from: &T::AccountId,
      to: &T::AccountId,
      amount: Balance,
      preservation: Preservation,
    ) -> DispatchResult {
      match asset {
        AssetKind::Native => {
          <T::Currency as NativeMutate<T::AccountId>>::transfer(from, to, amount, preservation)?;
        }
        AssetKind::Local(id) | AssetKind::Foreign(id) => {
          T::Assets::transfer(id, from, to, amount, preservation)?;
        }
      }
      Ok(())
    }
  }
}
