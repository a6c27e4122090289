//! Forwarding scheme constants.
//!
//! Everything that feeds agent address derivation lives here so the derived address space has a
//! single source of truth. Changing any of these values moves every agent to a new address.

/// Balance type alias shared by the pallet and its adapters
pub type Balance = u128;

/// Pallet identifiers for deriving pallet-owned accounts.
pub mod pallet_ids {
  /// Forwarder factory (orchestrator) pallet ID. The factory account derived from it is the only
  /// caller agents accept privileged calls from.
  pub const FORWARDER_FACTORY_PALLET_ID: &[u8; 8] = b"py/fwdfc";
}

/// Behavioural template of an agent.
///
/// Agent addresses are derived from the hash of this label, so it acts as the content address of
/// the agent logic. Bump the trailing version whenever agent semantics change: agents of the old
/// template keep their addresses, agents of the new one get fresh ones.
pub const AGENT_TEMPLATE: &[u8] = b"forwarder-agent/v1";

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pallet_id_is_correct_length() {
    assert_eq!(pallet_ids::FORWARDER_FACTORY_PALLET_ID.len(), 8);
  }

  #[test]
  fn template_label_is_versioned() {
    assert!(AGENT_TEMPLATE.starts_with(b"forwarder-agent/"));
    assert!(AGENT_TEMPLATE.ends_with(b"/v1"));
  }
}
