//! Protocol-level constants
//!
//! These values are compatibility-relevant: clients, mount helpers and the
//! storage lifecycle all assume them. Changing any of them is a breaking
//! change for deployed servers.

/// TCP port game clients connect to.
pub const GAME_PORT: u16 = 25565;

/// TCP port of the network file-system mount protocol.
pub const NFS_PORT: u16 = 2049;

/// Days after which infrequently accessed save data moves to the cold tier.
pub const COLD_TIER_AFTER_DAYS: u32 = 90;
