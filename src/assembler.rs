//! Multi-part configuration assembly.
//!
//! The host sends a configuration as `total_parts` Configure messages, one
//! input per part, all carrying the same `config_id`.  The assembler
//! collects them into a [`Configuration`] and reports when it is complete.
//!
//! ```text
//!            valid part (new id)              last missing part
//!   Idle ──────────────────────────▶ Collecting ──────────────────▶ Complete ─▶ Idle
//!    ▲                                 │  │
//!    │   invalid total / part / input  │  │ other id: discard, restart
//!    └─────────────────────────────────┘  └──────────▶ Collecting(new id)
//!    ▲                                 │
//!    └──────── timeout (silent) ───────┘
//! ```
//!
//! At most one session exists at a time.  Re-delivering a part index
//! overwrites the stored input without counting it twice.

use heapless::Vec;
use log::{debug, info, warn};

use crate::error::AssemblyError;
use crate::protocol::{Configure, InputConfig};

/// Maximum number of inputs in one configuration.
pub const MAX_INPUTS: usize = 8;

/// A complete, validated set of inputs identified by a host-chosen id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub config_id: u32,
    pub inputs: Vec<InputConfig, MAX_INPUTS>,
}

impl Configuration {
    /// The "nothing configured" state used at first boot.
    pub fn empty() -> Self {
        Self {
            config_id: 0,
            inputs: Vec::new(),
        }
    }
}

/// Result of feeding one Configure part to the assembler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssemblyOutcome {
    /// Part accepted; more parts are needed.
    Pending { config_id: u32, received: u8, total: u8 },
    /// All parts received.  The assembler is back to idle.
    Complete(Configuration),
    /// The part was refused and any session it belonged to was dropped.
    Rejected { config_id: u32, reason: AssemblyError },
}

// ── Session ───────────────────────────────────────────────────

#[derive(Debug)]
struct Session {
    config_id: u32,
    total_parts: u8,
    /// Bit `n` set once part `n` has arrived.
    received_mask: u8,
    started_ms: u32,
    parts: [Option<InputConfig>; MAX_INPUTS],
}

impl Session {
    fn new(config_id: u32, total_parts: u8, now_ms: u32) -> Self {
        Self {
            config_id,
            total_parts,
            received_mask: 0,
            started_ms: now_ms,
            parts: Default::default(),
        }
    }

    fn received(&self) -> u8 {
        self.received_mask.count_ones() as u8
    }

    fn is_complete(&self) -> bool {
        self.received() == self.total_parts
    }

    fn into_configuration(self) -> Configuration {
        let mut inputs = Vec::new();
        for input in self.parts.into_iter().take(self.total_parts as usize).flatten() {
            // At most MAX_INPUTS parts exist.
            let _ = inputs.push(input);
        }
        Configuration {
            config_id: self.config_id,
            inputs,
        }
    }
}

// ── Assembler ─────────────────────────────────────────────────

/// Collects Configure parts into a [`Configuration`].
pub struct ConfigAssembler {
    session: Option<Session>,
    /// Id and expiry time of the last session dropped by timeout.  Held for
    /// one more timeout window so a straggling part is answered once.
    expired: Option<(u32, u32)>,
    timeout_ms: u32,
}

impl ConfigAssembler {
    pub fn new(timeout_ms: u32) -> Self {
        Self {
            session: None,
            expired: None,
            timeout_ms,
        }
    }

    /// Id of the session being collected, if any.
    pub fn active_id(&self) -> Option<u32> {
        self.session.as_ref().map(|s| s.config_id)
    }

    pub fn is_idle(&self) -> bool {
        self.session.is_none()
    }

    /// Drop the session if it is older than the timeout.
    ///
    /// Returns the id of the abandoned session.  Elapsed time is computed
    /// with wrapping arithmetic so a millisecond counter rollover is harmless.
    pub fn check_timeout(&mut self, now_ms: u32) -> Option<u32> {
        if self
            .expired
            .is_some_and(|(_, expired_ms)| now_ms.wrapping_sub(expired_ms) > self.timeout_ms)
        {
            self.expired = None;
        }
        let session = self.session.as_ref()?;
        if now_ms.wrapping_sub(session.started_ms) <= self.timeout_ms {
            return None;
        }
        let config_id = session.config_id;
        warn!(
            "Configuration {:#010x} timed out with {}/{} parts",
            config_id,
            session.received(),
            session.total_parts
        );
        self.session = None;
        self.expired = Some((config_id, now_ms));
        Some(config_id)
    }

    /// Feed one part received at `now_ms`.
    pub fn feed(&mut self, part: &Configure, now_ms: u32) -> AssemblyOutcome {
        let config_id = part.config_id;
        self.check_timeout(now_ms);

        if matches!(self.expired, Some((id, _)) if id == config_id) {
            self.expired = None;
            return AssemblyOutcome::Rejected {
                config_id,
                reason: AssemblyError::TimedOut,
            };
        }

        let mut session = match self.session.take() {
            Some(s) if s.config_id == config_id => s,
            previous => {
                if let Some(old) = previous {
                    info!(
                        "Discarding configuration {:#010x} ({}/{} parts) for {:#010x}",
                        old.config_id,
                        old.received(),
                        old.total_parts,
                        config_id
                    );
                }
                let total = part.total_parts;
                if total == 0 || total as usize > MAX_INPUTS {
                    return AssemblyOutcome::Rejected {
                        config_id,
                        reason: AssemblyError::InvalidTotal(total),
                    };
                }
                self.expired = None;
                debug!("Configuration {:#010x} started ({} parts)", config_id, total);
                Session::new(config_id, total, now_ms)
            }
        };

        // Any rejection below leaves the assembler idle.
        let index = part.part_number;
        if index >= session.total_parts || index as usize >= MAX_INPUTS {
            return AssemblyOutcome::Rejected {
                config_id,
                reason: AssemblyError::InvalidPart {
                    part: index,
                    total: session.total_parts,
                },
            };
        }
        if let Err(reason) = part.input.validate() {
            return AssemblyOutcome::Rejected { config_id, reason };
        }

        session.parts[index as usize] = Some(part.input.clone());
        session.received_mask |= 1 << index;

        if session.is_complete() {
            return AssemblyOutcome::Complete(session.into_configuration());
        }
        let pending = AssemblyOutcome::Pending {
            config_id,
            received: session.received(),
            total: session.total_parts,
        };
        self.session = Some(session);
        pending
    }

    /// Drop any session in progress, returning its id.
    pub fn reset(&mut self) -> Option<u32> {
        let dropped = self.session.take().map(|s| s.config_id);
        if let Some(config_id) = dropped {
            info!("Configuration {:#010x} abandoned", config_id);
        }
        dropped
    }
}
